//! Extended attributes on symbolic-link-precise paths.
//!
//! Value and name-list retrieval go through the probed growable-buffer
//! loop: a size probe, an exact allocation, and a refetch, rerun whenever
//! the attribute changes concurrently (`ERANGE`). A missing attribute is a
//! failure carrying the platform's attribute-not-found code, never a
//! zero-length value.

use sysbridge_core::buffer::fetch_probed;
use sysbridge_core::bytes::c_string;
use sysbridge_core::retry::retry_ret;
use sysbridge_core::{ByteString, Result};

/// Reads an attribute value of the path itself (no symlink following).
pub fn lgetxattr(path: impl AsRef<[u8]>, name: impl AsRef<[u8]>) -> Result<ByteString> {
    let path = c_string("lgetxattr", path)?;
    let name = c_string("lgetxattr", name)?;
    let value = fetch_probed("lgetxattr", |buf, size| {
        // SAFETY: path and name are valid C strings; buf is writable for
        // size bytes (or ignored when size is zero).
        unsafe { libc::lgetxattr(path.as_ptr(), name.as_ptr(), buf.cast(), size) }
    })?;
    Ok(ByteString::new(value))
}

/// Lists attribute names of the path itself, as an exact-length vector
/// with no trailing empty entries.
pub fn llistxattr(path: impl AsRef<[u8]>) -> Result<Vec<ByteString>> {
    let path = c_string("llistxattr", path)?;
    let names = fetch_probed("llistxattr", |buf, size| {
        // SAFETY: path is a valid C string; buf is writable for size bytes.
        unsafe { libc::llistxattr(path.as_ptr(), buf.cast(), size) }
    })?;
    Ok(split_name_list(&names))
}

/// Writes an attribute value on the path itself.
pub fn lsetxattr(
    path: impl AsRef<[u8]>,
    name: impl AsRef<[u8]>,
    value: impl AsRef<[u8]>,
    flags: i32,
) -> Result<()> {
    let path = c_string("lsetxattr", path)?;
    let name = c_string("lsetxattr", name)?;
    // Binary payload: marshaled as pointer + explicit length, by copy.
    let value = value.as_ref().to_vec();
    // SAFETY: path and name are valid C strings; value is readable for
    // its full length.
    retry_ret("lsetxattr", || unsafe {
        libc::lsetxattr(
            path.as_ptr(),
            name.as_ptr(),
            value.as_ptr().cast(),
            value.len(),
            flags,
        )
    })?;
    Ok(())
}

/// Splits the kernel's NUL-joined name list into individual names.
fn split_name_list(bytes: &[u8]) -> Vec<ByteString> {
    bytes
        .split(|&b| b == 0)
        .filter(|name| !name.is_empty())
        .map(ByteString::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_list_splits_to_exact_length() {
        let names = split_name_list(b"user.a\0security.selinux\0user.long.name\0");
        assert_eq!(
            names,
            vec![
                ByteString::from("user.a"),
                ByteString::from("security.selinux"),
                ByteString::from("user.long.name"),
            ]
        );
    }

    #[test]
    fn empty_name_list_yields_no_entries() {
        assert!(split_name_list(b"").is_empty());
        assert!(split_name_list(b"\0").is_empty());
    }
}
