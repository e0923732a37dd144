//! Mount table access.
//!
//! A [`MountTable`] owns the `setmntent` stream; reads use the reentrant
//! `getmntent_r` so the entry and its strings live in caller-owned
//! buffers. Exhaustion is `Ok(None)`, never a failure.

use std::ptr::NonNull;

use sysbridge_core::bytes::c_string;
use sysbridge_core::retry::{retry_nullable, retry_ptr, retry_void};
use sysbridge_core::{ByteString, Result};

/// Line buffer for one mount table entry. Option strings for stacked
/// filesystems can run long, but not this long.
const ENTRY_BUFFER_SIZE: usize = 8192;

/// One mount table entry, marshaled from `struct mntent`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mntent {
    pub fsname: ByteString,
    pub dir: ByteString,
    pub fstype: ByteString,
    pub opts: ByteString,
    pub freq: i32,
    pub passno: i32,
}

impl Mntent {
    /// Whether the options string contains `option`, matched at token
    /// boundaries (`option` alone or `option=value`).
    pub fn has_option(&self, option: impl AsRef<[u8]>) -> bool {
        let option = option.as_ref();
        if option.is_empty() {
            return false;
        }
        self.opts.as_bytes().split(|&b| b == b',').any(|token| {
            token == option
                || (token.len() > option.len()
                    && token.starts_with(option)
                    && token[option.len()] == b'=')
        })
    }
}

/// An open mount table stream.
#[derive(Debug)]
pub struct MountTable {
    file: NonNull<libc::FILE>,
}

impl MountTable {
    /// Opens a mount table file (`/proc/mounts`, `/etc/fstab`, ...) with a
    /// stdio mode string such as `r`.
    pub fn open(path: impl AsRef<[u8]>, mode: impl AsRef<[u8]>) -> Result<Self> {
        let path = c_string("setmntent", path)?;
        let mode = c_string("setmntent", mode)?;
        // SAFETY: both are valid C strings.
        let file = retry_ptr("setmntent", || unsafe {
            libc::setmntent(path.as_ptr(), mode.as_ptr())
        })?;
        Ok(Self { file })
    }

    /// Reads the next entry; `Ok(None)` when the table is exhausted.
    pub fn read(&mut self) -> Result<Option<Mntent>> {
        // SAFETY: an all-zero mntent is a valid out-parameter.
        let mut entry: libc::mntent = unsafe { std::mem::zeroed() };
        let mut buf = vec![0u8; ENTRY_BUFFER_SIZE];
        // SAFETY: the stream is open; entry and buf outlive the call.
        let parsed = retry_nullable("getmntent_r", || unsafe {
            libc::getmntent_r(
                self.file.as_ptr(),
                &mut entry,
                buf.as_mut_ptr().cast(),
                buf.len() as libc::c_int,
            )
        })?;
        if parsed.is_none() {
            return Ok(None);
        }
        // SAFETY: a successful parse fills every string field with a valid
        // null-terminated string inside buf, which is still alive here.
        let entry = unsafe {
            Mntent {
                fsname: ByteString::from_nul_terminated(entry.mnt_fsname),
                dir: ByteString::from_nul_terminated(entry.mnt_dir),
                fstype: ByteString::from_nul_terminated(entry.mnt_type),
                opts: ByteString::from_nul_terminated(entry.mnt_opts),
                freq: entry.mnt_freq,
                passno: entry.mnt_passno,
            }
        };
        Ok(Some(entry))
    }

    /// Closes the stream, surfacing any close failure.
    pub fn close(self) -> Result<()> {
        let file = self.file;
        std::mem::forget(self);
        // endmntent's return value carries no information; failure shows
        // up through the error state.
        retry_void("endmntent", || {
            // SAFETY: the stream is open and no longer owned by a Drop.
            unsafe { libc::endmntent(file.as_ptr()) };
        })
    }
}

impl Drop for MountTable {
    fn drop(&mut self) {
        // SAFETY: the stream is still open; this is the last use.
        unsafe { libc::endmntent(self.file.as_ptr()) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_with_opts(opts: &str) -> Mntent {
        Mntent {
            fsname: ByteString::from("proc"),
            dir: ByteString::from("/proc"),
            fstype: ByteString::from("proc"),
            opts: ByteString::from(opts),
            freq: 0,
            passno: 0,
        }
    }

    #[test]
    fn has_option_matches_whole_tokens() {
        let entry = entry_with_opts("rw,nosuid,nodev,noexec,relatime");
        assert!(entry.has_option("rw"));
        assert!(entry.has_option("nodev"));
        assert!(entry.has_option("relatime"));
        assert!(!entry.has_option("ro"));
        assert!(!entry.has_option("dev"));
        assert!(!entry.has_option("relatim"));
    }

    #[test]
    fn has_option_matches_valued_tokens() {
        let entry = entry_with_opts("rw,mode=755,size=1024k");
        assert!(entry.has_option("mode"));
        assert!(entry.has_option("size"));
        assert!(!entry.has_option("mode=644"));
        assert!(!entry.has_option("siz"));
    }

    #[test]
    fn has_option_rejects_empty_option() {
        let entry = entry_with_opts("rw,relatime");
        assert!(!entry.has_option(""));
    }
}
