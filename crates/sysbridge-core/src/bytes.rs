//! Opaque byte sequences and their C-string marshaling.
//!
//! Paths, attribute names, and attribute values cross the bridge as raw
//! byte sequences, never as UTF-8 text. Marshaling always copies into an
//! owned native buffer; host memory is never aliased or pinned across a
//! blocking call, and the owned buffer is released on every exit path.

use std::borrow::Borrow;
use std::ffi::{CStr, CString, c_char};
use std::fmt;
use std::ops::Deref;

use crate::errno::Errno;
use crate::error::{Result, SyscallError};

/// An owned, opaque byte sequence.
///
/// Distinct from both `String` (no UTF-8 assumption) and from "absent":
/// an empty `ByteString` and `None` are observably different to callers.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ByteString(Vec<u8>);

impl ByteString {
    /// Wraps an owned byte vector.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Marshals to a null-terminated native string by copy.
    ///
    /// A zero-length sequence yields an empty, non-null native string. An
    /// interior NUL cannot be represented in a C string and is reported as
    /// an `EINVAL` failure attributed to `call`.
    pub fn to_c_string(&self, call: &'static str) -> Result<CString> {
        c_string(call, &self.0)
    }

    /// Copies a null-terminated native string.
    ///
    /// # Safety
    ///
    /// `ptr` must point to a valid null-terminated string.
    pub unsafe fn from_nul_terminated(ptr: *const c_char) -> Self {
        // SAFETY: caller guarantees a valid null-terminated string.
        Self(unsafe { CStr::from_ptr(ptr) }.to_bytes().to_vec())
    }

    /// Copies an optional null-terminated native string, marshaling an
    /// absent (null) pointer to `None` rather than an empty value.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or point to a valid null-terminated string.
    pub unsafe fn from_nullable(ptr: *const c_char) -> Option<Self> {
        if ptr.is_null() {
            None
        } else {
            // SAFETY: just checked non-null; caller guarantees validity.
            Some(unsafe { Self::from_nul_terminated(ptr) })
        }
    }
}

/// Marshals an arbitrary byte sequence to a null-terminated native string.
pub fn c_string(call: &'static str, bytes: impl AsRef<[u8]>) -> Result<CString> {
    CString::new(bytes.as_ref()).map_err(|_| SyscallError::new(call, Errno(libc::EINVAL)))
}

impl Deref for ByteString {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for ByteString {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Borrow<[u8]> for ByteString {
    fn borrow(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for ByteString {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for ByteString {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<&str> for ByteString {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl fmt::Debug for ByteString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.0.escape_ascii())
    }
}

impl fmt::Display for ByteString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        String::from_utf8_lossy(&self.0).fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_preserves_exact_bytes() {
        let original: &[u8] = b"caf\xc3\xa9 \xff\xfe";
        let bs = ByteString::from(original);
        let c = bs.to_c_string("test").expect("no interior NUL");
        // SAFETY: `c` is a valid null-terminated string.
        let back = unsafe { ByteString::from_nul_terminated(c.as_ptr()) };
        assert_eq!(back.as_bytes(), original);
    }

    #[test]
    fn empty_sequence_round_trips_as_empty_non_null() {
        let bs = ByteString::default();
        let c = bs.to_c_string("test").expect("empty is valid");
        assert!(!c.as_ptr().is_null());
        assert_eq!(c.as_bytes(), b"");
        // SAFETY: `c` is a valid null-terminated string.
        let back = unsafe { ByteString::from_nul_terminated(c.as_ptr()) };
        assert!(back.is_empty());
    }

    #[test]
    fn interior_nul_is_einval_naming_the_call() {
        let bs = ByteString::from(&b"a\0b"[..]);
        let err = bs.to_c_string("open64").unwrap_err();
        assert_eq!(err.call(), "open64");
        assert_eq!(err.raw_os_error(), libc::EINVAL);
    }

    #[test]
    fn binary_payload_keeps_embedded_zero_bytes() {
        let payload = ByteString::from(&b"\x00\x01\x00\x02"[..]);
        assert_eq!(payload.len(), 4);
        assert_eq!(payload.as_bytes(), b"\x00\x01\x00\x02");
    }

    #[test]
    fn nullable_distinguishes_absent_from_empty() {
        // SAFETY: null is explicitly allowed.
        assert_eq!(unsafe { ByteString::from_nullable(std::ptr::null()) }, None);
        let empty = CString::new("").unwrap();
        // SAFETY: valid null-terminated string.
        let marshaled = unsafe { ByteString::from_nullable(empty.as_ptr()) };
        assert_eq!(marshaled, Some(ByteString::default()));
    }
}
