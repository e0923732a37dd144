//! Thread-local errno access and error number descriptions.
//!
//! Errno on Linux is thread-local storage reached through
//! `__errno_location`, so each bridge invocation owns its own
//! clear-call-check window without cross-thread interference.

use std::fmt;

/// A raw OS error number.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Errno(pub i32);

impl Errno {
    /// Returns the calling thread's current errno value.
    pub fn last() -> Self {
        // SAFETY: __errno_location returns a valid thread-local pointer.
        Self(unsafe { *libc::__errno_location() })
    }

    /// Returns the current errno value, or `fallback` if errno is clean.
    ///
    /// Some libc functions report failure only through their return value
    /// and may leave errno untouched.
    pub fn last_or(fallback: Self) -> Self {
        let err = Self::last();
        if err.0 == 0 { fallback } else { err }
    }

    /// Clears the calling thread's errno.
    pub fn clear() {
        // SAFETY: __errno_location returns a valid thread-local pointer.
        unsafe { *libc::__errno_location() = 0 };
    }

    /// Sets the calling thread's errno to this value.
    pub fn set(self) {
        // SAFETY: __errno_location returns a valid thread-local pointer.
        unsafe { *libc::__errno_location() = self.0 };
    }

    /// Raw numeric value.
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Whether this is the interruption condition (`EINTR`), the only
    /// failure recovered locally by retrying.
    pub const fn is_interrupted(self) -> bool {
        self.0 == libc::EINTR
    }

    /// Whether this is the undersized-buffer condition (`ERANGE`).
    pub const fn is_range(self) -> bool {
        self.0 == libc::ERANGE
    }

    /// Returns the message string for this error number.
    pub fn desc(self) -> &'static str {
        match self.0 {
            0 => "Success",
            libc::EPERM => "Operation not permitted",
            libc::ENOENT => "No such file or directory",
            libc::ESRCH => "No such process",
            libc::EINTR => "Interrupted system call",
            libc::EIO => "Input/output error",
            libc::ENXIO => "No such device or address",
            libc::E2BIG => "Argument list too long",
            libc::ENOEXEC => "Exec format error",
            libc::EBADF => "Bad file descriptor",
            libc::ECHILD => "No child processes",
            libc::EAGAIN => "Resource temporarily unavailable",
            libc::ENOMEM => "Cannot allocate memory",
            libc::EACCES => "Permission denied",
            libc::EFAULT => "Bad address",
            libc::ENOTBLK => "Block device required",
            libc::EBUSY => "Device or resource busy",
            libc::EEXIST => "File exists",
            libc::EXDEV => "Invalid cross-device link",
            libc::ENODEV => "No such device",
            libc::ENOTDIR => "Not a directory",
            libc::EISDIR => "Is a directory",
            libc::EINVAL => "Invalid argument",
            libc::ENFILE => "Too many open files in system",
            libc::EMFILE => "Too many open files",
            libc::ENOTTY => "Inappropriate ioctl for device",
            libc::ETXTBSY => "Text file busy",
            libc::EFBIG => "File too large",
            libc::ENOSPC => "No space left on device",
            libc::ESPIPE => "Illegal seek",
            libc::EROFS => "Read-only file system",
            libc::EMLINK => "Too many links",
            libc::EPIPE => "Broken pipe",
            libc::EDOM => "Numerical argument out of domain",
            libc::ERANGE => "Numerical result out of range",
            libc::EDEADLK => "Resource deadlock avoided",
            libc::ENAMETOOLONG => "File name too long",
            libc::ENOSYS => "Function not implemented",
            libc::ENOTEMPTY => "Directory not empty",
            libc::ELOOP => "Too many levels of symbolic links",
            libc::ENODATA => "No data available",
            libc::EOVERFLOW => "Value too large for defined data type",
            libc::EOPNOTSUPP => "Operation not supported",
            libc::ETIMEDOUT => "Connection timed out",
            _ => "Unknown error",
        }
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (os error {})", self.desc(), self.0)
    }
}

impl fmt::Debug for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Errno({}, {})", self.0, self.desc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desc_known_errnos() {
        assert_eq!(Errno(libc::EINVAL).desc(), "Invalid argument");
        assert_eq!(Errno(libc::ENOENT).desc(), "No such file or directory");
        assert_eq!(Errno(0).desc(), "Success");
    }

    #[test]
    fn desc_unknown_errno() {
        assert_eq!(Errno(9999).desc(), "Unknown error");
    }

    #[test]
    fn set_clear_last_round_trip() {
        Errno(libc::EACCES).set();
        assert_eq!(Errno::last(), Errno(libc::EACCES));
        Errno::clear();
        assert_eq!(Errno::last().raw(), 0);
    }

    #[test]
    fn last_or_falls_back_when_clean() {
        Errno::clear();
        assert_eq!(Errno::last_or(Errno(libc::EINVAL)), Errno(libc::EINVAL));
        Errno(libc::EIO).set();
        assert_eq!(Errno::last_or(Errno(libc::EINVAL)), Errno(libc::EIO));
        Errno::clear();
    }
}
