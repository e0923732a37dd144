//! The structured failure raised by every bridge function.

use thiserror::Error;

use crate::errno::Errno;

/// Result alias used across the bridge.
pub type Result<T> = std::result::Result<T, SyscallError>;

/// Failure of one native call: the originating call name, the numeric
/// error code captured immediately after the call, and an optional
/// pre-existing failure as chained cause.
///
/// A bridge function either returns a fully-formed value or this error,
/// never both and never a half-built record.
#[derive(Debug, Error)]
#[error("{call} failed: {errno}")]
pub struct SyscallError {
    call: &'static str,
    errno: Errno,
    #[source]
    source: Option<Box<SyscallError>>,
}

impl SyscallError {
    /// Builds a failure for `call` with an explicit error number.
    pub fn new(call: &'static str, errno: Errno) -> Self {
        Self {
            call,
            errno,
            source: None,
        }
    }

    /// Builds a failure for `call` from the thread's current errno.
    ///
    /// Must be invoked immediately after the failing call, before any
    /// other native operation can overwrite the value.
    pub fn last(call: &'static str) -> Self {
        Self::new(call, Errno::last())
    }

    /// Attaches an earlier failure as the cause of this one.
    pub fn with_source(mut self, source: SyscallError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Name of the native call that failed.
    pub fn call(&self) -> &'static str {
        self.call
    }

    /// The captured error number.
    pub fn errno(&self) -> Errno {
        self.errno
    }

    /// Raw numeric error code, suitable for a process exit status.
    pub fn raw_os_error(&self) -> i32 {
        self.errno.raw()
    }
}

impl From<SyscallError> for std::io::Error {
    fn from(err: SyscallError) -> Self {
        std::io::Error::from_raw_os_error(err.raw_os_error())
    }
}
