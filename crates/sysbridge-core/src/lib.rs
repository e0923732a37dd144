//! Core primitives for the syscall bridge.
//!
//! Everything cross-cutting lives here: the opaque byte-sequence type and its
//! C-string marshaling, thread-local errno access, the structured failure
//! type raised by every bridge function, the interrupt-retry wrappers, the
//! growable-buffer fetch loops, and the process-scoped memo cache. The
//! per-call wrappers in `sysbridge-posix` apply these uniformly; none of the
//! fragile errno sequencing is open-coded outside this crate.

pub mod buffer;
pub mod bytes;
pub mod errno;
pub mod error;
pub mod memo;
pub mod retry;

pub use bytes::ByteString;
pub use errno::Errno;
pub use error::{Result, SyscallError};
