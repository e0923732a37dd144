//! Interrupt-retry wrappers around native calls.
//!
//! Every bridge function routes its one native call through exactly one of
//! these wrappers. Interruption (`EINTR`) is retried unconditionally, with
//! no backoff and no bound, until the call resolves some other way. Calls
//! that signal failure through a discriminated result (a `-1` sentinel or a
//! returned error code) are checked that way; the fragile
//! clear-errno/call/check-errno sequencing survives only for the
//! pointer-returning families where NULL is ambiguous between exhaustion
//! and failure, and nothing runs between the clear and the check.

use std::ptr::NonNull;

use crate::errno::Errno;
use crate::error::{Result, SyscallError};

/// Return types whose failure indicator is the `-1` sentinel.
pub trait Sentinel: Copy {
    fn is_sentinel(self) -> bool;
}

impl Sentinel for i32 {
    fn is_sentinel(self) -> bool {
        self == -1
    }
}

impl Sentinel for i64 {
    fn is_sentinel(self) -> bool {
        self == -1
    }
}

impl Sentinel for isize {
    fn is_sentinel(self) -> bool {
        self == -1
    }
}

/// Invokes a value-returning call whose failure is signaled by `-1`.
///
/// Errno is consulted only after the sentinel is observed, so a stale
/// value can neither fake a failure nor trigger a spurious retry.
pub fn retry_ret<T: Sentinel>(call: &'static str, mut f: impl FnMut() -> T) -> Result<T> {
    loop {
        let ret = f();
        if ret.is_sentinel() {
            let err = Errno::last();
            if err.is_interrupted() {
                continue;
            }
            return Err(SyscallError::new(call, err));
        }
        return Ok(ret);
    }
}

/// Invokes a pointer-returning call for which NULL always means failure
/// (`setmntent`, `opendir`, `realpath`).
///
/// Falls back to `EINVAL` if the call failed without setting errno.
pub fn retry_ptr<T>(call: &'static str, mut f: impl FnMut() -> *mut T) -> Result<NonNull<T>> {
    loop {
        Errno::clear();
        let ptr = f();
        match NonNull::new(ptr) {
            Some(ptr) => return Ok(ptr),
            None => {
                let err = Errno::last_or(Errno(libc::EINVAL));
                if err.is_interrupted() {
                    continue;
                }
                return Err(SyscallError::new(call, err));
            }
        }
    }
}

/// Invokes a pointer-returning enumeration call where NULL is ambiguous
/// between "no more entries" and failure (`readdir64`, `getmntent`,
/// `getpwent`, `getgrent`).
///
/// Clears errno before each attempt; NULL with a clean errno is the
/// explicit exhaustion outcome, never a failure.
pub fn retry_nullable<T>(
    call: &'static str,
    mut f: impl FnMut() -> *mut T,
) -> Result<Option<NonNull<T>>> {
    loop {
        Errno::clear();
        let ptr = f();
        let err = Errno::last();
        if err.is_interrupted() {
            continue;
        }
        if err.raw() != 0 {
            return Err(SyscallError::new(call, err));
        }
        return Ok(NonNull::new(ptr));
    }
}

/// Invokes a call from the reentrant lookup family (`getpwnam_r`,
/// `getgrgid_r`, ...) whose failure is the returned code itself.
///
/// Retries while the return equals the interruption value; shared errno is
/// not touched by the loop. A non-zero return becomes the structured
/// failure directly.
pub fn retry_errno_ret(call: &'static str, mut f: impl FnMut() -> i32) -> Result<()> {
    loop {
        let rc = f();
        if rc == libc::EINTR {
            continue;
        }
        if rc != 0 {
            return Err(SyscallError::new(call, Errno(rc)));
        }
        return Ok(());
    }
}

/// Invokes a void call (`setpwent`, `endgrent`, ...) with the same
/// clear-before-attempt, check-after discipline.
pub fn retry_void(call: &'static str, mut f: impl FnMut()) -> Result<()> {
    loop {
        Errno::clear();
        f();
        let err = Errno::last();
        if err.is_interrupted() {
            continue;
        }
        if err.raw() != 0 {
            return Err(SyscallError::new(call, err));
        }
        return Ok(());
    }
}
