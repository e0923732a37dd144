//! Descriptor-level calls: `open64`, `sendfile64`, `fcntl`, `ioctl`.
//!
//! Open descriptors are returned as `OwnedFd`, so release on every exit
//! path is the type system's problem rather than the caller's. Out-param
//! references (`sendfile` offset, `ioctl` argument) are written back only
//! after the call has succeeded.

use std::os::fd::{AsRawFd, BorrowedFd, FromRawFd, OwnedFd};

use sysbridge_core::bytes::c_string;
use sysbridge_core::retry::retry_ret;
use sysbridge_core::Result;

/// Opens a file, transferring ownership of the new descriptor.
pub fn open(path: impl AsRef<[u8]>, flags: i32, mode: u32) -> Result<OwnedFd> {
    let path = c_string("open64", path)?;
    // SAFETY: path is a valid C string.
    let fd = retry_ret("open64", || unsafe {
        libc::open64(path.as_ptr(), flags, mode as libc::c_uint)
    })?;
    // SAFETY: open64 returned a freshly opened descriptor that we own.
    Ok(unsafe { OwnedFd::from_raw_fd(fd) })
}

/// Copies up to `count` bytes between descriptors in kernel space.
///
/// When `offset` is provided, the input descriptor's position is left
/// untouched and the referenced value is advanced past the bytes read.
pub fn sendfile(
    out_fd: BorrowedFd<'_>,
    in_fd: BorrowedFd<'_>,
    offset: Option<&mut i64>,
    count: usize,
) -> Result<usize> {
    let mut local: libc::off64_t = 0;
    let offset_ptr: *mut libc::off64_t = match &offset {
        Some(at) => {
            local = **at;
            &mut local
        }
        None => std::ptr::null_mut(),
    };
    // SAFETY: descriptors are live for the call; offset_ptr is null or
    // points at a local that outlives the call.
    let sent = retry_ret("sendfile64", || unsafe {
        libc::sendfile64(out_fd.as_raw_fd(), in_fd.as_raw_fd(), offset_ptr, count)
    })?;
    if let Some(at) = offset {
        *at = local;
    }
    Ok(sent as usize)
}

/// `fcntl` with an integer argument.
pub fn fcntl_int(fd: BorrowedFd<'_>, cmd: i32, arg: i32) -> Result<i32> {
    // SAFETY: the descriptor is live for the call.
    retry_ret("fcntl", || unsafe { libc::fcntl(fd.as_raw_fd(), cmd, arg) })
}

/// `fcntl` without an argument.
pub fn fcntl_void(fd: BorrowedFd<'_>, cmd: i32) -> Result<i32> {
    // SAFETY: the descriptor is live for the call.
    retry_ret("fcntl", || unsafe { libc::fcntl(fd.as_raw_fd(), cmd) })
}

/// `ioctl` with an optional integer in/out argument.
pub fn ioctl_int(fd: BorrowedFd<'_>, request: i32, arg: Option<&mut i32>) -> Result<i32> {
    let mut local: libc::c_int = 0;
    let arg_ptr: *mut libc::c_int = match &arg {
        Some(value) => {
            local = **value;
            &mut local
        }
        None => std::ptr::null_mut(),
    };
    // SAFETY: the descriptor is live; arg_ptr is null or points at a
    // local that outlives the call.
    let ret = retry_ret("ioctl", || unsafe {
        libc::ioctl(fd.as_raw_fd(), request as libc::c_ulong, arg_ptr)
    })?;
    if let Some(value) = arg {
        *value = local;
    }
    Ok(ret)
}
