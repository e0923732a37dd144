//! Bridge functions over the Linux syscall surface.
//!
//! Each entry point performs the same sequence: marshal arguments into
//! owned native buffers, issue exactly one native call through a retry
//! wrapper from `sysbridge-core`, then marshal the result field by field
//! or raise a [`SyscallError`] naming the call and carrying the captured
//! error number. No function returns a partial value alongside a failure,
//! and argument buffers are released on every exit path.
//!
//! Calls are grouped per header family, one module each: file metadata and
//! mutation ([`fs`]), descriptor I/O ([`io`]), directory streams ([`dir`]),
//! extended attributes ([`xattr`]), the user and group databases ([`pwd`],
//! [`grp`]), the mount table ([`mnt`]), and inotify watches ([`inotify`]).

pub mod dir;
pub mod fs;
pub mod grp;
pub mod inotify;
pub mod io;
pub mod mnt;
pub mod pwd;
pub mod xattr;

pub use dir::{Dir, Dirent};
pub use fs::{Stat, StatVfs, Timespec};
pub use grp::Group;
pub use inotify::{Inotify, InotifyEvent};
pub use mnt::{MountTable, Mntent};
pub use pwd::Passwd;
pub use sysbridge_core::{ByteString, Errno, Result, SyscallError};
