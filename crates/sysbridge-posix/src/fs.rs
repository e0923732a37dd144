//! File metadata and path-mutation calls.
//!
//! Covers `stat64`/`lstat64`, `access`, mode/ownership changes, directory
//! and link creation, `rename`/`remove`, `readlink`/`realpath`, timestamp
//! updates via `utimensat`, `statvfs64`, and `mount`. All size, inode, and
//! device fields marshal as 64-bit values regardless of the native width,
//! and timestamps keep nanosecond resolution as a seconds+nanoseconds pair.

use sysbridge_core::buffer::fetch_doubling;
use sysbridge_core::bytes::c_string;
use sysbridge_core::retry::{retry_ptr, retry_ret};
use sysbridge_core::{ByteString, Errno, Result, SyscallError};

/// A timestamp with nanosecond resolution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timespec {
    pub sec: i64,
    pub nsec: i64,
}

impl Timespec {
    pub const fn new(sec: i64, nsec: i64) -> Self {
        Self { sec, nsec }
    }

    fn from_parts(sec: libc::time_t, nsec: libc::c_long) -> Self {
        Self {
            sec: sec as i64,
            nsec: nsec as i64,
        }
    }

    fn to_raw(self) -> libc::timespec {
        libc::timespec {
            tv_sec: self.sec as libc::time_t,
            tv_nsec: self.nsec as libc::c_long,
        }
    }
}

/// File status, marshaled field by field from `struct stat64`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stat {
    pub dev: u64,
    pub ino: u64,
    pub mode: u32,
    pub nlink: u64,
    pub uid: u32,
    pub gid: u32,
    pub rdev: u64,
    pub size: i64,
    pub blksize: i64,
    pub blocks: i64,
    pub atime: Timespec,
    pub mtime: Timespec,
    pub ctime: Timespec,
}

impl Stat {
    fn from_raw(raw: &libc::stat64) -> Self {
        Self {
            dev: raw.st_dev as u64,
            ino: raw.st_ino as u64,
            mode: raw.st_mode as u32,
            nlink: raw.st_nlink as u64,
            uid: raw.st_uid as u32,
            gid: raw.st_gid as u32,
            rdev: raw.st_rdev as u64,
            size: raw.st_size as i64,
            blksize: raw.st_blksize as i64,
            blocks: raw.st_blocks as i64,
            atime: Timespec::from_parts(raw.st_atime, raw.st_atime_nsec),
            mtime: Timespec::from_parts(raw.st_mtime, raw.st_mtime_nsec),
            ctime: Timespec::from_parts(raw.st_ctime, raw.st_ctime_nsec),
        }
    }

    pub const fn file_type(&self) -> u32 {
        self.mode & libc::S_IFMT
    }

    pub const fn is_symlink(&self) -> bool {
        self.file_type() == libc::S_IFLNK
    }

    pub const fn is_dir(&self) -> bool {
        self.file_type() == libc::S_IFDIR
    }

    pub const fn is_regular_file(&self) -> bool {
        self.file_type() == libc::S_IFREG
    }
}

/// Filesystem statistics from `statvfs64`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatVfs {
    pub bsize: u64,
    pub frsize: u64,
    pub blocks: u64,
    pub bfree: u64,
    pub bavail: u64,
    pub files: u64,
    pub ffree: u64,
    pub favail: u64,
    pub fsid: u64,
    pub flag: u64,
    pub namemax: u64,
}

impl StatVfs {
    fn from_raw(raw: &libc::statvfs64) -> Self {
        Self {
            bsize: raw.f_bsize as u64,
            frsize: raw.f_frsize as u64,
            blocks: raw.f_blocks as u64,
            bfree: raw.f_bfree as u64,
            bavail: raw.f_bavail as u64,
            files: raw.f_files as u64,
            ffree: raw.f_ffree as u64,
            favail: raw.f_favail as u64,
            fsid: raw.f_fsid as u64,
            flag: raw.f_flag as u64,
            namemax: raw.f_namemax as u64,
        }
    }
}

fn do_stat(path: &[u8], no_follow: bool) -> Result<Stat> {
    let call = if no_follow { "lstat64" } else { "stat64" };
    let path = c_string(call, path)?;
    // SAFETY: an all-zero stat64 is a valid out-parameter.
    let mut raw: libc::stat64 = unsafe { std::mem::zeroed() };
    retry_ret(call, || {
        if no_follow {
            // SAFETY: path is a valid C string and raw is writable.
            unsafe { libc::lstat64(path.as_ptr(), &mut raw) }
        } else {
            // SAFETY: path is a valid C string and raw is writable.
            unsafe { libc::stat64(path.as_ptr(), &mut raw) }
        }
    })?;
    Ok(Stat::from_raw(&raw))
}

/// Status of the file a path resolves to, following symbolic links.
pub fn stat(path: impl AsRef<[u8]>) -> Result<Stat> {
    do_stat(path.as_ref(), false)
}

/// Status of the path itself; a symbolic link is described, not followed.
pub fn lstat(path: impl AsRef<[u8]>) -> Result<Stat> {
    do_stat(path.as_ref(), true)
}

/// Checks real-ID accessibility. Denial reports as `Ok(false)`; any other
/// native failure propagates.
pub fn access(path: impl AsRef<[u8]>, mode: i32) -> Result<bool> {
    let path = c_string("access", path)?;
    // SAFETY: path is a valid C string.
    match retry_ret("access", || unsafe { libc::access(path.as_ptr(), mode) }) {
        Ok(_) => Ok(true),
        Err(err) if err.errno() == Errno(libc::EACCES) => Ok(false),
        Err(err) => Err(err),
    }
}

pub fn chmod(path: impl AsRef<[u8]>, mode: u32) -> Result<()> {
    let path = c_string("chmod", path)?;
    // SAFETY: path is a valid C string.
    retry_ret("chmod", || unsafe {
        libc::chmod(path.as_ptr(), mode as libc::mode_t)
    })?;
    Ok(())
}

pub fn chown(path: impl AsRef<[u8]>, uid: u32, gid: u32) -> Result<()> {
    let path = c_string("chown", path)?;
    // SAFETY: path is a valid C string.
    retry_ret("chown", || unsafe { libc::chown(path.as_ptr(), uid, gid) })?;
    Ok(())
}

/// Like [`chown`], but changes the ownership of a symbolic link itself.
pub fn lchown(path: impl AsRef<[u8]>, uid: u32, gid: u32) -> Result<()> {
    let path = c_string("lchown", path)?;
    // SAFETY: path is a valid C string.
    retry_ret("lchown", || unsafe { libc::lchown(path.as_ptr(), uid, gid) })?;
    Ok(())
}

pub fn mkdir(path: impl AsRef<[u8]>, mode: u32) -> Result<()> {
    let path = c_string("mkdir", path)?;
    // SAFETY: path is a valid C string.
    retry_ret("mkdir", || unsafe {
        libc::mkdir(path.as_ptr(), mode as libc::mode_t)
    })?;
    Ok(())
}

pub fn symlink(target: impl AsRef<[u8]>, link_path: impl AsRef<[u8]>) -> Result<()> {
    let target = c_string("symlink", target)?;
    let link_path = c_string("symlink", link_path)?;
    // SAFETY: both are valid C strings.
    retry_ret("symlink", || unsafe {
        libc::symlink(target.as_ptr(), link_path.as_ptr())
    })?;
    Ok(())
}

pub fn link(old_path: impl AsRef<[u8]>, new_path: impl AsRef<[u8]>) -> Result<()> {
    let old_path = c_string("link", old_path)?;
    let new_path = c_string("link", new_path)?;
    // SAFETY: both are valid C strings.
    retry_ret("link", || unsafe {
        libc::link(old_path.as_ptr(), new_path.as_ptr())
    })?;
    Ok(())
}

pub fn rename(old_path: impl AsRef<[u8]>, new_path: impl AsRef<[u8]>) -> Result<()> {
    let old_path = c_string("rename", old_path)?;
    let new_path = c_string("rename", new_path)?;
    // SAFETY: both are valid C strings.
    retry_ret("rename", || unsafe {
        libc::rename(old_path.as_ptr(), new_path.as_ptr())
    })?;
    Ok(())
}

/// Removes a file or an empty directory.
///
/// `remove` is a libc wrapper that does not maintain the error state on
/// success, so failure is detected from its direct return code.
pub fn remove(path: impl AsRef<[u8]>) -> Result<()> {
    let path = c_string("remove", path)?;
    // SAFETY: path is a valid C string.
    retry_ret("remove", || unsafe { libc::remove(path.as_ptr()) })?;
    Ok(())
}

/// Reads a symbolic link's target, growing the buffer until the content is
/// known to be complete.
pub fn readlink(path: impl AsRef<[u8]>) -> Result<ByteString> {
    let path = c_string("readlink", path)?;
    let target = fetch_doubling("readlink", libc::PATH_MAX as usize, |buf, size| {
        // SAFETY: path is a valid C string; buf is writable for size bytes.
        unsafe { libc::readlink(path.as_ptr(), buf.cast(), size) }
    })?;
    Ok(ByteString::new(target))
}

/// Canonicalizes a path, resolving symlinks and relative components.
pub fn realpath(path: impl AsRef<[u8]>) -> Result<ByteString> {
    let path = c_string("realpath", path)?;
    let mut resolved = vec![0u8; libc::PATH_MAX as usize];
    retry_ptr("realpath", || {
        // SAFETY: path is a valid C string; resolved holds PATH_MAX bytes.
        unsafe { libc::realpath(path.as_ptr(), resolved.as_mut_ptr().cast()) }
    })?;
    let len = resolved
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(resolved.len());
    resolved.truncate(len);
    Ok(ByteString::new(resolved))
}

fn do_utimens(path: &[u8], times: &[Timespec; 2], no_follow: bool) -> Result<()> {
    let path = c_string("utimensat", path)?;
    let raw = [times[0].to_raw(), times[1].to_raw()];
    let flags = if no_follow { libc::AT_SYMLINK_NOFOLLOW } else { 0 };
    // SAFETY: path is a valid C string and raw holds two timespec values.
    retry_ret("utimensat", || unsafe {
        libc::utimensat(libc::AT_FDCWD, path.as_ptr(), raw.as_ptr(), flags)
    })?;
    Ok(())
}

/// Sets access and modification times, following symbolic links.
pub fn utimens(path: impl AsRef<[u8]>, times: &[Timespec; 2]) -> Result<()> {
    do_utimens(path.as_ref(), times, false)
}

/// Sets access and modification times on the path itself.
pub fn lutimens(path: impl AsRef<[u8]>, times: &[Timespec; 2]) -> Result<()> {
    do_utimens(path.as_ref(), times, true)
}

pub fn statvfs(path: impl AsRef<[u8]>) -> Result<StatVfs> {
    let path = c_string("statvfs64", path)?;
    // SAFETY: an all-zero statvfs64 is a valid out-parameter.
    let mut raw: libc::statvfs64 = unsafe { std::mem::zeroed() };
    // SAFETY: path is a valid C string and raw is writable.
    retry_ret("statvfs64", || unsafe {
        libc::statvfs64(path.as_ptr(), &mut raw)
    })?;
    Ok(StatVfs::from_raw(&raw))
}

/// Mounts a filesystem.
///
/// An unprivileged attempt would be killed by the seccomp policy instead
/// of failing, so the call is never issued without effective root; the
/// bridge short-circuits with a permission-denied failure.
pub fn mount(
    source: Option<&[u8]>,
    target: impl AsRef<[u8]>,
    fstype: Option<&[u8]>,
    flags: u64,
    data: Option<&[u8]>,
) -> Result<()> {
    // SAFETY: geteuid has no preconditions.
    if unsafe { libc::geteuid() } != 0 {
        return Err(SyscallError::new("mount", Errno(libc::EPERM)));
    }
    let source = source.map(|s| c_string("mount", s)).transpose()?;
    let target = c_string("mount", target)?;
    let fstype = fstype.map(|s| c_string("mount", s)).transpose()?;
    let data = data.map(|d| c_string("mount", d)).transpose()?;
    // SAFETY: all pointers are valid C strings or null.
    retry_ret("mount", || unsafe {
        libc::mount(
            source.as_ref().map_or(std::ptr::null(), |s| s.as_ptr()),
            target.as_ptr(),
            fstype.as_ref().map_or(std::ptr::null(), |s| s.as_ptr()),
            flags as libc::c_ulong,
            data.as_ref().map_or(std::ptr::null(), |d| d.as_ptr().cast()),
        )
    })?;
    Ok(())
}
