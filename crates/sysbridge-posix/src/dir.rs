//! Directory streams.
//!
//! A [`Dir`] owns the native `DIR` stream for its whole lifetime. Reads
//! distinguish the three enumeration outcomes (an entry, exhaustion, and
//! a true failure); exhaustion is never reported as an error.

use std::ptr::NonNull;

use sysbridge_core::bytes::c_string;
use sysbridge_core::retry::{retry_nullable, retry_ptr, retry_ret};
use sysbridge_core::{ByteString, Errno, Result};

/// One directory entry, marshaled from `struct dirent64`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dirent {
    pub ino: u64,
    pub off: i64,
    pub reclen: u16,
    pub file_type: u8,
    pub name: ByteString,
}

impl Dirent {
    /// Whether this is a `.` or `..` entry.
    pub fn is_dot(&self) -> bool {
        matches!(self.name.as_bytes(), b"." | b"..")
    }
}

/// An open directory stream.
#[derive(Debug)]
pub struct Dir {
    dir: NonNull<libc::DIR>,
}

impl Dir {
    pub fn open(path: impl AsRef<[u8]>) -> Result<Self> {
        let path = c_string("opendir", path)?;
        // SAFETY: path is a valid C string.
        let dir = retry_ptr("opendir", || unsafe { libc::opendir(path.as_ptr()) })?;
        Ok(Self { dir })
    }

    /// Reads the next entry.
    ///
    /// `Ok(None)` means the stream is exhausted; a failure mid-iteration
    /// is reported as `Err` and never conflated with exhaustion.
    pub fn read(&mut self) -> Result<Option<Dirent>> {
        // SAFETY: the stream handle is open for the lifetime of self.
        let entry = retry_nullable("readdir64", || unsafe {
            libc::readdir64(self.dir.as_ptr())
        })?;
        match entry {
            None => Ok(None),
            Some(entry) => {
                // SAFETY: readdir64 returns a pointer valid until the next
                // call on this stream; we copy everything out here.
                let raw = unsafe { entry.as_ref() };
                // SAFETY: d_name is null-terminated within the entry.
                let name = unsafe { ByteString::from_nul_terminated(raw.d_name.as_ptr()) };
                Ok(Some(Dirent {
                    ino: raw.d_ino as u64,
                    off: raw.d_off as i64,
                    reclen: raw.d_reclen,
                    file_type: raw.d_type,
                    name,
                }))
            }
        }
    }

    /// Closes the stream, surfacing any close failure.
    pub fn close(self) -> Result<()> {
        let dir = self.dir;
        std::mem::forget(self);
        // SAFETY: the handle is open and no longer owned by a Drop.
        retry_ret("closedir", || unsafe { libc::closedir(dir.as_ptr()) })?;
        Ok(())
    }
}

impl Drop for Dir {
    fn drop(&mut self) {
        // SAFETY: the handle is still open; this is the last use.
        if unsafe { libc::closedir(self.dir.as_ptr()) } != 0 {
            log::debug!("closedir failed during drop: {}", Errno::last());
        }
    }
}
