//! Inotify watches and event decoding.
//!
//! The watch descriptor table lives in the kernel; [`Inotify`] owns the
//! instance descriptor. Raw event buffers decode into a vector of exactly
//! the events observed, with the NUL-padded kernel name field marshaled to
//! an explicit absent value when empty.

use std::os::fd::{AsFd, AsRawFd, BorrowedFd, FromRawFd, OwnedFd};

use sysbridge_core::bytes::c_string;
use sysbridge_core::retry::retry_ret;
use sysbridge_core::{ByteString, Result};

/// One decoded inotify event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InotifyEvent {
    pub wd: i32,
    pub mask: u32,
    pub cookie: u32,
    /// Name of the file the event concerns, relative to the watched
    /// directory; absent for events on the watched object itself.
    pub name: Option<ByteString>,
}

/// An inotify instance.
pub struct Inotify {
    fd: OwnedFd,
}

impl Inotify {
    pub fn init1(flags: i32) -> Result<Self> {
        // SAFETY: inotify_init1 has no pointer arguments.
        let fd = retry_ret("inotify_init1", || unsafe { libc::inotify_init1(flags) })?;
        // SAFETY: a freshly created descriptor that we own.
        Ok(Self {
            fd: unsafe { OwnedFd::from_raw_fd(fd) },
        })
    }

    /// Adds (or updates) a watch; returns the watch descriptor.
    pub fn add_watch(&self, path: impl AsRef<[u8]>, mask: u32) -> Result<i32> {
        let path = c_string("inotify_add_watch", path)?;
        // SAFETY: the instance descriptor is live and path is a valid C string.
        retry_ret("inotify_add_watch", || unsafe {
            libc::inotify_add_watch(self.fd.as_raw_fd(), path.as_ptr(), mask)
        })
    }

    pub fn remove_watch(&self, wd: i32) -> Result<()> {
        // SAFETY: the instance descriptor is live.
        retry_ret("inotify_rm_watch", || unsafe {
            libc::inotify_rm_watch(self.fd.as_raw_fd(), wd)
        })?;
        Ok(())
    }

    /// Reads pending events into `buf` and decodes them.
    pub fn read_events(&self, buf: &mut [u8]) -> Result<Vec<InotifyEvent>> {
        // SAFETY: the instance descriptor is live; buf is writable for its
        // full length.
        let read = retry_ret("read", || unsafe {
            libc::read(self.fd.as_raw_fd(), buf.as_mut_ptr().cast(), buf.len())
        })? as usize;
        Ok(decode_events(&buf[..read]))
    }

    pub fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}

/// Decodes a raw kernel event buffer into the exact list of events it
/// contains. A trailing partial header ends the walk.
pub fn decode_events(buffer: &[u8]) -> Vec<InotifyEvent> {
    const HEADER_SIZE: usize = std::mem::size_of::<libc::inotify_event>();
    let mut events = Vec::new();
    let mut offset = 0;
    while offset + HEADER_SIZE <= buffer.len() {
        // SAFETY: bounds checked above; the kernel layout has no alignment
        // guarantee at arbitrary offsets, so read unaligned.
        let raw: libc::inotify_event =
            unsafe { std::ptr::read_unaligned(buffer[offset..].as_ptr().cast()) };
        let name_start = offset + HEADER_SIZE;
        let name_end = (name_start + raw.len as usize).min(buffer.len());
        let name_bytes = &buffer[name_start..name_end];
        let name_len = name_bytes
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(name_bytes.len());
        let name = if name_len == 0 {
            None
        } else {
            Some(ByteString::from(&name_bytes[..name_len]))
        };
        events.push(InotifyEvent {
            wd: raw.wd,
            mask: raw.mask,
            cookie: raw.cookie,
            name,
        });
        offset = name_start + raw.len as usize;
    }
    events
}
