//! User database lookups and enumeration.
//!
//! Lookups go through the reentrant `getpwnam_r`/`getpwuid_r` family with
//! a memoized scratch-buffer size, distinguishing "not found" (`Ok(None)`)
//! from genuine failure. Enumeration owns the process-global database
//! cursor for the iterator's lifetime.

use parking_lot::{Mutex, MutexGuard};
use sysbridge_core::bytes::c_string;
use sysbridge_core::retry::{retry_errno_ret, retry_nullable, retry_void};
use sysbridge_core::{ByteString, Result, memo};

/// One user database record, marshaled from `struct passwd`.
///
/// Absent string fields marshal to `None`, which callers can tell apart
/// from an empty value. `gecos` is populated on 64-bit targets only; the
/// 32-bit record layout does not carry the field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Passwd {
    pub name: Option<ByteString>,
    pub uid: u32,
    pub gid: u32,
    pub gecos: Option<ByteString>,
    pub dir: Option<ByteString>,
    pub shell: Option<ByteString>,
}

impl Passwd {
    /// # Safety
    ///
    /// `raw` must point to a populated record whose string fields are null
    /// or valid null-terminated strings.
    unsafe fn from_raw(raw: &libc::passwd) -> Self {
        Self {
            // SAFETY: fields are null or valid per the caller's contract.
            name: unsafe { ByteString::from_nullable(raw.pw_name) },
            uid: raw.pw_uid,
            gid: raw.pw_gid,
            gecos: unsafe { gecos_of(raw) },
            // SAFETY: as above.
            dir: unsafe { ByteString::from_nullable(raw.pw_dir) },
            // SAFETY: as above.
            shell: unsafe { ByteString::from_nullable(raw.pw_shell) },
        }
    }
}

#[cfg(target_pointer_width = "64")]
unsafe fn gecos_of(raw: &libc::passwd) -> Option<ByteString> {
    // SAFETY: pw_gecos is null or a valid null-terminated string.
    unsafe { ByteString::from_nullable(raw.pw_gecos) }
}

#[cfg(not(target_pointer_width = "64"))]
unsafe fn gecos_of(_raw: &libc::passwd) -> Option<ByteString> {
    None
}

type PwLookup<'a> =
    dyn FnMut(*mut libc::passwd, *mut libc::c_char, usize, *mut *mut libc::passwd) -> i32 + 'a;

fn lookup(call: &'static str, f: &mut PwLookup<'_>) -> Result<Option<Passwd>> {
    let mut size = memo::passwd_buffer_size();
    loop {
        let mut buf = vec![0u8; size];
        // SAFETY: an all-zero passwd is a valid out-parameter.
        let mut pwd: libc::passwd = unsafe { std::mem::zeroed() };
        let mut found: *mut libc::passwd = std::ptr::null_mut();
        match retry_errno_ret(call, || {
            f(&mut pwd, buf.as_mut_ptr().cast(), size, &mut found)
        }) {
            Ok(()) => {}
            Err(err) if err.errno().is_range() => {
                // Entry larger than the memoized scratch size.
                size = size.saturating_mul(2).max(1024);
                continue;
            }
            // Some database backends report absence through the return
            // code instead of a null result.
            Err(err) if matches!(err.raw_os_error(), libc::ENOENT | libc::ESRCH) => {
                return Ok(None);
            }
            Err(err) => return Err(err),
        }
        if found.is_null() {
            return Ok(None);
        }
        // SAFETY: the lookup populated pwd; its string fields point into
        // buf, which is still alive here.
        return Ok(Some(unsafe { Passwd::from_raw(&pwd) }));
    }
}

/// Looks a user up by name; `Ok(None)` when no such user exists.
pub fn getpwnam(name: impl AsRef<[u8]>) -> Result<Option<Passwd>> {
    let name = c_string("getpwnam_r", name)?;
    lookup("getpwnam_r", &mut |pwd, buf, size, found| {
        // SAFETY: all pointers are valid for the call per lookup's setup.
        unsafe { libc::getpwnam_r(name.as_ptr(), pwd, buf, size, found) }
    })
}

/// Looks a user up by id; `Ok(None)` when no such user exists.
pub fn getpwuid(uid: u32) -> Result<Option<Passwd>> {
    lookup("getpwuid_r", &mut |pwd, buf, size, found| {
        // SAFETY: all pointers are valid for the call per lookup's setup.
        unsafe { libc::getpwuid_r(uid, pwd, buf, size, found) }
    })
}

static PASSWD_CURSOR: Mutex<()> = Mutex::new(());

/// Enumeration over the whole user database.
///
/// The underlying cursor is process-global, so the iterator holds a lock
/// for its lifetime and rewinds the cursor on creation.
pub struct Users {
    _guard: MutexGuard<'static, ()>,
}

impl Users {
    pub fn new() -> Result<Self> {
        let guard = PASSWD_CURSOR.lock();
        // SAFETY: setpwent has no preconditions.
        retry_void("setpwent", || unsafe { libc::setpwent() })?;
        Ok(Self { _guard: guard })
    }

    /// Reads the next entry; `Ok(None)` when the database is exhausted.
    pub fn next_entry(&mut self) -> Result<Option<Passwd>> {
        // SAFETY: the cursor is held by this iterator.
        let entry = retry_nullable("getpwent", || unsafe { libc::getpwent() })?;
        match entry {
            None => Ok(None),
            // SAFETY: getpwent returns a valid record pointer, stable
            // until the next call on this cursor; we copy out here.
            Some(entry) => Ok(Some(unsafe { Passwd::from_raw(entry.as_ref()) })),
        }
    }
}

impl Iterator for Users {
    type Item = Result<Passwd>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry().transpose()
    }
}

impl Drop for Users {
    fn drop(&mut self) {
        // SAFETY: endpwent has no preconditions.
        unsafe { libc::endpwent() };
    }
}
