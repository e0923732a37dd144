//! Group database lookups and enumeration.
//!
//! Mirrors the user database module: reentrant `getgrnam_r`/`getgrgid_r`
//! lookups with a memoized scratch size, `Ok(None)` for "not found", and
//! an enumeration iterator owning the process-global cursor. The member
//! list marshals to a vector of the exact observed length.

use parking_lot::{Mutex, MutexGuard};
use sysbridge_core::bytes::c_string;
use sysbridge_core::retry::{retry_errno_ret, retry_nullable, retry_void};
use sysbridge_core::{ByteString, Result, memo};

/// One group database record, marshaled from `struct group`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
    pub name: Option<ByteString>,
    pub passwd: Option<ByteString>,
    pub gid: u32,
    pub members: Vec<ByteString>,
}

impl Group {
    /// # Safety
    ///
    /// `raw` must point to a populated record whose string fields are null
    /// or valid, and whose member array is null or null-terminated.
    unsafe fn from_raw(raw: &libc::group) -> Self {
        Self {
            // SAFETY: fields are null or valid per the caller's contract.
            name: unsafe { ByteString::from_nullable(raw.gr_name) },
            // SAFETY: as above.
            passwd: unsafe { ByteString::from_nullable(raw.gr_passwd) },
            gid: raw.gr_gid,
            // SAFETY: as above.
            members: unsafe { members_of(raw) },
        }
    }
}

/// # Safety
///
/// `raw.gr_mem` must be null or a null-terminated array of valid strings.
unsafe fn members_of(raw: &libc::group) -> Vec<ByteString> {
    let mut members = Vec::new();
    if raw.gr_mem.is_null() {
        return members;
    }
    let mut cursor = raw.gr_mem;
    // SAFETY: the array is null-terminated per the caller's contract.
    unsafe {
        while !(*cursor).is_null() {
            members.push(ByteString::from_nul_terminated(*cursor));
            cursor = cursor.add(1);
        }
    }
    members
}

type GrLookup<'a> =
    dyn FnMut(*mut libc::group, *mut libc::c_char, usize, *mut *mut libc::group) -> i32 + 'a;

fn lookup(call: &'static str, f: &mut GrLookup<'_>) -> Result<Option<Group>> {
    let mut size = memo::group_buffer_size();
    loop {
        let mut buf = vec![0u8; size];
        // SAFETY: an all-zero group is a valid out-parameter.
        let mut grp: libc::group = unsafe { std::mem::zeroed() };
        let mut found: *mut libc::group = std::ptr::null_mut();
        match retry_errno_ret(call, || {
            f(&mut grp, buf.as_mut_ptr().cast(), size, &mut found)
        }) {
            Ok(()) => {}
            Err(err) if err.errno().is_range() => {
                // Groups with many members outgrow the memoized size.
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
        // SAFETY: the lookup populated grp; its pointers land in buf,
        // which is still alive here.
        return Ok(Some(unsafe { Group::from_raw(&grp) }));
    }
}

/// Looks a group up by name; `Ok(None)` when no such group exists.
pub fn getgrnam(name: impl AsRef<[u8]>) -> Result<Option<Group>> {
    let name = c_string("getgrnam_r", name)?;
    lookup("getgrnam_r", &mut |grp, buf, size, found| {
        // SAFETY: all pointers are valid for the call per lookup's setup.
        unsafe { libc::getgrnam_r(name.as_ptr(), grp, buf, size, found) }
    })
}

/// Looks a group up by id; `Ok(None)` when no such group exists.
pub fn getgrgid(gid: u32) -> Result<Option<Group>> {
    lookup("getgrgid_r", &mut |grp, buf, size, found| {
        // SAFETY: all pointers are valid for the call per lookup's setup.
        unsafe { libc::getgrgid_r(gid, grp, buf, size, found) }
    })
}

static GROUP_CURSOR: Mutex<()> = Mutex::new(());

/// Enumeration over the whole group database; see [`crate::pwd::Users`].
pub struct Groups {
    _guard: MutexGuard<'static, ()>,
}

impl Groups {
    pub fn new() -> Result<Self> {
        let guard = GROUP_CURSOR.lock();
        // SAFETY: setgrent has no preconditions.
        retry_void("setgrent", || unsafe { libc::setgrent() })?;
        Ok(Self { _guard: guard })
    }

    /// Reads the next entry; `Ok(None)` when the database is exhausted.
    pub fn next_entry(&mut self) -> Result<Option<Group>> {
        // SAFETY: the cursor is held by this iterator.
        let entry = retry_nullable("getgrent", || unsafe { libc::getgrent() })?;
        match entry {
            None => Ok(None),
            // SAFETY: getgrent returns a valid record pointer, stable
            // until the next call on this cursor; we copy out here.
            Some(entry) => Ok(Some(unsafe { Group::from_raw(entry.as_ref()) })),
        }
    }
}

impl Iterator for Groups {
    type Item = Result<Group>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry().transpose()
    }
}

impl Drop for Groups {
    fn drop(&mut self) {
        // SAFETY: endgrent has no preconditions.
        unsafe { libc::endgrent() };
    }
}
