//! Process-scoped resolve-once caches.
//!
//! Identifiers derived from the platform at runtime are resolved at most
//! once per process and memoized for its lifetime. Slots are only ever
//! set, never cleared; resolving the same identifier twice concurrently is
//! harmless because the result is deterministic.

use std::sync::OnceLock;

/// Default scratch size for the reentrant passwd/group lookups when
/// `sysconf` reports no limit. See `man 3 getpwnam`.
const FALLBACK_LOOKUP_BUFFER_SIZE: usize = 16384;

fn sysconf_size(name: libc::c_int) -> usize {
    // SAFETY: sysconf is always safe to call with any name value.
    let size = unsafe { libc::sysconf(name) };
    if size < 0 {
        FALLBACK_LOOKUP_BUFFER_SIZE
    } else {
        size as usize
    }
}

/// Scratch buffer size for `getpwnam_r`/`getpwuid_r`.
pub fn passwd_buffer_size() -> usize {
    static SIZE: OnceLock<usize> = OnceLock::new();
    *SIZE.get_or_init(|| sysconf_size(libc::_SC_GETPW_R_SIZE_MAX))
}

/// Scratch buffer size for `getgrnam_r`/`getgrgid_r`.
pub fn group_buffer_size() -> usize {
    static SIZE: OnceLock<usize> = OnceLock::new();
    *SIZE.get_or_init(|| sysconf_size(libc::_SC_GETGR_R_SIZE_MAX))
}
