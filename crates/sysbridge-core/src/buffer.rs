//! Growable-buffer fetch loops for size-probed native calls.
//!
//! Some calls report their result size through a probe (`lgetxattr`,
//! `llistxattr` with a zero-size buffer) or only reveal truncation by
//! filling the buffer completely (`readlink`). Both loops here retry until
//! the content fits; truncated content is never returned. A probe result
//! can go stale if the value changes concurrently (the undersize race), in
//! which case the whole probe-allocate-fetch sequence reruns with a doubled
//! floor instead of trusting the previously learned size.

use crate::error::Result;
use crate::retry::retry_ret;

/// Fetches a value whose size is learned from a zero-size probe.
///
/// `f(buf, size)` issues the native call with the given buffer and returns
/// its raw result; `f(null, 0)` is the size probe. An `ERANGE` failure or a
/// result larger than the allocation restarts the sequence.
pub fn fetch_probed(
    call: &'static str,
    mut f: impl FnMut(*mut u8, usize) -> isize,
) -> Result<Vec<u8>> {
    let mut floor = 0usize;
    loop {
        let probed = retry_ret(call, || f(std::ptr::null_mut(), 0))? as usize;
        let size = probed.max(floor);
        let mut buf = vec![0u8; size];
        match retry_ret(call, || f(buf.as_mut_ptr(), size)) {
            Ok(written) => {
                let written = written as usize;
                if written > size {
                    // Value grew between the probe and the fetch.
                    log::debug!("{call}: undersize race, retrying with a larger buffer");
                    floor = written.max(size.saturating_mul(2)).max(1);
                    continue;
                }
                buf.truncate(written);
                return Ok(buf);
            }
            Err(err) if err.errno().is_range() => {
                log::debug!("{call}: undersize race, retrying with a larger buffer");
                floor = size.saturating_mul(2).max(1);
            }
            Err(err) => return Err(err),
        }
    }
}

/// Fetches into a buffer that starts from an estimate and doubles whenever
/// the call fills it completely, so the content is never truncated.
pub fn fetch_doubling(
    call: &'static str,
    initial: usize,
    mut f: impl FnMut(*mut u8, usize) -> isize,
) -> Result<Vec<u8>> {
    let mut capacity = initial.max(1);
    loop {
        let mut buf = vec![0u8; capacity];
        let written = retry_ret(call, || f(buf.as_mut_ptr(), capacity))? as usize;
        if written >= capacity {
            capacity *= 2;
            continue;
        }
        buf.truncate(written);
        return Ok(buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errno::Errno;

    #[test]
    fn probed_fetch_returns_exact_content() {
        let value = b"user-data";
        let result = fetch_probed("lgetxattr", |buf, size| {
            if size == 0 {
                return value.len() as isize;
            }
            assert!(size >= value.len());
            // SAFETY: test closure writes within the provided buffer.
            unsafe { std::ptr::copy_nonoverlapping(value.as_ptr(), buf, value.len()) };
            value.len() as isize
        })
        .expect("fetch should succeed");
        assert_eq!(result, value);
    }

    #[test]
    fn probed_fetch_handles_zero_length_value() {
        let result =
            fetch_probed("lgetxattr", |_, _| 0).expect("zero-length value is valid");
        assert!(result.is_empty());
    }

    #[test]
    fn probed_fetch_survives_the_undersize_race() {
        // The value grows from 4 to 11 bytes between the probe and the
        // fetch; the first fetch reports ERANGE and the sequence reruns.
        let grown = b"grown-value";
        let mut calls = 0;
        let result = fetch_probed("lgetxattr", |buf, size| {
            calls += 1;
            match calls {
                1 => 4,
                2 => {
                    assert_eq!(size, 4);
                    Errno(libc::ERANGE).set();
                    -1
                }
                3 => grown.len() as isize,
                _ => {
                    assert!(size >= grown.len());
                    // SAFETY: test closure writes within the provided buffer.
                    unsafe { std::ptr::copy_nonoverlapping(grown.as_ptr(), buf, grown.len()) };
                    grown.len() as isize
                }
            }
        })
        .expect("the race must resolve to complete content");
        assert_eq!(result, grown);
        assert_eq!(calls, 4);
    }

    #[test]
    fn probed_fetch_propagates_real_failures() {
        let err = fetch_probed("lgetxattr", |_, _| {
            Errno(libc::ENODATA).set();
            -1
        })
        .unwrap_err();
        assert_eq!(err.raw_os_error(), libc::ENODATA);
    }

    #[test]
    fn doubling_fetch_never_truncates() {
        let target: Vec<u8> = (0..600u16).map(|i| (i % 251) as u8).collect();
        let result = fetch_doubling("readlink", 16, |buf, size| {
            let n = target.len().min(size);
            // SAFETY: test closure writes within the provided buffer.
            unsafe { std::ptr::copy_nonoverlapping(target.as_ptr(), buf, n) };
            n as isize
        })
        .expect("fetch should succeed");
        assert_eq!(result, target);
    }

    #[test]
    fn doubling_fetch_retries_interruptions() {
        let mut attempts = 0;
        let result = fetch_doubling("readlink", 64, |buf, _| {
            attempts += 1;
            if attempts < 3 {
                Errno(libc::EINTR).set();
                return -1;
            }
            // SAFETY: test closure writes within the provided buffer.
            unsafe { *buf = b'x' };
            1
        })
        .expect("interruption retries until resolved");
        assert_eq!(result, b"x");
        assert_eq!(attempts, 3);
    }
}
