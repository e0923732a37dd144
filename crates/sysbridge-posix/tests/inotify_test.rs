#![cfg(target_os = "linux")]

//! Integration tests for inotify watches and event decoding.

use std::os::unix::ffi::OsStrExt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use sysbridge_posix::inotify::Inotify;

static NEXT_TMP_ID: AtomicU64 = AtomicU64::new(0);

fn temp_dir(tag: &str) -> PathBuf {
    let id = NEXT_TMP_ID.fetch_add(1, Ordering::Relaxed);
    let mut path = std::env::temp_dir();
    path.push(format!(
        "sysbridge_inotify_{}_{}_{}",
        tag,
        std::process::id(),
        id
    ));
    std::fs::create_dir_all(&path).expect("temp dir should be creatable");
    path
}

#[test]
fn create_events_decode_with_their_names() {
    let dir = temp_dir("create");
    let instance = Inotify::init1(libc::IN_CLOEXEC).expect("inotify instance opens");
    let wd = instance
        .add_watch(dir.as_os_str().as_bytes(), libc::IN_CREATE | libc::IN_CLOSE_WRITE)
        .expect("watch on a directory succeeds");
    assert!(wd >= 0);

    // Queue events before reading so the blocking read returns at once.
    std::fs::write(dir.join("observed.txt"), b"x").unwrap();

    let mut buf = vec![0u8; 4096];
    let events = instance.read_events(&mut buf).expect("queued events read back");
    assert!(!events.is_empty());
    let create = events
        .iter()
        .find(|e| e.mask & libc::IN_CREATE != 0)
        .expect("the creation was observed");
    assert_eq!(create.wd, wd);
    let name = create.name.as_ref().expect("directory events carry a name");
    assert_eq!(name.as_bytes(), b"observed.txt");

    instance.remove_watch(wd).expect("watch removal succeeds");

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn watching_a_missing_path_fails_with_the_call_name() {
    let instance = Inotify::init1(libc::IN_CLOEXEC).unwrap();
    let err = instance
        .add_watch(b"/no/such/watched/path".as_slice(), libc::IN_CREATE)
        .unwrap_err();
    assert_eq!(err.raw_os_error(), libc::ENOENT);
    assert_eq!(err.call(), "inotify_add_watch");
}

#[test]
fn removing_an_unknown_watch_fails_cleanly() {
    let instance = Inotify::init1(libc::IN_CLOEXEC).unwrap();
    let err = instance.remove_watch(12345).unwrap_err();
    assert_eq!(err.raw_os_error(), libc::EINVAL);
}
