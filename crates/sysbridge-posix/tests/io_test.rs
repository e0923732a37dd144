#![cfg(target_os = "linux")]

//! Integration tests for descriptor-level bridge calls.

use std::fs::File;
use std::io::{Read, Seek, Write};
use std::os::fd::AsFd;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use sysbridge_posix::io;

static NEXT_TMP_ID: AtomicU64 = AtomicU64::new(0);

fn temp_path(tag: &str) -> PathBuf {
    let id = NEXT_TMP_ID.fetch_add(1, Ordering::Relaxed);
    let mut path = std::env::temp_dir();
    path.push(format!(
        "sysbridge_io_{}_{}_{}",
        tag,
        std::process::id(),
        id
    ));
    path
}

#[test]
fn open_transfers_a_usable_descriptor() {
    let path = temp_path("open");
    let fd = io::open(
        path.as_os_str().as_bytes(),
        libc::O_RDWR | libc::O_CREAT,
        0o600,
    )
    .expect("open creates the file");

    let mut file = File::from(fd);
    file.write_all(b"through the bridge").unwrap();
    file.rewind().unwrap();
    let mut back = String::new();
    file.read_to_string(&mut back).unwrap();
    assert_eq!(back, "through the bridge");

    let _ = std::fs::remove_file(path);
}

#[test]
fn open_failure_names_the_call() {
    let err = io::open(b"/no/such/file/to/open".as_slice(), libc::O_RDONLY, 0).unwrap_err();
    assert_eq!(err.raw_os_error(), libc::ENOENT);
    assert_eq!(err.call(), "open64");
}

#[test]
fn sendfile_copies_and_advances_the_offset() {
    let src_path = temp_path("sendfile_src");
    let dst_path = temp_path("sendfile_dst");
    std::fs::write(&src_path, b"0123456789").unwrap();

    let src = io::open(src_path.as_os_str().as_bytes(), libc::O_RDONLY, 0).unwrap();
    let dst = io::open(
        dst_path.as_os_str().as_bytes(),
        libc::O_RDWR | libc::O_CREAT | libc::O_TRUNC,
        0o600,
    )
    .unwrap();

    let mut offset = 2i64;
    let sent = io::sendfile(dst.as_fd(), src.as_fd(), Some(&mut offset), 5)
        .expect("sendfile succeeds between regular files");
    assert_eq!(sent, 5);
    assert_eq!(offset, 7);
    assert_eq!(std::fs::read(&dst_path).unwrap(), b"23456");

    // With an explicit offset the source position is untouched.
    let mut file = File::from(src);
    let mut all = String::new();
    file.read_to_string(&mut all).unwrap();
    assert_eq!(all, "0123456789");

    let _ = std::fs::remove_file(src_path);
    let _ = std::fs::remove_file(dst_path);
}

#[test]
fn sendfile_without_offset_moves_the_source_position() {
    let src_path = temp_path("sendfile_pos");
    let dst_path = temp_path("sendfile_pos_dst");
    std::fs::write(&src_path, b"abcdef").unwrap();

    let src = io::open(src_path.as_os_str().as_bytes(), libc::O_RDONLY, 0).unwrap();
    let dst = io::open(
        dst_path.as_os_str().as_bytes(),
        libc::O_RDWR | libc::O_CREAT | libc::O_TRUNC,
        0o600,
    )
    .unwrap();

    let sent = io::sendfile(dst.as_fd(), src.as_fd(), None, 4).unwrap();
    assert_eq!(sent, 4);
    assert_eq!(std::fs::read(&dst_path).unwrap(), b"abcd");

    let mut rest = String::new();
    File::from(src).read_to_string(&mut rest).unwrap();
    assert_eq!(rest, "ef");

    let _ = std::fs::remove_file(src_path);
    let _ = std::fs::remove_file(dst_path);
}

#[test]
fn fcntl_reads_and_updates_descriptor_flags() {
    let path = temp_path("fcntl");
    let fd = io::open(
        path.as_os_str().as_bytes(),
        libc::O_RDWR | libc::O_CREAT,
        0o600,
    )
    .unwrap();

    let flags = io::fcntl_void(fd.as_fd(), libc::F_GETFL).expect("F_GETFL succeeds");
    assert_eq!(flags & libc::O_ACCMODE, libc::O_RDWR);

    io::fcntl_int(fd.as_fd(), libc::F_SETFL, flags | libc::O_NONBLOCK)
        .expect("F_SETFL succeeds");
    let updated = io::fcntl_void(fd.as_fd(), libc::F_GETFL).unwrap();
    assert_ne!(updated & libc::O_NONBLOCK, 0);

    let _ = std::fs::remove_file(path);
}

#[test]
fn ioctl_writes_back_through_the_out_argument() {
    let (a, b) = UnixStream::pair().unwrap();
    let mut b_end = b;
    {
        let mut a_end = &a;
        a_end.write_all(b"hello").unwrap();
        a_end.flush().unwrap();
    }

    let mut pending = 0i32;
    io::ioctl_int(
        b_end.as_fd(),
        libc::FIONREAD as i32,
        Some(&mut pending),
    )
    .expect("FIONREAD succeeds on a socket");
    assert_eq!(pending, 5);

    // Drain so the pair closes cleanly.
    let mut sink = [0u8; 8];
    let _ = b_end.read(&mut sink);
}
