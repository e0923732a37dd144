//! The delimited record format.
//!
//! File record, fields separated by a single NUL byte:
//!
//! ```text
//! mode(unsigned) NUL uid(unsigned) NUL gid(unsigned) NUL size(long) NUL
//! mtime_seconds(long) NUL mtime_nanoseconds(long) NUL
//! is_symbolic_link(boolean) ( NUL link_target(string) )? NUL
//! has_owner_name(boolean) ( NUL owner_name(string) )? NUL
//! has_group_name(boolean) ( NUL group_name(string) )?
//! ```
//!
//! Directory output emits one such record per entry (skipping `.` and
//! `..`), each prefixed by the entry name and a NUL, and terminated by the
//! seven-byte record separator. Two consecutive possibly-empty fields are
//! never emitted back to back, so the separator sequence cannot occur
//! inside a record.

use std::io::{self, Write};

use sysbridge_posix::fs::{self, Stat};
use sysbridge_posix::{ByteString, Dir, grp, pwd};

/// Separator between directory records: `NUL NUL NUL \n NUL NUL NUL`.
pub const RECORD_SEPARATOR: &[u8; 7] = b"\0\0\0\n\0\0\0";

fn write_separator(out: &mut impl Write) -> io::Result<()> {
    out.write_all(b"\0")
}

fn write_bool(out: &mut impl Write, value: bool) -> io::Result<()> {
    out.write_all(if value { b"1" } else { b"0" })
}

fn write_unsigned(out: &mut impl Write, value: u32) -> io::Result<()> {
    write!(out, "{value}")
}

fn write_long(out: &mut impl Write, value: i64) -> io::Result<()> {
    write!(out, "{value}")
}

/// Emits one file record for `path`.
///
/// A symbolic link is reported with its target; when the target is
/// missing, the remaining fields fall back to describing the link itself.
/// Owner and group names are optional lookups whose absence is encoded in
/// the preceding flag field, not as an empty name.
pub fn write_file_record(out: &mut impl Write, path: &[u8]) -> io::Result<()> {
    let link_stat = fs::lstat(path)?;
    let is_symlink = link_stat.is_symlink();
    let mut link_target: Option<ByteString> = None;
    let mut target_stat: Option<Stat> = None;
    if is_symlink {
        link_target = Some(fs::readlink(path)?);
        target_stat = fs::stat(path).ok();
    }
    let stat = target_stat.as_ref().unwrap_or(&link_stat);

    let owner_name = pwd::getpwuid(stat.uid).ok().flatten().and_then(|p| p.name);
    let group_name = grp::getgrgid(stat.gid).ok().flatten().and_then(|g| g.name);

    write_unsigned(out, stat.mode)?;
    write_separator(out)?;
    write_unsigned(out, stat.uid)?;
    write_separator(out)?;
    write_unsigned(out, stat.gid)?;
    write_separator(out)?;
    write_long(out, stat.size)?;
    write_separator(out)?;
    write_long(out, stat.mtime.sec)?;
    write_separator(out)?;
    write_long(out, stat.mtime.nsec)?;
    write_separator(out)?;
    write_bool(out, is_symlink)?;
    if let Some(target) = link_target {
        write_separator(out)?;
        out.write_all(target.as_bytes())?;
    }
    write_separator(out)?;
    write_bool(out, owner_name.is_some())?;
    if let Some(name) = owner_name {
        write_separator(out)?;
        out.write_all(name.as_bytes())?;
    }
    write_separator(out)?;
    write_bool(out, group_name.is_some())?;
    if let Some(name) = group_name {
        write_separator(out)?;
        out.write_all(name.as_bytes())?;
    }
    Ok(())
}

/// Emits one name-prefixed record per directory entry, skipping `.` and
/// `..`, each terminated by [`RECORD_SEPARATOR`].
///
/// An entry whose own record fails to emit still occupies its record slot
/// with the name alone, so one unreadable child does not abort the
/// listing.
pub fn write_directory_records(out: &mut impl Write, path: &[u8]) -> io::Result<()> {
    let mut dir = Dir::open(path)?;
    while let Some(entry) = dir.read()? {
        if entry.is_dot() {
            continue;
        }
        out.write_all(entry.name.as_bytes())?;
        write_separator(out)?;
        let child = join(path, entry.name.as_bytes());
        if let Err(err) = write_file_record(out, &child) {
            log::debug!(
                "skipping record body for {}: {err}",
                String::from_utf8_lossy(&child)
            );
        }
        out.write_all(RECORD_SEPARATOR)?;
    }
    Ok(())
}

fn join(dir: &[u8], name: &[u8]) -> Vec<u8> {
    let mut path = Vec::with_capacity(dir.len() + name.len() + 1);
    path.extend_from_slice(dir);
    if !dir.ends_with(b"/") {
        path.push(b'/');
    }
    path.extend_from_slice(name);
    path
}
