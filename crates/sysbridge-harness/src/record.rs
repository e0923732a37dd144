//! Parser for the delimited record format.
//!
//! The inverse of `sysbridge_fsdump::record`: host-side consumers read
//! NUL-separated fields positionally, with optional fields gated by the
//! flag field that precedes them.

use sysbridge_fsdump::record::RECORD_SEPARATOR;
use thiserror::Error;

/// A parsed file record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub size: i64,
    pub mtime_sec: i64,
    pub mtime_nsec: i64,
    pub is_symlink: bool,
    pub link_target: Option<Vec<u8>>,
    pub owner_name: Option<Vec<u8>>,
    pub group_name: Option<Vec<u8>>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("record ended before the {0} field")]
    UnexpectedEnd(&'static str),
    #[error("field {0} is not a decimal number")]
    BadNumber(&'static str),
    #[error("field {0} is not a boolean flag")]
    BadFlag(&'static str),
    #[error("trailing bytes after the last field")]
    TrailingBytes,
}

struct Fields<'a> {
    rest: Option<&'a [u8]>,
}

impl<'a> Fields<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { rest: Some(bytes) }
    }

    fn next(&mut self, what: &'static str) -> Result<&'a [u8], ParseError> {
        let rest = self.rest.ok_or(ParseError::UnexpectedEnd(what))?;
        match rest.iter().position(|&b| b == 0) {
            Some(at) => {
                self.rest = Some(&rest[at + 1..]);
                Ok(&rest[..at])
            }
            None => {
                self.rest = None;
                Ok(rest)
            }
        }
    }

    fn number<T: std::str::FromStr>(&mut self, what: &'static str) -> Result<T, ParseError> {
        let field = self.next(what)?;
        std::str::from_utf8(field)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or(ParseError::BadNumber(what))
    }

    fn flag(&mut self, what: &'static str) -> Result<bool, ParseError> {
        match self.next(what)? {
            b"1" => Ok(true),
            b"0" => Ok(false),
            _ => Err(ParseError::BadFlag(what)),
        }
    }

    fn finish(self) -> Result<(), ParseError> {
        match self.rest {
            None | Some(b"") => Ok(()),
            Some(_) => Err(ParseError::TrailingBytes),
        }
    }
}

/// Parses a single file record (the `-f` output).
pub fn parse_file_record(bytes: &[u8]) -> Result<FileRecord, ParseError> {
    let mut fields = Fields::new(bytes);
    let mode = fields.number("mode")?;
    let uid = fields.number("uid")?;
    let gid = fields.number("gid")?;
    let size = fields.number("size")?;
    let mtime_sec = fields.number("mtime_sec")?;
    let mtime_nsec = fields.number("mtime_nsec")?;
    let is_symlink = fields.flag("is_symlink")?;
    let link_target = if is_symlink {
        Some(fields.next("link_target")?.to_vec())
    } else {
        None
    };
    let owner_name = if fields.flag("has_owner_name")? {
        Some(fields.next("owner_name")?.to_vec())
    } else {
        None
    };
    let group_name = if fields.flag("has_group_name")? {
        Some(fields.next("group_name")?.to_vec())
    } else {
        None
    };
    fields.finish()?;
    Ok(FileRecord {
        mode,
        uid,
        gid,
        size,
        mtime_sec,
        mtime_nsec,
        is_symlink,
        link_target,
        owner_name,
        group_name,
    })
}

/// Parses directory output (the `-d` output) into name-keyed records.
///
/// An entry whose record body could not be emitted parses to `None`.
pub fn parse_directory(bytes: &[u8]) -> Result<Vec<(Vec<u8>, Option<FileRecord>)>, ParseError> {
    let mut entries = Vec::new();
    for chunk in split_on_separator(bytes) {
        let name_end = chunk
            .iter()
            .position(|&b| b == 0)
            .ok_or(ParseError::UnexpectedEnd("entry name"))?;
        let name = chunk[..name_end].to_vec();
        let body = &chunk[name_end + 1..];
        let record = if body.is_empty() {
            None
        } else {
            Some(parse_file_record(body)?)
        };
        entries.push((name, record));
    }
    Ok(entries)
}

fn split_on_separator(bytes: &[u8]) -> Vec<&[u8]> {
    let mut chunks = Vec::new();
    let mut rest = bytes;
    while let Some(at) = rest
        .windows(RECORD_SEPARATOR.len())
        .position(|window| window == RECORD_SEPARATOR)
    {
        chunks.push(&rest[..at]);
        rest = &rest[at + RECORD_SEPARATOR.len()..];
    }
    if !rest.is_empty() {
        chunks.push(rest);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(fields: &[&[u8]]) -> Vec<u8> {
        fields.join(&0u8)
    }

    #[test]
    fn parses_a_regular_file_record() {
        let bytes = rec(&[
            b"33188",
            b"1000",
            b"1000",
            b"1024",
            b"1700000000",
            b"123456789",
            b"0",
            b"1",
            b"alice",
            b"1",
            b"users",
        ]);
        let record = parse_file_record(&bytes).expect("well-formed record parses");
        assert_eq!(record.mode, 33188);
        assert_eq!(record.uid, 1000);
        assert_eq!(record.size, 1024);
        assert_eq!(record.mtime_sec, 1_700_000_000);
        assert_eq!(record.mtime_nsec, 123_456_789);
        assert!(!record.is_symlink);
        assert_eq!(record.link_target, None);
        assert_eq!(record.owner_name, Some(b"alice".to_vec()));
        assert_eq!(record.group_name, Some(b"users".to_vec()));
    }

    #[test]
    fn parses_a_symlink_record_without_names() {
        let bytes = rec(&[
            b"41471", b"0", b"0", b"5", b"1", b"2", b"1", b"dst/x", b"0", b"0",
        ]);
        let record = parse_file_record(&bytes).expect("well-formed record parses");
        assert!(record.is_symlink);
        assert_eq!(record.link_target, Some(b"dst/x".to_vec()));
        assert_eq!(record.owner_name, None);
        assert_eq!(record.group_name, None);
    }

    #[test]
    fn absent_names_stay_distinct_from_empty_names() {
        let absent = rec(&[b"1", b"0", b"0", b"0", b"0", b"0", b"0", b"0", b"0"]);
        let absent = parse_file_record(&absent).unwrap();
        assert_eq!(absent.owner_name, None);

        let empty = rec(&[b"1", b"0", b"0", b"0", b"0", b"0", b"0", b"1", b"", b"0"]);
        let empty = parse_file_record(&empty).unwrap();
        assert_eq!(empty.owner_name, Some(Vec::new()));
    }

    #[test]
    fn truncated_records_name_the_missing_field() {
        let err = parse_file_record(b"33188").unwrap_err();
        assert_eq!(err, ParseError::UnexpectedEnd("uid"));

        let err = parse_file_record(b"not-a-number").unwrap_err();
        assert_eq!(err, ParseError::BadNumber("mode"));
    }

    #[test]
    fn directory_output_splits_per_entry() {
        let body = rec(&[b"1", b"0", b"0", b"0", b"0", b"0", b"0", b"0", b"0"]);
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"plain\0");
        bytes.extend_from_slice(&body);
        bytes.extend_from_slice(RECORD_SEPARATOR);
        bytes.extend_from_slice(b"broken\0");
        bytes.extend_from_slice(RECORD_SEPARATOR);

        let entries = parse_directory(&bytes).expect("directory output parses");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, b"plain".to_vec());
        assert!(entries[0].1.is_some());
        assert_eq!(entries[1].0, b"broken".to_vec());
        assert!(entries[1].1.is_none(), "a failed record body parses to None");
    }

    #[test]
    fn empty_directory_output_has_no_entries() {
        assert!(parse_directory(b"").unwrap().is_empty());
    }
}
