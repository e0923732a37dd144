//! Command-line stat/directory-listing tool.
//!
//! `fsdump -f <path>` emits one file record; `fsdump -d <path>` emits one
//! name-prefixed record per directory entry. Output goes to stdout in the
//! delimited format described in [`sysbridge_fsdump::record`]. On failure
//! nothing is printed and the raw errno becomes the exit status; invalid
//! arguments exit with status 1.

use std::io::Write;
use std::os::unix::ffi::OsStrExt;
use std::process::ExitCode;

use sysbridge_fsdump::record;

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<std::ffi::OsString> = std::env::args_os().collect();
    if args.len() != 3 {
        eprintln!("Invalid argument");
        return ExitCode::from(1);
    }
    let path = args[2].as_bytes();

    // Records are buffered so a failing invocation prints nothing at all.
    let mut buf = Vec::new();
    let result = match args[1].to_str() {
        Some("-f") => record::write_file_record(&mut buf, path),
        Some("-d") => record::write_directory_records(&mut buf, path),
        _ => {
            eprintln!("Invalid first argument, expected -f or -d");
            return ExitCode::from(1);
        }
    };

    match result {
        Ok(()) => {
            let mut stdout = std::io::stdout().lock();
            if stdout.write_all(&buf).and_then(|()| stdout.flush()).is_err() {
                return ExitCode::from(libc::EIO as u8);
            }
            ExitCode::SUCCESS
        }
        Err(err) => ExitCode::from(err.raw_os_error().unwrap_or(1) as u8),
    }
}
