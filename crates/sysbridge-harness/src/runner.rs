//! Fixture execution: materialize, emit, parse, compare.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::fixtures::{DumpMode, EntryKind, ExpectedRecord, FixtureCase, FixtureSet};
use crate::record::{self, FileRecord};

/// Outcome of one fixture case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseResult {
    pub set_name: String,
    pub case_name: String,
    pub passed: bool,
    /// Mismatch description when the case failed.
    #[serde(default)]
    pub detail: Option<String>,
}

/// Aggregated outcomes across fixture sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub results: Vec<CaseResult>,
}

impl VerificationSummary {
    pub fn from_results(results: Vec<CaseResult>) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        Self {
            total,
            passed,
            failed: total - passed,
            results,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Runs every case of a fixture set inside `scratch`, one subdirectory
/// per case.
pub fn run_set(set: &FixtureSet, scratch: &Path) -> VerificationSummary {
    let mut results = Vec::new();
    for case in &set.cases {
        let case_dir = scratch.join(&case.name);
        let outcome = run_case(case, &case_dir);
        results.push(CaseResult {
            set_name: set.name.clone(),
            case_name: case.name.clone(),
            passed: outcome.is_ok(),
            detail: outcome.err(),
        });
    }
    VerificationSummary::from_results(results)
}

fn run_case(case: &FixtureCase, dir: &Path) -> Result<(), String> {
    materialize(case, dir)?;
    let target = dir.join(&case.target);
    let target = target.as_os_str().as_encoded_bytes();

    let mut out = Vec::new();
    match case.mode {
        DumpMode::File => {
            sysbridge_fsdump::record::write_file_record(&mut out, target)
                .map_err(|err| format!("emission failed: {err}"))?;
            let parsed =
                record::parse_file_record(&out).map_err(|err| format!("parse failed: {err}"))?;
            let [expected] = case.expect.as_slice() else {
                return Err(format!(
                    "file mode expects exactly one record, fixture lists {}",
                    case.expect.len()
                ));
            };
            compare(expected, None, &parsed)
        }
        DumpMode::Directory => {
            sysbridge_fsdump::record::write_directory_records(&mut out, target)
                .map_err(|err| format!("emission failed: {err}"))?;
            let entries =
                record::parse_directory(&out).map_err(|err| format!("parse failed: {err}"))?;
            if entries.len() != case.expect.len() {
                return Err(format!(
                    "expected {} records, dump produced {}",
                    case.expect.len(),
                    entries.len()
                ));
            }
            for expected in &case.expect {
                let name = expected
                    .name
                    .as_ref()
                    .ok_or_else(|| String::from("directory expectations must carry a name"))?;
                let (entry_name, parsed) = entries
                    .iter()
                    .find(|(entry_name, _)| entry_name == name.as_bytes())
                    .ok_or_else(|| format!("no record named {name}"))?;
                let parsed = parsed
                    .as_ref()
                    .ok_or_else(|| format!("record {name} has no body"))?;
                compare(expected, Some(entry_name.as_slice()), parsed)?;
            }
            Ok(())
        }
    }
}

fn materialize(case: &FixtureCase, dir: &Path) -> Result<(), String> {
    std::fs::create_dir_all(dir).map_err(|err| format!("scratch dir: {err}"))?;
    for entry in &case.layout {
        let path = dir.join(&entry.path);
        match entry.kind {
            EntryKind::Dir => {
                std::fs::create_dir_all(&path).map_err(|err| format!("{}: {err}", entry.path))?;
            }
            EntryKind::File => {
                std::fs::write(&path, vec![0u8; entry.size as usize])
                    .map_err(|err| format!("{}: {err}", entry.path))?;
            }
            EntryKind::Symlink => {
                let target = entry
                    .target
                    .as_ref()
                    .ok_or_else(|| format!("{}: symlink entry without target", entry.path))?;
                std::os::unix::fs::symlink(target, &path)
                    .map_err(|err| format!("{}: {err}", entry.path))?;
            }
        }
    }
    Ok(())
}

fn compare(
    expected: &ExpectedRecord,
    name: Option<&[u8]>,
    parsed: &FileRecord,
) -> Result<(), String> {
    let label = name
        .map(|n| String::from_utf8_lossy(n).into_owned())
        .unwrap_or_else(|| String::from("record"));
    if parsed.is_symlink != expected.is_symlink {
        return Err(format!(
            "{label}: is_symlink was {}, expected {}",
            parsed.is_symlink, expected.is_symlink
        ));
    }
    if let Some(size) = expected.size {
        if parsed.size != size {
            return Err(format!(
                "{label}: size was {}, expected {size}",
                parsed.size
            ));
        }
    }
    if let Some(target) = &expected.link_target {
        if parsed.link_target.as_deref() != Some(target.as_bytes()) {
            return Err(format!("{label}: link target mismatch"));
        }
    }
    Ok(())
}
