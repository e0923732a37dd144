//! Fixture loading and management.

use serde::{Deserialize, Serialize};

/// A collection of fixture cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSet {
    /// Schema version.
    pub version: String,
    /// Set name, shown in reports.
    pub name: String,
    /// Individual test cases.
    pub cases: Vec<FixtureCase>,
}

/// One fixture case: a layout to materialize and the expected records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureCase {
    /// Case identifier.
    pub name: String,
    /// Whether the dump runs in file or directory mode.
    pub mode: DumpMode,
    /// Path the dump targets, relative to the scratch root.
    pub target: String,
    /// Entries to create under the scratch root before the dump.
    pub layout: Vec<LayoutEntry>,
    /// Records the dump must produce.
    #[serde(default)]
    pub expect: Vec<ExpectedRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DumpMode {
    File,
    Directory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutEntry {
    /// Path relative to the scratch root.
    pub path: String,
    pub kind: EntryKind,
    /// File size in bytes; files are filled with zero bytes.
    #[serde(default)]
    pub size: u64,
    /// Symlink target, for `symlink` entries.
    #[serde(default)]
    pub target: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
}

/// The observable shape one emitted record must match. Unset fields are
/// not compared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedRecord {
    /// Entry name, present for directory-mode records.
    #[serde(default)]
    pub name: Option<String>,
    pub is_symlink: bool,
    #[serde(default)]
    pub size: Option<i64>,
    #[serde(default)]
    pub link_target: Option<String>,
}

impl FixtureSet {
    /// Load a fixture set from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the fixture set to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load a fixture set from a file path.
    pub fn from_file(path: &std::path::Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }
}
