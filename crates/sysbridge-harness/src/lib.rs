//! Conformance tooling for the syscall bridge.
//!
//! Fixture sets describe a filesystem layout to materialize and the
//! records the dump tool must emit over it; the runner builds the layout
//! in a scratch directory, drives the emitter in-process, parses the
//! output back with the record parser, and reports the comparison.

pub mod fixtures;
pub mod record;
pub mod report;
pub mod runner;

pub use fixtures::{DumpMode, EntryKind, ExpectedRecord, FixtureCase, FixtureSet, LayoutEntry};
pub use record::{FileRecord, ParseError};
pub use report::ConformanceReport;
pub use runner::{CaseResult, VerificationSummary, run_set};
