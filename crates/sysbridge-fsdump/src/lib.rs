//! Record emission for the stat/directory-listing tool.
//!
//! The `fsdump` binary is a thin argument parser over [`record`]; the
//! emitter lives in the library so the conformance harness can drive it
//! in-process.

pub mod record;
