//! CLI entrypoint for the sysbridge conformance harness.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Conformance tooling for the syscall bridge.
#[derive(Debug, Parser)]
#[command(name = "sysbridge-harness")]
#[command(about = "Conformance harness for the syscall bridge record format")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Verify the dump tool against fixture files.
    Verify {
        /// Directory containing fixture JSON files.
        #[arg(long)]
        fixture: PathBuf,
        /// Scratch directory for materialized layouts (a temp dir by default).
        #[arg(long)]
        scratch: Option<PathBuf>,
        /// Output report path (markdown; a JSON sibling is written too).
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Verify {
            fixture,
            scratch,
            report,
        } => {
            let mut fixture_sets = Vec::new();
            for entry in std::fs::read_dir(&fixture)? {
                let path = entry?.path();
                if path.extension().and_then(|s| s.to_str()) != Some("json") {
                    continue;
                }
                match sysbridge_harness::FixtureSet::from_file(&path) {
                    Ok(set) => fixture_sets.push(set),
                    Err(err) => eprintln!("Skipping {}: {}", path.display(), err),
                }
            }
            if fixture_sets.is_empty() {
                return Err(format!("No fixture JSON files found in {}", fixture.display()).into());
            }

            let scratch = scratch.unwrap_or_else(|| {
                std::env::temp_dir().join(format!("sysbridge_harness_{}", std::process::id()))
            });
            std::fs::create_dir_all(&scratch)?;

            let mut results = Vec::new();
            for set in &fixture_sets {
                results.extend(sysbridge_harness::run_set(set, &scratch).results);
            }
            let summary = sysbridge_harness::VerificationSummary::from_results(results);

            eprintln!(
                "Verification complete: total={}, passed={}, failed={}",
                summary.total, summary.passed, summary.failed
            );
            for result in summary.results.iter().filter(|r| !r.passed) {
                eprintln!(
                    "FAIL {}/{}: {}",
                    result.set_name,
                    result.case_name,
                    result.detail.as_deref().unwrap_or("no detail")
                );
            }

            let report_doc = sysbridge_harness::ConformanceReport {
                title: String::from("sysbridge Conformance Report"),
                timestamp: format!("{:?}", std::time::SystemTime::now()),
                summary,
            };
            if let Some(report_path) = report {
                std::fs::write(&report_path, report_doc.to_markdown())?;
                let json_path = report_path.with_extension("json");
                std::fs::write(&json_path, report_doc.to_json())?;
            }

            if !report_doc.summary.all_passed() {
                return Err("Conformance verification failed".into());
            }
        }
    }
    Ok(())
}
