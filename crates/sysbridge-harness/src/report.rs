//! Report generation for conformance results.

use serde::{Deserialize, Serialize};

use crate::runner::VerificationSummary;

/// A conformance report over one harness run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConformanceReport {
    /// Report title.
    pub title: String,
    /// Timestamp (UTC).
    pub timestamp: String,
    /// Verification summary.
    pub summary: VerificationSummary,
}

impl ConformanceReport {
    /// Render the report as markdown.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# {}\n\n", self.title));
        out.push_str(&format!("- Timestamp: {}\n", self.timestamp));
        out.push_str(&format!("- Total: {}\n", self.summary.total));
        out.push_str(&format!("- Passed: {}\n", self.summary.passed));
        out.push_str(&format!("- Failed: {}\n\n", self.summary.failed));

        out.push_str("| Set | Case | Status | Detail |\n");
        out.push_str("|-----|------|--------|--------|\n");
        for result in &self.summary.results {
            let status = if result.passed { "PASS" } else { "FAIL" };
            out.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                result.set_name,
                result.case_name,
                status,
                result.detail.as_deref().unwrap_or("")
            ));
        }
        out
    }

    /// Render the report as JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::CaseResult;

    #[test]
    fn markdown_lists_every_case() {
        let report = ConformanceReport {
            title: String::from("sysbridge conformance"),
            timestamp: String::from("2026-01-01T00:00:00Z"),
            summary: VerificationSummary::from_results(vec![
                CaseResult {
                    set_name: String::from("smoke"),
                    case_name: String::from("single_file"),
                    passed: true,
                    detail: None,
                },
                CaseResult {
                    set_name: String::from("smoke"),
                    case_name: String::from("directory"),
                    passed: false,
                    detail: Some(String::from("size was 0, expected 64")),
                },
            ]),
        };

        let markdown = report.to_markdown();
        assert!(markdown.contains("| smoke | single_file | PASS |"));
        assert!(markdown.contains("| smoke | directory | FAIL | size was 0, expected 64 |"));
        assert!(markdown.contains("- Failed: 1"));

        let json = report.to_json();
        assert!(json.contains("\"single_file\""));
    }
}
