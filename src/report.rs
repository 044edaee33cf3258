//! JSON report artifact for a finished run.

use crate::error::Result;
use crate::traits::ReportRenderer;
use crate::types::{CaseOutcome, ProcessedCase};
use chrono::Utc;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Report writer producing one pretty-printed JSON file per run.
#[derive(Debug, Clone)]
pub struct JsonReportWriter {
    report_dir: PathBuf,
}

#[derive(Serialize)]
struct Report<'a> {
    generated_at: String,
    total_cases: usize,
    passed: usize,
    failed: usize,
    cases: &'a [ProcessedCase],
}

impl JsonReportWriter {
    pub fn new<P: Into<PathBuf>>(report_dir: P) -> Self {
        Self {
            report_dir: report_dir.into(),
        }
    }

    fn report_path(&self) -> PathBuf {
        let stamp = Utc::now().format("%Y%m%d_%H%M%S");
        self.report_dir.join(format!("compare_report_{}.json", stamp))
    }
}

impl ReportRenderer for JsonReportWriter {
    fn write_report(&self, cases: &[ProcessedCase]) -> Result<PathBuf> {
        let passed = cases.iter().filter(|c| c.is_passed()).count();
        let report = Report {
            generated_at: Utc::now().to_rfc3339(),
            total_cases: cases.len(),
            passed,
            failed: cases.len() - passed,
            cases,
        };

        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| crate::error::FlowRegressError::general(e.to_string()))?;

        std::fs::create_dir_all(&self.report_dir)?;
        let path = self.report_path();
        std::fs::write(&path, json)?;
        Ok(path)
    }
}

/// One-line console summary per case, used by the CLI next to the artifact.
pub fn summarize(case: &ProcessedCase) -> String {
    match &case.outcome {
        CaseOutcome::Completed(messages) => {
            let mismatches = messages
                .iter()
                .filter(|m| !m.verdict.is_identical())
                .count();
            if mismatches == 0 {
                format!(
                    "{}: {} message pair(s) identical",
                    case.definition.source_flow,
                    messages.len()
                )
            } else {
                format!(
                    "{}: {} of {} message pair(s) differ",
                    case.definition.source_flow,
                    mismatches,
                    messages.len()
                )
            }
        }
        CaseOutcome::Failed(failure) => format!(
            "{}: failed at {:?} stage: {}",
            case.definition.source_flow, failure.stage, failure.message
        ),
    }
}

/// Check the report directory is usable before the run starts.
pub fn ensure_report_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    Ok(())
}
