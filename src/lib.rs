//! flow-regress - regression testing of message-based integration flows.
//!
//! For each configured test case the pipeline injects payload files into an
//! external integration middleware, waits for asynchronous processing,
//! retrieves the terminal payloads through the middleware's lookup interface
//! and compares them against their expected counterparts, producing a
//! pass/fail report per case.

// Core modules
pub mod config;
pub mod error;
pub mod types;

// Pipeline stages
pub mod extract;
pub mod inject;
pub mod runner;

// Collaborator seams and shipped defaults
pub mod compare;
pub mod http;
pub mod report;
pub mod traits;

// Shared utility modules
pub mod workspace;

// Test support
pub mod testing;

// Re-export main types for convenience
pub use config::{
    CaseDefinition, CompareType, FlowDescriptor, QualityOfService, RegressionConfig, RunConfig,
};
pub use error::{FlowRegressError, Result};
pub use http::XiHttpClient;
pub use runner::CaseOrchestrator;
pub use traits::{MiddlewareClient, PayloadComparator, ReportRenderer};
pub use types::{
    CaseFailure, CaseOutcome, CompareVerdict, ComparedMessage, MessageOrigin, MessageStatus,
    ProcessedCase,
};

use crate::compare::ByteComparator;
use crate::report::JsonReportWriter;
use std::path::{Path, PathBuf};

/// Run the whole regression suite with the shipped client, comparator and
/// report writer. Returns the processed cases and the report artifact location.
pub async fn run_regression<P: AsRef<Path>>(
    flow_overview: P,
    comparison_overview: P,
) -> Result<(Vec<ProcessedCase>, PathBuf)> {
    let config = RegressionConfig::load(flow_overview, comparison_overview)?;
    report::ensure_report_dir(&config.run.report_dir)?;

    let client = XiHttpClient::new(config.run.clone())?;
    let writer = JsonReportWriter::new(config.run.report_dir.clone());

    let orchestrator = CaseOrchestrator::new(config, client, ByteComparator::new())?;

    // Ctrl-C during the post-injection wait fails the waiting case with a
    // FIRST/LAST warning instead of killing the whole run.
    let interrupt = orchestrator.interrupt_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.notify_one();
        }
    });

    let cases = orchestrator.run().await;

    let report_path = writer.write_report(&cases)?;
    Ok((cases, report_path))
}
