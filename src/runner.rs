//! Case orchestrator: sequences housekeeping, injection, wait, extraction and
//! comparison per case, isolating failures at the case boundary.
//!
//! Cases run strictly one after another, and files within a case strictly in
//! sorted order. One failing case never prevents the remaining cases from
//! running or reporting; only configuration errors abort the run, and those
//! are raised before the first case starts.

use crate::config::{
    CaseDefinition, CompareType, FlowDescriptor, QualityOfService, RegressionConfig, RunConfig,
};
use crate::error::{FlowRegressError, Result};
use crate::extract::extract_final;
use crate::inject::{generate_message_id, generate_queue_id, inject_file};
use crate::traits::{MiddlewareClient, PayloadComparator};
use crate::types::{
    CaseOutcome, ComparedMessage, ExtractedMessage, InjectedMessage, MessageOrigin, ProcessedCase,
};
use crate::workspace::Workspace;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{info, warn};

/// Sequences the regression pipeline across all configured cases.
pub struct CaseOrchestrator<C, P>
where
    C: MiddlewareClient,
    P: PayloadComparator,
{
    run: RunConfig,
    cases: Vec<(CaseDefinition, FlowDescriptor)>,
    workspace: Workspace,
    client: C,
    comparator: P,
    interrupt: Arc<Notify>,
}

impl<C, P> CaseOrchestrator<C, P>
where
    C: MiddlewareClient,
    P: PayloadComparator,
{
    /// Pair every case with its flow descriptor up front. Configuration
    /// validation already guarantees the references resolve, so a failure
    /// here is the same fatal `UnknownFlow` the loader would have raised.
    pub fn new(config: RegressionConfig, client: C, comparator: P) -> Result<Self> {
        let mut cases = Vec::with_capacity(config.cases.len());
        for case in &config.cases {
            let flow = config.resolve_flow(&case.source_flow, &case.label())?.clone();
            cases.push((case.clone(), flow));
        }

        let workspace = Workspace::new(config.run.test_case_root.clone());
        Ok(Self {
            run: config.run,
            cases,
            workspace,
            client,
            comparator,
            interrupt: Arc::new(Notify::new()),
        })
    }

    /// Handle that aborts the post-injection wait of the case currently
    /// waiting. The caller decides what triggers it (typically Ctrl-C).
    pub fn interrupt_handle(&self) -> Arc<Notify> {
        Arc::clone(&self.interrupt)
    }

    /// Run every configured case in order. Each returned case carries either
    /// its comparison results or the failure that stopped it.
    pub async fn run(&self) -> Vec<ProcessedCase> {
        let mut processed = Vec::with_capacity(self.cases.len());

        for (case, flow) in &self.cases {
            info!(flow = %case.source_flow, compare_type = ?case.compare_type, "processing case");

            let outcome = match self.process_case(case, flow).await {
                Ok(messages) => CaseOutcome::Completed(messages),
                Err(e) => {
                    warn!(flow = %case.source_flow, error = %e, "case failed");
                    CaseOutcome::Failed(e.into())
                }
            };

            processed.push(ProcessedCase {
                definition: case.clone(),
                outcome,
            });
        }

        processed
    }

    async fn process_case(
        &self,
        case: &CaseDefinition,
        flow: &FlowDescriptor,
    ) -> Result<Vec<ComparedMessage>> {
        self.housekeeping(case)?;

        let injected = self.run_injection(case, flow).await?;

        info!(
            flow = %case.source_flow,
            seconds = case.wait_before_extract,
            "waiting before extraction of LAST messages"
        );
        wait_for_processing(case.wait_before_extract, &self.interrupt).await?;

        let extracted = self.run_extraction(case, flow, injected).await?;
        self.run_comparison(case, extracted)
    }

    /// Delete stale artifacts of a previous run so they cannot be mistaken for
    /// fresh results. Flow-to-file keeps its target output directory: those
    /// files are the expected results.
    fn housekeeping(&self, case: &CaseDefinition) -> Result<()> {
        self.workspace.clear_dir(&case.source_path_out)?;
        if case.compare_type == CompareType::FlowToFlow {
            self.workspace.clear_dir(&case.target_path_out)?;
        }
        Ok(())
    }

    async fn run_injection(
        &self,
        case: &CaseDefinition,
        flow: &FlowDescriptor,
    ) -> Result<Vec<InjectedMessage>> {
        let queue_id = match flow.quality_of_service {
            QualityOfService::Eoio => Some(generate_queue_id()),
            QualityOfService::Eo => None,
        };

        let source_files = self.workspace.list_files(&case.source_path_in)?;
        let target_suffix = match case.compare_type {
            CompareType::FlowToFlow => &case.target_path_in,
            CompareType::FlowToFile => &case.target_path_out,
        };
        let target_files = self.workspace.list_files(target_suffix)?;

        if source_files.len() != target_files.len() {
            return Err(FlowRegressError::FileCountMismatch {
                case: case.source_flow.clone(),
                source_count: source_files.len(),
                target_count: target_files.len(),
            });
        }

        let mut records = Vec::with_capacity(source_files.len());
        for (source_path, target_path) in source_files.iter().zip(target_files.iter()) {
            let source_id = generate_message_id();
            inject_file(
                &self.client,
                &self.run,
                flow,
                queue_id.as_deref(),
                &source_id,
                source_path,
            )
            .await?;

            let (target_id, target_injected) = match case.compare_type {
                CompareType::FlowToFlow => {
                    let target_id = generate_message_id();
                    inject_file(
                        &self.client,
                        &self.run,
                        flow,
                        queue_id.as_deref(),
                        &target_id,
                        target_path,
                    )
                    .await?;
                    (target_id, true)
                }
                // The pre-computed expected file is the correlation key itself.
                CompareType::FlowToFile => (file_name(target_path)?, false),
            };

            records.push(InjectedMessage {
                source_id,
                target_id,
                target_injected,
                source_file_name: file_name(source_path)?,
                target_file_name: file_name(target_path)?,
            });
        }

        Ok(records)
    }

    async fn run_extraction(
        &self,
        case: &CaseDefinition,
        flow: &FlowDescriptor,
        injected: Vec<InjectedMessage>,
    ) -> Result<Vec<ExtractedMessage>> {
        let mut extracted = Vec::with_capacity(injected.len());

        for record in injected {
            let payload = extract_final(
                &self.client,
                &self.run,
                &flow.name,
                &record.source_id,
                MessageOrigin::Source,
            )
            .await?;
            let source_output = self.workspace.write_payload(
                &case.source_path_out,
                &record.source_file_name,
                &payload,
            )?;

            let target_output = if record.target_injected {
                let payload = extract_final(
                    &self.client,
                    &self.run,
                    &flow.name,
                    &record.target_id,
                    MessageOrigin::Target,
                )
                .await?;
                self.workspace.write_payload(
                    &case.target_path_out,
                    &record.target_file_name,
                    &payload,
                )?
            } else {
                // Flow-to-file: the expected output already sits in place.
                self.workspace
                    .file(&case.target_path_out, &record.target_file_name)
            };

            extracted.push(ExtractedMessage {
                injected: record,
                source_output,
                target_output,
            });
        }

        Ok(extracted)
    }

    fn run_comparison(
        &self,
        case: &CaseDefinition,
        extracted: Vec<ExtractedMessage>,
    ) -> Result<Vec<ComparedMessage>> {
        let mut compared = Vec::with_capacity(extracted.len());

        for message in extracted {
            let verdict = self.comparator.compare(
                &message.source_output,
                &message.target_output,
                &case.xpath_exceptions,
            )?;
            compared.push(ComparedMessage {
                extracted: message,
                verdict,
            });
        }

        Ok(compared)
    }
}

/// Block the pipeline for the configured post-injection delay.
///
/// An interrupt during the wait fails the case instead of proceeding: the
/// middleware may still be mid-processing, so a later extraction could capture
/// a FIRST (in-flight) payload rather than the terminal LAST one. One
/// interrupt fails one case; the remaining cases still run.
async fn wait_for_processing(seconds: u64, interrupt: &Notify) -> Result<()> {
    if seconds == 0 {
        return Ok(());
    }

    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(seconds)) => Ok(()),
        _ = interrupt.notified() => Err(FlowRegressError::WaitInterrupted),
    }
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            FlowRegressError::general(format!("path has no usable file name: {}", path.display()))
        })
}
