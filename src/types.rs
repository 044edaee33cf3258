use crate::error::FlowRegressError;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Which side of a comparison pair a message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MessageOrigin {
    Source,
    Target,
}

impl fmt::Display for MessageOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageOrigin::Source => write!(f, "SOURCE"),
            MessageOrigin::Target => write!(f, "TARGET"),
        }
    }
}

/// Processing status reported by the middleware's lookup interface.
///
/// Only `Success` permits payload extraction. `Waiting` and `Holding` are
/// non-terminal and may still become `Success`; every other status is a dead end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageStatus {
    Success,
    Waiting,
    Holding,
    Error,
    Canceled,
    Other(String),
}

impl MessageStatus {
    /// Parse the status string returned by the lookup interface.
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "success" => MessageStatus::Success,
            "waiting" => MessageStatus::Waiting,
            "holding" => MessageStatus::Holding,
            "error" | "systemerror" => MessageStatus::Error,
            "canceled" | "cancelled" => MessageStatus::Canceled,
            _ => MessageStatus::Other(raw.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, MessageStatus::Success)
    }

    /// Non-terminal statuses the extraction poll loop is allowed to re-check.
    pub fn is_pending(&self) -> bool {
        matches!(self, MessageStatus::Waiting | MessageStatus::Holding)
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageStatus::Success => write!(f, "success"),
            MessageStatus::Waiting => write!(f, "waiting"),
            MessageStatus::Holding => write!(f, "holding"),
            MessageStatus::Error => write!(f, "error"),
            MessageStatus::Canceled => write!(f, "canceled"),
            MessageStatus::Other(raw) => write!(f, "{}", raw),
        }
    }
}

/// Result of resolving a correlation identifier on the middleware.
#[derive(Debug, Clone)]
pub struct MessageInfo {
    /// Internal message key used for payload retrieval
    pub message_key: String,
    /// Processing status at lookup time
    pub status: MessageStatus,
}

/// Which payload variant of a message's processing chain to retrieve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadVariant {
    /// The inbound, pre-processing payload
    First,
    /// The terminal payload after all processing steps
    Last,
}

impl PayloadVariant {
    /// Wire value used by the lookup interface's version selector.
    pub fn selector(&self) -> &'static str {
        match self {
            PayloadVariant::First => "first",
            PayloadVariant::Last => "last",
        }
    }
}

/// A fully specified inbound submission, built by the injection stage.
#[derive(Debug, Clone)]
pub struct InjectionRequest {
    /// Name of the flow the message is injected into
    pub flow_name: String,
    /// Sender component, parameterizing the inbound endpoint path
    pub sender_component: String,
    /// Queue identifier shared by all messages of an EOIO case
    pub queue_id: Option<String>,
    /// Correlation identifier of this message
    pub message_id: String,
    /// Protocol header XML part
    pub header_xml: String,
    /// Raw payload bytes
    pub payload: Vec<u8>,
}

/// Correlation record produced by the injection stage, one per file pair.
#[derive(Debug, Clone, Serialize)]
pub struct InjectedMessage {
    /// Correlation identifier of the injected source message
    pub source_id: String,
    /// Correlation identifier of the target side: a generated id when the
    /// target was injected, otherwise the expected-output file's name
    pub target_id: String,
    /// Whether a target-side injection actually happened (flow-to-flow only)
    pub target_injected: bool,
    /// File name used when persisting the extracted source payload
    pub source_file_name: String,
    /// File name of the target payload (persisted or pre-existing)
    pub target_file_name: String,
}

/// An injected message pair whose payloads have been retrieved and persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedMessage {
    pub injected: InjectedMessage,
    /// Absolute path of the persisted source output payload
    pub source_output: PathBuf,
    /// Absolute path of the target output payload
    pub target_output: PathBuf,
}

/// Structural equality verdict produced by a payload comparator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CompareVerdict {
    Identical,
    Different { differences: Vec<String> },
}

impl CompareVerdict {
    pub fn is_identical(&self) -> bool {
        matches!(self, CompareVerdict::Identical)
    }
}

/// Final per-message record: extraction result plus comparison verdict.
#[derive(Debug, Clone, Serialize)]
pub struct ComparedMessage {
    pub extracted: ExtractedMessage,
    pub verdict: CompareVerdict,
}

/// Pipeline stage a case failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CaseStage {
    Setup,
    Injection,
    Wait,
    Extraction,
    Persistence,
    Comparison,
}

/// Failure recorded on a case that did not reach comparison.
#[derive(Debug, Clone, Serialize)]
pub struct CaseFailure {
    pub stage: CaseStage,
    pub message: String,
}

impl From<FlowRegressError> for CaseFailure {
    fn from(err: FlowRegressError) -> Self {
        let stage = match &err {
            FlowRegressError::FileCountMismatch { .. }
            | FlowRegressError::UnknownFlow { .. }
            | FlowRegressError::InvalidConfig { .. } => CaseStage::Setup,
            FlowRegressError::PayloadRead { .. } | FlowRegressError::Injection { .. } => {
                CaseStage::Injection
            }
            FlowRegressError::WaitInterrupted => CaseStage::Wait,
            FlowRegressError::InvalidTerminalState { .. }
            | FlowRegressError::Lookup { .. }
            | FlowRegressError::Http(_) => CaseStage::Extraction,
            FlowRegressError::Persistence { .. } => CaseStage::Persistence,
            FlowRegressError::ComparisonFailed { .. } => CaseStage::Comparison,
            _ => CaseStage::Setup,
        };
        CaseFailure {
            stage,
            message: err.to_string(),
        }
    }
}

/// Outcome of one processed case: either every message pair carries a verdict,
/// or the case failed at some stage. The enum makes "both set" and "neither
/// set" unrepresentable.
#[derive(Debug, Clone, Serialize)]
pub enum CaseOutcome {
    Completed(Vec<ComparedMessage>),
    Failed(CaseFailure),
}

/// One configured case together with its run outcome.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedCase {
    pub definition: crate::config::CaseDefinition,
    pub outcome: CaseOutcome,
}

impl ProcessedCase {
    /// A case passes when it completed and every message pair compared identical.
    pub fn is_passed(&self) -> bool {
        match &self.outcome {
            CaseOutcome::Completed(messages) => {
                messages.iter().all(|m| m.verdict.is_identical())
            }
            CaseOutcome::Failed(_) => false,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, CaseOutcome::Failed(_))
    }
}
