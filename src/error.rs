use crate::types::MessageOrigin;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for flow-regress operations
pub type Result<T> = std::result::Result<T, FlowRegressError>;

/// Error types covering every stage of the regression pipeline.
///
/// Configuration errors abort the whole run; every other variant is caught at
/// the case boundary and recorded on the failing case.
#[derive(Debug, Error)]
pub enum FlowRegressError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Flow '{flow}' referenced by case '{case}' is not present in the flow overview")]
    UnknownFlow { flow: String, case: String },

    #[error(
        "File mismatch in test case '{case}': {source_count} source file(s) vs {target_count} target file(s)"
    )]
    FileCountMismatch {
        case: String,
        source_count: usize,
        target_count: usize,
    },

    #[error("Error reading payload file {path}: {message}")]
    PayloadRead { path: PathBuf, message: String },

    #[error("Error injecting message {message_id} into flow '{flow}': {message}")]
    Injection {
        flow: String,
        message_id: String,
        message: String,
    },

    #[error(
        "Wait step interrupted before extraction; a FIRST (in-flight) message could be \
         captured instead of the terminal LAST message, so extraction is skipped for this case"
    )]
    WaitInterrupted,

    #[error(
        "Invalid message status while extracting LAST payload for {origin} \
         (correlation id {correlation_id}): {status}. \
         Increase wait_before_extract for the failed flow and try again"
    )]
    InvalidTerminalState {
        origin: MessageOrigin,
        correlation_id: String,
        status: String,
    },

    #[error("Lookup call failed for correlation id {correlation_id}: {message}")]
    Lookup {
        correlation_id: String,
        message: String,
    },

    #[error("Error persisting extracted payload to {path}: {message}")]
    Persistence { path: PathBuf, message: String },

    #[error("Payload comparison failed: {message}")]
    ComparisonFailed { message: String },

    #[error("General error: {message}")]
    General { message: String },
}

impl FlowRegressError {
    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a new injection error
    pub fn injection<S: Into<String>>(flow: S, message_id: S, message: S) -> Self {
        Self::Injection {
            flow: flow.into(),
            message_id: message_id.into(),
            message: message.into(),
        }
    }

    /// Create a new lookup error
    pub fn lookup<S: Into<String>>(correlation_id: S, message: S) -> Self {
        Self::Lookup {
            correlation_id: correlation_id.into(),
            message: message.into(),
        }
    }

    /// Create a new comparison error
    pub fn comparison_failed<S: Into<String>>(message: S) -> Self {
        Self::ComparisonFailed {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Whether this error is fatal to the whole run rather than to a single case.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound { .. }
                | Self::ConfigParse(_)
                | Self::InvalidConfig { .. }
                | Self::UnknownFlow { .. }
        )
    }
}
