use crate::error::Result;
use crate::types::{CompareVerdict, InjectionRequest, MessageInfo, PayloadVariant, ProcessedCase};
use std::future::Future;
use std::path::{Path, PathBuf};

/// Trait for middleware client implementations.
///
/// Covers the two protocol surfaces the pipeline talks to: the inbound
/// web-service interface (injection) and the message lookup interface
/// (status resolution and payload retrieval).
pub trait MiddlewareClient: Send + Sync {
    /// Submit one inbound message (header part plus raw payload bytes).
    fn inject(&self, request: &InjectionRequest) -> impl Future<Output = Result<()>> + Send;

    /// Resolve a correlation identifier to an internal message key and its
    /// current processing status.
    fn lookup_message_info(
        &self,
        correlation_id: &str,
        flow_name: &str,
    ) -> impl Future<Output = Result<MessageInfo>> + Send;

    /// Retrieve one payload variant of a message's processing chain.
    fn fetch_payload(
        &self,
        message_key: &str,
        variant: PayloadVariant,
    ) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// Trait for the external structural comparer.
///
/// Given two file paths and the ordered path-exception expressions of the
/// owning case, produce an equality verdict.
pub trait PayloadComparator: Send + Sync {
    fn compare(
        &self,
        source: &Path,
        target: &Path,
        xpath_exceptions: &[String],
    ) -> Result<CompareVerdict>;
}

/// Trait for report generation from the ordered list of processed cases.
pub trait ReportRenderer: Send + Sync {
    /// Produce the report artifact and return its location.
    fn write_report(&self, cases: &[ProcessedCase]) -> Result<PathBuf>;
}
