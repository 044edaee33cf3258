//! Extraction stage: status-gated retrieval of terminal (LAST) payloads.
//!
//! The correlation id is first resolved to an internal message key and its
//! processing status; only a success status permits payload retrieval. Pending
//! statuses are re-checked on a fixed interval until a configurable ceiling,
//! instead of failing on the first non-terminal observation.

use crate::config::RunConfig;
use crate::error::{FlowRegressError, Result};
use crate::traits::MiddlewareClient;
use crate::types::{MessageOrigin, PayloadVariant};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Resolve the terminal status of one message and retrieve its LAST payload.
///
/// Any non-success, non-pending status aborts immediately; a message still
/// pending when the poll ceiling elapses is reported with its last observed
/// status and the instruction to raise the case's wait budget.
pub async fn extract_final<C: MiddlewareClient>(
    client: &C,
    run: &RunConfig,
    flow_name: &str,
    correlation_id: &str,
    origin: MessageOrigin,
) -> Result<Vec<u8>> {
    let deadline = Instant::now() + Duration::from_secs(run.poll_timeout_seconds);

    loop {
        let info = client.lookup_message_info(correlation_id, flow_name).await?;
        debug!(%origin, correlation_id, status = %info.status, "status lookup");

        if info.status.is_success() {
            return client
                .fetch_payload(&info.message_key, PayloadVariant::Last)
                .await;
        }

        if !info.status.is_pending() || Instant::now() >= deadline {
            return Err(FlowRegressError::InvalidTerminalState {
                origin,
                correlation_id: correlation_id.to_string(),
                status: info.status.to_string(),
            });
        }

        tokio::time::sleep(Duration::from_secs(run.poll_interval_seconds)).await;
    }
}
