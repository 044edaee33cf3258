//! Injection stage: builds and submits one inbound message per payload file.
//!
//! Correlation identifiers are generated here. Source and target messages each
//! get a fresh UUID; an EOIO case additionally shares one queue identifier
//! across every message it submits, requesting in-order processing.

use crate::config::{FlowDescriptor, RunConfig};
use crate::error::{FlowRegressError, Result};
use crate::http::header::build_xi_header;
use crate::traits::MiddlewareClient;
use crate::types::InjectionRequest;
use crate::workspace::debug_dump_path;
use chrono::Utc;
use std::path::Path;
use tracing::debug;
use uuid::Uuid;

/// Generate a fresh message correlation identifier.
pub fn generate_message_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generate the per-case queue identifier shared by all EOIO submissions.
pub fn generate_queue_id() -> String {
    format!("_{}", Uuid::new_v4().simple())
}

/// Read one payload file and submit it to the middleware's inbound interface.
///
/// Failure to read the file and failure to submit it are reported as distinct
/// errors; both fail the owning case and are never retried.
pub async fn inject_file<C: MiddlewareClient>(
    client: &C,
    run: &RunConfig,
    flow: &FlowDescriptor,
    queue_id: Option<&str>,
    message_id: &str,
    payload_path: &Path,
) -> Result<()> {
    let payload =
        std::fs::read(payload_path).map_err(|e| FlowRegressError::PayloadRead {
            path: payload_path.to_path_buf(),
            message: e.to_string(),
        })?;

    let header_xml = build_xi_header(flow, message_id, queue_id, Utc::now());

    let request = InjectionRequest {
        flow_name: flow.name.clone(),
        sender_component: flow.sender.component.clone(),
        queue_id: queue_id.map(str::to_string),
        message_id: message_id.to_string(),
        header_xml,
        payload,
    };

    if run.debug {
        dump_request(run, &request)?;
    }

    debug!(
        flow = %flow.name,
        message_id,
        file = %payload_path.display(),
        "injecting payload"
    );
    client.inject(&request).await
}

/// Write the outbound request to the debug directory, purely diagnostic.
fn dump_request(run: &RunConfig, request: &InjectionRequest) -> Result<()> {
    std::fs::create_dir_all(&run.debug_dir)?;
    let path = debug_dump_path(&run.debug_dir, &request.flow_name, &request.message_id);

    let mut content = Vec::with_capacity(request.header_xml.len() + request.payload.len() + 4);
    content.extend_from_slice(request.header_xml.as_bytes());
    content.extend_from_slice(b"\r\n\r\n");
    content.extend_from_slice(&request.payload);
    std::fs::write(&path, content)?;

    debug!(file = %path.display(), "dumped outbound injection request");
    Ok(())
}
