use crate::config::RunConfig;
use crate::error::{FlowRegressError, Result};
use crate::traits::MiddlewareClient;
use crate::types::{InjectionRequest, MessageInfo, MessageStatus, PayloadVariant};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Path of the lookup operation resolving a correlation id to key + status.
const PATH_LOOKUP_INFO: &str = "/mdt/api/messages/info";
/// Path prefix of the payload retrieval operation.
const PATH_LOOKUP_PAYLOAD: &str = "/mdt/api/messages";

/// Boundary separating the header part from the payload part of an injection.
const MULTIPART_BOUNDARY: &str = "MIME_boundary_xi_injection";

/// Middleware client talking the XI-style inbound and lookup interfaces.
#[derive(Clone)]
pub struct XiHttpClient {
    client: Client,
    config: RunConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageInfoDto {
    message_key: String,
    status: String,
}

impl XiHttpClient {
    /// Create a new client with the run's transport settings.
    pub fn new(config: RunConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;
        Ok(Self { client, config })
    }

    fn lookup_info_url(&self) -> String {
        format!("{}{}", self.config.base_url, PATH_LOOKUP_INFO)
    }

    fn lookup_payload_url(&self, message_key: &str, variant: PayloadVariant) -> String {
        format!(
            "{}{}/{}/payload?version={}",
            self.config.base_url,
            PATH_LOOKUP_PAYLOAD,
            message_key,
            variant.selector()
        )
    }
}

/// Assemble the two-part multipart/related body: header XML, then raw payload.
pub fn build_multipart_body(header_xml: &[u8], payload: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(header_xml.len() + payload.len() + 256);
    body.extend_from_slice(format!("--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
    body.extend_from_slice(b"Content-Type: text/xml; charset=UTF-8\r\n");
    body.extend_from_slice(b"Content-ID: <soap-header>\r\n\r\n");
    body.extend_from_slice(header_xml);
    body.extend_from_slice(format!("\r\n--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
    body.extend_from_slice(b"Content-Type: application/xml\r\n");
    body.extend_from_slice(b"Content-ID: <payload>\r\n\r\n");
    body.extend_from_slice(payload);
    body.extend_from_slice(format!("\r\n--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());
    body
}

/// Content-Type request header matching [`build_multipart_body`].
pub fn multipart_content_type() -> String {
    format!(
        "multipart/related; boundary={}; type=\"text/xml\"",
        MULTIPART_BOUNDARY
    )
}

impl MiddlewareClient for XiHttpClient {
    async fn inject(&self, request: &InjectionRequest) -> Result<()> {
        let endpoint = self.config.inject_endpoint(&request.sender_component);
        let body = build_multipart_body(request.header_xml.as_bytes(), &request.payload);

        let response = self
            .client
            .post(&endpoint)
            .header(reqwest::header::CONTENT_TYPE, multipart_content_type())
            .body(body)
            .send()
            .await
            .map_err(|e| {
                FlowRegressError::injection(
                    request.flow_name.clone(),
                    request.message_id.clone(),
                    format!("submission to {} failed: {}", endpoint, e),
                )
            })?;

        if !response.status().is_success() {
            return Err(FlowRegressError::injection(
                request.flow_name.clone(),
                request.message_id.clone(),
                format!("middleware rejected submission with HTTP {}", response.status()),
            ));
        }
        Ok(())
    }

    async fn lookup_message_info(
        &self,
        correlation_id: &str,
        flow_name: &str,
    ) -> Result<MessageInfo> {
        let response = self
            .client
            .get(self.lookup_info_url())
            .query(&[("correlationId", correlation_id), ("flow", flow_name)])
            .send()
            .await
            .map_err(|e| FlowRegressError::lookup(correlation_id.to_string(), e.to_string()))?;

        if !response.status().is_success() {
            return Err(FlowRegressError::lookup(
                correlation_id.to_string(),
                format!("lookup interface returned HTTP {}", response.status()),
            ));
        }

        let dto: MessageInfoDto = response
            .json()
            .await
            .map_err(|e| FlowRegressError::lookup(correlation_id.to_string(), e.to_string()))?;

        Ok(MessageInfo {
            message_key: dto.message_key,
            status: MessageStatus::parse(&dto.status),
        })
    }

    async fn fetch_payload(&self, message_key: &str, variant: PayloadVariant) -> Result<Vec<u8>> {
        let url = self.lookup_payload_url(message_key, variant);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FlowRegressError::lookup(message_key.to_string(), e.to_string()))?;

        if !response.status().is_success() {
            return Err(FlowRegressError::lookup(
                message_key.to_string(),
                format!("payload retrieval returned HTTP {}", response.status()),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FlowRegressError::lookup(message_key.to_string(), e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
