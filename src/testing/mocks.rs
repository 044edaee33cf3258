use crate::error::{FlowRegressError, Result};
use crate::traits::{MiddlewareClient, PayloadComparator};
use crate::types::{
    CompareVerdict, InjectionRequest, MessageInfo, MessageStatus, PayloadVariant,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Scripted middleware client for tests.
///
/// Records every injection, serves status sequences per correlation id (the
/// last status repeats once a sequence is exhausted) and returns scripted
/// payloads. Unscripted lookups resolve to `Success` with a default payload.
#[derive(Clone, Default)]
pub struct MockMiddlewareClient {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    injections: Vec<InjectionRequest>,
    status_sequences: HashMap<String, Vec<MessageStatus>>,
    lookup_counts: HashMap<String, usize>,
    payloads: HashMap<String, Vec<u8>>,
    default_status: Option<MessageStatus>,
    inject_failure: Option<String>,
    lookup_failure: Option<String>,
}

impl MockMiddlewareClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the status sequence observed by consecutive lookups of one id.
    pub fn with_status_sequence(self, correlation_id: &str, statuses: Vec<MessageStatus>) -> Self {
        self.state
            .lock()
            .unwrap()
            .status_sequences
            .insert(correlation_id.to_string(), statuses);
        self
    }

    /// Script the LAST payload served for one correlation id.
    pub fn with_payload(self, correlation_id: &str, payload: Vec<u8>) -> Self {
        self.state
            .lock()
            .unwrap()
            .payloads
            .insert(correlation_id.to_string(), payload);
        self
    }

    /// Status served for every correlation id without a scripted sequence.
    pub fn with_default_status(self, status: MessageStatus) -> Self {
        self.state.lock().unwrap().default_status = Some(status);
        self
    }

    /// Make every injection fail with the given message.
    pub fn with_inject_failure(self, message: &str) -> Self {
        self.state.lock().unwrap().inject_failure = Some(message.to_string());
        self
    }

    /// Make every status lookup fail with the given message.
    pub fn with_lookup_failure(self, message: &str) -> Self {
        self.state.lock().unwrap().lookup_failure = Some(message.to_string());
        self
    }

    /// All injection requests recorded so far, in submission order.
    pub fn injections(&self) -> Vec<InjectionRequest> {
        self.state.lock().unwrap().injections.clone()
    }

    /// How many status lookups one correlation id has received.
    pub fn lookup_count(&self, correlation_id: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .lookup_counts
            .get(correlation_id)
            .copied()
            .unwrap_or(0)
    }

    fn message_key(correlation_id: &str) -> String {
        format!("key-{}", correlation_id)
    }
}

impl MiddlewareClient for MockMiddlewareClient {
    async fn inject(&self, request: &InjectionRequest) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(message) = &state.inject_failure {
            return Err(FlowRegressError::injection(
                request.flow_name.clone(),
                request.message_id.clone(),
                message.clone(),
            ));
        }
        state.injections.push(request.clone());
        Ok(())
    }

    async fn lookup_message_info(
        &self,
        correlation_id: &str,
        _flow_name: &str,
    ) -> Result<MessageInfo> {
        let mut state = self.state.lock().unwrap();
        if let Some(message) = &state.lookup_failure {
            return Err(FlowRegressError::lookup(
                correlation_id.to_string(),
                message.clone(),
            ));
        }

        let count = state
            .lookup_counts
            .entry(correlation_id.to_string())
            .or_insert(0);
        let index = *count;
        *count += 1;

        let status = match state.status_sequences.get(correlation_id) {
            Some(sequence) if !sequence.is_empty() => {
                sequence[index.min(sequence.len() - 1)].clone()
            }
            _ => state
                .default_status
                .clone()
                .unwrap_or(MessageStatus::Success),
        };

        Ok(MessageInfo {
            message_key: Self::message_key(correlation_id),
            status,
        })
    }

    async fn fetch_payload(&self, message_key: &str, _variant: PayloadVariant) -> Result<Vec<u8>> {
        let correlation_id = message_key.strip_prefix("key-").unwrap_or(message_key);
        let state = self.state.lock().unwrap();
        Ok(state
            .payloads
            .get(correlation_id)
            .cloned()
            .unwrap_or_else(|| b"<Payload/>".to_vec()))
    }
}

/// One recorded comparison call.
#[derive(Debug, Clone)]
pub struct CompareCall {
    pub source: std::path::PathBuf,
    pub target: std::path::PathBuf,
    pub xpath_exceptions: Vec<String>,
}

/// Scripted comparator for tests; identical by default.
#[derive(Clone, Default)]
pub struct MockComparator {
    calls: Arc<Mutex<Vec<CompareCall>>>,
    verdicts: Arc<Mutex<HashMap<String, CompareVerdict>>>,
}

impl MockComparator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the verdict returned for a given source file name.
    pub fn with_verdict(self, source_file_name: &str, verdict: CompareVerdict) -> Self {
        self.verdicts
            .lock()
            .unwrap()
            .insert(source_file_name.to_string(), verdict);
        self
    }

    pub fn calls(&self) -> Vec<CompareCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl PayloadComparator for MockComparator {
    fn compare(
        &self,
        source: &Path,
        target: &Path,
        xpath_exceptions: &[String],
    ) -> Result<CompareVerdict> {
        self.calls.lock().unwrap().push(CompareCall {
            source: source.to_path_buf(),
            target: target.to_path_buf(),
            xpath_exceptions: xpath_exceptions.to_vec(),
        });

        let file_name = source
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        Ok(self
            .verdicts
            .lock()
            .unwrap()
            .get(file_name)
            .cloned()
            .unwrap_or(CompareVerdict::Identical))
    }
}

/// Factory helpers for building test configuration.
pub mod test_helpers {
    use crate::config::{
        CaseDefinition, CompareType, EndpointAddress, FlowDescriptor, QualityOfService, RunConfig,
    };
    use std::path::Path;

    pub fn run_config(test_case_root: &Path) -> RunConfig {
        RunConfig {
            base_url: "http://localhost:1".to_string(),
            inject_path: "/inject?channel=".to_string(),
            sender_adapter: "XI_SENDER".to_string(),
            test_case_root: test_case_root.to_path_buf(),
            report_dir: test_case_root.join("reports"),
            debug: false,
            debug_dir: test_case_root.join("debug"),
            poll_interval_seconds: 0,
            poll_timeout_seconds: 5,
            request_timeout_seconds: 5,
        }
    }

    fn address(component: &str, interface: &str) -> EndpointAddress {
        EndpointAddress {
            party: String::new(),
            component: component.to_string(),
            interface: interface.to_string(),
            namespace: "urn:example:test".to_string(),
        }
    }

    pub fn flow(name: &str, quality_of_service: QualityOfService) -> FlowDescriptor {
        FlowDescriptor {
            name: name.to_string(),
            quality_of_service,
            using_multi_mapping: false,
            sender: address("SENDER_SYS", "Interface_Out"),
            receiver: address("RECEIVER_SYS", "Interface_In"),
        }
    }

    pub fn flow_eo(name: &str) -> FlowDescriptor {
        flow(name, QualityOfService::Eo)
    }

    pub fn flow_eoio(name: &str) -> FlowDescriptor {
        flow(name, QualityOfService::Eoio)
    }

    /// Case whose four directories live under `{flow}/...` in the workspace.
    pub fn case(flow_name: &str, compare_type: CompareType, wait: u64) -> CaseDefinition {
        CaseDefinition {
            source_flow: flow_name.to_string(),
            compare_type,
            source_path_in: format!("{}/source/in", flow_name),
            source_path_out: format!("{}/source/out", flow_name),
            target_path_in: format!("{}/target/in", flow_name),
            target_path_out: format!("{}/target/out", flow_name),
            wait_before_extract: wait,
            xpath_exceptions: Vec::new(),
        }
    }

    pub fn case_flow_to_file(flow_name: &str) -> CaseDefinition {
        case(flow_name, CompareType::FlowToFile, 0)
    }

    pub fn case_flow_to_flow(flow_name: &str) -> CaseDefinition {
        case(flow_name, CompareType::FlowToFlow, 0)
    }
}
