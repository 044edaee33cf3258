use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Delivery quality of a registered integration flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum QualityOfService {
    /// Exactly-once: each message is processed independently
    #[serde(rename = "EO")]
    Eo,
    /// Exactly-once-in-order: messages sharing a queue id are processed in
    /// submission order
    #[serde(rename = "EOIO")]
    Eoio,
}

/// One half of the addressing quintuple used to build the protocol header.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EndpointAddress {
    #[serde(default)]
    pub party: String,
    pub component: String,
    pub interface: String,
    pub namespace: String,
}

/// Static configuration of one registered integration flow.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FlowDescriptor {
    /// Unique key, referenced by case definitions
    pub name: String,
    pub quality_of_service: QualityOfService,
    /// Passed through into the protocol header, never interpreted here
    #[serde(default)]
    pub using_multi_mapping: bool,
    pub sender: EndpointAddress,
    pub receiver: EndpointAddress,
}

/// Comparison topology of a test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum CompareType {
    /// Both sides are injected into live flows
    #[serde(rename = "flow_to_flow")]
    FlowToFlow,
    /// Target side is a pre-computed expected-output file, nothing is injected there
    #[serde(rename = "flow_to_file")]
    FlowToFile,
}

/// Static definition of one test scenario.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CaseDefinition {
    /// Name of the flow this case injects into
    pub source_flow: String,
    pub compare_type: CompareType,
    /// Directory suffixes under the test-case root
    pub source_path_in: String,
    pub source_path_out: String,
    pub target_path_in: String,
    pub target_path_out: String,
    /// Seconds to wait between injection and extraction
    pub wait_before_extract: u64,
    /// Ordered path expressions the comparator must ignore
    #[serde(default)]
    pub xpath_exceptions: Vec<String>,
}

impl CaseDefinition {
    /// Identifier used when reporting on this case. Cases carry no name of
    /// their own, so the flow name is qualified with the input directory.
    pub fn label(&self) -> String {
        format!("{} ({})", self.source_flow, self.source_path_in)
    }
}

/// Run-level settings shared by every case of a run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunConfig {
    /// Middleware host and port, e.g. "http://po.example.com:50000"
    pub base_url: String,
    /// Inbound endpoint path; the flow's sender component and the sender
    /// adapter segment are appended per injection
    pub inject_path: String,
    /// Adapter segment appended after the sender component
    pub sender_adapter: String,
    /// Root directory holding one subtree per test case
    pub test_case_root: PathBuf,
    /// Directory the report artifact is written to
    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,
    /// When set, outbound injection requests are also dumped to debug_dir
    #[serde(default)]
    pub debug: bool,
    #[serde(default = "default_debug_dir")]
    pub debug_dir: PathBuf,
    /// Seconds between status re-checks while a message is still pending
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    /// Ceiling in seconds for the whole status poll loop of one message
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_seconds: u64,
    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_report_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_debug_dir() -> PathBuf {
    PathBuf::from("debug")
}

fn default_poll_interval() -> u64 {
    5
}

fn default_poll_timeout() -> u64 {
    60
}

fn default_request_timeout() -> u64 {
    30
}

impl RunConfig {
    /// Inbound endpoint for injecting through the given sender component.
    pub fn inject_endpoint(&self, sender_component: &str) -> String {
        format!(
            "{}{}{}:{}",
            self.base_url, self.inject_path, sender_component, self.sender_adapter
        )
    }
}

/// Contents of the flow overview file: run settings plus all flow descriptors.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FlowOverview {
    pub run: RunConfig,
    #[serde(default)]
    pub flows: Vec<FlowDescriptor>,
}

/// Contents of the comparison overview file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ComparisonOverview {
    #[serde(default)]
    pub cases: Vec<CaseDefinition>,
}
