//! Configuration model: flow descriptors, case definitions and run settings,
//! loaded from the two TOML overview files.

pub mod loader;
pub mod types;

pub use loader::RegressionConfig;
pub use types::{
    CaseDefinition, CompareType, ComparisonOverview, EndpointAddress, FlowDescriptor,
    FlowOverview, QualityOfService, RunConfig,
};
