use crate::config::types::{
    CaseDefinition, ComparisonOverview, FlowDescriptor, FlowOverview, RunConfig,
};
use crate::error::{FlowRegressError, Result};
use std::collections::HashSet;
use std::path::Path;

/// Fully loaded and cross-validated run configuration.
///
/// Construction fails fast on anything §7 classifies as a configuration error:
/// missing or unparseable overview files, duplicate flow names, and case
/// definitions referencing a flow that does not exist.
#[derive(Debug, Clone)]
pub struct RegressionConfig {
    pub run: RunConfig,
    pub flows: Vec<FlowDescriptor>,
    pub cases: Vec<CaseDefinition>,
}

impl RegressionConfig {
    /// Load the flow overview and comparison overview files and validate them
    /// against each other.
    pub fn load<P: AsRef<Path>>(flow_overview: P, comparison_overview: P) -> Result<Self> {
        let flow_overview: FlowOverview = read_toml(flow_overview.as_ref())?;
        let comparison: ComparisonOverview = read_toml(comparison_overview.as_ref())?;

        let config = Self {
            run: flow_overview.run,
            flows: flow_overview.flows,
            cases: comparison.cases,
        };
        config.validate()?;
        Ok(config)
    }

    /// Build a configuration from already-parsed parts, still validated.
    pub fn from_parts(
        run: RunConfig,
        flows: Vec<FlowDescriptor>,
        cases: Vec<CaseDefinition>,
    ) -> Result<Self> {
        let config = Self { run, flows, cases };
        config.validate()?;
        Ok(config)
    }

    /// Resolve a flow descriptor by its unique name. `referenced_by` names
    /// the case (or other site) that holds the reference, for the error text.
    pub fn resolve_flow(&self, name: &str, referenced_by: &str) -> Result<&FlowDescriptor> {
        self.flows
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| FlowRegressError::UnknownFlow {
                flow: name.to_string(),
                case: referenced_by.to_string(),
            })
    }

    fn validate(&self) -> Result<()> {
        if self.flows.is_empty() {
            return Err(FlowRegressError::invalid_config(
                "flow overview contains no flows",
            ));
        }

        let mut seen = HashSet::new();
        for flow in &self.flows {
            if !seen.insert(flow.name.as_str()) {
                return Err(FlowRegressError::invalid_config(format!(
                    "duplicate flow name in flow overview: '{}'",
                    flow.name
                )));
            }
        }

        for case in &self.cases {
            if !seen.contains(case.source_flow.as_str()) {
                return Err(FlowRegressError::UnknownFlow {
                    flow: case.source_flow.clone(),
                    case: case.label(),
                });
            }
        }

        Ok(())
    }
}

fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(FlowRegressError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(FlowRegressError::Io)?;

    toml::from_str(&content).map_err(|e| {
        FlowRegressError::invalid_config(format!(
            "failed to parse TOML in {}: {}",
            path.display(),
            e
        ))
    })
}
