//! Declarative YAML description of a project. A manifest is assembled into
//! the graph model through the normal mutation API, so duplicate names,
//! duplicate edges and unknown references all surface as graph errors.

mod assemble;

pub use assemble::assemble;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectManifest {
    pub project: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub properties: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    pub flows: Vec<FlowManifest>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlowManifest {
    pub name: String,
    /// Parameters of the flow's own `.job` file when used as a sub-flow.
    #[serde(default)]
    pub params: BTreeMap<String, Value>,
    #[serde(default)]
    pub properties: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    pub jobs: Vec<JobManifest>,
    /// Nested sub-flow definitions.
    #[serde(default)]
    pub flows: Vec<FlowManifest>,
    #[serde(default)]
    pub dependencies: Vec<EdgeManifest>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobManifest {
    pub name: String,
    pub command: String,
    #[serde(default)]
    pub params: BTreeMap<String, Value>,
}

/// One dependency edge: `before` must complete before `after` starts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EdgeManifest {
    pub before: String,
    pub after: String,
}

pub fn load_project_manifest(path: impl AsRef<Path>) -> Result<ProjectManifest> {
    let text = fs::read_to_string(path)?;
    let manifest = serde_yaml::from_str(&text)?;
    Ok(manifest)
}
