use std::collections::BTreeMap;

use serde_json::Value;

use super::{FlowManifest, JobManifest, ProjectManifest};
use crate::error::{Error, Result};
use crate::jobs::{Command, Flow, Params, Project, Properties};

/// Build a `Project` from its manifest.
pub fn assemble(manifest: &ProjectManifest) -> Result<Project> {
    let mut project = Project::new(&manifest.project, &manifest.description);
    if let Some(map) = &manifest.properties {
        project = project.with_properties(Properties::new(&manifest.project, property_params(map)?));
    }
    for flow_manifest in &manifest.flows {
        project.add_flow(assemble_flow(flow_manifest)?)?;
    }
    Ok(project)
}

/// Two passes: register every command and (recursively assembled) sub-flow,
/// then wire every dependency edge.
fn assemble_flow(manifest: &FlowManifest) -> Result<Flow> {
    let mut flow = Flow::new(&manifest.name);
    if !manifest.params.is_empty() {
        flow = flow.with_params(params_from(&manifest.params));
    }
    if let Some(map) = &manifest.properties {
        flow = flow.with_properties(Properties::new(&manifest.name, property_params(map)?));
    }

    for job in &manifest.jobs {
        flow.register(command_from(job))?;
    }
    for sub in &manifest.flows {
        flow.register(assemble_flow(sub)?)?;
    }

    for edge in &manifest.dependencies {
        flow.add_dependency(&edge.before, &edge.after)?;
    }
    Ok(flow)
}

fn command_from(manifest: &JobManifest) -> Command {
    let mut command = Command::new(&manifest.name, manifest.command.as_str());
    for (key, value) in &manifest.params {
        command = command.param(key.as_str(), value.clone());
    }
    command
}

fn params_from(map: &BTreeMap<String, Value>) -> Params {
    let mut params = Params::new();
    for (key, value) in map {
        params.set(key.as_str(), value.clone());
    }
    params
}

/// Properties are a flat key/value set; nested values are a definition
/// error.
fn property_params(map: &BTreeMap<String, Value>) -> Result<Params> {
    let mut params = Params::new();
    for (key, value) in map {
        if value.is_array() || value.is_object() {
            return Err(Error::TypeMismatch {
                expected: "scalar property value",
                actual: format!("nested value under key '{key}'"),
            });
        }
        params.set(key.as_str(), value.clone());
    }
    Ok(params)
}
