use crate::error::{Error, Result};
use crate::jobs::flow::Flow;
use crate::jobs::params::Properties;

/// A named collection of top-level flows plus optional project-wide
/// properties. Flow names are unique within a project; the archive filename
/// is derived from the project name.
#[derive(Debug, Clone)]
pub struct Project {
    name: String,
    description: String,
    properties: Option<Properties>,
    flows: Vec<Flow>,
}

impl Project {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            properties: None,
            flows: Vec::new(),
        }
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = Some(properties);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn properties(&self) -> Option<&Properties> {
        self.properties.as_ref()
    }

    /// Insert a top-level flow, rejecting a second flow of the same name.
    pub fn add_flow(&mut self, flow: Flow) -> Result<()> {
        if self.flows.iter().any(|f| f.name() == flow.name()) {
            return Err(Error::DuplicateFlow {
                project: self.name.clone(),
                flow: flow.name().to_string(),
            });
        }
        self.flows.push(flow);
        Ok(())
    }

    pub fn flows(&self) -> impl Iterator<Item = &Flow> {
        self.flows.iter()
    }

    pub fn flow_count(&self) -> usize {
        self.flows.len()
    }

    pub fn get_flow(&self, name: &str) -> Option<&Flow> {
        self.flows.iter().find(|f| f.name() == name)
    }

    /// The zip filename this project packs into.
    pub fn archive_filename(&self) -> String {
        format!("{}.zip", self.name)
    }
}
