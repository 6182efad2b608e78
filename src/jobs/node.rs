use serde_json::Value;

use crate::jobs::flow::Flow;
use crate::jobs::params::Params;

/// A leaf executable job. The `type=command` marker is set at construction
/// and always wins over caller-supplied parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    name: String,
    params: Params,
}

impl Command {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        let mut params = Params::new();
        params.set("type", "command");
        params.set("command", command.into());
        Self { name: name.into(), params }
    }

    /// Build from a prepared parameter set (expected to carry `command`).
    pub fn with_params(name: impl Into<String>, mut params: Params) -> Self {
        params.set("type", "command");
        Self { name: name.into(), params }
    }

    /// Chainable extra parameter, e.g. `retries` or `retry.backoff`.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.set(key, value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn basename(&self) -> &str {
        &self.name
    }

    pub fn filename(&self) -> String {
        format!("{}.job", self.name)
    }

    pub fn params(&self) -> &Params {
        &self.params
    }
}

/// A node of a flow graph: either a leaf command or a nested sub-flow.
#[derive(Debug, Clone)]
pub enum JobNode {
    Command(Command),
    Flow(Flow),
}

impl JobNode {
    /// Unique name within the owning flow.
    pub fn name(&self) -> &str {
        match self {
            JobNode::Command(command) => command.name(),
            JobNode::Flow(flow) => flow.name(),
        }
    }

    /// Base identifier used in `dependencies=` lists and as the job
    /// filename stem; flows are prefixed to keep them apart from commands.
    pub fn basename(&self) -> String {
        match self {
            JobNode::Command(command) => command.basename().to_string(),
            JobNode::Flow(flow) => flow.basename(),
        }
    }

    pub fn filename(&self) -> String {
        format!("{}.job", self.basename())
    }

    pub fn params(&self) -> &Params {
        match self {
            JobNode::Command(command) => command.params(),
            JobNode::Flow(flow) => flow.params(),
        }
    }
}

impl From<Command> for JobNode {
    fn from(command: Command) -> Self {
        JobNode::Command(command)
    }
}

impl From<Flow> for JobNode {
    fn from(flow: Flow) -> Self {
        JobNode::Flow(flow)
    }
}
