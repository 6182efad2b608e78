use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::jobs::deps::DepList;
use crate::jobs::node::{Command, JobNode};
use crate::jobs::params::{render_value, Params, Properties};

/// A named, directed job graph representing one schedulable workflow unit.
///
/// A flow owns its nodes (commands and nested sub-flows) and, per node, the
/// ordered list of its predecessors. A synthetic finish command, named
/// after the flow, is created with the flow and kept wired so that the
/// graph always has exactly one terminal job: every node without a later
/// dependent feeds into it. The finish job's own wiring is system managed.
///
/// A flow is itself usable as a node inside a containing flow's graph; its
/// job file then carries `type=flow` and `flow.name`.
#[derive(Debug, Clone)]
pub struct Flow {
    name: String,
    params: Params,
    properties: Option<Properties>,
    nodes: Vec<JobNode>,
    index: HashMap<String, usize>,
    deps: HashMap<String, DepList>,
}

impl Flow {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let mut params = Params::new();
        params.set("type", "flow");
        params.set("flow.name", name.as_str());
        let finish = Command::new(name.as_str(), format!("echo \"Finish {name} at $(date)\""));

        let mut flow = Self {
            name,
            params,
            properties: None,
            nodes: Vec::new(),
            index: HashMap::new(),
            deps: HashMap::new(),
        };
        flow.insert_node(JobNode::Command(finish));
        flow
    }

    /// Parameters carried by this flow's own `.job` file when it is used as
    /// a sub-flow. The `type` and `flow.name` markers always win.
    pub fn with_params(mut self, params: Params) -> Self {
        for (key, value) in params.iter() {
            self.params.set(key, value.clone());
        }
        self.params.set("type", "flow");
        let name = self.name.clone();
        self.params.set("flow.name", name);
        self
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = Some(properties);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Base identifier of this flow when referenced as a sub-flow.
    pub fn basename(&self) -> String {
        format!("flow_{}", self.name)
    }

    pub fn filename(&self) -> String {
        format!("{}.job", self.basename())
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn properties(&self) -> Option<&Properties> {
        self.properties.as_ref()
    }

    /// The synthetic terminal command of this flow.
    pub fn finish_job(&self) -> &JobNode {
        &self.nodes[0]
    }

    pub fn jobs(&self) -> impl Iterator<Item = &JobNode> {
        self.nodes.iter()
    }

    pub fn job_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn get(&self, name: &str) -> Option<&JobNode> {
        self.index.get(name).map(|&i| &self.nodes[i])
    }

    /// Add a command or sub-flow to the graph. The new node is immediately
    /// wired as a predecessor of the finish job, so jobs without later
    /// dependents feed the flow's single exit.
    pub fn register(&mut self, node: impl Into<JobNode>) -> Result<()> {
        let node = node.into();
        let name = node.name().to_string();
        if self.index.contains_key(&name) {
            return Err(Error::DuplicateJob { flow: self.name.clone(), job: name });
        }
        self.insert_node(node);
        let finish = self.name.clone();
        self.add_dependency(&name, &finish)
    }

    /// Declare that `before` must complete before `after` starts, then
    /// re-arrange the finish job's predecessors.
    pub fn add_dependency(&mut self, before: &str, after: &str) -> Result<()> {
        let before_base = self.node(before)?.basename();
        self.node(after)?;
        let list = self.deps.entry(after.to_string()).or_default();
        if list.contains(&before_base) {
            return Err(Error::DuplicateDependency {
                before: before.to_string(),
                after: after.to_string(),
            });
        }
        list.attach(before_base);
        self.arrange_finish();
        Ok(())
    }

    /// Remove a dependency edge. Finish-job wiring cannot be removed here,
    /// and removal does not re-arrange the finish job: a node left without
    /// dependents stays dangling until the next `add_dependency`.
    pub fn remove_dependency(&mut self, before: &str, after: &str) -> Result<()> {
        if after == self.name {
            return Err(Error::ProtectedDependency);
        }
        let before_base = self.node(before)?.basename();
        self.node(after)?;
        if let Some(list) = self.deps.get_mut(after) {
            list.detach(after, &before_base)?;
        }
        Ok(())
    }

    /// Jobs with no incoming edge: the flow's entry points.
    pub fn first_jobs(&self) -> Vec<&JobNode> {
        self.nodes
            .iter()
            .filter(|n| self.deps.get(n.name()).map(DepList::is_empty).unwrap_or(true))
            .collect()
    }

    /// Jobs with no outgoing edge. After any arrangement pass this is
    /// exactly the finish job.
    pub fn last_jobs(&self) -> Vec<&JobNode> {
        self.nodes
            .iter()
            .filter(|n| !self.has_dependents(&n.basename()))
            .collect()
    }

    /// Predecessors of the finish job: the jobs the caller considers last.
    pub fn jobs_before_finish(&self) -> Vec<&JobNode> {
        match self.deps.get(&self.name) {
            Some(list) => list.iter().filter_map(|base| self.node_by_basename(base)).collect(),
            None => Vec::new(),
        }
    }

    /// Serialized `.job` file text for the named job: its parameter lines
    /// followed by the `dependencies=` line derived from the graph. A
    /// caller-supplied `dependencies` parameter is reserved and skipped.
    pub fn job_text(&self, name: &str) -> Result<String> {
        let node = self.node(name)?;
        let mut lines = Vec::new();
        for (key, value) in node.params().iter() {
            if key == "dependencies" {
                continue;
            }
            lines.push(format!("{}={}", key, render_value(key, value)?));
        }
        if let Some(list) = self.deps.get(name) {
            if !list.is_empty() {
                lines.push(format!("dependencies={}", list.render()));
            }
        }
        Ok(lines.join("\n"))
    }

    fn insert_node(&mut self, node: JobNode) {
        let name = node.name().to_string();
        self.index.insert(name.clone(), self.nodes.len());
        self.nodes.push(node);
        self.deps.insert(name, DepList::default());
    }

    fn node(&self, name: &str) -> Result<&JobNode> {
        self.index
            .get(name)
            .map(|&i| &self.nodes[i])
            .ok_or_else(|| Error::JobNotFound {
                flow: self.name.clone(),
                job: name.to_string(),
            })
    }

    fn node_by_basename(&self, base: &str) -> Option<&JobNode> {
        self.nodes.iter().find(|n| n.basename() == base)
    }

    fn has_dependents(&self, base: &str) -> bool {
        self.deps.values().any(|list| list.contains(base))
    }

    /// Recompute the finish job's predecessors: drop them all, then wire
    /// every node with no outgoing edge (other than the finish job itself)
    /// back in. Runs after every successful edge addition; idempotent.
    fn arrange_finish(&mut self) {
        if let Some(list) = self.deps.get_mut(&self.name) {
            list.clear();
        }
        let terminals: Vec<String> = self
            .nodes
            .iter()
            .filter(|n| n.name() != self.name.as_str())
            .filter(|n| !self.has_dependents(&n.basename()))
            .map(|n| n.basename())
            .collect();
        if let Some(list) = self.deps.get_mut(&self.name) {
            for base in terminals {
                list.attach(base);
            }
        }
    }

    /// Drop an edge without any of the usual checks or re-arrangement.
    #[cfg(test)]
    pub(crate) fn sever_dependency(&mut self, before: &str, after: &str) {
        let base = match self.node(before) {
            Ok(node) => node.basename(),
            Err(_) => before.to_string(),
        };
        if let Some(list) = self.deps.get_mut(after) {
            let _ = list.detach(after, &base);
        }
    }
}
