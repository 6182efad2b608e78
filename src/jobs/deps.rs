use crate::error::{Error, Result};

/// Ordered list of predecessor base identifiers for a single job.
///
/// One list exists per node and together they are the flow's only adjacency
/// store; the `dependencies=` line of a job file is rendered from it on
/// demand. The list knows nothing about the graph it belongs to; entries
/// are matched by identifier equality only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DepList {
    ids: Vec<String>,
}

impl DepList {
    /// Append a predecessor identifier.
    pub fn attach(&mut self, id: impl Into<String>) {
        self.ids.push(id.into());
    }

    /// Remove the first entry matching `id`. `job` is only used to report
    /// the owner in the error.
    pub fn detach(&mut self, job: &str, id: &str) -> Result<()> {
        match self.ids.iter().position(|d| d == id) {
            Some(pos) => {
                self.ids.remove(pos);
                Ok(())
            }
            None => Err(Error::DependencyNotFound {
                job: job.to_string(),
                dependency: id.to_string(),
            }),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|d| d == id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// The `dependencies=` line value.
    pub fn render(&self) -> String {
        self.ids.join(",")
    }
}
