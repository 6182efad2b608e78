pub mod deps;
pub mod flow;
pub mod node;
pub mod params;
pub mod project;

pub use flow::Flow;
pub use node::{Command, JobNode};
pub use params::{Params, Properties};
pub use project::Project;
