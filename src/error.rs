use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("job '{job}' is already registered in flow '{flow}'")]
    DuplicateJob { flow: String, job: String },

    #[error("dependency from '{before}' to '{after}' already exists")]
    DuplicateDependency { before: String, after: String },

    #[error("the finish job's dependencies are managed automatically and cannot be removed")]
    ProtectedDependency,

    #[error("flow '{flow}' has no job named '{job}'")]
    JobNotFound { flow: String, job: String },

    #[error("'{dependency}' is not a registered dependency of '{job}'")]
    DependencyNotFound { job: String, dependency: String },

    #[error("flow '{flow}' is already part of project '{project}'")]
    DuplicateFlow { project: String, flow: String },

    #[error("expected {expected}, got {actual}")]
    TypeMismatch { expected: &'static str, actual: String },

    #[error("flow '{flow}' has {count} terminal jobs, expected exactly one")]
    MultipleTerminal { flow: String, count: usize },

    #[error("archive already exists: {}", .0.display())]
    PathExists(PathBuf),

    #[error("parameter '{key}' holds an unsupported value (strings, integers, lists and mappings only)")]
    UnsupportedValue { key: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
