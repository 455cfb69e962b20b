//! Error types for the build configuration registry

use thiserror::Error;

use crate::module::ModuleId;

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Build configuration registry errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Replacement build configuration set is empty")]
    EmptyConfigurationSet,

    #[error("Unknown module: {module}")]
    UnknownModule { module: ModuleId },

    #[error("Module {module} is not buildable and has no build configurations")]
    NotBuildable { module: ModuleId },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
