use super::config::ConfigError;
use crate::core::constraints::parser::ConstraintSyntaxError;
use crate::core::io::container::ContainerError;
use crate::core::io::tables::TableError;
use crate::core::toolkit::ToolkitError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid interaction constraint: {0}")]
    Constraint(#[from] ConstraintSyntaxError),

    #[error("Container error: {0}")]
    Container(#[from] ContainerError),

    #[error("Toolkit error: {0}")]
    Toolkit(#[from] ToolkitError),

    #[error("Toolkit table error: {0}")]
    Table(#[from] TableError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Initialization failed: {0}")]
    Initialization(String),
}
