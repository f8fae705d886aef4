use thiserror::Error;

use cashflow_config::ConfigError;
use cashflow_core::ProjectionError;
use cashflow_storage_json::StorageError;

/// Failures that end the shell session.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Projection(#[from] ProjectionError),
    #[error(transparent)]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Invalid input: {0}")]
    Input(String),
}
