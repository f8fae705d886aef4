use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    /// The request itself is malformed; nothing was computed.
    #[error("Validation failed: {0}")]
    Validation(String),
    /// The source snapshot violates an assumption the projection depends on.
    #[error("Data integrity violation: {0}")]
    DataIntegrity(String),
}

impl From<cashflow_domain::DateWindowError> for ProjectionError {
    fn from(err: cashflow_domain::DateWindowError) -> Self {
        ProjectionError::Validation(err.to_string())
    }
}
