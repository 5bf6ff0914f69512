/// Errors raised by the domain model.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A value failed to parse or violated a domain constraint.
    #[error("Validation failed: {0}")]
    Validation(String),
}
