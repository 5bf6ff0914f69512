use leadbridge_core::error::CoreError;

/// Errors surfaced by the redistribution engine.
///
/// Guard errors are raised locally before any network call. Backend errors
/// carry the collaborator's message unchanged. Stale responses are never
/// errors; they are dropped.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A domain-level error from `leadbridge_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Preview/execute was requested with no selection payload.
    #[error("Nothing to redistribute: select records or narrow the filter first")]
    NothingSelected,

    /// An execute or import is already awaiting its response.
    #[error("A bulk operation is already in progress")]
    MutationInFlight,

    /// The ticket does not belong to the pending operation.
    #[error("Unknown or already completed operation ticket")]
    UnknownTicket,

    /// The remote collaborator failed (transport or non-2xx).
    #[error("Backend error: {0}")]
    Backend(String),
}

impl EngineError {
    /// Wrap any collaborator error, keeping its message.
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Convenience type alias for engine results.
pub type EngineResult<T> = Result<T, EngineError>;
