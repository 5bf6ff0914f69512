use leadbridge_core::error::CoreError;
use leadbridge_core::pagination::{clamp_per_page, DEFAULT_PER_PAGE};

/// Default number of jobs/audit entries kept in session history.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Engine configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Initial page size for the archived listing.
    pub per_page: u32,
    /// Maximum number of jobs and audit entries kept in memory
    /// (oldest dropped first).
    pub history_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var               | Default |
    /// |-----------------------|---------|
    /// | `LEADS_PER_PAGE`      | `20`    |
    /// | `LEADS_HISTORY_LIMIT` | `50`    |
    ///
    /// Both must be positive integers. `LEADS_PER_PAGE` is capped at
    /// [`MAX_PER_PAGE`](leadbridge_core::pagination::MAX_PER_PAGE).
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CoreError> {
        let per_page = match lookup("LEADS_PER_PAGE") {
            Some(raw) => parse_positive(&raw, "LEADS_PER_PAGE")?,
            None => DEFAULT_PER_PAGE,
        };

        let history_limit = match lookup("LEADS_HISTORY_LIMIT") {
            Some(raw) => parse_positive(&raw, "LEADS_HISTORY_LIMIT")?,
            None => DEFAULT_HISTORY_LIMIT,
        };

        Ok(Self {
            per_page: clamp_per_page(per_page),
            history_limit,
        })
    }
}

/// Parse a strictly positive integer, naming `key` in the error.
fn parse_positive<T>(raw: &str, key: &str) -> Result<T, CoreError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    raw.trim()
        .parse::<T>()
        .ok()
        .filter(|value| *value > T::default())
        .ok_or_else(|| CoreError::Validation(format!("{key} must be a positive integer, got '{raw}'")))
}
