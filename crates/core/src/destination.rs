//! Redistribution destination draft.
//!
//! A [`DestinationConfig`] says where selected leads go and under which
//! policy. The client only checks field presence; the server decides
//! whether `target_id` actually exists.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// Send every lead to a single queue.
pub const STRATEGY_QUEUE: &str = "queue";
/// Assign every lead to a single user.
pub const STRATEGY_USER: &str = "user";
/// Spread leads evenly across the eligible owners.
pub const STRATEGY_ROUND_ROBIN: &str = "round-robin";

/// All valid strategies.
pub const VALID_STRATEGIES: &[&str] = &[STRATEGY_QUEUE, STRATEGY_USER, STRATEGY_ROUND_ROBIN];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DestinationStrategy {
    #[default]
    Queue,
    User,
    RoundRobin,
}

impl DestinationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queue => STRATEGY_QUEUE,
            Self::User => STRATEGY_USER,
            Self::RoundRobin => STRATEGY_ROUND_ROBIN,
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            STRATEGY_QUEUE => Ok(Self::Queue),
            STRATEGY_USER => Ok(Self::User),
            STRATEGY_ROUND_ROBIN => Ok(Self::RoundRobin),
            other => Err(CoreError::Validation(format!(
                "Unknown destination strategy: '{other}'. Valid strategies: {}",
                VALID_STRATEGIES.join(", ")
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

pub const PRIORITY_LOW: &str = "low";
pub const PRIORITY_BALANCED: &str = "balanced";
pub const PRIORITY_HIGH: &str = "high";
pub const PRIORITY_URGENT: &str = "urgent";

/// All valid priorities.
pub const VALID_PRIORITIES: &[&str] =
    &[PRIORITY_LOW, PRIORITY_BALANCED, PRIORITY_HIGH, PRIORITY_URGENT];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DestinationPriority {
    Low,
    #[default]
    Balanced,
    High,
    Urgent,
}

impl DestinationPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => PRIORITY_LOW,
            Self::Balanced => PRIORITY_BALANCED,
            Self::High => PRIORITY_HIGH,
            Self::Urgent => PRIORITY_URGENT,
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            PRIORITY_LOW => Ok(Self::Low),
            PRIORITY_BALANCED => Ok(Self::Balanced),
            PRIORITY_HIGH => Ok(Self::High),
            PRIORITY_URGENT => Ok(Self::Urgent),
            other => Err(CoreError::Validation(format!(
                "Unknown destination priority: '{other}'. Valid priorities: {}",
                VALID_PRIORITIES.join(", ")
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// DestinationConfig
// ---------------------------------------------------------------------------

/// Where and how selected leads are redistributed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationConfig {
    pub strategy: DestinationStrategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,
    pub priority: DestinationPriority,
    pub preserve_ownership: bool,
    pub notify_owners: bool,
    #[serde(default)]
    pub notes: String,
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            strategy: DestinationStrategy::Queue,
            target_id: None,
            target_name: None,
            priority: DestinationPriority::Balanced,
            preserve_ownership: false,
            notify_owners: true,
            notes: String::new(),
        }
    }
}

impl DestinationConfig {
    pub fn with_strategy(mut self, strategy: DestinationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the target id and its display name together.
    pub fn with_target(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.target_id = Some(id.into());
        self.target_name = Some(name.into());
        self
    }

    pub fn without_target(mut self) -> Self {
        self.target_id = None;
        self.target_name = None;
        self
    }

    pub fn with_priority(mut self, priority: DestinationPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_preserve_ownership(mut self, preserve: bool) -> Self {
        self.preserve_ownership = preserve;
        self
    }

    pub fn with_notify_owners(mut self, notify: bool) -> Self {
        self.notify_owners = notify;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Whether a non-blank target id is present. Presence only.
    pub fn has_target(&self) -> bool {
        self.target_id
            .as_deref()
            .is_some_and(|id| !id.trim().is_empty())
    }
}
