//! Preview, job, audit, and import records exchanged with the
//! redistribution service.
//!
//! Jobs and audit entries are history: the engine appends them and never
//! edits one after the fact.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::destination::DestinationConfig;
use crate::error::CoreError;
use crate::payload::SelectionPayload;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Job status constants
// ---------------------------------------------------------------------------

pub const JOB_STATUS_QUEUED: &str = "queued";
pub const JOB_STATUS_RUNNING: &str = "running";
pub const JOB_STATUS_COMPLETED: &str = "completed";
pub const JOB_STATUS_FAILED: &str = "failed";
pub const JOB_STATUS_CANCELLED: &str = "cancelled";

/// All valid job statuses.
pub const VALID_JOB_STATUSES: &[&str] = &[
    JOB_STATUS_QUEUED,
    JOB_STATUS_RUNNING,
    JOB_STATUS_COMPLETED,
    JOB_STATUS_FAILED,
    JOB_STATUS_CANCELLED,
];

/// Redistribution job status with string conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => JOB_STATUS_QUEUED,
            Self::Running => JOB_STATUS_RUNNING,
            Self::Completed => JOB_STATUS_COMPLETED,
            Self::Failed => JOB_STATUS_FAILED,
            Self::Cancelled => JOB_STATUS_CANCELLED,
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            JOB_STATUS_QUEUED => Ok(Self::Queued),
            JOB_STATUS_RUNNING => Ok(Self::Running),
            JOB_STATUS_COMPLETED => Ok(Self::Completed),
            JOB_STATUS_FAILED => Ok(Self::Failed),
            JOB_STATUS_CANCELLED => Ok(Self::Cancelled),
            other => Err(CoreError::Validation(format!(
                "Unknown job status: '{other}'. Valid statuses: {}",
                VALID_JOB_STATUSES.join(", ")
            ))),
        }
    }

    /// Whether the job can still change state on the server.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

// ---------------------------------------------------------------------------
// Preview
// ---------------------------------------------------------------------------

/// How many leads one destination target would receive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewBucket {
    pub target_id: String,
    #[serde(default)]
    pub target_name: Option<String>,
    pub count: u64,
}

/// Dry-run result: what an execute would do right now.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RedistributionPreview {
    pub total_selected: u64,
    pub movable: u64,
    pub blocked: u64,
    pub per_target: Vec<PreviewBucket>,
    pub warnings: Vec<String>,
}

// ---------------------------------------------------------------------------
// Job & audit
// ---------------------------------------------------------------------------

/// One executed bulk redistribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: DbId,
    pub status: JobStatus,
    pub requested_count: u64,
    #[serde(default)]
    pub affected_count: u64,
    #[serde(default)]
    pub skipped_count: u64,
    pub created_at: Timestamp,
    #[serde(default)]
    pub finished_at: Option<Timestamp>,
}

/// Immutable record of who asked for what, when, against which snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: DbId,
    pub requested_by: String,
    pub requested_at: Timestamp,
    #[serde(default)]
    pub job_id: Option<DbId>,
    pub selection: SelectionPayload,
    pub destination: DestinationConfig,
    #[serde(default)]
    pub affected_count: u64,
}

/// Body of `POST redistribution/execute`.
///
/// `idempotency_key` is generated by the client and also sent as the
/// `Idempotency-Key` header, so a retry after an ambiguous failure can be
/// recognised server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    pub selection: SelectionPayload,
    pub destination: DestinationConfig,
    pub requested_by: String,
    pub idempotency_key: Uuid,
}

/// Response of `POST redistribution/execute`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteResponse {
    pub job: Job,
    pub audit: AuditEntry,
}

// ---------------------------------------------------------------------------
// Import batch
// ---------------------------------------------------------------------------

/// Body of `POST records/import`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportBatchRequest {
    pub records: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub destination: DestinationConfig,
}

/// A row the server refused during import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRowError {
    pub row: u64,
    pub message: String,
}

/// Response of `POST records/import`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportBatchResponse {
    pub batch_id: String,
    pub accepted: u64,
    #[serde(default)]
    pub rejected: u64,
    #[serde(default)]
    pub errors: Vec<ImportRowError>,
}
