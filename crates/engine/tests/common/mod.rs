//! Scripted in-memory backend and fixtures for session tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{TimeZone, Utc};
use leadbridge_core::destination::DestinationConfig;
use leadbridge_core::filters::FilterQuery;
use leadbridge_core::leads::{ArchivedLead, ArchivedPage, FacetMetadata, FacetOption};
use leadbridge_core::payload::SelectionPayload;
use leadbridge_core::redistribution::{
    AuditEntry, ExecuteRequest, ExecuteResponse, ImportBatchRequest, ImportBatchResponse, Job,
    JobStatus, RedistributionPreview,
};
use leadbridge_core::types::RecordId;
use leadbridge_engine::LeadsBackend;

/// Failure returned by the scripted backend.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct StubError(pub String);

/// A call received by the scripted backend.
#[derive(Debug, Clone)]
pub enum Call {
    List {
        query: FilterQuery,
        page: u32,
        per_page: u32,
    },
    Preview(SelectionPayload, DestinationConfig),
    Execute(ExecuteRequest),
    Import(ImportBatchRequest),
}

/// Backend that replays queued responses in order and records every call.
///
/// An exhausted listing queue answers with an empty page; other exhausted
/// queues answer with an error so a missing script is obvious.
#[derive(Default)]
pub struct ScriptedBackend {
    pages: Mutex<VecDeque<Result<ArchivedPage, StubError>>>,
    previews: Mutex<VecDeque<Result<RedistributionPreview, StubError>>>,
    executes: Mutex<VecDeque<Result<ExecuteResponse, StubError>>>,
    imports: Mutex<VecDeque<Result<ImportBatchResponse, StubError>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_page(&self, page: Result<ArchivedPage, StubError>) {
        self.pages.lock().unwrap().push_back(page);
    }

    pub fn push_preview(&self, preview: Result<RedistributionPreview, StubError>) {
        self.previews.lock().unwrap().push_back(preview);
    }

    pub fn push_execute(&self, response: Result<ExecuteResponse, StubError>) {
        self.executes.lock().unwrap().push_back(response);
    }

    pub fn push_import(&self, response: Result<ImportBatchResponse, StubError>) {
        self.imports.lock().unwrap().push_back(response);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::List { .. }))
            .count()
    }

    pub fn execute_requests(&self) -> Vec<ExecuteRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Execute(req) => Some(req),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl LeadsBackend for ScriptedBackend {
    type Error = StubError;

    async fn list_archived(
        &self,
        query: &FilterQuery,
        page: u32,
        per_page: u32,
    ) -> Result<ArchivedPage, StubError> {
        self.record(Call::List {
            query: query.clone(),
            page,
            per_page,
        });
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ArchivedPage::default()))
    }

    async fn preview(
        &self,
        selection: &SelectionPayload,
        destination: &DestinationConfig,
    ) -> Result<RedistributionPreview, StubError> {
        self.record(Call::Preview(selection.clone(), destination.clone()));
        self.previews
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(StubError("no scripted preview".into())))
    }

    async fn execute(&self, request: &ExecuteRequest) -> Result<ExecuteResponse, StubError> {
        self.record(Call::Execute(request.clone()));
        self.executes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(StubError("no scripted execute".into())))
    }

    async fn import_batch(
        &self,
        request: &ImportBatchRequest,
    ) -> Result<ImportBatchResponse, StubError> {
        self.record(Call::Import(request.clone()));
        self.imports
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(StubError("no scripted import".into())))
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn lead(id: RecordId) -> ArchivedLead {
    ArchivedLead {
        id,
        name: format!("Lead {id}"),
        status: "lost".to_string(),
        reason: Some("price".to_string()),
        owner: Some("ana".to_string()),
        queue: None,
        tags: Vec::new(),
        archived_at: None,
    }
}

pub fn page(ids: impl IntoIterator<Item = RecordId>, total: u64) -> ArchivedPage {
    ArchivedPage {
        items: ids.into_iter().map(lead).collect(),
        total,
        facets: FacetMetadata {
            owners: vec![FacetOption {
                id: "ana".to_string(),
                label: "Ana".to_string(),
                count: Some(total),
            }],
            ..Default::default()
        },
    }
}

pub fn preview(total_selected: u64) -> RedistributionPreview {
    RedistributionPreview {
        total_selected,
        movable: total_selected,
        ..Default::default()
    }
}

pub fn execute_response(id: i64, request_count: u64) -> ExecuteResponse {
    let at = Utc.with_ymd_and_hms(2024, 5, 2, 10, 0, 0).unwrap();
    ExecuteResponse {
        job: Job {
            id,
            status: JobStatus::Queued,
            requested_count: request_count,
            affected_count: 0,
            skipped_count: 0,
            created_at: at,
            finished_at: None,
        },
        audit: AuditEntry {
            id: 1_000 + id,
            requested_by: "ana@example.com".to_string(),
            requested_at: at,
            job_id: Some(id),
            selection: SelectionPayload::Ids { ids: vec![1] },
            destination: DestinationConfig::default(),
            affected_count: 0,
        },
    }
}

pub fn import_response(accepted: u64) -> ImportBatchResponse {
    ImportBatchResponse {
        batch_id: "batch-1".to_string(),
        accepted,
        rejected: 0,
        errors: Vec::new(),
    }
}
