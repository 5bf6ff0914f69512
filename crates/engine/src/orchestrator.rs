//! Preview, execute, and import orchestration.
//!
//! [`RedistributionOrchestrator`] owns the destination draft, the cached
//! preview, and the append-only job and audit histories. It turns the
//! caller's selection and filters into a [`SelectionPayload`] and refuses
//! to talk to the backend when there is nothing to redistribute.
//!
//! Previews supersede each other by sequence number. Execute and import
//! are never superseded: while one is pending, further mutations are
//! rejected locally.

use std::collections::VecDeque;

use leadbridge_core::destination::DestinationConfig;
use leadbridge_core::error::CoreError;
use leadbridge_core::filters::FilterSet;
use leadbridge_core::payload::{build_selection_payload, SelectionPayload};
use leadbridge_core::redistribution::{
    AuditEntry, ExecuteRequest, ExecuteResponse, ImportBatchRequest, ImportBatchResponse, Job,
    RedistributionPreview,
};
use leadbridge_core::selection::SelectionState;
use leadbridge_core::sequence::RequestSequencer;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

// ---------------------------------------------------------------------------
// Tickets
// ---------------------------------------------------------------------------

/// An issued preview request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewTicket {
    pub seq: u64,
    pub selection: SelectionPayload,
    pub destination: DestinationConfig,
}

/// What happened to a preview response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewOutcome {
    Applied,
    /// A newer preview was issued (or the selection was reset); dropped.
    Stale,
}

/// An issued execute request. Holds its own copy of the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteTicket {
    pub request: ExecuteRequest,
}

/// An issued import request.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportTicket {
    pub request: ImportBatchRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingMutation {
    Execute(Uuid),
    Import,
}

/// The last execute that failed, kept so a retry of the same work reuses
/// its idempotency key.
#[derive(Debug, Clone)]
struct FailedAttempt {
    selection: SelectionPayload,
    destination: DestinationConfig,
    idempotency_key: Uuid,
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct RedistributionOrchestrator {
    destination: DestinationConfig,
    preview: Option<RedistributionPreview>,
    preview_seq: RequestSequencer,
    preview_loading: bool,
    preview_error: Option<String>,
    pending: Option<PendingMutation>,
    failed_attempt: Option<FailedAttempt>,
    jobs: VecDeque<Job>,
    audit: VecDeque<AuditEntry>,
    last_import: Option<ImportBatchResponse>,
    history_limit: usize,
}

impl RedistributionOrchestrator {
    /// Create an orchestrator keeping at most `history_limit` jobs and
    /// audit entries (at least one).
    pub fn new(history_limit: usize) -> Self {
        Self {
            destination: DestinationConfig::default(),
            preview: None,
            preview_seq: RequestSequencer::new(),
            preview_loading: false,
            preview_error: None,
            pending: None,
            failed_attempt: None,
            jobs: VecDeque::new(),
            audit: VecDeque::new(),
            last_import: None,
            history_limit: history_limit.max(1),
        }
    }

    // ---- destination draft ----

    /// The destination draft sent with the next preview, execute or import.
    pub fn destination(&self) -> &DestinationConfig {
        &self.destination
    }

    /// Replace the destination draft. A different draft drops the cached
    /// preview and makes any in-flight preview stale.
    pub fn set_destination(&mut self, destination: DestinationConfig) {
        if destination != self.destination {
            self.destination = destination;
            self.discard_preview();
        }
    }

    /// Restore the default destination draft.
    pub fn reset_destination(&mut self) {
        self.set_destination(DestinationConfig::default());
    }

    // ---- read side ----

    /// Latest applied preview, if any.
    pub fn preview_data(&self) -> Option<&RedistributionPreview> {
        self.preview.as_ref()
    }

    /// Whether the latest issued preview is still awaiting its response.
    pub fn is_preview_loading(&self) -> bool {
        self.preview_loading
    }

    /// Message of the latest preview failure, cleared by the next success
    /// or by [`discard_preview`](Self::discard_preview).
    pub fn preview_error(&self) -> Option<&str> {
        self.preview_error.as_deref()
    }

    /// Whether an execute or import is awaiting its response. Callers
    /// disable the triggering control while this is `true`.
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Executed jobs, newest first.
    pub fn jobs_history(&self) -> impl ExactSizeIterator<Item = &Job> {
        self.jobs.iter()
    }

    /// Audit entries, newest first.
    pub fn audit_trail(&self) -> impl ExactSizeIterator<Item = &AuditEntry> {
        self.audit.iter()
    }

    /// Response of the last successful import batch.
    pub fn last_import(&self) -> Option<&ImportBatchResponse> {
        self.last_import.as_ref()
    }

    /// See [`build_selection_payload`].
    pub fn build_selection_payload(
        &self,
        selection: &SelectionState,
        filters: &FilterSet,
    ) -> Option<SelectionPayload> {
        build_selection_payload(selection, filters)
    }

    // ---- preview ----

    /// Issue a preview. Any preview still in flight becomes stale.
    pub fn begin_preview(
        &mut self,
        selection: &SelectionState,
        filters: &FilterSet,
    ) -> EngineResult<PreviewTicket> {
        let payload =
            build_selection_payload(selection, filters).ok_or(EngineError::NothingSelected)?;
        let seq = self.preview_seq.issue();
        self.preview_loading = true;
        tracing::debug!(seq, selection = payload.kind(), "Issuing redistribution preview");
        Ok(PreviewTicket {
            seq,
            selection: payload,
            destination: self.destination.clone(),
        })
    }

    /// Apply the response for preview `seq`. Only the latest issued preview
    /// is ever visible; older responses are dropped, including failures.
    pub fn complete_preview(
        &mut self,
        seq: u64,
        result: Result<RedistributionPreview, EngineError>,
    ) -> EngineResult<PreviewOutcome> {
        if !self.preview_seq.is_latest(seq) {
            tracing::debug!(seq, latest = self.preview_seq.latest(), "Dropping stale preview response");
            return Ok(PreviewOutcome::Stale);
        }
        self.preview_loading = false;

        match result {
            Ok(preview) => {
                self.preview = Some(preview);
                self.preview_error = None;
                Ok(PreviewOutcome::Applied)
            }
            Err(e) => {
                tracing::warn!(seq, error = %e, "Redistribution preview failed");
                self.preview_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Drop the cached preview and make any in-flight preview stale.
    pub fn discard_preview(&mut self) {
        self.preview = None;
        self.preview_error = None;
        self.preview_loading = false;
        self.preview_seq.invalidate();
    }

    // ---- execute ----

    /// Issue an execute for the current selection and destination draft.
    ///
    /// Fails locally with [`EngineError::MutationInFlight`] while another
    /// execute or import is pending and with [`EngineError::NothingSelected`]
    /// when no payload can be built. A retry of the exact work that last
    /// failed reuses that attempt's idempotency key.
    pub fn begin_execute(
        &mut self,
        selection: &SelectionState,
        filters: &FilterSet,
        requested_by: &str,
    ) -> EngineResult<ExecuteTicket> {
        if self.pending.is_some() {
            return Err(EngineError::MutationInFlight);
        }
        let requested_by = requested_by.trim();
        if requested_by.is_empty() {
            return Err(CoreError::Validation("requested_by must not be empty".to_string()).into());
        }
        let payload =
            build_selection_payload(selection, filters).ok_or(EngineError::NothingSelected)?;

        let idempotency_key = match &self.failed_attempt {
            Some(failed)
                if failed.selection == payload && failed.destination == self.destination =>
            {
                failed.idempotency_key
            }
            _ => Uuid::new_v4(),
        };

        self.pending = Some(PendingMutation::Execute(idempotency_key));
        tracing::debug!(
            selection = payload.kind(),
            ids = payload.explicit_len(),
            %idempotency_key,
            "Issuing redistribution execute"
        );

        Ok(ExecuteTicket {
            request: ExecuteRequest {
                selection: payload,
                destination: self.destination.clone(),
                requested_by: requested_by.to_string(),
                idempotency_key,
            },
        })
    }

    /// Apply the response for an execute ticket.
    ///
    /// On success the job and audit entry are prepended to their histories
    /// and the cached preview is dropped. On failure nothing but the
    /// retry bookkeeping changes and the error is returned.
    pub fn complete_execute(
        &mut self,
        ticket: ExecuteTicket,
        result: Result<ExecuteResponse, EngineError>,
    ) -> EngineResult<ExecuteResponse> {
        let key = ticket.request.idempotency_key;
        if self.pending != Some(PendingMutation::Execute(key)) {
            return Err(EngineError::UnknownTicket);
        }
        self.pending = None;

        match result {
            Ok(response) => {
                tracing::info!(
                    job_id = response.job.id,
                    audit_id = response.audit.id,
                    requested = response.job.requested_count,
                    status = response.job.status.as_str(),
                    "Redistribution executed"
                );
                self.failed_attempt = None;
                self.push_job(response.job.clone());
                self.push_audit(response.audit.clone());
                self.discard_preview();
                Ok(response)
            }
            Err(e) => {
                tracing::warn!(idempotency_key = %key, error = %e, "Redistribution execute failed");
                self.failed_attempt = Some(FailedAttempt {
                    selection: ticket.request.selection,
                    destination: ticket.request.destination,
                    idempotency_key: key,
                });
                Err(e)
            }
        }
    }

    // ---- import ----

    /// Issue an import batch carrying the current destination draft.
    pub fn begin_import(
        &mut self,
        records: Vec<serde_json::Value>,
        source: Option<String>,
    ) -> EngineResult<ImportTicket> {
        if self.pending.is_some() {
            return Err(EngineError::MutationInFlight);
        }
        if records.is_empty() {
            return Err(CoreError::Validation(
                "Import batch must contain at least one record".to_string(),
            )
            .into());
        }

        self.pending = Some(PendingMutation::Import);
        tracing::debug!(records = records.len(), "Issuing import batch");

        Ok(ImportTicket {
            request: ImportBatchRequest {
                records,
                source,
                destination: self.destination.clone(),
            },
        })
    }

    /// Apply the response for an import ticket. Success records the batch
    /// as [`last_import`](Self::last_import); failure changes nothing else.
    pub fn complete_import(
        &mut self,
        _ticket: ImportTicket,
        result: Result<ImportBatchResponse, EngineError>,
    ) -> EngineResult<ImportBatchResponse> {
        if self.pending != Some(PendingMutation::Import) {
            return Err(EngineError::UnknownTicket);
        }
        self.pending = None;

        match result {
            Ok(response) => {
                tracing::info!(
                    batch_id = %response.batch_id,
                    accepted = response.accepted,
                    rejected = response.rejected,
                    "Import batch accepted"
                );
                self.last_import = Some(response.clone());
                Ok(response)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Import batch failed");
                Err(e)
            }
        }
    }

    // ---- history ----

    fn push_job(&mut self, job: Job) {
        self.jobs.push_front(job);
        self.jobs.truncate(self.history_limit);
    }

    fn push_audit(&mut self, entry: AuditEntry) {
        self.audit.push_front(entry);
        self.audit.truncate(self.history_limit);
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use leadbridge_core::filters::LeadStatus;

    use super::*;

    fn filters() -> FilterSet {
        FilterSet::default().with_status(LeadStatus::Lost)
    }

    fn selected(ids: &[i64]) -> SelectionState {
        SelectionState::Explicit {
            selected: ids.iter().copied().collect(),
        }
    }

    #[test]
    fn preview_requires_a_payload() {
        let mut orch = RedistributionOrchestrator::new(10);
        let err = orch
            .begin_preview(&SelectionState::default(), &filters())
            .unwrap_err();
        assert_matches!(err, EngineError::NothingSelected);
        assert!(!orch.is_preview_loading());
    }

    #[test]
    fn latest_preview_wins_regardless_of_arrival() {
        let mut orch = RedistributionOrchestrator::new(10);
        let p1 = orch.begin_preview(&selected(&[1]), &filters()).unwrap();
        let p2 = orch.begin_preview(&selected(&[1, 2]), &filters()).unwrap();

        let second = RedistributionPreview {
            total_selected: 2,
            ..Default::default()
        };
        let first = RedistributionPreview {
            total_selected: 1,
            ..Default::default()
        };
        assert_eq!(orch.complete_preview(p2.seq, Ok(second.clone())).unwrap(), PreviewOutcome::Applied);
        assert_eq!(orch.complete_preview(p1.seq, Ok(first)).unwrap(), PreviewOutcome::Stale);
        assert_eq!(orch.preview_data(), Some(&second));
    }

    #[test]
    fn discard_makes_in_flight_preview_stale() {
        let mut orch = RedistributionOrchestrator::new(10);
        let ticket = orch.begin_preview(&selected(&[1]), &filters()).unwrap();
        orch.discard_preview();
        let outcome = orch
            .complete_preview(ticket.seq, Ok(RedistributionPreview::default()))
            .unwrap();
        assert_eq!(outcome, PreviewOutcome::Stale);
        assert_eq!(orch.preview_data(), None);
    }

    #[test]
    fn destination_edit_drops_preview() {
        let mut orch = RedistributionOrchestrator::new(10);
        let ticket = orch.begin_preview(&selected(&[1]), &filters()).unwrap();
        orch.complete_preview(ticket.seq, Ok(RedistributionPreview::default()))
            .unwrap();

        // Same draft: nothing to invalidate.
        orch.set_destination(DestinationConfig::default());
        assert!(orch.preview_data().is_some());

        let in_flight = orch.begin_preview(&selected(&[1]), &filters()).unwrap();
        orch.set_destination(DestinationConfig::default().with_target("q2", "Queue 2"));
        assert_eq!(orch.preview_data(), None);
        let outcome = orch
            .complete_preview(in_flight.seq, Ok(RedistributionPreview::default()))
            .unwrap();
        assert_eq!(outcome, PreviewOutcome::Stale);
    }

    #[test]
    fn ticket_snapshots_destination() {
        let mut orch = RedistributionOrchestrator::new(10);
        orch.set_destination(DestinationConfig::default().with_target("q1", "Queue 1"));
        let ticket = orch.begin_execute(&selected(&[1]), &filters(), "ana").unwrap();
        orch.reset_destination();
        assert_eq!(ticket.request.destination.target_id.as_deref(), Some("q1"));
        assert!(!orch.destination().has_target());
    }

    #[test]
    fn second_mutation_is_rejected_while_pending() {
        let mut orch = RedistributionOrchestrator::new(10);
        let _ticket = orch.begin_execute(&selected(&[1]), &filters(), "ana").unwrap();
        assert!(orch.is_busy());
        assert_matches!(
            orch.begin_execute(&selected(&[1]), &filters(), "ana"),
            Err(EngineError::MutationInFlight)
        );
        assert_matches!(
            orch.begin_import(vec![serde_json::json!({})], None),
            Err(EngineError::MutationInFlight)
        );
    }

    #[test]
    fn blank_requester_is_rejected() {
        let mut orch = RedistributionOrchestrator::new(10);
        assert_matches!(
            orch.begin_execute(&selected(&[1]), &filters(), "  "),
            Err(EngineError::Core(CoreError::Validation(_)))
        );
        assert!(!orch.is_busy());
    }

    #[test]
    fn retry_of_same_work_reuses_idempotency_key() {
        let mut orch = RedistributionOrchestrator::new(10);
        let first = orch.begin_execute(&selected(&[1, 2]), &filters(), "ana").unwrap();
        let key = first.request.idempotency_key;
        orch.complete_execute(first, Err(EngineError::Backend("502".into())))
            .unwrap_err();

        let retry = orch.begin_execute(&selected(&[1, 2]), &filters(), "ana").unwrap();
        assert_eq!(retry.request.idempotency_key, key);
        orch.complete_execute(retry, Err(EngineError::Backend("502".into())))
            .unwrap_err();

        let changed = orch.begin_execute(&selected(&[1]), &filters(), "ana").unwrap();
        assert_ne!(changed.request.idempotency_key, key);
    }

    #[test]
    fn completing_a_foreign_ticket_is_rejected() {
        let mut orch = RedistributionOrchestrator::new(10);
        let ticket = orch.begin_execute(&selected(&[1]), &filters(), "ana").unwrap();
        let mut forged = ticket.clone();
        forged.request.idempotency_key = Uuid::new_v4();
        assert_matches!(
            orch.complete_execute(forged, Err(EngineError::Backend("x".into()))),
            Err(EngineError::UnknownTicket)
        );
        assert!(orch.is_busy());
    }

    #[test]
    fn empty_import_is_rejected() {
        let mut orch = RedistributionOrchestrator::new(10);
        assert_matches!(
            orch.begin_import(Vec::new(), None),
            Err(EngineError::Core(CoreError::Validation(_)))
        );
        assert!(!orch.is_busy());
    }
}
