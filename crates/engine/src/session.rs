//! Per-operator redistribution session.
//!
//! [`RedistributionSession`] composes the listing, the selection, and the
//! orchestrator into one store. It is the only place where the coupling
//! between them lives: every filter or page change clears the selection
//! and the cached preview, any selection or destination edit drops the
//! cached preview, and every successful execute or import clears what it
//! must and asks for a fresh page.

use leadbridge_core::destination::DestinationConfig;
use leadbridge_core::filters::FilterSet;
use leadbridge_core::leads::{ArchivedLead, ArchivedPage, FacetMetadata};
use leadbridge_core::pagination::Pagination;
use leadbridge_core::payload::SelectionPayload;
use leadbridge_core::redistribution::{
    AuditEntry, ExecuteResponse, ImportBatchResponse, Job, RedistributionPreview,
};
use leadbridge_core::selection::{PageCheckState, SelectionState};
use leadbridge_core::types::RecordId;

use crate::backend::LeadsBackend;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::list_sync::{ListRequest, ListSyncController, ReloadOutcome};
use crate::orchestrator::{
    ExecuteTicket, ImportTicket, PreviewOutcome, PreviewTicket, RedistributionOrchestrator,
};

/// Result of a successful execute or import: the server response plus the
/// listing request that must now be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationCompletion<T> {
    pub response: T,
    pub reload: ListRequest,
}

#[derive(Debug)]
pub struct RedistributionSession {
    list: ListSyncController,
    selection: SelectionState,
    orchestrator: RedistributionOrchestrator,
}

impl Default for RedistributionSession {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl RedistributionSession {
    /// Empty session: default filters, page 1, nothing selected.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            list: ListSyncController::new(config.per_page),
            selection: SelectionState::default(),
            orchestrator: RedistributionOrchestrator::new(config.history_limit),
        }
    }

    // -----------------------------------------------------------------------
    // Read side
    // -----------------------------------------------------------------------

    pub fn list(&self) -> &ListSyncController {
        &self.list
    }

    pub fn orchestrator(&self) -> &RedistributionOrchestrator {
        &self.orchestrator
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn filters(&self) -> &FilterSet {
        self.list.filters()
    }

    pub fn pagination(&self) -> Pagination {
        self.list.pagination()
    }

    pub fn items(&self) -> &[ArchivedLead] {
        self.list.items()
    }

    pub fn facets(&self) -> &FacetMetadata {
        self.list.facets()
    }

    pub fn destination(&self) -> &DestinationConfig {
        self.orchestrator.destination()
    }

    pub fn preview_data(&self) -> Option<&RedistributionPreview> {
        self.orchestrator.preview_data()
    }

    pub fn jobs_history(&self) -> impl ExactSizeIterator<Item = &Job> {
        self.orchestrator.jobs_history()
    }

    pub fn audit_trail(&self) -> impl ExactSizeIterator<Item = &AuditEntry> {
        self.orchestrator.audit_trail()
    }

    /// Number of records the next bulk operation would target, using the
    /// last known total for all-matching selections.
    pub fn selected_count(&self) -> u64 {
        self.selection.count(self.list.pagination().total())
    }

    pub fn has_selection(&self) -> bool {
        self.selection.has_selection(self.list.pagination().total())
    }

    pub fn is_selected(&self, id: RecordId) -> bool {
        self.selection.is_selected(id)
    }

    /// State of the select-page checkbox for the visible rows.
    pub fn page_check_state(&self) -> PageCheckState {
        self.selection.page_check_state(&self.list.page_ids())
    }

    /// Payload the next preview/execute would send, `None` when the
    /// operation should be disabled.
    pub fn selection_payload(&self) -> Option<SelectionPayload> {
        self.orchestrator
            .build_selection_payload(&self.selection, self.list.filters())
    }

    /// Whether execute can be offered right now.
    pub fn can_execute(&self) -> bool {
        !self.orchestrator.is_busy() && self.selection_payload().is_some()
    }

    // -----------------------------------------------------------------------
    // Filters & pagination (each change resets the selection)
    // -----------------------------------------------------------------------

    /// Replace the filters. Resets to page 1 and clears the selection.
    pub fn set_filters(&mut self, filters: FilterSet) -> ListRequest {
        self.reset_selection();
        self.list.set_filters(filters)
    }

    /// Derive new filters from the current ones.
    pub fn update_filters(&mut self, update: impl FnOnce(FilterSet) -> FilterSet) -> ListRequest {
        let next = update(self.list.filters().clone());
        self.set_filters(next)
    }

    /// Back to the default filters. Same resets as [`set_filters`](Self::set_filters).
    pub fn reset_filters(&mut self) -> ListRequest {
        self.set_filters(FilterSet::default())
    }

    /// Move to `page`, clearing the selection and the cached preview.
    pub fn set_page(&mut self, page: u32) -> ListRequest {
        self.reset_selection();
        self.list.set_page(page)
    }

    /// Change the page size. Returns to page 1 and clears the selection
    /// and the cached preview.
    pub fn set_per_page(&mut self, per_page: u32) -> ListRequest {
        self.reset_selection();
        self.list.set_per_page(per_page)
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    /// Check or uncheck one row.
    pub fn toggle(&mut self, id: RecordId, checked: bool) {
        self.change_selection(|selection| selection.toggle(id, checked));
    }

    /// Check or uncheck every row on the visible page.
    pub fn toggle_current_page(&mut self, checked: bool) {
        let ids = self.list.page_ids();
        self.change_selection(|selection| selection.toggle_page(&ids, checked));
    }

    /// Target every record matching the current filters.
    pub fn select_all_matching(&mut self) {
        self.change_selection(SelectionState::select_all_matching);
    }

    /// Drop the selection and the cached preview.
    pub fn clear_selection(&mut self) {
        self.reset_selection();
    }

    /// Apply a selection edit. A preview only ever describes the selection
    /// it was issued for, so any actual change drops the cached one and
    /// makes an in-flight one stale.
    fn change_selection(&mut self, edit: impl FnOnce(&mut SelectionState)) {
        let before = self.selection.clone();
        edit(&mut self.selection);
        if self.selection != before {
            tracing::debug!(mode = self.selection.mode().as_str(), "Selection changed");
            self.orchestrator.discard_preview();
        }
    }

    fn reset_selection(&mut self) {
        self.selection.clear();
        self.orchestrator.discard_preview();
    }

    // -----------------------------------------------------------------------
    // Destination draft
    // -----------------------------------------------------------------------

    /// Replace the destination draft. Any change drops the cached preview.
    pub fn set_destination(&mut self, destination: DestinationConfig) {
        self.orchestrator.set_destination(destination);
    }

    /// Derive a new destination draft from the current one.
    pub fn update_destination(
        &mut self,
        update: impl FnOnce(DestinationConfig) -> DestinationConfig,
    ) {
        let next = update(self.orchestrator.destination().clone());
        self.orchestrator.set_destination(next);
    }

    pub fn reset_destination(&mut self) {
        self.orchestrator.reset_destination();
    }

    // -----------------------------------------------------------------------
    // Request steps
    // -----------------------------------------------------------------------

    /// Issue a fetch of the current page; earlier fetches become stale.
    pub fn begin_reload(&mut self) -> ListRequest {
        self.list.begin_reload()
    }

    /// Apply a listing response. A clamped page counts as a page change,
    /// so the selection is cleared before the follow-up request is handed
    /// back.
    pub fn complete_reload(
        &mut self,
        seq: u64,
        result: EngineResult<ArchivedPage>,
    ) -> EngineResult<ReloadOutcome> {
        let outcome = self.list.complete_reload(seq, result)?;
        if matches!(outcome, ReloadOutcome::PageClamped(_)) {
            self.reset_selection();
        }
        Ok(outcome)
    }

    /// Issue a preview for the current selection and destination draft.
    pub fn begin_preview(&mut self) -> EngineResult<PreviewTicket> {
        self.orchestrator
            .begin_preview(&self.selection, self.list.filters())
    }

    pub fn complete_preview(
        &mut self,
        seq: u64,
        result: EngineResult<RedistributionPreview>,
    ) -> EngineResult<PreviewOutcome> {
        self.orchestrator.complete_preview(seq, result)
    }

    /// Issue an execute on behalf of `requested_by`.
    pub fn begin_execute(&mut self, requested_by: &str) -> EngineResult<ExecuteTicket> {
        self.orchestrator
            .begin_execute(&self.selection, self.list.filters(), requested_by)
    }

    /// Apply an execute response. On success the selection is cleared and
    /// a reload of the current page is issued; on failure selection,
    /// destination, and preview are left exactly as they were.
    pub fn complete_execute(
        &mut self,
        ticket: ExecuteTicket,
        result: EngineResult<ExecuteResponse>,
    ) -> EngineResult<MutationCompletion<ExecuteResponse>> {
        let response = self.orchestrator.complete_execute(ticket, result)?;
        self.reset_selection();
        let reload = self.list.begin_reload();
        Ok(MutationCompletion { response, reload })
    }

    /// Issue an import batch routed to the destination draft.
    pub fn begin_import(
        &mut self,
        records: Vec<serde_json::Value>,
        source: Option<String>,
    ) -> EngineResult<ImportTicket> {
        self.orchestrator.begin_import(records, source)
    }

    /// Apply an import response. Success reloads the current page; the
    /// selection is left alone.
    pub fn complete_import(
        &mut self,
        ticket: ImportTicket,
        result: EngineResult<ImportBatchResponse>,
    ) -> EngineResult<MutationCompletion<ImportBatchResponse>> {
        let response = self.orchestrator.complete_import(ticket, result)?;
        let reload = self.list.begin_reload();
        Ok(MutationCompletion { response, reload })
    }

    // -----------------------------------------------------------------------
    // Async drivers
    // -----------------------------------------------------------------------

    /// Send `request` and apply its response, following page clamps until
    /// a page is applied or the response goes stale.
    ///
    /// The total can shrink again between a clamp and its follow-up fetch.
    /// Each clamp moves to a strictly lower page and page 1 never clamps,
    /// so the loop ends.
    pub async fn run_reload<B: LeadsBackend>(
        &mut self,
        backend: &B,
        request: ListRequest,
    ) -> EngineResult<()> {
        let mut request = request;
        loop {
            let result = backend
                .list_archived(&request.query, request.page, request.per_page)
                .await
                .map_err(EngineError::backend);
            match self.complete_reload(request.seq, result)? {
                ReloadOutcome::Applied | ReloadOutcome::Stale => return Ok(()),
                ReloadOutcome::PageClamped(next) => request = next,
            }
        }
    }

    /// Reload the current page.
    pub async fn reload<B: LeadsBackend>(&mut self, backend: &B) -> EngineResult<()> {
        let request = self.begin_reload();
        self.run_reload(backend, request).await
    }

    /// Preview the current selection against the destination draft.
    pub async fn preview<B: LeadsBackend>(
        &mut self,
        backend: &B,
    ) -> EngineResult<Option<RedistributionPreview>> {
        let ticket = self.begin_preview()?;
        let result = backend
            .preview(&ticket.selection, &ticket.destination)
            .await
            .map_err(EngineError::backend);
        self.complete_preview(ticket.seq, result)?;
        Ok(self.preview_data().cloned())
    }

    /// Execute the redistribution, then reload the listing.
    ///
    /// A reload failure after a successful execute is recorded on the
    /// listing and logged, but the execute itself still succeeded.
    pub async fn execute<B: LeadsBackend>(
        &mut self,
        backend: &B,
        requested_by: &str,
    ) -> EngineResult<ExecuteResponse> {
        let ticket = self.begin_execute(requested_by)?;
        let result = backend
            .execute(&ticket.request)
            .await
            .map_err(EngineError::backend);
        let completion = self.complete_execute(ticket, result)?;
        if let Err(e) = self.run_reload(backend, completion.reload).await {
            tracing::warn!(error = %e, "Reload after execute failed");
        }
        Ok(completion.response)
    }

    /// Import a batch routed to the destination draft, then reload.
    pub async fn import_batch<B: LeadsBackend>(
        &mut self,
        backend: &B,
        records: Vec<serde_json::Value>,
        source: Option<String>,
    ) -> EngineResult<ImportBatchResponse> {
        let ticket = self.begin_import(records, source)?;
        let result = backend
            .import_batch(&ticket.request)
            .await
            .map_err(EngineError::backend);
        let completion = self.complete_import(ticket, result)?;
        if let Err(e) = self.run_reload(backend, completion.reload).await {
            tracing::warn!(error = %e, "Reload after import failed");
        }
        Ok(completion.response)
    }
}
