//! Keeps the visible page of archived leads in step with the filters and
//! the page window.
//!
//! The controller owns [`FilterSet`] and [`Pagination`]. Every mutation
//! returns the [`ListRequest`] to send; responses come back through
//! [`ListSyncController::complete_reload`], which drops anything that is no
//! longer the latest request. Selection resets are applied by the session
//! around these calls.

use leadbridge_core::filters::{FilterQuery, FilterSet};
use leadbridge_core::leads::{ArchivedLead, ArchivedPage, FacetMetadata};
use leadbridge_core::pagination::Pagination;
use leadbridge_core::sequence::RequestSequencer;
use leadbridge_core::types::RecordId;

use crate::error::EngineError;

/// One issued listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub seq: u64,
    pub query: FilterQuery,
    pub page: u32,
    pub per_page: u32,
}

/// What happened to a listing response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// The response was current and is now displayed.
    Applied,
    /// A newer request was issued; the response was dropped.
    Stale,
    /// The response was applied but the page fell past the new last page.
    /// The page has been moved back and the returned request must be sent.
    PageClamped(ListRequest),
}

#[derive(Debug)]
pub struct ListSyncController {
    filters: FilterSet,
    pagination: Pagination,
    items: Vec<ArchivedLead>,
    facets: FacetMetadata,
    sequencer: RequestSequencer,
    loading: bool,
    last_error: Option<String>,
}

impl ListSyncController {
    pub fn new(per_page: u32) -> Self {
        Self {
            filters: FilterSet::default(),
            pagination: Pagination::new(per_page),
            items: Vec::new(),
            facets: FacetMetadata::default(),
            sequencer: RequestSequencer::new(),
            loading: false,
            last_error: None,
        }
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn items(&self) -> &[ArchivedLead] {
        &self.items
    }

    pub fn facets(&self) -> &FacetMetadata {
        &self.facets
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message of the last failed fetch, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Ids of the rows currently displayed.
    pub fn page_ids(&self) -> Vec<RecordId> {
        self.items.iter().map(|lead| lead.id).collect()
    }

    // ---- mutations ----

    /// Replace the filters, go back to page 1, and issue a fetch.
    pub fn set_filters(&mut self, filters: FilterSet) -> ListRequest {
        self.filters = filters;
        self.pagination = self.pagination.first_page();
        self.begin_reload()
    }

    /// Move to `page` and issue a fetch.
    pub fn set_page(&mut self, page: u32) -> ListRequest {
        self.pagination = self.pagination.with_page(page);
        self.begin_reload()
    }

    /// Change the page size (back to page 1) and issue a fetch.
    pub fn set_per_page(&mut self, per_page: u32) -> ListRequest {
        self.pagination = self.pagination.with_per_page(per_page);
        self.begin_reload()
    }

    /// Issue a fetch for the current filters and page. Any earlier fetch
    /// still in flight becomes stale.
    pub fn begin_reload(&mut self) -> ListRequest {
        let seq = self.sequencer.issue();
        self.loading = true;
        tracing::debug!(
            seq,
            page = self.pagination.page(),
            per_page = self.pagination.per_page(),
            "Issuing archived listing request"
        );
        ListRequest {
            seq,
            query: self.filters.to_query(),
            page: self.pagination.page(),
            per_page: self.pagination.per_page(),
        }
    }

    /// Apply the response for request `seq`.
    ///
    /// Stale responses are dropped whatever their content. A current
    /// failure keeps the previously displayed rows, facets and total,
    /// records the message, and is returned to the caller.
    pub fn complete_reload(
        &mut self,
        seq: u64,
        result: Result<ArchivedPage, EngineError>,
    ) -> Result<ReloadOutcome, EngineError> {
        if !self.sequencer.is_latest(seq) {
            tracing::debug!(seq, latest = self.sequencer.latest(), "Dropping stale listing response");
            return Ok(ReloadOutcome::Stale);
        }
        self.loading = false;

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(seq, error = %e, "Archived listing fetch failed");
                self.last_error = Some(e.to_string());
                return Err(e);
            }
        };

        self.pagination = self.pagination.with_total(page.total);
        self.items = page.items;
        self.facets = page.facets;
        self.last_error = None;

        if let Some(last) = self.pagination.out_of_range_fallback() {
            tracing::debug!(seq, page = last, "Current page past the end, moving back");
            return Ok(ReloadOutcome::PageClamped(self.set_page(last)));
        }

        Ok(ReloadOutcome::Applied)
    }
}
