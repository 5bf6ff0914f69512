//! The remote collaborator the engine orchestrates.
//!
//! [`LeadsBackend`] is the only way the engine reaches the outside world.
//! The HTTP implementation lives in `leadbridge-client`; tests use an
//! in-memory one.

use std::future::Future;

use leadbridge_core::destination::DestinationConfig;
use leadbridge_core::filters::FilterQuery;
use leadbridge_core::leads::ArchivedPage;
use leadbridge_core::payload::SelectionPayload;
use leadbridge_core::redistribution::{
    ExecuteRequest, ExecuteResponse, ImportBatchRequest, ImportBatchResponse,
    RedistributionPreview,
};

/// Four logical operations exposed by the archived-lead service.
///
/// Timeouts and retries belong to the implementation, not to the engine.
pub trait LeadsBackend: Send + Sync {
    /// Error type; only its `Display` output reaches the engine's caller.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch one page of archived records plus facet metadata.
    fn list_archived(
        &self,
        query: &FilterQuery,
        page: u32,
        per_page: u32,
    ) -> impl Future<Output = Result<ArchivedPage, Self::Error>> + Send;

    /// Dry-run a redistribution. Must not mutate any record.
    fn preview(
        &self,
        selection: &SelectionPayload,
        destination: &DestinationConfig,
    ) -> impl Future<Output = Result<RedistributionPreview, Self::Error>> + Send;

    /// Run a redistribution and return its job and audit records.
    fn execute(
        &self,
        request: &ExecuteRequest,
    ) -> impl Future<Output = Result<ExecuteResponse, Self::Error>> + Send;

    /// Ingest a batch of records routed to the given destination.
    fn import_batch(
        &self,
        request: &ImportBatchRequest,
    ) -> impl Future<Output = Result<ImportBatchResponse, Self::Error>> + Send;
}
