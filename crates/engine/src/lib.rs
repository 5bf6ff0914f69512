//! Bulk selection and redistribution engine for archived leads.
//!
//! The engine is a single-owner state store per operator session. It never
//! blocks and holds no locks: supersedable calls (list fetch, preview) are
//! ordered by request sequence numbers, mutating calls (execute, import)
//! are guarded by a single in-flight flag.
//!
//! Every remote call is split into a `begin_*` step that returns a ticket
//! and a `complete_*` step that applies the response. The async helpers on
//! [`RedistributionSession`] chain the two around a [`LeadsBackend`], while
//! callers that need several requests in flight at once drive the steps
//! themselves.

pub mod backend;
pub mod config;
pub mod error;
pub mod list_sync;
pub mod orchestrator;
pub mod session;

pub use backend::LeadsBackend;
pub use config::EngineConfig;
pub use error::EngineError;
pub use list_sync::{ListRequest, ListSyncController, ReloadOutcome};
pub use orchestrator::{
    ExecuteTicket, ImportTicket, PreviewOutcome, PreviewTicket, RedistributionOrchestrator,
};
pub use session::{MutationCompletion, RedistributionSession};
