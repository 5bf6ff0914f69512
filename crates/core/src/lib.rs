//! Domain model for the archived-lead redistribution engine.
//!
//! Everything in this crate is pure: filter translation, pagination
//! arithmetic, the selection state machine, destination drafts, the
//! selection payload that crosses the wire, and the job/audit records
//! returned by the remote service. No I/O lives here, so the same types
//! serve the engine, the HTTP client, and any future tooling.

pub mod destination;
pub mod error;
pub mod filters;
pub mod leads;
pub mod pagination;
pub mod payload;
pub mod redistribution;
pub mod selection;
pub mod sequence;
pub mod types;
