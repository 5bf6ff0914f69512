//! HTTP client for the archived-lead redistribution service.
//!
//! [`LeadsApiClient`] implements [`leadbridge_engine::LeadsBackend`] over
//! `reqwest`, so a [`leadbridge_engine::RedistributionSession`] can drive
//! the real service.

pub mod api;
pub mod config;
pub mod error;

pub use api::LeadsApiClient;
pub use config::ClientConfig;
pub use error::ApiError;
