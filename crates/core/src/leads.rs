//! Archived-lead listing rows and facet metadata.

use serde::{Deserialize, Serialize};

use crate::types::{RecordId, Timestamp};

/// One row of the archived-lead listing.
///
/// Only the fields the redistribution screens display are modelled; the
/// rest of a lead's business data stays on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedLead {
    pub id: RecordId,
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub queue: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub archived_at: Option<Timestamp>,
}

/// A distinct value available to a filter control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetOption {
    pub id: String,
    pub label: String,
    /// Number of matching records, when the server reports it.
    #[serde(default)]
    pub count: Option<u64>,
}

/// Distinct reasons/owners/queues/tags for the current result set, so the
/// filter controls only offer values that can still match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacetMetadata {
    pub reasons: Vec<FacetOption>,
    pub owners: Vec<FacetOption>,
    pub queues: Vec<FacetOption>,
    pub tags: Vec<FacetOption>,
}

/// One page of the archived-lead listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedPage {
    pub items: Vec<ArchivedLead>,
    pub total: u64,
    #[serde(rename = "facetMetadata", default)]
    pub facets: FacetMetadata,
}

impl ArchivedPage {
    /// Ids of the rows on this page, in display order.
    pub fn ids(&self) -> Vec<RecordId> {
        self.items.iter().map(|lead| lead.id).collect()
    }
}
