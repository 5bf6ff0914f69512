//! Selection payload sent to the preview and execute endpoints.
//!
//! This is the one piece of the selection model that crosses the wire
//! verbatim, so its JSON shape is fixed:
//!
//! - `{"type": "ids", "ids": [...]}`
//! - `{"type": "all", "filters": {...}, "excludedIds": [...]}` where
//!   `excludedIds` is omitted when empty.

use serde::{Deserialize, Serialize};

use crate::filters::{to_query_payload, FilterQuery, FilterSet};
use crate::selection::SelectionState;
use crate::types::RecordId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SelectionPayload {
    Ids {
        ids: Vec<RecordId>,
    },
    All {
        filters: FilterQuery,
        #[serde(
            rename = "excludedIds",
            default,
            skip_serializing_if = "Vec::is_empty"
        )]
        excluded_ids: Vec<RecordId>,
    },
}

impl SelectionPayload {
    /// Short label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ids { .. } => "ids",
            Self::All { .. } => "all",
        }
    }

    /// Exact record count for id payloads; `None` for filter payloads,
    /// whose size only the server knows.
    pub fn explicit_len(&self) -> Option<usize> {
        match self {
            Self::Ids { ids } => Some(ids.len()),
            Self::All { .. } => None,
        }
    }
}

/// Convert the current selection into a wire payload.
///
/// Returns `None` when there is nothing to redistribute:
///
/// - an explicit selection with no ids, or
/// - an all-matching selection whose filter query has no constraint
///   ([`FilterQuery::is_empty`]), which would otherwise target every
///   archived record.
pub fn build_selection_payload(
    selection: &SelectionState,
    filters: &FilterSet,
) -> Option<SelectionPayload> {
    match selection {
        SelectionState::Explicit { selected } => {
            if selected.is_empty() {
                return None;
            }
            Some(SelectionPayload::Ids {
                ids: selected.iter().copied().collect(),
            })
        }
        SelectionState::AllMatching { excluded } => {
            let query = to_query_payload(filters);
            if query.is_empty() {
                return None;
            }
            Some(SelectionPayload::All {
                filters: query,
                excluded_ids: excluded.iter().copied().collect(),
            })
        }
    }
}
