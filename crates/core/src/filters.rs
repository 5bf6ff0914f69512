//! Archived-lead filters and their translation to the wire query.
//!
//! [`FilterSet`] is what the operator edits; [`FilterQuery`] is what the
//! listing, preview, and execute calls receive. Translation is pure and
//! total: absent filters are omitted rather than sent as `null`, so two
//! equal filter sets always yield byte-identical queries.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::ReasonId;

// ---------------------------------------------------------------------------
// Status constants
// ---------------------------------------------------------------------------

/// Sentinel meaning "no status constraint". Never sent to the server.
pub const STATUS_ALL: &str = "all";
/// Lead was lost to a competitor or gave up.
pub const STATUS_LOST: &str = "lost";
/// Lead was disqualified by an operator.
pub const STATUS_DISQUALIFIED: &str = "disqualified";
/// Lead never answered any contact attempt.
pub const STATUS_NO_RESPONSE: &str = "no_response";
/// Lead was archived as a duplicate of another record.
pub const STATUS_DUPLICATE: &str = "duplicate";

/// Statuses known to this crate, including the `all` sentinel. The
/// service may define more; see [`LeadStatus::Other`].
pub const VALID_STATUSES: &[&str] = &[
    STATUS_ALL,
    STATUS_LOST,
    STATUS_DISQUALIFIED,
    STATUS_NO_RESPONSE,
    STATUS_DUPLICATE,
];

/// Archive status filter with string conversion.
///
/// Statuses the service defines beyond the known ones are carried as
/// [`LeadStatus::Other`] and sent through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum LeadStatus {
    #[default]
    All,
    Lost,
    Disqualified,
    NoResponse,
    Duplicate,
    Other(String),
}

impl LeadStatus {
    /// Return the wire string representation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => STATUS_ALL,
            Self::Lost => STATUS_LOST,
            Self::Disqualified => STATUS_DISQUALIFIED,
            Self::NoResponse => STATUS_NO_RESPONSE,
            Self::Duplicate => STATUS_DUPLICATE,
            Self::Other(status) => status,
        }
    }

    /// Parse from a string. Known statuses map to their variant, any other
    /// non-blank value becomes [`LeadStatus::Other`].
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s.trim() {
            "" => Err(CoreError::Validation(format!(
                "Lead status must not be blank. Known statuses: {}",
                VALID_STATUSES.join(", ")
            ))),
            STATUS_ALL => Ok(Self::All),
            STATUS_LOST => Ok(Self::Lost),
            STATUS_DISQUALIFIED => Ok(Self::Disqualified),
            STATUS_NO_RESPONSE => Ok(Self::NoResponse),
            STATUS_DUPLICATE => Ok(Self::Duplicate),
            other => Ok(Self::Other(other.to_string())),
        }
    }

    /// Whether this is one of the statuses listed in [`VALID_STATUSES`].
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

// ---------------------------------------------------------------------------
// FilterSet
// ---------------------------------------------------------------------------

/// Inclusive archive-date window. Either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Period {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Operator-facing filters over the archived-lead collection.
///
/// Treat values as immutable: the `with_*` methods consume the set and
/// return a new one, and the session applies a whole new set at once so
/// that pagination and selection are reset in a single transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    pub status: LeadStatus,
    pub reasons: BTreeSet<ReasonId>,
    pub owner: Option<String>,
    pub queue: Option<String>,
    pub tag: Option<String>,
    pub period: Period,
    pub search: String,
}

impl FilterSet {
    /// Set the archive status. [`LeadStatus::All`] removes the constraint.
    pub fn with_status(mut self, status: LeadStatus) -> Self {
        self.status = status;
        self
    }

    /// Replace the reason set. Only the first reason in sort order is sent.
    pub fn with_reasons<I>(mut self, reasons: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<ReasonId>,
    {
        self.reasons = reasons.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict to one owner, or clear the constraint with `None`.
    pub fn with_owner(mut self, owner: Option<impl Into<String>>) -> Self {
        self.owner = owner.map(Into::into);
        self
    }

    /// Restrict to one queue, or clear the constraint with `None`.
    pub fn with_queue(mut self, queue: Option<impl Into<String>>) -> Self {
        self.queue = queue.map(Into::into);
        self
    }

    /// Restrict to one tag, or clear the constraint with `None`.
    pub fn with_tag(mut self, tag: Option<impl Into<String>>) -> Self {
        self.tag = tag.map(Into::into);
        self
    }

    /// Set the archive period. Either bound may be open.
    pub fn with_period(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.period = Period { from, to };
        self
    }

    /// Set the free-text search. Blank text means no search.
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Translate into the wire query. See [`to_query_payload`].
    pub fn to_query(&self) -> FilterQuery {
        to_query_payload(self)
    }
}

// ---------------------------------------------------------------------------
// FilterQuery
// ---------------------------------------------------------------------------

/// Wire-level query consumed by the listing and redistribution endpoints.
///
/// Only constrained fields are present; an all-`None` query means "no
/// constraint at all".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ReasonId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl FilterQuery {
    /// `true` when the query carries no meaningful constraint.
    ///
    /// An "all matching" selection over an empty query would target every
    /// archived record, so the payload builder refuses it.
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.reason.is_none()
            && self.owner.is_none()
            && self.queue.is_none()
            && self.tag.is_none()
            && self.from.is_none()
            && self.to.is_none()
            && self.search.is_none()
    }
}

/// Trim a free-text value, dropping it when nothing is left.
fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Map a [`FilterSet`] to its wire query.
///
/// - `status == all` is omitted.
/// - Blank scalars are omitted.
/// - `reasons` collapses to its first element (the collaborator accepts a
///   single reason).
pub fn to_query_payload(filters: &FilterSet) -> FilterQuery {
    let status = match &filters.status {
        LeadStatus::All => None,
        other => non_blank(Some(other.as_str())),
    };

    let reason = filters
        .reasons
        .iter()
        .find_map(|r| non_blank(Some(r.as_str())));

    FilterQuery {
        status,
        reason,
        owner: non_blank(filters.owner.as_deref()),
        queue: non_blank(filters.queue.as_deref()),
        tag: non_blank(filters.tag.as_deref()),
        from: filters.period.from,
        to: filters.period.to,
        search: non_blank(Some(filters.search.as_str())),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // -- LeadStatus ----------------------------------------------------------

    #[test]
    fn status_round_trips_through_strings() {
        for s in VALID_STATUSES {
            assert_eq!(LeadStatus::from_str(s).unwrap().as_str(), *s);
        }
    }

    #[test]
    fn server_defined_status_is_kept() {
        let status = LeadStatus::from_str("won_back").unwrap();
        assert_eq!(status, LeadStatus::Other("won_back".to_string()));
        assert!(!status.is_known());
        assert_eq!(status.as_str(), "won_back");
    }

    #[test]
    fn blank_status_is_rejected() {
        assert!(LeadStatus::from_str("  ").is_err());
    }

    // -- to_query_payload ----------------------------------------------------

    #[test]
    fn default_filters_produce_empty_query() {
        let query = to_query_payload(&FilterSet::default());
        assert!(query.is_empty());
        assert_eq!(serde_json::to_value(&query).unwrap(), serde_json::json!({}));
    }

    #[test]
    fn all_status_is_omitted() {
        let filters = FilterSet::default().with_status(LeadStatus::All);
        assert_eq!(to_query_payload(&filters).status, None);
    }

    #[test]
    fn concrete_status_is_sent() {
        let filters = FilterSet::default().with_status(LeadStatus::NoResponse);
        assert_eq!(to_query_payload(&filters).status.as_deref(), Some("no_response"));
    }

    #[test]
    fn server_defined_status_is_sent_verbatim() {
        let filters = FilterSet::default().with_status(LeadStatus::Other("on_hold".to_string()));
        let query = to_query_payload(&filters);
        assert_eq!(query.status.as_deref(), Some("on_hold"));
        assert!(!query.is_empty());
    }

    #[test]
    fn blank_scalars_are_omitted() {
        let filters = FilterSet::default()
            .with_owner(Some("   "))
            .with_queue(Some(""))
            .with_tag(None::<String>)
            .with_search("  ");
        assert!(to_query_payload(&filters).is_empty());
    }

    #[test]
    fn scalars_are_trimmed() {
        let filters = FilterSet::default()
            .with_owner(Some(" ana "))
            .with_search(" acme corp ");
        let query = to_query_payload(&filters);
        assert_eq!(query.owner.as_deref(), Some("ana"));
        assert_eq!(query.search.as_deref(), Some("acme corp"));
    }

    #[test]
    fn reasons_collapse_to_first_element() {
        let filters = FilterSet::default().with_reasons(["price", "competitor", "timing"]);
        // BTreeSet ordering makes "competitor" the first element.
        assert_eq!(to_query_payload(&filters).reason.as_deref(), Some("competitor"));
    }

    #[test]
    fn period_serializes_as_iso_dates() {
        let filters =
            FilterSet::default().with_period(Some(date(2024, 1, 1)), Some(date(2024, 3, 31)));
        let json = serde_json::to_value(to_query_payload(&filters)).unwrap();
        assert_eq!(json, serde_json::json!({ "from": "2024-01-01", "to": "2024-03-31" }));
    }

    #[test]
    fn translation_is_deterministic() {
        let filters = FilterSet::default()
            .with_status(LeadStatus::Lost)
            .with_reasons(["price"])
            .with_owner(Some("ana"))
            .with_search("acme");
        assert_eq!(to_query_payload(&filters), to_query_payload(&filters));
        assert_eq!(
            serde_json::to_string(&filters.to_query()).unwrap(),
            serde_json::to_string(&filters.to_query()).unwrap()
        );
    }

    #[test]
    fn single_constraint_is_not_empty() {
        let filters = FilterSet::default().with_tag(Some("vip"));
        assert!(!to_query_payload(&filters).is_empty());
    }
}
