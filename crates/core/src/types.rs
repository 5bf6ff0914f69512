/// Server-assigned primary keys (archived records, jobs, audit entries).
pub type DbId = i64;

/// Identifier of an archived record in the listing.
pub type RecordId = DbId;

/// Identifier of an archive reason, as exposed by the facet metadata.
pub type ReasonId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
