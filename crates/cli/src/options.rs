//! Run options for the operator console, read from environment variables.
//!
//! | Env Var                  | Meaning                                          |
//! |--------------------------|--------------------------------------------------|
//! | `LEADS_FILTER_STATUS`    | `lost`, `no_response`, or any service status     |
//! | `LEADS_FILTER_REASONS`   | comma-separated reason ids                       |
//! | `LEADS_FILTER_OWNER`     | owner id                                         |
//! | `LEADS_FILTER_QUEUE`     | queue id                                         |
//! | `LEADS_FILTER_TAG`       | tag                                              |
//! | `LEADS_FILTER_FROM`      | period start, `YYYY-MM-DD`                       |
//! | `LEADS_FILTER_TO`        | period end, `YYYY-MM-DD`                         |
//! | `LEADS_FILTER_SEARCH`    | free-text search                                 |
//! | `LEADS_TARGET_STRATEGY`  | `queue`, `user`, `round-robin` (default `queue`) |
//! | `LEADS_TARGET_ID`        | destination id; enables preview                  |
//! | `LEADS_TARGET_PRIORITY`  | `low`, `balanced`, `high`, `urgent`              |
//! | `LEADS_EXECUTE_AS`       | operator name; executes after the preview        |
//! | `LEADS_IMPORT_FILE`      | JSON array of records to import                  |

use anyhow::Context;
use chrono::NaiveDate;
use leadbridge_core::destination::{DestinationConfig, DestinationPriority, DestinationStrategy};
use leadbridge_core::filters::{FilterSet, LeadStatus};

#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub filters: FilterSet,
    /// `None` when no target is configured; preview and execute are skipped.
    pub destination: Option<DestinationConfig>,
    pub execute_as: Option<String>,
    pub import_file: Option<String>,
}

impl RunOptions {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut filters = FilterSet::default()
            .with_owner(var("LEADS_FILTER_OWNER"))
            .with_queue(var("LEADS_FILTER_QUEUE"))
            .with_tag(var("LEADS_FILTER_TAG"))
            .with_search(var("LEADS_FILTER_SEARCH").unwrap_or_default())
            .with_period(
                parse_date(var("LEADS_FILTER_FROM"), "LEADS_FILTER_FROM")?,
                parse_date(var("LEADS_FILTER_TO"), "LEADS_FILTER_TO")?,
            );
        if let Some(status) = var("LEADS_FILTER_STATUS") {
            filters = filters.with_status(LeadStatus::from_str(&status)?);
        }
        if let Some(reasons) = var("LEADS_FILTER_REASONS") {
            filters = filters.with_reasons(
                reasons
                    .split(',')
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(str::to_string),
            );
        }

        let destination = match var("LEADS_TARGET_ID") {
            Some(target) => {
                let mut destination = DestinationConfig::default().with_target(target.clone(), target);
                if let Some(strategy) = var("LEADS_TARGET_STRATEGY") {
                    destination = destination.with_strategy(DestinationStrategy::from_str(&strategy)?);
                }
                if let Some(priority) = var("LEADS_TARGET_PRIORITY") {
                    destination = destination.with_priority(DestinationPriority::from_str(&priority)?);
                }
                Some(destination)
            }
            None => None,
        };

        Ok(Self {
            filters,
            destination,
            execute_as: var("LEADS_EXECUTE_AS"),
            import_file: var("LEADS_IMPORT_FILE"),
        })
    }
}

fn parse_date(raw: Option<String>, key: &str) -> anyhow::Result<Option<NaiveDate>> {
    raw.map(|s| {
        NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .with_context(|| format!("{key} must be a YYYY-MM-DD date, got '{s}'"))
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_means_no_filters_and_no_destination() {
        let options = RunOptions::from_lookup(lookup(&[])).unwrap();
        assert_eq!(options.filters, FilterSet::default());
        assert!(options.filters.to_query().is_empty());
        assert_eq!(options.destination, None);
        assert_eq!(options.execute_as, None);
    }

    #[test]
    fn filters_and_destination_are_parsed() {
        let options = RunOptions::from_lookup(lookup(&[
            ("LEADS_FILTER_STATUS", "lost"),
            ("LEADS_FILTER_REASONS", "price, timing"),
            ("LEADS_FILTER_FROM", "2026-01-01"),
            ("LEADS_TARGET_ID", "q-west"),
            ("LEADS_TARGET_STRATEGY", "round-robin"),
            ("LEADS_EXECUTE_AS", " ana "),
        ]))
        .unwrap();

        let query = options.filters.to_query();
        assert_eq!(query.status.as_deref(), Some("lost"));
        assert_eq!(query.reason.as_deref(), Some("price"));
        assert_eq!(query.from, NaiveDate::from_ymd_opt(2026, 1, 1));

        let destination = options.destination.unwrap();
        assert_eq!(destination.strategy, DestinationStrategy::RoundRobin);
        assert_eq!(destination.target_id.as_deref(), Some("q-west"));
        assert_eq!(options.execute_as.as_deref(), Some("ana"));
    }

    #[test]
    fn service_defined_status_passes_through() {
        let options = RunOptions::from_lookup(lookup(&[("LEADS_FILTER_STATUS", "won")])).unwrap();
        assert_eq!(options.filters.status, LeadStatus::Other("won".to_string()));
        assert_eq!(options.filters.to_query().status.as_deref(), Some("won"));
    }

    #[test]
    fn invalid_values_are_errors() {
        assert!(RunOptions::from_lookup(lookup(&[("LEADS_FILTER_TO", "yesterday")])).is_err());
        assert!(RunOptions::from_lookup(lookup(&[
            ("LEADS_TARGET_ID", "q"),
            ("LEADS_TARGET_PRIORITY", "asap"),
        ]))
        .is_err());
    }
}
