//! # Visit Records
//!
//! The on-disk record shape plus the option and result types callers pass to
//! and receive from [`crate::store::HistoryStore`].

use serde::{Deserialize, Serialize};

/// One recorded navigation, stored as a single JSON line.
///
/// Optional fields serialize as `null` so an absent title stays distinct from
/// an empty one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitRecord {
    pub id: String,
    pub ts: i64,
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub transition: Option<String>,
    #[serde(default)]
    pub referrer: Option<String>,
    #[serde(default)]
    pub wc_id: Option<i64>,
    #[serde(default)]
    pub favicon_id: Option<String>,
}

/// Input for a single navigation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddVisitOptions {
    pub url: String,
    #[serde(default)]
    pub ts: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub transition: Option<String>,
    #[serde(default)]
    pub referrer: Option<String>,
    #[serde(default)]
    pub wc_id: Option<i64>,
    #[serde(default)]
    pub favicon_id: Option<String>,
}

impl AddVisitOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_ts(mut self, ts: i64) -> Self {
        self.ts = Some(ts);
        self
    }
}

/// Filters for an incremental query. Every filter that is set must pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryFilters {
    pub from_ts: Option<i64>,
    pub to_ts: Option<i64>,
    pub origin: Option<String>,
    /// Case-insensitive substring matched against `url + " " + title`.
    pub q: Option<String>,
}

/// One page of query results.
///
/// `next_cursor` is a byte offset into the log; it is `None` once the scan has
/// reached the end of the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPage {
    pub items: Vec<VisitRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<u64>,
}

/// Removal filters. A record is removed when ANY provided filter matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFilters {
    pub url: Option<String>,
    pub origin: Option<String>,
    pub before_ts: Option<i64>,
}

impl RemoveFilters {
    pub fn is_empty(&self) -> bool {
        self.url.is_none() && self.origin.is_none() && self.before_ts.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TopSitesOptions {
    pub days: Option<u32>,
    pub limit: Option<usize>,
}

/// A ranked origin with its most recent visit as the sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopSite {
    pub origin: String,
    pub visits: u64,
    pub url: String,
    pub title: Option<String>,
    pub favicon_id: Option<String>,
    pub last_visit_ts: i64,
}
