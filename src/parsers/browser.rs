use serde::Serialize;

use crate::record::AddVisitOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    Chrome,
    Firefox,
}

/// One visit read out of a browser's own history database.
#[derive(Debug, Clone, Serialize)]
pub struct BrowserHistoryRecord {
    pub browser: BrowserKind,
    pub url: String,
    pub title: Option<String>,
    /// Epoch milliseconds; `None` when the database had no usable time.
    pub visit_time_ms: Option<i64>,
    pub transition: Option<String>,
}

impl BrowserHistoryRecord {
    pub fn into_visit_options(self) -> AddVisitOptions {
        AddVisitOptions {
            url: self.url,
            ts: self.visit_time_ms,
            title: self.title.filter(|t| !t.is_empty()),
            transition: self.transition,
            ..AddVisitOptions::default()
        }
    }
}
