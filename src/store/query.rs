//! # Query Engine
//!
//! Incremental scans over the log. The cursor is a byte offset: the log only
//! grows by appending whole lines, so an offset handed out earlier still points
//! at a line boundary after later appends.

use tracing::debug;

use crate::constants::{DEFAULT_QUERY_LIMIT, MAX_QUERY_LIMIT};
use crate::normalize::normalize_origin;
use crate::record::{QueryFilters, QueryPage, VisitRecord};

use super::log_file::{decode_line, DecodedLine, LineSplitter, LogFile};
use super::StoreError;

pub fn clamp_limit(limit: Option<usize>) -> usize {
    limit
        .unwrap_or(DEFAULT_QUERY_LIMIT)
        .clamp(1, MAX_QUERY_LIMIT)
}

/// Filters prepared once per query.
struct Matcher {
    from_ts: Option<i64>,
    to_ts: Option<i64>,
    /// `Some(None)` when an origin filter was given but does not normalize;
    /// such a filter matches nothing.
    origin: Option<Option<String>>,
    needle: Option<String>,
}

impl Matcher {
    fn new(filters: &QueryFilters) -> Self {
        Self {
            from_ts: filters.from_ts,
            to_ts: filters.to_ts,
            origin: filters.origin.as_deref().map(normalize_origin),
            needle: filters
                .q
                .as_deref()
                .filter(|q| !q.is_empty())
                .map(str::to_lowercase),
        }
    }

    fn matches(&self, record: &VisitRecord) -> bool {
        if let Some(from) = self.from_ts {
            if record.ts < from {
                return false;
            }
        }
        if let Some(to) = self.to_ts {
            if record.ts > to {
                return false;
            }
        }
        if let Some(origin) = &self.origin {
            match origin {
                Some(origin) if record.origin.as_deref() == Some(origin.as_str()) => {}
                _ => return false,
            }
        }
        if let Some(needle) = &self.needle {
            let haystack = format!(
                "{} {}",
                record.url,
                record.title.as_deref().unwrap_or("")
            )
            .to_lowercase();
            if !haystack.contains(needle.as_str()) {
                return false;
            }
        }
        true
    }
}

/// Scans `tail`, the bytes of the log starting at offset `start`, where the
/// whole log is `total` bytes long.
///
/// Every line consumed advances the cursor whether it matched, was blank or
/// failed to decode. The returned cursor is omitted once it reaches `total`.
///
/// An unterminated last line that fails to decode may be an append still in
/// flight. When earlier lines were consumed in this call the scan stops in
/// front of it, so the next page retries it. When it is the first line of the
/// scan it is consumed as malformed, so a torn tail cannot stall the cursor.
pub fn scan_page(
    tail: &[u8],
    start: u64,
    total: u64,
    filters: &QueryFilters,
    limit: usize,
) -> QueryPage {
    let matcher = Matcher::new(filters);
    let mut items = Vec::new();
    let mut consumed = start;
    let mut skipped = 0usize;

    for (line, len) in LineSplitter::new(tail) {
        if items.len() >= limit {
            break;
        }
        let decoded = decode_line(line);
        let unterminated = len == line.len();
        if unterminated && consumed > start && matches!(decoded, DecodedLine::Invalid(_)) {
            break;
        }
        consumed += len as u64;
        match decoded {
            DecodedLine::Visit(record) => {
                if matcher.matches(&record) {
                    items.push(record);
                }
            }
            DecodedLine::Blank => {}
            DecodedLine::Invalid(_) => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!(skipped, "query skipped malformed lines");
    }

    QueryPage {
        items,
        next_cursor: (consumed != total).then_some(consumed),
    }
}

pub fn run_query(
    log: &LogFile,
    filters: &QueryFilters,
    cursor: Option<u64>,
    limit: Option<usize>,
) -> Result<QueryPage, StoreError> {
    let limit = clamp_limit(limit);
    let (tail, total) = log.read_tail(cursor.unwrap_or(0))?;
    let start = total - tail.len() as u64;
    Ok(scan_page(&tail, start, total, filters, limit))
}
