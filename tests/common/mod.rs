//! Shared helpers for the visit store integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use visitlog::store::HistoryStore;
use visitlog::{AddVisitOptions, QueryFilters, VisitRecord};

pub const DAY_MS: i64 = 86_400_000;

/// A store rooted in a fresh temp dir. Keep the `TempDir` alive for the test.
pub fn temp_store() -> (TempDir, HistoryStore) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = HistoryStore::in_dir(dir.path());
    (dir, store)
}

pub fn add(store: &HistoryStore, url: &str, title: Option<&str>, ts: i64) -> VisitRecord {
    let mut opts = AddVisitOptions::new(url).with_ts(ts);
    if let Some(title) = title {
        opts = opts.with_title(title);
    }
    store.add_visit(opts).expect("add visit")
}

/// Follows `next_cursor` until the end of the log and returns every item.
pub fn drain_query(
    store: &HistoryStore,
    filters: &QueryFilters,
    limit: usize,
) -> (Vec<VisitRecord>, usize) {
    let mut items = Vec::new();
    let mut pages = 0;
    let mut cursor = None;
    loop {
        let page = store
            .query(filters, cursor, Some(limit))
            .expect("query page");
        pages += 1;
        items.extend(page.items);
        match page.next_cursor {
            Some(next) => {
                assert!(cursor.is_none_or(|prev| next > prev), "cursor must advance");
                cursor = Some(next);
            }
            None => break,
        }
    }
    (items, pages)
}

pub fn ids(records: &[VisitRecord]) -> Vec<String> {
    records.iter().map(|r| r.id.clone()).collect()
}

pub fn raw_log(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_default()
}

/// Leftover `*.tmp` files next to the log.
pub fn temp_files(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .expect("read dir")
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "tmp"))
        .collect()
}
