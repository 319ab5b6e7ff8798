//! # History Store
//!
//! [`HistoryStore`] binds one visit log on disk. Writes (appends, title and
//! favicon updates, removals, clears) are funnelled through a dedicated writer
//! thread and applied one at a time. Reads (`load_all`, `query`, `top_sites`)
//! go straight to the file: they only ever see a fully renamed file or one
//! extended by whole-line appends.

pub mod events;
pub mod log_file;
pub mod mutate;
pub mod query;
pub mod top_sites;
pub mod writer;

use std::path::{Path, PathBuf};
use std::thread;

use crossbeam_channel::{bounded, Sender};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::constants::{DEFAULT_LOG_FILE_NAME, WRITER_QUEUE_CAPACITY};
use crate::normalize::{normalize_origin, normalize_url};
use crate::record::{
    AddVisitOptions, QueryFilters, QueryPage, RemoveFilters, TopSite, TopSitesOptions,
    VisitRecord,
};

use events::{Reply, WriteCommand};
use log_file::LogFile;
use mutate::VisitField;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("invalid visit: {0}")]
    Validation(String),
    #[error("writer thread is not running")]
    WriterClosed,
}

/// Where the log lives and how hard writes are pushed to disk.
#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub path: PathBuf,
    /// `fdatasync` after every append.
    pub sync_appends: bool,
    /// `fsync` the temp file before it is renamed over the log.
    pub sync_rewrites: bool,
}

impl StoreSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sync_appends: false,
            sync_rewrites: true,
        }
    }
}

/// Outcome of a bulk import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub appended: usize,
    pub skipped: usize,
}

pub struct HistoryStore {
    log: LogFile,
    tx: Option<Sender<WriteCommand>>,
    writer: Option<thread::JoinHandle<()>>,
}

impl HistoryStore {
    pub fn open(settings: StoreSettings) -> Self {
        let log = LogFile::new(settings.path, settings.sync_appends, settings.sync_rewrites);
        let (tx, rx) = bounded::<WriteCommand>(WRITER_QUEUE_CAPACITY);
        let writer = writer::spawn_writer_thread(log.clone(), rx);
        debug!(path = %log.path().display(), "opened visit store");
        Self {
            log,
            tx: Some(tx),
            writer: Some(writer),
        }
    }

    /// Store backed by `<dir>/history.jsonl` with default settings.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::open(StoreSettings::new(dir.as_ref().join(DEFAULT_LOG_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        self.log.path()
    }

    /// Normalizes and appends one visit, returning the stored record.
    pub fn add_visit(&self, opts: AddVisitOptions) -> Result<VisitRecord, StoreError> {
        let record = build_record(opts, now_ms())?;
        self.request(|reply| WriteCommand::Append {
            records: vec![record.clone()],
            reply,
        })?;
        Ok(record)
    }

    /// Appends a batch of visits in one write. Visits that fail validation are
    /// skipped and counted.
    pub fn import_visits(&self, visits: Vec<AddVisitOptions>) -> Result<ImportSummary, StoreError> {
        let now = now_ms();
        let mut records = Vec::with_capacity(visits.len());
        let mut skipped = 0;
        for opts in visits {
            match build_record(opts, now) {
                Ok(record) => records.push(record),
                Err(err) => {
                    skipped += 1;
                    debug!("skipping imported visit: {err}");
                }
            }
        }
        if skipped > 0 {
            warn!(skipped, "skipped invalid visits during import");
        }
        let appended = records.len();
        if appended > 0 {
            self.request(|reply| WriteCommand::Append { records, reply })?;
        }
        Ok(ImportSummary { appended, skipped })
    }

    pub fn load_all(&self) -> Result<Vec<VisitRecord>, StoreError> {
        self.log.load_all()
    }

    /// One page of visits matching `filters`, starting at byte offset `cursor`.
    pub fn query(
        &self,
        filters: &QueryFilters,
        cursor: Option<u64>,
        limit: Option<usize>,
    ) -> Result<QueryPage, StoreError> {
        query::run_query(&self.log, filters, cursor, limit)
    }

    pub fn top_sites(&self, opts: TopSitesOptions) -> Result<Vec<TopSite>, StoreError> {
        self.top_sites_at(opts, now_ms())
    }

    /// Same as [`HistoryStore::top_sites`] with an explicit clock.
    pub fn top_sites_at(
        &self,
        opts: TopSitesOptions,
        now_ms: i64,
    ) -> Result<Vec<TopSite>, StoreError> {
        let records = self.log.load_all()?;
        Ok(top_sites::rank(&records, opts, now_ms))
    }

    pub fn update_title(&self, id_or_url: &str, title: &str) -> Result<bool, StoreError> {
        self.update_field(id_or_url, VisitField::Title, title)
    }

    pub fn update_favicon(&self, id_or_url: &str, favicon_id: &str) -> Result<bool, StoreError> {
        self.update_field(id_or_url, VisitField::Favicon, favicon_id)
    }

    /// Removes every visit matched by any of `filters`; returns how many went.
    pub fn remove(&self, filters: RemoveFilters) -> Result<usize, StoreError> {
        if filters.is_empty() {
            return Ok(0);
        }
        self.request(|reply| WriteCommand::Remove { filters, reply })
    }

    pub fn clear_all(&self) -> Result<(), StoreError> {
        self.request(|reply| WriteCommand::Clear { reply })
    }

    fn update_field(
        &self,
        id_or_url: &str,
        field: VisitField,
        value: &str,
    ) -> Result<bool, StoreError> {
        self.request(|reply| WriteCommand::Update {
            id_or_url: id_or_url.to_string(),
            field,
            value: value.to_string(),
            reply,
        })
    }

    fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> WriteCommand,
    ) -> Result<T, StoreError> {
        let tx = self.tx.as_ref().ok_or(StoreError::WriterClosed)?;
        let (reply_tx, reply_rx) = bounded(1);
        tx.send(command(reply_tx))
            .map_err(|_| StoreError::WriterClosed)?;
        reply_rx.recv().map_err(|_| StoreError::WriterClosed)?
    }
}

impl Drop for HistoryStore {
    fn drop(&mut self) {
        drop(self.tx.take());
        if let Some(handle) = self.writer.take() {
            if handle.join().is_err() {
                warn!("visit writer thread panicked");
            }
        }
    }
}

/// Builds the stored form of a visit: normalized url, origin and referrer, a
/// fresh id, and `now_ms` when no timestamp was given.
pub fn build_record(opts: AddVisitOptions, now_ms: i64) -> Result<VisitRecord, StoreError> {
    let raw_url = opts.url.trim();
    if raw_url.is_empty() {
        return Err(StoreError::Validation("url is empty".to_string()));
    }
    let url = normalize_url(raw_url);
    if url.is_empty() {
        return Err(StoreError::Validation(format!(
            "url {raw_url:?} is empty after normalization"
        )));
    }
    let origin = opts
        .origin
        .as_deref()
        .and_then(normalize_origin)
        .or_else(|| normalize_origin(&url));
    let referrer = opts
        .referrer
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(normalize_url);

    Ok(VisitRecord {
        id: uuid::Uuid::new_v4().to_string(),
        ts: opts.ts.unwrap_or(now_ms),
        url,
        title: opts.title,
        origin,
        transition: opts.transition,
        referrer,
        wc_id: opts.wc_id,
        favicon_id: opts.favicon_id,
    })
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_record_normalizes_inputs() {
        let opts = AddVisitOptions {
            url: "  https://Example.com/a#frag ".to_string(),
            title: Some("Ex".to_string()),
            referrer: Some("https://Ref.com/x#y".to_string()),
            ..AddVisitOptions::default()
        };
        let record = build_record(opts, 42).expect("record");
        assert_eq!(record.url, "https://example.com/a");
        assert_eq!(record.origin.as_deref(), Some("https://example.com"));
        assert_eq!(record.referrer.as_deref(), Some("https://ref.com/x"));
        assert_eq!(record.title.as_deref(), Some("Ex"));
        assert_eq!(record.ts, 42);
        assert!(!record.id.is_empty());
    }

    #[test]
    fn build_record_prefers_explicit_origin() {
        let opts = AddVisitOptions {
            url: "https://cdn.example.com/frame".to_string(),
            origin: Some("https://www.Example.com:8443".to_string()),
            ..AddVisitOptions::default()
        };
        let record = build_record(opts, 0).expect("record");
        assert_eq!(record.origin.as_deref(), Some("https://example.com:8443"));
    }

    #[test]
    fn build_record_leaves_origin_empty_for_other_schemes() {
        let record = build_record(AddVisitOptions::new("about:blank"), 0).expect("record");
        assert_eq!(record.origin, None);
        assert_eq!(record.url, "about:blank");
    }

    #[test]
    fn build_record_rejects_empty_url() {
        for url in ["", "   ", "#only-fragment"] {
            let err = build_record(AddVisitOptions::new(url), 0).expect_err("should fail");
            assert!(matches!(err, StoreError::Validation(_)), "url {url:?}");
        }
    }

    #[test]
    fn ids_are_unique() {
        let a = build_record(AddVisitOptions::new("https://a.com"), 0).expect("a");
        let b = build_record(AddVisitOptions::new("https://a.com"), 0).expect("b");
        assert_ne!(a.id, b.id);
    }
}
