//! Append-only browsing history log.
//!
//! Visits are stored one JSON object per line. Reads page through the file by
//! byte offset; rewrites go through a temp file and an atomic rename.

pub mod cli;
pub mod config;
pub mod constants;
pub mod logging;
pub mod normalize;
pub mod parsers;
pub mod record;
pub mod store;

pub use record::{
    AddVisitOptions, QueryFilters, QueryPage, RemoveFilters, TopSite, TopSitesOptions,
    VisitRecord,
};
pub use store::{HistoryStore, ImportSummary, StoreError, StoreSettings};
