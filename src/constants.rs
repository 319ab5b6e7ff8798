//! # Constants
//!
//! Clamps and defaults shared by the query engine, the top-sites aggregator,
//! and the writer queue.

/// File name of the visit log inside the data directory.
pub const DEFAULT_LOG_FILE_NAME: &str = "history.jsonl";

/// Page size used by `query` when the caller gives none.
pub const DEFAULT_QUERY_LIMIT: usize = 128;
/// Upper bound for a single `query` page.
pub const MAX_QUERY_LIMIT: usize = 1024;

/// Ranking window in days used by `top_sites` when the caller gives none.
pub const DEFAULT_TOP_SITES_DAYS: u32 = 7;
pub const MAX_TOP_SITES_DAYS: u32 = 60;

/// Number of ranked origins returned by `top_sites` when the caller gives none.
pub const DEFAULT_TOP_SITES_LIMIT: usize = 12;
pub const MAX_TOP_SITES_LIMIT: usize = 64;

pub const DAY_MS: i64 = 86_400_000;

/// Pending commands the writer thread buffers before callers block.
pub const WRITER_QUEUE_CAPACITY: usize = 64;
