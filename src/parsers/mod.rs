//! # Browser History Parsers
//!
//! Readers for browser history databases, used to seed the visit log.

pub mod browser;
pub mod sqlite_db;
