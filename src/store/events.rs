//! # Writer Commands
//!
//! Commands sent to the writer thread. Each carries a reply channel so the
//! caller blocks until its own command has been applied.

use crossbeam_channel::Sender;

use crate::record::{RemoveFilters, VisitRecord};

use super::mutate::VisitField;
use super::StoreError;

pub type Reply<T> = Sender<Result<T, StoreError>>;

#[derive(Debug)]
pub enum WriteCommand {
    /// Append records with one write call
    Append {
        records: Vec<VisitRecord>,
        reply: Reply<()>,
    },
    /// Set a field on records matched by id or url
    Update {
        id_or_url: String,
        field: VisitField,
        value: String,
        reply: Reply<bool>,
    },
    /// Drop records matched by any filter
    Remove {
        filters: RemoveFilters,
        reply: Reply<usize>,
    },
    /// Truncate the log through the rewrite path
    Clear { reply: Reply<()> },
}
