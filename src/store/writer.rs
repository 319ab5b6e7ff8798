//! # Writer Thread
//!
//! The single owner of every write to the log. Appends and
//! load-transform-rewrite sequences run one at a time in arrival order, so a
//! mutation never rewrites over a snapshot another mutation already replaced.

use std::thread;

use crossbeam_channel::Receiver;
use tracing::{info, warn};

use super::events::WriteCommand;
use super::log_file::LogFile;
use super::mutate::{self, VisitField};
use super::StoreError;

pub fn spawn_writer_thread(log: LogFile, rx: Receiver<WriteCommand>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        for command in rx {
            match command {
                WriteCommand::Append { records, reply } => {
                    let result = log.append_batch(&records);
                    if let Err(err) = &result {
                        warn!("visit append failed: {err}");
                    }
                    let _ = reply.send(result);
                }
                WriteCommand::Update {
                    id_or_url,
                    field,
                    value,
                    reply,
                } => {
                    let _ = reply.send(update(&log, &id_or_url, field, &value));
                }
                WriteCommand::Remove { filters, reply } => {
                    let result = log.load_all().and_then(|mut records| {
                        let removed = mutate::remove_matching(&mut records, &filters);
                        if removed > 0 {
                            log.rewrite_all(&records)?;
                            info!(removed, "removed visits");
                        }
                        Ok(removed)
                    });
                    let _ = reply.send(result);
                }
                WriteCommand::Clear { reply } => {
                    let result = log.rewrite_all(&[]);
                    if result.is_ok() {
                        info!(path = %log.path().display(), "cleared visit log");
                    }
                    let _ = reply.send(result);
                }
            }
        }
    })
}

fn update(
    log: &LogFile,
    id_or_url: &str,
    field: VisitField,
    value: &str,
) -> Result<bool, StoreError> {
    let mut records = log.load_all()?;
    let changed = mutate::update_field(&mut records, id_or_url, field, value);
    if changed == 0 {
        return Ok(false);
    }
    log.rewrite_all(&records)?;
    info!(changed, ?field, "updated visits");
    Ok(true)
}
