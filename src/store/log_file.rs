//! # Log File
//!
//! The on-disk half of the store: one JSON object per line, grown only by
//! whole-line appends and replaced only by temp-file + rename.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::record::VisitRecord;

use super::StoreError;

/// Result of decoding one line of the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedLine {
    Visit(VisitRecord),
    Blank,
    Invalid(String),
}

#[cfg(test)]
impl DecodedLine {
    pub fn into_visit(self) -> Option<VisitRecord> {
        match self {
            DecodedLine::Visit(record) => Some(record),
            _ => None,
        }
    }
}

pub fn decode_line(bytes: &[u8]) -> DecodedLine {
    let text = match std::str::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => return DecodedLine::Invalid(format!("invalid utf-8: {err}")),
    };
    if text.trim().is_empty() {
        return DecodedLine::Blank;
    }
    match serde_json::from_str::<VisitRecord>(text) {
        Ok(record) if record.id.is_empty() => DecodedLine::Invalid("empty id".to_string()),
        Ok(record) if record.url.is_empty() => DecodedLine::Invalid("empty url".to_string()),
        Ok(record) => DecodedLine::Visit(record),
        Err(err) => DecodedLine::Invalid(err.to_string()),
    }
}

pub fn encode_line(record: &VisitRecord, out: &mut Vec<u8>) -> Result<(), StoreError> {
    serde_json::to_writer(&mut *out, record)?;
    out.push(b'\n');
    Ok(())
}

/// Splits a byte buffer on `\n`, yielding each line (without the newline)
/// together with the number of bytes it occupied, newline included when one
/// followed.
pub struct LineSplitter<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> LineSplitter<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }
}

impl<'a> Iterator for LineSplitter<'a> {
    type Item = (&'a [u8], usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.buf.len() {
            return None;
        }
        let rest = &self.buf[self.pos..];
        let (line, consumed) = match memchr::memchr(b'\n', rest) {
            Some(idx) => (&rest[..idx], idx + 1),
            None => (rest, rest.len()),
        };
        self.pos += consumed;
        Some((line, consumed))
    }
}

#[derive(Debug, Clone)]
pub struct LogFile {
    path: PathBuf,
    sync_appends: bool,
    sync_rewrites: bool,
}

impl LogFile {
    pub fn new(path: PathBuf, sync_appends: bool, sync_rewrites: bool) -> Self {
        Self {
            path,
            sync_appends,
            sync_rewrites,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current length in bytes; a missing file has length zero.
    #[cfg(test)]
    pub fn len(&self) -> Result<u64, StoreError> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(0),
            Err(err) => Err(err.into()),
        }
    }

    #[cfg(test)]
    pub fn append(&self, record: &VisitRecord) -> Result<(), StoreError> {
        self.append_batch(std::slice::from_ref(record))
    }

    /// Appends every record with a single write call.
    pub fn append_batch(&self, records: &[VisitRecord]) -> Result<(), StoreError> {
        if records.is_empty() {
            return Ok(());
        }
        self.ensure_parent_dir()?;
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;
        let mut buf = Vec::with_capacity(records.len() * 256 + 1);
        // close a torn last line so the first new record starts on its own line
        if ends_mid_line(&mut file)? {
            buf.push(b'\n');
        }
        for record in records {
            encode_line(record, &mut buf)?;
        }
        file.write_all(&buf)?;
        if self.sync_appends {
            file.sync_data()?;
        }
        debug!(
            path = %self.path.display(),
            records = records.len(),
            bytes = buf.len(),
            "appended visits"
        );
        Ok(())
    }

    /// Reads every decodable record in file order. Malformed lines are
    /// dropped; a missing file yields an empty vector.
    pub fn load_all(&self) -> Result<Vec<VisitRecord>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let mut records = Vec::new();
        let mut skipped = 0usize;
        for (line, _) in LineSplitter::new(&bytes) {
            match decode_line(line) {
                DecodedLine::Visit(record) => records.push(record),
                DecodedLine::Blank => {}
                DecodedLine::Invalid(reason) => {
                    skipped += 1;
                    debug!("dropping malformed log line: {reason}");
                }
            }
        }
        if skipped > 0 {
            warn!(
                path = %self.path.display(),
                skipped,
                "skipped malformed lines while loading visit log"
            );
        }
        Ok(records)
    }

    /// Reads from `offset` up to the length observed when the read started.
    /// Returns the bytes and that total length. Offsets past the end are
    /// clamped to it.
    pub fn read_tail(&self, offset: u64) -> Result<(Vec<u8>, u64), StoreError> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok((Vec::new(), 0)),
            Err(err) => return Err(err.into()),
        };
        let total = file.metadata()?.len();
        let start = offset.min(total);
        file.seek(SeekFrom::Start(start))?;
        let mut buf = Vec::with_capacity((total - start) as usize);
        file.take(total - start).read_to_end(&mut buf)?;
        Ok((buf, total))
    }

    /// Replaces the whole log with `records`.
    ///
    /// The new content is written to `<target>.<millis>-<random>.tmp` in the
    /// same directory and renamed over the target, so readers see either the
    /// old file or the new one, never a partial write.
    pub fn rewrite_all(&self, records: &[VisitRecord]) -> Result<(), StoreError> {
        let mut buf = Vec::with_capacity(records.len() * 256);
        for record in records {
            encode_line(record, &mut buf)?;
        }
        self.ensure_parent_dir()?;
        let tmp_path = self.temp_path();
        if let Err(err) = self.write_temp(&tmp_path, &buf) {
            let _ = fs::remove_file(&tmp_path);
            return Err(err);
        }
        if let Err(err) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(err.into());
        }
        debug!(
            path = %self.path.display(),
            records = records.len(),
            bytes = buf.len(),
            "rewrote visit log"
        );
        Ok(())
    }

    fn write_temp(&self, tmp_path: &Path, buf: &[u8]) -> Result<(), StoreError> {
        let mut file = OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(tmp_path)?;
        file.write_all(buf)?;
        if self.sync_rewrites {
            file.sync_all()?;
        }
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "visits".to_string());
        let millis = chrono::Utc::now().timestamp_millis();
        let random = uuid::Uuid::new_v4().simple().to_string();
        let tmp_name = format!("{file_name}.{millis}-{}.tmp", &random[..12]);
        self.path.with_file_name(tmp_name)
    }

    fn ensure_parent_dir(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

fn ends_mid_line(file: &mut File) -> Result<bool, StoreError> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}
