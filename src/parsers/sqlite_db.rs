use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags};
use tracing::debug;

use crate::parsers::browser::{BrowserHistoryRecord, BrowserKind};

/// Reads visits from a Chromium `History` or Firefox `places.sqlite` file.
///
/// Per-visit tables are preferred; databases that only carry the per-URL
/// tables yield one record per URL with its last visit time.
pub fn extract_browser_history(path: &Path) -> Result<Vec<BrowserHistoryRecord>> {
    let mut out = Vec::new();
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("open history database {}", path.display()))?;

    if has_table(&conn, "urls")? {
        let records = if has_table(&conn, "visits")? {
            extract_chrome_visits(&conn)
        } else {
            extract_chrome_history(&conn)
        };
        match records {
            Ok(records) => out.extend(records),
            Err(err) => debug!("chrome history tables unreadable: {err}"),
        }
    }

    if has_table(&conn, "moz_places")? {
        let records = if has_table(&conn, "moz_historyvisits")? {
            extract_firefox_visits(&conn)
        } else {
            extract_firefox_history(&conn)
        };
        match records {
            Ok(records) => out.extend(records),
            Err(err) => debug!("firefox history tables unreadable: {err}"),
        }
    }

    Ok(out)
}

fn has_table(conn: &Connection, name: &str) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?1")?;
    let mut rows = stmt.query([name])?;
    Ok(rows.next()?.is_some())
}

fn extract_chrome_history(conn: &Connection) -> Result<Vec<BrowserHistoryRecord>> {
    let mut stmt = conn.prepare("SELECT url, title, last_visit_time FROM urls")?;
    let rows = stmt.query_map([], |row| {
        let url: String = row.get(0)?;
        let title: Option<String> = row.get(1)?;
        let last_visit_time: Option<i64> = row.get(2)?;
        Ok((url, title, last_visit_time))
    })?;

    let mut out = Vec::new();
    for row in rows {
        let (url, title, last_visit_time) = row?;
        out.push(BrowserHistoryRecord {
            browser: BrowserKind::Chrome,
            url,
            title,
            visit_time_ms: last_visit_time.and_then(webkit_timestamp_to_millis),
            transition: None,
        });
    }
    Ok(out)
}

fn extract_chrome_visits(conn: &Connection) -> Result<Vec<BrowserHistoryRecord>> {
    let mut stmt = conn.prepare(
        "SELECT urls.url, urls.title, visits.visit_time, visits.transition \
         FROM visits JOIN urls ON visits.url = urls.id ORDER BY visits.visit_time",
    )?;
    let rows = stmt.query_map([], |row| {
        let url: String = row.get(0)?;
        let title: Option<String> = row.get(1)?;
        let visit_time: Option<i64> = row.get(2)?;
        let transition: Option<i64> = row.get(3)?;
        Ok((url, title, visit_time, transition))
    })?;

    let mut out = Vec::new();
    for row in rows {
        let (url, title, visit_time, transition) = row?;
        out.push(BrowserHistoryRecord {
            browser: BrowserKind::Chrome,
            url,
            title,
            visit_time_ms: visit_time.and_then(webkit_timestamp_to_millis),
            transition: transition.map(chrome_transition_label).map(str::to_string),
        });
    }
    Ok(out)
}

fn extract_firefox_history(conn: &Connection) -> Result<Vec<BrowserHistoryRecord>> {
    let mut stmt = conn.prepare("SELECT url, title, last_visit_date FROM moz_places")?;
    let rows = stmt.query_map([], |row| {
        let url: String = row.get(0)?;
        let title: Option<String> = row.get(1)?;
        let last_visit_date: Option<i64> = row.get(2)?;
        Ok((url, title, last_visit_date))
    })?;

    let mut out = Vec::new();
    for row in rows {
        let (url, title, last_visit_date) = row?;
        out.push(BrowserHistoryRecord {
            browser: BrowserKind::Firefox,
            url,
            title,
            visit_time_ms: last_visit_date.and_then(unix_micro_to_millis),
            transition: None,
        });
    }
    Ok(out)
}

fn extract_firefox_visits(conn: &Connection) -> Result<Vec<BrowserHistoryRecord>> {
    let mut stmt = conn.prepare(
        "SELECT moz_places.url, moz_places.title, moz_historyvisits.visit_date, moz_historyvisits.visit_type \
         FROM moz_historyvisits JOIN moz_places ON moz_historyvisits.place_id = moz_places.id \
         ORDER BY moz_historyvisits.visit_date",
    )?;
    let rows = stmt.query_map([], |row| {
        let url: String = row.get(0)?;
        let title: Option<String> = row.get(1)?;
        let visit_date: Option<i64> = row.get(2)?;
        let visit_type: Option<i64> = row.get(3)?;
        Ok((url, title, visit_date, visit_type))
    })?;

    let mut out = Vec::new();
    for row in rows {
        let (url, title, visit_date, visit_type) = row?;
        out.push(BrowserHistoryRecord {
            browser: BrowserKind::Firefox,
            url,
            title,
            visit_time_ms: visit_date.and_then(unix_micro_to_millis),
            transition: visit_type.map(firefox_visit_label).map(str::to_string),
        });
    }
    Ok(out)
}

fn chrome_transition_label(transition: i64) -> &'static str {
    match transition & 0xFF {
        0 => "link",
        1 => "typed",
        2 => "auto_bookmark",
        3 => "auto_subframe",
        4 => "manual_subframe",
        5 => "generated",
        6 => "auto_toplevel",
        7 => "form_submit",
        8 => "reload",
        9 => "keyword",
        10 => "keyword_generated",
        _ => "other",
    }
}

fn firefox_visit_label(visit_type: i64) -> &'static str {
    match visit_type {
        1 => "link",
        2 => "typed",
        3 => "bookmark",
        4 => "embed",
        5 => "redirect_permanent",
        6 => "redirect_temporary",
        7 => "download",
        8 => "framed_link",
        _ => "other",
    }
}

// WebKit timestamps count microseconds from 1601-01-01.
fn webkit_timestamp_to_millis(microseconds: i64) -> Option<i64> {
    if microseconds <= 0 {
        return None;
    }
    let unix_offset_seconds = 11_644_473_600i64;
    let secs = microseconds / 1_000_000 - unix_offset_seconds;
    if secs < 0 {
        return None;
    }
    let nsecs = ((microseconds % 1_000_000).abs() as u32) * 1000;
    chrono::DateTime::<chrono::Utc>::from_timestamp(secs, nsecs).map(|dt| dt.timestamp_millis())
}

fn unix_micro_to_millis(microseconds: i64) -> Option<i64> {
    if microseconds <= 0 {
        return None;
    }
    let secs = microseconds / 1_000_000;
    let nsecs = ((microseconds % 1_000_000).abs() as u32) * 1000;
    chrono::DateTime::<chrono::Utc>::from_timestamp(secs, nsecs).map(|dt| dt.timestamp_millis())
}
