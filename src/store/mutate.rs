//! # Mutations
//!
//! In-memory transforms applied by the writer thread between a full load and
//! an atomic rewrite.

use crate::normalize::{normalize_origin, normalize_url};
use crate::record::{RemoveFilters, VisitRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitField {
    Title,
    Favicon,
}

impl VisitField {
    fn slot(self, record: &mut VisitRecord) -> &mut Option<String> {
        match self {
            VisitField::Title => &mut record.title,
            VisitField::Favicon => &mut record.favicon_id,
        }
    }
}

/// Sets `field` on every record whose id equals `id_or_url` or whose url
/// equals its normalized form. Returns how many records actually changed.
pub fn update_field(
    records: &mut [VisitRecord],
    id_or_url: &str,
    field: VisitField,
    value: &str,
) -> usize {
    let url = normalize_url(id_or_url);
    let mut changed = 0;
    for record in records
        .iter_mut()
        .filter(|r| r.id == id_or_url || r.url == url)
    {
        let slot = field.slot(record);
        if slot.as_deref() != Some(value) {
            *slot = Some(value.to_string());
            changed += 1;
        }
    }
    changed
}

/// Drops every record matched by ANY of the provided filters and returns the
/// number dropped. Empty filters remove nothing.
pub fn remove_matching(records: &mut Vec<VisitRecord>, filters: &RemoveFilters) -> usize {
    if filters.is_empty() {
        return 0;
    }
    let url = filters.url.as_deref().map(normalize_url);
    let origin = filters.origin.as_deref().and_then(normalize_origin);
    let before = filters.before_ts;

    let before_len = records.len();
    records.retain(|record| {
        let by_origin = origin.is_some() && record.origin == origin;
        let by_url = url.as_deref() == Some(record.url.as_str());
        let by_time = before.is_some_and(|before| record.ts < before);
        !(by_origin || by_url || by_time)
    });
    before_len - records.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, ts: i64, url: &str) -> VisitRecord {
        VisitRecord {
            id: id.to_string(),
            ts,
            url: url.to_string(),
            title: None,
            origin: normalize_origin(url),
            transition: None,
            referrer: None,
            wc_id: None,
            favicon_id: None,
        }
    }

    fn sample() -> Vec<VisitRecord> {
        vec![
            record("1", 500, "https://b.com/old"),
            record("2", 2_000, "https://a.com/page"),
            record("3", 3_000, "https://c.com/"),
            record("4", 4_000, "https://a.com/page"),
        ]
    }

    #[test]
    fn update_matches_by_id_or_normalized_url() {
        let mut records = sample();
        assert_eq!(update_field(&mut records, "3", VisitField::Title, "C"), 1);
        assert_eq!(records[2].title.as_deref(), Some("C"));

        let changed = update_field(
            &mut records,
            "https://A.com/page#top",
            VisitField::Favicon,
            "fav-1",
        );
        assert_eq!(changed, 2);
        assert_eq!(records[1].favicon_id.as_deref(), Some("fav-1"));
        assert_eq!(records[3].favicon_id.as_deref(), Some("fav-1"));
    }

    #[test]
    fn update_with_same_value_reports_no_change() {
        let mut records = sample();
        update_field(&mut records, "1", VisitField::Title, "Same");
        assert_eq!(update_field(&mut records, "1", VisitField::Title, "Same"), 0);
        assert_eq!(update_field(&mut records, "missing", VisitField::Title, "x"), 0);
    }

    #[test]
    fn removal_is_or_across_filters() {
        let mut records = sample();
        let filters = RemoveFilters {
            origin: Some("https://a.com".to_string()),
            before_ts: Some(1_000),
            url: None,
        };
        let removed = remove_matching(&mut records, &filters);
        assert_eq!(removed, 3);
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["3"]);
    }

    #[test]
    fn removal_by_url_normalizes_filter() {
        let mut records = sample();
        let filters = RemoveFilters {
            url: Some("https://C.com/#frag".to_string()),
            ..RemoveFilters::default()
        };
        assert_eq!(remove_matching(&mut records, &filters), 1);
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn empty_filters_remove_nothing() {
        let mut records = sample();
        assert_eq!(remove_matching(&mut records, &RemoveFilters::default()), 0);
        assert_eq!(records.len(), 4);
    }
}
