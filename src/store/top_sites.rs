//! # Top Sites
//!
//! Most-visited origins, recomputed from a full load on every call.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::constants::{
    DAY_MS, DEFAULT_TOP_SITES_DAYS, DEFAULT_TOP_SITES_LIMIT, MAX_TOP_SITES_DAYS,
    MAX_TOP_SITES_LIMIT,
};
use crate::record::{TopSite, TopSitesOptions, VisitRecord};

pub fn clamp_days(days: Option<u32>) -> u32 {
    days.unwrap_or(DEFAULT_TOP_SITES_DAYS)
        .clamp(1, MAX_TOP_SITES_DAYS)
}

pub fn clamp_limit(limit: Option<usize>) -> usize {
    limit
        .unwrap_or(DEFAULT_TOP_SITES_LIMIT)
        .clamp(1, MAX_TOP_SITES_LIMIT)
}

/// Ranks origins visited at or after `now_ms - days`.
///
/// Order is visit count descending, then most recent visit descending, then
/// origin ascending so equal groups come out in a stable order.
pub fn rank(records: &[VisitRecord], opts: TopSitesOptions, now_ms: i64) -> Vec<TopSite> {
    let days = clamp_days(opts.days);
    let limit = clamp_limit(opts.limit);
    let cutoff = now_ms.saturating_sub(i64::from(days) * DAY_MS);

    let mut groups: HashMap<&str, TopSite> = HashMap::new();
    for record in records {
        if record.ts < cutoff {
            continue;
        }
        let Some(origin) = record.origin.as_deref() else {
            continue;
        };
        let site = groups.entry(origin).or_insert_with(|| TopSite {
            origin: origin.to_string(),
            visits: 0,
            url: record.url.clone(),
            title: record.title.clone(),
            favicon_id: record.favicon_id.clone(),
            last_visit_ts: record.ts,
        });
        site.visits += 1;
        if record.ts >= site.last_visit_ts {
            site.url = record.url.clone();
            site.title = record.title.clone();
            site.favicon_id = record.favicon_id.clone();
            site.last_visit_ts = record.ts;
        }
    }

    let mut ranked: Vec<TopSite> = groups.into_values().collect();
    ranked.sort_by(compare_sites);
    ranked.truncate(limit);
    ranked
}

fn compare_sites(a: &TopSite, b: &TopSite) -> Ordering {
    b.visits
        .cmp(&a.visits)
        .then_with(|| b.last_visit_ts.cmp(&a.last_visit_ts))
        .then_with(|| a.origin.cmp(&b.origin))
}
