mod common;

use visitlog::QueryFilters;

use common::{add, drain_query, ids, temp_store};

#[test]
fn cursor_chain_visits_every_record_once() {
    let (_dir, store) = temp_store();
    let mut expected = Vec::new();
    for i in 0..25 {
        expected.push(add(&store, &format!("https://s{}.com/{i}", i % 4), None, i));
    }

    for limit in [1, 3, 7, 25, 100] {
        let (items, pages) = drain_query(&store, &QueryFilters::default(), limit);
        assert_eq!(ids(&items), ids(&expected), "limit {limit}");
        assert!(pages >= expected.len().div_ceil(limit), "limit {limit}");
    }
}

#[test]
fn cursor_survives_later_appends() {
    let (_dir, store) = temp_store();
    add(&store, "https://a.com", None, 1);
    add(&store, "https://b.com", None, 2);

    let first = store
        .query(&QueryFilters::default(), None, Some(1))
        .expect("first page");
    let cursor = first.next_cursor.expect("cursor");

    let c = add(&store, "https://c.com", None, 3);
    let rest = store
        .query(&QueryFilters::default(), Some(cursor), None)
        .expect("rest");
    let urls: Vec<&str> = rest.items.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, vec!["https://b.com/", c.url.as_str()]);
    assert_eq!(rest.next_cursor, None);
}

#[test]
fn filters_combine() {
    let (_dir, store) = temp_store();
    add(&store, "https://www.Rust-lang.org/learn", Some("Learn Rust"), 100);
    add(&store, "https://rust-lang.org/tools", Some("Tools"), 200);
    add(&store, "https://docs.rs/serde", Some("serde - Rust"), 300);
    add(&store, "https://rust-lang.org/community", None, 400);

    let by_origin = QueryFilters {
        origin: Some("https://WWW.rust-lang.org".to_string()),
        ..QueryFilters::default()
    };
    let (items, _) = drain_query(&store, &by_origin, 10);
    assert_eq!(items.len(), 3);

    let windowed = QueryFilters {
        from_ts: Some(200),
        to_ts: Some(300),
        q: Some("RUST".to_string()),
        ..QueryFilters::default()
    };
    let (items, _) = drain_query(&store, &windowed, 10);
    let urls: Vec<&str> = items.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, vec!["https://rust-lang.org/tools", "https://docs.rs/serde"]);

    let unmatched_origin = QueryFilters {
        origin: Some("not a url".to_string()),
        ..QueryFilters::default()
    };
    let (items, _) = drain_query(&store, &unmatched_origin, 10);
    assert!(items.is_empty());
}

#[test]
fn limit_is_clamped() {
    let (_dir, store) = temp_store();
    for i in 0..3 {
        add(&store, &format!("https://a.com/{i}"), None, i);
    }
    let page = store
        .query(&QueryFilters::default(), None, Some(0))
        .expect("query");
    assert_eq!(page.items.len(), 1);
    assert!(page.next_cursor.is_some());

    let page = store
        .query(&QueryFilters::default(), None, Some(1_000_000))
        .expect("query");
    assert_eq!(page.items.len(), 3);
    assert_eq!(page.next_cursor, None);
}

#[test]
fn cursor_past_end_returns_empty_page() {
    let (_dir, store) = temp_store();
    add(&store, "https://a.com", None, 1);
    let page = store
        .query(&QueryFilters::default(), Some(1 << 40), None)
        .expect("query");
    assert!(page.items.is_empty());
    assert_eq!(page.next_cursor, None);
}
