//! # URL Normalization
//!
//! Canonical forms for URLs, origins and hostnames. Every URL or origin that
//! reaches the log, and every filter compared against it, goes through here.

use url::Url;

/// Canonical URL with the fragment removed.
///
/// Unparsable input falls back to plain truncation at the first `#`, so the
/// result is always fragment-free and normalizing twice is a no-op.
pub fn normalize_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => strip_fragment(raw).to_string(),
    }
}

/// `scheme://host[:port]` for http/https URLs, `None` for anything else.
///
/// The host is lower-cased and a leading `www.` is dropped. Default ports are
/// omitted.
pub fn normalize_origin(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return None;
    }
    let host = normalize_hostname(url.host_str()?);
    if host.is_empty() {
        return None;
    }
    match url.port() {
        Some(port) => Some(format!("{scheme}://{host}:{port}")),
        None => Some(format!("{scheme}://{host}")),
    }
}

pub fn normalize_hostname(raw: &str) -> String {
    let lower = raw.to_lowercase();
    match lower.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => lower,
    }
}

fn strip_fragment(raw: &str) -> &str {
    match raw.find('#') {
        Some(idx) => &raw[..idx],
        None => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fragment_and_lowercases_host() {
        assert_eq!(
            normalize_url("https://Example.com/a#frag"),
            "https://example.com/a"
        );
    }

    #[test]
    fn unparsable_url_is_truncated_at_hash() {
        assert_eq!(normalize_url("not a url#section"), "not a url");
        assert_eq!(normalize_url("plain"), "plain");
    }

    #[test]
    fn normalize_url_is_idempotent() {
        let inputs = [
            "https://Example.com/a#frag",
            "http://www.EXAMPLE.org:8080/path?q=1#x",
            "https://example.com",
            "about:blank#top",
            "file:///tmp/a%20b.html#s",
            "garbage ## more",
            "",
        ];
        for input in inputs {
            let once = normalize_url(input);
            assert_eq!(normalize_url(&once), once, "input {input:?}");
        }
    }

    #[test]
    fn origin_only_for_http_schemes() {
        assert_eq!(
            normalize_origin("https://www.Example.com/path?x=1").as_deref(),
            Some("https://example.com")
        );
        assert_eq!(
            normalize_origin("http://example.com:80/").as_deref(),
            Some("http://example.com")
        );
        assert_eq!(
            normalize_origin("http://example.com:8080/").as_deref(),
            Some("http://example.com:8080")
        );
        assert_eq!(normalize_origin("ftp://example.com/file"), None);
        assert_eq!(normalize_origin("about:blank"), None);
        assert_eq!(normalize_origin("not a url"), None);
    }

    #[test]
    fn hostname_drops_leading_www_only() {
        assert_eq!(normalize_hostname("WWW.Example.COM"), "example.com");
        assert_eq!(normalize_hostname("mywww.example.com"), "mywww.example.com");
    }
}
