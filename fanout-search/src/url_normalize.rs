//! Page identity for cross-section deduplication.
//!
//! Two result URLs name the same page when their [`dedup_key`]s are equal.
//! The key folds case and trailing slashes, which search engines apply
//! inconsistently, and drops the parts of a URL that never change which
//! page is served: the fragment, a default port and click-tracking
//! parameters.

use url::Url;
use url::form_urlencoded;

/// Click identifiers appended by ad networks and social sites.
const CLICK_IDS: &[&str] = &["fbclid", "gclid", "msclkid", "dclid", "yclid"];

fn is_tracking_param(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key.starts_with("utm_") || CLICK_IDS.contains(&key.as_str())
}

/// Canonical display form of `raw`, keeping the path's original case.
///
/// The fragment, default port, tracking parameters and path trailing slash
/// are dropped, and the remaining query pairs are sorted. Input that is not
/// an absolute URL is returned unchanged.
///
/// ```
/// use fanout_search::url_normalize::normalize_url;
///
/// assert_eq!(
///     normalize_url("https://Example.COM:443/Guide/?b=2&utm_source=x&a=1#intro"),
///     "https://example.com/Guide?a=1&b=2"
/// );
/// ```
pub fn normalize_url(raw: &str) -> String {
    let Ok(url) = Url::parse(raw.trim()) else {
        return raw.to_string();
    };
    let Some(host) = url.host_str() else {
        // mailto:, data: and friends have no page structure to fold.
        let mut url = url;
        url.set_fragment(None);
        return url.into();
    };

    // Url::parse lowercases scheme and host and drops a default port.
    let mut out = format!("{}://{host}", url.scheme());
    if let Some(port) = url.port() {
        out.push(':');
        out.push_str(&port.to_string());
    }

    let path = url.path();
    match path.trim_end_matches('/') {
        "" => out.push('/'),
        trimmed => out.push_str(trimmed),
    }

    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    if !pairs.is_empty() {
        pairs.sort();
        out.push('?');
        out.push_str(
            &form_urlencoded::Serializer::new(String::new())
                .extend_pairs(&pairs)
                .finish(),
        );
    }
    out
}

/// Key under which two result URLs count as the same page.
///
/// [`normalize_url`] folded to lowercase with any trailing slash removed,
/// so `https://Example.com/Rust/` and `https://example.com/rust` collide.
/// Unparseable input gets the same case and slash folding.
pub fn dedup_key(raw: &str) -> String {
    let mut key = normalize_url(raw.trim()).to_lowercase();
    while key.len() > 1 && key.ends_with('/') {
        key.pop();
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_path_case_in_display_form() {
        assert_eq!(
            normalize_url("HTTPS://Example.COM/Path"),
            "https://example.com/Path"
        );
    }

    #[test]
    fn root_path_keeps_its_slash() {
        assert_eq!(normalize_url("https://example.com"), "https://example.com/");
        assert_eq!(normalize_url("https://example.com//"), "https://example.com/");
    }

    #[test]
    fn explicit_ports_survive_unless_default() {
        assert_eq!(
            normalize_url("http://example.com:80/a/"),
            "http://example.com/a"
        );
        assert_eq!(
            normalize_url("https://example.com:8443/a"),
            "https://example.com:8443/a"
        );
    }

    #[test]
    fn tracking_params_dropped_and_rest_sorted() {
        assert_eq!(
            normalize_url("https://example.com/s?z=1&UTM_Campaign=x&q=rust&gclid=abc&a=2"),
            "https://example.com/s?a=2&q=rust&z=1"
        );
        // "ref" selects content on many sites and is kept.
        assert_eq!(
            normalize_url("https://example.com/s?ref=main"),
            "https://example.com/s?ref=main"
        );
    }

    #[test]
    fn only_tracking_params_leaves_no_query() {
        assert_eq!(
            normalize_url("https://example.com/page/?utm_source=feed&fbclid=1"),
            "https://example.com/page"
        );
    }

    #[test]
    fn hostless_urls_lose_only_the_fragment() {
        assert_eq!(
            normalize_url("mailto:Someone@Example.com#x"),
            "mailto:Someone@Example.com"
        );
    }

    #[test]
    fn unparseable_input_unchanged() {
        assert_eq!(normalize_url("not a url at all"), "not a url at all");
        assert_eq!(normalize_url(""), "");
    }

    #[test]
    fn same_page_variants_share_a_key() {
        let key = dedup_key("https://example.com/rust");
        for variant in [
            "https://Example.com/Rust/",
            "HTTPS://EXAMPLE.COM/rust",
            "https://example.com:443/rust#install",
            "https://example.com/rust?utm_medium=email",
            "  https://example.com/rust/  ",
        ] {
            assert_eq!(dedup_key(variant), key, "{variant}");
        }
        assert_eq!(
            dedup_key("https://example.com/a?b=2&a=1"),
            dedup_key("https://example.com/a?a=1&b=2")
        );
    }

    #[test]
    fn different_pages_keep_distinct_keys() {
        assert_ne!(
            dedup_key("https://example.com/a"),
            dedup_key("https://example.com/b")
        );
        assert_ne!(
            dedup_key("https://example.com/a?page=1"),
            dedup_key("https://example.com/a?page=2")
        );
        assert_ne!(
            dedup_key("http://example.com:8080/a"),
            dedup_key("http://example.com/a")
        );
    }

    #[test]
    fn unparseable_input_still_folds_case_and_slash() {
        assert_eq!(dedup_key("Not A URL/"), "not a url");
        assert_eq!(dedup_key("/"), "/");
    }
}
