//! URL normalisation for source deduplication and domain filters.
//!
//! Canonicalises URLs so that the same page reached over a different scheme,
//! with or without `www.`, or with a trailing slash compares as equal.

use url::Url;

/// Normalise a URL into its deduplication key.
///
/// Applies the following transformations:
///
/// 1. Lowercase the whole string.
/// 2. Strip the scheme (`http://`, `https://`, any `scheme://`).
/// 3. Strip a leading `www.`.
/// 4. Strip trailing slashes.
///
/// Inputs that are not URLs at all are still normalised textually, so an
/// arbitrary string always produces a stable key.
///
/// # Examples
///
/// ```
/// use groundline_search::orchestrator::url_normalize::dedup_key;
///
/// assert_eq!(dedup_key("http://www.x.com/a/"), dedup_key("https://x.com/a"));
/// ```
pub fn dedup_key(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let without_scheme = strip_scheme(&lowered);
    let without_www = without_scheme.strip_prefix("www.").unwrap_or(without_scheme);
    without_www.trim_end_matches('/').to_string()
}

/// Clean a user-supplied domain for `site:` filters.
///
/// Strips scheme, leading `www.` and trailing slashes; returns `None` when
/// nothing is left.
///
/// ```
/// use groundline_search::orchestrator::url_normalize::clean_domain;
///
/// assert_eq!(clean_domain("https://www.arxiv.org/").as_deref(), Some("arxiv.org"));
/// assert_eq!(clean_domain("https://"), None);
/// ```
pub fn clean_domain(raw: &str) -> Option<String> {
    let trimmed = raw.trim().to_lowercase();
    let without_scheme = strip_scheme(&trimmed);
    let without_slash = without_scheme.trim_end_matches('/');
    let domain = without_slash.strip_prefix("www.").unwrap_or(without_slash);
    if domain.is_empty() {
        None
    } else {
        Some(domain.to_string())
    }
}

/// Host of a URL for display, without a leading `www.`.
///
/// Returns `None` if the URL cannot be parsed or has no host.
pub fn display_host(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw.trim()).ok()?;
    let host = parsed.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_string())
}

/// Remove a leading `scheme://` if the text before `://` is a plausible scheme.
fn strip_scheme(text: &str) -> &str {
    match text.split_once("://") {
        Some((scheme, rest))
            if !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) =>
        {
            rest
        }
        _ => text,
    }
}
