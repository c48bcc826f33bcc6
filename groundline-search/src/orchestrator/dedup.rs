//! Source deduplication by normalised URL.
//!
//! Keeps the first source for each normalised URL and drops the rest. The
//! pass is stable: survivors keep their original relative order, so the
//! Retrieval Source's own ordering still breaks ranking ties later.

use std::collections::HashSet;

use crate::types::SourceCandidate;

use super::url_normalize::dedup_key;

/// Deduplicate sources by normalised URL, keeping the first occurrence.
///
/// See [`dedup_key`] for the normalisation applied.
pub fn deduplicate(sources: Vec<SourceCandidate>) -> Vec<SourceCandidate> {
    let mut seen: HashSet<String> = HashSet::with_capacity(sources.len());
    sources
        .into_iter()
        .filter(|source| seen.insert(dedup_key(&source.url)))
        .collect()
}

/// Merge several source lists (one per sub-query) in order and deduplicate.
///
/// Earlier lists win ties, so the first sub-query's copy of a page survives.
pub fn merge_source_lists(lists: Vec<Vec<SourceCandidate>>) -> Vec<SourceCandidate> {
    deduplicate(lists.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_source(url: &str, title: &str) -> SourceCandidate {
        SourceCandidate::new(title, url, format!("Snippet for {title}"))
    }

    #[test]
    fn unique_urls_pass_through() {
        let deduped = deduplicate(vec![
            make_source("https://a.com", "A"),
            make_source("https://b.com", "B"),
        ]);
        assert_eq!(deduped.len(), 2);
    }

    #[test]
    fn first_occurrence_wins() {
        let deduped = deduplicate(vec![
            make_source("http://www.x.com/a/", "X"),
            make_source("https://x.com/a", "X dup"),
        ]);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].title, "X");
    }

    #[test]
    fn order_is_preserved() {
        let deduped = deduplicate(vec![
            make_source("https://c.com", "C"),
            make_source("https://a.com", "A"),
            make_source("https://c.com/", "C again"),
            make_source("https://b.com", "B"),
        ]);
        let titles: Vec<&str> = deduped.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["C", "A", "B"]);
    }

    #[test]
    fn case_differences_merged() {
        let deduped = deduplicate(vec![
            make_source("https://Example.COM/Path", "Upper"),
            make_source("https://example.com/path", "Lower"),
        ]);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].title, "Upper");
    }

    #[test]
    fn empty_input_returns_empty() {
        assert!(deduplicate(vec![]).is_empty());
    }

    #[test]
    fn missing_urls_collapse_to_one() {
        let deduped = deduplicate(vec![make_source("", "First"), make_source("", "Second")]);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].title, "First");
    }

    #[test]
    fn merge_keeps_earlier_lists_first() {
        let merged = merge_source_lists(vec![
            vec![make_source("https://a.com", "A1"), make_source("https://b.com", "B1")],
            vec![make_source("https://www.a.com/", "A2"), make_source("https://c.com", "C2")],
        ]);
        let titles: Vec<&str> = merged.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["A1", "B1", "C2"]);
    }
}
