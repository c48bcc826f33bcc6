//! Retrieval filters: date window, file type, domain include/exclude and
//! exact/excluded terms.
//!
//! A [`FilterSet`] composes into a query-append string using the Retrieval
//! Source's boolean syntax (`site:`, `-site:`, quoted phrases, `-term`,
//! `filetype:`). The date token is carried separately for back-ends that take
//! it as a request parameter. [`FilterSet::post_filter`] re-applies the domain
//! and date constraints locally for back-ends that ignore them.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::orchestrator::url_normalize::clean_domain;
use crate::types::SourceCandidate;

/// Predefined recency windows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateFilter {
    /// No restriction.
    #[default]
    #[serde(rename = "any")]
    AnyTime,
    /// Past 24 hours.
    #[serde(rename = "d1")]
    PastDay,
    /// Past week.
    #[serde(rename = "w1")]
    PastWeek,
    /// Past month.
    #[serde(rename = "m1")]
    PastMonth,
    /// Past year.
    #[serde(rename = "y1")]
    PastYear,
}

impl DateFilter {
    /// Wire token (`any`, `d1`, `w1`, `m1`, `y1`).
    pub fn token(&self) -> &'static str {
        match self {
            Self::AnyTime => "any",
            Self::PastDay => "d1",
            Self::PastWeek => "w1",
            Self::PastMonth => "m1",
            Self::PastYear => "y1",
        }
    }

    /// Human-readable label.
    pub fn description(&self) -> &'static str {
        match self {
            Self::AnyTime => "Any time",
            Self::PastDay => "Past 24 hours",
            Self::PastWeek => "Past week",
            Self::PastMonth => "Past month",
            Self::PastYear => "Past year",
        }
    }

    /// Parse a wire token. Unknown tokens yield `None`.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|filter| filter.token() == token.trim())
    }

    /// The retrieval `dateRestrict` token, or `None` for [`DateFilter::AnyTime`].
    pub fn restriction(&self) -> Option<&'static str> {
        match self {
            Self::AnyTime => None,
            other => Some(other.token()),
        }
    }

    /// Returns all variants.
    pub fn all() -> &'static [DateFilter] {
        &[
            Self::AnyTime,
            Self::PastDay,
            Self::PastWeek,
            Self::PastMonth,
            Self::PastYear,
        ]
    }
}

impl fmt::Display for DateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Document types a retrieval may be restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Portable Document Format.
    Pdf,
    /// Legacy Word document.
    Doc,
    /// Word document.
    Docx,
    /// Legacy Excel workbook.
    Xls,
    /// Excel workbook.
    Xlsx,
    /// Legacy PowerPoint deck.
    Ppt,
    /// PowerPoint deck.
    Pptx,
    /// Plain text.
    Txt,
}

impl FileType {
    /// File extension used in `filetype:` queries.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Doc => "doc",
            Self::Docx => "docx",
            Self::Xls => "xls",
            Self::Xlsx => "xlsx",
            Self::Ppt => "ppt",
            Self::Pptx => "pptx",
            Self::Txt => "txt",
        }
    }

    /// Parse an extension, case-insensitively.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim().trim_start_matches('.').to_lowercase();
        Self::all().iter().copied().find(|ft| ft.extension() == ext)
    }

    /// Returns all variants.
    pub fn all() -> &'static [FileType] {
        &[
            Self::Pdf,
            Self::Doc,
            Self::Docx,
            Self::Xls,
            Self::Xlsx,
            Self::Ppt,
            Self::Pptx,
            Self::Txt,
        ]
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Filters attached to a single request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSet {
    /// Recency window.
    pub date_filter: DateFilter,
    /// Document type restriction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<FileType>,
    /// Only these domains (ORed).
    pub include_domains: Vec<String>,
    /// Never these domains.
    pub exclude_domains: Vec<String>,
    /// Phrase that must appear verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exact_terms: Option<String>,
    /// Whitespace-separated terms that must not appear.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_terms: Option<String>,
    /// Earliest publish date kept by [`FilterSet::post_filter`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_date: Option<NaiveDate>,
    /// Latest publish date kept by [`FilterSet::post_filter`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_date: Option<NaiveDate>,
}

impl FilterSet {
    /// Whether any filter is set.
    pub fn is_empty(&self) -> bool {
        self.date_filter == DateFilter::AnyTime
            && self.file_type.is_none()
            && self.include_domains.is_empty()
            && self.exclude_domains.is_empty()
            && non_blank(self.exact_terms.as_deref()).is_none()
            && non_blank(self.exclude_terms.as_deref()).is_none()
            && self.min_date.is_none()
            && self.max_date.is_none()
    }

    /// Compose the query-append string.
    ///
    /// Parts appear in a fixed order: included domains joined with `OR`,
    /// excluded domains, the exact phrase, excluded terms, then the file type.
    /// Returns an empty string when nothing applies.
    pub fn query_append(&self) -> String {
        let mut parts: Vec<String> = Vec::new();

        let include = validate_domains(&self.include_domains);
        if !include.is_empty() {
            parts.push(
                include
                    .iter()
                    .map(|d| format!("site:{d}"))
                    .collect::<Vec<_>>()
                    .join(" OR "),
            );
        }

        let exclude = validate_domains(&self.exclude_domains);
        if !exclude.is_empty() {
            parts.push(
                exclude
                    .iter()
                    .map(|d| format!("-site:{d}"))
                    .collect::<Vec<_>>()
                    .join(" "),
            );
        }

        if let Some(exact) = non_blank(self.exact_terms.as_deref()) {
            parts.push(format!("\"{exact}\""));
        }

        if let Some(terms) = non_blank(self.exclude_terms.as_deref()) {
            parts.push(
                terms
                    .split_whitespace()
                    .map(|t| format!("-{t}"))
                    .collect::<Vec<_>>()
                    .join(" "),
            );
        }

        if let Some(file_type) = self.file_type {
            parts.push(format!("filetype:{file_type}"));
        }

        parts.join(" ")
    }

    /// Append the composed modifiers to `base_query`.
    pub fn apply_to_query(&self, base_query: &str) -> String {
        let append = self.query_append();
        if append.is_empty() {
            base_query.to_string()
        } else {
            format!("{base_query} {append}")
        }
    }

    /// Drop sources that violate the domain or date constraints.
    ///
    /// Domains match as lowercase substrings of the URL. Sources whose
    /// publish date is missing or unparseable are kept.
    pub fn post_filter(&self, sources: Vec<SourceCandidate>) -> Vec<SourceCandidate> {
        let include = validate_domains(&self.include_domains);
        let exclude = validate_domains(&self.exclude_domains);

        sources
            .into_iter()
            .filter(|source| {
                let url = source.url.to_lowercase();
                if !include.is_empty() && !include.iter().any(|d| url.contains(d.as_str())) {
                    return false;
                }
                if exclude.iter().any(|d| url.contains(d.as_str())) {
                    return false;
                }
                self.within_date_window(source)
            })
            .collect()
    }

    fn within_date_window(&self, source: &SourceCandidate) -> bool {
        if self.min_date.is_none() && self.max_date.is_none() {
            return true;
        }
        let Some(published) = source.publish_date.as_deref().and_then(parse_publish_date) else {
            return true;
        };
        if self.min_date.is_some_and(|min| published < min) {
            return false;
        }
        if self.max_date.is_some_and(|max| published > max) {
            return false;
        }
        true
    }
}

/// Clean a list of domains for `site:` filters, dropping empty entries.
///
/// ```
/// use groundline_search::filters::validate_domains;
///
/// let cleaned = validate_domains(&["https://www.arxiv.org/".into(), "  ".into()]);
/// assert_eq!(cleaned, vec!["arxiv.org".to_string()]);
/// ```
pub fn validate_domains(domains: &[String]) -> Vec<String> {
    domains.iter().filter_map(|d| clean_domain(d)).collect()
}

/// Parse a publish date as RFC 3339 or a leading `YYYY-MM-DD`.
pub fn parse_publish_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.date_naive());
    }
    NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok()
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

/// Filter options a caller can offer in a UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterCatalogue {
    /// Date tokens.
    pub date_filters: Vec<&'static str>,
    /// File type extensions.
    pub file_types: Vec<&'static str>,
    /// Free-form filter fields.
    pub custom_options: Vec<&'static str>,
}

/// Every filter option supported by [`FilterSet`].
pub fn available_filters() -> FilterCatalogue {
    FilterCatalogue {
        date_filters: DateFilter::all().iter().map(DateFilter::token).collect(),
        file_types: FileType::all().iter().map(FileType::extension).collect(),
        custom_options: vec![
            "include_domains",
            "exclude_domains",
            "exact_terms",
            "exclude_terms",
        ],
    }
}

/// Commonly used include-domain presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainPreset {
    /// Scholarly and government sources.
    Academic,
    /// Wire services and major papers.
    News,
    /// Technology press.
    Tech,
    /// Official documentation sites.
    Docs,
    /// Q&A sites and forums.
    Forums,
}

impl DomainPreset {
    /// Preset name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Academic => "academic",
            Self::News => "news",
            Self::Tech => "tech",
            Self::Docs => "docs",
            Self::Forums => "forums",
        }
    }

    /// Domains in this preset.
    pub fn domains(&self) -> &'static [&'static str] {
        match self {
            Self::Academic => &[
                "edu",
                "gov",
                "scholar.google.com",
                "arxiv.org",
                "pubmed.ncbi.nlm.nih.gov",
                "jstor.org",
                "nature.com",
            ],
            Self::News => &[
                "reuters.com",
                "apnews.com",
                "bbc.com",
                "nytimes.com",
                "theguardian.com",
                "washingtonpost.com",
                "bloomberg.com",
            ],
            Self::Tech => &[
                "techcrunch.com",
                "theverge.com",
                "wired.com",
                "arstechnica.com",
                "hacker-news.com",
                "thenextweb.com",
            ],
            Self::Docs => &[
                "docs.python.org",
                "developer.mozilla.org",
                "docs.microsoft.com",
                "docs.google.com",
                "documentation",
            ],
            Self::Forums => &[
                "stackoverflow.com",
                "reddit.com",
                "stackexchange.com",
                "discourse",
                "github.com/issues",
                "github.com/discussions",
            ],
        }
    }

    /// Returns all presets.
    pub fn all() -> &'static [DomainPreset] {
        &[
            Self::Academic,
            Self::News,
            Self::Tech,
            Self::Docs,
            Self::Forums,
        ]
    }
}

impl fmt::Display for DomainPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
