//! Core types for retrieved and ranked sources.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single source returned by a Retrieval Source.
///
/// Every field is optional on the wire: missing strings deserialize as empty
/// and missing metadata as `None`. Candidates are never mutated after
/// retrieval; ranking wraps them in [`RankedSource`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SourceCandidate {
    /// Page title.
    pub title: String,
    /// Page URL.
    #[serde(alias = "link")]
    pub url: String,
    /// Text snippet summarising the page.
    pub snippet: String,
    /// Representative image URL, if the back-end found one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Favicon URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    /// Clean host for display (`example.com`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_url: Option<String>,
    /// Publish date as reported by the page (ISO-8601 or any string whose
    /// first four characters are the year).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,
}

impl SourceCandidate {
    /// Create a candidate with the three core fields.
    pub fn new(title: impl Into<String>, url: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
            ..Default::default()
        }
    }

    /// Attach a publish date.
    #[must_use]
    pub fn with_publish_date(mut self, date: impl Into<String>) -> Self {
        self.publish_date = Some(date.into());
        self
    }

    /// The publish year, if a date is present and starts with four digits.
    pub fn publish_year(&self) -> Option<i32> {
        let date = self.publish_date.as_deref()?.trim();
        let year = date.get(..4)?;
        if !year.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        year.parse().ok()
    }

    /// The display host: the explicit `display_url`, else the URL host with
    /// a leading `www.` removed.
    pub fn display_host(&self) -> Option<String> {
        if let Some(display) = self.display_url.as_deref().filter(|d| !d.is_empty()) {
            return Some(display.to_owned());
        }
        crate::orchestrator::url_normalize::display_host(&self.url)
    }
}

/// The weighted sub-scores behind a [`RankedSource::relevance_score`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    /// Fraction of query key terms found in the title.
    pub title_match: f64,
    /// Fraction of key terms in the snippet, plus the exact-phrase bonus.
    pub snippet_match: f64,
    /// Publish-year bucket (0.5 when undated).
    pub freshness: f64,
    /// Domain authority tier.
    pub domain_authority: f64,
}

/// A source after relevance scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedSource {
    /// The retrieved source, unchanged.
    #[serde(flatten)]
    pub source: SourceCandidate,
    /// Final relevance in `[0, 1]`; focus-mode boosting may raise it.
    pub relevance_score: f64,
    /// Sub-scores from the base ranking pass.
    pub score_breakdown: ScoreBreakdown,
    /// Snippet sentences that best support the query.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enhanced_snippets: Vec<String>,
}

impl RankedSource {
    /// Wrap a candidate with its score.
    pub fn new(source: SourceCandidate, breakdown: ScoreBreakdown, relevance_score: f64) -> Self {
        Self {
            source,
            relevance_score: relevance_score.clamp(0.0, 1.0),
            score_breakdown: breakdown,
            enhanced_snippets: Vec::new(),
        }
    }

    /// Page title.
    pub fn title(&self) -> &str {
        &self.source.title
    }

    /// Page URL.
    pub fn url(&self) -> &str {
        &self.source.url
    }

    /// Snippet text.
    pub fn snippet(&self) -> &str {
        &self.source.snippet
    }
}

/// Leniently convert a JSON value into source candidates.
///
/// Anything that is not an array yields an empty list. Array items that are
/// not objects are skipped; object fields with the wrong type are treated as
/// absent. `link` is accepted as an alias of `url`.
pub fn parse_sources(value: &Value) -> Vec<SourceCandidate> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let obj = item.as_object()?;
            let text = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_owned);
            Some(SourceCandidate {
                title: text("title").unwrap_or_default(),
                url: text("url").or_else(|| text("link")).unwrap_or_default(),
                snippet: text("snippet").unwrap_or_default(),
                image: text("image"),
                favicon: text("favicon"),
                display_url: text("displayUrl"),
                publish_date: text("publishDate"),
            })
        })
        .collect()
}
