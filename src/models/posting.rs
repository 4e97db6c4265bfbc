//! Job posting data structure.

use serde::{Deserialize, Serialize};

use crate::utils::text::{clean, searchable};

/// A job posting produced by a source adapter.
///
/// Free-text fields are never absent: missing values deserialize and
/// construct as empty strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Posting {
    /// Name of the originating listing site
    pub source: String,

    /// Job title
    #[serde(default)]
    pub title: String,

    /// Hiring company
    #[serde(default)]
    pub company: String,

    /// Location as displayed by the site
    #[serde(default)]
    pub location: String,

    /// Absolute URL to the listing
    #[serde(default)]
    pub link: String,

    /// Short description or summary
    #[serde(default)]
    pub snippet: String,
}

/// Identity used for cross-source deduplication.
pub type DedupKey = (String, String, String);

impl Posting {
    /// Build a posting with whitespace-normalized text fields.
    ///
    /// The link is trimmed but otherwise kept verbatim.
    pub fn new(
        source: impl Into<String>,
        title: &str,
        company: &str,
        location: &str,
        link: &str,
        snippet: &str,
    ) -> Self {
        Self {
            source: source.into(),
            title: clean(title),
            company: clean(company),
            location: clean(location),
            link: link.trim().to_string(),
            snippet: clean(snippet),
        }
    }

    /// Return a copy with every free-text field whitespace-normalized.
    pub fn normalized(self) -> Self {
        Self::new(
            self.source,
            &self.title,
            &self.company,
            &self.location,
            &self.link,
            &self.snippet,
        )
    }

    /// Lower-cased concatenation of title, company, location and snippet.
    pub fn search_text(&self) -> String {
        searchable(&[&self.title, &self.company, &self.location, &self.snippet])
    }

    /// Dedup identity: lower-cased title, lower-cased company, exact link.
    pub fn dedup_key(&self) -> DedupKey {
        (
            self.title.to_lowercase(),
            self.company.to_lowercase(),
            self.link.clone(),
        )
    }
}
