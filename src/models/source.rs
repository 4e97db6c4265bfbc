//! Listing site definitions and their extraction selectors.

use serde::{Deserialize, Serialize};

/// One listing site and how to read its search results page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Display name, also used as the ranking tie-breaker
    pub name: String,

    /// Search results page URL
    pub url: String,

    /// Whether this source is queried at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Selectors used to pull postings out of the page
    pub selectors: CardSelectors,

    /// Location used when the card has none
    #[serde(default)]
    pub default_location: Option<String>,
}

fn default_enabled() -> bool {
    true
}

/// CSS selectors for a results page.
///
/// `cards` holds fallbacks: the first selector that matches anything wins.
/// Every field selector is evaluated relative to a card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardSelectors {
    /// Candidate selectors for job cards, tried in order
    pub cards: Vec<String>,

    /// Title element
    pub title: String,

    /// Company element
    #[serde(default)]
    pub company: Option<String>,

    /// Location element
    #[serde(default)]
    pub location: Option<String>,

    /// Snippet element
    #[serde(default)]
    pub snippet: Option<String>,

    /// Link element; the card itself is used when absent or unmatched
    #[serde(default)]
    pub link: Option<String>,

    /// Attribute holding the link
    #[serde(default = "default_link_attr")]
    pub link_attr: String,
}

fn default_link_attr() -> String {
    "href".into()
}

impl CardSelectors {
    /// All selector strings, for validation.
    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.cards
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.title.as_str()))
            .chain(
                [&self.company, &self.location, &self.snippet, &self.link]
                    .into_iter()
                    .flatten()
                    .map(String::as_str),
            )
    }
}
