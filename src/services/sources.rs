// src/services/sources.rs

//! Listing site adapters.
//!
//! An adapter turns one site's search results into raw postings. Fetch and
//! parse failures are errors at the adapter level; [`SourceAdapter::collect`]
//! collapses them into an empty result so one broken site never stops a run.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{CardSelectors, Posting, SourceConfig};
use crate::utils::{http, resolve_url};

/// A site that produces zero or more raw postings per run.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Name stamped on every posting from this site.
    fn name(&self) -> &str;

    /// Fetch and parse the site's current listings.
    async fn fetch(&self) -> Result<Vec<Posting>>;

    /// Fetch listings, treating any failure as "no postings".
    async fn fetch_or_empty(&self) -> Vec<Posting> {
        match self.fetch().await {
            Ok(postings) => {
                log::info!("{}: {} postings", self.name(), postings.len());
                postings
            }
            Err(e) => {
                log::warn!("{}: fetch failed, continuing without it: {}", self.name(), e);
                Vec::new()
            }
        }
    }
}

/// Selector-driven adapter for a single HTML results page.
pub struct HtmlSource {
    config: SourceConfig,
    client: Client,
}

impl HtmlSource {
    /// Create an adapter for the given site using a shared client.
    pub fn new(config: SourceConfig, client: Client) -> Self {
        Self { config, client }
    }

    /// Extract postings from an already-fetched results page.
    pub fn parse_document(&self, document: &Html) -> Result<Vec<Posting>> {
        let base_url = Url::parse(&self.config.url)?;
        let fields = FieldSelectors::parse(&self.config.selectors)?;

        let cards = match self.find_cards(document)? {
            Some(cards) => cards,
            None => {
                log::debug!("{}: no card selector matched", self.config.name);
                return Ok(Vec::new());
            }
        };

        Ok(cards
            .into_iter()
            .filter_map(|card| self.parse_card(card, &fields, &base_url))
            .collect())
    }

    /// First card selector that matches anything wins.
    fn find_cards<'a>(&self, document: &'a Html) -> Result<Option<Vec<ElementRef<'a>>>> {
        for raw in &self.config.selectors.cards {
            let selector = parse_selector(raw)?;
            let cards: Vec<_> = document.select(&selector).collect();
            if !cards.is_empty() {
                return Ok(Some(cards));
            }
        }
        Ok(None)
    }

    fn parse_card(
        &self,
        card: ElementRef<'_>,
        fields: &FieldSelectors,
        base_url: &Url,
    ) -> Option<Posting> {
        let title = text_of(card, Some(&fields.title));
        if title.trim().is_empty() {
            return None;
        }

        let mut location = text_of(card, fields.location.as_ref());
        if location.trim().is_empty() {
            if let Some(default) = &self.config.default_location {
                location = default.clone();
            }
        }

        let link = self.link_of(card, fields, base_url);

        Some(Posting::new(
            self.config.name.as_str(),
            &title,
            &text_of(card, fields.company.as_ref()),
            &location,
            &link,
            &text_of(card, fields.snippet.as_ref()),
        ))
    }

    /// Link from the link selector, else the card itself, else its first anchor.
    fn link_of(&self, card: ElementRef<'_>, fields: &FieldSelectors, base_url: &Url) -> String {
        let attr = self.config.selectors.link_attr.as_str();
        let raw = fields
            .link
            .as_ref()
            .and_then(|sel| card.select(sel).next())
            .and_then(|el| el.value().attr(attr))
            .or_else(|| card.value().attr(attr))
            .or_else(|| {
                card.select(&fields.anchor)
                    .next()
                    .and_then(|el| el.value().attr("href"))
            })
            .unwrap_or("")
            .trim();

        if raw.is_empty() {
            String::new()
        } else {
            resolve_url(base_url, raw)
        }
    }
}

#[async_trait]
impl SourceAdapter for HtmlSource {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn fetch(&self) -> Result<Vec<Posting>> {
        let document = http::fetch_page(&self.client, &self.config.url)
            .await
            .map_err(|e| AppError::source(&self.config.name, e))?;
        self.parse_document(&document)
    }
}

/// Parsed per-card selectors.
struct FieldSelectors {
    title: Selector,
    company: Option<Selector>,
    location: Option<Selector>,
    snippet: Option<Selector>,
    link: Option<Selector>,
    anchor: Selector,
}

impl FieldSelectors {
    fn parse(selectors: &CardSelectors) -> Result<Self> {
        let optional = |s: &Option<String>| s.as_deref().map(parse_selector).transpose();
        Ok(Self {
            title: parse_selector(&selectors.title)?,
            company: optional(&selectors.company)?,
            location: optional(&selectors.location)?,
            snippet: optional(&selectors.snippet)?,
            link: optional(&selectors.link)?,
            anchor: parse_selector("a[href]")?,
        })
    }
}

/// Text of the first match, with child text nodes space-separated.
fn text_of(card: ElementRef<'_>, selector: Option<&Selector>) -> String {
    selector
        .and_then(|sel| card.select(sel).next())
        .map(|el| el.text().collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Build one adapter per enabled source, in configured order.
pub fn build_sources<'a>(
    sources: impl Iterator<Item = &'a SourceConfig>,
    client: &Client,
) -> Vec<Box<dyn SourceAdapter>> {
    sources
        .map(|config| {
            Box::new(HtmlSource::new(config.clone(), client.clone())) as Box<dyn SourceAdapter>
        })
        .collect()
}
