// src/services/extract.rs

//! Field extraction from listing fragments.
//!
//! Pure HTML-to-Posting conversion, no network or storage access. Every
//! field extraction is tolerant: a missing element and a present element
//! with empty text both yield the empty string.

use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{Posting, SelectorConfig};
use crate::utils::url::id_from_urn;

/// Compiled selector set for listing and detail pages.
pub struct CardSelectors {
    card: Selector,
    id_attr: String,
    title: Selector,
    company: Selector,
    location: Selector,
    published_at: Selector,
    published_at_attr: String,
    description: Selector,
}

impl CardSelectors {
    /// Compile the configured selectors once per crawl.
    pub fn compile(config: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            card: parse_selector(&config.card)?,
            id_attr: config.id_attr.clone(),
            title: parse_selector(&config.title)?,
            company: parse_selector(&config.company)?,
            location: parse_selector(&config.location)?,
            published_at: parse_selector(&config.published_at)?,
            published_at_attr: config.published_at_attr.clone(),
            description: parse_selector(&config.description)?,
        })
    }
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Extract all candidate postings from one listing page.
///
/// Cards without a posting id are skipped: they cannot participate in
/// deduplication.
pub fn extract_cards(html: &str, selectors: &CardSelectors) -> Vec<Posting> {
    let document = Html::parse_document(html);
    let mut postings = Vec::new();

    for card in document.select(&selectors.card) {
        match extract_posting(&card, selectors) {
            Some(posting) => postings.push(posting),
            None => log::warn!("listing card without a posting id, skipping"),
        }
    }
    postings
}

/// Turn one listing card into a partially-populated posting.
///
/// Description and dispatched state are attached later by the crawler.
pub fn extract_posting(card: &ElementRef, selectors: &CardSelectors) -> Option<Posting> {
    let id = id_from_urn(card.value().attr(&selectors.id_attr).unwrap_or(""));
    if id.is_empty() {
        return None;
    }

    Some(Posting {
        id,
        title: select_text(card, &selectors.title),
        company: select_text(card, &selectors.company),
        location: select_text(card, &selectors.location),
        published_at: select_attr(card, &selectors.published_at, &selectors.published_at_attr),
        description: String::new(),
        dispatched: false,
        expires_at: 0,
    })
}

/// Extract the description text from a detail page, empty if the
/// container element is absent.
pub fn extract_description(html: &str, selectors: &CardSelectors) -> String {
    let document = Html::parse_document(html);
    document
        .select(&selectors.description)
        .next()
        .map(|container| collect_text(&container))
        .unwrap_or_default()
}

/// Text of the first matching element, trimmed; empty if absent.
fn select_text(root: &ElementRef, selector: &Selector) -> String {
    root.select(selector)
        .next()
        .map(|el| collect_text(&el))
        .unwrap_or_default()
}

/// Attribute of the first matching element, trimmed; empty if the element
/// or the attribute is absent.
fn select_attr(root: &ElementRef, selector: &Selector, attr: &str) -> String {
    root.select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .unwrap_or("")
        .trim()
        .to_string()
}

fn collect_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}
