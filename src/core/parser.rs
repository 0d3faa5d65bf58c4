//! Product-card extraction from rendered search result markup.
//!
//! Each card is handled independently: a card that lacks a name or a usable
//! price is skipped and counted, the rest of the page is still read.

use crate::config::toml_config::SelectorConfig;
use crate::domain::model::{Availability, Listing};
use crate::utils::error::{ParseItemError, Result, ScrapeError};
use regex::Regex;
use scraper::{html::Select, ElementRef, Html, Selector};

pub struct ListingParser {
    card_css: String,
    card: Selector,
    name: Selector,
    brand: Selector,
    price: Selector,
    availability: Option<Selector>,
    price_pattern: Regex,
}

pub(crate) fn compile_selector(field: &str, css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScrapeError::ConfigValidationError {
        field: field.to_string(),
        message: format!("invalid CSS selector {:?}: {}", css, e),
    })
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Card text outside the name, brand and price elements.
fn status_text(card: ElementRef<'_>, fields: &[&Selector]) -> String {
    let excluded: Vec<_> = fields
        .iter()
        .flat_map(|selector| card.select(*selector))
        .map(|el| el.id())
        .collect();

    card.descendants()
        .filter(|node| !node.ancestors().any(|a| excluded.contains(&a.id())))
        .filter_map(|node| node.value().as_text())
        .flat_map(|text| text.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_text(card: ElementRef<'_>, selector: &Selector) -> Option<String> {
    card.select(selector)
        .map(element_text)
        .find(|text| !text.is_empty())
}

impl ListingParser {
    pub fn new(selectors: &SelectorConfig) -> Result<Self> {
        let price_pattern =
            Regex::new(r"\d[\d,]*(?:\.\d+)?").map_err(|e| ScrapeError::ConfigValidationError {
                field: "price_pattern".to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            card_css: selectors.card.clone(),
            card: compile_selector("selectors.card", &selectors.card)?,
            name: compile_selector("selectors.name", &selectors.name)?,
            brand: compile_selector("selectors.brand", &selectors.brand)?,
            price: compile_selector("selectors.price", &selectors.price)?,
            availability: selectors
                .availability
                .as_deref()
                .map(|css| compile_selector("selectors.availability", css))
                .transpose()?,
            price_pattern,
        })
    }

    /// Lazily walks the cards of `document`, yielding one listing per well-formed card.
    pub fn parse<'a>(&'a self, document: &'a Html) -> Listings<'a> {
        Listings {
            parser: self,
            cards: document.select(&self.card),
            seen: 0,
            skipped: 0,
        }
    }

    pub fn parse_markup(&self, markup: &str) -> Vec<Listing> {
        let document = Html::parse_document(markup);
        let mut cards = self.parse(&document);
        let listings: Vec<Listing> = cards.by_ref().collect();

        if cards.seen() == 0 {
            tracing::warn!(
                "No product cards matched {:?}; the site's class names may have changed",
                self.card_css
            );
        }
        tracing::info!(
            cards = cards.seen(),
            skipped = cards.skipped(),
            "Extracted {} listings",
            listings.len()
        );

        listings
    }

    pub fn parse_card(&self, card: ElementRef<'_>) -> std::result::Result<Listing, ParseItemError> {
        // The anchor's title attribute holds the untruncated product name.
        let name = card
            .select(&self.name)
            .find_map(|el| {
                el.value()
                    .attr("title")
                    .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
                    .filter(|t| !t.is_empty())
                    .or_else(|| Some(element_text(el)).filter(|t| !t.is_empty()))
            })
            .ok_or(ParseItemError::MissingName)?;

        let price_text = first_text(card, &self.price).ok_or(ParseItemError::MissingPrice)?;
        let price = self.parse_price(&price_text)?;

        let brand = first_text(card, &self.brand);

        let availability = match &self.availability {
            Some(selector) => first_text(card, selector)
                .map(|text| Availability::classify(&text))
                .unwrap_or(Availability::Unknown),
            None => Availability::classify(&status_text(
                card,
                &[&self.name, &self.brand, &self.price],
            )),
        };

        Ok(Listing {
            name,
            brand,
            price,
            availability,
        })
    }

    /// Takes the first numeric run of a localized price ("₹1,499", "Rs. 1,499.50").
    pub fn parse_price(&self, text: &str) -> std::result::Result<f64, ParseItemError> {
        let malformed = || ParseItemError::MalformedPrice {
            text: text.to_string(),
        };

        let digits = self
            .price_pattern
            .find(text)
            .ok_or_else(malformed)?
            .as_str()
            .replace(',', "");
        let price: f64 = digits.parse().map_err(|_| malformed())?;

        if price.is_finite() && price >= 0.0 {
            Ok(price)
        } else {
            Err(malformed())
        }
    }
}

/// Single-pass iterator over the listings of one parsed page.
pub struct Listings<'a> {
    parser: &'a ListingParser,
    cards: Select<'a, 'a>,
    seen: usize,
    skipped: usize,
}

impl Listings<'_> {
    pub fn seen(&self) -> usize {
        self.seen
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl Iterator for Listings<'_> {
    type Item = Listing;

    fn next(&mut self) -> Option<Listing> {
        loop {
            let card = self.cards.next()?;
            self.seen += 1;
            match self.parser.parse_card(card) {
                Ok(listing) => return Some(listing),
                Err(e) => {
                    self.skipped += 1;
                    tracing::warn!(card = self.seen, "Skipping product card: {}", e);
                }
            }
        }
    }
}
