use serde::{Deserialize, Serialize};
use std::fmt;

pub const UNKNOWN_BRAND: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    InStock,
    OutOfStock,
    Unknown,
}

impl Availability {
    // Negated forms ("not in stock") are listed here so they match before "in stock".
    const OUT_OF_STOCK: [&'static str; 6] = [
        "out of stock",
        "not in stock",
        "sold out",
        "unavailable",
        "not available",
        "coming soon",
    ];

    /// Reads stock status from free card text. Out-of-stock phrases win.
    pub fn classify(text: &str) -> Self {
        let text = text.to_lowercase();
        if Self::OUT_OF_STOCK.iter().any(|p| text.contains(p)) {
            Availability::OutOfStock
        } else if text.contains("in stock") || Self::has_only_left(&text) {
            Availability::InStock
        } else {
            Availability::Unknown
        }
    }

    // "only 3 left"
    fn has_only_left(text: &str) -> bool {
        text.match_indices("only ").any(|(i, m)| {
            let rest = &text[i + m.len()..];
            let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
            digits > 0 && rest[digits..].trim_start().starts_with("left")
        })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Availability::InStock => "In Stock",
            Availability::OutOfStock => "Out of Stock",
            Availability::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One product card from a search results page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub name: String,
    pub brand: Option<String>,
    /// Finite and non-negative; cards without a usable price never become listings.
    pub price: f64,
    pub availability: Availability,
}

impl Listing {
    pub fn brand_label(&self) -> &str {
        self.brand.as_deref().unwrap_or(UNKNOWN_BRAND)
    }
}

/// Result of the price filter: what is kept and how much was dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformResult {
    pub retained: Vec<Listing>,
    pub excluded: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub parsed: usize,
    pub retained: usize,
    pub output_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_availability() {
        assert_eq!(Availability::classify("Sold Out"), Availability::OutOfStock);
        assert_eq!(
            Availability::classify("Currently unavailable"),
            Availability::OutOfStock
        );
        assert_eq!(Availability::classify("In stock"), Availability::InStock);
        assert_eq!(
            Availability::classify("Hurry, Only 3 left!"),
            Availability::InStock
        );
        assert_eq!(
            Availability::classify("Only the best watches"),
            Availability::Unknown
        );
        assert_eq!(Availability::classify("Free delivery"), Availability::Unknown);
    }

    #[test]
    fn test_negated_stock_phrases_are_out_of_stock() {
        assert_eq!(Availability::classify("Not in stock"), Availability::OutOfStock);
        assert_eq!(Availability::classify("Item unavailable"), Availability::OutOfStock);
        assert_eq!(
            Availability::classify("Not available for delivery"),
            Availability::OutOfStock
        );
    }

    #[test]
    fn test_brand_label_defaults_to_unknown() {
        let listing = Listing {
            name: "Analog Watch".to_string(),
            brand: None,
            price: 999.0,
            availability: Availability::Unknown,
        };
        assert_eq!(listing.brand_label(), "Unknown");
    }
}
