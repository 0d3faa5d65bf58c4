use crate::domain::model::{Listing, TransformResult};
use crate::utils::error::Result;
use crate::utils::validation::validate_price;

pub const DEFAULT_PRICE_CEILING: f64 = 2000.0;

/// Keeps listings strictly cheaper than the ceiling, in input order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceFilter {
    ceiling: f64,
}

impl PriceFilter {
    pub fn new(ceiling: f64) -> Result<Self> {
        validate_price("filter.price_ceiling", ceiling)?;
        Ok(Self { ceiling })
    }

    pub fn ceiling(&self) -> f64 {
        self.ceiling
    }

    pub fn accepts(&self, listing: &Listing) -> bool {
        listing.price < self.ceiling
    }

    pub fn retain<I>(&self, listings: I) -> impl Iterator<Item = Listing>
    where
        I: IntoIterator<Item = Listing>,
    {
        let filter = *self;
        listings.into_iter().filter(move |l| filter.accepts(l))
    }

    pub fn apply(&self, listings: Vec<Listing>) -> TransformResult {
        let total = listings.len();
        let retained: Vec<Listing> = self.retain(listings).collect();
        TransformResult {
            excluded: total - retained.len(),
            retained,
        }
    }
}

impl Default for PriceFilter {
    fn default() -> Self {
        Self {
            ceiling: DEFAULT_PRICE_CEILING,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Availability;
    use proptest::prelude::*;

    fn listing(name: &str, price: f64) -> Listing {
        Listing {
            name: name.to_string(),
            brand: None,
            price,
            availability: Availability::Unknown,
        }
    }

    #[test]
    fn test_ceiling_is_exclusive() {
        let result = PriceFilter::default().apply(vec![
            listing("a", 1500.0),
            listing("b", 2500.0),
            listing("c", 1999.0),
            listing("d", 2000.0),
        ]);
        let prices: Vec<f64> = result.retained.iter().map(|l| l.price).collect();
        assert_eq!(prices, vec![1500.0, 1999.0]);
        assert_eq!(result.excluded, 2);
    }

    #[test]
    fn test_rejects_invalid_ceiling() {
        assert!(PriceFilter::new(-5.0).is_err());
        assert!(PriceFilter::new(f64::NAN).is_err());
        assert_eq!(PriceFilter::new(0.0).unwrap().apply(vec![listing("a", 0.0)]).retained.len(), 0);
    }

    proptest! {
        #[test]
        fn prop_retained_is_ordered_subsequence_below_ceiling(
            prices in proptest::collection::vec(0.0f64..5000.0, 0..40),
            ceiling in 0.0f64..5000.0,
        ) {
            let input: Vec<Listing> = prices
                .iter()
                .enumerate()
                .map(|(i, p)| listing(&i.to_string(), *p))
                .collect();
            let result = PriceFilter::new(ceiling).unwrap().apply(input.clone());

            prop_assert!(result.retained.iter().all(|l| l.price < ceiling));
            prop_assert_eq!(result.retained.len() + result.excluded, input.len());

            // Subsequence check: every retained item appears in input order.
            let mut remaining = input.iter();
            for kept in &result.retained {
                prop_assert!(remaining.any(|l| l == kept));
            }

            let expected = input.iter().filter(|l| l.price < ceiling).count();
            prop_assert_eq!(result.retained.len(), expected);
        }
    }
}
