use rand::{rngs::StdRng, Rng, SeedableRng};

use super::dto::{Offer, Product, ProductRecord};

/// Chance that a product gets an offer.
pub const OFFER_PROBABILITY: f64 = 0.2;
/// Discounts are whole percentages below this bound.
pub const MAX_DISCOUNT_PERCENT: u8 = 20;

/// Source of synthetic offers, swappable for deterministic tests.
pub trait OfferSource: Send {
    fn next_offer(&mut self) -> Offer;
}

/// Draws offers from a random number generator.
pub struct RandomOffers<R = StdRng> {
    rng: R,
}

impl RandomOffers<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomOffers<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng + Send> OfferSource for RandomOffers<R> {
    fn next_offer(&mut self) -> Offer {
        if self.rng.gen::<f64>() < OFFER_PROBABILITY {
            Offer::percent(self.rng.gen_range(0..MAX_DISCOUNT_PERCENT))
        } else {
            Offer::NONE
        }
    }
}

/// Hands out a fixed sequence of offers, then no offers.
#[cfg(test)]
pub struct FixedOffers(std::collections::VecDeque<Offer>);

#[cfg(test)]
impl FixedOffers {
    pub fn new(offers: impl IntoIterator<Item = Offer>) -> Self {
        Self(offers.into_iter().collect())
    }

    pub fn none() -> Self {
        Self::new([])
    }
}

#[cfg(test)]
impl OfferSource for FixedOffers {
    fn next_offer(&mut self) -> Offer {
        self.0.pop_front().unwrap_or(Offer::NONE)
    }
}

/// Attaches a fresh offer to every record, preserving order.
pub fn enrich(records: Vec<ProductRecord>, offers: &mut dyn OfferSource) -> Vec<Product> {
    records
        .into_iter()
        .map(|record| Product::from_record(record, offers.next_offer()))
        .collect()
}
