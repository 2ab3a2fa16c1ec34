use serde::{Deserialize, Serialize};

use super::sort::SortDirective;

/// Category sentinel that selects the whole catalog.
pub const ALL_CATEGORIES: &str = "all";

/// Star rating as reported by the catalog service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub rate: f64,  // 0..=5
    pub count: u32, // number of reviews
}

/// Product as it arrives on the wire, before enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: i64,
    pub title: String,
    pub price: f64,
    pub description: String,
    pub category: String,
    pub image: String,
    pub rating: Rating,
}

/// Promotional discount synthesized locally for display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub has_offer: bool,
    pub discount: f64,
}

impl Offer {
    pub const NONE: Offer = Offer {
        has_offer: false,
        discount: 0.0,
    };

    /// Offer of `percent`% off. Values above 19 are clamped.
    pub fn percent(percent: u8) -> Self {
        Self {
            has_offer: true,
            discount: f64::from(percent.min(19)) / 100.0,
        }
    }

    pub fn percent_off(&self) -> u32 {
        (self.discount * 100.0).round() as u32
    }
}

/// Enriched product held by the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub title: String,
    pub price: f64,
    pub description: String,
    pub category: String,
    pub image: String,
    pub rating: Rating,
    pub offer: Offer,
}

impl Product {
    pub fn from_record(record: ProductRecord, offer: Offer) -> Self {
        let ProductRecord {
            id,
            title,
            price,
            description,
            category,
            image,
            rating,
        } = record;
        Self {
            id,
            title,
            price,
            description,
            category,
            image,
            rating,
            offer,
        }
    }

    /// `price × (1 − discount)` rounded to cents.
    pub fn discounted_price(&self) -> f64 {
        round_cents(self.price * (1.0 - self.offer.discount))
    }
}

pub(crate) fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// What the grid needs to draw one product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductCard {
    pub id: i64,
    pub title: String,
    pub image: String,
    pub price: f64,
    pub discounted_price: Option<f64>,
    pub rating: f64,
    pub rating_count: u32,
    pub has_offer: bool,
    pub discount_percent: u32,
}

impl From<&Product> for ProductCard {
    fn from(p: &Product) -> Self {
        let has_offer = p.offer.has_offer;
        Self {
            id: p.id,
            title: p.title.clone(),
            image: p.image.clone(),
            price: p.price,
            discounted_price: has_offer.then(|| p.discounted_price()),
            rating: p.rating.rate,
            rating_count: p.rating.count,
            has_offer,
            discount_percent: if has_offer { p.offer.percent_off() } else { 0 },
        }
    }
}

/// Either every product or one named category.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategorySelection {
    #[default]
    All,
    Named(String),
}

impl CategorySelection {
    /// Maps the `all` sentinel to [`CategorySelection::All`]; anything else
    /// is taken verbatim.
    pub fn parse(name: impl Into<String>) -> Self {
        let name = name.into();
        if name == ALL_CATEGORIES {
            Self::All
        } else {
            Self::Named(name)
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::All => ALL_CATEGORIES,
            Self::Named(name) => name,
        }
    }
}

impl Serialize for CategorySelection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CategorySelection {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::parse)
    }
}

/// Which dropdowns are currently open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MenuState {
    pub categories_open: bool,
    pub sort_open: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Fetching,
}

/// Immutable copy of the controller state.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogView {
    pub category: CategorySelection,
    pub sort: SortDirective,
    pub menus: MenuState,
    pub phase: Phase,
    pub categories: Vec<String>,
    pub products: Vec<ProductCard>,
}

/// Request body for `POST /category`.
#[derive(Debug, Deserialize)]
pub struct SelectCategoryRequest {
    pub category: String,
}
