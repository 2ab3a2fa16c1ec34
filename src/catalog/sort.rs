use std::{cmp::Ordering, fmt, str::FromStr};

use feruca::Collator;
use serde::{Deserialize, Serialize};

use super::dto::Product;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Price,
    Rating,
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Active ordering of the product grid. Defaults to price ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortDirective {
    #[serde(rename = "type")]
    pub field: SortField,
    #[serde(rename = "value")]
    pub order: SortOrder,
}

impl SortDirective {
    /// The six directives in menu order.
    pub const ALL: [SortDirective; 6] = [
        SortDirective::new(SortField::Price, SortOrder::Asc),
        SortDirective::new(SortField::Price, SortOrder::Desc),
        SortDirective::new(SortField::Rating, SortOrder::Asc),
        SortDirective::new(SortField::Rating, SortOrder::Desc),
        SortDirective::new(SortField::Name, SortOrder::Asc),
        SortDirective::new(SortField::Name, SortOrder::Desc),
    ];

    pub const fn new(field: SortField, order: SortOrder) -> Self {
        Self { field, order }
    }

    pub fn label(&self) -> &'static str {
        match (self.field, self.order) {
            (SortField::Price, SortOrder::Asc) => "Price: Low to High",
            (SortField::Price, SortOrder::Desc) => "Price: High to Low",
            (SortField::Rating, SortOrder::Asc) => "Rating: Low to High",
            (SortField::Rating, SortOrder::Desc) => "Rating: High to Low",
            (SortField::Name, SortOrder::Asc) => "Name: A to Z",
            (SortField::Name, SortOrder::Desc) => "Name: Z to A",
        }
    }

    /// Comparator for this directive. Titles go through `collator`.
    pub fn compare(&self, collator: &mut Collator, a: &Product, b: &Product) -> Ordering {
        let ord = match self.field {
            SortField::Price => a.price.total_cmp(&b.price),
            SortField::Rating => a.rating.rate.total_cmp(&b.rating.rate),
            SortField::Name => collator.collate(a.title.as_str(), b.title.as_str()),
        };
        match self.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    }
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Price => "price",
            SortField::Rating => "rating",
            SortField::Name => "name",
        }
    }
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown sort {0:?}")]
pub struct UnknownSort(String);

impl FromStr for SortField {
    type Err = UnknownSort;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price" => Ok(Self::Price),
            "rating" => Ok(Self::Rating),
            "name" => Ok(Self::Name),
            other => Err(UnknownSort(other.to_string())),
        }
    }
}

impl FromStr for SortOrder {
    type Err = UnknownSort;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(UnknownSort(other.to_string())),
        }
    }
}

impl fmt::Display for SortDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field.as_str(), self.order.as_str())
    }
}

/// Unicode Collation Algorithm order with the CLDR root tailoring. Accents
/// and case only break ties, so "apple" < "Apple" < "Banana" < "Éclair".
pub fn collate(a: &str, b: &str) -> Ordering {
    Collator::default().collate(a, b)
}

/// Stable in-place sort: equal keys keep their incoming order.
pub fn sort_products(products: &mut [Product], directive: SortDirective) {
    let mut collator = Collator::default();
    products.sort_by(|a, b| directive.compare(&mut collator, a, b));
}
