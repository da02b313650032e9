use crate::domain::product::Product;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw competitor price record as returned by a lookup transport. No schema
/// beyond this; everything else is derived at annotation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPriceRecord {
    pub competitor: String,
    pub competitor_price: f64,
    #[serde(default)]
    pub availability: bool,
    #[serde(default)]
    pub promotional: bool,
    #[serde(default)]
    pub product_name: Option<String>,
}

/// One harvested competitor price point, annotated against our price at
/// harvest time. Immutable once built.
///
/// Sign convention: `price_difference = our_price - competitor_price`, and the
/// percentage is relative to the competitor price. Positive means we are more
/// expensive than the competitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitorObservation {
    pub sku: String,
    pub competitor: String,
    pub competitor_price: f64,
    pub our_price: f64,
    pub price_difference: f64,
    pub price_difference_percentage: f64,
    pub availability: bool,
    pub promotional: bool,
    pub source: String,
    pub observed_at: DateTime<Utc>,
}

impl CompetitorObservation {
    /// Annotates a raw transport record against the product it was harvested
    /// for. Records with a non-positive or non-finite competitor price carry
    /// no usable signal and are dropped.
    pub fn from_raw(
        product: &Product,
        raw: RawPriceRecord,
        source: &str,
        observed_at: DateTime<Utc>,
    ) -> Option<Self> {
        if !raw.competitor_price.is_finite() || raw.competitor_price <= 0.0 {
            return None;
        }
        let competitor = raw.competitor.trim().to_string();
        if competitor.is_empty() {
            return None;
        }

        let price_difference = product.price - raw.competitor_price;
        let price_difference_percentage = price_difference / raw.competitor_price * 100.0;

        Some(Self {
            sku: product.sku.clone(),
            competitor,
            competitor_price: raw.competitor_price,
            our_price: product.price,
            price_difference,
            price_difference_percentage,
            availability: raw.availability,
            promotional: raw.promotional,
            source: source.to_string(),
            observed_at,
        })
    }
}
