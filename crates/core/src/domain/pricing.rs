use serde::{Deserialize, Serialize};

/// Standardized price-action suggestion derived per product from its
/// competitor observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceActionKind {
    Raise,
    Lower,
    Hold,
}

impl PriceActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceActionKind::Raise => "raise",
            PriceActionKind::Lower => "lower",
            PriceActionKind::Hold => "hold",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceAction {
    pub sku: String,
    pub action: PriceActionKind,
    pub suggested_price: f64,
    /// Mean price_difference_percentage across the product's observations.
    pub mean_difference_percentage: f64,
}

/// Pricing-position tallies over all products with at least one observation.
/// Consumed by the health scorer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PricePositionSummary {
    pub overpriced: usize,
    pub underpriced: usize,
    pub competitive: usize,
}

impl PricePositionSummary {
    pub fn total_priced(&self) -> usize {
        self.overpriced + self.underpriced + self.competitive
    }

    /// Share of priced products whose position needs correction.
    pub fn issue_rate(&self) -> f64 {
        let total = self.total_priced();
        if total == 0 {
            return 0.0;
        }
        (self.overpriced + self.underpriced) as f64 / total as f64
    }
}
