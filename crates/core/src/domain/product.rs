use anyhow::ensure;
use serde::{Deserialize, Serialize};

/// Weeks-of-stock sentinel for products with zero weekly sales: effectively
/// "never sells out", large enough to clear every overstock threshold.
pub const ZERO_SALES_WEEKS: f64 = 999.0;

/// One inventory SKU, owned by the external inventory store. Read-only to the
/// engine; validated once at the ingestion boundary so downstream math never
/// re-checks fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub sku: String,
    pub name: String,
    pub price: f64,
    pub weekly_sales: f64,
    pub inventory_level: f64,
    pub category: String,
    pub brand: String,
    pub subcategory: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceTier {
    Budget,
    Mid,
    Premium,
}

impl Product {
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(!self.sku.trim().is_empty(), "sku must be non-empty");
        ensure!(
            self.price.is_finite() && self.price >= 0.0,
            "price must be a non-negative number (sku={}, got {})",
            self.sku,
            self.price
        );
        ensure!(
            self.weekly_sales.is_finite() && self.weekly_sales >= 0.0,
            "weekly_sales must be a non-negative number (sku={}, got {})",
            self.sku,
            self.weekly_sales
        );
        ensure!(
            self.inventory_level.is_finite() && self.inventory_level >= 0.0,
            "inventory_level must be a non-negative number (sku={}, got {})",
            self.sku,
            self.inventory_level
        );
        Ok(())
    }

    /// Weekly revenue contribution; the selector's primary ranking signal.
    pub fn revenue(&self) -> f64 {
        self.price * self.weekly_sales
    }

    /// Sales velocity relative to stock on hand. Inventory is floored at 1 so
    /// out-of-stock items do not divide by zero.
    pub fn turnover(&self) -> f64 {
        self.weekly_sales / self.inventory_level.max(1.0)
    }

    pub fn weeks_of_stock(&self) -> f64 {
        if self.weekly_sales <= 0.0 {
            ZERO_SALES_WEEKS
        } else {
            self.inventory_level / self.weekly_sales
        }
    }

    pub fn price_tier(&self) -> PriceTier {
        if self.price < 20.0 {
            PriceTier::Budget
        } else if self.price < 50.0 {
            PriceTier::Mid
        } else {
            PriceTier::Premium
        }
    }
}
