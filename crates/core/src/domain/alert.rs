use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    StockoutRisk,
    OverstockRisk,
    CompetitiveThreat,
    PricingOpportunity,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::StockoutRisk => "stockout_risk",
            AlertType::OverstockRisk => "overstock_risk",
            AlertType::CompetitiveThreat => "competitive_threat",
            AlertType::PricingOpportunity => "pricing_opportunity",
        }
    }
}

/// Ordered by gravity: Low < Medium < High < Critical, so severity floors can
/// use plain comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            other => anyhow::bail!("unknown severity: {other}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Unread,
    Acknowledged,
    Resolved,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Unread => "unread",
            AlertStatus::Acknowledged => "acknowledged",
            AlertStatus::Resolved => "resolved",
        }
    }
}

/// One prioritized alert record. Created by the alert engine; `status` is
/// mutated only by the excluded UI/API layer, so the engine always emits
/// `Unread`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub sku: String,
    pub alert_type: AlertType,
    pub severity: Severity,
    /// 1..=10, used to break per-SKU cap ties.
    pub urgency_score: u8,
    pub message: String,
    pub revenue_at_risk: f64,
    pub created_at: DateTime<Utc>,
    pub status: AlertStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_orders_by_gravity() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn severity_parses_case_insensitively() {
        assert_eq!(Severity::from_str("HIGH").unwrap(), Severity::High);
        assert_eq!(Severity::from_str(" medium ").unwrap(), Severity::Medium);
        assert!(Severity::from_str("urgent").is_err());
    }
}
