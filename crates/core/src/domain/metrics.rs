use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Requested/recommended analysis depth. Deep spends more lookups per
/// product; Surface keeps wide catalogs cheap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisDepth {
    Surface,
    Standard,
    Deep,
}

impl AnalysisDepth {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisDepth::Surface => "surface",
            AnalysisDepth::Standard => "standard",
            AnalysisDepth::Deep => "deep",
        }
    }
}

impl fmt::Display for AnalysisDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisDepth {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "surface" => Ok(AnalysisDepth::Surface),
            "standard" => Ok(AnalysisDepth::Standard),
            "deep" => Ok(AnalysisDepth::Deep),
            other => anyhow::bail!("unknown analysis depth: {other}"),
        }
    }
}

/// Coverage/diversity snapshot over the full product set. Recomputed on each
/// invocation, never persisted long-term. Percentages are always in [0, 100].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    pub total_products: usize,
    pub covered_products: usize,
    pub competitive_coverage_percentage: f64,
    pub diversity_score: f64,
    pub recommended_depth: AnalysisDepth,
}

impl PortfolioMetrics {
    pub fn empty() -> Self {
        Self {
            total_products: 0,
            covered_products: 0,
            competitive_coverage_percentage: 0.0,
            diversity_score: 0.0,
            recommended_depth: AnalysisDepth::Standard,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpansionReason {
    ForceRefresh,
    LowCoverage,
    DeepDive,
    LargeCatalogGap,
    CoverageSufficient,
}

impl ExpansionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpansionReason::ForceRefresh => "force_refresh",
            ExpansionReason::LowCoverage => "low_coverage",
            ExpansionReason::DeepDive => "deep_dive",
            ExpansionReason::LargeCatalogGap => "large_catalog_gap",
            ExpansionReason::CoverageSufficient => "coverage_sufficient",
        }
    }
}

/// How much harvesting to do this run. Harvest cost scales with
/// `target_count * max_per_product`, so each planner branch trades coverage
/// urgency against that budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestStrategy {
    pub should_expand: bool,
    pub reason: ExpansionReason,
    pub target_count: usize,
    pub max_per_product: usize,
}

impl HarvestStrategy {
    pub fn no_expansion() -> Self {
        Self {
            should_expand: false,
            reason: ExpansionReason::CoverageSufficient,
            target_count: 0,
            max_per_product: 0,
        }
    }
}
