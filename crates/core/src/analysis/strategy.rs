use crate::domain::metrics::{
    AnalysisDepth, ExpansionReason, HarvestStrategy, PortfolioMetrics,
};

/// Decides whether and how much to expand harvesting this run. First matching
/// rule wins; the fallthrough is "coverage sufficient, do nothing".
pub fn plan_harvest(
    metrics: &PortfolioMetrics,
    force_refresh: bool,
    requested_depth: AnalysisDepth,
) -> HarvestStrategy {
    let total = metrics.total_products;
    let coverage = metrics.competitive_coverage_percentage;

    if force_refresh {
        return HarvestStrategy {
            should_expand: true,
            reason: ExpansionReason::ForceRefresh,
            target_count: total.min(25),
            max_per_product: 4,
        };
    }

    if coverage < 15.0 {
        return HarvestStrategy {
            should_expand: true,
            reason: ExpansionReason::LowCoverage,
            target_count: ceil_fraction(total, 0.2).min(20),
            max_per_product: 3,
        };
    }

    if coverage < 30.0 && requested_depth == AnalysisDepth::Deep {
        return HarvestStrategy {
            should_expand: true,
            reason: ExpansionReason::DeepDive,
            target_count: ceil_fraction(total, 0.15).min(15),
            max_per_product: 4,
        };
    }

    if total > 100 && coverage < 25.0 {
        return HarvestStrategy {
            should_expand: true,
            reason: ExpansionReason::LargeCatalogGap,
            target_count: 30,
            max_per_product: 2,
        };
    }

    HarvestStrategy::no_expansion()
}

fn ceil_fraction(total: usize, fraction: f64) -> usize {
    (total as f64 * fraction).ceil() as usize
}
