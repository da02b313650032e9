use crate::domain::metrics::{AnalysisDepth, PortfolioMetrics};
use crate::domain::observation::CompetitorObservation;
use crate::domain::product::Product;
use std::collections::HashSet;

const DIVERSITY_CATEGORY_WEIGHT: f64 = 10.0;
const DIVERSITY_BRAND_WEIGHT: f64 = 5.0;
const DIVERSITY_TIER_WEIGHT: f64 = 10.0;

/// Computes coverage/diversity metrics over the full product set. Pure
/// function; an empty product set yields zeroed metrics rather than an error.
pub fn analyze_portfolio(
    products: &[Product],
    observations: &[CompetitorObservation],
) -> PortfolioMetrics {
    if products.is_empty() {
        return PortfolioMetrics::empty();
    }

    let skus: HashSet<&str> = products.iter().map(|p| p.sku.as_str()).collect();
    let covered: HashSet<&str> = observations
        .iter()
        .map(|o| o.sku.as_str())
        .filter(|sku| skus.contains(sku))
        .collect();

    let coverage = (covered.len() as f64 / products.len() as f64 * 100.0).clamp(0.0, 100.0);

    let categories: HashSet<&str> = products.iter().map(|p| p.category.as_str()).collect();
    let brands: HashSet<&str> = products.iter().map(|p| p.brand.as_str()).collect();
    let tiers: HashSet<_> = products.iter().map(|p| p.price_tier()).collect();

    let diversity = (categories.len() as f64 * DIVERSITY_CATEGORY_WEIGHT
        + brands.len() as f64 * DIVERSITY_BRAND_WEIGHT
        + tiers.len() as f64 * DIVERSITY_TIER_WEIGHT)
        .min(100.0);

    let recommended_depth = if products.len() < 50 && coverage > 30.0 {
        AnalysisDepth::Deep
    } else if products.len() > 200 || coverage < 10.0 {
        AnalysisDepth::Surface
    } else {
        AnalysisDepth::Standard
    };

    PortfolioMetrics {
        total_products: products.len(),
        covered_products: covered.len(),
        competitive_coverage_percentage: coverage,
        diversity_score: diversity,
        recommended_depth,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(sku: &str, price: f64, category: &str, brand: &str) -> Product {
        Product {
            sku: sku.to_string(),
            name: sku.to_string(),
            price,
            weekly_sales: 5.0,
            inventory_level: 10.0,
            category: category.to_string(),
            brand: brand.to_string(),
            subcategory: "General".to_string(),
        }
    }

    fn observation(sku: &str) -> CompetitorObservation {
        CompetitorObservation {
            sku: sku.to_string(),
            competitor: "RivalMart".to_string(),
            competitor_price: 10.0,
            our_price: 11.0,
            price_difference: 1.0,
            price_difference_percentage: 10.0,
            availability: true,
            promotional: false,
            source: "test".to_string(),
            observed_at: Utc::now(),
        }
    }

    #[test]
    fn empty_input_returns_zeroed_metrics() {
        let m = analyze_portfolio(&[], &[]);
        assert_eq!(m.total_products, 0);
        assert_eq!(m.competitive_coverage_percentage, 0.0);
        assert_eq!(m.diversity_score, 0.0);
    }

    #[test]
    fn coverage_is_zero_without_observations_and_counts_distinct_skus() {
        let products = vec![
            product("A", 10.0, "Tools", "Acme"),
            product("B", 30.0, "Tools", "Acme"),
        ];
        let m = analyze_portfolio(&products, &[]);
        assert_eq!(m.competitive_coverage_percentage, 0.0);

        // Two observations for the same SKU still cover one product.
        let obs = vec![observation("A"), observation("A")];
        let m = analyze_portfolio(&products, &obs);
        assert_eq!(m.covered_products, 1);
        assert!((m.competitive_coverage_percentage - 50.0).abs() < 1e-9);
    }

    #[test]
    fn coverage_and_diversity_stay_within_bounds() {
        let products = vec![product("A", 10.0, "Tools", "Acme")];
        // Observations for SKUs outside the catalog do not inflate coverage.
        let obs = vec![observation("A"), observation("GHOST"), observation("A")];
        let m = analyze_portfolio(&products, &obs);
        assert!((0.0..=100.0).contains(&m.competitive_coverage_percentage));
        assert!((0.0..=100.0).contains(&m.diversity_score));
        assert_eq!(m.competitive_coverage_percentage, 100.0);
    }

    #[test]
    fn diversity_sums_category_brand_and_tier_weights() {
        // 2 categories, 2 brands, 2 tiers -> 20 + 10 + 20 = 50.
        let products = vec![
            product("A", 10.0, "Tools", "Acme"),
            product("B", 60.0, "Paint", "Bolt"),
        ];
        let m = analyze_portfolio(&products, &[]);
        assert!((m.diversity_score - 50.0).abs() < 1e-9);
    }

    #[test]
    fn diversity_caps_at_one_hundred() {
        let products: Vec<Product> = (0..30)
            .map(|i| {
                product(
                    &format!("SKU-{i}"),
                    5.0 + i as f64 * 3.0,
                    &format!("Cat{i}"),
                    &format!("Brand{i}"),
                )
            })
            .collect();
        let m = analyze_portfolio(&products, &[]);
        assert_eq!(m.diversity_score, 100.0);
    }

    #[test]
    fn depth_recommendation_branches() {
        // Small catalog with good coverage -> deep.
        let products: Vec<Product> = (0..10)
            .map(|i| product(&format!("S{i}"), 10.0, "Tools", "Acme"))
            .collect();
        let obs: Vec<_> = (0..4).map(|i| observation(&format!("S{i}"))).collect();
        assert_eq!(
            analyze_portfolio(&products, &obs).recommended_depth,
            AnalysisDepth::Deep
        );

        // Large catalog -> surface regardless of coverage.
        let products: Vec<Product> = (0..201)
            .map(|i| product(&format!("S{i}"), 10.0, "Tools", "Acme"))
            .collect();
        assert_eq!(
            analyze_portfolio(&products, &[]).recommended_depth,
            AnalysisDepth::Surface
        );

        // Mid-sized catalog with middling coverage -> standard.
        let products: Vec<Product> = (0..100)
            .map(|i| product(&format!("S{i}"), 10.0, "Tools", "Acme"))
            .collect();
        let obs: Vec<_> = (0..15).map(|i| observation(&format!("S{i}"))).collect();
        assert_eq!(
            analyze_portfolio(&products, &obs).recommended_depth,
            AnalysisDepth::Standard
        );
    }
}
