use crate::domain::metrics::AnalysisDepth;
use crate::domain::observation::CompetitorObservation;
use crate::domain::product::Product;
use std::collections::{BTreeMap, HashSet};

const UNKNOWN_BRAND: &str = "Unknown";

/// Picks up to `target_count` uncovered products to harvest, maximizing
/// category/brand diversity before raw revenue coverage.
///
/// Three greedy passes over uncovered products, each skipping anything a
/// previous pass already took:
/// 1. one top-revenue item per category,
/// 2. one top-revenue item per brand (excluding "Unknown"), larger brand
///    groups first,
/// 3. revenue-descending fill, with a turnover blend when depth is Deep.
///
/// A product with an existing observation is never selected; no uncovered
/// products yields an empty list, not an error.
pub fn select_products<'a>(
    products: &'a [Product],
    observations: &[CompetitorObservation],
    target_count: usize,
    depth: AnalysisDepth,
) -> Vec<&'a Product> {
    if target_count == 0 {
        return Vec::new();
    }

    let covered: HashSet<&str> = observations.iter().map(|o| o.sku.as_str()).collect();
    let uncovered: Vec<&Product> = products
        .iter()
        .filter(|p| !covered.contains(p.sku.as_str()))
        .collect();
    if uncovered.is_empty() {
        return Vec::new();
    }

    let mut selected: Vec<&Product> = Vec::with_capacity(target_count.min(uncovered.len()));
    let mut used: HashSet<&str> = HashSet::new();

    category_pass(&uncovered, target_count, &mut selected, &mut used);
    brand_pass(&uncovered, target_count, &mut selected, &mut used);
    revenue_fill(&uncovered, target_count, depth, &mut selected, &mut used);

    selected
}

/// Pass 1: the single highest-revenue item per category, highest-revenue
/// categories first so truncation at target_count drops the weakest ones.
fn category_pass<'a>(
    uncovered: &[&'a Product],
    target_count: usize,
    selected: &mut Vec<&'a Product>,
    used: &mut HashSet<&'a str>,
) {
    // BTreeMap keeps category iteration deterministic before re-sorting.
    let mut best_per_category: BTreeMap<&str, &Product> = BTreeMap::new();
    for p in uncovered {
        best_per_category
            .entry(p.category.as_str())
            .and_modify(|best| {
                if revenue_before(p, best) {
                    *best = p;
                }
            })
            .or_insert(p);
    }

    let mut picks: Vec<&Product> = best_per_category.into_values().collect();
    picks.sort_by(|a, b| compare_by_key(b.revenue(), a.revenue(), &a.sku, &b.sku));

    for p in picks {
        if selected.len() >= target_count {
            return;
        }
        if used.insert(p.sku.as_str()) {
            selected.push(p);
        }
    }
}

/// Pass 2: per-brand top-revenue item, brands in descending group-size order.
/// "Unknown" carries no brand signal and is skipped.
fn brand_pass<'a>(
    uncovered: &[&'a Product],
    target_count: usize,
    selected: &mut Vec<&'a Product>,
    used: &mut HashSet<&'a str>,
) {
    let mut groups: BTreeMap<&str, Vec<&Product>> = BTreeMap::new();
    for p in uncovered {
        if p.brand == UNKNOWN_BRAND || used.contains(p.sku.as_str()) {
            continue;
        }
        groups.entry(p.brand.as_str()).or_default().push(p);
    }

    let mut ordered: Vec<(&str, Vec<&Product>)> = groups.into_iter().collect();
    ordered.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(b.0)));

    for (_brand, group) in ordered {
        if selected.len() >= target_count {
            return;
        }
        let top = group
            .into_iter()
            .max_by(|a, b| compare_by_key(a.revenue(), b.revenue(), &b.sku, &a.sku));
        if let Some(p) = top {
            if used.insert(p.sku.as_str()) {
                selected.push(p);
            }
        }
    }
}

/// Pass 3: fill remaining slots by descending sort key. Deep analysis blends
/// turnover in so fast-moving thin stock outranks slow heavy stock at equal
/// revenue.
fn revenue_fill<'a>(
    uncovered: &[&'a Product],
    target_count: usize,
    depth: AnalysisDepth,
    selected: &mut Vec<&'a Product>,
    used: &mut HashSet<&'a str>,
) {
    let key = |p: &Product| -> f64 {
        match depth {
            AnalysisDepth::Deep => p.revenue() * (1.0 + p.turnover()),
            _ => p.revenue(),
        }
    };

    let mut remaining: Vec<&Product> = uncovered
        .iter()
        .filter(|p| !used.contains(p.sku.as_str()))
        .copied()
        .collect();
    remaining.sort_by(|a, b| compare_by_key(key(b), key(a), &a.sku, &b.sku));

    for p in remaining {
        if selected.len() >= target_count {
            return;
        }
        if used.insert(p.sku.as_str()) {
            selected.push(p);
        }
    }
}

fn revenue_before(a: &Product, b: &Product) -> bool {
    a.revenue() > b.revenue() || (a.revenue() == b.revenue() && a.sku < b.sku)
}

fn compare_by_key(
    primary_a: f64,
    primary_b: f64,
    tie_a: &str,
    tie_b: &str,
) -> std::cmp::Ordering {
    primary_a
        .partial_cmp(&primary_b)
        .unwrap_or(std::cmp::Ordering::Equal)
        .then_with(|| tie_a.cmp(tie_b))
}
