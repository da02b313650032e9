use crate::domain::observation::CompetitorObservation;
use crate::domain::pricing::{PriceAction, PriceActionKind, PricePositionSummary};
use crate::domain::product::Product;
use std::collections::HashMap;

/// Mean price-difference percentage beyond which a product counts as
/// overpriced (positive) or underpriced (negative).
const POSITION_THRESHOLD_PCT: f64 = 10.0;

/// Aggregated competitive signal for one product.
#[derive(Debug, Clone, Copy)]
pub struct ProductSignal {
    pub mean_difference_percentage: f64,
    pub mean_competitor_price: f64,
    pub observation_count: usize,
}

/// Mean competitive signal per SKU, shared by action derivation and the
/// alert engine so both read the same aggregate.
pub fn aggregate_signals(
    observations: &[CompetitorObservation],
) -> HashMap<String, ProductSignal> {
    let mut sums: HashMap<&str, (f64, f64, usize)> = HashMap::new();
    for obs in observations {
        let entry = sums.entry(obs.sku.as_str()).or_insert((0.0, 0.0, 0));
        entry.0 += obs.price_difference_percentage;
        entry.1 += obs.competitor_price;
        entry.2 += 1;
    }

    sums.into_iter()
        .map(|(sku, (pct_sum, price_sum, count))| {
            (
                sku.to_string(),
                ProductSignal {
                    mean_difference_percentage: pct_sum / count as f64,
                    mean_competitor_price: price_sum / count as f64,
                    observation_count: count,
                },
            )
        })
        .collect()
}

/// Derives standardized price-action suggestions per product plus the
/// portfolio pricing-position tallies the health scorer consumes. Products
/// without observations get no action and do not count as "priced".
pub fn derive_price_actions(
    products: &[Product],
    observations: &[CompetitorObservation],
) -> (Vec<PriceAction>, PricePositionSummary) {
    let signals = aggregate_signals(observations);

    let mut actions = Vec::new();
    let mut positions = PricePositionSummary::default();

    for product in products {
        let Some(signal) = signals.get(product.sku.as_str()) else {
            continue;
        };
        let pct = signal.mean_difference_percentage;

        let (action, suggested_price) = if pct > POSITION_THRESHOLD_PCT {
            positions.overpriced += 1;
            // Come back within reach of the market without fully matching it.
            (PriceActionKind::Lower, signal.mean_competitor_price * 1.02)
        } else if pct < -POSITION_THRESHOLD_PCT {
            positions.underpriced += 1;
            (PriceActionKind::Raise, signal.mean_competitor_price * 0.98)
        } else {
            positions.competitive += 1;
            (PriceActionKind::Hold, product.price)
        };

        actions.push(PriceAction {
            sku: product.sku.clone(),
            action,
            suggested_price,
            mean_difference_percentage: pct,
        });
    }

    (actions, positions)
}
