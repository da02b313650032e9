use crate::alerts::actions::aggregate_signals;
use crate::domain::alert::{Alert, AlertStatus, AlertType, Severity};
use crate::domain::observation::CompetitorObservation;
use crate::domain::pricing::{PriceAction, PriceActionKind};
use crate::domain::product::Product;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

const STOCKOUT_WEEKS: f64 = 2.0;
const OVERSTOCK_WEEKS: f64 = 12.0;
const SEVERE_OVERSTOCK_WEEKS: f64 = 24.0;
const OVERSTOCK_MIN_INVENTORY: f64 = 20.0;
/// Weekly demand horizon used for revenue-at-risk estimates (8 weeks).
const RISK_HORIZON_WEEKS: f64 = 8.0;

const THREAT_PCT: f64 = 15.0;
const SEVERE_PCT: f64 = 30.0;
const OPPORTUNITY_MIN_WEEKLY_SALES: f64 = 3.0;

/// Carrying-cost share applied to excess overstock units.
const OVERSTOCK_CARRY_FACTOR: f64 = 0.2;

#[derive(Debug, Clone)]
pub struct AlertConfig {
    pub max_alerts_per_sku: usize,
    pub min_severity: Severity,
    pub include_opportunities: bool,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            max_alerts_per_sku: 2,
            min_severity: Severity::Low,
            include_opportunities: true,
        }
    }
}

/// Combines inventory and competitive signals into prioritized, deduplicated
/// alerts. Deterministic rule evaluation only: insight enrichment is additive
/// narrative elsewhere and never a precondition for an alert existing.
pub fn generate_alerts(
    products: &[Product],
    actions: &[PriceAction],
    observations: &[CompetitorObservation],
    config: &AlertConfig,
    now: DateTime<Utc>,
) -> Vec<Alert> {
    let signals = aggregate_signals(observations);
    let actions_by_sku: HashMap<&str, &PriceAction> =
        actions.iter().map(|a| (a.sku.as_str(), a)).collect();

    let mut alerts: Vec<Alert> = Vec::new();

    for product in products {
        let mut candidates: Vec<Alert> = Vec::new();

        inventory_alerts(product, now, &mut candidates);

        if let Some(signal) = signals.get(product.sku.as_str()) {
            competitive_alerts(
                product,
                signal.mean_difference_percentage,
                actions_by_sku.get(product.sku.as_str()).copied(),
                config.include_opportunities,
                now,
                &mut candidates,
            );
        }

        candidates.retain(|a| a.severity >= config.min_severity);
        candidates.sort_by(|a, b| {
            b.urgency_score
                .cmp(&a.urgency_score)
                .then_with(|| b.severity.cmp(&a.severity))
        });
        candidates.truncate(config.max_alerts_per_sku);

        alerts.extend(candidates);
    }

    alerts.sort_by(|a, b| {
        b.urgency_score
            .cmp(&a.urgency_score)
            .then_with(|| b.severity.cmp(&a.severity))
            .then_with(|| a.sku.cmp(&b.sku))
    });
    alerts
}

fn inventory_alerts(product: &Product, now: DateTime<Utc>, out: &mut Vec<Alert>) {
    let weeks = product.weeks_of_stock();

    if weeks < STOCKOUT_WEEKS {
        out.push(Alert {
            sku: product.sku.clone(),
            alert_type: AlertType::StockoutRisk,
            severity: Severity::Critical,
            urgency_score: 10,
            message: format!(
                "{} has {:.1} weeks of stock left at current velocity ({:.0} units/week); reorder now",
                product.name, weeks, product.weekly_sales
            ),
            revenue_at_risk: product.weekly_sales * product.price * RISK_HORIZON_WEEKS,
            created_at: now,
            status: AlertStatus::Unread,
        });
    } else if weeks > OVERSTOCK_WEEKS && product.inventory_level > OVERSTOCK_MIN_INVENTORY {
        let excess_units =
            (product.inventory_level - product.weekly_sales * RISK_HORIZON_WEEKS).max(0.0);
        out.push(Alert {
            sku: product.sku.clone(),
            alert_type: AlertType::OverstockRisk,
            severity: Severity::High,
            urgency_score: if weeks > SEVERE_OVERSTOCK_WEEKS { 7 } else { 6 },
            message: format!(
                "{} is sitting on {:.0} weeks of stock ({:.0} units); consider markdown or transfer",
                product.name, weeks, product.inventory_level
            ),
            revenue_at_risk: excess_units * product.price * OVERSTOCK_CARRY_FACTOR,
            created_at: now,
            status: AlertStatus::Unread,
        });
    }
}

fn competitive_alerts(
    product: &Product,
    mean_pct: f64,
    action: Option<&PriceAction>,
    include_opportunities: bool,
    now: DateTime<Utc>,
    out: &mut Vec<Alert>,
) {
    let suggestion = action
        .filter(|a| a.action != PriceActionKind::Hold)
        .map(|a| format!("; suggested price {:.2}", a.suggested_price))
        .unwrap_or_default();

    if mean_pct > THREAT_PCT {
        let (severity, urgency) = if mean_pct > SEVERE_PCT {
            (Severity::Critical, 9)
        } else {
            (Severity::High, 8)
        };
        out.push(Alert {
            sku: product.sku.clone(),
            alert_type: AlertType::CompetitiveThreat,
            severity,
            urgency_score: urgency,
            message: format!(
                "{} is priced {:.0}% above competitors{suggestion}",
                product.name, mean_pct
            ),
            revenue_at_risk: product.weekly_sales
                * product.price
                * RISK_HORIZON_WEEKS
                * (mean_pct / 100.0),
            created_at: now,
            status: AlertStatus::Unread,
        });
    } else if mean_pct < -THREAT_PCT
        && product.weekly_sales > OPPORTUNITY_MIN_WEEKLY_SALES
        && include_opportunities
    {
        let (severity, urgency) = if mean_pct < -SEVERE_PCT {
            (Severity::High, 6)
        } else {
            (Severity::Medium, 5)
        };
        out.push(Alert {
            sku: product.sku.clone(),
            alert_type: AlertType::PricingOpportunity,
            severity,
            urgency_score: urgency,
            message: format!(
                "{} is priced {:.0}% below competitors with healthy demand{suggestion}",
                product.name,
                mean_pct.abs()
            ),
            revenue_at_risk: product.weekly_sales
                * product.price
                * RISK_HORIZON_WEEKS
                * (mean_pct.abs() / 100.0),
            created_at: now,
            status: AlertStatus::Unread,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(sku: &str, price: f64, weekly_sales: f64, inventory: f64) -> Product {
        Product {
            sku: sku.to_string(),
            name: sku.to_string(),
            price,
            weekly_sales,
            inventory_level: inventory,
            category: "Hardware".to_string(),
            brand: "Acme".to_string(),
            subcategory: "Fasteners".to_string(),
        }
    }

    fn obs(sku: &str, pct: f64) -> CompetitorObservation {
        CompetitorObservation {
            sku: sku.to_string(),
            competitor: "RivalMart".to_string(),
            competitor_price: 100.0,
            our_price: 100.0 + pct,
            price_difference: pct,
            price_difference_percentage: pct,
            availability: true,
            promotional: false,
            source: "test".to_string(),
            observed_at: Utc::now(),
        }
    }

    fn run(products: &[Product], observations: &[CompetitorObservation]) -> Vec<Alert> {
        run_with(products, observations, &AlertConfig::default())
    }

    fn run_with(
        products: &[Product],
        observations: &[CompetitorObservation],
        config: &AlertConfig,
    ) -> Vec<Alert> {
        let (actions, _) = crate::alerts::actions::derive_price_actions(products, observations);
        generate_alerts(products, &actions, observations, config, Utc::now())
    }

    #[test]
    fn stockout_at_one_and_a_half_weeks_is_critical() {
        // 15 units at 10/week = 1.5 weeks of stock.
        let products = vec![product("A", 20.0, 10.0, 15.0)];
        let alerts = run(&products, &[]);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::StockoutRisk);
        assert_eq!(alerts[0].severity, Severity::Critical);
        assert_eq!(alerts[0].urgency_score, 10);
        // 10 * 20 * 8.
        assert!((alerts[0].revenue_at_risk - 1600.0).abs() < 1e-9);
    }

    #[test]
    fn overstock_at_thirteen_weeks_with_enough_units_is_high() {
        // 26 units at 2/week = 13 weeks; inventory 26 > 20.
        let products = vec![product("A", 10.0, 2.0, 26.0)];
        let alerts = run(&products, &[]);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::OverstockRisk);
        assert_eq!(alerts[0].severity, Severity::High);
        assert_eq!(alerts[0].urgency_score, 6);
        // (26 - 2*8) * 10 * 0.2 = 20.
        assert!((alerts[0].revenue_at_risk - 20.0).abs() < 1e-9);
    }

    #[test]
    fn deep_overstock_escalates_urgency() {
        // 100 units at 2/week = 50 weeks.
        let products = vec![product("A", 10.0, 2.0, 100.0)];
        let alerts = run(&products, &[]);
        assert_eq!(alerts[0].urgency_score, 7);
    }

    #[test]
    fn overstock_requires_minimum_inventory() {
        // 18 units at 1/week = 18 weeks, but inventory <= 20.
        let products = vec![product("A", 10.0, 1.0, 18.0)];
        assert!(run(&products, &[]).is_empty());
    }

    #[test]
    fn competitive_threat_at_sixteen_percent() {
        let products = vec![product("A", 116.0, 5.0, 20.0)];
        let alerts = run(&products, &[obs("A", 16.0)]);
        let threat = alerts
            .iter()
            .find(|a| a.alert_type == AlertType::CompetitiveThreat)
            .expect("expected a competitive threat");
        assert_eq!(threat.severity, Severity::High);
        assert_eq!(threat.urgency_score, 8);
    }

    #[test]
    fn severe_threat_is_critical() {
        let products = vec![product("A", 140.0, 5.0, 20.0)];
        let alerts = run(&products, &[obs("A", 35.0)]);
        let threat = alerts
            .iter()
            .find(|a| a.alert_type == AlertType::CompetitiveThreat)
            .unwrap();
        assert_eq!(threat.severity, Severity::Critical);
        assert_eq!(threat.urgency_score, 9);
    }

    #[test]
    fn pricing_opportunity_needs_demand() {
        // -16% with weekly_sales > 3 -> opportunity.
        let products = vec![product("A", 84.0, 5.0, 20.0)];
        let alerts = run(&products, &[obs("A", -16.0)]);
        assert!(alerts
            .iter()
            .any(|a| a.alert_type == AlertType::PricingOpportunity
                && a.severity == Severity::Medium));

        // Same signal but weekly_sales below the floor -> nothing competitive.
        let products = vec![product("A", 84.0, 2.0, 20.0)];
        let alerts = run(&products, &[obs("A", -16.0)]);
        assert!(alerts
            .iter()
            .all(|a| a.alert_type != AlertType::PricingOpportunity));
    }

    #[test]
    fn small_difference_raises_no_competitive_alert() {
        let products = vec![product("A", 110.0, 5.0, 20.0)];
        let alerts = run(&products, &[obs("A", 10.0)]);
        assert!(alerts.iter().all(|a| {
            a.alert_type != AlertType::CompetitiveThreat
                && a.alert_type != AlertType::PricingOpportunity
        }));
    }

    #[test]
    fn opportunities_can_be_suppressed() {
        let products = vec![product("A", 60.0, 5.0, 20.0)];
        let observations = vec![obs("A", -40.0)];
        let config = AlertConfig {
            include_opportunities: false,
            ..AlertConfig::default()
        };
        let alerts = run_with(&products, &observations, &config);
        assert!(alerts
            .iter()
            .all(|a| a.alert_type != AlertType::PricingOpportunity));
    }

    #[test]
    fn per_sku_cap_keeps_the_most_urgent_alerts() {
        // Stockout (urgency 10) + severe threat (urgency 9) + would-be
        // opportunity cannot exist together, so build stockout + threat and
        // cap at 1.
        let products = vec![product("A", 140.0, 10.0, 5.0)];
        let observations = vec![obs("A", 35.0)];
        let config = AlertConfig {
            max_alerts_per_sku: 1,
            ..AlertConfig::default()
        };
        let alerts = run_with(&products, &observations, &config);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::StockoutRisk);
    }

    #[test]
    fn severity_floor_drops_weaker_alerts() {
        let products = vec![product("A", 84.0, 5.0, 20.0)];
        let observations = vec![obs("A", -16.0)]; // Medium opportunity.
        let config = AlertConfig {
            min_severity: Severity::High,
            ..AlertConfig::default()
        };
        assert!(run_with(&products, &observations, &config).is_empty());
    }

    #[test]
    fn output_is_ordered_by_urgency() {
        let products = vec![
            product("OVER", 10.0, 2.0, 100.0), // urgency 7
            product("OUT", 20.0, 10.0, 5.0),   // urgency 10
        ];
        let alerts = run(&products, &[]);
        assert_eq!(alerts[0].sku, "OUT");
        assert_eq!(alerts[1].sku, "OVER");
    }

    #[test]
    fn zero_sales_product_with_stock_is_overstock_not_stockout() {
        let products = vec![product("A", 10.0, 0.0, 30.0)];
        let alerts = run(&products, &[]);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::OverstockRisk);
        // weeks_of_stock caps zero-sales products at the 999-week sentinel.
        assert!(alerts[0].message.contains("999 weeks"));
    }
}
