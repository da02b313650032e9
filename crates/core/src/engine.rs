use crate::alerts::actions::derive_price_actions;
use crate::alerts::engine::{generate_alerts, AlertConfig};
use crate::alerts::health::{brand_concentration, score_portfolio};
use crate::analysis::portfolio::analyze_portfolio;
use crate::analysis::selector::select_products;
use crate::analysis::strategy::plan_harvest;
use crate::domain::alert::Alert;
use crate::domain::metrics::{AnalysisDepth, HarvestStrategy, PortfolioMetrics};
use crate::domain::observation::CompetitorObservation;
use crate::domain::pricing::{PriceAction, PricePositionSummary};
use crate::domain::product::Product;
use crate::harvest::cache::{BATCH_TTL, INTERACTIVE_TTL};
use crate::harvest::harvester::{BatchResult, HarvestOutcome, Harvester};
use chrono::{DateTime, Utc};
use std::str::FromStr;
use std::time::Duration;

/// Up-front enrichment strategy: narrative generation is chosen by
/// configuration, never discovered through a failing code path. RuleBased
/// runs never touch the insight generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightMode {
    RuleBased,
    AiEnhanced,
}

impl FromStr for InsightMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rule_based" | "rules" => Ok(InsightMode::RuleBased),
            "ai_enhanced" | "ai" => Ok(InsightMode::AiEnhanced),
            other => anyhow::bail!("unknown insight mode: {other}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub depth: AnalysisDepth,
    pub force_refresh: bool,
    pub alert: AlertConfig,
    pub cache_ttl: Duration,
    pub insight_mode: InsightMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            depth: AnalysisDepth::Standard,
            force_refresh: false,
            alert: AlertConfig::default(),
            cache_ttl: BATCH_TTL,
            insight_mode: InsightMode::RuleBased,
        }
    }
}

impl EngineConfig {
    /// Force-refresh runs drop to the short interactive TTL so re-harvested
    /// terms are not served yesterday's batch payloads.
    pub fn with_force_refresh(mut self, force_refresh: bool) -> Self {
        self.force_refresh = force_refresh;
        self.cache_ttl = if force_refresh {
            INTERACTIVE_TTL
        } else {
            BATCH_TTL
        };
        self
    }
}

/// Complete, internally consistent result of one intelligence cycle. The
/// caller always gets the full set, possibly with zero new observations.
#[derive(Debug)]
pub struct IntelligenceReport {
    pub generated_at: DateTime<Utc>,
    /// Metrics recomputed after the harvest, so coverage reflects this run.
    pub metrics: PortfolioMetrics,
    pub strategy: HarvestStrategy,
    pub harvest_outcome: HarvestOutcome,
    pub products_selected: usize,
    pub products_failed: usize,
    pub new_observations: Vec<CompetitorObservation>,
    pub actions: Vec<PriceAction>,
    pub positions: PricePositionSummary,
    pub alerts: Vec<Alert>,
    pub health_score: u8,
}

impl IntelligenceReport {
    fn empty(now: DateTime<Utc>) -> Self {
        Self {
            generated_at: now,
            metrics: PortfolioMetrics::empty(),
            strategy: HarvestStrategy::no_expansion(),
            harvest_outcome: HarvestOutcome::Skipped,
            products_selected: 0,
            products_failed: 0,
            new_observations: Vec::new(),
            actions: Vec::new(),
            positions: PricePositionSummary::default(),
            alerts: Vec::new(),
            health_score: 10,
        }
    }

    /// Compact run summary for the harvest_runs bookkeeping row.
    pub fn summary_json(&self) -> serde_json::Value {
        serde_json::json!({
            "generated_at": self.generated_at,
            "harvest_outcome": self.harvest_outcome,
            "coverage_percentage": self.metrics.competitive_coverage_percentage,
            "diversity_score": self.metrics.diversity_score,
            "products_selected": self.products_selected,
            "products_failed": self.products_failed,
            "new_observations": self.new_observations.len(),
            "alerts": self.alerts.len(),
            "health_score": self.health_score,
        })
    }
}

/// One full cycle: analyze -> plan -> select -> harvest -> alert -> score.
/// Inputs are assumed validated at the ingestion boundary; an empty product
/// set yields a zeroed report rather than an error, and per-product harvest
/// failures never surface here.
pub async fn run_cycle(
    products: &[Product],
    existing_observations: &[CompetitorObservation],
    harvester: &Harvester,
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> IntelligenceReport {
    if products.is_empty() {
        tracing::info!("empty product set; returning zeroed report");
        return IntelligenceReport::empty(now);
    }

    let pre_metrics = analyze_portfolio(products, existing_observations);
    let strategy = plan_harvest(&pre_metrics, config.force_refresh, config.depth);

    tracing::info!(
        total_products = pre_metrics.total_products,
        coverage = pre_metrics.competitive_coverage_percentage,
        should_expand = strategy.should_expand,
        reason = strategy.reason.as_str(),
        target_count = strategy.target_count,
        max_per_product = strategy.max_per_product,
        "harvest strategy planned"
    );

    let batch: BatchResult = if strategy.should_expand {
        let selected = select_products(
            products,
            existing_observations,
            strategy.target_count,
            config.depth,
        );
        harvester
            .harvest_batch(&selected, strategy.max_per_product, config.cache_ttl)
            .await
    } else {
        harvester.harvest_batch(&[], strategy.max_per_product, config.cache_ttl).await
    };

    let mut merged: Vec<CompetitorObservation> = existing_observations.to_vec();
    merged.extend(batch.observations.iter().cloned());

    let (actions, positions) = derive_price_actions(products, &merged);
    let alerts = generate_alerts(products, &actions, &merged, &config.alert, now);

    let metrics = analyze_portfolio(products, &merged);
    let health_score = score_portfolio(&metrics, &alerts, &positions, brand_concentration(products));

    tracing::info!(
        outcome = ?batch.outcome,
        new_observations = batch.observations.len(),
        alerts = alerts.len(),
        coverage = metrics.competitive_coverage_percentage,
        health_score,
        "intelligence cycle complete"
    );

    IntelligenceReport {
        generated_at: now,
        metrics,
        strategy,
        harvest_outcome: batch.outcome,
        products_selected: batch.products_attempted,
        products_failed: batch.products_failed,
        new_observations: batch.observations,
        actions,
        positions,
        alerts,
        health_score,
    }
}
