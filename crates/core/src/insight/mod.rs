pub mod anthropic;
pub mod error;

use crate::domain::alert::Alert;
use crate::domain::metrics::PortfolioMetrics;
use crate::engine::IntelligenceReport;
use crate::harvest::harvester::HarvestOutcome;
use serde::Serialize;

const MAX_BRIEFING_ALERTS: usize = 10;

#[derive(Debug, Clone, Copy)]
pub enum Provider {
    Anthropic,
}

/// Everything the narrative generator sees. Built from a finished report:
/// enrichment is additive and can never change the deterministic alert set.
#[derive(Debug, Clone, Serialize)]
pub struct BriefingInput {
    pub account: String,
    pub metrics: PortfolioMetrics,
    pub health_score: u8,
    pub harvest_outcome: HarvestOutcome,
    pub top_alerts: Vec<Alert>,
}

impl BriefingInput {
    pub fn from_report(account: &str, report: &IntelligenceReport) -> Self {
        Self {
            account: account.to_string(),
            metrics: report.metrics.clone(),
            health_score: report.health_score,
            harvest_outcome: report.harvest_outcome,
            top_alerts: report
                .alerts
                .iter()
                .take(MAX_BRIEFING_ALERTS)
                .cloned()
                .collect(),
        }
    }
}

#[async_trait::async_trait]
pub trait InsightGenerator: Send + Sync {
    fn provider(&self) -> Provider;

    /// Free-text strategic briefing over the run's metrics and alerts.
    async fn generate_briefing(&self, input: BriefingInput) -> anyhow::Result<String>;
}
