use crate::domain::observation::CompetitorObservation;
use crate::domain::product::Product;
use crate::harvest::cache::{CacheKey, Clock, PriceCache};
use crate::harvest::pacing::RateLimiter;
use crate::harvest::transport::PriceLookupTransport;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Additional attempts after the primary query, each with a progressively
/// simplified term.
pub const DEFAULT_RETRY_BUDGET: usize = 2;

/// Cumulative observation cap per batch; bounds cost regardless of how many
/// products were selected.
pub const DEFAULT_OBSERVATION_CAP: usize = 25;

#[derive(Debug)]
pub enum ProductHarvest {
    Succeeded {
        observations: Vec<CompetitorObservation>,
        attempts: usize,
    },
    Failed {
        attempts: usize,
    },
}

/// Terminal state of a harvest batch. `EarlyStopped` is a valid terminal
/// state, not a failure; `Unavailable` distinguishes "every selected product
/// failed" from an ordinary zero-coverage run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HarvestOutcome {
    Completed,
    EarlyStopped,
    Unavailable,
    Skipped,
}

#[derive(Debug)]
pub struct BatchResult {
    pub observations: Vec<CompetitorObservation>,
    pub outcome: HarvestOutcome,
    pub products_attempted: usize,
    pub products_succeeded: usize,
    pub products_failed: usize,
}

impl BatchResult {
    fn skipped() -> Self {
        Self {
            observations: Vec::new(),
            outcome: HarvestOutcome::Skipped,
            products_attempted: 0,
            products_succeeded: 0,
            products_failed: 0,
        }
    }
}

/// Fetches competitor prices for selected products through the cache, with a
/// simplified-query retry ladder per product and adaptive pacing between
/// products. Per-product failures never abort the batch.
pub struct Harvester {
    transport: Arc<dyn PriceLookupTransport>,
    cache: Arc<PriceCache>,
    limiter: Arc<dyn RateLimiter>,
    clock: Arc<dyn Clock>,
    retry_budget: usize,
    observation_cap: usize,
}

impl Harvester {
    pub fn new(
        transport: Arc<dyn PriceLookupTransport>,
        cache: Arc<PriceCache>,
        limiter: Arc<dyn RateLimiter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let retry_budget = std::env::var("HARVEST_RETRY_BUDGET")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(DEFAULT_RETRY_BUDGET);

        let observation_cap = std::env::var("HARVEST_OBSERVATION_CAP")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(DEFAULT_OBSERVATION_CAP);

        Self {
            transport,
            cache,
            limiter,
            clock,
            retry_budget,
            observation_cap,
        }
    }

    pub fn with_retry_budget(mut self, retry_budget: usize) -> Self {
        self.retry_budget = retry_budget;
        self
    }

    pub fn with_observation_cap(mut self, observation_cap: usize) -> Self {
        self.observation_cap = observation_cap;
        self
    }

    /// Query ladder for one product: primary term (brand + subcategory), then
    /// brand alone, then category alone. Empty and duplicate terms collapse.
    fn query_ladder(product: &Product) -> Vec<String> {
        let candidates = [
            format!("{} {}", product.brand.trim(), product.subcategory.trim()),
            product.brand.trim().to_string(),
            product.category.trim().to_string(),
        ];

        let mut ladder: Vec<String> = Vec::with_capacity(candidates.len());
        for term in candidates {
            let term = term.trim().to_string();
            if !term.is_empty() && !ladder.contains(&term) {
                ladder.push(term);
            }
        }
        ladder
    }

    /// Harvests one product, walking the query ladder until a lookup yields
    /// usable records. Transport errors are contained per attempt; exhausting
    /// the ladder with zero results marks the product failed, never throws.
    pub async fn harvest_product(
        &self,
        product: &Product,
        max_lookups: usize,
        ttl: Duration,
    ) -> ProductHarvest {
        let max_attempts = (1 + self.retry_budget).min(max_lookups);
        if max_attempts == 0 {
            return ProductHarvest::Failed { attempts: 0 };
        }

        let mut attempts = 0;
        for term in Self::query_ladder(product).into_iter().take(max_attempts) {
            attempts += 1;
            let key = CacheKey::new(&term, &product.category);

            let lookup = self.cache.get_or_fetch(key, ttl, || {
                let transport = Arc::clone(&self.transport);
                let term = term.clone();
                let category = product.category.clone();
                async move { transport.lookup(&term, &category).await }
            });

            let records = match lookup.await {
                Ok(records) => records,
                Err(err) => {
                    tracing::warn!(
                        sku = %product.sku,
                        attempt = attempts,
                        query = %term,
                        error = %err,
                        "price lookup failed; trying simplified query"
                    );
                    continue;
                }
            };

            if records.is_empty() {
                continue;
            }

            let observed_at = self.clock.now();
            let source = self.transport.source_name();
            let observations: Vec<CompetitorObservation> = records
                .into_iter()
                .filter_map(|raw| CompetitorObservation::from_raw(product, raw, source, observed_at))
                .collect();

            if !observations.is_empty() {
                return ProductHarvest::Succeeded {
                    observations,
                    attempts,
                };
            }
        }

        ProductHarvest::Failed { attempts }
    }

    /// Sequential batch loop with adaptive inter-product pacing. Stops early
    /// once the cumulative observation cap is reached.
    pub async fn harvest_batch(
        &self,
        selected: &[&Product],
        max_per_product: usize,
        ttl: Duration,
    ) -> BatchResult {
        if selected.is_empty() {
            return BatchResult::skipped();
        }

        let mut observations: Vec<CompetitorObservation> = Vec::new();
        let mut attempted = 0usize;
        let mut succeeded = 0usize;
        let mut early_stopped = false;

        for (idx, product) in selected.iter().enumerate() {
            if idx != 0 {
                let delay = self.limiter.next_delay(attempted, succeeded);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }

            attempted += 1;
            match self.harvest_product(product, max_per_product, ttl).await {
                ProductHarvest::Succeeded {
                    observations: mut obs,
                    attempts,
                } => {
                    succeeded += 1;
                    tracing::debug!(
                        sku = %product.sku,
                        attempts,
                        records = obs.len(),
                        "product harvest succeeded"
                    );
                    observations.append(&mut obs);
                }
                ProductHarvest::Failed { attempts } => {
                    tracing::debug!(
                        sku = %product.sku,
                        attempts,
                        "product harvest exhausted retries with no results"
                    );
                }
            }

            if observations.len() >= self.observation_cap {
                early_stopped = true;
                tracing::info!(
                    products_attempted = attempted,
                    products_selected = selected.len(),
                    observations = observations.len(),
                    cap = self.observation_cap,
                    "observation cap reached; stopping batch early"
                );
                break;
            }
        }

        let outcome = if early_stopped {
            HarvestOutcome::EarlyStopped
        } else if succeeded == 0 {
            HarvestOutcome::Unavailable
        } else {
            HarvestOutcome::Completed
        };

        BatchResult {
            observations,
            outcome,
            products_attempted: attempted,
            products_succeeded: succeeded,
            products_failed: attempted - succeeded,
        }
    }
}
