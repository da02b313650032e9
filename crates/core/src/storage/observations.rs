use crate::domain::observation::CompetitorObservation;
use anyhow::Context;

const DEFAULT_INSERT_BATCH: usize = 200;

/// Persists a run's new observations in one transaction, chunked to keep
/// round trips down on remote databases. Callers treat failure as
/// best-effort: the in-memory report is already complete.
pub async fn insert_batch(
    pool: &sqlx::PgPool,
    account: &str,
    observations: &[CompetitorObservation],
) -> anyhow::Result<u64> {
    if observations.is_empty() {
        return Ok(0);
    }

    let chunk_size: usize = std::env::var("OBSERVATIONS_INSERT_BATCH")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_INSERT_BATCH);
    anyhow::ensure!(chunk_size >= 1, "OBSERVATIONS_INSERT_BATCH must be >= 1");

    let mut tx = pool.begin().await.context("begin transaction failed")?;
    let mut affected: u64 = 0;

    for chunk in observations.chunks(chunk_size) {
        let mut qb = sqlx::QueryBuilder::new(
            "INSERT INTO competitor_observations \
             (id, account_id, sku, competitor, competitor_price, our_price, price_difference, \
              price_difference_percentage, availability, promotional, source, observed_at) ",
        );
        qb.push_values(chunk, |mut b, obs| {
            b.push_bind(uuid::Uuid::new_v4())
                .push_bind(account)
                .push_bind(&obs.sku)
                .push_bind(&obs.competitor)
                .push_bind(obs.competitor_price)
                .push_bind(obs.our_price)
                .push_bind(obs.price_difference)
                .push_bind(obs.price_difference_percentage)
                .push_bind(obs.availability)
                .push_bind(obs.promotional)
                .push_bind(&obs.source)
                .push_bind(obs.observed_at);
        });

        let res = qb
            .build()
            .persistent(false)
            .execute(&mut *tx)
            .await
            .context("batch insert competitor_observations failed")?;
        affected += res.rows_affected();
    }

    tx.commit().await.context("commit transaction failed")?;
    Ok(affected)
}
