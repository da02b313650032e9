use crate::domain::alert::Alert;
use anyhow::Context;

const DEFAULT_INSERT_BATCH: usize = 200;

/// Persists a run's alerts. Same best-effort contract as observation
/// persistence: a failed write is logged by the caller, never retried
/// inline, and never invalidates the in-memory result.
pub async fn insert_batch(
    pool: &sqlx::PgPool,
    account: &str,
    alerts: &[Alert],
) -> anyhow::Result<u64> {
    if alerts.is_empty() {
        return Ok(0);
    }

    let chunk_size: usize = std::env::var("ALERTS_INSERT_BATCH")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_INSERT_BATCH);
    anyhow::ensure!(chunk_size >= 1, "ALERTS_INSERT_BATCH must be >= 1");

    let mut tx = pool.begin().await.context("begin transaction failed")?;
    let mut affected: u64 = 0;

    for chunk in alerts.chunks(chunk_size) {
        let mut qb = sqlx::QueryBuilder::new(
            "INSERT INTO alerts \
             (id, account_id, sku, alert_type, severity, urgency_score, message, \
              revenue_at_risk, created_at, status) ",
        );
        qb.push_values(chunk, |mut b, alert| {
            b.push_bind(uuid::Uuid::new_v4())
                .push_bind(account)
                .push_bind(&alert.sku)
                .push_bind(alert.alert_type.as_str())
                .push_bind(alert.severity.as_str())
                .push_bind(alert.urgency_score as i16)
                .push_bind(&alert.message)
                .push_bind(alert.revenue_at_risk)
                .push_bind(alert.created_at)
                .push_bind(alert.status.as_str());
        });

        let res = qb
            .build()
            .persistent(false)
            .execute(&mut *tx)
            .await
            .context("batch insert alerts failed")?;
        affected += res.rows_affected();
    }

    tx.commit().await.context("commit transaction failed")?;
    Ok(affected)
}
