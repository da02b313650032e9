use anyhow::Context;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

/// Records one harvest run for operational bookkeeping: status is
/// "success", "degraded" (harvesting unavailable) or "error".
pub async fn record_harvest_run(
    pool: &sqlx::PgPool,
    account: &str,
    status: &str,
    error: Option<&str>,
    summary: Option<Value>,
) -> anyhow::Result<Uuid> {
    let id = Uuid::new_v4();
    let generated_at: DateTime<Utc> = Utc::now();

    sqlx::query(
        "INSERT INTO harvest_runs (id, account_id, generated_at, status, error, summary) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .persistent(false)
    .bind(id)
    .bind(account)
    .bind(generated_at)
    .bind(status)
    .bind(error)
    .bind(summary)
    .execute(pool)
    .await
    .context("insert harvest_runs failed")?;

    Ok(id)
}
