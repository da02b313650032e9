use anyhow::Context;
use chrono::{Datelike, NaiveDate};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

// Advisory locks are scoped to the Postgres session. This is a best-effort
// guard against concurrent harvest runs for the same account and day, which
// would otherwise double-spend the lookup budget on identical queries.
const LOCK_NAMESPACE: i64 = 0x5348_454C_4657; // "SHELFW" as hex-ish namespace.

fn lock_key(account: &str, run_date: NaiveDate) -> i64 {
    let mut hasher = DefaultHasher::new();
    account.hash(&mut hasher);
    LOCK_NAMESPACE ^ (hasher.finish() as i64) ^ (run_date.num_days_from_ce() as i64)
}

pub async fn try_acquire_account_lock(
    pool: &sqlx::PgPool,
    account: &str,
    run_date: NaiveDate,
) -> anyhow::Result<bool> {
    let key = lock_key(account, run_date);
    let acquired: (bool,) = sqlx::query_as("SELECT pg_try_advisory_lock($1)")
        .persistent(false)
        .bind(key)
        .fetch_one(pool)
        .await
        .with_context(|| format!("failed to acquire advisory lock (key={key})"))?;
    Ok(acquired.0)
}

pub async fn release_account_lock(
    pool: &sqlx::PgPool,
    account: &str,
    run_date: NaiveDate,
) -> anyhow::Result<()> {
    let key = lock_key(account, run_date);
    sqlx::query("SELECT pg_advisory_unlock($1)")
        .persistent(false)
        .bind(key)
        .execute(pool)
        .await
        .with_context(|| format!("failed to release advisory lock (key={key})"))?;
    Ok(())
}
