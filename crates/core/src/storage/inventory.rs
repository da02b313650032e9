use crate::domain::observation::CompetitorObservation;
use crate::domain::product::Product;
use anyhow::Context;
use chrono::{DateTime, Duration, Utc};

/// Loads the full product set for an account. Rows failing validation are
/// skipped with a warning so one malformed CSV import cannot take the whole
/// run down; validation happens here, once, at the ingestion boundary.
pub async fn load_products(pool: &sqlx::PgPool, account: &str) -> anyhow::Result<Vec<Product>> {
    let rows = sqlx::query_as::<_, (String, String, f64, f64, f64, String, String, String)>(
        "SELECT sku, name, price, weekly_sales, inventory_level, category, brand, subcategory \
         FROM products \
         WHERE account_id = $1 \
         ORDER BY sku",
    )
    .persistent(false)
    .bind(account)
    .fetch_all(pool)
    .await
    .context("select products failed")?;

    let mut out = Vec::with_capacity(rows.len());
    let mut skipped = 0usize;
    for (sku, name, price, weekly_sales, inventory_level, category, brand, subcategory) in rows {
        let product = Product {
            sku,
            name,
            price,
            weekly_sales,
            inventory_level,
            category,
            brand,
            subcategory,
        };
        match product.validate() {
            Ok(()) => out.push(product),
            Err(err) => {
                skipped += 1;
                if skipped <= 10 {
                    tracing::warn!(sku = %product.sku, error = %err, "skipping invalid product row");
                }
            }
        }
    }

    if skipped > 0 {
        tracing::warn!(account, skipped, loaded = out.len(), "product rows failed validation");
    }
    Ok(out)
}

/// Recent observations for an account, newest first, windowed by `days`.
pub async fn load_observations(
    pool: &sqlx::PgPool,
    account: &str,
    days: i64,
) -> anyhow::Result<Vec<CompetitorObservation>> {
    let cutoff: DateTime<Utc> = Utc::now() - Duration::days(days.max(0));

    let rows = sqlx::query_as::<
        _,
        (
            String,
            String,
            f64,
            f64,
            f64,
            f64,
            bool,
            bool,
            String,
            DateTime<Utc>,
        ),
    >(
        "SELECT sku, competitor, competitor_price, our_price, price_difference, \
                price_difference_percentage, availability, promotional, source, observed_at \
         FROM competitor_observations \
         WHERE account_id = $1 AND observed_at >= $2 \
         ORDER BY observed_at DESC",
    )
    .persistent(false)
    .bind(account)
    .bind(cutoff)
    .fetch_all(pool)
    .await
    .context("select competitor_observations failed")?;

    Ok(rows
        .into_iter()
        .map(
            |(
                sku,
                competitor,
                competitor_price,
                our_price,
                price_difference,
                price_difference_percentage,
                availability,
                promotional,
                source,
                observed_at,
            )| CompetitorObservation {
                sku,
                competitor,
                competitor_price,
                our_price,
                price_difference,
                price_difference_percentage,
                availability,
                promotional,
                source,
                observed_at,
            },
        )
        .collect())
}
