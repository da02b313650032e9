use anyhow::Context;
use clap::Parser;
use shelfwatch_core::domain::metrics::AnalysisDepth;
use shelfwatch_core::engine::{EngineConfig, InsightMode};
use shelfwatch_core::harvest::cache::{PriceCache, SystemClock};
use shelfwatch_core::harvest::harvester::{HarvestOutcome, Harvester};
use shelfwatch_core::harvest::pacing::AdaptiveDelay;
use shelfwatch_core::harvest::transport::HttpJsonPriceSource;
use shelfwatch_core::insight::anthropic::AnthropicClient;
use shelfwatch_core::insight::{BriefingInput, InsightGenerator};
use std::str::FromStr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "shelfwatch_worker")]
struct Args {
    /// Retailer account to run the intelligence cycle for.
    #[arg(long)]
    account: String,

    /// Analysis depth: surface, standard or deep. Defaults to the
    /// portfolio analyzer's recommendation.
    #[arg(long)]
    depth: Option<String>,

    /// Harvest even when coverage is already sufficient.
    #[arg(long)]
    force_refresh: bool,

    /// Observation history window in days.
    #[arg(long, default_value_t = 7)]
    days: i64,

    /// Narrative mode: rule_based or ai_enhanced.
    #[arg(long, default_value = "rule_based")]
    insight_mode: String,

    /// Do everything except writing to the database.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = shelfwatch_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    let account = args.account.as_str();

    let insight_mode = InsightMode::from_str(&args.insight_mode)?;
    let depth = match args.depth.as_deref() {
        Some(s) => Some(AnalysisDepth::from_str(s)?),
        None => None,
    };

    let db_url = settings.require_database_url()?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(db_url)
        .await
        .context("connect DATABASE_URL failed")?;

    shelfwatch_core::storage::migrate(&pool).await?;

    let run_date = chrono::Utc::now().date_naive();
    let acquired =
        shelfwatch_core::storage::lock::try_acquire_account_lock(&pool, account, run_date).await?;
    if !acquired {
        tracing::warn!(account, %run_date, "account lock not acquired; another run in progress");
        return Ok(());
    }

    let run_result = run(&pool, account, &args, &settings, depth, insight_mode).await;

    if let Err(err) = &run_result {
        sentry_anyhow::capture_anyhow(err);
        let _ = shelfwatch_core::storage::runs::record_harvest_run(
            &pool,
            account,
            "error",
            Some(&format!("{err:#}")),
            None,
        )
        .await;
        tracing::error!(account, error = %err, "intelligence run failed");
    }

    let _ = shelfwatch_core::storage::lock::release_account_lock(&pool, account, run_date).await;
    run_result
}

async fn run(
    pool: &sqlx::PgPool,
    account: &str,
    args: &Args,
    settings: &shelfwatch_core::config::Settings,
    depth: Option<AnalysisDepth>,
    insight_mode: InsightMode,
) -> anyhow::Result<()> {
    let products = shelfwatch_core::storage::inventory::load_products(pool, account).await?;
    let observations =
        shelfwatch_core::storage::inventory::load_observations(pool, account, args.days).await?;

    tracing::info!(
        account,
        products = products.len(),
        observations = observations.len(),
        days = args.days,
        "loaded portfolio"
    );

    let transport = HttpJsonPriceSource::from_settings(settings)?;
    let harvester = Harvester::new(
        Arc::new(transport),
        Arc::new(PriceCache::with_system_clock()),
        Arc::new(AdaptiveDelay::default()),
        Arc::new(SystemClock),
    );

    let config = EngineConfig {
        depth: depth.unwrap_or_else(|| {
            shelfwatch_core::analysis::portfolio::analyze_portfolio(&products, &observations)
                .recommended_depth
        }),
        insight_mode,
        ..EngineConfig::default()
    }
    .with_force_refresh(args.force_refresh);

    let now = chrono::Utc::now();
    let report =
        shelfwatch_core::engine::run_cycle(&products, &observations, &harvester, &config, now)
            .await;

    if config.insight_mode == InsightMode::AiEnhanced {
        match generate_briefing(settings, account, &report).await {
            Ok(briefing) => tracing::info!(account, briefing = %briefing, "strategic briefing"),
            Err(err) => {
                // Enrichment is additive: a failed briefing never fails the run.
                sentry_anyhow::capture_anyhow(&err);
                tracing::warn!(account, error = %err, "briefing generation failed");
            }
        }
    }

    if args.dry_run {
        tracing::info!(
            account,
            dry_run = true,
            summary = %report.summary_json(),
            "intelligence cycle (dry-run)"
        );
        return Ok(());
    }

    // Persistence is best-effort per table; the report is already complete.
    match shelfwatch_core::storage::observations::insert_batch(
        pool,
        account,
        &report.new_observations,
    )
    .await
    {
        Ok(inserted) => tracing::info!(account, inserted, "persisted observations"),
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(account, error = %err, "persisting observations failed");
        }
    }

    match shelfwatch_core::storage::alerts::insert_batch(pool, account, &report.alerts).await {
        Ok(inserted) => tracing::info!(account, inserted, "persisted alerts"),
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(account, error = %err, "persisting alerts failed");
        }
    }

    let status = match report.harvest_outcome {
        HarvestOutcome::Unavailable => "degraded",
        _ => "success",
    };
    match shelfwatch_core::storage::runs::record_harvest_run(
        pool,
        account,
        status,
        None,
        Some(report.summary_json()),
    )
    .await
    {
        Ok(run_id) => tracing::info!(account, %run_id, status, "recorded harvest run"),
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(account, error = %err, "recording harvest run failed");
        }
    }

    Ok(())
}

async fn generate_briefing(
    settings: &shelfwatch_core::config::Settings,
    account: &str,
    report: &shelfwatch_core::engine::IntelligenceReport,
) -> anyhow::Result<String> {
    let client = AnthropicClient::from_settings(settings)?;
    let input = BriefingInput::from_report(account, report);
    client.generate_briefing(input).await
}

fn init_sentry(
    settings: &shelfwatch_core::config::Settings,
) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
