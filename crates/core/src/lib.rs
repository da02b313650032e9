pub mod alerts;
pub mod analysis;
pub mod domain;
pub mod engine;
pub mod harvest;
pub mod insight;
pub mod storage;

pub mod config {
    use anyhow::Context;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub database_url: Option<String>,
        pub anthropic_api_key: Option<String>,
        pub sentry_dsn: Option<String>,
        pub price_source_base_url: Option<String>,
        pub price_source_api_key: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                database_url: std::env::var("DATABASE_URL").ok(),
                anthropic_api_key: std::env::var("ANTHROPIC_API_KEY").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                price_source_base_url: std::env::var("PRICE_SOURCE_BASE_URL").ok(),
                price_source_api_key: std::env::var("PRICE_SOURCE_API_KEY").ok(),
            })
        }

        pub fn require_database_url(&self) -> anyhow::Result<&str> {
            self.database_url
                .as_deref()
                .context("DATABASE_URL is required")
        }

        pub fn require_anthropic_api_key(&self) -> anyhow::Result<&str> {
            self.anthropic_api_key
                .as_deref()
                .context("ANTHROPIC_API_KEY is required")
        }

        pub fn require_price_source_base_url(&self) -> anyhow::Result<&str> {
            self.price_source_base_url
                .as_deref()
                .context("PRICE_SOURCE_BASE_URL is required")
        }
    }
}
