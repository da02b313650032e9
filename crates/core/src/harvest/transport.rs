use crate::config::Settings;
use crate::domain::observation::RawPriceRecord;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PATH: &str = "/v1/competitor_prices";

/// The external network boundary: given a query term and category, returns
/// zero or more raw competitor price records or fails transiently. Retry and
/// query simplification live in the harvester, not here.
#[async_trait::async_trait]
pub trait PriceLookupTransport: Send + Sync {
    fn source_name(&self) -> &'static str;

    async fn lookup(&self, query: &str, category: &str) -> Result<Vec<RawPriceRecord>>;
}

#[derive(Debug, Clone, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    records: Vec<RawPriceRecord>,
}

#[derive(Debug, Clone)]
pub struct HttpJsonPriceSource {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    path: String,
}

impl HttpJsonPriceSource {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings.require_price_source_base_url()?.to_string();
        let api_key = settings.price_source_api_key.clone();

        let timeout_secs = std::env::var("PRICE_SOURCE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let path = std::env::var("PRICE_SOURCE_LOOKUP_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PATH.to_string());

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build price source http client")?;

        Ok(Self {
            http,
            base_url,
            api_key,
            path,
        })
    }

    fn url(&self) -> String {
        let path = if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };

        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = &self.api_key {
            headers.insert("x-api-key", HeaderValue::from_str(api_key)?);
        }
        Ok(headers)
    }
}

#[async_trait::async_trait]
impl PriceLookupTransport for HttpJsonPriceSource {
    fn source_name(&self) -> &'static str {
        "external_http_json"
    }

    async fn lookup(&self, query: &str, category: &str) -> Result<Vec<RawPriceRecord>> {
        let res = self
            .http
            .get(self.url())
            .headers(self.headers()?)
            .query(&[("q", query), ("category", category)])
            .send()
            .await
            .context("price lookup request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read price lookup response")?;

        if !status.is_success() {
            anyhow::bail!("price source HTTP {status}: {text}");
        }

        let parsed = serde_json::from_str::<LookupResponse>(&text)
            .with_context(|| format!("price lookup response is not valid JSON: {text}"))?;
        Ok(parsed.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_lookup_response_with_optional_flags() {
        let v = json!({
            "records": [
                {"competitor": "RivalMart", "competitor_price": 12.5},
                {
                    "competitor": "PriceKing",
                    "competitor_price": 9.99,
                    "availability": true,
                    "promotional": true,
                    "product_name": "Deck Screws 100ct"
                }
            ]
        });

        let parsed: LookupResponse = serde_json::from_value(v).unwrap();
        assert_eq!(parsed.records.len(), 2);
        assert!(!parsed.records[0].availability);
        assert!(parsed.records[1].promotional);
        assert_eq!(
            parsed.records[1].product_name.as_deref(),
            Some("Deck Screws 100ct")
        );
    }

    #[test]
    fn empty_body_defaults_to_no_records() {
        let parsed: LookupResponse = serde_json::from_value(json!({})).unwrap();
        assert!(parsed.records.is_empty());
    }
}
