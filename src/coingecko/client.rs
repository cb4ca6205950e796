// =============================================================================
// CoinGecko REST Client
// =============================================================================
//
// Market rows are decoded one by one so that a single malformed row (for
// example one without an `id`) is dropped with a warning instead of failing
// the whole page. Fundamentals lookups never fail from the caller's point of
// view: any error yields an all-null `Fundamentals`.
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, instrument, warn};

use crate::pipeline::MarketDataSource;
use crate::types::{AssetRecord, Fundamentals};

/// Header carrying a CoinGecko demo API key.
const API_KEY_HEADER: &str = "x-cg-demo-api-key";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// CoinGecko REST API client.
#[derive(Clone)]
pub struct CoinGeckoClient {
    base_url: String,
    client: reqwest::Client,
}

impl CoinGeckoClient {
    /// Build a client for `base_url`. `api_key`, when present, is sent as the
    /// demo-key header on every request.
    pub fn new(base_url: impl Into<String>, api_key: Option<&str>) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            let val = HeaderValue::from_str(key)
                .context("COINGECKO_API_KEY is not a valid header value")?;
            default_headers.insert(API_KEY_HEADER, val);
        }

        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("holder-radar/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build reqwest client")?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(base_url = %base_url, "CoinGeckoClient initialised");

        Ok(Self { base_url, client })
    }

    /// GET /coins/markets: first page of markets ordered by market cap.
    #[instrument(skip(self), name = "coingecko::markets")]
    pub async fn markets(&self, vs_currency: &str, per_page: u32) -> Result<Vec<AssetRecord>> {
        let url = format!("{}/coins/markets", self.base_url);
        let per_page = per_page.to_string();

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("vs_currency", vs_currency),
                ("order", "market_cap_desc"),
                ("per_page", per_page.as_str()),
                ("page", "1"),
                ("price_change_percentage", "1h,24h,7d,30d"),
            ])
            .send()
            .await
            .context("GET /coins/markets request failed")?;

        let status = resp.status();
        let body: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse /coins/markets response")?;

        if !status.is_success() {
            anyhow::bail!("CoinGecko GET /coins/markets returned {}: {}", status, body);
        }

        let rows = parse_market_rows(body)?;
        debug!(count = rows.len(), "markets retrieved");
        Ok(rows)
    }

    /// GET /coins/{id}: fundamentals for a single asset.
    #[instrument(skip(self), name = "coingecko::fundamentals")]
    pub async fn coin_fundamentals(&self, id: &str) -> Result<Fundamentals> {
        let url = format!("{}/coins/{}", self.base_url, id);

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("localization", "false"),
                ("tickers", "false"),
                ("market_data", "false"),
                ("community_data", "true"),
                ("developer_data", "true"),
                ("sparkline", "false"),
            ])
            .send()
            .await
            .with_context(|| format!("GET /coins/{id} request failed"))?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("CoinGecko GET /coins/{} returned {}", id, status);
        }

        let fundamentals: Fundamentals = resp
            .json()
            .await
            .with_context(|| format!("failed to parse /coins/{id} response"))?;

        debug!(id, "fundamentals retrieved");
        Ok(fundamentals)
    }
}

impl MarketDataSource for CoinGeckoClient {
    async fn fetch_top_markets(
        &self,
        vs_currency: &str,
        per_page: u32,
    ) -> Result<Vec<AssetRecord>> {
        self.markets(vs_currency, per_page).await
    }

    async fn fetch_fundamentals(&self, id: &str) -> Fundamentals {
        match self.coin_fundamentals(id).await {
            Ok(f) => f,
            Err(e) => {
                warn!(
                    id,
                    error = %format!("{e:#}"),
                    "fundamentals lookup failed — using neutral defaults"
                );
                Fundamentals::default()
            }
        }
    }
}

/// Decode a `/coins/markets` body row by row, skipping rows that cannot be
/// decoded.
fn parse_market_rows(body: serde_json::Value) -> Result<Vec<AssetRecord>> {
    let serde_json::Value::Array(items) = body else {
        anyhow::bail!("/coins/markets response is not a JSON array");
    };

    let mut rows = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value::<AssetRecord>(item) {
            Ok(rec) => rows.push(rec),
            Err(e) => warn!(error = %e, "skipping undecodable market row"),
        }
    }
    Ok(rows)
}
