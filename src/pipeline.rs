// =============================================================================
// Refresh Pipeline — fetch, select, enrich, score
// =============================================================================
//
// One refresh cycle:
//   1. Fetch the top markets from the data source.
//   2. Drop stablecoins and wrapped/staked tokens, keep the best `top_n` by
//      market-cap rank.
//   3. Fetch fundamentals for each survivor (sequentially, with an optional
//      pause between lookups to stay under public rate limits).
//   4. Score every asset and stamp the table.
//
// The background loop refreshes only when the cache has expired or a manual
// refresh was requested. A failed cycle leaves the previous table in place.
// =============================================================================

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::app_state::AppState;
use crate::scoring::{select_universe, HolderScorer};
use crate::types::{AssetRecord, Fundamentals, ScoredAsset};

// =============================================================================
// Data source seam
// =============================================================================

/// Where raw market rows and fundamentals come from.
pub trait MarketDataSource: Send + Sync {
    /// Top `per_page` markets quoted in `vs_currency`.
    fn fetch_top_markets(
        &self,
        vs_currency: &str,
        per_page: u32,
    ) -> impl Future<Output = Result<Vec<AssetRecord>>> + Send;

    /// Fundamentals for `id`. Failures surface as `Fundamentals::default()`.
    fn fetch_fundamentals(&self, id: &str) -> impl Future<Output = Fundamentals> + Send;
}

// =============================================================================
// ScoreTable
// =============================================================================

/// The result of one refresh cycle.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreTable {
    /// Scored assets in market-cap-rank order.
    pub assets: Vec<ScoredAsset>,
    /// Market rows received from the source.
    pub fetched: usize,
    /// Rows dropped as stablecoins or wrapped/staked tokens.
    pub excluded: usize,
    /// Assets scored with neutral fundamentals because the lookup failed.
    pub fundamentals_missing: usize,
    /// Newest `last_updated` stamp among the fetched rows.
    pub last_updated_utc: Option<DateTime<Utc>>,
    pub computed_at: DateTime<Utc>,
}

impl ScoreTable {
    pub fn empty() -> Self {
        Self {
            assets: Vec::new(),
            fetched: 0,
            excluded: 0,
            fundamentals_missing: 0,
            last_updated_utc: None,
            computed_at: Utc::now(),
        }
    }

    /// Case-insensitive lookup by ticker symbol.
    pub fn find_symbol(&self, symbol: &str) -> Option<&ScoredAsset> {
        self.assets
            .iter()
            .find(|a| a.record().symbol.eq_ignore_ascii_case(symbol))
    }
}

/// Newest parseable RFC 3339 `last_updated` among `records`.
pub fn newest_update(records: &[AssetRecord]) -> Option<DateTime<Utc>> {
    records
        .iter()
        .filter_map(|r| r.last_updated.as_deref())
        .filter_map(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .max()
}

// =============================================================================
// Pipeline
// =============================================================================

/// Per-cycle knobs, taken from the runtime config at the start of a cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub vs_currency: String,
    pub per_page: u32,
    pub top_n: usize,
    pub fundamentals_delay: Duration,
}

pub struct RadarPipeline<S> {
    source: S,
    scorer: HolderScorer,
}

impl<S: MarketDataSource> RadarPipeline<S> {
    pub fn new(source: S, scorer: HolderScorer) -> Self {
        Self { source, scorer }
    }

    /// Run one full cycle and return the freshly scored table.
    pub async fn build_table(&self, settings: &PipelineSettings) -> Result<ScoreTable> {
        let markets = self
            .source
            .fetch_top_markets(&settings.vs_currency, settings.per_page)
            .await
            .context("fetching top markets")?;

        let fetched = markets.len();
        let last_updated_utc = newest_update(&markets);
        let (universe, excluded) = select_universe(markets, settings.top_n);

        debug!(fetched, excluded, selected = universe.len(), "universe selected");

        let mut enriched = Vec::with_capacity(universe.len());
        let mut fundamentals_missing = 0;
        let last = universe.len().saturating_sub(1);

        for (i, record) in universe.into_iter().enumerate() {
            let fundamentals = self.source.fetch_fundamentals(&record.id).await;
            if fundamentals.is_empty() {
                fundamentals_missing += 1;
            }
            enriched.push(record.with_fundamentals(fundamentals));

            if i < last && !settings.fundamentals_delay.is_zero() {
                tokio::time::sleep(settings.fundamentals_delay).await;
            }
        }

        let assets = self.scorer.score_all(enriched);

        info!(
            fetched,
            excluded,
            scored = assets.len(),
            fundamentals_missing,
            "score table rebuilt"
        );

        Ok(ScoreTable {
            assets,
            fetched,
            excluded,
            fundamentals_missing,
            last_updated_utc,
            computed_at: Utc::now(),
        })
    }
}

// =============================================================================
// Background refresh
// =============================================================================

/// Run a single refresh and publish the outcome to `state`. Returns `true`
/// on success.
pub async fn refresh_once<S: MarketDataSource>(
    state: &AppState,
    pipeline: &RadarPipeline<S>,
) -> bool {
    let settings = state.runtime_config.read().pipeline_settings();
    let generation = state.cache.generation();

    match pipeline.build_table(&settings).await {
        Ok(table) => {
            state.cache.store_from(table, generation);
            state.record_refresh_ok();
            true
        }
        Err(e) => {
            let msg = format!("{e:#}");
            warn!(error = %msg, "refresh failed — keeping previous table");
            state.record_refresh_error(msg);
            false
        }
    }
}

/// Refresh forever: wake every `refresh_check_secs` or on a manual request,
/// and rebuild whenever the cache is stale.
pub async fn run_refresh_loop<S: MarketDataSource>(
    state: Arc<AppState>,
    pipeline: RadarPipeline<S>,
) {
    let check_secs = state.runtime_config.read().refresh_check_secs.max(1);
    let mut interval = tokio::time::interval(Duration::from_secs(check_secs));
    info!(check_secs, "refresh loop starting");

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = state.refresh_requested.notified() => {
                info!("manual refresh requested");
            }
        }

        let ttl = state.runtime_config.read().cache_ttl();
        state.cache.set_ttl(ttl);
        if !state.cache.is_stale() {
            continue;
        }
        refresh_once(&state, &pipeline).await;
    }
}

// =============================================================================
// Tests
// =============================================================================
