// =============================================================================
// Central Application State — Holder Radar
// =============================================================================
//
// Ties the score cache, runtime config and refresh bookkeeping together and
// builds the unified snapshot served to the dashboard over REST and the
// WebSocket feed.
//
// Thread safety:
//   - Atomic counters for lock-free version tracking.
//   - parking_lot::RwLock for all mutable shared fields.
//   - tokio::sync::Notify to wake the refresher on a manual refresh.
// =============================================================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::Notify;
use tracing::info;

use crate::cache::ScoreCache;
use crate::dashboard::{clock_view, table_view, ClockView, TableView};
use crate::runtime_config::RuntimeConfig;

// =============================================================================
// Error Record
// =============================================================================

/// A recorded error event for the dashboard error log.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    pub message: String,
    /// ISO 8601 timestamp.
    pub at: String,
}

// =============================================================================
// AppState
// =============================================================================

/// Maximum number of recent errors to retain.
const MAX_RECENT_ERRORS: usize = 50;

/// Central application state shared across all async tasks via `Arc<AppState>`.
pub struct AppState {
    // ── Version tracking ────────────────────────────────────────────────
    /// Monotonically increasing version counter, bumped on every change the
    /// dashboard should see. The WebSocket feed pushes when it moves.
    pub state_version: AtomicU64,

    /// Number of open WebSocket connections.
    pub ws_clients: AtomicU64,

    // ── Configuration ───────────────────────────────────────────────────
    pub runtime_config: Arc<RwLock<RuntimeConfig>>,

    // ── Scores ──────────────────────────────────────────────────────────
    pub cache: Arc<ScoreCache>,
    pub refresh_requested: Notify,

    // ── Refresh status ──────────────────────────────────────────────────
    pub last_refresh_ok: RwLock<Option<DateTime<Utc>>>,
    pub last_refresh_error: RwLock<Option<String>>,
    pub recent_errors: RwLock<Vec<ErrorRecord>>,

    /// Instant when the service was started. Used for uptime.
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(config: RuntimeConfig) -> Self {
        let cache = ScoreCache::new(config.cache_ttl());

        Self {
            state_version: AtomicU64::new(1),
            ws_clients: AtomicU64::new(0),
            runtime_config: Arc::new(RwLock::new(config)),
            cache: Arc::new(cache),
            refresh_requested: Notify::new(),
            last_refresh_ok: RwLock::new(None),
            last_refresh_error: RwLock::new(None),
            recent_errors: RwLock::new(Vec::new()),
            start_time: std::time::Instant::now(),
        }
    }

    // ── Version Management ──────────────────────────────────────────────

    pub fn increment_version(&self) -> u64 {
        self.state_version.fetch_add(1, Ordering::SeqCst)
    }

    pub fn current_state_version(&self) -> u64 {
        self.state_version.load(Ordering::SeqCst)
    }

    // ── Refresh bookkeeping ─────────────────────────────────────────────

    pub fn record_refresh_ok(&self) {
        *self.last_refresh_ok.write() = Some(Utc::now());
        *self.last_refresh_error.write() = None;
        self.increment_version();
    }

    pub fn record_refresh_error(&self, msg: String) {
        *self.last_refresh_error.write() = Some(msg.clone());
        self.push_error(msg);
    }

    /// Expire the cached table and wake the refresher.
    pub fn request_refresh(&self) {
        self.cache.invalidate();
        self.refresh_requested.notify_one();
        self.increment_version();
        info!("cache invalidated — refresh requested");
    }

    // ── Error Logging ───────────────────────────────────────────────────

    /// Record an error message. The ring buffer is capped at
    /// [`MAX_RECENT_ERRORS`]; oldest entries are evicted first.
    pub fn push_error(&self, msg: String) {
        let record = ErrorRecord {
            message: msg,
            at: Utc::now().to_rfc3339(),
        };

        let mut errors = self.recent_errors.write();
        errors.push(record);
        while errors.len() > MAX_RECENT_ERRORS {
            errors.remove(0);
        }
        drop(errors);

        self.increment_version();
    }

    // ── Snapshot Builder ────────────────────────────────────────────────

    /// Build the dashboard snapshot for the given score threshold. `None`
    /// uses the configured default.
    pub fn build_snapshot(&self, min_score: Option<f64>) -> DashboardSnapshot {
        let now = Utc::now();
        let version = self.current_state_version();
        let (default_min, offset_hours, ttl_secs) = {
            let config = self.runtime_config.read();
            (
                config.default_min_score,
                config.display_utc_offset_hours,
                config.cache_ttl_secs,
            )
        };
        let min_score = min_score.unwrap_or(default_min);

        let latest = self.cache.latest();
        let remaining = self.cache.remaining_at(std::time::Instant::now());

        let status = StatusHeader {
            cache_fresh: remaining.is_some(),
            cache_expires_in_s: remaining.map(|d| d.as_secs()),
            cache_ttl_s: ttl_secs,
            computed_at: latest.as_ref().map(|t| t.computed_at.to_rfc3339()),
            last_refresh_ok: self.last_refresh_ok.read().map(|t| t.to_rfc3339()),
            last_refresh_error: self.last_refresh_error.read().clone(),
            fetched: latest.as_ref().map(|t| t.fetched),
            excluded: latest.as_ref().map(|t| t.excluded),
            fundamentals_missing: latest.as_ref().map(|t| t.fundamentals_missing),
            ws_clients: self.ws_clients.load(Ordering::Relaxed),
            uptime_s: self.start_time.elapsed().as_secs(),
        };

        let clock = clock_view(
            now,
            latest.as_ref().and_then(|t| t.last_updated_utc),
            offset_hours,
        );

        let table = latest.as_ref().map(|t| table_view(t, min_score));
        let recent_errors = self.recent_errors.read().clone();

        DashboardSnapshot {
            state_version: version,
            server_time: now.timestamp_millis(),
            clock,
            status,
            table,
            recent_errors,
        }
    }
}

// =============================================================================
// Serialisable snapshot types
// =============================================================================

/// Full dashboard payload.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub state_version: u64,
    pub server_time: i64,
    pub clock: ClockView,
    pub status: StatusHeader,
    /// `None` until the first refresh succeeds.
    pub table: Option<TableView>,
    pub recent_errors: Vec<ErrorRecord>,
}

/// Operational status banner.
#[derive(Debug, Clone, Serialize)]
pub struct StatusHeader {
    pub cache_fresh: bool,
    pub cache_expires_in_s: Option<u64>,
    pub cache_ttl_s: u64,
    pub computed_at: Option<String>,
    pub last_refresh_ok: Option<String>,
    pub last_refresh_error: Option<String>,
    pub fetched: Option<usize>,
    pub excluded: Option<usize>,
    pub fundamentals_missing: Option<usize>,
    pub ws_clients: u64,
    pub uptime_s: u64,
}
