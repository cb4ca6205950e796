// =============================================================================
// Runtime Configuration — Tunable service settings with atomic save
// =============================================================================
//
// Every knob of the radar lives here: which universe to fetch, how long a
// scored table stays fresh, and how the dashboard filters and labels it.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash. All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
//
// =============================================================================

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::coingecko::DEFAULT_BASE_URL;
use crate::pipeline::PipelineSettings;

/// Where the service loads its config on start and saves it on change.
pub const CONFIG_PATH: &str = "holder_radar_config.json";

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_vs_currency() -> String {
    "usd".to_string()
}

fn default_per_page() -> u32 {
    100
}

fn default_top_n() -> usize {
    40
}

fn default_cache_ttl_secs() -> u64 {
    900
}

fn default_refresh_check_secs() -> u64 {
    30
}

fn default_min_score() -> f64 {
    60.0
}

fn default_fundamentals_delay_ms() -> u64 {
    1200
}

fn default_display_utc_offset_hours() -> i32 {
    -5
}

fn default_coingecko_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level runtime configuration for the radar.
///
/// Every field has a serde default so that older JSON files missing new fields
/// will still deserialise correctly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    // --- Universe ------------------------------------------------------------

    /// Quote currency for market data.
    #[serde(default = "default_vs_currency")]
    pub vs_currency: String,

    /// Markets requested from the source before exclusion.
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Assets kept after exclusion, by market-cap rank.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    // --- Refresh -------------------------------------------------------------

    /// How long a scored table stays fresh.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// How often the refresher checks for expiry.
    #[serde(default = "default_refresh_check_secs")]
    pub refresh_check_secs: u64,

    /// Pause between per-asset fundamentals lookups.
    #[serde(default = "default_fundamentals_delay_ms")]
    pub fundamentals_delay_ms: u64,

    #[serde(default = "default_coingecko_base_url")]
    pub coingecko_base_url: String,

    // --- Presentation --------------------------------------------------------

    /// Threshold applied when a table request carries no `min_score`.
    #[serde(default = "default_min_score")]
    pub default_min_score: f64,

    /// Fixed offset for the secondary (local) clock on the dashboard.
    #[serde(default = "default_display_utc_offset_hours")]
    pub display_utc_offset_hours: i32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            vs_currency: default_vs_currency(),
            per_page: default_per_page(),
            top_n: default_top_n(),
            cache_ttl_secs: default_cache_ttl_secs(),
            refresh_check_secs: default_refresh_check_secs(),
            fundamentals_delay_ms: default_fundamentals_delay_ms(),
            coingecko_base_url: default_coingecko_base_url(),
            default_min_score: default_min_score(),
            display_utc_offset_hours: default_display_utc_offset_hours(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            top_n = config.top_n,
            cache_ttl_secs = config.cache_ttl_secs,
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise runtime config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "runtime config saved (atomic)");
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            vs_currency: self.vs_currency.clone(),
            per_page: self.per_page,
            top_n: self.top_n,
            fundamentals_delay: Duration::from_millis(self.fundamentals_delay_ms),
        }
    }
}

/// Clamp a score threshold into the valid 0–100 range. NaN becomes 0.
pub fn clamp_min_score(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 100.0)
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.vs_currency, "usd");
        assert_eq!(cfg.per_page, 100);
        assert_eq!(cfg.top_n, 40);
        assert_eq!(cfg.cache_ttl(), Duration::from_secs(900));
        assert!((cfg.default_min_score - 60.0).abs() < f64::EPSILON);
        assert_eq!(cfg.display_utc_offset_hours, -5);
        assert_eq!(cfg.coingecko_base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: RuntimeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.top_n, 40);
        assert_eq!(cfg.refresh_check_secs, 30);
        assert_eq!(cfg.fundamentals_delay_ms, 1200);
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "vs_currency": "eur", "top_n": 25 }"#;
        let cfg: RuntimeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.vs_currency, "eur");
        assert_eq!(cfg.top_n, 25);
        assert_eq!(cfg.per_page, 100);
        assert_eq!(cfg.cache_ttl_secs, 900);
    }

    #[test]
    fn pipeline_settings_follow_config() {
        let cfg = RuntimeConfig {
            top_n: 10,
            fundamentals_delay_ms: 250,
            ..Default::default()
        };
        let s = cfg.pipeline_settings();
        assert_eq!(s.top_n, 10);
        assert_eq!(s.per_page, 100);
        assert_eq!(s.fundamentals_delay, Duration::from_millis(250));
    }

    #[test]
    fn save_then_load() {
        let dir = std::env::temp_dir().join(format!("holder-radar-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");

        let cfg = RuntimeConfig {
            default_min_score: 72.5,
            ..Default::default()
        };
        cfg.save(&path).unwrap();
        let loaded = RuntimeConfig::load(&path).unwrap();
        assert!((loaded.default_min_score - 72.5).abs() < f64::EPSILON);
        assert!(!path.with_extension("json.tmp").exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn load_missing_file_errors() {
        assert!(RuntimeConfig::load("/definitely/not/here.json").is_err());
    }

    #[test]
    fn min_score_is_clamped() {
        assert_eq!(clamp_min_score(-5.0), 0.0);
        assert_eq!(clamp_min_score(150.0), 100.0);
        assert_eq!(clamp_min_score(f64::NAN), 0.0);
        assert_eq!(clamp_min_score(60.0), 60.0);
    }
}
