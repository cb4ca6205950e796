// =============================================================================
// Holder Radar — library root
// =============================================================================
//
// The scoring core (`scoring`, `types`) is usable on its own; the remaining
// modules wire it to CoinGecko, the score cache and the dashboard API that
// the `holder-radar` binary serves.
// =============================================================================

pub mod api;
pub mod app_state;
pub mod cache;
pub mod coingecko;
pub mod dashboard;
pub mod pipeline;
pub mod runtime_config;
pub mod scoring;
pub mod types;
