// =============================================================================
// CoinGecko Module
// =============================================================================
//
// Thin REST client for the two CoinGecko endpoints the radar needs:
// - `/coins/markets`: the top-N market rows by market cap
// - `/coins/{id}`:    developer, community and sentiment fundamentals

pub mod client;

pub use client::CoinGeckoClient;

/// Public API root. Demo keys use the same host.
pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";
