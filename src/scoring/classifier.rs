// =============================================================================
// Classifier — stablecoin and wrapped/staked exclusion
// =============================================================================
//
// Stablecoins track a fiat peg and wrapped/staked tokens mirror another
// asset, so neither belongs in a holder ranking. Matching is exact on the
// lower-cased symbol and substring-only on the lower-cased name.
// =============================================================================

use serde::Serialize;

use crate::types::AssetRecord;

/// Symbols of fiat-pegged assets.
pub const STABLECOIN_SYMBOLS: [&str; 18] = [
    "usdt", "usdc", "busd", "dai", "tusd", "usdd", "usde", "gusd", "usdp", "fdusd", "eusd",
    "eurt", "euroc", "susd", "lusd", "frax", "pai", "usdx",
];

/// Symbols of common wrapped or liquid-staking derivatives.
pub const WRAPPED_SYMBOLS: [&str; 5] = ["wbtc", "weth", "wsteth", "wsol", "wavax"];

/// Name fragments that mark a derivative token.
const WRAPPED_NAME_MARKERS: [&str; 1] = ["wrapped"];
const STAKED_NAME_MARKERS: [&str; 2] = ["staked ether", "staked eth"];

/// Why an asset was left out of the ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Exclusion {
    Stablecoin,
    WrappedName,
    StakedName,
    WrappedSymbol,
}

impl std::fmt::Display for Exclusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stablecoin => write!(f, "stablecoin"),
            Self::WrappedName => write!(f, "wrapped (name)"),
            Self::StakedName => write!(f, "staked (name)"),
            Self::WrappedSymbol => write!(f, "wrapped (symbol)"),
        }
    }
}

/// Classify a record, checking the rules in their fixed order.
pub fn classify(record: &AssetRecord) -> Option<Exclusion> {
    let sym = record.symbol.to_lowercase();
    let name = record.name.to_lowercase();

    if STABLECOIN_SYMBOLS.contains(&sym.as_str()) {
        return Some(Exclusion::Stablecoin);
    }
    if WRAPPED_NAME_MARKERS.iter().any(|m| name.contains(m)) {
        return Some(Exclusion::WrappedName);
    }
    if STAKED_NAME_MARKERS.iter().any(|m| name.contains(m)) {
        return Some(Exclusion::StakedName);
    }
    if WRAPPED_SYMBOLS.contains(&sym.as_str()) {
        return Some(Exclusion::WrappedSymbol);
    }
    None
}

/// True when the asset must not be ranked.
pub fn is_excluded(record: &AssetRecord) -> bool {
    classify(record).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(symbol: &str, name: &str) -> AssetRecord {
        AssetRecord {
            id: symbol.to_lowercase(),
            symbol: symbol.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    #[test]
    fn stablecoins_any_case() {
        assert!(is_excluded(&rec("usdt", "Tether")));
        assert!(is_excluded(&rec("USDT", "Tether")));
        assert!(is_excluded(&rec("UsDc", "USD Coin")));
        assert_eq!(classify(&rec("FRAX", "Frax")), Some(Exclusion::Stablecoin));
    }

    #[test]
    fn wrapped_by_name() {
        assert_eq!(
            classify(&rec("xyz", "Wrapped Bitcoin")),
            Some(Exclusion::WrappedName)
        );
    }

    #[test]
    fn staked_by_name() {
        assert_eq!(
            classify(&rec("steth", "Lido Staked Ether")),
            Some(Exclusion::StakedName)
        );
        assert_eq!(
            classify(&rec("reth", "Rocket Pool STAKED ETH")),
            Some(Exclusion::StakedName)
        );
    }

    #[test]
    fn wrapped_by_symbol() {
        assert_eq!(
            classify(&rec("WSOL", "Solana Bridge")),
            Some(Exclusion::WrappedSymbol)
        );
    }

    #[test]
    fn stablecoin_rule_wins_over_name() {
        assert_eq!(
            classify(&rec("dai", "Wrapped Dai")),
            Some(Exclusion::Stablecoin)
        );
    }

    #[test]
    fn regular_assets_pass() {
        assert!(!is_excluded(&rec("btc", "Bitcoin")));
        assert!(!is_excluded(&rec("BTC", "Bitcoin")));
        assert!(!is_excluded(&rec("eth", "Ethereum")));
        // No partial symbol matching.
        assert!(!is_excluded(&rec("usdtx", "Something")));
        assert!(!is_excluded(&rec("", "")));
    }
}
