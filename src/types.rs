// =============================================================================
// Shared types used across the Holder Radar service
// =============================================================================
//
// Market rows arrive from CoinGecko with a loose notion of typing: numbers
// can be null, strings, or missing entirely. Every numeric field here is
// decoded leniently so that a single malformed value degrades to `None`
// instead of failing the whole payload.
// =============================================================================

use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Lenient decoders
// =============================================================================

/// Decode a JSON number or numeric string into `Some(f64)`. Anything else,
/// including NaN, becomes `None`.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value_to_f64(&value))
}

/// Decode a JSON string into `Some(String)`. Non-string values become `None`.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    })
}

fn value_to_f64(value: &serde_json::Value) -> Option<f64> {
    let v = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    if v.is_nan() {
        None
    } else {
        Some(v)
    }
}

// =============================================================================
// Fundamentals
// =============================================================================

/// Per-asset fundamentals from `/coins/{id}`. A failed lookup is represented
/// by `Fundamentals::default()` (every field `None`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub developer_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub community_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub coingecko_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub sentiment_votes_up_percentage: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub genesis_date: Option<String>,
}

impl Fundamentals {
    /// True when no field carries data, i.e. the lookup failed or the asset
    /// has no published fundamentals.
    pub fn is_empty(&self) -> bool {
        self.developer_score.is_none()
            && self.community_score.is_none()
            && self.coingecko_score.is_none()
            && self.sentiment_votes_up_percentage.is_none()
            && self.genesis_date.is_none()
    }
}

// =============================================================================
// AssetRecord
// =============================================================================

/// One market row, optionally joined with its fundamentals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub id: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub name: String,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub market_cap_rank: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub market_cap: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_volume: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub current_price: Option<f64>,
    /// Distance from the all-time high in percent (zero or negative).
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ath_change_percentage: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub circulating_supply: Option<f64>,
    /// `None` for assets with unbounded supply.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub max_supply: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub fully_diluted_valuation: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub price_change_percentage_7d_in_currency: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price_change_percentage_30d_in_currency: Option<f64>,

    /// RFC 3339 timestamp of the upstream quote.
    #[serde(default, deserialize_with = "lenient_string")]
    pub last_updated: Option<String>,

    #[serde(flatten)]
    pub fundamentals: Fundamentals,
}

impl AssetRecord {
    /// Replace the fundamentals block, consuming the record.
    pub fn with_fundamentals(mut self, fundamentals: Fundamentals) -> Self {
        self.fundamentals = fundamentals;
        self
    }
}

// =============================================================================
// Scores
// =============================================================================

/// The five bounded components of the holder score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    /// 0–25
    pub score_market: f64,
    /// 0–25
    pub score_tokenomics: f64,
    /// 0–20
    pub score_momentum_narr: f64,
    /// 0–20
    pub score_whales_deriv: f64,
    /// 0–10
    pub score_personal: f64,
}

impl SubScores {
    /// Sum of the five components, always in the same order.
    pub fn total(&self) -> f64 {
        self.score_market
            + self.score_tokenomics
            + self.score_momentum_narr
            + self.score_whales_deriv
            + self.score_personal
    }
}

/// An asset record with its sub-scores and final holder score.
///
/// Fields are private: the only way to build one is [`ScoredAsset::new`],
/// which derives `holder_score_100` from the components.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredAsset {
    #[serde(flatten)]
    record: AssetRecord,
    #[serde(flatten)]
    scores: SubScores,
    holder_score_100: f64,
}

impl ScoredAsset {
    pub fn new(record: AssetRecord, scores: SubScores) -> Self {
        let holder_score_100 = scores.total();
        Self {
            record,
            scores,
            holder_score_100,
        }
    }

    pub fn record(&self) -> &AssetRecord {
        &self.record
    }

    pub fn scores(&self) -> &SubScores {
        &self.scores
    }

    pub fn holder_score_100(&self) -> f64 {
        self.holder_score_100
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_row_decodes_with_bad_fields() {
        let json = r#"{
            "id": "bitcoin",
            "symbol": "btc",
            "name": "Bitcoin",
            "market_cap_rank": 1,
            "market_cap": "1000000000000",
            "total_volume": null,
            "max_supply": "n/a",
            "ath_change_percentage": true,
            "price_change_percentage_7d_in_currency": 5.5,
            "last_updated": "2024-03-01T12:00:00.000Z",
            "image": "https://example.invalid/btc.png"
        }"#;
        let rec: AssetRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.id, "bitcoin");
        assert_eq!(rec.market_cap_rank, Some(1.0));
        assert_eq!(rec.market_cap, Some(1e12));
        assert_eq!(rec.total_volume, None);
        assert_eq!(rec.max_supply, None);
        assert_eq!(rec.ath_change_percentage, None);
        assert_eq!(rec.price_change_percentage_7d_in_currency, Some(5.5));
        assert_eq!(rec.price_change_percentage_30d_in_currency, None);
        assert!(rec.fundamentals.is_empty());
    }

    #[test]
    fn missing_id_is_rejected() {
        let json = r#"{ "symbol": "btc", "name": "Bitcoin" }"#;
        assert!(serde_json::from_str::<AssetRecord>(json).is_err());
    }

    #[test]
    fn fundamentals_decode_leniently() {
        let json = r#"{
            "developer_score": "88.1",
            "community_score": {},
            "sentiment_votes_up_percentage": 71,
            "genesis_date": 20090103
        }"#;
        let f: Fundamentals = serde_json::from_str(json).unwrap();
        assert_eq!(f.developer_score, Some(88.1));
        assert_eq!(f.community_score, None);
        assert_eq!(f.sentiment_votes_up_percentage, Some(71.0));
        assert_eq!(f.genesis_date, None);
        assert!(!f.is_empty());
    }

    #[test]
    fn scored_asset_total_is_component_sum() {
        let scores = SubScores {
            score_market: 12.5,
            score_tokenomics: 20.25,
            score_momentum_narr: 8.0,
            score_whales_deriv: 10.0,
            score_personal: 5.0,
        };
        let scored = ScoredAsset::new(AssetRecord::default(), scores);
        assert_eq!(scored.holder_score_100(), 12.5 + 20.25 + 8.0 + 10.0 + 5.0);
    }

    #[test]
    fn scored_asset_serialises_flat() {
        let rec = AssetRecord {
            id: "eth".into(),
            symbol: "eth".into(),
            name: "Ethereum".into(),
            ..Default::default()
        };
        let scores = SubScores {
            score_market: 1.0,
            score_tokenomics: 2.0,
            score_momentum_narr: 3.0,
            score_whales_deriv: 10.0,
            score_personal: 5.0,
        };
        let v = serde_json::to_value(ScoredAsset::new(rec, scores)).unwrap();
        assert_eq!(v["symbol"], "eth");
        assert_eq!(v["score_whales_deriv"], 10.0);
        assert_eq!(v["holder_score_100"], 21.0);
    }
}
