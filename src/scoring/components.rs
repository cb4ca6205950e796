// =============================================================================
// Sub-score functions — market, tokenomics, momentum, personal
// =============================================================================
//
// Each function reads only its own record and returns a value inside its
// documented range. Every missing input resolves to a neutral fallback
// documented next to the rule that uses it.
// =============================================================================

use chrono::NaiveDate;

use super::normalize::{scale, years_since_on, NEUTRAL};
use crate::types::AssetRecord;

// ── Ranges ───────────────────────────────────────────────────────────────────

pub const MARKET_MAX: f64 = 25.0;
pub const TOKENOMICS_MAX: f64 = 25.0;
pub const MOMENTUM_MAX: f64 = 20.0;
pub const WHALES_DERIV_MAX: f64 = 20.0;
pub const PERSONAL_MAX: f64 = 10.0;

// ── Weights (each group sums to 1.0) ─────────────────────────────────────────

pub const W_MARKET_RANK: f64 = 0.4;
pub const W_MARKET_LIQUIDITY: f64 = 0.3;
pub const W_MARKET_DRAWDOWN: f64 = 0.3;

pub const W_TOKENOMICS_CIRCULATION: f64 = 0.4;
pub const W_TOKENOMICS_DILUTION: f64 = 0.4;
pub const W_TOKENOMICS_INFLATION: f64 = 0.2;

pub const W_MOMENTUM_30D: f64 = 0.4;
pub const W_MOMENTUM_7D: f64 = 0.3;
pub const W_MOMENTUM_NARRATIVE: f64 = 0.3;

pub const W_PERSONAL_DEVELOPER: f64 = 0.35;
pub const W_PERSONAL_COMMUNITY: f64 = 0.25;
pub const W_PERSONAL_SENTIMENT: f64 = 0.25;
pub const W_PERSONAL_AGE: f64 = 0.15;

// ── Fallbacks ────────────────────────────────────────────────────────────────

/// Rank assumed for assets without a market-cap rank.
const WORST_RANK: f64 = 200.0;
/// Circulation score when no max supply is published.
const UNBOUNDED_SUPPLY_SCORE: f64 = 0.4;
/// Ratio used when a supply or dilution ratio cannot be formed.
const FALLBACK_RATIO: f64 = 0.5;
/// Age considered fully mature.
const MAX_AGE_YEARS: f64 = 10.0;

fn present(x: Option<f64>) -> Option<f64> {
    x.filter(|v| !v.is_nan())
}

// =============================================================================
// Market (0–25)
// =============================================================================

/// 24h volume over market cap. Zero when market cap is missing or zero;
/// `None` when only the volume is missing, which scales to neutral.
pub fn liquidity_ratio(market_cap: Option<f64>, total_volume: Option<f64>) -> Option<f64> {
    match present(market_cap) {
        Some(mc) if mc != 0.0 => present(total_volume).map(|v| v / mc),
        _ => Some(0.0),
    }
}

/// Score the distance from the all-time high. Shallow drawdowns (< 10 %)
/// and collapses (> 80 %) both score low; in between rises linearly.
pub fn drawdown_score(ath_change_percentage: Option<f64>) -> f64 {
    let Some(change) = present(ath_change_percentage) else {
        return NEUTRAL;
    };
    let dd = -change;
    if dd < 10.0 {
        0.2
    } else if dd > 80.0 {
        0.3
    } else {
        0.2 + 0.8 * (dd - 10.0) / 70.0
    }
}

pub fn score_market(record: &AssetRecord) -> f64 {
    let rank = present(record.market_cap_rank).unwrap_or(WORST_RANK);
    let rank_score = scale(Some(WORST_RANK - rank), 0.0, WORST_RANK - 1.0);

    let liq_ratio = liquidity_ratio(record.market_cap, record.total_volume);
    let liq_score = scale(liq_ratio, 0.01, 0.30);

    let ath_score = drawdown_score(record.ath_change_percentage);

    MARKET_MAX
        * (W_MARKET_RANK * rank_score
            + W_MARKET_LIQUIDITY * liq_score
            + W_MARKET_DRAWDOWN * ath_score)
}

// =============================================================================
// Tokenomics (0–25)
// =============================================================================

/// Score circulating over max supply. A missing, zero or negative max
/// supply means no ratio is available.
pub fn circulation_score(circulating: Option<f64>, max_supply: Option<f64>) -> f64 {
    let max = match present(max_supply) {
        Some(m) if m > 0.0 => m,
        _ => return UNBOUNDED_SUPPLY_SCORE,
    };
    let ratio = match present(circulating) {
        Some(c) => c / max,
        None => FALLBACK_RATIO,
    };
    let ratio = if ratio.is_nan() { FALLBACK_RATIO } else { ratio };

    if ratio < 0.3 {
        0.2
    } else if ratio > 0.95 {
        0.7
    } else {
        0.2 + 0.8 * (ratio - 0.3) / (0.95 - 0.3)
    }
}

/// Score market cap over fully diluted valuation.
pub fn dilution_score(market_cap: Option<f64>, fdv: Option<f64>) -> f64 {
    let (mc, fdv) = match (present(market_cap), present(fdv)) {
        (Some(mc), Some(fdv)) if mc != 0.0 && fdv > 0.0 => (mc, fdv),
        _ => return NEUTRAL,
    };
    let d_ratio = mc / fdv;
    let d_ratio = if d_ratio.is_nan() { FALLBACK_RATIO } else { d_ratio };

    if d_ratio >= 0.7 {
        1.0
    } else if d_ratio <= 0.3 {
        0.3
    } else {
        0.3 + 0.7 * (d_ratio - 0.3) / (0.7 - 0.3)
    }
}

/// `inflation` is the slot value in [0, 1].
pub fn score_tokenomics(record: &AssetRecord, inflation: f64) -> f64 {
    let circ_score = circulation_score(record.circulating_supply, record.max_supply);
    let dil_score = dilution_score(record.market_cap, record.fully_diluted_valuation);

    TOKENOMICS_MAX
        * (W_TOKENOMICS_CIRCULATION * circ_score
            + W_TOKENOMICS_DILUTION * dil_score
            + W_TOKENOMICS_INFLATION * inflation)
}

// =============================================================================
// Momentum / narrative (0–20)
// =============================================================================

/// `narrative` is the slot value in [0, 1].
pub fn score_momentum_narr(record: &AssetRecord, narrative: f64) -> f64 {
    let mom30 = scale(record.price_change_percentage_30d_in_currency, -20.0, 60.0);
    let mom7 = scale(record.price_change_percentage_7d_in_currency, -15.0, 40.0);

    MOMENTUM_MAX
        * (W_MOMENTUM_30D * mom30 + W_MOMENTUM_7D * mom7 + W_MOMENTUM_NARRATIVE * narrative)
}

// =============================================================================
// Personal / fundamental (0–10)
// =============================================================================

/// Score developer, community and sentiment data plus project age, as of
/// `today`. Missing scores resolve to the neutral 0.5. A missing or
/// malformed genesis date counts as age zero, except when the whole
/// fundamentals block is empty (failed lookup): then age is neutral too,
/// so such an asset scores exactly 5.0.
pub fn score_personal_on(record: &AssetRecord, today: NaiveDate) -> f64 {
    let f = &record.fundamentals;
    let dev_norm = scale(f.developer_score, 0.0, 100.0);
    let comm_norm = scale(f.community_score, 0.0, 100.0);
    let sent_norm = scale(f.sentiment_votes_up_percentage, 50.0, 90.0);

    let age_norm = if f.is_empty() {
        NEUTRAL
    } else {
        let years = years_since_on(f.genesis_date.as_deref(), today).min(MAX_AGE_YEARS);
        scale(Some(years), 0.0, MAX_AGE_YEARS)
    };

    PERSONAL_MAX
        * (W_PERSONAL_DEVELOPER * dev_norm
            + W_PERSONAL_COMMUNITY * comm_norm
            + W_PERSONAL_SENTIMENT * sent_norm
            + W_PERSONAL_AGE * age_norm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Fundamentals;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn weight_groups_sum_to_one() {
        assert!(approx(W_MARKET_RANK + W_MARKET_LIQUIDITY + W_MARKET_DRAWDOWN, 1.0));
        assert!(approx(
            W_TOKENOMICS_CIRCULATION + W_TOKENOMICS_DILUTION + W_TOKENOMICS_INFLATION,
            1.0
        ));
        assert!(approx(W_MOMENTUM_30D + W_MOMENTUM_7D + W_MOMENTUM_NARRATIVE, 1.0));
        assert!(approx(
            W_PERSONAL_DEVELOPER + W_PERSONAL_COMMUNITY + W_PERSONAL_SENTIMENT + W_PERSONAL_AGE,
            1.0
        ));
        assert!(approx(
            MARKET_MAX + TOKENOMICS_MAX + MOMENTUM_MAX + WHALES_DERIV_MAX + PERSONAL_MAX,
            100.0
        ));
    }

    #[test]
    fn drawdown_piecewise() {
        assert_eq!(drawdown_score(None), 0.5);
        assert_eq!(drawdown_score(Some(0.0)), 0.2);
        assert_eq!(drawdown_score(Some(-9.99)), 0.2);
        assert!(approx(drawdown_score(Some(-10.0)), 0.2));
        assert!(approx(drawdown_score(Some(-45.0)), 0.6));
        assert!(approx(drawdown_score(Some(-80.0)), 1.0));
        assert_eq!(drawdown_score(Some(-80.01)), 0.3);
        assert_eq!(drawdown_score(Some(f64::NAN)), 0.5);
    }

    #[test]
    fn liquidity_ratio_guards_zero_cap() {
        assert_eq!(liquidity_ratio(None, Some(5.0)), Some(0.0));
        assert_eq!(liquidity_ratio(Some(0.0), Some(5.0)), Some(0.0));
        assert_eq!(liquidity_ratio(Some(100.0), None), None);
        assert_eq!(liquidity_ratio(Some(100.0), Some(f64::NAN)), None);
        assert!(approx(liquidity_ratio(Some(100.0), Some(5.0)).unwrap(), 0.05));
    }

    #[test]
    fn market_missing_volume_is_neutral_liquidity() {
        let rec = AssetRecord {
            market_cap_rank: Some(1.0),
            market_cap: Some(1e12),
            total_volume: None,
            ath_change_percentage: Some(-15.0),
            ..Default::default()
        };
        // rank 1.0, liquidity neutral 0.5, drawdown 0.2 + 0.8 * 5 / 70
        let expected = 25.0 * (0.4 * 1.0 + 0.3 * 0.5 + 0.3 * (0.2 + 0.8 * 5.0 / 70.0));
        assert!(approx(score_market(&rec), expected));
        assert!((score_market(&rec) - 15.678571428571429).abs() < 1e-9);
    }

    #[test]
    fn market_missing_rank_is_worst() {
        let rec = AssetRecord::default();
        // rank 0.0, liq scale(0) = 0.0, drawdown neutral 0.5
        assert!(approx(score_market(&rec), 25.0 * (0.3 * 0.5)));
    }

    #[test]
    fn circulation_piecewise() {
        assert_eq!(circulation_score(Some(10.0), None), 0.4);
        assert_eq!(circulation_score(Some(10.0), Some(0.0)), 0.4);
        assert_eq!(circulation_score(Some(10.0), Some(-5.0)), 0.4);
        assert_eq!(circulation_score(Some(1.0), Some(10.0)), 0.2);
        assert_eq!(circulation_score(Some(99.0), Some(100.0)), 0.7);
        assert!(approx(circulation_score(Some(0.95), Some(1.0)), 1.0));
        assert!(approx(circulation_score(Some(0.3), Some(1.0)), 0.2));
        // Missing circulating supply falls back to a 0.5 ratio.
        assert!(approx(
            circulation_score(None, Some(100.0)),
            0.2 + 0.8 * 0.2 / 0.65
        ));
    }

    #[test]
    fn dilution_piecewise() {
        assert_eq!(dilution_score(None, Some(1.0)), 0.5);
        assert_eq!(dilution_score(Some(0.0), Some(1.0)), 0.5);
        assert_eq!(dilution_score(Some(1.0), Some(0.0)), 0.5);
        assert_eq!(dilution_score(Some(1.0), Some(-1.0)), 0.5);
        assert_eq!(dilution_score(Some(1.0), None), 0.5);
        assert_eq!(dilution_score(Some(7.0), Some(10.0)), 1.0);
        assert_eq!(dilution_score(Some(3.0), Some(10.0)), 0.3);
        assert!(approx(dilution_score(Some(5.0), Some(10.0)), 0.65));
        assert_eq!(dilution_score(Some(-5.0), Some(10.0)), 0.3);
    }

    #[test]
    fn momentum_neutral_without_data() {
        let rec = AssetRecord::default();
        assert!(approx(
            score_momentum_narr(&rec, 0.6),
            20.0 * (0.4 * 0.5 + 0.3 * 0.5 + 0.3 * 0.6)
        ));
    }

    #[test]
    fn momentum_saturates() {
        let rec = AssetRecord {
            price_change_percentage_30d_in_currency: Some(500.0),
            price_change_percentage_7d_in_currency: Some(500.0),
            ..Default::default()
        };
        assert!(approx(score_momentum_narr(&rec, 1.0), 20.0));
    }

    #[test]
    fn personal_without_fundamentals_is_five() {
        let rec = AssetRecord {
            id: "x".into(),
            ..Default::default()
        };
        assert_eq!(score_personal_on(&rec, today()), 5.0);
    }

    #[test]
    fn personal_malformed_genesis_counts_as_age_zero() {
        let rec = AssetRecord {
            fundamentals: Fundamentals {
                genesis_date: Some("someday".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(approx(
            score_personal_on(&rec, today()),
            10.0 * (0.35 * 0.5 + 0.25 * 0.5 + 0.25 * 0.5)
        ));
    }

    #[test]
    fn personal_missing_genesis_with_other_data() {
        let rec = AssetRecord {
            fundamentals: Fundamentals {
                developer_score: Some(100.0),
                ..Default::default()
            },
            ..Default::default()
        };
        // 10 * (0.35 * 1 + 0.25 * 0.5 + 0.25 * 0.5 + 0.15 * 0)
        assert!(approx(score_personal_on(&rec, today()), 6.0));
    }

    #[test]
    fn personal_caps_age_at_ten_years() {
        let rec = AssetRecord {
            fundamentals: Fundamentals {
                developer_score: Some(100.0),
                community_score: Some(100.0),
                sentiment_votes_up_percentage: Some(95.0),
                genesis_date: Some("1990-01-01".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(approx(score_personal_on(&rec, today()), 10.0));
    }

    #[test]
    fn personal_young_project() {
        let rec = AssetRecord {
            fundamentals: Fundamentals {
                developer_score: Some(0.0),
                community_score: Some(0.0),
                sentiment_votes_up_percentage: Some(50.0),
                genesis_date: Some("2024-06-01".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(score_personal_on(&rec, today()), 0.0);
    }

    #[test]
    fn sub_scores_stay_bounded_for_adversarial_inputs() {
        let cases = [
            AssetRecord {
                market_cap_rank: Some(0.0),
                market_cap: Some(-1e9),
                total_volume: Some(1e15),
                current_price: Some(-3.0),
                ath_change_percentage: Some(50.0),
                circulating_supply: Some(0.0),
                max_supply: Some(0.0),
                fully_diluted_valuation: Some(0.0),
                price_change_percentage_7d_in_currency: Some(-1e6),
                price_change_percentage_30d_in_currency: Some(1e6),
                ..Default::default()
            },
            AssetRecord {
                market_cap_rank: Some(10_000.0),
                market_cap: Some(f64::INFINITY),
                total_volume: Some(f64::INFINITY),
                ath_change_percentage: Some(-1e9),
                circulating_supply: Some(-5.0),
                max_supply: Some(f64::INFINITY),
                fully_diluted_valuation: Some(f64::INFINITY),
                ..Default::default()
            },
            AssetRecord {
                market_cap_rank: Some(-7.0),
                market_cap: Some(1.0),
                total_volume: Some(-1.0),
                circulating_supply: Some(1e30),
                max_supply: Some(1.0),
                fully_diluted_valuation: Some(1e-30),
                fundamentals: Fundamentals {
                    developer_score: Some(-500.0),
                    community_score: Some(1e9),
                    sentiment_votes_up_percentage: Some(f64::NAN),
                    genesis_date: Some("9999-99-99".into()),
                    ..Default::default()
                },
                ..Default::default()
            },
            AssetRecord::default(),
        ];

        for rec in &cases {
            let m = score_market(rec);
            let t = score_tokenomics(rec, 0.6);
            let mo = score_momentum_narr(rec, 0.6);
            let p = score_personal_on(rec, today());
            assert!((0.0..=MARKET_MAX).contains(&m), "market {m}");
            assert!((0.0..=TOKENOMICS_MAX).contains(&t), "tokenomics {t}");
            assert!((0.0..=MOMENTUM_MAX).contains(&mo), "momentum {mo}");
            assert!((0.0..=PERSONAL_MAX).contains(&p), "personal {p}");
        }
    }
}
