// =============================================================================
// Scoring Module
// =============================================================================
//
// The holder-score pipeline. Everything here is pure and synchronous:
// - Normalizer: bounded scaling and asset age
// - Classifier: stablecoin / wrapped exclusion
// - Components: the five bounded sub-scores
// - Signals: named placeholder slots for unmodelled inputs
// - Aggregator: per-asset totals, universe selection and ranking

pub mod aggregator;
pub mod classifier;
pub mod components;
pub mod normalize;
pub mod signals;

pub use aggregator::{compute_scores, filter_ranked, rank_by_score, select_universe, HolderScorer};
pub use classifier::{is_excluded, STABLECOIN_SYMBOLS, WRAPPED_SYMBOLS};

use serde::Serialize;

use components::*;

/// Label and maximum of one sub-score, for UI labelling.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScoreRange {
    pub key: &'static str,
    pub label: &'static str,
    pub max: f64,
}

pub const SCORE_RANGES: [ScoreRange; 5] = [
    ScoreRange {
        key: "score_market",
        label: "Market",
        max: MARKET_MAX,
    },
    ScoreRange {
        key: "score_tokenomics",
        label: "Tokenomics",
        max: TOKENOMICS_MAX,
    },
    ScoreRange {
        key: "score_momentum_narr",
        label: "Momentum",
        max: MOMENTUM_MAX,
    },
    ScoreRange {
        key: "score_whales_deriv",
        label: "Whales & Derivatives",
        max: WHALES_DERIV_MAX,
    },
    ScoreRange {
        key: "score_personal",
        label: "Fundamental",
        max: PERSONAL_MAX,
    },
];

/// One named weight inside a sub-score.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ComponentWeight {
    pub score: &'static str,
    pub input: &'static str,
    pub weight: f64,
}

pub const COMPONENT_WEIGHTS: [ComponentWeight; 13] = [
    ComponentWeight {
        score: "score_market",
        input: "rank",
        weight: W_MARKET_RANK,
    },
    ComponentWeight {
        score: "score_market",
        input: "liquidity",
        weight: W_MARKET_LIQUIDITY,
    },
    ComponentWeight {
        score: "score_market",
        input: "drawdown",
        weight: W_MARKET_DRAWDOWN,
    },
    ComponentWeight {
        score: "score_tokenomics",
        input: "circulation",
        weight: W_TOKENOMICS_CIRCULATION,
    },
    ComponentWeight {
        score: "score_tokenomics",
        input: "dilution",
        weight: W_TOKENOMICS_DILUTION,
    },
    ComponentWeight {
        score: "score_tokenomics",
        input: "inflation",
        weight: W_TOKENOMICS_INFLATION,
    },
    ComponentWeight {
        score: "score_momentum_narr",
        input: "change_30d",
        weight: W_MOMENTUM_30D,
    },
    ComponentWeight {
        score: "score_momentum_narr",
        input: "change_7d",
        weight: W_MOMENTUM_7D,
    },
    ComponentWeight {
        score: "score_momentum_narr",
        input: "narrative",
        weight: W_MOMENTUM_NARRATIVE,
    },
    ComponentWeight {
        score: "score_personal",
        input: "developer",
        weight: W_PERSONAL_DEVELOPER,
    },
    ComponentWeight {
        score: "score_personal",
        input: "community",
        weight: W_PERSONAL_COMMUNITY,
    },
    ComponentWeight {
        score: "score_personal",
        input: "sentiment",
        weight: W_PERSONAL_SENTIMENT,
    },
    ComponentWeight {
        score: "score_personal",
        input: "age",
        weight: W_PERSONAL_AGE,
    },
];
