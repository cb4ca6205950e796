// =============================================================================
// Aggregator — combine sub-scores into the 0–100 holder score
// =============================================================================
//
// `HolderScorer` owns the three placeholder slots and applies every
// sub-score function to each record in turn. Scoring is a plain map over
// the input sequence: each asset reads only its own fields, so the output
// does not depend on evaluation order.
// =============================================================================

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::debug;

use super::components::{
    score_market, score_momentum_narr, score_personal_on, score_tokenomics, WHALES_DERIV_MAX,
};
use super::signals::{
    bounded, ConstantSignal, Signal, DEFAULT_INFLATION, DEFAULT_NARRATIVE, DEFAULT_WHALES_DERIV,
};
use crate::scoring::classifier::classify;
use crate::types::{AssetRecord, ScoredAsset, SubScores};

/// Rank used to order assets that have none.
const UNRANKED: f64 = f64::MAX;

/// Computes holder scores with a configurable set of placeholder signals.
#[derive(Debug, Clone)]
pub struct HolderScorer {
    inflation: Arc<dyn Signal>,
    narrative: Arc<dyn Signal>,
    whales_deriv: Arc<dyn Signal>,
}

impl Default for HolderScorer {
    fn default() -> Self {
        Self {
            inflation: Arc::new(ConstantSignal::inflation()),
            narrative: Arc::new(ConstantSignal::narrative()),
            whales_deriv: Arc::new(ConstantSignal::whales_deriv()),
        }
    }
}

impl HolderScorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the tokenomics inflation slot (expects values in [0, 1]).
    pub fn with_inflation(mut self, signal: impl Signal + 'static) -> Self {
        self.inflation = Arc::new(signal);
        self
    }

    /// Replace the momentum narrative slot (expects values in [0, 1]).
    pub fn with_narrative(mut self, signal: impl Signal + 'static) -> Self {
        self.narrative = Arc::new(signal);
        self
    }

    /// Replace the whales/derivatives slot (expects values in [0, 20]).
    pub fn with_whales_deriv(mut self, signal: impl Signal + 'static) -> Self {
        self.whales_deriv = Arc::new(signal);
        self
    }

    /// Names of the active slots, in the order inflation, narrative, whales.
    pub fn slot_names(&self) -> [String; 3] {
        [
            self.inflation.name().to_string(),
            self.narrative.name().to_string(),
            self.whales_deriv.name().to_string(),
        ]
    }

    /// Compute the five sub-scores for a single record as of `today`.
    pub fn sub_scores_on(&self, record: &AssetRecord, today: NaiveDate) -> SubScores {
        let inflation = bounded(self.inflation.value(record), 0.0, 1.0, DEFAULT_INFLATION);
        let narrative = bounded(self.narrative.value(record), 0.0, 1.0, DEFAULT_NARRATIVE);
        let whales = bounded(
            self.whales_deriv.value(record),
            0.0,
            WHALES_DERIV_MAX,
            DEFAULT_WHALES_DERIV,
        );

        SubScores {
            score_market: score_market(record),
            score_tokenomics: score_tokenomics(record, inflation),
            score_momentum_narr: score_momentum_narr(record, narrative),
            score_whales_deriv: whales,
            score_personal: score_personal_on(record, today),
        }
    }

    pub fn score_on(&self, record: AssetRecord, today: NaiveDate) -> ScoredAsset {
        let scores = self.sub_scores_on(&record, today);
        ScoredAsset::new(record, scores)
    }

    /// Score every record, preserving input order. The reference date is
    /// read once so all assets in a batch share it.
    pub fn score_all(&self, records: Vec<AssetRecord>) -> Vec<ScoredAsset> {
        let today = Utc::now().date_naive();
        self.score_all_on(records, today)
    }

    pub fn score_all_on(&self, records: Vec<AssetRecord>, today: NaiveDate) -> Vec<ScoredAsset> {
        records
            .into_iter()
            .map(|r| self.score_on(r, today))
            .collect()
    }
}

/// Score `records` with the default placeholder signals.
pub fn compute_scores(records: &[AssetRecord]) -> Vec<ScoredAsset> {
    HolderScorer::default().score_all(records.to_vec())
}

/// Drop excluded assets, order the rest by market-cap rank (unranked last)
/// and keep the first `top_n`. Returns the universe and the number of
/// excluded assets.
pub fn select_universe(records: Vec<AssetRecord>, top_n: usize) -> (Vec<AssetRecord>, usize) {
    let total = records.len();
    let mut kept: Vec<AssetRecord> = records
        .into_iter()
        .filter(|r| match classify(r) {
            Some(reason) => {
                debug!(symbol = %r.symbol, %reason, "excluded from universe");
                false
            }
            None => true,
        })
        .collect();
    let excluded = total - kept.len();

    kept.sort_by(|a, b| {
        let ra = a.market_cap_rank.unwrap_or(UNRANKED);
        let rb = b.market_cap_rank.unwrap_or(UNRANKED);
        ra.total_cmp(&rb)
    });
    kept.truncate(top_n);
    (kept, excluded)
}

/// Sort by holder score, highest first. Ties keep their incoming order.
pub fn rank_by_score(assets: &mut [ScoredAsset]) {
    assets.sort_by(|a, b| b.holder_score_100().total_cmp(&a.holder_score_100()));
}

/// Assets scoring at least `min_score`, highest first.
pub fn filter_ranked(assets: &[ScoredAsset], min_score: f64) -> Vec<ScoredAsset> {
    let mut passing: Vec<ScoredAsset> = assets
        .iter()
        .filter(|a| a.holder_score_100() >= min_score)
        .cloned()
        .collect();
    rank_by_score(&mut passing);
    passing
}
