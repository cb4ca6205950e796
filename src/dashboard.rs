// =============================================================================
// Dashboard Views — table, detail and clock payloads
// =============================================================================
//
// Pure projections of a `ScoreTable` into the shapes the dashboard renders.
// Nothing here touches shared state, so every view is unit-testable with a
// hand-built table.
// =============================================================================

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::Serialize;

use crate::pipeline::ScoreTable;
use crate::scoring::{filter_ranked, SCORE_RANGES};
use crate::types::{Fundamentals, ScoredAsset};

const CLOCK_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// =============================================================================
// Table
// =============================================================================

/// Emphasis for the best rows of the filtered table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Highlight {
    /// First place.
    Leader,
    /// Second and third place.
    Podium,
}

impl Highlight {
    fn for_position(position: usize) -> Option<Self> {
        match position {
            1 => Some(Self::Leader),
            2 | 3 => Some(Self::Podium),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TableRow {
    /// 1-based position after filtering and sorting.
    pub position: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<Highlight>,
    pub market_cap_rank: Option<f64>,
    pub symbol: String,
    pub name: String,
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub total_volume: Option<f64>,
    pub score_market: f64,
    pub score_tokenomics: f64,
    pub score_momentum_narr: f64,
    pub score_whales_deriv: f64,
    pub score_personal: f64,
    pub holder_score_100: f64,
}

impl TableRow {
    fn new(position: usize, asset: &ScoredAsset) -> Self {
        let r = asset.record();
        let s = asset.scores();
        Self {
            position,
            highlight: Highlight::for_position(position),
            market_cap_rank: r.market_cap_rank,
            symbol: r.symbol.clone(),
            name: r.name.clone(),
            current_price: r.current_price,
            market_cap: r.market_cap,
            total_volume: r.total_volume,
            score_market: s.score_market,
            score_tokenomics: s.score_tokenomics,
            score_momentum_narr: s.score_momentum_narr,
            score_whales_deriv: s.score_whales_deriv,
            score_personal: s.score_personal,
            holder_score_100: asset.holder_score_100(),
        }
    }
}

/// Assets at or above a threshold, best first.
#[derive(Debug, Clone, Serialize)]
pub struct TableView {
    pub min_score: f64,
    /// Rows passing the threshold.
    pub passing: usize,
    /// Rows scored in total.
    pub analysed: usize,
    pub rows: Vec<TableRow>,
}

pub fn table_view(table: &ScoreTable, min_score: f64) -> TableView {
    let ranked = filter_ranked(&table.assets, min_score);
    let rows: Vec<TableRow> = ranked
        .iter()
        .enumerate()
        .map(|(i, a)| TableRow::new(i + 1, a))
        .collect();

    TableView {
        min_score,
        passing: rows.len(),
        analysed: table.assets.len(),
        rows,
    }
}

// =============================================================================
// Detail
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ComponentScore {
    pub key: &'static str,
    pub label: &'static str,
    pub score: f64,
    pub max: f64,
}

/// Everything the detail card shows for a single asset.
#[derive(Debug, Clone, Serialize)]
pub struct AssetDetail {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub holder_score_100: f64,
    pub current_price: Option<f64>,
    pub market_cap_rank: Option<f64>,
    pub market_cap: Option<f64>,
    pub total_volume: Option<f64>,
    pub breakdown: Vec<ComponentScore>,
    pub fundamentals: Fundamentals,
}

pub fn asset_detail(asset: &ScoredAsset) -> AssetDetail {
    let r = asset.record();
    let s = asset.scores();
    let values = [
        s.score_market,
        s.score_tokenomics,
        s.score_momentum_narr,
        s.score_whales_deriv,
        s.score_personal,
    ];

    let breakdown = SCORE_RANGES
        .iter()
        .zip(values)
        .map(|(range, score)| ComponentScore {
            key: range.key,
            label: range.label,
            score,
            max: range.max,
        })
        .collect();

    AssetDetail {
        id: r.id.clone(),
        symbol: r.symbol.to_uppercase(),
        name: r.name.clone(),
        holder_score_100: asset.holder_score_100(),
        current_price: r.current_price,
        market_cap_rank: r.market_cap_rank,
        market_cap: r.market_cap,
        total_volume: r.total_volume,
        breakdown,
        fundamentals: r.fundamentals.clone(),
    }
}

// =============================================================================
// Clock
// =============================================================================

/// Current and data timestamps in UTC and in the display offset.
#[derive(Debug, Clone, Serialize)]
pub struct ClockView {
    pub utc_offset_hours: i32,
    pub now_utc: String,
    pub now_local: String,
    pub data_updated_utc: String,
    pub data_updated_local: String,
}

/// Build the clock header. Without a data timestamp the current time is
/// shown for both. Offsets outside ±23 h fall back to UTC.
pub fn clock_view(
    now: DateTime<Utc>,
    data_updated: Option<DateTime<Utc>>,
    utc_offset_hours: i32,
) -> ClockView {
    let offset = utc_offset_hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .filter(|_| utc_offset_hours.abs() < 24);
    let (offset, utc_offset_hours) = match offset {
        Some(o) => (o, utc_offset_hours),
        None => (Utc.fix(), 0),
    };

    let data = data_updated.unwrap_or(now);
    ClockView {
        utc_offset_hours,
        now_utc: now.format(CLOCK_FORMAT).to_string(),
        now_local: now.with_timezone(&offset).format(CLOCK_FORMAT).to_string(),
        data_updated_utc: data.format(CLOCK_FORMAT).to_string(),
        data_updated_local: data.with_timezone(&offset).format(CLOCK_FORMAT).to_string(),
    }
}
