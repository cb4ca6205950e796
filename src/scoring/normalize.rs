// =============================================================================
// Normalizer — value-to-unit scaling and asset age
// =============================================================================
//
// Both helpers are total: missing or malformed input resolves to a neutral
// value instead of an error.

use chrono::{NaiveDate, Utc};

/// Neutral output of [`scale`] for missing input or a degenerate range.
pub const NEUTRAL: f64 = 0.5;

const DAYS_PER_YEAR: f64 = 365.25;

/// Linearly map `x` from `[xmin, xmax]` onto `[0, 1]`, clamped.
///
/// Returns exactly [`NEUTRAL`] when `x` is `None`, NaN, or `xmin == xmax`.
pub fn scale(x: Option<f64>, xmin: f64, xmax: f64) -> f64 {
    let v = match x {
        Some(v) if !v.is_nan() => v,
        _ => return NEUTRAL,
    };
    if xmax == xmin {
        return NEUTRAL;
    }
    let t = (v - xmin) / (xmax - xmin);
    if t.is_nan() {
        // inf - inf
        return NEUTRAL;
    }
    t.clamp(0.0, 1.0)
}

/// Years elapsed since `genesis` (`YYYY-MM-DD`) as of today (UTC).
pub fn years_since(genesis: Option<&str>) -> f64 {
    years_since_on(genesis, Utc::now().date_naive())
}

/// Years elapsed between `genesis` and `today`, as `days / 365.25`.
///
/// Returns `0.0` for `None`, empty strings, malformed or impossible dates,
/// and genesis dates in the future.
pub fn years_since_on(genesis: Option<&str>, today: NaiveDate) -> f64 {
    age_years(genesis, today).unwrap_or(0.0)
}

/// Like [`years_since_on`] but distinguishes "no usable date" (`None`) from
/// a genuine age of zero.
pub fn age_years(genesis: Option<&str>, today: NaiveDate) -> Option<f64> {
    let date = genesis.and_then(parse_genesis)?;
    let days = (today - date).num_days() as f64;
    Some((days / DAYS_PER_YEAR).max(0.0))
}

/// Parse the leading `Y-M-D` triple of a dash-separated date string.
fn parse_genesis(s: &str) -> Option<NaiveDate> {
    let mut parts = s.split('-');
    let y: i32 = parts.next()?.trim().parse().ok()?;
    let m: u32 = parts.next()?.trim().parse().ok()?;
    let d: u32 = parts.next()?.trim().parse().ok()?;
    NaiveDate::from_ymd_opt(y, m, d)
}
