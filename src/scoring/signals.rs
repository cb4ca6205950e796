// =============================================================================
// Placeholder Signals — swappable slots for not-yet-modelled inputs
// =============================================================================
//
// Three inputs have no real data source yet: supply inflation, narrative
// strength and whale/derivatives flow. Each is a `Signal` held by the
// `HolderScorer`, so a real model can replace a constant without any change
// to the sub-score arithmetic or the aggregator.
// =============================================================================

use std::fmt;

use crate::types::AssetRecord;

/// Default inflation component of the tokenomics sub-score, in [0, 1].
pub const DEFAULT_INFLATION: f64 = 0.6;
/// Default narrative component of the momentum sub-score, in [0, 1].
pub const DEFAULT_NARRATIVE: f64 = 0.6;
/// Default whales/derivatives sub-score, in [0, 20].
pub const DEFAULT_WHALES_DERIV: f64 = 10.0;

/// A per-asset input that the scorer reads through a named slot.
pub trait Signal: Send + Sync {
    fn name(&self) -> &str;

    /// Raw value for `record`. The scorer clamps it into the slot's range.
    fn value(&self, record: &AssetRecord) -> f64;
}

impl fmt::Debug for dyn Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signal({})", self.name())
    }
}

/// A signal that returns the same value for every asset.
#[derive(Debug, Clone)]
pub struct ConstantSignal {
    name: String,
    value: f64,
}

impl ConstantSignal {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn inflation() -> Self {
        Self::new("inflation", DEFAULT_INFLATION)
    }

    pub fn narrative() -> Self {
        Self::new("narrative", DEFAULT_NARRATIVE)
    }

    pub fn whales_deriv() -> Self {
        Self::new("whales_deriv", DEFAULT_WHALES_DERIV)
    }
}

impl Signal for ConstantSignal {
    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self, _record: &AssetRecord) -> f64 {
        self.value
    }
}

/// Clamp a slot value into `[lo, hi]`; non-finite values fall back to
/// `neutral`.
pub fn bounded(value: f64, lo: f64, hi: f64, neutral: f64) -> f64 {
    if value.is_finite() {
        value.clamp(lo, hi)
    } else {
        neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_ignore_record() {
        let rec = AssetRecord {
            id: "x".into(),
            market_cap: Some(5.0),
            ..Default::default()
        };
        assert_eq!(ConstantSignal::inflation().value(&rec), 0.6);
        assert_eq!(ConstantSignal::narrative().value(&AssetRecord::default()), 0.6);
        assert_eq!(ConstantSignal::whales_deriv().value(&rec), 10.0);
        assert_eq!(ConstantSignal::whales_deriv().name(), "whales_deriv");
    }

    #[test]
    fn bounded_clamps_and_replaces_nan() {
        assert_eq!(bounded(1.5, 0.0, 1.0, 0.5), 1.0);
        assert_eq!(bounded(-3.0, 0.0, 20.0, 10.0), 0.0);
        assert_eq!(bounded(f64::NAN, 0.0, 1.0, 0.6), 0.6);
        assert_eq!(bounded(f64::INFINITY, 0.0, 1.0, 0.6), 0.6);
        assert_eq!(bounded(0.3, 0.0, 1.0, 0.6), 0.3);
    }
}
