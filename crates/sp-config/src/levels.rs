//! Level validation and auto-gain: sum the linear gain contributions
//! reaching each output channel, and either warn or, in basic mode, inject
//! headroom automatically.

use sp_core::db_to_gain;
use sp_dsp::{Filter, Gain};

/// Linear gain contribution of a single filter chain, as used for level
/// bookkeeping: only `Gain` filters count (everything else is assumed
/// unity-ish for this purpose, matching the reference implementation's
/// `getFilterGainSum`, which only sums explicit gain filters).
pub fn filter_gain_sum(filters: &[Filter]) -> f64 {
    filters
        .iter()
        .map(|f| match f {
            Filter::Gain(g) => g.multiplier_no_invert(),
            _ => 1.0,
        })
        .product()
}

/// If `expected_level` exceeds unity, either inject a negative-gain filter
/// at the head of `filters` (auto-gain enabled) to pull it to ~0.1 dB below
/// unity, or leave it untouched and return `false` so the caller can log a
/// clipping warning.
pub fn apply_auto_gain(filters: &mut Vec<Filter>, expected_level: f64, auto_gain: bool) -> bool {
    if expected_level <= 1.0 {
        return true;
    }
    if !auto_gain {
        return false;
    }
    let target_level_db = -0.1;
    let needed_gain_db = target_level_db - 20.0 * expected_level.log10();

    if let Some(Filter::Gain(g)) = filters.first_mut() {
        if g.multiplier() < 0.0 && g.multiplier_no_invert() == 1.0 {
            *g = Gain::new(needed_gain_db, true);
            return true;
        }
    }
    filters.insert(0, Filter::Gain(Gain::new(needed_gain_db, false)));
    true
}

pub fn expected_level(route_gain_sums: &[f64], output_own_gain: f64) -> f64 {
    let routed: f64 = route_gain_sums.iter().map(|g| g.abs()).sum();
    routed * output_own_gain.abs().max(db_to_gain(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sp_dsp::Gain as DspGain;

    #[test]
    fn auto_gain_pulls_overshoot_below_unity() {
        let mut filters = vec![Filter::Gain(DspGain::new(0.0, false))];
        let applied = apply_auto_gain(&mut filters, 2.0, true);
        assert!(applied);
        assert_eq!(filters.len(), 2);
    }

    #[test]
    fn auto_gain_disabled_returns_false_without_mutating() {
        let mut filters: Vec<Filter> = vec![];
        let applied = apply_auto_gain(&mut filters, 2.0, false);
        assert!(!applied);
        assert!(filters.is_empty());
    }

    #[test]
    fn no_overshoot_is_a_no_op() {
        let mut filters: Vec<Filter> = vec![];
        assert!(apply_auto_gain(&mut filters, 0.8, true));
        assert!(filters.is_empty());
    }
}
