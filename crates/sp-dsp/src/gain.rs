//! Static gain / polarity-invert filter.

use sp_core::{db_to_gain, Sample};

#[derive(Debug, Clone, Copy)]
pub struct Gain {
    multiplier: f64,
}

impl Gain {
    pub fn new(gain_db: f64, invert: bool) -> Gain {
        let multiplier = db_to_gain(gain_db) * if invert { -1.0 } else { 1.0 };
        Gain { multiplier }
    }

    /// A gain filter with no attenuation/boost and no polarity flip has no
    /// effect; the configuration compiler drops these at build time rather
    /// than carry a no-op node in the hot chain.
    pub fn is_no_op(gain_db: f64, invert: bool) -> bool {
        gain_db == 0.0 && !invert
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// The gain magnitude with any polarity invert stripped out — used by
    /// level validation, which sums expected signal level and doesn't care
    /// about sign.
    pub fn multiplier_no_invert(&self) -> f64 {
        self.multiplier.abs()
    }

    #[inline(always)]
    pub fn process(&self, input: Sample) -> Sample {
        input * self.multiplier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_db_and_invert_formula() {
        let g = Gain::new(6.0, true);
        let expected = 1.0_f64 * 10.0_f64.powf(6.0 / 20.0) * -1.0;
        assert!((g.process(1.0) - expected).abs() < 1e-12);
    }

    #[test]
    fn zero_gain_no_invert_is_a_no_op_candidate() {
        assert!(Gain::is_no_op(0.0, false));
        assert!(!Gain::is_no_op(0.0, true));
        assert!(!Gain::is_no_op(1.0, false));
    }
}
