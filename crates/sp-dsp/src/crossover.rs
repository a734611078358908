//! Crossover Q tables and the multi-section biquad cascade built from them.

use crate::biquad::{Biquad, BiquadCoeffs};
use sp_core::Sample;

/// Named crossover filter families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CrossoverFamily {
    Butterworth,
    #[serde(rename = "LINKWITZ_RILEY")]
    LinkwitzRiley,
    Bessel,
    Custom,
}

/// A negative Q is the sentinel for "this section is first order".
const FIRST_ORDER: f64 = -1.0;

/// Q-value tables for each named family and order. These must match the
/// reference tables literally; they come directly from the classic
/// pole-placement tables for analog Butterworth/Bessel prototypes and the
/// cascaded-Butterworth construction of Linkwitz-Riley filters.
pub fn q_table(family: CrossoverFamily, order: u8) -> Result<Vec<f64>, CrossoverError> {
    use CrossoverFamily::*;
    let table: &[f64] = match (family, order) {
        (Butterworth, 1) => &[FIRST_ORDER],
        (Butterworth, 2) => &[std::f64::consts::FRAC_1_SQRT_2],
        (Butterworth, 3) => &[FIRST_ORDER, 1.0],
        (Butterworth, 4) => &[1.0 / 1.8478, 1.0 / 0.7654],
        (Butterworth, 5) => &[FIRST_ORDER, 1.0 / 0.6180, 1.0 / 1.6180],
        (Butterworth, 6) => &[1.0 / 1.9319, std::f64::consts::FRAC_1_SQRT_2, 1.0 / 0.5176],
        (Butterworth, 7) => &[FIRST_ORDER, 1.0 / 1.8019, 1.0 / 1.2470, 1.0 / 0.4450],
        (Butterworth, 8) => &[1.0 / 1.96161, 1.0 / 1.6629, 1.0 / 1.1111, 1.0 / 0.3902],

        (LinkwitzRiley, 2) => &[FIRST_ORDER, FIRST_ORDER],
        (LinkwitzRiley, 4) => &[std::f64::consts::FRAC_1_SQRT_2, std::f64::consts::FRAC_1_SQRT_2],
        (LinkwitzRiley, 8) => &[1.0 / 1.8478, 1.0 / 0.7654, 1.0 / 1.8478, 1.0 / 0.7654],

        (Bessel, 2) => &[0.57735026919],
        (Bessel, 3) => &[FIRST_ORDER, 0.691046625825],
        (Bessel, 4) => &[0.805538281842, 0.521934581669],
        (Bessel, 5) => &[FIRST_ORDER, 0.916477373948, 0.563535620851],
        (Bessel, 6) => &[1.02331395383, 0.611194546878, 0.510317824749],
        (Bessel, 7) => &[FIRST_ORDER, 1.12625754198, 0.660821389297, 0.5323556979],
        (Bessel, 8) => &[1.22566942541, 0.710852074442, 0.559609164796, 0.505991069397],

        (Custom, _) => return Err(CrossoverError::CustomNeedsExplicitQ),
        _ => return Err(CrossoverError::UnsupportedOrder { family, order }),
    };
    Ok(table.to_vec())
}

/// Validate a caller-supplied custom Q list against a requested order: a
/// negative Q contributes one pole (first order), a non-negative Q
/// contributes two (second order); the sum must equal `order` exactly.
pub fn validate_custom_q(q_values: &[f64], order: u8) -> Result<(), CrossoverError> {
    let total: u32 = q_values
        .iter()
        .map(|q| if *q < 0.0 { 1 } else { 2 })
        .sum();
    if total as u8 == order {
        Ok(())
    } else {
        Err(CrossoverError::CustomOrderMismatch {
            expected: order,
            got: total,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CrossoverError {
    #[error("crossover type {family:?} has no order {order}")]
    UnsupportedOrder { family: CrossoverFamily, order: u8 },
    #[error("custom crossover requires an explicit Q list")]
    CustomNeedsExplicitQ,
    #[error("custom crossover Q list implies order {got}, requested order is {expected}")]
    CustomOrderMismatch { expected: u8, got: u32 },
}

/// An ordered sequence of biquad sections processed in series: the building
/// block behind every crossover, shelf stack, PEQ bank and custom biquad
/// list that a route or output filter chain can carry.
#[derive(Debug, Clone, Default)]
pub struct BiquadCascade {
    sections: Vec<Biquad>,
}

impl BiquadCascade {
    pub fn new() -> BiquadCascade {
        BiquadCascade { sections: Vec::new() }
    }

    pub fn push(&mut self, coeffs: BiquadCoeffs) {
        self.sections.push(Biquad::new(coeffs));
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Apply the Q-list for a lowpass crossover: each negative Q becomes a
    /// first-order section, each non-negative Q a second-order section
    /// driven by that Q, multiplied by `1 + q_offset` per spec.md §4.2.
    pub fn add_lowpass_crossover(&mut self, freq: f64, q_values: &[f64], q_offset: f64, sample_rate: f64) {
        let multiplier = 1.0 + q_offset;
        for &q in q_values {
            if q < 0.0 {
                self.push(BiquadCoeffs::lowpass_first_order(freq, sample_rate));
            } else {
                self.push(BiquadCoeffs::lowpass(freq, q * multiplier, sample_rate));
            }
        }
    }

    pub fn add_highpass_crossover(&mut self, freq: f64, q_values: &[f64], q_offset: f64, sample_rate: f64) {
        let multiplier = 1.0 + q_offset;
        for &q in q_values {
            if q < 0.0 {
                self.push(BiquadCoeffs::highpass_first_order(freq, sample_rate));
            } else {
                self.push(BiquadCoeffs::highpass(freq, q * multiplier, sample_rate));
            }
        }
    }

    #[inline(always)]
    pub fn process(&mut self, input: Sample) -> Sample {
        let mut x = input;
        for section in &mut self.sections {
            x = section.process(x);
        }
        x
    }

    pub fn reset(&mut self) {
        for section in &mut self.sections {
            section.reset();
        }
    }

    /// Summed magnitude response in dB across all sections, for diagnostics.
    pub fn magnitude_db(&self, freq: f64, sample_rate: f64) -> f64 {
        self.sections
            .iter()
            .map(|s| s.magnitude_db(freq, sample_rate))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn butterworth_order2_has_one_section_with_q_0_707() {
        let q = q_table(CrossoverFamily::Butterworth, 2).unwrap();
        assert_eq!(q.len(), 1);
        assert_abs_diff_eq!(q[0], 0.70710678, epsilon = 1e-6);
    }

    #[test]
    fn linkwitz_riley_rejects_order_3() {
        assert!(q_table(CrossoverFamily::LinkwitzRiley, 3).is_err());
    }

    #[test]
    fn custom_order_validation() {
        // one first-order + one second-order => total order 3
        assert!(validate_custom_q(&[-1.0, 0.707], 3).is_ok());
        assert!(validate_custom_q(&[-1.0, 0.707], 4).is_err());
    }

    #[test]
    fn odd_order_crossover_mixes_first_and_second_order_sections() {
        let q = q_table(CrossoverFamily::Butterworth, 3).unwrap();
        let mut cascade = BiquadCascade::new();
        cascade.add_lowpass_crossover(80.0, &q, 0.0, 48000.0);
        assert_eq!(cascade.len(), 2);
    }

    #[test]
    fn reset_then_zero_input_yields_zero() {
        let q = q_table(CrossoverFamily::Bessel, 4).unwrap();
        let mut cascade = BiquadCascade::new();
        cascade.add_lowpass_crossover(80.0, &q, 0.0, 48000.0);
        cascade.process(1.0);
        cascade.process(0.3);
        cascade.reset();
        for _ in 0..32 {
            assert_eq!(cascade.process(0.0), 0.0);
        }
    }
}
