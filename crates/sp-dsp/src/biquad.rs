//! Biquad filter: transposed direct-form II section.
//!
//! TDF-II is the numerically preferred form for floating point: it has the
//! smallest number of state variables (two) and the best roundoff behavior
//! of the canonical biquad realizations.

use sp_core::Sample;
use std::f64::consts::PI;

/// Normalized biquad coefficients. `a0` is always 1 after construction; every
/// constructor here pre-divides by the analog `a0` so callers never see it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoeffs {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl BiquadCoeffs {
    /// Unity-gain passthrough section.
    pub const IDENTITY: BiquadCoeffs = BiquadCoeffs {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    fn normalize(b0: f64, b1: f64, b2: f64, a0: f64, a1: f64, a2: f64) -> BiquadCoeffs {
        BiquadCoeffs {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }

    /// Second-order lowpass (RBJ cookbook), given Q.
    pub fn lowpass(freq: f64, q: f64, sample_rate: f64) -> BiquadCoeffs {
        let w0 = omega(freq, sample_rate);
        let (sn, cs) = w0.sin_cos();
        let alpha = alpha(sn, q);

        let b0 = (1.0 - cs) / 2.0;
        let b1 = 1.0 - cs;
        let b2 = b0;
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cs;
        let a2 = 1.0 - alpha;
        Self::normalize(b0, b1, b2, a0, a1, a2)
    }

    /// First-order lowpass, used for odd-order crossover cascades.
    pub fn lowpass_first_order(freq: f64, sample_rate: f64) -> BiquadCoeffs {
        let w0 = omega(freq, sample_rate);
        let (sn, cs) = w0.sin_cos();
        let b0 = sn;
        let b1 = sn;
        let b2 = 0.0;
        let a0 = cs + sn + 1.0;
        let a1 = sn - cs - 1.0;
        let a2 = 0.0;
        Self::normalize(b0, b1, b2, a0, a1, a2)
    }

    /// Second-order highpass (RBJ cookbook), given Q.
    pub fn highpass(freq: f64, q: f64, sample_rate: f64) -> BiquadCoeffs {
        let w0 = omega(freq, sample_rate);
        let (sn, cs) = w0.sin_cos();
        let alpha = alpha(sn, q);

        let b0 = (1.0 + cs) / 2.0;
        let b1 = -(1.0 + cs);
        let b2 = b0;
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cs;
        let a2 = 1.0 - alpha;
        Self::normalize(b0, b1, b2, a0, a1, a2)
    }

    /// First-order highpass, used for odd-order crossover cascades.
    pub fn highpass_first_order(freq: f64, sample_rate: f64) -> BiquadCoeffs {
        let w0 = omega(freq, sample_rate);
        let (sn, cs) = w0.sin_cos();
        let b0 = cs + 1.0;
        let b1 = -(cs + 1.0);
        let b2 = 0.0;
        let a0 = cs + sn + 1.0;
        let a1 = sn - cs - 1.0;
        let a2 = 0.0;
        Self::normalize(b0, b1, b2, a0, a1, a2)
    }

    /// Low shelf, gain in dB.
    pub fn low_shelf(freq: f64, gain_db: f64, q: f64, sample_rate: f64) -> BiquadCoeffs {
        let w0 = omega(freq, sample_rate);
        let (sn, cs) = w0.sin_cos();
        let a = 10.0_f64.powf(gain_db / 40.0);
        let alpha = alpha(sn, q);
        let two_sqrt_a_alpha = 2.0 * a.sqrt() * alpha;

        let b0 = a * ((a + 1.0) - (a - 1.0) * cs + two_sqrt_a_alpha);
        let b1 = 2.0 * a * ((a - 1.0) - (a + 1.0) * cs);
        let b2 = a * ((a + 1.0) - (a - 1.0) * cs - two_sqrt_a_alpha);
        let a0 = (a + 1.0) + (a - 1.0) * cs + two_sqrt_a_alpha;
        let a1 = -2.0 * ((a - 1.0) + (a + 1.0) * cs);
        let a2 = (a + 1.0) + (a - 1.0) * cs - two_sqrt_a_alpha;
        Self::normalize(b0, b1, b2, a0, a1, a2)
    }

    /// High shelf, gain in dB.
    pub fn high_shelf(freq: f64, gain_db: f64, q: f64, sample_rate: f64) -> BiquadCoeffs {
        let w0 = omega(freq, sample_rate);
        let (sn, cs) = w0.sin_cos();
        let a = 10.0_f64.powf(gain_db / 40.0);
        let alpha = alpha(sn, q);
        let two_sqrt_a_alpha = 2.0 * a.sqrt() * alpha;

        let b0 = a * ((a + 1.0) + (a - 1.0) * cs + two_sqrt_a_alpha);
        let b1 = -2.0 * a * ((a - 1.0) + (a + 1.0) * cs);
        let b2 = a * ((a + 1.0) + (a - 1.0) * cs - two_sqrt_a_alpha);
        let a0 = (a + 1.0) - (a - 1.0) * cs + two_sqrt_a_alpha;
        let a1 = 2.0 * ((a - 1.0) - (a + 1.0) * cs);
        let a2 = (a + 1.0) - (a - 1.0) * cs - two_sqrt_a_alpha;
        Self::normalize(b0, b1, b2, a0, a1, a2)
    }

    /// Parametric peaking EQ, gain in dB.
    pub fn peaking(freq: f64, gain_db: f64, q: f64, sample_rate: f64) -> BiquadCoeffs {
        let w0 = omega(freq, sample_rate);
        let (sn, cs) = w0.sin_cos();
        let a = 10.0_f64.powf(gain_db / 40.0);
        let alpha = alpha(sn, q);

        let b0 = 1.0 + alpha * a;
        let b1 = -2.0 * cs;
        let b2 = 1.0 - alpha * a;
        let a0 = 1.0 + alpha / a;
        let a1 = -2.0 * cs;
        let a2 = 1.0 - alpha / a;
        Self::normalize(b0, b1, b2, a0, a1, a2)
    }

    /// Constant-skirt bandpass, bandwidth in octaves, overall gain in dB.
    pub fn band_pass(freq: f64, bandwidth_oct: f64, gain_db: f64, sample_rate: f64) -> BiquadCoeffs {
        let w0 = omega(freq, sample_rate);
        let sn = w0.sin();
        let alpha = sn * (std::f64::consts::LN_2 / 2.0 * bandwidth_oct * w0 / sn).sinh();
        let a = 10.0_f64.powf(gain_db / 20.0);

        let b0 = a * alpha;
        let b1 = 0.0;
        let b2 = -a * alpha;
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * w0.cos();
        let a2 = 1.0 - alpha;
        Self::normalize(b0, b1, b2, a0, a1, a2)
    }

    /// Notch, bandwidth in octaves, overall gain in dB.
    pub fn notch(freq: f64, bandwidth_oct: f64, gain_db: f64, sample_rate: f64) -> BiquadCoeffs {
        let w0 = omega(freq, sample_rate);
        let sn = w0.sin();
        let cs = w0.cos();
        let alpha = sn * (std::f64::consts::LN_2 / 2.0 * bandwidth_oct * w0 / sn).sinh();
        let a = 10.0_f64.powf(gain_db / 20.0);

        let b0 = a;
        let b1 = -2.0 * cs * a;
        let b2 = a;
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cs;
        let a2 = 1.0 - alpha;
        Self::normalize(b0, b1, b2, a0, a1, a2)
    }

    /// Linkwitz-Transform: relocates a driver's natural (F0, Q0) roll-off to
    /// a target (Fp, Qp), pre-warped at the geometric-ish midpoint Fc.
    pub fn linkwitz_transform(f0: f64, q0: f64, fp: f64, qp: f64, sample_rate: f64) -> BiquadCoeffs {
        let fc = (f0 + fp) / 2.0;
        let d0i = (2.0 * PI * f0).powi(2);
        let d1i = (2.0 * PI * f0) / q0;
        let c0i = (2.0 * PI * fp).powi(2);
        let c1i = (2.0 * PI * fp) / qp;
        let gn = (2.0 * PI * fc) / (PI * fc / sample_rate).tan();
        let gn2 = gn * gn;
        let cci = c0i + gn * c1i + gn2;

        BiquadCoeffs {
            b0: (d0i + gn * d1i + gn2) / cci,
            b1: 2.0 * (d0i - gn2) / cci,
            b2: (d0i - gn * d1i + gn2) / cci,
            a1: 2.0 * (c0i - gn2) / cci,
            a2: (c0i - gn * c1i + gn2) / cci,
        }
    }
}

#[inline]
fn omega(freq: f64, sample_rate: f64) -> f64 {
    2.0 * PI * freq / sample_rate
}

#[inline]
fn alpha(sin_w0: f64, q: f64) -> f64 {
    sin_w0 / (2.0 * q)
}

/// One transposed-direct-form-II biquad section: coefficients plus the two
/// state samples z1/z2.
#[derive(Debug, Clone, Copy)]
pub struct Biquad {
    coeffs: BiquadCoeffs,
    z1: f64,
    z2: f64,
}

impl Biquad {
    pub fn new(coeffs: BiquadCoeffs) -> Biquad {
        Biquad { coeffs, z1: 0.0, z2: 0.0 }
    }

    pub fn identity() -> Biquad {
        Biquad::new(BiquadCoeffs::IDENTITY)
    }

    #[inline]
    pub fn coeffs(&self) -> BiquadCoeffs {
        self.coeffs
    }

    pub fn set_coeffs(&mut self, coeffs: BiquadCoeffs) {
        self.coeffs = coeffs;
    }

    #[inline(always)]
    pub fn process(&mut self, input: Sample) -> Sample {
        let c = self.coeffs;
        let output = c.b0 * input + self.z1;
        self.z1 = c.b1 * input - c.a1 * output + self.z2;
        self.z2 = c.b2 * input - c.a2 * output;
        output
    }

    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }

    /// Magnitude response in dB at one frequency, used only for diagnostics
    /// (e.g. validating a PEQ's DC gain in tests). Not on the hot path.
    pub fn magnitude_db(&self, freq: f64, sample_rate: f64) -> f64 {
        let c = self.coeffs;
        let w = omega(freq, sample_rate);
        let phi = 4.0 * (w / 2.0).sin().powi(2);
        let num = (c.b0 + c.b1 + c.b2).powi(2)
            + (c.b0 * c.b2 * phi - (c.b1 * (c.b0 + c.b2) + 4.0 * c.b0 * c.b2)) * phi;
        let den = (1.0 + c.a1 + c.a2).powi(2)
            + (c.a2 * phi - (c.a1 * (1.0 + c.a2) + 4.0 * c.a2)) * phi;
        10.0 * num.log10() - 10.0 * den.log10()
    }
}
