//! Acoustic cancellation filter: a delay tuned to a standing-wave frequency,
//! summed (by the caller, not internally) with the dry path to cancel a
//! single narrowband resonance.

use crate::delay::{DelayError, DelayLine};
use sp_core::{db_to_gain, Sample};

#[derive(Debug, Clone)]
pub struct Cancellation {
    delay: DelayLine,
    gain: f64,
}

impl Cancellation {
    /// `freq` is the standing-wave frequency to target; the delay period is
    /// one full cycle at that frequency (`1000/freq` ms), and the output is
    /// the negated, gained, delayed signal: the caller sums this with the
    /// original path to produce cancellation at `freq`.
    pub fn new(freq: f64, gain_db: f64, sample_rate: f64) -> Result<Cancellation, DelayError> {
        let period_ms = 1000.0 / freq;
        let delay = DelayLine::from_ms(period_ms, sample_rate)?;
        Ok(Cancellation {
            delay,
            gain: db_to_gain(gain_db),
        })
    }

    #[inline(always)]
    pub fn process(&mut self, input: Sample) -> Sample {
        -self.gain * self.delay.process(input)
    }

    pub fn reset(&mut self) {
        self.delay.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancels_a_tone_at_the_target_frequency() {
        let sample_rate = 48_000.0;
        let freq = 50.0;
        let mut cancel = Cancellation::new(freq, 0.0, sample_rate).unwrap();

        let n = 4800usize;
        let mut dry = vec![0.0; n];
        let mut summed = vec![0.0; n];
        for i in 0..n {
            let t = i as f64 / sample_rate;
            let x = 0.5 * (2.0 * std::f64::consts::PI * freq * t).sin();
            dry[i] = x;
            summed[i] = x + cancel.process(x);
        }

        // Skip the startup transient (one period) before comparing peaks.
        let settle = (sample_rate / freq) as usize + 1;
        let dry_peak = dry[settle..].iter().fold(0.0_f64, |m, &v| m.max(v.abs()));
        let summed_peak = summed[settle..].iter().fold(0.0_f64, |m, &v| m.max(v.abs()));
        assert!(summed_peak <= 0.01 * dry_peak);
    }

    #[test]
    fn does_not_cancel_at_an_unrelated_frequency() {
        let sample_rate = 48_000.0;
        let mut cancel = Cancellation::new(50.0, 0.0, sample_rate).unwrap();
        let freq = 25.0;

        let n = 4800usize;
        let mut dry = vec![0.0; n];
        let mut summed = vec![0.0; n];
        for i in 0..n {
            let t = i as f64 / sample_rate;
            let x = 0.5 * (2.0 * std::f64::consts::PI * freq * t).sin();
            dry[i] = x;
            summed[i] = x + cancel.process(x);
        }
        let settle = (sample_rate / freq) as usize * 2;
        let dry_peak = dry[settle..].iter().fold(0.0_f64, |m, &v| m.max(v.abs()));
        let summed_peak = summed[settle..].iter().fold(0.0_f64, |m, &v| m.max(v.abs()));
        assert!(summed_peak > 0.3 * dry_peak);
    }
}
