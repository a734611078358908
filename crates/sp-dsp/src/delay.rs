//! Simple ring-buffer delay line.

use sp_core::{Sample, SPEED_OF_SOUND_M_S};

#[derive(Debug, thiserror::Error)]
pub enum DelayError {
    #[error("delay of 0 samples is a no-op and was dropped")]
    ZeroLength,
}

/// A distance unit a delay can be specified in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DelayUnit {
    Ms,
    M,
}

/// Convert a delay value expressed in the given unit into milliseconds.
pub fn to_millis(value: f64, unit: DelayUnit) -> f64 {
    match unit {
        DelayUnit::Ms => value,
        DelayUnit::M => 1000.0 * value / SPEED_OF_SOUND_M_S,
    }
}

/// Ring-buffer delay: `process` reads the sample written N samples ago, then
/// writes the current input in its place.
#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer: Vec<Sample>,
    pos: usize,
}

impl DelayLine {
    /// `samples` is the delay length; 0 is rejected (the caller should drop
    /// the filter rather than construct a no-op delay line).
    pub fn new(samples: usize) -> Result<DelayLine, DelayError> {
        if samples == 0 {
            return Err(DelayError::ZeroLength);
        }
        Ok(DelayLine {
            buffer: vec![0.0; samples],
            pos: 0,
        })
    }

    pub fn from_ms(ms: f64, sample_rate: f64) -> Result<DelayLine, DelayError> {
        let samples = (ms / 1000.0 * sample_rate).round() as usize;
        DelayLine::new(samples)
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[inline(always)]
    pub fn process(&mut self, input: Sample) -> Sample {
        let out = self.buffer[self.pos];
        self.buffer[self.pos] = input;
        self.pos = (self.pos + 1) % self.buffer.len();
        out
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.pos = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_length_is_rejected() {
        assert!(DelayLine::new(0).is_err());
    }

    #[test]
    fn delays_an_impulse_by_exactly_n_samples() {
        let mut delay = DelayLine::new(4).unwrap();
        let mut outputs = Vec::new();
        outputs.push(delay.process(1.0));
        for _ in 0..4 {
            outputs.push(delay.process(0.0));
        }
        assert_eq!(outputs, vec![0.0, 0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn meters_convert_via_speed_of_sound() {
        let ms = to_millis(3.43, DelayUnit::M);
        assert!((ms - 10.0).abs() < 1e-9);
    }

    #[test]
    fn reset_clears_pending_samples() {
        let mut delay = DelayLine::new(2).unwrap();
        delay.process(1.0);
        delay.reset();
        assert_eq!(delay.process(0.0), 0.0);
        assert_eq!(delay.process(0.0), 0.0);
    }
}
