//! Direct-form FIR convolution. Tap counts used by this engine (room-
//! correction filters, a few thousand taps at most) don't need partitioned
//! convolution; a naive direct form is fast enough at audio sample rates.

use sp_core::Sample;

#[derive(Debug, Clone)]
pub struct Fir {
    taps: Vec<f64>,
    history: Vec<Sample>,
    pos: usize,
}

impl Fir {
    pub fn new(taps: Vec<f64>) -> Fir {
        let len = taps.len().max(1);
        Fir {
            taps,
            history: vec![0.0; len],
            pos: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.taps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }

    #[inline(always)]
    pub fn process(&mut self, input: Sample) -> Sample {
        if self.taps.is_empty() {
            return input;
        }
        self.history[self.pos] = input;
        let n = self.history.len();
        let mut acc = 0.0;
        for (i, &tap) in self.taps.iter().enumerate() {
            let idx = (self.pos + n - i) % n;
            acc += tap * self.history[idx];
        }
        self.pos = (self.pos + 1) % n;
        acc
    }

    pub fn reset(&mut self) {
        self.history.fill(0.0);
        self.pos = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impulse_response_returns_the_taps() {
        let taps = vec![0.25, 0.5, 0.25];
        let mut fir = Fir::new(taps.clone());
        let mut out = Vec::new();
        out.push(fir.process(1.0));
        out.push(fir.process(0.0));
        out.push(fir.process(0.0));
        assert_eq!(out, taps);
    }

    #[test]
    fn reset_then_zero_input_yields_zero() {
        let mut fir = Fir::new(vec![1.0, 1.0, 1.0]);
        fir.process(1.0);
        fir.reset();
        for _ in 0..8 {
            assert_eq!(fir.process(0.0), 0.0);
        }
    }
}
