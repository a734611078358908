//! The polymorphic filter node used by every route and output filter chain.
//!
//! The hot path dispatches over a flat enum rather than a boxed trait
//! object: the filter chain is built once at configuration-compile time and
//! never grows on the audio thread, so monomorphizing via an enum avoids a
//! vtable indirection per sample with no loss of flexibility.

use crate::cancellation::Cancellation;
use crate::compression::Compression;
use crate::crossover::BiquadCascade;
use crate::delay::DelayLine;
use crate::fir::Fir;
use crate::gain::Gain;
use sp_core::Sample;

#[derive(Debug, Clone)]
pub enum Filter {
    Biquad(BiquadCascade),
    Delay(DelayLine),
    Fir(Fir),
    Gain(Gain),
    Cancellation(Cancellation),
    Compression(Compression),
}

impl Filter {
    #[inline(always)]
    pub fn process(&mut self, input: Sample) -> Sample {
        match self {
            Filter::Biquad(f) => f.process(input),
            Filter::Delay(f) => f.process(input),
            Filter::Fir(f) => f.process(input),
            Filter::Gain(f) => f.process(input),
            Filter::Cancellation(f) => f.process(input),
            Filter::Compression(f) => f.process(input),
        }
    }

    /// Zero all internal state. Called on every Input/Output when a capture
    /// batch transitions from audio to silence, so the next non-silent
    /// batch starts click-free.
    pub fn reset(&mut self) {
        match self {
            Filter::Biquad(f) => f.reset(),
            Filter::Delay(f) => f.reset(),
            Filter::Fir(f) => f.reset(),
            Filter::Gain(_) => {}
            Filter::Cancellation(f) => f.reset(),
            Filter::Compression(f) => f.reset(),
        }
    }

    /// One-line description for logging when a configuration is compiled.
    pub fn describe(&self) -> String {
        match self {
            Filter::Biquad(f) => format!("Biquad cascade: {} section(s)", f.len()),
            Filter::Delay(f) => format!("Delay: {} samples", f.len()),
            Filter::Fir(f) => format!("FIR: {} taps", f.len()),
            Filter::Gain(g) => format!("Gain: {:.3}x", g.multiplier()),
            Filter::Cancellation(_) => "Cancellation".to_string(),
            Filter::Compression(_) => "Compression".to_string(),
        }
    }
}

/// Apply a full filter chain to one sample in sequence.
#[inline(always)]
pub fn process_chain(chain: &mut [Filter], input: Sample) -> Sample {
    let mut x = input;
    for filter in chain.iter_mut() {
        x = filter.process(x);
    }
    x
}

pub fn reset_chain(chain: &mut [Filter]) {
    for filter in chain.iter_mut() {
        filter.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biquad::BiquadCoeffs;

    #[test]
    fn chain_of_filters_resets_to_exact_silence() {
        let mut cascade = BiquadCascade::new();
        cascade.push(BiquadCoeffs::lowpass(1000.0, 0.707, 48000.0));
        let mut chain = vec![
            Filter::Biquad(cascade),
            Filter::Delay(DelayLine::new(8).unwrap()),
            Filter::Gain(Gain::new(3.0, false)),
        ];
        process_chain(&mut chain, 1.0);
        process_chain(&mut chain, 0.5);
        reset_chain(&mut chain);
        for _ in 0..32 {
            assert_eq!(process_chain(&mut chain, 0.0), 0.0);
        }
    }
}
