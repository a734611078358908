//! sp-dsp: DSP filter primitives for SoundPath.
//!
//! ## Modules
//! - `biquad` — TDF-II biquad section and the per-family coefficient
//!   constructors (lowpass/highpass, shelves, PEQ, band-pass/notch,
//!   Linkwitz-Transform)
//! - `crossover` — Q tables for Butterworth/Linkwitz-Riley/Bessel and the
//!   multi-section cascade built from them
//! - `delay` — ring-buffer delay line (ms or meters-at-343-m/s)
//! - `fir` — direct-form FIR convolution
//! - `gain` — static gain / polarity invert
//! - `cancellation` — delay-and-invert standing-wave cancellation
//! - `compression` — downward dynamic range compression
//! - `filter` — the `Filter` enum all routes/outputs dispatch over

pub mod biquad;
pub mod cancellation;
pub mod compression;
pub mod crossover;
pub mod delay;
pub mod filter;
pub mod fir;
pub mod gain;

pub use biquad::{Biquad, BiquadCoeffs};
pub use cancellation::Cancellation;
pub use compression::Compression;
pub use crossover::{q_table, validate_custom_q, BiquadCascade, CrossoverError, CrossoverFamily};
pub use delay::{to_millis, DelayError, DelayLine, DelayUnit};
pub use filter::{process_chain, reset_chain, Filter};
pub use fir::Fir;
pub use gain::Gain;
