//! sp-core: shared types and error taxonomy for SoundPath.
//!
//! Every other crate in the workspace depends on this one for the `Channel`
//! identity, the `Sample` alias, and dB/gain conversions.

mod channel;
mod decibels;
mod error;

pub use channel::{Channel, ALL_CHANNELS};
pub use decibels::{db_to_gain, gain_to_db};
pub use error::{CoreError, CoreResult};

/// Audio samples are always `f64` throughout the engine for numerical
/// precision in the filter cascades.
pub type Sample = f64;

/// Speed of sound in meters/second, used to convert a delay specified in
/// meters into milliseconds (spec.md's "unit-meter" delay conversion).
pub const SPEED_OF_SOUND_M_S: f64 = 343.0;
