//! Core error type shared by the lower layers of the engine.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("unknown channel '{0}'")]
    UnknownChannel(String),

    #[error("invalid sample rate: {0}")]
    InvalidSampleRate(u32),

    #[error("invalid parameter: {0}")]
    InvalidParam(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
