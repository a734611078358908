//! Configuration compiler error taxonomy.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{path}: {message}")]
    Invalid { path: String, message: String },

    #[error("failed to parse configuration document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{0}")]
    JsonPath(#[from] sp_json::JsonPathError),

    #[error("unknown channel {0:?} in configuration")]
    UnknownChannel(#[from] sp_core::CoreError),

    #[error("{path}: {source}")]
    Dsp {
        path: String,
        #[source]
        source: DspBuildError,
    },

    #[error("failed to read FIR tap file {path:?}: {message}")]
    FirFile { path: String, message: String },
}

/// Errors from building a DSP primitive out of a filter spec, before they've
/// been attributed to a JSON path by the caller.
#[derive(Debug, Error)]
pub enum DspBuildError {
    #[error(transparent)]
    Crossover(#[from] sp_dsp::CrossoverError),
    #[error(transparent)]
    Delay(#[from] sp_dsp::DelayError),
}

impl ConfigError {
    pub fn invalid(path: impl Into<String>, message: impl Into<String>) -> ConfigError {
        ConfigError::Invalid {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
