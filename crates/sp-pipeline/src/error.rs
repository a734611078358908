//! The pipeline's error taxonomy and the supervisor's retry policy for each
//! member.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Missing field, wrong node shape, unresolved `#ref`, inconsistent
    /// channel plan, or a transient I/O failure while loading a FIR file.
    /// Fatal for the current attempt; the supervisor retries on a fixed
    /// schedule so the user has time to fix the file on disk.
    #[error("configuration invalid at {path}: {message}")]
    ConfigInvalid { path: String, message: String },

    /// The capture or render endpoint disappeared, or reports a format or
    /// bit-depth the stream was not built for.
    #[error("device unavailable: {0}")]
    DeviceUnavailable(String),

    /// Pro-driver-only: reset-request, resync-request, buffer-size-change,
    /// latencies-changed, or overload, published by the driver's callback
    /// thread and surfaced by the supervisor's housekeeping pass.
    #[error("pro-driver async event: {0}")]
    DeviceAsync(String),

    /// Not a failure: a non-error control-flow signal raised when the
    /// config file's mtime moves or a digit key is pressed, requesting an
    /// orderly restart.
    #[error("configuration changed, restarting")]
    ConfigChanged,
}

impl PipelineError {
    /// How long the supervisor should wait before the next attempt, and how
    /// many attempts are allowed before giving up (`None` = retry forever,
    /// which is `DeviceUnavailable`'s policy: a device can come back at any
    /// time, so there is no attempt count to exhaust).
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            PipelineError::ConfigInvalid { .. } => RetryPolicy {
                delay: Duration::from_millis(100),
                max_attempts: Some(20),
            },
            PipelineError::DeviceUnavailable(_) => RetryPolicy {
                delay: Duration::from_secs(2),
                max_attempts: None,
            },
            PipelineError::DeviceAsync(_) => RetryPolicy {
                delay: Duration::from_millis(0),
                max_attempts: None,
            },
            PipelineError::ConfigChanged => RetryPolicy {
                delay: Duration::from_millis(0),
                max_attempts: None,
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub delay: Duration,
    pub max_attempts: Option<u32>,
}

pub type PipelineResult<T> = Result<T, PipelineError>;

impl From<sp_config::ConfigError> for PipelineError {
    fn from(e: sp_config::ConfigError) -> Self {
        PipelineError::ConfigInvalid {
            path: String::new(),
            message: e.to_string(),
        }
    }
}

impl From<sp_audio::AudioError> for PipelineError {
    fn from(e: sp_audio::AudioError) -> Self {
        PipelineError::DeviceUnavailable(e.to_string())
    }
}
