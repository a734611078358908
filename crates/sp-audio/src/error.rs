//! Audio I/O error taxonomy.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("no audio device is available")]
    NoDevice,

    #[error("device not found: {0}")]
    DeviceNotFound(String),

    #[error("failed to query device configuration: {0}")]
    ConfigError(String),

    #[error("unsupported sample rate: {0}Hz")]
    UnsupportedSampleRate(u32),

    #[error("unsupported channel count: {0}")]
    UnsupportedChannelCount(u16),

    #[error("failed to build stream: {0}")]
    StreamBuildError(String),

    #[error("stream error: {0}")]
    StreamError(String),

    #[error("backend error: {0}")]
    BackendError(String),

    /// The endpoint disappeared mid-stream, or the driver reports a
    /// format/bit-depth that no longer matches what the stream was built
    /// with. The pipeline supervisor treats this as a `DeviceAsync`
    /// condition and restarts the stream rather than the whole process.
    #[error("device {0} became unavailable: {1}")]
    DeviceUnavailable(String, String),
}

pub type AudioResult<T> = Result<T, AudioError>;
