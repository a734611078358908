//! Wires a compiled configuration and a pair of device backends into the
//! running capture → process → render loop, and supervises it: config
//! reload, device-error recovery, and periodic housekeeping.

mod capture_loop;
mod error;
mod supervisor;
mod visibility;

pub use capture_loop::{AsyncErrorCell, CaptureLoop, InputsHandle, OutputsHandle};
pub use error::{PipelineError, PipelineResult, RetryPolicy};
pub use supervisor::{all_channel_count, NoRestartSignal, RestartSignal, Supervisor};
pub use visibility::{LogOnlyVisibility, Visibility};
