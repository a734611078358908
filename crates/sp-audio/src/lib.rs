//! sp-audio: device enumeration plus the two render/capture backends
//! (shared-event cpal, and the Windows pro-driver push path) behind a
//! common `CaptureSource`/`Renderer` contract.

mod asio;
mod device;
mod error;
mod handoff;
mod stream;
mod traits;

pub use device::{
    get_capture_device_by_name, get_host_info, get_render_device_by_name, list_capture_devices,
    list_render_devices, DeviceInfo, HostInfo,
};
pub use error::{AudioError, AudioResult};
pub use handoff::{handoff, HandoffConsumer, HandoffProducer};
pub use stream::{CpalCaptureSource, CpalSharedRenderer};
pub use traits::{CaptureFlags, CaptureSource, Renderer};

#[cfg(target_os = "windows")]
pub use asio::{list_asio_drivers, sample_to_int32_le, AsioBufferShape, AsioRenderer};
