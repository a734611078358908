//! Audio device enumeration and name-based lookup.

use cpal::traits::{DeviceTrait, HostTrait};
use cpal::{Device, Host, SupportedStreamConfigRange};

use crate::{AudioError, AudioResult};

/// A device as reported by the host, with the information the
/// configuration compiler and CLI `--list-devices` need to present a choice
/// to the user.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub name: String,
    pub is_default: bool,
    pub input_channels: u16,
    pub output_channels: u16,
    pub sample_rates: Vec<u32>,
}

/// Pick the host backend for this platform: CoreAudio on macOS, ASIO then
/// WASAPI on Windows, JACK then the default portaudio-style backend on
/// Linux. Falls back to `cpal::default_host()` everywhere else.
pub fn get_host() -> Host {
    #[cfg(target_os = "macos")]
    {
        cpal::default_host()
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(id) = cpal::available_hosts()
            .into_iter()
            .find(|h| *h == cpal::HostId::Asio)
        {
            if let Ok(host) = cpal::host_from_id(id) {
                return host;
            }
        }
        cpal::default_host()
    }

    #[cfg(target_os = "linux")]
    {
        if let Some(id) = cpal::available_hosts()
            .into_iter()
            .find(|h| *h == cpal::HostId::Jack)
        {
            if let Ok(host) = cpal::host_from_id(id) {
                return host;
            }
        }
        cpal::default_host()
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    {
        cpal::default_host()
    }
}

/// List devices usable as a loopback capture source. On the shared-event
/// path loopback capture is registered against an output-capable endpoint
/// (the host-specific loopback registration itself is outside this crate's
/// contract, per spec §1); enumeration walks the host's input devices.
pub fn list_capture_devices() -> AudioResult<Vec<DeviceInfo>> {
    let host = get_host();
    let default = host.default_input_device();
    let default_name = default.as_ref().and_then(|d| d.name().ok());

    let mut devices = Vec::new();
    for device in host
        .input_devices()
        .map_err(|e| AudioError::BackendError(e.to_string()))?
    {
        if let Ok(name) = device.name() {
            let is_default = default_name.as_ref().map(|d| d == &name).unwrap_or(false);
            let (input_channels, sample_rates) = supported_input_info(&device);
            devices.push(DeviceInfo {
                name,
                is_default,
                input_channels,
                output_channels: 0,
                sample_rates,
            });
        }
    }
    Ok(devices)
}

/// List devices usable as a render endpoint.
pub fn list_render_devices() -> AudioResult<Vec<DeviceInfo>> {
    let host = get_host();
    let default = host.default_output_device();
    let default_name = default.as_ref().and_then(|d| d.name().ok());

    let mut devices = Vec::new();
    for device in host
        .output_devices()
        .map_err(|e| AudioError::BackendError(e.to_string()))?
    {
        if let Ok(name) = device.name() {
            let is_default = default_name.as_ref().map(|d| d == &name).unwrap_or(false);
            let (output_channels, sample_rates) = supported_output_info(&device);
            devices.push(DeviceInfo {
                name,
                is_default,
                input_channels: 0,
                output_channels,
                sample_rates,
            });
        }
    }
    Ok(devices)
}

pub fn get_capture_device_by_name(name: &str) -> AudioResult<Device> {
    let host = get_host();
    for device in host
        .input_devices()
        .map_err(|e| AudioError::BackendError(e.to_string()))?
    {
        if device.name().map(|n| n == name).unwrap_or(false) {
            return Ok(device);
        }
    }
    Err(AudioError::DeviceNotFound(name.to_string()))
}

pub fn get_render_device_by_name(name: &str) -> AudioResult<Device> {
    let host = get_host();
    for device in host
        .output_devices()
        .map_err(|e| AudioError::BackendError(e.to_string()))?
    {
        if device.name().map(|n| n == name).unwrap_or(false) {
            return Ok(device);
        }
    }
    Err(AudioError::DeviceNotFound(name.to_string()))
}

fn supported_input_info(device: &Device) -> (u16, Vec<u32>) {
    let configs: Vec<SupportedStreamConfigRange> = device
        .supported_input_configs()
        .map(|c| c.collect())
        .unwrap_or_default();
    summarize(&configs)
}

fn supported_output_info(device: &Device) -> (u16, Vec<u32>) {
    let configs: Vec<SupportedStreamConfigRange> = device
        .supported_output_configs()
        .map(|c| c.collect())
        .unwrap_or_default();
    summarize(&configs)
}

fn summarize(configs: &[SupportedStreamConfigRange]) -> (u16, Vec<u32>) {
    let max_channels = configs.iter().map(|c| c.channels()).max().unwrap_or(0);
    let mut sample_rates: Vec<u32> = configs
        .iter()
        .flat_map(|c| {
            let min = c.min_sample_rate().0;
            let max = c.max_sample_rate().0;
            [44100, 48000, 88200, 96000, 176400, 192000]
                .into_iter()
                .filter(move |&rate| rate >= min && rate <= max)
        })
        .collect();
    sample_rates.sort_unstable();
    sample_rates.dedup();
    (max_channels, sample_rates)
}

/// Audio backend identity, surfaced through `--list-devices` and log lines
/// at startup so a user can tell which path (shared-event vs. pro-driver)
/// is in effect.
#[derive(Debug, Clone)]
pub struct HostInfo {
    pub name: String,
    pub is_asio: bool,
    pub is_jack: bool,
}

pub fn get_host_info() -> HostInfo {
    let id = get_host().id();
    let name = format!("{id:?}");
    HostInfo {
        is_asio: name.contains("Asio"),
        is_jack: name.contains("Jack"),
        name,
    }
}
