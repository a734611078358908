//! soundpath: CLI entry point.
//!
//! Parses arguments, loads logging, and either lists the devices the
//! current host backend sees or hands a configuration file to the
//! supervisor and runs until the process is killed.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;

use sp_core::{Channel, ALL_CHANNELS};
use sp_pipeline::{CaptureLoop, LogOnlyVisibility, NoRestartSignal, PipelineError, PipelineResult, Supervisor, Visibility};

const DEFAULT_BUFFER_FRAMES: u32 = 512;
const PREFERRED_SAMPLE_RATES: [u32; 3] = [48_000, 44_100, 96_000];

#[derive(Parser)]
#[command(name = "soundpath", about = "Real-time loopback-capture DSP engine")]
struct Cli {
    /// Path to the JSON configuration document.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// List capture and render devices the current host backend sees, then
    /// exit.
    #[arg(long)]
    list_devices: bool,

    /// Enable debug-level logging (equivalent to `RUST_LOG=debug`).
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if cli.list_devices {
        return list_devices();
    }

    let config_path = cli
        .config
        .context("--config is required unless --list-devices is given")?;

    run_supervised(&config_path)
}

fn init_logging(debug: bool) {
    if debug && std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "debug");
    }
    env_logger::init();
}

fn list_devices() -> Result<()> {
    let host = sp_audio::get_host_info();
    log::info!("host backend: {} (asio={}, jack={})", host.name, host.is_asio, host.is_jack);

    println!("Capture devices:");
    for d in sp_audio::list_capture_devices()? {
        println!(
            "  {}{} - {} ch, rates {:?}",
            d.name,
            if d.is_default { " (default)" } else { "" },
            d.input_channels,
            d.sample_rates
        );
    }

    println!("Render devices:");
    for d in sp_audio::list_render_devices()? {
        println!(
            "  {}{} - {} ch, rates {:?}",
            d.name,
            if d.is_default { " (default)" } else { "" },
            d.output_channels,
            d.sample_rates
        );
    }

    Ok(())
}

/// Run the pipeline forever, tearing down and reinitializing it each time
/// the supervisor reports a restart and surfacing a fatal error (an
/// exhausted retry budget) as a process failure.
fn run_supervised(config_path: &Path) -> Result<()> {
    let supervisor = Supervisor::new(config_path, sp_pipeline::all_channel_count())
        .context("failed to start watching the configuration file")?;

    loop {
        let reason = supervisor.retry_with_backoff(|| run_once(&supervisor, config_path));
        match reason {
            PipelineError::ConfigChanged => {
                log::info!("configuration changed, restarting");
            }
            PipelineError::DeviceAsync(msg) => {
                log::warn!("pro-driver async event ({msg}), reinitializing");
            }
            fatal => {
                bail!("pipeline stopped: {fatal}");
            }
        }
    }
}

/// Build devices, compile the configuration, and run the capture loop until
/// the supervisor decides to tear it down. Returns `Err` for a failure
/// during setup (so the caller's retry policy applies to it); returns `Ok`
/// with the restart reason once the loop actually ran.
fn run_once(supervisor: &Supervisor, config_path: &Path) -> PipelineResult<PipelineError> {
    let text = std::fs::read_to_string(config_path).map_err(|e| PipelineError::ConfigInvalid {
        path: config_path.display().to_string(),
        message: format!("failed to read configuration file: {e}"),
    })?;

    let devices = peek_devices(&text, config_path)?;

    let capture_infos = sp_audio::list_capture_devices()?;
    let render_infos = sp_audio::list_render_devices()?;

    let capture_info = resolve_device(&capture_infos, devices.capture.as_deref())
        .ok_or_else(|| PipelineError::DeviceUnavailable(format!("capture device {:?} not found", devices.capture)))?;
    let render_info = resolve_device(&render_infos, devices.render.as_deref())
        .ok_or_else(|| PipelineError::DeviceUnavailable(format!("render device {:?} not found", devices.render)))?;

    let sample_rate = pick_sample_rate(&capture_info.sample_rates, &render_info.sample_rates)?;

    let capture_channel_count = (capture_info.input_channels as usize).min(ALL_CHANNELS.len());
    let render_channel_count = (render_info.output_channels as usize).min(ALL_CHANNELS.len());
    let capture_channels: HashSet<Channel> = ALL_CHANNELS[..capture_channel_count].iter().copied().collect();
    let render_channels: HashSet<Channel> = ALL_CHANNELS[..render_channel_count].iter().copied().collect();

    let config_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let compiled = sp_config::compile_document_text(&text, sample_rate as f64, &capture_channels, &render_channels, config_dir)?;

    let capture_device = sp_audio::get_capture_device_by_name(&capture_info.name)?;
    let render_device = sp_audio::get_render_device_by_name(&render_info.name)?;

    let capture_source = sp_audio::CpalCaptureSource::new(
        &capture_device,
        sample_rate,
        capture_channel_count as u16,
        DEFAULT_BUFFER_FRAMES,
    )?;
    let renderer = sp_audio::CpalSharedRenderer::new(
        &render_device,
        sample_rate,
        render_channel_count as u16,
        DEFAULT_BUFFER_FRAMES,
    )?;

    log::info!(
        "running: capture {:?} ({} ch) -> render {:?} ({} ch) at {} Hz",
        capture_info.name,
        capture_channel_count,
        render_info.name,
        render_channel_count,
        sample_rate
    );

    if devices.capture.is_none() || devices.render.is_none() {
        if let Err(e) = sp_config::persist_device_selection(config_path, &capture_info.name, &render_info.name) {
            log::warn!("could not persist first-run device selection: {e}");
        }
    }

    let (hide, minimize) = peek_visibility_flags(&text);
    LogOnlyVisibility.update(hide, minimize);

    let pipeline = CaptureLoop::new(
        Box::new(capture_source),
        Box::new(renderer),
        compiled.inputs,
        compiled.outputs,
        supervisor.registry(),
        false,
    );

    let inputs_handle = pipeline.inputs_handle();
    let outputs_handle = pipeline.outputs_handle();
    let async_error = pipeline.async_error_cell();
    let stop_flag = pipeline.stop_flag();

    let join_handle = pipeline.spawn();

    let reason = supervisor.run_until_restart(&inputs_handle, &outputs_handle, async_error, NoRestartSignal);

    stop_flag.store(true, std::sync::atomic::Ordering::Relaxed);
    let _ = join_handle.join();

    Ok(reason)
}

fn pick_sample_rate(capture_rates: &[u32], render_rates: &[u32]) -> PipelineResult<u32> {
    let common: Vec<u32> = capture_rates.iter().copied().filter(|r| render_rates.contains(r)).collect();
    if common.is_empty() {
        return Err(PipelineError::DeviceUnavailable(
            "capture and render devices share no sample rate".to_string(),
        ));
    }
    for &preferred in &PREFERRED_SAMPLE_RATES {
        if common.contains(&preferred) {
            return Ok(preferred);
        }
    }
    Ok(common[0])
}

struct DeviceNames {
    capture: Option<String>,
    render: Option<String>,
}

/// Peek just the `devices` block before the full document is deserialized,
/// so devices can be opened (to learn their channel counts) ahead of
/// compiling the rest of the configuration against those counts. A missing
/// name falls back to the host's default device and is written back into
/// the file on a successful bind (§6's first-run device persistence).
fn peek_devices(text: &str, config_path: &Path) -> PipelineResult<DeviceNames> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(|e| PipelineError::ConfigInvalid {
        path: config_path.display().to_string(),
        message: format!("invalid JSON: {e}"),
    })?;
    let devices = value.get("devices").ok_or_else(|| PipelineError::ConfigInvalid {
        path: config_path.display().to_string(),
        message: "missing \"devices\" block".to_string(),
    })?;
    let name = |key: &str| devices.get(key).and_then(|v| v.as_str()).map(str::to_string);
    Ok(DeviceNames { capture: name("capture"), render: name("render") })
}

/// Peek the document's `hide`/`minimize` flags the same way `peek_devices`
/// peeks device names; malformed or absent flags default to `false` rather
/// than failing the whole attempt, since they only affect a window surface
/// this build does not have.
fn peek_visibility_flags(text: &str) -> (bool, bool) {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(text) else {
        return (false, false);
    };
    let flag = |key: &str| value.get(key).and_then(serde_json::Value::as_bool).unwrap_or(false);
    (flag("hide"), flag("minimize"))
}

/// Resolve a configured device name to its `DeviceInfo`, or fall back to
/// whichever device the host reports as its default when no name was
/// configured.
fn resolve_device<'a>(infos: &'a [sp_audio::DeviceInfo], name: Option<&str>) -> Option<&'a sp_audio::DeviceInfo> {
    match name {
        Some(name) => infos.iter().find(|d| d.name == name),
        None => infos.iter().find(|d| d.is_default).or_else(|| infos.first()),
    }
}
