//! The hot capture → process → render loop (§4.11). Runs on its own
//! thread; never allocates once started, never logs, never blocks on
//! anything but the shared renderer's bounded frame-count wait and the
//! short, uncontended locks it shares with the supervisor.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use sp_audio::{CaptureSource, Renderer};
use sp_core::{Channel, Sample, ALL_CHANNELS};
use sp_graph::{ConditionRegistry, Input, Output};

use crate::error::PipelineError;

const POLL_SLEEP: Duration = Duration::from_millis(1);

/// A pending fatal or control-flow error raised by the hot loop and
/// collected by the supervisor's housekeeping pass. The hot path only ever
/// writes to this cell; it never raises directly.
pub type AsyncErrorCell = Arc<Mutex<Option<PipelineError>>>;

/// Shared handle to the live `Input` set. Held by both the spawned loop and
/// the supervisor; the loop locks it once per batch (not per sample), the
/// supervisor locks it once per housekeeping pass, so contention is
/// negligible on either side.
pub type InputsHandle = Arc<Mutex<Vec<Input>>>;

/// Shared handle to the live `Output` set, same locking discipline as
/// `InputsHandle`.
pub type OutputsHandle = Arc<Mutex<Vec<Output>>>;

pub struct CaptureLoop {
    capture: Box<dyn CaptureSource>,
    renderer: Box<dyn Renderer>,
    inputs: InputsHandle,
    outputs: OutputsHandle,
    registry: Arc<Mutex<ConditionRegistry>>,
    pro_driver: bool,
    stop: Arc<AtomicBool>,
    async_error: AsyncErrorCell,
    capture_buf: Vec<Sample>,
    render_block: Vec<Sample>,
    frame_out: Vec<Sample>,
    was_silent: bool,
    first: bool,
}

impl CaptureLoop {
    /// `outputs`' channels are assumed to occupy a prefix of the engine's
    /// stable 8-position index order matching the render device's own
    /// channel count (true for every layout this engine names: stereo,
    /// 5.1, 7.1 all present L..Sr as a prefix of `ALL_CHANNELS`).
    pub fn new(
        capture: Box<dyn CaptureSource>,
        renderer: Box<dyn Renderer>,
        inputs: Vec<Input>,
        outputs: Vec<Output>,
        registry: Arc<Mutex<ConditionRegistry>>,
        pro_driver: bool,
    ) -> CaptureLoop {
        CaptureLoop {
            capture,
            renderer,
            inputs: Arc::new(Mutex::new(inputs)),
            outputs: Arc::new(Mutex::new(outputs)),
            registry,
            pro_driver,
            stop: Arc::new(AtomicBool::new(false)),
            async_error: Arc::new(Mutex::new(None)),
            capture_buf: Vec::new(),
            render_block: vec![0.0; ALL_CHANNELS.len()],
            frame_out: vec![0.0; ALL_CHANNELS.len()],
            was_silent: false,
            first: true,
        }
    }

    pub fn async_error_cell(&self) -> AsyncErrorCell {
        Arc::clone(&self.async_error)
    }

    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// A clone of the shared `Input` handle. Take this before `spawn()`
    /// moves the loop onto its own thread; the supervisor uses it directly
    /// for housekeeping instead of reaching back into the (by-then-moved)
    /// `CaptureLoop` value.
    pub fn inputs_handle(&self) -> InputsHandle {
        Arc::clone(&self.inputs)
    }

    /// A clone of the shared `Output` handle, same caveat as
    /// `inputs_handle`.
    pub fn outputs_handle(&self) -> OutputsHandle {
        Arc::clone(&self.outputs)
    }

    /// Spawn the loop on its own OS thread. The join handle is owned by the
    /// caller (the supervisor), whose destructor joins it before tearing
    /// down device handles.
    pub fn spawn(mut self) -> thread::JoinHandle<()> {
        thread::spawn(move || {
            while !self.stop.load(Ordering::Relaxed) {
                self.step();
            }
        })
    }

    /// One iteration of the seven-step loop. Exposed directly for tests
    /// that drive it without a background thread.
    pub fn step(&mut self) {
        let frames = self.capture.next_packet_frames();
        if frames == 0 {
            thread::sleep(POLL_SLEEP);
            return;
        }

        let capture_channels = self.capture.channel_count();
        let needed = frames * capture_channels;
        if self.capture_buf.len() < needed {
            self.capture_buf.resize(needed, 0.0);
        }
        let flags = match self.capture.acquire(frames, &mut self.capture_buf[..needed]) {
            Ok(flags) => flags,
            Err(e) => {
                *self.async_error.lock() = Some(PipelineError::from(e));
                return;
            }
        };

        let mut inputs = self.inputs.lock();
        let mut outputs = self.outputs.lock();

        if flags.silent {
            if !self.was_silent {
                for input in inputs.iter_mut() {
                    input.reset_if_was_playing();
                }
                for output in outputs.iter_mut() {
                    output.reset();
                }
            }
            self.was_silent = true;
            return;
        }

        if self.was_silent {
            self.renderer.flush();
            if self.first {
                self.first = false;
                self.was_silent = false;
                return;
            }
            if self.pro_driver {
                let silence = vec![0.0; self.renderer.channel_count()];
                let _ = self.renderer.push_frame(&silence);
            }
        }
        self.was_silent = false;

        // Shared renderer: bounded busy-wait for headroom (§4.11 step 5);
        // bounded by the renderer's own drain cadence, not a timer here.
        // Pro-driver path always reports full headroom, so this never spins.
        while self.renderer.available_frames() < frames {
            thread::yield_now();
        }

        let registry = self.registry.lock();
        for input in inputs.iter_mut() {
            input.eval_conditions(&registry);
        }
        drop(registry);

        let render_channels = self.renderer.channel_count().min(self.frame_out.len());

        for frame_idx in 0..frames {
            self.render_block.iter_mut().for_each(|s| *s = 0.0);

            for input in inputs.iter_mut() {
                let sample_idx = frame_idx * capture_channels + capture_index(input.channel());
                let sample = self.capture_buf.get(sample_idx).copied().unwrap_or(0.0);
                if sample != 0.0 {
                    input.mark_playing();
                }
                input.process(sample, &mut self.render_block);
            }

            self.frame_out.iter_mut().for_each(|s| *s = 0.0);
            for output in outputs.iter_mut() {
                let idx = output.channel().index();
                let mixed = self.render_block.get(idx).copied().unwrap_or(0.0);
                let processed = output.process(mixed);
                if let Some(slot) = self.frame_out.get_mut(idx) {
                    *slot = processed;
                }
            }
            if let Err(e) = self.renderer.push_frame(&self.frame_out[..render_channels]) {
                *self.async_error.lock() = Some(PipelineError::from(e));
                return;
            }
        }
    }
}

/// Map a `Channel` to its position in the interleaved capture buffer. The
/// capture device's own channel order is assumed to match the engine's
/// stable speaker-position order; devices that disagree are expected to be
/// normalized by the OS-level capture registration outside this crate.
fn capture_index(channel: Channel) -> usize {
    ALL_CHANNELS
        .iter()
        .position(|&c| c == channel)
        .unwrap_or(usize::MAX)
}
