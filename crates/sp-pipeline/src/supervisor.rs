//! The ~100ms outer loop: watches the configuration file, drains the log
//! queue, runs ~5s clip/condition housekeeping, checks for async errors
//! raised by the hot path, and restarts the pipeline on `ConfigChanged` or
//! `DeviceAsync`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use sp_core::ALL_CHANNELS;
use sp_graph::ConditionRegistry;

use crate::capture_loop::{AsyncErrorCell, InputsHandle, OutputsHandle};
use crate::error::{PipelineError, PipelineResult};

const TICK: Duration = Duration::from_millis(100);
const HOUSEKEEPING_PERIOD: Duration = Duration::from_secs(5);

/// A handle a caller can use to request a restart out-of-band (e.g. a
/// digit-key press, or a config editor "reload" button). Named as a trait
/// so a console-only build can supply a no-op and a future GUI build could
/// supply a real one without touching the supervisor.
pub trait RestartSignal: Send {
    /// Returns true exactly once per user-triggered restart request.
    fn requested(&mut self) -> bool {
        false
    }
}

/// The no-op default: no interactive restart trigger besides config-file
/// changes. A real console build could implement digit-key polling.
pub struct NoRestartSignal;
impl RestartSignal for NoRestartSignal {}

pub struct Supervisor {
    config_path: PathBuf,
    registry: Arc<Mutex<ConditionRegistry>>,
    _watcher: RecommendedWatcher,
    changed_rx: Receiver<()>,
}

impl Supervisor {
    pub fn new(config_path: &Path, num_input_channels: usize) -> PipelineResult<Supervisor> {
        let (tx, rx): (Sender<()>, Receiver<()>) = bounded(8);
        let mut watcher = notify::recommended_watcher(move |event: notify::Result<notify::Event>| {
            if event.is_ok() {
                let _ = tx.send(());
            }
        })
        .map_err(|e| PipelineError::ConfigInvalid {
            path: config_path.display().to_string(),
            message: format!("failed to watch configuration file: {e}"),
        })?;
        watcher
            .watch(config_path, RecursiveMode::NonRecursive)
            .map_err(|e| PipelineError::ConfigInvalid {
                path: config_path.display().to_string(),
                message: format!("failed to watch configuration file: {e}"),
            })?;

        Ok(Supervisor {
            config_path: config_path.to_path_buf(),
            registry: Arc::new(Mutex::new(ConditionRegistry::new(num_input_channels))),
            _watcher: watcher,
            changed_rx: rx,
        })
    }

    pub fn registry(&self) -> Arc<Mutex<ConditionRegistry>> {
        Arc::clone(&self.registry)
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Run one pipeline instance until it needs to be torn down and
    /// reinitialized (config change, device async event, or a fatal error
    /// exhausting its retry budget), then return the reason. `inputs` and
    /// `outputs` are the shared handles taken from the `CaptureLoop` before
    /// it was handed off to `spawn()`.
    pub fn run_until_restart(
        &self,
        inputs: &InputsHandle,
        outputs: &OutputsHandle,
        async_error: AsyncErrorCell,
        mut restart_signal: impl RestartSignal,
    ) -> PipelineError {
        let mut last_housekeeping = Instant::now();
        loop {
            std::thread::sleep(TICK);

            if self.changed_rx.try_recv().is_ok() {
                return PipelineError::ConfigChanged;
            }
            if restart_signal.requested() {
                return PipelineError::ConfigChanged;
            }
            if let Some(err) = async_error.lock().take() {
                return err;
            }

            if last_housekeeping.elapsed() >= HOUSEKEEPING_PERIOD {
                self.run_housekeeping(inputs, outputs);
                last_housekeeping = Instant::now();
            }
        }
    }

    /// Recompute each capture channel's SILENT condition from its activity
    /// flag, and log (then drain) any accumulated output clipping. Runs
    /// every ~5s rather than every batch, matching the "periodic
    /// housekeeping" cadence in §4.11.
    fn run_housekeeping(&self, inputs: &InputsHandle, outputs: &OutputsHandle) {
        let mut registry = self.registry.lock();
        for input in inputs.lock().iter() {
            registry.set_silent(input.channel(), !input.is_playing());
        }
        drop(registry);

        for output in outputs.lock().iter_mut() {
            let clip = output.reset_clipping();
            if clip > 1.0 {
                log::warn!("output {:?} clipped, peak {:.3}", output.channel(), clip);
            }
        }
    }

    /// Retry `attempt` according to each error's own policy until it
    /// succeeds or its attempt budget is exhausted. A fresh attempt counter
    /// is tracked per distinct error variant encountered, matching §7:
    /// `ConfigInvalid` gives up after 20 tries 100ms apart; the other
    /// variants retry without limit (the supervisor itself decides when to
    /// stop retrying `DeviceUnavailable`, e.g. on user shutdown). The
    /// counter resets whenever the variant changes between attempts, so a
    /// run of `ConfigInvalid` failures can't spend down the budget that a
    /// later `DeviceUnavailable` run is entitled to.
    pub fn retry_with_backoff<F>(&self, mut attempt: F) -> PipelineError
    where
        F: FnMut() -> PipelineResult<PipelineError>,
    {
        let mut budget: Option<u32> = None;
        let mut budget_kind: Option<std::mem::Discriminant<PipelineError>> = None;
        loop {
            match attempt() {
                Ok(reason) => return reason,
                Err(err) => {
                    let policy = err.retry_policy();
                    log::error!("pipeline attempt failed: {err}");

                    let kind = std::mem::discriminant(&err);
                    if budget_kind != Some(kind) {
                        budget_kind = Some(kind);
                        budget = Some(policy.max_attempts.unwrap_or(u32::MAX));
                    }
                    let remaining = budget.as_mut().expect("just set above");
                    if *remaining == 0 {
                        return err;
                    }
                    *remaining -= 1;

                    std::thread::sleep(policy.delay);
                }
            }
        }
    }
}

/// Every stable speaker position, exported for callers building a fresh
/// `ConditionRegistry` sized to the engine's fixed channel set.
pub fn all_channel_count() -> usize {
    ALL_CHANNELS.len()
}
