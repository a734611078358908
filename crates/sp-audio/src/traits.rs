//! Backend-agnostic capture and render contracts. The capture loop (in
//! `sp-pipeline`) is written once against these traits and never knows
//! whether it's driving the shared-event cpal path or the pro-driver push
//! path.

use sp_core::Sample;

use crate::AudioResult;

/// Per-packet status bits reported alongside a capture batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureFlags {
    /// The batch contains no non-zero samples.
    pub silent: bool,
    /// A gap was detected between this batch and the previous one.
    pub discontinuity: bool,
    /// The capture timestamp did not advance monotonically.
    pub timestamp_error: bool,
}

/// A loopback (or plain input) capture endpoint.
pub trait CaptureSource: Send {
    fn sample_rate(&self) -> f64;
    fn channel_count(&self) -> usize;

    /// Frames immediately available without blocking. `0` means the caller
    /// should sleep ~1ms and poll again.
    fn next_packet_frames(&mut self) -> usize;

    /// Fill `out` (interleaved, `frames * channel_count()` samples) with the
    /// next batch and report its flags. `frames` must not exceed the value
    /// most recently returned by `next_packet_frames`.
    fn acquire(&mut self, frames: usize, out: &mut [Sample]) -> AudioResult<CaptureFlags>;
}

/// A render endpoint the processed signal is pushed to.
pub trait Renderer: Send {
    fn sample_rate(&self) -> f64;
    fn channel_count(&self) -> usize;

    /// Frames of headroom currently free in the renderer's buffer. The
    /// shared-event path busy-waits on this before writing a batch.
    fn available_frames(&self) -> usize;

    /// Push one processed frame (`channel_count()` samples).
    fn push_frame(&mut self, frame: &[Sample]) -> AudioResult<()>;

    /// Drop any buffered-but-unplayed frames. Called on the silence→audio
    /// transition on the shared-event path to avoid playing stale silence.
    fn flush(&mut self);
}
