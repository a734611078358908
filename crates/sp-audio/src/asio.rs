//! Pro-driver push path (ASIO-flavored), Windows only.
//!
//! The real ASIO SDK is proprietary and obtained from Steinberg or the
//! interface manufacturer; this module models the shape of the integration
//! (driver enumeration, buffer handoff, sample conversion) behind the same
//! `Renderer` trait as the shared-event cpal path, so the capture loop does
//! not know which one it's driving. Loading an actual driver is left as a
//! `BackendError` until a real ASIO binding crate is wired in.

#![cfg(target_os = "windows")]

use sp_core::Sample;

use crate::handoff::{handoff, HandoffConsumer, HandoffProducer};
use crate::traits::Renderer;
use crate::{AudioError, AudioResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsioSampleType {
    Int16,
    Int24,
    Int32,
    Float32,
    Float64,
}

impl AsioSampleType {
    pub fn bytes(self) -> usize {
        match self {
            AsioSampleType::Int16 => 2,
            AsioSampleType::Int24 => 3,
            AsioSampleType::Int32 | AsioSampleType::Float32 => 4,
            AsioSampleType::Float64 => 8,
        }
    }
}

/// Convert a clamped float sample to the driver's native integer format.
/// §4.9: doubles in [-1, 1] become 32-bit little-endian signed integers by
/// multiplying by `2^31 - 1` and truncating.
pub fn sample_to_int32_le(value: Sample) -> [u8; 4] {
    let clamped = value.clamp(-1.0, 1.0);
    let scaled = (clamped * 2_147_483_647.0) as i32;
    scaled.to_le_bytes()
}

pub fn list_asio_drivers() -> AudioResult<Vec<String>> {
    log::warn!("ASIO driver enumeration requires a bound ASIO SDK; returning no drivers");
    Ok(Vec::new())
}

/// Buffer-depth and per-buffer frame count the driver negotiated.
#[derive(Debug, Clone, Copy)]
pub struct AsioBufferShape {
    pub frames_per_buffer: usize,
    pub depth: usize,
}

/// The process-thread side of the pro-driver path: owns the producer half
/// of the hand-off queue and pushes finished frames into the buffer it is
/// currently filling, enqueuing it once full.
pub struct AsioRenderer {
    driver_name: String,
    sample_rate: f64,
    channel_count: usize,
    shape: AsioBufferShape,
    producer: HandoffProducer,
    current: Vec<Sample>,
    write_pos: usize,
}

impl AsioRenderer {
    pub fn new(
        driver_name: &str,
        sample_rate: f64,
        channel_count: usize,
        shape: AsioBufferShape,
    ) -> AudioResult<(Self, HandoffConsumer)> {
        if driver_name.is_empty() {
            return Err(AudioError::BackendError(
                "no ASIO driver name configured".to_string(),
            ));
        }
        let (producer, consumer) = handoff(shape.depth, shape.frames_per_buffer * channel_count);
        let renderer = Self {
            driver_name: driver_name.to_string(),
            sample_rate,
            channel_count,
            shape,
            producer,
            current: vec![0.0; shape.frames_per_buffer * channel_count],
            write_pos: 0,
        };
        Ok((renderer, consumer))
    }

    pub fn driver_name(&self) -> &str {
        &self.driver_name
    }
}

impl Renderer for AsioRenderer {
    fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    fn channel_count(&self) -> usize {
        self.channel_count
    }

    fn available_frames(&self) -> usize {
        // The pro-driver path never blocks the capture loop; it always
        // reports room and relies on the hand-off queue for backpressure.
        self.shape.frames_per_buffer
    }

    fn push_frame(&mut self, frame: &[Sample]) -> AudioResult<()> {
        debug_assert_eq!(frame.len(), self.channel_count);
        let end = self.write_pos + self.channel_count;
        self.current[self.write_pos..end].copy_from_slice(frame);
        self.write_pos = end;
        if self.write_pos == self.current.len() {
            let mut next = self.producer.take_buffer(self.current.len());
            std::mem::swap(&mut next, &mut self.current);
            if let Err(_dropped) = self.producer.push_filled(next) {
                log::warn!("ASIO hand-off queue full; dropping a buffer");
            }
            self.write_pos = 0;
        }
        Ok(())
    }

    fn flush(&mut self) {
        self.write_pos = 0;
        self.current.iter_mut().for_each(|s| *s = 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_conversion_round_trips_at_extremes() {
        let bytes = sample_to_int32_le(1.0);
        let back = i32::from_le_bytes(bytes);
        assert_eq!(back, 2_147_483_647);

        let bytes = sample_to_int32_le(-1.0);
        let back = i32::from_le_bytes(bytes);
        assert_eq!(back, -2_147_483_647);
    }

    #[test]
    fn renderer_enqueues_once_the_current_buffer_fills() {
        let shape = AsioBufferShape { frames_per_buffer: 2, depth: 2 };
        let (mut renderer, mut consumer) = AsioRenderer::new("Test Driver", 48000.0, 2, shape).unwrap();
        renderer.push_frame(&[0.1, 0.2]).unwrap();
        assert!(consumer.pop_filled().is_none());
        renderer.push_frame(&[0.3, 0.4]).unwrap();
        let filled = consumer.pop_filled().unwrap();
        assert_eq!(&*filled, &[0.1, 0.2, 0.3, 0.4]);
    }
}
