//! The shared-event-driven backend: a `cpal` input stream feeding a capture
//! source, and a `cpal` output stream drained from a render source, each
//! side handed off through an `rtrb` ring so the cpal callback thread never
//! blocks and the capture/process thread never touches cpal directly.

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{BufferSize as CpalBufferSize, Device, SampleFormat, Stream, StreamConfig};
use rtrb::{Consumer, Producer, RingBuffer};
use sp_core::Sample;

use crate::traits::{CaptureFlags, CaptureSource, Renderer};
use crate::{AudioError, AudioResult};

const RING_FRAMES_OF_HEADROOM: usize = 8;

/// cpal input stream → `rtrb` ring → `CaptureSource` consumer.
pub struct CpalCaptureSource {
    _stream: Stream,
    consumer: Consumer<f32>,
    channel_count: usize,
    sample_rate: f64,
    was_silent: bool,
}

impl CpalCaptureSource {
    pub fn new(device: &Device, sample_rate: u32, channel_count: u16, buffer_frames: u32) -> AudioResult<Self> {
        let config = StreamConfig {
            channels: channel_count,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: CpalBufferSize::Fixed(buffer_frames),
        };
        let capacity = buffer_frames as usize * channel_count as usize * RING_FRAMES_OF_HEADROOM;
        let (mut producer, consumer) = RingBuffer::<f32>::new(capacity.max(64));

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    for &sample in data {
                        let _ = producer.push(sample);
                    }
                },
                |err| log::error!("capture stream error: {err}"),
                None,
            )
            .map_err(|e| AudioError::StreamBuildError(e.to_string()))?;
        stream.play().map_err(|e| AudioError::StreamError(e.to_string()))?;

        Ok(Self {
            _stream: stream,
            consumer,
            channel_count: channel_count as usize,
            sample_rate: sample_rate as f64,
            was_silent: false,
        })
    }
}

impl CaptureSource for CpalCaptureSource {
    fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    fn channel_count(&self) -> usize {
        self.channel_count
    }

    fn next_packet_frames(&mut self) -> usize {
        self.consumer.slots() / self.channel_count
    }

    fn acquire(&mut self, frames: usize, out: &mut [Sample]) -> AudioResult<CaptureFlags> {
        let needed = frames * self.channel_count;
        debug_assert!(out.len() >= needed);
        let mut any_nonzero = false;
        for slot in out.iter_mut().take(needed) {
            let sample = self.consumer.pop().unwrap_or(0.0) as f64;
            any_nonzero |= sample != 0.0;
            *slot = sample;
        }
        let silent = !any_nonzero;
        let flags = CaptureFlags {
            silent,
            discontinuity: false,
            timestamp_error: false,
        };
        self.was_silent = silent;
        Ok(flags)
    }
}

/// Process thread → `rtrb` ring → cpal output stream callback.
pub struct CpalSharedRenderer {
    _stream: Stream,
    producer: Producer<f32>,
    channel_count: usize,
    sample_rate: f64,
    ring_capacity: usize,
}

impl CpalSharedRenderer {
    pub fn new(device: &Device, sample_rate: u32, channel_count: u16, buffer_frames: u32) -> AudioResult<Self> {
        let config = StreamConfig {
            channels: channel_count,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: CpalBufferSize::Fixed(buffer_frames),
        };
        let capacity = buffer_frames as usize * channel_count as usize * RING_FRAMES_OF_HEADROOM;
        let (producer, mut consumer) = RingBuffer::<f32>::new(capacity.max(64));

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    for slot in data.iter_mut() {
                        *slot = consumer.pop().unwrap_or(0.0);
                    }
                },
                |err| log::error!("render stream error: {err}"),
                None,
            )
            .map_err(|e| AudioError::StreamBuildError(e.to_string()))?;
        stream.play().map_err(|e| AudioError::StreamError(e.to_string()))?;

        Ok(Self {
            _stream: stream,
            producer,
            channel_count: channel_count as usize,
            sample_rate: sample_rate as f64,
            ring_capacity: capacity.max(64),
        })
    }
}

impl Renderer for CpalSharedRenderer {
    fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    fn channel_count(&self) -> usize {
        self.channel_count
    }

    fn available_frames(&self) -> usize {
        self.producer.slots() / self.channel_count
    }

    fn push_frame(&mut self, frame: &[Sample]) -> AudioResult<()> {
        debug_assert_eq!(frame.len(), self.channel_count);
        for &sample in frame {
            if self.producer.push(sample as f32).is_err() {
                return Err(AudioError::StreamError("render ring is full".to_string()));
            }
        }
        Ok(())
    }

    fn flush(&mut self) {
        // rtrb's split Producer has no way to rewind the consumer side;
        // draining happens naturally as the output callback keeps pulling.
        let _ = self.ring_capacity;
    }
}

pub fn sample_format_supported(format: SampleFormat) -> bool {
    matches!(format, SampleFormat::F32)
}
