//! Lock-free buffer hand-off between the capture/process thread and the
//! pro-driver's own callback thread.
//!
//! Two `rtrb` rings connect the two sides: `filled` carries buffers the
//! process thread has finished writing, owned by the driver thread until it
//! hands them back; `free` carries buffers the driver thread has drained and
//! returned for reuse, so steady-state operation allocates nothing.

use rtrb::{Consumer, Producer, RingBuffer};
use sp_core::Sample;

pub type Buffer = Box<[Sample]>;

/// The process-thread half: produces into `filled`, recycles from `free`.
pub struct HandoffProducer {
    filled: Producer<Buffer>,
    free: Consumer<Buffer>,
}

impl HandoffProducer {
    /// Take ownership of a free buffer, allocating one only if the free
    /// ring is currently empty (startup, or the driver thread falling
    /// behind).
    pub fn take_buffer(&mut self, frames_per_buffer: usize) -> Buffer {
        match self.free.pop() {
            Ok(buf) => buf,
            Err(_) => vec![0.0; frames_per_buffer].into_boxed_slice(),
        }
    }

    /// Hand a filled buffer to the driver thread. Returns the buffer back
    /// to the caller if the filled ring is full (driver thread stalled).
    pub fn push_filled(&mut self, buf: Buffer) -> Result<(), Buffer> {
        match self.filled.push(buf) {
            Ok(()) => Ok(()),
            Err(rtrb::PushError::Full(buf)) => Err(buf),
        }
    }

    pub fn filled_slots(&self) -> usize {
        self.filled.slots()
    }
}

/// The driver-thread half: consumes from `filled`, returns buffers via `free`.
pub struct HandoffConsumer {
    filled: Consumer<Buffer>,
    free: Producer<Buffer>,
}

impl HandoffConsumer {
    pub fn pop_filled(&mut self) -> Option<Buffer> {
        self.filled.pop().ok()
    }

    pub fn return_buffer(&mut self, buf: Buffer) {
        let _ = self.free.push(buf);
    }
}

/// Build a connected producer/consumer pair, pre-populating the free ring
/// with `depth` buffers of `frames_per_buffer` samples each so the first
/// `depth` handoffs never allocate.
pub fn handoff(depth: usize, frames_per_buffer: usize) -> (HandoffProducer, HandoffConsumer) {
    let (mut free_tx, free_rx) = RingBuffer::<Buffer>::new(depth.max(1));
    for _ in 0..depth {
        let _ = free_tx.push(vec![0.0; frames_per_buffer].into_boxed_slice());
    }
    let (filled_tx, filled_rx) = RingBuffer::<Buffer>::new(depth.max(1));

    (
        HandoffProducer { filled: filled_tx, free: free_rx },
        HandoffConsumer { filled: filled_rx, free: free_tx },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffers_round_trip_without_reallocating() {
        let (mut producer, mut consumer) = handoff(2, 16);
        let buf = producer.take_buffer(16);
        assert_eq!(buf.len(), 16);
        producer.push_filled(buf).unwrap();

        let received = consumer.pop_filled().unwrap();
        consumer.return_buffer(received);

        let reused = producer.take_buffer(16);
        assert_eq!(reused.len(), 16);
    }

    #[test]
    fn take_buffer_allocates_when_free_ring_is_empty() {
        let (mut producer, _consumer) = handoff(0, 8);
        let buf = producer.take_buffer(8);
        assert_eq!(buf.len(), 8);
    }
}
