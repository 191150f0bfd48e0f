//! FIFO worklist for light propagation.

use luma_utils::BlockPos;

use super::queue_entry::QueueEntry;

type Slot = (BlockPos, QueueEntry);

/// A FIFO ring buffer of `(BlockPos, QueueEntry)` pairs.
///
/// The buffer length is always a power of two so wrapping is a mask. It only grows; a drained
/// queue keeps its allocation for the next operation.
#[derive(Debug)]
pub struct LightQueue {
    buffer: Vec<Slot>,
    head: usize,
    len: usize,
}

impl LightQueue {
    /// Default number of pre-allocated slots.
    pub const DEFAULT_CAPACITY: usize = 4096;

    /// Creates a queue with [`Self::DEFAULT_CAPACITY`] slots.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates a queue with at least `capacity` slots, rounded up to a power of two.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(16).next_power_of_two();
        Self {
            buffer: vec![(BlockPos::default(), QueueEntry::increase_from_emission(0)); capacity],
            head: 0,
            len: 0,
        }
    }

    #[inline]
    fn mask(&self) -> usize {
        self.buffer.len() - 1
    }

    /// Appends an entry to the back of the queue.
    #[inline]
    pub fn enqueue(&mut self, pos: BlockPos, entry: QueueEntry) {
        if self.len == self.buffer.len() {
            self.grow();
        }
        let tail = (self.head + self.len) & self.mask();
        self.buffer[tail] = (pos, entry);
        self.len += 1;
    }

    /// Removes the entry at the front of the queue.
    #[inline]
    pub fn dequeue(&mut self) -> Option<Slot> {
        if self.len == 0 {
            return None;
        }
        let slot = self.buffer[self.head];
        self.head = (self.head + 1) & self.mask();
        self.len -= 1;
        Some(slot)
    }

    /// Checks if the queue is empty.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Doubles the buffer, unwrapping the live range to the front.
    fn grow(&mut self) {
        let old_len = self.buffer.len();
        self.buffer.rotate_left(self.head);
        self.buffer.extend_from_within(..old_len);
        self.head = 0;
        log::trace!("Light queue grew to {} slots", self.buffer.len());
    }
}

impl Default for LightQueue {
    fn default() -> Self {
        Self::new()
    }
}
