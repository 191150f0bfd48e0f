//! Base light engine for flood-fill light propagation.

use luma_utils::BlockPos;

use super::{Direction, light_queue::LightQueue, queue_entry::QueueEntry};
use crate::chunk::{
    chunk_map::{Cell, ChunkMap},
    light::{LightChannel, MAX_LEVEL},
};

/// Flood-fill light propagation over a [`ChunkMap`].
///
/// This structure maintains two FIFO queues:
/// - `increase_queue`: sources, re-propagations and every step of a spreading wave
/// - `decrease_queue`: every step of a removal wave
///
/// A run processes all decreases first, then all increases. Removal queues roots into the
/// increase queue, so the second phase re-floods whatever the first one over-cleared.
/// The engine holds no light itself; it is reused for every operation of a world.
#[derive(Debug)]
pub struct LightEngine {
    /// Queue for light increase operations.
    increase_queue: LightQueue,
    /// Queue for light decrease operations.
    decrease_queue: LightQueue,
}

impl LightEngine {
    /// Creates a light engine with default queue capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(LightQueue::DEFAULT_CAPACITY)
    }

    /// Creates a light engine whose queues start with `capacity` slots each.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            increase_queue: LightQueue::with_capacity(capacity),
            decrease_queue: LightQueue::with_capacity(capacity),
        }
    }

    /// Enqueues a light increase at the given position.
    pub fn enqueue_increase(&mut self, pos: BlockPos, entry: QueueEntry) {
        self.increase_queue.enqueue(pos, entry);
    }

    /// Enqueues a light decrease at the given position.
    pub fn enqueue_decrease(&mut self, pos: BlockPos, entry: QueueEntry) {
        self.decrease_queue.enqueue(pos, entry);
    }

    /// Runs all queued updates on one channel: decreases first, then increases.
    pub fn run_light_updates(&mut self, chunks: &mut ChunkMap, channel: LightChannel) {
        self.propagate_decreases(chunks, channel);
        self.propagate_increases(chunks, channel);
        debug_assert!(!self.has_work(), "Light updates left queued after a run");
    }

    /// Checks if there are any pending light updates.
    #[must_use]
    pub fn has_work(&self) -> bool {
        !self.increase_queue.is_empty() || !self.decrease_queue.is_empty()
    }

    /// Starts a removal wave at `pos` from the value the cell currently stores.
    ///
    /// The cell is zeroed immediately. If its occupant still emits on this channel, it is
    /// re-seeded so the relight phase restores it.
    pub(crate) fn seed_decrease(&mut self, chunks: &mut ChunkMap, pos: BlockPos, channel: LightChannel) {
        let Some(cell) = chunks.resolve(pos) else {
            return;
        };
        let stored = chunks.level(cell, channel);
        self.seed_decrease_from(chunks, pos, cell, channel, stored);
    }

    /// Starts a removal wave at `pos` as if the cell held `level`.
    pub(crate) fn seed_decrease_from(
        &mut self,
        chunks: &mut ChunkMap,
        pos: BlockPos,
        cell: Cell,
        channel: LightChannel,
        level: u8,
    ) {
        if level > 0 {
            chunks.set_level(cell, channel, 0);
            self.decrease_queue
                .enqueue(pos, QueueEntry::decrease_all_directions(level));
        }
        let emission = channel.emission(chunks.occupant(cell));
        if emission > 0 {
            self.increase_queue
                .enqueue(pos, QueueEntry::increase_from_emission(emission));
        }
    }

    /// Queues forced re-propagations from the six neighbours of `pos` towards it.
    pub(crate) fn pull_from_neighbours(&mut self, pos: BlockPos) {
        for dir in Direction::ALL {
            self.increase_queue.enqueue(
                dir.relative(pos),
                QueueEntry::repropagate_one_direction(dir.opposite()),
            );
        }
    }

    /// Processes the removal wave.
    ///
    /// A neighbour is cleared when its light is weaker than the light of the cell the wave comes
    /// from and fits inside the origin level minus the path walked so far. Anything at least as
    /// bright is supplied elsewhere and becomes a root; so does open sky.
    pub(crate) fn propagate_decreases(&mut self, chunks: &mut ChunkMap, channel: LightChannel) {
        while let Some((pos, entry)) = self.decrease_queue.dequeue() {
            let Some(cell) = chunks.resolve(pos) else {
                continue;
            };
            let previous = entry.level();
            let budget = entry
                .origin_level()
                .saturating_sub(entry.path_length().saturating_add(1));

            for dir in Direction::ALL {
                if !entry.should_propagate(dir) || !cell.allows(dir) {
                    continue;
                }
                let neighbour = dir.relative(pos);
                let Some(neighbour_cell) = chunks.resolve(neighbour) else {
                    continue;
                };
                if channel == LightChannel::Sky && chunks.is_exposed(neighbour) {
                    self.increase_queue
                        .enqueue(neighbour, QueueEntry::repropagate_all_directions());
                    continue;
                }

                let stored = chunks.level(neighbour_cell, channel);
                if stored == 0 {
                    continue;
                }
                if stored < previous && stored <= budget {
                    chunks.set_level(neighbour_cell, channel, 0);
                    self.decrease_queue.enqueue(
                        neighbour,
                        QueueEntry::decrease_skip_one_direction(entry, stored, dir.opposite()),
                    );
                    let emission = channel.emission(chunks.occupant(neighbour_cell));
                    if emission > 0 {
                        self.increase_queue
                            .enqueue(neighbour, QueueEntry::increase_from_emission(emission));
                    }
                } else {
                    self.increase_queue
                        .enqueue(neighbour, QueueEntry::repropagate_all_directions());
                }
            }
        }
    }

    /// Processes the spreading wave: pure max-relaxation, one level lost per step.
    pub(crate) fn propagate_increases(&mut self, chunks: &mut ChunkMap, channel: LightChannel) {
        while let Some((pos, entry)) = self.increase_queue.dequeue() {
            let Some(cell) = chunks.resolve(pos) else {
                continue;
            };

            let level = if channel == LightChannel::Sky && chunks.is_exposed(pos) {
                // Open sky is composited, never stored. Only sources and roots spread from it.
                if !(entry.is_forced() || entry.is_from_emission()) {
                    continue;
                }
                MAX_LEVEL
            } else if entry.is_forced() {
                chunks.level(cell, channel)
            } else {
                let occupant = chunks.occupant(cell);
                if channel.is_blocked_by(occupant) {
                    continue;
                }
                let level = entry.level();
                // The cell's own source is stronger and is traced by its own entry.
                if !entry.is_from_emission() && channel.emission(occupant) > level {
                    continue;
                }
                if chunks.level(cell, channel) >= level {
                    continue;
                }
                chunks.set_level(cell, channel, level);
                level
            };

            if level <= 1 {
                if let Cell::Border { chunk, side, .. } = cell {
                    chunks.update_y(chunk, side);
                }
                continue;
            }

            for dir in Direction::ALL {
                if entry.should_propagate(dir) && cell.allows(dir) {
                    self.increase_queue.enqueue(
                        dir.relative(pos),
                        QueueEntry::increase_skip_one_direction(level - 1, dir.opposite()),
                    );
                }
            }
        }
    }
}

impl Default for LightEngine {
    fn default() -> Self {
        Self::new()
    }
}
