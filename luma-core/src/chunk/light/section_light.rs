//! Light of one section and the block-light tracing that starts inside it.

use std::sync::Arc;

use arc_swap::ArcSwap;
use luma_utils::{BlockPos, InSectionPos};

use super::{LightArray, LightChannel, LightLevel, SectionSnapshot};
use crate::chunk::{
    chunk_map::{ChunkMap, SectionKey},
    light_engine::{Direction, LightEngine, QueueEntry},
    section::Occupant,
};

/// The light bytes of a section, its dirty flag and the snapshot last published for it.
#[derive(Debug)]
pub struct SectionLight {
    light: LightArray,
    /// Set whenever a byte changes, cleared when a notification for the section is emitted.
    update: bool,
    published: Arc<ArcSwap<SectionSnapshot>>,
}

impl SectionLight {
    /// Creates a dark section light.
    #[must_use]
    pub fn new() -> Self {
        Self {
            light: LightArray::new(),
            update: false,
            published: Arc::new(ArcSwap::from_pointee(SectionSnapshot::default())),
        }
    }

    /// The stored light at a voxel.
    #[must_use]
    #[inline]
    pub fn get(&self, pos: InSectionPos) -> LightLevel {
        self.light.get(pos)
    }

    /// The stored value of one channel at a voxel.
    #[must_use]
    #[inline]
    pub fn level(&self, pos: InSectionPos, channel: LightChannel) -> u8 {
        channel.get(self.light.get(pos))
    }

    pub(crate) fn set(&mut self, pos: InSectionPos, channel: LightChannel, value: u8) -> bool {
        let level = channel.set(self.light.get(pos), value);
        let changed = self.light.set(pos, level);
        self.update |= changed;
        changed
    }

    /// Zeroes both channels of every voxel.
    pub(crate) fn clear(&mut self) {
        if !self.light.is_dark() {
            self.update = true;
        }
        self.light.clear();
    }

    /// The raw light bytes.
    #[must_use]
    pub const fn array(&self) -> &LightArray {
        &self.light
    }

    /// Whether the light changed since the last notification.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.update
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.update = true;
    }

    /// Clears the dirty flag, returning whether it was set.
    pub(crate) fn take_update(&mut self) -> bool {
        std::mem::take(&mut self.update)
    }

    /// Handle readers keep to load the latest published snapshot.
    #[must_use]
    pub fn published(&self) -> Arc<ArcSwap<SectionSnapshot>> {
        Arc::clone(&self.published)
    }

    pub(crate) fn publish(&self, snapshot: Arc<SectionSnapshot>) {
        self.published.store(snapshot);
    }

    /// Reacts to an occupant change at `pos` on the block channel.
    ///
    /// Brighter sources spread out directly. Anything that can only lower light runs a removal
    /// wave from the voxel and re-floods from whatever still lights the area.
    pub fn on_block_change(
        engine: &mut LightEngine,
        chunks: &mut ChunkMap,
        pos: BlockPos,
        previous: Occupant,
        next: Occupant,
    ) {
        let channel = LightChannel::Block;
        let was_blocking = channel.is_blocked_by(previous);
        let blocking = channel.is_blocked_by(next);
        if previous.luminance == next.luminance && was_blocking == blocking {
            return;
        }

        if was_blocking && !blocking {
            engine.pull_from_neighbours(pos);
            if next.luminance > 0 {
                engine.enqueue_increase(pos, QueueEntry::increase_from_emission(next.luminance));
            }
            Self::increase_sources(engine, chunks);
        } else if !blocking && next.luminance > previous.luminance {
            Self::trace_increase(engine, chunks, pos, next.luminance);
        } else {
            Self::trace_decrease(engine, chunks, pos);
            Self::increase_sources(engine, chunks);
        }
    }

    /// Spreads block light of `level` from `pos`.
    ///
    /// Only spreads where it brightens a neighbour. Forced spreading, which re-sends a cell's
    /// stored value even to neighbours that are already as bright, is queued through
    /// [`QueueEntry::repropagate_all_directions`] and [`QueueEntry::repropagate_one_direction`]
    /// by the removal wave and the neighbour pulls, and is consumed by the same increase phase.
    pub fn trace_increase(engine: &mut LightEngine, chunks: &mut ChunkMap, pos: BlockPos, level: u8) {
        engine.enqueue_increase(pos, QueueEntry::increase_from_emission(level));
        engine.propagate_increases(chunks, LightChannel::Block);
    }

    /// Clears the block light that was supplied through `pos`, collecting roots for
    /// [`Self::increase_sources`].
    pub fn trace_decrease(engine: &mut LightEngine, chunks: &mut ChunkMap, pos: BlockPos) {
        engine.seed_decrease(chunks, pos, LightChannel::Block);
        engine.propagate_decreases(chunks, LightChannel::Block);
    }

    /// Re-floods block light from the roots and emitters found by the last removal wave.
    pub fn increase_sources(engine: &mut LightEngine, chunks: &mut ChunkMap) {
        engine.propagate_increases(chunks, LightChannel::Block);
    }

    /// Recomputes a section from scratch after its occupants were replaced wholesale.
    ///
    /// Light the old contents supplied is removed from the section and everything it reached,
    /// then the section is re-flooded from its own emitters and from its six faces.
    pub fn recalculate(engine: &mut LightEngine, chunks: &mut ChunkMap, key: SectionKey) {
        let Some(section) = chunks.section(key) else {
            return;
        };
        let lit: Vec<(InSectionPos, LightLevel)> = section.light.array().lit().collect();
        let emitters: Vec<(InSectionPos, u8)> = section.blocks.emitters().collect();

        for channel in LightChannel::ALL {
            for &(local, level) in &lit {
                let stored = channel.get(level);
                let pos = key.block_at(local);
                if let Some(cell) = chunks.resolve(pos) {
                    engine.seed_decrease_from(chunks, pos, cell, channel, stored);
                }
            }
            engine.propagate_decreases(chunks, channel);

            if channel == LightChannel::Block {
                for &(local, luminance) in &emitters {
                    engine.enqueue_increase(
                        key.block_at(local),
                        QueueEntry::increase_from_emission(luminance),
                    );
                }
            }
            Self::enqueue_face_pulls(engine, key);
            engine.propagate_increases(chunks, channel);
        }
    }

    /// Seeds the section's emitters without clearing anything first. Used for fresh sections.
    pub fn calculate(engine: &mut LightEngine, chunks: &mut ChunkMap, key: SectionKey) {
        let Some(section) = chunks.section(key) else {
            return;
        };
        for (local, luminance) in section.blocks.emitters() {
            engine.enqueue_increase(
                key.block_at(local),
                QueueEntry::increase_from_emission(luminance),
            );
        }
        engine.propagate_increases(chunks, LightChannel::Block);
    }

    /// Queues re-propagations from every cell touching the section's faces into the section.
    fn enqueue_face_pulls(engine: &mut LightEngine, key: SectionKey) {
        for a in 0..16u8 {
            for b in 0..16u8 {
                let faces = [
                    (InSectionPos::new(a, 0, b), Direction::Down),
                    (InSectionPos::new(a, 15, b), Direction::Up),
                    (InSectionPos::new(a, b, 0), Direction::North),
                    (InSectionPos::new(a, b, 15), Direction::South),
                    (InSectionPos::new(0, a, b), Direction::West),
                    (InSectionPos::new(15, a, b), Direction::East),
                ];
                for (local, dir) in faces {
                    engine.enqueue_increase(
                        dir.relative(key.block_at(local)),
                        QueueEntry::repropagate_one_direction(dir.opposite()),
                    );
                }
            }
        }
    }
}

impl Default for SectionLight {
    fn default() -> Self {
        Self::new()
    }
}
