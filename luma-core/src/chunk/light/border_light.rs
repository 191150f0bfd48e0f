//! Light planes just above and below the loaded section stack.

use luma_utils::{ChunkPos, ColumnPos, types::COLUMNS_PER_CHUNK};
use smallvec::SmallVec;

use super::{LightChannel, LightLevel};
use crate::chunk::{
    chunk_map::ChunkMap,
    light_engine::{Direction, LightEngine, QueueEntry},
};

/// Which end of the section stack a plane sits at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BorderSide {
    /// One layer above the highest section.
    Top,
    /// One layer below the lowest section.
    Bottom,
}

impl BorderSide {
    /// Both planes.
    pub const ALL: [BorderSide; 2] = [BorderSide::Top, BorderSide::Bottom];

    /// Direction from the plane into the section stack.
    #[must_use]
    pub const fn inward(self) -> Direction {
        match self {
            Self::Top => Direction::Down,
            Self::Bottom => Direction::Up,
        }
    }
}

/// A 16x16 light plane standing in for the section that would exist past the loaded range.
///
/// Light leaks into it instead of being cut off at the edge, spreads sideways into the planes of
/// the neighbouring chunks and flows back into the nearest section.
#[derive(Debug, Clone)]
pub struct BorderSectionLight {
    light: Box<[u8; COLUMNS_PER_CHUNK]>,
}

impl BorderSectionLight {
    /// Creates a dark plane.
    #[must_use]
    pub fn new() -> Self {
        Self {
            light: Box::new([0; COLUMNS_PER_CHUNK]),
        }
    }

    /// The stored light of a column.
    #[must_use]
    #[inline]
    pub fn get(&self, column: ColumnPos) -> LightLevel {
        LightLevel(self.light[column.index()])
    }

    /// Stores the light of a column. Returns whether it changed.
    #[inline]
    pub fn set(&mut self, column: ColumnPos, level: LightLevel) -> bool {
        let slot = &mut self.light[column.index()];
        let changed = *slot != level.0;
        *slot = level.0;
        changed
    }

    /// Zeroes the plane.
    pub fn reset(&mut self) {
        self.light.fill(0);
    }

    /// Whether no column holds any light.
    #[must_use]
    pub fn is_dark(&self) -> bool {
        self.light.iter().all(|byte| *byte == 0)
    }

    /// Resets the `side` plane of `chunk` and every neighbouring plane a decrease of `radius`
    /// starting at column `(x, z)` could reach. Returns the chunks whose plane was reset.
    ///
    /// This is a coarse invalidation: whole planes are dropped and must be repopulated with
    /// [`Self::repopulate`].
    pub fn decrease_check_level(
        chunks: &mut ChunkMap,
        chunk: ChunkPos,
        side: BorderSide,
        x: u8,
        z: u8,
        radius: u8,
    ) -> SmallVec<[ChunkPos; 9]> {
        let mut reset = SmallVec::new();
        let (x, z, radius) = (i32::from(x), i32::from(z), i32::from(radius));
        let reach = |at: i32| {
            let low = if at - radius < 0 { -1 } else { 0 };
            let high = if at + radius > 15 { 1 } else { 0 };
            low..=high
        };

        for dx in reach(x) {
            for dz in reach(z) {
                Self::reset_plane(chunks, chunk.offset(dx, dz), side, &mut reset);
            }
        }
        reset
    }

    fn reset_plane(
        chunks: &mut ChunkMap,
        chunk: ChunkPos,
        side: BorderSide,
        reset: &mut SmallVec<[ChunkPos; 9]>,
    ) {
        let Some(loaded) = chunks.get_mut(chunk) else {
            return;
        };
        let plane = loaded.light.border_mut(side);
        if !plane.is_dark() {
            plane.reset();
            chunks.update_y(chunk, side);
        }
        if !reset.contains(&chunk) {
            reset.push(chunk);
        }
    }

    /// Re-floods reset planes from the faces of their nearest sections and from neighbouring
    /// planes that kept their light.
    pub fn repopulate(
        engine: &mut LightEngine,
        chunks: &mut ChunkMap,
        side: BorderSide,
        reset: &[ChunkPos],
    ) {
        let dimension = chunks.dimension();
        let face_y = dimension.border_y(side) + side.inward().offset().1;
        let plane_y = dimension.border_y(side);

        for channel in LightChannel::ALL {
            for &chunk in reset {
                if !chunks.contains(chunk) {
                    continue;
                }
                for column in ColumnPos::all() {
                    engine.enqueue_increase(
                        chunk.block_at(column, face_y),
                        QueueEntry::repropagate_one_direction(side.inward().opposite()),
                    );
                }
                for dir in Direction::HORIZONTAL {
                    let (dx, _, dz) = dir.offset();
                    let neighbour = chunk.offset(dx, dz);
                    if reset.contains(&neighbour) || !chunks.contains(neighbour) {
                        continue;
                    }
                    for column in ColumnPos::all() {
                        let pos = chunk.block_at(column, plane_y);
                        let outside = dir.relative(pos);
                        if outside.chunk_pos() == neighbour {
                            engine.enqueue_increase(
                                outside,
                                QueueEntry::repropagate_one_direction(dir.opposite()),
                            );
                        }
                    }
                }
            }
            engine.run_light_updates(chunks, channel);
        }
    }
}

impl Default for BorderSectionLight {
    fn default() -> Self {
        Self::new()
    }
}
