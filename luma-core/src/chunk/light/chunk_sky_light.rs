//! Column-based sky exposure and the sideways spill between columns of different height.

use luma_utils::{BlockPos, ChunkPos, ColumnPos};

use super::{LightChannel, MAX_LEVEL};
use crate::chunk::{
    chunk_map::ChunkMap,
    heightmap::Heightmap,
    light_engine::{Direction, LightEngine, QueueEntry},
    section::Occupant,
};

/// Sky light helper of a chunk.
///
/// Voxels above their column's topmost opaque voxel are exposed and composited to 15 when read.
/// This helper lights the shadowed voxels next to them.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChunkSkyLight;

impl ChunkSkyLight {
    /// Spills sky light into the chunk from every shorter neighbouring column.
    ///
    /// Only runs for worlds with sky light once all eight neighbouring chunks are loaded.
    pub fn calculate(engine: &mut LightEngine, chunks: &mut ChunkMap, chunk: ChunkPos) {
        if !chunks.dimension().has_sky_light || chunks.neighbours(chunk).is_none() {
            return;
        }
        Self::flood_fill(engine, chunks, chunk);
    }

    /// Like [`Self::calculate`] but only consults the neighbouring columns that are loaded.
    pub(crate) fn flood_fill(engine: &mut LightEngine, chunks: &mut ChunkMap, chunk: ChunkPos) {
        if !chunks.dimension().has_sky_light {
            return;
        }
        for column in ColumnPos::all() {
            for dir in Direction::HORIZONTAL {
                Self::trace_sky_light_increase(engine, chunks, chunk, column, dir);
            }
        }
        engine.run_light_updates(chunks, LightChannel::Sky);
    }

    /// Seeds the voxels of `column` that are shadowed while the column in `dir` is open at the
    /// same height. They receive 14 from the open side and do not spread back towards it.
    fn trace_sky_light_increase(
        engine: &mut LightEngine,
        chunks: &ChunkMap,
        chunk: ChunkPos,
        column: ColumnPos,
        dir: Direction,
    ) {
        let dimension = chunks.dimension();
        let Some(top) = chunks.column_top(chunk, column) else {
            return;
        };
        if top == Heightmap::NONE {
            return;
        }
        let neighbour = dir.relative(chunk.block_at(column, top));
        let Some(neighbour_top) = chunks.column_top(neighbour.chunk_pos(), neighbour.column())
        else {
            return;
        };
        if neighbour_top != Heightmap::NONE && neighbour_top >= top {
            return;
        }

        let lowest = if neighbour_top == Heightmap::NONE {
            dimension.min_y() - 1
        } else {
            neighbour_top + 1
        };
        for y in lowest..=top.min(dimension.max_y()) {
            engine.enqueue_increase(
                chunk.block_at(column, y),
                QueueEntry::increase_skip_one_direction(MAX_LEVEL - 1, dir),
            );
        }
    }

    /// Updates sky light after the occupant at `pos` changed and its column top moved from
    /// `old_top` to `new_top`.
    pub fn on_block_change(
        engine: &mut LightEngine,
        chunks: &mut ChunkMap,
        pos: BlockPos,
        previous: Occupant,
        next: Occupant,
        old_top: i32,
        new_top: i32,
    ) {
        let dimension = chunks.dimension();
        if !dimension.has_sky_light {
            return;
        }
        let lowest_above = |top: i32| {
            if top == Heightmap::NONE {
                dimension.min_y() - 1
            } else {
                top + 1
            }
        };

        if new_top > old_top {
            // Lost exposure: everything down to the old top was open sky.
            for y in lowest_above(old_top)..=new_top {
                let shadowed = pos.with_y(y);
                if let Some(cell) = chunks.resolve(shadowed) {
                    engine.seed_decrease_from(chunks, shadowed, cell, LightChannel::Sky, MAX_LEVEL);
                }
            }
        } else if new_top < old_top {
            // Gained exposure: the column opened down to the new top.
            for y in lowest_above(new_top)..=old_top {
                let opened = pos.with_y(y);
                if let Some(cell) = chunks.resolve(opened) {
                    chunks.set_level(cell, LightChannel::Sky, 0);
                    engine.enqueue_increase(
                        opened,
                        QueueEntry::increase_sky_source_in_directions(true, true, true, true, true),
                    );
                }
            }
        } else if previous.opaque != next.opaque {
            if next.opaque {
                engine.seed_decrease(chunks, pos, LightChannel::Sky);
            } else {
                engine.pull_from_neighbours(pos);
            }
        } else {
            return;
        }
        engine.run_light_updates(chunks, LightChannel::Sky);
    }
}
