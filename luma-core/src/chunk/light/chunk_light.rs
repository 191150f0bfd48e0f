//! Per-chunk light orchestration.

use std::sync::Arc;

use luma_utils::{BlockPos, ChunkPos, ColumnPos};

use super::{
    BorderSectionLight, BorderSide, ChunkSkyLight, LightChannel, LightLevel, MAX_LEVEL,
    SectionLight, SectionSnapshot,
};
use crate::{
    chunk::{
        chunk_map::{ChunkMap, Dimension, SectionKey},
        heightmap::Heightmap,
        light_engine::{Direction, LightEngine, QueueEntry},
        section::{Occupant, Section},
    },
    world::events::SectionLightUpdate,
};

/// Light state owned by a chunk besides its sections: the heightmap and the two border planes.
#[derive(Debug)]
pub struct ChunkLight {
    pub(crate) heightmap: Heightmap,
    pub(crate) top: BorderSectionLight,
    pub(crate) bottom: BorderSectionLight,
}

impl ChunkLight {
    /// Creates dark planes and a fully exposed heightmap.
    #[must_use]
    pub fn new() -> Self {
        Self {
            heightmap: Heightmap::new(),
            top: BorderSectionLight::new(),
            bottom: BorderSectionLight::new(),
        }
    }

    /// The column tops.
    #[must_use]
    pub const fn heightmap(&self) -> &Heightmap {
        &self.heightmap
    }

    /// One of the border planes.
    #[must_use]
    pub const fn border(&self, side: BorderSide) -> &BorderSectionLight {
        match side {
            BorderSide::Top => &self.top,
            BorderSide::Bottom => &self.bottom,
        }
    }

    pub(crate) fn border_mut(&mut self, side: BorderSide) -> &mut BorderSectionLight {
        match side {
            BorderSide::Top => &mut self.top,
            BorderSide::Bottom => &mut self.bottom,
        }
    }

    /// Light at a position of this chunk's columns.
    ///
    /// The stored byte comes from the section, or from a border plane right past the loaded range.
    /// Sky light is forced to 15 strictly above the column's topmost opaque voxel.
    #[must_use]
    pub fn get(&self, sections: &[Section], dimension: Dimension, pos: BlockPos) -> LightLevel {
        let column = pos.column();
        let height = pos.section_height();
        let stored = if dimension.contains_section(height) {
            usize::try_from(height - dimension.min_section)
                .ok()
                .and_then(|index| sections.get(index))
                .map_or(LightLevel::DARK, |section| section.light.get(pos.in_section()))
        } else if pos.y() == dimension.border_y(BorderSide::Top) {
            self.top.get(column)
        } else if pos.y() == dimension.border_y(BorderSide::Bottom) {
            self.bottom.get(column)
        } else {
            LightLevel::DARK
        };

        if dimension.has_sky_light && self.heightmap.is_exposed(column, pos.y()) {
            stored.with_sky(MAX_LEVEL)
        } else {
            stored
        }
    }

    /// Applies an occupant change at `pos` that the caller already stored in the section.
    ///
    /// The heightmap is updated first since sky exposure depends on it, then block light and sky
    /// light are retraced. Notifications are collected into `batch` once all eight neighbouring
    /// chunks are loaded.
    pub fn on_block_change(
        engine: &mut LightEngine,
        chunks: &mut ChunkMap,
        pos: BlockPos,
        previous: Occupant,
        next: Occupant,
        batch: &mut Vec<SectionLightUpdate>,
    ) {
        let chunk_pos = pos.chunk_pos();
        let min_y = chunks.dimension().min_y();
        let Some(chunk) = chunks.get_mut(chunk_pos) else {
            return;
        };
        let column = pos.column();
        let old_top = chunk.light.heightmap.get(column);
        let new_top = if next.opaque {
            old_top.max(pos.y())
        } else if pos.y() == old_top {
            Heightmap::scan_column(chunk.sections(), min_y, column, pos.y() - 1)
        } else {
            old_top
        };
        chunk.light.heightmap.set(column, new_top);
        if old_top != new_top {
            Self::mark_exposure_change(chunks, chunk_pos, old_top, new_top);
        }

        SectionLight::on_block_change(engine, chunks, pos, previous, next);
        ChunkSkyLight::on_block_change(engine, chunks, pos, previous, next, old_top, new_top);

        if let Some(neighbours) = chunks.neighbours(chunk_pos) {
            let key = SectionKey {
                chunk: chunk_pos,
                height: pos.section_height(),
            };
            Self::fire_light_change(chunks, key, &neighbours, true, batch);
            Self::flush_pending(chunks, None, batch);
        }
    }

    /// Flags every section whose composited sky changed when a column top moved between
    /// `old_top` and `new_top`, even if none of its stored bytes did.
    fn mark_exposure_change(chunks: &mut ChunkMap, chunk: ChunkPos, old_top: i32, new_top: i32) {
        let dimension = chunks.dimension();
        if !dimension.has_sky_light {
            return;
        }
        let lower = old_top.min(new_top);
        let lowest = if lower == Heightmap::NONE {
            dimension.min_y()
        } else {
            lower + 1
        };
        let highest = old_top.max(new_top).min(dimension.max_y());
        let first = (lowest >> 4).max(dimension.min_section);
        for height in first..=highest >> 4 {
            chunks.mark_dirty(SectionKey { chunk, height });
        }
    }

    /// Collects one notification for every dirty section around `key`: the section itself and
    /// the ones above and below it when `fire_same_chunk_event` is set, then the three sections
    /// at the same heights in each of the eight `neighbours`.
    pub fn fire_light_change(
        chunks: &mut ChunkMap,
        key: SectionKey,
        neighbours: &[ChunkPos; 8],
        fire_same_chunk_event: bool,
        batch: &mut Vec<SectionLightUpdate>,
    ) {
        if fire_same_chunk_event {
            Self::collect(chunks, key, true, batch);
            for dy in [-1, 1] {
                let vertical = SectionKey {
                    chunk: key.chunk,
                    height: key.height + dy,
                };
                Self::collect(chunks, vertical, false, batch);
            }
        }
        for &chunk in neighbours {
            for dy in -1..=1 {
                let neighbour = SectionKey {
                    chunk,
                    height: key.height + dy,
                };
                Self::collect(chunks, neighbour, false, batch);
            }
        }
    }

    /// Fires [`Self::fire_light_change`] for every section of the chunk, then flushes whatever
    /// else was dirtied. Nothing is fired until all eight neighbours are loaded.
    pub fn fire_chunk_light_change(
        chunks: &mut ChunkMap,
        chunk: ChunkPos,
        fire_same_chunk_event: bool,
        batch: &mut Vec<SectionLightUpdate>,
    ) {
        let Some(neighbours) = chunks.neighbours(chunk) else {
            return;
        };
        let dimension = chunks.dimension();
        for height in dimension.min_section..=dimension.max_section {
            let key = SectionKey { chunk, height };
            Self::fire_light_change(chunks, key, &neighbours, fire_same_chunk_event, batch);
        }
        let skipped = (!fire_same_chunk_event).then_some(chunk);
        Self::flush_pending(chunks, skipped, batch);
    }

    /// Emits the sections dirtied outside the 3x3x3 neighbourhood, e.g. far down a column after a
    /// sky change. Sections of `skip` and of chunks missing a neighbour stay pending.
    pub(crate) fn flush_pending(
        chunks: &mut ChunkMap,
        skip: Option<ChunkPos>,
        batch: &mut Vec<SectionLightUpdate>,
    ) {
        for key in chunks.take_pending() {
            if skip == Some(key.chunk) || chunks.neighbours(key.chunk).is_none() {
                chunks.keep_pending(key);
                continue;
            }
            Self::collect(chunks, key, false, batch);
        }
    }

    /// Clears a section's dirty flag, publishes its snapshot and records the notification.
    ///
    /// Sections of chunks missing a neighbour are left dirty for a later flush.
    fn collect(
        chunks: &mut ChunkMap,
        key: SectionKey,
        origin: bool,
        batch: &mut Vec<SectionLightUpdate>,
    ) {
        if chunks.neighbours(key.chunk).is_none() {
            return;
        }
        let has_sky = chunks.dimension().has_sky_light;
        let Some(chunk) = chunks.get_mut(key.chunk) else {
            return;
        };
        if !chunk
            .section(key.height)
            .is_some_and(|section| section.light.is_dirty())
        {
            return;
        }
        let sky_tops = has_sky.then(|| chunk.light.heightmap.clone());
        let Some(section) = chunk.section_mut(key.height) else {
            return;
        };
        section.light.take_update();
        let snapshot = Arc::new(SectionSnapshot::new(
            section.light.array().clone(),
            key.base_y(),
            sky_tops,
        ));
        section.light.publish(Arc::clone(&snapshot));
        batch.push(SectionLightUpdate {
            chunk: key.chunk,
            section_height: key.height,
            origin,
            snapshot,
        });
    }

    /// Recomputes all light of the chunk from scratch.
    ///
    /// Every lit cell of the chunk, planes included, seeds one removal wave per channel, so light
    /// the chunk supplied to its neighbours is withdrawn as well. The chunk is then re-flooded
    /// from its emitters, its open sky and the faces of its loaded neighbours.
    pub fn recalculate(
        engine: &mut LightEngine,
        chunks: &mut ChunkMap,
        chunk: ChunkPos,
        fire_event: bool,
        fire_same_chunk_event: bool,
        batch: &mut Vec<SectionLightUpdate>,
    ) {
        let Some(loaded) = chunks.get_mut(chunk) else {
            return;
        };
        loaded.recalculate_heightmap();
        log::debug!("Recalculating light of chunk {chunk}");

        let dimension = chunks.dimension();
        for channel in LightChannel::ALL {
            let seeds = Self::lit_cells(chunks, chunk, channel);
            for (pos, level) in seeds {
                if let Some(cell) = chunks.resolve(pos) {
                    engine.seed_decrease_from(chunks, pos, cell, channel, level);
                }
            }
            engine.propagate_decreases(chunks, channel);

            if channel == LightChannel::Block {
                Self::enqueue_emitters(engine, chunks, chunk);
            }
            Self::enqueue_neighbour_pulls(engine, chunks, chunk);
            engine.propagate_increases(chunks, channel);
        }
        if dimension.has_sky_light {
            ChunkSkyLight::flood_fill(engine, chunks, chunk);
        }

        if fire_event {
            Self::fire_chunk_light_change(chunks, chunk, fire_same_chunk_event, batch);
        }
    }

    /// Lights a freshly loaded chunk without clearing anything first: its emitters, the light
    /// of its loaded neighbours' facing cells, and sky spill once the neighbourhood is complete.
    pub fn calculate(
        engine: &mut LightEngine,
        chunks: &mut ChunkMap,
        chunk: ChunkPos,
        fire_event: bool,
        fire_same_chunk_event: bool,
        batch: &mut Vec<SectionLightUpdate>,
    ) {
        let dimension = chunks.dimension();
        for height in dimension.min_section..=dimension.max_section {
            SectionLight::calculate(engine, chunks, SectionKey { chunk, height });
        }
        for channel in LightChannel::ALL {
            Self::enqueue_neighbour_pulls(engine, chunks, chunk);
            engine.run_light_updates(chunks, channel);
        }
        ChunkSkyLight::calculate(engine, chunks, chunk);

        if fire_event {
            Self::fire_chunk_light_change(chunks, chunk, fire_same_chunk_event, batch);
        }
    }

    /// Drops all light stored by the chunk and invalidates the border planes around it.
    ///
    /// Light the chunk spread into neighbouring sections stays where it is.
    pub fn reset(engine: &mut LightEngine, chunks: &mut ChunkMap, chunk: ChunkPos) {
        let Some(loaded) = chunks.get_mut(chunk) else {
            return;
        };
        for section in loaded.sections_mut() {
            section.light.clear();
        }
        for side in BorderSide::ALL {
            loaded.light.border_mut(side).reset();
        }

        for side in BorderSide::ALL {
            let reset =
                BorderSectionLight::decrease_check_level(chunks, chunk, side, 8, 8, MAX_LEVEL);
            let neighbours: Vec<ChunkPos> = reset.into_iter().filter(|pos| *pos != chunk).collect();
            BorderSectionLight::repopulate(engine, chunks, side, &neighbours);
        }
    }

    /// Pulls light from the facing cells of every loaded horizontal neighbour into the chunk,
    /// then spills sky light in once the neighbourhood is complete.
    pub fn propagate_from_neighbours(
        engine: &mut LightEngine,
        chunks: &mut ChunkMap,
        chunk: ChunkPos,
        fire_event: bool,
        fire_same_chunk_event: bool,
        batch: &mut Vec<SectionLightUpdate>,
    ) {
        if !chunks.contains(chunk) {
            return;
        }
        for channel in LightChannel::ALL {
            Self::enqueue_neighbour_pulls(engine, chunks, chunk);
            engine.run_light_updates(chunks, channel);
        }
        ChunkSkyLight::calculate(engine, chunks, chunk);

        if fire_event {
            Self::fire_chunk_light_change(chunks, chunk, fire_same_chunk_event, batch);
        }
    }

    /// Queues a one-direction re-propagation from every cell of a loaded neighbour that touches
    /// the chunk, planes included.
    fn enqueue_neighbour_pulls(engine: &mut LightEngine, chunks: &ChunkMap, chunk: ChunkPos) {
        let dimension = chunks.dimension();
        let lowest = dimension.border_y(BorderSide::Bottom);
        let highest = dimension.border_y(BorderSide::Top);

        for dir in Direction::HORIZONTAL {
            let (dx, _, dz) = dir.offset();
            if !chunks.contains(chunk.offset(dx, dz)) {
                continue;
            }
            for i in 0..16u8 {
                let column = match dir {
                    Direction::North => ColumnPos::new(i, 0),
                    Direction::South => ColumnPos::new(i, 15),
                    Direction::West => ColumnPos::new(0, i),
                    _ => ColumnPos::new(15, i),
                };
                for y in lowest..=highest {
                    engine.enqueue_increase(
                        dir.relative(chunk.block_at(column, y)),
                        QueueEntry::repropagate_one_direction(dir.opposite()),
                    );
                }
            }
        }
    }

    fn enqueue_emitters(engine: &mut LightEngine, chunks: &ChunkMap, chunk: ChunkPos) {
        let Some(loaded) = chunks.get(chunk) else {
            return;
        };
        let dimension = chunks.dimension();
        for height in dimension.min_section..=dimension.max_section {
            let Some(section) = loaded.section(height) else {
                continue;
            };
            let key = SectionKey { chunk, height };
            for (local, luminance) in section.blocks.emitters() {
                engine.enqueue_increase(
                    key.block_at(local),
                    QueueEntry::increase_from_emission(luminance),
                );
            }
        }
    }

    /// Every cell of the chunk, planes included, holding light on `channel`.
    fn lit_cells(chunks: &ChunkMap, chunk: ChunkPos, channel: LightChannel) -> Vec<(BlockPos, u8)> {
        let Some(loaded) = chunks.get(chunk) else {
            return Vec::new();
        };
        let dimension = chunks.dimension();
        let mut cells = Vec::new();
        for height in dimension.min_section..=dimension.max_section {
            let Some(section) = loaded.section(height) else {
                continue;
            };
            let key = SectionKey { chunk, height };
            cells.extend(
                section
                    .light
                    .array()
                    .lit()
                    .map(|(local, level)| (key.block_at(local), channel.get(level)))
                    .filter(|(_, level)| *level > 0),
            );
        }
        for side in BorderSide::ALL {
            let plane = loaded.light.border(side);
            let y = dimension.border_y(side);
            cells.extend(
                ColumnPos::all()
                    .map(|column| (chunk.block_at(column, y), channel.get(plane.get(column))))
                    .filter(|(_, level)| *level > 0),
            );
        }
        cells
    }
}

impl Default for ChunkLight {
    fn default() -> Self {
        Self::new()
    }
}
