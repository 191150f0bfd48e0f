//! The light world: the chunk arena, the propagation engine and the change listeners.
//!
//! Every public mutating call is one logical operation. It leaves the light consistent for all
//! chunks whose neighbourhood is loaded and hands at most one batch of notifications to the
//! listeners before returning.

pub mod events;
#[cfg(test)]
mod tests;

use std::sync::Arc;

use arc_swap::ArcSwap;
use luma_utils::{BlockPos, ChunkPos};

use crate::{
    chunk::{
        Chunk,
        chunk_map::{ChunkMap, ChunkNeighbour, Dimension, SectionKey},
        light::{ChunkLight, ChunkSkyLight, LightLevel, SectionLight, SectionSnapshot},
        light_engine::LightEngine,
        section::{Occupant, SectionBlocks},
    },
    config::LightConfig,
    error::{ConfigError, WorldError},
};
use events::{LightListener, SectionLightUpdate};

/// Owner of all light state of one world.
pub struct LightWorld {
    chunks: ChunkMap,
    engine: LightEngine,
    listeners: Vec<Box<dyn LightListener>>,
}

impl LightWorld {
    /// Creates an empty world laid out as the config describes, after validating it.
    pub fn new(config: &LightConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            chunks: ChunkMap::new(config.dimension()),
            engine: LightEngine::with_capacity(config.queue_capacity),
            listeners: Vec::new(),
        })
    }

    /// The vertical layout.
    #[must_use]
    pub const fn dimension(&self) -> Dimension {
        self.chunks.dimension()
    }

    /// The loaded chunks.
    #[must_use]
    pub const fn chunks(&self) -> &ChunkMap {
        &self.chunks
    }

    /// Registers a listener for change batches.
    pub fn add_listener(&mut self, listener: impl LightListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Loads a chunk, lights it and exchanges light with the loaded chunks around it.
    ///
    /// `blocks` lists every section from the lowest. The new chunk's sections are notified once
    /// all eight of its neighbours are loaded.
    pub fn load_chunk(
        &mut self,
        pos: ChunkPos,
        blocks: Vec<SectionBlocks>,
    ) -> Result<(), WorldError> {
        if self.chunks.contains(pos) {
            return Err(WorldError::ChunkAlreadyLoaded(pos));
        }
        let dimension = self.dimension();
        if blocks.len() != dimension.section_count() {
            return Err(WorldError::SectionCount {
                expected: dimension.section_count(),
                actual: blocks.len(),
            });
        }

        let mut chunk = Chunk::new(pos, dimension, blocks);
        chunk.recalculate_heightmap();
        self.chunks.insert(chunk);
        for height in dimension.min_section..=dimension.max_section {
            self.chunks.mark_dirty(SectionKey { chunk: pos, height });
        }

        let mut batch = Vec::new();
        ChunkLight::calculate(&mut self.engine, &mut self.chunks, pos, false, false, &mut batch);
        for neighbour in ChunkNeighbour::ALL {
            let neighbour = neighbour.of(pos);
            if self.chunks.contains(neighbour) {
                // Completed by this load.
                ChunkSkyLight::calculate(&mut self.engine, &mut self.chunks, neighbour);
            }
        }
        ChunkLight::flush_pending(&mut self.chunks, None, &mut batch);

        log::debug!("Loaded chunk {pos}");
        self.dispatch(batch);
        Ok(())
    }

    /// Drops a chunk and the light it stored. Light it spread into its neighbours stays.
    pub fn unload_chunk(&mut self, pos: ChunkPos) -> Result<(), WorldError> {
        if !self.chunks.contains(pos) {
            return Err(WorldError::ChunkNotLoaded(pos));
        }
        ChunkLight::reset(&mut self.engine, &mut self.chunks, pos);
        self.chunks.remove(pos);

        let mut batch = Vec::new();
        ChunkLight::flush_pending(&mut self.chunks, None, &mut batch);
        log::debug!("Unloaded chunk {pos}");
        self.dispatch(batch);
        Ok(())
    }

    /// Replaces the occupant at `pos` and retraces light. Returns the previous occupant.
    pub fn set_block(&mut self, pos: BlockPos, occupant: Occupant) -> Result<Occupant, WorldError> {
        let key = self.section_key(pos)?;
        let Some(section) = self.chunks.section_mut(key) else {
            return Err(WorldError::ChunkNotLoaded(key.chunk));
        };
        let previous = section.blocks.set(pos.in_section(), occupant);
        if previous == occupant {
            return Ok(previous);
        }

        let mut batch = Vec::new();
        ChunkLight::on_block_change(
            &mut self.engine,
            &mut self.chunks,
            pos,
            previous,
            occupant,
            &mut batch,
        );
        self.dispatch(batch);
        Ok(previous)
    }

    /// Replaces the whole block data of one section and recomputes the light it affects.
    pub fn replace_section(
        &mut self,
        chunk: ChunkPos,
        height: i32,
        blocks: SectionBlocks,
    ) -> Result<(), WorldError> {
        let key = SectionKey { chunk, height };
        if !self.dimension().contains_section(height) {
            return Err(WorldError::OutOfRange { y: key.base_y() });
        }
        let Some(loaded) = self.chunks.get_mut(chunk) else {
            return Err(WorldError::ChunkNotLoaded(chunk));
        };
        let Some(section) = loaded.section_mut(height) else {
            return Err(WorldError::OutOfRange { y: key.base_y() });
        };
        section.blocks = blocks;
        let old_tops = loaded.light().heightmap().clone();
        loaded.recalculate_heightmap();
        let tops_changed = loaded.light().heightmap() != &old_tops;

        let mut batch = Vec::new();
        if tops_changed {
            // Composited sky may differ where no stored byte does.
            let dimension = self.dimension();
            for height in dimension.min_section..=dimension.max_section {
                self.chunks.mark_dirty(SectionKey { chunk, height });
            }
            ChunkLight::recalculate(
                &mut self.engine,
                &mut self.chunks,
                chunk,
                false,
                false,
                &mut batch,
            );
        } else {
            SectionLight::recalculate(&mut self.engine, &mut self.chunks, key);
        }
        if let Some(neighbours) = self.chunks.neighbours(chunk) {
            ChunkLight::fire_light_change(&mut self.chunks, key, &neighbours, true, &mut batch);
        }
        ChunkLight::flush_pending(&mut self.chunks, None, &mut batch);
        self.dispatch(batch);
        Ok(())
    }

    /// Recomputes all light of a chunk from its occupants and its neighbours.
    pub fn recalculate_chunk(&mut self, pos: ChunkPos) -> Result<(), WorldError> {
        if !self.chunks.contains(pos) {
            return Err(WorldError::ChunkNotLoaded(pos));
        }
        let mut batch = Vec::new();
        ChunkLight::recalculate(&mut self.engine, &mut self.chunks, pos, true, true, &mut batch);
        self.dispatch(batch);
        Ok(())
    }

    /// Pulls light from the loaded neighbours into a chunk.
    pub fn propagate_from_neighbours(&mut self, pos: ChunkPos) -> Result<(), WorldError> {
        if !self.chunks.contains(pos) {
            return Err(WorldError::ChunkNotLoaded(pos));
        }
        let mut batch = Vec::new();
        ChunkLight::propagate_from_neighbours(
            &mut self.engine,
            &mut self.chunks,
            pos,
            true,
            true,
            &mut batch,
        );
        self.dispatch(batch);
        Ok(())
    }

    /// The occupant at a position, if its section is loaded.
    #[must_use]
    pub fn occupant(&self, pos: BlockPos) -> Option<Occupant> {
        let key = SectionKey {
            chunk: pos.chunk_pos(),
            height: pos.section_height(),
        };
        self.chunks
            .section(key)
            .map(|section| section.blocks.get(pos.in_section()))
    }

    /// The live light at a position, sky exposure composited. Unloaded positions are dark.
    #[must_use]
    pub fn get_light(&self, pos: BlockPos) -> LightLevel {
        self.chunks
            .get(pos.chunk_pos())
            .map_or(LightLevel::DARK, |chunk| chunk.light_at(pos))
    }

    /// The handle readers keep to load a section's latest published light.
    #[must_use]
    pub fn section_snapshot(&self, key: SectionKey) -> Option<Arc<ArcSwap<SectionSnapshot>>> {
        self.chunks
            .section(key)
            .map(|section| section.light.published())
    }

    fn section_key(&self, pos: BlockPos) -> Result<SectionKey, WorldError> {
        let chunk = pos.chunk_pos();
        if !self.chunks.contains(chunk) {
            return Err(WorldError::ChunkNotLoaded(chunk));
        }
        let height = pos.section_height();
        if !self.dimension().contains_section(height) {
            return Err(WorldError::OutOfRange { y: pos.y() });
        }
        Ok(SectionKey { chunk, height })
    }

    fn dispatch(&mut self, batch: Vec<SectionLightUpdate>) {
        if batch.is_empty() {
            return;
        }
        log::trace!("Flushing {} section light updates", batch.len());
        self.listeners.retain(|listener| {
            let alive = listener.on_light_change(&batch);
            if !alive {
                log::warn!("Dropping disconnected light listener");
            }
            alive
        });
    }
}

impl std::fmt::Debug for LightWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LightWorld")
            .field("chunks", &self.chunks.len())
            .field("dimension", &self.dimension())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}
