//! Chunks, their sections and everything that stores or propagates light.

pub mod chunk_map;
pub mod heightmap;
pub mod light;
pub mod light_engine;
pub mod section;

use luma_utils::{BlockPos, ChunkPos};

use crate::chunk::{
    chunk_map::Dimension,
    light::{LightLevel, chunk_light::ChunkLight},
    section::{Section, SectionBlocks},
};

/// One world column: a stack of sections from `min_section` to `max_section` and its light state.
#[derive(Debug)]
pub struct Chunk {
    pos: ChunkPos,
    dimension: Dimension,
    sections: Box<[Section]>,
    pub(crate) light: ChunkLight,
}

impl Chunk {
    /// Creates a dark chunk. `blocks` lists the sections from the lowest; missing ones are air.
    #[must_use]
    pub fn new(pos: ChunkPos, dimension: Dimension, blocks: Vec<SectionBlocks>) -> Self {
        let mut blocks = blocks.into_iter();
        let sections = (0..dimension.section_count())
            .map(|_| Section::new(blocks.next().unwrap_or_default()))
            .collect();
        Self {
            pos,
            dimension,
            sections,
            light: ChunkLight::new(),
        }
    }

    /// The chunk position.
    #[must_use]
    pub const fn pos(&self) -> ChunkPos {
        self.pos
    }

    /// All sections, lowest first.
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Gets the section at a section height.
    #[must_use]
    pub fn section(&self, height: i32) -> Option<&Section> {
        let index = usize::try_from(height - self.dimension.min_section).ok()?;
        self.sections.get(index)
    }

    pub(crate) fn sections_mut(&mut self) -> &mut [Section] {
        &mut self.sections
    }

    pub(crate) fn section_mut(&mut self, height: i32) -> Option<&mut Section> {
        let index = usize::try_from(height - self.dimension.min_section).ok()?;
        self.sections.get_mut(index)
    }

    /// The light state of this chunk.
    #[must_use]
    pub const fn light(&self) -> &ChunkLight {
        &self.light
    }

    /// Composited light at a world position inside this chunk's columns.
    #[must_use]
    pub fn light_at(&self, pos: BlockPos) -> LightLevel {
        self.light.get(&self.sections, self.dimension, pos)
    }

    /// Rebuilds the heightmap from the current occupants.
    pub(crate) fn recalculate_heightmap(&mut self) {
        self.light
            .heightmap
            .recalculate(&self.sections, self.dimension.min_y());
    }
}
