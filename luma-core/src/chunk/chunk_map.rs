//! The chunk arena.
//!
//! Chunks never point at each other. A neighbour is whatever the map holds under the neighbouring
//! key at the time of the lookup, so loading and unloading never has to patch references.

use luma_utils::{BlockPos, ChunkPos, ColumnPos, InSectionPos};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::chunk::{
    Chunk,
    light::{LightChannel, LightLevel, border_light::BorderSide},
    light_engine::Direction,
    section::{Occupant, Section},
};

/// Vertical extent of a world and whether it has a sky.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimension {
    /// Lowest section height, inclusive.
    pub min_section: i32,
    /// Highest section height, inclusive.
    pub max_section: i32,
    /// Whether open-sky exposure produces sky light.
    pub has_sky_light: bool,
}

impl Dimension {
    /// Number of sections in every chunk.
    #[must_use]
    pub const fn section_count(self) -> usize {
        (self.max_section - self.min_section + 1) as usize
    }

    /// Lowest voxel y inside the loaded range.
    #[must_use]
    pub const fn min_y(self) -> i32 {
        self.min_section * 16
    }

    /// Highest voxel y inside the loaded range.
    #[must_use]
    pub const fn max_y(self) -> i32 {
        self.max_section * 16 + 15
    }

    /// Whether the section height lies inside the loaded range.
    #[must_use]
    pub const fn contains_section(self, height: i32) -> bool {
        height >= self.min_section && height <= self.max_section
    }

    /// The section height nearest to a border plane.
    #[must_use]
    pub const fn nearest_section(self, side: BorderSide) -> i32 {
        match side {
            BorderSide::Top => self.max_section,
            BorderSide::Bottom => self.min_section,
        }
    }

    /// The y of a border plane.
    #[must_use]
    pub const fn border_y(self, side: BorderSide) -> i32 {
        match side {
            BorderSide::Top => self.max_y() + 1,
            BorderSide::Bottom => self.min_y() - 1,
        }
    }
}

impl Default for Dimension {
    fn default() -> Self {
        Self {
            min_section: -4,
            max_section: 19,
            has_sky_light: true,
        }
    }
}

/// Addresses one section of the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectionKey {
    /// The owning chunk.
    pub chunk: ChunkPos,
    /// The section height.
    pub height: i32,
}

impl SectionKey {
    /// World y of the section's lowest voxel layer.
    #[must_use]
    pub const fn base_y(self) -> i32 {
        self.height * 16
    }

    /// The world position of a voxel of this section.
    #[must_use]
    pub const fn block_at(self, local: InSectionPos) -> BlockPos {
        BlockPos::new(
            self.chunk.min_block_x() + local.x() as i32,
            self.base_y() + local.y() as i32,
            self.chunk.min_block_z() + local.z() as i32,
        )
    }
}

/// The eight chunks around a chunk, in the order notifications are collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkNeighbour {
    /// -x -z
    NorthWest,
    /// -x
    West,
    /// -x +z
    SouthWest,
    /// -z
    North,
    /// +z
    South,
    /// +x -z
    NorthEast,
    /// +x
    East,
    /// +x +z
    SouthEast,
}

impl ChunkNeighbour {
    /// All neighbours, x-major then z.
    pub const ALL: [ChunkNeighbour; 8] = [
        ChunkNeighbour::NorthWest,
        ChunkNeighbour::West,
        ChunkNeighbour::SouthWest,
        ChunkNeighbour::North,
        ChunkNeighbour::South,
        ChunkNeighbour::NorthEast,
        ChunkNeighbour::East,
        ChunkNeighbour::SouthEast,
    ];

    /// Returns `(dx, dz)` in chunks.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::NorthWest => (-1, -1),
            Self::West => (-1, 0),
            Self::SouthWest => (-1, 1),
            Self::North => (0, -1),
            Self::South => (0, 1),
            Self::NorthEast => (1, -1),
            Self::East => (1, 0),
            Self::SouthEast => (1, 1),
        }
    }

    /// The neighbouring chunk position.
    #[must_use]
    pub fn of(self, pos: ChunkPos) -> ChunkPos {
        let (dx, dz) = self.offset();
        pos.offset(dx, dz)
    }
}

/// A storage cell light can live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    /// A voxel inside a loaded section.
    Section {
        /// The section.
        key: SectionKey,
        /// The voxel inside it.
        local: InSectionPos,
    },
    /// A cell of a border plane.
    Border {
        /// The chunk owning the plane.
        chunk: ChunkPos,
        /// Which plane.
        side: BorderSide,
        /// The column of the plane.
        column: ColumnPos,
    },
}

impl Cell {
    /// Whether light may leave this cell in the given direction.
    ///
    /// Border planes spread sideways and back into the section stack, never further out.
    #[must_use]
    #[inline]
    pub fn allows(self, dir: Direction) -> bool {
        match self {
            Self::Section { .. } => true,
            Self::Border { side, .. } => dir.is_horizontal() || dir == side.inward(),
        }
    }
}

/// All loaded chunks of one world, addressed by position.
#[derive(Debug)]
pub struct ChunkMap {
    chunks: FxHashMap<ChunkPos, Chunk>,
    dimension: Dimension,
    /// Sections dirtied since the last flush.
    pending: FxHashSet<SectionKey>,
}

impl ChunkMap {
    /// Creates an empty map for the given dimension.
    #[must_use]
    pub fn new(dimension: Dimension) -> Self {
        Self {
            chunks: FxHashMap::default(),
            dimension,
            pending: FxHashSet::default(),
        }
    }

    /// The vertical layout shared by all chunks.
    #[must_use]
    pub const fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Whether the chunk is loaded.
    #[must_use]
    pub fn contains(&self, pos: ChunkPos) -> bool {
        self.chunks.contains_key(&pos)
    }

    /// Gets a loaded chunk.
    #[must_use]
    pub fn get(&self, pos: ChunkPos) -> Option<&Chunk> {
        self.chunks.get(&pos)
    }

    /// Gets a loaded chunk mutably.
    pub fn get_mut(&mut self, pos: ChunkPos) -> Option<&mut Chunk> {
        self.chunks.get_mut(&pos)
    }

    /// Number of loaded chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether no chunk is loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Positions of all loaded chunks.
    pub fn positions(&self) -> impl Iterator<Item = ChunkPos> + '_ {
        self.chunks.keys().copied()
    }

    pub(crate) fn insert(&mut self, chunk: Chunk) {
        self.chunks.insert(chunk.pos(), chunk);
    }

    pub(crate) fn remove(&mut self, pos: ChunkPos) -> Option<Chunk> {
        self.pending.retain(|key| key.chunk != pos);
        self.chunks.remove(&pos)
    }

    /// Gets a section of a loaded chunk.
    #[must_use]
    pub fn section(&self, key: SectionKey) -> Option<&Section> {
        self.chunks.get(&key.chunk)?.section(key.height)
    }

    pub(crate) fn section_mut(&mut self, key: SectionKey) -> Option<&mut Section> {
        self.chunks.get_mut(&key.chunk)?.section_mut(key.height)
    }

    /// The eight horizontal neighbours, only when every one of them is loaded.
    #[must_use]
    pub fn neighbours(&self, pos: ChunkPos) -> Option<[ChunkPos; 8]> {
        let neighbours = ChunkNeighbour::ALL.map(|neighbour| neighbour.of(pos));
        neighbours
            .iter()
            .all(|neighbour| self.chunks.contains_key(neighbour))
            .then_some(neighbours)
    }

    /// Maps a world position to the cell storing its light.
    ///
    /// Positions directly above or below the section stack land in a border plane. Anything
    /// further out, or in an unloaded chunk, has no cell.
    #[must_use]
    pub fn resolve(&self, pos: BlockPos) -> Option<Cell> {
        let chunk = pos.chunk_pos();
        if !self.chunks.contains_key(&chunk) {
            return None;
        }
        let height = pos.section_height();
        if self.dimension.contains_section(height) {
            return Some(Cell::Section {
                key: SectionKey { chunk, height },
                local: pos.in_section(),
            });
        }
        let side = if pos.y() == self.dimension.border_y(BorderSide::Top) {
            BorderSide::Top
        } else if pos.y() == self.dimension.border_y(BorderSide::Bottom) {
            BorderSide::Bottom
        } else {
            return None;
        };
        Some(Cell::Border {
            chunk,
            side,
            column: pos.column(),
        })
    }

    /// The raw stored light of a cell.
    #[must_use]
    pub fn light(&self, cell: Cell) -> LightLevel {
        match cell {
            Cell::Section { key, local } => self
                .section(key)
                .map_or(LightLevel::DARK, |section| section.light.get(local)),
            Cell::Border {
                chunk,
                side,
                column,
            } => self
                .chunks
                .get(&chunk)
                .map_or(LightLevel::DARK, |chunk| chunk.light.border(side).get(column)),
        }
    }

    /// The raw stored value of one channel of a cell.
    #[must_use]
    #[inline]
    pub fn level(&self, cell: Cell, channel: LightChannel) -> u8 {
        channel.get(self.light(cell))
    }

    /// Writes one channel of a cell, flagging the section dirty when the byte changes.
    pub(crate) fn set_level(&mut self, cell: Cell, channel: LightChannel, value: u8) -> bool {
        match cell {
            Cell::Section { key, local } => {
                let Some(section) = self.section_mut(key) else {
                    return false;
                };
                let changed = section.light.set(local, channel, value);
                if changed {
                    self.pending.insert(key);
                }
                changed
            }
            Cell::Border {
                chunk,
                side,
                column,
            } => {
                let Some(chunk) = self.chunks.get_mut(&chunk) else {
                    return false;
                };
                let border = chunk.light.border_mut(side);
                let level = channel.set(border.get(column), value);
                border.set(column, level)
            }
        }
    }

    /// The occupant of a cell. Border planes are always empty.
    #[must_use]
    pub fn occupant(&self, cell: Cell) -> Occupant {
        match cell {
            Cell::Section { key, local } => self
                .section(key)
                .map_or(Occupant::AIR, |section| section.blocks.get(local)),
            Cell::Border { .. } => Occupant::AIR,
        }
    }

    /// Whether a position sees open sky through its column.
    #[must_use]
    #[inline]
    pub fn is_exposed(&self, pos: BlockPos) -> bool {
        self.dimension.has_sky_light
            && self
                .chunks
                .get(&pos.chunk_pos())
                .is_some_and(|chunk| chunk.light.heightmap.is_exposed(pos.column(), pos.y()))
    }

    /// The y of the topmost opaque voxel of a world column, if its chunk is loaded.
    #[must_use]
    pub fn column_top(&self, chunk: ChunkPos, column: ColumnPos) -> Option<i32> {
        self.chunks
            .get(&chunk)
            .map(|chunk| chunk.light.heightmap.get(column))
    }

    /// Flags a section dirty without touching its light.
    pub(crate) fn mark_dirty(&mut self, key: SectionKey) {
        if let Some(section) = self.section_mut(key) {
            section.light.mark_dirty();
            self.pending.insert(key);
        }
    }

    /// Flags the section next to a border plane for reconsideration.
    pub(crate) fn update_y(&mut self, chunk: ChunkPos, side: BorderSide) {
        let height = self.dimension.nearest_section(side);
        self.mark_dirty(SectionKey { chunk, height });
    }

    /// Puts a taken key back so a later flush picks it up.
    pub(crate) fn keep_pending(&mut self, key: SectionKey) {
        self.pending.insert(key);
    }

    /// Takes the dirty sections recorded since the last call, in a stable order.
    pub(crate) fn take_pending(&mut self) -> Vec<SectionKey> {
        let mut pending: Vec<SectionKey> = self.pending.drain().collect();
        pending.sort_unstable_by_key(|key| (key.chunk.x(), key.chunk.z(), key.height));
        pending
    }
}
