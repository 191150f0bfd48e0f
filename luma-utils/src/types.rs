//! Coordinate wrappers, so a chunk coordinate is never mistaken for a block coordinate.

use std::fmt::{self, Display};

use crate::math::{vector2::Vector2, vector3::Vector3};

/// Width of a section along every axis.
pub const SECTION_WIDTH: i32 = 16;

/// Number of voxels in one section.
pub const BLOCKS_PER_SECTION: usize = 4096;

/// Number of columns in one chunk.
pub const COLUMNS_PER_CHUNK: usize = 256;

/// A chunk position. `.0.y` is the chunk z coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChunkPos(pub Vector2<i32>);

impl ChunkPos {
    /// Creates a chunk position from chunk coordinates.
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self(Vector2::new(x, z))
    }

    /// The chunk x coordinate.
    #[must_use]
    pub const fn x(self) -> i32 {
        self.0.x
    }

    /// The chunk z coordinate.
    #[must_use]
    pub const fn z(self) -> i32 {
        self.0.y
    }

    /// Returns the chunk `dx`/`dz` chunks away.
    #[must_use]
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self(self.0 + Vector2::new(dx, dz))
    }

    /// World x coordinate of the chunk's first column.
    #[must_use]
    pub const fn min_block_x(self) -> i32 {
        self.0.x * SECTION_WIDTH
    }

    /// World z coordinate of the chunk's first column.
    #[must_use]
    pub const fn min_block_z(self) -> i32 {
        self.0.y * SECTION_WIDTH
    }

    /// The world position of the given column at height `y`.
    #[must_use]
    pub const fn block_at(self, column: ColumnPos, y: i32) -> BlockPos {
        BlockPos::new(
            self.min_block_x() + column.x() as i32,
            y,
            self.min_block_z() + column.z() as i32,
        )
    }
}

impl Display for ChunkPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.0.x, self.0.y)
    }
}

/// A block position in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlockPos(pub Vector3<i32>);

impl BlockPos {
    /// Creates a block position from world coordinates.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self(Vector3::new(x, y, z))
    }

    /// The world x coordinate.
    #[must_use]
    pub const fn x(self) -> i32 {
        self.0.x
    }

    /// The world y coordinate.
    #[must_use]
    pub const fn y(self) -> i32 {
        self.0.y
    }

    /// The world z coordinate.
    #[must_use]
    pub const fn z(self) -> i32 {
        self.0.z
    }

    /// The chunk containing this position.
    #[must_use]
    pub const fn chunk_pos(self) -> ChunkPos {
        ChunkPos::new(self.0.x >> 4, self.0.z >> 4)
    }

    /// Index of the section containing this position, counted from y = 0.
    #[must_use]
    pub const fn section_height(self) -> i32 {
        self.0.y >> 4
    }

    /// The position inside its section.
    #[must_use]
    pub const fn in_section(self) -> InSectionPos {
        InSectionPos::new(
            (self.0.x & 15) as u8,
            (self.0.y & 15) as u8,
            (self.0.z & 15) as u8,
        )
    }

    /// The column inside its chunk.
    #[must_use]
    pub const fn column(self) -> ColumnPos {
        ColumnPos::new((self.0.x & 15) as u8, (self.0.z & 15) as u8)
    }

    /// Returns a position moved by the given deltas.
    #[must_use]
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self(self.0 + Vector3::new(dx, dy, dz))
    }

    /// Returns this position at another height.
    #[must_use]
    pub const fn with_y(self, y: i32) -> Self {
        Self::new(self.0.x, y, self.0.z)
    }
}

impl Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.0.x, self.0.y, self.0.z)
    }
}

/// A voxel inside a 16x16x16 section, stored as the flat index `(y << 8) | (z << 4) | x`.
///
/// Every component is masked to four bits on construction, so the index is always below 4096.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct InSectionPos(u16);

impl InSectionPos {
    /// Creates a position from section-local coordinates. Only the low four bits of each are kept.
    #[must_use]
    pub const fn new(x: u8, y: u8, z: u8) -> Self {
        debug_assert!(x < 16 && y < 16 && z < 16, "Coordinates must be 0-15");
        Self(((y as u16 & 15) << 8) | ((z as u16 & 15) << 4) | (x as u16 & 15))
    }

    /// Creates a position from a flat index. Only the low twelve bits are kept.
    #[must_use]
    pub const fn from_index(index: u16) -> Self {
        Self(index & 0x0FFF)
    }

    /// The flat index, always `< 4096`.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Local x coordinate.
    #[must_use]
    pub const fn x(self) -> u8 {
        (self.0 & 15) as u8
    }

    /// Local y coordinate.
    #[must_use]
    pub const fn y(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Local z coordinate.
    #[must_use]
    pub const fn z(self) -> u8 {
        ((self.0 >> 4) & 15) as u8
    }

    /// The column this voxel belongs to.
    #[must_use]
    pub const fn column(self) -> ColumnPos {
        ColumnPos::new(self.x(), self.z())
    }

    /// Iterates all 4096 positions in index order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..BLOCKS_PER_SECTION as u16).map(Self)
    }
}

/// A column inside a chunk, stored as the flat index `(z << 4) | x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ColumnPos(u8);

impl ColumnPos {
    /// Creates a column from chunk-local coordinates. Only the low four bits of each are kept.
    #[must_use]
    pub const fn new(x: u8, z: u8) -> Self {
        debug_assert!(x < 16 && z < 16, "Column coordinates must be 0-15");
        Self(((z & 15) << 4) | (x & 15))
    }

    /// The flat index, always `< 256`.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Local x coordinate.
    #[must_use]
    pub const fn x(self) -> u8 {
        self.0 & 15
    }

    /// Local z coordinate.
    #[must_use]
    pub const fn z(self) -> u8 {
        self.0 >> 4
    }

    /// The voxel of this column at the given section-local height.
    #[must_use]
    pub const fn with_y(self, y: u8) -> InSectionPos {
        InSectionPos::new(self.x(), y, self.z())
    }

    /// Iterates all 256 columns in index order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..=u8::MAX).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_section_index_layout() {
        let pos = InSectionPos::new(3, 5, 7);
        assert_eq!(pos.index(), (5 << 8) | (7 << 4) | 3);
        assert_eq!((pos.x(), pos.y(), pos.z()), (3, 5, 7));
        assert_eq!(InSectionPos::new(15, 15, 15).index(), 4095);
    }

    #[test]
    fn test_from_index_is_masked() {
        let pos = InSectionPos::from_index(0xFFFF);
        assert_eq!(pos.index(), 4095);
    }

    #[test]
    fn test_negative_world_coordinates() {
        let pos = BlockPos::new(-1, -1, -17);
        assert_eq!(pos.chunk_pos(), ChunkPos::new(-1, -2));
        assert_eq!(pos.section_height(), -1);
        let local = pos.in_section();
        assert_eq!((local.x(), local.y(), local.z()), (15, 15, 15));
    }

    #[test]
    fn test_column_round_trip() {
        let column = BlockPos::new(35, 10, -3).column();
        assert_eq!((column.x(), column.z()), (3, 13));
        assert_eq!(ChunkPos::new(2, -1).block_at(column, 10), BlockPos::new(35, 10, -3));
        assert_eq!(ColumnPos::all().count(), COLUMNS_PER_CHUNK);
    }
}
