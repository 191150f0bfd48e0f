//! Per-column height of the topmost sky-blocking voxel.

use luma_utils::{ColumnPos, types::COLUMNS_PER_CHUNK};

use crate::chunk::section::Section;

/// Tracks, for every column of a chunk, the y of the highest opaque voxel.
///
/// Everything strictly above that y sees open sky. [`Heightmap::NONE`] marks a column without
/// any opaque voxel, which is exposed all the way down, including the plane below the loaded range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heightmap {
    /// Indexed by [`ColumnPos::index`].
    heights: Box<[i32; COLUMNS_PER_CHUNK]>,
}

impl Heightmap {
    /// Sentinel for a column without opaque voxels.
    pub const NONE: i32 = i32::MIN;

    /// Creates a heightmap where every column is fully exposed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            heights: Box::new([Self::NONE; COLUMNS_PER_CHUNK]),
        }
    }

    /// Gets the y of the topmost opaque voxel of a column, or [`Self::NONE`].
    #[inline]
    #[must_use]
    pub fn get(&self, column: ColumnPos) -> i32 {
        self.heights[column.index()]
    }

    /// Sets the y of the topmost opaque voxel of a column.
    #[inline]
    pub fn set(&mut self, column: ColumnPos, y: i32) {
        self.heights[column.index()] = y;
    }

    /// Whether a voxel at height `y` of the column sees open sky.
    #[inline]
    #[must_use]
    pub fn is_exposed(&self, column: ColumnPos, y: i32) -> bool {
        y > self.get(column)
    }

    /// Scans a column downwards from `from_y` (inclusive) for the first opaque voxel.
    ///
    /// `sections` are the chunk's sections from the lowest, whose first voxel sits at `min_y`.
    #[must_use]
    pub fn scan_column(sections: &[Section], min_y: i32, column: ColumnPos, from_y: i32) -> i32 {
        if sections.is_empty() || from_y < min_y {
            return Self::NONE;
        }
        let top_index = (((from_y - min_y) >> 4) as usize).min(sections.len() - 1);

        for index in (0..=top_index).rev() {
            let base_y = min_y + (index as i32) * 16;
            let below_or_at = (from_y - base_y).min(15) as u8;
            if let Some(y) = sections[index].blocks.highest_opaque(column, below_or_at) {
                return base_y + i32::from(y);
            }
        }
        Self::NONE
    }

    /// Rebuilds every column from the section occupants.
    pub fn recalculate(&mut self, sections: &[Section], min_y: i32) {
        let top_y = min_y + (sections.len() as i32) * 16 - 1;
        for column in ColumnPos::all() {
            self.set(column, Self::scan_column(sections, min_y, column, top_y));
        }
    }
}

impl Default for Heightmap {
    fn default() -> Self {
        Self::new()
    }
}
