//! This module contains the `Section` and `SectionBlocks` structs.

use std::fmt::Debug;

use luma_utils::{ColumnPos, InSectionPos, types::BLOCKS_PER_SECTION};

use crate::chunk::light::{MAX_LEVEL, section_light::SectionLight};

/// What the block-state collaborator reports for one voxel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Occupant {
    /// Light the occupant emits (0-15).
    pub luminance: u8,
    /// Whether the occupant fills the voxel.
    pub opaque: bool,
}

impl Occupant {
    /// An empty voxel.
    pub const AIR: Self = Self {
        luminance: 0,
        opaque: false,
    };

    /// Creates an occupant, clamping the luminance to 15.
    #[must_use]
    pub const fn new(luminance: u8, opaque: bool) -> Self {
        Self {
            luminance: if luminance > MAX_LEVEL { MAX_LEVEL } else { luminance },
            opaque,
        }
    }

    /// A non-emitting opaque occupant, like stone.
    #[must_use]
    pub const fn opaque() -> Self {
        Self::new(0, true)
    }

    /// A transparent emitter, like a torch.
    #[must_use]
    pub const fn light_source(luminance: u8) -> Self {
        Self::new(luminance, false)
    }
}

/// Occupants of one section. Sections that only hold air do not allocate.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SectionBlocks {
    data: Option<Box<[Occupant; BLOCKS_PER_SECTION]>>,
}

impl SectionBlocks {
    /// A section full of air.
    #[must_use]
    pub const fn empty() -> Self {
        Self { data: None }
    }

    /// A section where every voxel holds `occupant`.
    #[must_use]
    pub fn filled(occupant: Occupant) -> Self {
        if occupant == Occupant::AIR {
            return Self::empty();
        }
        Self {
            data: Some(Box::new([occupant; BLOCKS_PER_SECTION])),
        }
    }

    /// Gets the occupant at the given position.
    #[must_use]
    #[inline]
    pub fn get(&self, pos: InSectionPos) -> Occupant {
        self.data
            .as_ref()
            .map_or(Occupant::AIR, |data| data[pos.index()])
    }

    /// Sets the occupant at the given position and returns the previous one.
    pub fn set(&mut self, pos: InSectionPos, occupant: Occupant) -> Occupant {
        match &mut self.data {
            Some(data) => std::mem::replace(&mut data[pos.index()], occupant),
            None if occupant == Occupant::AIR => Occupant::AIR,
            None => {
                let mut data = Box::new([Occupant::AIR; BLOCKS_PER_SECTION]);
                data[pos.index()] = occupant;
                self.data = Some(data);
                Occupant::AIR
            }
        }
    }

    /// Whether the section only holds air.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data
            .as_ref()
            .is_none_or(|data| data.iter().all(|occupant| *occupant == Occupant::AIR))
    }

    /// Iterates the voxels that emit light.
    pub fn emitters(&self) -> impl Iterator<Item = (InSectionPos, u8)> + '_ {
        self.data.iter().flat_map(|data| {
            InSectionPos::all()
                .map(move |pos| (pos, data[pos.index()].luminance))
                .filter(|(_, luminance)| *luminance > 0)
        })
    }

    /// Local y of the highest opaque voxel in the column at or below `below_or_at`.
    #[must_use]
    pub fn highest_opaque(&self, column: ColumnPos, below_or_at: u8) -> Option<u8> {
        let data = self.data.as_ref()?;
        (0..=below_or_at.min(15))
            .rev()
            .find(|y| data[column.with_y(*y).index()].opaque)
    }
}

impl Debug for SectionBlocks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectionBlocks")
            .field("empty", &self.is_empty())
            .finish()
    }
}

/// One 16x16x16 cube of a chunk: its occupants and its light.
#[derive(Debug, Default)]
pub struct Section {
    /// The voxel occupants.
    pub blocks: SectionBlocks,
    /// The light stored for the voxels.
    pub light: SectionLight,
}

impl Section {
    /// Creates a dark section holding the given occupants.
    #[must_use]
    pub fn new(blocks: SectionBlocks) -> Self {
        Self {
            blocks,
            light: SectionLight::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_returns_previous() {
        let mut blocks = SectionBlocks::empty();
        let pos = InSectionPos::new(3, 4, 5);
        assert_eq!(blocks.set(pos, Occupant::light_source(14)), Occupant::AIR);
        assert_eq!(blocks.set(pos, Occupant::AIR), Occupant::light_source(14));
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_emitters() {
        let mut blocks = SectionBlocks::empty();
        blocks.set(InSectionPos::new(0, 0, 0), Occupant::light_source(14));
        blocks.set(InSectionPos::new(1, 0, 0), Occupant::opaque());
        blocks.set(InSectionPos::new(2, 0, 0), Occupant::new(15, true));
        let emitters: Vec<_> = blocks.emitters().collect();
        assert_eq!(
            emitters,
            vec![(InSectionPos::new(0, 0, 0), 14), (InSectionPos::new(2, 0, 0), 15)]
        );
    }

    #[test]
    fn test_highest_opaque() {
        let mut blocks = SectionBlocks::empty();
        let column = ColumnPos::new(4, 9);
        assert_eq!(blocks.highest_opaque(column, 15), None);
        blocks.set(column.with_y(2), Occupant::opaque());
        blocks.set(column.with_y(11), Occupant::opaque());
        assert_eq!(blocks.highest_opaque(column, 15), Some(11));
        assert_eq!(blocks.highest_opaque(column, 10), Some(2));
        assert_eq!(blocks.highest_opaque(column, 1), None);
    }

    #[test]
    fn test_luminance_is_clamped() {
        assert_eq!(Occupant::new(200, false).luminance, 15);
    }
}
