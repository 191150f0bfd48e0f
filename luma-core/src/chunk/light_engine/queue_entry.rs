//! `QueueEntry` bit-packing for the propagation worklists.
//!
//! Every entry carries what a recursive trace would otherwise keep on the call stack:
//! - Bits 0-3: Light level (0-15)
//! - Bits 4-9: Direction flags (6 directions)
//! - Bit 10: Force flag
//! - Bit 11: Emission flag
//! - Bits 12-16: Path length from the origin of a decrease
//! - Bits 17-20: Level at the origin of a decrease

use super::direction::Direction;
use crate::chunk::light::MAX_LEVEL;

/// A queue entry that encodes light propagation information in a bit-packed u64.
///
/// Bit layout:
/// ```text
/// Bit Position:  63........21  20..17  16..12  11  10  9 ... 4  3 ... 0
///                |  Unused   | M M M M | P P P P P | E | F | D...D | L...L |
///                                |          |        |   |     |       |
///                                |          |        |   |     |       +-> Light Level (4 bits)
///                                |          |        |   |     +---------> Direction Flags (6 bits)
///                                |          |        |   +---------------> Force Flag
///                                |          |        +-------------------> Emission Flag
///                                |          +----------------------------> Path Length (5 bits)
///                                +---------------------------------------> Origin Level (4 bits)
/// ```
///
/// A forced entry ignores its level and re-propagates whatever the cell stores when the entry is
/// processed. An emission entry is a light source seeding itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueEntry(u64);

impl QueueEntry {
    const LEVEL_MASK: u64 = 0x0F;
    const DIRECTIONS_MASK: u64 = 0x3F0;
    const FORCE_FLAG: u64 = 0x400;
    const EMISSION_FLAG: u64 = 0x800;
    const PATH_SHIFT: u32 = 12;
    const PATH_MASK: u64 = 0x1F << Self::PATH_SHIFT;
    const ORIGIN_SHIFT: u32 = 17;
    const ORIGIN_MASK: u64 = 0x0F << Self::ORIGIN_SHIFT;

    /// Gets the light level from this queue entry (0-15).
    #[must_use]
    #[inline]
    pub const fn level(self) -> u8 {
        (self.0 & Self::LEVEL_MASK) as u8
    }

    /// Checks if light should propagate in the given direction.
    #[must_use]
    #[inline]
    pub const fn should_propagate(self, dir: Direction) -> bool {
        let bit = 1u64 << (dir as u8 + 4);
        (self.0 & bit) != 0
    }

    /// Whether the entry re-propagates the stored value instead of its own level.
    #[must_use]
    #[inline]
    pub const fn is_forced(self) -> bool {
        (self.0 & Self::FORCE_FLAG) != 0
    }

    /// Checks if this entry represents light increase from an emitting block.
    #[must_use]
    #[inline]
    pub const fn is_from_emission(self) -> bool {
        (self.0 & Self::EMISSION_FLAG) != 0
    }

    /// Number of steps between this entry and the origin of its decrease.
    #[must_use]
    #[inline]
    pub const fn path_length(self) -> u8 {
        ((self.0 & Self::PATH_MASK) >> Self::PATH_SHIFT) as u8
    }

    /// The level the decrease started from.
    #[must_use]
    #[inline]
    pub const fn origin_level(self) -> u8 {
        ((self.0 & Self::ORIGIN_MASK) >> Self::ORIGIN_SHIFT) as u8
    }

    #[must_use]
    #[inline]
    const fn with_level(self, level: u8) -> Self {
        debug_assert!(level <= MAX_LEVEL, "Light level must be 0-15");
        Self((self.0 & !Self::LEVEL_MASK) | (level as u64 & Self::LEVEL_MASK))
    }

    #[must_use]
    #[inline]
    const fn with_direction(self, dir: Direction) -> Self {
        Self(self.0 | (1u64 << (dir as u8 + 4)))
    }

    #[must_use]
    #[inline]
    const fn without_direction(self, dir: Direction) -> Self {
        Self(self.0 & !(1u64 << (dir as u8 + 4)))
    }

    #[must_use]
    #[inline]
    const fn with_origin_level(self, level: u8) -> Self {
        Self((self.0 & !Self::ORIGIN_MASK) | ((level as u64 & 0x0F) << Self::ORIGIN_SHIFT))
    }

    /// Creates a queue entry for decreasing light in all directions, starting a new wave.
    #[must_use]
    pub const fn decrease_all_directions(level: u8) -> Self {
        Self(Self::DIRECTIONS_MASK)
            .with_level(level)
            .with_origin_level(level)
    }

    /// Creates the entry one step further along the wave of `parent`, not going back through
    /// `skip_dir`.
    #[must_use]
    pub const fn decrease_skip_one_direction(parent: Self, level: u8, skip_dir: Direction) -> Self {
        let path = parent.path_length().saturating_add(1);
        let path = if path > 0x1F { 0x1F } else { path };
        Self(Self::DIRECTIONS_MASK | ((path as u64) << Self::PATH_SHIFT))
            .without_direction(skip_dir)
            .with_level(level)
            .with_origin_level(parent.origin_level())
    }

    /// Creates a queue entry for a light source seeding itself.
    #[must_use]
    pub const fn increase_from_emission(level: u8) -> Self {
        Self(Self::DIRECTIONS_MASK | Self::EMISSION_FLAG).with_level(level)
    }

    /// Creates a queue entry for increasing light in all directions except one.
    #[must_use]
    pub const fn increase_skip_one_direction(level: u8, skip_dir: Direction) -> Self {
        Self(Self::DIRECTIONS_MASK)
            .without_direction(skip_dir)
            .with_level(level)
    }

    /// Re-propagates the stored value of a cell to all its neighbours.
    #[must_use]
    pub const fn repropagate_all_directions() -> Self {
        Self(Self::DIRECTIONS_MASK | Self::FORCE_FLAG)
    }

    /// Re-propagates the stored value of a cell towards a single neighbour.
    #[must_use]
    pub const fn repropagate_one_direction(dir: Direction) -> Self {
        Self(Self::FORCE_FLAG).with_direction(dir)
    }

    /// Creates a queue entry for an open-sky voxel with selective directions.
    ///
    /// Sky sources always propagate at level 15.
    #[must_use]
    #[allow(clippy::fn_params_excessive_bools)]
    pub const fn increase_sky_source_in_directions(
        down: bool,
        north: bool,
        south: bool,
        west: bool,
        east: bool,
    ) -> Self {
        let mut entry = Self(Self::EMISSION_FLAG).with_level(MAX_LEVEL);
        if down {
            entry = entry.with_direction(Direction::Down);
        }
        if north {
            entry = entry.with_direction(Direction::North);
        }
        if south {
            entry = entry.with_direction(Direction::South);
        }
        if west {
            entry = entry.with_direction(Direction::West);
        }
        if east {
            entry = entry.with_direction(Direction::East);
        }
        entry
    }
}
