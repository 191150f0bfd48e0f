//! The packed per-voxel light byte and the two channels stored in it.

use std::fmt;

use crate::chunk::section::Occupant;

/// One voxel's light: block light in the low nibble, sky light in the high nibble.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LightLevel(pub u8);

impl LightLevel {
    /// No light at all.
    pub const DARK: Self = Self(0);

    /// Builds a level from its two channels.
    #[must_use]
    pub const fn new(block: u8, sky: u8) -> Self {
        Self(((sky & 0x0F) << 4) | (block & 0x0F))
    }

    /// Block light (0-15).
    #[must_use]
    #[inline]
    pub const fn block(self) -> u8 {
        self.0 & 0x0F
    }

    /// Sky light (0-15).
    #[must_use]
    #[inline]
    pub const fn sky(self) -> u8 {
        self.0 >> 4
    }

    /// Replaces the block channel.
    #[must_use]
    #[inline]
    pub const fn with_block(self, level: u8) -> Self {
        Self((self.0 & 0xF0) | (level & 0x0F))
    }

    /// Replaces the sky channel.
    #[must_use]
    #[inline]
    pub const fn with_sky(self, level: u8) -> Self {
        Self((self.0 & 0x0F) | ((level & 0x0F) << 4))
    }
}

impl fmt::Debug for LightLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LightLevel(block: {}, sky: {})", self.block(), self.sky())
    }
}

/// Selects one nibble of a [`LightLevel`]. All propagation code is written once per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightChannel {
    /// Light emitted by occupants.
    Block,
    /// Light coming from open sky.
    Sky,
}

impl LightChannel {
    /// Both channels, block first.
    pub const ALL: [LightChannel; 2] = [LightChannel::Block, LightChannel::Sky];

    /// Reads this channel out of a packed level.
    #[must_use]
    #[inline]
    pub const fn get(self, level: LightLevel) -> u8 {
        match self {
            Self::Block => level.block(),
            Self::Sky => level.sky(),
        }
    }

    /// Writes this channel into a packed level.
    #[must_use]
    #[inline]
    pub const fn set(self, level: LightLevel, value: u8) -> LightLevel {
        match self {
            Self::Block => level.with_block(value),
            Self::Sky => level.with_sky(value),
        }
    }

    /// Whether the occupant terminates propagation on this channel.
    ///
    /// Opaque emitters still carry block light. Sky light stops at anything opaque.
    #[must_use]
    #[inline]
    pub const fn is_blocked_by(self, occupant: Occupant) -> bool {
        match self {
            Self::Block => occupant.opaque && occupant.luminance == 0,
            Self::Sky => occupant.opaque,
        }
    }

    /// Light the occupant itself emits on this channel.
    #[must_use]
    #[inline]
    pub const fn emission(self, occupant: Occupant) -> u8 {
        match self {
            Self::Block => occupant.luminance,
            Self::Sky => 0,
        }
    }
}
