//! Light storage for one section.
//!
//! One byte per voxel, block light in the low nibble and sky light in the high nibble.
//! A section that was never lit does not allocate.

use luma_utils::{InSectionPos, types::BLOCKS_PER_SECTION};

use super::LightLevel;

/// Packed light bytes of a 16x16x16 section, indexed by [`InSectionPos`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LightArray {
    /// `None` while every voxel is dark.
    data: Option<Box<[u8; BLOCKS_PER_SECTION]>>,
}

impl LightArray {
    /// Creates a dark array.
    #[must_use]
    pub const fn new() -> Self {
        Self { data: None }
    }

    /// Gets the packed light at the given position.
    #[must_use]
    #[inline]
    pub fn get(&self, pos: InSectionPos) -> LightLevel {
        match &self.data {
            Some(data) => LightLevel(data[pos.index()]),
            None => LightLevel::DARK,
        }
    }

    /// Sets the packed light at the given position. Returns whether the byte changed.
    #[inline]
    pub fn set(&mut self, pos: InSectionPos, level: LightLevel) -> bool {
        match &mut self.data {
            Some(data) => {
                let slot = &mut data[pos.index()];
                let changed = *slot != level.0;
                *slot = level.0;
                changed
            }
            None if level == LightLevel::DARK => false,
            None => {
                let mut data = Box::new([0u8; BLOCKS_PER_SECTION]);
                data[pos.index()] = level.0;
                self.data = Some(data);
                true
            }
        }
    }

    /// Makes every voxel dark and releases the allocation.
    pub fn clear(&mut self) {
        self.data = None;
    }

    /// Whether no voxel holds any light.
    #[must_use]
    pub fn is_dark(&self) -> bool {
        self.data
            .as_ref()
            .is_none_or(|data| data.iter().all(|byte| *byte == 0))
    }

    /// Iterates the voxels that hold any light on either channel.
    pub fn lit(&self) -> impl Iterator<Item = (InSectionPos, LightLevel)> + '_ {
        self.data.iter().flat_map(|data| {
            InSectionPos::all()
                .map(move |pos| (pos, LightLevel(data[pos.index()])))
                .filter(|(_, level)| *level != LightLevel::DARK)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_array_is_dark() {
        let array = LightArray::new();
        assert_eq!(array.get(InSectionPos::new(0, 0, 0)), LightLevel::DARK);
        assert_eq!(array.get(InSectionPos::new(15, 15, 15)), LightLevel::DARK);
        assert!(array.is_dark());
    }

    #[test]
    fn test_set_allocates_on_first_light() {
        let mut array = LightArray::new();
        assert!(!array.set(InSectionPos::new(1, 2, 3), LightLevel::DARK));
        assert!(array.data.is_none());

        assert!(array.set(InSectionPos::new(5, 5, 5), LightLevel::new(14, 0)));
        assert_eq!(array.get(InSectionPos::new(5, 5, 5)).block(), 14);
        assert_eq!(array.get(InSectionPos::new(0, 0, 0)), LightLevel::DARK);
        assert!(!array.set(InSectionPos::new(5, 5, 5), LightLevel::new(14, 0)));
    }

    #[test]
    fn test_channels_share_a_byte() {
        let mut array = LightArray::new();
        let pos = InSectionPos::new(0, 1, 0);
        array.set(pos, LightLevel::new(7, 0));
        array.set(pos, array.get(pos).with_sky(12));
        assert_eq!(array.get(pos).block(), 7);
        assert_eq!(array.get(pos).sky(), 12);
    }

    #[test]
    fn test_clear_and_lit() {
        let mut array = LightArray::new();
        array.set(InSectionPos::new(0, 0, 0), LightLevel::new(15, 0));
        array.set(InSectionPos::new(15, 15, 15), LightLevel::new(0, 1));
        let lit: Vec<_> = array.lit().map(|(pos, _)| pos.index()).collect();
        assert_eq!(lit, vec![0, 4095]);

        array.clear();
        assert!(array.is_dark());
        assert_eq!(array.lit().count(), 0);
    }
}
