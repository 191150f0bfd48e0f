//! Immutable light copies handed to readers on other threads.

use luma_utils::InSectionPos;

use super::{LightArray, LightLevel, MAX_LEVEL};
use crate::chunk::heightmap::Heightmap;

/// A frozen copy of one section's light, composited the same way the live world is.
///
/// Readers hold these behind an `ArcSwap`, so they never observe a section in the middle of a
/// propagation pass. A snapshot is replaced as a whole when its section is flushed.
#[derive(Debug, Clone, Default)]
pub struct SectionSnapshot {
    light: LightArray,
    base_y: i32,
    /// Column tops of the owning chunk when the world has sky light.
    sky_tops: Option<Heightmap>,
}

impl SectionSnapshot {
    /// Creates a snapshot from copies of the section light and the chunk heightmap.
    #[must_use]
    pub fn new(light: LightArray, base_y: i32, sky_tops: Option<Heightmap>) -> Self {
        Self {
            light,
            base_y,
            sky_tops,
        }
    }

    /// Light at a voxel with open-sky exposure applied.
    #[must_use]
    pub fn get(&self, pos: InSectionPos) -> LightLevel {
        let level = self.light.get(pos);
        match &self.sky_tops {
            Some(tops) if tops.is_exposed(pos.column(), self.base_y + i32::from(pos.y())) => {
                level.with_sky(MAX_LEVEL)
            }
            _ => level,
        }
    }

    /// The stored light at a voxel, without sky compositing.
    #[must_use]
    pub fn raw(&self, pos: InSectionPos) -> LightLevel {
        self.light.get(pos)
    }

    /// World y of the section's lowest voxel layer.
    #[must_use]
    pub const fn base_y(&self) -> i32 {
        self.base_y
    }
}

#[cfg(test)]
mod tests {
    use luma_utils::ColumnPos;

    use super::*;

    #[test]
    fn test_snapshot_composites_sky() {
        let mut light = LightArray::new();
        let below = InSectionPos::new(1, 2, 1);
        light.set(below, LightLevel::new(3, 9));

        let mut tops = Heightmap::new();
        tops.set(ColumnPos::new(1, 1), 34);

        let snapshot = SectionSnapshot::new(light, 32, Some(tops));
        assert_eq!(snapshot.get(below), LightLevel::new(3, 9));
        assert_eq!(snapshot.get(InSectionPos::new(1, 3, 1)).sky(), 15);
        assert_eq!(snapshot.raw(InSectionPos::new(1, 3, 1)).sky(), 0);
        assert_eq!(snapshot.get(InSectionPos::new(2, 0, 1)).sky(), 15);
    }

    #[test]
    fn test_snapshot_without_sky() {
        let snapshot = SectionSnapshot::new(LightArray::new(), 0, None);
        assert_eq!(snapshot.get(InSectionPos::new(0, 15, 0)), LightLevel::DARK);
    }
}
