//! Light storage and the per-section, per-plane and per-chunk light operations.

pub mod border_light;
pub mod chunk_light;
pub mod chunk_sky_light;
pub mod light_array;
pub mod light_level;
pub mod section_light;
pub mod snapshot;

pub use border_light::{BorderSectionLight, BorderSide};
pub use chunk_light::ChunkLight;
pub use chunk_sky_light::ChunkSkyLight;
pub use light_array::LightArray;
pub use light_level::{LightChannel, LightLevel};
pub use section_light::SectionLight;
pub use snapshot::SectionSnapshot;

/// Brightest light level.
pub const MAX_LEVEL: u8 = 15;
