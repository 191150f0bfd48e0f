//! # Luma Core
//!
//! Incremental block and sky light propagation over a chunked voxel world.
//!
//! Each voxel carries two 4-bit intensities. Block light spreads from emitting occupants and sky
//! light falls from open sky; both lose one level per step and stop at blocking occupants. Edits
//! are retraced locally with a removal wave followed by a re-flood instead of recomputing the
//! world. Readers on other threads observe immutable per-section snapshots published alongside
//! the change notifications.

pub mod chunk;
pub mod config;
pub mod error;
pub mod world;

pub use chunk::{
    chunk_map::{ChunkMap, Dimension, SectionKey},
    light::{LightChannel, LightLevel, SectionSnapshot},
    section::{Occupant, SectionBlocks},
};
pub use config::LightConfig;
pub use error::{ConfigError, WorldError};
pub use world::{
    LightWorld,
    events::{LightListener, SectionLightUpdate},
};
