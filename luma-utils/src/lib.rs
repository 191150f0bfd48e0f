//! # Luma Utils
//!
//! Coordinate types, lock aliases and the logging bootstrap shared by the luma crates.

pub mod locks;
pub mod logger;
pub mod math;
pub mod types;

pub use types::{BlockPos, ChunkPos, ColumnPos, InSectionPos};
