//! Error types of the world facade and the configuration loader.

use luma_utils::ChunkPos;
use thiserror::Error;

/// Failure of a [`crate::world::LightWorld`] operation. Light tracing itself never fails.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    /// The operation needs a chunk that is not in the map.
    #[error("chunk {0} is not loaded")]
    ChunkNotLoaded(ChunkPos),

    /// A chunk was loaded twice.
    #[error("chunk {0} is already loaded")]
    ChunkAlreadyLoaded(ChunkPos),

    /// A position lies above or below the section stack.
    #[error("y {y} is outside the loaded section range")]
    OutOfRange {
        /// The rejected y.
        y: i32,
    },

    /// A chunk was handed the wrong number of sections.
    #[error("expected {expected} sections, got {actual}")]
    SectionCount {
        /// Sections per chunk in this world.
        expected: usize,
        /// Sections supplied.
        actual: usize,
    },
}

/// Failure while loading or validating a [`crate::config::LightConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid JSON5 for the config shape.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json5::Error),

    /// A value is out of range.
    #[error("Invalid config: {0}")]
    Invalid(&'static str),
}
