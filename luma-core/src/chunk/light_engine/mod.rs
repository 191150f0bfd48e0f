//! Worklist-driven flood-fill light propagation.

mod base;
pub mod direction;
pub mod light_queue;
pub mod queue_entry;

pub use base::LightEngine;
pub use direction::Direction;
pub use light_queue::LightQueue;
pub use queue_entry::QueueEntry;
