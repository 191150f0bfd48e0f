//! Light change notifications.

use std::sync::Arc;

use crossbeam::channel::Sender;
use luma_utils::ChunkPos;

use crate::chunk::light::SectionSnapshot;

/// One section whose light changed during an operation.
#[derive(Debug, Clone)]
pub struct SectionLightUpdate {
    /// The owning chunk.
    pub chunk: ChunkPos,
    /// The section height.
    pub section_height: i32,
    /// Whether this is the section the operation started in.
    pub origin: bool,
    /// The light as published for readers at the time of the notification.
    pub snapshot: Arc<SectionSnapshot>,
}

/// Receives the batch of notifications produced by one world operation.
pub trait LightListener: Send + Sync {
    /// Called once per non-empty batch. Returns `false` once the listener is gone and should be
    /// dropped.
    fn on_light_change(&self, batch: &[SectionLightUpdate]) -> bool;
}

impl LightListener for Sender<Vec<SectionLightUpdate>> {
    fn on_light_change(&self, batch: &[SectionLightUpdate]) -> bool {
        self.send(batch.to_vec()).is_ok()
    }
}
