//! Lazy per-asset actor registry.
//!
//! Books exist only for assets that have been referenced. The first
//! placement (or snapshot request) for an asset spawns its actor, after
//! rehydrating the book from storage; the write lock makes that spawn
//! single-flight, so two concurrent first placements cannot race two
//! actors into existence.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokmatch_types::{AssetId, Match, OrderId, Result};

use crate::actor::{BookActor, BookHandle};
use crate::broadcast::Broadcaster;
use crate::persistence::SnapshotStore;

pub(crate) struct BookRegistry {
    shards: RwLock<HashMap<AssetId, BookHandle>>,
    store: Arc<dyn SnapshotStore>,
    broadcaster: Arc<dyn Broadcaster>,
    settlement: mpsc::UnboundedSender<Match>,
    command_buffer: usize,
    persist_attempts: u32,
}

impl BookRegistry {
    pub(crate) fn new(
        store: Arc<dyn SnapshotStore>,
        broadcaster: Arc<dyn Broadcaster>,
        settlement: mpsc::UnboundedSender<Match>,
        command_buffer: usize,
        persist_attempts: u32,
    ) -> Self {
        Self {
            shards: RwLock::new(HashMap::new()),
            store,
            broadcaster,
            settlement,
            command_buffer,
            persist_attempts,
        }
    }

    /// Handle for the asset's actor, spawning it on first reference. On a
    /// fresh spawn the second element carries the order ids rehydrated
    /// from storage; for an already-live actor it is empty.
    pub(crate) fn handle(&self, asset_id: &AssetId) -> Result<(BookHandle, Vec<OrderId>)> {
        if let Some(handle) = self.shards.read().get(asset_id) {
            return Ok((handle.clone(), Vec::new()));
        }

        let mut shards = self.shards.write();
        // Re-check: another caller may have spawned it between the locks.
        if let Some(handle) = shards.get(asset_id) {
            return Ok((handle.clone(), Vec::new()));
        }

        let (handle, restored) = BookActor::spawn(
            asset_id.clone(),
            Arc::clone(&self.store),
            Arc::clone(&self.broadcaster),
            self.settlement.clone(),
            self.command_buffer,
            self.persist_attempts,
        )?;
        shards.insert(asset_id.clone(), handle.clone());
        tracing::debug!(asset = %asset_id, "book actor spawned");
        Ok((handle, restored))
    }

    /// Assets with a live actor.
    pub(crate) fn assets(&self) -> Vec<AssetId> {
        self.shards.read().keys().cloned().collect()
    }
}
