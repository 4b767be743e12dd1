//! The matching service facade.
//!
//! One `MatchingService` fronts every asset book. Placement is validated,
//! routed to the asset's single-writer actor, matched synchronously, and
//! answered with a [`PlacementReceipt`]; fills settle in the background.
//! Cancellation routes through a service-level `order id -> asset` index
//! so callers do not have to say which book an order lives in.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;
use tokmatch_types::{
    AssetId, BookSnapshot, BookUpdate, CancelReceipt, EngineConfig, EngineError, MakerId,
    OrderId, PlacementReceipt, Result, Side,
};
use tokmatch_settlement::{
    SettlementExecutor, SettlementHandle, SettlementLedger, SettlementWorker,
};

use crate::actor::BookHandle;
use crate::broadcast::ChannelBroadcaster;
use crate::persistence::SnapshotStore;
use crate::registry::BookRegistry;
use crate::validator::Validator;

/// Entry point for placing, cancelling, and observing orders across all
/// tokenized assets.
pub struct MatchingService {
    registry: BookRegistry,
    validator: Arc<dyn Validator>,
    /// Where each open order lives, for asset-agnostic cancellation.
    order_index: RwLock<HashMap<OrderId, AssetId>>,
    settlement: SettlementHandle,
    broadcaster: Arc<ChannelBroadcaster>,
}

impl MatchingService {
    /// Build a service from its collaborators, start the settlement
    /// worker, and rehydrate every asset the store knows about. Must be
    /// called inside a tokio runtime.
    #[must_use]
    pub fn new(
        config: &EngineConfig,
        validator: Arc<dyn Validator>,
        store: Arc<dyn SnapshotStore>,
        executor: Arc<dyn SettlementExecutor>,
    ) -> Self {
        let settlement = SettlementWorker::spawn(executor, &config.settlement);
        let broadcaster = Arc::new(ChannelBroadcaster::new(config.broadcast_capacity));
        let registry = BookRegistry::new(
            Arc::clone(&store),
            Arc::clone(&broadcaster) as Arc<dyn crate::broadcast::Broadcaster>,
            settlement.sender(),
            config.command_buffer,
            config.persist_attempts,
        );

        // Recover persisted books up front so orders placed before a
        // restart are cancellable again without waiting for a placement
        // to reference their asset. A failed asset is retried lazily on
        // its next reference.
        let mut order_index = HashMap::new();
        match store.assets() {
            Ok(assets) => {
                for asset_id in assets {
                    match registry.handle(&asset_id) {
                        Ok((_handle, restored)) => {
                            for id in restored {
                                order_index.insert(id, asset_id.clone());
                            }
                        }
                        Err(err) => {
                            tracing::warn!(
                                asset = %asset_id,
                                error = %err,
                                "book rehydration deferred to first reference"
                            );
                        }
                    }
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "could not list persisted assets");
            }
        }

        Self {
            registry,
            validator,
            order_index: RwLock::new(order_index),
            settlement,
            broadcaster,
        }
    }

    /// Actor handle for an asset, folding any rehydrated order ids into
    /// the order index.
    fn book_handle(&self, asset_id: &AssetId) -> Result<BookHandle> {
        let (handle, restored) = self.registry.handle(asset_id)?;
        if !restored.is_empty() {
            let mut index = self.order_index.write();
            for id in restored {
                index.insert(id, asset_id.clone());
            }
        }
        Ok(handle)
    }

    /// Place a limit order and run one matching pass.
    ///
    /// # Errors
    /// - validation errors from the [`Validator`], before any book mutation
    /// - `InvalidOrder` for zero price or quantity
    /// - `PersistenceFailed` if a first reference to the asset cannot be
    ///   rehydrated from storage
    pub async fn place_order(
        &self,
        asset_id: &AssetId,
        side: Side,
        price: u64,
        quantity: u64,
        maker: MakerId,
    ) -> Result<PlacementReceipt> {
        self.place(asset_id, side, price, quantity, maker, None).await
    }

    /// Place a limit order that lapses at `expires_at` if still unfilled.
    /// Expiry is lazy: the order is removed when it reaches the head of
    /// its queue during a later matching pass.
    pub async fn place_order_expiring(
        &self,
        asset_id: &AssetId,
        side: Side,
        price: u64,
        quantity: u64,
        maker: MakerId,
        expires_at: DateTime<Utc>,
    ) -> Result<PlacementReceipt> {
        self.place(asset_id, side, price, quantity, maker, Some(expires_at))
            .await
    }

    async fn place(
        &self,
        asset_id: &AssetId,
        side: Side,
        price: u64,
        quantity: u64,
        maker: MakerId,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<PlacementReceipt> {
        self.validator
            .check_funds(maker, asset_id, side, price, quantity)?;

        let handle = self.book_handle(asset_id)?;
        let outcome = handle.place(maker, side, price, quantity, expires_at).await?;

        // Index writes from concurrent placements may interleave and leave
        // a stale entry behind; cancel treats the actor's OrderNotFound as
        // authoritative and drops such entries on contact.
        let mut index = self.order_index.write();
        if !outcome.receipt.status.is_terminal() {
            index.insert(outcome.receipt.order_id, asset_id.clone());
        }
        for id in &outcome.closed {
            index.remove(id);
        }
        drop(index);

        Ok(outcome.receipt)
    }

    /// Cancel an open order. Only the maker that placed it may cancel it.
    ///
    /// # Errors
    /// - `OrderNotFound` if the order is not resting (unknown, filled,
    ///   already cancelled, or expired)
    /// - `Unauthorized` if `requester` did not place the order; the book
    ///   is untouched
    pub async fn cancel_order(
        &self,
        order_id: OrderId,
        requester: MakerId,
    ) -> Result<CancelReceipt> {
        let asset_id = self
            .order_index
            .read()
            .get(&order_id)
            .cloned()
            .ok_or(EngineError::OrderNotFound(order_id))?;

        let handle = self.book_handle(&asset_id)?;
        let result = handle.cancel(order_id, requester).await;
        match &result {
            Ok(_) | Err(EngineError::OrderNotFound(_)) => {
                // Gone from the book either way; drop the stale entry.
                self.order_index.write().remove(&order_id);
            }
            Err(_) => {}
        }
        result
    }

    /// Aggregated snapshot of one asset's book. References the asset,
    /// spawning an empty book for one never seen before.
    pub async fn snapshot(&self, asset_id: &AssetId) -> Result<BookSnapshot> {
        self.book_handle(asset_id)?.snapshot().await
    }

    /// Subscribe to change notifications for every book.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<BookUpdate> {
        self.broadcaster.subscribe()
    }

    /// Shared view of the settlement ledger, for reconciliation.
    #[must_use]
    pub fn settlement_ledger(&self) -> Arc<Mutex<SettlementLedger>> {
        self.settlement.ledger()
    }

    /// Assets with a live book.
    #[must_use]
    pub fn assets(&self) -> Vec<AssetId> {
        self.registry.assets()
    }

    /// Stop accepting work and wait for queued settlements to drain.
    pub async fn shutdown(self) {
        let Self {
            registry,
            settlement,
            ..
        } = self;
        // Dropping the registry drops every actor's sender; actors stop
        // once in-flight commands are answered.
        drop(registry);
        settlement.close().await;
    }
}
