//! Per-asset book actor.
//!
//! Each asset's book is owned by exactly one tokio task. Commands arrive
//! on an mpsc channel and are applied strictly in arrival order, which is
//! what makes the `sequence` counter and price-time priority deterministic
//! without any locking around the book itself. The actor never awaits
//! settlement: fills go out over an unbounded channel and the next command
//! runs immediately.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot};
use tokmatch_types::{
    AssetId, CancelReceipt, EngineError, MakerId, Match, Order, OrderId, OrderStatus,
    PlacementReceipt, Result, Side,
};
use tokmatch_book::OrderBook;

use crate::broadcast::Broadcaster;
use crate::persistence::SnapshotStore;

/// What one placement did, for the service's order index: the public
/// receipt plus every order id that left the book during the pass.
#[derive(Debug)]
pub(crate) struct PlacementOutcome {
    pub receipt: PlacementReceipt,
    pub closed: Vec<OrderId>,
}

pub(crate) enum BookCommand {
    Place {
        maker: MakerId,
        side: Side,
        price: u64,
        quantity: u64,
        expires_at: Option<DateTime<Utc>>,
        reply: oneshot::Sender<Result<PlacementOutcome>>,
    },
    Cancel {
        order_id: OrderId,
        requester: MakerId,
        reply: oneshot::Sender<Result<CancelReceipt>>,
    },
    Snapshot {
        reply: oneshot::Sender<tokmatch_types::BookSnapshot>,
    },
}

/// Cloneable handle to one asset's actor.
#[derive(Clone)]
pub(crate) struct BookHandle {
    tx: mpsc::Sender<BookCommand>,
}

impl BookHandle {
    pub(crate) async fn place(
        &self,
        maker: MakerId,
        side: Side,
        price: u64,
        quantity: u64,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<PlacementOutcome> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(BookCommand::Place {
                maker,
                side,
                price,
                quantity,
                expires_at,
                reply,
            })
            .await
            .map_err(|_| EngineError::EngineUnavailable)?;
        rx.await.map_err(|_| EngineError::EngineUnavailable)?
    }

    pub(crate) async fn cancel(
        &self,
        order_id: OrderId,
        requester: MakerId,
    ) -> Result<CancelReceipt> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(BookCommand::Cancel {
                order_id,
                requester,
                reply,
            })
            .await
            .map_err(|_| EngineError::EngineUnavailable)?;
        rx.await.map_err(|_| EngineError::EngineUnavailable)?
    }

    pub(crate) async fn snapshot(&self) -> Result<tokmatch_types::BookSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(BookCommand::Snapshot { reply })
            .await
            .map_err(|_| EngineError::EngineUnavailable)?;
        rx.await.map_err(|_| EngineError::EngineUnavailable)
    }
}

pub(crate) struct BookActor {
    book: OrderBook,
    /// Next admission sequence. Strictly increasing per asset.
    next_sequence: u64,
    store: Arc<dyn SnapshotStore>,
    broadcaster: Arc<dyn Broadcaster>,
    settlement: mpsc::UnboundedSender<Match>,
    persist_attempts: u32,
}

impl BookActor {
    /// Rehydrate the asset's book from storage and spawn its actor.
    /// Also returns the restored order ids so the service can repopulate
    /// its order index.
    ///
    /// # Errors
    /// Returns `PersistenceFailed` (from the store) or the rebuild error if
    /// the stored snapshot cannot be loaded; no actor is spawned then.
    pub(crate) fn spawn(
        asset_id: AssetId,
        store: Arc<dyn SnapshotStore>,
        broadcaster: Arc<dyn Broadcaster>,
        settlement: mpsc::UnboundedSender<Match>,
        command_buffer: usize,
        persist_attempts: u32,
    ) -> Result<(BookHandle, Vec<OrderId>)> {
        let stored = store.load(&asset_id)?;
        let restored: Vec<OrderId> = stored.iter().map(|o| o.id).collect();
        let book = OrderBook::rebuild(asset_id, stored)?;
        let next_sequence = book.max_sequence().map_or(0, |max| max + 1);
        if !restored.is_empty() {
            tracing::info!(
                asset = %book.asset_id,
                orders = restored.len(),
                next_sequence,
                "book rehydrated from storage"
            );
        }

        let mut actor = Self {
            book,
            next_sequence,
            store,
            broadcaster,
            settlement,
            persist_attempts,
        };
        let (tx, mut rx) = mpsc::channel(command_buffer);
        tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                actor.handle(command);
            }
            tracing::debug!(asset = %actor.book.asset_id, "book actor stopped");
        });
        Ok((BookHandle { tx }, restored))
    }

    fn handle(&mut self, command: BookCommand) {
        match command {
            BookCommand::Place {
                maker,
                side,
                price,
                quantity,
                expires_at,
                reply,
            } => {
                let result = self.place(maker, side, price, quantity, expires_at);
                let _ = reply.send(result);
            }
            BookCommand::Cancel {
                order_id,
                requester,
                reply,
            } => {
                let result = self.cancel(order_id, requester);
                let _ = reply.send(result);
            }
            BookCommand::Snapshot { reply } => {
                let _ = reply.send(self.book.snapshot());
            }
        }
    }

    /// Admit, insert, and run one matching pass.
    fn place(
        &mut self,
        maker: MakerId,
        side: Side,
        price: u64,
        quantity: u64,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<PlacementOutcome> {
        let mut order = Order::new(
            self.book.asset_id.clone(),
            maker,
            side,
            price,
            quantity,
            self.next_sequence,
        );
        order.expires_at = expires_at;
        let order_id = order.id;

        self.book.insert(order)?;
        // The sequence is burned only once the order is actually admitted.
        self.next_sequence += 1;

        let now = Utc::now();
        let outcome = self.book.match_orders(now);

        let status = if let Some(resting) = self.book.order(&order_id) {
            resting.status
        } else if outcome.expired.iter().any(|o| o.id == order_id) {
            OrderStatus::Expired
        } else {
            OrderStatus::Filled
        };

        let mut closed: Vec<OrderId> = Vec::new();
        for id in outcome
            .matches
            .iter()
            .flat_map(|m| [m.bid_order_id, m.ask_order_id])
            .chain(outcome.expired.iter().map(|o| o.id))
        {
            if !self.book.contains(&id) && !closed.contains(&id) {
                closed.push(id);
            }
        }

        for fill in &outcome.matches {
            if self.settlement.send(fill.clone()).is_err() {
                tracing::warn!(trade = %fill.id, "settlement worker gone; fill not queued");
            }
        }

        tracing::info!(
            asset = %self.book.asset_id,
            order = %order_id,
            %side,
            price,
            quantity,
            fills = outcome.matches.len(),
            %status,
            "order placed"
        );

        self.persist_and_broadcast();
        Ok(PlacementOutcome {
            receipt: PlacementReceipt {
                order_id,
                status,
                matches: outcome.matches,
            },
            closed,
        })
    }

    /// Remove an open order if the requester placed it.
    fn cancel(&mut self, order_id: OrderId, requester: MakerId) -> Result<CancelReceipt> {
        let Some(order) = self.book.order(&order_id) else {
            return Err(EngineError::OrderNotFound(order_id));
        };
        if order.maker != requester {
            // The book is left untouched.
            return Err(EngineError::Unauthorized(order_id));
        }

        let mut removed = self.book.remove(&order_id)?;
        removed.status = OrderStatus::Cancelled;
        tracing::info!(asset = %self.book.asset_id, order = %order_id, "order cancelled");

        self.persist_and_broadcast();
        Ok(CancelReceipt {
            order_id,
            cancelled: true,
        })
    }

    /// Write the open-order set through the store, then publish the new
    /// aggregated snapshot. Persistence failure never fails the request
    /// that triggered it; the book stays authoritative in memory.
    fn persist_and_broadcast(&self) {
        let orders = self.book.open_orders();
        for attempt in 1..=self.persist_attempts {
            match self.store.save(&self.book.asset_id, &orders) {
                Ok(()) => break,
                Err(err) if attempt < self.persist_attempts => {
                    tracing::warn!(
                        asset = %self.book.asset_id,
                        attempt,
                        error = %err,
                        "snapshot write failed, retrying"
                    );
                }
                Err(err) => {
                    tracing::error!(
                        asset = %self.book.asset_id,
                        error = %err,
                        "snapshot write failed; book is ahead of storage"
                    );
                }
            }
        }

        self.broadcaster.publish(tokmatch_types::BookUpdate {
            asset_id: self.book.asset_id.clone(),
            snapshot: self.book.snapshot(),
        });
    }
}
