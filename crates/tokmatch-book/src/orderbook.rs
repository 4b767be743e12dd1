//! The order book for a single tokenized asset.
//!
//! Uses `BTreeMap` for price-level ordering:
//! - **Bids** (buys): `BTreeMap<Reverse<u64>, PriceLevel>` -- highest price first
//! - **Asks** (sells): `BTreeMap<u64, PriceLevel>` -- lowest price first
//!
//! An auxiliary `HashMap<OrderId, (Side, u64)>` enables O(log N) cancellation.
//!
//! `match_orders` runs the continuous crossing loop: while the best bid
//! price is at least the best ask price, the two head orders trade at the
//! **resting** order's price (the one with the smaller `sequence`), for
//! `min` of their remaining quantities.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use tokmatch_types::{
    AssetId, BookSnapshot, EngineError, LevelSnapshot, Match, Order, OrderId, OrderStatus, Result,
    Side, TradeId,
};

use crate::price_level::PriceLevel;

/// Everything one matching pass produced: the fills in generation order,
/// plus any orders that were lazily removed because they had expired.
#[derive(Debug, Default)]
pub struct MatchOutcome {
    /// Fills, oldest resting orders matched first.
    pub matches: Vec<Match>,
    /// Orders removed from the book with status `Expired`.
    pub expired: Vec<Order>,
}

/// The order book for a single tokenized asset.
#[derive(Debug)]
pub struct OrderBook {
    /// The asset this book serves.
    pub asset_id: AssetId,
    /// Buy side: highest price first (`Reverse` key).
    bids: BTreeMap<Reverse<u64>, PriceLevel>,
    /// Sell side: lowest price first.
    asks: BTreeMap<u64, PriceLevel>,
    /// Fast lookup: `OrderId -> (side, price)` for O(log N) cancel.
    index: HashMap<OrderId, (Side, u64)>,
}

impl OrderBook {
    /// Create a new empty order book for the given asset.
    #[must_use]
    pub fn new(asset_id: AssetId) -> Self {
        Self {
            asset_id,
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            index: HashMap::new(),
        }
    }

    /// Rebuild a book purely from `(price, sequence)` — storage iteration
    /// order is irrelevant because level insertion is position-seeking.
    pub fn rebuild(asset_id: AssetId, orders: Vec<Order>) -> Result<Self> {
        let mut book = Self::new(asset_id);
        for order in orders {
            book.insert(order)?;
        }
        Ok(book)
    }

    // =================================================================
    // Insertion
    // =================================================================

    /// Insert an order into the correct side at its `(price, sequence)`
    /// position.
    ///
    /// # Errors
    /// - `InvalidOrder` for zero price, zero quantity, or a terminal status
    /// - `DuplicateOrder` if the id is already present
    pub fn insert(&mut self, order: Order) -> Result<()> {
        if order.price == 0 {
            return Err(EngineError::InvalidOrder {
                reason: "price must be positive".into(),
            });
        }
        if order.quantity == 0 {
            return Err(EngineError::InvalidOrder {
                reason: "quantity must be positive".into(),
            });
        }
        if !order.is_open() {
            return Err(EngineError::InvalidOrder {
                reason: format!("order status {} is terminal", order.status),
            });
        }
        if self.index.contains_key(&order.id) {
            return Err(EngineError::DuplicateOrder(order.id));
        }

        self.index.insert(order.id, (order.side, order.price));
        match order.side {
            Side::Buy => {
                self.bids
                    .entry(Reverse(order.price))
                    .or_insert_with(|| PriceLevel::new(order.price))
                    .insert(order);
            }
            Side::Sell => {
                self.asks
                    .entry(order.price)
                    .or_insert_with(|| PriceLevel::new(order.price))
                    .insert(order);
            }
        }
        Ok(())
    }

    // =================================================================
    // Removal
    // =================================================================

    /// Remove an order by ID from whichever side contains it. Returns the
    /// removed order with its status untouched; the caller decides whether
    /// it becomes `Cancelled` or `Expired`.
    pub fn remove(&mut self, order_id: &OrderId) -> Result<Order> {
        let (side, price) = self
            .index
            .remove(order_id)
            .ok_or(EngineError::OrderNotFound(*order_id))?;

        let order = match side {
            Side::Buy => {
                let level = self
                    .bids
                    .get_mut(&Reverse(price))
                    .ok_or(EngineError::OrderNotFound(*order_id))?;
                let order = level
                    .remove_order(order_id)
                    .ok_or(EngineError::OrderNotFound(*order_id))?;
                if level.is_empty() {
                    self.bids.remove(&Reverse(price));
                }
                order
            }
            Side::Sell => {
                let level = self
                    .asks
                    .get_mut(&price)
                    .ok_or(EngineError::OrderNotFound(*order_id))?;
                let order = level
                    .remove_order(order_id)
                    .ok_or(EngineError::OrderNotFound(*order_id))?;
                if level.is_empty() {
                    self.asks.remove(&price);
                }
                order
            }
        };

        Ok(order)
    }

    // =================================================================
    // Matching
    // =================================================================

    /// Run the continuous matching loop until the book no longer crosses.
    ///
    /// Stop condition: either side empty, or `best_bid < best_ask`. Each
    /// iteration trades the two head orders at the resting order's price
    /// (smaller `sequence`) for `min` of their remaining quantities. Fully
    /// filled orders leave their queue; partial fills stay at the head with
    /// price and sequence unchanged, so ordering is preserved.
    ///
    /// Expired head orders are removed (status `Expired`) instead of
    /// trading and reported in the outcome.
    pub fn match_orders(&mut self, now: DateTime<Utc>) -> MatchOutcome {
        let mut outcome = MatchOutcome::default();

        loop {
            let (Some(bid_price), Some(ask_price)) = (self.best_bid(), self.best_ask()) else {
                break;
            };
            if bid_price < ask_price {
                break;
            }

            let (Some(bid_level), Some(ask_level)) = (
                self.bids.get_mut(&Reverse(bid_price)),
                self.asks.get_mut(&ask_price),
            ) else {
                break;
            };
            let (Some(bid), Some(ask)) = (bid_level.front_mut(), ask_level.front_mut()) else {
                break;
            };

            let bid_expired = bid.is_expired(now);
            let ask_expired = ask.is_expired(now);
            if bid_expired || ask_expired {
                if bid_expired {
                    self.expire_head(Side::Buy, bid_price, &mut outcome.expired);
                }
                if ask_expired {
                    self.expire_head(Side::Sell, ask_price, &mut outcome.expired);
                }
                continue;
            }

            // Price-time priority: the resting order (earlier sequence)
            // sets the trade price.
            let resting_is_bid = bid.sequence < ask.sequence;
            let price = if resting_is_bid { bid.price } else { ask.price };
            let quantity = bid.remaining().min(ask.remaining());

            let fill = Match {
                id: TradeId::new(),
                asset_id: self.asset_id.clone(),
                bid_order_id: bid.id,
                bid_maker: bid.maker,
                ask_order_id: ask.id,
                ask_maker: ask.maker,
                resting_order_id: if resting_is_bid { bid.id } else { ask.id },
                price,
                quantity,
                executed_at: now,
            };

            bid.apply_fill(quantity);
            ask.apply_fill(quantity);
            let bid_done = bid.remaining() == 0;
            let ask_done = ask.remaining() == 0;

            tracing::debug!(
                asset = %self.asset_id,
                trade = %fill.id,
                price,
                quantity,
                "matched"
            );
            outcome.matches.push(fill);

            if bid_done {
                self.pop_head(Side::Buy, bid_price);
            }
            if ask_done {
                self.pop_head(Side::Sell, ask_price);
            }
        }

        outcome
    }

    /// Remove the head order on `side` at `price` from its queue and the
    /// index, dropping the level if it became empty.
    fn pop_head(&mut self, side: Side, price: u64) -> Option<Order> {
        let order = match side {
            Side::Buy => {
                let level = self.bids.get_mut(&Reverse(price))?;
                let order = level.pop_front();
                if level.is_empty() {
                    self.bids.remove(&Reverse(price));
                }
                order
            }
            Side::Sell => {
                let level = self.asks.get_mut(&price)?;
                let order = level.pop_front();
                if level.is_empty() {
                    self.asks.remove(&price);
                }
                order
            }
        }?;
        self.index.remove(&order.id);
        Some(order)
    }

    fn expire_head(&mut self, side: Side, price: u64, expired: &mut Vec<Order>) {
        if let Some(mut order) = self.pop_head(side, price) {
            order.status = OrderStatus::Expired;
            tracing::debug!(asset = %self.asset_id, order = %order.id, "expired at head");
            expired.push(order);
        }
    }

    // =================================================================
    // Queries
    // =================================================================

    /// Best (highest) bid price, or `None` if no bids.
    #[must_use]
    pub fn best_bid(&self) -> Option<u64> {
        self.bids.keys().next().map(|r| r.0)
    }

    /// Best (lowest) ask price, or `None` if no asks.
    #[must_use]
    pub fn best_ask(&self) -> Option<u64> {
        self.asks.keys().next().copied()
    }

    /// Spread = best_ask - best_bid. `None` if either side is empty.
    /// Negative spreads cannot outlive a matching pass, so this saturates.
    #[must_use]
    pub fn spread(&self) -> Option<u64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask.saturating_sub(bid)),
            _ => None,
        }
    }

    /// Look up an open order by ID.
    #[must_use]
    pub fn order(&self, order_id: &OrderId) -> Option<&Order> {
        let (side, price) = self.index.get(order_id)?;
        match side {
            Side::Buy => self.bids.get(&Reverse(*price))?.order(order_id),
            Side::Sell => self.asks.get(price)?.order(order_id),
        }
    }

    /// Check if an order is resting in the book.
    #[must_use]
    pub fn contains(&self, order_id: &OrderId) -> bool {
        self.index.contains_key(order_id)
    }

    /// Total number of orders currently in the book.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.index.len()
    }

    /// Number of distinct bid price levels.
    #[must_use]
    pub fn bid_depth(&self) -> usize {
        self.bids.len()
    }

    /// Number of distinct ask price levels.
    #[must_use]
    pub fn ask_depth(&self) -> usize {
        self.asks.len()
    }

    /// Returns `true` if the book has no orders on either side.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Largest sequence number seen among resting orders, for resuming the
    /// admission counter after a reload.
    #[must_use]
    pub fn max_sequence(&self) -> Option<u64> {
        self.iter_orders().map(|o| o.sequence).max()
    }

    // =================================================================
    // Snapshots & persistence
    // =================================================================

    /// Aggregated price levels per side, best-to-worst. Display/broadcast
    /// only — never consulted by matching decisions.
    #[must_use]
    pub fn snapshot(&self) -> BookSnapshot {
        BookSnapshot {
            asset_id: self.asset_id.clone(),
            bids: self
                .bids
                .values()
                .map(|level| LevelSnapshot {
                    price: level.price,
                    quantity: level.total_remaining(),
                })
                .collect(),
            asks: self
                .asks
                .values()
                .map(|level| LevelSnapshot {
                    price: level.price,
                    quantity: level.total_remaining(),
                })
                .collect(),
        }
    }

    /// All resting orders, cloned, for durable persistence.
    #[must_use]
    pub fn open_orders(&self) -> Vec<Order> {
        self.iter_orders().cloned().collect()
    }

    fn iter_orders(&self) -> impl Iterator<Item = &Order> {
        self.bids
            .values()
            .flat_map(|l| l.orders.iter())
            .chain(self.asks.values().flat_map(|l| l.orders.iter()))
    }
}
