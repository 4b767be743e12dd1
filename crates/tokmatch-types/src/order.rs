//! Order model for the TokMatch engine.
//!
//! Prices and quantities are integers in the asset's smallest units — never
//! floating point, so repeated arithmetic cannot drift. The `sequence` field
//! is the authoritative tie-break for equal-price orders: it is assigned
//! monotonically at admission by the asset's book actor, independent of any
//! sort algorithm's stability guarantees.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AssetId, MakerId, OrderId};

/// Which side of the book this order is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The opposite side of the book.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Lifecycle status of an order.
///
/// `Filled`, `Cancelled`, and `Expired` are terminal: an order in one of
/// those states is never mutated again and is no longer in any book queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum OrderStatus {
    Open,
    PartiallyFilled,
    Filled,
    Cancelled,
    Expired,
}

impl OrderStatus {
    /// Returns `true` for terminal states.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Filled | Self::Cancelled | Self::Expired)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::PartiallyFilled => write!(f, "PARTIALLY_FILLED"),
            Self::Filled => write!(f, "FILLED"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Expired => write!(f, "EXPIRED"),
        }
    }
}

/// A resting buy or sell intent for a tokenized asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub asset_id: AssetId,
    pub maker: MakerId,
    pub side: Side,
    /// Limit price in the asset's smallest price unit. Always `> 0`.
    pub price: u64,
    /// Total order size in the asset's smallest quantity unit. Always `> 0`.
    pub quantity: u64,
    /// Monotone: `0 <= filled_quantity <= quantity`, only grows via fills.
    pub filled_quantity: u64,
    pub status: OrderStatus,
    /// Admission counter, unique per asset. Tie-break for equal prices.
    pub sequence: u64,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Construct a freshly admitted order.
    #[must_use]
    pub fn new(
        asset_id: AssetId,
        maker: MakerId,
        side: Side,
        price: u64,
        quantity: u64,
        sequence: u64,
    ) -> Self {
        Self {
            id: OrderId::new(),
            asset_id,
            maker,
            side,
            price,
            quantity,
            filled_quantity: 0,
            status: OrderStatus::Open,
            sequence,
            created_at: Utc::now(),
            expires_at: None,
        }
    }

    /// Unfilled remainder.
    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.quantity - self.filled_quantity
    }

    /// Whether the order can still participate in matching.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Whether the order's `expires_at` deadline has passed.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }

    /// Record a fill of `qty` against this order and advance its status.
    ///
    /// Caller guarantees `0 < qty <= remaining()` — the matcher computes
    /// `qty = min(remaining(bid), remaining(ask))`, so this always holds.
    pub fn apply_fill(&mut self, qty: u64) {
        debug_assert!(qty > 0 && qty <= self.remaining());
        self.filled_quantity += qty;
        self.status = if self.remaining() == 0 {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
    }
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Order[{}] {} {} {}/{} @ {} seq={}",
            self.id,
            self.asset_id,
            self.side,
            self.filled_quantity,
            self.quantity,
            self.price,
            self.sequence,
        )
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Order {
    pub fn dummy(side: Side, price: u64, quantity: u64, sequence: u64) -> Self {
        Self::new(
            AssetId::new("IPNFT-TEST"),
            MakerId::new(),
            side,
            price,
            quantity,
            sequence,
        )
    }

    pub fn dummy_for_maker(
        maker: MakerId,
        side: Side,
        price: u64,
        quantity: u64,
        sequence: u64,
    ) -> Self {
        Self::new(AssetId::new("IPNFT-TEST"), maker, side, price, quantity, sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_order_is_open() {
        let order = Order::dummy(Side::Buy, 100, 10, 0);
        assert_eq!(order.status, OrderStatus::Open);
        assert_eq!(order.remaining(), 10);
        assert!(order.is_open());
    }

    #[test]
    fn partial_fill_advances_status() {
        let mut order = Order::dummy(Side::Buy, 100, 10, 0);
        order.apply_fill(4);
        assert_eq!(order.status, OrderStatus::PartiallyFilled);
        assert_eq!(order.remaining(), 6);
        assert!(order.is_open());
    }

    #[test]
    fn full_fill_is_terminal() {
        let mut order = Order::dummy(Side::Sell, 100, 10, 0);
        order.apply_fill(10);
        assert_eq!(order.status, OrderStatus::Filled);
        assert_eq!(order.remaining(), 0);
        assert!(!order.is_open());
        assert!(order.status.is_terminal());
    }

    #[test]
    fn fills_accumulate_monotonically() {
        let mut order = Order::dummy(Side::Buy, 100, 10, 0);
        order.apply_fill(3);
        order.apply_fill(3);
        assert_eq!(order.filled_quantity, 6);
        order.apply_fill(4);
        assert_eq!(order.filled_quantity, 10);
        assert_eq!(order.status, OrderStatus::Filled);
    }

    #[test]
    fn expiry_check() {
        let mut order = Order::dummy(Side::Buy, 100, 10, 0);
        assert!(!order.is_expired(Utc::now()));
        order.expires_at = Some(Utc::now() - chrono::Duration::seconds(1));
        assert!(order.is_expired(Utc::now()));
    }

    #[test]
    fn side_display_and_opposite() {
        assert_eq!(format!("{}", Side::Buy), "BUY");
        assert_eq!(format!("{}", Side::Sell), "SELL");
        assert_eq!(Side::Buy.opposite(), Side::Sell);
    }

    #[test]
    fn order_serde_roundtrip() {
        let order = Order::dummy(Side::Sell, 95, 6, 3);
        let json = serde_json::to_string(&order).unwrap();
        let back: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(order.id, back.id);
        assert_eq!(order.price, back.price);
        assert_eq!(order.sequence, back.sequence);
        assert_eq!(order.status, back.status);
    }
}
