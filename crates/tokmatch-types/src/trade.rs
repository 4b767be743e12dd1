//! Match records produced by the continuous matcher.
//!
//! A [`Match`] is the ephemeral record of one fill between a resting order
//! and the order that crossed it. It is consumed immediately by the caller
//! to drive settlement and trade-history persistence; the book itself keeps
//! no reference to it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AssetId, MakerId, OrderId, TradeId};

/// A single fill between a bid and an ask.
///
/// The trade executes at the price of the **resting** order — whichever of
/// the two has the smaller `sequence` — preserving price-time priority
/// rather than advantaging the incoming order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    /// Unique fill identifier.
    pub id: TradeId,
    /// The asset whose book produced this fill.
    pub asset_id: AssetId,
    /// The buy-side order.
    pub bid_order_id: OrderId,
    /// The buy-side order's owner.
    pub bid_maker: MakerId,
    /// The sell-side order.
    pub ask_order_id: OrderId,
    /// The sell-side order's owner.
    pub ask_maker: MakerId,
    /// Which of the two orders was resting (set the price).
    pub resting_order_id: OrderId,
    /// Execution price (the resting order's limit price).
    pub price: u64,
    /// Executed quantity.
    pub quantity: u64,
    /// When the matcher produced this fill.
    pub executed_at: DateTime<Utc>,
}

impl Match {
    /// Notional value = price × quantity, widened to avoid overflow.
    #[must_use]
    pub fn notional(&self) -> u128 {
        u128::from(self.price) * u128::from(self.quantity)
    }
}

impl std::fmt::Display for Match {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Match[{}] {} {} @ {} = {}",
            self.id,
            self.asset_id,
            self.quantity,
            self.price,
            self.notional(),
        )
    }
}

/// Reference to an external settlement transaction (e.g., an on-chain tx hash).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxReference(pub String);

impl std::fmt::Display for TxReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_match() -> Match {
        let bid = OrderId::new();
        Match {
            id: TradeId::new(),
            asset_id: AssetId::new("IPNFT-TEST"),
            bid_order_id: bid,
            bid_maker: MakerId::new(),
            ask_order_id: OrderId::new(),
            ask_maker: MakerId::new(),
            resting_order_id: bid,
            price: 95,
            quantity: 6,
            executed_at: Utc::now(),
        }
    }

    #[test]
    fn notional_widens() {
        let mut m = make_match();
        m.price = u64::MAX;
        m.quantity = u64::MAX;
        // Would overflow u64; must not overflow u128.
        assert_eq!(m.notional(), u128::from(u64::MAX) * u128::from(u64::MAX));
    }

    #[test]
    fn match_display() {
        let m = make_match();
        let s = format!("{m}");
        assert!(s.contains("IPNFT-TEST"));
        assert!(s.contains("95"));
    }

    #[test]
    fn match_serde_roundtrip() {
        let m = make_match();
        let json = serde_json::to_string(&m).unwrap();
        let back: Match = serde_json::from_str(&json).unwrap();
        assert_eq!(m.id, back.id);
        assert_eq!(m.price, back.price);
        assert_eq!(m.quantity, back.quantity);
        assert_eq!(m.resting_order_id, back.resting_order_id);
    }
}
