//! Receipts returned to callers of the matching service.

use serde::{Deserialize, Serialize};

use crate::{Match, OrderId, OrderStatus};

/// Result of a successful `place_order` call: the admitted order's id, its
/// status after the matching pass, and the fills produced, in generation
/// order (oldest resting orders first).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementReceipt {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub matches: Vec<Match>,
}

impl PlacementReceipt {
    /// Total quantity filled across all matches in this placement.
    #[must_use]
    pub fn filled_quantity(&self) -> u64 {
        self.matches.iter().map(|m| m.quantity).sum()
    }
}

/// Result of a successful `cancel_order` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelReceipt {
    pub order_id: OrderId,
    pub cancelled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AssetId, MakerId, TradeId};
    use chrono::Utc;

    #[test]
    fn filled_quantity_sums_matches() {
        let bid = OrderId::new();
        let make = |qty: u64| Match {
            id: TradeId::new(),
            asset_id: AssetId::new("IPNFT-TEST"),
            bid_order_id: bid,
            bid_maker: MakerId::new(),
            ask_order_id: OrderId::new(),
            ask_maker: MakerId::new(),
            resting_order_id: bid,
            price: 100,
            quantity: qty,
            executed_at: Utc::now(),
        };
        let receipt = PlacementReceipt {
            order_id: bid,
            status: OrderStatus::Filled,
            matches: vec![make(2), make(1)],
        };
        assert_eq!(receipt.filled_quantity(), 3);
    }

    #[test]
    fn empty_placement_fills_nothing() {
        let receipt = PlacementReceipt {
            order_id: OrderId::new(),
            status: OrderStatus::Open,
            matches: vec![],
        };
        assert_eq!(receipt.filled_quantity(), 0);
    }
}
