//! Aggregated book snapshots.
//!
//! A [`BookSnapshot`] is the display/broadcast view of one asset's book:
//! price levels with total remaining quantity, best-to-worst per side. It is
//! never consulted by the matching path itself.

use serde::{Deserialize, Serialize};

use crate::AssetId;

/// One aggregated price level: total remaining quantity at a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSnapshot {
    pub price: u64,
    pub quantity: u64,
}

/// Aggregated view of one asset's book at a point in time.
///
/// `bids` are ordered highest price first, `asks` lowest price first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub asset_id: AssetId,
    pub bids: Vec<LevelSnapshot>,
    pub asks: Vec<LevelSnapshot>,
}

impl BookSnapshot {
    /// An empty snapshot for the given asset.
    #[must_use]
    pub fn empty(asset_id: AssetId) -> Self {
        Self {
            asset_id,
            bids: Vec::new(),
            asks: Vec::new(),
        }
    }

    /// Best (highest) bid price, or `None` if no bids.
    #[must_use]
    pub fn best_bid(&self) -> Option<u64> {
        self.bids.first().map(|l| l.price)
    }

    /// Best (lowest) ask price, or `None` if no asks.
    #[must_use]
    pub fn best_ask(&self) -> Option<u64> {
        self.asks.first().map(|l| l.price)
    }

    /// Returns `true` if both sides are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}

/// Change notification emitted after every book mutation, intended for
/// fan-out by the broadcast collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookUpdate {
    pub asset_id: AssetId,
    pub snapshot: BookSnapshot,
}
