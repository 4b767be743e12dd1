//! Settlement idempotency guard — prevents double-settlement.
//!
//! Each trade id can be settled at most once; a second attempt returns
//! [`EngineError::TradeAlreadySettled`]. The guard keeps a bounded
//! insertion-ordered cache so memory stays predictable in long-running
//! engines.

use std::collections::{HashSet, VecDeque};

use tokmatch_types::{EngineError, Result, TradeId};

/// Prevents double-settlement of the same trade.
pub struct IdempotencyGuard {
    /// Trade ids already handed to the executor.
    seen: HashSet<TradeId>,
    /// Insertion order for eviction (front = oldest).
    order: VecDeque<TradeId>,
    /// Maximum entries before the oldest is evicted.
    capacity: usize,
}

impl IdempotencyGuard {
    /// Create a guard with the given capacity.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "IdempotencyGuard capacity must be > 0");
        Self {
            seen: HashSet::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Claim a trade id for settlement.
    ///
    /// # Errors
    /// Returns [`EngineError::TradeAlreadySettled`] if the id was already
    /// claimed.
    pub fn claim(&mut self, trade_id: TradeId) -> Result<()> {
        if self.seen.contains(&trade_id) {
            return Err(EngineError::TradeAlreadySettled(trade_id));
        }

        if self.seen.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }

        self.seen.insert(trade_id);
        self.order.push_back(trade_id);
        Ok(())
    }

    /// Whether a trade id has already been claimed.
    pub fn is_claimed(&self, trade_id: &TradeId) -> bool {
        self.seen.contains(trade_id)
    }

    /// Number of trade ids currently tracked.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether no trade ids are tracked.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_claim_ok() {
        let mut guard = IdempotencyGuard::new(100);
        let trade_id = TradeId::new();
        assert!(guard.claim(trade_id).is_ok());
        assert!(guard.is_claimed(&trade_id));
        assert_eq!(guard.len(), 1);
    }

    #[test]
    fn double_claim_blocked() {
        let mut guard = IdempotencyGuard::new(100);
        let trade_id = TradeId::new();
        guard.claim(trade_id).unwrap();

        let err = guard.claim(trade_id).unwrap_err();
        assert!(
            matches!(err, EngineError::TradeAlreadySettled(id) if id == trade_id),
            "Expected TradeAlreadySettled, got: {err:?}"
        );
    }

    #[test]
    fn evicts_oldest_at_capacity() {
        let mut guard = IdempotencyGuard::new(3);
        let ids: Vec<TradeId> = (0..4).map(|_| TradeId::new()).collect();

        guard.claim(ids[0]).unwrap();
        guard.claim(ids[1]).unwrap();
        guard.claim(ids[2]).unwrap();
        assert_eq!(guard.len(), 3);

        guard.claim(ids[3]).unwrap();
        assert_eq!(guard.len(), 3);
        assert!(!guard.is_claimed(&ids[0]), "oldest should have been evicted");
        assert!(guard.is_claimed(&ids[1]));
        assert!(guard.is_claimed(&ids[3]));
    }

    #[test]
    fn empty_guard() {
        let guard = IdempotencyGuard::new(10);
        assert!(guard.is_empty());
        assert!(!guard.is_claimed(&TradeId::new()));
    }

    #[test]
    #[should_panic(expected = "capacity must be > 0")]
    fn zero_capacity_panics() {
        let _ = IdempotencyGuard::new(0);
    }
}
