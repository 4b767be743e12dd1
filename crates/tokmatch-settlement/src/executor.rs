//! The external settlement collaborator.
//!
//! Real deployments implement [`SettlementExecutor`] over an on-chain
//! contract call or a custody API. The engine only sees the trait: one
//! fallible, possibly slow call per match, returning a transaction
//! reference on success.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokmatch_types::{Match, Result, TxReference};

/// Executes a single match against the external settlement system.
///
/// Retry policy is owned by the [`crate::SettlementWorker`], not by
/// implementations — an executor should make exactly one attempt per call.
#[async_trait]
pub trait SettlementExecutor: Send + Sync {
    /// Settle one fill. Returns the external transaction reference.
    async fn execute(&self, fill: &Match) -> Result<TxReference>;
}

/// In-process executor that fabricates transaction references.
///
/// Useful for development and tests; stands in for the real on-chain
/// executor the same way the platform's staging environment simulates
/// transaction hashes.
#[derive(Debug, Default)]
pub struct InstantExecutor {
    counter: AtomicU64,
}

impl InstantExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettlementExecutor for InstantExecutor {
    async fn execute(&self, _fill: &Match) -> Result<TxReference> {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        Ok(TxReference(format!("0x{n:064x}")))
    }
}
