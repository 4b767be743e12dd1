//! Settlement ledger — the durable record of each fill's settlement state.
//!
//! The ledger is the reconciliation surface for the known consistency gap
//! between matching and settlement: a match is final in the book the moment
//! it is computed, so when the external call ultimately fails the entry
//! stays `Failed` here for an out-of-band process to retry or reverse.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokmatch_types::{Match, TradeId, TxReference};

/// Settlement state of one fill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlementStatus {
    /// Queued or being retried.
    Pending,
    /// The external call succeeded.
    Confirmed(TxReference),
    /// The retry budget was exhausted.
    Failed { reason: String },
}

/// One ledger entry.
#[derive(Debug, Clone)]
pub struct SettlementRecord {
    pub fill: Match,
    pub status: SettlementStatus,
    /// Execution attempts made so far.
    pub attempts: u32,
    pub updated_at: DateTime<Utc>,
}

/// Tracks every fill handed to the settlement worker.
#[derive(Debug, Default)]
pub struct SettlementLedger {
    records: HashMap<TradeId, SettlementRecord>,
}

impl SettlementLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fill as pending settlement.
    pub fn record_pending(&mut self, fill: &Match) {
        self.records.insert(
            fill.id,
            SettlementRecord {
                fill: fill.clone(),
                status: SettlementStatus::Pending,
                attempts: 0,
                updated_at: Utc::now(),
            },
        );
    }

    /// Count one execution attempt against a fill.
    pub fn record_attempt(&mut self, trade_id: &TradeId) {
        if let Some(record) = self.records.get_mut(trade_id) {
            record.attempts += 1;
            record.updated_at = Utc::now();
        }
    }

    /// Mark a fill as confirmed with its external transaction reference.
    pub fn mark_confirmed(&mut self, trade_id: &TradeId, tx: TxReference) {
        if let Some(record) = self.records.get_mut(trade_id) {
            record.status = SettlementStatus::Confirmed(tx);
            record.updated_at = Utc::now();
        }
    }

    /// Mark a fill as failed after the retry budget was exhausted.
    pub fn mark_failed(&mut self, trade_id: &TradeId, reason: impl Into<String>) {
        if let Some(record) = self.records.get_mut(trade_id) {
            record.status = SettlementStatus::Failed {
                reason: reason.into(),
            };
            record.updated_at = Utc::now();
        }
    }

    /// Settlement status for a fill, if known.
    #[must_use]
    pub fn status(&self, trade_id: &TradeId) -> Option<&SettlementStatus> {
        self.records.get(trade_id).map(|r| &r.status)
    }

    /// Full record for a fill, if known.
    #[must_use]
    pub fn record(&self, trade_id: &TradeId) -> Option<&SettlementRecord> {
        self.records.get(trade_id)
    }

    /// All failed records, for reconciliation.
    #[must_use]
    pub fn failed(&self) -> Vec<&SettlementRecord> {
        self.records
            .values()
            .filter(|r| matches!(r.status, SettlementStatus::Failed { .. }))
            .collect()
    }

    /// Number of fills tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the ledger has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
