//! # tokmatch-settlement
//!
//! **Settlement plane**: asynchronous execution of matches against an
//! external settlement system (e.g., an on-chain contract call).
//!
//! ## Architecture
//!
//! The matching path computes fills synchronously and hands them to this
//! plane over an unbounded queue; nothing here can block or slow the next
//! order for the same asset. Per fill, the [`SettlementWorker`]:
//! 1. Checks idempotency (no double-settlement of a trade id)
//! 2. Invokes the [`SettlementExecutor`] under a bounded timeout
//! 3. Retries with exponential backoff up to a bounded budget
//! 4. Records the outcome in the [`SettlementLedger`]
//!
//! A failed or timed-out settlement never rolls back the match — the book
//! considers the trade final once computed. Failed entries stay in the
//! ledger for out-of-band reconciliation.

pub mod executor;
pub mod idempotency;
pub mod ledger;
pub mod retry;
pub mod worker;

pub use executor::{InstantExecutor, SettlementExecutor};
pub use idempotency::IdempotencyGuard;
pub use ledger::{SettlementLedger, SettlementStatus};
pub use retry::RetryPolicy;
pub use worker::{SettlementHandle, SettlementWorker};
