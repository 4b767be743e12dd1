//! # tokmatch-types
//!
//! Shared types, errors, and configuration for the **TokMatch** matching
//! engine.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`OrderId`], [`MakerId`], [`TradeId`], [`AssetId`]
//! - **Order model**: [`Order`], [`Side`], [`OrderStatus`]
//! - **Match model**: [`Match`], [`TxReference`]
//! - **Snapshot model**: [`BookSnapshot`], [`LevelSnapshot`], [`BookUpdate`]
//! - **Receipts**: [`PlacementReceipt`], [`CancelReceipt`]
//! - **Configuration**: [`EngineConfig`], [`SettlementConfig`]
//! - **Errors**: [`EngineError`] with `TM_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod order;
pub mod receipt;
pub mod snapshot;
pub mod trade;

// Re-export all primary types at crate root for ergonomic imports:
//   use tokmatch_types::{Order, Side, Match, BookSnapshot, ...};

pub use config::*;
pub use error::*;
pub use ids::*;
pub use order::*;
pub use receipt::*;
pub use snapshot::*;
pub use trade::*;

// Constants are accessed via `tokmatch_types::constants::FOO`
// (not re-exported to avoid name collisions).
