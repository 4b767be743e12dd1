//! Matching engine orchestration for fractional tokenized assets.
//!
//! Ties the pure order book to the outside world: a [`MatchingService`]
//! validates placements, routes them to single-writer per-asset actors,
//! hands fills to the asynchronous settlement plane, persists open orders
//! after every mutation, and broadcasts aggregated book updates.

mod actor;
mod broadcast;
mod persistence;
mod registry;
mod service;
mod validator;

pub use broadcast::{Broadcaster, ChannelBroadcaster, NullBroadcaster};
pub use persistence::{MemoryStore, SnapshotStore};
pub use service::MatchingService;
pub use validator::{BalanceValidator, Unrestricted, Validator};
