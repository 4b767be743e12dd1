//! # tokmatch-book
//!
//! The per-asset order book and continuous matching algorithm — pure,
//! in-memory, zero side effects. Settlement, persistence, and broadcast all
//! live upstream in `tokmatch-engine`; nothing in this crate awaits or
//! performs I/O, which is what keeps price-time ordering decisions atomic
//! relative to concurrent submissions for the same asset.
//!
//! ## Ordering invariant
//!
//! Within one side of one book, orders are totally ordered by
//! `(price, sequence)`: best price first, then earliest sequence. The
//! `sequence` counter is assigned at admission and is the authoritative
//! tie-break — insertion is position-seeking, so rebuilding a book from
//! storage in any iteration order re-establishes the exact same queues.

pub mod orderbook;
pub mod price_level;

pub use orderbook::{MatchOutcome, OrderBook};
pub use price_level::PriceLevel;
