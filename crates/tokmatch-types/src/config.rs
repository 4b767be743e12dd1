//! Configuration types for the TokMatch engine.

use serde::{Deserialize, Serialize};

use crate::constants;

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Capacity of each per-asset actor's command channel.
    pub command_buffer: usize,
    /// Capacity of the book-update broadcast channel.
    pub broadcast_capacity: usize,
    /// Attempts for a durable snapshot write before logging and moving on.
    pub persist_attempts: u32,
    /// Settlement worker configuration.
    pub settlement: SettlementConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command_buffer: constants::DEFAULT_COMMAND_BUFFER,
            broadcast_capacity: constants::DEFAULT_BROADCAST_CAPACITY,
            persist_attempts: constants::DEFAULT_PERSIST_ATTEMPTS,
            settlement: SettlementConfig::default(),
        }
    }
}

/// Configuration for the background settlement worker.
///
/// Defaults mirror the platform's on-chain transaction policy: three retries
/// with exponential backoff from 1s up to a 30s ceiling, each attempt under
/// a bounded timeout. A timeout does not roll back the match itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementConfig {
    /// Bounded timeout for a single execution attempt, in milliseconds.
    pub execute_timeout_ms: u64,
    /// Retry budget after the first attempt.
    pub max_retries: u32,
    /// Initial backoff between attempts, in milliseconds.
    pub initial_backoff_ms: u64,
    /// Backoff ceiling, in milliseconds.
    pub max_backoff_ms: u64,
    /// Backoff multiplier applied per attempt.
    pub backoff_factor: f64,
    /// Idempotency cache size (trade IDs remembered).
    pub idempotency_cache_size: usize,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            execute_timeout_ms: constants::DEFAULT_SETTLE_TIMEOUT_MS,
            max_retries: constants::DEFAULT_SETTLE_MAX_RETRIES,
            initial_backoff_ms: constants::DEFAULT_SETTLE_INITIAL_BACKOFF_MS,
            max_backoff_ms: constants::DEFAULT_SETTLE_MAX_BACKOFF_MS,
            backoff_factor: constants::DEFAULT_SETTLE_BACKOFF_FACTOR,
            idempotency_cache_size: constants::SETTLEMENT_IDEMPOTENCY_CACHE_SIZE,
        }
    }
}
