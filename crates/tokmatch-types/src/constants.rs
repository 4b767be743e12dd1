//! System-wide constants for the TokMatch matching engine.

/// Default capacity of a per-asset actor's command channel.
pub const DEFAULT_COMMAND_BUFFER: usize = 1024;

/// Default capacity of the book-update broadcast channel.
pub const DEFAULT_BROADCAST_CAPACITY: usize = 256;

/// Default number of attempts for a durable snapshot write before giving up.
pub const DEFAULT_PERSIST_ATTEMPTS: u32 = 3;

/// Default bounded timeout for one settlement execution attempt (ms).
pub const DEFAULT_SETTLE_TIMEOUT_MS: u64 = 10_000;

/// Default settlement retry budget (attempts after the first).
pub const DEFAULT_SETTLE_MAX_RETRIES: u32 = 3;

/// Default initial settlement retry backoff (ms).
pub const DEFAULT_SETTLE_INITIAL_BACKOFF_MS: u64 = 1_000;

/// Default settlement retry backoff ceiling (ms).
pub const DEFAULT_SETTLE_MAX_BACKOFF_MS: u64 = 30_000;

/// Default settlement retry backoff multiplier per attempt.
pub const DEFAULT_SETTLE_BACKOFF_FACTOR: f64 = 2.0;

/// Settlement idempotency cache size (number of trade IDs to remember).
pub const SETTLEMENT_IDEMPOTENCY_CACHE_SIZE: usize = 500_000;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "TokMatch";
