//! Error types for the TokMatch matching engine.
//!
//! All errors use the `TM_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Order errors
//! - 2xx: Validation errors
//! - 3xx: Authorization errors
//! - 6xx: Settlement errors
//! - 7xx: Persistence errors
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::{AssetId, MakerId, OrderId, TradeId};

/// Central error enum for all TokMatch operations.
#[derive(Debug, Error)]
pub enum EngineError {
    // =================================================================
    // Order Errors (1xx)
    // =================================================================
    /// The requested order was not found in any active queue. Also the
    /// answer to "too late to cancel": a filled or already-cancelled order
    /// is no longer in the book.
    #[error("TM_ERR_100: Order not found: {0}")]
    OrderNotFound(OrderId),

    /// The order failed admission checks (non-positive price/quantity, etc.).
    #[error("TM_ERR_101: Invalid order: {reason}")]
    InvalidOrder { reason: String },

    /// An order with this ID already exists in the book.
    #[error("TM_ERR_102: Order already exists: {0}")]
    DuplicateOrder(OrderId),

    // =================================================================
    // Validation Errors (2xx)
    // =================================================================
    /// Not enough funds to cover the order's notional value.
    #[error("TM_ERR_200: Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: u128, available: u128 },

    /// The maker does not own enough of the asset to sell.
    #[error("TM_ERR_201: Maker {maker} does not hold enough of asset {asset}")]
    NotAssetOwner { maker: MakerId, asset: AssetId },

    // =================================================================
    // Authorization Errors (3xx)
    // =================================================================
    /// Cancellation requested by someone other than the order's maker.
    #[error("TM_ERR_300: Not authorized to cancel order {0}")]
    Unauthorized(OrderId),

    // =================================================================
    // Settlement Errors (6xx)
    // =================================================================
    /// The external settlement call failed or reverted.
    #[error("TM_ERR_600: Settlement failed: {reason}")]
    SettlementFailed { reason: String },

    /// The settlement call did not complete within its bounded timeout.
    #[error("TM_ERR_601: Settlement timed out after {timeout_ms}ms")]
    SettlementTimeout { timeout_ms: u64 },

    /// A trade has already been settled (idempotency guard).
    #[error("TM_ERR_602: Trade already settled: {0}")]
    TradeAlreadySettled(TradeId),

    // =================================================================
    // Persistence Errors (7xx)
    // =================================================================
    /// A durable snapshot write or read failed.
    #[error("TM_ERR_700: Persistence failed: {reason}")]
    PersistenceFailed { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("TM_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("TM_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// The per-asset book actor is gone (engine shutting down).
    #[error("TM_ERR_902: Matching engine unavailable")]
    EngineUnavailable,
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_contains_prefix() {
        let err = EngineError::OrderNotFound(OrderId::new());
        let msg = format!("{err}");
        assert!(msg.starts_with("TM_ERR_100"), "Got: {msg}");
    }

    #[test]
    fn insufficient_funds_display() {
        let err = EngineError::InsufficientFunds {
            needed: 1000,
            available: 50,
        };
        let msg = format!("{err}");
        assert!(msg.contains("TM_ERR_200"));
        assert!(msg.contains("1000"));
        assert!(msg.contains("50"));
    }

    #[test]
    fn all_errors_have_tm_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(EngineError::InvalidOrder {
                reason: "zero quantity".into(),
            }),
            Box::new(EngineError::Unauthorized(OrderId::new())),
            Box::new(EngineError::SettlementTimeout { timeout_ms: 500 }),
            Box::new(EngineError::EngineUnavailable),
            Box::new(EngineError::Internal("test".into())),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("TM_ERR_"),
                "Error missing TM_ERR_ prefix: {msg}"
            );
        }
    }
}
