//! Background settlement worker.
//!
//! Matches are computed synchronously inside a per-asset actor and must
//! never wait on the network, so the actor hands each fill to this worker
//! over an unbounded channel and moves on. The worker drains the queue one
//! fill at a time: idempotency claim, timed execution, bounded retries with
//! backoff, ledger bookkeeping.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokmatch_types::{EngineError, Match, Result, SettlementConfig};

use crate::executor::SettlementExecutor;
use crate::idempotency::IdempotencyGuard;
use crate::ledger::SettlementLedger;
use crate::retry::RetryPolicy;

/// Spawns and owns the background settlement task.
pub struct SettlementWorker;

/// Handle to a running settlement worker.
pub struct SettlementHandle {
    queue: mpsc::UnboundedSender<Match>,
    ledger: Arc<Mutex<SettlementLedger>>,
    task: JoinHandle<()>,
}

impl SettlementWorker {
    /// Spawn the worker task.
    #[must_use]
    pub fn spawn(
        executor: Arc<dyn SettlementExecutor>,
        config: &SettlementConfig,
    ) -> SettlementHandle {
        let policy = RetryPolicy::from_config(config);
        let attempt_timeout = Duration::from_millis(config.execute_timeout_ms);
        let mut guard = IdempotencyGuard::new(config.idempotency_cache_size);
        let ledger = Arc::new(Mutex::new(SettlementLedger::new()));

        let (tx, mut rx) = mpsc::unbounded_channel::<Match>();
        let worker_ledger = Arc::clone(&ledger);
        let task = tokio::spawn(async move {
            while let Some(fill) = rx.recv().await {
                if guard.claim(fill.id).is_err() {
                    tracing::warn!(trade = %fill.id, "duplicate settlement submission skipped");
                    continue;
                }
                worker_ledger.lock().record_pending(&fill);
                settle_one(&*executor, &worker_ledger, &policy, attempt_timeout, &fill).await;
            }
        });

        SettlementHandle {
            queue: tx,
            ledger,
            task,
        }
    }
}

impl SettlementHandle {
    /// Queue a fill for settlement. Never blocks.
    ///
    /// # Errors
    /// Returns [`EngineError::EngineUnavailable`] if the worker has stopped.
    pub fn submit(&self, fill: Match) -> Result<()> {
        self.queue
            .send(fill)
            .map_err(|_| EngineError::EngineUnavailable)
    }

    /// A cloneable sender for per-asset actors.
    #[must_use]
    pub fn sender(&self) -> mpsc::UnboundedSender<Match> {
        self.queue.clone()
    }

    /// Shared view of the settlement ledger.
    #[must_use]
    pub fn ledger(&self) -> Arc<Mutex<SettlementLedger>> {
        Arc::clone(&self.ledger)
    }

    /// Stop accepting fills, drain the queue, and wait for the worker.
    pub async fn close(self) {
        drop(self.queue);
        let _ = self.task.await;
    }
}

/// Run one fill through the timed, retried execution path. The match is
/// final either way; exhaustion only marks the ledger entry `Failed`.
async fn settle_one(
    executor: &dyn SettlementExecutor,
    ledger: &Mutex<SettlementLedger>,
    policy: &RetryPolicy,
    attempt_timeout: Duration,
    fill: &Match,
) {
    let mut last_error = String::new();

    for attempt in 0..policy.total_attempts() {
        ledger.lock().record_attempt(&fill.id);

        match tokio::time::timeout(attempt_timeout, executor.execute(fill)).await {
            Ok(Ok(tx)) => {
                tracing::info!(trade = %fill.id, tx = %tx, "settled");
                ledger.lock().mark_confirmed(&fill.id, tx);
                return;
            }
            Ok(Err(err)) => {
                tracing::warn!(trade = %fill.id, attempt, error = %err, "settlement attempt failed");
                last_error = err.to_string();
            }
            Err(_elapsed) => {
                let err = EngineError::SettlementTimeout {
                    timeout_ms: u64::try_from(attempt_timeout.as_millis()).unwrap_or(u64::MAX),
                };
                tracing::warn!(trade = %fill.id, attempt, error = %err, "settlement attempt timed out");
                last_error = err.to_string();
            }
        }

        if attempt + 1 < policy.total_attempts() {
            tokio::time::sleep(policy.backoff_for(attempt)).await;
        }
    }

    tracing::error!(trade = %fill.id, reason = %last_error, "settlement retry budget exhausted");
    ledger.lock().mark_failed(&fill.id, last_error);
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::Utc;
    use tokmatch_types::{AssetId, MakerId, OrderId, TradeId, TxReference};

    use super::*;
    use crate::executor::InstantExecutor;
    use crate::ledger::SettlementStatus;

    fn make_fill() -> Match {
        let bid = OrderId::new();
        Match {
            id: TradeId::new(),
            asset_id: AssetId::new("IPNFT-TEST"),
            bid_order_id: bid,
            bid_maker: MakerId::new(),
            ask_order_id: OrderId::new(),
            ask_maker: MakerId::new(),
            resting_order_id: bid,
            price: 100,
            quantity: 2,
            executed_at: Utc::now(),
        }
    }

    fn fast_config() -> SettlementConfig {
        SettlementConfig {
            execute_timeout_ms: 1_000,
            max_retries: 2,
            initial_backoff_ms: 1,
            max_backoff_ms: 2,
            backoff_factor: 2.0,
            idempotency_cache_size: 100,
        }
    }

    /// Fails a fixed number of times, then succeeds.
    struct FlakyExecutor {
        failures_left: Mutex<u32>,
    }

    #[async_trait]
    impl SettlementExecutor for FlakyExecutor {
        async fn execute(&self, _fill: &Match) -> Result<TxReference> {
            let mut left = self.failures_left.lock();
            if *left > 0 {
                *left -= 1;
                return Err(EngineError::SettlementFailed {
                    reason: "transient revert".into(),
                });
            }
            Ok(TxReference("0xfeed".into()))
        }
    }

    /// Never succeeds.
    struct BrokenExecutor;

    #[async_trait]
    impl SettlementExecutor for BrokenExecutor {
        async fn execute(&self, _fill: &Match) -> Result<TxReference> {
            Err(EngineError::SettlementFailed {
                reason: "revert: escrow gone".into(),
            })
        }
    }

    #[tokio::test]
    async fn successful_settlement_is_confirmed() {
        let handle = SettlementWorker::spawn(Arc::new(InstantExecutor::new()), &fast_config());
        let fill = make_fill();
        let trade_id = fill.id;
        let ledger = handle.ledger();

        handle.submit(fill).unwrap();
        handle.close().await;

        let ledger = ledger.lock();
        assert!(matches!(
            ledger.status(&trade_id),
            Some(SettlementStatus::Confirmed(_))
        ));
        assert_eq!(ledger.record(&trade_id).unwrap().attempts, 1);
    }

    #[tokio::test]
    async fn transient_failures_are_retried() {
        let executor = Arc::new(FlakyExecutor {
            failures_left: Mutex::new(2),
        });
        let handle = SettlementWorker::spawn(executor, &fast_config());
        let fill = make_fill();
        let trade_id = fill.id;
        let ledger = handle.ledger();

        handle.submit(fill).unwrap();
        handle.close().await;

        let ledger = ledger.lock();
        assert!(matches!(
            ledger.status(&trade_id),
            Some(SettlementStatus::Confirmed(_))
        ));
        assert_eq!(ledger.record(&trade_id).unwrap().attempts, 3);
    }

    #[tokio::test]
    async fn exhausted_budget_marks_failed() {
        let handle = SettlementWorker::spawn(Arc::new(BrokenExecutor), &fast_config());
        let fill = make_fill();
        let trade_id = fill.id;
        let ledger = handle.ledger();

        handle.submit(fill).unwrap();
        handle.close().await;

        let ledger = ledger.lock();
        let record = ledger.record(&trade_id).unwrap();
        assert!(matches!(record.status, SettlementStatus::Failed { .. }));
        assert_eq!(record.attempts, 3, "max_retries=2 means 3 attempts");
        assert_eq!(ledger.failed().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_submission_is_skipped() {
        let handle = SettlementWorker::spawn(Arc::new(InstantExecutor::new()), &fast_config());
        let fill = make_fill();
        let trade_id = fill.id;
        let ledger = handle.ledger();

        handle.submit(fill.clone()).unwrap();
        handle.submit(fill).unwrap();
        handle.close().await;

        let ledger = ledger.lock();
        // Only one execution: the duplicate never reached the executor.
        assert_eq!(ledger.record(&trade_id).unwrap().attempts, 1);
    }

    #[tokio::test]
    async fn submit_after_close_fails() {
        let handle = SettlementWorker::spawn(Arc::new(InstantExecutor::new()), &fast_config());
        let sender = handle.sender();
        handle.close().await;
        assert!(sender.send(make_fill()).is_err());
    }
}
