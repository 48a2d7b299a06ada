//! Background check scheduler
//!
//! Ticks at a fixed interval, evaluates every enabled check, commits the
//! collapsed state back to the store and dispatches notifications for state
//! transitions. The evaluation engine itself never persists or notifies.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::interval;

use crate::checks::{Alert, AlertType, CheckEvaluator};
use crate::notify::Notifier;
use crate::store::CheckStore;

/// Background check scheduler
pub struct CheckScheduler {
    store: Arc<CheckStore>,
    evaluator: Arc<CheckEvaluator>,
    notifier: Arc<Notifier>,
    /// Shutdown signal sender
    shutdown_tx: Option<mpsc::Sender<()>>,
}

impl CheckScheduler {
    /// Create a new scheduler
    pub fn new(
        store: Arc<CheckStore>,
        evaluator: Arc<CheckEvaluator>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            store,
            evaluator,
            notifier,
            shutdown_tx: None,
        }
    }

    /// Start the background tick loop
    pub fn start(&mut self, tick_interval: Duration) -> tokio::task::JoinHandle<()> {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        self.shutdown_tx = Some(shutdown_tx);

        let store = Arc::clone(&self.store);
        let evaluator = Arc::clone(&self.evaluator);
        let notifier = Arc::clone(&self.notifier);

        tokio::spawn(async move {
            let mut ticker = interval(tick_interval);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        Self::run_checks(&store, &evaluator, &notifier).await;
                    }
                    _ = shutdown_rx.recv() => {
                        tracing::info!("Check scheduler shutting down");
                        break;
                    }
                }
            }
        })
    }

    /// Stop the background tick loop
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(()).await;
        }
    }

    /// Evaluate all enabled checks once.
    ///
    /// Evaluations run concurrently and are commutative; each failure is
    /// logged and retried implicitly on the next tick.
    async fn run_checks(
        store: &Arc<CheckStore>,
        evaluator: &Arc<CheckEvaluator>,
        notifier: &Arc<Notifier>,
    ) {
        let checks = store.get_enabled_checks();

        let results = futures::future::join_all(
            checks
                .iter()
                .map(|check| async move { evaluator.evaluate(check).await }),
        )
        .await;

        for (check, result) in checks.iter().zip(results) {
            match result {
                Ok(alerts) => {
                    // The engine exposes one outcome per resolved series;
                    // collapse to a single persisted state by worst-of
                    // severity. An empty expansion leaves the state as is.
                    if let Some(state) = collapse_state(&alerts) {
                        store.set_state(&check.id, state);
                    }

                    for alert in alerts.iter().filter(|a| a.is_transition()) {
                        if let Err(e) = notifier.notify(check, alert).await {
                            tracing::error!(
                                check_id = %check.id,
                                error = %e,
                                "Failed to send notification"
                            );
                        }
                    }
                }
                Err(e) => {
                    tracing::error!(
                        check_id = %check.id,
                        error = %e,
                        "Check evaluation failed"
                    );
                }
            }
        }
    }
}

/// Worst-of collapse across the per-series outcomes of one evaluation
fn collapse_state(alerts: &[Alert]) -> Option<AlertType> {
    alerts
        .iter()
        .map(|a| a.to_type)
        .max_by_key(|state| state.severity())
}
