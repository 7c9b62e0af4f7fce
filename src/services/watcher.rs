//! The reconciliation loop: a recurring background task that advances every
//! non-terminal payment intent based on ledger observations and wall-clock
//! expiry. The only writer of intent status after creation.

use crate::error::PayGridError;
use crate::models::{PaymentIntent, PaymentMethod, PaymentStatus};
use crate::services::ledger::LedgerGateway;
use crate::store::SqliteStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Wall-clock source, injected so expiry is testable.
pub trait Clock: Send + Sync {
    /// Current time as epoch milliseconds.
    fn now_ms(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

pub struct Watcher {
    store: Arc<SqliteStore>,
    ledger: Arc<dyn LedgerGateway>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    lease_ttl_ms: i64,
    runner_id: String,
}

/// Start/stop control for a spawned watcher, owned by whoever constructed
/// the engine. Dropping the handle leaves the task running; call `stop` or
/// `shutdown`.
pub struct WatcherHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl WatcherHandle {
    /// Prevent further ticks. An in-flight tick finishes naturally.
    pub fn stop(&self) {
        self.token.cancel();
    }

    /// Stop and wait for the loop to wind down.
    pub async fn shutdown(self) {
        self.token.cancel();
        let _ = self.task.await;
    }
}

impl Watcher {
    pub fn new(
        store: Arc<SqliteStore>,
        ledger: Arc<dyn LedgerGateway>,
        clock: Arc<dyn Clock>,
        interval: Duration,
        lease_ttl_ms: i64,
    ) -> Self {
        Self {
            store,
            ledger,
            clock,
            interval,
            lease_ttl_ms,
            runner_id: Uuid::new_v4().to_string(),
        }
    }

    /// Spawn the recurring loop. The first tick runs immediately.
    pub fn spawn(self) -> WatcherHandle {
        let token = CancellationToken::new();
        let child = token.clone();
        let interval = self.interval;

        let task = tokio::spawn(async move {
            tracing::info!(
                "Reconciliation watcher {} started, tick every {:?}",
                self.runner_id,
                interval
            );

            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = child.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                if let Err(e) = self.tick().await {
                    tracing::error!("Watcher tick failed: {}", e);
                }
            }

            tracing::info!("Reconciliation watcher {} stopped", self.runner_id);
        });

        WatcherHandle { token, task }
    }

    /// One pass over all non-terminal intents. A per-intent failure is
    /// logged and skipped; the intent stays non-terminal and is retried on
    /// the next tick.
    pub async fn tick(&self) -> Result<(), PayGridError> {
        let now = self.clock.now_ms();
        if !self
            .store
            .try_acquire_lease(&self.runner_id, now, self.lease_ttl_ms)?
        {
            tracing::debug!(
                "Runner {} does not hold the reconciliation lease, skipping tick",
                self.runner_id
            );
            return Ok(());
        }

        for payment in self.store.pending_payments()? {
            if let Err(e) = self.reconcile(&payment).await {
                tracing::warn!(
                    "Reconciliation failed for payment {}: {}, will retry next tick",
                    payment.id,
                    e
                );
            }
        }

        Ok(())
    }

    async fn reconcile(&self, payment: &PaymentIntent) -> Result<(), PayGridError> {
        // Expiry is checked first and wins even over a simultaneously
        // available settlement signal (strict-deadline rule).
        if self.clock.now_ms() >= payment.expires_at {
            if self
                .store
                .transition_status(&payment.id, PaymentStatus::Expired, None)?
            {
                tracing::info!("Payment {} expired", payment.id);
            }
            return Ok(());
        }

        match (payment.method, payment.wallet_address.as_deref()) {
            (PaymentMethod::ManualTransfer, Some(address)) => {
                // The gateway search only reports transfers it already
                // treats as confirmed, so manual transfers settle without a
                // pending-confirmation phase.
                if let Some(signature) = self
                    .ledger
                    .find_inbound_transfer(address, payment.amount)
                    .await?
                {
                    if self.store.transition_status(
                        &payment.id,
                        PaymentStatus::Settled,
                        Some(&signature),
                    )? {
                        tracing::info!(
                            "Payment {} settled by inbound transfer {}",
                            payment.id,
                            signature
                        );
                    }
                }
            }
            _ => {
                if payment.status == PaymentStatus::PendingConfirmation {
                    if let Some(signature) = payment.transaction_signature.as_deref() {
                        // A false result is "not yet", never a failure;
                        // only expiry terminates an unconfirmed intent.
                        if self.ledger.confirm_signature(signature).await? {
                            if self.store.transition_status(
                                &payment.id,
                                PaymentStatus::Settled,
                                None,
                            )? {
                                tracing::info!(
                                    "Payment {} settled, signature {} confirmed",
                                    payment.id,
                                    signature
                                );
                            }
                        }
                    }
                }
            }
        }

        Ok(())
    }
}
