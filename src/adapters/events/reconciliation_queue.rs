//! Reconciliation queue - Hands verified webhook events to a background worker.
//!
//! The webhook endpoint only authenticates a delivery and enqueues it. Intake
//! never waits: a full queue is reported back so the processor redelivers
//! later. The worker applies each event in its own task through the
//! `ReconcilePaymentHandler`, at most `max_in_flight` at a time, so an event
//! backing off on an unknown intent never holds up the ones behind it. An
//! error while reconciling one event is logged and never stops the worker.
//!
//! ## Graceful Shutdown
//!
//! When the shutdown signal fires the worker stops accepting new events.
//! Events still queued get a single reconciliation attempt, in-flight
//! retries are cut short to one final attempt, and the worker returns once
//! every task has finished.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch, Semaphore};
use tokio::task::{JoinError, JoinSet};

use crate::application::handlers::payment::ReconcilePaymentHandler;
use crate::domain::payment::{ProcessorEvent, ReconciliationError};
use crate::ports::ProcessorEventQueue;

/// Default number of events reconciled concurrently.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 32;

/// Creates a connected queue and worker.
///
/// `capacity` bounds the number of events waiting for the worker; once it
/// is reached `enqueue` fails with `QueueFull`.
pub fn reconciliation_channel(
    capacity: usize,
    handler: Arc<ReconcilePaymentHandler>,
) -> (ReconciliationQueue, ReconciliationWorker) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    (
        ReconciliationQueue { sender },
        ReconciliationWorker {
            receiver,
            handler,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        },
    )
}

/// Sending half of the reconciliation channel.
#[derive(Clone)]
pub struct ReconciliationQueue {
    sender: mpsc::Sender<ProcessorEvent>,
}

#[async_trait]
impl ProcessorEventQueue for ReconciliationQueue {
    async fn enqueue(&self, event: ProcessorEvent) -> Result<(), ReconciliationError> {
        self.sender.try_send(event).map_err(|err| match err {
            TrySendError::Full(event) => {
                tracing::warn!(
                    event_id = %event.event_id,
                    "Reconciliation queue full; asking for redelivery"
                );
                ReconciliationError::QueueFull
            }
            TrySendError::Closed(_) => ReconciliationError::QueueClosed,
        })
    }
}

/// Background task that applies queued processor events.
pub struct ReconciliationWorker {
    receiver: mpsc::Receiver<ProcessorEvent>,
    handler: Arc<ReconcilePaymentHandler>,
    max_in_flight: usize,
}

impl ReconciliationWorker {
    /// Limits how many events are reconciled at the same time.
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }

    /// Run until shutdown is signalled or every queue handle is dropped.
    ///
    /// Returns the number of events processed.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> usize {
        let permits = Arc::new(Semaphore::new(self.max_in_flight));
        let mut tasks = JoinSet::new();
        let mut processed = 0;

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }

                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    processed += record(joined);
                }

                next = self.receiver.recv() => match next {
                    Some(event) => {
                        self.spawn(&mut tasks, &permits, event, shutdown.clone(), false).await;
                    }
                    None => {
                        processed += finish(&mut tasks).await;
                        return processed;
                    }
                },
            }
        }

        // Whatever was accepted before shutdown gets one attempt
        self.receiver.close();
        while let Some(event) = self.receiver.recv().await {
            self.spawn(&mut tasks, &permits, event, shutdown.clone(), true).await;
        }
        processed += finish(&mut tasks).await;

        tracing::info!(processed, "Reconciliation worker stopped");
        processed
    }

    async fn spawn(
        &self,
        tasks: &mut JoinSet<()>,
        permits: &Arc<Semaphore>,
        event: ProcessorEvent,
        shutdown: watch::Receiver<bool>,
        draining: bool,
    ) {
        // The semaphore is never closed
        let Ok(permit) = permits.clone().acquire_owned().await else {
            return;
        };
        let handler = self.handler.clone();

        tasks.spawn(async move {
            let result = if draining {
                handler.handle_once(&event).await
            } else {
                tokio::select! {
                    result = handler.handle(&event) => result,
                    _ = stopped(shutdown) => handler.handle_once(&event).await,
                }
            };

            if let Err(err) = result {
                tracing::warn!(
                    event_id = %event.event_id,
                    event_type = event.kind.as_str(),
                    error = %err,
                    "Processor event not applied"
                );
            }
            drop(permit);
        });
    }
}

/// Resolves once shutdown is signalled or the signal sender is gone.
async fn stopped(mut shutdown: watch::Receiver<bool>) {
    while !*shutdown.borrow_and_update() {
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}

async fn finish(tasks: &mut JoinSet<()>) -> usize {
    let mut processed = 0;
    while let Some(joined) = tasks.join_next().await {
        processed += record(joined);
    }
    processed
}

fn record(joined: Result<(), JoinError>) -> usize {
    if let Err(err) = joined {
        tracing::error!(error = %err, "Reconciliation task panicked");
    }
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::adapters::InMemoryPaymentRepository;
    use crate::application::handlers::payment::ReconcilerConfig;
    use crate::domain::foundation::{LeaseId, PaymentId, PropertyId, Timestamp, UserId};
    use crate::domain::payment::{
        compute_fee, LeaseSummary, Payment, PaymentAmount, PaymentDraft, PaymentStatus,
        TenantSummary,
    };
    use crate::ports::PaymentRepository;

    fn pending(intent: &str) -> Payment {
        let lease = LeaseSummary {
            id: LeaseId::new(),
            tenant: TenantSummary {
                id: UserId::new("tenant-1").unwrap(),
                name: "Tina".to_string(),
                email: "tina@example.com".to_string(),
            },
            property_id: PropertyId::new(),
            landlord_id: UserId::new("landlord-1").unwrap(),
            monthly_rent: "1200".parse().unwrap(),
            status: "active".to_string(),
        };
        let amount = PaymentAmount::new("1200".parse().unwrap()).unwrap();
        let draft = PaymentDraft::for_lease(PaymentId::new(), &lease, amount, "usd");
        Payment::pending_intent(draft, intent, Timestamp::now(), compute_fee(&amount, 250).unwrap())
    }

    fn handler(repository: &InMemoryPaymentRepository) -> Arc<ReconcilePaymentHandler> {
        Arc::new(ReconcilePaymentHandler::with_config(
            Arc::new(repository.clone()),
            ReconcilerConfig::default()
                .with_max_attempts(1)
                .with_initial_backoff(Duration::from_millis(1)),
        ))
    }

    #[tokio::test]
    async fn worker_applies_events_and_survives_failures() {
        let repository = InMemoryPaymentRepository::new();
        let payment = pending("pi_1");
        repository.insert(&payment).await.unwrap();

        let (queue, worker) = reconciliation_channel(8, handler(&repository));
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        // Unknown intent first; the worker must keep going
        queue
            .enqueue(ProcessorEvent::succeeded("evt_0", "pi_unknown"))
            .await
            .unwrap();
        queue
            .enqueue(ProcessorEvent::succeeded("evt_1", "pi_1"))
            .await
            .unwrap();
        drop(queue);

        let processed = worker.run(shutdown_rx).await;

        assert_eq!(processed, 2);
        let stored = repository.find_by_id(&payment.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn shutdown_drains_queued_events() {
        let repository = InMemoryPaymentRepository::new();
        let payment = pending("pi_1");
        repository.insert(&payment).await.unwrap();

        let (queue, worker) = reconciliation_channel(8, handler(&repository));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        queue
            .enqueue(ProcessorEvent::failed("evt_1", "pi_1"))
            .await
            .unwrap();
        shutdown_tx.send(true).unwrap();

        let processed = worker.run(shutdown_rx).await;

        assert_eq!(processed, 1);
        let stored = repository.find_by_id(&payment.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PaymentStatus::Failed);

        let err = queue
            .enqueue(ProcessorEvent::succeeded("evt_2", "pi_1"))
            .await
            .unwrap_err();
        assert_eq!(err, ReconciliationError::QueueClosed);
    }

    fn default_handler(repository: &InMemoryPaymentRepository) -> Arc<ReconcilePaymentHandler> {
        Arc::new(ReconcilePaymentHandler::new(Arc::new(repository.clone())))
    }

    async fn wait_for_status(
        repository: &InMemoryPaymentRepository,
        id: &PaymentId,
        status: PaymentStatus,
    ) {
        loop {
            let stored = repository.find_by_id(id).await.unwrap().unwrap();
            if stored.status == status {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    #[tokio::test]
    async fn unknown_intent_does_not_delay_later_events() {
        let repository = InMemoryPaymentRepository::new();
        let payment = pending("pi_1");
        repository.insert(&payment).await.unwrap();

        let (queue, worker) = reconciliation_channel(8, default_handler(&repository));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let running = tokio::spawn(worker.run(shutdown_rx));

        // Backs off for seconds before giving up
        queue
            .enqueue(ProcessorEvent::succeeded("evt_0", "pi_unknown"))
            .await
            .unwrap();
        queue
            .enqueue(ProcessorEvent::succeeded("evt_1", "pi_1"))
            .await
            .unwrap();

        tokio::time::timeout(
            Duration::from_millis(500),
            wait_for_status(&repository, &payment.id, PaymentStatus::Paid),
        )
        .await
        .expect("known intent reconciled while the unknown one backs off");

        // The retrying event is cut short instead of finishing its backoff
        shutdown_tx.send(true).unwrap();
        let processed = tokio::time::timeout(Duration::from_millis(500), running)
            .await
            .expect("worker stops promptly")
            .unwrap();
        assert_eq!(processed, 2);
    }

    #[tokio::test]
    async fn shutdown_gives_queued_unknown_intents_one_attempt() {
        let repository = InMemoryPaymentRepository::new();
        let (queue, worker) = reconciliation_channel(8, default_handler(&repository));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        for i in 0..3 {
            queue
                .enqueue(ProcessorEvent::succeeded(format!("evt_{i}"), format!("pi_{i}")))
                .await
                .unwrap();
        }
        shutdown_tx.send(true).unwrap();

        let processed = tokio::time::timeout(Duration::from_millis(500), worker.run(shutdown_rx))
            .await
            .expect("drain does not back off");

        assert_eq!(processed, 3);
    }

    #[tokio::test]
    async fn full_queue_rejects_without_waiting() {
        let repository = InMemoryPaymentRepository::new();
        let (queue, _worker) = reconciliation_channel(1, handler(&repository));

        queue
            .enqueue(ProcessorEvent::succeeded("evt_1", "pi_1"))
            .await
            .unwrap();

        let err = tokio::time::timeout(
            Duration::from_millis(100),
            queue.enqueue(ProcessorEvent::succeeded("evt_2", "pi_2")),
        )
        .await
        .expect("enqueue never blocks")
        .unwrap_err();

        assert_eq!(err, ReconciliationError::QueueFull);
        assert_eq!(err.status_code().as_u16(), 503);
    }
}
