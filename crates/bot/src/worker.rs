//! One long-lived unit of concurrency.
//!
//! A worker owns its checkout client outright and processes events serially:
//! receive, run the task to completion (bounded by a per-task timeout), loop.
//! The shared receiver is the competing-consumer end of the event channel;
//! whichever worker wins the lock takes the next event, so a naturally
//! available worker picks up naturally more work.

use std::sync::Arc;
use std::time::Duration;

use redcart_core::{Profile, StockEvent};
use tokio::sync::{Mutex, mpsc};
use tracing::{info, warn};

use crate::client::CheckoutClient;
use crate::task::Task;

/// The receiving end of the event channel, shared by the whole pool.
pub type SharedEvents = Arc<Mutex<mpsc::Receiver<StockEvent>>>;

/// A pool member: one client, one profile, serial task processing.
pub struct Worker {
    id: usize,
    profile: Arc<Profile>,
    client: Box<dyn CheckoutClient>,
    task_timeout: Duration,
}

impl Worker {
    #[must_use]
    pub fn new(
        id: usize,
        profile: Arc<Profile>,
        client: Box<dyn CheckoutClient>,
        task_timeout: Duration,
    ) -> Self {
        Self {
            id,
            profile,
            client,
            task_timeout,
        }
    }

    /// Consume events until the channel closes and drains.
    ///
    /// Task failures are logged and swallowed; only channel closure ends the
    /// loop. The lock guard is dropped before the task runs so other workers
    /// can receive while this one is busy.
    pub async fn run(mut self, events: SharedEvents) {
        info!(worker = self.id, "worker started");
        loop {
            let event = {
                let mut receiver = events.lock().await;
                receiver.recv().await
            };
            let Some(event) = event else {
                break;
            };
            self.process(event).await;
        }
        info!(worker = self.id, "worker stopping, channel closed");
    }

    async fn process(&mut self, event: StockEvent) {
        let tcin = event.product.tcin.clone();
        let mut task = Task::new(event);

        let outcome = tokio::time::timeout(
            self.task_timeout,
            task.run(self.client.as_mut(), &self.profile),
        )
        .await;

        match outcome {
            Ok(Ok(order_id)) => {
                info!(worker = self.id, %tcin, order_id = %order_id, "checkout succeeded");
            }
            Ok(Err(err)) => {
                warn!(worker = self.id, %tcin, error = %err, "checkout failed");
            }
            Err(_) => {
                warn!(
                    worker = self.id,
                    %tcin,
                    timeout_secs = self.task_timeout.as_secs(),
                    "checkout timed out"
                );
            }
        }
    }
}
