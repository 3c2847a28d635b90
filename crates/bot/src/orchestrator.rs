//! Owns the worker pool and fans the event stream out to it.

use std::sync::Arc;

use redcart_core::StockEvent;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::client::CheckoutClient;
use crate::config::BotConfig;
use crate::error::BotError;
use crate::worker::Worker;

/// The worker pool plus the plumbing to run it to completion.
pub struct Orchestrator {
    workers: Vec<Worker>,
}

impl Orchestrator {
    /// Build the pool, invoking `factory` once per worker slot.
    ///
    /// Bootstrap is all-or-nothing: the first factory failure aborts
    /// construction, since a partially authenticated pool would silently run
    /// below its configured concurrency.
    ///
    /// # Errors
    ///
    /// Returns the first client bootstrap error.
    pub async fn new<F, Fut>(config: &BotConfig, factory: F) -> Result<Self, BotError>
    where
        F: Fn(usize) -> Fut,
        Fut: Future<Output = Result<Box<dyn CheckoutClient>, BotError>>,
    {
        let profile = Arc::new(config.profile.clone());
        let mut workers = Vec::with_capacity(config.worker_count);

        for id in 0..config.worker_count {
            let client = match factory(id).await {
                Ok(client) => client,
                Err(err) => {
                    error!(worker = id, error = %err, "worker bootstrap failed");
                    return Err(err);
                }
            };
            workers.push(Worker::new(
                id,
                Arc::clone(&profile),
                client,
                config.task_timeout,
            ));
            info!(worker = id, "worker ready");
        }

        Ok(Self { workers })
    }

    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Run every worker against the shared event stream until the stream
    /// closes and drains, then join the pool.
    pub async fn run(self, events: mpsc::Receiver<StockEvent>) {
        let events = Arc::new(Mutex::new(events));
        let mut pool = JoinSet::new();

        for worker in self.workers {
            let events = Arc::clone(&events);
            pool.spawn(worker.run(events));
        }

        while let Some(joined) = pool.join_next().await {
            if let Err(err) = joined {
                error!(error = %err, "worker panicked");
            }
        }
        info!("all workers finished");
    }
}
