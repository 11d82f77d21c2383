//! Debounced background funding of the current month's goals.
//!
//! Mutating commands call `ReprocessHandle::notify`. Once notifications
//! stop arriving for the debounce interval, the worker locks the store and
//! processes the current month, provided the configured contribution day
//! has been reached. Processing a month is idempotent, so a run that finds
//! nothing to do is harmless.

use chrono::{Local, NaiveDate};
use log::{debug, error, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use super::commands::contributions::ProcessMonthResult;
use super::error::FinanceResult;
use super::finance_store::FinanceStore;
use super::models::Period;

/// Source of "today" for deciding which month to fund
pub type Clock = fn() -> NaiveDate;

pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Cheap cloneable handle for requesting a reprocessing pass
#[derive(Clone)]
pub struct ReprocessHandle {
    sender: mpsc::UnboundedSender<()>,
}

impl ReprocessHandle {
    pub fn notify(&self) {
        if self.sender.send(()).is_err() {
            debug!("Reprocessing worker has stopped; ignoring notification");
        }
    }
}

pub struct Reprocessor {
    store: Arc<Mutex<FinanceStore>>,
    debounce: Duration,
    clock: Clock,
}

impl Reprocessor {
    pub fn new(store: Arc<Mutex<FinanceStore>>, debounce: Duration) -> Self {
        Self {
            store,
            debounce,
            clock: local_today,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Start the worker. It stops once every handle has been dropped.
    pub fn spawn(self) -> (ReprocessHandle, JoinHandle<()>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let task = tokio::spawn(self.run(receiver));
        (ReprocessHandle { sender }, task)
    }

    async fn run(self, mut receiver: mpsc::UnboundedReceiver<()>) {
        info!("Reprocessing worker started (debounce {:?})", self.debounce);
        while receiver.recv().await.is_some() {
            let mut closed = false;
            loop {
                tokio::select! {
                    next = receiver.recv() => {
                        if next.is_none() {
                            closed = true;
                            break;
                        }
                    }
                    _ = tokio::time::sleep(self.debounce) => break,
                }
            }

            if let Err(e) = self.reprocess_now().await {
                error!("Background goal processing failed: {}", e);
            }
            if closed {
                break;
            }
        }
        info!("Reprocessing worker stopped");
    }

    /// Process the current month if its contribution day has been reached
    pub async fn reprocess_now(&self) -> FinanceResult<Option<ProcessMonthResult>> {
        let today = (self.clock)();
        let mut store = self.store.lock().await;

        if !store.settings().is_contribution_due(today) {
            debug!(
                "Contribution day {} not reached on {}",
                store.settings().goal_contribution_day,
                today
            );
            return Ok(None);
        }

        let result = store.process_month(Period::of(today)).await?;
        if !result.created.is_empty() {
            info!(
                "Background processing funded {} goals for {}",
                result.created.len(),
                result.period
            );
        }
        Ok(Some(result))
    }
}
