//! A single-process stand-in for an ordering service.
//!
//! One background task owns the write side of a [`TotalOrderStore`] and
//! feeds it from a small channel. Callers [`broadcast`] entries in and
//! [`deliver`] them back out by sequence number.
//!
//! [`broadcast`]: InProcessSequencer::broadcast
//! [`deliver`]: InProcessSequencer::deliver

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::entry::TxIdAndHmac;
use super::error::{TotalOrderError, TotalOrderResult};
use super::store::TotalOrderStore;
use crate::config::SEQUENCER_QUEUE_CAPACITY;

pub struct InProcessSequencer {
    store: Arc<TotalOrderStore>,
    queue: mpsc::Sender<TxIdAndHmac>,
    shutdown: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl InProcessSequencer {
    /// Spawns the sequencing task. Must be called inside a tokio runtime.
    pub fn start(store: Arc<TotalOrderStore>) -> Self {
        let (queue, rx) = mpsc::channel(SEQUENCER_QUEUE_CAPACITY);
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(run(store.clone(), rx, shutdown.clone()));

        Self {
            store,
            queue,
            shutdown,
            task: Mutex::new(Some(task)),
        }
    }

    /// Hands `entry` to the sequencer. Returns once it has been accepted,
    /// not once it has been appended; use [`deliver`](Self::deliver) to
    /// observe the result.
    pub async fn broadcast(
        &self,
        cancel: &CancellationToken,
        entry: TxIdAndHmac,
    ) -> TotalOrderResult<()> {
        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => Err(TotalOrderError::Stopped),
            _ = cancel.cancelled() => Err(TotalOrderError::Cancelled),
            sent = self.queue.send(entry) => sent.map_err(|_| TotalOrderError::Stopped),
        }
    }

    /// Waits for and returns the entry at `seq`.
    pub async fn deliver(
        &self,
        cancel: &CancellationToken,
        seq: u64,
    ) -> TotalOrderResult<TxIdAndHmac> {
        self.store.get(cancel, seq).await
    }

    /// Signals the task to exit. Pending and future broadcasts fail with
    /// [`TotalOrderError::Stopped`].
    pub fn stop(&self) {
        self.shutdown.cancel();
    }

    /// [`stop`](Self::stop), then wait for the task to finish.
    pub async fn shutdown(&self) {
        self.stop();
        let task = self.task.lock().take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                error!(error = %e, "sequencer task failed");
            }
        }
    }

    pub fn store(&self) -> &Arc<TotalOrderStore> {
        &self.store
    }
}

impl Drop for InProcessSequencer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn run(
    store: Arc<TotalOrderStore>,
    mut queue: mpsc::Receiver<TxIdAndHmac>,
    shutdown: CancellationToken,
) {
    info!("in-process sequencer started");
    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            next = queue.recv() => match next {
                Some(entry) => match store.append(&entry) {
                    Ok(seq) => debug!(seq, "sequenced entry"),
                    Err(e) => error!(error = %e, "failed to append entry"),
                },
                None => break,
            },
        }
    }
    info!("in-process sequencer stopped");
}
