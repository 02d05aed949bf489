use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Fixed set of tasks draining a bounded job queue.
///
/// Submission never waits: a full queue drops the job. A panicking job is
/// contained in its own task and does not take the worker down.
#[derive(Clone)]
pub struct WorkerPool {
    tx: mpsc::Sender<Job>,
    handles: Arc<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    pub fn spawn(worker_count: usize, queue_capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel::<Job>(queue_capacity.max(1));
        let rx = Arc::new(Mutex::new(rx));
        let handles = (0..worker_count.max(1))
            .map(|worker_id| spawn_worker(worker_id, rx.clone()))
            .collect();
        Self {
            tx,
            handles: Arc::new(handles),
        }
    }

    /// Queues `job`; returns false when the queue is full or closed.
    pub fn try_submit<F>(&self, job: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match self.tx.try_send(Box::pin(job)) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("worker queue full, dropping job");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!("worker pool closed, dropping job");
                false
            }
        }
    }

    pub fn worker_count(&self) -> usize {
        self.handles.len()
    }

    pub fn queued(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }
}

fn spawn_worker(worker_id: usize, rx: Arc<Mutex<mpsc::Receiver<Job>>>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let job = {
                let mut rx = rx.lock().await;
                rx.recv().await
            };
            let Some(job) = job else {
                debug!(worker_id, "job queue closed, worker exiting");
                break;
            };
            if let Err(err) = tokio::spawn(job).await {
                error!(worker_id, ?err, "worker job panicked");
            }
        }
    })
}
