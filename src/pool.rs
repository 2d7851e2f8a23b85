//! Bounded worker pool for datagram dispatch.
//!
//! Jobs wait in a fixed-depth queue. `core_workers` workers live for the whole
//! life of the pool. When the queue is full, extra workers are started up to
//! `max_workers`; each of those retires after sitting idle for the keep-alive
//! period. A submitter blocks while the queue is full and no further worker
//! can be added.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Mutex, mpsc, watch};
use tracing::{debug, error};

use crate::config::PoolConfig;
use crate::error::{Error, Result};

pub type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

pub struct WorkerPool {
    sender: mpsc::Sender<Job>,
    shared: Arc<Shared>,
    max_workers: usize,
    keep_alive: Duration,
}

struct Shared {
    receiver: Mutex<mpsc::Receiver<Job>>,
    /// Live worker count. Reaches zero only after shutdown.
    workers: watch::Sender<usize>,
    closed: watch::Sender<bool>,
}

impl WorkerPool {
    /// Starts the core workers. Must be called from within a Tokio runtime.
    pub fn new(
        core_workers: usize,
        max_workers: usize,
        keep_alive: Duration,
        queue_depth: usize,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(queue_depth.max(1));
        let (closed, _) = watch::channel(false);
        let (workers, _) = watch::channel(0);

        let pool = Self {
            sender,
            shared: Arc::new(Shared {
                receiver: Mutex::new(receiver),
                workers,
                closed,
            }),
            max_workers: max_workers.max(core_workers),
            keep_alive,
        };

        for _ in 0..core_workers {
            pool.shared.workers.send_modify(|count| *count += 1);
            tokio::spawn(worker(Arc::clone(&pool.shared), None));
        }

        debug!(
            "Worker pool started: {} core, {} max, queue depth {}",
            core_workers, pool.max_workers, queue_depth
        );

        pool
    }

    pub fn from_config(config: &PoolConfig) -> Self {
        Self::new(
            config.core_workers,
            config.max_workers,
            config.keep_alive(),
            config.queue_depth,
        )
    }

    /// Queues `job`, adding an overflow worker if the queue is full.
    ///
    /// Waits for queue space when every worker is busy. Returns
    /// [`Error::PoolClosed`] once the pool has been shut down.
    pub async fn submit(&self, job: Job) -> Result<()> {
        if self.is_closed() {
            return Err(Error::PoolClosed);
        }

        let job = match self.sender.try_send(job) {
            Ok(()) => return Ok(()),
            Err(TrySendError::Closed(_)) => return Err(Error::PoolClosed),
            Err(TrySendError::Full(job)) => job,
        };

        self.spawn_overflow_worker();

        let mut closed = self.shared.closed.subscribe();
        tokio::select! {
            result = self.sender.send(job) => result.map_err(|_| Error::PoolClosed),
            _ = raised(&mut closed) => Err(Error::PoolClosed),
        }
    }

    /// Stops every worker once its current job finishes. Queued jobs that
    /// have not started are dropped with the pool.
    pub fn shutdown(&self) {
        if !self.shared.closed.send_replace(true) {
            debug!("Worker pool shutting down");
        }
    }

    /// Waits until every worker has exited. Jobs already running finish
    /// first, so call [`shutdown`](Self::shutdown) before this.
    pub async fn join(&self) {
        let mut workers = self.shared.workers.subscribe();
        let _ = workers.wait_for(|count| *count == 0).await;
    }

    pub fn is_closed(&self) -> bool {
        *self.shared.closed.borrow()
    }

    /// Number of live workers, core and overflow.
    pub fn worker_count(&self) -> usize {
        *self.shared.workers.borrow()
    }

    fn spawn_overflow_worker(&self) {
        let max_workers = self.max_workers;
        let reserved = self.shared.workers.send_if_modified(|count| {
            if *count < max_workers {
                *count += 1;
                true
            } else {
                false
            }
        });

        if reserved {
            debug!("Queue full, starting overflow worker {}", self.worker_count());
            tokio::spawn(worker(Arc::clone(&self.shared), Some(self.keep_alive)));
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Resolves once `flag` is true, or once its sender is gone.
pub(crate) async fn raised(flag: &mut watch::Receiver<bool>) {
    let _ = flag.wait_for(|raised| *raised).await;
}

/// Runs jobs until the pool closes, or until `idle_timeout` passes without work.
async fn worker(shared: Arc<Shared>, idle_timeout: Option<Duration>) {
    let mut closed = shared.closed.subscribe();

    loop {
        let receive = async { shared.receiver.lock().await.recv().await };
        // Idle time includes waiting for the receiver lock.
        let next = async {
            match idle_timeout {
                Some(timeout) => tokio::time::timeout(timeout, receive).await.ok(),
                None => Some(receive.await),
            }
        };

        let job = tokio::select! {
            biased;
            _ = raised(&mut closed) => break,
            next = next => match next {
                Some(Some(job)) => job,
                Some(None) => break,
                None => {
                    debug!("Overflow worker idle, retiring");
                    break;
                }
            },
        };

        if let Err(error) = tokio::spawn(job).await {
            error!("Worker job failed: {}", error);
        }
    }

    shared.workers.send_modify(|count| *count -= 1);
}
