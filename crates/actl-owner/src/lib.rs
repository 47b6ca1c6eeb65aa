//! Owner Dispatch Bridge: runs work on a single-threaded owner context.
//!
//! Network-facing tasks never touch owner state directly. They submit a
//! closure through a [`Dispatcher`]; the owner drains its [`OwnerQueue`] on
//! its own thread and hands each result back through a one-shot slot.
//!
//! Guarantees:
//! - Jobs execute one at a time, in submission order, so no two operations
//!   observe each other's partial effects.
//! - A closed or dropped owner fails submissions immediately.
//! - Closing the queue fails every job still queued; blocked callers wake
//!   with [`DispatchError::OwnerUnavailable`].
//! - With a timeout configured, a caller that gives up leaves a running job
//!   to finish (its result is discarded) and a not-yet-started job is
//!   skipped. No job ever runs twice.
//!
//! The owner state type `S` does not need to be `Send`; it never leaves the
//! owner thread.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// A queued unit of work. Returns `false` when it was skipped because the
/// caller had already stopped waiting.
type Job<S> = Box<dyn FnOnce(&mut S) -> bool + Send + 'static>;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Why a dispatched operation produced no result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("Owner context unavailable")]
    OwnerUnavailable,

    #[error("Timed out after {}ms waiting for owner", .0.as_millis())]
    Timeout(Duration),

    #[error("Owner operation panicked")]
    Panicked,
}

/// Caller-side settings for the bridge.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// How long a caller waits for its result. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }
}

struct Shared {
    open: AtomicBool,
}

/// Create a connected dispatcher/queue pair.
pub fn channel<S: 'static>(config: DispatchConfig) -> (Dispatcher<S>, OwnerQueue<S>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let shared = Arc::new(Shared {
        open: AtomicBool::new(true),
    });

    let dispatcher = Dispatcher {
        tx,
        shared: shared.clone(),
        timeout: config.timeout,
    };
    let queue = OwnerQueue { rx, shared };
    (dispatcher, queue)
}

// ─────────────────────────────────────────────────────────────────────────────
// Caller side
// ─────────────────────────────────────────────────────────────────────────────

/// Cloneable handle that submits work to the owner and waits for the result.
pub struct Dispatcher<S> {
    tx: mpsc::UnboundedSender<Job<S>>,
    shared: Arc<Shared>,
    timeout: Option<Duration>,
}

impl<S> Clone for Dispatcher<S> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            shared: self.shared.clone(),
            timeout: self.timeout,
        }
    }
}

impl<S: 'static> Dispatcher<S> {
    /// Run `work` on the owner context and wait for what it returns.
    ///
    /// Must not be awaited from the owner context itself: the owner would
    /// wait on its own queue.
    pub async fn run<F, R>(&self, work: F) -> Result<R, DispatchError>
    where
        F: FnOnce(&mut S) -> R + Send + 'static,
        R: Send + 'static,
    {
        if !self.shared.open.load(Ordering::Acquire) {
            return Err(DispatchError::OwnerUnavailable);
        }

        let (result_tx, result_rx) = oneshot::channel::<Result<R, DispatchError>>();
        let job: Job<S> = Box::new(move |state: &mut S| {
            if result_tx.is_closed() {
                debug!("Skipping owner job abandoned by its caller");
                return false;
            }
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| work(state))).map_err(|_| {
                warn!("Owner job panicked");
                DispatchError::Panicked
            });
            // The caller may have timed out meanwhile; the result is discarded.
            let _ = result_tx.send(outcome);
            true
        });

        self.tx
            .send(job)
            .map_err(|_| DispatchError::OwnerUnavailable)?;

        match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, result_rx).await {
                Ok(received) => received.unwrap_or(Err(DispatchError::OwnerUnavailable)),
                Err(_) => Err(DispatchError::Timeout(limit)),
            },
            None => result_rx
                .await
                .unwrap_or(Err(DispatchError::OwnerUnavailable)),
        }
    }

    /// Replace the caller-side timeout for this handle.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Whether the owner is still accepting work.
    pub fn is_available(&self) -> bool {
        self.shared.open.load(Ordering::Acquire) && !self.tx.is_closed()
    }

    /// Stop the owner from accepting work and wake it if it is blocked in
    /// [`OwnerQueue::run`]. Safe to call from any thread, any number of times.
    pub fn close(&self) {
        if self.shared.open.swap(false, Ordering::AcqRel) {
            info!("Owner dispatch closed");
            // Wake-up job so a blocked owner loop re-checks the flag.
            let _ = self.tx.send(Box::new(|_: &mut S| false));
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Owner side
// ─────────────────────────────────────────────────────────────────────────────

/// The owner's end of the bridge. Only the owner context may drive it.
pub struct OwnerQueue<S> {
    rx: mpsc::UnboundedReceiver<Job<S>>,
    shared: Arc<Shared>,
}

impl<S: 'static> OwnerQueue<S> {
    /// Drive the queue on a dedicated owner thread until it is closed or
    /// every [`Dispatcher`] has been dropped. Returns the number of jobs run.
    ///
    /// Blocks the calling thread; do not call from inside an async runtime.
    pub fn run(mut self, state: &mut S) -> u64 {
        info!("Owner loop started");
        let mut executed = 0;
        while self.shared.open.load(Ordering::Acquire) {
            let Some(job) = self.rx.blocking_recv() else {
                break;
            };
            if job(state) {
                executed += 1;
            }
        }
        self.close();
        info!("Owner loop stopped ({executed} jobs executed)");
        executed
    }

    /// Run every job queued at the time of the call without blocking, for
    /// owners that live inside a host's own main loop. Jobs submitted while
    /// pumping wait for the next call. Returns the number of jobs run.
    pub fn pump(&mut self, state: &mut S) -> usize {
        if !self.shared.open.load(Ordering::Acquire) {
            self.close();
            return 0;
        }

        let queued = self.rx.len();
        let mut executed = 0;
        for _ in 0..queued {
            match self.rx.try_recv() {
                Ok(job) => {
                    if job(state) {
                        executed += 1;
                    }
                }
                Err(_) => break,
            }
        }
        executed
    }

    /// Jobs currently waiting to run.
    pub fn pending_len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_open(&self) -> bool {
        self.shared.open.load(Ordering::Acquire)
    }

    /// Stop intake and fail every job still queued. Idempotent.
    pub fn close(&mut self) {
        self.shared.open.store(false, Ordering::Release);
        self.rx.close();

        let mut failed = 0usize;
        while let Ok(job) = self.rx.try_recv() {
            // Dropping the job drops its result slot, which wakes the caller
            // with `OwnerUnavailable`.
            drop(job);
            failed += 1;
        }
        if failed > 0 {
            warn!("Owner closed with {failed} queued jobs failed");
        }
    }
}

impl<S> Drop for OwnerQueue<S> {
    fn drop(&mut self) {
        self.shared.open.store(false, Ordering::Release);
        self.rx.close();
    }
}
