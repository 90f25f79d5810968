//! One-shot passcode gate.
//!
//! A gate is created for each job. The login stage waits on it once; a request
//! handler submits the passcode once. After it fires, times out or is closed
//! the gate is spent and the next job gets a fresh one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::oneshot;

/// Errors from [`OtpGate`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    /// No passcode arrived before the deadline.
    #[error("no passcode submitted within {}s", .0.as_secs())]
    Timeout(Duration),

    /// A passcode was already delivered through this gate.
    #[error("passcode already submitted")]
    AlreadyFired,

    /// Another flow already waited on this gate.
    #[error("gate already has a waiter")]
    WaiterTaken,

    /// The gate's job ended, or its waiter gave up.
    #[error("gate is closed")]
    Closed,
}

/// Single-writer, single-waiter passcode handoff with a deadline.
#[derive(Debug)]
pub struct OtpGate {
    sender: Mutex<Option<oneshot::Sender<String>>>,
    receiver: Mutex<Option<oneshot::Receiver<String>>>,
    fired: AtomicBool,
    closed: AtomicBool,
}

impl Default for OtpGate {
    fn default() -> Self {
        Self::new()
    }
}

impl OtpGate {
    pub fn new() -> Self {
        let (tx, rx) = oneshot::channel();
        Self {
            sender: Mutex::new(Some(tx)),
            receiver: Mutex::new(Some(rx)),
            fired: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }

    /// Wait for the passcode, giving up after `timeout`.
    ///
    /// Only the first caller gets to wait. A passcode submitted before the
    /// wait starts is returned immediately.
    pub async fn wait(&self, timeout: Duration) -> Result<String, GateError> {
        let receiver = self
            .receiver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let receiver = match receiver {
            Some(rx) => rx,
            None if self.is_closed() => return Err(GateError::Closed),
            None => return Err(GateError::WaiterTaken),
        };

        match tokio::time::timeout(timeout, receiver).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(_)) => Err(GateError::Closed),
            Err(_) => Err(GateError::Timeout(timeout)),
        }
    }

    /// Deliver the passcode to the waiter.
    ///
    /// Fails instead of panicking when the gate already fired, was closed, or
    /// its waiter timed out.
    pub fn submit(&self, value: impl Into<String>) -> Result<(), GateError> {
        if self.is_closed() {
            return Err(GateError::Closed);
        }

        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match sender {
            Some(tx) => {
                tx.send(value.into()).map_err(|_| GateError::Closed)?;
                self.fired.store(true, Ordering::SeqCst);
                Ok(())
            }
            None if self.is_fired() => Err(GateError::AlreadyFired),
            None => Err(GateError::Closed),
        }
    }

    /// Mark the gate stale. Pending waiters wake with [`GateError::Closed`].
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.receiver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    pub fn is_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
