//! One-shot start barrier shared by the orchestrator and its workers.

use thiserror::Error;
use tokio::sync::watch;

/// The barrier was dropped without ever being released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("start barrier dropped before release")]
pub struct BarrierDropped;

/// Gate that holds every worker until the orchestrator releases it.
///
/// Backed by a watch channel: the released state is retained, so a gate
/// that starts waiting after release passes straight through and no
/// wake-up is ever missed. Waiters sleep instead of spinning.
#[derive(Debug)]
pub struct StartBarrier {
    tx: watch::Sender<bool>,
}

impl StartBarrier {
    /// Create a barrier in the "not started" state.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Hand out a gate for one worker.
    pub fn gate(&self) -> StartGate {
        StartGate {
            rx: self.tx.subscribe(),
        }
    }

    /// Release every gate. Returns `true` only for the call that flipped
    /// the barrier; later calls are no-ops.
    pub fn release(&self) -> bool {
        self.tx.send_if_modified(|started| {
            if *started {
                false
            } else {
                *started = true;
                true
            }
        })
    }

    /// Check if the barrier has been released.
    pub fn is_released(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for StartBarrier {
    fn default() -> Self {
        Self::new()
    }
}

/// A worker's handle on the [`StartBarrier`].
#[derive(Debug, Clone)]
pub struct StartGate {
    rx: watch::Receiver<bool>,
}

impl StartGate {
    /// Wait until the barrier is released.
    pub async fn wait(mut self) -> Result<(), BarrierDropped> {
        self.rx
            .wait_for(|started| *started)
            .await
            .map(|_| ())
            .map_err(|_| BarrierDropped)
    }
}
