//! Rendezvous bus carrying metrics from monitors to the producer.
//!
//! The bus has no buffer: a send only completes once the consumer has
//! actually taken the metric. Monitors therefore block inside their tick
//! when the output pipeline is saturated, which is the backpressure that
//! keeps slow sinks from piling up unbounded metrics in memory.
//!
//! Implemented as a capacity-one channel whose payload carries an ack
//! slot. The receiver acks while taking a metric, releasing the sender,
//! so the observable semantics match a zero-capacity exchange.

use std::fmt;

use tokio::sync::{mpsc, oneshot};

use crate::Metric;

struct Handoff {
    metric: Metric,
    ack: oneshot::Sender<()>,
}

/// Create a connected sender/receiver pair.
pub fn channel() -> (Sender, Receiver) {
    let (tx, rx) = mpsc::channel(1);
    (Sender { inner: tx }, Receiver { inner: rx })
}

/// Producing half of the bus. Cheap to clone, one per monitor.
#[derive(Clone)]
pub struct Sender {
    inner: mpsc::Sender<Handoff>,
}

impl Sender {
    /// Hand a metric to the consumer.
    ///
    /// Resolves once the consumer has received the metric. Fails fast
    /// with [`ClosedError`] when the consumer has gone away, whether
    /// before the send or while the handoff was still pending.
    pub async fn send(&self, metric: Metric) -> Result<(), ClosedError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        let handoff = Handoff {
            metric,
            ack: ack_tx,
        };

        self.inner.send(handoff).await.map_err(|_| ClosedError)?;
        ack_rx.await.map_err(|_| ClosedError)
    }
}

/// Consuming half of the bus. Single owner, not cloneable.
pub struct Receiver {
    inner: mpsc::Receiver<Handoff>,
}

impl Receiver {
    /// Take the next metric, releasing its sender.
    ///
    /// Returns `None` once every sender has been dropped and all pending
    /// handoffs are drained.
    pub async fn recv(&mut self) -> Option<Metric> {
        let handoff = self.inner.recv().await?;
        // The sender may have been cancelled mid-handoff; the metric is
        // ours either way.
        let _ = handoff.ack.send(());
        Some(handoff.metric)
    }
}

/// The consuming side of the bus has gone away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosedError;

impl fmt::Display for ClosedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "metric bus closed")
    }
}

impl std::error::Error for ClosedError {}
