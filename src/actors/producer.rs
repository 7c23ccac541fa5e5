//! ProducerActor - drains the metric bus into the output sink
//!
//! Exactly one producer runs per process. It owns the receiving half of
//! the bus plus the formatter/writer pair and ships metrics one at a
//! time, in bus order. A failed write is logged and counted, never
//! propagated back to the probing side.
//!
//! The actor exits when it is shut down or when the bus closes (every
//! monitor gone); either way it closes the writer on the way out.

use anyhow::Result;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, instrument, trace, warn};

use super::messages::{ProducerCommand, ProducerStats};
use crate::Metric;
use crate::bus;
use crate::output::{Formatter, Writer};

/// Actor that ships metrics to the configured sink
pub struct ProducerActor {
    /// Receiving half of the metric bus
    metrics_rx: bus::Receiver,

    /// Command receiver for control messages
    command_rx: mpsc::Receiver<ProducerCommand>,

    /// Renders metrics into bytes
    formatter: Box<dyn Formatter>,

    /// Ships rendered bytes
    writer: Box<dyn Writer>,

    /// Delivery counters
    stats: ProducerStats,
}

impl ProducerActor {
    pub fn new(
        metrics_rx: bus::Receiver,
        command_rx: mpsc::Receiver<ProducerCommand>,
        formatter: Box<dyn Formatter>,
        writer: Box<dyn Writer>,
    ) -> Self {
        Self {
            metrics_rx,
            command_rx,
            formatter,
            writer,
            stats: ProducerStats::default(),
        }
    }

    /// Run the actor's main loop
    ///
    /// This is the entry point for the actor. It runs until:
    /// - A Shutdown command is received
    /// - The bus closes (all monitor senders dropped)
    #[instrument(skip(self))]
    pub async fn run(mut self) {
        debug!("starting producer actor");

        loop {
            tokio::select! {
                // Next metric off the bus
                metric = self.metrics_rx.recv() => {
                    match metric {
                        Some(metric) => self.ship(metric).await,
                        None => {
                            debug!("metric bus closed");
                            break;
                        }
                    }
                }

                // Handle commands. A closed command channel only disables
                // this arm; the producer keeps draining the bus.
                Some(cmd) = self.command_rx.recv() => {
                    match cmd {
                        ProducerCommand::GetStats { respond_to } => {
                            let _ = respond_to.send(self.stats);
                        }

                        ProducerCommand::Shutdown => {
                            debug!("received shutdown command");
                            break;
                        }
                    }
                }
            }
        }

        if let Err(e) = self.writer.close().await {
            warn!("failed to close output sink: {e}");
        }

        debug!(
            delivered = self.stats.delivered,
            failed = self.stats.failed,
            "producer actor stopped"
        );
    }

    async fn ship(&mut self, metric: Metric) {
        let body = self.formatter.format(&metric);

        match self.writer.write(&body, self.formatter.content_type()).await {
            Ok(()) => {
                self.stats.delivered += 1;
                trace!(metric = %metric.name, "metric delivered");
            }
            Err(e) => {
                self.stats.failed += 1;
                error!(metric = %metric.name, "failed to ship metric: {e}");
            }
        }
    }
}

/// Handle for controlling the ProducerActor
#[derive(Clone)]
pub struct ProducerHandle {
    sender: mpsc::Sender<ProducerCommand>,
}

impl ProducerHandle {
    /// Spawn the producer actor draining `metrics_rx`
    pub fn spawn(
        metrics_rx: bus::Receiver,
        formatter: Box<dyn Formatter>,
        writer: Box<dyn Writer>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);

        let actor = ProducerActor::new(metrics_rx, cmd_rx, formatter, writer);

        tokio::spawn(actor.run());

        Self { sender: cmd_tx }
    }

    /// Get delivery statistics
    pub async fn get_stats(&self) -> Result<ProducerStats> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(ProducerCommand::GetStats { respond_to: tx })
            .await?;

        Ok(rx.await?)
    }

    /// Shut down the producer
    pub async fn shutdown(self) {
        let _ = self.sender.send(ProducerCommand::Shutdown).await;
    }
}

// ============================================================================
// Tests
// ============================================================================
