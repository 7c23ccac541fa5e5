//! MonitorActor - probes one HTTP endpoint on its schedule
//!
//! Each configured monitor gets its own actor. The actor fires on every
//! interval tick, probes the target and hands the resulting metric to
//! the bus. The handoff is blocking: while the output side is busy the
//! actor waits inside its tick, and the skipping ticker shifts the
//! schedule instead of bursting afterwards.
//!
//! ## Message Flow
//!
//! ```text
//! Timer tick → probe target → validate response → Metric → bus handoff
//!     ↑
//!     └─── Commands (ProbeNow, Shutdown)
//! ```

use anyhow::Result;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, instrument, warn};

use super::messages::MonitorCommand;
use crate::bus;
use crate::monitor::Monitor;
use crate::{Metric, Status};

/// Actor that probes a single endpoint
pub struct MonitorActor {
    /// The monitor being driven
    monitor: Monitor,

    /// Command receiver for control messages
    command_rx: mpsc::Receiver<MonitorCommand>,

    /// Bus sender for publishing metrics
    bus: bus::Sender,
}

impl MonitorActor {
    pub fn new(
        monitor: Monitor,
        command_rx: mpsc::Receiver<MonitorCommand>,
        bus: bus::Sender,
    ) -> Self {
        Self {
            monitor,
            command_rx,
            bus,
        }
    }

    /// Run the actor's main loop
    ///
    /// This is the entry point for the actor. It runs until:
    /// - A Shutdown command is received
    /// - The command channel is closed
    /// - The bus consumer has gone away
    #[instrument(skip(self), fields(monitor = %self.monitor.name()))]
    pub async fn run(mut self) {
        debug!("starting monitor actor");

        let mut ticker = interval(self.monitor.schedule().interval);
        // A probe that outlives its interval shifts the schedule; missed
        // ticks must not trigger a burst of catch-up probes.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                // Timer tick - probe and publish
                _ = ticker.tick() => {
                    let metric = self.probe().await;
                    if self.bus.send(metric).await.is_err() {
                        warn!("metric bus closed, shutting down");
                        break;
                    }
                }

                // Handle commands
                Some(cmd) = self.command_rx.recv() => {
                    match cmd {
                        MonitorCommand::ProbeNow { respond_to } => {
                            debug!("received ProbeNow command");
                            let metric = self.probe().await;
                            let _ = respond_to.send(metric);
                        }

                        MonitorCommand::Shutdown => {
                            debug!("received shutdown command");
                            break;
                        }
                    }
                }

                // Command channel closed - exit
                else => {
                    warn!("command channel closed, shutting down");
                    break;
                }
            }
        }

        debug!("monitor actor stopped");
    }

    async fn probe(&self) -> Metric {
        let metric = self.monitor.observe().await;

        match metric.status {
            Status::Up => debug!(duration_ms = metric.duration_ms, "endpoint is up"),
            Status::Down => warn!(
                duration_ms = metric.duration_ms,
                error = metric.error.as_deref().unwrap_or("unknown"),
                "endpoint is down"
            ),
        }

        metric
    }
}

/// Handle for controlling a MonitorActor
#[derive(Clone)]
pub struct MonitorHandle {
    sender: mpsc::Sender<MonitorCommand>,
    name: String,
    id: usize,
}

impl MonitorHandle {
    /// Spawn a new monitor actor publishing to `bus`
    pub fn spawn(monitor: Monitor, bus: bus::Sender) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let name = monitor.name().to_string();
        let id = monitor.id();

        let actor = MonitorActor::new(monitor, cmd_rx, bus);

        tokio::spawn(actor.run());

        Self {
            sender: cmd_tx,
            name,
            id,
        }
    }

    /// Probe immediately; the metric is returned instead of published
    pub async fn probe_now(&self) -> Result<Metric> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(MonitorCommand::ProbeNow { respond_to: tx })
            .await?;

        Ok(rx.await?)
    }

    /// Shut down the monitor
    pub async fn shutdown(self) {
        let _ = self.sender.send(MonitorCommand::Shutdown).await;
    }

    /// Get the monitor name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the monitor id
    pub fn id(&self) -> usize {
        self.id
    }
}

// ============================================================================
// Tests
// ============================================================================
