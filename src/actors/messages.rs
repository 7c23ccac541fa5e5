//! Message types for actor communication
//!
//! This module defines all message types used for communication between actors.
//!
//! ## Design Principles
//!
//! 1. **Commands**: Request/response messages sent to a specific actor via mpsc
//! 2. **Replies**: oneshot channels carry responses back to the caller
//! 3. **Handoff**: Metrics travel over the rendezvous bus, not over commands

use tokio::sync::oneshot;

use crate::Metric;

/// Commands that can be sent to a MonitorActor
#[derive(Debug)]
pub enum MonitorCommand {
    /// Probe immediately, outside the schedule
    ///
    /// The resulting metric is returned to the caller instead of being
    /// published. Used for testing and manual refresh operations.
    ProbeNow {
        /// Channel to send the metric back
        respond_to: oneshot::Sender<Metric>,
    },

    /// Gracefully shut down the monitor
    ///
    /// The actor finishes any in-flight probe and then exits.
    Shutdown,
}

/// Commands that can be sent to the ProducerActor
#[derive(Debug)]
pub enum ProducerCommand {
    /// Get delivery statistics
    GetStats {
        respond_to: oneshot::Sender<ProducerStats>,
    },

    /// Gracefully shut down the producer
    Shutdown,
}

/// Delivery statistics of the producer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProducerStats {
    /// Metrics successfully handed to the writer
    pub delivered: u64,

    /// Metrics whose write failed (logged and dropped)
    pub failed: u64,
}
