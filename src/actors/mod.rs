//! Actor-based probing pipeline
//!
//! This module implements the agent's concurrency model. Each actor runs
//! as an independent async task communicating via Tokio channels.
//!
//! ## Architecture Overview
//!
//! ```text
//!                  ┌─────────────────┐
//!                  │   main (agent)  │
//!                  └────────┬────────┘
//!                           │ spawns
//!          ┌────────────────┼────────────────┐
//!          │                │                │
//!  ┌───────▼───────┐        │        ┌───────▼───────┐
//!  │ MonitorActor  │        │        │ MonitorActor  │
//!  │ (endpoint 1)  │        │        │ (endpoint N)  │
//!  └───────┬───────┘        │        └───────┬───────┘
//!          │                │                │
//!          └────────────────┼────────────────┘
//!                           │ blocking handoff
//!                 ┌─────────▼──────────┐
//!                 │   Metric Bus       │ (rendezvous)
//!                 └─────────┬──────────┘
//!                           │
//!                 ┌─────────▼──────────┐
//!                 │   ProducerActor    │──► Formatter ──► Writer
//!                 └────────────────────┘
//! ```
//!
//! ## Actor Types
//!
//! - **MonitorActor**: probes one endpoint at its configured interval
//! - **ProducerActor**: drains the bus and ships metrics to the sink
//!
//! ## Communication Patterns
//!
//! 1. **Commands**: Each actor has an mpsc command channel for control messages
//! 2. **Metrics**: Monitors hand metrics to the producer over the rendezvous bus
//! 3. **Request/Response**: oneshot channels for synchronous queries

pub mod messages;
pub mod monitor;
pub mod producer;
