//! Writer trait definition
//!
//! This module defines the `Writer` trait that all metric sinks
//! implement.

use async_trait::async_trait;

use super::error::OutputResult;

/// Trait for metric sinks
///
/// The producer drives exactly one writer, one metric at a time, so
/// implementations take `&mut self` and never need internal locking.
/// A failed write only affects that one metric; the producer logs it
/// and moves on.
#[async_trait]
pub trait Writer: Send {
    /// Ship one formatted metric
    async fn write(&mut self, body: &[u8], content_type: &str) -> OutputResult<()>;

    /// Flush and release the sink, called once during teardown
    async fn close(&mut self) -> OutputResult<()>;
}
