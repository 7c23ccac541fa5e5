//! Stdout sink
//!
//! Writes every formatted metric as one line on stdout. Handy for
//! piping the agent into another tool or just watching it.

use async_trait::async_trait;
use tokio::io::{AsyncWriteExt, Stdout};

use super::error::OutputResult;
use super::writer::Writer;

/// Line-per-metric stdout writer.
pub struct StdoutWriter {
    stdout: Stdout,
}

impl StdoutWriter {
    pub fn new() -> Self {
        Self {
            stdout: tokio::io::stdout(),
        }
    }
}

impl Default for StdoutWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Writer for StdoutWriter {
    async fn write(&mut self, body: &[u8], _content_type: &str) -> OutputResult<()> {
        self.stdout.write_all(body).await?;
        self.stdout.write_all(b"\n").await?;
        // Flush per metric, lines should show up as they happen
        self.stdout.flush().await?;
        Ok(())
    }

    async fn close(&mut self) -> OutputResult<()> {
        self.stdout.flush().await?;
        Ok(())
    }
}
