//! HTTP sink
//!
//! POSTs every formatted metric to a fixed endpoint, the reference
//! backend for shipping metrics to a collector.

use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use reqwest::{Client, Url};

use super::error::{OutputError, OutputResult};
use super::writer::Writer;
use crate::transport;
use crate::util::DEFAULT_USER_AGENT;

/// Ships metrics via HTTP POST, one request per metric.
pub struct HttpWriter {
    client: Client,
    target: Url,
    headers: HeaderMap,
}

impl HttpWriter {
    /// Build the writer with its own client and static extra headers.
    ///
    /// The default User-Agent applies unless the configured headers set
    /// their own.
    pub fn new(target: Url, headers: &HashMap<String, String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .build()
            .context("unable to build output HTTP client")?;

        Ok(Self {
            client,
            target,
            headers: transport::header_map(headers)?,
        })
    }
}

#[async_trait]
impl Writer for HttpWriter {
    async fn write(&mut self, body: &[u8], content_type: &str) -> OutputResult<()> {
        let request = self
            .client
            .post(self.target.clone())
            .headers(self.headers.clone())
            .header(CONTENT_TYPE, content_type)
            .body(body.to_vec())
            .build()
            .map_err(OutputError::Request)?;

        let response = self
            .client
            .execute(request)
            .await
            .map_err(OutputError::Transport)?;

        if !response.status().is_success() {
            return Err(OutputError::BadStatus(response.status()));
        }

        Ok(())
    }

    async fn close(&mut self) -> OutputResult<()> {
        Ok(())
    }
}
