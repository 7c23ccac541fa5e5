//! HTTP client and header construction.

use std::collections::HashMap;
use std::fs;

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Certificate, Client, Identity, Proxy};
use tracing::warn;

use crate::config::MonitorConfig;
use crate::util::DEFAULT_USER_AGENT;

/// Build the dedicated HTTP client for one monitor.
///
/// Every monitor owns its own client so per-monitor proxy and TLS
/// settings never leak between endpoints. The client carries no global
/// timeout: the probe deadline is enforced per request and only covers
/// the exchange up to the response headers.
pub fn build_client(config: &MonitorConfig) -> Result<Client> {
    let mut builder = Client::builder().user_agent(DEFAULT_USER_AGENT);

    if let Some(proxy) = &config.proxy {
        let proxy = Proxy::all(proxy).with_context(|| format!("invalid proxy '{proxy}'"))?;
        builder = builder.proxy(proxy);
    }

    if config.tls.insecure_skip_verify {
        warn!("certificate verification disabled for {}", config.url);
        builder = builder.danger_accept_invalid_certs(true);
    }

    if let Some(path) = &config.tls.ca_cert {
        let pem = fs::read(path)
            .with_context(|| format!("unable to read CA certificate '{}'", path.display()))?;
        let cert = Certificate::from_pem(&pem)
            .with_context(|| format!("invalid CA certificate '{}'", path.display()))?;
        builder = builder.add_root_certificate(cert);
    }

    if let Some(path) = &config.tls.client_identity {
        let pem = fs::read(path)
            .with_context(|| format!("unable to read client identity '{}'", path.display()))?;
        let identity = Identity::from_pem(&pem)
            .with_context(|| format!("invalid client identity '{}'", path.display()))?;
        builder = builder.identity(identity);
    }

    builder.build().context("unable to build HTTP client")
}

/// Validate configured header strings into a typed header map.
pub fn header_map(raw: &HashMap<String, String>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in raw {
        let parsed_name: HeaderName = name
            .parse()
            .with_context(|| format!("invalid header name '{name}'"))?;
        let parsed_value: HeaderValue = value
            .parse()
            .with_context(|| format!("invalid value for header '{name}'"))?;
        headers.insert(parsed_name, parsed_value);
    }
    Ok(headers)
}
