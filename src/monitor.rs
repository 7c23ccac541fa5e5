//! Endpoint monitors.
//!
//! A [`Monitor`] owns the whole probing lifecycle of a single target:
//! its schedule, its HTTP client, its validator pipeline and the
//! classification of everything that can go wrong along the way.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::header::HeaderMap;
use reqwest::{Client, Request, Url};
use tracing::warn;

use crate::actors::monitor::MonitorHandle;
use crate::bus;
use crate::config::{HealthcheckConfig, HttpMethod, MonitorConfig};
use crate::rules::{self, ProbeResponse, Validator};
use crate::transport;
use crate::util::parse_duration;
use crate::{Metric, Status};

/// Probe interval used when the configuration gives none.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

/// Probe timeout used when the configuration gives none.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Gap kept between timeout and interval when the timeout gets clamped.
pub const TIMEOUT_MARGIN: Duration = Duration::from_millis(100);

/// Everything a single probe can fail with. The rendered form is the
/// `error` field of the resulting metric, prefixed with the failing
/// stage.
#[derive(Debug)]
pub enum ProbeError {
    /// The outbound request could not be constructed.
    PrepareRequest(reqwest::Error),
    /// No response headers within the probe deadline.
    Timeout(Duration),
    /// The exchange failed below the HTTP layer.
    Request(reqwest::Error),
    /// The response body could not be read.
    Body(reqwest::Error),
    /// A validation rule rejected the response.
    Rule {
        name: &'static str,
        reason: anyhow::Error,
    },
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::PrepareRequest(err) => write!(f, "PREPARE_REQUEST: {err}"),
            ProbeError::Timeout(after) => write!(f, "TIMEOUT: no response after {after:?}"),
            ProbeError::Request(err) => write!(f, "REQUEST: {err}"),
            ProbeError::Body(err) => write!(f, "BODY: {err}"),
            ProbeError::Rule { name, reason } => {
                write!(f, "RULE_{}: {reason}", name.to_uppercase())
            }
        }
    }
}

impl std::error::Error for ProbeError {}

/// Effective probe timing after defaults and clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub interval: Duration,
    pub timeout: Duration,
}

/// One configured target, ready to be probed.
pub struct Monitor {
    id: usize,
    name: String,
    url: Url,
    method: HttpMethod,
    headers: HeaderMap,
    body: Option<String>,
    labels: BTreeMap<String, String>,
    schedule: Schedule,
    validators: Vec<Box<dyn Validator>>,
    client: Client,
}

impl Monitor {
    /// Build a monitor from its configuration block.
    ///
    /// Fails on a malformed URL, header, proxy, TLS material or rule.
    /// A failure here only affects this monitor; the caller decides
    /// whether to keep going with the others.
    pub fn from_config(id: usize, config: &MonitorConfig) -> Result<Self> {
        let url: Url = config
            .url
            .parse()
            .with_context(|| format!("invalid monitor URL '{}'", config.url))?;

        let name = config
            .alias
            .clone()
            .unwrap_or_else(|| config.url.clone());

        let method = config
            .method
            .as_deref()
            .map(HttpMethod::from_name)
            .unwrap_or(HttpMethod::Get);

        Ok(Self {
            id,
            name,
            url,
            method,
            headers: transport::header_map(&config.headers)?,
            body: config.body.clone(),
            labels: config.labels.clone(),
            schedule: Self::resolve_schedule(&config.healthcheck),
            validators: rules::build_pipeline(&config.healthcheck.rules)?,
            client: transport::build_client(config)?,
        })
    }

    /// Resolve the effective schedule from raw configuration values.
    ///
    /// Missing or unparsable durations fall back to the defaults. A
    /// timeout at or above the interval is clamped to the interval minus
    /// [`TIMEOUT_MARGIN`], saturating at zero.
    pub fn resolve_schedule(config: &HealthcheckConfig) -> Schedule {
        let interval =
            configured_duration(config.interval.as_deref(), DEFAULT_INTERVAL, "interval");
        let timeout = configured_duration(config.timeout.as_deref(), DEFAULT_TIMEOUT, "timeout");

        if timeout < interval {
            return Schedule { interval, timeout };
        }

        let clamped = interval.saturating_sub(TIMEOUT_MARGIN);
        warn!(
            ?interval,
            ?timeout,
            ?clamped,
            "timeout must stay below the probe interval, clamping"
        );
        if clamped.is_zero() {
            warn!("effective timeout is zero, every probe will report a timeout");
        }

        Schedule {
            interval,
            timeout: clamped,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schedule(&self) -> Schedule {
        self.schedule
    }

    /// Spawn this monitor's probing task, publishing metrics to `bus`.
    pub fn start(self, bus: bus::Sender) -> MonitorHandle {
        MonitorHandle::spawn(self, bus)
    }

    /// Run a single probe and fold the outcome into a metric.
    pub async fn observe(&self) -> Metric {
        let timestamp = Utc::now();
        let (elapsed, result) = self.validate().await;

        let (status, error) = match result {
            Ok(()) => (Status::Up, None),
            Err(err) => (Status::Down, Some(err.to_string())),
        };

        Metric {
            name: self.name.clone(),
            status,
            duration_ms: elapsed.as_millis() as u64,
            timestamp,
            error,
            labels: self.labels.clone(),
        }
    }

    /// Probe the target once.
    ///
    /// Returns the elapsed wall-clock time alongside the outcome; the
    /// duration is measured up to whichever step settled the result, so
    /// a timed-out probe reports roughly the configured deadline.
    pub async fn validate(&self) -> (Duration, Result<(), ProbeError>) {
        let started = Instant::now();
        let result = self.probe().await;
        (started.elapsed(), result)
    }

    async fn probe(&self) -> Result<(), ProbeError> {
        // The deadline is armed before the request is built and covers
        // the exchange up to the response headers. Reading the body is
        // not under it.
        let deadline = tokio::time::sleep(self.schedule.timeout);
        tokio::pin!(deadline);

        let request = self.build_request().map_err(ProbeError::PrepareRequest)?;

        let response = tokio::select! {
            result = self.client.execute(request) => result.map_err(ProbeError::Request)?,
            _ = &mut deadline => return Err(ProbeError::Timeout(self.schedule.timeout)),
        };

        let meta = ProbeResponse {
            status: response.status(),
            headers: response.headers().clone(),
        };
        let body = response.text().await.map_err(ProbeError::Body)?;

        for validator in &self.validators {
            validator
                .validate(&body, &meta)
                .map_err(|reason| ProbeError::Rule {
                    name: validator.name(),
                    reason,
                })?;
        }

        Ok(())
    }

    fn build_request(&self) -> Result<Request, reqwest::Error> {
        let mut builder = self
            .client
            .request(self.method.as_reqwest(), self.url.clone())
            .headers(self.headers.clone());

        if let Some(body) = &self.body {
            builder = builder.body(body.clone());
        }

        builder.build()
    }
}

fn configured_duration(value: Option<&str>, default: Duration, field: &str) -> Duration {
    let Some(raw) = value else {
        return default;
    };

    match parse_duration(raw) {
        Some(parsed) => parsed,
        None => {
            warn!("invalid {field} '{raw}', falling back to {default:?}");
            default
        }
    }
}
