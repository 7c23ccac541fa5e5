//! Response validation rules.
//!
//! A monitor runs an ordered pipeline of validators against every probe
//! response. Each validator exposes a stable name (used to tag failures)
//! and checks the response body plus metadata, failing with a reason.

use anyhow::{Result, anyhow, bail};
use regex::Regex;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;

use crate::config::RuleConfig;

/// Response metadata handed to validators alongside the body.
#[derive(Debug, Clone)]
pub struct ProbeResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
}

/// A single named check applied to a probe's response.
///
/// Implementations must be side-effect free: the pipeline stops at the
/// first failure and earlier validators must not have changed anything.
pub trait Validator: Send + Sync {
    /// Stable name used to tag validation failures.
    fn name(&self) -> &'static str;

    fn validate(&self, body: &str, response: &ProbeResponse) -> Result<()>;
}

/// Build the ordered validator pipeline for one monitor.
///
/// Fails when any rule is malformed (e.g. an invalid regular expression),
/// which aborts that monitor's construction.
pub fn build_pipeline(rules: &[RuleConfig]) -> Result<Vec<Box<dyn Validator>>> {
    rules.iter().map(build_validator).collect()
}

fn build_validator(rule: &RuleConfig) -> Result<Box<dyn Validator>> {
    Ok(match rule {
        RuleConfig::Status { expect } => Box::new(StatusValidator {
            expect: expect.clone(),
        }),
        RuleConfig::Regexp { pattern } => Box::new(RegexpValidator {
            pattern: Regex::new(pattern)
                .map_err(|e| anyhow!("invalid regexp rule '{pattern}': {e}"))?,
        }),
        RuleConfig::Json { pointer } => Box::new(JsonValidator {
            pointer: pointer.clone(),
        }),
    })
}

struct StatusValidator {
    expect: Option<Vec<u16>>,
}

impl Validator for StatusValidator {
    fn name(&self) -> &'static str {
        "status"
    }

    fn validate(&self, _body: &str, response: &ProbeResponse) -> Result<()> {
        let code = response.status.as_u16();
        let ok = match &self.expect {
            Some(expected) => expected.contains(&code),
            // Default: any 2xx status is success
            None => response.status.is_success(),
        };

        if ok {
            Ok(())
        } else {
            bail!("unexpected status code: {code}")
        }
    }
}

struct RegexpValidator {
    pattern: Regex,
}

impl Validator for RegexpValidator {
    fn name(&self) -> &'static str {
        "regexp"
    }

    fn validate(&self, body: &str, _response: &ProbeResponse) -> Result<()> {
        if self.pattern.is_match(body) {
            Ok(())
        } else {
            bail!("body does not match '{}'", self.pattern)
        }
    }
}

struct JsonValidator {
    pointer: Option<String>,
}

impl Validator for JsonValidator {
    fn name(&self) -> &'static str {
        "json"
    }

    fn validate(&self, body: &str, _response: &ProbeResponse) -> Result<()> {
        let value: serde_json::Value =
            serde_json::from_str(body).map_err(|e| anyhow!("body is not valid JSON: {e}"))?;

        if let Some(pointer) = &self.pointer
            && value.pointer(pointer).is_none()
        {
            bail!("no value at JSON pointer '{pointer}'");
        }

        Ok(())
    }
}
