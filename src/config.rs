use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use tracing::trace;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub monitors: Option<Vec<MonitorConfig>>,

    /// Output sink configuration (optional - defaults to stdout/json)
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct MonitorConfig {
    pub url: String,
    pub alias: Option<String>,
    pub method: Option<String>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
    pub proxy: Option<String>,
    #[serde(default)]
    pub tls: TlsConfig,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub healthcheck: HealthcheckConfig,
}

/// TLS options resolved into the monitor's HTTP client at construction.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct TlsConfig {
    /// Accept invalid/self-signed server certificates.
    #[serde(default)]
    pub insecure_skip_verify: bool,

    /// Additional root certificate (PEM file).
    pub ca_cert: Option<PathBuf>,

    /// Client certificate + key bundle (PEM file) for mutual TLS.
    pub client_identity: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct HealthcheckConfig {
    /// Probe interval as a duration string ("30s", "1m"). Falls back to the
    /// default with a warning when present but unparseable.
    pub interval: Option<String>,

    /// Per-probe timeout as a duration string. Same fallback behavior.
    pub timeout: Option<String>,

    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(tag = "rule", rename_all = "lowercase")]
pub enum RuleConfig {
    /// Response status must be listed in `expect`, or any 2xx when unset.
    Status { expect: Option<Vec<u16>> },

    /// Response body must match the regular expression.
    Regexp { pattern: String },

    /// Response body must be valid JSON; when set, `pointer` (a JSON
    /// Pointer) must resolve to some value.
    Json { pointer: Option<String> },
}

/// HTTP methods a monitor is allowed to probe with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Head,
    Get,
    Post,
}

impl HttpMethod {
    /// Restrict an arbitrary configured method to the safe probing set,
    /// defaulting to GET for anything unrecognized.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "HEAD" => HttpMethod::Head,
            "POST" => HttpMethod::Post,
            _ => HttpMethod::Get,
        }
    }

    pub fn as_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct OutputConfig {
    /// Destination: "stdout", "-" or an http(s) URL.
    pub target: String,

    #[serde(default)]
    pub format: FormatConfig,

    /// Extra headers sent with every write (HTTP targets).
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl Default for OutputConfig {
    /// Print JSON metrics on stdout when no output block is configured.
    fn default() -> Self {
        Self {
            target: "stdout".to_string(),
            format: FormatConfig::default(),
            headers: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatConfig {
    #[default]
    Json,
    Influxdb,
}

pub fn read_config_file(path: &str) -> anyhow::Result<Config> {
    let file_content = std::fs::read_to_string(path)?;
    serde_json::from_str(&file_content)
        .map_err(|_| anyhow::anyhow!("Invalid configuration file provided!"))
        .inspect(|config| trace!("loaded config: {config:?}"))
}
