//! Metric output pipeline
//!
//! Formatters render metrics into bytes, writers ship those bytes to a
//! sink. Exactly one formatter/writer pair is picked at startup from
//! the output configuration and driven by the metric producer, one
//! metric at a time.
//!
//! ## Sinks
//!
//! - **HTTP**: POSTs each formatted metric to a collector endpoint
//! - **stdout**: prints each formatted metric as one line (the default
//!   when no output is configured)
//!
//! ## Formats
//!
//! - **json** (default): the metric as a JSON document
//! - **influxdb**: InfluxDB line protocol

pub mod error;
pub mod format;
pub mod http;
pub mod stdout;
pub mod writer;

pub use error::{OutputError, OutputResult};
pub use format::{Formatter, InfluxFormatter, JsonFormatter};
pub use http::HttpWriter;
pub use stdout::StdoutWriter;
pub use writer::Writer;

use anyhow::{Context, Result, bail};
use reqwest::Url;

use crate::config::{FormatConfig, OutputConfig};

/// Resolve the output configuration into a concrete formatter/writer
/// pair.
///
/// `"stdout"` and `"-"` select the stdout sink; an `http(s)` URL selects
/// the HTTP sink; anything else is a configuration error.
pub fn build_output(config: &OutputConfig) -> Result<(Box<dyn Formatter>, Box<dyn Writer>)> {
    let formatter: Box<dyn Formatter> = match config.format {
        FormatConfig::Json => Box::new(JsonFormatter),
        FormatConfig::Influxdb => Box::new(InfluxFormatter),
    };

    let writer: Box<dyn Writer> = match config.target.as_str() {
        "stdout" | "-" => Box::new(StdoutWriter::new()),
        target => {
            let url: Url = target
                .parse()
                .with_context(|| format!("invalid output target '{target}'"))?;
            match url.scheme() {
                "http" | "https" => Box::new(HttpWriter::new(url, &config.headers)?),
                scheme => bail!("unsupported output target scheme '{scheme}'"),
            }
        }
    };

    Ok((formatter, writer))
}
