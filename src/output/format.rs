//! Metric formatters
//!
//! A formatter renders one metric into its on-the-wire bytes. Rendering
//! is pure and cannot fail; everything fallible happens in the writer.

use crate::Metric;

/// Turns a metric into bytes plus the matching content type.
pub trait Formatter: Send {
    fn format(&self, metric: &Metric) -> Vec<u8>;

    /// MIME type of the rendered representation
    fn content_type(&self) -> &'static str;
}

/// The metric as a JSON document (default format).
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, metric: &Metric) -> Vec<u8> {
        serde_json::to_vec(metric).expect("metric serialization cannot fail")
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }
}

/// The metric as one InfluxDB line protocol entry.
///
/// Measurement `healthcheck`, the metric name and labels as tags, status
/// and duration (and the error, when present) as fields, nanosecond
/// timestamp. Labels are emitted in key order so the line is canonical.
pub struct InfluxFormatter;

impl Formatter for InfluxFormatter {
    fn format(&self, metric: &Metric) -> Vec<u8> {
        let mut tags = format!("healthcheck,name={}", escape_tag(&metric.name));
        for (key, value) in &metric.labels {
            tags.push_str(&format!(",{}={}", escape_tag(key), escape_tag(value)));
        }

        let mut fields = format!(
            "status=\"{}\",duration_ms={}i",
            metric.status, metric.duration_ms
        );
        if let Some(error) = &metric.error {
            fields.push_str(&format!(",error=\"{}\"", escape_field(error)));
        }

        let timestamp = metric.timestamp.timestamp_nanos_opt().unwrap_or(0);

        format!("{tags} {fields} {timestamp}").into_bytes()
    }

    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }
}

/// Tag keys and values escape comma, equals and space.
fn escape_tag(value: &str) -> String {
    value
        .replace(',', "\\,")
        .replace('=', "\\=")
        .replace(' ', "\\ ")
}

/// String field values escape backslash and double quote.
fn escape_field(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
