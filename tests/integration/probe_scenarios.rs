//! End-to-end probe scenarios
//!
//! These tests drive fully constructed monitors against a mock endpoint
//! and check the resulting metric: status, error classification and
//! timing.

use std::time::Duration;

use endpoint_monitoring::Status;
use endpoint_monitoring::config::MonitorConfig;
use endpoint_monitoring::monitor::Monitor;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::*;

#[tokio::test]
async fn healthy_endpoint_reports_up() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("all good"))
        .mount(&server)
        .await;

    let config = create_monitor_config_with_rules(
        &format!("{}/health", server.uri()),
        "10s",
        "2s",
        serde_json::json!([{ "rule": "status" }]),
    );
    let monitor = Monitor::from_config(0, &config).unwrap();

    let metric = monitor.observe().await;

    assert_eq!(metric.status, Status::Up);
    assert_eq!(metric.error, None);
    assert_eq!(metric.name, "test-endpoint");
    assert!(metric.duration_ms < 2_000);
}

#[tokio::test]
async fn failing_status_rule_reports_down() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = create_monitor_config_with_rules(
        &server.uri(),
        "10s",
        "2s",
        serde_json::json!([{ "rule": "status" }]),
    );
    let monitor = Monitor::from_config(0, &config).unwrap();

    let metric = monitor.observe().await;

    assert_eq!(metric.status, Status::Down);
    let error = metric.error.unwrap();
    assert!(error.starts_with("RULE_STATUS:"), "got: {error}");
    assert!(error.contains("500"), "got: {error}");
}

#[tokio::test]
async fn status_rule_accepts_configured_codes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let config = create_monitor_config_with_rules(
        &server.uri(),
        "10s",
        "2s",
        serde_json::json!([{ "rule": "status", "expect": [404] }]),
    );
    let monitor = Monitor::from_config(0, &config).unwrap();

    assert_eq!(monitor.observe().await.status, Status::Up);
}

#[tokio::test]
async fn unresponsive_endpoint_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let config = create_monitor_config(&server.uri(), "10s", "100ms");
    let monitor = Monitor::from_config(0, &config).unwrap();

    let metric = monitor.observe().await;

    assert_eq!(metric.status, Status::Down);
    let error = metric.error.unwrap();
    assert!(error.starts_with("TIMEOUT"), "got: {error}");

    // The probe gave up at the deadline, well before the response
    assert!(metric.duration_ms >= 100, "got: {}ms", metric.duration_ms);
    assert!(metric.duration_ms < 450, "got: {}ms", metric.duration_ms);
}

#[tokio::test]
async fn rules_run_in_order_and_stop_at_first_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"status":"degraded"}"#))
        .mount(&server)
        .await;

    // json passes, regexp fails, the status rule would fail too but must
    // never be blamed
    let config = create_monitor_config_with_rules(
        &server.uri(),
        "10s",
        "2s",
        serde_json::json!([
            { "rule": "json", "pointer": "/status" },
            { "rule": "regexp", "pattern": "\"status\"\\s*:\\s*\"ok\"" },
            { "rule": "status", "expect": [500] }
        ]),
    );
    let monitor = Monitor::from_config(0, &config).unwrap();

    let metric = monitor.observe().await;

    assert_eq!(metric.status, Status::Down);
    let error = metric.error.unwrap();
    assert!(error.starts_with("RULE_REGEXP:"), "got: {error}");
}

#[tokio::test]
async fn post_probe_sends_configured_body_and_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ingest"))
        .and(header("x-api-key", "secret"))
        .and(body_string("ping"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let config: MonitorConfig = serde_json::from_value(serde_json::json!({
        "url": format!("{}/ingest", server.uri()),
        "method": "POST",
        "headers": { "x-api-key": "secret" },
        "body": "ping",
        "healthcheck": {
            "interval": "10s",
            "timeout": "2s",
            "rules": [{ "rule": "status" }]
        }
    }))
    .unwrap();
    let monitor = Monitor::from_config(0, &config).unwrap();

    // Anything not matching the mock gets a 404, so UP proves the
    // method, header and body all went through
    assert_eq!(monitor.observe().await.status, Status::Up);
}

#[tokio::test]
async fn probes_carry_the_default_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let config = create_monitor_config(&server.uri(), "10s", "2s");
    Monitor::from_config(0, &config).unwrap().observe().await;

    let requests = server.received_requests().await.unwrap();
    let agent = requests[0]
        .headers
        .get("user-agent")
        .expect("user-agent header missing")
        .to_str()
        .unwrap();
    assert!(agent.starts_with("guardia-probe/"), "got: {agent}");
}

#[tokio::test]
async fn unreachable_endpoint_reports_request_error() {
    // Grab a loopback port, then free it again
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let config = create_monitor_config(&uri, "10s", "2s");
    let monitor = Monitor::from_config(0, &config).unwrap();

    let metric = monitor.observe().await;

    assert_eq!(metric.status, Status::Down);
    let error = metric.error.unwrap();
    assert!(error.starts_with("REQUEST:"), "got: {error}");
}
