//! Failure and teardown tests
//!
//! These tests verify that the agent degrades gracefully:
//! - Broken monitor configs don't take the others down
//! - A saturated or failing sink never stalls the pipeline for good
//! - Shutdown terminates tasks even mid-probe
//! - Config file problems surface as errors, not panics

use std::io::Write;
use std::time::Duration;

use endpoint_monitoring::actors::producer::ProducerHandle;
use endpoint_monitoring::config::read_config_file;
use endpoint_monitoring::monitor::Monitor;
use endpoint_monitoring::output::build_output;
use endpoint_monitoring::{Status, bus};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::*;

#[tokio::test]
async fn broken_monitor_configs_leave_the_others_usable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let configs = vec![
        create_monitor_config("::broken::", "10s", "2s"),
        create_monitor_config(&server.uri(), "10s", "2s"),
    ];

    let monitors: Vec<Monitor> = configs
        .iter()
        .enumerate()
        .filter_map(|(id, config)| Monitor::from_config(id, config).ok())
        .collect();

    assert_eq!(monitors.len(), 1);
    assert_eq!(monitors[0].observe().await.status, Status::Up);
}

#[tokio::test]
async fn failing_sink_never_stalls_the_monitors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    // A sink that rejects everything
    let sink = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&sink)
        .await;

    let (formatter, writer) =
        build_output(&create_output_config(&sink.uri(), "json")).unwrap();

    let (tx, rx) = bus::channel();
    let producer = ProducerHandle::spawn(rx, formatter, writer);

    let config = create_monitor_config(&server.uri(), "25ms", "5ms");
    let handle = Monitor::from_config(0, &config).unwrap().start(tx.clone());
    drop(tx);

    // Probing keeps going although every write fails
    let mut failed = 0;
    for _ in 0..100 {
        failed = producer.get_stats().await.unwrap().failed;
        if failed >= 3 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(failed >= 3, "only {failed} failed deliveries recorded");

    handle.shutdown().await;
    producer.shutdown().await;
}

#[tokio::test]
async fn slow_sink_backpressure_skips_ticks_instead_of_bursting() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    // Every write takes ~150ms while the monitor ticks every 25ms
    let sink = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(150)))
        .mount(&sink)
        .await;

    let (formatter, writer) =
        build_output(&create_output_config(&sink.uri(), "json")).unwrap();

    let (tx, rx) = bus::channel();
    let producer = ProducerHandle::spawn(rx, formatter, writer);

    let config = create_monitor_config(&server.uri(), "25ms", "5ms");
    let handle = Monitor::from_config(0, &config).unwrap().start(tx.clone());

    tokio::time::sleep(Duration::from_millis(600)).await;
    handle.shutdown().await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    // The test's own sender `tx` keeps the bus open, so the producer is
    // still around to answer.
    //
    // ~600ms / 150ms per write: around 4 deliveries. Far fewer than the
    // 24 the raw tick rate would produce, and no burst after release.
    let stats = producer.get_stats().await.unwrap();
    assert!(stats.delivered >= 2, "got {}", stats.delivered);
    assert!(stats.delivered <= 8, "got {}", stats.delivered);

    producer.shutdown().await;
    drop(tx);
}

#[tokio::test]
async fn shutdown_mid_probe_still_terminates_the_task() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
        .mount(&server)
        .await;

    let config = create_monitor_config(&server.uri(), "1s", "500ms");
    let (tx, mut rx) = bus::channel();
    let handle = Monitor::from_config(0, &config).unwrap().start(tx);

    // Let the first probe get in flight, then stop
    tokio::time::sleep(Duration::from_millis(50)).await;
    handle.shutdown().await;

    // The task finishes its in-flight probe and exits, closing the bus.
    // Drain whatever still comes out.
    let closed = tokio::time::timeout(Duration::from_secs(2), async {
        while rx.recv().await.is_some() {}
    })
    .await;
    assert!(closed.is_ok(), "monitor task kept the bus open");
}

#[tokio::test]
async fn config_file_problems_surface_as_errors() {
    assert!(read_config_file("/definitely/not/here.json").is_err());

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"{ not json").unwrap();
    assert!(read_config_file(file.path().to_str().unwrap()).is_err());
}
