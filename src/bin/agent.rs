use clap::Parser;
use endpoint_monitoring::{
    actors::producer::ProducerHandle, bus, config::read_config_file, monitor::Monitor,
    output::build_output,
};
use futures::future::join_all;
use tracing::{debug, error, info, level_filters::LevelFilter, trace, warn};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Config file
    #[arg(short)]
    file: String,
}

fn init() {
    dotenv::dotenv().ok();

    let filter = filter::Targets::new().with_targets(vec![
        ("endpoint_monitoring", LevelFilter::TRACE),
        ("guardia_probe", LevelFilter::TRACE),
    ]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init();
    let args = Args::parse();
    trace!("started with args: {args:?}");

    let config = read_config_file(&args.file)?;

    let output = config.output.clone().unwrap_or_default();
    let (formatter, writer) = build_output(&output)?;

    let (bus_tx, bus_rx) = bus::channel();

    // The producer must be draining before the first monitor ticks
    let producer = ProducerHandle::spawn(bus_rx, formatter, writer);

    let mut monitors = Vec::new();
    for (id, monitor_config) in config.monitors.iter().flatten().enumerate() {
        match Monitor::from_config(id, monitor_config) {
            Ok(monitor) => {
                info!(monitor = %monitor.name(), "starting monitor");
                monitors.push(monitor.start(bus_tx.clone()));
            }
            Err(e) => {
                error!("skipping monitor #{id}: {e:#}");
            }
        }
    }

    if monitors.is_empty() {
        warn!("no usable monitor configured");
    }

    // Only the monitor tasks hold bus senders from here on, so the bus
    // closes exactly when the last of them exits
    drop(bus_tx);

    info!(monitors = monitors.len(), "agent started");

    tokio::signal::ctrl_c().await?;
    info!("shutting down");

    join_all(monitors.into_iter().map(|monitor| monitor.shutdown())).await;

    if let Ok(stats) = producer.get_stats().await {
        debug!(
            delivered = stats.delivered,
            failed = stats.failed,
            "final delivery counters"
        );
    }
    producer.shutdown().await;

    Ok(())
}
