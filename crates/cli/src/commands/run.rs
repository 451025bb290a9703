//! `run` command implementation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use config_loader::ConfigLoader;
use contracts::{EndpointTarget, MetricSource};
use dispatcher::ReporterDispatcher;
use observability::ReportStatsAggregator;
use registry::MetricRegistry;
use tracing::{error, info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;

/// Gauge holding seconds since the process started
pub const UPTIME_GAUGE: &str = "tsdb_fanout.process.uptime_seconds";
/// Timer measuring `--report-now` reports
pub const REPORT_NOW_TIMER: &str = "tsdb_fanout.report_now";

/// Execute the `run` command
pub async fn run_reporters(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        return Err(CliError::config_not_found(&args.config).into());
    }

    let config = ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    let targets = ConfigLoader::targets(&config).context("Failed to read endpoint list")?;
    let options =
        ConfigLoader::reporter_options(&config).context("Failed to build reporter options")?;

    info!(
        targets = targets.len(),
        period = ?options.period(),
        prefix = %options.prefix,
        transport = ?config.transport.transport_type,
        "Configuration loaded"
    );

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let started_at = Instant::now();
    let registry = Arc::new(MetricRegistry::new());
    let uptime = registry.gauge(UPTIME_GAUGE);
    uptime.set(0.0);

    let mut dispatcher = dispatcher::create_dispatcher(&config);
    let source: Arc<dyn MetricSource> = registry.clone();
    let all_started = dispatcher.enable(source, &targets, &options).await;
    record_enable_results(&dispatcher, &targets);

    if !all_started {
        let failed = targets.len() - dispatcher.len();
        warn!(failed, total = targets.len(), "Not every endpoint started");
        if args.strict {
            dispatcher.stop().await;
            return Err(CliError::partial_start(failed, targets.len()).into());
        }
    }

    let mut stats = ReportStatsAggregator::new();
    if args.report_now {
        let timer = registry.timer(REPORT_NOW_TIMER);
        let _guard = timer.time();
        report_now(&dispatcher, &mut stats).await;
    }

    info!(active = dispatcher.len(), "Reporters running, press Ctrl+C to stop");

    let shutdown_signal = setup_shutdown_signal();
    tokio::pin!(shutdown_signal);
    let mut housekeeping = tokio::time::interval(Duration::from_secs(1));

    loop {
        tokio::select! {
            _ = &mut shutdown_signal => {
                warn!("Received shutdown signal, stopping reporters...");
                break;
            }
            _ = housekeeping.tick() => {
                uptime.set(started_at.elapsed().as_secs_f64());
                export_reporter_counters(&dispatcher);
            }
        }
    }

    export_reporter_counters(&dispatcher);
    print_summary(&dispatcher, &stats, started_at.elapsed());
    dispatcher.stop().await;
    observability::record_active_reporters(0);

    info!("tsdb-fanout finished");
    Ok(())
}

/// Report to every endpoint once; failures are logged, not fatal
async fn report_now(dispatcher: &ReporterDispatcher, stats: &mut ReportStatsAggregator) {
    let start = Instant::now();
    let result = dispatcher.report().await;
    stats.update(result.is_ok(), start.elapsed());

    match result {
        Ok(()) => info!(reporters = dispatcher.len(), "Immediate report sent"),
        Err(e) => error!(error = %e, "Immediate report failed"),
    }
}

fn record_enable_results(dispatcher: &ReporterDispatcher, targets: &[EndpointTarget]) {
    let active = dispatcher.active_targets();
    for target in targets {
        observability::record_reporter_enabled(&target.to_string(), active.contains(&target));
    }
    observability::record_active_reporters(dispatcher.len());
}

fn export_reporter_counters(dispatcher: &ReporterDispatcher) {
    for (target, snapshot) in dispatcher.metrics() {
        observability::record_reporter_counters(
            &target,
            snapshot.report_count,
            snapshot.failure_count,
            snapshot.points_sent,
        );
    }
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn print_summary(dispatcher: &ReporterDispatcher, stats: &ReportStatsAggregator, elapsed: Duration) {
    println!("\n=== Reporter Summary ===\n");
    println!("Uptime: {:.2}s", elapsed.as_secs_f64());
    println!("Active reporters: {}", dispatcher.len());
    for (target, snapshot) in dispatcher.metrics() {
        println!(
            "  - {}: {} reports, {} failures, {} points",
            target, snapshot.report_count, snapshot.failure_count, snapshot.points_sent
        );
    }
    println!("\n{}\n", stats.summary());
}
