//! Cross-exchange arbitrage detector entry point.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tokio::net::TcpListener;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cross_exchange_arb::api::{create_router, AppState};
use cross_exchange_arb::arbitrage::{CancellationFlag, DetectionCycle, DetectionOrchestrator};
use cross_exchange_arb::catalog::{AssetCatalog, ExchangeCatalog};
use cross_exchange_arb::config::{Config, WindowAnchor};
use cross_exchange_arb::error::DetectionError;
use cross_exchange_arb::metrics;
use cross_exchange_arb::report::{render_table, CsvSink, CycleSummary, OpportunitySink};
use cross_exchange_arb::ticks::{
    JsonFileSource, PriceTickStore, SyntheticConfig, SyntheticTickSource, TickSource,
};
use cross_exchange_arb::utils::shutdown_signal;

/// Cross-exchange crypto arbitrage detector.
#[derive(Parser, Debug)]
#[command(name = "arb-scan")]
#[command(about = "Detects fee-adjusted price spreads for the same asset across exchanges")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port for ingestion/results/metrics.
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API and run detection on an interval (default).
    Run {
        /// HTTP server port for ingestion/results/metrics.
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run one detection cycle over a recorded tick file.
    Scan {
        /// Recorded ticks (JSON array).
        #[arg(long)]
        ticks: PathBuf,

        /// Exchange reference feed; defaults to EXCHANGES_FILE.
        #[arg(long)]
        exchanges: Option<PathBuf>,

        /// Asset reference feed; defaults to ASSETS_FILE.
        #[arg(long)]
        assets: Option<PathBuf>,

        /// Minimum gross profit percentage; defaults to MIN_PROFIT_PCT.
        #[arg(long)]
        min_profit_pct: Option<Decimal>,

        /// Freshness window in seconds; defaults to MAX_AGE_SECONDS.
        #[arg(long)]
        max_age_seconds: Option<u64>,

        /// Window anchor (latest-tick or now); defaults to WINDOW_ANCHOR.
        #[arg(long)]
        anchor: Option<WindowAnchor>,

        /// Reference instant (RFC 3339); defaults to the current time.
        #[arg(long, value_parser = parse_rfc3339)]
        at: Option<OffsetDateTime>,

        /// Write CSV to stdout instead of a table.
        #[arg(long)]
        csv: bool,
    },

    /// Feed a seeded synthetic market through the detector.
    Simulate {
        /// RNG seed.
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Number of quote rounds to generate.
        #[arg(long, default_value = "10")]
        rounds: usize,

        /// Write every round's opportunities as CSV to stdout.
        #[arg(long)]
        csv: bool,
    },

    /// Check configuration and reference data.
    CheckConfig,
}

fn parse_rfc3339(s: &str) -> Result<OffsetDateTime, time::error::Parse> {
    OffsetDateTime::parse(s, &Rfc3339)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging; stdout is reserved for reports. Config errors are
    // reported by the subcommands once logging is up.
    let log_config = Config::load().unwrap_or_default();
    let filter = EnvFilter::try_new(log_config.log_filter(args.verbose))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    if args.log_json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }

    // Handle subcommands
    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(),
        Some(Command::Scan {
            ticks,
            exchanges,
            assets,
            min_profit_pct,
            max_age_seconds,
            anchor,
            at,
            csv,
        }) => {
            metrics::init_metrics();
            let mut config = load_config()?;
            if let Some(path) = exchanges {
                config.exchanges_file = path;
            }
            if let Some(path) = assets {
                config.assets_file = path;
            }
            if let Some(pct) = min_profit_pct {
                config.min_profit_pct = pct;
            }
            if let Some(secs) = max_age_seconds {
                config.max_age_seconds = secs;
            }
            if let Some(anchor) = anchor {
                config.window_anchor = anchor;
            }
            cmd_scan(&config, ticks, at.unwrap_or_else(OffsetDateTime::now_utc), csv)
        }
        Some(Command::Simulate { seed, rounds, csv }) => {
            metrics::init_metrics();
            cmd_simulate(&load_config()?, seed, rounds, csv)
        }
        Some(Command::Run { port }) => cmd_run(port.or(args.port)).await,
        None => cmd_run(args.port).await,
    }
}

/// Load and validate configuration.
fn load_config() -> anyhow::Result<Config> {
    let config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    Ok(config)
}

/// Load the exchange catalog and, if present, the asset catalog.
fn load_catalogs(config: &Config) -> anyhow::Result<(ExchangeCatalog, AssetCatalog)> {
    let exchanges = ExchangeCatalog::from_json_file(&config.exchanges_file)?;

    let assets = match AssetCatalog::from_json_file(&config.assets_file) {
        Ok(assets) => assets,
        Err(e) => {
            warn!(
                path = %config.assets_file.display(),
                "Asset catalog unavailable, using raw IDs: {}", e
            );
            AssetCatalog::default()
        }
    };

    Ok((exchanges, assets))
}

/// Check configuration validity.
fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("ARB SCANNER - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    print!("Loading exchange catalog... ");
    let exchanges = match ExchangeCatalog::from_json_file(&config.exchanges_file) {
        Ok(c) => {
            println!("OK ({} exchanges)", c.len());
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Exchange catalog invalid"));
        }
    };

    print!("Loading asset catalog... ");
    match AssetCatalog::from_json_file(&config.assets_file) {
        Ok(c) => println!("OK ({} assets)", c.len()),
        Err(e) => println!("SKIPPED ({})", e),
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Min Profit: {}%", config.min_profit_pct);
    println!("  Max Age: {}s", config.max_age_seconds);
    println!("  Window Anchor: {}", config.window_anchor);
    println!("  Scan Interval: {}ms", config.scan_interval_ms);
    println!("  Port: {}", config.port);
    println!("  Exchanges:");
    for id in exchanges.ids() {
        if let Some(exchange) = exchanges.get(id) {
            println!(
                "    {:<10} fee={}% tier={} effective={}%",
                exchange.id,
                exchange.fee_rate,
                exchange.fee_tier,
                exchange.effective_fee()
            );
        }
    }
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Print a cycle as a table with its summary and skip records.
fn print_cycle(cycle: &DetectionCycle, assets: &AssetCatalog) {
    print!("{}", render_table(&cycle.opportunities, assets));
    println!("{}", CycleSummary::from_cycle(cycle));
    for skipped in &cycle.skipped {
        println!("  skipped: {}", skipped.message);
    }
}

/// Run one detection cycle over recorded ticks.
fn cmd_scan(config: &Config, ticks: PathBuf, now: OffsetDateTime, csv: bool) -> anyhow::Result<()> {
    let (exchanges, assets) = load_catalogs(config)?;
    let orchestrator = DetectionOrchestrator::new(Arc::new(exchanges));

    let store = PriceTickStore::new();
    let mut source = JsonFileSource::open(&ticks)?;
    let report = store.append_batch(source.next_batch());
    for rejected in &report.rejected {
        warn!(index = rejected.index, "Tick rejected: {}", rejected.reason);
    }
    info!(accepted = report.accepted, rejected = report.rejected.len(), "Ticks loaded");

    let cycle = match orchestrator.run(
        &store.view(),
        &config.detection_params(),
        now,
        &CancellationFlag::new(),
    ) {
        Ok(cycle) => cycle,
        Err(DetectionError::NoData) => {
            info!("No price data in window");
            DetectionCycle::empty(now)
        }
        Err(e) => return Err(e.into()),
    };

    if csv {
        let mut sink = CsvSink::new(std::io::stdout());
        sink.publish(&cycle.opportunities)?;
        sink.into_inner()?;
    } else {
        print_cycle(&cycle, &assets);
    }

    Ok(())
}

/// Feed a seeded synthetic market through the detector, one cycle per round.
fn cmd_simulate(config: &Config, seed: u64, rounds: usize, csv: bool) -> anyhow::Result<()> {
    let (exchanges, assets) = load_catalogs(config)?;
    let orchestrator = DetectionOrchestrator::new(Arc::new(exchanges));
    let params = config.detection_params();
    let cancel = CancellationFlag::new();

    let start = OffsetDateTime::now_utc().replace_nanosecond(0)?;
    let mut source = SyntheticTickSource::new(SyntheticConfig::with_seed(seed, start));
    let store = PriceTickStore::new();
    let mut sink = csv.then(|| CsvSink::new(std::io::stdout()));
    let mut last = None;

    info!(seed, rounds, "Starting simulation");

    for round in 0..rounds {
        let now = source.next_timestamp();
        let report = store.append_batch(source.next_batch());
        debug!(round, accepted = report.accepted, "Round generated");

        let cycle = match orchestrator.run(&store.view(), &params, now, &cancel) {
            Ok(cycle) => cycle,
            Err(DetectionError::NoData) => DetectionCycle::empty(now),
            Err(e) => return Err(e.into()),
        };

        info!(round, "{}", CycleSummary::from_cycle(&cycle));
        if let Some(sink) = sink.as_mut() {
            sink.publish(&cycle.opportunities)?;
        }
        last = Some(cycle);
    }

    match (sink, last) {
        (Some(sink), _) => {
            sink.into_inner()?;
        }
        (None, Some(cycle)) => print_cycle(&cycle, &assets),
        (None, None) => println!("No rounds generated"),
    }

    Ok(())
}

/// Serve the HTTP API and run detection on an interval.
async fn cmd_run(port_override: Option<u16>) -> anyhow::Result<()> {
    info!("Loading configuration...");
    let mut config = load_config()?;
    if let Some(port) = port_override {
        config.port = port;
    }

    let exchanges = ExchangeCatalog::from_json_file(&config.exchanges_file)?;
    info!("Configuration loaded successfully");
    info!("Exchanges: {}", exchanges.len());
    info!("Min profit: {}%", config.min_profit_pct);
    info!("Max age: {}s ({})", config.max_age_seconds, config.window_anchor);
    info!("Scan interval: {}ms", config.scan_interval_ms);

    // Tick store, optionally preloaded
    let store = Arc::new(PriceTickStore::new());
    if let Some(path) = &config.ticks_file {
        let mut source = JsonFileSource::open(path)?;
        let report = store.append_batch(source.next_batch());
        info!(
            accepted = report.accepted,
            rejected = report.rejected.len(),
            "Preloaded ticks from {}",
            path.display()
        );
    }

    // Create app state
    let prometheus = metrics::install_prometheus()?;
    let app_state = AppState::new(Arc::clone(&store)).with_metrics(prometheus);

    // Start HTTP server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    let router = create_router(app_state.clone());
    let cancel = CancellationFlag::new();
    let server_cancel = cancel.clone();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown_signal().await;
                server_cancel.cancel();
            })
            .await
    });

    // Detection loop
    let orchestrator = DetectionOrchestrator::new(Arc::new(exchanges));
    let params = config.detection_params();
    let mut interval = tokio::time::interval(config.scan_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!("Starting detection loop...");

    while !cancel.is_cancelled() {
        interval.tick().await;

        let now = OffsetDateTime::now_utc();
        // The orchestrator drops ticks after `now` itself.
        let view = store.view();
        let outcome = {
            let orchestrator = orchestrator.clone();
            let params = params.clone();
            let cancel = cancel.clone();
            tokio::task::spawn_blocking(move || orchestrator.run(&view, &params, now, &cancel))
                .await?
        };

        match &outcome {
            Ok(cycle) => debug!("{}", CycleSummary::from_cycle(cycle)),
            Err(DetectionError::NoData) => debug!("No price data in window"),
            Err(DetectionError::Cancelled) => info!("Detection cycle cancelled"),
            Err(e) => error!("Detection cycle failed: {}", e),
        }

        app_state.publish(outcome, now).await;
    }

    info!("Waiting for HTTP server to stop...");
    server_handle.await??;
    info!("Shutdown complete");

    Ok(())
}
