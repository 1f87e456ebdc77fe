use std::error::Error;
use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use bike_monitor::analysis::RankingAnalyzer;
use bike_monitor::cache::{CacheConfig, CachedQueries};
use bike_monitor::citybikes::{CityBikesClient, Feed, MockCityBikesClient};
use bike_monitor::config::Config;
use bike_monitor::domain::NetworkSummary;
use bike_monitor::ingest::IngestionCycle;
use bike_monitor::logging;
use bike_monitor::report::{format_latest, format_ranking_table};
use bike_monitor::scheduler::Scheduler;
use bike_monitor::store::SnapshotStore;
use bike_monitor::web::{AppState, create_router};

/// bike-monitor: collect and rank bike-share station availability.
#[derive(Parser)]
#[command(name = "bike-monitor", version, about)]
struct Cli {
    /// SQLite database file.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// CityBikes network endpoint.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Serve this saved API response instead of calling the network.
    #[arg(long, global = true)]
    mock_data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect continuously until interrupted, logging a ranking after each cycle.
    Run {
        /// Seconds between cycles.
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Run a single ingestion cycle.
    Once,

    /// Print the station ranking over the stored history.
    Rank {
        /// Number of stations to show.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Print the most recent snapshot.
    Latest,

    /// Serve the JSON API.
    Serve {
        /// Listen address.
        #[arg(long)]
        bind: Option<SocketAddr>,

        /// Also collect continuously in the background.
        #[arg(long)]
        poll: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    let cli = Cli::parse();
    let config = match Config::from_env() {
        Ok(config) => apply_overrides(config, &cli),
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    match run(cli.command, cli.mock_data, config).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "fatal error");
            ExitCode::FAILURE
        }
    }
}

fn apply_overrides(mut config: Config, cli: &Cli) -> Config {
    if let Some(db) = &cli.db {
        config = config.with_db_path(db);
    }
    if let Some(url) = &cli.api_url {
        config = config.with_api_url(url);
    }
    match &cli.command {
        Commands::Run {
            interval: Some(secs),
        } => config.with_poll_interval(Duration::from_secs((*secs).max(1))),
        Commands::Rank { limit: Some(limit) } => config.with_ranking_limit(*limit),
        Commands::Serve {
            bind: Some(addr), ..
        } => config.with_bind_addr(*addr),
        _ => config,
    }
}

async fn run(
    command: Commands,
    mock_data: Option<PathBuf>,
    config: Config,
) -> Result<ExitCode, Box<dyn Error>> {
    let store = SnapshotStore::new(&config.db_path);
    let analyzer = RankingAnalyzer::new(store.clone());

    match command {
        Commands::Rank { .. } => {
            let ranking = analyzer.compute_ranking(config.ranking_limit)?;
            println!("{}", format_ranking_table(&ranking));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Latest => {
            let rows = store.read_latest()?;
            let summary = NetworkSummary::from_cycle(&rows);
            println!("{}", format_latest(summary.as_ref(), &rows));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Run { .. } => {
            let shutdown = shutdown_signal()?;
            let scheduler = build_scheduler(mock_data, &config, store, analyzer)?;
            info!(
                interval_secs = config.poll_interval.as_secs(),
                "starting bike station monitor"
            );
            scheduler.run_continuous(shutdown).await;
            info!("data collection stopped by user");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Once => {
            let scheduler = build_scheduler(mock_data, &config, store, analyzer)?;
            match scheduler.trigger().await {
                Ok(report) => {
                    info!(
                        inserted = report.inserted,
                        snapshot_time = %report.snapshot_time,
                        "ingestion cycle succeeded"
                    );
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    error!(error = %e, "ingestion cycle failed");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Serve { poll, .. } => {
            let shutdown = shutdown_signal()?;
            let scheduler = build_scheduler(mock_data, &config, store.clone(), analyzer.clone())?;
            if poll {
                let background = scheduler.clone();
                tokio::spawn(async move {
                    background.run_continuous(std::future::pending()).await;
                });
            }

            let cache_config = CacheConfig {
                latest_ttl: config.poll_interval,
                ..CacheConfig::default()
            };
            let queries = CachedQueries::new(store, analyzer, &cache_config);
            let app = create_router(AppState::new(scheduler, queries));

            let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
            info!(addr = %config.bind_addr, "bike-monitor API listening");
            info!("  GET  /health");
            info!("  GET  /api/stations/latest");
            info!("  GET  /api/ranking?limit=N");
            info!("  POST /api/ingest");

            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await?;
            info!("server stopped");
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Wire the feed, cycle and scheduler for commands that ingest.
fn build_scheduler(
    mock_data: Option<PathBuf>,
    config: &Config,
    store: SnapshotStore,
    analyzer: RankingAnalyzer,
) -> Result<Arc<Scheduler<Feed>>, Box<dyn Error>> {
    let feed = match mock_data {
        Some(path) => Feed::Mock(MockCityBikesClient::new(path)?),
        None => Feed::Live(CityBikesClient::new(config.citybikes())?),
    };
    info!(%feed, db = %config.db_path.display(), "pipeline configured");

    Ok(Arc::new(Scheduler::new(
        IngestionCycle::new(feed, store),
        analyzer,
        config.poll_interval,
        config.ranking_limit,
    )))
}

/// Install interrupt handlers and return a future that resolves on the
/// first SIGINT or SIGTERM.
///
/// The handlers are registered before this returns, so an interrupt that
/// arrives while the first cycle is still running is not lost. A second
/// interrupt exits at once.
#[cfg(unix)]
fn shutdown_signal() -> std::io::Result<impl Future<Output = ()> + Send + 'static> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    Ok(async move {
        tokio::select! {
            _ = sigint.recv() => info!("received SIGINT; shutting down"),
            _ = sigterm.recv() => info!("received SIGTERM; shutting down"),
        }

        tokio::spawn(async move {
            sigint.recv().await;
            warn!("second interrupt; exiting immediately");
            std::process::exit(130);
        });
    })
}

#[cfg(windows)]
fn shutdown_signal() -> std::io::Result<impl Future<Output = ()> + Send + 'static> {
    let mut ctrl_c = tokio::signal::windows::ctrl_c()?;

    Ok(async move {
        ctrl_c.recv().await;
        info!("received Ctrl-C; shutting down");

        tokio::spawn(async move {
            ctrl_c.recv().await;
            warn!("second interrupt; exiting immediately");
            std::process::exit(130);
        });
    })
}
