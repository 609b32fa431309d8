use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use movierank_core::catalog::{DEFAULT_CATALOG_PATH, MovieCatalog};
use movierank_core::config::{EngineConfig, ProducerConfig, SourceConfig};
use movierank_core::pipeline::{loopback_for, start_aggregator, start_producer};
use movierank_core::sink::ConsoleSink;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "movierank")]
#[command(about = "Live most-rated movie rankings over sliding windows", long_about = None)]
struct Cli {
    /// Log filter, e.g. `debug` or `movierank_core=debug`; falls back to RUST_LOG, then `info`.
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate ratings and serve them to one TCP consumer at a time.
    Produce {
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        #[arg(long, default_value_t = 9999)]
        port: u16,
        #[command(flatten)]
        generator: GeneratorArgs,
    },
    /// Read the rating stream and print windowed rankings.
    Aggregate {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 9999)]
        port: u16,
        #[arg(long, default_value_t = 1000)]
        reconnect_delay_ms: u64,
        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Producer and aggregator in one process over loopback.
    Run {
        #[arg(long, default_value_t = 9999)]
        port: u16,
        #[command(flatten)]
        generator: GeneratorArgs,
        #[command(flatten)]
        engine: EngineArgs,
    },
}

#[derive(Args, Debug)]
struct GeneratorArgs {
    #[arg(long, default_value = DEFAULT_CATALOG_PATH)]
    catalog: PathBuf,
    #[arg(long, default_value_t = 100)]
    min_delay_ms: u64,
    #[arg(long, default_value_t = 500)]
    max_delay_ms: u64,
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct EngineArgs {
    #[arg(long, default_value_t = 600)]
    window_secs: u64,
    #[arg(long, default_value_t = 60)]
    slide_secs: u64,
    #[arg(long, default_value_t = 20)]
    num_rows: usize,
    #[arg(long)]
    retention_secs: Option<u64>,
    /// Add a title column resolved through the catalog.
    #[arg(long)]
    titles: Option<PathBuf>,
}

impl GeneratorArgs {
    fn producer_config(&self, host: String, port: u16) -> ProducerConfig {
        ProducerConfig {
            host,
            port,
            catalog_path: self.catalog.clone(),
            min_delay: Duration::from_millis(self.min_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            seed: self.seed,
            ..ProducerConfig::default()
        }
    }
}

impl EngineArgs {
    fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            window: Duration::from_secs(self.window_secs),
            slide: Duration::from_secs(self.slide_secs),
            num_rows: self.num_rows,
            retention: self.retention_secs.map(Duration::from_secs),
        }
    }

    fn console_sink(&self, catalog: Option<Arc<MovieCatalog>>) -> ConsoleSink<std::io::Stdout> {
        let sink = ConsoleSink::stdout(self.num_rows);
        let catalog = catalog.or_else(|| {
            self.titles
                .as_ref()
                .map(|path| Arc::new(MovieCatalog::load_or_default(path)))
        });
        match catalog {
            Some(catalog) => sink.with_catalog(catalog),
            None => sink,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());
    let shutdown = shutdown_on_ctrl_c();

    match cli.command {
        Commands::Produce {
            host,
            port,
            generator,
        } => {
            let config = generator.producer_config(host, port);
            let catalog = Arc::new(MovieCatalog::load_or_default(&config.catalog_path));
            let producer = start_producer(&config, catalog, shutdown).await?;
            info!(addr = %producer.local_addr, "producer started");
            let stats = Arc::clone(&producer.stats);
            producer.join().await?;
            info!(
                published = stats.published(),
                discarded = stats.discarded(),
                "producer stopped"
            );
        }
        Commands::Aggregate {
            host,
            port,
            reconnect_delay_ms,
            engine,
        } => {
            let source = SourceConfig {
                host,
                port,
                reconnect_delay: Duration::from_millis(reconnect_delay_ms),
                ..SourceConfig::default()
            };
            let sink = engine.console_sink(None);
            let aggregator = start_aggregator(&source, &engine.engine_config(), sink, shutdown)?;
            aggregator.join().await?;
        }
        Commands::Run {
            port,
            generator,
            engine,
        } => {
            let config = generator.producer_config(ProducerConfig::default().host, port);
            let catalog = Arc::new(MovieCatalog::load_or_default(&config.catalog_path));
            let engine_config = engine.engine_config();
            engine_config.validate()?;

            let producer = start_producer(&config, Arc::clone(&catalog), shutdown.clone()).await?;
            let addr = loopback_for(producer.local_addr)?;
            let source = SourceConfig {
                host: addr.ip().to_string(),
                port: addr.port(),
                ..SourceConfig::default()
            };
            let titles = engine.titles.is_some().then_some(catalog);
            let sink = engine.console_sink(titles);
            let aggregator = start_aggregator(&source, &engine_config, sink, shutdown)?;

            let engine = aggregator.join().await?;
            producer.join().await?;
            let stats = engine.stats();
            info!(
                accepted = stats.accepted,
                dropped = stats.dropped,
                "pipeline stopped"
            );
        }
    }
    Ok(())
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn shutdown_on_ctrl_c() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
            return;
        }
        info!("shutting down");
        let _ = tx.send(true);
    });
    rx
}
