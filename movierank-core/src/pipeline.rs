//! Wiring of the producer and aggregator halves.
//!
//! Every collaborator (catalog, sink, shutdown signal) is built by the
//! caller and passed in; nothing here is global.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;

use crate::catalog::MovieCatalog;
use crate::config::{EngineConfig, ProducerConfig, SourceConfig};
use crate::engine::{AggregationEngine, EngineWorker};
use crate::generator::{GeneratorStats, RatingGenerator};
use crate::network::{StreamServer, StreamSource};
use crate::sink::ResultSink;

/// A running generator plus the server handing its events to a consumer.
pub struct ProducerHandle {
    pub local_addr: SocketAddr,
    pub stats: Arc<GeneratorStats>,
    generator: JoinHandle<()>,
    server: JoinHandle<Result<()>>,
}

impl ProducerHandle {
    /// True once the generator or the server has stopped.
    pub fn is_finished(&self) -> bool {
        self.generator.is_finished() || self.server.is_finished()
    }

    /// Wait for both tasks to finish after shutdown.
    pub async fn join(self) -> Result<()> {
        self.server.await??;
        self.generator.await?;
        Ok(())
    }
}

/// Bind the stream server and start generating.
///
/// Fails without spawning anything if the configuration is invalid or the
/// listening socket cannot be bound.
pub async fn start_producer(
    config: &ProducerConfig,
    catalog: Arc<MovieCatalog>,
    shutdown: watch::Receiver<bool>,
) -> Result<ProducerHandle> {
    config.validate()?;
    let (events, _) = broadcast::channel(config.buffer.max(1));
    let server = StreamServer::bind(&config.bind_addr(), &events).await?;
    let local_addr = server.local_addr()?;

    let generator = match config.seed {
        Some(seed) => RatingGenerator::seeded(catalog, seed),
        None => RatingGenerator::from_entropy(catalog),
    }
    .with_delay_range(config.min_delay, config.max_delay);

    let (stats, generator) = generator.spawn(events, shutdown.clone());
    let server = tokio::spawn(server.serve(shutdown));
    Ok(ProducerHandle {
        local_addr,
        stats,
        generator,
        server,
    })
}

/// The stream reader plus the engine worker it feeds.
pub struct AggregatorHandle {
    source: JoinHandle<Result<()>>,
    worker: JoinHandle<Result<AggregationEngine>>,
}

impl AggregatorHandle {
    /// Wait for shutdown to complete; returns the engine with its final state.
    pub async fn join(self) -> Result<AggregationEngine> {
        self.source.await??;
        self.worker.await?
    }
}

/// Connect to the stream and start aggregating into `sink`.
pub fn start_aggregator<S: ResultSink + 'static>(
    source: &SourceConfig,
    engine: &EngineConfig,
    sink: S,
    shutdown: watch::Receiver<bool>,
) -> Result<AggregatorHandle> {
    engine.validate()?;
    let mut aggregation = AggregationEngine::new(engine.assigner()?);
    if let Some(retention) = engine.retention {
        aggregation = aggregation.with_retention(retention);
    }

    let (lines_tx, lines_rx) = mpsc::channel(source.buffer.max(1));
    let worker = EngineWorker::new(aggregation, sink, lines_rx);
    let worker = tokio::spawn(worker.run(shutdown.clone()));
    let source = tokio::spawn(StreamSource::new(source).run(lines_tx, shutdown));
    Ok(AggregatorHandle { source, worker })
}

/// Resolve a wildcard bind address to one a local client can connect to.
pub fn loopback_for(addr: SocketAddr) -> Result<SocketAddr> {
    if addr.port() == 0 {
        return Err(anyhow!("address {addr} has no port"));
    }
    let mut addr = addr;
    if addr.ip().is_unspecified() {
        addr.set_ip(std::net::Ipv4Addr::LOCALHOST.into());
    }
    Ok(addr)
}
