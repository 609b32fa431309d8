//! Pipeline parameters and their defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::catalog::DEFAULT_CATALOG_PATH;
use crate::error::ConfigError;
use crate::window::SlidingEventTimeWindows;

/// Settings for the generator and the stream server.
#[derive(Debug, Clone)]
pub struct ProducerConfig {
    pub host: String,
    pub port: u16,
    pub catalog_path: PathBuf,
    pub min_delay: Duration,
    pub max_delay: Duration,
    /// Fixed RNG seed for a reproducible stream; entropy when `None`.
    pub seed: Option<u64>,
    /// Events buffered per consumer before a slow client starts skipping.
    pub buffer: usize,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9999,
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            min_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(500),
            seed: None,
            buffer: 1024,
        }
    }
}

impl ProducerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_delay > self.max_delay {
            return Err(ConfigError::DelayRange {
                min_ms: self.min_delay.as_millis() as u64,
                max_ms: self.max_delay.as_millis() as u64,
            });
        }
        Ok(())
    }
}

/// Where the aggregator reads its stream from.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub host: String,
    pub port: u16,
    pub reconnect_delay: Duration,
    /// Lines queued between the socket reader and the engine.
    pub buffer: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9999,
            reconnect_delay: Duration::from_secs(1),
            buffer: 4096,
        }
    }
}

impl SourceConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Window shape and presentation for the aggregation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Window duration `W`.
    pub window: Duration,
    /// Slide interval `S`, also the trigger period.
    pub slide: Duration,
    /// Rows rendered per snapshot.
    pub num_rows: usize,
    /// Retire windows ending this far behind the latest event; keep all when `None`.
    pub retention: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(600),
            slide: Duration::from_secs(60),
            num_rows: 20,
            retention: None,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.assigner()?;
        if self.num_rows == 0 {
            return Err(ConfigError::ZeroRows);
        }
        Ok(())
    }

    pub fn assigner(&self) -> Result<SlidingEventTimeWindows, ConfigError> {
        SlidingEventTimeWindows::of(self.window, self.slide)
    }
}
