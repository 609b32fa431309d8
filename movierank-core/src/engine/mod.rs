//! Windowed rating-count aggregation.
//!
//! - [`WindowCounts`]: the `(window, movieId) -> count` map.
//! - [`AggregationEngine`]: assigns each event to its sliding windows,
//!   increments counts and produces fully ordered [`Snapshot`]s.
//! - [`EngineWorker`]: single owner of an engine; folds incoming stream
//!   lines into it and publishes a snapshot to a sink every slide.

use std::cmp::Ordering;
use std::time::Duration;

use ahash::AHashMap;
use anyhow::Result;
use serde::Serialize;
use tokio::sync::{mpsc, watch};

use crate::error::RecordError;
use crate::sink::ResultSink;
use crate::types::{EventTime, MovieId, RatingEvent};
use crate::window::{SlidingEventTimeWindows, TimeWindow, WindowAssigner};

mod aggregation;
mod snapshot;
mod state;
mod worker;

pub use aggregation::*;
pub use snapshot::*;
pub use state::*;
pub use worker::*;

#[cfg(test)]
#[path = "tests/engine_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "tests/worker_tests.rs"]
mod worker_tests;
