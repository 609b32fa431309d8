//! # MovieRank Core
//!
//! Live "most-rated movies" rankings over a stream of rating events.
//!
//! - [`generator`]: [`RatingGenerator`](generator::RatingGenerator),
//!   synthetic ratings at randomized intervals.
//! - [`network`]: [`StreamServer`](network::StreamServer), serving the
//!   newline-delimited JSON stream to one consumer at a time, and
//!   [`StreamSource`](network::StreamSource), the reconnecting reader.
//! - [`window`]: [`TimeWindow`](window::TimeWindow) and
//!   [`SlidingEventTimeWindows`](window::SlidingEventTimeWindows).
//! - [`engine`]: [`AggregationEngine`](engine::AggregationEngine) and the
//!   periodic [`EngineWorker`](engine::EngineWorker).
//! - [`sink`]: [`ResultSink`](sink::ResultSink) implementations.
//! - [`pipeline`]: wiring for the producer and aggregator halves.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod generator;
pub mod network;
pub mod pipeline;
pub mod sink;
pub mod types;
pub mod window;
