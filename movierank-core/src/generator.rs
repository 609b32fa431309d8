//! Synthetic rating events.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

use crate::catalog::MovieCatalog;
use crate::types::{RatingEvent, UserId};

/// Users are drawn uniformly from `1..=MAX_USER_ID`.
pub const MAX_USER_ID: UserId = 1000;

/// Produces random ratings: uniform user, uniform catalog movie, a rating in
/// half-star steps between 0.5 and 5.0, stamped with the caller's clock.
pub struct RatingGenerator<R: Rng = StdRng> {
    catalog: Arc<MovieCatalog>,
    rng: R,
    min_delay: Duration,
    max_delay: Duration,
}

impl RatingGenerator<StdRng> {
    /// A generator whose whole stream is determined by `seed`.
    pub fn seeded(catalog: Arc<MovieCatalog>, seed: u64) -> Self {
        Self::new(catalog, StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy(catalog: Arc<MovieCatalog>) -> Self {
        Self::new(catalog, StdRng::from_entropy())
    }
}

impl<R: Rng> RatingGenerator<R> {
    pub fn new(catalog: Arc<MovieCatalog>, rng: R) -> Self {
        Self {
            catalog,
            rng,
            min_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(500),
        }
    }

    /// Pause between events, drawn uniformly from `[min, max]`.
    pub fn with_delay_range(mut self, min: Duration, max: Duration) -> Self {
        self.min_delay = min;
        self.max_delay = max.max(min);
        self
    }

    pub fn next_event(&mut self, now: DateTime<Utc>) -> RatingEvent {
        let user_id = self.rng.gen_range(1..=MAX_USER_ID);
        let ids = self.catalog.ids();
        let movie_id = ids[self.rng.gen_range(0..ids.len())];
        let raw: f64 = self.rng.gen_range(0.5..=5.0);
        let rating = (raw * 2.0).round() / 2.0;
        RatingEvent::new(user_id, movie_id, rating, now)
    }

    pub fn next_delay(&mut self) -> Duration {
        if self.min_delay == self.max_delay {
            return self.min_delay;
        }
        self.rng.gen_range(self.min_delay..=self.max_delay)
    }
}

/// Running totals for a generator loop.
#[derive(Debug, Default)]
pub struct GeneratorStats {
    published: AtomicU64,
    discarded: AtomicU64,
}

impl GeneratorStats {
    /// Events handed to an attached consumer.
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    /// Events generated while no consumer was attached.
    pub fn discarded(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
    }

    pub fn generated(&self) -> u64 {
        self.published() + self.discarded()
    }
}

impl<R: Rng + Send + 'static> RatingGenerator<R> {
    /// Spawn the generation loop.
    ///
    /// Each event goes to whichever consumer is subscribed to `events` at
    /// that moment; with nobody subscribed it is dropped, never queued.
    pub fn spawn(
        mut self,
        events: broadcast::Sender<RatingEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) -> (Arc<GeneratorStats>, tokio::task::JoinHandle<()>) {
        let stats = Arc::new(GeneratorStats::default());
        let task_stats = Arc::clone(&stats);

        let handle = tokio::spawn(async move {
            info!("rating generator started with {} movies", self.catalog.len());
            loop {
                let event = self.next_event(Utc::now());
                match events.send(event) {
                    Ok(_) => {
                        task_stats.published.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(broadcast::error::SendError(event)) => {
                        task_stats.discarded.fetch_add(1, Ordering::Relaxed);
                        debug!("no consumer, discard event for movie {}", event.movie_id);
                    }
                }

                let delay = self.next_delay();
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }
            info!(
                published = task_stats.published(),
                discarded = task_stats.discarded(),
                "rating generator stopped"
            );
        });
        (stats, handle)
    }
}

#[cfg(test)]
#[path = "tests/generator_tests.rs"]
mod tests;
