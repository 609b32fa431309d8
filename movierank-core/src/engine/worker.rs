use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use super::*;

/// Owns an [`AggregationEngine`] and drives it on a fixed trigger.
///
/// Lines arrive over an mpsc channel from the stream source; this task is
/// their only consumer, so the count map has a single writer and snapshots
/// never observe a half-applied event. Every `slide` the worker folds all
/// queued lines into the engine, then emits and publishes a snapshot.
pub struct EngineWorker<S: ResultSink, A: WindowAssigner = SlidingEventTimeWindows> {
    engine: AggregationEngine<A>,
    sink: S,
    lines: mpsc::Receiver<Vec<u8>>,
}

impl<S: ResultSink, A: WindowAssigner> EngineWorker<S, A> {
    pub fn new(engine: AggregationEngine<A>, sink: S, lines: mpsc::Receiver<Vec<u8>>) -> Self {
        Self {
            engine,
            sink,
            lines,
        }
    }

    /// Run until `shutdown` flips to true (or its sender is dropped).
    ///
    /// The first snapshot is published one slide after start. On shutdown
    /// the pending lines are drained into one final snapshot, and the engine
    /// is handed back.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Result<AggregationEngine<A>> {
        let period = self.engine.assigner().slide();
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut inputs_open = true;

        loop {
            tokio::select! {
                biased;
                _ = ticker.tick() => {
                    self.tick()?;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                line = self.lines.recv(), if inputs_open => {
                    match line {
                        Some(line) => {
                            let _ = self.engine.ingest_bytes(&line);
                        }
                        None => {
                            debug!("engine input closed");
                            inputs_open = false;
                        }
                    }
                }
            }
        }

        self.tick()?;
        let stats = self.engine.stats();
        info!(
            accepted = stats.accepted,
            dropped = stats.dropped,
            retained_keys = stats.retained_keys,
            "aggregation stopped"
        );
        Ok(self.engine)
    }

    /// Fold everything queued so far, then publish the full snapshot.
    fn tick(&mut self) -> Result<()> {
        while let Ok(line) = self.lines.try_recv() {
            let _ = self.engine.ingest_bytes(&line);
        }
        let snapshot = self.engine.emit();
        let stats = self.engine.stats();
        debug!(
            batch_id = snapshot.batch_id,
            rows = snapshot.len(),
            accepted = stats.accepted,
            dropped = stats.dropped,
            retired = stats.retired,
            "publish snapshot"
        );
        self.sink.publish(&snapshot)
    }
}
