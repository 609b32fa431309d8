use tracing::debug;

use super::*;

/// Counters describing what an engine has seen so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub accepted: u64,
    pub dropped: u64,
    pub retired: u64,
    pub retained_keys: usize,
    pub latest_event_time: Option<EventTime>,
}

/// Sliding-window count aggregation over rating events.
///
/// Each accepted event increments one count per window it belongs to.
/// [`emit`](Self::emit) ranks the whole retained state; nothing is reset
/// between emits.
///
/// Without a retention horizon every window is kept forever. With one,
/// windows whose end lies at least `retention` behind the latest observed
/// event time are dropped at each emit. There is no watermark: a late event
/// still counts towards whatever windows it maps to, recreating retired ones.
pub struct AggregationEngine<A: WindowAssigner = SlidingEventTimeWindows> {
    assigner: A,
    counts: WindowCounts,
    retention_ms: Option<i64>,
    latest_event_time: Option<EventTime>,
    next_batch_id: u64,
    accepted: u64,
    dropped: u64,
    retired: u64,
}

impl<A: WindowAssigner> AggregationEngine<A> {
    pub fn new(assigner: A) -> Self {
        Self {
            assigner,
            counts: WindowCounts::new(),
            retention_ms: None,
            latest_event_time: None,
            next_batch_id: 0,
            accepted: 0,
            dropped: 0,
            retired: 0,
        }
    }

    /// Enable window retirement with the given horizon.
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention_ms = Some(retention.as_millis() as i64);
        self
    }

    pub fn assigner(&self) -> &A {
        &self.assigner
    }

    /// Fold one validated event into every window it belongs to.
    pub fn ingest(&mut self, event: &RatingEvent) {
        let ts = event.event_time();
        for window in self.assigner.assign_windows(ts) {
            self.counts.increment(WindowKey::new(window, event.movie_id));
        }
        self.latest_event_time = Some(self.latest_event_time.map_or(ts, |t| t.max(ts)));
        self.accepted += 1;
    }

    /// Decode one stream line and ingest it.
    ///
    /// A line that is not a valid rating record is counted as dropped and
    /// leaves the window state untouched.
    pub fn ingest_line(&mut self, line: &str) -> Result<(), RecordError> {
        match RatingEvent::from_line(line) {
            Ok(event) => {
                self.ingest(&event);
                Ok(())
            }
            Err(err) => {
                self.dropped += 1;
                debug!("drop record: {err}");
                Err(err)
            }
        }
    }

    /// Like [`ingest_line`](Self::ingest_line) for raw bytes off the socket.
    pub fn ingest_bytes(&mut self, bytes: &[u8]) -> Result<(), RecordError> {
        match std::str::from_utf8(bytes) {
            Ok(line) => self.ingest_line(line),
            Err(_) => {
                self.dropped += 1;
                debug!("drop record: {}", RecordError::InvalidUtf8);
                Err(RecordError::InvalidUtf8)
            }
        }
    }

    /// Drop every window that ended `retention` or more before the latest
    /// observed event. No-op without a retention horizon or before the
    /// first event. Returns the number of keys removed.
    pub fn retire(&mut self) -> usize {
        let (Some(retention_ms), Some(latest)) = (self.retention_ms, self.latest_event_time) else {
            return 0;
        };
        let horizon = latest.saturating_sub(retention_ms);
        let removed = self.counts.retain_windows(|window| window.end > horizon);
        self.retired += removed as u64;
        removed
    }

    /// All retained counts as ranked rows, without advancing the batch id.
    pub fn rows(&self) -> Vec<WindowCount> {
        self.counts
            .iter()
            .map(|(key, count)| WindowCount {
                window: key.window,
                movie_id: key.movie_id,
                count: *count,
            })
            .collect()
    }

    /// Retire expired windows, then snapshot everything that is left.
    pub fn emit(&mut self) -> Snapshot {
        self.retire();
        let snapshot = Snapshot::new(self.next_batch_id, self.rows());
        self.next_batch_id += 1;
        snapshot
    }

    /// Count for `movie_id` in `window`; zero when never seen.
    pub fn count(&self, window: TimeWindow, movie_id: MovieId) -> u64 {
        self.counts.get(&WindowKey::new(window, movie_id))
    }

    pub fn counts(&self) -> &WindowCounts {
        &self.counts
    }

    pub fn latest_event_time(&self) -> Option<EventTime> {
        self.latest_event_time
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            accepted: self.accepted,
            dropped: self.dropped,
            retired: self.retired,
            retained_keys: self.counts.len(),
            latest_event_time: self.latest_event_time,
        }
    }
}
