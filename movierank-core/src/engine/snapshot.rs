use super::*;

/// One output row: how often `movie_id` was rated inside `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowCount {
    pub window: TimeWindow,
    #[serde(rename = "movieId")]
    pub movie_id: MovieId,
    pub count: u64,
}

impl WindowCount {
    /// Output order: latest window first, then most-rated first, then
    /// lowest movie id first so that the order is total.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .window
            .start
            .cmp(&self.window.start)
            .then_with(|| other.count.cmp(&self.count))
            .then_with(|| self.movie_id.cmp(&other.movie_id))
    }
}

/// The complete retained state at one trigger tick, ranked.
///
/// Every tick re-emits all retained counts, not just the ones that changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub batch_id: u64,
    pub rows: Vec<WindowCount>,
}

impl Snapshot {
    /// Build a snapshot, ranking `rows` in output order.
    pub fn new(batch_id: u64, mut rows: Vec<WindowCount>) -> Self {
        rows.sort_unstable_by(WindowCount::rank_cmp);
        Self { batch_id, rows }
    }

    /// The first `n` rows, for display.
    pub fn top(&self, n: usize) -> &[WindowCount] {
        &self.rows[..n.min(self.rows.len())]
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
