use super::*;

/// Identity of one running count: a window and a movie inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct WindowKey {
    pub window: TimeWindow,
    pub movie_id: MovieId,
}

impl WindowKey {
    pub fn new(window: TimeWindow, movie_id: MovieId) -> Self {
        Self { window, movie_id }
    }
}

/// Per-window, per-movie rating counts.
///
/// Counts are created lazily on first increment and only ever grow; the only
/// way a count disappears is [`retain_windows`](Self::retain_windows).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WindowCounts {
    counts: AHashMap<WindowKey, u64>,
}

impl WindowCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one to the count for `key`, creating it at zero first if needed.
    pub fn increment(&mut self, key: WindowKey) -> u64 {
        let count = self.counts.entry(key).or_insert(0);
        *count += 1;
        *count
    }

    /// Current count for `key`; zero when the key was never seen.
    pub fn get(&self, key: &WindowKey) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Keep only the windows for which `keep` returns true.
    /// Returns the number of keys removed.
    pub fn retain_windows(&mut self, mut keep: impl FnMut(&TimeWindow) -> bool) -> usize {
        let before = self.counts.len();
        self.counts.retain(|key, _| keep(&key.window));
        before - self.counts.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&WindowKey, &u64)> {
        self.counts.iter()
    }

    /// Return the number of retained `(window, movie)` keys.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
