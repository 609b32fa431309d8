use super::*;

/// Fixed-size, overlapping event-time windows whose starts are multiples of
/// `slide`. An element belongs to exactly `size / slide` windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlidingEventTimeWindows {
    size_ms: i64,
    slide_ms: i64,
}

impl SlidingEventTimeWindows {
    /// Create sliding windows of the given `size` advancing every `slide`.
    ///
    /// `size` must be a positive multiple of a positive `slide`, both with
    /// millisecond resolution.
    pub fn of(size: Duration, slide: Duration) -> Result<Self, ConfigError> {
        let size_ms = size.as_millis() as i64;
        let slide_ms = slide.as_millis() as i64;
        if slide_ms <= 0 {
            return Err(ConfigError::ZeroSlide);
        }
        if size_ms <= 0 {
            return Err(ConfigError::ZeroWindow);
        }
        if size_ms % slide_ms != 0 {
            return Err(ConfigError::WindowNotMultipleOfSlide {
                window_ms: size_ms,
                slide_ms,
            });
        }
        Ok(Self { size_ms, slide_ms })
    }

    pub fn size_ms(&self) -> i64 {
        self.size_ms
    }

    pub fn slide_ms(&self) -> i64 {
        self.slide_ms
    }

    /// Number of windows every element is assigned to.
    pub fn windows_per_element(&self) -> usize {
        (self.size_ms / self.slide_ms) as usize
    }
}

impl WindowAssigner for SlidingEventTimeWindows {
    fn assign_windows(&self, timestamp: EventTime) -> Vec<TimeWindow> {
        // Walk back from the last start by slide until no window covers ts.
        let last_start = timestamp - timestamp.rem_euclid(self.slide_ms);
        let mut windows = Vec::with_capacity(self.windows_per_element());
        let mut start = last_start;
        while start > timestamp - self.size_ms {
            windows.push(TimeWindow::new(start, start + self.size_ms));
            start -= self.slide_ms;
        }
        windows
    }

    fn slide(&self) -> Duration {
        Duration::from_millis(self.slide_ms as u64)
    }
}
