use chrono::DateTime;

use super::*;

/// A half-open event-time window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TimeWindow {
    pub start: EventTime,
    pub end: EventTime,
}

impl TimeWindow {
    pub fn new(start: EventTime, end: EventTime) -> Self {
        Self { start, end }
    }

    /// The maximum timestamp that belongs to this window.
    pub fn max_timestamp(&self) -> EventTime {
        self.end - 1
    }

    /// Return true if `timestamp` falls inside this window.
    pub fn contains(&self, timestamp: EventTime) -> bool {
        timestamp >= self.start && timestamp < self.end
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (
            DateTime::from_timestamp_millis(self.start),
            DateTime::from_timestamp_millis(self.end),
        ) {
            (Some(start), Some(end)) => write!(
                f,
                "[{}, {})",
                start.format("%Y-%m-%d %H:%M:%S"),
                end.format("%Y-%m-%d %H:%M:%S")
            ),
            _ => write!(f, "[{}ms, {}ms)", self.start, self.end),
        }
    }
}

/// Maps an event time onto every window that contains it.
pub trait WindowAssigner: Send + Sync {
    /// Return the windows that contain `timestamp`, latest start first.
    fn assign_windows(&self, timestamp: EventTime) -> Vec<TimeWindow>;

    /// Spacing between consecutive window starts, which is also the
    /// trigger period.
    fn slide(&self) -> Duration;
}
