use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::RecordError;

/// Event time in milliseconds since epoch.
pub type EventTime = i64;

/// MovieLens movie identifier.
pub type MovieId = i64;

/// MovieLens user identifier.
pub type UserId = i64;

/// A single user rating, as produced by the generator and carried on the wire.
///
/// Serializes to one camelCase JSON object with an ISO-8601 timestamp:
/// `{"userId":7,"movieId":42,"rating":3.5,"timestamp":"2024-05-01T12:00:00.000000Z"}`.
/// Deserialization goes through [`WireRating`], so a record with a null or
/// missing `movieId` never becomes a `RatingEvent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "WireRating")]
pub struct RatingEvent {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub rating: f64,
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl RatingEvent {
    pub fn new(user_id: UserId, movie_id: MovieId, rating: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            user_id,
            movie_id,
            rating,
            timestamp,
        }
    }

    /// Create an event at an explicit event time in milliseconds.
    ///
    /// Times outside chrono's range clamp to the Unix epoch.
    pub fn at(user_id: UserId, movie_id: MovieId, rating: f64, event_time: EventTime) -> Self {
        let timestamp = DateTime::from_timestamp_millis(event_time).unwrap_or_default();
        Self::new(user_id, movie_id, rating, timestamp)
    }

    /// The event time used for window assignment.
    pub fn event_time(&self) -> EventTime {
        self.timestamp.timestamp_millis()
    }

    /// Encode as a single newline-terminated JSON line.
    pub fn to_line(&self) -> serde_json::Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }

    /// Decode one line of the stream into a validated event.
    pub fn from_line(line: &str) -> Result<Self, RecordError> {
        let wire: WireRating = serde_json::from_str(line.trim_end())?;
        Self::try_from(wire)
    }
}

/// The loosely-shaped record as it appears on the wire.
///
/// `movieId` is optional here only so a null can be told apart from a type
/// mismatch; every other field must be present with the right type.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRating {
    pub user_id: UserId,
    pub movie_id: Option<MovieId>,
    pub rating: f64,
    pub timestamp: String,
}

impl TryFrom<WireRating> for RatingEvent {
    type Error = RecordError;

    fn try_from(wire: WireRating) -> Result<Self, Self::Error> {
        let movie_id = wire.movie_id.ok_or(RecordError::MissingMovieId)?;
        let timestamp = parse_timestamp(&wire.timestamp)?;
        Ok(Self {
            user_id: wire.user_id,
            movie_id,
            rating: wire.rating,
            timestamp,
        })
    }
}

/// Parse an ISO-8601 timestamp.
///
/// Accepts RFC 3339 with any offset, or a naive `YYYY-MM-DDTHH:MM:SS[.f]`
/// (also with a space separator), which is read as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, RecordError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| RecordError::InvalidTimestamp(raw.to_string()))
}

/// Render an instant the way the stream writes it: RFC 3339, UTC, microseconds.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn serialize_timestamp<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(ts))
}

#[cfg(test)]
#[path = "tests/types_tests.rs"]
mod tests;
