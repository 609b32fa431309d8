use super::*;

#[test]
fn test_rating_event_wire_shape() {
    let event = RatingEvent::at(7, 42, 3.5, 1_714_564_800_000);
    let line = event.to_line().unwrap();
    assert!(line.ends_with('\n'));
    assert_eq!(line.matches('\n').count(), 1);

    let value: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
    assert_eq!(value["userId"], 7);
    assert_eq!(value["movieId"], 42);
    assert_eq!(value["rating"], 3.5);
    assert_eq!(value["timestamp"], "2024-05-01T12:00:00.000000Z");
}

#[test]
fn test_rating_event_from_line() {
    let line = r#"{"userId": 1, "movieId": 318, "rating": 4.5, "timestamp": "2024-05-01T12:00:30.250000Z"}"#;
    let event = RatingEvent::from_line(line).unwrap();
    assert_eq!(event.user_id, 1);
    assert_eq!(event.movie_id, 318);
    assert_eq!(event.rating, 4.5);
    assert_eq!(event.event_time(), 1_714_564_830_250);
}

#[test]
fn test_naive_timestamp_is_read_as_utc() {
    let line = r#"{"userId": 1, "movieId": 2, "rating": 1.0, "timestamp": "2024-05-01T12:00:00.123456"}"#;
    let event = RatingEvent::from_line(line).unwrap();
    assert_eq!(event.event_time(), 1_714_564_800_123);

    let no_fraction = parse_timestamp("2024-05-01 12:00:00").unwrap();
    assert_eq!(no_fraction.timestamp_millis(), 1_714_564_800_000);
}

#[test]
fn test_offset_timestamp_is_normalised() {
    let ts = parse_timestamp("2024-05-01T14:00:00+02:00").unwrap();
    assert_eq!(ts.timestamp_millis(), 1_714_564_800_000);
}

#[test]
fn test_null_movie_id_is_rejected() {
    let line = r#"{"userId": 1, "movieId": null, "rating": 4.0, "timestamp": "2024-05-01T12:00:00Z"}"#;
    assert!(matches!(
        RatingEvent::from_line(line),
        Err(RecordError::MissingMovieId)
    ));

    let missing = r#"{"userId": 1, "rating": 4.0, "timestamp": "2024-05-01T12:00:00Z"}"#;
    assert!(matches!(
        RatingEvent::from_line(missing),
        Err(RecordError::MissingMovieId)
    ));
}

#[test]
fn test_wrong_field_types_are_malformed() {
    let cases = [
        r#"{"userId": 1, "movieId": "forty-two", "rating": 4.0, "timestamp": "2024-05-01T12:00:00Z"}"#,
        r#"{"userId": null, "movieId": 42, "rating": 4.0, "timestamp": "2024-05-01T12:00:00Z"}"#,
        r#"{"userId": 1, "movieId": 42, "rating": "good", "timestamp": "2024-05-01T12:00:00Z"}"#,
        r#"not json at all"#,
        r#"{"userId": 1, "movieId": 42"#,
    ];
    for line in cases {
        assert!(
            matches!(RatingEvent::from_line(line), Err(RecordError::Malformed(_))),
            "{line} should be malformed"
        );
    }
}

#[test]
fn test_bad_timestamp_is_rejected() {
    let line = r#"{"userId": 1, "movieId": 42, "rating": 4.0, "timestamp": "yesterday"}"#;
    assert!(matches!(
        RatingEvent::from_line(line),
        Err(RecordError::InvalidTimestamp(_))
    ));
}

#[test]
fn test_deserialize_through_serde_validates() {
    let line = r#"{"userId": 1, "movieId": null, "rating": 4.0, "timestamp": "2024-05-01T12:00:00Z"}"#;
    assert!(serde_json::from_str::<RatingEvent>(line).is_err());

    let event = RatingEvent::at(3, 9, 2.0, 60_000);
    let back: RatingEvent = serde_json::from_str(&serde_json::to_string(&event).unwrap()).unwrap();
    assert_eq!(back, event);
}
