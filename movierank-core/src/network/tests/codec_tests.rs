use super::*;

#[tokio::test]
async fn test_write_then_read_line() {
    let (client, server) = tokio::io::duplex(1024);
    let mut writer = client;
    let mut reader = LineReader::new(BufReader::new(server));

    let first = RatingEvent::at(1, 42, 4.5, 60_000);
    let second = RatingEvent::at(2, 7, 0.5, 61_000);
    write_event(&mut writer, &first).await.unwrap();
    write_event(&mut writer, &second).await.unwrap();
    drop(writer);

    let line = reader.next_line().await.unwrap().unwrap();
    assert!(!line.ends_with(b"\n"));
    let decoded = RatingEvent::from_line(std::str::from_utf8(&line).unwrap()).unwrap();
    assert_eq!(decoded, first);

    let line = reader.next_line().await.unwrap().unwrap();
    assert_eq!(
        RatingEvent::from_line(std::str::from_utf8(&line).unwrap()).unwrap(),
        second
    );

    assert_eq!(reader.next_line().await.unwrap(), None);
}

#[tokio::test]
async fn test_read_line_strips_crlf_and_keeps_unterminated_tail() {
    let data: &[u8] = b"first\r\nsecond\n\ntail";
    let mut reader = LineReader::new(BufReader::new(data));
    assert_eq!(reader.next_line().await.unwrap(), Some(b"first".to_vec()));
    assert_eq!(reader.next_line().await.unwrap(), Some(b"second".to_vec()));
    assert_eq!(reader.next_line().await.unwrap(), Some(Vec::new()));
    assert_eq!(reader.next_line().await.unwrap(), Some(b"tail".to_vec()));
    assert_eq!(reader.next_line().await.unwrap(), None);
}

#[tokio::test]
async fn test_cancelled_read_keeps_partial_line() {
    let (mut writer, server) = tokio::io::duplex(64);
    let mut reader = LineReader::new(BufReader::new(server));

    writer.write_all(b"par").await.unwrap();
    let pending = tokio::time::timeout(Duration::from_millis(20), reader.next_line()).await;
    assert!(pending.is_err());

    writer.write_all(b"tial\n").await.unwrap();
    assert_eq!(reader.next_line().await.unwrap(), Some(b"partial".to_vec()));
}
