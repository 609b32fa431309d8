use super::*;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(2);

fn source_for(addr: SocketAddr) -> StreamSource {
    StreamSource::new(&SourceConfig {
        host: addr.ip().to_string(),
        port: addr.port(),
        reconnect_delay: Duration::from_millis(20),
        buffer: 16,
    })
}

#[tokio::test]
async fn test_source_forwards_lines() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (lines_tx, mut lines_rx) = mpsc::channel(16);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(source_for(addr).run(lines_tx, shutdown_rx));

    let (mut stream, _) = listener.accept().await.unwrap();
    let event = RatingEvent::at(1, 42, 2.5, 5_000);
    write_event(&mut stream, &event).await.unwrap();
    stream.write_all(b"garbage\n").await.unwrap();

    let line = timeout(WAIT, lines_rx.recv()).await.unwrap().unwrap();
    assert_eq!(RatingEvent::from_line(std::str::from_utf8(&line).unwrap()).unwrap(), event);
    let line = timeout(WAIT, lines_rx.recv()).await.unwrap().unwrap();
    assert_eq!(line, b"garbage".to_vec());

    shutdown_tx.send(true).unwrap();
    timeout(WAIT, handle).await.unwrap().unwrap().unwrap();
}

#[tokio::test]
async fn test_source_reconnects_after_stream_closes() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (lines_tx, mut lines_rx) = mpsc::channel(16);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(source_for(addr).run(lines_tx, shutdown_rx));

    let (mut stream, _) = listener.accept().await.unwrap();
    stream.write_all(b"one\n").await.unwrap();
    assert_eq!(timeout(WAIT, lines_rx.recv()).await.unwrap().unwrap(), b"one".to_vec());
    drop(stream);

    let (mut stream, _) = timeout(WAIT, listener.accept()).await.unwrap().unwrap();
    stream.write_all(b"two\n").await.unwrap();
    assert_eq!(timeout(WAIT, lines_rx.recv()).await.unwrap().unwrap(), b"two".to_vec());

    shutdown_tx.send(true).unwrap();
    timeout(WAIT, handle).await.unwrap().unwrap().unwrap();
}

#[tokio::test]
async fn test_source_stops_when_engine_is_gone() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (lines_tx, lines_rx) = mpsc::channel(1);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(source_for(addr).run(lines_tx, shutdown_rx));

    let (mut stream, _) = listener.accept().await.unwrap();
    drop(lines_rx);
    stream.write_all(b"orphan\n").await.unwrap();
    timeout(WAIT, handle).await.unwrap().unwrap().unwrap();
}

#[tokio::test]
async fn test_spurious_wakeup_keeps_partial_line() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (lines_tx, mut lines_rx) = mpsc::channel(16);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(source_for(addr).run(lines_tx, shutdown_rx));

    let (mut stream, _) = listener.accept().await.unwrap();
    stream.write_all(b"par").await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    // A change that is not a shutdown must not drop the buffered bytes.
    shutdown_tx.send(false).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    stream.write_all(b"tial\n").await.unwrap();

    assert_eq!(timeout(WAIT, lines_rx.recv()).await.unwrap().unwrap(), b"partial".to_vec());

    shutdown_tx.send(true).unwrap();
    timeout(WAIT, handle).await.unwrap().unwrap().unwrap();
}
