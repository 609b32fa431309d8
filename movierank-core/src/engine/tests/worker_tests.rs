use super::*;
use crate::sink::MemorySink;

const SLIDE: Duration = Duration::from_secs(60);

fn line(movie_id: i64, ts_ms: EventTime) -> Vec<u8> {
    RatingEvent::at(1, movie_id, 3.0, ts_ms)
        .to_line()
        .unwrap()
        .trim_end()
        .as_bytes()
        .to_vec()
}

fn spawn_worker(
    sink: MemorySink,
) -> (
    mpsc::Sender<Vec<u8>>,
    watch::Sender<bool>,
    tokio::task::JoinHandle<Result<AggregationEngine>>,
) {
    let engine = AggregationEngine::new(SlidingEventTimeWindows::of(SLIDE * 10, SLIDE).unwrap());
    let (lines_tx, lines_rx) = mpsc::channel(64);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker = EngineWorker::new(engine, sink, lines_rx);
    (lines_tx, shutdown_tx, tokio::spawn(worker.run(shutdown_rx)))
}

#[tokio::test(start_paused = true)]
async fn test_worker_publishes_once_per_slide() {
    let sink = MemorySink::new();
    let (lines, shutdown, handle) = spawn_worker(sink.clone());

    tokio::time::sleep(SLIDE / 2).await;
    assert!(sink.snapshots().is_empty(), "no snapshot before the first slide");

    tokio::time::sleep(SLIDE * 3).await;
    let published = sink.snapshots();
    assert_eq!(published.len(), 3);
    assert_eq!(
        published.iter().map(|s| s.batch_id).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );

    drop(lines);
    shutdown.send(true).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_worker_folds_queued_lines_before_snapshot() {
    let sink = MemorySink::new();
    let (lines, shutdown, handle) = spawn_worker(sink.clone());

    for ts in [0, 30_000, 61_000] {
        lines.send(line(42, ts)).await.unwrap();
    }
    lines.send(br#"{"userId": 1, "movieId": null, "rating": 1.0, "timestamp": "1970-01-01T00:00:01Z"}"#.to_vec())
        .await
        .unwrap();

    tokio::time::sleep(SLIDE + Duration::from_millis(1)).await;
    let snapshot = sink.latest().unwrap();
    assert_eq!(snapshot.batch_id, 0);
    let count_at = |start: EventTime| {
        snapshot
            .rows
            .iter()
            .find(|r| r.window.start == start && r.movie_id == 42)
            .map(|r| r.count)
    };
    assert_eq!(count_at(60_000), Some(1));
    assert_eq!(count_at(0), Some(3));

    shutdown.send(true).unwrap();
    let engine = handle.await.unwrap().unwrap();
    let stats = engine.stats();
    assert_eq!(stats.accepted, 3);
    assert_eq!(stats.dropped, 1);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_publishes_final_snapshot() {
    let sink = MemorySink::new();
    let (lines, shutdown, handle) = spawn_worker(sink.clone());

    lines.send(line(7, 0)).await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(sink.snapshots().is_empty());

    shutdown.send(true).unwrap();
    handle.await.unwrap().unwrap();

    let published = sink.snapshots();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].len(), 10);
    assert!(published[0].rows.iter().all(|r| r.movie_id == 7 && r.count == 1));
}

#[tokio::test(start_paused = true)]
async fn test_worker_keeps_ticking_after_input_closes() {
    let sink = MemorySink::new();
    let (lines, shutdown, handle) = spawn_worker(sink.clone());

    lines.send(line(3, 0)).await.unwrap();
    drop(lines);

    tokio::time::sleep(SLIDE * 2 + Duration::from_millis(1)).await;
    let published = sink.snapshots();
    assert_eq!(published.len(), 2);
    assert_eq!(published[0], Snapshot { batch_id: 0, ..published[1].clone() });

    shutdown.send(true).unwrap();
    handle.await.unwrap().unwrap();
}
