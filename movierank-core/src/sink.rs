//! Snapshot publication.

use std::io::Write;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::DateTime;
use prettytable::format::consts;
use prettytable::{Cell, Table, row};

use crate::catalog::MovieCatalog;
use crate::engine::Snapshot;
use crate::types::EventTime;

/// Receives every snapshot the engine emits.
pub trait ResultSink: Send {
    fn publish(&mut self, snapshot: &Snapshot) -> Result<()>;
}

/// Renders the top rows of each snapshot as a table.
///
/// Only the rendering is truncated; the snapshot itself always carries the
/// full retained state.
pub struct ConsoleSink<W: Write + Send> {
    writer: W,
    num_rows: usize,
    catalog: Option<Arc<MovieCatalog>>,
}

impl ConsoleSink<std::io::Stdout> {
    pub fn stdout(num_rows: usize) -> Self {
        Self::new(std::io::stdout(), num_rows)
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(writer: W, num_rows: usize) -> Self {
        Self {
            writer,
            num_rows,
            catalog: None,
        }
    }

    /// Add a `title` column resolved through `catalog`.
    pub fn with_catalog(mut self, catalog: Arc<MovieCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> ResultSink for ConsoleSink<W> {
    fn publish(&mut self, snapshot: &Snapshot) -> Result<()> {
        let table = render_table(snapshot, self.num_rows, self.catalog.as_deref());
        self.writer.write_all(table.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Keeps every published snapshot; clones share the same storage.
#[derive(Clone, Default)]
pub struct MemorySink {
    snapshots: Arc<Mutex<Vec<Snapshot>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshots(&self) -> Vec<Snapshot> {
        self.snapshots.lock().expect("snapshots poisoned").clone()
    }

    pub fn latest(&self) -> Option<Snapshot> {
        self.snapshots.lock().expect("snapshots poisoned").last().cloned()
    }
}

impl ResultSink for MemorySink {
    fn publish(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.snapshots
            .lock()
            .expect("snapshots poisoned")
            .push(snapshot.clone());
        Ok(())
    }
}

fn format_event_time(ts: EventTime) -> String {
    match DateTime::from_timestamp_millis(ts) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => ts.to_string(),
    }
}

/// Render the first `num_rows` rows of `snapshot` as a console table.
pub fn render_table(snapshot: &Snapshot, num_rows: usize, catalog: Option<&MovieCatalog>) -> String {
    let mut table = Table::new();
    table.set_format(*consts::FORMAT_NO_LINESEP_WITH_TITLE);

    let mut titles = row!["window_start", "window_end", "movieId", "count"];
    if catalog.is_some() {
        titles.add_cell(Cell::new("title"));
    }
    table.set_titles(titles);

    for count in snapshot.top(num_rows) {
        let mut row = row![
            format_event_time(count.window.start),
            format_event_time(count.window.end),
            count.movie_id,
            count.count
        ];
        if let Some(catalog) = catalog {
            row.add_cell(Cell::new(catalog.title(count.movie_id).unwrap_or_default()));
        }
        table.add_row(row);
    }

    let mut out = String::new();
    out.push_str("-------------------------------------------\n");
    out.push_str(&format!("Batch: {}\n", snapshot.batch_id));
    out.push_str("-------------------------------------------\n");
    out.push_str(&table.to_string());
    if snapshot.len() > num_rows {
        out.push_str(&format!("only showing top {num_rows} rows\n"));
    }
    out.push('\n');
    out
}

#[cfg(test)]
#[path = "tests/sink_tests.rs"]
mod tests;
