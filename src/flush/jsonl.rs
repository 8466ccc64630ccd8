use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::SimError;
use crate::model::Snapshot;

use super::sink::SnapshotSink;

/// Writes one JSON snapshot per line to any writer.
pub struct JsonlSink<W: Write> {
    writer: W,
    written: u64,
}

impl<W: Write> JsonlSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Lines written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl JsonlSink<BufWriter<File>> {
    /// Create (or truncate) `path` and write snapshots to it.
    pub fn create(path: &Path) -> Result<Self, SimError> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> SnapshotSink for JsonlSink<W> {
    fn record(&mut self, snapshot: &Snapshot) -> Result<(), SimError> {
        serde_json::to_writer(&mut self.writer, snapshot)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SimError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Read back a JSON-lines snapshot stream, skipping blank lines.
pub fn read_jsonl(contents: &str) -> Result<Vec<Snapshot>, SimError> {
    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(SimError::from))
        .collect()
}
