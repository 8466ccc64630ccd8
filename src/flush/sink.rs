use crate::error::SimError;
use crate::model::Snapshot;

/// Consumer of the per-tick snapshots of a run.
///
/// Snapshots arrive in tick order without gaps. A sink error stops the run.
pub trait SnapshotSink {
    fn record(&mut self, snapshot: &Snapshot) -> Result<(), SimError>;

    /// Called once when the run ends.
    fn finish(&mut self) -> Result<(), SimError> {
        Ok(())
    }
}

impl<S: SnapshotSink + ?Sized> SnapshotSink for &mut S {
    fn record(&mut self, snapshot: &Snapshot) -> Result<(), SimError> {
        (**self).record(snapshot)
    }

    fn finish(&mut self) -> Result<(), SimError> {
        (**self).finish()
    }
}

/// Keeps every snapshot in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub snapshots: Vec<Snapshot>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    pub fn into_snapshots(self) -> Vec<Snapshot> {
        self.snapshots
    }
}

impl SnapshotSink for MemorySink {
    fn record(&mut self, snapshot: &Snapshot) -> Result<(), SimError> {
        self.snapshots.push(snapshot.clone());
        Ok(())
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl SnapshotSink for NullSink {
    fn record(&mut self, _snapshot: &Snapshot) -> Result<(), SimError> {
        Ok(())
    }
}
