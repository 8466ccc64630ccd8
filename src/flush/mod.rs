pub mod jsonl;
pub mod series;
pub mod sink;

pub use jsonl::{JsonlSink, read_jsonl};
pub use series::{SeriesCollector, StreakWatch, TickCounts, find_full_aggregation};
pub use sink::{MemorySink, NullSink, SnapshotSink};
