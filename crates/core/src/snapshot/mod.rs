//! Snapshot module - the versioned, read-only dataset a batch runs against.

mod engine_snapshot;
mod in_memory_dataset;

#[cfg(test)]
pub(crate) mod fixtures;

pub use engine_snapshot::EngineSnapshot;
pub use in_memory_dataset::InMemoryDataset;
