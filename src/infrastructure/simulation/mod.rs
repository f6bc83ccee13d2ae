pub mod snapshot_generator;

pub use snapshot_generator::SnapshotGenerator;
