//! Snapshot emission.
//!
//! At every observation-window boundary (and once at end of stream) the
//! [`SnapshotEmitter`] canonicalizes the engine state into a
//! [`SliceReport`](crate::types::SliceReport) and a [`SnapshotSink`]
//! persists it.

pub mod emitter;
pub mod sink;

pub use emitter::SnapshotEmitter;
pub use sink::{
    format_id_list, FileSnapshotSink, MemorySnapshotSink, RunManifest, SinkError, SliceFiles,
    SnapshotSink, MANIFEST_FILE,
};
