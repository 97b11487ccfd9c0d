//! # tiles-kernel
//!
//! Incremental discovery of evolving communities over a stream of edge events.
//!
//! Communities are densely connected, triangle-closed groups of nodes. They
//! are never recomputed from scratch: every edge insertion or removal
//! triggers a local update that creates, grows, splits or destroys
//! communities, while old edges age out of the graph.
//!
//! ## Architecture
//!
//! ```text
//! EdgeEventReader → StreamProcessor ─┬→ EvictionStrategy (TTL heap | explicit '-')
//!                                    ├→ EngineContext (GraphStore + CommunityTable)
//!                                    └→ SnapshotEmitter → SnapshotSink
//! ```
//!
//! ## Guarantees
//!
//! - A node lists a community in its `central_in` set iff the community
//!   lists the node as a member, after every event.
//! - Every live edge has weight >= 1.
//! - No reported community has fewer than 3 members; communities with
//!   identical members are reported once, under the lowest id.
//! - Same stream + same configuration → identical slice fingerprints.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod store;
pub mod engine;
pub mod eviction;
pub mod snapshot;
pub mod processor;
pub mod input;
pub mod config;
pub mod canonical;
pub mod error;

// Re-exports
pub use types::{
    NodeId, CommunityId, EdgeKey, WeightedEdge, EdgeAction, EdgeEvent,
    CommunityRecord, MergeRecord, SplitEvent, SliceReport, SliceSummary,
};
pub use store::{GraphStore, CommunityTable, EdgeUpsert, EdgeDecrement};
pub use engine::{EngineContext, RemovalBatch, InvariantViolation, centrality_test};
pub use eviction::{EvictionStrategy, TtlEviction, ExplicitEviction, PendingRemoval, strategy_for};
pub use snapshot::{
    SnapshotEmitter, SnapshotSink, FileSnapshotSink, MemorySnapshotSink, RunManifest, SinkError,
};
pub use processor::{StreamProcessor, StreamSummary};
pub use input::{EdgeEventReader, InputError};
pub use config::{KernelConfig, RemovalMode, ConfigError};
pub use canonical::{to_canonical_bytes, canonical_hash, canonical_hash_hex};
pub use error::KernelError;

/// Schema version of emitted slice files and manifests.
pub const KERNEL_SCHEMA_VERSION: &str = "1.0.0";

/// Default observation window in days.
pub const DEFAULT_OBS_DAYS: u32 = 7;
