//! Evolution engine.
//!
//! [`EngineContext`] owns the graph, the community table and the open
//! slice's counters. The engine reacts to two kinds of topology change:
//!
//! - **Insertion** of a new edge runs common-neighbor propagation: existing
//!   communities spread across the new edge, or a new community is born
//!   from the triangles it closes.
//! - **Deletion** of an edge's last copy queues the communities it held
//!   together in a [`RemovalBatch`]; [`EngineContext::reconcile`] then
//!   re-tests their centrality, destroys the ones that fell apart and
//!   detects splits.
//!
//! ```text
//! EdgeEvent ──► insert_edge ──► propagate ──► CommunityTable
//!          └──► remove_edge ──► RemovalBatch ──► reconcile ──► CommunityTable
//! ```

pub mod context;
pub mod centrality;
mod evolution;
pub mod reconcile;
pub mod invariants;

pub use context::{EngineContext, SliceState};
pub use centrality::centrality_test;
pub use reconcile::RemovalBatch;
pub use invariants::InvariantViolation;
