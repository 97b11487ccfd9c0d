//! Graph and community storage.
//!
//! [`GraphStore`] holds adjacency, edge multiplicities and each node's
//! `central_in` set; [`CommunityTable`] holds each community's member set.
//! Neither enforces the cross-structure invariant on its own.

pub mod graph;
pub mod communities;

pub use graph::{EdgeDecrement, EdgeRecord, EdgeUpsert, GraphStore, NodeRecord};
pub use communities::CommunityTable;
