//! Structural self-checks over the engine state.
//!
//! These never fail under correct operation. Tests and the property suite
//! call [`EngineContext::check_invariants`] after every event.

use crate::types::{CommunityId, NodeId};
use super::context::EngineContext;

/// A broken structural invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    /// A community lists a node that does not list the community back.
    #[error("community {community} lists node {node}, which does not list it back")]
    MissingBackReference {
        /// Community id.
        community: CommunityId,
        /// Node id.
        node: NodeId,
    },
    /// A node lists a community that does not list the node.
    #[error("node {node} lists community {community}, which does not list it back")]
    DanglingMembership {
        /// Node id.
        node: NodeId,
        /// Community id.
        community: CommunityId,
    },
    /// A live edge with zero weight.
    #[error("edge ({u}, {v}) has non-positive weight")]
    NonPositiveWeight {
        /// Smaller endpoint.
        u: NodeId,
        /// Larger endpoint.
        v: NodeId,
    },
    /// Adjacency and edge table disagree.
    #[error("adjacency of {node} disagrees with the edge table")]
    AdjacencyMismatch {
        /// Node id.
        node: NodeId,
    },
}

impl EngineContext {
    /// Verify bidirectional membership consistency, weight positivity and
    /// adjacency symmetry. Returns the first violation found.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let graph = self.graph();
        let communities = self.communities();

        for (cid, members) in communities.iter() {
            for &node in members {
                if !graph.is_central_in(node, cid) {
                    return Err(InvariantViolation::MissingBackReference { community: cid, node });
                }
            }
        }

        for (node, record) in graph.nodes() {
            for &cid in record.central_in() {
                if !communities.is_member(cid, node) {
                    return Err(InvariantViolation::DanglingMembership { node, community: cid });
                }
            }
            for &m in record.neighbors() {
                if !graph.has_edge(node, m) {
                    return Err(InvariantViolation::AdjacencyMismatch { node });
                }
            }
        }

        for edge in graph.edges() {
            if edge.weight == 0 {
                return Err(InvariantViolation::NonPositiveWeight { u: edge.u, v: edge.v });
            }
            for (a, b) in [(edge.u, edge.v), (edge.v, edge.u)] {
                if !graph.node(a).is_some_and(|n| n.neighbors().contains(&b)) {
                    return Err(InvariantViolation::AdjacencyMismatch { node: a });
                }
            }
        }

        Ok(())
    }
}
