//! Edge types for the evolving graph.

use serde::{Deserialize, Serialize};
use super::ids::NodeId;

/// Canonical key of an undirected edge.
///
/// The smaller endpoint is always stored first, so `(u, v)` and `(v, u)`
/// map to the same key. Implements `Ord` for deterministic edge listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeKey {
    lo: NodeId,
    hi: NodeId,
}

impl EdgeKey {
    /// Create the canonical key for the pair `(u, v)`.
    ///
    /// Returns `None` for self-loops, which the graph never stores.
    pub fn new(u: NodeId, v: NodeId) -> Option<Self> {
        match u.cmp(&v) {
            std::cmp::Ordering::Less => Some(Self { lo: u, hi: v }),
            std::cmp::Ordering::Greater => Some(Self { lo: v, hi: u }),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Smaller endpoint.
    pub fn lo(&self) -> NodeId {
        self.lo
    }

    /// Larger endpoint.
    pub fn hi(&self) -> NodeId {
        self.hi
    }

    /// Both endpoints, smaller first.
    pub fn endpoints(&self) -> (NodeId, NodeId) {
        (self.lo, self.hi)
    }
}

/// An edge together with its current multiplicity, as written to graph snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WeightedEdge {
    /// Smaller endpoint.
    pub u: NodeId,
    /// Larger endpoint.
    pub v: NodeId,
    /// Multiplicity, always >= 1.
    pub weight: u32,
}

impl WeightedEdge {
    /// Create a weighted edge from a canonical key.
    pub fn new(key: EdgeKey, weight: u32) -> Self {
        Self {
            u: key.lo(),
            v: key.hi(),
            weight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_key_is_unordered() {
        let a = EdgeKey::new(NodeId::new(5), NodeId::new(2)).unwrap();
        let b = EdgeKey::new(NodeId::new(2), NodeId::new(5)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.endpoints(), (NodeId::new(2), NodeId::new(5)));
    }

    #[test]
    fn test_edge_key_rejects_self_loop() {
        assert!(EdgeKey::new(NodeId::new(4), NodeId::new(4)).is_none());
    }

    #[test]
    fn test_edge_key_ordering() {
        let e1 = EdgeKey::new(NodeId::new(1), NodeId::new(2)).unwrap();
        let e2 = EdgeKey::new(NodeId::new(1), NodeId::new(3)).unwrap();
        let e3 = EdgeKey::new(NodeId::new(2), NodeId::new(3)).unwrap();
        assert!(e1 < e2);
        assert!(e2 < e3);
    }
}
