//! Identifier types for nodes and communities.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a node in the evolving graph.
///
/// Node ids come straight from the input stream. `Ord` is used as the
/// canonical tie-break when a pair of nodes must only be visited once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    /// Create a new NodeId.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw integer id.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// Identifier of a community.
///
/// Allocated from a monotonically increasing counter starting at 1 and
/// never reused, so a lower id always means an older community.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommunityId(u64);

impl CommunityId {
    /// Create a new CommunityId.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw integer id.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CommunityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CommunityId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}
