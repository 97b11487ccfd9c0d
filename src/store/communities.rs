//! Community id → member set table.
//!
//! The table only knows about its own side of the membership relation. The
//! node side (`central_in`) lives in the [`GraphStore`](super::GraphStore);
//! [`EngineContext`](crate::engine::EngineContext) is the only writer and
//! keeps both sides in step.

use std::collections::{BTreeMap, BTreeSet};

use crate::types::{CommunityId, NodeId};

/// Live communities and the id allocator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommunityTable {
    members: BTreeMap<CommunityId, BTreeSet<NodeId>>,
    last_id: u64,
}

impl CommunityTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh id and register an empty member set under it.
    ///
    /// Ids start at 1 and are never reused, even after the community is destroyed.
    pub fn allocate(&mut self) -> CommunityId {
        self.last_id += 1;
        let id = CommunityId::new(self.last_id);
        self.members.insert(id, BTreeSet::new());
        id
    }

    /// Add `node` to `cid`, registering `cid` if needed. Returns true if newly added.
    pub(crate) fn insert_member(&mut self, cid: CommunityId, node: NodeId) -> bool {
        self.members.entry(cid).or_default().insert(node)
    }

    /// Remove `node` from `cid`. Returns true if it was a member.
    pub(crate) fn remove_member(&mut self, cid: CommunityId, node: NodeId) -> bool {
        self.members
            .get_mut(&cid)
            .is_some_and(|set| set.remove(&node))
    }

    /// Drop `cid` entirely, returning its former members.
    pub(crate) fn remove(&mut self, cid: CommunityId) -> Option<BTreeSet<NodeId>> {
        self.members.remove(&cid)
    }

    /// Members of `cid`.
    pub fn members(&self, cid: CommunityId) -> Option<&BTreeSet<NodeId>> {
        self.members.get(&cid)
    }

    /// Whether `cid` is live.
    pub fn contains(&self, cid: CommunityId) -> bool {
        self.members.contains_key(&cid)
    }

    /// Whether `node` is a member of `cid`.
    pub fn is_member(&self, cid: CommunityId, node: NodeId) -> bool {
        self.members.get(&cid).is_some_and(|set| set.contains(&node))
    }

    /// Size of `cid` (0 if unknown).
    pub fn size(&self, cid: CommunityId) -> usize {
        self.members.get(&cid).map_or(0, BTreeSet::len)
    }

    /// Live communities in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (CommunityId, &BTreeSet<NodeId>)> + '_ {
        self.members.iter().map(|(id, set)| (*id, set))
    }

    /// Live community ids in ascending order.
    pub fn ids(&self) -> Vec<CommunityId> {
        self.members.keys().copied().collect()
    }

    /// Number of live communities.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether no community is live.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Last id handed out by [`allocate`](Self::allocate), 0 if none.
    pub fn last_allocated(&self) -> u64 {
        self.last_id
    }
}
