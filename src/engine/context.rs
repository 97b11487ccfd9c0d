//! The engine context: single owner of all mutable algorithm state.

use std::collections::BTreeSet;
use tracing::debug;

use crate::store::{CommunityTable, EdgeDecrement, EdgeUpsert, GraphStore};
use crate::types::{CommunityId, NodeId, SplitEvent};
use super::reconcile::RemovalBatch;

/// Counters and buffers of the slice currently open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SliceState {
    /// Index of the open slice, starting at 0.
    pub index: u64,
    /// Insertion events since the last boundary. Self-loop records are not
    /// counted here; the processor tallies them separately.
    pub added: u64,
    /// Removal checks since the last boundary.
    pub removed: u64,
    /// Split events recorded since the last boundary.
    pub splits: Vec<SplitEvent>,
}

/// Graph, community table and slice state, mutated in lockstep.
///
/// Every membership change goes through [`add_to_community`](Self::add_to_community),
/// [`remove_from_community`](Self::remove_from_community) or
/// [`destroy_community`](Self::destroy_community), which update both the
/// community's member set and the node's `central_in` set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineContext {
    graph: GraphStore,
    communities: CommunityTable,
    slice: SliceState,
}

impl EngineContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// The graph.
    pub fn graph(&self) -> &GraphStore {
        &self.graph
    }

    /// The community table.
    pub fn communities(&self) -> &CommunityTable {
        &self.communities
    }

    /// State of the open slice.
    pub fn slice(&self) -> &SliceState {
        &self.slice
    }

    /// Allocate a new community id.
    ///
    /// Side effect: an empty member set is registered under the id before it
    /// is returned, so the id is live even before any member is added.
    pub fn allocate_community(&mut self) -> CommunityId {
        self.communities.allocate()
    }

    /// Make `node` a central member of `cid`.
    ///
    /// Unknown nodes are ignored so the two sides never diverge.
    pub fn add_to_community(&mut self, node: NodeId, cid: CommunityId) {
        if self.graph.mark_central(node, cid) {
            self.communities.insert_member(cid, node);
        }
    }

    /// Remove `node` from `cid` on both sides.
    pub fn remove_from_community(&mut self, node: NodeId, cid: CommunityId) {
        self.communities.remove_member(cid, node);
        self.graph.unmark_central(node, cid);
    }

    /// Strip every member from `cid` and drop the community.
    pub fn destroy_community(&mut self, cid: CommunityId) {
        if let Some(members) = self.communities.remove(cid) {
            for node in members {
                self.graph.unmark_central(node, cid);
            }
            debug!(community = %cid, "community destroyed");
        }
    }

    /// Strip `node` from every community it belongs to.
    pub fn strip_node(&mut self, node: NodeId) {
        for cid in self.graph.central_in(node) {
            self.remove_from_community(node, cid);
        }
    }

    /// Apply one insertion of `(u, v)` and react to it.
    ///
    /// Only a newly created edge can change communities; reinforcing an
    /// existing edge just bumps its weight.
    pub fn insert_edge(&mut self, u: NodeId, v: NodeId) -> EdgeUpsert {
        let outcome = self.graph.upsert_edge(u, v);
        if outcome == EdgeUpsert::Created
            && self.graph.degree(u) > 1
            && self.graph.degree(v) > 1
        {
            let common = self.graph.common_neighbors(u, v);
            self.propagate(u, v, &common);
        }
        outcome
    }

    /// Drop one unit of multiplicity from an edge whose weight is above 1.
    ///
    /// Never deletes the edge: a last copy must go through
    /// [`remove_edge`](Self::remove_edge) so its impact is classified.
    pub fn decrement_edge(&mut self, u: NodeId, v: NodeId) -> Option<u32> {
        match self.graph.weight(u, v) {
            Some(w) if w > 1 => match self.graph.decrement_or_remove_edge(u, v) {
                EdgeDecrement::Decremented(left) => Some(left),
                EdgeDecrement::Missing | EdgeDecrement::Removed => None,
            },
            _ => None,
        }
    }

    /// Delete `(u, v)` outright, recording which communities it affects.
    ///
    /// If both endpoints have other neighbors, every community they share is
    /// queued in `batch` with `{u, v}` plus their common neighbors. Otherwise
    /// the endpoint that is about to drop below two neighbors is stripped
    /// from all of its communities right away. Returns false if the edge did
    /// not exist.
    ///
    /// Degrees are taken before the edge is deleted: an endpoint counts as
    /// having other neighbors when its degree is above 1, so the two ends of a
    /// triangle edge are queued rather than stripped.
    pub fn remove_edge(&mut self, u: NodeId, v: NodeId, batch: &mut RemovalBatch) -> bool {
        if !self.graph.has_edge(u, v) {
            return false;
        }

        if self.graph.degree(u) > 1 && self.graph.degree(v) > 1 {
            let shared: BTreeSet<CommunityId> = self
                .graph
                .central_in(u)
                .intersection(&self.graph.central_in(v))
                .copied()
                .collect();
            if !shared.is_empty() {
                let common = self.graph.common_neighbors(u, v);
                for cid in shared {
                    batch.affect(cid, [u, v].into_iter().chain(common.iter().copied()));
                }
            }
        } else {
            if self.graph.degree(u) < 2 {
                self.strip_node(u);
            }
            if self.graph.degree(v) < 2 {
                self.strip_node(v);
            }
        }

        self.graph.remove_edge(u, v);
        true
    }

    /// Count one processed insertion event.
    pub fn record_addition(&mut self) {
        self.slice.added += 1;
    }

    /// Count one processed removal check.
    pub fn record_removal(&mut self) {
        self.slice.removed += 1;
    }

    /// Buffer a split event, unless the first slice is still open.
    pub(crate) fn record_split(&mut self, origin: CommunityId, spawned: Vec<CommunityId>) {
        if spawned.is_empty() || self.slice.index == 0 {
            return;
        }
        debug!(community = %origin, spawned = ?spawned, "community split");
        self.slice.splits.push(SplitEvent { origin, spawned });
    }

    /// Take the buffered split events, leaving the buffer empty.
    pub fn take_splits(&mut self) -> Vec<SplitEvent> {
        std::mem::take(&mut self.slice.splits)
    }

    /// Close the open slice: bump the index and reset the counters.
    pub fn advance_slice(&mut self) {
        self.slice.index += 1;
        self.slice.added = 0;
        self.slice.removed = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(id: u64) -> NodeId {
        NodeId::new(id)
    }

    fn triangle() -> EngineContext {
        let mut ctx = EngineContext::new();
        ctx.insert_edge(n(1), n(2));
        ctx.insert_edge(n(2), n(3));
        ctx.insert_edge(n(1), n(3));
        ctx
    }

    #[test]
    fn test_allocate_registers_before_members() {
        let mut ctx = EngineContext::new();
        let cid = ctx.allocate_community();
        assert!(ctx.communities().contains(cid));
        assert_eq!(ctx.communities().size(cid), 0);
    }

    #[test]
    fn test_membership_is_bidirectional() {
        let mut ctx = triangle();
        let cid = CommunityId::new(1);
        assert!(ctx.graph().is_central_in(n(2), cid));
        assert!(ctx.communities().is_member(cid, n(2)));

        ctx.remove_from_community(n(2), cid);
        assert!(!ctx.graph().is_central_in(n(2), cid));
        assert!(!ctx.communities().is_member(cid, n(2)));
        ctx.check_invariants().unwrap();
    }

    #[test]
    fn test_add_to_unknown_node_is_ignored() {
        let mut ctx = EngineContext::new();
        let cid = ctx.allocate_community();
        ctx.add_to_community(n(99), cid);
        assert_eq!(ctx.communities().size(cid), 0);
        ctx.check_invariants().unwrap();
    }

    #[test]
    fn test_destroy_clears_both_sides() {
        let mut ctx = triangle();
        let cid = CommunityId::new(1);
        ctx.destroy_community(cid);
        assert!(!ctx.communities().contains(cid));
        for id in 1..=3 {
            assert!(ctx.graph().central_in(n(id)).is_empty());
        }
        ctx.check_invariants().unwrap();
    }

    #[test]
    fn test_remove_edge_queues_shared_communities() {
        let mut ctx = triangle();
        ctx.insert_edge(n(3), n(4));
        let mut batch = RemovalBatch::new();
        assert!(ctx.remove_edge(n(1), n(2), &mut batch));
        let affected = batch.affected(CommunityId::new(1)).unwrap();
        assert_eq!(affected.iter().map(|n| n.get()).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_removal_degree_measured_before_deletion() {
        let mut ctx = triangle();
        let cid = CommunityId::new(1);
        let mut batch = RemovalBatch::new();
        assert!(ctx.remove_edge(n(1), n(2), &mut batch));

        // Both ends had degree 2, so they are queued, not stripped.
        assert_eq!(batch.len(), 1);
        assert!(ctx.communities().is_member(cid, n(1)));
        assert!(ctx.communities().is_member(cid, n(2)));
        assert_eq!(ctx.graph().degree(n(1)), 1);
        ctx.check_invariants().unwrap();
    }

    #[test]
    fn test_remove_edge_strips_low_degree_endpoint() {
        let mut ctx = triangle();
        ctx.insert_edge(n(3), n(4));
        let cid = CommunityId::new(1);
        // Make 4 a member artificially so the strip is observable.
        ctx.add_to_community(n(4), cid);
        let mut batch = RemovalBatch::new();
        ctx.remove_edge(n(3), n(4), &mut batch);
        assert!(batch.is_empty());
        assert!(!ctx.communities().is_member(cid, n(4)));
        assert!(!ctx.graph().has_node(n(4)));
        ctx.check_invariants().unwrap();
    }

    #[test]
    fn test_remove_missing_edge_is_noop() {
        let mut ctx = triangle();
        let before = ctx.clone();
        let mut batch = RemovalBatch::new();
        assert!(!ctx.remove_edge(n(1), n(7), &mut batch));
        assert_eq!(ctx, before);
    }

    #[test]
    fn test_decrement_edge_keeps_last_copy() {
        let mut ctx = EngineContext::new();
        ctx.insert_edge(n(1), n(2));
        ctx.insert_edge(n(1), n(2));
        assert_eq!(ctx.decrement_edge(n(1), n(2)), Some(1));
        assert_eq!(ctx.decrement_edge(n(1), n(2)), None);
        assert!(ctx.graph().has_edge(n(1), n(2)));
    }

    #[test]
    fn test_splits_not_recorded_in_first_slice() {
        let mut ctx = EngineContext::new();
        ctx.record_split(CommunityId::new(1), vec![CommunityId::new(2)]);
        assert!(ctx.take_splits().is_empty());

        ctx.advance_slice();
        ctx.record_split(CommunityId::new(1), vec![CommunityId::new(2)]);
        ctx.record_split(CommunityId::new(3), vec![]);
        assert_eq!(ctx.take_splits().len(), 1);
        assert!(ctx.slice().splits.is_empty());
    }
}
