//! Removal reaction: centrality-based reconciliation and split detection.

use std::collections::{BTreeMap, BTreeSet};

use crate::types::{CommunityId, NodeId};
use super::centrality::centrality_test;
use super::context::EngineContext;

/// Communities touched by one batch of edge deletions.
///
/// For every affected community, accumulates the union of `{u, v}` and
/// their common neighbors over all deleted edges `(u, v)` the community
/// depended on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalBatch {
    affected: BTreeMap<CommunityId, BTreeSet<NodeId>>,
}

impl RemovalBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `nodes` into the affected set of `cid`.
    pub fn affect<I>(&mut self, cid: CommunityId, nodes: I)
    where
        I: IntoIterator<Item = NodeId>,
    {
        self.affected.entry(cid).or_default().extend(nodes);
    }

    /// Affected set accumulated for `cid`.
    pub fn affected(&self, cid: CommunityId) -> Option<&BTreeSet<NodeId>> {
        self.affected.get(&cid)
    }

    /// Whether no community was affected.
    pub fn is_empty(&self) -> bool {
        self.affected.is_empty()
    }

    /// Number of affected communities.
    pub fn len(&self) -> usize {
        self.affected.len()
    }
}

impl EngineContext {
    /// Reconcile every community touched by `batch`.
    ///
    /// Communities are visited in ascending id order. A community with at
    /// most 3 members is destroyed. Otherwise its induced subgraph is split
    /// into connected components (largest first, ties on smallest member):
    /// the first keeps the id, every later component with more than 3 nodes
    /// may become a new community, and the resulting ids are logged as a
    /// split.
    pub fn reconcile(&mut self, batch: RemovalBatch) {
        for (cid, affected) in batch.affected {
            let Some(members) = self.communities().members(cid).cloned() else {
                continue;
            };

            if members.len() <= 3 {
                self.destroy_community(cid);
                continue;
            }

            let components = self.graph().connected_components(&members);
            let mut components = components.into_iter();
            let Some(first) = components.next() else {
                self.destroy_community(cid);
                continue;
            };

            if first.len() < 3 {
                self.destroy_community(cid);
            } else {
                let candidates: BTreeSet<NodeId> = first.intersection(&affected).copied().collect();
                self.refresh_after_removal(cid, &first, &candidates);
            }

            let mut spawned = Vec::new();
            for component in components.filter(|c| c.len() > 3) {
                let candidates: Vec<NodeId> = component.intersection(&affected).copied().collect();
                let central = centrality_test(self.graph(), candidates);
                if central.len() >= 3 {
                    let new_id = self.allocate_community();
                    for node in central {
                        self.add_to_community(node, new_id);
                    }
                    spawned.push(new_id);
                }
            }
            self.record_split(cid, spawned);
        }
    }

    /// Shrink `cid` to the surviving component `keep`.
    ///
    /// Members outside `keep` are dropped. `candidates` (the affected part of
    /// `keep`) are re-tested and those that are no longer central are dropped
    /// as well. If fewer than 3 central nodes are found the community is
    /// destroyed.
    fn refresh_after_removal(
        &mut self,
        cid: CommunityId,
        keep: &BTreeSet<NodeId>,
        candidates: &BTreeSet<NodeId>,
    ) {
        let central = centrality_test(self.graph(), candidates.iter().copied());

        let members = self.communities().members(cid).cloned().unwrap_or_default();
        for node in members.difference(keep) {
            self.remove_from_community(*node, cid);
        }

        if central.len() < 3 {
            self.destroy_community(cid);
            return;
        }

        for node in candidates.difference(&central) {
            self.remove_from_community(*node, cid);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(id: u64) -> NodeId {
        NodeId::new(id)
    }

    fn ctx_with(edges: &[(u64, u64)]) -> EngineContext {
        let mut ctx = EngineContext::new();
        for &(u, v) in edges {
            ctx.insert_edge(n(u), n(v));
        }
        ctx
    }

    fn remove(ctx: &mut EngineContext, u: u64, v: u64) {
        let mut batch = RemovalBatch::new();
        ctx.remove_edge(n(u), n(v), &mut batch);
        ctx.reconcile(batch);
    }

    fn members(ctx: &EngineContext, cid: u64) -> Option<Vec<u64>> {
        ctx.communities()
            .members(CommunityId::new(cid))
            .map(|m| m.iter().map(|n| n.get()).collect())
    }

    #[test]
    fn test_batch_merges_affected_sets() {
        let mut batch = RemovalBatch::new();
        let c = CommunityId::new(1);
        batch.affect(c, [n(1), n(2)]);
        batch.affect(c, [n(2), n(3)]);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.affected(c).unwrap().len(), 3);
    }

    fn reset_to_single_community(ctx: &mut EngineContext, nodes: &[u64]) -> CommunityId {
        for cid in ctx.communities().ids() {
            ctx.destroy_community(cid);
        }
        let cid = ctx.allocate_community();
        for &id in nodes {
            ctx.add_to_community(n(id), cid);
        }
        cid
    }

    #[test]
    fn test_community_without_triangles_is_destroyed() {
        let mut ctx = ctx_with(&[(1, 2), (2, 3), (1, 3), (1, 4), (2, 4)]);
        assert_eq!(members(&ctx, 1), Some(vec![1, 2, 3, 4]));
        remove(&mut ctx, 1, 2);
        // 1-3-2-4-1 is a 4-cycle: connected, but no triangle certifies anyone.
        assert_eq!(members(&ctx, 1), None);
        ctx.check_invariants().unwrap();
    }

    #[test]
    fn test_three_member_community_destroyed_outright() {
        let mut ctx = ctx_with(&[(1, 2), (2, 3), (1, 3), (1, 5), (2, 6)]);
        assert_eq!(members(&ctx, 1), Some(vec![1, 2, 3]));
        remove(&mut ctx, 1, 2);
        assert!(ctx.communities().is_empty());
        ctx.check_invariants().unwrap();
    }

    #[test]
    fn test_first_qualifying_triangle_wins() {
        // K4 on 1..4 produces two communities with the same members; the
        // snapshot emitter merges them later.
        let mut ctx = ctx_with(&[(1, 2), (1, 3), (2, 3), (1, 4), (2, 4), (3, 4)]);
        assert_eq!(members(&ctx, 1), Some(vec![1, 2, 3, 4]));
        assert_eq!(members(&ctx, 2), Some(vec![1, 2, 3, 4]));

        remove(&mut ctx, 1, 2);
        // Node 3 is certified through neighbor 1 first (triangle 1-3-4), and
        // node 2 has no smaller neighbor left, so 2 loses its membership.
        assert_eq!(members(&ctx, 1), Some(vec![1, 3, 4]));
        assert_eq!(members(&ctx, 2), Some(vec![1, 3, 4]));
        ctx.check_invariants().unwrap();
    }

    #[test]
    fn test_split_keeps_first_component_and_drops_small_rest() {
        let mut ctx = ctx_with(&[(1, 2), (2, 3), (1, 3), (3, 4), (4, 5)]);
        let cid = reset_to_single_community(&mut ctx, &[1, 2, 3, 4, 5]);
        remove(&mut ctx, 3, 4);

        assert_eq!(
            ctx.communities().members(cid).map(|m| m.len()),
            Some(3)
        );
        assert!(ctx.communities().is_member(cid, n(3)));
        assert!(!ctx.communities().is_member(cid, n(4)));
        assert_eq!(ctx.communities().len(), 1);
        assert!(ctx.slice().splits.is_empty());
        ctx.check_invariants().unwrap();
    }

    #[test]
    fn test_split_spawns_new_community_for_large_component() {
        let mut ctx = ctx_with(&[
            (1, 2), (1, 3), (2, 3), (1, 4), (3, 4), (1, 5), (2, 5),
            (6, 7), (6, 8), (6, 9), (7, 8), (7, 9), (8, 9),
            (5, 9),
        ]);
        let cid = reset_to_single_community(&mut ctx, &[1, 2, 3, 4, 5, 6, 7, 8, 9]);
        ctx.advance_slice();

        remove(&mut ctx, 5, 9);

        let kept: Vec<u64> = ctx.communities().members(cid).unwrap().iter().map(|n| n.get()).collect();
        assert_eq!(kept, vec![1, 2, 3, 4, 5]);

        let splits = ctx.take_splits();
        assert_eq!(splits.len(), 1);
        assert_eq!(splits[0].origin, cid);
        assert_eq!(splits[0].spawned.len(), 1);
        let spawned: Vec<u64> = ctx
            .communities()
            .members(splits[0].spawned[0])
            .unwrap()
            .iter()
            .map(|n| n.get())
            .collect();
        assert_eq!(spawned, vec![6, 7, 8, 9]);
        ctx.check_invariants().unwrap();
    }

    #[test]
    fn test_first_component_too_small_destroys_community() {
        // Members {1,2} and {3,4} become disconnected: the first component has 2 nodes.
        let mut ctx = ctx_with(&[(1, 2), (2, 3), (3, 4), (1, 5), (2, 5), (3, 6), (4, 6)]);
        let cid = reset_to_single_community(&mut ctx, &[1, 2, 3, 4]);
        remove(&mut ctx, 2, 3);
        assert!(!ctx.communities().contains(cid));
        ctx.check_invariants().unwrap();
    }
}
