//! Insertion reaction: common-neighbor propagation.

use std::collections::BTreeSet;
use tracing::debug;

use crate::types::{CommunityId, NodeId};
use super::context::EngineContext;

impl EngineContext {
    /// React to a newly created edge `(u, v)` with common neighbors `common`.
    ///
    /// A community spreads when two of `u`, `v`, `z` are already central in
    /// it: `z` and `v` carry it to `u`, `z` and `u` carry it to `v`, and `u`
    /// and `v` carry any community they share to `z`. If nothing spreads, the
    /// triangle(s) closed by this edge found a new community.
    pub(crate) fn propagate(&mut self, u: NodeId, v: NodeId, common: &BTreeSet<NodeId>) {
        if common.is_empty() {
            return;
        }

        let coms_u = self.graph().central_in(u);
        let coms_v = self.graph().central_in(v);
        let shared: BTreeSet<CommunityId> = coms_u.intersection(&coms_v).copied().collect();
        let only_u: BTreeSet<CommunityId> = coms_u.difference(&coms_v).copied().collect();
        let only_v: BTreeSet<CommunityId> = coms_v.difference(&coms_u).copied().collect();

        let mut propagated = false;

        for &z in common {
            for cid in self.graph().central_in(z) {
                if only_v.contains(&cid) {
                    self.add_to_community(u, cid);
                    propagated = true;
                }
                if only_u.contains(&cid) {
                    self.add_to_community(v, cid);
                    propagated = true;
                }
            }

            for &cid in &shared {
                if !self.graph().is_central_in(z, cid) {
                    self.add_to_community(z, cid);
                    propagated = true;
                }
            }
        }

        if !propagated {
            let cid = self.allocate_community();
            self.add_to_community(u, cid);
            self.add_to_community(v, cid);
            for &z in common {
                self.add_to_community(z, cid);
            }
            debug!(community = %cid, size = common.len() + 2, "community created");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::EngineContext;
    use crate::types::{CommunityId, NodeId};

    fn n(id: u64) -> NodeId {
        NodeId::new(id)
    }

    fn members(ctx: &EngineContext, cid: u64) -> Vec<u64> {
        ctx.communities()
            .members(CommunityId::new(cid))
            .map(|m| m.iter().map(|n| n.get()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_closing_triangle_creates_community() {
        let mut ctx = EngineContext::new();
        ctx.insert_edge(n(1), n(2));
        ctx.insert_edge(n(2), n(3));
        assert!(ctx.communities().is_empty());
        ctx.insert_edge(n(1), n(3));
        assert_eq!(members(&ctx, 1), vec![1, 2, 3]);
    }

    #[test]
    fn test_reinforcing_edge_does_not_evolve() {
        let mut ctx = EngineContext::new();
        ctx.insert_edge(n(1), n(2));
        ctx.insert_edge(n(2), n(3));
        ctx.insert_edge(n(1), n(3));
        let before = ctx.clone();
        ctx.insert_edge(n(3), n(1));
        assert_eq!(ctx.communities(), before.communities());
        assert_eq!(ctx.graph().weight(n(1), n(3)), Some(2));
    }

    #[test]
    fn test_community_spreads_to_new_endpoint() {
        let mut ctx = EngineContext::new();
        for (u, v) in [(1, 2), (2, 3), (1, 3), (3, 4)] {
            ctx.insert_edge(n(u), n(v));
        }
        // 4-1 closes triangle 1-3-4: 1 and 3 are central in c1, so 4 joins.
        ctx.insert_edge(n(4), n(1));
        assert_eq!(members(&ctx, 1), vec![1, 2, 3, 4]);
        assert_eq!(ctx.communities().len(), 1);
        ctx.check_invariants().unwrap();
    }

    #[test]
    fn test_shared_community_spreads_to_common_neighbor() {
        let mut ctx = EngineContext::new();
        for (u, v) in [(1, 2), (2, 3), (1, 3), (1, 5), (2, 5)] {
            ctx.insert_edge(n(u), n(v));
        }
        // (2,5) closes triangle 1-2-5; 2 and 1 are central in c1, so 5 joins.
        assert_eq!(members(&ctx, 1), vec![1, 2, 3, 5]);
    }

    #[test]
    fn test_disjoint_triangles_get_distinct_communities() {
        let mut ctx = EngineContext::new();
        for (u, v) in [(1, 2), (2, 3), (1, 3), (7, 8), (8, 9), (7, 9)] {
            ctx.insert_edge(n(u), n(v));
        }
        assert_eq!(members(&ctx, 1), vec![1, 2, 3]);
        assert_eq!(members(&ctx, 2), vec![7, 8, 9]);
    }
}
