//! Undirected multigraph with per-node community membership.
//!
//! Uses BTreeMap/BTreeSet throughout so every traversal, and therefore every
//! community decision derived from one, is deterministic.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::types::{CommunityId, EdgeKey, NodeId, WeightedEdge};

/// Per-node state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeRecord {
    /// Adjacent nodes.
    neighbors: BTreeSet<NodeId>,
    /// Communities in which this node is a central member.
    central_in: BTreeSet<CommunityId>,
}

impl NodeRecord {
    /// Adjacent nodes.
    pub fn neighbors(&self) -> &BTreeSet<NodeId> {
        &self.neighbors
    }

    /// Communities in which this node is central.
    pub fn central_in(&self) -> &BTreeSet<CommunityId> {
        &self.central_in
    }
}

/// Per-edge state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRecord {
    /// Multiplicity. An edge whose weight would reach 0 is deleted instead.
    pub weight: u32,
}

/// Outcome of [`GraphStore::upsert_edge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeUpsert {
    /// `u == v`; nothing was touched.
    SelfLoop,
    /// The edge did not exist and now has weight 1.
    Created,
    /// The edge existed; its weight was incremented to the contained value
    /// (saturating at `u32::MAX`).
    Reinforced(u32),
}

/// Outcome of [`GraphStore::decrement_or_remove_edge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeDecrement {
    /// No such edge.
    Missing,
    /// Weight was above 1 and is now the contained value.
    Decremented(u32),
    /// Weight was 1; the edge is gone.
    Removed,
}

/// In-memory graph store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphStore {
    nodes: BTreeMap<NodeId, NodeRecord>,
    edges: BTreeMap<EdgeKey, EdgeRecord>,
}

impl GraphStore {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure a node exists. Returns true if it was created.
    ///
    /// A new node starts with no neighbors and an empty `central_in` set.
    pub fn upsert_node(&mut self, id: NodeId) -> bool {
        if self.nodes.contains_key(&id) {
            return false;
        }
        self.nodes.insert(id, NodeRecord::default());
        true
    }

    /// Add one unit of multiplicity to `(u, v)`, creating endpoints as needed.
    pub fn upsert_edge(&mut self, u: NodeId, v: NodeId) -> EdgeUpsert {
        let Some(key) = EdgeKey::new(u, v) else {
            return EdgeUpsert::SelfLoop;
        };
        self.upsert_node(u);
        self.upsert_node(v);

        if let Some(record) = self.edges.get_mut(&key) {
            record.weight = record.weight.saturating_add(1);
            return EdgeUpsert::Reinforced(record.weight);
        }

        self.edges.insert(key, EdgeRecord { weight: 1 });
        self.link(u, v);
        EdgeUpsert::Created
    }

    /// Remove one unit of multiplicity, deleting the edge when it was the last.
    pub fn decrement_or_remove_edge(&mut self, u: NodeId, v: NodeId) -> EdgeDecrement {
        let Some(key) = EdgeKey::new(u, v) else {
            return EdgeDecrement::Missing;
        };
        match self.edges.get_mut(&key) {
            None => EdgeDecrement::Missing,
            Some(record) if record.weight > 1 => {
                record.weight -= 1;
                EdgeDecrement::Decremented(record.weight)
            }
            Some(_) => {
                self.remove_edge(u, v);
                EdgeDecrement::Removed
            }
        }
    }

    /// Delete `(u, v)` regardless of multiplicity. Returns the weight it had.
    ///
    /// Endpoints left without neighbors and without community membership
    /// are dropped from the store.
    pub fn remove_edge(&mut self, u: NodeId, v: NodeId) -> Option<u32> {
        let key = EdgeKey::new(u, v)?;
        let record = self.edges.remove(&key)?;
        self.unlink(u, v);
        self.prune_if_isolated(u);
        self.prune_if_isolated(v);
        Some(record.weight)
    }

    /// Whether `(u, v)` is a live edge.
    pub fn has_edge(&self, u: NodeId, v: NodeId) -> bool {
        EdgeKey::new(u, v).is_some_and(|key| self.edges.contains_key(&key))
    }

    /// Current multiplicity of `(u, v)`.
    pub fn weight(&self, u: NodeId, v: NodeId) -> Option<u32> {
        EdgeKey::new(u, v).and_then(|key| self.edges.get(&key).map(|r| r.weight))
    }

    /// Whether the node exists.
    pub fn has_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Node record, if present.
    pub fn node(&self, id: NodeId) -> Option<&NodeRecord> {
        self.nodes.get(&id)
    }

    /// Neighbors of a node (empty for unknown nodes).
    pub fn neighbors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .get(&id)
            .into_iter()
            .flat_map(|n| n.neighbors.iter().copied())
    }

    /// Number of distinct neighbors.
    pub fn degree(&self, id: NodeId) -> usize {
        self.nodes.get(&id).map_or(0, |n| n.neighbors.len())
    }

    /// `neighbors(u) ∩ neighbors(v)`. Never contains `u` or `v`.
    pub fn common_neighbors(&self, u: NodeId, v: NodeId) -> BTreeSet<NodeId> {
        match (self.nodes.get(&u), self.nodes.get(&v)) {
            (Some(a), Some(b)) => a
                .neighbors
                .intersection(&b.neighbors)
                .copied()
                .filter(|&z| z != u && z != v)
                .collect(),
            _ => BTreeSet::new(),
        }
    }

    /// Communities in which `id` is central (empty for unknown nodes).
    pub fn central_in(&self, id: NodeId) -> BTreeSet<CommunityId> {
        self.nodes
            .get(&id)
            .map(|n| n.central_in.clone())
            .unwrap_or_default()
    }

    /// Whether `id` is central in community `cid`.
    pub fn is_central_in(&self, id: NodeId, cid: CommunityId) -> bool {
        self.nodes
            .get(&id)
            .is_some_and(|n| n.central_in.contains(&cid))
    }

    /// Record `cid` in the node's `central_in` set. Returns false for unknown nodes.
    pub(crate) fn mark_central(&mut self, id: NodeId, cid: CommunityId) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.central_in.insert(cid);
                true
            }
            None => false,
        }
    }

    /// Drop `cid` from the node's `central_in` set. Returns true if it was there.
    pub(crate) fn unmark_central(&mut self, id: NodeId, cid: CommunityId) -> bool {
        let removed = self
            .nodes
            .get_mut(&id)
            .is_some_and(|node| node.central_in.remove(&cid));
        if removed {
            self.prune_if_isolated(id);
        }
        removed
    }

    /// Connected components of the subgraph induced by `members`.
    ///
    /// Members unknown to the graph form singleton components. Components
    /// are ordered by size descending, then by smallest member ascending.
    pub fn connected_components(&self, members: &BTreeSet<NodeId>) -> Vec<BTreeSet<NodeId>> {
        let mut seen: BTreeSet<NodeId> = BTreeSet::new();
        let mut components = Vec::new();

        for &start in members {
            if !seen.insert(start) {
                continue;
            }
            let mut component = BTreeSet::from([start]);
            let mut queue = VecDeque::from([start]);
            while let Some(n) = queue.pop_front() {
                for m in self.neighbors(n) {
                    if members.contains(&m) && seen.insert(m) {
                        component.insert(m);
                        queue.push_back(m);
                    }
                }
            }
            components.push(component);
        }

        components.sort_by(|a, b| {
            b.len()
                .cmp(&a.len())
                .then_with(|| a.first().cmp(&b.first()))
        });
        components
    }

    /// All live edges in canonical order.
    pub fn edges(&self) -> impl Iterator<Item = WeightedEdge> + '_ {
        self.edges
            .iter()
            .map(|(key, record)| WeightedEdge::new(*key, record.weight))
    }

    /// All nodes in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &NodeRecord)> + '_ {
        self.nodes.iter().map(|(id, record)| (*id, record))
    }

    /// Number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of live edges.
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    fn link(&mut self, u: NodeId, v: NodeId) {
        if let Some(node) = self.nodes.get_mut(&u) {
            node.neighbors.insert(v);
        }
        if let Some(node) = self.nodes.get_mut(&v) {
            node.neighbors.insert(u);
        }
    }

    fn unlink(&mut self, u: NodeId, v: NodeId) {
        if let Some(node) = self.nodes.get_mut(&u) {
            node.neighbors.remove(&v);
        }
        if let Some(node) = self.nodes.get_mut(&v) {
            node.neighbors.remove(&u);
        }
    }

    fn prune_if_isolated(&mut self, id: NodeId) {
        let isolated = self
            .nodes
            .get(&id)
            .is_some_and(|n| n.neighbors.is_empty() && n.central_in.is_empty());
        if isolated {
            self.nodes.remove(&id);
        }
    }
}
