//! Triadic centrality test.

use std::collections::BTreeSet;

use crate::store::GraphStore;
use crate::types::NodeId;

/// Nodes certified as central by triadic closure.
///
/// Each candidate `u` (in ascending order, skipping ones already certified)
/// is central if some full-graph neighbor `v < u` shares at least one
/// neighbor with it. The first such `v` wins: `u`, `v` and all of their
/// common neighbors are certified together, and no further pair is checked
/// for `u`.
///
/// Adjacency is taken from the whole graph even though only `candidates`
/// are visited, so the result may contain nodes outside `candidates`.
pub fn centrality_test<I>(graph: &GraphStore, candidates: I) -> BTreeSet<NodeId>
where
    I: IntoIterator<Item = NodeId>,
{
    let mut central = BTreeSet::new();
    let ordered: BTreeSet<NodeId> = candidates.into_iter().collect();

    for u in ordered {
        if central.contains(&u) || graph.degree(u) < 2 {
            continue;
        }
        for v in graph.neighbors(u).filter(|&v| v < u) {
            let common = graph.common_neighbors(u, v);
            if !common.is_empty() {
                central.insert(u);
                central.insert(v);
                central.extend(common);
                break;
            }
        }
    }

    central
}
