//! Logical content of one emitted slice.
//!
//! A `SliceReport` is what the snapshot emitter hands to a sink. It is fully
//! canonical: communities, edges, merges and splits are sorted, so two runs
//! over the same stream produce identical reports and fingerprints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::canonical::canonical_hash_hex;
use super::edge::WeightedEdge;
use super::ids::{CommunityId, NodeId};

/// A surviving community and its sorted members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityRecord {
    /// Community id (the canonical, lowest id for its member set).
    pub id: CommunityId,
    /// Members in ascending order.
    pub members: Vec<NodeId>,
}

/// Communities found to have an identical member set at snapshot time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRecord {
    /// Surviving (lowest) id.
    pub canonical: CommunityId,
    /// Ids absorbed into `canonical`, ascending.
    pub absorbed: Vec<CommunityId>,
}

/// A community whose induced subgraph split into several components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitEvent {
    /// Id of the community that split.
    pub origin: CommunityId,
    /// Ids allocated for the detached components, in allocation order.
    pub spawned: Vec<CommunityId>,
}

/// Everything persisted for one slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceReport {
    /// Slice index, starting at 0.
    pub index: u64,
    /// Time of the first event of the slice.
    pub window_start: Option<DateTime<Utc>>,
    /// Time of the event that closed the slice (or the last event at end of stream).
    pub window_end: Option<DateTime<Utc>>,
    /// Insertion events processed during the slice, self-loops excluded.
    pub added: u64,
    /// Removal checks processed during the slice.
    pub removed: u64,
    /// Surviving communities, ascending by id.
    pub communities: Vec<CommunityRecord>,
    /// Live edges, ascending by endpoints.
    pub edges: Vec<WeightedEdge>,
    /// Merges detected at this boundary, ascending by canonical id.
    pub merges: Vec<MergeRecord>,
    /// Splits recorded while the slice was open.
    pub splits: Vec<SplitEvent>,
}

impl SliceReport {
    /// Fingerprint of the structural content (communities, edges, merges, splits).
    ///
    /// Window times and counters are excluded so the fingerprint only
    /// changes when the graph or community state does.
    pub fn fingerprint(&self) -> String {
        let input = FingerprintInput {
            index: self.index,
            communities: &self.communities,
            edges: &self.edges,
            merges: &self.merges,
            splits: &self.splits,
        };
        canonical_hash_hex(&input)
    }

    /// Summary line for the run manifest.
    pub fn summary(&self) -> SliceSummary {
        SliceSummary {
            index: self.index,
            window_start: self.window_start,
            window_end: self.window_end,
            added: self.added,
            removed: self.removed,
            community_count: self.communities.len(),
            edge_count: self.edges.len(),
            merge_count: self.merges.len(),
            split_count: self.splits.len(),
            fingerprint: self.fingerprint(),
        }
    }
}

/// Counts and fingerprint of one slice, without the bulk content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceSummary {
    /// Slice index.
    pub index: u64,
    /// Time of the first event of the slice.
    pub window_start: Option<DateTime<Utc>>,
    /// Time the slice was closed.
    pub window_end: Option<DateTime<Utc>>,
    /// Insertion events processed.
    pub added: u64,
    /// Removal checks processed.
    pub removed: u64,
    /// Number of surviving communities.
    pub community_count: usize,
    /// Number of live edges.
    pub edge_count: usize,
    /// Number of merge records.
    pub merge_count: usize,
    /// Number of split events.
    pub split_count: usize,
    /// xxh64 fingerprint of the report.
    pub fingerprint: String,
}

#[derive(Serialize)]
struct FingerprintInput<'a> {
    index: u64,
    communities: &'a [CommunityRecord],
    edges: &'a [WeightedEdge],
    merges: &'a [MergeRecord],
    splits: &'a [SplitEvent],
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn report(index: u64) -> SliceReport {
        SliceReport {
            index,
            window_start: None,
            window_end: None,
            added: 0,
            removed: 0,
            communities: vec![CommunityRecord {
                id: CommunityId::new(1),
                members: vec![NodeId::new(1), NodeId::new(2), NodeId::new(3)],
            }],
            edges: vec![],
            merges: vec![],
            splits: vec![],
        }
    }

    #[test]
    fn test_fingerprint_ignores_counters_and_times() {
        let a = report(0);
        let mut b = report(0);
        b.added = 42;
        b.window_end = Some(Utc.timestamp_opt(100, 0).unwrap());
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_fingerprint_tracks_structure() {
        let a = report(0);
        let mut b = report(0);
        b.communities[0].members.push(NodeId::new(4));
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), report(1).fingerprint());
    }

    #[test]
    fn test_summary_counts() {
        let summary = report(3).summary();
        assert_eq!(summary.index, 3);
        assert_eq!(summary.community_count, 1);
        assert_eq!(summary.edge_count, 0);
        assert_eq!(summary.fingerprint.len(), 16);
    }
}
