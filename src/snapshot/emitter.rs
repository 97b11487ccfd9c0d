//! Slice canonicalization and merge detection.

use chrono::{DateTime, Utc};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use tracing::debug;

use crate::engine::EngineContext;
use crate::types::{CommunityId, CommunityRecord, MergeRecord, NodeId, SliceReport};

/// Turns the live engine state into a [`SliceReport`] and closes the slice.
#[derive(Debug, Clone, Default)]
pub struct SnapshotEmitter {
    emitted: u64,
    merged_total: u64,
}

impl SnapshotEmitter {
    /// Create an emitter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slices emitted so far.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Total communities absorbed by merges so far.
    pub fn merged_total(&self) -> u64 {
        self.merged_total
    }

    /// Emit the open slice.
    ///
    /// 1. Takes the buffered split events.
    /// 2. Keys every community by its sorted member list. Communities with
    ///    2 members or fewer are dropped; when two communities share a key
    ///    the lower id survives and the higher is recorded as absorbed.
    /// 3. Captures the surviving communities and the full edge list.
    /// 4. Destroys dropped and absorbed communities.
    /// 5. Advances the slice index and resets the counters.
    pub fn emit(
        &mut self,
        ctx: &mut EngineContext,
        window_start: Option<DateTime<Utc>>,
        window_end: Option<DateTime<Utc>>,
    ) -> SliceReport {
        let splits = ctx.take_splits();

        let mut by_key: BTreeMap<Vec<NodeId>, CommunityId> = BTreeMap::new();
        let mut merges: BTreeMap<CommunityId, Vec<CommunityId>> = BTreeMap::new();
        let mut doomed: Vec<CommunityId> = Vec::new();

        // Ascending id order, so the first holder of a key is its lowest id.
        for (cid, members) in ctx.communities().iter() {
            if members.len() <= 2 {
                doomed.push(cid);
                continue;
            }
            match by_key.entry(members.iter().copied().collect()) {
                Entry::Vacant(slot) => {
                    slot.insert(cid);
                }
                Entry::Occupied(slot) => {
                    merges.entry(*slot.get()).or_default().push(cid);
                    doomed.push(cid);
                }
            }
        }

        let mut communities: Vec<CommunityRecord> = by_key
            .into_iter()
            .map(|(members, id)| CommunityRecord { id, members })
            .collect();
        communities.sort_by_key(|c| c.id);

        let merges: Vec<MergeRecord> = merges
            .into_iter()
            .map(|(canonical, absorbed)| MergeRecord { canonical, absorbed })
            .collect();
        let merged: usize = merges.iter().map(|m| m.absorbed.len()).sum();

        let slice = ctx.slice();
        let report = SliceReport {
            index: slice.index,
            window_start,
            window_end,
            added: slice.added,
            removed: slice.removed,
            communities,
            edges: ctx.graph().edges().collect(),
            merges,
            splits,
        };

        for cid in doomed {
            ctx.destroy_community(cid);
        }
        ctx.advance_slice();

        self.emitted += 1;
        self.merged_total += merged as u64;
        debug!(slice = report.index, merged, "slice canonicalized");

        report
    }
}
