//! Time-to-live eviction over a min-heap of pending checks.

use chrono::{DateTime, Utc};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use tracing::trace;

use crate::engine::{EngineContext, RemovalBatch};
use crate::types::{elapsed_days, EdgeAction, EdgeEvent, NodeId};
use super::{apply_explicit_removal, EvictionStrategy};

/// A scheduled expiry check for one insertion of an edge.
///
/// Ordered by timestamp first, so a `Reverse` max-heap pops the oldest check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PendingRemoval {
    /// When the insertion (or the last decrement) happened.
    pub timestamp: DateTime<Utc>,
    /// First endpoint.
    pub u: NodeId,
    /// Second endpoint.
    pub v: NodeId,
    /// Edge weight when the check was scheduled.
    pub weight: u32,
}

/// TTL-driven eviction.
///
/// With `ttl_days == None` nothing is ever scheduled and edges live forever.
#[derive(Debug, Clone, Default)]
pub struct TtlEviction {
    ttl_days: Option<u32>,
    queue: BinaryHeap<Reverse<PendingRemoval>>,
}

impl TtlEviction {
    /// Create a scheduler with the given time-to-live in days.
    pub fn new(ttl_days: Option<u32>) -> Self {
        Self {
            ttl_days,
            queue: BinaryHeap::new(),
        }
    }

    /// Time-to-live in days, `None` for infinite.
    pub fn ttl_days(&self) -> Option<u32> {
        self.ttl_days
    }

    /// Oldest scheduled check.
    pub fn peek(&self) -> Option<&PendingRemoval> {
        self.queue.peek().map(|Reverse(entry)| entry)
    }

    /// Schedule a check.
    pub fn schedule(&mut self, entry: PendingRemoval) {
        self.queue.push(Reverse(entry));
    }

    /// Resolve every check that is at least `ttl` whole days older than `now`.
    ///
    /// A check on an edge with several copies removes one copy and
    /// reschedules at `now`; a check on the last copy deletes the edge.
    /// Checks for edges that are already gone are counted and skipped.
    pub fn drain(&mut self, ctx: &mut EngineContext, now: DateTime<Utc>) -> RemovalBatch {
        let mut batch = RemovalBatch::new();
        let Some(ttl) = self.ttl_days else {
            return batch;
        };

        while let Some(&Reverse(entry)) = self.queue.peek() {
            if elapsed_days(entry.timestamp, now) < i64::from(ttl) {
                break;
            }
            self.queue.pop();
            ctx.record_removal();

            if !ctx.graph().has_edge(entry.u, entry.v) {
                continue;
            }

            match ctx.decrement_edge(entry.u, entry.v) {
                Some(left) => {
                    trace!(u = %entry.u, v = %entry.v, weight = left, "edge copy expired");
                    self.schedule(PendingRemoval {
                        timestamp: now,
                        u: entry.u,
                        v: entry.v,
                        weight: left,
                    });
                }
                None => {
                    trace!(u = %entry.u, v = %entry.v, "edge expired");
                    ctx.remove_edge(entry.u, entry.v, &mut batch);
                }
            }
        }

        batch
    }
}

impl EvictionStrategy for TtlEviction {
    fn name(&self) -> &'static str {
        "ttl"
    }

    fn propose_next_removals(&mut self, ctx: &mut EngineContext, event: &EdgeEvent) -> RemovalBatch {
        match event.action {
            EdgeAction::Remove => apply_explicit_removal(ctx, event),
            EdgeAction::Insert if self.ttl_days.is_none() => RemovalBatch::new(),
            EdgeAction::Insert => {
                let weight = ctx.graph().weight(event.u, event.v).unwrap_or(0) + 1;
                self.schedule(PendingRemoval {
                    timestamp: event.timestamp,
                    u: event.u,
                    v: event.v,
                    weight,
                });
                self.drain(ctx, event.timestamp)
            }
        }
    }

    fn pending(&self) -> usize {
        self.queue.len()
    }
}
