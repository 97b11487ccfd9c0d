//! Stream processor: drives the engine over an ordered event stream.
//!
//! ## Per-event flow
//!
//! 1. If at least `obs_days` whole days passed since the last boundary, the
//!    open slice is emitted first.
//! 2. Self-loops are counted and otherwise ignored.
//! 3. The eviction strategy applies due removals; their impact is reconciled.
//! 4. Insertions are applied to the graph, which may grow or create communities.
//!
//! Events are assumed to arrive in non-decreasing timestamp order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, warn};

use crate::config::{KernelConfig, RemovalMode};
use crate::engine::EngineContext;
use crate::error::KernelError;
use crate::eviction::EvictionStrategy;
use crate::input::InputError;
use crate::snapshot::{SnapshotEmitter, SnapshotSink};
use crate::types::{elapsed_days, EdgeAction, EdgeEvent};

/// Totals reported when a stream has been consumed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSummary {
    /// Records processed, self-loops included.
    pub events: u64,
    /// Self-loop records skipped.
    pub self_loops: u64,
    /// Slices emitted.
    pub slices: u64,
    /// Communities alive at the end.
    pub communities: usize,
    /// Edges alive at the end.
    pub edges: usize,
    /// Nodes alive at the end.
    pub nodes: usize,
}

/// Single-writer driver of the engine, eviction strategy and snapshot sink.
pub struct StreamProcessor<S, K> {
    config: KernelConfig,
    ctx: EngineContext,
    strategy: S,
    sink: K,
    emitter: SnapshotEmitter,
    last_boundary: Option<DateTime<Utc>>,
    window_start: Option<DateTime<Utc>>,
    last_seen: Option<DateTime<Utc>>,
    events: u64,
    self_loops: u64,
    check_invariants: bool,
    finished: bool,
    started: Instant,
}

impl<S: EvictionStrategy, K: SnapshotSink> StreamProcessor<S, K> {
    /// Create a processor after validating `config`.
    pub fn new(config: KernelConfig, strategy: S, sink: K) -> Result<Self, KernelError> {
        config.validate()?;
        if config.mode == RemovalMode::Explicit && config.ttl_days.is_some() {
            warn!("ttl is ignored in explicit removal mode");
        }
        info!(
            mode = %config.mode,
            strategy = strategy.name(),
            ttl_days = ?config.ttl_days,
            obs_days = config.obs_days,
            "stream processor started"
        );
        Ok(Self {
            config,
            ctx: EngineContext::new(),
            strategy,
            sink,
            emitter: SnapshotEmitter::new(),
            last_boundary: None,
            window_start: None,
            last_seen: None,
            events: 0,
            self_loops: 0,
            check_invariants: false,
            finished: false,
            started: Instant::now(),
        })
    }

    /// Verify engine invariants after every event (slow; meant for tests).
    pub fn with_invariant_checks(mut self, enabled: bool) -> Self {
        self.check_invariants = enabled;
        self
    }

    /// Engine state.
    pub fn context(&self) -> &EngineContext {
        &self.ctx
    }

    /// The eviction strategy.
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// The snapshot sink.
    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Consume the processor, returning the sink.
    pub fn into_sink(self) -> K {
        self.sink
    }

    /// Process one event.
    pub fn process(&mut self, event: &EdgeEvent) -> Result<(), KernelError> {
        let now = event.timestamp;
        let last_boundary = *self.last_boundary.get_or_insert(now);
        self.window_start.get_or_insert(now);

        if elapsed_days(last_boundary, now) >= i64::from(self.config.obs_days) {
            self.close_slice(Some(now))?;
            self.last_boundary = Some(now);
            self.window_start = Some(now);
        }

        self.events += 1;
        self.last_seen = Some(now);

        if event.is_self_loop() {
            self.self_loops += 1;
            return Ok(());
        }

        if event.action == EdgeAction::Insert {
            self.ctx.record_addition();
        }

        let batch = self.strategy.propose_next_removals(&mut self.ctx, event);
        self.ctx.reconcile(batch);

        if event.action == EdgeAction::Insert {
            self.ctx.insert_edge(event.u, event.v);
        }

        if self.check_invariants {
            self.ctx.check_invariants()?;
        }
        Ok(())
    }

    /// Process every event, then emit the final slice.
    ///
    /// Stops at the first input error.
    pub fn run<I>(mut self, events: I) -> Result<(StreamSummary, K), KernelError>
    where
        I: IntoIterator<Item = Result<EdgeEvent, InputError>>,
    {
        for event in events {
            self.process(&event?)?;
        }
        let summary = self.finish()?;
        Ok((summary, self.sink))
    }

    /// Emit the final slice and close the sink. Idempotent.
    pub fn finish(&mut self) -> Result<StreamSummary, KernelError> {
        if !self.finished {
            self.close_slice(self.last_seen)?;
            self.sink.finish()?;
            self.finished = true;
            info!(
                events = self.events,
                slices = self.emitter.emitted(),
                merged = self.emitter.merged_total(),
                elapsed_ms = self.started.elapsed().as_millis() as u64,
                "stream finished"
            );
        }
        Ok(self.summary())
    }

    /// Totals so far.
    pub fn summary(&self) -> StreamSummary {
        StreamSummary {
            events: self.events,
            self_loops: self.self_loops,
            slices: self.emitter.emitted(),
            communities: self.ctx.communities().len(),
            edges: self.ctx.graph().num_edges(),
            nodes: self.ctx.graph().num_nodes(),
        }
    }

    fn close_slice(&mut self, window_end: Option<DateTime<Utc>>) -> Result<(), KernelError> {
        let slice_started = Instant::now();
        let report = self.emitter.emit(&mut self.ctx, self.window_start, window_end);
        self.sink.write_slice(&report)?;

        info!(
            slice = report.index,
            window_start = ?report.window_start,
            window_end = ?report.window_end,
            added = report.added,
            removed = report.removed,
            communities = report.communities.len(),
            merged = report.merges.iter().map(|m| m.absorbed.len()).sum::<usize>(),
            splits = report.splits.len(),
            edges = report.edges.len(),
            pending = self.strategy.pending(),
            fingerprint = %report.fingerprint(),
            elapsed_ms = slice_started.elapsed().as_millis() as u64,
            "slice saved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eviction::{ExplicitEviction, TtlEviction};
    use crate::snapshot::MemorySnapshotSink;
    use chrono::{Duration, TimeZone};

    fn t(day: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_500_000_000, 0).unwrap() + Duration::days(day)
    }

    fn processor(config: KernelConfig) -> StreamProcessor<TtlEviction, MemorySnapshotSink> {
        StreamProcessor::new(config.clone(), TtlEviction::new(config.ttl_days), MemorySnapshotSink::new())
            .unwrap()
            .with_invariant_checks(true)
    }

    #[test]
    fn test_rejects_invalid_config() {
        let result = StreamProcessor::new(
            KernelConfig::default().with_obs(0),
            TtlEviction::new(None),
            MemorySnapshotSink::new(),
        );
        assert!(matches!(result, Err(KernelError::Config(_))));
    }

    #[test]
    fn test_slices_follow_observation_window() {
        let mut p = processor(KernelConfig::default().with_obs(2));
        for day in [0, 1, 2, 3, 5] {
            p.process(&EdgeEvent::insert(1u64, 2u64, t(day))).unwrap();
        }
        p.finish().unwrap();
        let reports = p.sink().reports();
        // Boundaries at day 2 and day 5, plus the final flush.
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].added, 2);
        assert_eq!(reports[1].added, 2);
        assert_eq!(reports[2].added, 1);
        assert_eq!(reports[0].window_end, Some(t(2)));
        assert_eq!(reports[2].edges[0].weight, 5);
    }

    #[test]
    fn test_self_loop_changes_nothing() {
        let mut p = processor(KernelConfig::default().with_ttl(1));
        p.process(&EdgeEvent::insert(1u64, 2u64, t(0))).unwrap();
        let before = p.context().clone();
        let pending = p.strategy().pending();
        p.process(&EdgeEvent::insert(3u64, 3u64, t(0))).unwrap();
        assert_eq!(p.context(), &before);
        assert_eq!(p.strategy().pending(), pending);
        assert_eq!(p.summary().self_loops, 1);
    }

    #[test]
    fn test_finish_is_idempotent() {
        let mut p = processor(KernelConfig::default());
        p.process(&EdgeEvent::insert(1u64, 2u64, t(0))).unwrap();
        let first = p.finish().unwrap();
        let second = p.finish().unwrap();
        assert_eq!(first, second);
        assert_eq!(p.sink().reports().len(), 1);
        assert!(p.sink().is_finished());
    }

    #[test]
    fn test_explicit_mode_removal() {
        let config = KernelConfig::default().with_mode(RemovalMode::Explicit);
        let mut p = StreamProcessor::new(config, ExplicitEviction::new(), MemorySnapshotSink::new())
            .unwrap()
            .with_invariant_checks(true);
        p.process(&EdgeEvent::insert(1u64, 2u64, t(0))).unwrap();
        p.process(&EdgeEvent::remove(1u64, 2u64, t(0))).unwrap();
        let summary = p.finish().unwrap();
        assert_eq!(summary.edges, 0);
        assert_eq!(p.sink().reports()[0].removed, 1);
        assert_eq!(p.sink().reports()[0].added, 1);
    }

    #[test]
    fn test_run_stops_on_input_error() {
        let p = processor(KernelConfig::default());
        let events = vec![
            Ok(EdgeEvent::insert(1u64, 2u64, t(0))),
            Err(InputError::Malformed { line: 2, reason: "bad".into() }),
        ];
        assert!(matches!(p.run(events), Err(KernelError::Input(_))));
    }
}
