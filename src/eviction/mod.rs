//! Edge eviction strategies.
//!
//! A strategy decides which edges age out as events arrive. Two
//! implementations share the same engine and snapshot emitter:
//!
//! - [`TtlEviction`]: every insertion schedules a time-to-live check in a
//!   min-heap; due checks are drained on each later insertion.
//! - [`ExplicitEviction`]: removals come straight from `-` records in the
//!   input stream.
//!
//! Strategies apply deletions through [`EngineContext`] and hand back the
//! [`RemovalBatch`] of affected communities; the caller reconciles it once
//! per event.

pub mod ttl;
pub mod explicit;

use crate::config::{KernelConfig, RemovalMode};
use crate::engine::{EngineContext, RemovalBatch};
use crate::types::EdgeEvent;

pub use ttl::{PendingRemoval, TtlEviction};
pub use explicit::ExplicitEviction;

/// Capability interface for eviction strategies.
pub trait EvictionStrategy {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Apply every removal that `event` makes due.
    ///
    /// Called before an insertion is applied to the graph. Deleted edges'
    /// impact on communities is accumulated in the returned batch.
    fn propose_next_removals(&mut self, ctx: &mut EngineContext, event: &EdgeEvent) -> RemovalBatch;

    /// Number of scheduled checks still waiting.
    fn pending(&self) -> usize {
        0
    }
}

impl<S: EvictionStrategy + ?Sized> EvictionStrategy for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn propose_next_removals(&mut self, ctx: &mut EngineContext, event: &EdgeEvent) -> RemovalBatch {
        (**self).propose_next_removals(ctx, event)
    }

    fn pending(&self) -> usize {
        (**self).pending()
    }
}

/// Build the strategy selected by `config`.
pub fn strategy_for(config: &KernelConfig) -> Box<dyn EvictionStrategy> {
    match config.mode {
        RemovalMode::Ttl => Box::new(TtlEviction::new(config.ttl_days)),
        RemovalMode::Explicit => Box::new(ExplicitEviction::new()),
    }
}

/// Delete `(event.u, event.v)` outright, as a `-` record asks.
///
/// A missing edge is counted but changes nothing.
pub(crate) fn apply_explicit_removal(ctx: &mut EngineContext, event: &EdgeEvent) -> RemovalBatch {
    let mut batch = RemovalBatch::new();
    ctx.record_removal();
    ctx.remove_edge(event.u, event.v, &mut batch);
    batch
}
