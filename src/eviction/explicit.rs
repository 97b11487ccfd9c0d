//! Removal driven by explicit `-` records.

use crate::engine::{EngineContext, RemovalBatch};
use crate::types::{EdgeAction, EdgeEvent};
use super::{apply_explicit_removal, EvictionStrategy};

/// Instruction-driven eviction: edges only disappear when the stream says so.
///
/// A removal deletes the edge whatever its multiplicity.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplicitEviction;

impl ExplicitEviction {
    /// Create the strategy.
    pub fn new() -> Self {
        Self
    }
}

impl EvictionStrategy for ExplicitEviction {
    fn name(&self) -> &'static str {
        "explicit"
    }

    fn propose_next_removals(&mut self, ctx: &mut EngineContext, event: &EdgeEvent) -> RemovalBatch {
        match event.action {
            EdgeAction::Insert => RemovalBatch::new(),
            EdgeAction::Remove => apply_explicit_removal(ctx, event),
        }
    }
}
