//! Core types for the community kernel.

pub mod ids;
pub mod edge;
pub mod event;
pub mod report;

pub use ids::{NodeId, CommunityId};
pub use edge::{EdgeKey, WeightedEdge};
pub use event::{EdgeAction, EdgeEvent, elapsed_days};
pub use report::{CommunityRecord, MergeRecord, SplitEvent, SliceReport, SliceSummary};
