//! Edge events consumed from the input stream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::NodeId;

/// What an input record asks the engine to do with an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeAction {
    /// Add one unit of multiplicity to the edge (`+`, or any TTL-mode line).
    Insert,
    /// Explicitly delete the edge (`-`).
    Remove,
}

impl EdgeAction {
    /// Parse an action marker.
    pub fn from_marker(s: &str) -> Option<Self> {
        match s {
            "+" => Some(Self::Insert),
            "-" => Some(Self::Remove),
            _ => None,
        }
    }
}

impl fmt::Display for EdgeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insert => write!(f, "+"),
            Self::Remove => write!(f, "-"),
        }
    }
}

/// One timestamped edge event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeEvent {
    /// Insert or remove.
    pub action: EdgeAction,
    /// Source endpoint.
    pub u: NodeId,
    /// Destination endpoint.
    pub v: NodeId,
    /// Event time.
    pub timestamp: DateTime<Utc>,
}

impl EdgeEvent {
    /// Create an insertion event.
    pub fn insert(u: impl Into<NodeId>, v: impl Into<NodeId>, timestamp: DateTime<Utc>) -> Self {
        Self {
            action: EdgeAction::Insert,
            u: u.into(),
            v: v.into(),
            timestamp,
        }
    }

    /// Create an explicit removal event.
    pub fn remove(u: impl Into<NodeId>, v: impl Into<NodeId>, timestamp: DateTime<Utc>) -> Self {
        Self {
            action: EdgeAction::Remove,
            u: u.into(),
            v: v.into(),
            timestamp,
        }
    }

    /// Whether both endpoints are the same node.
    pub fn is_self_loop(&self) -> bool {
        self.u == self.v
    }
}

/// Whole days elapsed from `earlier` to `later`.
///
/// Partial days are truncated; an `earlier` in the future yields a negative count.
pub fn elapsed_days(earlier: DateTime<Utc>, later: DateTime<Utc>) -> i64 {
    (later - earlier).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_action_markers() {
        assert_eq!(EdgeAction::from_marker("+"), Some(EdgeAction::Insert));
        assert_eq!(EdgeAction::from_marker("-"), Some(EdgeAction::Remove));
        assert_eq!(EdgeAction::from_marker("*"), None);
    }

    #[test]
    fn test_elapsed_days_truncates() {
        let t0 = Utc.timestamp_opt(1_000_000, 0).unwrap();
        assert_eq!(elapsed_days(t0, t0 + Duration::hours(47)), 1);
        assert_eq!(elapsed_days(t0, t0 + Duration::days(2)), 2);
        assert_eq!(elapsed_days(t0, t0), 0);
    }

    #[test]
    fn test_self_loop_detection() {
        let t0 = Utc.timestamp_opt(0, 0).unwrap();
        assert!(EdgeEvent::insert(3u64, 3u64, t0).is_self_loop());
        assert!(!EdgeEvent::remove(3u64, 4u64, t0).is_self_loop());
    }
}
