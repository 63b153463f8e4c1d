use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle of a story node.
///
/// `Undiscovered` nodes are known to exist but nothing recorded leads to
/// them yet, `Available` nodes are reachable through a recorded choice,
/// and `Visited` nodes have been confirmed by the player. `Visited` is
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Undiscovered,
    Available,
    Visited,
}

impl NodeStatus {
    /// Status after a recorded choice points at a node in this status.
    /// Only an undiscovered node changes; available and visited nodes keep
    /// their status.
    pub fn on_reached(self) -> NodeStatus {
        match self {
            NodeStatus::Undiscovered => NodeStatus::Available,
            NodeStatus::Available => NodeStatus::Available,
            NodeStatus::Visited => NodeStatus::Visited,
        }
    }

    /// Status after the player reports visiting the node. Always `Visited`;
    /// an undiscovered node passes through `Available` implicitly.
    pub fn on_visit(self) -> NodeStatus {
        match self {
            NodeStatus::Undiscovered | NodeStatus::Available | NodeStatus::Visited => {
                NodeStatus::Visited
            }
        }
    }

    /// Whether a choice may be recorded from a node in this status.
    pub fn can_branch(self) -> bool {
        match self {
            NodeStatus::Undiscovered => false,
            NodeStatus::Available | NodeStatus::Visited => true,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeStatus::Undiscovered => "undiscovered",
            NodeStatus::Available => "available",
            NodeStatus::Visited => "visited",
        }
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
