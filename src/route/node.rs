use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RouteError};
use crate::route::status::NodeStatus;

/// Slugs used for node ids and game names. Game names double as file
/// stems, so path separators and leading dots are excluded.
static SLUG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.\-]*$").expect("slug pattern is valid")
});

/// Reject anything that is not a slug.
pub fn validate_id(id: &str) -> Result<()> {
    if SLUG.is_match(id) {
        Ok(())
    } else {
        Err(RouteError::InvalidId(id.to_string()))
    }
}

/// One identifiable state or checkpoint in the story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Graph key; stable once created.
    pub id: String,
    pub label: String,
    pub status: NodeStatus,
    /// Endings are leaves the player reaches at the end of a route.
    #[serde(default, skip_serializing_if = "is_false")]
    pub ending: bool,
}

impl Node {
    pub fn new(id: impl Into<String>, label: impl Into<String>, status: NodeStatus) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            status,
            ending: false,
        }
    }

    pub fn ending(id: impl Into<String>, label: impl Into<String>, status: NodeStatus) -> Self {
        Self {
            ending: true,
            ..Self::new(id, label, status)
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A recorded choice or transition between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    /// What the player picked, if they bothered to write it down.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Edge {
    /// Build an edge, treating a blank label as no label.
    pub fn new(from: impl Into<String>, to: impl Into<String>, label: Option<&str>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            label: label
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string),
        }
    }

    pub fn touches(&self, id: &str) -> bool {
        self.from == id || self.to == id
    }
}
