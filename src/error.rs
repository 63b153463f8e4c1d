use std::io;

use thiserror::Error;

/// Every failure the route graph, the session layer, and the external
/// collaborators can report. The command layer maps each kind to its own
/// exit code via [`RouteError::exit_code`].
#[derive(Error, Debug)]
pub enum RouteError {
    #[error("node '{0}' does not exist")]
    UnknownNode(String),
    #[error("node '{id}' already exists with label '{existing}'")]
    DuplicateNode { id: String, existing: String },
    #[error("invalid transition: {0}")]
    InvalidTransition(String),
    #[error("node '{id}' is still referenced by {edges} edge(s)")]
    NodeInUse { id: String, edges: usize },
    #[error("node '{0}' is the root of the graph and cannot be removed")]
    ProtectedNode(String),
    #[error("invalid id '{0}': use letters, digits, '_', '-' or '.' and start with a letter or digit")]
    InvalidId(String),
    #[error("game '{0}' does not exist")]
    GameNotFound(String),
    #[error("game '{0}' already exists")]
    GameAlreadyExists(String),
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("render error: {0}")]
    Render(String),
    #[error("config error: {0}")]
    Config(String),
}

impl RouteError {
    /// Process exit code for this error kind. Zero and one are reserved for
    /// success and failures that did not originate in the core.
    pub fn exit_code(&self) -> u8 {
        match self {
            RouteError::UnknownNode(_) => 2,
            RouteError::DuplicateNode { .. } => 3,
            RouteError::InvalidTransition(_) => 4,
            RouteError::NodeInUse { .. } => 5,
            RouteError::ProtectedNode(_) => 6,
            RouteError::InvalidId(_) => 7,
            RouteError::GameNotFound(_) => 8,
            RouteError::GameAlreadyExists(_) => 9,
            RouteError::Persistence(_) | RouteError::Io(_) => 10,
            RouteError::Render(_) => 11,
            RouteError::Config(_) => 12,
        }
    }
}

pub type Result<T> = std::result::Result<T, RouteError>;
