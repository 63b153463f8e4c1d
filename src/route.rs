//! The route graph: story nodes, the choices between them, and the status
//! rules that keep the two consistent as the player reports progress.

pub mod graph;
pub mod node;
pub mod status;

pub use graph::{Progress, RouteGraph, ROOT_ID};
pub use node::{validate_id, Edge, Node};
pub use status::NodeStatus;
