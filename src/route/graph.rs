use std::collections::{HashMap, HashSet, VecDeque};

use log::{debug, info};
use serde::Serialize;

use crate::error::{Result, RouteError};
use crate::render::{RenderEdge, RenderModel, RenderNode};
use crate::route::node::{validate_id, Edge, Node};
use crate::route::status::NodeStatus;

/// Reserved id of the node every game starts from.
pub const ROOT_ID: &str = "start";

/// Node counts per status plus how many endings have been seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub undiscovered: usize,
    pub available: usize,
    pub visited: usize,
    pub endings_known: usize,
    pub endings_reached: usize,
}

/// The route graph of one tracked game.
///
/// Nodes keep their insertion order so renders and listings are stable.
/// All mutation goes through the methods below, each of which leaves the
/// graph satisfying its invariants:
///   - every edge endpoint names an existing node
///   - no two edges share the same (from, to, label) triple
///   - an edge source is `Available` or `Visited`, and its target is not
///     `Undiscovered`
///   - the root exists and is `Visited`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGraph {
    root: String,
    current: String,
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
    edges: Vec<Edge>,
}

impl RouteGraph {
    /// Fresh graph holding only the visited root.
    pub fn new(root_label: impl Into<String>) -> Self {
        let root = Node::new(ROOT_ID, root_label, NodeStatus::Visited);
        let mut index = HashMap::new();
        index.insert(ROOT_ID.to_string(), 0);
        Self {
            root: ROOT_ID.to_string(),
            current: ROOT_ID.to_string(),
            nodes: vec![root],
            index,
            edges: Vec::new(),
        }
    }

    /// Rebuild a graph from its parts, checking every invariant. Used when
    /// materializing a persisted document.
    pub fn from_parts(
        root: String,
        current: String,
        nodes: Vec<Node>,
        edges: Vec<Edge>,
    ) -> Result<Self> {
        let invalid = |msg: String| RouteError::Persistence(format!("invalid graph document: {msg}"));

        let mut index = HashMap::with_capacity(nodes.len());
        for (pos, node) in nodes.iter().enumerate() {
            validate_id(&node.id).map_err(|e| invalid(e.to_string()))?;
            if index.insert(node.id.clone(), pos).is_some() {
                return Err(invalid(format!("node '{}' is listed twice", node.id)));
            }
        }

        if root != ROOT_ID {
            return Err(invalid(format!("root must be '{ROOT_ID}', found '{root}'")));
        }
        match index.get(&root).map(|&pos| &nodes[pos]) {
            None => return Err(invalid(format!("root node '{root}' is missing"))),
            Some(node) if node.status != NodeStatus::Visited => {
                return Err(invalid(format!("root node '{root}' is not visited")))
            }
            Some(_) => {}
        }
        match index.get(&current).map(|&pos| &nodes[pos]) {
            None => return Err(invalid(format!("current node '{current}' is missing"))),
            Some(node) if node.status == NodeStatus::Undiscovered => {
                return Err(invalid(format!("current node '{current}' was never reached")))
            }
            Some(_) => {}
        }

        // Stored labels go through the same blank-label rule as new choices.
        let edges: Vec<Edge> = edges
            .into_iter()
            .map(|e| Edge::new(e.from, e.to, e.label.as_deref()))
            .collect();

        let mut seen = HashSet::with_capacity(edges.len());
        for edge in &edges {
            let from = index
                .get(&edge.from)
                .map(|&pos| &nodes[pos])
                .ok_or_else(|| invalid(format!("edge source '{}' is missing", edge.from)))?;
            let to = index
                .get(&edge.to)
                .map(|&pos| &nodes[pos])
                .ok_or_else(|| invalid(format!("edge target '{}' is missing", edge.to)))?;
            if edge.from == edge.to {
                return Err(invalid(format!("edge '{}' loops onto itself", edge.from)));
            }
            if !from.status.can_branch() || to.status == NodeStatus::Undiscovered {
                return Err(invalid(format!(
                    "edge {} -> {} connects {} to {}",
                    edge.from, edge.to, from.status, to.status
                )));
            }
            if !seen.insert(edge) {
                return Err(invalid(format!(
                    "edge {} -> {} is listed twice",
                    edge.from, edge.to
                )));
            }
        }

        Ok(Self {
            root,
            current,
            nodes,
            index,
            edges,
        })
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn root(&self) -> &str {
        &self.root
    }

    /// The node the player last reported visiting.
    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&pos| &self.nodes[pos])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    fn require(&self, id: &str) -> Result<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| RouteError::UnknownNode(id.to_string()))
    }

    fn push_node(&mut self, node: Node) -> usize {
        let pos = self.nodes.len();
        self.index.insert(node.id.clone(), pos);
        self.nodes.push(node);
        pos
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Register a node that is known to exist but not reached yet.
    ///
    /// Adding an id that already exists is accepted only when the label is
    /// identical; a different label is a `DuplicateNode` error rather than a
    /// silent relabel.
    pub fn add_node(&mut self, id: &str, label: &str) -> Result<&Node> {
        validate_id(id)?;
        if let Some(&pos) = self.index.get(id) {
            let existing = &self.nodes[pos];
            if existing.label == label {
                return Ok(existing);
            }
            return Err(RouteError::DuplicateNode {
                id: id.to_string(),
                existing: existing.label.clone(),
            });
        }
        info!("Adding node {id} ({label})");
        let pos = self.push_node(Node::new(id, label, NodeStatus::Undiscovered));
        Ok(&self.nodes[pos])
    }

    /// Record a choice from `from` to `to`.
    ///
    /// `from` must already be reached. An unknown `to` is created on the
    /// spot, and an undiscovered target becomes available. Recording the
    /// same choice twice is a no-op that returns the existing edge.
    pub fn add_choice(&mut self, from: &str, to: &str, label: Option<&str>) -> Result<&Edge> {
        self.check_branch_source(from)?;
        validate_id(to)?;
        if from == to {
            return Err(RouteError::InvalidTransition(format!(
                "a choice cannot lead from '{from}' back to itself"
            )));
        }

        let edge = Edge::new(from, to, label);
        if let Some(pos) = self.edges.iter().position(|e| *e == edge) {
            debug!("Choice {from} -> {to} already recorded");
            return Ok(&self.edges[pos]);
        }

        let target = match self.index.get(to) {
            Some(&pos) => pos,
            None => {
                debug!("Creating target node {to}");
                self.push_node(Node::new(to, to, NodeStatus::Undiscovered))
            }
        };
        self.promote(target);

        info!(
            "Recording choice {from} -> {to}{}",
            edge.label
                .as_deref()
                .map(|l| format!(" ({l})"))
                .unwrap_or_default()
        );
        self.edges.push(edge);
        Ok(&self.edges[self.edges.len() - 1])
    }

    /// Record an ending reached from `from`. The ending gets the first free
    /// `E<n>` id and starts out available.
    pub fn add_ending(&mut self, from: &str, label: &str) -> Result<&Node> {
        self.check_branch_source(from)?;
        let id = self.next_ending_id();
        info!("Adding ending {id} ({label}) after {from}");
        let pos = self.push_node(Node::ending(&id, label, NodeStatus::Available));
        self.edges.push(Edge::new(from, id, None));
        Ok(&self.nodes[pos])
    }

    /// Mark a node as visited and make it the current position. Visiting a
    /// visited node changes nothing but the position.
    pub fn visit(&mut self, id: &str) -> Result<&Node> {
        let pos = self.require(id)?;
        let node = &mut self.nodes[pos];
        if node.status == NodeStatus::Visited {
            debug!("Node {id} was already visited");
        } else {
            info!("Visiting {id} (was {})", node.status);
        }
        node.status = node.status.on_visit();
        self.current = id.to_string();
        Ok(&self.nodes[pos])
    }

    pub fn relabel(&mut self, id: &str, label: &str) -> Result<&Node> {
        let pos = self.require(id)?;
        info!("Relabeling {id}: '{}' -> '{label}'", self.nodes[pos].label);
        self.nodes[pos].label = label.to_string();
        Ok(&self.nodes[pos])
    }

    /// Remove a node no edge refers to. The root can never be removed.
    pub fn remove_node(&mut self, id: &str) -> Result<Node> {
        let pos = self.require(id)?;
        if id == self.root {
            return Err(RouteError::ProtectedNode(id.to_string()));
        }
        let edges = self.edges.iter().filter(|e| e.touches(id)).count();
        if edges > 0 {
            return Err(RouteError::NodeInUse {
                id: id.to_string(),
                edges,
            });
        }

        info!("Removing node {id}");
        let removed = self.nodes.remove(pos);
        self.index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(pos, node)| (node.id.clone(), pos))
            .collect();
        if self.current == id {
            self.current = self.root.clone();
        }
        Ok(removed)
    }

    fn check_branch_source(&self, from: &str) -> Result<()> {
        match self.node(from) {
            None => Err(RouteError::InvalidTransition(format!(
                "cannot record a choice from '{from}': the node does not exist"
            ))),
            Some(node) if !node.status.can_branch() => Err(RouteError::InvalidTransition(format!(
                "cannot record a choice from '{from}': the node is {}",
                node.status
            ))),
            Some(_) => Ok(()),
        }
    }

    fn promote(&mut self, pos: usize) {
        let node = &mut self.nodes[pos];
        let next = node.status.on_reached();
        if next != node.status {
            debug!("Node {} is now {next}", node.id);
            node.status = next;
        }
    }

    fn next_ending_id(&self) -> String {
        (1..)
            .map(|n| format!("E{n}"))
            .find(|id| !self.contains(id))
            .unwrap_or_default()
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Choices recorded from `id`, in the order they were recorded.
    pub fn available_choices(&self, id: &str) -> Result<Vec<&Edge>> {
        self.require(id)?;
        Ok(self.edges.iter().filter(|e| e.from == id).collect())
    }

    /// Nodes a recorded choice leads to but the player has not tried yet.
    pub fn unvisited_branches(&self) -> Vec<&Node> {
        self.nodes
            .iter()
            .filter(|n| n.status == NodeStatus::Available)
            .collect()
    }

    pub fn endings(&self) -> Vec<&Node> {
        self.nodes.iter().filter(|n| n.ending).collect()
    }

    /// Reached nodes (available or visited) that no chain of edges connects
    /// to the root. Visiting a node the graph has no route to produces
    /// these until the missing choice is recorded.
    pub fn unreachable(&self) -> Vec<&Node> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut queue = VecDeque::from([self.root.as_str()]);
        seen.insert(self.root.as_str());
        while let Some(id) = queue.pop_front() {
            for edge in self.edges.iter().filter(|e| e.from == id) {
                if seen.insert(edge.to.as_str()) {
                    queue.push_back(edge.to.as_str());
                }
            }
        }
        self.nodes
            .iter()
            .filter(|n| n.status != NodeStatus::Undiscovered && !seen.contains(n.id.as_str()))
            .collect()
    }

    pub fn progress(&self) -> Progress {
        self.nodes.iter().fold(Progress::default(), |mut p, node| {
            match node.status {
                NodeStatus::Undiscovered => p.undiscovered += 1,
                NodeStatus::Available => p.available += 1,
                NodeStatus::Visited => p.visited += 1,
            }
            if node.ending {
                p.endings_known += 1;
                if node.status == NodeStatus::Visited {
                    p.endings_reached += 1;
                }
            }
            p
        })
    }

    /// Owned snapshot handed to a renderer.
    pub fn to_render_model(&self) -> RenderModel {
        RenderModel {
            nodes: self
                .nodes
                .iter()
                .map(|n| RenderNode {
                    id: n.id.clone(),
                    label: n.label.clone(),
                    status: n.status,
                    ending: n.ending,
                    current: n.id == self.current,
                })
                .collect(),
            edges: self
                .edges
                .iter()
                .map(|e| RenderEdge {
                    from: e.from.clone(),
                    to: e.to.clone(),
                    label: e.label.clone(),
                    taken: self
                        .node(&e.to)
                        .is_some_and(|n| n.status == NodeStatus::Visited),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo() -> RouteGraph {
        RouteGraph::new("Prologue")
    }

    #[test]
    fn test_new_graph_has_visited_root() {
        let graph = demo();
        let root = graph.node(ROOT_ID).unwrap();
        assert_eq!(root.status, NodeStatus::Visited);
        assert_eq!(root.label, "Prologue");
        assert_eq!(graph.current(), ROOT_ID);
        assert!(graph.edges().is_empty());
    }

    #[test]
    fn test_add_node_creates_undiscovered_stub() {
        let mut graph = demo();
        let node = graph.add_node("tower", "The tower").unwrap();
        assert_eq!(node.status, NodeStatus::Undiscovered);
        assert!(graph.unreachable().is_empty());
    }

    #[test]
    fn test_add_node_same_label_is_idempotent() {
        let mut graph = demo();
        graph.add_node("tower", "The tower").unwrap();
        graph.add_node("tower", "The tower").unwrap();
        assert_eq!(graph.nodes().len(), 2);
    }

    #[test]
    fn test_add_node_different_label_is_duplicate() {
        let mut graph = demo();
        graph.add_node("tower", "The tower").unwrap();
        let err = graph.add_node("tower", "Another tower").unwrap_err();
        assert!(matches!(err, RouteError::DuplicateNode { ref existing, .. } if existing == "The tower"));
        assert_eq!(graph.node("tower").unwrap().label, "The tower");
    }

    #[test]
    fn test_add_node_rejects_bad_id() {
        let mut graph = demo();
        assert!(matches!(
            graph.add_node("no spaces", "x"),
            Err(RouteError::InvalidId(_))
        ));
    }

    #[test]
    fn test_choice_to_unknown_target_is_available() {
        let mut graph = demo();
        graph.add_choice(ROOT_ID, "cave", Some("enter cave")).unwrap();
        let cave = graph.node("cave").unwrap();
        assert_eq!(cave.status, NodeStatus::Available);
        assert_eq!(cave.label, "cave");
    }

    #[test]
    fn test_choice_promotes_stub() {
        let mut graph = demo();
        graph.add_node("tower", "The tower").unwrap();
        graph.add_choice(ROOT_ID, "tower", None).unwrap();
        assert_eq!(graph.node("tower").unwrap().status, NodeStatus::Available);
        assert_eq!(graph.node("tower").unwrap().label, "The tower");
    }

    #[test]
    fn test_choice_keeps_visited_target() {
        let mut graph = demo();
        graph.add_choice(ROOT_ID, "cave", None).unwrap();
        graph.visit("cave").unwrap();
        graph.add_choice("cave", ROOT_ID, Some("go back")).unwrap();
        assert_eq!(graph.node(ROOT_ID).unwrap().status, NodeStatus::Visited);
    }

    #[test]
    fn test_duplicate_choice_yields_one_edge() {
        let mut graph = demo();
        graph.add_choice(ROOT_ID, "cave", Some("enter cave")).unwrap();
        graph.add_choice(ROOT_ID, "cave", Some("enter cave")).unwrap();
        assert_eq!(graph.edges().len(), 1);

        graph.add_choice(ROOT_ID, "cave", Some("sneak in")).unwrap();
        assert_eq!(graph.edges().len(), 2);
    }

    #[test]
    fn test_choice_from_missing_node_is_invalid() {
        let mut graph = demo();
        let err = graph.add_choice("ghost", "x", Some("l")).unwrap_err();
        assert!(matches!(err, RouteError::InvalidTransition(_)));
        assert!(!graph.contains("x"));
    }

    #[test]
    fn test_choice_from_undiscovered_node_is_invalid() {
        let mut graph = demo();
        graph.add_node("tower", "The tower").unwrap();
        let err = graph.add_choice("tower", "roof", None).unwrap_err();
        assert!(matches!(err, RouteError::InvalidTransition(_)));
        assert!(graph.edges().is_empty());
    }

    #[test]
    fn test_self_loop_is_invalid() {
        let mut graph = demo();
        assert!(matches!(
            graph.add_choice(ROOT_ID, ROOT_ID, None),
            Err(RouteError::InvalidTransition(_))
        ));
    }

    #[test]
    fn test_visit_is_idempotent() {
        let mut graph = demo();
        graph.add_choice(ROOT_ID, "cave", None).unwrap();
        graph.visit("cave").unwrap();
        let before = graph.clone();
        graph.visit("cave").unwrap();
        assert_eq!(graph, before);
        assert_eq!(graph.current(), "cave");
    }

    #[test]
    fn test_visit_unknown_node() {
        let mut graph = demo();
        assert!(matches!(graph.visit("nope"), Err(RouteError::UnknownNode(_))));
    }

    #[test]
    fn test_visit_stub_directly() {
        let mut graph = demo();
        graph.add_node("secret", "Secret room").unwrap();
        graph.visit("secret").unwrap();
        assert_eq!(graph.node("secret").unwrap().status, NodeStatus::Visited);
        let unreachable: Vec<&str> = graph.unreachable().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(unreachable, vec!["secret"]);

        graph.add_choice(ROOT_ID, "secret", None).unwrap();
        assert!(graph.unreachable().is_empty());
    }

    #[test]
    fn test_cave_scenario() {
        let mut graph = demo();
        graph.add_choice(ROOT_ID, "cave", Some("enter cave")).unwrap();
        assert_eq!(graph.node("cave").unwrap().status, NodeStatus::Available);
        let ids: Vec<&str> = graph.unvisited_branches().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["cave"]);

        graph.visit("cave").unwrap();
        assert_eq!(graph.node("cave").unwrap().status, NodeStatus::Visited);
        assert!(graph.unvisited_branches().is_empty());
    }

    #[test]
    fn test_available_choices_in_insertion_order() {
        let mut graph = demo();
        graph.add_choice(ROOT_ID, "b", None).unwrap();
        graph.add_choice(ROOT_ID, "a", None).unwrap();
        graph.visit("a").unwrap();
        graph.add_choice("a", "c", None).unwrap();

        let targets: Vec<&str> = graph
            .available_choices(ROOT_ID)
            .unwrap()
            .iter()
            .map(|e| e.to.as_str())
            .collect();
        assert_eq!(targets, vec!["b", "a"]);
        assert!(graph.available_choices("c").unwrap().is_empty());
        assert!(matches!(
            graph.available_choices("zzz"),
            Err(RouteError::UnknownNode(_))
        ));
    }

    #[test]
    fn test_remove_node_in_use() {
        let mut graph = demo();
        graph.add_choice(ROOT_ID, "cave", None).unwrap();
        let err = graph.remove_node("cave").unwrap_err();
        assert!(matches!(err, RouteError::NodeInUse { edges: 1, .. }));
        assert!(graph.contains("cave"));
    }

    #[test]
    fn test_remove_unreferenced_node() {
        let mut graph = demo();
        graph.add_node("typo", "Mistake").unwrap();
        graph.add_node("tower", "The tower").unwrap();
        let removed = graph.remove_node("typo").unwrap();
        assert_eq!(removed.id, "typo");
        assert!(!graph.contains("typo"));
        assert_eq!(graph.node("tower").unwrap().label, "The tower");
        assert!(matches!(graph.remove_node("typo"), Err(RouteError::UnknownNode(_))));
    }

    #[test]
    fn test_remove_root_is_protected() {
        let mut graph = demo();
        assert!(matches!(
            graph.remove_node(ROOT_ID),
            Err(RouteError::ProtectedNode(_))
        ));
    }

    #[test]
    fn test_remove_current_resets_position() {
        let mut graph = demo();
        graph.add_node("secret", "Secret").unwrap();
        graph.visit("secret").unwrap();
        graph.remove_node("secret").unwrap();
        assert_eq!(graph.current(), ROOT_ID);
    }

    #[test]
    fn test_endings_get_sequential_ids() {
        let mut graph = demo();
        graph.add_choice(ROOT_ID, "cave", None).unwrap();
        let first = graph.add_ending("cave", "Eaten by a grue").unwrap().id.clone();
        let second = graph.add_ending(ROOT_ID, "Stayed home").unwrap().id.clone();
        assert_eq!(first, "E1");
        assert_eq!(second, "E2");

        let ending = graph.node("E1").unwrap();
        assert!(ending.ending);
        assert_eq!(ending.status, NodeStatus::Available);
        assert_eq!(graph.endings().len(), 2);
    }

    #[test]
    fn test_ending_requires_reached_source() {
        let mut graph = demo();
        graph.add_node("tower", "The tower").unwrap();
        assert!(matches!(
            graph.add_ending("tower", "Fell"),
            Err(RouteError::InvalidTransition(_))
        ));
        assert!(graph.endings().is_empty());
    }

    #[test]
    fn test_progress_counts() {
        let mut graph = demo();
        graph.add_node("tower", "The tower").unwrap();
        graph.add_choice(ROOT_ID, "cave", None).unwrap();
        graph.add_ending(ROOT_ID, "Stayed home").unwrap();
        graph.visit("E1").unwrap();

        let progress = graph.progress();
        assert_eq!(progress.undiscovered, 1);
        assert_eq!(progress.available, 1);
        assert_eq!(progress.visited, 2);
        assert_eq!(progress.endings_known, 1);
        assert_eq!(progress.endings_reached, 1);
    }

    #[test]
    fn test_relabel() {
        let mut graph = demo();
        graph.add_choice(ROOT_ID, "cave", None).unwrap();
        assert_eq!(graph.relabel("cave", "Dark cave").unwrap().label, "Dark cave");
        assert!(matches!(graph.relabel("nope", "x"), Err(RouteError::UnknownNode(_))));
    }

    #[test]
    fn test_render_model_is_a_snapshot() {
        let mut graph = demo();
        graph.add_choice(ROOT_ID, "cave", Some("enter cave")).unwrap();
        let model = graph.to_render_model();
        graph.visit("cave").unwrap();

        assert_eq!(model.nodes.len(), 2);
        assert_eq!(model.nodes[1].status, NodeStatus::Available);
        assert!(model.nodes[0].current);
        assert_eq!(model.edges[0].label.as_deref(), Some("enter cave"));
    }

    #[test]
    fn test_from_parts_round_trips_a_valid_graph() {
        let mut graph = demo();
        graph.add_choice(ROOT_ID, "cave", None).unwrap();
        graph.add_node("tower", "The tower").unwrap();
        graph.visit("cave").unwrap();

        let rebuilt = RouteGraph::from_parts(
            graph.root().to_string(),
            graph.current().to_string(),
            graph.nodes().to_vec(),
            graph.edges().to_vec(),
        )
        .unwrap();
        assert_eq!(rebuilt, graph);
    }

    #[test]
    fn test_from_parts_rejects_dangling_edge() {
        let nodes = vec![Node::new(ROOT_ID, "Start", NodeStatus::Visited)];
        let edges = vec![Edge::new(ROOT_ID, "cave", None)];
        let err = RouteGraph::from_parts(ROOT_ID.into(), ROOT_ID.into(), nodes, edges).unwrap_err();
        assert!(matches!(err, RouteError::Persistence(_)));
    }

    #[test]
    fn test_from_parts_rejects_duplicate_ids_and_edges() {
        let nodes = vec![
            Node::new(ROOT_ID, "Start", NodeStatus::Visited),
            Node::new(ROOT_ID, "Again", NodeStatus::Visited),
        ];
        assert!(RouteGraph::from_parts(ROOT_ID.into(), ROOT_ID.into(), nodes, vec![]).is_err());

        let nodes = vec![
            Node::new(ROOT_ID, "Start", NodeStatus::Visited),
            Node::new("cave", "Cave", NodeStatus::Available),
        ];
        let edges = vec![Edge::new(ROOT_ID, "cave", None), Edge::new(ROOT_ID, "cave", None)];
        assert!(RouteGraph::from_parts(ROOT_ID.into(), ROOT_ID.into(), nodes, edges).is_err());
    }

    #[test]
    fn test_from_parts_rejects_edge_into_undiscovered() {
        let nodes = vec![
            Node::new(ROOT_ID, "Start", NodeStatus::Visited),
            Node::new("cave", "Cave", NodeStatus::Undiscovered),
        ];
        let edges = vec![Edge::new(ROOT_ID, "cave", None)];
        assert!(RouteGraph::from_parts(ROOT_ID.into(), ROOT_ID.into(), nodes, edges).is_err());
    }

    #[test]
    fn test_from_parts_treats_blank_labels_as_none() {
        let nodes = vec![
            Node::new(ROOT_ID, "Start", NodeStatus::Visited),
            Node::new("cave", "Cave", NodeStatus::Available),
        ];
        let stored = Edge {
            from: ROOT_ID.into(),
            to: "cave".into(),
            label: Some("  ".into()),
        };
        let mut graph =
            RouteGraph::from_parts(ROOT_ID.into(), ROOT_ID.into(), nodes.clone(), vec![stored.clone()])
                .unwrap();
        assert_eq!(graph.edges()[0].label, None);

        graph.add_choice(ROOT_ID, "cave", Some("")).unwrap();
        graph.add_choice(ROOT_ID, "cave", None).unwrap();
        assert_eq!(graph.edges().len(), 1);

        let edges = vec![stored, Edge::new(ROOT_ID, "cave", None)];
        assert!(RouteGraph::from_parts(ROOT_ID.into(), ROOT_ID.into(), nodes, edges).is_err());
    }

    #[test]
    fn test_from_parts_rejects_other_root_ids() {
        let nodes = vec![
            Node::new(ROOT_ID, "Start", NodeStatus::Visited),
            Node::new("intro", "Intro", NodeStatus::Visited),
        ];
        let err = RouteGraph::from_parts("intro".into(), "intro".into(), nodes, vec![]).unwrap_err();
        assert!(matches!(err, RouteError::Persistence(_)));
    }

    #[test]
    fn test_from_parts_rejects_undiscovered_position() {
        let nodes = vec![
            Node::new(ROOT_ID, "Start", NodeStatus::Visited),
            Node::new("tower", "Tower", NodeStatus::Undiscovered),
        ];
        let err = RouteGraph::from_parts(ROOT_ID.into(), "tower".into(), nodes, vec![]).unwrap_err();
        assert!(matches!(err, RouteError::Persistence(_)));
    }

    #[test]
    fn test_render_model_marks_taken_choices() {
        let mut graph = demo();
        graph.add_choice(ROOT_ID, "cave", None).unwrap();
        graph.add_choice(ROOT_ID, "town", None).unwrap();
        graph.visit("cave").unwrap();
        let model = graph.to_render_model();
        assert!(model.edges[0].taken);
        assert!(!model.edges[1].taken);
    }

    #[test]
    fn test_from_parts_requires_visited_root() {
        let nodes = vec![Node::new(ROOT_ID, "Start", NodeStatus::Available)];
        assert!(RouteGraph::from_parts(ROOT_ID.into(), ROOT_ID.into(), nodes, vec![]).is_err());
        let nodes = vec![Node::new(ROOT_ID, "Start", NodeStatus::Visited)];
        assert!(RouteGraph::from_parts("other".into(), ROOT_ID.into(), nodes, vec![]).is_err());
    }
}
