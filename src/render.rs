use std::fmt::Write as _;
use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;

use log::{debug, info, trace};

use crate::error::{Result, RouteError};
use crate::route::NodeStatus;

// ---------------------------------------------------------------------------
// Render snapshot
// ---------------------------------------------------------------------------

/// Owned copy of a graph handed to a renderer. Holds no references back
/// into the graph it was taken from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderModel {
    pub nodes: Vec<RenderNode>,
    pub edges: Vec<RenderEdge>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderNode {
    pub id: String,
    pub label: String,
    pub status: NodeStatus,
    pub ending: bool,
    /// The player's current position.
    pub current: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderEdge {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
    /// The player has followed this choice to a visited node.
    pub taken: bool,
}

/// Turns a snapshot into image bytes.
pub trait GraphRenderer {
    fn render(&self, model: &RenderModel) -> Result<Vec<u8>>;
}

// ---------------------------------------------------------------------------
// DOT output
// ---------------------------------------------------------------------------

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn node_style(node: &RenderNode) -> String {
    let mut attrs = vec![format!("label=\"{}. {}\"", escape(&node.id), escape(&node.label))];
    attrs.push(
        match node.status {
            NodeStatus::Undiscovered => "style=dashed, color=gray60, fontcolor=gray60",
            NodeStatus::Available => "style=\"filled,bold\", fillcolor=gold",
            NodeStatus::Visited => "style=solid",
        }
        .to_string(),
    );
    if node.ending {
        attrs.push("shape=doubleoctagon".into());
    }
    if node.current {
        attrs.push("penwidth=3".into());
    }
    attrs.join(", ")
}

/// Taken choices are drawn as the player's route.
fn edge_style(edge: &RenderEdge) -> Option<String> {
    let mut attrs = Vec::new();
    if let Some(label) = &edge.label {
        attrs.push(format!("label=\"{}\"", escape(label)));
    }
    if edge.taken {
        attrs.push("color=forestgreen, penwidth=2".to_string());
    }
    (!attrs.is_empty()).then(|| attrs.join(", "))
}

/// Graphviz source for a snapshot. Undiscovered nodes are faded,
/// available ones highlighted, visited ones drawn plainly.
pub fn to_dot(model: &RenderModel) -> String {
    let mut out = String::from("digraph routes {\n    rankdir=TB;\n    node [shape=box];\n");
    for node in &model.nodes {
        let _ = writeln!(out, "    \"{}\" [{}];", escape(&node.id), node_style(node));
    }
    for edge in &model.edges {
        let _ = match edge_style(edge) {
            Some(attrs) => writeln!(
                out,
                "    \"{}\" -> \"{}\" [{attrs}];",
                escape(&edge.from),
                escape(&edge.to)
            ),
            None => writeln!(out, "    \"{}\" -> \"{}\";", escape(&edge.from), escape(&edge.to)),
        };
    }
    out.push_str("}\n");
    out
}

// ---------------------------------------------------------------------------
// Graphviz renderer
// ---------------------------------------------------------------------------

/// Renders by piping DOT source through an external Graphviz layout
/// command.
#[derive(Debug, Clone)]
pub struct DotRenderer {
    /// Layout program, `dot` unless configured otherwise.
    pub command: String,
    /// Output format passed as `-T<format>`.
    pub format: String,
}

impl Default for DotRenderer {
    fn default() -> Self {
        Self {
            command: "dot".into(),
            format: "png".into(),
        }
    }
}

impl GraphRenderer for DotRenderer {
    fn render(&self, model: &RenderModel) -> Result<Vec<u8>> {
        let source = to_dot(model);
        trace!("=== DOT SOURCE ===\n{source}=== END DOT ===");
        info!("Running {} -T{}", self.command, self.format);

        let mut child = Command::new(&self.command)
            .arg(format!("-T{}", self.format))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| RouteError::Render(format!("failed to start '{}': {e}", self.command)))?;

        // Stdin is fed from its own thread; the child is waited on even when
        // the write fails.
        let stdin = child.stdin.take();
        let writer = thread::spawn(move || match stdin {
            Some(mut stdin) => stdin.write_all(source.as_bytes()),
            None => Ok(()),
        });

        let output = child
            .wait_with_output()
            .map_err(|e| RouteError::Render(format!("'{}' did not finish: {e}", self.command)))?;
        let sent = writer
            .join()
            .map_err(|_| RouteError::Render(format!("writer for '{}' panicked", self.command)))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RouteError::Render(format!(
                "'{}' exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        sent.map_err(|e| {
            RouteError::Render(format!("failed to send graph to '{}': {e}", self.command))
        })?;
        if output.stdout.is_empty() {
            return Err(RouteError::Render(format!(
                "'{}' produced no image",
                self.command
            )));
        }

        debug!("Rendered {} bytes", output.stdout.len());
        Ok(output.stdout)
    }
}
