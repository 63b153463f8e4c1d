use log::{debug, info};

use crate::codec::GraphCodec;
use crate::error::{Result, RouteError};
use crate::render::GraphRenderer;
use crate::route::{validate_id, RouteGraph};

/// One tracked game bound to its graph for the length of a command.
///
/// A session is rebuilt from the codec on every run. Two processes working
/// on the same game at once are not coordinated; the last commit wins.
pub struct GameSession<'a> {
    name: String,
    codec: &'a dyn GraphCodec,
    graph: RouteGraph,
}

impl<'a> GameSession<'a> {
    /// Load an existing game.
    pub fn open(codec: &'a dyn GraphCodec, name: &str) -> Result<Self> {
        let graph = codec
            .load(name)?
            .ok_or_else(|| RouteError::GameNotFound(name.to_string()))?;
        debug!(
            "Opened {name}: {} nodes, {} edges",
            graph.nodes().len(),
            graph.edges().len()
        );
        Ok(Self {
            name: name.to_string(),
            codec,
            graph,
        })
    }

    /// Register a new game whose graph holds only the visited root, and
    /// persist it straight away.
    pub fn create(codec: &'a dyn GraphCodec, name: &str, root_label: &str) -> Result<Self> {
        validate_id(name)?;
        if codec.exists(name)? {
            return Err(RouteError::GameAlreadyExists(name.to_string()));
        }
        let session = Self {
            name: name.to_string(),
            codec,
            graph: RouteGraph::new(root_label),
        };
        session.commit()?;
        info!("Created game {name}");
        Ok(session)
    }

    /// Discard a game's graph for good.
    pub fn delete(codec: &dyn GraphCodec, name: &str) -> Result<()> {
        if !codec.delete(name)? {
            return Err(RouteError::GameNotFound(name.to_string()));
        }
        info!("Deleted game {name}");
        Ok(())
    }

    pub fn list_games(codec: &dyn GraphCodec) -> Result<Vec<String>> {
        codec.list()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn graph(&self) -> &RouteGraph {
        &self.graph
    }

    /// Write the in-memory graph back through the codec.
    pub fn commit(&self) -> Result<()> {
        debug!("Committing {}", self.name);
        self.codec.save(&self.name, &self.graph)
    }

    /// Run one mutation and commit if it succeeded. A failed mutation leaves
    /// both the graph and the stored copy untouched.
    pub fn apply<T>(&mut self, mutation: impl FnOnce(&mut RouteGraph) -> Result<T>) -> Result<T> {
        let value = mutation(&mut self.graph)?;
        self.commit()?;
        Ok(value)
    }

    /// Render a snapshot of the graph. Never commits.
    pub fn render(&self, renderer: &dyn GraphRenderer) -> Result<Vec<u8>> {
        renderer.render(&self.graph.to_render_model())
    }
}
