use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{Result, RouteError};
use crate::route::{validate_id, Edge, Node, RouteGraph, ROOT_ID};

/// Loads and stores the graph of a named game.
pub trait GraphCodec {
    /// `Ok(None)` when no graph has been stored under `game`.
    fn load(&self, game: &str) -> Result<Option<RouteGraph>>;
    /// Replace the stored graph of `game` as a whole.
    fn save(&self, game: &str, graph: &RouteGraph) -> Result<()>;
    fn exists(&self, game: &str) -> Result<bool>;
    /// Returns whether there was anything to delete.
    fn delete(&self, game: &str) -> Result<bool>;
    /// Names of every stored game, sorted.
    fn list(&self) -> Result<Vec<String>>;
}

// ---------------------------------------------------------------------------
// Document schema
// ---------------------------------------------------------------------------

fn default_root() -> String {
    ROOT_ID.to_string()
}

/// On-disk shape of a graph.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct GraphDocument {
    #[serde(default = "default_root")]
    root: String,
    #[serde(default = "default_root")]
    current: String,
    #[serde(default)]
    nodes: Vec<Node>,
    #[serde(default)]
    edges: Vec<Edge>,
}

pub fn encode(graph: &RouteGraph) -> Result<String> {
    let doc = GraphDocument {
        root: graph.root().to_string(),
        current: graph.current().to_string(),
        nodes: graph.nodes().to_vec(),
        edges: graph.edges().to_vec(),
    };
    toml::to_string(&doc).map_err(|e| RouteError::Persistence(format!("failed to encode graph: {e}")))
}

pub fn decode(text: &str) -> Result<RouteGraph> {
    let doc: GraphDocument = toml::from_str(text)
        .map_err(|e| RouteError::Persistence(format!("failed to decode graph: {e}")))?;
    let graph = RouteGraph::from_parts(doc.root, doc.current, doc.nodes, doc.edges)?;
    let unreachable: Vec<&str> = graph.unreachable().iter().map(|n| n.id.as_str()).collect();
    if !unreachable.is_empty() {
        warn!(
            "Reached nodes with no recorded route from '{}': {}",
            graph.root(),
            unreachable.join(", ")
        );
    }
    Ok(graph)
}

// ---------------------------------------------------------------------------
// TOML files on disk
// ---------------------------------------------------------------------------

/// One `<game>.toml` file per game inside `dir`.
#[derive(Debug, Clone)]
pub struct TomlStore {
    dir: PathBuf,
}

impl TomlStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, game: &str) -> Result<PathBuf> {
        validate_id(game)?;
        Ok(self.dir.join(format!("{game}.toml")))
    }
}

impl GraphCodec for TomlStore {
    fn load(&self, game: &str) -> Result<Option<RouteGraph>> {
        let path = self.path(game)?;
        debug!("Loading {}", path.display());
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        decode(&text).map(Some)
    }

    fn save(&self, game: &str, graph: &RouteGraph) -> Result<()> {
        let path = self.path(game)?;
        let text = encode(graph)?;
        fs::create_dir_all(&self.dir)?;

        // Write beside the target and rename over it so an interrupted save
        // leaves the previous file intact.
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(text.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| RouteError::Io(e.error))?;

        info!("Saved {} ({} bytes)", path.display(), text.len());
        Ok(())
    }

    fn exists(&self, game: &str) -> Result<bool> {
        Ok(self.path(game)?.is_file())
    }

    fn delete(&self, game: &str) -> Result<bool> {
        let path = self.path(game)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Deleted {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut games = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("toml") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if validate_id(stem).is_ok() {
                    games.push(stem.to_string());
                }
            }
        }
        games.sort();
        Ok(games)
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Keeps encoded documents in memory. Goes through the same encode/decode
/// path as [`TomlStore`] without touching the filesystem.
#[derive(Debug, Default)]
pub struct MemoryCodec {
    documents: RefCell<BTreeMap<String, String>>,
}

impl MemoryCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored document, if any.
    pub fn document(&self, game: &str) -> Option<String> {
        self.documents.borrow().get(game).cloned()
    }
}

impl GraphCodec for MemoryCodec {
    fn load(&self, game: &str) -> Result<Option<RouteGraph>> {
        validate_id(game)?;
        self.documents
            .borrow()
            .get(game)
            .map(|text| decode(text))
            .transpose()
    }

    fn save(&self, game: &str, graph: &RouteGraph) -> Result<()> {
        validate_id(game)?;
        let text = encode(graph)?;
        self.documents.borrow_mut().insert(game.to_string(), text);
        Ok(())
    }

    fn exists(&self, game: &str) -> Result<bool> {
        validate_id(game)?;
        Ok(self.documents.borrow().contains_key(game))
    }

    fn delete(&self, game: &str) -> Result<bool> {
        validate_id(game)?;
        Ok(self.documents.borrow_mut().remove(game).is_some())
    }

    fn list(&self) -> Result<Vec<String>> {
        Ok(self.documents.borrow().keys().cloned().collect())
    }
}
