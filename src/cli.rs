//! Command-line surface. Every command opens (or creates) one game, applies
//! at most one graph operation, and exits.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command as Process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{info, warn};
use serde_json::json;

use crate::codec::TomlStore;
use crate::config::{default_config_path, Config};
use crate::error::RouteError;
use crate::render::to_dot;
use crate::route::Node;
use crate::session::GameSession;

#[derive(Parser, Debug)]
#[clap(
    name = "route-tracker",
    version = env!("CARGO_PKG_VERSION"),
    about = "Track the routes you have found and finished in branching-story games."
)]
pub struct Cli {
    /// Directory holding one file per tracked game.
    #[clap(long, global = true)]
    pub data_dir: Option<PathBuf>,
    /// Config file (defaults to $XDG_CONFIG_HOME/route-tracker/config.toml).
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,
    /// Log more (-v info, -vv debug, -vvv trace). RUST_LOG takes precedence.
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
    #[clap(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Default log filter for the requested verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start tracking a new game
    Create {
        game: String,
        /// Label of the starting node
        #[clap(long, default_value = "start")]
        root_label: String,
    },
    /// Stop tracking a game and discard its graph
    Delete { game: String },
    /// List tracked games
    Games,
    /// Register a node you know exists but have not reached
    Add {
        game: String,
        id: String,
        label: String,
    },
    /// Record a choice leading from one node to another
    Choice {
        game: String,
        from: String,
        to: String,
        /// What the choice was
        #[clap(long)]
        label: Option<String>,
    },
    /// Record an ending reached after a node
    Ending {
        game: String,
        from: String,
        label: String,
    },
    /// Mark a node as visited
    Visit { game: String, node: String },
    /// Change a node's label
    Rename {
        game: String,
        node: String,
        label: String,
    },
    /// Remove a node nothing points to or from
    Remove { game: String, node: String },
    /// Show the choices recorded from a node (default: current position)
    Choices {
        game: String,
        node: Option<String>,
        #[clap(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// List branches you have not tried yet
    List {
        game: String,
        #[clap(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Summarize progress through a game
    Status {
        game: String,
        #[clap(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Draw the route graph
    Show {
        game: String,
        /// Print Graphviz source instead of running the layout engine
        #[clap(long)]
        dot: bool,
        /// Open the image with the configured viewer
        #[clap(long)]
        open: bool,
        /// Where to write the image (default: next to the game file)
        #[clap(long, short)]
        output: Option<PathBuf>,
    },
}

impl Command {
    fn mutates(&self) -> bool {
        matches!(
            self,
            Command::Add { .. }
                | Command::Choice { .. }
                | Command::Ending { .. }
                | Command::Visit { .. }
                | Command::Rename { .. }
                | Command::Remove { .. }
                | Command::Create { .. }
        )
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

fn load_config(cli: &Cli) -> Result<Config> {
    let path = cli.config.clone().or_else(default_config_path);
    Ok(match path {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    })
}

fn node_line(node: &Node) -> String {
    format!("{:<12} {:<13} {}", node.id, node.status.as_str(), node.label)
}

/// Run one command, writing user-facing output to `out`.
pub fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let config = load_config(&cli)?;
    let store = TomlStore::new(config.resolve_data_dir(cli.data_dir.as_deref())?);
    info!("Using data directory {}", store.dir().display());
    let redraw = config.auto_render && cli.command.mutates();

    let game = match cli.command {
        Command::Create { game, root_label } => {
            GameSession::create(&store, &game, &root_label)?;
            writeln!(out, "{game} created")?;
            game
        }
        Command::Delete { game } => {
            GameSession::delete(&store, &game)?;
            writeln!(out, "{game} deleted")?;
            return Ok(());
        }
        Command::Games => {
            for game in GameSession::list_games(&store)? {
                writeln!(out, "{game}")?;
            }
            return Ok(());
        }
        Command::Add { game, id, label } => {
            let mut session = GameSession::open(&store, &game)?;
            let node = session.apply(|g| g.add_node(&id, &label).cloned())?;
            writeln!(out, "{}", node_line(&node))?;
            game
        }
        Command::Choice {
            game,
            from,
            to,
            label,
        } => {
            let mut session = GameSession::open(&store, &game)?;
            session.apply(|g| g.add_choice(&from, &to, label.as_deref()).map(|_| ()))?;
            if let Some(node) = session.graph().node(&to) {
                writeln!(out, "{}", node_line(node))?;
            }
            game
        }
        Command::Ending { game, from, label } => {
            let mut session = GameSession::open(&store, &game)?;
            let node = session.apply(|g| g.add_ending(&from, &label).cloned())?;
            writeln!(out, "{}", node_line(&node))?;
            game
        }
        Command::Visit { game, node } => {
            let mut session = GameSession::open(&store, &game)?;
            let node = session.apply(|g| g.visit(&node).cloned())?;
            writeln!(out, "{}", node_line(&node))?;
            let unreachable = session.graph().unreachable();
            if unreachable.iter().any(|n| n.id == node.id) {
                warn!("No recorded choice leads to {}; record one with `choice`", node.id);
            }
            game
        }
        Command::Rename { game, node, label } => {
            let mut session = GameSession::open(&store, &game)?;
            let node = session.apply(|g| g.relabel(&node, &label).cloned())?;
            writeln!(out, "{}", node_line(&node))?;
            game
        }
        Command::Remove { game, node } => {
            let mut session = GameSession::open(&store, &game)?;
            let removed = session.apply(|g| g.remove_node(&node))?;
            writeln!(out, "removed {}", removed.id)?;
            game
        }
        Command::Choices { game, node, format } => {
            let session = GameSession::open(&store, &game)?;
            let graph = session.graph();
            let from = node.as_deref().unwrap_or(graph.current());
            let choices = graph.available_choices(from)?;
            match format {
                Format::Json => writeln!(out, "{}", serde_json::to_string_pretty(&choices)?)?,
                Format::Text if choices.is_empty() => {
                    writeln!(out, "No choices recorded from {from}")?
                }
                Format::Text => {
                    for edge in choices {
                        let status = graph
                            .node(&edge.to)
                            .map(|n| n.status.as_str())
                            .unwrap_or_default();
                        writeln!(
                            out,
                            "{} -> {:<12} {:<13} {}",
                            edge.from,
                            edge.to,
                            status,
                            edge.label.as_deref().unwrap_or("")
                        )?;
                    }
                }
            }
            return Ok(());
        }
        Command::List { game, format } => {
            let session = GameSession::open(&store, &game)?;
            let branches = session.graph().unvisited_branches();
            match format {
                Format::Json => writeln!(out, "{}", serde_json::to_string_pretty(&branches)?)?,
                Format::Text if branches.is_empty() => writeln!(out, "No unvisited branches")?,
                Format::Text => {
                    for node in branches {
                        writeln!(out, "{}", node_line(node))?;
                    }
                }
            }
            return Ok(());
        }
        Command::Status { game, format } => {
            let session = GameSession::open(&store, &game)?;
            let graph = session.graph();
            let progress = graph.progress();
            match format {
                Format::Json => {
                    let report = json!({
                        "game": game,
                        "current": graph.current(),
                        "progress": progress,
                    });
                    writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
                }
                Format::Text => {
                    writeln!(out, "{game} (at {})", graph.current())?;
                    writeln!(out, "  visited      : {}", progress.visited)?;
                    writeln!(out, "  available    : {}", progress.available)?;
                    writeln!(out, "  undiscovered : {}", progress.undiscovered)?;
                    writeln!(
                        out,
                        "  endings      : {} / {}",
                        progress.endings_reached, progress.endings_known
                    )?;
                }
            }
            return Ok(());
        }
        Command::Show {
            game,
            dot,
            open,
            output,
        } => {
            let session = GameSession::open(&store, &game)?;
            if dot {
                write!(out, "{}", to_dot(&session.graph().to_render_model()))?;
                return Ok(());
            }
            let path = output.unwrap_or_else(|| image_path(store.dir(), &game, &config));
            draw(&session, &config, &path)?;
            writeln!(out, "{}", path.display())?;
            if open {
                open_viewer(&config, &path)?;
            }
            return Ok(());
        }
    };

    if redraw {
        let session = GameSession::open(&store, &game)?;
        draw(&session, &config, &image_path(store.dir(), &game, &config))?;
    }
    Ok(())
}

fn image_path(dir: &Path, game: &str, config: &Config) -> PathBuf {
    dir.join(format!("{game}.{}", config.image_format))
}

fn draw(session: &GameSession<'_>, config: &Config, path: &Path) -> Result<()> {
    let bytes = session.render(&config.renderer())?;
    fs::write(path, bytes)
        .map_err(RouteError::Io)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!("Drew {} to {}", session.name(), path.display());
    Ok(())
}

fn open_viewer(config: &Config, path: &Path) -> Result<()> {
    let viewer = config.viewer.as_deref().ok_or_else(|| {
        RouteError::Config("no image viewer configured; set `viewer` in config.toml".into())
    })?;
    Process::new(viewer)
        .arg(path)
        .spawn()
        .with_context(|| format!("failed to start viewer '{viewer}'"))?;
    Ok(())
}
