//! Route tracking for branching-narrative games.
//!
//! A player records the choices they find and the states they reach; the
//! [`route::RouteGraph`] keeps the resulting graph consistent, a
//! [`session::GameSession`] ties one named game to its stored copy, and
//! the renderer turns it into a picture of which branches are still
//! unexplored.

pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod render;
pub mod route;
pub mod session;

pub use error::{Result, RouteError};
