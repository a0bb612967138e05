//! Carcassonne board connectivity engine.
//!
//! This crate provides the core board logic for Carcassonne, including:
//! - Terrain and direction vocabulary for tile sides
//! - The placement grid and its matching rules
//! - A sub-tile graph that links tile sides into cities and roads
//! - Feature sets that merge as tiles join previously separate features
//!
//! # Architecture
//!
//! The engine is platform-agnostic and synchronous. It can be compiled to:
//! - Native Rust for server-side or headless play
//! - WebAssembly for a browser view (feature `wasm`)
//!
//! # Modules
//!
//! - [`geography`]: Terrain kinds and directions
//! - [`tile`]: Tiles, rotations and the base-game deck
//! - [`grid`]: Placement grid and placement rules
//! - [`subtile`]: Sub-tile coordinates and vertex identity
//! - [`graph`]: Board graph construction and merging
//! - [`features`]: City and road feature sets
//! - [`board`]: The board session tying everything together

pub mod actions;
pub mod board;
pub mod config;
pub mod features;
pub mod geography;
pub mod graph;
pub mod grid;
pub mod subtile;
pub mod tile;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use actions::BoardEvent;
pub use board::{Board, BoardError, BoardJson};
pub use config::{BoardConfig, ConfigError};
pub use features::{FeatureEntry, FeatureId, FeatureSet, FeatureState, FeatureUpdate};
pub use geography::{Direction, FeatureKind, Geography, UnknownFeatureKind};
pub use graph::{BoardChanged, BoardGraph, CarcassonneEdge, ConnectionType, GraphError};
pub use grid::{GridPos, PlacementError, PlacementGrid};
pub use subtile::{SubTile, SubTileCoord};
pub use tile::{Rotation, Tile, TileDeck, TileId};
