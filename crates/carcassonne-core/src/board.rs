//! The board session: grid, graph and feature sets kept in step.
//!
//! `Board::try_place` is the single mutating entry point. It checks the
//! placement rules, builds and merges the tile's graph, and only when all of
//! that has succeeded records the tile and updates the feature sets. A
//! refused placement leaves the board exactly as it was.

use crate::actions::BoardEvent;
use crate::config::{BoardConfig, ConfigError};
use crate::features::{FeatureId, FeatureSet, FeatureState};
use crate::geography::{Direction, FeatureKind};
use crate::graph::{BoardGraph, GraphError};
use crate::grid::{GridPos, PlacementError, PlacementGrid};
use crate::tile::{Rotation, Tile, TileId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::{debug, error, trace};

/// Why `try_place` failed
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum BoardError {
    /// The placement breaks a rule; nothing changed and the caller may retry
    #[error("Placement rejected: {0}")]
    Rejected(#[from] PlacementError),

    /// Internal state is inconsistent; the placement was abandoned
    #[error("Board invariant violated: {0}")]
    Invariant(#[from] GraphError),
}

impl BoardError {
    pub fn is_rejection(&self) -> bool {
        matches!(self, BoardError::Rejected(_))
    }
}

/// One game's board state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    config: BoardConfig,
    grid: PlacementGrid,
    graph: BoardGraph,
    features: FeatureState,
    /// Where each placed tile id went
    placed_ids: BTreeMap<TileId, GridPos>,
    /// Cells holding a cloister tile
    cloisters: BTreeSet<GridPos>,
    /// Cloisters already reported as surrounded
    completed_cloisters: BTreeSet<GridPos>,
}

impl Board {
    /// Create an empty board; the config is validated first
    pub fn new(config: BoardConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: BoardConfig) -> Self {
        Self {
            grid: PlacementGrid::new(config.grid_size),
            config,
            graph: BoardGraph::new(),
            features: FeatureState::new(),
            placed_ids: BTreeMap::new(),
            cloisters: BTreeSet::new(),
            completed_cloisters: BTreeSet::new(),
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn grid(&self) -> &PlacementGrid {
        &self.grid
    }

    pub fn graph(&self) -> &BoardGraph {
        &self.graph
    }

    pub fn features(&self) -> &FeatureState {
        &self.features
    }

    pub fn tile_at(&self, pos: GridPos) -> Option<&Tile> {
        self.grid.get(pos)
    }

    /// Number of placed tiles
    pub fn tile_count(&self) -> usize {
        self.grid.len()
    }

    pub fn is_valid(&self, tile: &Tile, pos: GridPos) -> bool {
        self.grid.is_valid(tile, pos)
    }

    /// Place the game's first tile at the configured start cell
    pub fn place_start_tile(&mut self, tile: Tile) -> Result<Vec<BoardEvent>, BoardError> {
        let start = self.config.start;
        self.try_place(tile, start)
    }

    /// Validate and apply a placement as one step
    pub fn try_place(&mut self, tile: Tile, pos: GridPos) -> Result<Vec<BoardEvent>, BoardError> {
        if let Err(reason) = self.grid.validate(&tile, pos) {
            trace!(tile = %tile.id, x = pos.x, z = pos.z, %reason, "placement rejected");
            return Err(reason.into());
        }

        if let Some(&existing) = self.placed_ids.get(&tile.id) {
            let e = GraphError::DuplicateTile {
                tile: tile.id,
                existing,
                incoming: pos,
            };
            error!(tile = %tile.id, x = pos.x, z = pos.z, error = %e, "board invariant violated");
            return Err(BoardError::Invariant(e));
        }

        let changed = BoardGraph::from_tile(&tile, pos)
            .and_then(|local| self.graph.merge(local))
            .map_err(|e| {
                error!(tile = %tile.id, x = pos.x, z = pos.z, error = %e, "board invariant violated");
                BoardError::Invariant(e)
            })?;

        self.grid.record(pos, tile);
        self.placed_ids.insert(tile.id, pos);
        let updates = self.features.apply(&changed);

        let mut events = vec![
            BoardEvent::TilePlaced {
                tile,
                position: pos,
            },
            BoardEvent::BoardChanged(changed),
        ];
        events.extend(updates.into_iter().map(BoardEvent::Feature));

        if tile.is_cloister() {
            self.cloisters.insert(pos);
        }
        for cell in std::iter::once(pos).chain(pos.surrounding()) {
            if self.cloisters.contains(&cell)
                && !self.completed_cloisters.contains(&cell)
                && self.grid.surround_count(cell, false) == 9
            {
                self.completed_cloisters.insert(cell);
                events.push(BoardEvent::CloisterCompleted {
                    position: cell,
                    score: 9,
                });
            }
        }

        debug!(tile = %tile.id, x = pos.x, z = pos.z, events = events.len(), "tile placed");
        Ok(events)
    }

    /// Every cell and rotation where `tile` could legally go
    pub fn valid_placements(&self, tile: &Tile) -> Vec<(GridPos, Rotation)> {
        let cells = if self.grid.is_empty() {
            vec![self.config.start]
        } else {
            self.grid.frontier()
        };

        let mut placements = Vec::new();
        for pos in cells {
            for rotation in Rotation::ALL {
                if self.grid.is_valid(&tile.rotated(rotation), pos) {
                    placements.push((pos, rotation));
                }
            }
        }
        placements
    }

    /// City or road sets, ordered by id
    pub fn feature_sets(&self, kind: FeatureKind) -> Vec<&FeatureSet> {
        self.features.sets(kind)
    }

    pub fn feature_set(&self, id: FeatureId) -> Option<&FeatureSet> {
        self.features.get(id)
    }

    /// Cloister tally for a cell (see `PlacementGrid::surround_count`)
    pub fn surround_count(&self, pos: GridPos, end_turn: bool) -> u32 {
        self.grid.surround_count(pos, end_turn)
    }

    /// Every cloister with its current tally
    pub fn cloister_scores(&self, end_turn: bool) -> Vec<(GridPos, u32)> {
        self.cloisters
            .iter()
            .map(|pos| (*pos, self.grid.surround_count(*pos, end_turn)))
            .collect()
    }

    /// Occupied orthogonal neighbors of a cell
    pub fn neighbors(&self, pos: GridPos) -> Vec<(Direction, &Tile)> {
        self.grid.neighbors(pos)
    }

    /// Convert to a JSON-friendly format (arrays instead of maps)
    pub fn to_json_friendly(&self) -> BoardJson {
        BoardJson {
            grid_size: self.config.grid_size,
            last_played: self.grid.last_played(),
            tiles: self
                .grid
                .tiles()
                .map(|(position, tile)| PlacedTileJson {
                    position,
                    tile: *tile,
                })
                .collect(),
            features: self.features.all().cloned().collect(),
            cloisters: self
                .cloister_scores(true)
                .into_iter()
                .map(|(position, tally)| CloisterJson {
                    position,
                    tally,
                    complete: tally == 9,
                })
                .collect(),
            vertex_count: self.graph.vertex_count(),
            edge_count: self.graph.edge_count(),
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::with_valid_config(BoardConfig::default())
    }
}

/// JSON-friendly board representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardJson {
    pub grid_size: usize,
    pub last_played: Option<GridPos>,
    pub tiles: Vec<PlacedTileJson>,
    pub features: Vec<FeatureSet>,
    pub cloisters: Vec<CloisterJson>,
    pub vertex_count: usize,
    pub edge_count: usize,
}

/// JSON-friendly placed tile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedTileJson {
    pub position: GridPos,
    pub tile: Tile,
}

/// JSON-friendly cloister
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloisterJson {
    pub position: GridPos,
    pub tally: u32,
    pub complete: bool,
}
