//! A single solitaire game played to the end of the deck.

use carcassonne_core::{
    Board, BoardConfig, BoardError, BoardEvent, ConfigError, FeatureKind, FeatureUpdate, GridPos,
    TileDeck,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum SimError {
    #[error("Invalid board config: {0}")]
    Config(#[from] ConfigError),

    #[error("Start tile could not be placed: {0}")]
    StartTile(BoardError),

    #[error("Placement at {0:?} failed after validation: {1}")]
    Placement(GridPos, BoardError),
}

/// End-of-game report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub seed: u64,
    pub tiles_placed: usize,
    pub tiles_discarded: usize,
    pub cities: usize,
    pub completed_cities: usize,
    pub roads: usize,
    pub completed_roads: usize,
    pub feature_score: u32,
    pub cloisters: Vec<CloisterSummary>,
    pub vertices: usize,
    pub edges: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CloisterSummary {
    pub position: GridPos,
    pub tally: u32,
}

/// Drives a board through one shuffled deck
pub struct Simulation {
    seed: u64,
    board: Board,
    deck: TileDeck,
    discarded: usize,
}

impl Simulation {
    pub fn new(seed: u64, config: BoardConfig) -> Result<Self, SimError> {
        let mut deck = TileDeck::standard();
        deck.shuffle(&mut StdRng::seed_from_u64(seed));
        Ok(Self {
            seed,
            board: Board::new(config)?,
            deck,
            discarded: 0,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Place the start tile, then every drawn tile at its first legal spot.
    /// Tiles with no legal spot are discarded.
    pub fn run(&mut self) -> Result<Summary, SimError> {
        let events = self
            .board
            .place_start_tile(self.deck.start_tile())
            .map_err(SimError::StartTile)?;
        log_events(&events);

        while let Some(tile) = self.deck.draw() {
            let Some(&(pos, rotation)) = self.board.valid_placements(&tile).first() else {
                warn!(tile = %tile.id, "no legal placement, discarding");
                self.discarded += 1;
                continue;
            };

            let events = self
                .board
                .try_place(tile.rotated(rotation), pos)
                .map_err(|e| SimError::Placement(pos, e))?;
            log_events(&events);
        }

        let summary = self.summary();
        info!(
            placed = summary.tiles_placed,
            discarded = summary.tiles_discarded,
            "game finished"
        );
        Ok(summary)
    }

    /// Snapshot of the board's features and cloisters
    pub fn summary(&self) -> Summary {
        let count = |kind: FeatureKind| {
            let sets = self.board.feature_sets(kind);
            let complete = sets.iter().filter(|s| s.is_complete()).count();
            (sets.len(), complete)
        };
        let (cities, completed_cities) = count(FeatureKind::City);
        let (roads, completed_roads) = count(FeatureKind::Road);

        Summary {
            seed: self.seed,
            tiles_placed: self.board.tile_count(),
            tiles_discarded: self.discarded,
            cities,
            completed_cities,
            roads,
            completed_roads,
            feature_score: self.board.features().all().map(|s| s.score()).sum(),
            cloisters: self
                .board
                .cloister_scores(true)
                .into_iter()
                .map(|(position, tally)| CloisterSummary { position, tally })
                .collect(),
            vertices: self.board.graph().vertex_count(),
            edges: self.board.graph().edge_count(),
        }
    }
}

fn log_events(events: &[BoardEvent]) {
    for event in events {
        match event {
            BoardEvent::TilePlaced { tile, position } => {
                debug!(tile = %tile.id, x = position.x, z = position.z, "placed");
            }
            BoardEvent::Feature(FeatureUpdate::Merged { into, from, kind }) => {
                info!(?kind, into = into.0, merged = from.len(), "features joined");
            }
            BoardEvent::Feature(FeatureUpdate::Completed { id, kind, score }) => {
                info!(?kind, id = id.0, score, "feature completed");
            }
            BoardEvent::CloisterCompleted { position, score } => {
                info!(x = position.x, z = position.z, score, "cloister completed");
            }
            BoardEvent::BoardChanged(_) | BoardEvent::Feature(_) => {}
        }
    }
}
