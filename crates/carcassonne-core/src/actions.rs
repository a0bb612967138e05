//! Events produced by a placement.
//!
//! A successful `Board::try_place` returns these in the order they happened,
//! for a scoring or view layer to consume.

use crate::features::FeatureUpdate;
use crate::graph::BoardChanged;
use crate::grid::GridPos;
use crate::tile::Tile;
use serde::{Deserialize, Serialize};

/// Everything that happens on the board as a result of a placement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardEvent {
    /// A tile was recorded on the grid
    TilePlaced { tile: Tile, position: GridPos },

    /// The board graph grew
    BoardChanged(BoardChanged),

    /// A city or road set changed
    Feature(FeatureUpdate),

    /// A cloister is now surrounded on all eight sides
    CloisterCompleted { position: GridPos, score: u32 },
}

impl BoardEvent {
    /// The graph change carried by this event, if any
    pub fn board_changed(&self) -> Option<&BoardChanged> {
        match self {
            BoardEvent::BoardChanged(changed) => Some(changed),
            _ => None,
        }
    }
}
