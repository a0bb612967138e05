//! Tiles, rotations and the base-game tile supply.
//!
//! This module contains:
//! - `Tile`: four side terrains plus a center terrain, with a stable id
//! - `Rotation`: quarter turns applied before placement
//! - The catalogue of base-game tile types and their counts
//! - `TileDeck`: the shuffled draw pile with its fixed start tile

use crate::geography::{Direction, Geography};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable tile identity, assigned when the tile is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(pub u32);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Clockwise quarter turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    /// All rotations in increasing order
    pub const ALL: [Rotation; 4] = [Rotation::R0, Rotation::R90, Rotation::R180, Rotation::R270];

    /// Number of clockwise quarter turns
    pub const fn quarter_turns(self) -> usize {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 1,
            Rotation::R180 => 2,
            Rotation::R270 => 3,
        }
    }

    /// Rotation from a count of quarter turns (taken modulo 4)
    pub const fn from_quarter_turns(turns: usize) -> Self {
        match turns % 4 {
            0 => Rotation::R0,
            1 => Rotation::R90,
            2 => Rotation::R180,
            _ => Rotation::R270,
        }
    }
}

/// A game tile.
///
/// Terrain never changes once the tile exists; rotating yields a new value
/// with the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub north: Geography,
    pub east: Geography,
    pub south: Geography,
    pub west: Geography,
    pub center: Geography,
}

impl Tile {
    /// Create a tile from its sides in `[north, east, south, west]` order
    pub fn new(id: TileId, sides: [Geography; 4], center: Geography) -> Self {
        let [north, east, south, west] = sides;
        Self {
            id,
            north,
            east,
            south,
            west,
            center,
        }
    }

    /// Sides in `[north, east, south, west]` order
    pub fn sides(&self) -> [Geography; 4] {
        [self.north, self.east, self.south, self.west]
    }

    /// Terrain at a side, or the center terrain for `Direction::Center`
    pub fn geography_at(&self, direction: Direction) -> Geography {
        match direction {
            Direction::North => self.north,
            Direction::East => self.east,
            Direction::South => self.south,
            Direction::West => self.west,
            Direction::Center => self.center,
        }
    }

    /// This tile turned clockwise; a quarter turn moves North to East
    pub fn rotated(&self, rotation: Rotation) -> Self {
        let turns = rotation.quarter_turns();
        let old = self.sides();
        let mut sides = old;
        for (i, geography) in old.into_iter().enumerate() {
            sides[(i + turns) % 4] = geography;
        }
        Self::new(self.id, sides, self.center)
    }

    /// Whether any side carries `geography`
    pub fn has_side(&self, geography: Geography) -> bool {
        self.sides().contains(&geography)
    }

    pub fn has_city_center(&self) -> bool {
        matches!(self.center, Geography::City | Geography::CityRoad)
    }

    pub fn has_grass_or_stream_center(&self) -> bool {
        matches!(self.center, Geography::Grass | Geography::Stream)
    }

    pub fn is_cloister(&self) -> bool {
        self.center == Geography::Cloister
    }
}

/// One base-game tile type and how many copies the box contains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileTemplate {
    pub name: &'static str,
    /// `[north, east, south, west]`
    pub sides: [Geography; 4],
    pub center: Geography,
    pub count: u32,
}

use Geography::{City as C, CityRoad as CR, Cloister as M, Grass as G, Road as R, Village as V};

/// The tile every game starts with: city to the north, road running east-west
pub const START_TILE: TileTemplate = TileTemplate {
    name: "city cap with straight road",
    sides: [C, R, G, R],
    center: R,
    count: 4,
};

/// The 24 base-game tile types (72 tiles including the start tile)
pub const STANDARD_TILES: [TileTemplate; 24] = [
    TileTemplate { name: "cloister with road", sides: [G, G, R, G], center: M, count: 2 },
    TileTemplate { name: "cloister", sides: [G, G, G, G], center: M, count: 4 },
    TileTemplate { name: "full city", sides: [C, C, C, C], center: C, count: 1 },
    START_TILE,
    TileTemplate { name: "city cap", sides: [C, G, G, G], center: G, count: 5 },
    TileTemplate { name: "city bridge with pennant", sides: [G, C, G, C], center: C, count: 2 },
    TileTemplate { name: "city bridge", sides: [C, G, C, G], center: C, count: 1 },
    TileTemplate { name: "opposite city caps", sides: [G, C, G, C], center: G, count: 3 },
    TileTemplate { name: "adjacent city caps", sides: [C, C, G, G], center: G, count: 2 },
    TileTemplate { name: "city cap with right curve", sides: [C, R, R, G], center: R, count: 3 },
    TileTemplate { name: "city cap with left curve", sides: [C, G, R, R], center: R, count: 3 },
    TileTemplate { name: "city cap with junction", sides: [C, R, R, R], center: V, count: 3 },
    TileTemplate { name: "city corner with pennant", sides: [C, G, G, C], center: C, count: 2 },
    TileTemplate { name: "city corner", sides: [C, G, G, C], center: C, count: 3 },
    TileTemplate { name: "city corner with road and pennant", sides: [C, R, R, C], center: CR, count: 2 },
    TileTemplate { name: "city corner with road", sides: [C, R, R, C], center: CR, count: 3 },
    TileTemplate { name: "three-sided city with pennant", sides: [C, C, G, C], center: C, count: 1 },
    TileTemplate { name: "three-sided city", sides: [C, C, G, C], center: C, count: 3 },
    TileTemplate { name: "three-sided city with road and pennant", sides: [C, C, R, C], center: C, count: 2 },
    TileTemplate { name: "three-sided city with road", sides: [C, C, R, C], center: C, count: 1 },
    TileTemplate { name: "straight road", sides: [R, G, R, G], center: R, count: 8 },
    TileTemplate { name: "curved road", sides: [G, G, R, R], center: R, count: 9 },
    TileTemplate { name: "three-way junction", sides: [G, R, R, R], center: V, count: 4 },
    TileTemplate { name: "crossroads", sides: [R, R, R, R], center: V, count: 1 },
];

/// The draw pile.
///
/// The start tile is kept apart from the pile; it always receives id 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileDeck {
    start: Tile,
    tiles: Vec<Tile>,
}

impl TileDeck {
    /// Build the 72-tile base-game supply in catalogue order
    pub fn standard() -> Self {
        let start = Tile::new(TileId(0), START_TILE.sides, START_TILE.center);
        let mut tiles = Vec::with_capacity(71);
        let mut next_id = 1;

        for template in STANDARD_TILES {
            let copies = if template == START_TILE {
                template.count - 1
            } else {
                template.count
            };
            for _ in 0..copies {
                tiles.push(Tile::new(TileId(next_id), template.sides, template.center));
                next_id += 1;
            }
        }

        Self { start, tiles }
    }

    /// A deck from an explicit start tile and pile (top of the pile is last)
    pub fn from_tiles(start: Tile, tiles: Vec<Tile>) -> Self {
        Self { start, tiles }
    }

    /// Shuffle the remaining pile
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        self.tiles.shuffle(rng);
    }

    pub fn start_tile(&self) -> Tile {
        self.start
    }

    /// Draw the top tile
    pub fn draw(&mut self) -> Option<Tile> {
        self.tiles.pop()
    }

    /// Tiles left in the pile (the start tile is not counted)
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

impl Default for TileDeck {
    fn default() -> Self {
        Self::standard()
    }
}
