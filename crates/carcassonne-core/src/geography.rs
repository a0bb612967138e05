//! Terrain kinds and compass directions.
//!
//! This module provides the vocabulary every other module is written in:
//! - `Geography`: what terrain sits on a tile side or in its center
//! - `Direction`: the four sides of a tile plus its center, as grid offsets
//! - `FeatureKind`: the terrain kinds that grow into scored features
//!
//! Combined terrains (a center where a city and a road both pass through) are
//! explicit variants rather than bit flags, so matching on them is exhaustive.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Terrain on one side of a tile, or in its center
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Geography {
    /// Open field
    Grass,
    /// Road segment
    Road,
    /// City segment
    City,
    /// River segment
    Stream,
    /// Cloister building (center only)
    Cloister,
    /// Road junction where roads end (center only)
    Village,
    /// Center through which both city and road pass
    CityRoad,
    /// Center through which both city and river pass
    CityStream,
    /// Center through which both road and river pass
    RoadStream,
}

impl Geography {
    /// All terrain kinds
    pub const ALL: [Geography; 9] = [
        Geography::Grass,
        Geography::Road,
        Geography::City,
        Geography::Stream,
        Geography::Cloister,
        Geography::Village,
        Geography::CityRoad,
        Geography::CityStream,
        Geography::RoadStream,
    ];

    /// Whether a center of this terrain joins tile sides of terrain `side`.
    ///
    /// A center joins sides of its own kind, and a combined center joins each
    /// of the kinds it is made of. Villages and cloisters terminate whatever
    /// runs into them.
    pub fn connects(self, side: Geography) -> bool {
        match self {
            Geography::Grass | Geography::Cloister | Geography::Village => false,
            Geography::Road | Geography::City | Geography::Stream => self == side,
            Geography::CityRoad => matches!(side, Geography::City | Geography::Road),
            Geography::CityStream => matches!(side, Geography::City | Geography::Stream),
            Geography::RoadStream => matches!(side, Geography::Road | Geography::Stream),
        }
    }

    /// The scored feature this terrain belongs to, if any
    pub fn feature_kind(self) -> Option<FeatureKind> {
        match self {
            Geography::City => Some(FeatureKind::City),
            Geography::Road => Some(FeatureKind::Road),
            _ => None,
        }
    }
}

/// Scored features that span several tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FeatureKind {
    City,
    Road,
}

impl FeatureKind {
    /// All feature kinds
    pub const ALL: [FeatureKind; 2] = [FeatureKind::City, FeatureKind::Road];

    /// The side terrain that makes up this feature
    pub fn geography(self) -> Geography {
        match self {
            FeatureKind::City => Geography::City,
            FeatureKind::Road => Geography::Road,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown feature kind: {0:?}")]
pub struct UnknownFeatureKind(pub String);

impl FromStr for FeatureKind {
    type Err = UnknownFeatureKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "City" => Ok(FeatureKind::City),
            "Road" => Ok(FeatureKind::Road),
            other => Err(UnknownFeatureKind(other.to_string())),
        }
    }
}

/// A side of a tile, or its center.
///
/// Offsets are in grid space: `x` grows east, `z` grows north.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
    Center,
}

impl Direction {
    /// The four sides in clockwise order starting from North
    pub const SIDES: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Order in which neighbor queries report occupied cells
    pub const NEIGHBOR_ORDER: [Direction; 4] = [
        Direction::East,
        Direction::West,
        Direction::North,
        Direction::South,
    ];

    /// Unit offset `(dx, dz)` of this direction; zero for the center
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::East => (1, 0),
            Direction::South => (0, -1),
            Direction::West => (-1, 0),
            Direction::Center => (0, 0),
        }
    }

    /// The facing side across a shared border
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::Center => Direction::Center,
        }
    }

    /// The side reached by turning a quarter clockwise
    pub const fn clockwise(self) -> Direction {
        match self {
            Direction::North => Direction::East,
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
            Direction::Center => Direction::Center,
        }
    }
}
