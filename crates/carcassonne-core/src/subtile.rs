//! Sub-tile coordinates: one graph vertex per tile side or center.
//!
//! Each grid cell owns a 3x3 block of sub-tile space with the tile center in
//! the middle of the block:
//!
//! ```text
//!   . N .
//!   W C E      cell (x, z) -> center at (3x + 1, 3z + 1)
//!   . S .
//! ```
//!
//! The east side of one tile and the west side of its east neighbor are
//! therefore exactly one unit apart, while sides of the same tile are never
//! closer than `sqrt(2)` to one another. Distinct sub-tiles must never share
//! a location; that property is what makes the location a vertex key.

use crate::geography::{Direction, Geography};
use crate::graph::GraphError;
use crate::grid::GridPos;
use crate::tile::{Tile, TileId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Location in sub-tile space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubTileCoord {
    pub x: i32,
    pub z: i32,
}

impl SubTileCoord {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Location of a tile's side (or center) placed at `position`
    pub const fn from_tile(position: GridPos, direction: Direction) -> Self {
        let (dx, dz) = direction.offset();
        Self::new(3 * position.x + 1 + dx, 3 * position.z + 1 + dz)
    }

    /// Squared euclidean distance
    pub const fn distance_squared(self, other: SubTileCoord) -> i32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        dx * dx + dz * dz
    }

    /// The four locations at distance 1
    pub fn adjacent(self) -> [SubTileCoord; 4] {
        Direction::SIDES.map(|dir| {
            let (dx, dz) = dir.offset();
            SubTileCoord::new(self.x + dx, self.z + dz)
        })
    }
}

/// A side or center of a placed tile, as a vertex of the board graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubTile {
    pub tile: TileId,
    /// Grid cell of the owning tile
    pub position: GridPos,
    pub direction: Direction,
    pub location: SubTileCoord,
    pub geography: Geography,
}

impl SubTile {
    pub fn new(tile: &Tile, position: GridPos, direction: Direction) -> Self {
        Self {
            tile: tile.id,
            position,
            direction,
            location: SubTileCoord::from_tile(position, direction),
            geography: tile.geography_at(direction),
        }
    }

    /// Identity order between vertices.
    ///
    /// Two sub-tiles at one location must be the same vertex (same tile and
    /// terrain); anything else is an `IdentityConflict`. Distinct locations
    /// order by tile id, then location.
    pub fn try_cmp(&self, other: &SubTile) -> Result<Ordering, GraphError> {
        if self.location == other.location {
            if self.tile == other.tile && self.geography == other.geography {
                return Ok(Ordering::Equal);
            }
            return Err(GraphError::IdentityConflict {
                location: self.location,
                existing: self.tile,
                incoming: other.tile,
            });
        }
        Ok((self.tile, self.location).cmp(&(other.tile, other.location)))
    }

    /// Whether this vertex and `other` lie on touching sides of two tiles
    pub fn touches(&self, other: &SubTile) -> bool {
        self.tile != other.tile && self.location.distance_squared(other.location) == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geography::Geography::{City, Grass, Road};
    use std::collections::HashSet;

    fn tile(id: u32) -> Tile {
        Tile::new(TileId(id), [City, Road, Grass, Road], Road)
    }

    #[test]
    fn test_touching_sides_are_one_apart() {
        let pos = GridPos::new(10, 10);
        for dir in Direction::SIDES {
            let here = SubTileCoord::from_tile(pos, dir);
            let there = SubTileCoord::from_tile(pos.step(dir), dir.opposite());
            assert_eq!(here.distance_squared(there), 1, "{:?}", dir);
        }
    }

    #[test]
    fn test_distances_within_a_tile() {
        let pos = GridPos::new(4, 7);
        let at = |dir| SubTileCoord::from_tile(pos, dir);
        assert_eq!(at(Direction::North).distance_squared(at(Direction::South)), 4);
        assert_eq!(at(Direction::East).distance_squared(at(Direction::West)), 4);
        assert_eq!(at(Direction::North).distance_squared(at(Direction::East)), 2);
        assert_eq!(at(Direction::West).distance_squared(at(Direction::Center)), 1);
    }

    #[test]
    fn test_locations_are_injective() {
        let mut seen = HashSet::new();
        for x in 0..6 {
            for z in 0..6 {
                for dir in Direction::SIDES.into_iter().chain([Direction::Center]) {
                    let coord = SubTileCoord::from_tile(GridPos::new(x, z), dir);
                    assert!(seen.insert(coord), "Collision at {:?}", coord);
                }
            }
        }
    }

    #[test]
    fn test_same_vertex_compares_equal() {
        let a = SubTile::new(&tile(1), GridPos::new(2, 2), Direction::North);
        assert_eq!(a.try_cmp(&a), Ok(Ordering::Equal));
    }

    #[test]
    fn test_collision_is_identity_conflict() {
        let a = SubTile::new(&tile(1), GridPos::new(2, 2), Direction::North);
        let b = SubTile::new(&tile(2), GridPos::new(2, 2), Direction::North);
        assert!(matches!(
            a.try_cmp(&b),
            Err(GraphError::IdentityConflict { existing: TileId(1), incoming: TileId(2), .. })
        ));
    }

    #[test]
    fn test_order_is_deterministic_and_antisymmetric() {
        let a = SubTile::new(&tile(3), GridPos::new(2, 2), Direction::East);
        let b = SubTile::new(&tile(5), GridPos::new(3, 2), Direction::West);
        let c = SubTile::new(&tile(3), GridPos::new(2, 2), Direction::West);
        assert_eq!(a.try_cmp(&b), Ok(Ordering::Less));
        assert_eq!(b.try_cmp(&a), Ok(Ordering::Greater));
        // Same tile falls back to location
        assert_eq!(c.try_cmp(&a), Ok(Ordering::Less));
        assert_eq!(a.try_cmp(&c), Ok(Ordering::Greater));
    }

    #[test]
    fn test_touches() {
        let a = SubTile::new(&tile(3), GridPos::new(2, 2), Direction::East);
        let b = SubTile::new(&tile(5), GridPos::new(3, 2), Direction::West);
        let center = SubTile::new(&tile(3), GridPos::new(2, 2), Direction::Center);
        assert!(a.touches(&b));
        assert!(!a.touches(&center));
    }
}
