//! The placement grid: which tile sits on which cell.
//!
//! The grid is a fixed square matrix large enough for any game to grow in
//! every direction from its start cell. Every accessor is bounds-checked:
//! cells outside the matrix read as empty.

use crate::geography::{Direction, Geography};
use crate::tile::Tile;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default side length of the grid
pub const DEFAULT_GRID_SIZE: usize = 170;

/// Largest accepted side length; keeps cell indices and sub-tile
/// coordinates well inside `i32`
pub const MAX_GRID_SIZE: usize = 1024;

/// Integer cell coordinate; `x` grows east, `z` grows north
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub z: i32,
}

impl GridPos {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// The adjacent cell in a direction (itself for the center)
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dz) = direction.offset();
        Self::new(self.x + dx, self.z + dz)
    }

    /// The eight cells around this one, row by row
    pub fn surrounding(self) -> [GridPos; 8] {
        [
            GridPos::new(self.x - 1, self.z - 1),
            GridPos::new(self.x - 1, self.z),
            GridPos::new(self.x - 1, self.z + 1),
            GridPos::new(self.x, self.z - 1),
            GridPos::new(self.x, self.z + 1),
            GridPos::new(self.x + 1, self.z - 1),
            GridPos::new(self.x + 1, self.z),
            GridPos::new(self.x + 1, self.z + 1),
        ]
    }
}

/// Why a placement was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum PlacementError {
    #[error("Position is outside the board")]
    OutOfBounds,

    #[error("A tile is already placed there")]
    Occupied,

    #[error("Edge does not match the neighbor to the {0:?}")]
    EdgeMismatch(Direction),

    #[error("Tile must touch an existing tile")]
    Isolated,
}

/// Fixed-size matrix of placed tiles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementGrid {
    size: usize,
    cells: Vec<Option<Tile>>,
    /// Occupied cells in placement order
    placed: Vec<GridPos>,
    last_played: Option<GridPos>,
}

impl PlacementGrid {
    /// Create an empty `size` x `size` grid, capped at `MAX_GRID_SIZE`
    pub fn new(size: usize) -> Self {
        let size = size.min(MAX_GRID_SIZE);
        let cells = size.checked_mul(size).unwrap_or(0);
        Self {
            size,
            cells: vec![None; cells],
            placed: Vec::new(),
            last_played: None,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn in_bounds(&self, pos: GridPos) -> bool {
        self.index(pos).is_some()
    }

    fn index(&self, pos: GridPos) -> Option<usize> {
        let x = usize::try_from(pos.x).ok()?;
        let z = usize::try_from(pos.z).ok()?;
        if x >= self.size || z >= self.size {
            return None;
        }
        Some(z * self.size + x)
    }

    /// The tile at a cell; `None` when empty or out of range
    pub fn get(&self, pos: GridPos) -> Option<&Tile> {
        self.index(pos).and_then(|i| self.cells[i].as_ref())
    }

    pub fn is_occupied(&self, pos: GridPos) -> bool {
        self.get(pos).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }

    /// Number of placed tiles
    pub fn len(&self) -> usize {
        self.placed.len()
    }

    pub fn last_played(&self) -> Option<GridPos> {
        self.last_played
    }

    /// Occupied cells in placement order
    pub fn positions(&self) -> &[GridPos] {
        &self.placed
    }

    /// Placed tiles with their cells, in placement order
    pub fn tiles(&self) -> impl Iterator<Item = (GridPos, &Tile)> {
        self.placed
            .iter()
            .filter_map(move |pos| self.get(*pos).map(|tile| (*pos, tile)))
    }

    /// Check every placement rule without touching the grid.
    ///
    /// Rules are checked in order: bounds, occupancy, facing edges (in
    /// neighbor order), isolation. The first tile may go on any free cell.
    pub fn validate(&self, tile: &Tile, pos: GridPos) -> Result<(), PlacementError> {
        let index = self.index(pos).ok_or(PlacementError::OutOfBounds)?;
        if self.cells[index].is_some() {
            return Err(PlacementError::Occupied);
        }

        let mut touches = false;
        for direction in Direction::NEIGHBOR_ORDER {
            if let Some(neighbor) = self.get(pos.step(direction)) {
                touches = true;
                if tile.geography_at(direction) != neighbor.geography_at(direction.opposite()) {
                    return Err(PlacementError::EdgeMismatch(direction));
                }
            }
        }

        if !touches && !self.is_empty() {
            return Err(PlacementError::Isolated);
        }
        Ok(())
    }

    /// Whether `tile` may be placed at `pos`
    pub fn is_valid(&self, tile: &Tile, pos: GridPos) -> bool {
        self.validate(tile, pos).is_ok()
    }

    /// Validate and record a tile
    pub fn place(&mut self, pos: GridPos, tile: Tile) -> Result<(), PlacementError> {
        self.validate(&tile, pos)?;
        self.record(pos, tile);
        Ok(())
    }

    /// Record an already validated tile
    pub(crate) fn record(&mut self, pos: GridPos, tile: Tile) {
        if let Some(index) = self.index(pos) {
            self.cells[index] = Some(tile);
            self.placed.push(pos);
            self.last_played = Some(pos);
        }
    }

    /// Occupied orthogonal neighbors in neighbor order
    pub fn neighbors(&self, pos: GridPos) -> Vec<(Direction, &Tile)> {
        if !self.in_bounds(pos) {
            return Vec::new();
        }
        Direction::NEIGHBOR_ORDER
            .into_iter()
            .filter_map(|dir| self.get(pos.step(dir)).map(|tile| (dir, tile)))
            .collect()
    }

    /// Directions of the occupied neighbors
    pub fn neighbor_directions(&self, pos: GridPos) -> Vec<Direction> {
        self.neighbors(pos).into_iter().map(|(dir, _)| dir).collect()
    }

    /// Terrain each occupied neighbor presents toward `pos`
    pub fn facing_edges(&self, pos: GridPos) -> Vec<(Direction, Geography)> {
        self.neighbors(pos)
            .into_iter()
            .map(|(dir, tile)| (dir, tile.geography_at(dir.opposite())))
            .collect()
    }

    /// Center terrain of each occupied neighbor
    pub fn neighbor_centers(&self, pos: GridPos) -> Vec<(Direction, Geography)> {
        self.neighbors(pos)
            .into_iter()
            .map(|(dir, tile)| (dir, tile.center))
            .collect()
    }

    pub fn has_neighbor(&self, pos: GridPos) -> bool {
        !self.neighbors(pos).is_empty()
    }

    /// Cloister count for a cell: itself plus its occupied surroundings.
    ///
    /// Only reported once the cell is fully surrounded (9) or when
    /// `end_turn` asks for the final tally; 0 otherwise.
    pub fn surround_count(&self, pos: GridPos, end_turn: bool) -> u32 {
        if !self.in_bounds(pos) {
            return 0;
        }
        let count = 1 + pos
            .surrounding()
            .into_iter()
            .filter(|p| self.is_occupied(*p))
            .count() as u32;
        if count == 9 || end_turn {
            count
        } else {
            0
        }
    }

    /// Empty cells that touch at least one placed tile, sorted
    pub fn frontier(&self) -> Vec<GridPos> {
        let mut cells: Vec<GridPos> = self
            .placed
            .iter()
            .flat_map(|pos| Direction::SIDES.map(|dir| pos.step(dir)))
            .filter(|pos| self.in_bounds(*pos) && !self.is_occupied(*pos))
            .collect();
        cells.sort();
        cells.dedup();
        cells
    }
}

impl Default for PlacementGrid {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geography::Geography::{City, Grass, Road};
    use crate::tile::TileId;

    const CENTER: GridPos = GridPos::new(85, 85);

    fn tile(id: u32, sides: [Geography; 4]) -> Tile {
        Tile::new(TileId(id), sides, Grass)
    }

    fn grass(id: u32) -> Tile {
        tile(id, [Grass; 4])
    }

    #[test]
    fn test_first_tile_may_go_anywhere() {
        let mut grid = PlacementGrid::default();
        assert!(grid.is_valid(&grass(0), GridPos::new(0, 0)));
        grid.place(CENTER, grass(0)).unwrap();
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.last_played(), Some(CENTER));
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let grid = PlacementGrid::default();
        for pos in [
            GridPos::new(-1, 0),
            GridPos::new(0, -1),
            GridPos::new(170, 0),
            GridPos::new(0, 170),
        ] {
            assert_eq!(grid.validate(&grass(0), pos), Err(PlacementError::OutOfBounds));
        }
    }

    #[test]
    fn test_occupied_rejected() {
        let mut grid = PlacementGrid::default();
        grid.place(CENTER, grass(0)).unwrap();
        assert_eq!(grid.validate(&grass(1), CENTER), Err(PlacementError::Occupied));
    }

    #[test]
    fn test_isolated_rejected_after_first_tile() {
        let mut grid = PlacementGrid::default();
        grid.place(CENTER, grass(0)).unwrap();
        assert_eq!(
            grid.validate(&grass(1), GridPos::new(0, 0)),
            Err(PlacementError::Isolated)
        );
        // Diagonal contact does not count
        assert_eq!(
            grid.validate(&grass(1), GridPos::new(86, 86)),
            Err(PlacementError::Isolated)
        );
    }

    #[test]
    fn test_edge_mismatch_reports_direction() {
        let mut grid = PlacementGrid::default();
        grid.place(CENTER, tile(0, [Grass, City, Grass, Grass])).unwrap();

        // East neighbor's west side must be City
        let east = CENTER.step(Direction::East);
        assert_eq!(
            grid.validate(&grass(1), east),
            Err(PlacementError::EdgeMismatch(Direction::West))
        );
        assert!(grid.is_valid(&tile(1, [Grass, Grass, Grass, City]), east));
    }

    #[test]
    fn test_every_border_checked() {
        let mut grid = PlacementGrid::default();
        grid.place(CENTER, grass(0)).unwrap();
        grid.place(GridPos::new(86, 86), grass(1)).unwrap_err();
        grid.place(GridPos::new(86, 85), grass(1)).unwrap();
        grid.place(GridPos::new(86, 86), grass(2)).unwrap();

        // (85, 86) touches (85, 85) to the south and (86, 86) to the east
        let road_east = tile(3, [Grass, Road, Grass, Grass]);
        assert_eq!(
            grid.validate(&road_east, GridPos::new(85, 86)),
            Err(PlacementError::EdgeMismatch(Direction::East))
        );
        let road_south = tile(3, [Grass, Grass, Road, Grass]);
        assert_eq!(
            grid.validate(&road_south, GridPos::new(85, 86)),
            Err(PlacementError::EdgeMismatch(Direction::South))
        );
    }

    #[test]
    fn test_failed_place_leaves_grid_untouched() {
        let mut grid = PlacementGrid::default();
        grid.place(CENTER, grass(0)).unwrap();
        let before = grid.clone();
        assert!(grid.place(GridPos::new(3, 3), grass(1)).is_err());
        assert_eq!(grid, before);
    }

    #[test]
    fn test_neighbors_only_occupied_in_order() {
        let mut grid = PlacementGrid::default();
        grid.place(CENTER, grass(0)).unwrap();
        grid.place(CENTER.step(Direction::North), grass(1)).unwrap();
        grid.place(CENTER.step(Direction::East), grass(2)).unwrap();

        let neighbors = grid.neighbors(CENTER);
        assert_eq!(neighbors.len(), 2);
        assert_eq!(neighbors[0].0, Direction::East);
        assert_eq!(neighbors[0].1.id, TileId(2));
        assert_eq!(neighbors[1].0, Direction::North);
        assert_eq!(
            grid.neighbor_directions(CENTER),
            vec![Direction::East, Direction::North]
        );
        assert_eq!(grid.facing_edges(CENTER).len(), 2);
        assert_eq!(grid.neighbor_centers(CENTER)[0], (Direction::East, Grass));
    }

    #[test]
    fn test_queries_at_the_rim_are_bounds_checked() {
        let mut grid = PlacementGrid::new(4);
        grid.place(GridPos::new(0, 0), grass(0)).unwrap();
        assert!(grid.neighbors(GridPos::new(0, 0)).is_empty());
        assert!(grid.neighbors(GridPos::new(-1, 0)).is_empty());
        assert!(grid.has_neighbor(GridPos::new(1, 0)));
        assert_eq!(grid.surround_count(GridPos::new(0, 0), true), 1);
        assert_eq!(grid.surround_count(GridPos::new(-5, 9), true), 0);
        assert_eq!(grid.get(GridPos::new(4, 0)), None);
    }

    #[test]
    fn test_surround_count() {
        let mut grid = PlacementGrid::default();
        grid.place(CENTER, grass(0)).unwrap();
        // Orthogonal cells first so nothing is isolated
        let ring = [
            CENTER.step(Direction::East),
            CENTER.step(Direction::West),
            CENTER.step(Direction::North),
            CENTER.step(Direction::South),
            GridPos::new(84, 84),
            GridPos::new(84, 86),
            GridPos::new(86, 84),
            GridPos::new(86, 86),
        ];
        for (i, pos) in ring.into_iter().enumerate() {
            assert_eq!(grid.surround_count(CENTER, false), 0);
            grid.place(pos, grass(1 + i as u32)).unwrap();
        }
        assert_eq!(grid.surround_count(CENTER, false), 9);
        assert_eq!(grid.surround_count(CENTER.step(Direction::East), false), 0);
        assert_eq!(grid.surround_count(CENTER.step(Direction::East), true), 6);
    }

    #[test]
    fn test_oversized_grid_is_capped() {
        let grid = PlacementGrid::new(usize::MAX);
        assert_eq!(grid.size(), MAX_GRID_SIZE);
        let rim = (MAX_GRID_SIZE - 1) as i32;
        assert!(grid.in_bounds(GridPos::new(rim, rim)));
        assert!(!grid.in_bounds(GridPos::new(rim + 1, 0)));
    }

    #[test]
    fn test_frontier() {
        let mut grid = PlacementGrid::default();
        assert!(grid.frontier().is_empty());
        grid.place(CENTER, grass(0)).unwrap();
        assert_eq!(grid.frontier().len(), 4);
        grid.place(CENTER.step(Direction::East), grass(1)).unwrap();
        let frontier = grid.frontier();
        assert_eq!(frontier.len(), 6);
        assert!(!frontier.contains(&CENTER));
        let mut sorted = frontier.clone();
        sorted.sort();
        assert_eq!(frontier, sorted);
    }
}
