//! The board graph: how tile sides connect into features.
//!
//! Vertices are `SubTile`s keyed by their sub-tile location. Edges are
//! undirected and typed:
//! - `Tile`: two facets of one tile that lie next to each other
//! - `Board`: two touching sides of neighboring tiles
//! - `Feature`: two city (or road) facets that belong to the same feature
//!
//! A placement first builds a small graph for the new tile alone
//! (`BoardGraph::from_tile`) and then merges it into the board graph
//! (`BoardGraph::merge`), which links it to its neighbors and reports what
//! was added.

use crate::geography::{Direction, Geography};
use crate::grid::GridPos;
use crate::subtile::{SubTile, SubTileCoord};
use crate::tile::{Tile, TileId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::hash::{Hash, Hasher};
use thiserror::Error;
use tracing::debug;

/// Broken graph invariants. These indicate a bug upstream, not bad input.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GraphError {
    #[error("Sub-tile location {location:?} claimed by tile {existing} and tile {incoming}")]
    IdentityConflict {
        location: SubTileCoord,
        existing: TileId,
        incoming: TileId,
    },

    #[error("Touching sides at {location:?} and {neighbor:?} differ: {expected:?} vs {found:?}")]
    AdjacencyMismatch {
        location: SubTileCoord,
        neighbor: SubTileCoord,
        expected: Geography,
        found: Geography,
    },

    #[error("Tile {tile} is already on the board at {existing:?}, cannot place it again at {incoming:?}")]
    DuplicateTile {
        tile: TileId,
        existing: GridPos,
        incoming: GridPos,
    },
}

/// Kind of connection an edge records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConnectionType {
    /// Neighboring facets of one tile
    Tile,
    /// Touching sides of two tiles
    Board,
    /// Facets of the same city or road
    Feature,
}

/// Undirected typed edge.
///
/// `source` is always the lesser endpoint under `SubTile::try_cmp`, so one
/// connection has exactly one representation whatever order it was built in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CarcassonneEdge {
    pub source: SubTile,
    pub target: SubTile,
    pub kind: ConnectionType,
}

impl CarcassonneEdge {
    /// Build the canonical edge between two vertices
    pub fn between(a: SubTile, b: SubTile, kind: ConnectionType) -> Result<Self, GraphError> {
        let (source, target) = match a.try_cmp(&b)? {
            Ordering::Greater => (b, a),
            _ => (a, b),
        };
        Ok(Self {
            source,
            target,
            kind,
        })
    }

    fn key(&self) -> (SubTileCoord, SubTileCoord, ConnectionType) {
        (self.source.location, self.target.location, self.kind)
    }

    pub fn length_squared(&self) -> i32 {
        self.source.location.distance_squared(self.target.location)
    }

    /// The endpoint opposite `location`, if the edge touches it
    pub fn other(&self, location: SubTileCoord) -> Option<&SubTile> {
        if self.source.location == location {
            Some(&self.target)
        } else if self.target.location == location {
            Some(&self.source)
        } else {
            None
        }
    }

    /// Whether the endpoints belong to different tiles
    pub fn crosses_tiles(&self) -> bool {
        self.source.tile != self.target.tile
    }
}

impl PartialEq for CarcassonneEdge {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for CarcassonneEdge {}

impl Hash for CarcassonneEdge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for CarcassonneEdge {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CarcassonneEdge {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// What a merge added to the board graph
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoardChanged {
    /// New vertices, ordered by location
    pub vertices: Vec<SubTile>,
    /// New edges, in canonical order
    pub edges: Vec<CarcassonneEdge>,
}

impl BoardChanged {
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.edges.is_empty()
    }

    /// New edges of one kind
    pub fn edges_of_kind(&self, kind: ConnectionType) -> impl Iterator<Item = &CarcassonneEdge> {
        self.edges.iter().filter(move |e| e.kind == kind)
    }
}

/// Undirected typed graph over sub-tiles
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardGraph {
    vertices: BTreeMap<SubTileCoord, SubTile>,
    edges: BTreeSet<CarcassonneEdge>,
}

impl BoardGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Vertices ordered by location
    pub fn vertices(&self) -> impl Iterator<Item = &SubTile> {
        self.vertices.values()
    }

    /// Edges in canonical order
    pub fn edges(&self) -> impl Iterator<Item = &CarcassonneEdge> {
        self.edges.iter()
    }

    pub fn vertex_at(&self, location: SubTileCoord) -> Option<&SubTile> {
        self.vertices.get(&location)
    }

    pub fn contains_edge(&self, edge: &CarcassonneEdge) -> bool {
        self.edges.contains(edge)
    }

    /// Edges of one kind touching a location
    pub fn edges_at(
        &self,
        location: SubTileCoord,
        kind: ConnectionType,
    ) -> impl Iterator<Item = &CarcassonneEdge> {
        self.edges
            .iter()
            .filter(move |e| e.kind == kind && e.other(location).is_some())
    }

    /// Add a vertex. Returns `false` if the same vertex was already present.
    pub fn add_vertex(&mut self, vertex: SubTile) -> Result<bool, GraphError> {
        match self.vertices.get(&vertex.location) {
            Some(existing) => existing.try_cmp(&vertex).map(|_| false),
            None => {
                self.vertices.insert(vertex.location, vertex);
                Ok(true)
            }
        }
    }

    /// Add an edge between two vertices, adding them as needed
    pub fn add_edge(
        &mut self,
        a: SubTile,
        b: SubTile,
        kind: ConnectionType,
    ) -> Result<bool, GraphError> {
        let edge = CarcassonneEdge::between(a, b, kind)?;
        self.add_vertex(a)?;
        self.add_vertex(b)?;
        Ok(self.edges.insert(edge))
    }

    /// Graph of a single tile placed at `position`.
    ///
    /// One vertex per side, plus the center when it is a cloister. Facets
    /// closer than two units get a `Tile` edge; same-kind city or road sides
    /// joined through the center get a `Feature` edge. On a cloister the
    /// opposite-side `Tile` edges are dropped since the center now links them.
    pub fn from_tile(tile: &Tile, position: GridPos) -> Result<Self, GraphError> {
        let mut graph = Self::new();
        for direction in Direction::SIDES {
            graph.add_and_connect(tile, position, direction)?;
        }

        if tile.is_cloister() {
            graph.add_and_connect(tile, position, Direction::Center)?;
            graph
                .edges
                .retain(|e| !(e.kind == ConnectionType::Tile && e.length_squared() == 4));
        }

        Ok(graph)
    }

    fn add_and_connect(
        &mut self,
        tile: &Tile,
        position: GridPos,
        direction: Direction,
    ) -> Result<(), GraphError> {
        let vertex = SubTile::new(tile, position, direction);
        self.add_vertex(vertex)?;

        let others: Vec<SubTile> = self
            .vertices
            .values()
            .filter(|v| v.location != vertex.location)
            .copied()
            .collect();

        let joins_features = direction != Direction::Center
            && vertex.geography.feature_kind().is_some()
            && tile.center.connects(vertex.geography);

        for other in others {
            if other.location.distance_squared(vertex.location) < 4 {
                self.add_edge(other, vertex, ConnectionType::Tile)?;
            }
            if joins_features && other.geography == vertex.geography {
                self.add_edge(other, vertex, ConnectionType::Feature)?;
            }
        }
        Ok(())
    }

    /// Merge another graph (usually one tile) into this one.
    ///
    /// Every vertex and edge of `other` is added, and each touching pair of
    /// sides from different tiles gets a `Board` edge, plus a `Feature` edge
    /// for cities and roads. All checks run before anything is inserted, so
    /// on error the graph is unchanged.
    pub fn merge(&mut self, other: BoardGraph) -> Result<BoardChanged, GraphError> {
        let mut new_vertices = Vec::new();
        for vertex in other.vertices.values() {
            match self.vertices.get(&vertex.location) {
                Some(existing) => {
                    existing.try_cmp(vertex)?;
                }
                None => new_vertices.push(*vertex),
            }
        }

        let mut new_edges: BTreeSet<CarcassonneEdge> = other
            .edges
            .iter()
            .filter(|e| !self.edges.contains(*e))
            .copied()
            .collect();

        for vertex in other.vertices.values() {
            for location in vertex.location.adjacent() {
                let Some(neighbor) = self
                    .vertices
                    .get(&location)
                    .or_else(|| other.vertices.get(&location))
                else {
                    continue;
                };
                if neighbor.tile == vertex.tile {
                    if neighbor.position != vertex.position {
                        return Err(GraphError::DuplicateTile {
                            tile: vertex.tile,
                            existing: neighbor.position,
                            incoming: vertex.position,
                        });
                    }
                    continue;
                }
                if neighbor.geography != vertex.geography {
                    return Err(GraphError::AdjacencyMismatch {
                        location: vertex.location,
                        neighbor: neighbor.location,
                        expected: neighbor.geography,
                        found: vertex.geography,
                    });
                }

                let board = CarcassonneEdge::between(*neighbor, *vertex, ConnectionType::Board)?;
                if !self.edges.contains(&board) {
                    new_edges.insert(board);
                }
                if vertex.geography.feature_kind().is_some() {
                    let feature =
                        CarcassonneEdge::between(*neighbor, *vertex, ConnectionType::Feature)?;
                    if !self.edges.contains(&feature) {
                        new_edges.insert(feature);
                    }
                }
            }
        }

        for vertex in &new_vertices {
            self.vertices.insert(vertex.location, *vertex);
        }
        self.edges.extend(new_edges.iter().copied());

        debug!(
            vertices = new_vertices.len(),
            edges = new_edges.len(),
            total_vertices = self.vertices.len(),
            total_edges = self.edges.len(),
            "board graph changed"
        );

        Ok(BoardChanged {
            vertices: new_vertices,
            edges: new_edges.into_iter().collect(),
        })
    }

    /// Locations reachable from `start` over `Feature` edges, including itself
    pub fn feature_component(&self, start: SubTileCoord) -> BTreeSet<SubTileCoord> {
        let mut seen = BTreeSet::new();
        if !self.vertices.contains_key(&start) {
            return seen;
        }
        let mut queue = VecDeque::from([start]);
        seen.insert(start);
        while let Some(location) = queue.pop_front() {
            for edge in self.edges_at(location, ConnectionType::Feature) {
                if let Some(next) = edge.other(location) {
                    if seen.insert(next.location) {
                        queue.push_back(next.location);
                    }
                }
            }
        }
        seen
    }

    /// Vertices belonging to one tile
    pub fn tile_vertices(&self, tile: TileId) -> impl Iterator<Item = &SubTile> {
        self.vertices.values().filter(move |v| v.tile == tile)
    }
}
