//! City and road feature sets.
//!
//! A feature set is a connected component of city (or road) sub-tiles over
//! `Feature` edges. Sets are updated from the `BoardChanged` notification of
//! each placement: the new tile's facets either start a set, extend the one
//! set they touch, or fuse every set they touch into a fresh one.
//!
//! Cloisters are not tracked here; each is a single-tile feature scored from
//! the grid's surround count.

use crate::geography::FeatureKind;
use crate::graph::{BoardChanged, ConnectionType};
use crate::grid::GridPos;
use crate::subtile::SubTileCoord;
use crate::tile::TileId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Feature set identifier; never reused within a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeatureId(pub u32);

/// One tile taking part in a feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeatureEntry {
    pub position: GridPos,
    pub tile: TileId,
}

/// A connected city or road
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub id: FeatureId,
    pub kind: FeatureKind,
    members: BTreeSet<SubTileCoord>,
    entries: BTreeSet<FeatureEntry>,
    /// Member sides no neighboring tile touches yet
    open_ends: BTreeSet<SubTileCoord>,
}

impl FeatureSet {
    fn new(id: FeatureId, kind: FeatureKind) -> Self {
        Self {
            id,
            kind,
            members: BTreeSet::new(),
            entries: BTreeSet::new(),
            open_ends: BTreeSet::new(),
        }
    }

    /// Sub-tile locations in this feature
    pub fn members(&self) -> &BTreeSet<SubTileCoord> {
        &self.members
    }

    /// Tiles in this feature with their positions
    pub fn entries(&self) -> &BTreeSet<FeatureEntry> {
        &self.entries
    }

    pub fn open_ends(&self) -> &BTreeSet<SubTileCoord> {
        &self.open_ends
    }

    pub fn contains(&self, location: SubTileCoord) -> bool {
        self.members.contains(&location)
    }

    pub fn contains_position(&self, position: GridPos) -> bool {
        self.entries.iter().any(|e| e.position == position)
    }

    /// Number of distinct tiles
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// Closed on every side
    pub fn is_complete(&self) -> bool {
        self.open_ends.is_empty()
    }

    /// Points: a finished city is worth 2 per tile, an unfinished one 1;
    /// roads are worth 1 per tile either way.
    pub fn score(&self) -> u32 {
        let tiles = self.size() as u32;
        match self.kind {
            FeatureKind::City if self.is_complete() => tiles * 2,
            FeatureKind::City | FeatureKind::Road => tiles,
        }
    }

    fn absorb(&mut self, other: FeatureSet) {
        self.members.extend(other.members);
        self.entries.extend(other.entries);
        self.open_ends.extend(other.open_ends);
    }
}

/// What happened to the feature sets during one placement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureUpdate {
    /// A new feature started on the placed tile
    Created { id: FeatureId, kind: FeatureKind },
    /// The placed tile joined an existing feature
    Extended { id: FeatureId, kind: FeatureKind },
    /// The placed tile bridged several features into a new one
    Merged {
        into: FeatureId,
        from: Vec<FeatureId>,
        kind: FeatureKind,
    },
    /// A feature has no open ends left
    Completed {
        id: FeatureId,
        kind: FeatureKind,
        score: u32,
    },
}

/// Every city and road set on the board
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureState {
    sets: BTreeMap<FeatureId, FeatureSet>,
    membership: BTreeMap<SubTileCoord, FeatureId>,
    next_id: u32,
}

impl FeatureState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets of one kind, ordered by id
    pub fn sets(&self, kind: FeatureKind) -> Vec<&FeatureSet> {
        self.sets.values().filter(|s| s.kind == kind).collect()
    }

    pub fn all(&self) -> impl Iterator<Item = &FeatureSet> {
        self.sets.values()
    }

    pub fn get(&self, id: FeatureId) -> Option<&FeatureSet> {
        self.sets.get(&id)
    }

    /// The set a sub-tile belongs to
    pub fn set_of(&self, location: SubTileCoord) -> Option<&FeatureSet> {
        self.membership.get(&location).and_then(|id| self.sets.get(id))
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    fn allocate(&mut self) -> FeatureId {
        let id = FeatureId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Fold one placement's graph changes into the feature sets
    pub fn apply(&mut self, changed: &BoardChanged) -> Vec<FeatureUpdate> {
        let mut updates = Vec::new();
        for kind in FeatureKind::ALL {
            self.apply_kind(changed, kind, &mut updates);
        }
        updates
    }

    fn apply_kind(
        &mut self,
        changed: &BoardChanged,
        kind: FeatureKind,
        updates: &mut Vec<FeatureUpdate>,
    ) {
        let geography = kind.geography();
        let fresh: BTreeMap<SubTileCoord, FeatureEntry> = changed
            .vertices
            .iter()
            .filter(|v| v.geography == geography)
            .map(|v| {
                let entry = FeatureEntry {
                    position: v.position,
                    tile: v.tile,
                };
                (v.location, entry)
            })
            .collect();
        if fresh.is_empty() {
            return;
        }

        // Links inside the new tile, and links from it to the existing board
        let mut local: BTreeMap<SubTileCoord, Vec<SubTileCoord>> = BTreeMap::new();
        let mut outward: BTreeMap<SubTileCoord, Vec<SubTileCoord>> = BTreeMap::new();
        for edge in changed.edges_of_kind(ConnectionType::Feature) {
            let (a, b) = (edge.source.location, edge.target.location);
            match (fresh.contains_key(&a), fresh.contains_key(&b)) {
                (true, true) => {
                    local.entry(a).or_default().push(b);
                    local.entry(b).or_default().push(a);
                }
                (true, false) => outward.entry(a).or_default().push(b),
                (false, true) => outward.entry(b).or_default().push(a),
                (false, false) => {}
            }
        }

        let mut touched_targets = BTreeSet::new();
        let mut visited = BTreeSet::new();
        for &start in fresh.keys() {
            if !visited.insert(start) {
                continue;
            }
            let mut component = vec![start];
            let mut cursor = 0;
            while cursor < component.len() {
                let here = component[cursor];
                cursor += 1;
                for next in local.get(&here).into_iter().flatten() {
                    if visited.insert(*next) {
                        component.push(*next);
                    }
                }
            }

            let linked: Vec<SubTileCoord> = component
                .iter()
                .flat_map(|loc| outward.get(loc).into_iter().flatten().copied())
                .collect();
            let touched: BTreeSet<FeatureId> = linked
                .iter()
                .filter_map(|loc| self.membership.get(loc).copied())
                .collect();

            let mut ids = touched.iter().copied();
            let target = match (ids.next(), ids.next()) {
                (None, _) => {
                    let id = self.allocate();
                    updates.push(FeatureUpdate::Created { id, kind });
                    id
                }
                (Some(id), None) => {
                    updates.push(FeatureUpdate::Extended { id, kind });
                    id
                }
                _ => {
                    let id = self.allocate();
                    let from: Vec<FeatureId> = touched.iter().copied().collect();
                    debug!(?kind, into = id.0, from = ?from, "features merged");
                    updates.push(FeatureUpdate::Merged { into: id, from, kind });
                    id
                }
            };

            let mut set = FeatureSet::new(target, kind);
            for id in &touched {
                if let Some(old) = self.sets.remove(id) {
                    set.absorb(old);
                }
            }
            for loc in &component {
                set.members.insert(*loc);
                set.entries.insert(fresh[loc]);
                if !outward.contains_key(loc) {
                    set.open_ends.insert(*loc);
                }
            }
            for loc in &linked {
                set.open_ends.remove(loc);
            }
            for loc in &set.members {
                self.membership.insert(*loc, target);
            }
            self.sets.insert(target, set);
            touched_targets.insert(target);
        }

        for id in touched_targets {
            if let Some(set) = self.sets.get(&id) {
                if set.is_complete() {
                    updates.push(FeatureUpdate::Completed {
                        id,
                        kind,
                        score: set.score(),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geography::Geography::{self, City, Grass, Road, Village};
    use crate::graph::BoardGraph;
    use crate::tile::Tile;

    struct Harness {
        graph: BoardGraph,
        features: FeatureState,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                graph: BoardGraph::new(),
                features: FeatureState::new(),
            }
        }

        fn place(
            &mut self,
            id: u32,
            sides: [Geography; 4],
            center: Geography,
            x: i32,
            z: i32,
        ) -> Vec<FeatureUpdate> {
            let tile = Tile::new(TileId(id), sides, center);
            let local = BoardGraph::from_tile(&tile, GridPos::new(x, z)).unwrap();
            let changed = self.graph.merge(local).unwrap();
            self.features.apply(&changed)
        }
    }

    #[test]
    fn test_grass_tile_creates_nothing() {
        let mut h = Harness::new();
        assert!(h.place(0, [Grass; 4], Grass, 0, 0).is_empty());
        assert!(h.features.is_empty());
    }

    #[test]
    fn test_separate_caps_make_separate_cities() {
        let mut h = Harness::new();
        let updates = h.place(0, [Grass, City, Grass, City], Grass, 0, 0);
        assert_eq!(updates.len(), 2);
        assert_eq!(h.features.sets(FeatureKind::City).len(), 2);
    }

    #[test]
    fn test_joined_city_extends() {
        let mut h = Harness::new();
        h.place(0, [Grass, City, Grass, Grass], Grass, 0, 0);
        let updates = h.place(1, [Grass, Grass, Grass, City], Grass, 1, 0);

        let cities = h.features.sets(FeatureKind::City);
        assert_eq!(cities.len(), 1);
        assert_eq!(cities[0].size(), 2);
        assert!(cities[0].is_complete());
        assert_eq!(cities[0].score(), 4);
        assert_eq!(
            updates,
            vec![
                FeatureUpdate::Extended { id: FeatureId(0), kind: FeatureKind::City },
                FeatureUpdate::Completed { id: FeatureId(0), kind: FeatureKind::City, score: 4 },
            ]
        );
    }

    #[test]
    fn test_bridge_merges_two_cities() {
        let mut h = Harness::new();
        h.place(0, [Grass, City, Grass, Grass], Grass, 0, 0);
        h.place(1, [Grass; 4], Grass, 0, 1);
        h.place(2, [Grass; 4], Grass, 1, 1);
        h.place(3, [Grass; 4], Grass, 2, 1);
        h.place(4, [Grass, Grass, Grass, City], Grass, 2, 0);
        assert_eq!(h.features.sets(FeatureKind::City).len(), 2);

        let updates = h.place(5, [Grass, City, Grass, City], City, 1, 0);
        let cities = h.features.sets(FeatureKind::City);
        assert_eq!(cities.len(), 1);
        assert_eq!(cities[0].size(), 3);
        assert_eq!(cities[0].id, FeatureId(2));
        assert!(matches!(
            &updates[0],
            FeatureUpdate::Merged { into: FeatureId(2), from, .. } if from == &vec![FeatureId(0), FeatureId(1)]
        ));
        assert!(h.features.get(FeatureId(0)).is_none());
    }

    #[test]
    fn test_set_ids_come_from_the_allocator() {
        let mut h = Harness::new();
        h.place(0, [Grass, City, Grass, City], Grass, 0, 0);
        h.place(1, [Grass, City, Grass, City], City, 1, 0);
        h.place(2, [Grass, Road, City, Road], Road, 2, 1);
        h.place(3, [City, Grass, Grass, City], City, 2, 0);

        assert!(!h.features.is_empty());
        for set in h.features.all() {
            assert!(set.id.0 < h.features.next_id, "{:?}", set.id);
            assert_eq!(h.features.set_of(*set.members().iter().next().unwrap()), Some(set));
        }
        for id in h.features.membership.values() {
            assert!(h.features.get(*id).is_some(), "{:?}", id);
        }
    }

    #[test]
    fn test_roads_tracked_independently() {
        let mut h = Harness::new();
        h.place(0, [City, Road, Grass, Road], Road, 0, 0);
        h.place(1, [Grass, Grass, Road, Road], Road, 1, 0);
        // Crossroads: one arm continues the road, three start new ones
        let updates = h.place(2, [Road; 4], Village, 1, -1);

        assert_eq!(h.features.sets(FeatureKind::City).len(), 1);
        let roads = h.features.sets(FeatureKind::Road);
        assert_eq!(roads.len(), 4);
        let long = roads.iter().find(|r| r.size() == 3).unwrap();
        assert!(updates.contains(&FeatureUpdate::Extended {
            id: long.id,
            kind: FeatureKind::Road
        }));
        assert_eq!(
            updates
                .iter()
                .filter(|u| matches!(u, FeatureUpdate::Created { kind: FeatureKind::Road, .. }))
                .count(),
            3
        );
        assert_eq!(long.open_ends().len(), 1);
        assert!(!long.is_complete());
        assert_eq!(long.score(), 3);
    }

    #[test]
    fn test_every_city_facet_in_exactly_one_set() {
        let mut h = Harness::new();
        h.place(0, [City, City, Grass, Grass], Grass, 0, 0);
        h.place(1, [Grass, Grass, Grass, City], Grass, 1, 0);
        h.place(2, [Grass, Grass, City, City], City, 0, 1);

        for vertex in h.graph.vertices().filter(|v| v.geography == City) {
            let holders = h
                .features
                .all()
                .filter(|s| s.contains(vertex.location))
                .count();
            assert_eq!(holders, 1, "{:?}", vertex.location);
            let set = h.features.set_of(vertex.location).unwrap();
            assert_eq!(set.members(), &h.graph.feature_component(vertex.location));
        }
    }
}
