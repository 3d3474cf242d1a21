// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena-based storage for geometry graph entities.
//!
//! The [`GeometryArena`] is the central owner of all graph data. Every entity
//! (point, way, relation, feature) lives inside slot maps with stable,
//! generational keys. A single upward index maps each geometry to the set of
//! parents referencing it, enabling both downward traversal (relation → ways
//! → points) and upward traversal (point → which ways and features use it).
//!
//! ## Shared ownership
//!
//! A point may be referenced by any number of ways, a way by any number of
//! relations and by a feature. The parent set is the entity's reference
//! count: when the last parent edge is removed, the entity leaves the live
//! set (see [`remove_parent`](GeometryArena::remove_parent)). Every mutation
//! goes through arena-owned operations so the two directions of the index
//! can never disagree.

use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::features::Tags;
use crate::ids::IdAllocator;
use crate::keys::*;

/// Data stored for a point: a coordinate pair plus the vertical level marker.
///
/// `level` is produced by an upstream elevation pre-pass (0 for ground-level
/// nodes) and is consumed unchanged here; points only merge within the same
/// level.
#[derive(Debug, Clone)]
pub struct PointData {
    pub id: i64,
    pub x: f64,
    pub y: f64,
    pub level: i32,
}

/// Data stored for a way: an ordered sequence of point references.
///
/// The sequence order defines the line's direction and shape. Closed rings
/// store the same point key at both ends.
#[derive(Debug, Clone)]
pub struct WayData {
    pub id: i64,
    pub nodes: Vec<PointKey>,
    /// Set once the emitter has flipped a one-way drawn against travel
    /// direction, so repeated serialization never reverses twice.
    pub(crate) reversed: bool,
}

/// The role a way plays inside a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberRole {
    Outer,
    Inner,
}

impl MemberRole {
    /// Returns the role name as written to the output document.
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Outer => "outer",
            MemberRole::Inner => "inner",
        }
    }
}

impl std::fmt::Display for MemberRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data stored for a relation: an ordered sequence of (way, role) members.
#[derive(Debug, Clone)]
pub struct RelationData {
    pub id: i64,
    pub members: SmallVec<[(WayKey, MemberRole); 4]>,
}

/// Data stored for a feature: one geometry reference and its tag mapping.
#[derive(Debug, Clone)]
pub struct FeatureData {
    pub geometry: EntityKey,
    pub tags: Tags,
}

/// The central arena that owns all graph entities and the parent index.
///
/// # Example
///
/// ```
/// use vec2osm_topology::GeometryArena;
///
/// let mut arena = GeometryArena::new();
/// let p0 = arena.add_point(10.0, 20.0, 0);
/// let p1 = arena.add_point(11.0, 20.0, 0);
/// let way = arena.add_way();
/// arena.way_push_node(way, p0).unwrap();
/// arena.way_push_node(way, p1).unwrap();
///
/// assert_eq!(arena.point_count(), 2);
/// assert_eq!(arena.way_count(), 1);
/// ```
#[derive(Debug)]
pub struct GeometryArena {
    // Entity storage
    pub(crate) points: SlotMap<PointKey, PointData>,
    pub(crate) ways: SlotMap<WayKey, WayData>,
    pub(crate) relations: SlotMap<RelationKey, RelationData>,
    pub(crate) features: SlotMap<FeatureKey, FeatureData>,

    // Upward index: geometry → parents referencing it
    pub(crate) parents: FxHashMap<EntityKey, FxHashSet<ParentKey>>,

    // Feature table: geometry → its (single) feature
    pub(crate) feature_of: FxHashMap<EntityKey, FeatureKey>,

    // Element id assignment
    pub(crate) ids: IdAllocator,
}

impl GeometryArena {
    /// Creates a new, empty arena.
    pub fn new() -> Self {
        Self {
            points: SlotMap::with_key(),
            ways: SlotMap::with_key(),
            relations: SlotMap::with_key(),
            features: SlotMap::with_key(),

            parents: FxHashMap::default(),
            feature_of: FxHashMap::default(),

            ids: IdAllocator::new(),
        }
    }

    // --- Point accessors ---

    /// Returns the point data for the given key, or `None` if not live.
    pub fn point(&self, key: PointKey) -> Option<&PointData> {
        self.points.get(key)
    }

    /// Returns the number of live points.
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    // --- Way accessors ---

    /// Returns the way data for the given key, or `None` if not live.
    pub fn way(&self, key: WayKey) -> Option<&WayData> {
        self.ways.get(key)
    }

    /// Returns the number of live ways.
    pub fn way_count(&self) -> usize {
        self.ways.len()
    }

    // --- Relation accessors ---

    /// Returns the relation data for the given key, or `None` if not live.
    pub fn relation(&self, key: RelationKey) -> Option<&RelationData> {
        self.relations.get(key)
    }

    /// Returns the number of live relations.
    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }

    // --- Feature accessors ---

    /// Returns the feature data for the given key, or `None` if not live.
    pub fn feature(&self, key: FeatureKey) -> Option<&FeatureData> {
        self.features.get(key)
    }

    /// Returns the number of features.
    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    // --- Entity existence and identity ---

    /// Returns `true` if the given key references a live entity.
    pub fn contains(&self, key: EntityKey) -> bool {
        match key {
            EntityKey::Point(k) => self.points.contains_key(k),
            EntityKey::Way(k) => self.ways.contains_key(k),
            EntityKey::Relation(k) => self.relations.contains_key(k),
        }
    }

    /// Returns `true` if the given parent key references a live parent.
    pub fn contains_parent(&self, key: ParentKey) -> bool {
        match key {
            ParentKey::Way(k) => self.ways.contains_key(k),
            ParentKey::Relation(k) => self.relations.contains_key(k),
            ParentKey::Feature(k) => self.features.contains_key(k),
        }
    }

    /// Returns the element id of a live entity.
    pub fn entity_id(&self, key: EntityKey) -> Option<i64> {
        match key {
            EntityKey::Point(k) => self.points.get(k).map(|p| p.id),
            EntityKey::Way(k) => self.ways.get(k).map(|w| w.id),
            EntityKey::Relation(k) => self.relations.get(k).map(|r| r.id),
        }
    }

    // --- Parent index queries ---

    /// Returns the parents currently referencing an entity.
    ///
    /// The order is unspecified; compare with `len`/`contains` in callers
    /// that need determinism.
    pub fn parents_of(&self, entity: EntityKey) -> Vec<ParentKey> {
        self.parents
            .get(&entity)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Returns the number of parents referencing an entity.
    pub fn parent_count(&self, entity: EntityKey) -> usize {
        self.parents.get(&entity).map_or(0, |set| set.len())
    }

    /// Returns `true` if `parent` currently references `entity`.
    pub fn has_parent(&self, entity: EntityKey, parent: ParentKey) -> bool {
        self.parents
            .get(&entity)
            .is_some_and(|set| set.contains(&parent))
    }

    // --- Creation-order enumeration ---
    //
    // Ids descend from −1, so descending id order is creation order. The
    // serializer and the consolidator both depend on this being stable
    // regardless of slot reuse inside the slot maps.

    /// Returns all live point keys in creation order.
    pub fn points_ordered(&self) -> Vec<PointKey> {
        let mut keyed: Vec<(i64, PointKey)> =
            self.points.iter().map(|(k, p)| (p.id, k)).collect();
        keyed.sort_unstable_by(|a, b| b.0.cmp(&a.0));
        keyed.into_iter().map(|(_, k)| k).collect()
    }

    /// Returns all live way keys in creation order.
    pub fn ways_ordered(&self) -> Vec<WayKey> {
        let mut keyed: Vec<(i64, WayKey)> = self.ways.iter().map(|(k, w)| (w.id, k)).collect();
        keyed.sort_unstable_by(|a, b| b.0.cmp(&a.0));
        keyed.into_iter().map(|(_, k)| k).collect()
    }

    /// Returns all live relation keys in creation order.
    pub fn relations_ordered(&self) -> Vec<RelationKey> {
        let mut keyed: Vec<(i64, RelationKey)> =
            self.relations.iter().map(|(k, r)| (r.id, k)).collect();
        keyed.sort_unstable_by(|a, b| b.0.cmp(&a.0));
        keyed.into_iter().map(|(_, k)| k).collect()
    }

    // --- Destruction ---

    /// Removes an entity from the live set.
    ///
    /// Outgoing references of the entity are assumed already cleared by the
    /// caller; this does not cascade into children.
    pub(crate) fn destroy_entity(&mut self, entity: EntityKey) {
        match entity {
            EntityKey::Point(k) => {
                self.points.remove(k);
            }
            EntityKey::Way(k) => {
                self.ways.remove(k);
            }
            EntityKey::Relation(k) => {
                self.relations.remove(k);
            }
        }
        self.parents.remove(&entity);
        self.feature_of.remove(&entity);
    }
}

impl Default for GeometryArena {
    fn default() -> Self {
        Self::new()
    }
}
