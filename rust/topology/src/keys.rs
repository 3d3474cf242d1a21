// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity key types for arena-based storage.
//!
//! Each graph entity gets a unique, type-safe key for O(1) lookup in the
//! arena. Keys are created by `slotmap::SlotMap` and remain valid even after
//! other entities are removed (generational indices). The integer element id
//! written to the output document lives on the entity data, not the key.

use slotmap::new_key_type;

new_key_type! {
    /// Key for a point (a single coordinate node).
    pub struct PointKey;

    /// Key for a way (an ordered polyline or ring of points).
    pub struct WayKey;

    /// Key for a relation (a role-tagged grouping of ways).
    pub struct RelationKey;

    /// Key for a feature (the tag-bearing wrapper around one geometry).
    pub struct FeatureKey;
}

/// A key that can reference any geometry entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKey {
    Point(PointKey),
    Way(WayKey),
    Relation(RelationKey),
}

impl EntityKey {
    /// Returns the entity type of this key.
    pub fn entity_type(&self) -> EntityType {
        match self {
            EntityKey::Point(_) => EntityType::Point,
            EntityKey::Way(_) => EntityType::Way,
            EntityKey::Relation(_) => EntityType::Relation,
        }
    }
}

/// A key that can reference anything able to hold references to an entity:
/// a way (referencing points), a relation (referencing ways), or a feature
/// (referencing its single geometry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParentKey {
    Way(WayKey),
    Relation(RelationKey),
    Feature(FeatureKey),
}

/// Discriminant for geometry entity types.
///
/// The ordering matches the emission order of the output document: all nodes
/// come first, then ways, then relations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityType {
    Point = 0,
    Way = 1,
    Relation = 2,
}

impl EntityType {
    /// Returns the type name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Point => "Point",
            EntityType::Way => "Way",
            EntityType::Relation => "Relation",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Conversion impls from specific keys to the union keys
impl From<PointKey> for EntityKey {
    fn from(k: PointKey) -> Self {
        EntityKey::Point(k)
    }
}

impl From<WayKey> for EntityKey {
    fn from(k: WayKey) -> Self {
        EntityKey::Way(k)
    }
}

impl From<RelationKey> for EntityKey {
    fn from(k: RelationKey) -> Self {
        EntityKey::Relation(k)
    }
}

impl From<WayKey> for ParentKey {
    fn from(k: WayKey) -> Self {
        ParentKey::Way(k)
    }
}

impl From<RelationKey> for ParentKey {
    fn from(k: RelationKey) -> Self {
        ParentKey::Relation(k)
    }
}

impl From<FeatureKey> for ParentKey {
    fn from(k: FeatureKey) -> Self {
        ParentKey::Feature(k)
    }
}
