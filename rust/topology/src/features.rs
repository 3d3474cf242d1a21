// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tag-bearing features attached to geometry entities.
//!
//! A feature wraps exactly one geometry with a string tag mapping. The arena
//! keeps a lookup table from geometry to feature; attaching a second feature
//! to the same geometry is rejected rather than silently shadowing the first.

use indexmap::IndexMap;
use rustc_hash::FxHasher;
use std::hash::BuildHasherDefault;

use crate::arena::{FeatureData, GeometryArena};
use crate::error::{Error, Result};
use crate::keys::{EntityKey, FeatureKey, ParentKey};

/// A tag mapping with unique keys and stable insertion order.
///
/// Order does not affect graph semantics but is preserved so emitted
/// documents are byte-stable across runs.
pub type Tags = IndexMap<String, String, BuildHasherDefault<FxHasher>>;

/// Builds a [`Tags`] map from key/value pairs, preserving their order.
pub fn tags_from<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Tags
where
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

impl GeometryArena {
    /// Attaches a feature carrying `tags` to a live geometry.
    ///
    /// The feature becomes a parent of the geometry, so a tagged entity
    /// stays live even when no way or relation references it.
    ///
    /// Returns [`Error::FeatureAlreadyAttached`] if the geometry already has
    /// a feature.
    pub fn attach_feature(&mut self, entity: EntityKey, tags: Tags) -> Result<FeatureKey> {
        if !self.contains(entity) {
            return Err(Error::NotFound(entity));
        }
        if self.feature_of.contains_key(&entity) {
            return Err(Error::FeatureAlreadyAttached(entity));
        }

        let key = self.features.insert(FeatureData {
            geometry: entity,
            tags,
        });
        self.feature_of.insert(entity, key);
        self.add_parent(entity, ParentKey::Feature(key))?;
        Ok(key)
    }

    /// Returns the feature attached to a geometry, if any.
    pub fn feature_of(&self, entity: EntityKey) -> Option<FeatureKey> {
        self.feature_of.get(&entity).copied()
    }

    /// Returns the feature attached to a geometry, or
    /// [`Error::FeatureMissing`] when one is required.
    pub fn require_feature(&self, entity: EntityKey) -> Result<FeatureKey> {
        self.feature_of(entity).ok_or(Error::FeatureMissing(entity))
    }

    /// Returns the tags of a geometry's feature, if it has one.
    pub fn tags_of(&self, entity: EntityKey) -> Option<&Tags> {
        self.feature_of(entity)
            .and_then(|f| self.features.get(f))
            .map(|f| &f.tags)
    }

    /// Returns a mutable reference to a feature's tags.
    pub fn feature_tags_mut(&mut self, key: FeatureKey) -> Option<&mut Tags> {
        self.features.get_mut(key).map(|f| &mut f.tags)
    }

    /// Detaches and removes a feature.
    ///
    /// The feature's parent edge is dropped; a geometry kept alive only by
    /// its feature is destroyed with it.
    pub fn detach_feature(&mut self, key: FeatureKey) -> Result<()> {
        let data = self.features.remove(key).ok_or(Error::FeatureNotFound(key))?;
        if self.feature_of.get(&data.geometry) == Some(&key) {
            self.feature_of.remove(&data.geometry);
        }
        self.remove_parent(data.geometry, ParentKey::Feature(key), true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_and_look_up_feature() {
        let mut arena = GeometryArena::new();
        let p = arena.add_point(1.0, 2.0, 0);
        let f = arena
            .attach_feature(p.into(), tags_from([("highway", "primary")]))
            .unwrap();

        assert_eq!(arena.feature_of(p.into()), Some(f));
        assert_eq!(
            arena.tags_of(p.into()).unwrap().get("highway"),
            Some(&"primary".to_string())
        );
        assert!(arena.has_parent(p.into(), ParentKey::Feature(f)));
    }

    #[test]
    fn second_attach_fails_fast() {
        let mut arena = GeometryArena::new();
        let p = arena.add_point(1.0, 2.0, 0);
        arena.attach_feature(p.into(), Tags::default()).unwrap();

        assert!(matches!(
            arena.attach_feature(p.into(), Tags::default()),
            Err(Error::FeatureAlreadyAttached(_))
        ));
        assert_eq!(arena.feature_count(), 1);
    }

    #[test]
    fn attach_to_dead_entity_fails() {
        let mut arena = GeometryArena::new();
        let p = arena.add_point(0.0, 0.0, 0);
        let f = arena.attach_feature(p.into(), Tags::default()).unwrap();
        arena.detach_feature(f).unwrap();

        assert!(matches!(
            arena.attach_feature(p.into(), Tags::default()),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn require_feature_reports_missing() {
        let mut arena = GeometryArena::new();
        let p = arena.add_point(0.0, 0.0, 0);
        assert!(matches!(
            arena.require_feature(p.into()),
            Err(Error::FeatureMissing(_))
        ));
    }

    #[test]
    fn feature_keeps_geometry_alive() {
        let mut arena = GeometryArena::new();
        let p = arena.add_point(0.0, 0.0, 0);
        let way = arena.add_way();
        arena.way_push_node(way, p).unwrap();
        let _f = arena.attach_feature(p.into(), Tags::default()).unwrap();

        arena.ways.get_mut(way).unwrap().nodes.clear();
        arena
            .remove_parent(p.into(), ParentKey::Way(way), true)
            .unwrap();

        // Still referenced by its feature.
        assert!(arena.contains(p.into()));
    }

    #[test]
    fn detach_feature_destroys_orphaned_geometry() {
        let mut arena = GeometryArena::new();
        let p = arena.add_point(0.0, 0.0, 0);
        let f = arena.attach_feature(p.into(), Tags::default()).unwrap();

        arena.detach_feature(f).unwrap();

        assert!(!arena.contains(p.into()));
        assert_eq!(arena.feature_count(), 0);
    }

    #[test]
    fn tag_insertion_order_is_preserved() {
        let tags = tags_from([("name", "Main St"), ("highway", "residential"), ("oneway", "no")]);
        let keys: Vec<&str> = tags.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["name", "highway", "oneway"]);
    }
}
