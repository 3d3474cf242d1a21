// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Construction and mutation of graph entities.
//!
//! References between entities are only ever created through the push
//! operations here, which update the parent index in the same step. Removal
//! is symmetric: dropping the last parent edge of an entity removes the
//! entity itself from the live set. Substitution adds the new parent edge
//! before dropping the old one, so an entity that stays logically alive is
//! never transiently parentless.

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::arena::*;
use crate::error::{Error, Result};
use crate::keys::*;

impl GeometryArena {
    // --- Entity creation ---

    /// Creates a point at the given coordinates.
    ///
    /// `level` is the vertical level marker from the upstream elevation
    /// pass; pass 0 for ordinary nodes.
    pub fn add_point(&mut self, x: f64, y: f64, level: i32) -> PointKey {
        let id = self.ids.next_id();
        let key = self.points.insert(PointData { id, x, y, level });
        self.parents.insert(EntityKey::Point(key), FxHashSet::default());
        key
    }

    /// Creates an empty way.
    pub fn add_way(&mut self) -> WayKey {
        let id = self.ids.next_id();
        let key = self.ways.insert(WayData {
            id,
            nodes: Vec::new(),
            reversed: false,
        });
        self.parents.insert(EntityKey::Way(key), FxHashSet::default());
        key
    }

    /// Creates an empty relation.
    pub fn add_relation(&mut self) -> RelationKey {
        let id = self.ids.next_id();
        let key = self.relations.insert(RelationData {
            id,
            members: SmallVec::new(),
        });
        self.parents
            .insert(EntityKey::Relation(key), FxHashSet::default());
        key
    }

    // --- Reference creation ---

    /// Appends a point to a way's node sequence.
    ///
    /// The same point may be appended more than once; closed rings hold
    /// their first point at both ends.
    pub fn way_push_node(&mut self, way: WayKey, point: PointKey) -> Result<()> {
        if !self.points.contains_key(point) {
            return Err(Error::PointNotFound(point));
        }
        let data = self.ways.get_mut(way).ok_or(Error::WayNotFound(way))?;
        data.nodes.push(point);
        self.add_parent(EntityKey::Point(point), ParentKey::Way(way))
    }

    /// Appends a (way, role) member to a relation.
    pub fn relation_push_member(
        &mut self,
        relation: RelationKey,
        way: WayKey,
        role: MemberRole,
    ) -> Result<()> {
        if !self.ways.contains_key(way) {
            return Err(Error::WayNotFound(way));
        }
        let data = self
            .relations
            .get_mut(relation)
            .ok_or(Error::RelationNotFound(relation))?;
        data.members.push((way, role));
        self.add_parent(EntityKey::Way(way), ParentKey::Relation(relation))
    }

    // --- Parent index maintenance ---

    /// Records that `parent` references `entity`.
    ///
    /// Idempotent: adding the same parent edge twice has no extra effect
    /// (a way referencing the same point in several slots holds one edge).
    pub fn add_parent(&mut self, entity: EntityKey, parent: ParentKey) -> Result<()> {
        if !self.contains_parent(parent) {
            return Err(parent_not_found(parent));
        }
        let set = self.parents.get_mut(&entity).ok_or(Error::NotFound(entity))?;
        set.insert(parent);
        Ok(())
    }

    /// Drops the parent edge from `parent` to `entity`.
    ///
    /// When the entity's parent set empties and `should_destroy` is true,
    /// the entity is removed from the live set. Its outgoing references, if
    /// any existed, are assumed already cleared by the caller; this routine
    /// does not cascade.
    pub fn remove_parent(
        &mut self,
        entity: EntityKey,
        parent: ParentKey,
        should_destroy: bool,
    ) -> Result<()> {
        let set = self.parents.get_mut(&entity).ok_or(Error::NotFound(entity))?;
        set.remove(&parent);
        if set.is_empty() && should_destroy {
            self.destroy_entity(entity);
        }
        Ok(())
    }

    // --- Substitution ---

    /// Substitutes every reference `parent` holds to `old` with `new`, then
    /// flips the parent edge from `old` to `new`.
    ///
    /// The new parent edge is added before the old one is removed, so `new`
    /// is never transiently parentless. If `old` loses its last parent it is
    /// destroyed. Substituting an entity for itself is a no-op.
    pub fn replace_child(
        &mut self,
        parent: ParentKey,
        old: EntityKey,
        new: EntityKey,
    ) -> Result<()> {
        match (parent, old, new) {
            (ParentKey::Way(w), EntityKey::Point(o), EntityKey::Point(n)) => {
                self.way_replace_node(w, o, n)
            }
            (ParentKey::Relation(r), EntityKey::Way(o), EntityKey::Way(n)) => {
                self.relation_replace_member(r, o, n)
            }
            (ParentKey::Feature(f), o, n) => self.feature_replace_geometry(f, o, n),
            _ => Err(Error::MemberTypeMismatch { parent, old, new }),
        }
    }

    /// Substitutes every occurrence of `old` in a way's node sequence with
    /// `new`, preserving multiplicity (a ring closed on `old` ends up closed
    /// on `new`).
    pub fn way_replace_node(&mut self, way: WayKey, old: PointKey, new: PointKey) -> Result<()> {
        if old == new {
            return Ok(());
        }
        if !self.points.contains_key(new) {
            return Err(Error::PointNotFound(new));
        }
        let data = self.ways.get_mut(way).ok_or(Error::WayNotFound(way))?;
        let mut hits = 0;
        for slot in data.nodes.iter_mut() {
            if *slot == old {
                *slot = new;
                hits += 1;
            }
        }
        if hits == 0 {
            return Err(Error::NotReferenced(
                ParentKey::Way(way),
                EntityKey::Point(old),
            ));
        }
        self.add_parent(EntityKey::Point(new), ParentKey::Way(way))?;
        self.remove_parent(EntityKey::Point(old), ParentKey::Way(way), true)
    }

    /// Substitutes every member slot of a relation holding `old` with `new`,
    /// preserving each slot's role.
    pub fn relation_replace_member(
        &mut self,
        relation: RelationKey,
        old: WayKey,
        new: WayKey,
    ) -> Result<()> {
        if old == new {
            return Ok(());
        }
        if !self.ways.contains_key(new) {
            return Err(Error::WayNotFound(new));
        }
        let data = self
            .relations
            .get_mut(relation)
            .ok_or(Error::RelationNotFound(relation))?;
        let mut hits = 0;
        for (member, _) in data.members.iter_mut() {
            if *member == old {
                *member = new;
                hits += 1;
            }
        }
        if hits == 0 {
            return Err(Error::NotReferenced(
                ParentKey::Relation(relation),
                EntityKey::Way(old),
            ));
        }
        self.add_parent(EntityKey::Way(new), ParentKey::Relation(relation))?;
        self.remove_parent(EntityKey::Way(old), ParentKey::Relation(relation), true)
    }

    /// Redirects a feature's geometry reference from `old` to `new`.
    ///
    /// The feature-table slot for `new` is only claimed if it is vacant;
    /// when consolidation funnels two tagged geometries onto one survivor,
    /// the survivor's existing feature keeps the slot.
    pub fn feature_replace_geometry(
        &mut self,
        feature: FeatureKey,
        old: EntityKey,
        new: EntityKey,
    ) -> Result<()> {
        if old == new {
            return Ok(());
        }
        if !self.contains(new) {
            return Err(Error::NotFound(new));
        }
        let data = self
            .features
            .get_mut(feature)
            .ok_or(Error::FeatureNotFound(feature))?;
        if data.geometry != old {
            return Err(Error::NotReferenced(ParentKey::Feature(feature), old));
        }
        data.geometry = new;

        if self.feature_of.get(&old) == Some(&feature) {
            self.feature_of.remove(&old);
        }
        self.feature_of.entry(new).or_insert(feature);

        self.add_parent(new, ParentKey::Feature(feature))?;
        self.remove_parent(old, ParentKey::Feature(feature), true)
    }
}

fn parent_not_found(parent: ParentKey) -> Error {
    match parent {
        ParentKey::Way(k) => Error::WayNotFound(k),
        ParentKey::Relation(k) => Error::RelationNotFound(k),
        ParentKey::Feature(k) => Error::FeatureNotFound(k),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- Creation ---

    #[test]
    fn add_way_starts_empty() {
        let mut arena = GeometryArena::new();
        let way = arena.add_way();
        assert!(arena.way(way).unwrap().nodes.is_empty());
    }

    #[test]
    fn way_push_node_records_parent() {
        let mut arena = GeometryArena::new();
        let p = arena.add_point(1.0, 2.0, 0);
        let way = arena.add_way();
        arena.way_push_node(way, p).unwrap();

        assert_eq!(arena.way(way).unwrap().nodes, vec![p]);
        assert!(arena.has_parent(p.into(), ParentKey::Way(way)));
        assert_eq!(arena.parent_count(p.into()), 1);
    }

    #[test]
    fn way_push_node_duplicate_keeps_one_parent_edge() {
        let mut arena = GeometryArena::new();
        let p = arena.add_point(1.0, 2.0, 0);
        let way = arena.add_way();
        arena.way_push_node(way, p).unwrap();
        arena.way_push_node(way, p).unwrap();

        // Two reference slots, one parent edge (set semantics).
        assert_eq!(arena.way(way).unwrap().nodes.len(), 2);
        assert_eq!(arena.parent_count(p.into()), 1);
    }

    #[test]
    fn way_push_node_rejects_dead_point() {
        let mut arena = GeometryArena::new();
        let way = arena.add_way();
        let p = arena.add_point(0.0, 0.0, 0);
        arena.way_push_node(way, p).unwrap();
        // Destroying the point by removing its only parent leaves the way's
        // slot dangling on purpose; pushing it again must fail.
        let stale = p;
        arena.ways.get_mut(way).unwrap().nodes.clear();
        arena
            .remove_parent(p.into(), ParentKey::Way(way), true)
            .unwrap();

        assert!(matches!(
            arena.way_push_node(way, stale),
            Err(Error::PointNotFound(_))
        ));
    }

    #[test]
    fn relation_push_member_records_parent() {
        let mut arena = GeometryArena::new();
        let way = arena.add_way();
        let rel = arena.add_relation();
        arena
            .relation_push_member(rel, way, MemberRole::Outer)
            .unwrap();

        let members = &arena.relation(rel).unwrap().members;
        assert_eq!(members.as_slice(), &[(way, MemberRole::Outer)]);
        assert!(arena.has_parent(way.into(), ParentKey::Relation(rel)));
    }

    // --- Parent index ---

    #[test]
    fn add_parent_is_idempotent() {
        let mut arena = GeometryArena::new();
        let p = arena.add_point(0.0, 0.0, 0);
        let way = arena.add_way();
        arena.add_parent(p.into(), ParentKey::Way(way)).unwrap();
        arena.add_parent(p.into(), ParentKey::Way(way)).unwrap();
        assert_eq!(arena.parent_count(p.into()), 1);
    }

    #[test]
    fn remove_last_parent_destroys_entity() {
        let mut arena = GeometryArena::new();
        let p = arena.add_point(0.0, 0.0, 0);
        let way = arena.add_way();
        arena.way_push_node(way, p).unwrap();
        arena.ways.get_mut(way).unwrap().nodes.clear();

        arena
            .remove_parent(p.into(), ParentKey::Way(way), true)
            .unwrap();

        assert!(!arena.contains(p.into()));
        assert_eq!(arena.point_count(), 0);
    }

    #[test]
    fn remove_parent_without_destroy_keeps_entity() {
        let mut arena = GeometryArena::new();
        let p = arena.add_point(0.0, 0.0, 0);
        let way = arena.add_way();
        arena.way_push_node(way, p).unwrap();

        arena
            .remove_parent(p.into(), ParentKey::Way(way), false)
            .unwrap();

        assert!(arena.contains(p.into()));
        assert_eq!(arena.parent_count(p.into()), 0);
    }

    #[test]
    fn remove_parent_keeps_entity_while_other_parents_remain() {
        let mut arena = GeometryArena::new();
        let p = arena.add_point(0.0, 0.0, 0);
        let w1 = arena.add_way();
        let w2 = arena.add_way();
        arena.way_push_node(w1, p).unwrap();
        arena.way_push_node(w2, p).unwrap();

        arena.ways.get_mut(w1).unwrap().nodes.clear();
        arena
            .remove_parent(p.into(), ParentKey::Way(w1), true)
            .unwrap();

        assert!(arena.contains(p.into()));
        assert_eq!(arena.parents_of(p.into()), vec![ParentKey::Way(w2)]);
    }

    // --- Substitution ---

    #[test]
    fn way_replace_node_rewrites_and_flips_parents() {
        let mut arena = GeometryArena::new();
        let a = arena.add_point(0.0, 0.0, 0);
        let b = arena.add_point(0.0, 0.0, 0);
        let keep = arena.add_point(1.0, 1.0, 0);
        let way = arena.add_way();
        arena.way_push_node(way, a).unwrap();
        arena.way_push_node(way, keep).unwrap();

        arena.way_replace_node(way, a, b).unwrap();

        assert_eq!(arena.way(way).unwrap().nodes, vec![b, keep]);
        assert!(arena.has_parent(b.into(), ParentKey::Way(way)));
        // `a` lost its only parent and was destroyed.
        assert!(!arena.contains(a.into()));
    }

    #[test]
    fn way_replace_node_preserves_multiplicity() {
        let mut arena = GeometryArena::new();
        let a = arena.add_point(0.0, 0.0, 0);
        let b = arena.add_point(0.0, 0.0, 0);
        let mid = arena.add_point(5.0, 5.0, 0);
        let ring = arena.add_way();
        // Closed ring: a … mid … a
        arena.way_push_node(ring, a).unwrap();
        arena.way_push_node(ring, mid).unwrap();
        arena.way_push_node(ring, a).unwrap();

        arena.way_replace_node(ring, a, b).unwrap();

        assert_eq!(arena.way(ring).unwrap().nodes, vec![b, mid, b]);
    }

    #[test]
    fn way_replace_node_self_is_noop() {
        let mut arena = GeometryArena::new();
        let a = arena.add_point(0.0, 0.0, 0);
        let way = arena.add_way();
        arena.way_push_node(way, a).unwrap();

        arena.way_replace_node(way, a, a).unwrap();

        assert!(arena.contains(a.into()));
        assert!(arena.has_parent(a.into(), ParentKey::Way(way)));
    }

    #[test]
    fn way_replace_node_requires_existing_reference() {
        let mut arena = GeometryArena::new();
        let a = arena.add_point(0.0, 0.0, 0);
        let b = arena.add_point(1.0, 0.0, 0);
        let way = arena.add_way();

        assert!(matches!(
            arena.way_replace_node(way, a, b),
            Err(Error::NotReferenced(_, _))
        ));
    }

    #[test]
    fn relation_replace_member_preserves_role() {
        let mut arena = GeometryArena::new();
        let w1 = arena.add_way();
        let w2 = arena.add_way();
        let rel = arena.add_relation();
        arena
            .relation_push_member(rel, w1, MemberRole::Inner)
            .unwrap();

        arena.relation_replace_member(rel, w1, w2).unwrap();

        let members = &arena.relation(rel).unwrap().members;
        assert_eq!(members.as_slice(), &[(w2, MemberRole::Inner)]);
        assert!(!arena.contains(w1.into()));
    }

    #[test]
    fn replace_child_rejects_type_mismatch() {
        let mut arena = GeometryArena::new();
        let p = arena.add_point(0.0, 0.0, 0);
        let w = arena.add_way();
        let rel = arena.add_relation();
        arena.relation_push_member(rel, w, MemberRole::Outer).unwrap();

        assert!(matches!(
            arena.replace_child(ParentKey::Relation(rel), w.into(), p.into()),
            Err(Error::MemberTypeMismatch { .. })
        ));
    }

    #[test]
    fn parent_child_symmetry_after_mutations() {
        let mut arena = GeometryArena::new();
        let a = arena.add_point(0.0, 0.0, 0);
        let b = arena.add_point(1.0, 0.0, 0);
        let c = arena.add_point(1.0, 0.0, 0);
        let way = arena.add_way();
        arena.way_push_node(way, a).unwrap();
        arena.way_push_node(way, b).unwrap();
        arena.way_replace_node(way, b, c).unwrap();

        // Downward: every node slot names a live point whose parent set
        // contains the way.
        for &node in &arena.way(way).unwrap().nodes {
            assert!(arena.contains(node.into()));
            assert!(arena.has_parent(node.into(), ParentKey::Way(way)));
        }
        // Upward: every parent of `a` and `c` actually references them.
        for key in [a, c] {
            for parent in arena.parents_of(key.into()) {
                let ParentKey::Way(w) = parent else {
                    panic!("unexpected parent kind");
                };
                assert!(arena.way(w).unwrap().nodes.contains(&key));
            }
        }
    }
}
