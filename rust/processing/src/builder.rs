// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Graph construction from source geometries.
//!
//! Each source geometry becomes points, ways and relations in the arena.
//! Malformed shapes (no rings, no vertices) and kinds the graph cannot
//! represent are skipped with a warning; the batch continues. Shapes are
//! validated before any entity is created so a skipped record leaves
//! nothing behind in the arena.

use tracing::warn;

use vec2osm_topology::{EntityKey, GeometryArena, MemberRole, WayKey};

use crate::error::Result;
use crate::source::{SourceCoord, SourceGeometry};

/// Builds the arena entities for one source geometry.
///
/// Returns `None` when the geometry was skipped (with a warning); the
/// caller then drops the whole record.
pub fn build_geometry(
    arena: &mut GeometryArena,
    geometry: &SourceGeometry,
) -> Result<Option<EntityKey>> {
    match geometry {
        SourceGeometry::Point(c) => {
            let point = arena.add_point(c.x, c.y, c.level);
            Ok(Some(point.into()))
        }

        SourceGeometry::Line(coords) => {
            if coords.is_empty() {
                warn!("line with no vertices, skipping");
                return Ok(None);
            }
            let way = build_line(arena, coords)?;
            Ok(Some(way.into()))
        }

        SourceGeometry::Polygon(rings) => build_polygon(arena, rings),

        SourceGeometry::MultiLine(parts) => build_multiline(arena, parts),

        SourceGeometry::MultiPolygon(polygons) => build_multipolygon(arena, polygons),

        SourceGeometry::Unsupported { kind } => {
            warn!(kind = kind.as_str(), "unhandled geometry type, skipping");
            Ok(None)
        }
    }
}

/// One way holding a freshly created point per vertex.
///
/// Every vertex gets its own point entity even where coordinates repeat
/// (closed rings, shared endpoints); consolidation collapses them later.
fn build_line(arena: &mut GeometryArena, coords: &[SourceCoord]) -> Result<WayKey> {
    let way = arena.add_way();
    for c in coords {
        let point = arena.add_point(c.x, c.y, c.level);
        arena.way_push_node(way, point)?;
    }
    Ok(way)
}

/// Single-ring polygons collapse to a plain way; anything more becomes a
/// relation with `outer`/`inner` members.
fn build_polygon(
    arena: &mut GeometryArena,
    rings: &[Vec<SourceCoord>],
) -> Result<Option<EntityKey>> {
    let rings: Vec<&Vec<SourceCoord>> = rings.iter().filter(|r| !r.is_empty()).collect();
    match rings.as_slice() {
        [] => {
            warn!("polygon with no rings, skipping");
            Ok(None)
        }
        [ring] => {
            let way = build_line(arena, ring)?;
            Ok(Some(way.into()))
        }
        [exterior, interiors @ ..] => {
            let relation = arena.add_relation();
            let outer = build_line(arena, exterior)?;
            arena.relation_push_member(relation, outer, MemberRole::Outer)?;
            for ring in interiors {
                let inner = build_line(arena, ring)?;
                arena.relation_push_member(relation, inner, MemberRole::Inner)?;
            }
            Ok(Some(relation.into()))
        }
    }
}

/// All parts of a multi-part line concatenate into one way. Consecutive
/// parts repeat the joint vertex, so every part after the first drops its
/// first coordinate.
fn build_multiline(
    arena: &mut GeometryArena,
    parts: &[Vec<SourceCoord>],
) -> Result<Option<EntityKey>> {
    let parts: Vec<&Vec<SourceCoord>> = parts.iter().filter(|p| !p.is_empty()).collect();
    if parts.is_empty() {
        warn!("multi-line with no vertices, skipping");
        return Ok(None);
    }

    let way = arena.add_way();
    for (index, part) in parts.iter().enumerate() {
        let skip = usize::from(index != 0);
        for c in part.iter().skip(skip) {
            let point = arena.add_point(c.x, c.y, c.level);
            arena.way_push_node(way, point)?;
        }
    }
    Ok(Some(way.into()))
}

/// Every polygon of a multi-polygon contributes its rings to one relation.
fn build_multipolygon(
    arena: &mut GeometryArena,
    polygons: &[Vec<Vec<SourceCoord>>],
) -> Result<Option<EntityKey>> {
    let polygons: Vec<Vec<&Vec<SourceCoord>>> = polygons
        .iter()
        .map(|rings| rings.iter().filter(|r| !r.is_empty()).collect::<Vec<_>>())
        .filter(|rings: &Vec<&Vec<SourceCoord>>| !rings.is_empty())
        .collect();
    if polygons.is_empty() {
        warn!("multi-polygon with no rings, skipping");
        return Ok(None);
    }

    let relation = arena.add_relation();
    for rings in &polygons {
        let outer = build_line(arena, rings[0])?;
        arena.relation_push_member(relation, outer, MemberRole::Outer)?;
        for ring in &rings[1..] {
            let inner = build_line(arena, ring)?;
            arena.relation_push_member(relation, inner, MemberRole::Inner)?;
        }
    }
    Ok(Some(relation.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(points: &[(f64, f64)]) -> Vec<SourceCoord> {
        points.iter().map(|&(x, y)| SourceCoord::new(x, y)).collect()
    }

    #[test]
    fn point_geometry_creates_one_point() {
        let mut arena = GeometryArena::new();
        let built = build_geometry(
            &mut arena,
            &SourceGeometry::Point(SourceCoord::with_level(3.0, 4.0, 1)),
        )
        .unwrap()
        .unwrap();

        let EntityKey::Point(p) = built else {
            panic!("expected a point");
        };
        let data = arena.point(p).unwrap();
        assert_eq!((data.x, data.y, data.level), (3.0, 4.0, 1));
    }

    #[test]
    fn line_creates_way_with_own_points() {
        let mut arena = GeometryArena::new();
        let built = build_geometry(
            &mut arena,
            &SourceGeometry::Line(coords(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)])),
        )
        .unwrap()
        .unwrap();

        let EntityKey::Way(w) = built else {
            panic!("expected a way");
        };
        assert_eq!(arena.way(w).unwrap().nodes.len(), 3);
        assert_eq!(arena.point_count(), 3);
    }

    #[test]
    fn empty_line_is_skipped() {
        let mut arena = GeometryArena::new();
        let built = build_geometry(&mut arena, &SourceGeometry::Line(Vec::new())).unwrap();
        assert!(built.is_none());
        assert_eq!(arena.way_count(), 0);
    }

    #[test]
    fn single_ring_polygon_collapses_to_a_way() {
        let mut arena = GeometryArena::new();
        // Closed 5-vertex ring, first = last.
        let ring = coords(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0), (0.0, 0.0)]);
        let built = build_geometry(&mut arena, &SourceGeometry::Polygon(vec![ring]))
            .unwrap()
            .unwrap();

        assert!(matches!(built, EntityKey::Way(_)));
        assert_eq!(arena.way_count(), 1);
        assert_eq!(arena.relation_count(), 0);
    }

    #[test]
    fn two_ring_polygon_becomes_outer_inner_relation() {
        let mut arena = GeometryArena::new();
        let exterior = coords(&[(0.0, 0.0), (9.0, 0.0), (9.0, 9.0), (0.0, 9.0), (0.0, 0.0)]);
        let interior = coords(&[(3.0, 3.0), (6.0, 3.0), (6.0, 6.0), (3.0, 3.0)]);
        let built = build_geometry(
            &mut arena,
            &SourceGeometry::Polygon(vec![exterior, interior]),
        )
        .unwrap()
        .unwrap();

        let EntityKey::Relation(rel) = built else {
            panic!("expected a relation");
        };
        let members = &arena.relation(rel).unwrap().members;
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].1, MemberRole::Outer);
        assert_eq!(members[1].1, MemberRole::Inner);
        assert_ne!(members[0].0, members[1].0);
        assert_eq!(arena.way_count(), 2);
    }

    #[test]
    fn ringless_polygon_is_skipped() {
        let mut arena = GeometryArena::new();
        let built = build_geometry(&mut arena, &SourceGeometry::Polygon(Vec::new())).unwrap();
        assert!(built.is_none());
        assert_eq!(arena.point_count(), 0);
        assert_eq!(arena.relation_count(), 0);
    }

    #[test]
    fn multiline_concatenates_and_drops_joint_vertices() {
        let mut arena = GeometryArena::new();
        let built = build_geometry(
            &mut arena,
            &SourceGeometry::MultiLine(vec![
                coords(&[(0.0, 0.0), (1.0, 0.0)]),
                coords(&[(1.0, 0.0), (2.0, 0.0)]),
            ]),
        )
        .unwrap()
        .unwrap();

        let EntityKey::Way(w) = built else {
            panic!("expected a way");
        };
        // The repeated joint (1,0) appears once.
        assert_eq!(arena.way(w).unwrap().nodes.len(), 3);
        assert_eq!(arena.point_count(), 3);
    }

    #[test]
    fn multipolygon_relation_spans_all_polygons() {
        let mut arena = GeometryArena::new();
        let square =
            |ox: f64| coords(&[(ox, 0.0), (ox + 1.0, 0.0), (ox + 1.0, 1.0), (ox, 0.0)]);
        let hole = coords(&[(0.2, 0.2), (0.4, 0.2), (0.4, 0.4), (0.2, 0.2)]);
        let built = build_geometry(
            &mut arena,
            &SourceGeometry::MultiPolygon(vec![vec![square(0.0), hole], vec![square(5.0)]]),
        )
        .unwrap()
        .unwrap();

        let EntityKey::Relation(rel) = built else {
            panic!("expected a relation");
        };
        let roles: Vec<MemberRole> = arena
            .relation(rel)
            .unwrap()
            .members
            .iter()
            .map(|&(_, role)| role)
            .collect();
        assert_eq!(
            roles,
            vec![MemberRole::Outer, MemberRole::Inner, MemberRole::Outer]
        );
    }

    #[test]
    fn unsupported_kind_is_skipped_cleanly() {
        let mut arena = GeometryArena::new();
        let built = build_geometry(
            &mut arena,
            &SourceGeometry::Unsupported {
                kind: "circularstring".into(),
            },
        )
        .unwrap();

        assert!(built.is_none());
        assert_eq!(arena.point_count(), 0);
        assert_eq!(arena.way_count(), 0);
        assert_eq!(arena.relation_count(), 0);
    }
}
