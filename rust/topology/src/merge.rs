// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Consolidation of coincident points.
//!
//! Ways built from adjacent source records each carry their own copy of a
//! shared vertex. Collapsing those copies into one node is what makes the
//! output graph topologically connected. Merging is exact: only bit-identical
//! `(x, y, level)` triples collapse. Snapping near-coincident coordinates is
//! the upstream coordinate producer's job, not this pass's.

use rustc_hash::FxHashMap;

use crate::arena::GeometryArena;
use crate::error::Result;
use crate::keys::PointKey;

/// Exact-equality grouping key for a point's coordinates.
///
/// Bit patterns rather than float values, so NaN payloads and signed zeros
/// group exactly as stored and the key is hashable.
type CoordKey = (u64, u64, i32);

impl GeometryArena {
    /// Collapses every group of coincident points into its earliest-created
    /// member and rewrites all referencing ways, relations and features.
    ///
    /// For each duplicate, every parent substitutes its references over a
    /// snapshot of the duplicate's parent set; the duplicate loses its last
    /// parent edge during the rewrite and leaves the live set. Duplicates
    /// with no parents at all are pruned directly, so afterwards at most one
    /// point per coordinate triple remains.
    ///
    /// The survivor choice is deterministic (creation order), and no global
    /// re-scan is needed afterwards: the rewrite work is proportional to the
    /// reference slots actually touched.
    ///
    /// Returns the number of points removed.
    pub fn merge_duplicate_points(&mut self) -> Result<usize> {
        // Group in creation order so the first member of each group is the
        // earliest-created point.
        let mut groups: FxHashMap<CoordKey, Vec<PointKey>> = FxHashMap::default();
        for key in self.points_ordered() {
            let p = &self.points[key];
            groups
                .entry((p.x.to_bits(), p.y.to_bits(), p.level))
                .or_default()
                .push(key);
        }

        let mut removed = 0;
        for group in groups.into_values() {
            if group.len() < 2 {
                continue;
            }
            let survivor = group[0];
            for &dup in &group[1..] {
                let parent_snapshot = self.parents_of(dup.into());
                if parent_snapshot.is_empty() {
                    self.destroy_entity(dup.into());
                } else {
                    for parent in parent_snapshot {
                        self.replace_child(parent, dup.into(), survivor.into())?;
                    }
                }
                removed += 1;
            }
        }
        Ok(removed)
    }
}
