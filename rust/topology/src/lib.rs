// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # vec2osm Topology
//!
//! Shared-ownership topology graph for converting vector geometries into a
//! single OSM document.
//!
//! Entities (points, ways, relations, features) are stored in an arena with
//! slot-map keys and a parent index that mirrors every reference in the
//! graph. Coincident points collapse into shared nodes during consolidation,
//! and the emission pass writes a forward-reference-free document: nodes,
//! then ways, then relations, each referencing only ids defined earlier.
//!
//! Construction, consolidation and serialization are strictly staged; all
//! mutation goes through arena-owned operations so the reference and parent
//! directions of the index can never disagree.

pub mod arena;
pub mod construction;
pub mod error;
pub mod features;
pub mod ids;
pub mod keys;
pub mod merge;
pub mod serialization;

pub use arena::{FeatureData, GeometryArena, MemberRole, PointData, RelationData, WayData};
pub use error::{Error, Result};
pub use features::{tags_from, Tags};
pub use ids::IdAllocator;
pub use keys::{EntityKey, EntityType, FeatureKey, ParentKey, PointKey, RelationKey, WayKey};
pub use serialization::{
    DocumentSnapshot, MemberElement, NodeElement, RelationElement, WayElement, TAG_ONEWAY,
    TAG_REVERSE_DIRECTION,
};
