// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for graph operations.
//!
//! Every variant except [`Error::Serialization`] is a precondition violation:
//! a caller handed the arena a reference that does not match the live entity
//! set. These are contract bugs in the calling code and abort the run rather
//! than being skipped over.

use crate::keys::{EntityKey, FeatureKey, ParentKey, PointKey, RelationKey, WayKey};

/// Result type alias for graph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during graph operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A referenced entity was not found in the arena.
    #[error("entity not found: {0:?}")]
    NotFound(EntityKey),

    /// Point key not found in the arena.
    #[error("point not found: {0:?}")]
    PointNotFound(PointKey),

    /// Way key not found in the arena.
    #[error("way not found: {0:?}")]
    WayNotFound(WayKey),

    /// Relation key not found in the arena.
    #[error("relation not found: {0:?}")]
    RelationNotFound(RelationKey),

    /// Feature key not found in the arena.
    #[error("feature not found: {0:?}")]
    FeatureNotFound(FeatureKey),

    /// A second feature was attached to a geometry that already has one.
    #[error("entity {0:?} already has a feature attached")]
    FeatureAlreadyAttached(EntityKey),

    /// A feature was required for a geometry that has none.
    #[error("no feature attached to entity {0:?}")]
    FeatureMissing(EntityKey),

    /// A substitution was requested on a parent that holds no reference to
    /// the entity being replaced.
    #[error("{0:?} holds no reference to {1:?}")]
    NotReferenced(ParentKey, EntityKey),

    /// A substitution would put an entity of the wrong type into a reference
    /// slot (e.g. a way into a way's node list).
    #[error("cannot substitute {old:?} with {new:?} in {parent:?}: member type mismatch")]
    MemberTypeMismatch {
        parent: ParentKey,
        old: EntityKey,
        new: EntityKey,
    },

    /// Document serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}
