// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the conversion pipeline.

use std::path::PathBuf;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving a conversion.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The output destination exists and overwriting was not requested.
    /// Reported before any record is processed.
    #[error("output file '{}' already exists (enable force_overwrite to replace it)", .0.display())]
    OutputExists(PathBuf),

    /// A graph operation failed; these are contract violations, not data
    /// problems, and abort the run.
    #[error(transparent)]
    Topology(#[from] vec2osm_topology::Error),

    /// Reading or writing the output destination failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
