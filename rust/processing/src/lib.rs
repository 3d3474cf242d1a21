// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # vec2osm Processing
//!
//! Staged conversion pipeline from source vector records to OSM documents.
//!
//! The pipeline consumes layers of already-reprojected records from an
//! external reader, builds the topology graph through
//! [`vec2osm_topology::GeometryArena`], consolidates coincident nodes and
//! emits the document. A translation may customize the run at five fixed
//! hook points; every hook defaults to identity.
//!
//! ```
//! use vec2osm_processing::{convert, ConvertOptions, TranslationHooks};
//! use vec2osm_processing::source::{SourceCoord, SourceGeometry, SourceLayer, SourceRecord};
//!
//! let mut layer = SourceLayer::new("roads");
//! layer.records.push(SourceRecord::new(SourceGeometry::Line(vec![
//!     SourceCoord::new(0.0, 0.0),
//!     SourceCoord::new(1.0, 1.0),
//! ])));
//!
//! let snapshot = convert(
//!     ConvertOptions::default(),
//!     TranslationHooks::identity(),
//!     vec![layer],
//! )
//! .unwrap();
//! assert_eq!(snapshot.ways.len(), 1);
//! ```

pub mod builder;
pub mod convert;
pub mod error;
pub mod hooks;
pub mod source;

pub use convert::{check_output_path, convert, convert_to_path, Conversion, ConvertOptions};
pub use error::{Error, Result};
pub use hooks::TranslationHooks;
pub use source::{SourceCoord, SourceGeometry, SourceLayer, SourceRecord};
