// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The upstream reader boundary.
//!
//! A source reader (format driver, reprojection, elevation pre-pass) hands
//! the pipeline plain data: layers of records, each record an optional
//! geometry plus its raw field mapping. Coordinates arrive already
//! reprojected into the output document's reference system; this crate does
//! no I/O and no coordinate math.

use serde::{Deserialize, Serialize};

use vec2osm_topology::Tags;

/// One vertex as delivered by the reader.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceCoord {
    pub x: f64,
    pub y: f64,
    /// Vertical level marker from the upstream elevation pre-pass; 0 for
    /// ground-level vertices. Vertices only merge within the same level.
    #[serde(default)]
    pub level: i32,
}

impl SourceCoord {
    /// A ground-level vertex.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, level: 0 }
    }

    /// A vertex with an explicit level marker.
    pub fn with_level(x: f64, y: f64, level: i32) -> Self {
        Self { x, y, level }
    }
}

/// A labeled geometry as delivered by the reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SourceGeometry {
    /// A single coordinate.
    Point(SourceCoord),
    /// An open or closed coordinate sequence.
    Line(Vec<SourceCoord>),
    /// One exterior ring followed by zero or more interior rings.
    Polygon(Vec<Vec<SourceCoord>>),
    /// Several line parts belonging to one logical feature; consecutive
    /// parts repeat the joint vertex.
    MultiLine(Vec<Vec<SourceCoord>>),
    /// Several polygons belonging to one logical feature.
    MultiPolygon(Vec<Vec<Vec<SourceCoord>>>),
    /// Anything the graph builder cannot represent; carried through so the
    /// skip can name what it skipped.
    Unsupported { kind: String },
}

impl SourceGeometry {
    /// Returns a short name for the geometry kind, for diagnostics.
    pub fn kind(&self) -> &str {
        match self {
            SourceGeometry::Point(_) => "point",
            SourceGeometry::Line(_) => "line",
            SourceGeometry::Polygon(_) => "polygon",
            SourceGeometry::MultiLine(_) => "multiline",
            SourceGeometry::MultiPolygon(_) => "multipolygon",
            SourceGeometry::Unsupported { kind } => kind,
        }
    }
}

/// One source record: an optional geometry and its raw field mapping.
///
/// `fields` is the field-name → value mapping read from the source; the tag
/// filter hook turns it into the final tag set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRecord {
    pub geometry: Option<SourceGeometry>,
    #[serde(default)]
    pub fields: Tags,
}

impl SourceRecord {
    /// A record with a geometry and no fields.
    pub fn new(geometry: SourceGeometry) -> Self {
        Self {
            geometry: Some(geometry),
            fields: Tags::default(),
        }
    }

    /// A record with a geometry and fields.
    pub fn with_fields(geometry: SourceGeometry, fields: Tags) -> Self {
        Self {
            geometry: Some(geometry),
            fields,
        }
    }

    /// Returns the record's field names in their source order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }
}

/// A named group of records, as read from one source layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceLayer {
    pub name: String,
    pub records: Vec<SourceRecord>,
}

impl SourceLayer {
    /// An empty layer with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Vec::new(),
        }
    }
}
