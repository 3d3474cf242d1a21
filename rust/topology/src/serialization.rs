// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Deterministic document emission.
//!
//! The arena is flattened into a [`DocumentSnapshot`]: all nodes first, then
//! ways, then relations, each in creation order, with every entity's
//! reference list ahead of its own tags. Because ids are assigned before any
//! reference is created and merge survivors predate the merge, every
//! reference names an id emitted earlier in the stream: the document is
//! forward-reference-free without a dependency sort.
//!
//! Snapshots write out as OSM XML (the interchange format) or JSON (debug
//! and portability).

use std::io;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use serde::Serialize;

use crate::arena::GeometryArena;
use crate::error::{Error, Result};
use crate::features::Tags;

/// Tag key marking a way as one-directional.
pub const TAG_ONEWAY: &str = "oneway";

/// Tag key marking a one-directional way as digitized against its travel
/// direction. Set upstream by the attribute translation; both this and
/// [`TAG_ONEWAY`] must be `"yes"` for the emitter to flip the way.
pub const TAG_REVERSE_DIRECTION: &str = "rDirection";

/// A node record: identity, coordinate, tags.
#[derive(Debug, Clone, Serialize)]
pub struct NodeElement {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
    #[serde(skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
}

/// A way record: identity, ordered node references, tags.
#[derive(Debug, Clone, Serialize)]
pub struct WayElement {
    pub id: i64,
    pub nodes: Vec<i64>,
    #[serde(skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
}

/// One member slot of a relation.
#[derive(Debug, Clone, Serialize)]
pub struct MemberElement {
    #[serde(rename = "ref")]
    pub ref_id: i64,
    pub role: String,
}

/// A relation record: identity, ordered (member, role) pairs, tags.
#[derive(Debug, Clone, Serialize)]
pub struct RelationElement {
    pub id: i64,
    pub members: Vec<MemberElement>,
    #[serde(skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
}

/// Serializable flattening of the whole graph, in emission order.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSnapshot {
    pub generator: String,
    pub nodes: Vec<NodeElement>,
    pub ways: Vec<WayElement>,
    pub relations: Vec<RelationElement>,
}

impl GeometryArena {
    /// Flattens the live entity set into a snapshot.
    ///
    /// Takes `&mut self` because the one-way direction fix-up mutates
    /// qualifying ways in place (exactly once; repeated snapshots see the
    /// already-normalized sequence and leave it alone).
    pub fn to_snapshot(&mut self, generator: &str) -> DocumentSnapshot {
        self.apply_direction_fixup();

        let nodes = self
            .points_ordered()
            .into_iter()
            .map(|key| {
                let p = &self.points[key];
                NodeElement {
                    id: p.id,
                    lat: p.y,
                    lon: p.x,
                    tags: self.tags_of(key.into()).cloned().unwrap_or_default(),
                }
            })
            .collect();

        let ways = self
            .ways_ordered()
            .into_iter()
            .map(|key| {
                let w = &self.ways[key];
                WayElement {
                    id: w.id,
                    nodes: w.nodes.iter().map(|&pk| self.points[pk].id).collect(),
                    tags: self.tags_of(key.into()).cloned().unwrap_or_default(),
                }
            })
            .collect();

        let relations = self
            .relations_ordered()
            .into_iter()
            .map(|key| {
                let r = &self.relations[key];
                RelationElement {
                    id: r.id,
                    members: r
                        .members
                        .iter()
                        .map(|&(wk, role)| MemberElement {
                            ref_id: self.ways[wk].id,
                            role: role.as_str().to_string(),
                        })
                        .collect(),
                    tags: self.tags_of(key.into()).cloned().unwrap_or_default(),
                }
            })
            .collect();

        DocumentSnapshot {
            generator: generator.to_string(),
            nodes,
            ways,
            relations,
        }
    }

    /// Reverses the node sequence of every one-way flagged as digitized
    /// against travel direction. Runs once per way: the `reversed` marker
    /// survives across snapshots, so emission never double-reverses.
    ///
    /// This is a final denormalization of the sequence order only; it does
    /// not create or destroy entities and must not re-trigger consolidation.
    fn apply_direction_fixup(&mut self) {
        for key in self.ways_ordered() {
            if self.ways[key].reversed {
                continue;
            }
            let qualifies = self.tags_of(key.into()).is_some_and(|tags| {
                tags.get(TAG_ONEWAY).map(String::as_str) == Some("yes")
                    && tags.get(TAG_REVERSE_DIRECTION).map(String::as_str) == Some("yes")
            });
            if qualifies {
                let w = &mut self.ways[key];
                w.nodes.reverse();
                w.reversed = true;
            }
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl DocumentSnapshot {
    /// Serializes the snapshot to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Writes the snapshot as an OSM XML document.
    ///
    /// Element order is load-bearing for downstream consumers: nodes, then
    /// ways, then relations, and within each element the reference list
    /// before the tag list.
    pub fn write_xml<W: io::Write>(&self, sink: W) -> Result<()> {
        let mut w = Writer::new_with_indent(sink, b' ', 2);
        w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut osm = BytesStart::new("osm");
        osm.push_attribute(("version", "0.6"));
        osm.push_attribute(("generator", self.generator.as_str()));
        w.write_event(Event::Start(osm))?;

        for node in &self.nodes {
            let mut el = BytesStart::new("node");
            el.push_attribute(("visible", "true"));
            el.push_attribute(("id", node.id.to_string().as_str()));
            el.push_attribute(("lat", format!("{:?}", node.lat).as_str()));
            el.push_attribute(("lon", format!("{:?}", node.lon).as_str()));
            if node.tags.is_empty() {
                w.write_event(Event::Empty(el))?;
            } else {
                w.write_event(Event::Start(el))?;
                write_tags(&mut w, &node.tags)?;
                w.write_event(Event::End(BytesEnd::new("node")))?;
            }
        }

        for way in &self.ways {
            let mut el = BytesStart::new("way");
            el.push_attribute(("visible", "true"));
            el.push_attribute(("id", way.id.to_string().as_str()));
            w.write_event(Event::Start(el))?;
            for node_id in &way.nodes {
                let mut nd = BytesStart::new("nd");
                nd.push_attribute(("ref", node_id.to_string().as_str()));
                w.write_event(Event::Empty(nd))?;
            }
            write_tags(&mut w, &way.tags)?;
            w.write_event(Event::End(BytesEnd::new("way")))?;
        }

        for relation in &self.relations {
            let mut el = BytesStart::new("relation");
            el.push_attribute(("visible", "true"));
            el.push_attribute(("id", relation.id.to_string().as_str()));
            w.write_event(Event::Start(el))?;
            for member in &relation.members {
                let mut m = BytesStart::new("member");
                m.push_attribute(("type", "way"));
                m.push_attribute(("ref", member.ref_id.to_string().as_str()));
                m.push_attribute(("role", member.role.as_str()));
                w.write_event(Event::Empty(m))?;
            }
            write_tags(&mut w, &relation.tags)?;
            w.write_event(Event::End(BytesEnd::new("relation")))?;
        }

        w.write_event(Event::End(BytesEnd::new("osm")))?;
        Ok(())
    }

    /// Writes the snapshot as an OSM XML document into a string.
    pub fn to_xml_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_xml(&mut buf)?;
        String::from_utf8(buf).map_err(|e| Error::Serialization(e.to_string()))
    }
}

fn write_tags<W: io::Write>(w: &mut Writer<W>, tags: &Tags) -> Result<()> {
    for (k, v) in tags {
        let mut el = BytesStart::new("tag");
        el.push_attribute(("k", k.as_str()));
        el.push_attribute(("v", v.as_str()));
        w.write_event(Event::Empty(el))?;
    }
    Ok(())
}
