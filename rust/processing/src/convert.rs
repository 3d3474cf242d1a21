// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The staged conversion session.
//!
//! A [`Conversion`] owns the arena and the translation hooks for one run.
//! Stages never interleave: every layer is ingested first, then points are
//! consolidated, then the pre-output hook runs, then the document is
//! emitted. There is no partial or resumable state; a failed stage aborts
//! the whole run.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

use tracing::{debug, info, warn};

use vec2osm_topology::{DocumentSnapshot, GeometryArena};

use crate::builder::build_geometry;
use crate::error::{Error, Result};
use crate::hooks::TranslationHooks;
use crate::source::{SourceLayer, SourceRecord};

/// Run-level settings for a conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Generator string written to the document root element.
    pub generator: String,
    /// Replace an existing output file instead of refusing to run.
    pub force_overwrite: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            generator: concat!("vec2osm ", env!("CARGO_PKG_VERSION")).to_string(),
            force_overwrite: false,
        }
    }
}

/// Refuses to clobber an existing output destination.
///
/// Called before any record is processed so a conflict surfaces immediately,
/// not after minutes of conversion work.
pub fn check_output_path(path: &Path, force_overwrite: bool) -> Result<()> {
    if path.exists() && !force_overwrite {
        return Err(Error::OutputExists(path.to_path_buf()));
    }
    Ok(())
}

/// One conversion run: the arena, the hooks, the options.
#[derive(Debug)]
pub struct Conversion {
    arena: GeometryArena,
    hooks: TranslationHooks,
    options: ConvertOptions,
}

impl Conversion {
    /// A session with identity hooks.
    pub fn new(options: ConvertOptions) -> Self {
        Self::with_hooks(options, TranslationHooks::identity())
    }

    /// A session with a custom translation.
    pub fn with_hooks(options: ConvertOptions, hooks: TranslationHooks) -> Self {
        Self {
            arena: GeometryArena::new(),
            hooks,
            options,
        }
    }

    /// Read access to the graph under construction.
    pub fn arena(&self) -> &GeometryArena {
        &self.arena
    }

    /// Write access to the graph under construction.
    pub fn arena_mut(&mut self) -> &mut GeometryArena {
        &mut self.arena
    }

    /// Ingests every record of a layer, running the layer filter first.
    pub fn ingest_layer(&mut self, layer: SourceLayer) -> Result<()> {
        let Some(layer) = self.hooks.apply_layer(layer) else {
            debug!("layer filtered out");
            return Ok(());
        };
        info!(layer = %layer.name, records = layer.records.len(), "parsing layer");
        for record in layer.records {
            self.ingest_record(record)?;
        }
        Ok(())
    }

    /// Ingests one record: record filter, graph construction, tag filter,
    /// feature attachment, post-construction hook.
    pub fn ingest_record(&mut self, record: SourceRecord) -> Result<()> {
        let Some(record) = self.hooks.apply_record(record) else {
            return Ok(());
        };
        let Some(geometry) = &record.geometry else {
            warn!("record has no geometry, skipping");
            return Ok(());
        };
        let Some(entity) = build_geometry(&mut self.arena, geometry)? else {
            return Ok(());
        };

        let tags = self.hooks.apply_tags(record.fields.clone());
        let feature = self.arena.attach_feature(entity, tags)?;
        self.hooks.apply_post_feature(&mut self.arena, feature, &record);
        Ok(())
    }

    /// Runs the post-construction stages and flattens the graph:
    /// consolidation, the pre-output transform, then the snapshot.
    pub fn finish(mut self) -> Result<DocumentSnapshot> {
        let merged = self.arena.merge_duplicate_points()?;
        debug!(merged, "merged duplicate points");

        self.hooks.apply_pre_output(&mut self.arena);

        let snapshot = self.arena.to_snapshot(&self.options.generator);
        info!(
            nodes = snapshot.nodes.len(),
            ways = snapshot.ways.len(),
            relations = snapshot.relations.len(),
            "document ready"
        );
        Ok(snapshot)
    }

    /// Finishes the run and writes the OSM XML document to `sink`.
    pub fn write_xml_to<W: io::Write>(self, sink: W) -> Result<()> {
        let snapshot = self.finish()?;
        snapshot.write_xml(sink)?;
        Ok(())
    }

    /// Finishes the run and writes the OSM XML document to `path`,
    /// honoring the overwrite setting.
    pub fn write_to_path(self, path: &Path) -> Result<()> {
        check_output_path(path, self.options.force_overwrite)?;
        let file = File::create(path)?;
        self.write_xml_to(BufWriter::new(file))
    }
}

/// Converts a batch of layers into a document snapshot.
pub fn convert(
    options: ConvertOptions,
    hooks: TranslationHooks,
    layers: Vec<SourceLayer>,
) -> Result<DocumentSnapshot> {
    let mut conversion = Conversion::with_hooks(options, hooks);
    for layer in layers {
        conversion.ingest_layer(layer)?;
    }
    conversion.finish()
}

/// Converts a batch of layers straight to an OSM XML file.
///
/// The output conflict check runs before the first record is touched.
pub fn convert_to_path(
    options: ConvertOptions,
    hooks: TranslationHooks,
    layers: Vec<SourceLayer>,
    path: &Path,
) -> Result<()> {
    check_output_path(path, options.force_overwrite)?;
    let mut conversion = Conversion::with_hooks(options, hooks);
    for layer in layers {
        conversion.ingest_layer(layer)?;
    }
    conversion.write_to_path(path)
}
