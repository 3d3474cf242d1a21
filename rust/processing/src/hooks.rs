// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! User-supplied attribute translation hooks.
//!
//! A translation customizes the conversion at five fixed injection points.
//! Each hook is an optional slot in [`TranslationHooks`]; an unset slot falls
//! back to the named identity/no-op default below. The pipeline never probes
//! for hook presence; absence is an ordinary `None`.

use vec2osm_topology::{FeatureKey, GeometryArena, Tags};

use crate::source::{SourceLayer, SourceRecord};

/// May veto or rewrite a whole layer before its records are read.
pub type LayerFilter = dyn Fn(SourceLayer) -> Option<SourceLayer>;

/// May veto or rewrite a single record before the graph builder sees it.
pub type RecordFilter = dyn Fn(SourceRecord) -> Option<SourceRecord>;

/// Maps the raw field mapping of a record to the final tag set.
pub type TagFilter = dyn Fn(Tags) -> Tags;

/// May mutate the freshly constructed feature (via the arena) with the
/// original record in hand.
pub type FeaturePostHook = dyn Fn(&mut GeometryArena, FeatureKey, &SourceRecord);

/// May mutate the whole graph after construction and consolidation, right
/// before the document is emitted.
pub type PreOutputTransform = dyn Fn(&mut GeometryArena);

/// The five optional hook slots of a translation.
#[derive(Default)]
pub struct TranslationHooks {
    pub filter_layer: Option<Box<LayerFilter>>,
    pub filter_record: Option<Box<RecordFilter>>,
    pub filter_tags: Option<Box<TagFilter>>,
    pub post_feature: Option<Box<FeaturePostHook>>,
    pub pre_output: Option<Box<PreOutputTransform>>,
}

impl TranslationHooks {
    /// Hooks that leave everything untouched.
    pub fn identity() -> Self {
        Self::default()
    }

    pub(crate) fn apply_layer(&self, layer: SourceLayer) -> Option<SourceLayer> {
        match &self.filter_layer {
            Some(hook) => hook(layer),
            None => default_filter_layer(layer),
        }
    }

    pub(crate) fn apply_record(&self, record: SourceRecord) -> Option<SourceRecord> {
        match &self.filter_record {
            Some(hook) => hook(record),
            None => default_filter_record(record),
        }
    }

    pub(crate) fn apply_tags(&self, fields: Tags) -> Tags {
        match &self.filter_tags {
            Some(hook) => hook(fields),
            None => default_filter_tags(fields),
        }
    }

    pub(crate) fn apply_post_feature(
        &self,
        arena: &mut GeometryArena,
        feature: FeatureKey,
        record: &SourceRecord,
    ) {
        match &self.post_feature {
            Some(hook) => hook(arena, feature, record),
            None => default_post_feature(arena, feature, record),
        }
    }

    pub(crate) fn apply_pre_output(&self, arena: &mut GeometryArena) {
        match &self.pre_output {
            Some(hook) => hook(arena),
            None => default_pre_output(arena),
        }
    }
}

impl std::fmt::Debug for TranslationHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationHooks")
            .field("filter_layer", &self.filter_layer.is_some())
            .field("filter_record", &self.filter_record.is_some())
            .field("filter_tags", &self.filter_tags.is_some())
            .field("post_feature", &self.post_feature.is_some())
            .field("pre_output", &self.pre_output.is_some())
            .finish()
    }
}

/// Default layer filter: every layer passes unchanged.
pub fn default_filter_layer(layer: SourceLayer) -> Option<SourceLayer> {
    Some(layer)
}

/// Default record filter: every record passes unchanged.
pub fn default_filter_record(record: SourceRecord) -> Option<SourceRecord> {
    Some(record)
}

/// Default tag filter: the raw fields become the tags as-is.
pub fn default_filter_tags(fields: Tags) -> Tags {
    fields
}

/// Default post-construction hook: leaves the feature alone.
pub fn default_post_feature(_: &mut GeometryArena, _: FeatureKey, _: &SourceRecord) {}

/// Default pre-output transform: leaves the graph alone.
pub fn default_pre_output(_: &mut GeometryArena) {}
