//! Side output of an expansion: which sources exist and who includes whom.

use crate::SourceId;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Mapping from each discovered source to its raw content and the sources it
/// directly includes.
///
/// The import relation is a DAG, not a tree: a file imported twice
/// contributes two occurrences to the flat output but a single entry here.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Structure {
    files: BTreeMap<SourceId, StructureEntry>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct StructureEntry {
    pub content: String,
    pub includes: BTreeSet<SourceId>,
}

impl Structure {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_file(&mut self, source: &SourceId, content: &str) {
        self.files
            .entry(source.clone())
            .or_insert_with(|| StructureEntry {
                content: content.to_owned(),
                includes: BTreeSet::new(),
            });
    }

    pub(crate) fn record_include(&mut self, from: &SourceId, to: &SourceId) {
        self.files
            .entry(from.clone())
            .or_default()
            .includes
            .insert(to.clone());
    }

    #[must_use]
    pub fn get(&self, source: &SourceId) -> Option<&StructureEntry> {
        self.files.get(source)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SourceId, &StructureEntry)> {
        self.files.iter()
    }

    pub fn sources(&self) -> impl Iterator<Item = &SourceId> {
        self.files.keys()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Raw contents keyed by source id (the `sources` field of the JSON
    /// envelope).
    #[must_use]
    pub fn contents(&self) -> BTreeMap<&str, &str> {
        self.files
            .iter()
            .map(|(source, entry)| (source.as_str(), entry.content.as_str()))
            .collect()
    }
}
