// Copyright (c) The compat-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The test-suite manifest: an ordered list of test case definitions keyed by name.
//!
//! Apart from the `name` field, definitions are opaque. They are carried through to the report
//! document verbatim, in the manifest's own key order.

use crate::errors::ManifestParseError;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

/// A raw manifest entry.
pub type ManifestEntry = Map<String, Value>;

/// Entries whose `tags` field equals this value are dropped by [`filter_manifest`].
pub static CLUSTER_TAG: &str = "cluster";

/// The field removed from every entry by [`filter_manifest`].
pub static SKIPPED_FIELD: &str = "skipped";

static TAGS_FIELD: &str = "tags";
static NAME_FIELD: &str = "name";

/// Parses a JSON array of objects into raw manifest entries.
pub fn parse_entries(input: &str) -> Result<Vec<ManifestEntry>, ManifestParseError> {
    serde_json::from_str(input).map_err(ManifestParseError::Deserialize)
}

/// Drops cluster-only entries and strips the reserved `skipped` field from the rest.
///
/// Entries without a `tags` field are kept. Applying this more than once is the same as applying
/// it once.
pub fn filter_manifest(entries: impl IntoIterator<Item = ManifestEntry>) -> Vec<ManifestEntry> {
    entries
        .into_iter()
        .filter(|entry| !is_cluster_entry(entry))
        .map(|mut entry| {
            // shift_remove keeps the remaining keys in manifest order.
            entry.shift_remove(SKIPPED_FIELD);
            entry
        })
        .collect()
}

fn is_cluster_entry(entry: &ManifestEntry) -> bool {
    entry
        .get(TAGS_FIELD)
        .and_then(Value::as_str)
        .is_some_and(|tags| tags == CLUSTER_TAG)
}

/// A single test case definition from the manifest.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TestCaseDefinition {
    #[serde(skip)]
    name: String,
    fields: ManifestEntry,
}

impl TestCaseDefinition {
    /// Creates a definition from a raw entry. `index` is used for diagnostics.
    pub fn from_entry(index: usize, fields: ManifestEntry) -> Result<Self, ManifestParseError> {
        let name = fields
            .get(NAME_FIELD)
            .and_then(Value::as_str)
            .ok_or(ManifestParseError::MissingName { index })?
            .to_owned();
        Ok(Self { name, fields })
    }

    /// Creates definitions from raw entries, preserving order.
    pub fn from_entries(
        entries: impl IntoIterator<Item = ManifestEntry>,
    ) -> Result<Vec<Self>, ManifestParseError> {
        entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| Self::from_entry(index, entry))
            .collect()
    }

    /// Returns the name of the test.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns every field of the definition, including `name`.
    pub fn fields(&self) -> &ManifestEntry {
        &self.fields
    }
}

/// A name to definition mapping built from the manifest.
#[derive(Clone, Debug, Default)]
pub struct ManifestIndex {
    definitions: IndexMap<String, TestCaseDefinition>,
}

impl ManifestIndex {
    /// Builds an index over `definitions`.
    ///
    /// Names are expected to be unique. If they are not, the last definition for a name wins.
    pub fn new(definitions: impl IntoIterator<Item = TestCaseDefinition>) -> Self {
        let mut index = IndexMap::new();
        for definition in definitions {
            index.insert(definition.name.clone(), definition);
        }
        debug!("indexed {} test definitions", index.len());
        Self { definitions: index }
    }

    /// Looks up a definition by test name.
    pub fn get(&self, name: &str) -> Option<&TestCaseDefinition> {
        self.definitions.get(name)
    }

    /// Returns the number of distinct test names.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns true if the index has no definitions.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
