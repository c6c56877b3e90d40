// Copyright (c) The compat-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Joins test results against the manifest and renders the badge and report document.
//!
//! Both artifacts are rendered fully in memory by [`synthesize`] before anything is handed to a
//! sink, so a failed run never leaves a partial report behind. The badge is written last, so it
//! is only updated once the document it summarizes has been written.

mod badge;
mod document;

pub use badge::*;
pub use document::*;

use crate::{
    aggregate::AggregateTotals,
    config::ReportConfig,
    errors::{SynthesizeError, UnknownTestError, WriteArtifactError},
    extract::ResultLine,
    manifest::{ManifestIndex, TestCaseDefinition},
    sink::{ArtifactKind, ArtifactSink},
};
use tracing::debug;

/// A test result paired with its definition from the manifest.
#[derive(Copy, Clone, Debug)]
pub struct ReportRow<'a> {
    /// The result line.
    pub result: &'a ResultLine,

    /// The definition of the test named by the result line.
    pub definition: &'a TestCaseDefinition,
}

/// Pairs every result line with its definition, preserving input order.
///
/// Returns an error for the first result line whose test is not in the manifest.
pub fn join<'a>(
    results: &'a [ResultLine],
    index: &'a ManifestIndex,
) -> Result<Vec<ReportRow<'a>>, UnknownTestError> {
    results
        .iter()
        .map(|result| {
            index
                .get(&result.test_name)
                .map(|definition| ReportRow { result, definition })
                .ok_or_else(|| UnknownTestError::new(&result.test_name, result.line_number))
        })
        .collect()
}

/// Rendered artifacts, ready to be written.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReportArtifacts {
    /// The badge.
    pub badge: Badge,

    /// The serialized badge.
    pub badge_json: String,

    /// The serialized report document.
    pub document: String,
}

impl ReportArtifacts {
    /// Writes the document and then the badge to `sink`.
    ///
    /// If writing the document fails, the badge is not written.
    pub fn write_to(&self, mut sink: impl ArtifactSink) -> Result<(), WriteArtifactError> {
        sink.write_artifact(ArtifactKind::Document, self.document.as_bytes())?;
        sink.write_artifact(ArtifactKind::Badge, self.badge_json.as_bytes())?;
        Ok(())
    }
}

/// Joins `results` against `index` and renders both artifacts.
pub fn synthesize(
    totals: &AggregateTotals,
    results: &[ResultLine],
    index: &ManifestIndex,
    config: &ReportConfig,
) -> Result<ReportArtifacts, SynthesizeError> {
    let rows = join(results, index)?;
    debug!("joined {} test results against the manifest", rows.len());

    let badge = Badge::new(totals);
    let badge_json = badge.to_json()?;
    let document = render_document(totals, &rows, config)?;

    Ok(ReportArtifacts {
        badge,
        badge_json,
        document,
    })
}
