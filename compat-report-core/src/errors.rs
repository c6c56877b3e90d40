// Copyright (c) The compat-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by compat-report.

use crate::sink::ArtifactKind;
use camino::{Utf8Path, Utf8PathBuf};
use config::ConfigError;
use std::{
    io,
    num::{ParseFloatError, ParseIntError},
};
use thiserror::Error;

/// An error that occurs while parsing a line that starts with the summary marker.
///
/// Summary lines are expected to conform exactly, so this error is fatal for the whole run.
#[derive(Debug, Error)]
#[error("malformed summary record on line {line_number}")]
pub struct SummaryParseError {
    line_number: usize,
    line: String,
    #[source]
    reason: SummaryParseReason,
}

impl SummaryParseError {
    pub(crate) fn new(
        line_number: usize,
        line: impl Into<String>,
        reason: SummaryParseReason,
    ) -> Self {
        Self {
            line_number,
            line: line.into(),
            reason,
        }
    }

    /// Returns the 1-based line number of the offending line.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Returns the offending line, without its line terminator.
    pub fn line(&self) -> &str {
        &self.line
    }

    /// Returns the reason parsing failed.
    pub fn reason(&self) -> &SummaryParseReason {
        &self.reason
    }
}

/// The reason a summary line could not be parsed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SummaryParseReason {
    /// The line did not have the expected shape.
    #[error(
        "expected `Summary: version: <semver>, total tests: <int>, passed: <int>, rate: <decimal>%`"
    )]
    ShapeMismatch,

    /// The version was not a valid semantic version.
    #[error("invalid version `{input}`")]
    InvalidVersion {
        /// The input that failed to parse.
        input: String,

        /// The underlying error.
        #[source]
        error: semver::Error,
    },

    /// A count did not fit into an integer.
    #[error("invalid value for `{field}`: `{input}`")]
    InvalidCount {
        /// The field that failed to parse.
        field: &'static str,

        /// The input that failed to parse.
        input: String,

        /// The underlying error.
        #[source]
        error: ParseIntError,
    },

    /// The rate was not a valid decimal.
    #[error("invalid rate `{input}`")]
    InvalidRate {
        /// The input that failed to parse.
        input: String,

        /// The underlying error.
        #[source]
        error: ParseFloatError,
    },

    /// More tests passed than were run.
    #[error("passed count {passed} exceeds total tests {total}")]
    PassedExceedsTotal {
        /// The total number of tests.
        total: u64,

        /// The number of tests that passed.
        passed: u64,
    },
}

/// Returned when aggregation sees a combined total of zero, so no pass rate can be computed.
#[derive(Clone, Debug, Error)]
#[error("no tests were observed across {record_count} summary records")]
pub struct NoTestsObserved {
    record_count: usize,
}

impl NoTestsObserved {
    pub(crate) fn new(record_count: usize) -> Self {
        Self { record_count }
    }

    /// Returns the number of summary records that were aggregated.
    pub fn record_count(&self) -> usize {
        self.record_count
    }
}

/// An error that occurs while folding summary records into totals.
#[derive(Clone, Debug, Error)]
pub enum AggregateError {
    /// The combined total was zero.
    #[error(transparent)]
    NoTestsObserved(#[from] NoTestsObserved),

    /// A running sum no longer fits into a 64-bit count.
    #[error("sum of `{field}` overflows at summary record {record_number}")]
    Overflow {
        /// The count being summed.
        field: &'static str,

        /// The 1-based position of the summary record that overflowed the sum.
        record_number: usize,
    },
}

/// An error that occurs while parsing the test manifest.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ManifestParseError {
    /// The manifest was not a JSON array of objects.
    #[error("error deserializing manifest")]
    Deserialize(#[source] serde_json::Error),

    /// An entry had no string `name` field, so it cannot be keyed.
    #[error("manifest entry at index {index} has no string `name` field")]
    MissingName {
        /// The 0-based index of the entry in the manifest.
        index: usize,
    },
}

/// Returned when a result line references a test that the manifest does not define.
#[derive(Clone, Debug, Error)]
#[error("test `{name}` on line {line_number} is not defined in the manifest")]
pub struct UnknownTestError {
    name: String,
    line_number: usize,
}

impl UnknownTestError {
    pub(crate) fn new(name: impl Into<String>, line_number: usize) -> Self {
        Self {
            name: name.into(),
            line_number,
        }
    }

    /// Returns the name of the test that was not found.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the 1-based line number of the result line.
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

/// An error that occurs while rendering an artifact.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RenderError {
    /// A test definition could not be serialized for display.
    #[error("error serializing definition for test `{name}`")]
    Definition {
        /// The name of the test.
        name: String,

        /// The underlying error.
        #[source]
        error: serde_json::Error,
    },

    /// The badge could not be serialized.
    #[error("error serializing badge")]
    Badge(#[source] serde_json::Error),

    /// The report document could not be written.
    #[error("error writing report document")]
    Document(#[source] quick_xml::Error),
}

/// An error that occurs while synthesizing report artifacts.
#[derive(Debug, Error)]
pub enum SynthesizeError {
    /// A result line referenced a test absent from the manifest.
    #[error(transparent)]
    UnknownTest(#[from] UnknownTestError),

    /// An artifact could not be rendered.
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// An error that occurs while handing an artifact to a sink.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WriteArtifactError {
    /// An error occurred while operating on the file system.
    #[error("error writing {kind} to {file}")]
    Fs {
        /// The artifact being written.
        kind: ArtifactKind,

        /// The file being operated on.
        file: Utf8PathBuf,

        /// The underlying IO error.
        #[source]
        error: io::Error,
    },
}

/// An error that occurs while reading the configuration.
#[derive(Debug, Error)]
#[error("failed to parse compat-report config at `{config_file}`")]
pub struct ConfigParseError {
    config_file: Utf8PathBuf,
    #[source]
    kind: ConfigParseErrorKind,
}

impl ConfigParseError {
    pub(crate) fn new(config_file: impl Into<Utf8PathBuf>, kind: ConfigParseErrorKind) -> Self {
        Self {
            config_file: config_file.into(),
            kind,
        }
    }

    /// Returns the config file for this error.
    pub fn config_file(&self) -> &Utf8Path {
        &self.config_file
    }

    /// Returns the kind of error that occurred.
    pub fn kind(&self) -> &ConfigParseErrorKind {
        &self.kind
    }
}

/// The kind of error that occurred while reading the configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigParseErrorKind {
    /// The layered configuration could not be built.
    #[error(transparent)]
    BuildError(Box<ConfigError>),

    /// The configuration could not be deserialized.
    #[error(transparent)]
    DeserializeError(Box<ConfigError>),
}
