// Copyright (c) The compat-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::{NO_HEADING_TARGET, StderrStyles};
use camino::Utf8PathBuf;
use compat_report_core::{errors::*, exit_codes::CompatExitCode};
use owo_colors::OwoColorize;
use std::{error::Error, fmt};
use thiserror::Error;
use tracing::error;

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

// Note that the #[error()] strings are mostly placeholder messages -- the expected way to print out
// errors is with the display_to_stderr method, which colorizes errors.

/// An error caused by the input or environment, as opposed to a bug in compat-report.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("config parse error")]
    ConfigParseError {
        #[from]
        err: ConfigParseError,
    },
    #[error("error reading standard input")]
    InputReadError {
        #[source]
        err: std::io::Error,
    },
    #[error("summary parse error")]
    SummaryParseError {
        #[from]
        err: SummaryParseError,
    },
    #[error("aggregate error")]
    AggregateError {
        #[from]
        err: AggregateError,
    },
    #[error("error reading manifest at {path}")]
    ManifestReadError {
        path: Utf8PathBuf,
        #[source]
        err: std::io::Error,
    },
    #[error("manifest parse error")]
    ManifestParseError {
        path: Option<Utf8PathBuf>,
        #[source]
        err: ManifestParseError,
    },
    #[error("unknown test")]
    UnknownTest {
        #[from]
        err: UnknownTestError,
    },
    #[error("render error")]
    RenderError {
        #[from]
        err: RenderError,
    },
    #[error("error writing artifact")]
    WriteArtifactError {
        #[from]
        err: WriteArtifactError,
    },
    #[error("error writing output")]
    WriteOutputError {
        path: Option<Utf8PathBuf>,
        #[source]
        err: std::io::Error,
    },
    #[error("error serializing filtered manifest")]
    FilterSerializeError {
        #[source]
        err: serde_json::Error,
    },
}

impl ExpectedError {
    pub(crate) fn manifest_read_error(path: impl Into<Utf8PathBuf>, err: std::io::Error) -> Self {
        Self::ManifestReadError {
            path: path.into(),
            err,
        }
    }

    pub(crate) fn manifest_parse_error(path: Option<Utf8PathBuf>, err: ManifestParseError) -> Self {
        Self::ManifestParseError { path, err }
    }

    pub(crate) fn write_output_error(path: Option<Utf8PathBuf>, err: std::io::Error) -> Self {
        Self::WriteOutputError { path, err }
    }

    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::ConfigParseError { .. }
            | Self::InputReadError { .. }
            | Self::ManifestReadError { .. } => CompatExitCode::SETUP_ERROR,
            Self::SummaryParseError { .. } => CompatExitCode::INVALID_SUMMARY,
            Self::AggregateError { err } => match err {
                AggregateError::NoTestsObserved(_) => CompatExitCode::NO_TESTS_RUN,
                AggregateError::Overflow { .. } => CompatExitCode::INVALID_SUMMARY,
            },
            Self::ManifestParseError { .. } => CompatExitCode::INVALID_MANIFEST,
            Self::UnknownTest { .. } => CompatExitCode::UNKNOWN_TEST,
            Self::RenderError { .. }
            | Self::WriteArtifactError { .. }
            | Self::WriteOutputError { .. }
            | Self::FilterSerializeError { .. } => CompatExitCode::WRITE_OUTPUT_ERROR,
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match &self {
            Self::ConfigParseError { err } => {
                error!(
                    "failed to parse compat-report config at `{}`",
                    err.config_file().style(styles.bold)
                );
                Some(err.kind() as &dyn Error)
            }
            Self::InputReadError { err } => {
                error!("failed to read standard input");
                Some(err as &dyn Error)
            }
            Self::SummaryParseError { err } => {
                error!(
                    "malformed summary record on line {}:\n  {}",
                    err.line_number().style(styles.bold),
                    err.line().style(styles.warning_text),
                );
                Some(err.reason() as &dyn Error)
            }
            Self::AggregateError { err } => {
                match err {
                    AggregateError::NoTestsObserved(err) => {
                        error!(
                            "no tests were run: summary records report a total of 0 tests \
                             (records seen: {})",
                            err.record_count().style(styles.bold)
                        );
                    }
                    AggregateError::Overflow {
                        field,
                        record_number,
                    } => {
                        error!(
                            "summary record {} pushes the sum of `{}` past the maximum count",
                            record_number.style(styles.bold),
                            field,
                        );
                    }
                }
                None
            }
            Self::ManifestReadError { path, err } => {
                error!("failed to read manifest at `{}`", path.style(styles.bold));
                Some(err as &dyn Error)
            }
            Self::ManifestParseError { path, err } => {
                error!("failed to parse manifest from {}", Source(path, styles));
                Some(err as &dyn Error)
            }
            Self::UnknownTest { err } => {
                error!(
                    "test `{}` on line {} is not defined in the manifest",
                    err.name().style(styles.bold),
                    err.line_number(),
                );
                None
            }
            Self::RenderError { err } => {
                error!("failed to render report");
                Some(err as &dyn Error)
            }
            Self::WriteArtifactError { err } => {
                error!("failed to write report artifacts");
                Some(err as &dyn Error)
            }
            Self::WriteOutputError { path, err } => {
                error!("failed to write output to {}", Source(path, styles));
                Some(err as &dyn Error)
            }
            Self::FilterSerializeError { err } => {
                error!("failed to serialize filtered manifest");
                Some(err as &dyn Error)
            }
        };

        while let Some(err) = next_error {
            error!(target: NO_HEADING_TARGET, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}

impl From<SynthesizeError> for ExpectedError {
    fn from(err: SynthesizeError) -> Self {
        match err {
            SynthesizeError::UnknownTest(err) => Self::UnknownTest { err },
            SynthesizeError::Render(err) => Self::RenderError { err },
        }
    }
}

/// Names a file, or the standard stream used in its place.
struct Source<'a>(&'a Option<Utf8PathBuf>, &'a StderrStyles);

impl fmt::Display for Source<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(path) => write!(f, "`{}`", path.style(self.1.bold)),
            None => write!(f, "standard stream"),
        }
    }
}
