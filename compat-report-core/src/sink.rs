// Copyright (c) The compat-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Destinations for rendered artifacts.

use crate::{config::ReportConfig, errors::WriteArtifactError};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use camino::Utf8Path;
use std::{collections::BTreeMap, fmt, io::Write};
use tracing::info;

/// The kinds of artifact produced by a report run.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ArtifactKind {
    /// The status badge JSON.
    Badge,
    /// The HTML report document.
    Document,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Badge => write!(f, "badge"),
            ArtifactKind::Document => write!(f, "report document"),
        }
    }
}

/// A destination that accepts rendered artifacts.
pub trait ArtifactSink {
    /// Writes a single artifact in full.
    fn write_artifact(
        &mut self,
        kind: ArtifactKind,
        contents: &[u8],
    ) -> Result<(), WriteArtifactError>;
}

impl<S: ArtifactSink + ?Sized> ArtifactSink for &mut S {
    fn write_artifact(
        &mut self,
        kind: ArtifactKind,
        contents: &[u8],
    ) -> Result<(), WriteArtifactError> {
        (**self).write_artifact(kind, contents)
    }
}

/// Writes artifacts to the paths named by a [`ReportConfig`].
///
/// Each file is replaced atomically, and missing parent directories are created.
#[derive(Clone, Debug)]
pub struct FsSink<'cfg> {
    config: &'cfg ReportConfig,
}

impl<'cfg> FsSink<'cfg> {
    /// Creates a new sink for the given config.
    pub fn new(config: &'cfg ReportConfig) -> Self {
        Self { config }
    }

    /// Returns the path the given artifact is written to.
    pub fn path(&self, kind: ArtifactKind) -> &'cfg Utf8Path {
        match kind {
            ArtifactKind::Badge => self.config.badge_path(),
            ArtifactKind::Document => self.config.report_path(),
        }
    }
}

impl ArtifactSink for FsSink<'_> {
    fn write_artifact(
        &mut self,
        kind: ArtifactKind,
        contents: &[u8],
    ) -> Result<(), WriteArtifactError> {
        let path = self.path(kind);
        let fs_error = |error| WriteArtifactError::Fs {
            kind,
            file: path.to_owned(),
            error,
        };

        if let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(fs_error)?;
        }

        AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
            .write(|file| file.write_all(contents))
            .map_err(|error| match error {
                atomicwrites::Error::Internal(error) | atomicwrites::Error::User(error) => {
                    fs_error(error)
                }
            })?;

        info!("wrote {kind} to {path}");
        Ok(())
    }
}

/// Keeps artifacts in memory.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    artifacts: BTreeMap<ArtifactKind, Vec<u8>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the contents of an artifact, if it was written.
    pub fn get(&self, kind: ArtifactKind) -> Option<&[u8]> {
        self.artifacts.get(&kind).map(Vec::as_slice)
    }

    /// Returns true if nothing was written.
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

impl ArtifactSink for MemorySink {
    fn write_artifact(
        &mut self,
        kind: ArtifactKind,
        contents: &[u8],
    ) -> Result<(), WriteArtifactError> {
        self.artifacts.insert(kind, contents.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_sink_creates_parents_and_overwrites() {
        let dir = camino_tempfile::tempdir().expect("created temp dir");
        let mut config = ReportConfig::default_config();
        config
            .set_badge_path(dir.path().join("public/badge.json"))
            .set_report_path(dir.path().join("public/nested/report.html"));

        let mut sink = FsSink::new(&config);
        sink.write_artifact(ArtifactKind::Badge, b"first")
            .expect("wrote badge");
        sink.write_artifact(ArtifactKind::Badge, b"second")
            .expect("overwrote badge");
        sink.write_artifact(ArtifactKind::Document, b"<html></html>")
            .expect("wrote document");

        assert_eq!(
            std::fs::read(config.badge_path()).expect("badge exists"),
            b"second"
        );
        assert_eq!(
            std::fs::read(config.report_path()).expect("document exists"),
            b"<html></html>"
        );
    }

    #[test]
    fn fs_sink_reports_path_on_error() {
        let dir = camino_tempfile::tempdir().expect("created temp dir");
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").expect("wrote blocker");

        let mut config = ReportConfig::default_config();
        config.set_badge_path(blocker.join("badge.json"));

        let error = FsSink::new(&config)
            .write_artifact(ArtifactKind::Badge, b"{}")
            .expect_err("parent is a file");
        match error {
            WriteArtifactError::Fs { kind, file, .. } => {
                assert_eq!(kind, ArtifactKind::Badge);
                assert_eq!(file, blocker.join("badge.json"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn memory_sink_records_by_kind() {
        let mut sink = MemorySink::new();
        assert!(sink.is_empty());
        sink.write_artifact(ArtifactKind::Document, b"doc")
            .expect("memory writes never fail");
        assert_eq!(sink.get(ArtifactKind::Document), Some(&b"doc"[..]));
        assert_eq!(sink.get(ArtifactKind::Badge), None);
    }
}
