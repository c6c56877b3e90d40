// Copyright (c) The compat-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for where artifacts are written and which assets the report references.
//!
//! Configuration is layered: the embedded default config, then `.config/compat-report.toml`
//! (or an explicitly passed file), then any overrides set by the caller.

use crate::errors::{ConfigParseError, ConfigParseErrorKind};
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, ConfigBuilder, File, FileFormat, builder::DefaultState};
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::warn;

/// Resolved configuration for a report run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReportConfig {
    badge_path: Utf8PathBuf,
    report_path: Utf8PathBuf,
    stylesheet: String,
    script: String,
}

impl ReportConfig {
    /// The default location of the config file, relative to the working directory.
    pub const CONFIG_PATH: &'static str = ".config/compat-report.toml";

    /// Contains the default config as a TOML file.
    pub const DEFAULT_CONFIG: &'static str = include_str!("../default-config.toml");

    /// Reads the config.
    ///
    /// If `config_file` is `None`, `<root>/.config/compat-report.toml` is read if it exists.
    /// An explicitly passed file must exist. Unknown keys are logged and ignored.
    pub fn from_sources(
        root: &Utf8Path,
        config_file: Option<&Utf8Path>,
    ) -> Result<Self, ConfigParseError> {
        let (config_file, source) = match config_file {
            Some(file) => (file.to_owned(), File::new(file.as_str(), FileFormat::Toml)),
            None => {
                let config_file = root.join(Self::CONFIG_PATH);
                let source = File::new(config_file.as_str(), FileFormat::Toml).required(false);
                (config_file, source)
            }
        };

        let builder = Self::make_default_config().add_source(source);
        let (config, unknown) = Self::build_and_deserialize(builder)
            .map_err(|kind| ConfigParseError::new(&config_file, kind))?;

        for key in unknown {
            warn!("ignoring unknown key `{key}` in config file {config_file}");
        }

        Ok(config.into_config())
    }

    /// Returns the default config, without reading any files.
    pub fn default_config() -> Self {
        let (config, unknown) = Self::build_and_deserialize(Self::make_default_config())
            .expect("default config is always valid");

        // The default config is shipped with this binary, so it must not have unknown keys.
        assert!(
            unknown.is_empty(),
            "found unknown keys in default config: {unknown:?}"
        );

        config.into_config()
    }

    /// Returns the path the badge is written to.
    pub fn badge_path(&self) -> &Utf8Path {
        &self.badge_path
    }

    /// Returns the path the report document is written to.
    pub fn report_path(&self) -> &Utf8Path {
        &self.report_path
    }

    /// Returns the stylesheet referenced by the report document.
    pub fn stylesheet(&self) -> &str {
        &self.stylesheet
    }

    /// Returns the script referenced by the report document.
    pub fn script(&self) -> &str {
        &self.script
    }

    /// Overrides the badge path.
    pub fn set_badge_path(&mut self, badge_path: impl Into<Utf8PathBuf>) -> &mut Self {
        self.badge_path = badge_path.into();
        self
    }

    /// Overrides the report path.
    pub fn set_report_path(&mut self, report_path: impl Into<Utf8PathBuf>) -> &mut Self {
        self.report_path = report_path.into();
        self
    }

    // ---
    // Helper methods
    // ---

    fn make_default_config() -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(Self::DEFAULT_CONFIG, FileFormat::Toml))
    }

    fn build_and_deserialize(
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<(ReportConfigDeserialize, BTreeSet<String>), ConfigParseErrorKind> {
        let config = builder
            .build()
            .map_err(|error| ConfigParseErrorKind::BuildError(Box::new(error)))?;

        let mut unknown = BTreeSet::new();
        let deserialized: ReportConfigDeserialize =
            serde_ignored::deserialize(config, |path: serde_ignored::Path| {
                unknown.insert(path.to_string());
            })
            .map_err(|error| ConfigParseErrorKind::DeserializeError(Box::new(error)))?;

        Ok((deserialized, unknown))
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ReportConfigDeserialize {
    badge_path: Utf8PathBuf,
    report_path: Utf8PathBuf,
    stylesheet: String,
    script: String,
}

impl ReportConfigDeserialize {
    fn into_config(self) -> ReportConfig {
        ReportConfig {
            badge_path: self.badge_path,
            report_path: self.report_path,
            stylesheet: self.stylesheet,
            script: self.script,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino_tempfile::Utf8TempDir;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn write_config(dir: &Utf8TempDir, rel: &str, contents: &str) -> Utf8PathBuf {
        let path = dir.path().join(rel);
        std::fs::create_dir_all(path.parent().expect("path has a parent"))
            .expect("created config dir");
        std::fs::write(&path, contents).expect("wrote config");
        path
    }

    #[test]
    fn default_config() {
        let config = ReportConfig::default_config();
        assert_eq!(config.badge_path().as_str(), "badge.json");
        assert_eq!(config.report_path().as_str(), "report.html");
        assert_eq!(config.stylesheet(), "style.css");
        assert_eq!(config.script(), "script.js");
    }

    #[test]
    fn missing_default_file_uses_defaults() {
        let dir = camino_tempfile::tempdir().expect("created temp dir");
        let config = ReportConfig::from_sources(dir.path(), None).expect("no file is fine");
        assert_eq!(config, ReportConfig::default_config());
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = camino_tempfile::tempdir().expect("created temp dir");
        write_config(
            &dir,
            ReportConfig::CONFIG_PATH,
            indoc! {r#"
                badge-path = "public/badge.json"
                stylesheet = "assets/report.css"
                unknown-key = 1
            "#},
        );

        let config = ReportConfig::from_sources(dir.path(), None).expect("valid config");
        assert_eq!(config.badge_path().as_str(), "public/badge.json");
        assert_eq!(config.report_path().as_str(), "report.html");
        assert_eq!(config.stylesheet(), "assets/report.css");
        assert_eq!(config.script(), "script.js");
    }

    #[test]
    fn explicit_file_must_exist() {
        let dir = camino_tempfile::tempdir().expect("created temp dir");
        let missing = dir.path().join("missing.toml");
        let error = ReportConfig::from_sources(dir.path(), Some(missing.as_path()))
            .expect_err("file is required");
        assert_eq!(error.config_file(), missing.as_path());
        assert!(matches!(error.kind(), ConfigParseErrorKind::BuildError(_)));
    }

    #[test]
    fn wrong_type_is_an_error() {
        let dir = camino_tempfile::tempdir().expect("created temp dir");
        let path = write_config(&dir, "custom.toml", "report-path = [1, 2]\n");
        let error = ReportConfig::from_sources(dir.path(), Some(path.as_path()))
            .expect_err("wrong type");
        assert!(matches!(error.kind(), ConfigParseErrorKind::DeserializeError(_)));
    }

    #[test]
    fn overrides() {
        let mut config = ReportConfig::default_config();
        config
            .set_badge_path("out/badge.json")
            .set_report_path("out/index.html");
        assert_eq!(config.badge_path().as_str(), "out/badge.json");
        assert_eq!(config.report_path().as_str(), "out/index.html");
    }
}
