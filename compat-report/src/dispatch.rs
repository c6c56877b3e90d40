// Copyright (c) The compat-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    errors::{ExpectedError, Result},
    output::{OutputContext, OutputOpts, OutputWriter},
};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser, Subcommand};
use compat_report_core::{
    aggregate::AggregateTotals,
    config::ReportConfig,
    extract::ExtractedRecords,
    manifest::{self, ManifestIndex, TestCaseDefinition},
    report,
    sink::FsSink,
};
use std::io::{Read, Write};
use tracing::debug;

/// Turns compatibility test runner output into a status badge and an HTML report.
#[derive(Debug, Parser)]
#[command(
    version,
    styles = crate::output::clap_styles::style(),
    max_term_width = 100
)]
pub struct CompatReportApp {
    #[clap(flatten)]
    common: CommonOpts,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct CommonOpts {
    /// Config file [default: .config/compat-report.toml if present]
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<Utf8PathBuf>,

    #[clap(flatten)]
    output: OutputOpts,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write the status badge and the HTML report
    ///
    /// Runner output is read from standard input. Nothing is written unless every summary record
    /// is well-formed and every test result is defined in the manifest.
    Report(ReportOpts),

    /// Print aggregated totals for runner output read from standard input
    Summary,

    /// Drop cluster-only tests from a manifest and strip the `skipped` field
    FilterManifest(FilterManifestOpts),
}

#[derive(Debug, Args)]
struct ReportOpts {
    /// Path to the filtered test manifest
    #[arg(long, value_name = "PATH", default_value = "tests.json")]
    manifest: Utf8PathBuf,

    /// Write the badge to this path instead of the configured one
    #[arg(long, value_name = "PATH")]
    badge_path: Option<Utf8PathBuf>,

    /// Write the report document to this path instead of the configured one
    #[arg(long, value_name = "PATH")]
    report_path: Option<Utf8PathBuf>,
}

#[derive(Debug, Args)]
struct FilterManifestOpts {
    /// Read the manifest from this file [default: standard input]
    #[arg(long, value_name = "PATH")]
    input: Option<Utf8PathBuf>,

    /// Write the filtered manifest to this file [default: standard output]
    #[arg(long, value_name = "PATH")]
    output: Option<Utf8PathBuf>,
}

impl CompatReportApp {
    /// Initializes the output context.
    pub fn init_output(&self) -> OutputContext {
        self.common.output.init()
    }

    /// Executes the app, reading runner output or a manifest from `input`.
    pub fn exec(self, input: impl Read, output_writer: &mut OutputWriter) -> Result<i32> {
        match self.command {
            Command::Report(opts) => {
                let config = load_config(self.common.config.as_deref())?;
                opts.exec(config, input)?;
            }
            Command::Summary => exec_summary(input, output_writer)?,
            Command::FilterManifest(opts) => opts.exec(input, output_writer)?,
        }
        Ok(0)
    }
}

fn load_config(config_file: Option<&Utf8Path>) -> Result<ReportConfig> {
    Ok(ReportConfig::from_sources(Utf8Path::new(""), config_file)?)
}

fn read_to_string(mut input: impl Read) -> Result<String> {
    let mut buf = String::new();
    input
        .read_to_string(&mut buf)
        .map_err(|err| ExpectedError::InputReadError { err })?;
    Ok(buf)
}

fn extract_and_aggregate(input: impl Read) -> Result<(ExtractedRecords, AggregateTotals)> {
    let input = read_to_string(input)?;
    let records = ExtractedRecords::from_input(&input)?;
    let totals = AggregateTotals::from_summaries(&records.summaries)?;
    debug!(
        "aggregated {} summary records: {} of {} tests passed",
        records.summaries.len(),
        totals.passed(),
        totals.total(),
    );
    Ok((records, totals))
}

impl ReportOpts {
    fn exec(self, mut config: ReportConfig, input: impl Read) -> Result<()> {
        if let Some(badge_path) = self.badge_path {
            config.set_badge_path(badge_path);
        }
        if let Some(report_path) = self.report_path {
            config.set_report_path(report_path);
        }

        let (records, totals) = extract_and_aggregate(input)?;

        let json = std::fs::read_to_string(&self.manifest)
            .map_err(|err| ExpectedError::manifest_read_error(&self.manifest, err))?;
        let parse_error =
            |err| ExpectedError::manifest_parse_error(Some(self.manifest.clone()), err);
        let entries = manifest::parse_entries(&json).map_err(parse_error)?;
        let definitions = TestCaseDefinition::from_entries(entries).map_err(parse_error)?;
        let index = ManifestIndex::new(definitions);
        debug!("loaded {} test definitions from {}", index.len(), self.manifest);

        let artifacts = report::synthesize(&totals, &records.results, &index, &config)?;
        artifacts.write_to(FsSink::new(&config))?;
        Ok(())
    }
}

fn exec_summary(input: impl Read, output_writer: &mut OutputWriter) -> Result<()> {
    let (_, totals) = extract_and_aggregate(input)?;

    let mut writer = output_writer.stdout_writer();
    writeln!(
        writer,
        "Total tests: {}, Passed: {}, Rate: {}%",
        totals.total(),
        totals.passed(),
        totals.display_rate(),
    )
    .and_then(|()| writer.flush())
    .map_err(|err| ExpectedError::write_output_error(None, err))
}

impl FilterManifestOpts {
    fn exec(self, input: impl Read, output_writer: &mut OutputWriter) -> Result<()> {
        let manifest_json = match &self.input {
            Some(path) => std::fs::read_to_string(path)
                .map_err(|err| ExpectedError::manifest_read_error(path, err))?,
            None => read_to_string(input)?,
        };
        let entries = manifest::parse_entries(&manifest_json)
            .map_err(|err| ExpectedError::manifest_parse_error(self.input.clone(), err))?;
        let before = entries.len();
        let filtered = manifest::filter_manifest(entries);
        debug!("kept {} of {before} manifest entries", filtered.len());

        let mut json = serde_json::to_string_pretty(&filtered)
            .map_err(|err| ExpectedError::FilterSerializeError { err })?;
        json.push('\n');

        match &self.output {
            Some(path) => std::fs::write(path, json)
                .map_err(|err| ExpectedError::write_output_error(Some(path.clone()), err)),
            None => {
                let mut writer = output_writer.stdout_writer();
                writer
                    .write_all(json.as_bytes())
                    .and_then(|()| writer.flush())
                    .map_err(|err| ExpectedError::write_output_error(None, err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino_tempfile::Utf8TempDir;
    use compat_report_core::exit_codes::CompatExitCode;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    static RUNNER_OUTPUT: &str = indoc! {"
        [ok]: hget (1 ms)
        Summary: version: 1.0.0, total tests: 50, passed: 5, rate: 10.00%
        test: hget tags passed
        test: append tags failed
        Summary: version: 1.0.0, total tests: 30, passed: 25, rate: 83.33%
    "};

    fn run(args: &[&str], input: &str) -> (Result<i32>, String) {
        let app = CompatReportApp::try_parse_from(
            std::iter::once("compat-report").chain(args.iter().copied()),
        )
        .expect("arguments are valid");
        let mut output_writer = OutputWriter::Test { stdout: Vec::new() };
        let result = app.exec(input.as_bytes(), &mut output_writer);
        let OutputWriter::Test { stdout } = output_writer else {
            unreachable!("output writer is always the test variant");
        };
        (result, String::from_utf8(stdout).expect("output is UTF-8"))
    }

    #[test]
    fn summary_prints_totals() {
        let (result, stdout) = run(&["summary"], RUNNER_OUTPUT);
        assert_eq!(result.expect("summary succeeds"), 0);
        assert_eq!(stdout, "Total tests: 80, Passed: 30, Rate: 37.50%\n");
    }

    #[test]
    fn summary_with_zero_total_fails() {
        let (result, stdout) = run(
            &["summary"],
            "Summary: version: 1.0.0, total tests: 0, passed: 0, rate: 0.00%\n",
        );
        let error = result.expect_err("zero total is fatal");
        assert_eq!(error.process_exit_code(), CompatExitCode::NO_TESTS_RUN);
        assert_eq!(stdout, "");
    }

    #[test]
    fn summary_with_overflowing_total_fails() {
        let (result, stdout) = run(
            &["summary"],
            indoc! {"
                Summary: version: 1.0.0, total tests: 18446744073709551615, passed: 1, rate: 0.00%
                Summary: version: 1.0.0, total tests: 1, passed: 1, rate: 100.00%
            "},
        );
        let error = result.expect_err("sum of totals overflows");
        assert_eq!(error.process_exit_code(), CompatExitCode::INVALID_SUMMARY);
        assert_eq!(stdout, "");
    }

    #[test]
    fn filter_manifest_from_stdin() {
        let (result, stdout) = run(
            &["filter-manifest"],
            r#"[
                {"name": "hget", "tags": "basic", "skipped": false},
                {"name": "cluster_info", "tags": "cluster"},
                {"name": "ping"}
            ]"#,
        );
        assert_eq!(result.expect("filter succeeds"), 0);
        assert_eq!(
            stdout,
            indoc! {r#"
                [
                  {
                    "name": "hget",
                    "tags": "basic"
                  },
                  {
                    "name": "ping"
                  }
                ]
            "#}
        );
    }

    #[test]
    fn filter_manifest_between_files() {
        let dir = Utf8TempDir::new().expect("created temp dir");
        let input = dir.path().join("all-tests.json");
        let output = dir.path().join("tests.json");
        std::fs::write(&input, r#"[{"name": "x", "tags": "cluster"}]"#).expect("wrote input");

        let (result, stdout) = run(
            &[
                "filter-manifest",
                "--input",
                input.as_str(),
                "--output",
                output.as_str(),
            ],
            "",
        );
        assert_eq!(result.expect("filter succeeds"), 0);
        assert_eq!(stdout, "");
        assert_eq!(
            std::fs::read_to_string(&output).expect("output was written"),
            "[]\n"
        );
    }

    #[test]
    fn report_writes_both_artifacts() {
        let dir = Utf8TempDir::new().expect("created temp dir");
        let manifest = dir.path().join("tests.json");
        let badge = dir.path().join("out/badge.json");
        let document = dir.path().join("out/report.html");
        std::fs::write(
            &manifest,
            r#"[{"name": "hget", "tags": "basic"}, {"name": "append"}]"#,
        )
        .expect("wrote manifest");

        let (result, _) = run(
            &[
                "report",
                "--manifest",
                manifest.as_str(),
                "--badge-path",
                badge.as_str(),
                "--report-path",
                document.as_str(),
            ],
            RUNNER_OUTPUT,
        );
        assert_eq!(result.expect("report succeeds"), 0);

        let badge: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&badge).expect("badge was written"))
                .expect("badge is valid JSON");
        assert_eq!(
            badge,
            serde_json::json!({
                "schemaVersion": 1,
                "label": "Redis compatibility",
                "message": "37.50% tests passed",
            })
        );

        let document = std::fs::read_to_string(&document).expect("document was written");
        assert!(document.contains("<summary>hget</summary>"));
        assert!(document.contains("<summary>append</summary>"));
    }

    #[test]
    fn report_with_unknown_test_writes_nothing() {
        let dir = Utf8TempDir::new().expect("created temp dir");
        let manifest = dir.path().join("tests.json");
        let badge = dir.path().join("badge.json");
        let document = dir.path().join("report.html");
        std::fs::write(&manifest, r#"[{"name": "hget"}]"#).expect("wrote manifest");

        let (result, _) = run(
            &[
                "report",
                "--manifest",
                manifest.as_str(),
                "--badge-path",
                badge.as_str(),
                "--report-path",
                document.as_str(),
            ],
            RUNNER_OUTPUT,
        );
        let error = result.expect_err("append is not in the manifest");
        assert_eq!(error.process_exit_code(), CompatExitCode::UNKNOWN_TEST);
        assert!(!badge.exists());
        assert!(!document.exists());
    }

    #[test]
    fn report_with_missing_manifest_is_a_setup_error() {
        let dir = Utf8TempDir::new().expect("created temp dir");
        let manifest = dir.path().join("missing.json");

        let (result, _) = run(&["report", "--manifest", manifest.as_str()], RUNNER_OUTPUT);
        let error = result.expect_err("manifest does not exist");
        assert_eq!(error.process_exit_code(), CompatExitCode::SETUP_ERROR);
    }
}
