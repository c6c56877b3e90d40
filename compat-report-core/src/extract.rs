// Copyright (c) The compat-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Classifies test runner output line by line.
//!
//! Runner output interleaves three kinds of lines:
//!
//! * summary records, one per shard, starting with `Summary`:
//!   `Summary: version: 1.0.0, total tests: 50, passed: 5, rate: 10.00%`
//! * per-test result lines, starting with `test:`: `test: hget tags passed`
//! * everything else, which is ignored.
//!
//! A line that starts with the summary marker but does not conform is fatal. A line that starts
//! with the per-test marker but does not conform is recorded as a [`MalformedResultLine`] and
//! skipped.

use crate::errors::{SummaryParseError, SummaryParseReason};
use regex::Regex;
use semver::Version;
use std::{fmt, str::FromStr, sync::LazyLock};
use tracing::{debug, warn};

static SUMMARY_MARKER: &str = "Summary";
static RESULT_MARKER: &str = "test:";
static NAME_SUFFIX: &str = " tags";

static SUMMARY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^Summary: version: (?P<version>\d+\.\d+\.\d+), total tests: (?P<total>\d+), passed: (?P<passed>\d+), rate: (?P<rate>\d+\.\d+)%$",
    )
    .expect("summary regex is valid")
});

static RESULT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^test: (?P<annotated>.+ tags) (?P<outcome>passed|failed|skipped)$")
        .expect("result regex is valid")
});

/// A shard's aggregate statistics, as reported by the runner.
#[derive(Clone, Debug, PartialEq)]
pub struct SummaryRecord {
    /// The version of the runner that produced the record.
    pub version: Version,

    /// The number of tests run by the shard.
    pub total: u64,

    /// The number of tests that passed. Always at most `total`.
    pub passed: u64,

    /// The pass rate the runner reported, as a percentage.
    ///
    /// This is informational only: aggregation recomputes the rate from counts.
    pub rate: f64,
}

/// The outcome of a single test.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TestOutcome {
    /// The test passed.
    Passed,
    /// The test failed.
    Failed,
    /// The test was skipped.
    Skipped,
}

impl TestOutcome {
    /// Returns the lowercase form used in runner output.
    pub fn as_str(self) -> &'static str {
        match self {
            TestOutcome::Passed => "passed",
            TestOutcome::Failed => "failed",
            TestOutcome::Skipped => "skipped",
        }
    }

    /// Returns the capitalized form used in the report document.
    pub fn label(self) -> &'static str {
        match self {
            TestOutcome::Passed => "Passed",
            TestOutcome::Failed => "Failed",
            TestOutcome::Skipped => "Skipped",
        }
    }

    /// Returns the glyph displayed next to the outcome in the report document.
    pub fn glyph(self) -> &'static str {
        match self {
            TestOutcome::Passed => "\u{2705}",
            TestOutcome::Failed => "\u{274c}",
            TestOutcome::Skipped => "\u{26a0}\u{fe0f}",
        }
    }
}

impl fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestOutcome {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "passed" => Ok(TestOutcome::Passed),
            "failed" => Ok(TestOutcome::Failed),
            "skipped" => Ok(TestOutcome::Skipped),
            _ => Err(()),
        }
    }
}

/// A line reporting a single test's outcome.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResultLine {
    /// The name of the test, with the trailing annotation removed.
    pub test_name: String,

    /// The outcome of the test.
    pub outcome: TestOutcome,

    /// The 1-based line number this result was read from.
    pub line_number: usize,
}

/// A line that started with the per-test marker but did not match the expected shape.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MalformedResultLine {
    /// The 1-based line number.
    pub line_number: usize,

    /// The line, without its line terminator.
    pub line: String,
}

/// The classification of a single line of runner output.
#[derive(Clone, Debug, PartialEq)]
pub enum ClassifiedLine {
    /// A summary record.
    Summary(SummaryRecord),

    /// A per-test result.
    Result(ResultLine),

    /// A line that looked like a per-test result but could not be parsed.
    MalformedResult(MalformedResultLine),

    /// Any other line.
    Ignored,
}

/// Classifies a single line of runner output.
///
/// `line_number` is 1-based and is only used for diagnostics.
pub fn classify(line_number: usize, line: &str) -> Result<ClassifiedLine, SummaryParseError> {
    if line.starts_with(SUMMARY_MARKER) {
        parse_summary(line)
            .map(ClassifiedLine::Summary)
            .map_err(|reason| SummaryParseError::new(line_number, line, reason))
    } else if line.starts_with(RESULT_MARKER) {
        match parse_result(line, line_number) {
            Some(result) => Ok(ClassifiedLine::Result(result)),
            None => Ok(ClassifiedLine::MalformedResult(MalformedResultLine {
                line_number,
                line: line.to_owned(),
            })),
        }
    } else {
        Ok(ClassifiedLine::Ignored)
    }
}

fn parse_summary(line: &str) -> Result<SummaryRecord, SummaryParseReason> {
    let captures = SUMMARY_REGEX
        .captures(line.trim_end())
        .ok_or(SummaryParseReason::ShapeMismatch)?;

    let version_str = &captures["version"];
    let version =
        Version::parse(version_str).map_err(|error| SummaryParseReason::InvalidVersion {
            input: version_str.to_owned(),
            error,
        })?;
    let total = parse_count("total tests", &captures["total"])?;
    let passed = parse_count("passed", &captures["passed"])?;
    if passed > total {
        return Err(SummaryParseReason::PassedExceedsTotal { total, passed });
    }

    let rate_str = &captures["rate"];
    let rate = rate_str
        .parse::<f64>()
        .map_err(|error| SummaryParseReason::InvalidRate {
            input: rate_str.to_owned(),
            error,
        })?;

    Ok(SummaryRecord {
        version,
        total,
        passed,
        rate,
    })
}

fn parse_count(field: &'static str, input: &str) -> Result<u64, SummaryParseReason> {
    input
        .parse()
        .map_err(|error| SummaryParseReason::InvalidCount {
            field,
            input: input.to_owned(),
            error,
        })
}

fn parse_result(line: &str, line_number: usize) -> Option<ResultLine> {
    let captures = RESULT_REGEX.captures(line.trim_end())?;
    let test_name = captures["annotated"].strip_suffix(NAME_SUFFIX)?;
    let outcome = captures["outcome"].parse().ok()?;
    Some(ResultLine {
        test_name: test_name.to_owned(),
        outcome,
        line_number,
    })
}

/// Summary records and result lines extracted from the full runner output, in input order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExtractedRecords {
    /// Summary records, in input order.
    pub summaries: Vec<SummaryRecord>,

    /// Per-test result lines, in input order.
    pub results: Vec<ResultLine>,

    /// Lines that looked like result lines but were skipped.
    pub malformed: Vec<MalformedResultLine>,
}

impl ExtractedRecords {
    /// Classifies every line of `input` in a single pass.
    ///
    /// Returns an error on the first malformed summary record. Malformed result lines are logged
    /// as warnings and recorded in [`Self::malformed`].
    pub fn from_input(input: &str) -> Result<Self, SummaryParseError> {
        let mut records = Self::default();

        for (index, line) in input.lines().enumerate() {
            match classify(index + 1, line)? {
                ClassifiedLine::Summary(summary) => records.summaries.push(summary),
                ClassifiedLine::Result(result) => records.results.push(result),
                ClassifiedLine::MalformedResult(malformed) => {
                    warn!(
                        "skipping malformed test result on line {}: {}",
                        malformed.line_number, malformed.line
                    );
                    records.malformed.push(malformed);
                }
                ClassifiedLine::Ignored => {}
            }
        }

        debug!(
            "extracted {} summary records and {} test results ({} malformed)",
            records.summaries.len(),
            records.results.len(),
            records.malformed.len(),
        );

        Ok(records)
    }
}
