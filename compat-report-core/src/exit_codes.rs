// Copyright (c) The compat-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Documented exit codes for `compat-report` failures.

/// Documented exit codes for `compat-report` failures.
///
/// `compat-report` runs may fail for a variety of reasons. This structure documents the exit codes
/// that may occur in case of expected failures.
///
/// Unknown/unexpected failures will always result in exit code 1.
pub enum CompatExitCode {}

impl CompatExitCode {
    /// No errors occurred and compat-report exited normally.
    pub const OK: i32 = 0;

    /// Summary records were read, but their combined total was zero.
    pub const NO_TESTS_RUN: i32 = 4;

    /// A line starting with the summary marker did not have the expected shape, or the counts
    /// across summary records were too large to sum.
    pub const INVALID_SUMMARY: i32 = 50;

    /// A result line named a test that is not defined in the manifest.
    pub const UNKNOWN_TEST: i32 = 51;

    /// The manifest could not be parsed.
    pub const INVALID_MANIFEST: i32 = 52;

    /// Writing an artifact, or data to stdout or stderr, produced an error.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;

    /// A user issue happened while setting up a compat-report invocation, such as an invalid
    /// config file or unreadable input.
    pub const SETUP_ERROR: i32 = 96;
}
