// Copyright (c) The compat-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core functionality for turning compatibility test runner output into a
//! status badge and a human-readable report.
//!
//! The flow of a run is strictly linear:
//!
//! 1. [`extract`] classifies every line of runner output as a summary record,
//!    a per-test result line, or noise.
//! 2. [`aggregate`] folds summary records into a single set of totals.
//! 3. [`report`] joins result lines against the test [`manifest`] and renders
//!    the badge and the report document.
//! 4. A [`sink`] receives both artifacts once everything above has succeeded.

pub mod aggregate;
pub mod config;
pub mod errors;
pub mod exit_codes;
pub mod extract;
pub mod manifest;
pub mod report;
pub mod sink;
