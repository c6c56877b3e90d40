// Copyright (c) The compat-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Folds per-shard summary records into a single set of totals.

use crate::{
    errors::{AggregateError, NoTestsObserved},
    extract::SummaryRecord,
};
use std::fmt;

/// The sum of all summary records in a run.
///
/// Constructed only through [`AggregateTotals::from_summaries`], so `passed <= total` and
/// `total > 0` always hold.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct AggregateTotals {
    total: u64,
    passed: u64,
}

impl AggregateTotals {
    /// Sums `total` and `passed` across all records.
    ///
    /// Returns [`NoTestsObserved`] if the combined total is zero, including when there are no
    /// records at all, and [`AggregateError::Overflow`] if either sum exceeds `u64::MAX`.
    pub fn from_summaries<'a>(
        summaries: impl IntoIterator<Item = &'a SummaryRecord>,
    ) -> Result<Self, AggregateError> {
        let mut record_count = 0;
        let mut total = 0u64;
        let mut passed = 0u64;
        for summary in summaries {
            record_count += 1;
            let overflow = |field: &'static str| AggregateError::Overflow {
                field,
                record_number: record_count,
            };
            total = total
                .checked_add(summary.total)
                .ok_or_else(|| overflow("total tests"))?;
            passed = passed
                .checked_add(summary.passed)
                .ok_or_else(|| overflow("passed"))?;
        }

        if total == 0 {
            return Err(NoTestsObserved::new(record_count).into());
        }

        Ok(Self { total, passed })
    }

    /// Returns the total number of tests run.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Returns the number of tests that passed.
    pub fn passed(&self) -> u64 {
        self.passed
    }

    /// Returns `passed / total * 100`.
    pub fn rate(&self) -> f64 {
        self.passed as f64 / self.total as f64 * 100.0
    }

    /// Returns a displayer for the pass rate, with exactly two decimal places and no `%` sign.
    pub fn display_rate(&self) -> DisplayRate {
        DisplayRate(self.rate())
    }
}

/// Displays a pass rate with two decimal places.
///
/// Returned by [`AggregateTotals::display_rate`].
#[derive(Copy, Clone, Debug)]
pub struct DisplayRate(f64);

impl fmt::Display for DisplayRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
