// Copyright (c) The compat-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{aggregate::AggregateTotals, errors::RenderError};
use serde::{Deserialize, Serialize};

/// The label shown on the status badge and used as the report title.
pub static BADGE_LABEL: &str = "Redis compatibility";

/// The schema version understood by the badge renderer.
pub const BADGE_SCHEMA_VERSION: u32 = 1;

/// A status badge description, in the format consumed by shields.io-style endpoint badges.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    /// Always [`BADGE_SCHEMA_VERSION`].
    pub schema_version: u32,

    /// The left-hand side of the badge.
    pub label: String,

    /// The right-hand side of the badge, e.g. `37.50% tests passed`.
    pub message: String,
}

impl Badge {
    /// Creates the badge for the given totals.
    pub fn new(totals: &AggregateTotals) -> Self {
        Self {
            schema_version: BADGE_SCHEMA_VERSION,
            label: BADGE_LABEL.to_owned(),
            message: format!("{}% tests passed", totals.display_rate()),
        }
    }

    /// Serializes the badge as pretty-printed JSON with a trailing newline.
    pub fn to_json(&self) -> Result<String, RenderError> {
        let mut json = serde_json::to_string_pretty(self).map_err(RenderError::Badge)?;
        json.push('\n');
        Ok(json)
    }
}
