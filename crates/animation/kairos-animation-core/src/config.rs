//! Updater configuration.

use serde::{Deserialize, Serialize};

/// Sizing hints and scheduler toggles for an `Updater`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Initial capacity hints for the binder and tracked-curve tables.
    pub binder_capacity: usize,
    pub curve_capacity: usize,

    /// Merge neighbouring continuous vary ranges that end up with identical
    /// curve sets after a curve is removed. Keeps the index small under churn.
    pub coalesce_ranges: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            binder_capacity: 64,
            curve_capacity: 32,
            coalesce_ranges: true,
        }
    }
}
