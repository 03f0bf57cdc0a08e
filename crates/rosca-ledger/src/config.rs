use serde::{Deserialize, Serialize};

use crate::penalty::DUE_DAY;

/// Tunables of the ledger engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Maximum number of undo entries kept; the oldest is evicted beyond this.
    pub history_limit: usize,
    /// Day of month on which contributions fall due.
    pub due_day: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            history_limit: 20,
            due_day: DUE_DAY,
        }
    }
}
