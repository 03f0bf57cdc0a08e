//! In-memory snapshot sink for tests and embedding.

use std::sync::{Arc, Mutex};

use rosca_ledger::{LedgerError, LedgerResult, Snapshot, SnapshotSink};

/// Records every persisted snapshot. Clones share the same record, so a test
/// can keep one handle and give the other to the engine.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    saved: Arc<Mutex<Vec<Snapshot>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All snapshots persisted so far, oldest first.
    pub fn saved(&self) -> Vec<Snapshot> {
        self.saved.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// The most recently persisted snapshot.
    pub fn latest(&self) -> Option<Snapshot> {
        self.saved.lock().ok().and_then(|s| s.last().cloned())
    }

    pub fn len(&self) -> usize {
        self.saved.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SnapshotSink for MemorySink {
    fn persist(&self, snapshot: &Snapshot) -> LedgerResult<()> {
        let mut saved = self
            .saved
            .lock()
            .map_err(|e| LedgerError::StoreError(format!("lock poisoned: {e}")))?;
        saved.push(snapshot.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rosca_ledger::{CommitteeInput, CommitteeLedger};
    use rosca_types::Amount;

    use super::*;

    #[test]
    fn records_each_applied_change() {
        let sink = MemorySink::new();
        let mut ledger = CommitteeLedger::default().with_sink(sink.clone());
        assert!(sink.is_empty());

        let input = CommitteeInput {
            name: "Neighbours".into(),
            monthly_amount: Amount::new(500),
            start_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            allow_half_share: false,
        };
        ledger.add_committee(input.clone()).unwrap();
        ledger.add_committee(input).unwrap();
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.latest().as_ref(), Some(ledger.snapshot()));

        ledger.undo();
        assert_eq!(sink.len(), 3);
        assert_eq!(sink.saved()[0], sink.latest().unwrap());
    }
}
