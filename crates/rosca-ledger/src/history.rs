use std::collections::VecDeque;

use crate::snapshot::Snapshot;

/// Bounded LIFO of pre-mutation snapshots.
///
/// Pushing beyond capacity silently evicts the oldest entry. There is no redo.
#[derive(Clone, Debug)]
pub struct History {
    entries: VecDeque<Snapshot>,
    capacity: usize,
}

impl History {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn push(&mut self, snapshot: Snapshot) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(snapshot);
    }

    /// Remove and return the most recent entry.
    pub fn pop(&mut self) -> Option<Snapshot> {
        self.entries.pop_back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use rosca_types::{Committee, CommitteeId};

    use super::*;

    fn marked(n: u32) -> Snapshot {
        let committee = Committee {
            id: CommitteeId::parse(&format!("c-{n}")).unwrap(),
            name: format!("committee {n}"),
            monthly_amount: 100.into(),
            start_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            duration_months: n,
            allow_half_share: false,
        };
        Snapshot::from_parts(vec![committee], vec![], vec![], vec![])
    }

    #[test]
    fn pop_returns_most_recent_first() {
        let mut history = History::with_capacity(3);
        history.push(marked(1));
        history.push(marked(2));
        assert_eq!(history.pop(), Some(marked(2)));
        assert_eq!(history.pop(), Some(marked(1)));
        assert_eq!(history.pop(), None);
    }

    #[test]
    fn oldest_entry_evicted_at_capacity() {
        let mut history = History::with_capacity(2);
        for n in 1..=3 {
            history.push(marked(n));
        }
        assert_eq!(history.len(), 2);
        assert_eq!(history.pop(), Some(marked(3)));
        assert_eq!(history.pop(), Some(marked(2)));
        assert!(history.is_empty());
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut history = History::with_capacity(0);
        history.push(marked(1));
        assert!(history.is_empty());
    }
}
