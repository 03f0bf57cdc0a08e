use rosca_types::{
    Committee, CommitteeId, Draw, DrawId, Member, MemberId, MonthYear, Payment, PaymentId,
};
use tracing::{debug, warn};

use crate::config::LedgerConfig;
use crate::draw;
use crate::error::LedgerResult;
use crate::history::History;
use crate::mutation::{self, CommitteeInput, DrawInput, MemberInput, PaymentInput};
use crate::payer::PayerRow;
use crate::snapshot::Snapshot;
use crate::traits::{LedgerReader, SnapshotSink};

/// The committee ledger: current snapshot, bounded undo history, and an
/// optional persistence sink.
///
/// Every mutation runs against a clone of the current snapshot and is swapped
/// in whole on success. Rejected mutations leave state and history untouched.
pub struct CommitteeLedger {
    snapshot: Snapshot,
    history: History,
    config: LedgerConfig,
    sink: Option<Box<dyn SnapshotSink>>,
}

impl CommitteeLedger {
    pub fn new(config: LedgerConfig) -> Self {
        Self::with_snapshot(Snapshot::empty(), config)
    }

    /// Start from a previously loaded snapshot with empty history.
    pub fn with_snapshot(snapshot: Snapshot, config: LedgerConfig) -> Self {
        Self {
            snapshot,
            history: History::with_capacity(config.history_limit),
            config,
            sink: None,
        }
    }

    /// Attach a sink notified after every applied change.
    pub fn with_sink(mut self, sink: impl SnapshotSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn into_snapshot(self) -> Snapshot {
        self.snapshot
    }

    fn apply<T>(
        &mut self,
        op: &'static str,
        mutate: impl FnOnce(&mut Snapshot) -> LedgerResult<T>,
    ) -> LedgerResult<T> {
        let mut draft = self.snapshot.clone();
        match mutate(&mut draft) {
            Ok(out) => {
                let previous = std::mem::replace(&mut self.snapshot, draft);
                self.history.push(previous);
                debug!(op, history = self.history.len(), "ledger mutation applied");
                self.persist();
                Ok(out)
            }
            Err(error) => {
                debug!(op, %error, "ledger mutation rejected");
                Err(error)
            }
        }
    }

    fn persist(&self) {
        if let Some(sink) = &self.sink {
            if let Err(error) = sink.persist(&self.snapshot) {
                warn!(%error, "failed to persist ledger snapshot; in-memory state kept");
            }
        }
    }

    // ---- History ----

    /// Revert the most recent applied mutation. Returns `false` when there is
    /// nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.history.pop() else {
            return false;
        };
        self.snapshot = previous;
        debug!(history = self.history.len(), "ledger mutation undone");
        self.persist();
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    // ---- Committees ----

    pub fn add_committee(&mut self, input: CommitteeInput) -> LedgerResult<Committee> {
        self.apply("add_committee", |s| mutation::add_committee(s, input))
    }

    pub fn update_committee(
        &mut self,
        id: &CommitteeId,
        input: CommitteeInput,
    ) -> LedgerResult<Committee> {
        self.apply("update_committee", |s| {
            mutation::update_committee(s, id, input)
        })
    }

    /// Delete a committee together with its members, payments and draws.
    pub fn delete_committee(&mut self, id: &CommitteeId) -> LedgerResult<()> {
        self.apply("delete_committee", |s| mutation::delete_committee(s, id))
    }

    // ---- Members ----

    pub fn add_member(
        &mut self,
        committee: &CommitteeId,
        input: MemberInput,
    ) -> LedgerResult<Member> {
        self.apply("add_member", |s| mutation::add_member(s, committee, input))
    }

    pub fn update_member(&mut self, id: &MemberId, input: MemberInput) -> LedgerResult<Member> {
        self.apply("update_member", |s| mutation::update_member(s, id, input))
    }

    pub fn delete_member(&mut self, id: &MemberId) -> LedgerResult<()> {
        self.apply("delete_member", |s| mutation::delete_member(s, id))
    }

    // ---- Payments ----

    pub fn add_payment(
        &mut self,
        committee: &CommitteeId,
        input: PaymentInput,
    ) -> LedgerResult<Payment> {
        let due_day = self.config.due_day;
        self.apply("add_payment", |s| {
            mutation::add_payment(s, committee, input, due_day)
        })
    }

    pub fn update_payment(&mut self, id: &PaymentId, input: PaymentInput) -> LedgerResult<Payment> {
        let due_day = self.config.due_day;
        self.apply("update_payment", |s| {
            mutation::update_payment(s, id, input, due_day)
        })
    }

    pub fn delete_payment(&mut self, id: &PaymentId) -> LedgerResult<()> {
        self.apply("delete_payment", |s| mutation::delete_payment(s, id))
    }

    // ---- Draws ----

    pub fn add_draw(&mut self, committee: &CommitteeId, input: DrawInput) -> LedgerResult<Draw> {
        self.apply("add_draw", |s| mutation::add_draw(s, committee, input))
    }

    pub fn update_draw(&mut self, id: &DrawId, input: DrawInput) -> LedgerResult<Draw> {
        self.apply("update_draw", |s| mutation::update_draw(s, id, input))
    }

    pub fn delete_draw(&mut self, id: &DrawId) -> LedgerResult<()> {
        self.apply("delete_draw", |s| mutation::delete_draw(s, id))
    }

    // ---- Queries ----

    pub fn eligible_winners(&self, committee: &CommitteeId) -> LedgerResult<Vec<PayerRow>> {
        draw::eligible_winners(&self.snapshot, committee)
    }

    pub fn next_draw_month(&self, committee: &CommitteeId) -> LedgerResult<MonthYear> {
        draw::next_draw_month(&self.snapshot, committee)
    }
}

impl Default for CommitteeLedger {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}

impl LedgerReader for CommitteeLedger {
    fn committees(&self) -> &[Committee] {
        self.snapshot.committees()
    }

    fn members(&self) -> &[Member] {
        self.snapshot.members()
    }

    fn payments(&self) -> &[Payment] {
        self.snapshot.payments()
    }

    fn draws(&self) -> &[Draw] {
        self.snapshot.draws()
    }
}

impl std::fmt::Debug for CommitteeLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommitteeLedger")
            .field("committees", &self.snapshot.committees().len())
            .field("members", &self.snapshot.members().len())
            .field("payments", &self.snapshot.payments().len())
            .field("draws", &self.snapshot.draws().len())
            .field("history", &self.history.len())
            .finish()
    }
}
