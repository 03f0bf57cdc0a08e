use rosca_types::{Committee, CommitteeId, Draw, DrawId, Member, MemberId, Payment, PaymentId};

use crate::error::LedgerResult;
use crate::snapshot::Snapshot;

/// Read boundary for the ledger: whole collections plus per-committee views.
pub trait LedgerReader {
    fn committees(&self) -> &[Committee];

    fn members(&self) -> &[Member];

    fn payments(&self) -> &[Payment];

    fn draws(&self) -> &[Draw];

    fn committee(&self, id: &CommitteeId) -> Option<&Committee> {
        self.committees().iter().find(|c| &c.id == id)
    }

    fn member(&self, id: &MemberId) -> Option<&Member> {
        self.members().iter().find(|m| &m.id == id)
    }

    fn payment(&self, id: &PaymentId) -> Option<&Payment> {
        self.payments().iter().find(|p| &p.id == id)
    }

    fn draw(&self, id: &DrawId) -> Option<&Draw> {
        self.draws().iter().find(|d| &d.id == id)
    }

    fn members_of(&self, committee: &CommitteeId) -> Vec<&Member> {
        self.members()
            .iter()
            .filter(|m| &m.committee_id == committee)
            .collect()
    }

    fn payments_of(&self, committee: &CommitteeId) -> Vec<&Payment> {
        self.payments()
            .iter()
            .filter(|p| &p.committee_id == committee)
            .collect()
    }

    fn draws_of(&self, committee: &CommitteeId) -> Vec<&Draw> {
        self.draws()
            .iter()
            .filter(|d| &d.committee_id == committee)
            .collect()
    }
}

/// Persistence boundary notified after every applied snapshot change.
///
/// Failures are reported back to the engine, which logs them and carries on:
/// the in-memory snapshot stays authoritative.
pub trait SnapshotSink: Send {
    fn persist(&self, snapshot: &Snapshot) -> LedgerResult<()>;
}
