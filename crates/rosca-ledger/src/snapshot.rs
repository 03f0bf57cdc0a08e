use rosca_types::{Committee, CommitteeId, Draw, DrawId, Member, MemberId, Payment, PaymentId};
use serde::{Deserialize, Serialize};

use crate::traits::LedgerReader;

/// Whole ledger state: the four entity collections, in insertion order.
///
/// This is also the persisted record layout. Deserialization requires all
/// four collections to be present.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    committees: Vec<Committee>,
    members: Vec<Member>,
    payments: Vec<Payment>,
    draws: Vec<Draw>,
}

impl Snapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_parts(
        committees: Vec<Committee>,
        members: Vec<Member>,
        payments: Vec<Payment>,
        draws: Vec<Draw>,
    ) -> Self {
        Self {
            committees,
            members,
            payments,
            draws,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.committees.is_empty()
            && self.members.is_empty()
            && self.payments.is_empty()
            && self.draws.is_empty()
    }

    pub(crate) fn committees_mut(&mut self) -> &mut Vec<Committee> {
        &mut self.committees
    }

    pub(crate) fn members_mut(&mut self) -> &mut Vec<Member> {
        &mut self.members
    }

    pub(crate) fn payments_mut(&mut self) -> &mut Vec<Payment> {
        &mut self.payments
    }

    pub(crate) fn draws_mut(&mut self) -> &mut Vec<Draw> {
        &mut self.draws
    }

    pub(crate) fn committee_mut(&mut self, id: &CommitteeId) -> Option<&mut Committee> {
        self.committees.iter_mut().find(|c| &c.id == id)
    }

    pub(crate) fn member_mut(&mut self, id: &MemberId) -> Option<&mut Member> {
        self.members.iter_mut().find(|m| &m.id == id)
    }

    pub(crate) fn payment_mut(&mut self, id: &PaymentId) -> Option<&mut Payment> {
        self.payments.iter_mut().find(|p| &p.id == id)
    }

    pub(crate) fn draw_mut(&mut self, id: &DrawId) -> Option<&mut Draw> {
        self.draws.iter_mut().find(|d| &d.id == id)
    }
}

impl LedgerReader for Snapshot {
    fn committees(&self) -> &[Committee] {
        &self.committees
    }

    fn members(&self) -> &[Member] {
        &self.members
    }

    fn payments(&self) -> &[Payment] {
        &self.payments
    }

    fn draws(&self) -> &[Draw] {
        &self.draws
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_serializes_all_collections() {
        let json = serde_json::to_value(Snapshot::empty()).unwrap();
        for key in ["committees", "members", "payments", "draws"] {
            assert!(json[key].as_array().unwrap().is_empty(), "{key}");
        }
    }

    #[test]
    fn missing_collection_fails_to_deserialize() {
        let partial = r#"{"committees": [], "members": [], "payments": []}"#;
        assert!(serde_json::from_str::<Snapshot>(partial).is_err());

        let complete = r#"{"committees": [], "members": [], "payments": [], "draws": []}"#;
        assert!(serde_json::from_str::<Snapshot>(complete).unwrap().is_empty());
    }
}
