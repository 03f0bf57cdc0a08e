use std::collections::BTreeSet;

use rosca_types::{CommitteeId, MemberId, PayerId, ShareType};
use serde::Serialize;

use crate::duration::complete_pairs;
use crate::traits::LedgerReader;

/// What a payer row stands for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PayerKind {
    Full,
    Pair { first: MemberId, second: MemberId },
}

/// One payout slot of a committee: a FULL member or a complete HALF pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PayerRow {
    pub id: PayerId,
    pub name: String,
    pub kind: PayerKind,
}

impl PayerRow {
    /// Whether `member` shares in this payout slot.
    pub fn includes(&self, member: &MemberId) -> bool {
        match &self.kind {
            PayerKind::Full => &self.id == member,
            PayerKind::Pair { first, second } => first == member || second == member,
        }
    }
}

/// Payer rows of a committee in member insertion order. A pair row sits at
/// the position of its earlier-added member and is keyed by the canonical
/// pair id.
pub fn payer_rows<R: LedgerReader + ?Sized>(reader: &R, committee: &CommitteeId) -> Vec<PayerRow> {
    let members = reader.members_of(committee);
    let pairs = complete_pairs(committee, members.iter().copied());
    let mut emitted = BTreeSet::new();
    let mut rows = Vec::new();

    for member in &members {
        match member.share_type {
            ShareType::Full => rows.push(PayerRow {
                id: member.id.clone(),
                name: member.name.clone(),
                kind: PayerKind::Full,
            }),
            ShareType::Half => {
                let Some(key) = member.pair_key() else {
                    continue;
                };
                let Some(group) = pairs.get(key) else {
                    continue;
                };
                if !emitted.insert(key.clone()) {
                    continue;
                }
                let (first, second) = (group[0], group[1]);
                rows.push(PayerRow {
                    id: key.clone(),
                    name: format!("{} & {}", first.name, second.name),
                    kind: PayerKind::Pair {
                        first: first.id.clone(),
                        second: second.id.clone(),
                    },
                });
            }
        }
    }
    rows
}

/// The payer row for `payer`, if it is a current slot of the committee.
pub fn resolve_payer<R: LedgerReader + ?Sized>(
    reader: &R,
    committee: &CommitteeId,
    payer: &PayerId,
) -> Option<PayerRow> {
    payer_rows(reader, committee)
        .into_iter()
        .find(|row| &row.id == payer)
}

/// The payer row `member` currently belongs to. `None` for an unpaired HALF
/// member.
pub fn payer_row_of<R: LedgerReader + ?Sized>(
    reader: &R,
    committee: &CommitteeId,
    member: &MemberId,
) -> Option<PayerRow> {
    payer_rows(reader, committee)
        .into_iter()
        .find(|row| row.includes(member))
}
