use std::collections::{BTreeMap, BTreeSet};

use rosca_types::{CommitteeId, MemberId, MonthYear, PayerId};
use serde::Serialize;

use crate::duration::{derive_duration, pair_groups};
use crate::penalty::LateAssessment;
use crate::snapshot::Snapshot;
use crate::traits::LedgerReader;

/// Result of snapshot validation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub committees_checked: usize,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Returns `true` if all checks passed.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A specific invariant violation detected during validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub entity: String,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ViolationKind {
    DurationMismatch,
    MissingPairId,
    AsymmetricPair,
    NonCanonicalPair,
    OversizedPair,
    DanglingCommittee,
    DuplicatePayment,
    DerivedFieldMismatch,
    RepeatWinner,
    DrawsExceedDuration,
    StrayPairId,
}

/// Checks a snapshot against the ledger invariants. Used on load, where the
/// data did not come through the mutation rules.
pub struct SnapshotValidator;

impl SnapshotValidator {
    pub fn validate(snapshot: &Snapshot, due_day: u32) -> ValidationReport {
        let mut violations = Vec::new();
        let known: BTreeSet<&CommitteeId> = snapshot.committees().iter().map(|c| &c.id).collect();

        for committee in snapshot.committees() {
            let derived = derive_duration(&committee.id, snapshot.members());
            if committee.duration_months != derived {
                violations.push(Violation {
                    kind: ViolationKind::DurationMismatch,
                    entity: committee.id.to_string(),
                    description: format!(
                        "stored duration {} but members derive {derived}",
                        committee.duration_months
                    ),
                });
            }
            let draws = snapshot.draws_of(&committee.id).len();
            if draws > committee.duration_months as usize {
                violations.push(Violation {
                    kind: ViolationKind::DrawsExceedDuration,
                    entity: committee.id.to_string(),
                    description: format!(
                        "{draws} draws recorded but only {} payout slots",
                        committee.duration_months
                    ),
                });
            }
            check_pairs(snapshot, &committee.id, &mut violations);
        }

        for member in snapshot.members() {
            if !known.contains(&member.committee_id) {
                violations.push(dangling("member", member.id.as_str(), &member.committee_id));
            }
            if member.is_half() && member.pair_id.is_none() {
                violations.push(Violation {
                    kind: ViolationKind::MissingPairId,
                    entity: member.id.to_string(),
                    description: "half-share member without pair id".into(),
                });
            }
            if !member.is_half() && member.pair_id.is_some() {
                violations.push(Violation {
                    kind: ViolationKind::StrayPairId,
                    entity: member.id.to_string(),
                    description: "full-share member carries a pair id".into(),
                });
            }
        }

        let mut payment_keys: BTreeSet<(&CommitteeId, &PayerId, MonthYear)> = BTreeSet::new();
        for payment in snapshot.payments() {
            if !known.contains(&payment.committee_id) {
                violations.push(dangling("payment", payment.id.as_str(), &payment.committee_id));
            }
            if !payment_keys.insert((&payment.committee_id, &payment.payer, payment.month_year)) {
                violations.push(Violation {
                    kind: ViolationKind::DuplicatePayment,
                    entity: payment.id.to_string(),
                    description: format!(
                        "second payment for {} in {}",
                        payment.payer, payment.month_year
                    ),
                });
            }
            let expected = LateAssessment::assess(payment.month_year, payment.date_paid, due_day);
            if payment.late_days != expected.late_days
                || payment.demerit_points != expected.demerit_points
            {
                violations.push(Violation {
                    kind: ViolationKind::DerivedFieldMismatch,
                    entity: payment.id.to_string(),
                    description: format!(
                        "stored {}/{} late days/demerits, expected {}/{}",
                        payment.late_days,
                        payment.demerit_points,
                        expected.late_days,
                        expected.demerit_points
                    ),
                });
            }
        }

        let mut winners: BTreeSet<(&CommitteeId, &PayerId)> = BTreeSet::new();
        for draw in snapshot.draws() {
            if !known.contains(&draw.committee_id) {
                violations.push(dangling("draw", draw.id.as_str(), &draw.committee_id));
            }
            if !winners.insert((&draw.committee_id, &draw.winner)) {
                violations.push(Violation {
                    kind: ViolationKind::RepeatWinner,
                    entity: draw.id.to_string(),
                    description: format!("{} already won in this committee", draw.winner),
                });
            }
        }

        ValidationReport {
            committees_checked: snapshot.committees().len(),
            violations,
        }
    }
}

fn dangling(what: &str, id: &str, committee: &CommitteeId) -> Violation {
    Violation {
        kind: ViolationKind::DanglingCommittee,
        entity: id.to_string(),
        description: format!("{what} references missing committee {committee}"),
    }
}

fn check_pairs(snapshot: &Snapshot, committee: &CommitteeId, violations: &mut Vec<Violation>) {
    let groups: BTreeMap<&MemberId, Vec<_>> = pair_groups(committee, snapshot.members());
    for (key, group) in groups {
        match group.as_slice() {
            [single] => {
                if &single.id != key {
                    violations.push(Violation {
                        kind: ViolationKind::AsymmetricPair,
                        entity: single.id.to_string(),
                        description: format!("pair id {key} is not reciprocated"),
                    });
                }
            }
            [a, b] => {
                if key != &MemberId::canonical_pair(&a.id, &b.id) {
                    violations.push(Violation {
                        kind: ViolationKind::NonCanonicalPair,
                        entity: key.to_string(),
                        description: format!(
                            "pair of {} and {} is not keyed by the smaller id",
                            a.id, b.id
                        ),
                    });
                }
            }
            _ => violations.push(Violation {
                kind: ViolationKind::OversizedPair,
                entity: key.to_string(),
                description: format!("{} members share one pair id", group.len()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rosca_types::{
        Amount, Committee, Draw, DrawId, Member, Payment, PaymentId, ShareType,
    };

    use super::*;

    fn id(s: &str) -> MemberId {
        MemberId::parse(s).unwrap()
    }

    fn committee(duration: u32) -> Committee {
        Committee {
            id: CommitteeId::parse("c").unwrap(),
            name: "C".into(),
            monthly_amount: Amount::new(100),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            duration_months: duration,
            allow_half_share: true,
        }
    }

    fn member(s: &str, share_type: ShareType, pair: Option<&str>) -> Member {
        Member {
            id: id(s),
            committee_id: CommitteeId::parse("c").unwrap(),
            name: s.into(),
            phone: String::new(),
            share_type,
            pair_id: pair.map(id),
        }
    }

    fn payment(pid: &str, payer: &str, late_days: u32) -> Payment {
        Payment {
            id: PaymentId::parse(pid).unwrap(),
            committee_id: CommitteeId::parse("c").unwrap(),
            payer: id(payer),
            month_year: "2024-01".parse().unwrap(),
            amount: Amount::new(100),
            date_paid: NaiveDate::from_ymd_opt(2024, 1, 12).unwrap(),
            late_days,
            demerit_points: late_days,
        }
    }

    fn kinds(report: &ValidationReport) -> Vec<ViolationKind> {
        report.violations.iter().map(|v| v.kind).collect()
    }

    #[test]
    fn consistent_snapshot_passes() {
        let snapshot = Snapshot::from_parts(
            vec![committee(2)],
            vec![
                member("f", ShareType::Full, None),
                member("a", ShareType::Half, Some("a")),
                member("b", ShareType::Half, Some("a")),
                member("z", ShareType::Half, Some("z")),
            ],
            vec![payment("p", "f", 2)],
            vec![],
        );
        let report = SnapshotValidator::validate(&snapshot, 10);
        assert!(report.is_valid(), "{:?}", report.violations);
        assert_eq!(report.committees_checked, 1);
    }

    #[test]
    fn detects_duration_mismatch() {
        let snapshot = Snapshot::from_parts(
            vec![committee(3)],
            vec![member("f", ShareType::Full, None)],
            vec![],
            vec![],
        );
        let report = SnapshotValidator::validate(&snapshot, 10);
        assert_eq!(kinds(&report), vec![ViolationKind::DurationMismatch]);
    }

    #[test]
    fn detects_pairing_defects() {
        let snapshot = Snapshot::from_parts(
            vec![committee(1)],
            vec![
                member("a", ShareType::Half, Some("b")),
                member("b", ShareType::Half, Some("b")),
                member("x", ShareType::Half, Some("q")),
                member("m", ShareType::Half, None),
            ],
            vec![],
            vec![],
        );
        let report = SnapshotValidator::validate(&snapshot, 10);
        let kinds = kinds(&report);
        assert!(kinds.contains(&ViolationKind::NonCanonicalPair));
        assert!(kinds.contains(&ViolationKind::AsymmetricPair));
        assert!(kinds.contains(&ViolationKind::MissingPairId));
    }

    #[test]
    fn detects_oversized_pair() {
        let snapshot = Snapshot::from_parts(
            vec![committee(0)],
            vec![
                member("a", ShareType::Half, Some("a")),
                member("b", ShareType::Half, Some("a")),
                member("c", ShareType::Half, Some("a")),
            ],
            vec![],
            vec![],
        );
        let report = SnapshotValidator::validate(&snapshot, 10);
        assert_eq!(kinds(&report), vec![ViolationKind::OversizedPair]);
    }

    #[test]
    fn detects_payment_and_draw_defects() {
        let draw = |did: &str| Draw {
            id: DrawId::parse(did).unwrap(),
            committee_id: CommitteeId::parse("c").unwrap(),
            month_year: "2024-01".parse().unwrap(),
            winner: id("f"),
            payout_date: NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(),
            amount: Amount::new(100),
        };
        let mut orphan = payment("p3", "f", 2);
        orphan.committee_id = CommitteeId::parse("gone").unwrap();
        let snapshot = Snapshot::from_parts(
            vec![committee(1)],
            vec![member("f", ShareType::Full, None)],
            vec![payment("p1", "f", 2), payment("p2", "f", 7), orphan],
            vec![draw("d1"), draw("d2")],
        );
        let report = SnapshotValidator::validate(&snapshot, 10);
        let kinds = kinds(&report);
        assert!(kinds.contains(&ViolationKind::DuplicatePayment));
        assert!(kinds.contains(&ViolationKind::DerivedFieldMismatch));
        assert!(kinds.contains(&ViolationKind::DanglingCommittee));
        assert!(kinds.contains(&ViolationKind::RepeatWinner));
    }

    #[test]
    fn detects_draws_beyond_duration() {
        let draw = |did: &str, month: &str, winner: &str| Draw {
            id: DrawId::parse(did).unwrap(),
            committee_id: CommitteeId::parse("c").unwrap(),
            month_year: month.parse().unwrap(),
            winner: id(winner),
            payout_date: NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(),
            amount: Amount::new(100),
        };
        let snapshot = Snapshot::from_parts(
            vec![committee(1)],
            vec![member("b", ShareType::Full, None)],
            vec![],
            vec![draw("d1", "2024-01", "a"), draw("d2", "2024-02", "b")],
        );
        let report = SnapshotValidator::validate(&snapshot, 10);
        assert_eq!(kinds(&report), vec![ViolationKind::DrawsExceedDuration]);
    }

    #[test]
    fn detects_pair_id_on_full_member() {
        let snapshot = Snapshot::from_parts(
            vec![committee(1)],
            vec![member("f", ShareType::Full, Some("f"))],
            vec![],
            vec![],
        );
        let report = SnapshotValidator::validate(&snapshot, 10);
        assert_eq!(kinds(&report), vec![ViolationKind::StrayPairId]);
    }
}
