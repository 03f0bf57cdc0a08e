//! Mutation rules applied to a draft snapshot.
//!
//! Each function edits the draft in place and either succeeds or returns a
//! rejection. The engine only swaps the draft in on success, so a rejection
//! midway through a function never becomes visible.

use chrono::NaiveDate;
use rosca_types::{
    Amount, Committee, CommitteeId, Draw, DrawId, Member, MemberId, MonthYear, PayerId, Payment,
    PaymentId, ShareType,
};

use crate::draw::{next_draw_month, payout_amount, winners};
use crate::duration::derive_duration;
use crate::error::{LedgerError, LedgerResult};
use crate::pairing;
use crate::payer::{payer_row_of, resolve_payer, PayerKind, PayerRow};
use crate::penalty::LateAssessment;
use crate::snapshot::Snapshot;
use crate::traits::LedgerReader;

/// Caller-supplied fields of a committee.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitteeInput {
    pub name: String,
    pub monthly_amount: Amount,
    pub start_date: NaiveDate,
    pub allow_half_share: bool,
}

/// Caller-supplied fields of a member. `partner` is only consulted for HALF
/// members.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberInput {
    pub name: String,
    pub phone: String,
    pub share_type: ShareType,
    pub partner: Option<MemberId>,
}

/// Caller-supplied fields of a payment. Lateness and demerits are derived.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentInput {
    pub payer: PayerId,
    pub month_year: MonthYear,
    pub amount: Amount,
    pub date_paid: NaiveDate,
}

/// Caller-supplied fields of a draw. The payout amount is derived; a missing
/// month means "next in sequence" for a new draw and "unchanged" for an edit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrawInput {
    pub month_year: Option<MonthYear>,
    pub winner: PayerId,
    pub payout_date: NaiveDate,
}

fn required(field: &'static str, value: &str) -> LedgerResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

fn positive(field: &'static str, amount: Amount) -> LedgerResult<Amount> {
    if amount.is_zero() {
        return Err(LedgerError::Invalid {
            field,
            reason: "must be greater than zero".into(),
        });
    }
    Ok(amount)
}

fn committee_of<'a>(draft: &'a Snapshot, id: &CommitteeId) -> LedgerResult<&'a Committee> {
    draft
        .committee(id)
        .ok_or_else(|| LedgerError::CommitteeNotFound(id.clone()))
}

// ---- Committees ----

pub fn add_committee(draft: &mut Snapshot, input: CommitteeInput) -> LedgerResult<Committee> {
    let committee = Committee {
        id: CommitteeId::generate(),
        name: required("name", &input.name)?,
        monthly_amount: positive("monthly amount", input.monthly_amount)?,
        start_date: input.start_date,
        duration_months: 0,
        allow_half_share: input.allow_half_share,
    };
    draft.committees_mut().push(committee.clone());
    Ok(committee)
}

pub fn update_committee(
    draft: &mut Snapshot,
    id: &CommitteeId,
    input: CommitteeInput,
) -> LedgerResult<Committee> {
    let name = required("name", &input.name)?;
    let monthly_amount = positive("monthly amount", input.monthly_amount)?;
    let current = committee_of(draft, id)?;

    if current.allow_half_share && !input.allow_half_share {
        let count = draft
            .members_of(id)
            .iter()
            .filter(|m| m.is_half())
            .count();
        if count > 0 {
            return Err(LedgerError::HalfShareMembersExist {
                committee: id.clone(),
                count,
            });
        }
    }

    let committee = draft
        .committee_mut(id)
        .ok_or_else(|| LedgerError::CommitteeNotFound(id.clone()))?;
    committee.name = name;
    committee.monthly_amount = monthly_amount;
    committee.start_date = input.start_date;
    committee.allow_half_share = input.allow_half_share;
    Ok(committee.clone())
}

pub fn delete_committee(draft: &mut Snapshot, id: &CommitteeId) -> LedgerResult<()> {
    committee_of(draft, id)?;
    draft.committees_mut().retain(|c| &c.id != id);
    draft.members_mut().retain(|m| &m.committee_id != id);
    draft.payments_mut().retain(|p| &p.committee_id != id);
    draft.draws_mut().retain(|d| &d.committee_id != id);
    Ok(())
}

// ---- Members ----

/// Recompute the committee's duration from its members, refusing to drop it
/// below the number of draws already recorded.
fn refresh_duration(draft: &mut Snapshot, id: &CommitteeId) -> LedgerResult<u32> {
    let derived = derive_duration(id, draft.members());
    let draws = draft.draws_of(id).len();
    if (derived as usize) < draws {
        return Err(LedgerError::DurationBelowDraws {
            committee: id.clone(),
            derived,
            draws,
        });
    }
    let committee = draft
        .committee_mut(id)
        .ok_or_else(|| LedgerError::CommitteeNotFound(id.clone()))?;
    committee.duration_months = derived;
    Ok(derived)
}

fn member_of(draft: &Snapshot, id: &MemberId) -> LedgerResult<Member> {
    draft
        .member(id)
        .cloned()
        .ok_or_else(|| LedgerError::MemberNotFound(id.clone()))
}

/// The winning payer row `member` belongs to, if any.
fn winning_row_of(
    draft: &Snapshot,
    committee: &CommitteeId,
    member: &MemberId,
) -> Option<PayerRow> {
    let row = payer_row_of(draft, committee, member)?;
    winners(draft, committee, None).contains(&row.id).then_some(row)
}

pub fn add_member(
    draft: &mut Snapshot,
    committee_id: &CommitteeId,
    input: MemberInput,
) -> LedgerResult<Member> {
    let committee = committee_of(draft, committee_id)?;
    if input.share_type == ShareType::Half && !committee.allow_half_share {
        return Err(LedgerError::HalfShareNotAllowed {
            committee: committee_id.clone(),
        });
    }

    let id = MemberId::generate();
    let member = Member {
        pair_id: (input.share_type == ShareType::Half).then(|| id.clone()),
        id: id.clone(),
        committee_id: committee_id.clone(),
        name: required("name", &input.name)?,
        phone: input.phone.trim().to_string(),
        share_type: input.share_type,
    };
    draft.members_mut().push(member);
    pairing::link(draft.members_mut(), &id, input.partner.as_ref());
    refresh_duration(draft, committee_id)?;
    member_of(draft, &id)
}

/// Edit a member. A previous pairing is dissolved before the new pairing
/// request is applied.
pub fn update_member(
    draft: &mut Snapshot,
    id: &MemberId,
    input: MemberInput,
) -> LedgerResult<Member> {
    let current = member_of(draft, id)?;
    let committee = committee_of(draft, &current.committee_id)?;
    if input.share_type == ShareType::Half && !committee.allow_half_share {
        return Err(LedgerError::HalfShareNotAllowed {
            committee: current.committee_id.clone(),
        });
    }
    let name = required("name", &input.name)?;
    let won = winning_row_of(draft, &current.committee_id, id);

    pairing::unlink(draft.members_mut(), id);
    let member = draft
        .member_mut(id)
        .ok_or_else(|| LedgerError::MemberNotFound(id.clone()))?;
    member.name = name;
    member.phone = input.phone.trim().to_string();
    member.share_type = input.share_type;
    member.pair_id = (input.share_type == ShareType::Half).then(|| id.clone());

    pairing::link(draft.members_mut(), id, input.partner.as_ref());

    // A share that has been paid out keeps its id and members.
    if let Some(row) = won {
        let after = payer_row_of(draft, &current.committee_id, id);
        if after.map(|a| (a.id, a.kind)) != Some((row.id.clone(), row.kind)) {
            return Err(LedgerError::WinnerLocked {
                committee: current.committee_id.clone(),
                payer: row.id,
            });
        }
    }
    refresh_duration(draft, &current.committee_id)?;
    member_of(draft, id)
}

/// Remove a member, releasing its partner back to the unpaired state.
pub fn delete_member(draft: &mut Snapshot, id: &MemberId) -> LedgerResult<()> {
    let current = member_of(draft, id)?;
    if let Some(row) = winning_row_of(draft, &current.committee_id, id) {
        if matches!(row.kind, PayerKind::Pair { .. }) {
            return Err(LedgerError::WinnerLocked {
                committee: current.committee_id.clone(),
                payer: row.id,
            });
        }
    }
    pairing::unlink(draft.members_mut(), id);
    draft.members_mut().retain(|m| &m.id != id);
    refresh_duration(draft, &current.committee_id)?;
    Ok(())
}

// ---- Payments ----

fn check_payment_slot(
    draft: &Snapshot,
    committee: &CommitteeId,
    input: &PaymentInput,
    excluding: Option<&PaymentId>,
) -> LedgerResult<()> {
    if resolve_payer(draft, committee, &input.payer).is_none() {
        return Err(LedgerError::UnknownPayer {
            committee: committee.clone(),
            payer: input.payer.clone(),
        });
    }
    let taken = draft.payments_of(committee).into_iter().any(|p| {
        Some(&p.id) != excluding && p.payer == input.payer && p.month_year == input.month_year
    });
    if taken {
        return Err(LedgerError::DuplicatePayment {
            payer: input.payer.clone(),
            month: input.month_year,
        });
    }
    Ok(())
}

pub fn add_payment(
    draft: &mut Snapshot,
    committee_id: &CommitteeId,
    input: PaymentInput,
    due_day: u32,
) -> LedgerResult<Payment> {
    committee_of(draft, committee_id)?;
    let amount = positive("amount", input.amount)?;
    check_payment_slot(draft, committee_id, &input, None)?;

    let late = LateAssessment::assess(input.month_year, input.date_paid, due_day);
    let payment = Payment {
        id: PaymentId::generate(),
        committee_id: committee_id.clone(),
        payer: input.payer,
        month_year: input.month_year,
        amount,
        date_paid: input.date_paid,
        late_days: late.late_days,
        demerit_points: late.demerit_points,
    };
    draft.payments_mut().push(payment.clone());
    Ok(payment)
}

pub fn update_payment(
    draft: &mut Snapshot,
    id: &PaymentId,
    input: PaymentInput,
    due_day: u32,
) -> LedgerResult<Payment> {
    let committee_id = draft
        .payment(id)
        .map(|p| p.committee_id.clone())
        .ok_or_else(|| LedgerError::PaymentNotFound(id.clone()))?;
    let amount = positive("amount", input.amount)?;
    check_payment_slot(draft, &committee_id, &input, Some(id))?;

    let late = LateAssessment::assess(input.month_year, input.date_paid, due_day);
    let payment = draft
        .payment_mut(id)
        .ok_or_else(|| LedgerError::PaymentNotFound(id.clone()))?;
    payment.payer = input.payer;
    payment.month_year = input.month_year;
    payment.amount = amount;
    payment.date_paid = input.date_paid;
    payment.late_days = late.late_days;
    payment.demerit_points = late.demerit_points;
    Ok(payment.clone())
}

pub fn delete_payment(draft: &mut Snapshot, id: &PaymentId) -> LedgerResult<()> {
    if draft.payment(id).is_none() {
        return Err(LedgerError::PaymentNotFound(id.clone()));
    }
    draft.payments_mut().retain(|p| &p.id != id);
    Ok(())
}

// ---- Draws ----

fn check_draw_slot(
    draft: &Snapshot,
    committee: &CommitteeId,
    winner: &PayerId,
    month: MonthYear,
    excluding: Option<&DrawId>,
) -> LedgerResult<()> {
    if resolve_payer(draft, committee, winner).is_none() {
        return Err(LedgerError::UnknownPayer {
            committee: committee.clone(),
            payer: winner.clone(),
        });
    }
    if winners(draft, committee, excluding).contains(winner) {
        return Err(LedgerError::AlreadyWon {
            committee: committee.clone(),
            winner: winner.clone(),
        });
    }
    let month_taken = draft
        .draws_of(committee)
        .into_iter()
        .any(|d| Some(&d.id) != excluding && d.month_year == month);
    if month_taken {
        return Err(LedgerError::DuplicateDraw {
            committee: committee.clone(),
            month,
        });
    }
    Ok(())
}

pub fn add_draw(
    draft: &mut Snapshot,
    committee_id: &CommitteeId,
    input: DrawInput,
) -> LedgerResult<Draw> {
    let committee = committee_of(draft, committee_id)?;
    let amount = payout_amount(committee)?;
    if draft.draws_of(committee_id).len() >= committee.duration_months as usize {
        return Err(LedgerError::DrawsExhausted {
            committee: committee_id.clone(),
            duration: committee.duration_months,
        });
    }
    let month = match input.month_year {
        Some(month) => month,
        None => next_draw_month(draft, committee_id)?,
    };
    check_draw_slot(draft, committee_id, &input.winner, month, None)?;

    let draw = Draw {
        id: DrawId::generate(),
        committee_id: committee_id.clone(),
        month_year: month,
        winner: input.winner,
        payout_date: input.payout_date,
        amount,
    };
    draft.draws_mut().push(draw.clone());
    Ok(draw)
}

pub fn update_draw(draft: &mut Snapshot, id: &DrawId, input: DrawInput) -> LedgerResult<Draw> {
    let current = draft
        .draw(id)
        .cloned()
        .ok_or_else(|| LedgerError::DrawNotFound(id.clone()))?;
    let amount = payout_amount(committee_of(draft, &current.committee_id)?)?;
    let month = input.month_year.unwrap_or(current.month_year);
    check_draw_slot(draft, &current.committee_id, &input.winner, month, Some(id))?;

    let draw = draft
        .draw_mut(id)
        .ok_or_else(|| LedgerError::DrawNotFound(id.clone()))?;
    draw.month_year = month;
    draw.winner = input.winner;
    draw.payout_date = input.payout_date;
    draw.amount = amount;
    Ok(draw.clone())
}

pub fn delete_draw(draft: &mut Snapshot, id: &DrawId) -> LedgerResult<()> {
    if draft.draw(id).is_none() {
        return Err(LedgerError::DrawNotFound(id.clone()));
    }
    draft.draws_mut().retain(|d| &d.id != id);
    Ok(())
}
