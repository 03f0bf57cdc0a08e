use std::collections::BTreeSet;

use rosca_types::{Amount, Committee, CommitteeId, DrawId, MonthYear, PayerId};

use crate::error::{LedgerError, LedgerResult};
use crate::payer::{payer_rows, PayerRow};
use crate::traits::LedgerReader;

/// Payers that have already won in a committee, optionally ignoring one draw
/// (the draw being edited).
pub fn winners<R: LedgerReader + ?Sized>(
    reader: &R,
    committee: &CommitteeId,
    excluding: Option<&DrawId>,
) -> BTreeSet<PayerId> {
    reader
        .draws_of(committee)
        .into_iter()
        .filter(|d| Some(&d.id) != excluding)
        .map(|d| d.winner.clone())
        .collect()
}

/// Payer rows that have not yet won a draw in the committee.
pub fn eligible_winners<R: LedgerReader + ?Sized>(
    reader: &R,
    committee: &CommitteeId,
) -> LedgerResult<Vec<PayerRow>> {
    if reader.committee(committee).is_none() {
        return Err(LedgerError::CommitteeNotFound(committee.clone()));
    }
    let won = winners(reader, committee, None);
    Ok(payer_rows(reader, committee)
        .into_iter()
        .filter(|row| !won.contains(&row.id))
        .collect())
}

/// The full pool each winner takes: monthly amount times duration.
pub fn payout_amount(committee: &Committee) -> LedgerResult<Amount> {
    committee.pool_amount().ok_or(LedgerError::AmountOverflow)
}

/// Month of the next draw: the start month advanced by the number of draws
/// already recorded.
pub fn next_draw_month<R: LedgerReader + ?Sized>(
    reader: &R,
    committee: &CommitteeId,
) -> LedgerResult<MonthYear> {
    let record = reader
        .committee(committee)
        .ok_or_else(|| LedgerError::CommitteeNotFound(committee.clone()))?;
    let recorded = u32::try_from(reader.draws_of(committee).len())
        .map_err(|_| LedgerError::MonthOutOfRange)?;
    record
        .start_month()
        .add_months(recorded)
        .ok_or(LedgerError::MonthOutOfRange)
}
