use rosca_types::{CommitteeId, Draw, MonthYear, Payment};
use serde::Serialize;

use crate::draw::winners;
use crate::error::{LedgerError, LedgerResult};
use crate::payer::{payer_rows, PayerRow};
use crate::traits::LedgerReader;

/// Payments laid out as payer rows against the committee's months.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentGrid {
    pub committee: CommitteeId,
    pub months: Vec<MonthYear>,
    pub rows: Vec<GridRow>,
    /// Draw recorded for each month, aligned with `months`.
    pub draws: Vec<Option<Draw>>,
}

/// One payer with its payment for each month, aligned with the grid's months.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRow {
    pub payer: PayerRow,
    pub cells: Vec<Option<Payment>>,
    pub has_won: bool,
}

impl GridRow {
    pub fn paid_months(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

/// Payment record summary for one payer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayerStanding {
    pub payer: PayerRow,
    pub months_paid: usize,
    pub total_late_days: u64,
    pub total_demerits: u64,
    pub has_won: bool,
}

/// Deterministic read-only projections, recomputed from state on each call.
pub struct ProjectionBuilder;

impl ProjectionBuilder {
    pub fn grid<R: LedgerReader + ?Sized>(
        reader: &R,
        committee: &CommitteeId,
    ) -> LedgerResult<PaymentGrid> {
        let record = reader
            .committee(committee)
            .ok_or_else(|| LedgerError::CommitteeNotFound(committee.clone()))?;
        let months: Vec<MonthYear> = record
            .start_month()
            .range(record.duration_months)
            .collect();
        let payments = reader.payments_of(committee);
        let draws = reader.draws_of(committee);
        let won = winners(reader, committee, None);

        let rows = payer_rows(reader, committee)
            .into_iter()
            .map(|payer| {
                let cells = months
                    .iter()
                    .map(|month| {
                        payments
                            .iter()
                            .find(|p| p.payer == payer.id && &p.month_year == month)
                            .map(|p| (*p).clone())
                    })
                    .collect();
                GridRow {
                    has_won: won.contains(&payer.id),
                    payer,
                    cells,
                }
            })
            .collect();

        let draws = months
            .iter()
            .map(|month| {
                draws
                    .iter()
                    .find(|d| &d.month_year == month)
                    .map(|d| (*d).clone())
            })
            .collect();

        Ok(PaymentGrid {
            committee: committee.clone(),
            months,
            rows,
            draws,
        })
    }

    pub fn standings<R: LedgerReader + ?Sized>(
        reader: &R,
        committee: &CommitteeId,
    ) -> LedgerResult<Vec<PayerStanding>> {
        if reader.committee(committee).is_none() {
            return Err(LedgerError::CommitteeNotFound(committee.clone()));
        }
        let payments = reader.payments_of(committee);
        let won = winners(reader, committee, None);

        Ok(payer_rows(reader, committee)
            .into_iter()
            .map(|payer| {
                let own: Vec<&&Payment> = payments.iter().filter(|p| p.payer == payer.id).collect();
                PayerStanding {
                    months_paid: own.len(),
                    total_late_days: own.iter().map(|p| u64::from(p.late_days)).sum(),
                    total_demerits: own.iter().map(|p| u64::from(p.demerit_points)).sum(),
                    has_won: won.contains(&payer.id),
                    payer,
                }
            })
            .collect())
    }
}
