use chrono::NaiveDate;
use rosca_types::MonthYear;

/// Day of month on which a contribution falls due.
pub const DUE_DAY: u32 = 10;

/// Derived lateness of a single payment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LateAssessment {
    pub due_date: NaiveDate,
    pub late_days: u32,
    pub demerit_points: u32,
}

impl LateAssessment {
    pub fn assess(month: MonthYear, date_paid: NaiveDate, due_day: u32) -> Self {
        let due_date = month.day(due_day);
        let late_days = late_days(due_date, date_paid);
        Self {
            due_date,
            late_days,
            demerit_points: demerit_points(late_days),
        }
    }
}

/// Whole days between the due date and the payment date; zero when paid on
/// or before the due date.
pub fn late_days(due_date: NaiveDate, date_paid: NaiveDate) -> u32 {
    let days = date_paid.signed_duration_since(due_date).num_days();
    u32::try_from(days.max(0)).unwrap_or(u32::MAX)
}

/// One demerit point per day late.
pub fn demerit_points(late_days: u32) -> u32 {
    late_days
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paid(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn assess(month: &str, date_paid: NaiveDate) -> LateAssessment {
        LateAssessment::assess(month.parse().unwrap(), date_paid, DUE_DAY)
    }

    #[test]
    fn on_or_before_due_day_is_not_late() {
        assert_eq!(assess("2024-03", paid(2024, 3, 10)).late_days, 0);
        assert_eq!(assess("2024-03", paid(2024, 3, 1)).late_days, 0);
        assert_eq!(assess("2024-03", paid(2024, 2, 20)).late_days, 0);
    }

    #[test]
    fn day_after_due_is_one_day_late() {
        let a = assess("2024-03", paid(2024, 3, 11));
        assert_eq!(a.late_days, 1);
        assert_eq!(a.demerit_points, 1);
        assert_eq!(a.due_date, paid(2024, 3, 10));
    }

    #[test]
    fn thirty_days_late_across_month_boundary() {
        let a = assess("2024-03", paid(2024, 4, 9));
        assert_eq!(a.late_days, 30);
        assert_eq!(a.demerit_points, a.late_days);
    }

    #[test]
    fn leap_day_counts() {
        assert_eq!(assess("2024-02", paid(2024, 3, 1)).late_days, 20);
        assert_eq!(assess("2023-02", paid(2023, 3, 1)).late_days, 19);
    }

    #[test]
    fn custom_due_day_clamps_to_month_end() {
        let a = LateAssessment::assess("2023-02".parse().unwrap(), paid(2023, 3, 2), 31);
        assert_eq!(a.due_date, paid(2023, 2, 28));
        assert_eq!(a.late_days, 2);
    }
}
