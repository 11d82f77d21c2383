//! Decides which months a transaction counts toward.
//!
//! A recurring credit expense is visible for `months` consecutive calendar
//! months starting at its start period. Every other transaction is visible
//! only in the month of its registration date.

use super::models::{DomainTransaction, Period, TransactionKind};

pub fn is_visible(transaction: &DomainTransaction, period: Period) -> bool {
    match &transaction.kind {
        TransactionKind::Credit {
            recurrence: Some(recurrence),
        } => {
            let start = recurrence.start_or(transaction.date);
            let diff = period.index() - start.index();
            diff >= 0 && diff < i64::from(recurrence.months_or_default())
        }
        _ => period.contains(transaction.date),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Recurrence;
    use chrono::NaiveDate;

    fn period(month: u32, year: i32) -> Period {
        Period::new(month, year).unwrap()
    }

    fn transaction(date: NaiveDate, kind: TransactionKind) -> DomainTransaction {
        DomainTransaction {
            id: DomainTransaction::generate_id(),
            description: "Test".to_string(),
            amount: 100.0,
            date,
            kind,
        }
    }

    fn recurring(months: Option<u32>, start: Option<Period>) -> TransactionKind {
        TransactionKind::Credit {
            recurrence: Some(Recurrence {
                due_day: Some(10),
                months,
                start,
            }),
        }
    }

    #[test]
    fn test_non_recurring_visible_in_date_month_only() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        for kind in [
            TransactionKind::Income,
            TransactionKind::Debit,
            TransactionKind::Credit { recurrence: None },
        ] {
            let t = transaction(date, kind);
            assert!(is_visible(&t, period(2, 2024)));
            assert!(!is_visible(&t, period(3, 2024)));
            assert!(!is_visible(&t, period(2, 2023)));
        }
    }

    #[test]
    fn test_recurring_credit_window() {
        let t = transaction(
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            recurring(Some(3), Some(period(1, 2024))),
        );

        assert!(!is_visible(&t, period(12, 2023)));
        assert!(is_visible(&t, period(1, 2024)));
        assert!(is_visible(&t, period(2, 2024)));
        assert!(is_visible(&t, period(3, 2024)));
        assert!(!is_visible(&t, period(4, 2024)));
    }

    #[test]
    fn test_recurring_window_crosses_year_boundary() {
        let t = transaction(
            NaiveDate::from_ymd_opt(2023, 11, 3).unwrap(),
            recurring(Some(4), Some(period(11, 2023))),
        );

        assert!(is_visible(&t, period(12, 2023)));
        assert!(is_visible(&t, period(2, 2024)));
        assert!(!is_visible(&t, period(3, 2024)));
    }

    #[test]
    fn test_recurring_defaults_to_date_and_one_month() {
        let t = transaction(
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            recurring(None, None),
        );

        assert!(is_visible(&t, period(6, 2024)));
        assert!(!is_visible(&t, period(7, 2024)));
        assert!(!is_visible(&t, period(5, 2024)));
    }

    #[test]
    fn test_start_period_overrides_registration_date() {
        let t = transaction(
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            recurring(Some(2), Some(period(3, 2024))),
        );

        assert!(!is_visible(&t, period(1, 2024)));
        assert!(is_visible(&t, period(3, 2024)));
        assert!(is_visible(&t, period(4, 2024)));
    }
}
