//! Monthly totals over the visible transactions.
//!
//! All functions are pure. The balance ignores goal contributions; the
//! available balance subtracts whatever was already contributed in the month.

use super::models::{DomainContribution, DomainTransaction, Period, TransactionKind};
use super::visibility::is_visible;

/// Transactions visible in `period`, in insertion order
pub fn transactions_for_month(
    transactions: &[DomainTransaction],
    period: Period,
) -> Vec<&DomainTransaction> {
    transactions
        .iter()
        .filter(|t| is_visible(t, period))
        .collect()
}

/// Sums over one month's visible transactions
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MonthTotals {
    pub total_income: f64,
    pub total_expenses: f64,
    pub debit_expenses: f64,
    pub credit_expenses: f64,
    pub transaction_count: usize,
}

impl MonthTotals {
    pub fn from_visible(visible: &[&DomainTransaction]) -> Self {
        visible.iter().fold(Self::default(), |mut totals, t| {
            match t.kind {
                TransactionKind::Income => totals.total_income += t.amount,
                TransactionKind::Debit => {
                    totals.total_expenses += t.amount;
                    totals.debit_expenses += t.amount;
                }
                TransactionKind::Credit { .. } => {
                    totals.total_expenses += t.amount;
                    totals.credit_expenses += t.amount;
                }
            }
            totals.transaction_count += 1;
            totals
        })
    }

    pub fn balance(&self, salary: f64) -> f64 {
        salary + self.total_income - self.total_expenses
    }
}

pub fn month_totals(transactions: &[DomainTransaction], period: Period) -> MonthTotals {
    MonthTotals::from_visible(&transactions_for_month(transactions, period))
}

/// salary + income - expenses for the month
pub fn balance(salary: f64, transactions: &[DomainTransaction], period: Period) -> f64 {
    month_totals(transactions, period).balance(salary)
}

/// Sum of the contributions already recorded for the month
pub fn contributed(contributions: &[DomainContribution], period: Period) -> f64 {
    contributions
        .iter()
        .filter(|c| c.period == period)
        .map(|c| c.amount)
        .sum()
}

pub fn available_balance(
    salary: f64,
    transactions: &[DomainTransaction],
    contributions: &[DomainContribution],
    period: Period,
) -> f64 {
    balance(salary, transactions, period) - contributed(contributions, period)
}

/// Everything the month view and the export summary report
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySummary {
    pub period: Period,
    pub salary: f64,
    pub totals: MonthTotals,
    pub balance: f64,
    pub contributed: f64,
    pub available_balance: f64,
}

pub fn monthly_summary(
    salary: f64,
    transactions: &[DomainTransaction],
    contributions: &[DomainContribution],
    period: Period,
) -> MonthlySummary {
    let totals = month_totals(transactions, period);
    let balance = totals.balance(salary);
    let contributed = contributed(contributions, period);
    MonthlySummary {
        period,
        salary,
        totals,
        balance,
        contributed,
        available_balance: balance - contributed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Recurrence;
    use chrono::{NaiveDate, Utc};

    fn period(month: u32, year: i32) -> Period {
        Period::new(month, year).unwrap()
    }

    fn transaction(id: &str, amount: f64, date: (i32, u32, u32), kind: TransactionKind) -> DomainTransaction {
        DomainTransaction {
            id: id.to_string(),
            description: id.to_string(),
            amount,
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            kind,
        }
    }

    fn contribution(goal_id: &str, amount: f64, period: Period) -> DomainContribution {
        DomainContribution {
            id: DomainContribution::generate_id(),
            goal_id: goal_id.to_string(),
            amount,
            period,
            is_complete: true,
            date: Utc::now(),
        }
    }

    fn sample() -> Vec<DomainTransaction> {
        vec![
            transaction("freelance", 500.0, (2024, 3, 2), TransactionKind::Income),
            transaction("groceries", 300.0, (2024, 3, 5), TransactionKind::Debit),
            transaction("old", 999.0, (2024, 2, 5), TransactionKind::Debit),
            transaction(
                "laptop",
                250.0,
                (2024, 1, 20),
                TransactionKind::Credit {
                    recurrence: Some(Recurrence {
                        due_day: Some(10),
                        months: Some(6),
                        start: Some(period(2, 2024)),
                    }),
                },
            ),
            transaction("dinner", 80.0, (2024, 3, 9), TransactionKind::Credit { recurrence: None }),
        ]
    }

    #[test]
    fn test_transactions_for_month_keeps_insertion_order() {
        let all = sample();
        let ids: Vec<&str> = transactions_for_month(&all, period(3, 2024))
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, vec!["freelance", "groceries", "laptop", "dinner"]);
    }

    #[test]
    fn test_month_totals() {
        let totals = month_totals(&sample(), period(3, 2024));
        assert_eq!(totals.total_income, 500.0);
        assert_eq!(totals.total_expenses, 630.0);
        assert_eq!(totals.debit_expenses, 300.0);
        assert_eq!(totals.credit_expenses, 330.0);
        assert_eq!(totals.transaction_count, 4);
    }

    #[test]
    fn test_balance_ignores_contributions() {
        let all = sample();
        let march = period(3, 2024);
        let before = balance(3000.0, &all, march);
        assert_eq!(before, 3000.0 + 500.0 - 630.0);

        let contributions = vec![contribution("goal::1", 400.0, march)];
        assert_eq!(balance(3000.0, &all, march), before);
        assert_eq!(available_balance(3000.0, &all, &contributions, march), before - 400.0);
    }

    #[test]
    fn test_contributed_only_counts_the_month() {
        let march = period(3, 2024);
        let contributions = vec![
            contribution("goal::1", 100.0, march),
            contribution("goal::2", 50.0, march),
            contribution("goal::1", 75.0, period(2, 2024)),
        ];
        assert_eq!(contributed(&contributions, march), 150.0);
        assert_eq!(contributed(&contributions, period(4, 2024)), 0.0);
    }

    #[test]
    fn test_empty_month() {
        let summary = monthly_summary(2000.0, &[], &[], period(7, 2030));
        assert_eq!(summary.balance, 2000.0);
        assert_eq!(summary.available_balance, 2000.0);
        assert_eq!(summary.totals, MonthTotals::default());
    }
}
