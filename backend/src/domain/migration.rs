//! Conversion between stored records and domain models.
//!
//! Stored records use the interchange shape from the `shared` crate. Records
//! written by older versions are upcast here: expenses saved without a
//! `category` get one inferred from their `type`, recurrence flags on
//! anything other than a credit expense are dropped, and goals with a flat
//! `monthlyTarget` become fixed-amount goals.

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{
    ContributionType, FinanceSettings, Goal, GoalContribution, Transaction, TransactionCategory,
    TransactionType,
};

use super::error::ValidationError;
use super::models::transaction::resolve_start;
use super::models::{
    ContributionPolicy, DomainContribution, DomainGoal, DomainSettings, DomainTransaction, Period,
    Recurrence, TransactionKind,
};

/// A stored collection split into the entries that parsed, each with its raw
/// value, and the raw entries that did not.
#[derive(Debug)]
pub struct Decoded<T> {
    pub records: Vec<(T, Value)>,
    pub unreadable: Vec<Value>,
}

impl<T> Default for Decoded<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            unreadable: Vec::new(),
        }
    }
}

impl<T> Decoded<T> {
    /// Convert every parsed record. The raw value of a record that fails to
    /// convert joins `unreadable` so it can be written back unchanged.
    pub fn convert<D>(
        self,
        key: &str,
        id: impl Fn(&T) -> &str,
        convert: impl Fn(&T) -> Result<D, ValidationError>,
    ) -> (Vec<D>, Vec<Value>) {
        let mut unreadable = self.unreadable;
        let mut converted = Vec::with_capacity(self.records.len());
        for (record, value) in self.records {
            match convert(&record) {
                Ok(item) => converted.push(item),
                Err(e) => {
                    warn!("Keeping unreadable record {} under {}: {}", id(&record), key, e);
                    unreadable.push(value);
                }
            }
        }
        (converted, unreadable)
    }
}

/// Decode a stored JSON array, setting aside entries that do not parse.
///
/// A value that is not an array at all is an error: overwriting it on the
/// next write would silently lose data.
pub fn decode_collection<T: DeserializeOwned>(key: &str, raw: &str) -> Result<Decoded<T>> {
    let values: Vec<Value> = serde_json::from_str(raw)
        .with_context(|| format!("stored value under {} is not a JSON array", key))?;

    let mut decoded = Decoded {
        records: Vec::with_capacity(values.len()),
        unreadable: Vec::new(),
    };
    for (index, value) in values.into_iter().enumerate() {
        match T::deserialize(&value) {
            Ok(record) => decoded.records.push((record, value)),
            Err(e) => {
                warn!("Keeping unreadable record {} under {}: {}", index, key, e);
                decoded.unreadable.push(value);
            }
        }
    }
    Ok(decoded)
}

pub fn transaction_from_record(record: &Transaction) -> Result<DomainTransaction, ValidationError> {
    let category = record.category.unwrap_or(match record.transaction_type {
        TransactionType::Income => TransactionCategory::Income,
        TransactionType::Credit | TransactionType::Debit => TransactionCategory::Expense,
    });

    let mut kind = TransactionKind::pair(category, record.transaction_type)?;
    if record.is_recurring {
        if let TransactionKind::Credit { recurrence } = &mut kind {
            *recurrence = Some(Recurrence {
                due_day: record.due_day,
                months: record.recurring_months,
                // Older versions stored 0 for "no start"
                start: resolve_start(
                    record.start_month.filter(|m| *m != 0),
                    record.start_year.filter(|y| *y != 0),
                    record.date,
                )?,
            });
        } else {
            debug!("Ignoring recurrence on {} transaction {}", record.transaction_type, record.id);
        }
    }

    Ok(DomainTransaction {
        id: record.id.clone(),
        description: record.description.clone(),
        amount: record.amount,
        date: record.date,
        kind,
    })
}

pub fn transaction_to_record(transaction: &DomainTransaction) -> Transaction {
    let recurrence = transaction.kind.recurrence();
    Transaction {
        id: transaction.id.clone(),
        description: transaction.description.clone(),
        amount: transaction.amount,
        date: transaction.date,
        category: Some(transaction.kind.category()),
        transaction_type: transaction.kind.transaction_type(),
        is_recurring: recurrence.is_some(),
        due_day: recurrence.and_then(|r| r.due_day),
        recurring_months: recurrence.and_then(|r| r.months),
        start_month: recurrence.and_then(|r| r.start).map(|p| p.month),
        start_year: recurrence.and_then(|r| r.start).map(|p| p.year),
    }
}

/// Whether a stored goal still uses the flat `monthlyTarget` shape
pub fn is_legacy_goal(record: &Goal) -> bool {
    record.contribution_type.is_none() || record.contribution_value.is_none()
}

pub fn goal_from_record(record: &Goal) -> Result<DomainGoal, ValidationError> {
    let policy = match (
        record.contribution_type,
        record.contribution_value,
        record.monthly_target,
    ) {
        (Some(contribution_type), Some(value), _) => {
            ContributionPolicy::from_parts(contribution_type, value)
        }
        (None, _, Some(monthly_target))
        | (Some(ContributionType::Fixed), None, Some(monthly_target)) => {
            ContributionPolicy::Fixed(monthly_target)
        }
        _ => return Err(ValidationError::MissingContributionPolicy),
    };

    Ok(DomainGoal {
        id: record.id.clone(),
        name: record.name.clone(),
        total_target: record.total_target,
        policy,
        current_amount: record.current_amount,
        is_active: record.is_active,
        created_at: record.created_at,
    })
}

pub fn goal_to_record(goal: &DomainGoal) -> Goal {
    Goal {
        id: goal.id.clone(),
        name: goal.name.clone(),
        total_target: goal.total_target,
        contribution_type: Some(goal.policy.contribution_type()),
        contribution_value: Some(goal.policy.value()),
        monthly_target: None,
        current_amount: goal.current_amount,
        is_active: goal.is_active,
        created_at: goal.created_at,
    }
}

pub fn contribution_from_record(
    record: &GoalContribution,
) -> Result<DomainContribution, ValidationError> {
    Ok(DomainContribution {
        id: record.id.clone(),
        goal_id: record.goal_id.clone(),
        amount: record.amount,
        period: Period::new(record.month, record.year)?,
        is_complete: record.is_complete,
        date: record.date,
    })
}

pub fn contribution_to_record(contribution: &DomainContribution) -> GoalContribution {
    GoalContribution {
        id: contribution.id.clone(),
        goal_id: contribution.goal_id.clone(),
        amount: contribution.amount,
        month: contribution.period.month,
        year: contribution.period.year,
        is_complete: contribution.is_complete,
        date: contribution.date,
    }
}

pub fn settings_from_record(record: &FinanceSettings) -> DomainSettings {
    DomainSettings {
        goal_contribution_day: record.goal_contribution_day,
    }
}

pub fn settings_to_record(settings: &DomainSettings) -> FinanceSettings {
    FinanceSettings {
        goal_contribution_day: settings.goal_contribution_day,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn legacy_expense(transaction_type: TransactionType, is_recurring: bool) -> Transaction {
        Transaction {
            id: "1700000000000".to_string(),
            description: "Phone".to_string(),
            amount: 90.0,
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            category: None,
            transaction_type,
            is_recurring,
            due_day: Some(10),
            recurring_months: Some(12),
            start_month: None,
            start_year: None,
        }
    }

    #[test]
    fn test_legacy_expense_gets_category() {
        let t = transaction_from_record(&legacy_expense(TransactionType::Debit, false)).unwrap();
        assert_eq!(t.kind, TransactionKind::Debit);
        assert_eq!(transaction_to_record(&t).category, Some(TransactionCategory::Expense));

        let t = transaction_from_record(&legacy_expense(TransactionType::Income, false)).unwrap();
        assert_eq!(t.kind, TransactionKind::Income);
    }

    #[test]
    fn test_recurrence_ignored_on_debit() {
        let t = transaction_from_record(&legacy_expense(TransactionType::Debit, true)).unwrap();
        assert_eq!(t.kind, TransactionKind::Debit);

        let record = transaction_to_record(&t);
        assert!(!record.is_recurring);
        assert_eq!(record.due_day, None);
        assert_eq!(record.recurring_months, None);
    }

    #[test]
    fn test_recurring_credit_round_trip() {
        let mut record = legacy_expense(TransactionType::Credit, true);
        record.category = Some(TransactionCategory::Expense);
        record.start_month = Some(2);
        record.start_year = Some(2024);

        let t = transaction_from_record(&record).unwrap();
        let recurrence = t.kind.recurrence().unwrap();
        assert_eq!(recurrence.start, Some(Period::new(2, 2024).unwrap()));
        assert_eq!(transaction_to_record(&t), record);
    }

    #[test]
    fn test_mismatched_category_is_rejected() {
        let mut record = legacy_expense(TransactionType::Credit, false);
        record.category = Some(TransactionCategory::Income);
        assert!(matches!(
            transaction_from_record(&record),
            Err(ValidationError::CategoryTypeMismatch { .. })
        ));
    }

    fn goal_record() -> Goal {
        Goal {
            id: "goal-1".to_string(),
            name: "Trip".to_string(),
            total_target: 1000.0,
            contribution_type: None,
            contribution_value: None,
            monthly_target: Some(150.0),
            current_amount: 300.0,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_legacy_goal_becomes_fixed() {
        let record = goal_record();
        assert!(is_legacy_goal(&record));

        let goal = goal_from_record(&record).unwrap();
        assert_eq!(goal.policy, ContributionPolicy::Fixed(150.0));
        assert_eq!(goal.current_amount, 300.0);

        let upgraded = goal_to_record(&goal);
        assert!(!is_legacy_goal(&upgraded));
        assert_eq!(upgraded.contribution_type, Some(ContributionType::Fixed));
        assert_eq!(upgraded.contribution_value, Some(150.0));
        assert_eq!(upgraded.monthly_target, None);
    }

    #[test]
    fn test_goal_without_any_policy_is_rejected() {
        let mut record = goal_record();
        record.monthly_target = None;
        assert_eq!(
            goal_from_record(&record),
            Err(ValidationError::MissingContributionPolicy)
        );

        record.contribution_type = Some(ContributionType::Percentage);
        assert_eq!(
            goal_from_record(&record),
            Err(ValidationError::MissingContributionPolicy)
        );
    }

    #[test]
    fn test_contribution_with_bad_month_is_rejected() {
        let record = GoalContribution {
            id: "c1".to_string(),
            goal_id: "goal-1".to_string(),
            amount: 10.0,
            month: 13,
            year: 2024,
            is_complete: true,
            date: Utc::now(),
        };
        assert_eq!(
            contribution_from_record(&record),
            Err(ValidationError::MonthOutOfRange(13))
        );
    }

    #[test]
    fn test_decode_collection_keeps_bad_entries_aside() {
        let raw = r#"[
            {"id":"a","description":"Coffee","amount":5,"date":"2024-01-02","type":"debit"},
            {"id":"b","description":"Broken","amount":"five","date":"2024-01-02","type":"debit"}
        ]"#;
        let decoded: Decoded<Transaction> = decode_collection("@Fintra:transactions", raw).unwrap();
        assert_eq!(decoded.records.len(), 1);
        assert_eq!(decoded.records[0].0.id, "a");
        assert_eq!(decoded.unreadable.len(), 1);
        assert_eq!(decoded.unreadable[0]["amount"], "five");

        assert!(decode_collection::<Transaction>("@Fintra:transactions", "{}").is_err());
    }

    #[test]
    fn test_convert_keeps_raw_value_of_failed_records() {
        let raw = r#"[
            {"id":"a","description":"Coffee","amount":5,"date":"2024-01-02","type":"debit"},
            {"id":"b","description":"Salary","amount":5,"date":"2024-01-02","category":"income","type":"credit"}
        ]"#;
        let decoded: Decoded<Transaction> = decode_collection("@Fintra:transactions", raw).unwrap();
        let (transactions, unreadable) =
            decoded.convert("@Fintra:transactions", |r| r.id.as_str(), transaction_from_record);

        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].id, "a");
        assert_eq!(unreadable.len(), 1);
        assert_eq!(unreadable[0]["id"], "b");
    }

    #[test]
    fn test_zero_start_falls_back_to_registration_month() {
        let mut record = legacy_expense(TransactionType::Credit, true);
        record.start_month = Some(0);
        record.start_year = Some(0);

        let t = transaction_from_record(&record).unwrap();
        let recurrence = t.kind.recurrence().unwrap();
        assert_eq!(recurrence.start, None);
        assert_eq!(recurrence.start_or(t.date), Period::new(1, 2024).unwrap());
    }
}
