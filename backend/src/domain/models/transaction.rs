use chrono::NaiveDate;
use shared::{TransactionCategory, TransactionType};
use uuid::Uuid;

use super::period::Period;
use crate::domain::error::ValidationError;

pub const MAX_DESCRIPTION_LEN: usize = 256;

/// Credit-card cycle of a recurring credit expense.
///
/// Fields are optional because records saved by older versions may lack
/// them; `start_or` and `months_or_default` apply the fallbacks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recurrence {
    pub due_day: Option<u32>,
    pub months: Option<u32>,
    pub start: Option<Period>,
}

impl Recurrence {
    /// First visible month, falling back to the registration month
    pub fn start_or(&self, date: NaiveDate) -> Period {
        self.start.unwrap_or_else(|| Period::of(date))
    }

    pub fn months_or_default(&self) -> u32 {
        self.months.unwrap_or(1)
    }
}

/// Category and payment method in one. Only credit expenses can recur.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransactionKind {
    Income,
    Debit,
    Credit { recurrence: Option<Recurrence> },
}

impl TransactionKind {
    pub fn category(&self) -> TransactionCategory {
        match self {
            TransactionKind::Income => TransactionCategory::Income,
            TransactionKind::Debit | TransactionKind::Credit { .. } => TransactionCategory::Expense,
        }
    }

    pub fn transaction_type(&self) -> TransactionType {
        match self {
            TransactionKind::Income => TransactionType::Income,
            TransactionKind::Debit => TransactionType::Debit,
            TransactionKind::Credit { .. } => TransactionType::Credit,
        }
    }

    pub fn recurrence(&self) -> Option<&Recurrence> {
        match self {
            TransactionKind::Credit { recurrence } => recurrence.as_ref(),
            _ => None,
        }
    }

    /// Build a kind from user input, enforcing the pairing and recurrence rules
    #[allow(clippy::too_many_arguments)]
    pub fn from_input(
        category: TransactionCategory,
        transaction_type: TransactionType,
        is_recurring: bool,
        due_day: Option<u32>,
        recurring_months: Option<u32>,
        start_month: Option<u32>,
        start_year: Option<i32>,
        date: NaiveDate,
    ) -> Result<Self, ValidationError> {
        let kind = Self::pair(category, transaction_type)?;
        if !is_recurring {
            return Ok(kind);
        }
        if !matches!(kind, TransactionKind::Credit { .. }) {
            return Err(ValidationError::RecurrenceOnNonCredit);
        }

        let due_day = due_day.ok_or(ValidationError::MissingDueDay)?;
        let months = recurring_months.ok_or(ValidationError::MissingRecurringMonths)?;
        let recurrence = Recurrence {
            due_day: Some(due_day),
            months: Some(months),
            start: resolve_start(start_month, start_year, date)?,
        };
        recurrence_rules(&recurrence)?;

        Ok(TransactionKind::Credit {
            recurrence: Some(recurrence),
        })
    }

    /// Match a category with a payment method
    pub fn pair(
        category: TransactionCategory,
        transaction_type: TransactionType,
    ) -> Result<Self, ValidationError> {
        match (category, transaction_type) {
            (TransactionCategory::Income, TransactionType::Income) => Ok(TransactionKind::Income),
            (TransactionCategory::Expense, TransactionType::Debit) => Ok(TransactionKind::Debit),
            (TransactionCategory::Expense, TransactionType::Credit) => {
                Ok(TransactionKind::Credit { recurrence: None })
            }
            (category, transaction_type) => Err(ValidationError::CategoryTypeMismatch {
                category: category.to_string(),
                transaction_type: transaction_type.to_string(),
            }),
        }
    }
}

/// Resolve an optional start month/year, filling a missing half from `date`
pub fn resolve_start(
    start_month: Option<u32>,
    start_year: Option<i32>,
    date: NaiveDate,
) -> Result<Option<Period>, ValidationError> {
    if start_month.is_none() && start_year.is_none() {
        return Ok(None);
    }
    let fallback = Period::of(date);
    let month = start_month.unwrap_or(fallback.month);
    if !(1..=12).contains(&month) {
        return Err(ValidationError::StartMonthOutOfRange(month));
    }
    Period::new(month, start_year.unwrap_or(fallback.year)).map(Some)
}

fn recurrence_rules(recurrence: &Recurrence) -> Result<(), ValidationError> {
    if let Some(day) = recurrence.due_day {
        if !(1..=31).contains(&day) {
            return Err(ValidationError::DueDayOutOfRange(day));
        }
    }
    if recurrence.months == Some(0) {
        return Err(ValidationError::RecurringMonthsTooSmall);
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct DomainTransaction {
    pub id: String,
    pub description: String,
    pub amount: f64,
    /// Registration date, the anchor of non-recurring visibility
    pub date: NaiveDate,
    pub kind: TransactionKind,
}

impl DomainTransaction {
    pub fn generate_id() -> String {
        format!("transaction::{}", Uuid::new_v4())
    }

    pub fn is_income(&self) -> bool {
        matches!(self.kind, TransactionKind::Income)
    }

    pub fn is_expense(&self) -> bool {
        !self.is_income()
    }

    pub fn is_recurring(&self) -> bool {
        self.kind.recurrence().is_some()
    }

    /// Check the rules every stored transaction must satisfy
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_description(&self.description)?;
        validate_amount(self.amount)?;
        if let Some(recurrence) = self.kind.recurrence() {
            recurrence_rules(recurrence)?;
        }
        Ok(())
    }
}

pub fn validate_description(description: &str) -> Result<(), ValidationError> {
    if description.trim().is_empty() {
        return Err(ValidationError::EmptyDescription);
    }
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::DescriptionTooLong {
            max: MAX_DESCRIPTION_LEN,
        });
    }
    Ok(())
}

pub fn validate_amount(amount: f64) -> Result<(), ValidationError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ValidationError::NonPositiveAmount);
    }
    Ok(())
}
