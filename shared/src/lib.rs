use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a transaction takes money out of or brings money into the month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionCategory {
    Expense,
    Income,
}

/// Payment method of a transaction. Income always uses `Income`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Credit,
    Debit,
    Income,
}

impl fmt::Display for TransactionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionCategory::Expense => write!(f, "expense"),
            TransactionCategory::Income => write!(f, "income"),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Credit => write!(f, "credit"),
            TransactionType::Debit => write!(f, "debit"),
            TransactionType::Income => write!(f, "income"),
        }
    }
}

/// A stored or exchanged transaction record.
///
/// `category` is optional on the wire because records written before income
/// tracking existed only carried a `type`; they are upcast on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub description: String,
    pub amount: f64,
    /// Registration date (ISO-8601). Full timestamps are accepted on input.
    #[serde(with = "iso_date")]
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<TransactionCategory>,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_day: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_months: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_month: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_year: Option<i32>,
}

/// How a goal asks for money each month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContributionType {
    /// A fixed amount per month
    Fixed,
    /// A percentage of the month's available balance
    Percentage,
}

/// A stored or exchanged savings goal.
///
/// Goals saved by older versions carry a flat `monthlyTarget` instead of
/// `contributionType`/`contributionValue`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub name: String,
    pub total_target: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contribution_type: Option<ContributionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contribution_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_target: Option<f64>,
    #[serde(default)]
    pub current_amount: f64,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// One month's allocation from the available balance to a goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalContribution {
    pub id: String,
    pub goal_id: String,
    pub amount: f64,
    pub month: u32,
    pub year: i32,
    pub is_complete: bool,
    pub date: DateTime<Utc>,
}

/// Persisted user preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceSettings {
    /// Day of month (1-31) from which the month's goal contributions are processed
    pub goal_contribution_day: u32,
}

impl Default for FinanceSettings {
    fn default() -> Self {
        Self {
            goal_contribution_day: 1,
        }
    }
}

/// Query parameters selecting a calendar month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthQuery {
    /// 1-12
    pub month: u32,
    pub year: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    pub description: String,
    pub amount: f64,
    /// Registration date; today when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub category: TransactionCategory,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_day: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_months: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_month: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionListResponse {
    pub month: u32,
    pub year: i32,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGoalRequest {
    pub name: String,
    pub total_target: f64,
    pub contribution_type: ContributionType,
    pub contribution_value: f64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// A goal together with its derived progress figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalView {
    #[serde(flatten)]
    pub goal: Goal,
    /// 0-100
    pub progress_percent: f64,
    pub remaining_target: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalListResponse {
    pub goals: Vec<GoalView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteGoalResponse {
    pub goal_id: String,
    pub removed_contributions: usize,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteTransactionResponse {
    pub transaction_id: String,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionListResponse {
    pub month: u32,
    pub year: i32,
    pub contributions: Vec<GoalContribution>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessContributionsResponse {
    pub month: u32,
    pub year: i32,
    /// Contributions created by this run; empty when the month was already processed
    pub created: Vec<GoalContribution>,
    pub available_balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetSalaryRequest {
    pub salary: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryResponse {
    pub salary: f64,
}

/// Totals for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub month: u32,
    pub year: i32,
    pub salary: f64,
    pub total_income: f64,
    pub total_expenses: f64,
    pub debit_expenses: f64,
    pub credit_expenses: f64,
    /// salary + income - expenses
    pub balance: f64,
    /// Sum of goal contributions recorded for the month
    pub contributed: f64,
    /// balance - contributed
    pub available_balance: f64,
    pub transaction_count: usize,
}

/// Summary block written into export files. Ignored on import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSummary {
    #[serde(rename = "dataExportacao")]
    pub exported_at: DateTime<Utc>,
    #[serde(rename = "mesReferencia")]
    pub month: u32,
    #[serde(rename = "anoReferencia")]
    pub year: i32,
    #[serde(rename = "totalTransacoes")]
    pub transaction_count: usize,
    #[serde(rename = "totalMetas")]
    pub goal_count: usize,
    #[serde(rename = "totalContribuicoes")]
    pub contribution_count: usize,
    #[serde(rename = "saldoMes")]
    pub balance: f64,
    #[serde(rename = "saldoDisponivelMes")]
    pub available_balance: f64,
}

/// The import/export file. Field names are part of the interchange format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transacoes: Option<Vec<Transaction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metas: Option<Vec<Goal>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contribuicoes: Option<Vec<GoalContribution>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resumo: Option<ExportSummary>,
}

impl ExportDocument {
    /// True when none of the data sections are present
    pub fn is_missing_all_data(&self) -> bool {
        self.salary.is_none()
            && self.transacoes.is_none()
            && self.metas.is_none()
            && self.contribuicoes.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    pub document: ExportDocument,
    /// Import replaces all current data and is refused unless this is set
    #[serde(default)]
    pub confirm_overwrite: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    pub transaction_count: usize,
    pub goal_count: usize,
    pub contribution_count: usize,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn default_true() -> bool {
    true
}

/// Parse an ISO-8601 calendar date, also accepting full timestamps as
/// written by older exports (`2024-01-15T12:00:00.000Z`).
///
/// A timestamp counts toward the day it fell on in the device's local time.
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    parse_iso_date_in(raw, &Local)
}

/// Like `parse_iso_date`, with timestamps converted into `tz`
pub fn parse_iso_date_in<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(tz).date_naive())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
}

mod iso_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_iso_date(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid ISO-8601 date: {}", raw)))
    }
}
