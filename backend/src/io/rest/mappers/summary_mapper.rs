use shared::{FinanceSettings, MonthlySummary};

use crate::domain::aggregation::MonthlySummary as DomainMonthlySummary;
use crate::domain::migration::settings_to_record;
use crate::domain::models::DomainSettings;
use crate::domain::money::round_cents;

pub struct SummaryMapper;

impl SummaryMapper {
    /// Convert a domain summary to the DTO, rounding figures to cents
    pub fn to_dto(domain: &DomainMonthlySummary) -> MonthlySummary {
        MonthlySummary {
            month: domain.period.month,
            year: domain.period.year,
            salary: round_cents(domain.salary),
            total_income: round_cents(domain.totals.total_income),
            total_expenses: round_cents(domain.totals.total_expenses),
            debit_expenses: round_cents(domain.totals.debit_expenses),
            credit_expenses: round_cents(domain.totals.credit_expenses),
            balance: round_cents(domain.balance),
            contributed: round_cents(domain.contributed),
            available_balance: round_cents(domain.available_balance),
            transaction_count: domain.totals.transaction_count,
        }
    }

    pub fn settings_to_dto(domain: &DomainSettings) -> FinanceSettings {
        settings_to_record(domain)
    }
}
