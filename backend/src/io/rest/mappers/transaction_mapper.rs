use shared::{CreateTransactionRequest, Transaction};

use crate::domain::commands::transactions::{CreateTransactionCommand, UpdateTransactionCommand};
use crate::domain::migration::transaction_to_record;
use crate::domain::models::DomainTransaction;

pub struct TransactionMapper;

impl TransactionMapper {
    /// Convert domain DomainTransaction to shared Transaction DTO
    pub fn to_dto(domain: &DomainTransaction) -> Transaction {
        transaction_to_record(domain)
    }

    pub fn to_dto_list(domain_transactions: &[&DomainTransaction]) -> Vec<Transaction> {
        domain_transactions.iter().map(|t| Self::to_dto(t)).collect()
    }

    pub fn to_create_command(request: CreateTransactionRequest) -> CreateTransactionCommand {
        CreateTransactionCommand {
            description: request.description,
            amount: request.amount,
            date: request.date,
            category: request.category,
            transaction_type: request.transaction_type,
            is_recurring: request.is_recurring,
            due_day: request.due_day,
            recurring_months: request.recurring_months,
            start_month: request.start_month,
            start_year: request.start_year,
        }
    }

    pub fn to_update_command(
        transaction_id: String,
        request: CreateTransactionRequest,
    ) -> UpdateTransactionCommand {
        UpdateTransactionCommand {
            transaction_id,
            fields: Self::to_create_command(request),
        }
    }
}
