//! Export and import of the whole finance dataset as one JSON document.
//!
//! The document carries `salary`, `transacoes`, `metas`, `contribuicoes`
//! and a `resumo` block summarizing the reference month. Import is a full
//! replacement: every record is validated before the store is touched, and
//! the caller must confirm the overwrite.

use chrono::{DateTime, Utc};
use log::{info, warn};
use shared::{ExportDocument, ExportSummary, ImportRequest};
use std::collections::{HashMap, HashSet};

use super::commands::import::{ImportResult, ReplaceAllCommand};
use super::error::{FinanceError, FinanceResult, ImportError, RecordKind, ValidationError};
use super::finance_store::FinanceStore;
use super::migration::{
    contribution_from_record, contribution_to_record, goal_from_record, goal_to_record,
    transaction_from_record, transaction_to_record,
};
use super::models::Period;
use super::money::{round_cents, CENT_EPSILON};

/// Export service that handles the import/export document
#[derive(Clone, Default)]
pub struct ExportService {}

impl ExportService {
    pub fn new() -> Self {
        Self {}
    }

    /// Snapshot the store, summarizing `period` in the `resumo` block
    pub fn export(
        &self,
        store: &FinanceStore,
        period: Period,
        exported_at: DateTime<Utc>,
    ) -> ExportDocument {
        info!("📄 EXPORT: Exporting all data, reference month {}", period);
        let summary = store.monthly_summary(period);

        ExportDocument {
            salary: Some(store.salary()),
            transacoes: Some(store.transactions().iter().map(transaction_to_record).collect()),
            metas: Some(store.list_goals().iter().map(goal_to_record).collect()),
            contribuicoes: Some(
                store
                    .contributions()
                    .iter()
                    .map(contribution_to_record)
                    .collect(),
            ),
            resumo: Some(ExportSummary {
                exported_at,
                month: period.month,
                year: period.year,
                transaction_count: store.transactions().len(),
                goal_count: store.list_goals().len(),
                contribution_count: store.contributions().len(),
                balance: summary.balance,
                available_balance: summary.available_balance,
            }),
        }
    }

    /// Parse an import request body
    pub fn parse_request(&self, raw: &str) -> Result<ImportRequest, ImportError> {
        serde_json::from_str(raw).map_err(|e| ImportError::MalformedJson(e.to_string()))
    }

    /// Parse a bare export document, as written by `export`
    pub fn parse_document(&self, raw: &str) -> Result<ExportDocument, ImportError> {
        serde_json::from_str(raw).map_err(|e| ImportError::MalformedJson(e.to_string()))
    }

    /// Validate every record of `document` and build the replacement data.
    /// Sections missing from the document become empty. Each goal's
    /// accumulated amount must equal the sum of its contributions.
    pub fn prepare_import(&self, document: &ExportDocument) -> Result<ReplaceAllCommand, ImportError> {
        if document.is_missing_all_data() {
            return Err(ImportError::MissingData);
        }

        let salary = document.salary.unwrap_or(0.0);
        if !salary.is_finite() || salary < 0.0 {
            return Err(ImportError::InvalidSalary(ValidationError::NegativeSalary));
        }

        let mut transactions = Vec::new();
        let mut seen = HashSet::new();
        for record in document.transacoes.iter().flatten() {
            let transaction = transaction_from_record(record)
                .and_then(|t| t.validate().map(|_| t))
                .map_err(|reason| invalid(RecordKind::Transaction, &record.id, reason))?;
            if !seen.insert(record.id.clone()) {
                return Err(duplicate(RecordKind::Transaction, &record.id));
            }
            transactions.push(transaction);
        }

        let mut goals = Vec::new();
        let mut seen = HashSet::new();
        for record in document.metas.iter().flatten() {
            let goal = goal_from_record(record)
                .and_then(|g| g.validate().map(|_| g))
                .map_err(|reason| invalid(RecordKind::Goal, &record.id, reason))?;
            if !seen.insert(record.id.clone()) {
                return Err(duplicate(RecordKind::Goal, &record.id));
            }
            goals.push(goal);
        }

        let mut contributions = Vec::new();
        let mut seen = HashSet::new();
        let mut funded_periods = HashSet::new();
        let mut totals: HashMap<&str, f64> = HashMap::new();
        for record in document.contribuicoes.iter().flatten() {
            let contribution = contribution_from_record(record)
                .map_err(|reason| invalid(RecordKind::Contribution, &record.id, reason))?;
            if !contribution.amount.is_finite() || contribution.amount < 0.0 {
                return Err(invalid(
                    RecordKind::Contribution,
                    &record.id,
                    ValidationError::NegativeContributionAmount,
                ));
            }
            if !seen.insert(record.id.clone()) {
                return Err(duplicate(RecordKind::Contribution, &record.id));
            }
            if !goals.iter().any(|g| g.id == record.goal_id) {
                return Err(ImportError::UnknownGoal {
                    contribution_id: record.id.clone(),
                    goal_id: record.goal_id.clone(),
                });
            }
            if !funded_periods.insert((record.goal_id.clone(), contribution.period)) {
                return Err(ImportError::DuplicateContribution {
                    goal_id: record.goal_id.clone(),
                    month: record.month,
                    year: record.year,
                });
            }
            *totals.entry(record.goal_id.as_str()).or_insert(0.0) += contribution.amount;
            contributions.push(contribution);
        }

        for goal in &goals {
            let contributed = round_cents(totals.get(goal.id.as_str()).copied().unwrap_or(0.0));
            if (goal.current_amount - contributed).abs() > CENT_EPSILON {
                return Err(ImportError::AccumulatorMismatch {
                    goal_id: goal.id.clone(),
                    current_amount: goal.current_amount,
                    contributed,
                });
            }
        }

        Ok(ReplaceAllCommand {
            salary,
            transactions,
            goals,
            contributions,
        })
    }

    /// Replace everything in `store` with the contents of `document`
    pub async fn import(
        &self,
        store: &mut FinanceStore,
        document: &ExportDocument,
        confirm_overwrite: bool,
    ) -> FinanceResult<ImportResult> {
        info!("📥 IMPORT: Importing data (confirmed: {})", confirm_overwrite);
        let command = self.prepare_import(document).map_err(|e| {
            warn!("❌ IMPORT: Rejected document: {}", e);
            FinanceError::Import(e)
        })?;
        if !confirm_overwrite {
            return Err(FinanceError::ConfirmationRequired);
        }

        let result = ImportResult {
            transaction_count: command.transactions.len(),
            goal_count: command.goals.len(),
            contribution_count: command.contributions.len(),
            success_message: format!(
                "Imported {} transactions, {} goals and {} contributions",
                command.transactions.len(),
                command.goals.len(),
                command.contributions.len()
            ),
        };
        store.replace_all(command).await?;

        info!("✅ IMPORT: {}", result.success_message);
        Ok(result)
    }
}

fn invalid(kind: RecordKind, id: &str, reason: ValidationError) -> ImportError {
    ImportError::InvalidRecord {
        kind,
        id: id.to_string(),
        reason,
    }
}

fn duplicate(kind: RecordKind, id: &str) -> ImportError {
    ImportError::DuplicateId {
        kind,
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::goals::CreateGoalCommand;
    use crate::domain::commands::transactions::CreateTransactionCommand;
    use crate::domain::models::ContributionPolicy;
    use crate::storage::MemoryStore;
    use chrono::NaiveDate;
    use shared::{TransactionCategory, TransactionType};
    use std::sync::Arc;

    async fn setup_test() -> (FinanceStore, MemoryStore) {
        let memory = MemoryStore::new();
        let store = FinanceStore::load(Arc::new(memory.clone())).await.unwrap();
        (store, memory)
    }

    fn march() -> Period {
        Period::new(3, 2024).unwrap()
    }

    async fn populated_store() -> FinanceStore {
        let (mut store, _) = setup_test().await;
        store.set_salary(2500.0).await.unwrap();
        store
            .add_transaction(CreateTransactionCommand {
                description: "Laptop".to_string(),
                amount: 300.0,
                date: NaiveDate::from_ymd_opt(2024, 2, 10),
                category: TransactionCategory::Expense,
                transaction_type: TransactionType::Credit,
                is_recurring: true,
                due_day: Some(5),
                recurring_months: Some(10),
                start_month: Some(3),
                start_year: Some(2024),
            })
            .await
            .unwrap();
        store
            .add_goal(CreateGoalCommand {
                name: "Trip".to_string(),
                total_target: 3000.0,
                policy: ContributionPolicy::Percentage(10.0),
                is_active: true,
            })
            .await
            .unwrap();
        store.process_month(march()).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_export_includes_summary() {
        let store = populated_store().await;
        let document = ExportService::new().export(&store, march(), Utc::now());

        let summary = document.resumo.unwrap();
        assert_eq!(summary.transaction_count, 1);
        assert_eq!(summary.goal_count, 1);
        assert_eq!(summary.contribution_count, 1);
        assert_eq!(summary.balance, 2200.0);
        assert_eq!(summary.available_balance, 1980.0);
        assert_eq!(document.salary, Some(2500.0));
    }

    #[tokio::test]
    async fn test_export_import_round_trip() {
        let source = populated_store().await;
        let service = ExportService::new();
        let json = serde_json::to_string(&service.export(&source, march(), Utc::now())).unwrap();

        let (mut target, _) = setup_test().await;
        let document = service.parse_document(&json).unwrap();
        let result = service.import(&mut target, &document, true).await.unwrap();

        assert_eq!(result.transaction_count, 1);
        assert_eq!(target.salary(), source.salary());
        assert_eq!(target.transactions(), source.transactions());
        assert_eq!(target.list_goals(), source.list_goals());
        assert_eq!(target.contributions(), source.contributions());
        assert_eq!(
            target.available_balance_for(march()),
            source.available_balance_for(march())
        );
    }

    #[tokio::test]
    async fn test_import_requires_confirmation() {
        let source = populated_store().await;
        let service = ExportService::new();
        let document = service.export(&source, march(), Utc::now());

        let (mut target, memory) = setup_test().await;
        let result = service.import(&mut target, &document, false).await;

        assert!(matches!(result, Err(FinanceError::ConfirmationRequired)));
        assert!(target.transactions().is_empty());
        assert_eq!(memory.raw(crate::storage::keys::TRANSACTIONS_KEY), None);
    }

    #[tokio::test]
    async fn test_import_rejects_malformed_and_empty_documents() {
        let service = ExportService::new();
        assert!(matches!(
            service.parse_document("{ not json"),
            Err(ImportError::MalformedJson(_))
        ));

        let document = service.parse_document(r#"{"resumo": null}"#).unwrap();
        let (mut store, _) = setup_test().await;
        store.set_salary(100.0).await.unwrap();

        let result = service.import(&mut store, &document, true).await;
        assert!(matches!(
            result,
            Err(FinanceError::Import(ImportError::MissingData))
        ));
        assert_eq!(store.salary(), 100.0);
    }

    #[tokio::test]
    async fn test_import_replaces_missing_sections_with_empty() {
        let service = ExportService::new();
        let mut store = populated_store().await;
        let document = service.parse_document(r#"{"salary": 1800}"#).unwrap();

        service.import(&mut store, &document, true).await.unwrap();
        assert_eq!(store.salary(), 1800.0);
        assert!(store.transactions().is_empty());
        assert!(store.list_goals().is_empty());
        assert!(store.contributions().is_empty());
    }

    #[test]
    fn test_prepare_import_rejects_bad_records() {
        let service = ExportService::new();
        let goal = r#"{"id":"g1","name":"Trip","totalTarget":1000,"contributionType":"fixed","contributionValue":100,"currentAmount":100,"isActive":true,"createdAt":"2024-01-01T00:00:00Z"}"#;
        let contribution = |id: &str, goal_id: &str| {
            format!(
                r#"{{"id":"{}","goalId":"{}","amount":100,"month":3,"year":2024,"isComplete":true,"date":"2024-03-01T00:00:00Z"}}"#,
                id, goal_id
            )
        };

        let document = service
            .parse_document(&format!(
                r#"{{"metas":[{}],"contribuicoes":[{},{}]}}"#,
                goal,
                contribution("c1", "g1"),
                contribution("c2", "g1")
            ))
            .unwrap();
        assert!(matches!(
            service.prepare_import(&document),
            Err(ImportError::DuplicateContribution { month: 3, year: 2024, .. })
        ));

        let document = service
            .parse_document(&format!(
                r#"{{"metas":[{}],"contribuicoes":[{}]}}"#,
                goal,
                contribution("c1", "g9")
            ))
            .unwrap();
        assert!(matches!(
            service.prepare_import(&document),
            Err(ImportError::UnknownGoal { .. })
        ));

        let document = service
            .parse_document(&format!(r#"{{"metas":[{},{}]}}"#, goal, goal))
            .unwrap();
        assert!(matches!(
            service.prepare_import(&document),
            Err(ImportError::DuplicateId { kind: RecordKind::Goal, .. })
        ));

        let document = service
            .parse_document(
                r#"{"transacoes":[{"id":"t1","description":"","amount":10,"date":"2024-03-01","type":"debit"}]}"#,
            )
            .unwrap();
        assert!(matches!(
            service.prepare_import(&document),
            Err(ImportError::InvalidRecord {
                kind: RecordKind::Transaction,
                reason: ValidationError::EmptyDescription,
                ..
            })
        ));

        let document = service.parse_document(r#"{"salary": -5}"#).unwrap();
        assert!(matches!(
            service.prepare_import(&document),
            Err(ImportError::InvalidSalary(_))
        ));
    }

    #[test]
    fn test_prepare_import_rejects_accumulator_mismatch() {
        let service = ExportService::new();
        let goal = r#"{"id":"g1","name":"Trip","totalTarget":1000,"contributionType":"fixed","contributionValue":100,"currentAmount":500,"isActive":true,"createdAt":"2024-01-01T00:00:00Z"}"#;

        let document = service
            .parse_document(&format!(r#"{{"metas":[{}],"contribuicoes":[]}}"#, goal))
            .unwrap();
        match service.prepare_import(&document) {
            Err(ImportError::AccumulatorMismatch {
                goal_id,
                current_amount,
                contributed,
            }) => {
                assert_eq!(goal_id, "g1");
                assert_eq!(current_amount, 500.0);
                assert_eq!(contributed, 0.0);
            }
            other => panic!("Expected accumulator mismatch, got {:?}", other.map(|_| ())),
        }

        let matching = service
            .parse_document(&format!(
                r#"{{"metas":[{}],"contribuicoes":[{{"id":"c1","goalId":"g1","amount":500,"month":3,"year":2024,"isComplete":true,"date":"2024-03-01T00:00:00Z"}}]}}"#,
                goal
            ))
            .unwrap();
        let command = service.prepare_import(&matching).unwrap();
        assert_eq!(command.goals[0].current_amount, 500.0);
    }

    #[tokio::test]
    async fn test_mismatched_import_leaves_store_untouched() {
        let service = ExportService::new();
        let mut store = populated_store().await;
        let document = service
            .parse_document(
                r#"{"metas":[{"id":"g1","name":"Trip","totalTarget":1000,"contributionType":"fixed","contributionValue":100,"currentAmount":500,"isActive":true,"createdAt":"2024-01-01T00:00:00Z"}]}"#,
            )
            .unwrap();

        let result = service.import(&mut store, &document, true).await;
        assert!(matches!(
            result,
            Err(FinanceError::Import(ImportError::AccumulatorMismatch { .. }))
        ));
        assert_eq!(store.list_goals().len(), 1);
        assert_eq!(store.list_goals()[0].name, "Trip");
        assert_eq!(store.list_goals()[0].current_amount, 220.0);
    }

    #[test]
    fn test_prepare_import_accepts_legacy_shapes() {
        let service = ExportService::new();
        let document = service
            .parse_document(
                r#"{
                    "salary": 3000,
                    "transacoes": [{"id":"1","description":"Phone","amount":90,"date":"2024-01-15T10:00:00.000Z","type":"credit","isRecurring":true,"dueDay":10,"recurringMonths":3}],
                    "metas": [{"id":"2","name":"Trip","totalTarget":1000,"monthlyTarget":100,"currentAmount":0,"isActive":true,"createdAt":"2024-01-01T00:00:00.000Z"}]
                }"#,
            )
            .unwrap();

        let command = service.prepare_import(&document).unwrap();
        assert_eq!(command.transactions.len(), 1);
        assert!(command.transactions[0].is_recurring());
        assert_eq!(command.goals[0].policy, ContributionPolicy::Fixed(100.0));
        assert!(command.contributions.is_empty());
    }
}
