//! Finance store: the single owner and writer of the finance data.
//!
//! The store keeps every collection (salary, transactions, goals,
//! contributions, settings) in memory and writes each one through to the
//! key-value adapter as a JSON blob under its own key.
//!
//! ## Write rules
//!
//! - A command validates its input before touching anything.
//! - The changed collection is built on a copy, persisted, and only then
//!   swapped into memory. A failed write leaves memory unchanged.
//! - Commands that touch several keys write them in a fixed order and put
//!   back the keys already written if a later one fails.
//! - Stored entries that could not be read at load are written back as they
//!   were, after the readable records of the same collection.
//!
//! Queries never perform I/O.

use anyhow::Context;
use chrono::{Local, Utc};
use log::{debug, error, info, warn};
use serde::Serialize;
use serde_json::Value;
use shared::{FinanceSettings, Goal, GoalContribution, Transaction};
use std::sync::Arc;

use super::aggregation::{self, MonthlySummary};
use super::commands::contributions::ProcessMonthResult;
use super::commands::goals::{CreateGoalCommand, DeleteGoalResult, UpdateGoalCommand};
use super::commands::import::ReplaceAllCommand;
use super::commands::settings::UpdateSettingsCommand;
use super::commands::transactions::{CreateTransactionCommand, UpdateTransactionCommand};
use super::contribution_processor::{apply_to_goals, plan_contributions};
use super::error::{FinanceError, FinanceResult, RecordKind, ValidationError};
use super::migration::{
    contribution_from_record, contribution_to_record, decode_collection, goal_from_record, Decoded,
    goal_to_record, is_legacy_goal, settings_from_record, settings_to_record,
    transaction_from_record, transaction_to_record,
};
use super::models::goal::validate_goal_fields;
use super::models::{
    DomainContribution, DomainGoal, DomainSettings, DomainTransaction, Period, TransactionKind,
};
use crate::storage::keys::{
    CONTRIBUTIONS_KEY, GOALS_KEY, LEGACY_EXPENSES_KEY, SALARY_KEY, SETTINGS_KEY, TRANSACTIONS_KEY,
};
use crate::storage::KeyValueStore;

/// A serialized value waiting to be written, with what to restore on failure
struct PendingWrite {
    key: &'static str,
    value: String,
    previous: String,
}

/// Raw stored entries that failed to load, per collection
#[derive(Debug, Default)]
struct Unreadable {
    transactions: Vec<Value>,
    goals: Vec<Value>,
    contributions: Vec<Value>,
}

pub struct FinanceStore {
    storage: Arc<dyn KeyValueStore>,
    salary: f64,
    transactions: Vec<DomainTransaction>,
    goals: Vec<DomainGoal>,
    contributions: Vec<DomainContribution>,
    settings: DomainSettings,
    unreadable: Unreadable,
}

impl FinanceStore {
    /// Load every collection from `storage`, upgrading legacy records.
    ///
    /// Records that cannot be read are left out of memory with a warning and
    /// kept in storage. A collection that is not a JSON array at all fails
    /// the load.
    pub async fn load(storage: Arc<dyn KeyValueStore>) -> FinanceResult<Self> {
        info!("Loading finance data");

        let salary = match read(storage.as_ref(), SALARY_KEY).await? {
            Some(raw) => match serde_json::from_str::<f64>(raw.trim()) {
                Ok(salary) if salary.is_finite() && salary >= 0.0 => salary,
                _ => {
                    warn!("Ignoring unreadable salary {:?}", raw);
                    0.0
                }
            },
            None => 0.0,
        };

        let (transaction_records, mut rewrite_transactions) =
            match read(storage.as_ref(), TRANSACTIONS_KEY).await? {
                Some(raw) => (decode::<Transaction>(TRANSACTIONS_KEY, &raw)?, false),
                None => match read(storage.as_ref(), LEGACY_EXPENSES_KEY).await? {
                    Some(raw) => {
                        info!("Migrating legacy expenses to {}", TRANSACTIONS_KEY);
                        (decode::<Transaction>(LEGACY_EXPENSES_KEY, &raw)?, true)
                    }
                    None => (Decoded::default(), false),
                },
            };
        rewrite_transactions |= transaction_records
            .records
            .iter()
            .any(|(record, _)| record.category.is_none());
        let (transactions, unreadable_transactions) = transaction_records.convert(
            TRANSACTIONS_KEY,
            |record| record.id.as_str(),
            transaction_from_record,
        );

        let goal_records = match read(storage.as_ref(), GOALS_KEY).await? {
            Some(raw) => decode::<Goal>(GOALS_KEY, &raw)?,
            None => Decoded::default(),
        };
        let rewrite_goals = goal_records
            .records
            .iter()
            .any(|(record, _)| is_legacy_goal(record));
        let (goals, unreadable_goals) =
            goal_records.convert(GOALS_KEY, |record| record.id.as_str(), goal_from_record);

        let (contributions, unreadable_contributions) =
            match read(storage.as_ref(), CONTRIBUTIONS_KEY).await? {
                Some(raw) => decode::<GoalContribution>(CONTRIBUTIONS_KEY, &raw)?,
                None => Decoded::default(),
            }
            .convert(
                CONTRIBUTIONS_KEY,
                |record| record.id.as_str(),
                contribution_from_record,
            );

        let settings = match read(storage.as_ref(), SETTINGS_KEY).await? {
            Some(raw) => match serde_json::from_str::<FinanceSettings>(&raw) {
                Ok(record) => {
                    let settings = settings_from_record(&record);
                    if let Err(e) = settings.validate() {
                        warn!("Ignoring stored settings: {}", e);
                        DomainSettings::default()
                    } else {
                        settings
                    }
                }
                Err(e) => {
                    warn!("Ignoring unreadable settings: {}", e);
                    DomainSettings::default()
                }
            },
            None => DomainSettings::default(),
        };

        let store = Self {
            storage,
            salary,
            transactions,
            goals,
            contributions,
            settings,
            unreadable: Unreadable {
                transactions: unreadable_transactions,
                goals: unreadable_goals,
                contributions: unreadable_contributions,
            },
        };

        // A failed write-back is retried on the next load
        if rewrite_transactions {
            let value =
                encode_transactions(&store.transactions, &store.unreadable.transactions)?;
            match store.write(TRANSACTIONS_KEY, &value).await {
                Ok(()) => info!("Migrated {} transactions", store.transactions.len()),
                Err(e) => warn!("Could not store migrated transactions: {}", e),
            }
        }
        if rewrite_goals {
            let value = encode_goals(&store.goals, &store.unreadable.goals)?;
            match store.write(GOALS_KEY, &value).await {
                Ok(()) => info!("Migrated {} goals", store.goals.len()),
                Err(e) => warn!("Could not store migrated goals: {}", e),
            }
        }

        info!(
            "Loaded {} transactions, {} goals, {} contributions",
            store.transactions.len(),
            store.goals.len(),
            store.contributions.len()
        );
        let kept = store.unreadable.transactions.len()
            + store.unreadable.goals.len()
            + store.unreadable.contributions.len();
        if kept > 0 {
            warn!("Kept {} unreadable records in storage", kept);
        }
        Ok(store)
    }

    // Queries

    pub fn salary(&self) -> f64 {
        self.salary
    }

    pub fn settings(&self) -> DomainSettings {
        self.settings
    }

    pub fn transactions(&self) -> &[DomainTransaction] {
        &self.transactions
    }

    pub fn contributions(&self) -> &[DomainContribution] {
        &self.contributions
    }

    /// Transactions visible in `period`, in insertion order
    pub fn list_transactions_for_month(&self, period: Period) -> Vec<&DomainTransaction> {
        aggregation::transactions_for_month(&self.transactions, period)
    }

    pub fn balance_for(&self, period: Period) -> f64 {
        aggregation::balance(self.salary, &self.transactions, period)
    }

    pub fn available_balance_for(&self, period: Period) -> f64 {
        aggregation::available_balance(
            self.salary,
            &self.transactions,
            &self.contributions,
            period,
        )
    }

    pub fn monthly_summary(&self, period: Period) -> MonthlySummary {
        aggregation::monthly_summary(self.salary, &self.transactions, &self.contributions, period)
    }

    /// Goals in creation order
    pub fn list_goals(&self) -> &[DomainGoal] {
        &self.goals
    }

    pub fn get_goal(&self, goal_id: &str) -> FinanceResult<&DomainGoal> {
        self.goals
            .iter()
            .find(|g| g.id == goal_id)
            .ok_or_else(|| FinanceError::not_found(RecordKind::Goal, goal_id))
    }

    pub fn list_contributions_for_month(&self, period: Period) -> Vec<&DomainContribution> {
        self.contributions
            .iter()
            .filter(|c| c.period == period)
            .collect()
    }

    pub fn contributions_for_goal(&self, goal_id: &str) -> FinanceResult<Vec<&DomainContribution>> {
        self.get_goal(goal_id)?;
        Ok(self
            .contributions
            .iter()
            .filter(|c| c.goal_id == goal_id)
            .collect())
    }

    // Commands

    pub async fn set_salary(&mut self, salary: f64) -> FinanceResult<()> {
        info!("Setting salary to {:.2}", salary);
        if !salary.is_finite() || salary < 0.0 {
            return Err(ValidationError::NegativeSalary.into());
        }

        self.write(SALARY_KEY, &encode(SALARY_KEY, &salary)?).await?;
        self.salary = salary;
        Ok(())
    }

    pub async fn add_transaction(
        &mut self,
        command: CreateTransactionCommand,
    ) -> FinanceResult<DomainTransaction> {
        info!("Adding transaction: {:?}", command);
        let transaction = build_transaction(DomainTransaction::generate_id(), command)?;

        let mut next = self.transactions.clone();
        next.push(transaction.clone());
        let value = encode_transactions(&next, &self.unreadable.transactions)?;
        self.write(TRANSACTIONS_KEY, &value).await?;
        self.transactions = next;

        info!("Successfully added transaction: {}", transaction.id);
        Ok(transaction)
    }

    pub async fn update_transaction(
        &mut self,
        command: UpdateTransactionCommand,
    ) -> FinanceResult<DomainTransaction> {
        info!("Updating transaction {}: {:?}", command.transaction_id, command.fields);
        let index = self.transaction_index(&command.transaction_id)?;
        let transaction = build_transaction(command.transaction_id, command.fields)?;

        let mut next = self.transactions.clone();
        next[index] = transaction.clone();
        let value = encode_transactions(&next, &self.unreadable.transactions)?;
        self.write(TRANSACTIONS_KEY, &value).await?;
        self.transactions = next;

        info!("Successfully updated transaction: {}", transaction.id);
        Ok(transaction)
    }

    pub async fn delete_transaction(&mut self, transaction_id: &str) -> FinanceResult<()> {
        info!("Deleting transaction: {}", transaction_id);
        let index = self.transaction_index(transaction_id)?;

        let mut next = self.transactions.clone();
        next.remove(index);
        let value = encode_transactions(&next, &self.unreadable.transactions)?;
        self.write(TRANSACTIONS_KEY, &value).await?;
        self.transactions = next;

        info!("Successfully deleted transaction: {}", transaction_id);
        Ok(())
    }

    pub async fn add_goal(&mut self, command: CreateGoalCommand) -> FinanceResult<DomainGoal> {
        info!("Adding goal: {:?}", command);
        let name = command.name.trim().to_string();
        validate_goal_fields(&name, command.total_target, &command.policy)?;

        let goal = DomainGoal {
            id: DomainGoal::generate_id(),
            name,
            total_target: command.total_target,
            policy: command.policy,
            current_amount: 0.0,
            is_active: command.is_active,
            created_at: Utc::now(),
        };

        let mut next = self.goals.clone();
        next.push(goal.clone());
        let value = encode_goals(&next, &self.unreadable.goals)?;
        self.write(GOALS_KEY, &value).await?;
        self.goals = next;

        info!("Successfully added goal: {}", goal.id);
        Ok(goal)
    }

    pub async fn update_goal(&mut self, command: UpdateGoalCommand) -> FinanceResult<DomainGoal> {
        info!("Updating goal: {:?}", command);
        let index = self.goal_index(&command.goal_id)?;
        let name = command.name.trim().to_string();
        validate_goal_fields(&name, command.total_target, &command.policy)?;

        let current = &self.goals[index];
        let goal = DomainGoal {
            id: current.id.clone(),
            name,
            total_target: command.total_target,
            policy: command.policy,
            current_amount: current.current_amount,
            is_active: command.is_active,
            created_at: current.created_at,
        };

        let mut next = self.goals.clone();
        next[index] = goal.clone();
        let value = encode_goals(&next, &self.unreadable.goals)?;
        self.write(GOALS_KEY, &value).await?;
        self.goals = next;

        info!("Successfully updated goal: {}", goal.id);
        Ok(goal)
    }

    /// Flip a goal between active and paused
    pub async fn toggle_goal_active(&mut self, goal_id: &str) -> FinanceResult<DomainGoal> {
        info!("Toggling goal: {}", goal_id);
        let index = self.goal_index(goal_id)?;

        let mut next = self.goals.clone();
        next[index].is_active = !next[index].is_active;
        let goal = next[index].clone();
        let value = encode_goals(&next, &self.unreadable.goals)?;
        self.write(GOALS_KEY, &value).await?;
        self.goals = next;

        info!("Goal {} is now {}", goal.id, if goal.is_active { "active" } else { "paused" });
        Ok(goal)
    }

    /// Delete a goal together with all of its contributions
    pub async fn delete_goal(&mut self, goal_id: &str) -> FinanceResult<DeleteGoalResult> {
        info!("Deleting goal: {}", goal_id);
        let index = self.goal_index(goal_id)?;

        let mut next_goals = self.goals.clone();
        next_goals.remove(index);
        let next_contributions: Vec<DomainContribution> = self
            .contributions
            .iter()
            .filter(|c| c.goal_id != goal_id)
            .cloned()
            .collect();
        let removed = self.contributions.len() - next_contributions.len();

        self.write_all(vec![
            PendingWrite {
                key: CONTRIBUTIONS_KEY,
                value: encode_contributions(
                    &next_contributions,
                    &self.unreadable.contributions,
                )?,
                previous: encode_contributions(
                    &self.contributions,
                    &self.unreadable.contributions,
                )?,
            },
            PendingWrite {
                key: GOALS_KEY,
                value: encode_goals(&next_goals, &self.unreadable.goals)?,
                previous: encode_goals(&self.goals, &self.unreadable.goals)?,
            },
        ])
        .await?;
        self.goals = next_goals;
        self.contributions = next_contributions;

        info!("Deleted goal {} and {} contributions", goal_id, removed);
        Ok(DeleteGoalResult {
            goal_id: goal_id.to_string(),
            removed_contributions: removed,
            success_message: format!("Goal deleted along with {} contributions", removed),
        })
    }

    /// Fund active goals from the month's available balance.
    ///
    /// Goals that already have a contribution for `period` are left alone,
    /// so running the same month twice creates nothing the second time.
    pub async fn process_month(&mut self, period: Period) -> FinanceResult<ProcessMonthResult> {
        info!("Processing goal contributions for {}", period);
        let available = self.available_balance_for(period);
        let plan = plan_contributions(
            &self.goals,
            &self.contributions,
            available,
            period,
            Utc::now(),
        );

        if plan.is_empty() {
            debug!("No contributions to make for {}", period);
            return Ok(ProcessMonthResult {
                period,
                created: Vec::new(),
                available_balance: available,
            });
        }

        let mut next_goals = self.goals.clone();
        apply_to_goals(&mut next_goals, &plan.contributions);
        let mut next_contributions = self.contributions.clone();
        next_contributions.extend(plan.contributions.iter().cloned());

        self.write_all(vec![
            PendingWrite {
                key: CONTRIBUTIONS_KEY,
                value: encode_contributions(
                    &next_contributions,
                    &self.unreadable.contributions,
                )?,
                previous: encode_contributions(
                    &self.contributions,
                    &self.unreadable.contributions,
                )?,
            },
            PendingWrite {
                key: GOALS_KEY,
                value: encode_goals(&next_goals, &self.unreadable.goals)?,
                previous: encode_goals(&self.goals, &self.unreadable.goals)?,
            },
        ])
        .await?;
        self.goals = next_goals;
        self.contributions = next_contributions;

        info!(
            "Created {} contributions for {}, {:.2} left available",
            plan.contributions.len(),
            period,
            plan.remaining
        );
        Ok(ProcessMonthResult {
            period,
            created: plan.contributions,
            available_balance: self.available_balance_for(period),
        })
    }

    pub async fn update_settings(
        &mut self,
        command: UpdateSettingsCommand,
    ) -> FinanceResult<DomainSettings> {
        info!("Updating settings: {:?}", command);
        let settings = DomainSettings {
            goal_contribution_day: command.goal_contribution_day,
        };
        settings.validate()?;

        let value = encode(SETTINGS_KEY, &settings_to_record(&settings))?;
        self.write(SETTINGS_KEY, &value).await?;
        self.settings = settings;
        Ok(settings)
    }

    /// Replace salary, transactions, goals and contributions in one go.
    /// The command must already be validated.
    pub(crate) async fn replace_all(&mut self, command: ReplaceAllCommand) -> FinanceResult<()> {
        info!(
            "Replacing all data: {} transactions, {} goals, {} contributions",
            command.transactions.len(),
            command.goals.len(),
            command.contributions.len()
        );

        self.write_all(vec![
            PendingWrite {
                key: SALARY_KEY,
                value: encode(SALARY_KEY, &command.salary)?,
                previous: encode(SALARY_KEY, &self.salary)?,
            },
            PendingWrite {
                key: TRANSACTIONS_KEY,
                value: encode_transactions(&command.transactions, &[])?,
                previous: encode_transactions(&self.transactions, &self.unreadable.transactions)?,
            },
            PendingWrite {
                key: CONTRIBUTIONS_KEY,
                value: encode_contributions(&command.contributions, &[])?,
                previous: encode_contributions(
                    &self.contributions,
                    &self.unreadable.contributions,
                )?,
            },
            PendingWrite {
                key: GOALS_KEY,
                value: encode_goals(&command.goals, &[])?,
                previous: encode_goals(&self.goals, &self.unreadable.goals)?,
            },
        ])
        .await?;

        self.salary = command.salary;
        self.transactions = command.transactions;
        self.goals = command.goals;
        self.contributions = command.contributions;
        self.unreadable = Unreadable::default();
        Ok(())
    }

    fn transaction_index(&self, transaction_id: &str) -> FinanceResult<usize> {
        self.transactions
            .iter()
            .position(|t| t.id == transaction_id)
            .ok_or_else(|| {
                warn!("Transaction not found: {}", transaction_id);
                FinanceError::not_found(RecordKind::Transaction, transaction_id)
            })
    }

    fn goal_index(&self, goal_id: &str) -> FinanceResult<usize> {
        self.goals.iter().position(|g| g.id == goal_id).ok_or_else(|| {
            warn!("Goal not found: {}", goal_id);
            FinanceError::not_found(RecordKind::Goal, goal_id)
        })
    }

    async fn write(&self, key: &str, value: &str) -> FinanceResult<()> {
        self.storage.set(key, value).await.map_err(|e| {
            error!("Failed to write {}: {:#}", key, e);
            FinanceError::Persistence(e)
        })
    }

    /// Write keys in order, restoring the ones already written if one fails
    async fn write_all(&self, writes: Vec<PendingWrite>) -> FinanceResult<()> {
        for (index, pending) in writes.iter().enumerate() {
            if let Err(e) = self.write(pending.key, &pending.value).await {
                for written in writes[..index].iter().rev() {
                    if let Err(restore) = self.storage.set(written.key, &written.previous).await {
                        error!("Failed to restore {}: {:#}", written.key, restore);
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }
}

/// Build a transaction from user input, applying every input rule
fn build_transaction(
    id: String,
    command: CreateTransactionCommand,
) -> FinanceResult<DomainTransaction> {
    let date = command.date.unwrap_or_else(|| Local::now().date_naive());
    let kind = TransactionKind::from_input(
        command.category,
        command.transaction_type,
        command.is_recurring,
        command.due_day,
        command.recurring_months,
        command.start_month,
        command.start_year,
        date,
    )?;

    let transaction = DomainTransaction {
        id,
        description: command.description.trim().to_string(),
        amount: command.amount,
        date,
        kind,
    };
    transaction.validate()?;
    Ok(transaction)
}

async fn read(storage: &dyn KeyValueStore, key: &str) -> FinanceResult<Option<String>> {
    storage.get(key).await.map_err(|e| {
        error!("Failed to read {}: {:#}", key, e);
        FinanceError::Persistence(e)
    })
}

fn decode<T: serde::de::DeserializeOwned>(key: &str, raw: &str) -> FinanceResult<Decoded<T>> {
    decode_collection(key, raw).map_err(FinanceError::Persistence)
}

fn encode<T: Serialize + ?Sized>(key: &str, value: &T) -> FinanceResult<String> {
    serde_json::to_string(value)
        .with_context(|| format!("failed to serialize {}", key))
        .map_err(FinanceError::Persistence)
}

/// Serialize `records` followed by the raw entries kept for the same key
fn encode_records<R: Serialize>(
    key: &str,
    records: &[R],
    kept: &[Value],
) -> FinanceResult<String> {
    if kept.is_empty() {
        return encode(key, records);
    }
    let mut values = records
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("failed to serialize {}", key))
        .map_err(FinanceError::Persistence)?;
    values.extend_from_slice(kept);
    encode(key, &values)
}

fn encode_transactions(
    transactions: &[DomainTransaction],
    kept: &[Value],
) -> FinanceResult<String> {
    let records: Vec<Transaction> = transactions.iter().map(transaction_to_record).collect();
    encode_records(TRANSACTIONS_KEY, &records, kept)
}

fn encode_goals(goals: &[DomainGoal], kept: &[Value]) -> FinanceResult<String> {
    let records: Vec<Goal> = goals.iter().map(goal_to_record).collect();
    encode_records(GOALS_KEY, &records, kept)
}

fn encode_contributions(
    contributions: &[DomainContribution],
    kept: &[Value],
) -> FinanceResult<String> {
    let records: Vec<GoalContribution> =
        contributions.iter().map(contribution_to_record).collect();
    encode_records(CONTRIBUTIONS_KEY, &records, kept)
}
