//! Greedy allocation of a month's available balance to active goals.
//!
//! Goals are funded in insertion order: each one takes its nominal ask, or
//! whatever is left if that is less. A goal that already has a contribution
//! for the month is skipped, which makes re-running a month a no-op for the
//! goals it already funded.

use chrono::{DateTime, Utc};
use log::debug;

use super::models::{DomainContribution, DomainGoal, Period};
use super::money::{floor_cents, round_cents, CENT_EPSILON};

/// Contributions one processing run would create
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContributionPlan {
    pub contributions: Vec<DomainContribution>,
    /// Available balance left after the planned contributions
    pub remaining: f64,
}

impl ContributionPlan {
    pub fn is_empty(&self) -> bool {
        self.contributions.is_empty()
    }
}

pub fn plan_contributions(
    goals: &[DomainGoal],
    existing: &[DomainContribution],
    available_balance: f64,
    period: Period,
    now: DateTime<Utc>,
) -> ContributionPlan {
    let mut remaining = available_balance;
    let mut contributions = Vec::new();

    for goal in goals.iter().filter(|g| g.is_active) {
        if existing.iter().any(|c| c.is_for(&goal.id, period)) {
            debug!("Goal {} already funded for {}", goal.id, period);
            continue;
        }
        if remaining <= 0.0 {
            break;
        }

        let ask = goal.nominal_ask(remaining);
        if ask <= 0.0 {
            continue;
        }
        let grant = floor_cents(ask.min(remaining));
        if grant <= 0.0 {
            continue;
        }

        contributions.push(DomainContribution {
            id: DomainContribution::generate_id(),
            goal_id: goal.id.clone(),
            amount: grant,
            period,
            is_complete: grant >= ask - CENT_EPSILON,
            date: now,
        });
        remaining -= grant;
    }

    ContributionPlan {
        contributions,
        remaining,
    }
}

/// Add each planned contribution to its goal's accumulated amount
pub fn apply_to_goals(goals: &mut [DomainGoal], contributions: &[DomainContribution]) {
    for contribution in contributions {
        if let Some(goal) = goals.iter_mut().find(|g| g.id == contribution.goal_id) {
            goal.current_amount = round_cents(goal.current_amount + contribution.amount);
        }
    }
}
