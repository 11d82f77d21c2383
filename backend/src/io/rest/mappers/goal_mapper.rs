use shared::{CreateGoalRequest, GoalView};

use crate::domain::commands::goals::{CreateGoalCommand, UpdateGoalCommand};
use crate::domain::migration::goal_to_record;
use crate::domain::models::{ContributionPolicy, DomainGoal};

pub struct GoalMapper;

impl GoalMapper {
    /// Convert domain DomainGoal to a GoalView with progress figures
    pub fn to_view(domain: &DomainGoal) -> GoalView {
        GoalView {
            goal: goal_to_record(domain),
            progress_percent: domain.progress_percent(),
            remaining_target: domain.outstanding(),
        }
    }

    pub fn to_view_list(domain_goals: &[DomainGoal]) -> Vec<GoalView> {
        domain_goals.iter().map(Self::to_view).collect()
    }

    pub fn to_create_command(request: CreateGoalRequest) -> CreateGoalCommand {
        CreateGoalCommand {
            name: request.name,
            total_target: request.total_target,
            policy: ContributionPolicy::from_parts(
                request.contribution_type,
                request.contribution_value,
            ),
            is_active: request.is_active,
        }
    }

    pub fn to_update_command(goal_id: String, request: CreateGoalRequest) -> UpdateGoalCommand {
        UpdateGoalCommand {
            goal_id,
            name: request.name,
            total_target: request.total_target,
            policy: ContributionPolicy::from_parts(
                request.contribution_type,
                request.contribution_value,
            ),
            is_active: request.is_active,
        }
    }
}
