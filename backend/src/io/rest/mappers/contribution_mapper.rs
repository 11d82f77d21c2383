use shared::GoalContribution;

use crate::domain::migration::contribution_to_record;
use crate::domain::models::DomainContribution;

pub struct ContributionMapper;

impl ContributionMapper {
    pub fn to_dto(domain: &DomainContribution) -> GoalContribution {
        contribution_to_record(domain)
    }

    pub fn to_dto_list<'a, I>(domain_contributions: I) -> Vec<GoalContribution>
    where
        I: IntoIterator<Item = &'a DomainContribution>,
    {
        domain_contributions.into_iter().map(Self::to_dto).collect()
    }
}
