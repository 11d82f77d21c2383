use chrono::{Datelike, NaiveDate};

use super::period::Period;
use crate::domain::error::ValidationError;

/// User preferences that drive automatic goal funding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainSettings {
    /// Day of month (1-31) from which the month's contributions are processed
    pub goal_contribution_day: u32,
}

impl Default for DomainSettings {
    fn default() -> Self {
        Self {
            goal_contribution_day: 1,
        }
    }
}

impl DomainSettings {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=31).contains(&self.goal_contribution_day) {
            return Err(ValidationError::ContributionDayOutOfRange(
                self.goal_contribution_day,
            ));
        }
        Ok(())
    }

    /// Whether `today` has reached the contribution day of its month.
    /// Days past the end of a short month fall on its last day.
    pub fn is_contribution_due(&self, today: NaiveDate) -> bool {
        let last_day = Period::of(today).days_in_month();
        today.day() >= self.goal_contribution_day.min(last_day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_validate() {
        assert!(DomainSettings::default().validate().is_ok());
        assert!(DomainSettings { goal_contribution_day: 31 }.validate().is_ok());
        assert_eq!(
            DomainSettings { goal_contribution_day: 0 }.validate(),
            Err(ValidationError::ContributionDayOutOfRange(0))
        );
        assert_eq!(
            DomainSettings { goal_contribution_day: 32 }.validate(),
            Err(ValidationError::ContributionDayOutOfRange(32))
        );
    }

    #[test]
    fn test_contribution_due() {
        let settings = DomainSettings { goal_contribution_day: 10 };
        assert!(!settings.is_contribution_due(date(2024, 3, 9)));
        assert!(settings.is_contribution_due(date(2024, 3, 10)));
        assert!(settings.is_contribution_due(date(2024, 3, 25)));
    }

    #[test]
    fn test_contribution_day_clamped_to_short_month() {
        let settings = DomainSettings { goal_contribution_day: 31 };
        assert!(!settings.is_contribution_due(date(2023, 2, 27)));
        assert!(settings.is_contribution_due(date(2023, 2, 28)));
        assert!(settings.is_contribution_due(date(2024, 4, 30)));
    }
}
