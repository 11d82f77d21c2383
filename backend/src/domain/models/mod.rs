pub mod contribution;
pub mod goal;
pub mod period;
pub mod settings;
pub mod transaction;

pub use contribution::DomainContribution;
pub use goal::{ContributionPolicy, DomainGoal};
pub use period::Period;
pub use settings::DomainSettings;
pub use transaction::{DomainTransaction, Recurrence, TransactionKind};
