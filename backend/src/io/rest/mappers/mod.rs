pub mod contribution_mapper;
pub mod goal_mapper;
pub mod summary_mapper;
pub mod transaction_mapper;
