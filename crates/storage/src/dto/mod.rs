pub mod account;
pub mod partnership;
pub mod workout;
