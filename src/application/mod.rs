//! Application services orchestrating domain logic.

pub mod analytics;
pub mod error;
pub mod notes;
pub mod repos;
pub mod translator;
