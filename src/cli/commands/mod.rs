pub mod analyze;
pub mod config;
pub mod context;
pub mod search;
