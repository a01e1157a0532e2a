pub mod builder;
pub mod errors;
pub mod execution;
pub mod platform;
pub mod report;
pub mod robot;
pub mod types;
