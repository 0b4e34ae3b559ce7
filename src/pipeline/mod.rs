pub mod error;
pub mod runner;
