pub mod error;
pub mod generator;
pub mod inference;
pub mod prompt;
