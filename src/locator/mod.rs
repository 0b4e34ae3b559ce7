pub mod error;
pub mod extractor;
pub mod heuristics;
pub mod locator_model;
