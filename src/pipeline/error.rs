use thiserror::Error;

use crate::browser::error::BrowserError;
use crate::codegen::error::CodegenError;
use crate::locator::error::ExtractError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("fetch_page failed: {0}")]
    Fetch(#[from] BrowserError),

    #[error("extract_locators failed: {0}")]
    Extract(#[from] ExtractError),

    #[error("generate_code failed: {0}")]
    Generate(#[from] CodegenError),
}
