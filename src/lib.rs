pub mod browser;
pub mod cli;
pub mod codegen;
pub mod locator;
pub mod pipeline;
pub mod trace;

pub use browser::html_snapshot::HtmlSnapshot;
pub use browser::snapshot::{DomSnapshot, PageSource};
pub use locator::extractor::{LocatorExtractor, extract};
pub use locator::locator_model::{LocatorCollection, LocatorDescriptor};

/// Extract locators from an HTML string without launching a browser.
pub fn extract_from_html(html: &str) -> Result<LocatorCollection, locator::error::ExtractError> {
    extract(&HtmlSnapshot::parse(html))
}
