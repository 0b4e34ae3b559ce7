use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::browser::error::{BrowserError, SnapshotError};
use crate::locator::locator_model::LocatorExpression;

/// Reference to one element inside a particular snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Snapshot-local position; meaningless against any other snapshot.
    pub index: usize,
    /// Lower-cased tag name.
    pub tag: String,
}

/// Read-only view over a loaded page.
///
/// The locator extractor only needs these four capabilities. Implementations
/// own whatever resources back the page; callers drop them when done.
pub trait DomSnapshot {
    /// All elements whose tag is one of `tags`, in document order.
    fn find_candidates(&self, tags: &[&str]) -> Result<Vec<ElementHandle>, SnapshotError>;

    /// Attribute value, or `None` when the attribute is absent.
    fn attribute(&self, element: &ElementHandle, name: &str)
    -> Result<Option<String>, SnapshotError>;

    /// Visible text, trimmed.
    fn visible_text(&self, element: &ElementHandle) -> Result<String, SnapshotError>;

    /// Wait up to `wait` for `expression` to match, then count matches.
    fn match_count(
        &self,
        expression: &LocatorExpression,
        wait: Duration,
    ) -> Result<usize, SnapshotError>;
}

/// Where the page under test comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSource {
    Url(String),
    Html(String),
}

impl PageSource {
    /// Build from optional CLI/form inputs; a URL wins when both are present.
    pub fn from_parts(url: Option<&str>, html: Option<&str>) -> Result<Self, BrowserError> {
        match (url, html) {
            (Some(u), _) if !u.trim().is_empty() => Ok(PageSource::Url(u.trim().to_string())),
            (_, Some(h)) if !h.trim().is_empty() => Ok(PageSource::Html(h.to_string())),
            _ => Err(BrowserError::MissingSource),
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            PageSource::Url(u) => Some(u),
            PageSource::Html(_) => None,
        }
    }
}

/// Loads a page and hands back a queryable snapshot of it.
pub trait PageProvider {
    type Snapshot: DomSnapshot;

    fn fetch(&mut self, source: &PageSource) -> Result<Self::Snapshot, BrowserError>;
}
