use std::cell::Cell;
use std::time::Duration;

use locator_codegen::browser::error::SnapshotError;
use locator_codegen::browser::html_snapshot::HtmlSnapshot;
use locator_codegen::browser::snapshot::{DomSnapshot, ElementHandle};
use locator_codegen::locator::locator_model::LocatorExpression;

/// Wraps an `HtmlSnapshot` and injects failures at chosen points.
pub struct FlakySnapshot {
    pub inner: HtmlSnapshot,
    pub candidates_unavailable: bool,
    /// Attribute reads on this element index fail.
    pub broken_element: Option<usize>,
    /// `match_count` fails for expressions whose XPath contains this.
    pub failing_expression: Option<String>,
    pub match_calls: Cell<usize>,
    pub last_wait: Cell<Option<Duration>>,
}

impl FlakySnapshot {
    pub fn new(html: &str) -> Self {
        Self {
            inner: HtmlSnapshot::parse(html),
            candidates_unavailable: false,
            broken_element: None,
            failing_expression: None,
            match_calls: Cell::new(0),
            last_wait: Cell::new(None),
        }
    }
}

impl DomSnapshot for FlakySnapshot {
    fn find_candidates(&self, tags: &[&str]) -> Result<Vec<ElementHandle>, SnapshotError> {
        if self.candidates_unavailable {
            return Err(SnapshotError::Unavailable("browser disconnected".into()));
        }
        self.inner.find_candidates(tags)
    }

    fn attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, SnapshotError> {
        if self.broken_element == Some(element.index) {
            return Err(SnapshotError::StaleElement(element.index));
        }
        self.inner.attribute(element, name)
    }

    fn visible_text(&self, element: &ElementHandle) -> Result<String, SnapshotError> {
        if self.broken_element == Some(element.index) {
            return Err(SnapshotError::StaleElement(element.index));
        }
        self.inner.visible_text(element)
    }

    fn match_count(
        &self,
        expression: &LocatorExpression,
        wait: Duration,
    ) -> Result<usize, SnapshotError> {
        self.match_calls.set(self.match_calls.get() + 1);
        self.last_wait.set(Some(wait));
        if let Some(needle) = &self.failing_expression {
            if expression.to_xpath().contains(needle.as_str()) {
                return Err(SnapshotError::Timeout {
                    expression: expression.to_xpath(),
                    waited_ms: wait.as_millis() as u64,
                });
            }
        }
        self.inner.match_count(expression, wait)
    }
}
