use std::time::Duration;

use tracing::{debug, info, warn};

use crate::browser::error::SnapshotError;
use crate::browser::snapshot::{DomSnapshot, ElementHandle};
use crate::locator::error::ExtractError;
use crate::locator::heuristics::{is_auto_generated, variable_name};
use crate::locator::locator_model::{
    ATTRIBUTE_PRIORITY, GuessableTag, LocatorCollection, LocatorDescriptor, LocatorExpression,
    TEXT_ATTRIBUTE,
};

/// How long the uniqueness check waits for a locator to become present.
pub const DEFAULT_UNIQUE_WAIT_MS: u64 = 1000;
pub const DEFAULT_UNIQUE_WAIT: Duration = Duration::from_millis(DEFAULT_UNIQUE_WAIT_MS);

/// Result of processing a single candidate element.
#[derive(Debug)]
pub enum ElementOutcome {
    Located(LocatorDescriptor),
    /// No stable attribute and no usable button text.
    NoStableLocator,
    /// Tag outside the allow-list.
    NotGuessable,
    /// Reading the element failed; it is skipped for this scan.
    Failed(SnapshotError),
}

/// Scans a DOM snapshot for interactive elements and builds unique,
/// human-readable locators for them.
#[derive(Debug, Clone)]
pub struct LocatorExtractor {
    pub unique_wait: Duration,
}

impl Default for LocatorExtractor {
    fn default() -> Self {
        Self {
            unique_wait: DEFAULT_UNIQUE_WAIT,
        }
    }
}

impl LocatorExtractor {
    pub fn new(unique_wait: Duration) -> Self {
        Self { unique_wait }
    }

    /// Extract locators from every guessable element, in document order.
    ///
    /// Only a failing candidate query aborts; anything that goes wrong with a
    /// single element skips that element.
    pub fn extract(&self, dom: &dyn DomSnapshot) -> Result<LocatorCollection, ExtractError> {
        let tags = GuessableTag::names();
        let candidates = dom
            .find_candidates(&tags)
            .map_err(ExtractError::SnapshotUnavailable)?;

        let mut collection = LocatorCollection::new();
        let mut skipped = 0usize;

        for element in &candidates {
            match self.process_element(dom, element) {
                ElementOutcome::Located(descriptor) => collection.push(descriptor),
                ElementOutcome::Failed(e) => {
                    warn!(
                        index = element.index,
                        tag = %element.tag,
                        "Error processing element: {}",
                        e
                    );
                    skipped += 1;
                }
                outcome @ (ElementOutcome::NoStableLocator | ElementOutcome::NotGuessable) => {
                    debug!(
                        index = element.index,
                        tag = %element.tag,
                        ?outcome,
                        "element skipped"
                    );
                    skipped += 1;
                }
            }
        }

        info!(
            candidates = candidates.len(),
            located = collection.len(),
            skipped,
            "locator extraction finished"
        );
        Ok(collection)
    }

    /// Attribute pass, then the button text fallback.
    pub fn process_element(
        &self,
        dom: &dyn DomSnapshot,
        element: &ElementHandle,
    ) -> ElementOutcome {
        let Some(tag) = GuessableTag::from_name(&element.tag) else {
            return ElementOutcome::NotGuessable;
        };

        match self.attribute_pass(dom, element, tag) {
            Ok(Some(descriptor)) => return ElementOutcome::Located(descriptor),
            Ok(None) => {}
            Err(e) => return ElementOutcome::Failed(e),
        }

        if tag != GuessableTag::Button {
            return ElementOutcome::NoStableLocator;
        }

        match self.text_pass(dom, element, tag) {
            Ok(Some(descriptor)) => ElementOutcome::Located(descriptor),
            Ok(None) => ElementOutcome::NoStableLocator,
            Err(e) => ElementOutcome::Failed(e),
        }
    }

    fn attribute_pass(
        &self,
        dom: &dyn DomSnapshot,
        element: &ElementHandle,
        tag: GuessableTag,
    ) -> Result<Option<LocatorDescriptor>, SnapshotError> {
        for attribute in ATTRIBUTE_PRIORITY {
            let Some(value) = dom.attribute(element, attribute)? else {
                continue;
            };
            if value.is_empty() || is_auto_generated(&value) {
                continue;
            }

            let expression = LocatorExpression::attribute(tag, attribute, &value);
            if self.is_unique(dom, &expression) {
                return Ok(Some(describe(tag, attribute, value, &expression)));
            }
        }
        Ok(None)
    }

    fn text_pass(
        &self,
        dom: &dyn DomSnapshot,
        element: &ElementHandle,
        tag: GuessableTag,
    ) -> Result<Option<LocatorDescriptor>, SnapshotError> {
        let text = dom.visible_text(element)?;
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let expression = LocatorExpression::text(tag, text);
        if self.is_unique(dom, &expression) {
            return Ok(Some(describe(tag, TEXT_ATTRIBUTE, text.to_string(), &expression)));
        }
        Ok(None)
    }

    /// Exactly one match within the wait. Errors and timeouts count as "not unique".
    pub fn is_unique(&self, dom: &dyn DomSnapshot, expression: &LocatorExpression) -> bool {
        match dom.match_count(expression, self.unique_wait) {
            Ok(count) => count == 1,
            Err(e) => {
                debug!(%expression, "uniqueness check failed: {}", e);
                false
            }
        }
    }
}

fn describe(
    tag: GuessableTag,
    attribute: &str,
    value: String,
    expression: &LocatorExpression,
) -> LocatorDescriptor {
    LocatorDescriptor {
        tag,
        attribute: attribute.to_string(),
        variable_name: variable_name(&value),
        value,
        locator_expression: expression.to_xpath(),
    }
}

/// Extract with the default uniqueness wait.
pub fn extract(dom: &dyn DomSnapshot) -> Result<LocatorCollection, ExtractError> {
    LocatorExtractor::default().extract(dom)
}
