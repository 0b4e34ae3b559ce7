use std::time::Duration;

use scraper::{Html, Selector};
use tracing::debug;

use crate::browser::error::{BrowserError, SnapshotError};
use crate::browser::snapshot::{DomSnapshot, ElementHandle, PageProvider, PageSource};
use crate::locator::locator_model::LocatorExpression;

#[derive(Debug, Clone)]
struct ParsedElement {
    tag: String,
    attributes: Vec<(String, String)>,
    /// Direct child text nodes, untrimmed (what XPath `text()` sees).
    own_text: Vec<String>,
    /// All descendant text, whitespace-collapsed and trimmed.
    visible_text: String,
}

/// Static snapshot of parsed HTML. No scripts run, so the page never
/// changes and waits return immediately.
#[derive(Debug, Clone)]
pub struct HtmlSnapshot {
    elements: Vec<ParsedElement>,
}

impl HtmlSnapshot {
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);
        let all = Selector::parse("*").expect("universal selector is valid");

        let elements = document
            .select(&all)
            .map(|el| {
                let own_text = el
                    .children()
                    .filter_map(|child| {
                        child.value().as_text().map(|t| {
                            let s: &str = t;
                            s.to_owned()
                        })
                    })
                    .collect();

                let visible_text = el
                    .text()
                    .collect::<String>()
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ");

                ParsedElement {
                    tag: el.value().name().to_ascii_lowercase(),
                    attributes: el
                        .value()
                        .attrs()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                    own_text,
                    visible_text,
                }
            })
            .collect();

        Self { elements }
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    fn get(&self, handle: &ElementHandle) -> Result<&ParsedElement, SnapshotError> {
        self.elements
            .get(handle.index)
            .filter(|el| el.tag == handle.tag)
            .ok_or(SnapshotError::StaleElement(handle.index))
    }

    fn matches(el: &ParsedElement, expression: &LocatorExpression) -> bool {
        if el.tag != expression.tag().as_str() {
            return false;
        }
        match expression {
            LocatorExpression::Attribute {
                attribute, value, ..
            } => el
                .attributes
                .iter()
                .any(|(k, v)| k == attribute && v == value),
            LocatorExpression::Text { text, .. } => el.own_text.iter().any(|t| t == text),
        }
    }
}

impl DomSnapshot for HtmlSnapshot {
    fn find_candidates(&self, tags: &[&str]) -> Result<Vec<ElementHandle>, SnapshotError> {
        Ok(self
            .elements
            .iter()
            .enumerate()
            .filter(|(_, el)| tags.contains(&el.tag.as_str()))
            .map(|(index, el)| ElementHandle {
                index,
                tag: el.tag.clone(),
            })
            .collect())
    }

    fn attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, SnapshotError> {
        let el = self.get(element)?;
        Ok(el
            .attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone()))
    }

    fn visible_text(&self, element: &ElementHandle) -> Result<String, SnapshotError> {
        Ok(self.get(element)?.visible_text.clone())
    }

    fn match_count(
        &self,
        expression: &LocatorExpression,
        _wait: Duration,
    ) -> Result<usize, SnapshotError> {
        Ok(self
            .elements
            .iter()
            .filter(|el| Self::matches(el, expression))
            .count())
    }
}

// ============================================================================
// StaticPageProvider: raw HTML or a plain HTTP GET, no browser
// ============================================================================

/// Page provider that never launches a browser. URLs are fetched with a
/// blocking GET, so client-rendered pages will look empty.
#[derive(Default)]
pub struct StaticPageProvider {
    client: reqwest::blocking::Client,
}

impl StaticPageProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PageProvider for StaticPageProvider {
    type Snapshot = HtmlSnapshot;

    fn fetch(&mut self, source: &PageSource) -> Result<HtmlSnapshot, BrowserError> {
        match source {
            PageSource::Html(html) => Ok(HtmlSnapshot::parse(html)),
            PageSource::Url(url) => {
                debug!(%url, "fetching page over HTTP");
                let fetch_err = |source| BrowserError::Fetch {
                    url: url.clone(),
                    source,
                };
                let body = self
                    .client
                    .get(url)
                    .send()
                    .and_then(|r| r.error_for_status())
                    .and_then(|r| r.text())
                    .map_err(fetch_err)?;
                Ok(HtmlSnapshot::parse(&body))
            }
        }
    }
}
