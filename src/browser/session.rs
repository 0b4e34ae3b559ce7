use std::cell::RefCell;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::browser::error::{BrowserError, SnapshotError};
use crate::browser::snapshot::{DomSnapshot, ElementHandle, PageProvider, PageSource};
use crate::locator::locator_model::LocatorExpression;

pub const DEFAULT_SERVER_SCRIPT: &str = "node/page_server.js";
pub const DEFAULT_LOAD_TIMEOUT_MS: u64 = 10_000;

/// Request sent to page_server.js over stdin (one JSON line).
#[derive(Debug, Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum BrowserRequest {
    Navigate { url: String, timeout_ms: u64 },
    SetContent { html: String, timeout_ms: u64 },
    QueryCandidates { tags: Vec<String> },
    Attribute { index: usize, name: String },
    Text { index: usize },
    Count { xpath: String, timeout_ms: u64 },
    Quit,
}

impl BrowserRequest {
    pub fn load(source: &PageSource, timeout_ms: u64) -> Self {
        match source {
            PageSource::Url(url) => BrowserRequest::Navigate {
                url: url.clone(),
                timeout_ms,
            },
            PageSource::Html(html) => BrowserRequest::SetContent {
                html: html.clone(),
                timeout_ms,
            },
        }
    }

    pub fn query_candidates(tags: &[&str]) -> Self {
        BrowserRequest::QueryCandidates {
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// A zero wait is sent as 1 ms; Playwright reads 0 as "no timeout".
    pub fn count(expression: &LocatorExpression, wait: Duration) -> Self {
        BrowserRequest::Count {
            xpath: expression.to_xpath(),
            timeout_ms: (wait.as_millis() as u64).max(1),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            BrowserRequest::Navigate { .. } => "navigate",
            BrowserRequest::SetContent { .. } => "set_content",
            BrowserRequest::QueryCandidates { .. } => "query_candidates",
            BrowserRequest::Attribute { .. } => "attribute",
            BrowserRequest::Text { .. } => "text",
            BrowserRequest::Count { .. } => "count",
            BrowserRequest::Quit => "quit",
        }
    }
}

/// Response received from page_server.js over stdout (one JSON line).
#[derive(Debug, Deserialize)]
pub struct BrowserResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub ready: Option<bool>,
    #[serde(default)]
    pub elements: Option<Vec<ElementHandle>>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub timed_out: Option<bool>,
}

struct SessionIo {
    stdin: ChildStdin,
    reader: BufReader<ChildStdout>,
}

/// A headless browser page backed by page_server.js.
///
/// Launches a long-lived Node.js process that keeps one Chromium page open.
/// Commands are sent as NDJSON over stdin, responses read from stdout.
/// Queries take `&self`; the pipes sit behind a `RefCell`.
pub struct BrowserSession {
    child: Child,
    io: RefCell<SessionIo>,
    load_timeout_ms: u64,
    closed: bool,
}

impl BrowserSession {
    /// Launch a new browser session by spawning the page server script.
    pub fn launch(script: &str, load_timeout_ms: u64) -> Result<Self, BrowserError> {
        let mut child = Command::new("node")
            .arg(script)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| BrowserError::SubprocessSpawn {
                script: script.into(),
                source: e,
            })?;

        let stdin = child.stdin.take().ok_or_else(|| {
            BrowserError::SessionIO(format!("Failed to capture stdin of {}", script))
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            BrowserError::SessionIO(format!("Failed to capture stdout of {}", script))
        })?;

        let session = BrowserSession {
            child,
            io: RefCell::new(SessionIo {
                stdin,
                reader: BufReader::new(stdout),
            }),
            load_timeout_ms,
            closed: false,
        };

        // Wait for the ready signal
        let response = session.read_response("ready signal")?;
        if !response.ok || response.ready != Some(true) {
            return Err(BrowserError::SessionProtocol {
                command: "launch".into(),
                error: format!("Did not receive ready signal from {}", script),
            });
        }

        debug!(script, "browser session ready");
        Ok(session)
    }

    fn read_response(&self, context: &str) -> Result<BrowserResponse, BrowserError> {
        let mut io = self.io.borrow_mut();
        let mut line = String::new();
        io.reader.read_line(&mut line).map_err(|e| {
            BrowserError::SessionIO(format!("Failed to read {}: {}", context, e))
        })?;

        if line.trim().is_empty() {
            return Err(BrowserError::SessionIO(format!(
                "Empty {} from page server (process may have died)",
                context
            )));
        }

        serde_json::from_str(line.trim()).map_err(|e| BrowserError::JsonParse {
            context: context.into(),
            source: e,
        })
    }

    /// Send a request and read the response.
    fn send(&self, request: &BrowserRequest) -> Result<BrowserResponse, BrowserError> {
        let json = serde_json::to_string(request).map_err(|e| BrowserError::JsonSerialize {
            context: "BrowserRequest".into(),
            source: e,
        })?;

        {
            let mut io = self.io.borrow_mut();
            writeln!(io.stdin, "{}", json).map_err(|e| {
                BrowserError::SessionIO(format!("Failed to write to page server stdin: {}", e))
            })?;
            io.stdin.flush().map_err(|e| {
                BrowserError::SessionIO(format!("Failed to flush page server stdin: {}", e))
            })?;
        }

        self.read_response("page server response")
    }

    /// Send a request and verify it succeeded.
    fn send_ok(&self, request: &BrowserRequest) -> Result<BrowserResponse, BrowserError> {
        let response = self.send(request)?;
        if !response.ok {
            return Err(BrowserError::SessionProtocol {
                command: request.name().into(),
                error: response.error.unwrap_or_else(|| "Unknown error".into()),
            });
        }
        Ok(response)
    }

    /// Navigate to a URL or install raw HTML, then wait for `body`.
    pub fn load(&mut self, source: &PageSource) -> Result<(), BrowserError> {
        let request = BrowserRequest::load(source, self.load_timeout_ms);
        self.send_ok(&request)?;
        info!(source = ?source.url().unwrap_or("<inline html>"), "page loaded");
        Ok(())
    }

    /// Quit the browser session.
    pub fn quit(&mut self) -> Result<(), BrowserError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        // Best-effort quit; the process may already be gone
        let _ = self.send(&BrowserRequest::Quit);
        let _ = self.child.wait();
        Ok(())
    }
}

impl DomSnapshot for BrowserSession {
    fn find_candidates(&self, tags: &[&str]) -> Result<Vec<ElementHandle>, SnapshotError> {
        let response = self.send_ok(&BrowserRequest::query_candidates(tags))?;
        response.elements.ok_or_else(|| {
            SnapshotError::Unavailable("No elements in query_candidates response".into())
        })
    }

    fn attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, SnapshotError> {
        let request = BrowserRequest::Attribute {
            index: element.index,
            name: name.to_string(),
        };
        Ok(self.send_ok(&request)?.value)
    }

    fn visible_text(&self, element: &ElementHandle) -> Result<String, SnapshotError> {
        let request = BrowserRequest::Text {
            index: element.index,
        };
        let text = self.send_ok(&request)?.text.unwrap_or_default();
        Ok(text.trim().to_string())
    }

    fn match_count(
        &self,
        expression: &LocatorExpression,
        wait: Duration,
    ) -> Result<usize, SnapshotError> {
        let response = self.send_ok(&BrowserRequest::count(expression, wait))?;
        if response.timed_out == Some(true) {
            return Err(SnapshotError::Timeout {
                expression: expression.to_xpath(),
                waited_ms: wait.as_millis() as u64,
            });
        }
        Ok(response.count.unwrap_or(0))
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if let Err(e) = self.quit() {
            warn!("failed to close browser session: {}", e);
        }
    }
}

// ============================================================================
// BrowserPageProvider: one fresh headless browser per fetch
// ============================================================================

pub struct BrowserPageProvider {
    pub script: String,
    pub load_timeout_ms: u64,
}

impl Default for BrowserPageProvider {
    fn default() -> Self {
        Self {
            script: DEFAULT_SERVER_SCRIPT.to_string(),
            load_timeout_ms: DEFAULT_LOAD_TIMEOUT_MS,
        }
    }
}

impl BrowserPageProvider {
    pub fn new(script: &str, load_timeout_ms: u64) -> Self {
        Self {
            script: script.to_string(),
            load_timeout_ms,
        }
    }
}

impl PageProvider for BrowserPageProvider {
    type Snapshot = BrowserSession;

    fn fetch(&mut self, source: &PageSource) -> Result<BrowserSession, BrowserError> {
        let mut session = BrowserSession::launch(&self.script, self.load_timeout_ms)?;
        // On failure the session is dropped here, which quits the browser
        session.load(source)?;
        Ok(session)
    }
}
