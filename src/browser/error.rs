use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrowserError {
    /// Node.js subprocess failed to spawn (page_server.js)
    #[error("Failed to spawn {script} (is Node.js installed?): {source}")]
    SubprocessSpawn {
        script: String,
        #[source]
        source: std::io::Error,
    },

    /// Pipe to or from the subprocess broke
    #[error("Browser session I/O: {0}")]
    SessionIO(String),

    /// Server replied with ok=false or an unexpected payload
    #[error("Browser command '{command}' failed: {error}")]
    SessionProtocol { command: String, error: String },

    #[error("JSON parse error ({context}): {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON serialize error ({context}): {source}")]
    JsonSerialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Static page fetch over HTTP failed
    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read HTML file {path}: {source}")]
    ReadHtml {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Either url or html must be provided")]
    MissingSource,
}

/// Failures reading from a DOM snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The snapshot cannot be queried at all (browser gone, pipe closed).
    #[error("snapshot unavailable: {0}")]
    Unavailable(String),

    /// The handle no longer refers to an element in this snapshot.
    #[error("stale element reference #{0}")]
    StaleElement(usize),

    /// A single query failed; the snapshot itself is still usable.
    #[error("query failed: {0}")]
    Query(String),

    /// Waiting for a locator to become present ran out of time.
    #[error("timed out after {waited_ms}ms waiting for {expression}")]
    Timeout { expression: String, waited_ms: u64 },
}

impl From<BrowserError> for SnapshotError {
    fn from(err: BrowserError) -> Self {
        match err {
            BrowserError::SessionProtocol { command, error } => {
                SnapshotError::Query(format!("{}: {}", command, error))
            }
            other => SnapshotError::Unavailable(other.to_string()),
        }
    }
}
