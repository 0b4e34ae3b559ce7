use thiserror::Error;

use crate::browser::error::SnapshotError;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// The candidate query itself failed; nothing could be scanned.
    #[error("DOM snapshot unavailable: {0}")]
    SnapshotUnavailable(#[source] SnapshotError),
}
