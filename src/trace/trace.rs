use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    FetchPage,
    ExtractLocators,
    GenerateCode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Ok,
    Failed,
}

/// One line of the JSONL trace file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    pub stage: PipelineStage,
    pub status: StageStatus,

    pub detail: Option<String>,
    pub locator_count: Option<usize>,
    pub duration_ms: Option<u128>,
}

impl TraceEvent {
    pub fn now(stage: PipelineStage, status: StageStatus) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            stage,
            status,
            detail: None,
            locator_count: None,
            duration_ms: None,
        }
    }

    pub fn with_detail(mut self, detail: impl ToString) -> Self {
        self.detail = Some(detail.to_string());
        self
    }

    pub fn with_locator_count(mut self, count: usize) -> Self {
        self.locator_count = Some(count);
        self
    }

    pub fn with_duration(mut self, duration_ms: u128) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}
