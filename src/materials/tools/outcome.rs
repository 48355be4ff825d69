use std::collections::BTreeMap;

use serde::Serialize;

use crate::materials::tools::error::ToolError;
use crate::materials::tools::record::Record;

/// Single structured result returned by every use case.
///
/// Serialises as `{"status": "success", ...payload, "timestamp": ...}` or
/// `{"status": "error", "error": ..., "timestamp": ...}`.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    #[serde(flatten)]
    pub status: Status,
    /// ISO-8601 local time at which the outcome was produced.
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Status {
    Success(Payload),
    Error { error: String },
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Search(SearchPayload),
    Export(ExportPayload),
    Compare(ComparePayload),
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchPayload {
    pub count: usize,
    pub query: BTreeMap<String, String>,
    pub results: Vec<Record>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportPayload {
    pub file_path: String,
    pub num_materials: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparePayload {
    pub num_materials: usize,
    pub comparison: Vec<Record>,
}

impl Outcome {
    pub fn success(payload: Payload) -> Self {
        Self {
            status: Status::Success(payload),
            timestamp: now(),
        }
    }

    pub fn failure(error: &ToolError) -> Self {
        Self {
            status: Status::Error {
                error: error.to_string(),
            },
            timestamp: now(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, Status::Success(_))
    }

    pub fn payload(&self) -> Option<&Payload> {
        match &self.status {
            Status::Success(payload) => Some(payload),
            Status::Error { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            Status::Success(_) => None,
            Status::Error { error } => Some(error),
        }
    }
}

fn now() -> String {
    chrono::Local::now().to_rfc3339()
}
