use crate::case::model::{ComplianceStandard, TestCase};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub requirement_text: String,
    #[serde(default = "default_standards")]
    pub standards: Vec<ComplianceStandard>,
    /// Requirement identifier from an external requirements system, if known.
    #[serde(default)]
    pub traceability_id: Option<String>,
}

fn default_standards() -> Vec<ComplianceStandard> {
    vec![ComplianceStandard::Hipaa]
}

impl GenerationRequest {
    pub fn new(requirement_text: impl Into<String>, standards: Vec<ComplianceStandard>) -> Self {
        GenerationRequest {
            requirement_text: requirement_text.into(),
            standards,
            traceability_id: None,
        }
    }

    /// Selected standards with repeats removed, first occurrence wins.
    pub fn distinct_standards(&self) -> Vec<ComplianceStandard> {
        let mut distinct = Vec::with_capacity(self.standards.len());
        for standard in &self.standards {
            if !distinct.contains(standard) {
                distinct.push(*standard);
            }
        }
        distinct
    }
}

/// Generated candidates waiting for the reviewer's decision.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CandidateBatch {
    pub id: String,
    pub requirement_text: String,
    pub standards: Vec<ComplianceStandard>,
    pub candidates: Vec<TestCase>,
    pub generated_at: DateTime<Utc>,
}

impl CandidateBatch {
    pub fn new(request: &GenerationRequest, candidates: Vec<TestCase>) -> Self {
        CandidateBatch {
            id: uuid::Uuid::new_v4().to_string(),
            requirement_text: request.requirement_text.clone(),
            standards: request.distinct_standards(),
            candidates,
            generated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenerationError {
    #[error("invalid generation request: {0}")]
    InvalidRequest(String),
    #[error("generation service is not configured: {0}")]
    Configuration(String),
    #[error("generation service returned no content")]
    EmptyResponse,
    #[error("generated output does not match the test case schema: {0}")]
    SchemaViolation(String),
    #[error("generation service call failed: {message}")]
    Transport {
        status: Option<u16>,
        message: String,
        timed_out: bool,
    },
    #[error("another generation is already in progress")]
    Busy,
    #[error("generation was cancelled")]
    Cancelled,
}

impl GenerationError {
    pub fn transport(message: impl Into<String>) -> Self {
        GenerationError::Transport {
            status: None,
            message: message.into(),
            timed_out: false,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        GenerationError::Transport {
            status: None,
            message: message.into(),
            timed_out: true,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, GenerationError::Transport { timed_out: true, .. })
    }

    /// Stable classification string exposed to API clients.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::InvalidRequest(_) => "invalid_request",
            GenerationError::Configuration(_) => "configuration",
            GenerationError::EmptyResponse => "empty_response",
            GenerationError::SchemaViolation(_) => "schema_violation",
            GenerationError::Transport { .. } => "transport",
            GenerationError::Busy => "busy",
            GenerationError::Cancelled => "cancelled",
        }
    }
}
