use crate::api::{ApiResponse, AppError, AppState};
use crate::case::model::TestCase;
use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error, PartialEq)]
pub enum ExportError {
    #[error("unknown test case ids: {}", .0.join(", "))]
    UnknownCases(Vec<String>),
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportReceipt {
    pub target: String,
    pub exported: usize,
    pub case_ids: Vec<String>,
}

/// Pushes accepted test cases to an external issue tracker.
#[async_trait]
pub trait IssueExporter: Send + Sync {
    async fn export(&self, cases: &[TestCase]) -> Result<ExportReceipt, ExportError>;
}

/// Stands in for the issue tracker: logs what would be pushed and reports success.
pub struct SimulatedExporter {
    target: String,
}

impl SimulatedExporter {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

#[async_trait]
impl IssueExporter for SimulatedExporter {
    async fn export(&self, cases: &[TestCase]) -> Result<ExportReceipt, ExportError> {
        for case in cases {
            info!(
                "export to {}: {} \"{}\" ({} steps)",
                self.target,
                case.id,
                case.title,
                case.steps.len()
            );
        }
        Ok(ExportReceipt {
            target: self.target.clone(),
            exported: cases.len(),
            case_ids: cases.iter().map(|c| c.id.clone()).collect(),
        })
    }
}

#[derive(Deserialize, Default)]
pub struct ExportPayload {
    pub ids: Option<Vec<String>>,
}

pub async fn export_test_cases(
    State(app_state): State<AppState>,
    body: Bytes,
) -> Result<ApiResponse<ExportReceipt>, AppError> {
    let payload = parse_payload(&body).map_err(|e| AppError::Validation {
        kind: "invalid_request",
        message: format!("invalid export selection: {}", e),
    })?;
    let library = app_state.library.all().await;
    let selected = select_cases(library, payload.ids)?;
    let receipt = app_state.exporter.export(&selected).await?;
    Ok(ApiResponse(receipt))
}

/// An empty body selects every case; anything else must be a well-formed selection.
fn parse_payload(body: &[u8]) -> Result<ExportPayload, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ExportPayload::default());
    }
    serde_json::from_slice(body)
}

fn select_cases(library: Vec<TestCase>, ids: Option<Vec<String>>) -> Result<Vec<TestCase>, ExportError> {
    let ids = match ids {
        None => return Ok(library),
        Some(ids) => ids,
    };
    let unknown: Vec<String> = ids
        .iter()
        .filter(|id| !library.iter().any(|c| &c.id == *id))
        .cloned()
        .collect();
    if !unknown.is_empty() {
        return Err(ExportError::UnknownCases(unknown));
    }
    Ok(library.into_iter().filter(|c| ids.contains(&c.id)).collect())
}
