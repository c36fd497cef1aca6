use crate::api::{ApiResponse, AppError, AppState};
use crate::case::model::TestCase;
use crate::case::stats::LibraryStats;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

pub async fn list_test_cases(State(app_state): State<AppState>) -> ApiResponse<Vec<TestCase>> {
    ApiResponse(app_state.library.all().await)
}

pub async fn get_test_case(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<ApiResponse<TestCase>, AppError> {
    let result = Ok(app_state.library.get(&id).await);
    ApiResponse::from_option(result)
}

/// Imports externally authored records through the same gate generated ones pass.
pub async fn import_test_cases(
    State(app_state): State<AppState>,
    payload: Result<Json<Vec<TestCase>>, JsonRejection>,
) -> Result<ApiResponse<ImportResult>, AppError> {
    let Json(cases) = payload?;
    let result = app_state
        .library
        .accept(cases)
        .await
        .map(|accepted| ImportResult { accepted })
        .map_err(AppError::from);
    ApiResponse::from(result)
}

pub async fn dashboard(State(app_state): State<AppState>) -> ApiResponse<LibraryStats> {
    ApiResponse(app_state.library.stats().await)
}

#[derive(Serialize)]
pub struct ImportResult {
    pub accepted: usize,
}
