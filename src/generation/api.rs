use crate::api::{ApiResponse, AppError, AppState};
use crate::case::model::TestCase;
use crate::generation::model::{CandidateBatch, GenerationRequest};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

pub async fn generate_test_cases(
    State(app_state): State<AppState>,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<ApiResponse<CandidateBatch>, AppError> {
    let Json(request) = payload?;
    let candidates = app_state
        .generator
        .generate(&request, app_state.shutdown.child_token())
        .await?;
    let batch = CandidateBatch::new(&request, candidates);
    app_state.review.stage(batch.clone()).await;
    Ok(ApiResponse(batch))
}

pub async fn get_pending_batch(
    State(app_state): State<AppState>,
) -> Result<ApiResponse<CandidateBatch>, AppError> {
    ApiResponse::from_option(Ok(app_state.review.pending().await))
}

pub async fn accept_batch(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<ApiResponse<Vec<TestCase>>, AppError> {
    let batch = app_state
        .review
        .take(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("No pending candidate batch {}", id)))?;
    let candidates = batch.candidates.clone();
    match app_state.library.accept(candidates.clone()).await {
        Ok(_) => Ok(ApiResponse(candidates)),
        Err(err) => {
            app_state.review.restore(batch).await;
            Err(err.into())
        }
    }
}

pub async fn discard_batch(
    Path(id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<StatusCode, AppError> {
    if app_state.review.discard(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("No pending candidate batch {}", id)))
    }
}
