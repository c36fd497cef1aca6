use crate::case::api::{dashboard, get_test_case, import_test_cases, list_test_cases};
use crate::case::service::{LibraryError, TestLibrary};
use crate::export::{export_test_cases, ExportError, IssueExporter};
use crate::generation::api::{accept_batch, discard_batch, generate_test_cases, get_pending_batch};
use crate::generation::model::GenerationError;
use crate::generation::review::ReviewSlot;
use crate::generation::service::Generator;
use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;
use tracing::Level;

#[derive(Clone)]
pub struct AppState {
    pub library: Arc<TestLibrary>,
    pub generator: Arc<Generator>,
    pub review: Arc<ReviewSlot>,
    pub exporter: Arc<dyn IssueExporter>,
    pub shutdown: CancellationToken,
}

pub fn build_api(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/test-cases/:id", get(get_test_case))
        .route("/test-cases", get(list_test_cases).post(import_test_cases))
        .route("/dashboard", get(dashboard))
        .route("/generations/pending", get(get_pending_batch))
        .route("/generations/:id/accept", post(accept_batch))
        .route("/generations/:id", delete(discard_batch))
        .route("/generations", post(generate_test_cases))
        .route("/export", post(export_test_cases))
        .layer(cors)
        .layer(TraceLayer::new_for_http()
            .make_span_with(
                DefaultMakeSpan::new().include_headers(false))
            .on_request(
                DefaultOnRequest::new()
                    .level(Level::INFO))
            .on_response(
                DefaultOnResponse::new()
                    .level(Level::INFO)
                    .latency_unit(LatencyUnit::Micros)
            ))
        .with_state(app_state)
}

pub struct ApiResponse<T>(pub T);

impl<T> ApiResponse<T> {
    pub fn from(result: Result<T, AppError>) -> Result<ApiResponse<T>, AppError> {
        result.map(ApiResponse)
    }

    pub fn from_option(result: Result<Option<T>, AppError>) -> Result<ApiResponse<T>, AppError> {
        match result? {
            None => Err(AppError::NotFound("Not found".to_string())),
            Some(val) => Ok(ApiResponse(val)),
        }
    }
}

impl<T> IntoResponse for ApiResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        match serde_json::to_string(&self.0) {
            Ok(json) => json_response(StatusCode::OK, json),
            Err(e) => AppError::Internal(format!("Failed to serialize response: {}", e)).into_response(),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum AppError {
    NotFound(String),
    Validation { kind: &'static str, message: String },
    Conflict { kind: &'static str, message: String },
    Upstream { kind: &'static str, message: String },
    UpstreamTimeout(String),
    Unavailable { kind: &'static str, message: String },
    Internal(String),
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
}

impl From<ErrorBody> for Body {
    fn from(body: ErrorBody) -> Body {
        Body::from(serde_json::to_string(&body).unwrap_or_default())
    }
}

impl From<GenerationError> for AppError {
    fn from(err: GenerationError) -> Self {
        let kind = err.kind();
        let message = err.to_string();
        match err {
            GenerationError::InvalidRequest(_) => AppError::Validation { kind, message },
            GenerationError::Busy => AppError::Conflict { kind, message },
            GenerationError::EmptyResponse | GenerationError::SchemaViolation(_) => {
                AppError::Upstream { kind, message }
            }
            ref transport @ GenerationError::Transport { .. } => {
                if transport.is_timeout() {
                    AppError::UpstreamTimeout(message)
                } else {
                    AppError::Upstream { kind, message }
                }
            }
            GenerationError::Configuration(_) | GenerationError::Cancelled => {
                AppError::Unavailable { kind, message }
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation {
            kind: "invalid_request",
            message: rejection.body_text(),
        }
    }
}

impl From<LibraryError> for AppError {
    fn from(err: LibraryError) -> Self {
        let message = err.to_string();
        match err {
            LibraryError::InvalidCase { .. } => AppError::Validation {
                kind: "invalid_case",
                message,
            },
            LibraryError::DuplicateId(_) => AppError::Conflict {
                kind: "duplicate_id",
                message,
            },
        }
    }
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::UnknownCases(_) => AppError::NotFound(err.to_string()),
        }
    }
}

fn json_response(status: StatusCode, body: impl Into<Body>) -> Response {
    let mut response = Response::new(body.into());
    *response.status_mut() = status;
    response.headers_mut().insert(
        axum::http::header::CONTENT_TYPE,
        axum::http::HeaderValue::from_static("application/json"),
    );
    response
}

fn error_response(status: StatusCode, kind: &str, message: String) -> Response {
    json_response(
        status,
        ErrorBody {
            kind: kind.to_string(),
            message,
        },
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound(message) => error_response(StatusCode::NOT_FOUND, "not_found", message),
            AppError::Validation { kind, message } => error_response(StatusCode::BAD_REQUEST, kind, message),
            AppError::Conflict { kind, message } => error_response(StatusCode::CONFLICT, kind, message),
            AppError::Upstream { kind, message } => error_response(StatusCode::BAD_GATEWAY, kind, message),
            AppError::UpstreamTimeout(message) => {
                error_response(StatusCode::GATEWAY_TIMEOUT, "transport", message)
            }
            AppError::Unavailable { kind, message } => {
                error_response(StatusCode::SERVICE_UNAVAILABLE, kind, message)
            }
            AppError::Internal(message) => {
                tracing::error!("{}", message);
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "Internal server error".to_string(),
                )
            }
        }
    }
}
