//! HTTP surface under `/api/message`
//!
//! Every response uses the same envelope: `{success, message, data}` on
//! success, `{success: false, message, errorKind}` on failure.

use crate::generator::ImageGenerator;
use crate::models::{
    GenerateImagesBody, GenerationRequest, GenerationResult, SendRequest, TemplateResponse,
};
use crate::error::ErrorKind;
use crate::Error;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

const SEND_PHONE_NUMBERS: [&str; 3] = ["010-0000-0000", "010-1234-5678", "010-5678-1234"];
const ADDRESS_NAMES: [&str; 2] = ["한성대 주소록", "김선생 수학 학원 주소록"];

#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<ImageGenerator>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            error_kind: None,
        }
    }
}

/// Error response in the shared envelope.
///
/// Built from crate errors and from extractor rejections, so malformed paths,
/// queries and bodies are reported the same way as generation failures.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: ErrorKind,
    message: String,
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self {
            status: StatusCode::from_u16(e.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

impl ApiError {
    fn rejected(status: StatusCode, message: String) -> Self {
        Self {
            status,
            kind: ErrorKind::Validation,
            message,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body: ApiResponse<()> = ApiResponse {
            success: false,
            message: self.message,
            data: None,
            error_kind: Some(self.kind.as_str()),
        };
        (self.status, Json(body)).into_response()
    }
}

/// `Json` whose rejection is an [`ApiError`].
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `Query` whose rejection is an [`ApiError`].
#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// `Path` whose rejection is an [`ApiError`].
#[derive(FromRequestParts)]
#[from_request(via(Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

#[derive(Debug, Deserialize)]
pub struct TemplateQuery {
    #[serde(rename = "userId")]
    pub user_id: u64,
    #[serde(rename = "selectedImageURL")]
    pub selected_image_url: String,
}

pub fn router(state: AppState) -> Router {
    let message_routes = Router::new()
        .route("/generate/:user_id", post(generate_images))
        .route("/template", get(get_template))
        .route("/send/:user_id", post(send_message))
        .route("/test/:user_id", post(send_test_message));

    Router::new()
        .nest("/api/message", message_routes)
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn generate_images(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<u64>,
    ApiJson(body): ApiJson<GenerateImagesBody>,
) -> Result<Json<ApiResponse<GenerationResult>>, ApiError> {
    info!("Image generation requested by user {}", user_id);

    let request = GenerationRequest::from_body(user_id, body);
    let generator = state.generator.clone();
    // Detached so a client disconnect does not abort styles mid-upload.
    let outcome = tokio::spawn(async move { generator.generate_images(&request).await })
        .await
        .map_err(|e| Error::Invariant(format!("Generation task did not complete: {}", e)))
        .and_then(|outcome| outcome);

    match outcome {
        Ok(result) => Ok(Json(ApiResponse::success("Images generated", result))),
        Err(e) => {
            error!("Image generation for user {} failed: {}", user_id, e);
            Err(e.into())
        }
    }
}

pub async fn get_template(
    ApiQuery(query): ApiQuery<TemplateQuery>,
) -> Json<ApiResponse<TemplateResponse>> {
    info!("Template requested by user {}", query.user_id);

    Json(ApiResponse::success(
        "Template loaded",
        TemplateResponse {
            selected_image_url: query.selected_image_url,
            send_phone_numbers: SEND_PHONE_NUMBERS.iter().map(|s| s.to_string()).collect(),
            address_names: ADDRESS_NAMES.iter().map(|s| s.to_string()).collect(),
        },
    ))
}

// Delivery is not wired up; both endpoints only acknowledge the request.
pub async fn send_message(
    ApiPath(user_id): ApiPath<u64>,
    body: Option<Json<SendRequest>>,
) -> Json<ApiResponse<u64>> {
    let request = body.map(|Json(b)| b).unwrap_or_default();
    info!(
        "Send requested by user {} ({} address books)",
        user_id,
        request.address_names.len()
    );
    Json(ApiResponse::success("Message send accepted", user_id))
}

pub async fn send_test_message(ApiPath(user_id): ApiPath<u64>) -> Json<ApiResponse<u64>> {
    info!("Test send requested by user {}", user_id);
    Json(ApiResponse::success("Test message send accepted", user_id))
}

pub async fn health() -> &'static str {
    "ok"
}
