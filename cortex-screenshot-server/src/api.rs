use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cortex::{ActionFailure, ActionRequest, Dispatcher};
use serde_json::Value;
use tracing::{error, info};

use crate::types::{ErrorResponse, HealthResponse, HelloResponse, ScreenshotResponse};

pub const SERVER_NAME: &str = "mac_screenshot_server";

// ============================================================================
// Error Handling
// ============================================================================

/// Any failed action surfaces as a 500 with `{"success": false, "error": ...}`.
pub struct ApiError(String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                success: false,
                error: self.0,
            }),
        )
            .into_response()
    }
}

impl From<ActionFailure> for ApiError {
    fn from(failure: ActionFailure) -> Self {
        ApiError(failure.detail)
    }
}

// ============================================================================
// Screenshot
// ============================================================================

pub async fn screenshot(
    State(dispatcher): State<Dispatcher>,
) -> Result<Json<ScreenshotResponse>, ApiError> {
    info!("📡 GET /screenshot");

    let payload = dispatcher
        .dispatch(ActionRequest::without_params("capture_screenshot"))
        .await
        .into_result()
        .inspect_err(|failure| error!("❌ Error taking screenshot: {}", failure))?;

    let field = |key: &str| {
        payload
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ApiError(format!("capture result is missing '{key}'")))
    };
    let image = field("image")?;
    let timestamp = field("timestamp")?;

    let bytes = payload.get("bytes").and_then(Value::as_u64).unwrap_or(0);
    info!(bytes, "✅ Simulator screenshot served");
    Ok(Json(ScreenshotResponse {
        success: true,
        image,
        timestamp,
    }))
}

// ============================================================================
// Health Check / Hello
// ============================================================================

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        server: SERVER_NAME.to_string(),
    })
}

pub async fn hello() -> Json<HelloResponse> {
    info!("Hello from Mac!");
    Json(HelloResponse {
        message: "Hello from Mac!".to_string(),
    })
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}
