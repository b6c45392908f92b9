use axum::http::StatusCode;
use axum::Json;

use crate::error::AssistantError;
use crate::protocol::ErrorBody;

pub type ApiError = (StatusCode, Json<ErrorBody>);
pub type ApiResult<T> = Result<T, ApiError>;

pub fn bad_request(msg: impl Into<String>, details: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody::with_details(msg, details)),
    )
}

pub fn internal_error(details: impl Into<String>) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::with_details("Internal server error", details)),
    )
}

pub fn gateway_timeout() -> ApiError {
    (
        StatusCode::GATEWAY_TIMEOUT,
        Json(ErrorBody::new("Upstream request timed out")),
    )
}

/// Forwards the provider's status code together with its message.
pub fn upstream_error(status: u16, message: impl Into<String>) -> ApiError {
    let code = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
    (
        code,
        Json(ErrorBody::with_details(
            message,
            format!("Fireworks API returned {status}"),
        )),
    )
}

pub fn from_backend_error(err: AssistantError) -> ApiError {
    match err {
        AssistantError::Upstream { status, message } => upstream_error(status, message),
        AssistantError::Timeout(_) => gateway_timeout(),
        AssistantError::Validation { fields } => {
            bad_request("Missing required fields", format!("Missing: {}", fields.join(" ")))
        }
        other => internal_error(other.to_string()),
    }
}

/// Tokens to request upstream: the caller's value or the default, capped.
pub fn token_budget(requested: Option<u32>, default: u32, cap: u32) -> u32 {
    requested.unwrap_or(default).min(cap).max(1)
}

/// First `max` characters of `text`, for logs.
pub fn preview(text: &str, max: usize) -> String {
    let mut out: String = text.chars().take(max).collect();
    if text.chars().nth(max).is_some() {
        out.push_str("...");
    }
    out
}
