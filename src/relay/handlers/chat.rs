use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use secrecy::SecretString;
use serde_json::{json, Value};

use super::helpers::{bad_request, from_backend_error, preview, token_budget, ApiError, ApiResult};
use crate::error::AssistantError;
use crate::protocol::{ChatReply, ErrorBody, RelayRequest};
use crate::relay::ServerState;

const QUERY_PREVIEW_CHARS: usize = 50;

pub async fn handle_chat(
    State(state): State<ServerState>,
    payload: Result<Json<RelayRequest>, JsonRejection>,
) -> ApiResult<Json<ChatReply>> {
    // A body that is not declared as JSON carries no fields at all.
    let req = match payload {
        Ok(Json(req)) => req,
        Err(JsonRejection::MissingJsonContentType(_)) => RelayRequest::default(),
        Err(rejection) => {
            return Err(bad_request("Invalid request body", rejection.body_text()));
        }
    };

    let missing = req.missing_fields();
    if !missing.is_empty() {
        log::debug!("Rejecting chat request, missing {missing:?}");
        return Err(from_backend_error(AssistantError::missing(missing)));
    }

    let max_tokens = token_budget(
        req.max_tokens,
        state.default_max_tokens,
        state.max_tokens_cap,
    );
    let query = req.query.unwrap_or_default();
    let api_key = req
        .api_key
        .unwrap_or_else(|| SecretString::new(String::new()));
    log::info!(
        "Chat request: query={:?} has_api_key=true max_tokens={max_tokens}",
        preview(&query, QUERY_PREVIEW_CHARS)
    );

    let response = state
        .backend
        .complete(&api_key, &query, max_tokens)
        .await
        .map_err(|err| {
            log::warn!("Chat request failed: {err}");
            from_backend_error(err)
        })?;

    Ok(Json(ChatReply { response }))
}

pub async fn method_not_allowed() -> ApiError {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorBody::new("Method not allowed")),
    )
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
