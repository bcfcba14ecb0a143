use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use lingua_core::RequestContext;
use std::sync::Arc;
use uuid::Uuid;

use crate::THREAD_ID_HEADER;
use crate::contract::v1::{
    ClearResponse, HealthResponse, HistoryResponse, TranslateRequest, TranslateResponse,
};
use crate::error::ApiError;
use crate::state::ApiState;

/// Longest accepted conversation id.
const MAX_THREAD_ID_LEN: usize = 128;

fn header_thread_id(headers: &HeaderMap) -> Result<Option<String>, ApiError> {
    let Some(value) = headers.get(THREAD_ID_HEADER) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| ApiError::BadRequest(format!("{THREAD_ID_HEADER} must be visible ASCII")))?
        .trim();

    if value.is_empty() {
        return Ok(None);
    }
    if value.len() > MAX_THREAD_ID_LEN {
        return Err(ApiError::BadRequest(format!(
            "{THREAD_ID_HEADER} longer than {MAX_THREAD_ID_LEN} characters"
        )));
    }
    Ok(Some(value.to_string()))
}

fn required_thread_id(headers: &HeaderMap) -> Result<String, ApiError> {
    header_thread_id(headers)?
        .ok_or_else(|| ApiError::BadRequest(format!("missing {THREAD_ID_HEADER} header")))
}

pub(super) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Translate text, or clear the conversation when `command` is `clear`.
pub(super) async fn translate(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<TranslateResponse>, ApiError> {
    let request = TranslateRequest::from_slice(&body)?;
    let thread_id = header_thread_id(&headers)?.unwrap_or_else(|| Uuid::new_v4().to_string());

    let ctx = RequestContext::new(thread_id);
    let input = state.defaults.resolve(
        request.command,
        request.text,
        request.to_language,
        request.model,
    );

    let output = state.agent.handle(&ctx, input).await?;
    Ok(Json(output))
}

pub(super) async fn history(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> Result<Json<HistoryResponse>, ApiError> {
    let ctx = RequestContext::new(required_thread_id(&headers)?);
    let history = state.agent.history(&ctx).await?;

    Ok(Json(HistoryResponse {
        thread_id: ctx.thread_id,
        translation_count: history.translation_count,
        history: history.entries,
    }))
}

pub(super) async fn clear_history(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> Result<Json<ClearResponse>, ApiError> {
    let ctx = RequestContext::new(required_thread_id(&headers)?);
    state
        .agent
        .handle(&ctx, lingua_core::TranslateInput::clear())
        .await?;

    Ok(Json(ClearResponse {
        thread_id: ctx.thread_id,
        cleared: true,
    }))
}
