use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{HeaderValue, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use pixelbooth_core::{ConversionStage, ImagePayload};

use crate::{error::ProxyError, state::AppState};

pub async fn detect_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ImagePayload>,
) -> Result<Response, ProxyError> {
    forward(&state, ConversionStage::Detect, &payload).await
}

pub async fn convert_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ImagePayload>,
) -> Result<Response, ProxyError> {
    forward(&state, ConversionStage::Convert, &payload).await
}

async fn forward(
    state: &AppState,
    stage: ConversionStage,
    payload: &ImagePayload,
) -> Result<Response, ProxyError> {
    let upstream = state.client.forward(stage, payload).await?;
    let content_type = upstream
        .content_type
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));

    Ok((upstream.status, [(CONTENT_TYPE, content_type)], upstream.body).into_response())
}
