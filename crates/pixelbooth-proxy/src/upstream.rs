//! Client for the remote face-detection and pixel-art service.

use async_trait::async_trait;
use axum::{
    body::Bytes,
    http::{HeaderValue, StatusCode},
};
use pixelbooth_core::{
    ConversionService, ConversionStage, ConvertResponse, ImagePayload, ServiceError,
};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::error::ProxyError;

/// An upstream answer, kept byte-for-byte.
pub struct Forwarded {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

pub struct PixelMeClient {
    http: reqwest::Client,
    base: String,
}

impl PixelMeClient {
    pub fn new(base: impl Into<String>) -> Self {
        let mut base = base.into();
        while base.ends_with('/') {
            base.pop();
        }

        Self {
            http: reqwest::Client::new(),
            base,
        }
    }

    /// Full URL of the upstream route for `stage`.
    pub fn endpoint(&self, stage: ConversionStage) -> String {
        format!("{}/{}", self.base, stage.name())
    }

    /// Post `payload` to the upstream route for `stage` and return its
    /// status, content type, and body untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Upstream`] when no response arrives.
    pub async fn forward(
        &self,
        stage: ConversionStage,
        payload: &ImagePayload,
    ) -> Result<Forwarded, ProxyError> {
        let url = self.endpoint(stage);
        debug!(%url, bytes = payload.image.len(), "forwarding");

        let response = self.http.post(&url).json(payload).send().await?;
        let status = StatusCode::from_u16(response.status().as_u16())
            .unwrap_or(StatusCode::BAD_GATEWAY);
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| HeaderValue::from_bytes(value.as_bytes()).ok());
        let body = response.bytes().await?;

        info!(%stage, %status, bytes = body.len(), "upstream answered");
        Ok(Forwarded {
            status,
            content_type,
            body,
        })
    }

    async fn call<R: DeserializeOwned>(
        &self,
        stage: ConversionStage,
        payload: &ImagePayload,
    ) -> Result<R, ServiceError> {
        let forwarded = self
            .forward(stage, payload)
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        if !forwarded.status.is_success() {
            return Err(ServiceError::Status {
                status: forwarded.status.as_u16(),
                body: String::from_utf8_lossy(&forwarded.body).into_owned(),
            });
        }

        serde_json::from_slice(&forwarded.body).map_err(|e| ServiceError::Malformed(e.to_string()))
    }
}

#[async_trait(?Send)]
impl ConversionService for PixelMeClient {
    async fn detect_face(&self, request: &ImagePayload) -> Result<ImagePayload, ServiceError> {
        self.call(ConversionStage::Detect, request).await
    }

    async fn convert_face(
        &self,
        request: &ImagePayload,
    ) -> Result<ConvertResponse, ServiceError> {
        self.call(ConversionStage::Convert, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_appends_stage_to_trimmed_base() {
        let client = PixelMeClient::new("http://svc.local/api/");
        assert_eq!(
            client.endpoint(ConversionStage::Detect),
            "http://svc.local/api/detect"
        );
        assert_eq!(
            client.endpoint(ConversionStage::Convert),
            "http://svc.local/api/convert"
        );
    }
}
