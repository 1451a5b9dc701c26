//! Browser-side client for the conversion proxy.
//!
//! Posts `{"image": ...}` to `<endpoint>/detect` and `<endpoint>/convert`
//! with `fetch` and parses the JSON answers. No timeout or retry is
//! applied; a request that never settles leaves the booth in flight.

use async_trait::async_trait;
use pixelbooth_core::{
    ConversionService, ConversionStage, ConvertResponse, ImagePayload, ServiceError,
};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response};

/// [`ConversionService`] that talks to the proxy over `fetch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyClient {
    endpoint: String,
}

impl ProxyClient {
    /// A client for the proxy mounted at `endpoint` (e.g. `/api/pixelme`).
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_owned(),
        }
    }

    /// Full URL for `stage`.
    #[must_use]
    pub fn url(&self, stage: ConversionStage) -> String {
        format!("{}/{}", self.endpoint, stage.name())
    }

    #[allow(clippy::future_not_send)] // WASM is single-threaded; JsFuture is !Send
    async fn post(
        &self,
        stage: ConversionStage,
        payload: &ImagePayload,
    ) -> Result<String, ServiceError> {
        let body =
            serde_json::to_string(payload).map_err(|e| ServiceError::Malformed(e.to_string()))?;
        let url = self.url(stage);
        tracing::info!(%url, bytes = body.len(), "posting");

        let (status, text) = fetch_text(&url, &body)
            .await
            .map_err(|e| ServiceError::Transport(format!("{e:?}")))?;

        if !(200..300).contains(&status) {
            tracing::warn!(%stage, status, "proxy returned an error");
            return Err(ServiceError::Status { status, body: text });
        }
        Ok(text)
    }
}

#[async_trait(?Send)]
impl ConversionService for ProxyClient {
    async fn detect_face(&self, request: &ImagePayload) -> Result<ImagePayload, ServiceError> {
        let text = self.post(ConversionStage::Detect, request).await?;
        serde_json::from_str(&text).map_err(|e| ServiceError::Malformed(e.to_string()))
    }

    async fn convert_face(
        &self,
        request: &ImagePayload,
    ) -> Result<ConvertResponse, ServiceError> {
        let text = self.post(ConversionStage::Convert, request).await?;
        serde_json::from_str(&text).map_err(|e| ServiceError::Malformed(e.to_string()))
    }
}

/// POST `body` as JSON to `url`; return the status and response text.
#[allow(clippy::future_not_send)]
async fn fetch_text(url: &str, body: &str) -> Result<(u16, String), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;

    let headers = Headers::new()?;
    headers.set("Content-Type", "application/json")?;

    let init = RequestInit::new();
    init.set_method("POST");
    init.set_headers(&headers);
    init.set_body(&JsValue::from_str(body));

    let request = Request::new_with_str_and_init(url, &init)?;
    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await?
        .dyn_into()?;

    let status = response.status();
    let text = JsFuture::from(response.text()?)
        .await?
        .as_string()
        .unwrap_or_default();
    Ok((status, text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_endpoint_and_stage() {
        let client = ProxyClient::new("/api/pixelme/");
        assert_eq!(client.url(ConversionStage::Detect), "/api/pixelme/detect");
        assert_eq!(client.url(ConversionStage::Convert), "/api/pixelme/convert");
    }
}
