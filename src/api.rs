//! HTTP implementations of the health map collaborator traits.
//!
//! Thin reqwest wrapper over the pet-record and photo-gallery endpoints. All
//! response parsing lives in pure functions so it can be tested without a
//! network.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::time::Duration;

use healthmap::gateway::{GatewayError, MarkerService, PhotoLoader, PhotoService, SaveResponse, UploadResponse};
use healthmap::marker::{Marker, MarkerId, PetId, decode_marker_list};
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::config::ApiConfig;

// =============================================================================
// CLIENT
// =============================================================================

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns [`GatewayError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(Self { http, base_url: config.base_url.clone(), token: config.token.clone() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        debug!(%method, url, "api request");
        let request = self.http.request(method, url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

async fn send(request: reqwest::RequestBuilder) -> Result<reqwest::Response, GatewayError> {
    let response = request.send().await.map_err(|e| GatewayError::Transport(e.to_string()))?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(GatewayError::Status { status: status.as_u16(), body })
}

async fn send_text(request: reqwest::RequestBuilder) -> Result<String, GatewayError> {
    send(request)
        .await?
        .text()
        .await
        .map_err(|e| GatewayError::Transport(e.to_string()))
}

#[async_trait::async_trait]
impl MarkerService for ApiClient {
    async fn load_markers(&self, pet_id: PetId) -> Result<Vec<Marker>, GatewayError> {
        let url = health_map_url(&self.base_url, pet_id);
        let text = send_text(self.request(reqwest::Method::GET, &url)).await?;
        parse_marker_list(&text)
    }

    async fn save_marker(&self, pet_id: PetId, marker: &Marker) -> Result<SaveResponse, GatewayError> {
        let url = marker_url(&self.base_url, pet_id, marker.id);
        let text = send_text(self.request(reqwest::Method::PUT, &url).json(marker)).await?;
        parse_save_response(&text)
    }

    async fn delete_marker(&self, pet_id: PetId, marker_id: MarkerId) -> Result<SaveResponse, GatewayError> {
        let url = marker_url(&self.base_url, pet_id, marker_id);
        let text = send_text(self.request(reqwest::Method::DELETE, &url)).await?;
        parse_save_response(&text)
    }
}

#[async_trait::async_trait]
impl PhotoService for ApiClient {
    async fn upload_photo(&self, pet_id: PetId, image: Vec<u8>) -> Result<UploadResponse, GatewayError> {
        let url = photos_url(&self.base_url, pet_id);
        let request = self.request(reqwest::Method::POST, &url).header(CONTENT_TYPE, "image/png").body(image);
        let text = send_text(request).await?;
        parse_upload_response(&text)
    }
}

#[async_trait::async_trait]
impl PhotoLoader for ApiClient {
    async fn fetch_photo(&self, url: &str) -> Result<Vec<u8>, GatewayError> {
        let url = resolve_url(&self.base_url, url);
        let bytes = send(self.request(reqwest::Method::GET, &url))
            .await?
            .bytes()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

// =============================================================================
// ROUTES
// =============================================================================

pub(crate) fn health_map_url(base: &str, pet_id: PetId) -> String {
    format!("{base}/api/pets/{pet_id}/health-map")
}

pub(crate) fn marker_url(base: &str, pet_id: PetId, marker_id: MarkerId) -> String {
    format!("{base}/api/pets/{pet_id}/health-map/markers/{marker_id}")
}

pub(crate) fn photos_url(base: &str, pet_id: PetId) -> String {
    format!("{base}/api/pets/{pet_id}/photos")
}

/// Resolve a photo URL. Absolute URLs pass through; anything else is joined to `base`.
pub(crate) fn resolve_url(base: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("{}/{}", base.trim_end_matches('/'), url.trim_start_matches('/'))
    }
}

// =============================================================================
// RESPONSE PARSING
// =============================================================================

#[derive(Deserialize)]
struct HealthMapEnvelope {
    #[serde(default)]
    markers: Option<Value>,
}

pub(crate) fn parse_marker_list(body: &str) -> Result<Vec<Marker>, GatewayError> {
    let envelope: HealthMapEnvelope = serde_json::from_str(body).map_err(|e| GatewayError::Decode(e.to_string()))?;
    decode_marker_list(envelope.markers.as_ref()).map_err(|e| GatewayError::Decode(e.to_string()))
}

pub(crate) fn parse_save_response(body: &str) -> Result<SaveResponse, GatewayError> {
    serde_json::from_str(body).map_err(|e| GatewayError::Decode(e.to_string()))
}

pub(crate) fn parse_upload_response(body: &str) -> Result<UploadResponse, GatewayError> {
    serde_json::from_str(body).map_err(|e| GatewayError::Decode(e.to_string()))
}
