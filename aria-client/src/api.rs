//! REST client for the backend's one-shot endpoints
//!
//! Thin typed wrappers over `reqwest`. Failures reported by the backend
//! as `{"error": ...}` bodies surface as [`AriaError::Backend`]; decode
//! mismatches and transport failures keep their own variants so call
//! sites can log them apart.

use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

use aria_protocol::{
    ApiResult, CommandResponse, HealthResponse, ModelsResponse, RemoteConfig, ScreenshotResponse,
    SystemInfoResponse, VisionResponse, EVENT_CHANNEL_PATH,
};
use aria_utils::{AriaError, Result};

use crate::vision::StagedImage;

/// Per-request timeout. Vision analysis runs a model, so it gets longer.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const ANALYSIS_TIMEOUT: Duration = Duration::from_secs(180);

/// Typed REST client bound to one backend base URL
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client for the given base URL (e.g. `http://127.0.0.1:7860`)
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AriaError::config(format!("Invalid server URL '{}': {}", base_url, e)))?;
        if base_url.scheme() != "http" && base_url.scheme() != "https" {
            return Err(AriaError::config(format!(
                "Server URL must be http or https, got '{}'",
                base_url.scheme()
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Derive the event-channel URL from the base URL (http -> ws)
    pub fn event_channel_url(&self) -> Result<Url> {
        let mut url = self.base_url.clone();
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme)
            .map_err(|()| AriaError::internal("Failed to derive event channel scheme"))?;
        url.set_path(EVENT_CHANNEL_PATH);
        Ok(url)
    }

    /// `GET /config.json`
    pub async fn fetch_config(&self) -> Result<RemoteConfig> {
        self.get_json("/config.json").await
    }

    /// `GET /health`
    pub async fn health(&self) -> Result<HealthResponse> {
        self.get_json("/health").await
    }

    /// `GET /api/models`
    pub async fn models(&self) -> Result<Vec<String>> {
        let response: ModelsResponse = self.get_json("/api/models").await?;
        Ok(response.models)
    }

    /// `GET /api/system/info`
    pub async fn system_info(&self) -> Result<SystemInfoResponse> {
        self.get_json("/api/system/info").await
    }

    /// `GET /api/system/screenshot`
    pub async fn screenshot(&self) -> Result<ScreenshotResponse> {
        self.get_json("/api/system/screenshot").await
    }

    /// `POST /api/system/command`
    pub async fn execute_command(&self, command: &str) -> Result<CommandResponse> {
        let url = self.endpoint("/api/system/command")?;
        let response = self
            .http
            .post(url)
            .json(&serde_json::json!({ "command": command }))
            .send()
            .await?;
        Self::decode(response).await
    }

    /// `POST /api/vision` — multipart upload of a staged image plus the
    /// free-text prompt
    pub async fn analyze_image(&self, image: &StagedImage, prompt: &str) -> Result<VisionResponse> {
        let url = self.endpoint("/api/vision")?;

        let part = reqwest::multipart::Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str("image/jpeg")?;
        let form = reqwest::multipart::Form::new()
            .part("image", part)
            .text("prompt", prompt.to_owned());

        let response = self
            .http
            .post(url)
            .timeout(ANALYSIS_TIMEOUT)
            .multipart(form)
            .send()
            .await?;
        Self::decode(response).await
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| AriaError::internal(format!("Invalid endpoint path '{}': {}", path, e)))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        let response = self.http.get(url).send().await?;
        Self::decode(response).await
    }

    /// Decode a response body, honoring backend-reported `{"error": ...}`
    /// bodies regardless of HTTP status
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<ApiResult<T>>(&body) {
            Ok(result) => result.into_result().map_err(AriaError::backend),
            Err(_) if !status.is_success() => {
                Err(AriaError::backend(format!("HTTP {}", status)))
            }
            Err(e) => Err(AriaError::InvalidMessage(format!(
                "Unexpected response body: {}",
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_http_url() {
        let api = ApiClient::new("http://127.0.0.1:7860").unwrap();
        assert_eq!(api.base_url().as_str(), "http://127.0.0.1:7860/");
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        assert!(ApiClient::new("not a url").is_err());
    }

    #[test]
    fn test_new_rejects_non_http_scheme() {
        assert!(ApiClient::new("ftp://127.0.0.1:7860").is_err());
    }

    #[test]
    fn test_endpoint_paths() {
        let api = ApiClient::new("http://127.0.0.1:7860").unwrap();
        assert_eq!(
            api.endpoint("/config.json").unwrap().as_str(),
            "http://127.0.0.1:7860/config.json"
        );
        assert_eq!(
            api.endpoint("/api/system/info").unwrap().as_str(),
            "http://127.0.0.1:7860/api/system/info"
        );
    }

    #[test]
    fn test_event_channel_url_http() {
        let api = ApiClient::new("http://127.0.0.1:7860").unwrap();
        assert_eq!(
            api.event_channel_url().unwrap().as_str(),
            "ws://127.0.0.1:7860/ws"
        );
    }

    #[test]
    fn test_event_channel_url_https() {
        let api = ApiClient::new("https://assistant.local").unwrap();
        assert_eq!(
            api.event_channel_url().unwrap().as_str(),
            "wss://assistant.local/ws"
        );
    }
}
