//! Typed payloads for the backend's REST endpoints
//!
//! Every endpoint reports failures as a JSON body `{"error": <text>}`,
//! sometimes alongside a non-2xx status. [`ApiResult`] models that shape
//! so call sites can turn a response body directly into a `Result`.

use serde::{Deserialize, Serialize};

/// Response envelope: either the expected payload or a reported error
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ApiResult<T> {
    /// Backend-reported failure. Tried first so that an `error` body is
    /// never mistaken for a payload whose fields are all optional.
    Err(ApiError),
    /// Expected payload
    Ok(T),
}

/// Backend-reported error body
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    pub error: String,
}

impl<T> ApiResult<T> {
    /// Convert into a plain `Result`
    pub fn into_result(self) -> Result<T, String> {
        match self {
            ApiResult::Ok(value) => Ok(value),
            ApiResult::Err(err) => Err(err.error),
        }
    }
}

/// `GET /health`
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: Option<String>,
    pub ollama_connected: bool,
}

/// `GET /api/models`
#[derive(Debug, Clone, Deserialize)]
pub struct ModelsResponse {
    pub models: Vec<String>,
}

/// `POST /api/vision`
#[derive(Debug, Clone, Deserialize)]
pub struct VisionResponse {
    /// Free-text analysis of the image
    pub analysis: String,
    /// Structured description (dimensions, format, detected content)
    pub description: String,
}

/// `POST /api/system/command`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommandResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
}

/// `GET /api/system/screenshot`
#[derive(Debug, Clone, Deserialize)]
pub struct ScreenshotResponse {
    /// Captured screen as a `data:image/png;base64,...` URI
    pub screenshot: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// `GET /api/system/info`
#[derive(Debug, Clone, Deserialize)]
pub struct SystemInfoResponse {
    pub cpu: CpuInfo,
    pub memory: UsageInfo,
    pub disk: UsageInfo,
    pub system: SystemCounters,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CpuInfo {
    pub percent: f64,
    pub cores: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UsageInfo {
    pub used: u64,
    pub total: u64,
    pub percent: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SystemCounters {
    pub processes: u64,
}

/// `GET /config.json` — the backend's configuration record.
///
/// The same record is what the settings form edits and what the local
/// override file persists, so it is serializable in both directions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub system: SystemConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub base_url: String,
    pub default_model: Option<String>,
    pub vision_model: Option<String>,
    pub code_model: Option<String>,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".into(),
            default_model: None,
            vision_model: None,
            code_model: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub allow_system_control: bool,
    /// Defaults to enabled unless the backend explicitly says false
    pub enable_agent_mode: bool,
    pub allowed_commands: Vec<String>,
    /// JPEG quality for captured screenshots, 0-100
    pub screenshot_quality: u8,
    /// Upload ceiling in bytes
    pub max_file_size: u64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            allow_system_control: false,
            enable_agent_mode: true,
            allowed_commands: Vec::new(),
            screenshot_quality: 85,
            max_file_size: 5 * 1024 * 1024,
        }
    }
}
