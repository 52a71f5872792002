//! aria-protocol: Shared wire definitions for client-backend communication
//!
//! This crate defines the event-channel message types exchanged over the
//! persistent WebSocket, their JSON framing, and typed payloads for every
//! REST endpoint the backend exposes.

pub mod events;
pub mod rest;

// Re-export main types at crate root
pub use events::{
    decode_event, encode_event, ClientEvent, EventError, ServerEvent, MAX_EVENT_SIZE,
};
pub use rest::{
    ApiError, ApiResult, CommandResponse, CpuInfo, HealthResponse, ModelsResponse, OllamaConfig,
    RemoteConfig, ScreenshotResponse, SystemConfig, SystemCounters, SystemInfoResponse, UsageInfo,
    VisionResponse,
};

/// Path of the event channel on the backend host
pub const EVENT_CHANNEL_PATH: &str = "/ws";
