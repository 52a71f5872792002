//! Event-channel message types and wire framing
//!
//! Events travel over a single persistent WebSocket as JSON text frames
//! shaped `{"event": <name>, "data": <payload>}`.

use serde::{Deserialize, Serialize};

/// Maximum encoded event size (1 MiB)
pub const MAX_EVENT_SIZE: usize = 1024 * 1024;

/// Events sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Submit a chat message for a streamed reply
    ChatMessage {
        user_id: String,
        message: String,
        model: String,
        use_agent: bool,
    },
}

/// Events sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Greeting emitted once after the channel is accepted
    Connected {
        #[serde(default)]
        message: Option<String>,
    },

    /// One fragment of the streamed assistant reply.
    /// `done` marks the end of the reply; the final fragment is empty.
    ChatChunk { chunk: String, done: bool },

    /// Server-side failure for the in-flight exchange
    Error { message: String },
}

/// Event encode/decode error
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Event too large: {size} bytes (max {max})")]
    EventTooLarge { size: usize, max: usize },
}

/// Encode an event as a JSON text frame
pub fn encode_event<T: Serialize>(event: &T) -> Result<String, EventError> {
    let text = serde_json::to_string(event)?;
    if text.len() > MAX_EVENT_SIZE {
        return Err(EventError::EventTooLarge {
            size: text.len(),
            max: MAX_EVENT_SIZE,
        });
    }
    Ok(text)
}

/// Decode an event from a JSON text frame
pub fn decode_event<'a, T: Deserialize<'a>>(text: &'a str) -> Result<T, EventError> {
    if text.len() > MAX_EVENT_SIZE {
        return Err(EventError::EventTooLarge {
            size: text.len(),
            max: MAX_EVENT_SIZE,
        });
    }
    Ok(serde_json::from_str(text)?)
}
