//! Chat state: message list and the streaming reply machine
//!
//! At most one assistant reply streams at a time. The invariant is held
//! by [`StreamState`]: a send is rejected while `Streaming`, and a lost
//! completion falls back to `Idle` after [`STREAM_TIMEOUT`].

// Allow unused code that's part of the public API for future features
#![allow(dead_code)]

use std::time::{Duration, Instant};

/// Give up on a streamed reply if no completion arrives within this bound
pub const STREAM_TIMEOUT: Duration = Duration::from_secs(120);

/// Greeting shown on startup and after clearing the conversation
const GREETING: &str = "Conversation cleared. How can I help you?";

/// Message author
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// Message body.
///
/// Trust boundary: `Text` is sanitized before it enters the list, since
/// it comes from the user or the model. `Image` entries are constructed
/// locally (screenshots, staged uploads) and their labels render verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent {
    Text(String),
    Image { data_uri: String, label: String },
}

/// One chat message row
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
}

/// Streaming reply state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Idle,
    Streaming { started: Instant },
}

/// Chat tab state
#[derive(Debug)]
pub struct ChatState {
    /// Text being composed in the input line
    pub input: String,
    messages: Vec<ChatMessage>,
    stream: StreamState,
    input_enabled: bool,
    /// Index of the assistant message receiving fragments
    target: Option<usize>,
}

impl ChatState {
    pub fn new() -> Self {
        let mut state = Self {
            input: String::new(),
            messages: Vec::new(),
            stream: StreamState::Idle,
            input_enabled: true,
            target: None,
        };
        state.clear();
        state
    }

    /// Reset the conversation to the greeting. Does not interrupt an
    /// in-flight stream state; the old target index is dropped.
    pub fn clear(&mut self) {
        self.messages = vec![ChatMessage {
            role: Role::Assistant,
            content: MessageContent::Text(GREETING.into()),
        }];
        self.target = None;
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn stream(&self) -> StreamState {
        self.stream
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self.stream, StreamState::Streaming { .. })
    }

    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    /// Whether `index` is the open streaming buffer
    pub fn is_stream_target(&self, index: usize) -> bool {
        self.target == Some(index)
    }

    /// Start a send: append the user row and an empty assistant
    /// placeholder, mark the placeholder as the streaming target, and
    /// return the message text to put on the wire.
    ///
    /// Returns `None` (a silent no-op) for whitespace-only input or while
    /// a reply is already streaming.
    pub fn begin_send(&mut self) -> Option<String> {
        let message = self.input.trim().to_owned();
        if message.is_empty() || self.is_streaming() {
            return None;
        }

        self.input.clear();
        self.input_enabled = false;

        self.messages.push(ChatMessage {
            role: Role::User,
            content: MessageContent::Text(sanitize_text(&message)),
        });
        self.messages.push(ChatMessage {
            role: Role::Assistant,
            content: MessageContent::Text(String::new()),
        });
        self.target = Some(self.messages.len() - 1);
        self.stream = StreamState::Streaming {
            started: Instant::now(),
        };

        Some(message)
    }

    /// Append one streamed fragment to the open buffer.
    ///
    /// Returns true when this fragment completed the reply (input was
    /// just re-enabled). Fragments arriving while `Idle` are dropped.
    pub fn apply_chunk(&mut self, chunk: &str, done: bool) -> bool {
        if !self.is_streaming() {
            return false;
        }

        if !chunk.is_empty() {
            if let Some(index) = self.target {
                if let Some(ChatMessage {
                    content: MessageContent::Text(text),
                    ..
                }) = self.messages.get_mut(index)
                {
                    text.push_str(&sanitize_text(chunk));
                }
            }
        }

        if done {
            self.finish_stream();
            return true;
        }
        false
    }

    /// Abandon the in-flight reply (server error or lost completion)
    pub fn abort_stream(&mut self) {
        if self.is_streaming() {
            self.finish_stream();
        }
    }

    /// Check the timeout transition. Returns true if the stream was just
    /// abandoned because no completion arrived within `limit`.
    pub fn check_timeout(&mut self, now: Instant, limit: Duration) -> bool {
        if let StreamState::Streaming { started } = self.stream {
            if now.duration_since(started) >= limit {
                self.finish_stream();
                return true;
            }
        }
        false
    }

    /// Append a locally constructed image message (trusted content)
    pub fn push_image(&mut self, role: Role, data_uri: String, label: String) {
        self.messages.push(ChatMessage {
            role,
            content: MessageContent::Image { data_uri, label },
        });
    }

    fn finish_stream(&mut self) {
        self.stream = StreamState::Idle;
        self.input_enabled = true;
        self.target = None;
    }
}

impl Default for ChatState {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip control and escape characters from untrusted text, keeping
/// newlines and tabs. This is the terminal analog of HTML escaping:
/// model output must not be able to emit terminal control sequences.
pub fn sanitize_text(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assistant_text(state: &ChatState, index: usize) -> &str {
        match &state.messages()[index].content {
            MessageContent::Text(text) => text,
            other => panic!("Expected text content, got {:?}", other),
        }
    }

    // ==================== Send Tests ====================

    #[test]
    fn test_begin_send_appends_user_row_and_placeholder() {
        let mut chat = ChatState::new();
        let before = chat.messages().len();

        chat.input = "hello there".into();
        let sent = chat.begin_send().unwrap();

        assert_eq!(sent, "hello there");
        assert_eq!(chat.messages().len(), before + 2);

        let user = &chat.messages()[before];
        assert_eq!(user.role, Role::User);
        assert_eq!(user.content, MessageContent::Text("hello there".into()));

        let placeholder = &chat.messages()[before + 1];
        assert_eq!(placeholder.role, Role::Assistant);
        assert_eq!(placeholder.content, MessageContent::Text(String::new()));
        assert!(chat.is_stream_target(before + 1));
    }

    #[test]
    fn test_begin_send_disables_input_and_starts_stream() {
        let mut chat = ChatState::new();
        chat.input = "hi".into();
        chat.begin_send().unwrap();

        assert!(!chat.input_enabled());
        assert!(chat.is_streaming());
        assert!(chat.input.is_empty());
    }

    #[test]
    fn test_begin_send_trims_input() {
        let mut chat = ChatState::new();
        chat.input = "  spaced out  ".into();
        assert_eq!(chat.begin_send().unwrap(), "spaced out");
    }

    #[test]
    fn test_empty_input_is_silent_noop() {
        let mut chat = ChatState::new();
        let before = chat.messages().len();

        chat.input = "   \n ".into();
        assert!(chat.begin_send().is_none());
        assert_eq!(chat.messages().len(), before);
        assert!(chat.input_enabled());
        assert!(!chat.is_streaming());
    }

    #[test]
    fn test_send_rejected_while_streaming() {
        let mut chat = ChatState::new();
        chat.input = "first".into();
        chat.begin_send().unwrap();

        chat.input = "second".into();
        let before = chat.messages().len();
        assert!(chat.begin_send().is_none());
        assert_eq!(chat.messages().len(), before);
    }

    // ==================== Streaming Tests ====================

    #[test]
    fn test_chunk_sequence_accumulates_and_completes_once() {
        let mut chat = ChatState::new();
        chat.input = "hi".into();
        chat.begin_send().unwrap();
        let target = chat.messages().len() - 1;

        let mut completions = 0;
        for (chunk, done) in [("Hel", false), ("lo", false), ("", true)] {
            if chat.apply_chunk(chunk, done) {
                completions += 1;
            }
        }

        assert_eq!(assistant_text(&chat, target), "Hello");
        assert_eq!(completions, 1);
        assert!(chat.input_enabled());
        assert!(!chat.is_streaming());
    }

    #[test]
    fn test_chunk_after_completion_is_dropped() {
        let mut chat = ChatState::new();
        chat.input = "hi".into();
        chat.begin_send().unwrap();
        let target = chat.messages().len() - 1;

        chat.apply_chunk("done", true);
        assert!(!chat.apply_chunk("stray", false));
        assert_eq!(assistant_text(&chat, target), "done");
    }

    #[test]
    fn test_new_send_replaces_stream_target() {
        let mut chat = ChatState::new();
        chat.input = "one".into();
        chat.begin_send().unwrap();
        let first_target = chat.messages().len() - 1;
        chat.apply_chunk("first reply", true);

        chat.input = "two".into();
        chat.begin_send().unwrap();
        let second_target = chat.messages().len() - 1;
        assert_ne!(first_target, second_target);

        chat.apply_chunk("second reply", true);
        assert_eq!(assistant_text(&chat, first_target), "first reply");
        assert_eq!(assistant_text(&chat, second_target), "second reply");
    }

    #[test]
    fn test_abort_stream_reenables_input() {
        let mut chat = ChatState::new();
        chat.input = "hi".into();
        chat.begin_send().unwrap();

        chat.abort_stream();
        assert!(chat.input_enabled());
        assert!(!chat.is_streaming());
    }

    #[test]
    fn test_timeout_transition() {
        let mut chat = ChatState::new();
        chat.input = "hi".into();
        chat.begin_send().unwrap();

        // Not yet expired
        assert!(!chat.check_timeout(Instant::now(), Duration::from_secs(3600)));
        assert!(chat.is_streaming());

        // Expired
        assert!(chat.check_timeout(
            Instant::now() + Duration::from_secs(121),
            STREAM_TIMEOUT
        ));
        assert!(!chat.is_streaming());
        assert!(chat.input_enabled());

        // Only fires once
        assert!(!chat.check_timeout(
            Instant::now() + Duration::from_secs(300),
            STREAM_TIMEOUT
        ));
    }

    // ==================== Content Tests ====================

    #[test]
    fn test_clear_resets_to_greeting() {
        let mut chat = ChatState::new();
        chat.input = "hi".into();
        chat.begin_send().unwrap();
        chat.apply_chunk("reply", true);

        chat.clear();
        assert_eq!(chat.messages().len(), 1);
        assert_eq!(chat.messages()[0].role, Role::Assistant);
    }

    #[test]
    fn test_push_image_is_trusted() {
        let mut chat = ChatState::new();
        chat.push_image(
            Role::User,
            "data:image/png;base64,AAAA".into(),
            "[screenshot 1920x1080]".into(),
        );

        let last = chat.messages().last().unwrap();
        assert!(matches!(
            &last.content,
            MessageContent::Image { label, .. } if label == "[screenshot 1920x1080]"
        ));
    }

    #[test]
    fn test_sanitize_strips_escape_sequences() {
        let hostile = "safe\x1b[31mred\x1b[0m\x07 text";
        assert_eq!(sanitize_text(hostile), "safe[31mred[0m text");
    }

    #[test]
    fn test_sanitize_keeps_newlines_and_tabs() {
        assert_eq!(sanitize_text("a\nb\tc"), "a\nb\tc");
    }

    #[test]
    fn test_user_text_sanitized_on_append() {
        let mut chat = ChatState::new();
        chat.input = "hi\x1b[2Jthere".into();
        chat.begin_send().unwrap();

        let user = &chat.messages()[chat.messages().len() - 2];
        assert_eq!(user.content, MessageContent::Text("hi[2Jthere".into()));
    }

    #[test]
    fn test_streamed_chunks_sanitized() {
        let mut chat = ChatState::new();
        chat.input = "hi".into();
        chat.begin_send().unwrap();
        let target = chat.messages().len() - 1;

        chat.apply_chunk("ok\x1b]0;title\x07", true);
        assert_eq!(assistant_text(&chat, target), "ok]0;title");
    }
}
