//! Main application struct and state management
//!
//! The App struct owns all client state: connection, tab states, model
//! list, settings, and notifications. Everything is driven by the
//! unified event stream; handlers spawn REST calls and apply their
//! results when they come back as [`ApiEvent`]s.

use std::future::Future;
use std::path::Path;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::style::Color;
use uuid::Uuid;

use aria_protocol::{ClientEvent, HealthResponse, RemoteConfig, ServerEvent};
use aria_utils::Result;

use crate::api::ApiClient;
use crate::chat::{ChatState, Role, STREAM_TIMEOUT};
use crate::connection::Connection;
use crate::input::{global_action, Tab, UiAction};
use crate::models::ModelList;
use crate::settings::{SettingsField, SettingsForm, SettingsStore};
use crate::system::{CommandOutcome, SystemFocus, SystemState};
use crate::vision::{self, VisionFocus, VisionOutcome, VisionState};

use super::event::{ApiEvent, AppEvent, EventHandler, InputEvent};
use super::notify::{NoticeLevel, Notifications};
use super::render;
use super::terminal::Terminal;

/// Backend liveness as shown by the status indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendHealth {
    Unknown,
    Healthy,
    OllamaDisconnected,
    Unreachable,
}

impl BackendHealth {
    pub fn label(self) -> &'static str {
        match self {
            BackendHealth::Unknown => "checking...",
            BackendHealth::Healthy => "service running",
            BackendHealth::OllamaDisconnected => "ollama disconnected",
            BackendHealth::Unreachable => "backend unreachable",
        }
    }

    pub fn color(self) -> Color {
        match self {
            BackendHealth::Unknown => Color::DarkGray,
            BackendHealth::Healthy => Color::Green,
            BackendHealth::OllamaDisconnected | BackendHealth::Unreachable => Color::Red,
        }
    }
}

/// Classify an explicit connection test: a reachable backend without
/// Ollama is a warning, not an error.
pub fn classify_connection_test(result: &std::result::Result<HealthResponse, String>) -> (NoticeLevel, String) {
    match result {
        Ok(health) if health.ollama_connected => (
            NoticeLevel::Success,
            "Connection test succeeded; Ollama is running.".to_string(),
        ),
        Ok(_) => (
            NoticeLevel::Warning,
            "Ollama is not connected; check that it is running.".to_string(),
        ),
        Err(e) => (NoticeLevel::Error, format!("Connection test failed: {}", e)),
    }
}

/// Poll the backend's health endpoint this often
const STATUS_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Main application
pub struct App {
    /// Correlation id for chat messages, never persisted
    pub(crate) session_id: String,
    /// REST client
    pub(crate) api: ApiClient,
    /// Event-channel connection
    pub(crate) connection: Connection,
    /// Unified event stream
    pub(crate) events: EventHandler,
    /// Local settings override store
    pub(crate) settings_store: SettingsStore,

    /// Active tab
    pub(crate) tab: Tab,
    pub(crate) chat: ChatState,
    pub(crate) vision: VisionState,
    pub(crate) system: SystemState,
    pub(crate) settings: SettingsForm,
    pub(crate) models: ModelList,
    pub(crate) notices: Notifications,

    /// Last applied configuration record
    pub(crate) config: RemoteConfig,
    /// Status indicator state, driven by the periodic health poll
    pub(crate) backend_health: BackendHealth,
    /// Pending settings-reset confirmation dialog
    pub(crate) confirm_reset: bool,
    /// Animation tick counter
    pub(crate) tick_count: u64,
    last_health_poll: Option<Instant>,
    should_quit: bool,
}

impl App {
    /// Create a new application instance talking to `server_url`
    pub fn new(server_url: &str) -> Result<Self> {
        let api = ApiClient::new(server_url)?;
        let connection = Connection::new(api.event_channel_url()?);
        let events = EventHandler::new(Duration::from_millis(100));

        Ok(Self {
            session_id: format!("user_{}", Uuid::new_v4().simple()),
            api,
            connection,
            events,
            settings_store: SettingsStore::default_location(),
            tab: Tab::Chat,
            chat: ChatState::new(),
            vision: VisionState::default(),
            system: SystemState::new(),
            settings: SettingsForm::new(),
            models: ModelList::new(),
            notices: Notifications::new(),
            config: RemoteConfig::default(),
            backend_health: BackendHealth::Unknown,
            confirm_reset: false,
            tick_count: 0,
            last_health_poll: None,
            should_quit: false,
        })
    }

    /// Use a custom settings store location (tests)
    #[cfg(test)]
    pub fn with_store(server_url: &str, store: SettingsStore) -> Result<Self> {
        let mut app = Self::new(server_url)?;
        app.settings_store = store;
        Ok(app)
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Run the main application loop
    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = Terminal::new()?;

        // Start input polling
        self.events.start_input_polling();

        // Open the event channel; chat streaming stays offline if this
        // fails, the REST surface still works
        if let Err(e) = self.connection.connect().await {
            tracing::warn!("Event channel unavailable: {}", e);
            self.notices
                .push(format!("Event channel unavailable: {}", e), NoticeLevel::Warning);
        }

        // Initial loads
        self.load_settings();
        self.request_models(false);
        self.request_health();
        self.request_system_info();

        // Main event loop
        while !self.should_quit() {
            self.draw(&mut terminal)?;

            if let Some(event) = self.events.next().await {
                self.handle_event(event).await;
            }
        }

        Ok(())
    }

    /// Draw the UI
    fn draw(&mut self, terminal: &mut Terminal) -> Result<()> {
        terminal.terminal_mut().draw(|frame| {
            render::draw(self, frame);
        })?;
        Ok(())
    }

    /// Handle an application event
    pub(crate) async fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Input(InputEvent::Key(key)) => self.handle_key(key).await,
            AppEvent::Input(InputEvent::Paste(text)) => self.insert_text(&text),
            AppEvent::Input(InputEvent::FocusGained | InputEvent::FocusLost) => {}
            AppEvent::Server(server_event) => self.handle_server_event(server_event),
            AppEvent::Api(api_event) => self.handle_api_event(api_event),
            AppEvent::Resize { cols, rows } => {
                tracing::debug!("Terminal resized to {}x{}", cols, rows);
            }
            AppEvent::Tick => self.handle_tick(),
        }
    }

    fn handle_tick(&mut self) {
        self.tick_count = self.tick_count.wrapping_add(1);
        let now = Instant::now();

        self.notices.prune(now);

        // Drain pending channel events
        while let Some(event) = self.connection.try_recv() {
            self.handle_server_event(event);
        }

        // Lost completion falls back to Idle
        if self.chat.check_timeout(now, STREAM_TIMEOUT) {
            self.notices.push(
                "No reply from the backend; input re-enabled",
                NoticeLevel::Warning,
            );
        }

        // Periodic status poll, fire-and-forget with no overlap guard
        let due = self
            .last_health_poll
            .map(|t| now.duration_since(t) >= STATUS_POLL_INTERVAL)
            .unwrap_or(true);
        if due {
            self.last_health_poll = Some(now);
            self.request_health();
        }
    }

    /// Handle events arriving on the persistent channel
    pub(crate) fn handle_server_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::Connected { message } => {
                tracing::info!("Event channel established: {:?}", message);
                self.notices.push("Connected to server", NoticeLevel::Info);
            }
            ServerEvent::ChatChunk { chunk, done } => {
                self.chat.apply_chunk(&chunk, done);
            }
            ServerEvent::Error { message } => {
                self.notices.push(
                    crate::chat::sanitize_text(&message),
                    NoticeLevel::Error,
                );
                self.chat.abort_stream();
            }
        }
    }

    /// Handle completed REST calls and background jobs
    pub(crate) fn handle_api_event(&mut self, event: ApiEvent) {
        match event {
            ApiEvent::ConfigLoaded(Ok(config)) => {
                self.apply_config(config);
            }
            ApiEvent::ConfigLoaded(Err(e)) => {
                self.notices
                    .push(format!("Failed to load settings: {}", e), NoticeLevel::Error);
            }

            ApiEvent::ModelsLoaded { models: Ok(ids), announce } => {
                if ids.is_empty() {
                    self.notices
                        .push("No installed models found on the backend", NoticeLevel::Warning);
                }
                self.models.set_models(ids);
                if let Some(default) = self.config.ollama.default_model.clone() {
                    self.models.select(&default);
                }
                if announce {
                    self.notices.push("Model list refreshed", NoticeLevel::Success);
                }
            }
            ApiEvent::ModelsLoaded { models: Err(e), .. } => {
                tracing::warn!("Model list fetch failed: {}", e);
                self.notices.push(
                    "Failed to load models; check that the backend is running",
                    NoticeLevel::Error,
                );
            }

            ApiEvent::HealthChecked(result) => {
                self.backend_health = match result {
                    Ok(health) if health.ollama_connected => BackendHealth::Healthy,
                    Ok(_) => BackendHealth::OllamaDisconnected,
                    Err(e) => {
                        tracing::debug!("Health poll failed: {}", e);
                        BackendHealth::Unreachable
                    }
                };
            }

            ApiEvent::ConnectionTested(result) => {
                // The explicit test also refreshes the indicator
                let (level, text) = classify_connection_test(&result);
                self.backend_health = match result {
                    Ok(health) if health.ollama_connected => BackendHealth::Healthy,
                    Ok(_) => BackendHealth::OllamaDisconnected,
                    Err(_) => BackendHealth::Unreachable,
                };
                self.notices.push(text, level);
            }

            ApiEvent::ImageStaged(Ok(staged)) => {
                self.vision.busy = false;
                self.notices.push(
                    format!("Staged {} ({}x{})", staged.file_name, staged.width, staged.height),
                    NoticeLevel::Success,
                );
                self.vision.staged = Some(staged);
            }
            ApiEvent::ImageStaged(Err(e)) => {
                self.vision.busy = false;
                self.notices.push(e, NoticeLevel::Error);
            }

            ApiEvent::VisionAnalyzed(Ok(response)) => {
                self.vision.busy = false;
                self.vision.result = Some(VisionOutcome {
                    analysis: crate::chat::sanitize_text(&response.analysis),
                    description: crate::chat::sanitize_text(&response.description),
                });
            }
            ApiEvent::VisionAnalyzed(Err(e)) => {
                self.vision.busy = false;
                self.notices
                    .push(format!("Analysis failed: {}", e), NoticeLevel::Error);
            }

            ApiEvent::CommandFinished(result) => {
                self.system.command_busy = false;
                self.system.command_result = Some(match result {
                    Ok(outcome) => outcome,
                    Err(e) => CommandOutcome::Failure(e),
                });
            }

            ApiEvent::ScreenshotTaken(Ok(shot)) => {
                let label = vision::data_uri_label(&shot.screenshot, "screenshot");
                self.chat.push_image(Role::User, shot.screenshot, label);
                self.notices
                    .push("Screenshot added to the chat", NoticeLevel::Success);
            }
            ApiEvent::ScreenshotTaken(Err(e)) => {
                self.notices
                    .push(format!("Screenshot failed: {}", e), NoticeLevel::Error);
            }

            ApiEvent::SystemInfoLoaded(result) => {
                self.system.info_busy = false;
                self.system.info = Some(result);
            }
        }
    }

    /// Apply a loaded configuration record to every bound view
    fn apply_config(&mut self, config: RemoteConfig) {
        self.settings.populate(&config);
        self.system.control_enabled = config.system.allow_system_control;
        if let Some(default) = &config.ollama.default_model {
            self.models.select(default);
        }
        self.config = config;
    }

    /// Load settings: the local override takes precedence, otherwise the
    /// remote resource is fetched
    fn load_settings(&mut self) {
        match self.settings_store.load() {
            Ok(Some(local)) => {
                tracing::info!("Using local settings override");
                self.apply_config(local);
            }
            Ok(None) => self.request_config(),
            Err(e) => {
                self.notices
                    .push(format!("Ignoring local settings: {}", e), NoticeLevel::Warning);
                self.request_config();
            }
        }
    }

    // ==================== Input handling ====================

    async fn handle_key(&mut self, key: KeyEvent) {
        // A pending confirmation captures all input
        if self.confirm_reset {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.confirm_reset = false;
                    self.reset_settings();
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.confirm_reset = false;
                }
                _ => {}
            }
            return;
        }

        if let Some(action) = global_action(&key) {
            match action {
                UiAction::Quit => self.should_quit = true,
                UiAction::SwitchTab(tab) => self.tab = tab,
                UiAction::ClearChat => self.chat.clear(),
            }
            return;
        }

        match self.tab {
            Tab::Chat => self.handle_chat_key(key).await,
            Tab::Vision => self.handle_vision_key(key),
            Tab::System => self.handle_system_key(key),
            Tab::Settings => self.handle_settings_key(key),
        }
    }

    async fn handle_chat_key(&mut self, key: KeyEvent) {
        if !self.chat.input_enabled() {
            return;
        }
        match key.code {
            KeyCode::Enter => self.send_chat().await,
            KeyCode::Backspace => {
                self.chat.input.pop();
            }
            KeyCode::Char(c) if is_text_key(&key) => self.chat.input.push(c),
            _ => {}
        }
    }

    fn handle_vision_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab | KeyCode::BackTab => self.vision.toggle_focus(),
            KeyCode::Enter => match self.vision.focus {
                VisionFocus::Path => self.stage_image(),
                VisionFocus::Prompt => self.analyze_image(),
            },
            KeyCode::Backspace => {
                match self.vision.focus {
                    VisionFocus::Path => self.vision.path_input.pop(),
                    VisionFocus::Prompt => self.vision.prompt_input.pop(),
                };
            }
            KeyCode::Char(c) if is_text_key(&key) => match self.vision.focus {
                VisionFocus::Path => self.vision.path_input.push(c),
                VisionFocus::Prompt => self.vision.prompt_input.push(c),
            },
            _ => {}
        }
    }

    fn handle_system_key(&mut self, key: KeyEvent) {
        // The screenshot trigger stays available regardless of the toggle
        if key.code == KeyCode::F(6) {
            self.take_screenshot();
            return;
        }
        match key.code {
            KeyCode::F(5) => {
                self.request_system_info();
                return;
            }
            KeyCode::F(8) => {
                self.system.control_enabled = !self.system.control_enabled;
                self.settings.allow_system_control = self.system.control_enabled;
                return;
            }
            _ => {}
        }

        // Everything below is gated by the master toggle
        if !self.system.control_enabled {
            return;
        }

        match key.code {
            KeyCode::Tab | KeyCode::BackTab => self.system.toggle_focus(),
            KeyCode::Up => {
                if self.system.focus == SystemFocus::QuickActions {
                    self.system.cycle_quick_action(false);
                }
            }
            KeyCode::Down => {
                if self.system.focus == SystemFocus::QuickActions {
                    self.system.cycle_quick_action(true);
                }
            }
            KeyCode::Enter => match self.system.focus {
                SystemFocus::QuickActions => {
                    let action = self.system.selected_quick_action().to_string();
                    self.execute_command(action);
                }
                SystemFocus::CommandInput => {
                    if let Some(command) = self.system.take_command() {
                        self.execute_command(command);
                    }
                }
            },
            KeyCode::Backspace => {
                if self.system.focus == SystemFocus::CommandInput {
                    self.system.command_input.pop();
                }
            }
            KeyCode::Char(c) if is_text_key(&key) => {
                if self.system.focus == SystemFocus::CommandInput {
                    self.system.command_input.push(c);
                }
            }
            _ => {}
        }
    }

    fn handle_settings_key(&mut self, key: KeyEvent) {
        match (key.code, key.modifiers) {
            (KeyCode::Char('s'), KeyModifiers::CONTROL) => {
                self.save_settings();
                return;
            }
            (KeyCode::Char('r'), KeyModifiers::CONTROL) => {
                self.confirm_reset = true;
                return;
            }
            (KeyCode::F(5), _) => {
                self.request_models(true);
                return;
            }
            (KeyCode::F(6), _) => {
                self.test_connection();
                return;
            }
            _ => {}
        }

        match key.code {
            KeyCode::Tab | KeyCode::Down => self.settings.focus = self.settings.focus.next(),
            KeyCode::BackTab | KeyCode::Up => self.settings.focus = self.settings.focus.prev(),
            KeyCode::Char(' ') => match self.settings.focus {
                SettingsField::SystemControl => {
                    self.settings.allow_system_control = !self.settings.allow_system_control;
                    // Keep the control panel's master toggle in sync
                    self.system.control_enabled = self.settings.allow_system_control;
                }
                SettingsField::AgentMode => {
                    self.settings.enable_agent_mode = !self.settings.enable_agent_mode;
                }
                _ => self.settings_insert_char(' '),
            },
            KeyCode::Left => match self.settings.focus {
                SettingsField::ScreenshotQuality => self.settings.adjust_quality(-5),
                SettingsField::DefaultModel => self.models.cycle(false),
                _ => {}
            },
            KeyCode::Right => match self.settings.focus {
                SettingsField::ScreenshotQuality => self.settings.adjust_quality(5),
                SettingsField::DefaultModel => self.models.cycle(true),
                _ => {}
            },
            KeyCode::Enter => {
                // The command list is the one multiline field
                if self.settings.focus == SettingsField::AllowedCommands {
                    self.settings.allowed_commands_text.push('\n');
                }
            }
            KeyCode::Backspace => match self.settings.focus {
                SettingsField::BaseUrl => {
                    self.settings.base_url.pop();
                }
                SettingsField::AllowedCommands => {
                    self.settings.allowed_commands_text.pop();
                }
                SettingsField::MaxFileSize => {
                    self.settings.max_file_size_mib.pop();
                }
                _ => {}
            },
            KeyCode::Char(c) if is_text_key(&key) => self.settings_insert_char(c),
            _ => {}
        }
    }

    fn settings_insert_char(&mut self, c: char) {
        match self.settings.focus {
            SettingsField::BaseUrl => self.settings.base_url.push(c),
            SettingsField::AllowedCommands => self.settings.allowed_commands_text.push(c),
            SettingsField::MaxFileSize => {
                if c.is_ascii_digit() {
                    self.settings.max_file_size_mib.push(c);
                }
            }
            _ => {}
        }
    }

    /// Insert pasted text into the focused text field
    fn insert_text(&mut self, text: &str) {
        let clean: String = text.chars().filter(|c| !c.is_control()).collect();
        match self.tab {
            Tab::Chat => {
                if self.chat.input_enabled() {
                    self.chat.input.push_str(&clean);
                }
            }
            Tab::Vision => match self.vision.focus {
                VisionFocus::Path => self.vision.path_input.push_str(&clean),
                VisionFocus::Prompt => self.vision.prompt_input.push_str(&clean),
            },
            Tab::System => {
                if self.system.control_enabled && self.system.focus == SystemFocus::CommandInput {
                    self.system.command_input.push_str(&clean);
                }
            }
            Tab::Settings => {
                for c in clean.chars() {
                    self.settings_insert_char(c);
                }
            }
        }
    }

    // ==================== Handlers ====================

    /// Send the composed chat message as a single fire-and-forget event
    async fn send_chat(&mut self) {
        let Some(message) = self.chat.begin_send() else {
            return;
        };

        let event = ClientEvent::ChatMessage {
            user_id: self.session_id.clone(),
            message,
            model: self.models.selected_id().unwrap_or_default().to_string(),
            use_agent: self.settings.enable_agent_mode,
        };

        if let Err(e) = self.connection.send(event).await {
            tracing::error!("Failed to send chat message: {}", e);
            self.notices
                .push(format!("Send failed: {}", e), NoticeLevel::Error);
            self.chat.abort_stream();
        }
    }

    /// Validate and stage the image named in the path field
    fn stage_image(&mut self) {
        let Some(path) = self.vision.take_path() else {
            return;
        };
        if self.vision.busy {
            return;
        }

        self.vision.busy = true;
        self.vision.result = None;

        let sender = self.events.sender();
        tokio::spawn(async move {
            let result = tokio::task::spawn_blocking(move || {
                vision::stage_image(Path::new(&path))
            })
            .await
            .unwrap_or_else(|e| Err(aria_utils::AriaError::internal(format!(
                "Staging task failed: {}",
                e
            ))))
            .map_err(|e| e.to_string());
            let _ = sender.send(AppEvent::Api(ApiEvent::ImageStaged(result)));
        });
    }

    /// Submit the staged image plus prompt to the analysis endpoint
    fn analyze_image(&mut self) {
        if self.vision.busy {
            return;
        }
        let Some(staged) = self.vision.staged.clone() else {
            self.notices
                .push("Stage an image first", NoticeLevel::Error);
            return;
        };

        self.vision.busy = true;
        let prompt = self.vision.prompt_input.clone();
        let api = self.api.clone();
        self.spawn_api(
            async move { api.analyze_image(&staged, &prompt).await },
            ApiEvent::VisionAnalyzed,
        );
    }

    /// Post one command; the outcome renders inline on the system tab
    fn execute_command(&mut self, command: String) {
        self.system.command_busy = true;
        self.system.command_result = None;

        let api = self.api.clone();
        self.spawn_api(
            async move {
                api.execute_command(&command)
                    .await
                    .map(CommandOutcome::from_response)
            },
            ApiEvent::CommandFinished,
        );
    }

    fn take_screenshot(&self) {
        let api = self.api.clone();
        self.spawn_api(
            async move { api.screenshot().await },
            ApiEvent::ScreenshotTaken,
        );
    }

    fn request_system_info(&mut self) {
        self.system.info_busy = true;
        let api = self.api.clone();
        self.spawn_api(
            async move { api.system_info().await },
            ApiEvent::SystemInfoLoaded,
        );
    }

    fn request_config(&self) {
        let api = self.api.clone();
        self.spawn_api(async move { api.fetch_config().await }, ApiEvent::ConfigLoaded);
    }

    fn request_models(&self, announce: bool) {
        let api = self.api.clone();
        self.spawn_api(async move { api.models().await }, move |models| {
            ApiEvent::ModelsLoaded { models, announce }
        });
    }

    fn request_health(&self) {
        let api = self.api.clone();
        self.spawn_api(async move { api.health().await }, ApiEvent::HealthChecked);
    }

    fn test_connection(&self) {
        let api = self.api.clone();
        self.spawn_api(async move { api.health().await }, ApiEvent::ConnectionTested);
    }

    /// Read the form back, write the record locally, and apply it
    fn save_settings(&mut self) {
        let composed = match self
            .settings
            .compose(self.models.selected_id().map(str::to_owned))
        {
            Ok(config) => config,
            Err(e) => {
                self.notices.push(e.to_string(), NoticeLevel::Error);
                return;
            }
        };

        match self.settings_store.save(&composed) {
            Ok(()) => {
                self.system.control_enabled = composed.system.allow_system_control;
                self.config = composed;
                self.notices.push("Settings saved", NoticeLevel::Success);
            }
            Err(e) => {
                self.notices
                    .push(format!("Save failed: {}", e), NoticeLevel::Error);
            }
        }
    }

    /// Clear the local override and reload from the remote resource
    fn reset_settings(&mut self) {
        if let Err(e) = self.settings_store.clear() {
            self.notices
                .push(format!("Reset failed: {}", e), NoticeLevel::Error);
            return;
        }
        self.request_config();
        self.notices
            .push("Settings restored to defaults", NoticeLevel::Success);
    }

    /// Spawn a REST call, routing its result back into the event stream
    fn spawn_api<T, Fut>(
        &self,
        fut: Fut,
        wrap: impl FnOnce(std::result::Result<T, String>) -> ApiEvent + Send + 'static,
    ) where
        T: Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let sender = self.events.sender();
        tokio::spawn(async move {
            let result = fut.await.map_err(|e| e.to_string());
            let _ = sender.send(AppEvent::Api(wrap(result)));
        });
    }
}

/// True when a key event should be treated as plain text entry
fn is_text_key(key: &KeyEvent) -> bool {
    !key.modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aria_protocol::{CpuInfo, SystemCounters, SystemInfoResponse, UsageInfo};

    const TEST_SERVER: &str = "http://127.0.0.1:7860";

    fn test_app() -> App {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json"));
        App::with_store(TEST_SERVER, store).unwrap()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    // ==================== Connection Test Classification ====================

    #[test]
    fn test_classify_healthy() {
        let result = Ok(HealthResponse {
            status: Some("healthy".into()),
            ollama_connected: true,
        });
        let (level, _) = classify_connection_test(&result);
        assert_eq!(level, NoticeLevel::Success);
    }

    #[test]
    fn test_classify_ollama_down_is_warning_not_error() {
        let result = Ok(HealthResponse {
            status: None,
            ollama_connected: false,
        });
        let (level, text) = classify_connection_test(&result);
        assert_eq!(level, NoticeLevel::Warning);
        assert!(text.contains("Ollama"));
    }

    #[test]
    fn test_classify_unreachable_is_error() {
        let result = Err("connection refused".to_string());
        let (level, text) = classify_connection_test(&result);
        assert_eq!(level, NoticeLevel::Error);
        assert!(text.contains("connection refused"));
    }

    // ==================== Status Indicator ====================

    #[tokio::test]
    async fn test_health_poll_drives_indicator() {
        let mut app = test_app();
        assert_eq!(app.backend_health, BackendHealth::Unknown);

        app.handle_api_event(ApiEvent::HealthChecked(Ok(HealthResponse {
            status: None,
            ollama_connected: false,
        })));
        assert_eq!(app.backend_health, BackendHealth::OllamaDisconnected);
        assert_eq!(app.backend_health.color(), Color::Red);

        app.handle_api_event(ApiEvent::HealthChecked(Ok(HealthResponse {
            status: None,
            ollama_connected: true,
        })));
        assert_eq!(app.backend_health, BackendHealth::Healthy);

        app.handle_api_event(ApiEvent::HealthChecked(Err("down".into())));
        assert_eq!(app.backend_health, BackendHealth::Unreachable);
    }

    // ==================== Chat Flow ====================

    #[tokio::test]
    async fn test_chunk_events_stream_into_chat() {
        let mut app = test_app();
        app.chat.input = "hi".into();
        app.chat.begin_send().unwrap();

        for (chunk, done) in [("Hel", false), ("lo", false), ("", true)] {
            app.handle_server_event(ServerEvent::ChatChunk {
                chunk: chunk.into(),
                done,
            });
        }

        assert!(app.chat.input_enabled());
        let last = app.chat.messages().last().unwrap();
        assert_eq!(
            last.content,
            crate::chat::MessageContent::Text("Hello".into())
        );
    }

    #[tokio::test]
    async fn test_channel_error_aborts_stream_and_notifies() {
        let mut app = test_app();
        app.chat.input = "hi".into();
        app.chat.begin_send().unwrap();

        app.handle_server_event(ServerEvent::Error {
            message: "model exploded".into(),
        });

        assert!(!app.chat.is_streaming());
        assert!(app.chat.input_enabled());
        let notice = app.notices.latest().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(notice.text.contains("model exploded"));
    }

    #[tokio::test]
    async fn test_send_without_channel_restores_input() {
        let mut app = test_app();
        app.chat.input = "hello".into();

        // The channel was never connected, so the send must fail and the
        // stream state must roll back
        app.handle_key(key(KeyCode::Enter)).await;

        assert!(!app.chat.is_streaming());
        assert!(app.chat.input_enabled());
        assert_eq!(app.notices.latest().unwrap().level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn test_chat_typing_goes_to_input() {
        let mut app = test_app();
        for c in ['h', 'e', 'y'] {
            app.handle_key(key(KeyCode::Char(c))).await;
        }
        assert_eq!(app.chat.input, "hey");

        app.handle_key(key(KeyCode::Backspace)).await;
        assert_eq!(app.chat.input, "he");
    }

    // ==================== Screenshot ====================

    #[tokio::test]
    async fn test_screenshot_appends_trusted_image_message() {
        let mut app = test_app();
        let before = app.chat.messages().len();

        app.handle_api_event(ApiEvent::ScreenshotTaken(Ok(
            aria_protocol::ScreenshotResponse {
                screenshot: "data:image/png;base64,AAAA".into(),
                timestamp: None,
            },
        )));

        assert_eq!(app.chat.messages().len(), before + 1);
        let last = app.chat.messages().last().unwrap();
        assert!(matches!(
            &last.content,
            crate::chat::MessageContent::Image { label, .. } if label.contains("screenshot")
        ));
    }

    // ==================== System Panel ====================

    fn sample_info() -> SystemInfoResponse {
        SystemInfoResponse {
            cpu: CpuInfo {
                percent: 10.0,
                cores: 4,
            },
            memory: UsageInfo {
                used: 1,
                total: 2,
                percent: 50.0,
            },
            disk: UsageInfo {
                used: 1,
                total: 2,
                percent: 50.0,
            },
            system: SystemCounters { processes: 10 },
        }
    }

    #[tokio::test]
    async fn test_system_info_error_shown_in_place() {
        let mut app = test_app();
        app.handle_api_event(ApiEvent::SystemInfoLoaded(Err("metrics broke".into())));
        assert_eq!(
            app.system.info.as_ref().unwrap().as_ref().unwrap_err().as_str(),
            "metrics broke"
        );

        app.handle_api_event(ApiEvent::SystemInfoLoaded(Ok(sample_info())));
        assert!(app.system.info.as_ref().unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_master_toggle_gates_command_keys() {
        let mut app = test_app();
        app.tab = Tab::System;
        app.system.control_enabled = false;
        app.system.focus = SystemFocus::CommandInput;

        app.handle_key(key(KeyCode::Char('d'))).await;
        assert!(app.system.command_input.is_empty());

        // F8 flips the toggle and syncs the settings form
        app.handle_key(key(KeyCode::F(8))).await;
        assert!(app.system.control_enabled);
        assert!(app.settings.allow_system_control);

        app.handle_key(key(KeyCode::Char('d'))).await;
        assert_eq!(app.system.command_input, "d");
    }

    #[tokio::test]
    async fn test_command_outcome_rendered_from_event() {
        let mut app = test_app();
        app.system.command_busy = true;

        app.handle_api_event(ApiEvent::CommandFinished(Ok(CommandOutcome::Success {
            message: "launched calc".into(),
            output: None,
        })));

        assert!(!app.system.command_busy);
        assert!(matches!(
            app.system.command_result,
            Some(CommandOutcome::Success { .. })
        ));

        app.handle_api_event(ApiEvent::CommandFinished(Err("denied".into())));
        assert_eq!(
            app.system.command_result,
            Some(CommandOutcome::Failure("denied".into()))
        );
    }

    // ==================== Settings Flow ====================

    #[tokio::test]
    async fn test_settings_toggle_syncs_master_toggle() {
        let mut app = test_app();
        app.tab = Tab::Settings;
        app.settings.focus = SettingsField::SystemControl;
        let initial = app.settings.allow_system_control;

        app.handle_key(key(KeyCode::Char(' '))).await;
        assert_eq!(app.settings.allow_system_control, !initial);
        assert_eq!(app.system.control_enabled, !initial);
    }

    #[tokio::test]
    async fn test_save_settings_writes_local_override() {
        let mut app = test_app();
        app.settings.base_url = "http://localhost:11434".into();
        app.settings.max_file_size_mib = "7".into();

        app.save_settings();
        assert_eq!(app.notices.latest().unwrap().level, NoticeLevel::Success);

        let saved = app.settings_store.load().unwrap().unwrap();
        assert_eq!(saved.system.max_file_size, 7 * 1024 * 1024);
    }

    #[tokio::test]
    async fn test_save_settings_rejects_bad_size_field() {
        let mut app = test_app();
        app.settings.max_file_size_mib = "".into();

        app.save_settings();
        assert_eq!(app.notices.latest().unwrap().level, NoticeLevel::Error);
        assert!(app.settings_store.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reset_clears_local_override() {
        let mut app = test_app();
        app.save_settings();
        assert!(app.settings_store.load().unwrap().is_some());

        app.reset_settings();
        assert!(app.settings_store.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reset_requires_confirmation() {
        let mut app = test_app();
        app.tab = Tab::Settings;
        app.save_settings();

        app.handle_key(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL))
            .await;
        assert!(app.confirm_reset);

        // Declining leaves the override alone
        app.handle_key(key(KeyCode::Char('n'))).await;
        assert!(!app.confirm_reset);
        assert!(app.settings_store.load().unwrap().is_some());

        // Accepting clears it
        app.handle_key(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL))
            .await;
        app.handle_key(key(KeyCode::Char('y'))).await;
        assert!(!app.confirm_reset);
        assert!(app.settings_store.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_config_event_populates_form_and_toggle() {
        let mut app = test_app();
        let mut config = RemoteConfig::default();
        config.system.allow_system_control = true;
        config.ollama.base_url = "http://10.0.0.9:11434".into();

        app.handle_api_event(ApiEvent::ConfigLoaded(Ok(config)));

        assert!(app.system.control_enabled);
        assert_eq!(app.settings.base_url, "http://10.0.0.9:11434");
    }

    #[tokio::test]
    async fn test_models_event_applies_configured_default() {
        let mut app = test_app();
        app.config.ollama.default_model = Some("llava:7b".into());

        app.handle_api_event(ApiEvent::ModelsLoaded {
            models: Ok(vec!["qwen3:8b".into(), "llava:7b".into()]),
            announce: false,
        });

        assert_eq!(app.models.selected_id(), Some("llava:7b"));
        assert!(app.notices.is_empty());
    }

    #[tokio::test]
    async fn test_models_refresh_announces() {
        let mut app = test_app();
        app.handle_api_event(ApiEvent::ModelsLoaded {
            models: Ok(vec!["qwen3:8b".into()]),
            announce: true,
        });
        assert_eq!(app.notices.latest().unwrap().level, NoticeLevel::Success);
    }

    // ==================== Tab Switching ====================

    #[tokio::test]
    async fn test_function_keys_switch_tabs() {
        let mut app = test_app();
        assert_eq!(app.tab, Tab::Chat);

        app.handle_key(key(KeyCode::F(3))).await;
        assert_eq!(app.tab, Tab::System);

        app.handle_key(key(KeyCode::F(2))).await;
        assert_eq!(app.tab, Tab::Vision);
    }

    #[tokio::test]
    async fn test_ctrl_q_quits() {
        let mut app = test_app();
        app.handle_key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL))
            .await;
        assert!(app.should_quit());
    }

    // ==================== Vision Flow ====================

    #[tokio::test]
    async fn test_analyze_without_staged_image_is_rejected() {
        let mut app = test_app();
        app.analyze_image();
        assert!(!app.vision.busy);
        assert_eq!(app.notices.latest().unwrap().level, NoticeLevel::Error);
    }

    #[tokio::test]
    async fn test_vision_result_applied_sanitized() {
        let mut app = test_app();
        app.vision.busy = true;

        app.handle_api_event(ApiEvent::VisionAnalyzed(Ok(
            aria_protocol::VisionResponse {
                analysis: "a cat\x1b[31m".into(),
                description: "format: JPEG".into(),
            },
        )));

        assert!(!app.vision.busy);
        let outcome = app.vision.result.as_ref().unwrap();
        assert_eq!(outcome.analysis, "a cat[31m");
    }

    #[tokio::test]
    async fn test_vision_failure_restores_trigger() {
        let mut app = test_app();
        app.vision.busy = true;

        app.handle_api_event(ApiEvent::VisionAnalyzed(Err("no vision model".into())));
        assert!(!app.vision.busy);
        assert_eq!(app.notices.latest().unwrap().level, NoticeLevel::Error);
    }
}
