//! Event handling for the application
//!
//! Combines terminal input, event-channel messages, and completed REST
//! calls into a unified event stream consumed by the main loop.

// Allow unused code that's part of the public API for future features
#![allow(dead_code)]

use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};
use tokio::sync::mpsc;

use aria_protocol::{
    HealthResponse, RemoteConfig, ScreenshotResponse, ServerEvent, SystemInfoResponse,
    VisionResponse,
};

use crate::system::CommandOutcome;
use crate::vision::StagedImage;

/// Application events combining input, channel events, and REST results
#[derive(Debug)]
pub enum AppEvent {
    /// Terminal input event
    Input(InputEvent),
    /// Event received on the persistent channel
    Server(ServerEvent),
    /// A spawned REST call (or blocking job) finished
    Api(ApiEvent),
    /// Terminal resize
    Resize { cols: u16, rows: u16 },
    /// Tick for animations and periodic updates
    Tick,
}

/// Input events from terminal
#[derive(Debug, Clone)]
pub enum InputEvent {
    /// Key press
    Key(KeyEvent),
    /// Bracketed paste
    Paste(String),
    /// Focus gained
    FocusGained,
    /// Focus lost
    FocusLost,
}

/// Results delivered back from spawned asynchronous work.
///
/// Errors arrive pre-formatted: they are only ever shown to the user.
#[derive(Debug)]
pub enum ApiEvent {
    ConfigLoaded(Result<RemoteConfig, String>),
    ModelsLoaded {
        models: Result<Vec<String>, String>,
        /// Report success with a notification (explicit refresh) or stay
        /// quiet (startup load)
        announce: bool,
    },
    /// Periodic backend liveness poll, drives the status indicator
    HealthChecked(Result<HealthResponse, String>),
    /// Explicit connection test from the settings tab
    ConnectionTested(Result<HealthResponse, String>),
    ImageStaged(Result<StagedImage, String>),
    VisionAnalyzed(Result<VisionResponse, String>),
    CommandFinished(Result<CommandOutcome, String>),
    ScreenshotTaken(Result<ScreenshotResponse, String>),
    SystemInfoLoaded(Result<SystemInfoResponse, String>),
}

/// Event handler that feeds the unified stream
pub struct EventHandler {
    /// Sender for app events
    tx: mpsc::UnboundedSender<AppEvent>,
    /// Receiver for app events
    rx: mpsc::UnboundedReceiver<AppEvent>,
    /// Tick rate for animations and polling
    tick_rate: Duration,
}

impl EventHandler {
    /// Create a new event handler
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx, tick_rate }
    }

    /// Get a sender clone for forwarding events from spawned tasks
    pub fn sender(&self) -> mpsc::UnboundedSender<AppEvent> {
        self.tx.clone()
    }

    /// Start polling for terminal events in a background thread
    pub fn start_input_polling(&self) {
        let tx = self.tx.clone();
        let tick_rate = self.tick_rate;

        std::thread::spawn(move || {
            loop {
                // Poll with timeout for tick
                if event::poll(tick_rate).unwrap_or(false) {
                    match event::read() {
                        Ok(CrosstermEvent::Key(key)) => {
                            if tx.send(AppEvent::Input(InputEvent::Key(key))).is_err() {
                                break;
                            }
                        }
                        Ok(CrosstermEvent::Paste(text)) => {
                            if tx.send(AppEvent::Input(InputEvent::Paste(text))).is_err() {
                                break;
                            }
                        }
                        Ok(CrosstermEvent::Resize(cols, rows)) => {
                            if tx.send(AppEvent::Resize { cols, rows }).is_err() {
                                break;
                            }
                        }
                        Ok(CrosstermEvent::FocusGained) => {
                            if tx.send(AppEvent::Input(InputEvent::FocusGained)).is_err() {
                                break;
                            }
                        }
                        Ok(CrosstermEvent::FocusLost) => {
                            if tx.send(AppEvent::Input(InputEvent::FocusLost)).is_err() {
                                break;
                            }
                        }
                        Ok(CrosstermEvent::Mouse(_)) => {
                            // Mouse capture is not enabled
                        }
                        Err(e) => {
                            tracing::error!("Error reading terminal event: {}", e);
                            break;
                        }
                    }
                } else {
                    // Timeout - send tick
                    if tx.send(AppEvent::Tick).is_err() {
                        break;
                    }
                }
            }
        });
    }

    /// Receive next event
    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }

    /// Try to receive without blocking
    pub fn try_next(&mut self) -> Option<AppEvent> {
        self.rx.try_recv().ok()
    }
}
