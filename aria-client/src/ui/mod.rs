//! User interface module
//!
//! Contains the application loop, the unified event stream, terminal
//! management, drawing, and transient notifications.

mod app;
mod event;
mod notify;
mod render;
mod terminal;

pub use app::{classify_connection_test, App, BackendHealth};
pub use event::{ApiEvent, AppEvent, EventHandler, InputEvent};
pub use notify::{Notice, NoticeLevel, Notifications};
pub use terminal::Terminal;
