//! Typed UI actions and the global key dispatch table
//!
//! Keys map to a [`UiAction`] enum rather than being handled ad hoc at
//! call sites. Tab-local editing keys (text entry, field focus) are
//! interpreted by the active tab's handler in `ui::app`.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Top-level view tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Chat,
    Vision,
    System,
    Settings,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Chat, Tab::Vision, Tab::System, Tab::Settings];

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn title(self) -> &'static str {
        match self {
            Tab::Chat => "Chat",
            Tab::Vision => "Vision",
            Tab::System => "System",
            Tab::Settings => "Settings",
        }
    }
}

/// Actions produced by the global dispatch table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    SwitchTab(Tab),
    ClearChat,
    Quit,
}

/// Global key bindings, checked before tab-local handling
const GLOBAL_BINDINGS: &[(KeyCode, KeyModifiers, UiAction)] = &[
    (KeyCode::Char('q'), KeyModifiers::CONTROL, UiAction::Quit),
    (KeyCode::Char('c'), KeyModifiers::CONTROL, UiAction::Quit),
    (KeyCode::F(1), KeyModifiers::NONE, UiAction::SwitchTab(Tab::Chat)),
    (KeyCode::F(2), KeyModifiers::NONE, UiAction::SwitchTab(Tab::Vision)),
    (KeyCode::F(3), KeyModifiers::NONE, UiAction::SwitchTab(Tab::System)),
    (
        KeyCode::F(4),
        KeyModifiers::NONE,
        UiAction::SwitchTab(Tab::Settings),
    ),
    (KeyCode::Char('l'), KeyModifiers::CONTROL, UiAction::ClearChat),
];

/// Look up a key in the global dispatch table
pub fn global_action(key: &KeyEvent) -> Option<UiAction> {
    GLOBAL_BINDINGS
        .iter()
        .find(|(code, mods, _)| *code == key.code && *mods == key.modifiers)
        .map(|(_, _, action)| *action)
}
