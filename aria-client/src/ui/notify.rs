//! Transient notifications
//!
//! Short-lived messages (saved, refreshed, failed, ...) shown in the
//! status bar and dropped after a few seconds.

// Allow unused code that's part of the public API for future features
#![allow(dead_code)]

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::style::Color;

/// How long a notice stays visible
const NOTICE_TTL: Duration = Duration::from_secs(3);

/// How many stale notices to keep around before dropping the oldest
const MAX_NOTICES: usize = 8;

/// Notice severity, mapped to a display color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl NoticeLevel {
    pub fn color(self) -> Color {
        match self {
            NoticeLevel::Info => Color::Blue,
            NoticeLevel::Success => Color::Green,
            NoticeLevel::Warning => Color::Yellow,
            NoticeLevel::Error => Color::Red,
        }
    }
}

/// One transient message
#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub level: NoticeLevel,
    expires_at: Instant,
}

/// Queue of live notifications
#[derive(Debug, Default)]
pub struct Notifications {
    items: VecDeque<Notice>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a notice expiring after the standard TTL
    pub fn push(&mut self, text: impl Into<String>, level: NoticeLevel) {
        self.push_at(text, level, Instant::now());
    }

    fn push_at(&mut self, text: impl Into<String>, level: NoticeLevel, now: Instant) {
        let text = text.into();
        tracing::debug!(?level, "notice: {}", text);
        self.items.push_back(Notice {
            text,
            level,
            expires_at: now + NOTICE_TTL,
        });
        while self.items.len() > MAX_NOTICES {
            self.items.pop_front();
        }
    }

    /// Drop expired notices
    pub fn prune(&mut self, now: Instant) {
        self.items.retain(|n| n.expires_at > now);
    }

    /// Most recent live notice, if any
    pub fn latest(&self) -> Option<&Notice> {
        self.items.back()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
