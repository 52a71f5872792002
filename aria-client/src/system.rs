//! System control panel state and metric formatting

// Allow unused code that's part of the public API for future features
#![allow(dead_code)]

use aria_protocol::{CommandResponse, SystemInfoResponse};

/// Launcher entries for the quick-action row. Each issues a regular
/// command; the backend maps these names onto its own allowlist.
pub const QUICK_ACTIONS: &[&str] = &[
    "notepad",
    "calc",
    "cmd",
    "taskmgr",
    "mspaint",
    "explorer",
    "control",
    "powershell",
];

/// Outcome of the last executed command, rendered inline
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Success {
        message: String,
        output: Option<String>,
    },
    Failure(String),
}

impl CommandOutcome {
    pub fn from_response(response: CommandResponse) -> Self {
        Self::Success {
            message: response
                .message
                .unwrap_or_else(|| "Command executed".to_string()),
            output: response.output.filter(|o| !o.is_empty()),
        }
    }
}

/// Which control on the system tab holds focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemFocus {
    QuickActions,
    CommandInput,
}

/// System tab state
#[derive(Debug)]
pub struct SystemState {
    /// Master toggle; gates every control except the screenshot trigger
    pub control_enabled: bool,
    pub focus: SystemFocus,
    pub quick_action_index: usize,
    pub command_input: String,
    pub command_busy: bool,
    pub command_result: Option<CommandOutcome>,
    /// Last metrics fetch: payload on success, error text in place of the
    /// panel contents on failure, None before the first fetch completes
    pub info: Option<Result<SystemInfoResponse, String>>,
    pub info_busy: bool,
}

impl SystemState {
    pub fn new() -> Self {
        Self {
            control_enabled: false,
            focus: SystemFocus::QuickActions,
            quick_action_index: 0,
            command_input: String::new(),
            command_busy: false,
            command_result: None,
            info: None,
            info_busy: false,
        }
    }

    /// Take the trimmed command text, or None for the empty no-op
    pub fn take_command(&mut self) -> Option<String> {
        let command = self.command_input.trim().to_owned();
        if command.is_empty() {
            return None;
        }
        self.command_input.clear();
        Some(command)
    }

    /// Currently highlighted quick action
    pub fn selected_quick_action(&self) -> &'static str {
        QUICK_ACTIONS[self.quick_action_index % QUICK_ACTIONS.len()]
    }

    pub fn cycle_quick_action(&mut self, forward: bool) {
        let len = QUICK_ACTIONS.len();
        self.quick_action_index = if forward {
            (self.quick_action_index + 1) % len
        } else {
            (self.quick_action_index + len - 1) % len
        };
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            SystemFocus::QuickActions => SystemFocus::CommandInput,
            SystemFocus::CommandInput => SystemFocus::QuickActions,
        };
    }
}

impl Default for SystemState {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a byte count as binary gigabytes with two decimals
pub fn format_gib(bytes: u64) -> String {
    format!("{:.2} GB", bytes as f64 / (1024u64.pow(3)) as f64)
}

/// Format a percentage with one decimal
pub fn format_percent(percent: f64) -> String {
    format!("{:.1}%", percent)
}

/// Build the metric panel lines from a fetched payload
pub fn build_info_lines(info: &SystemInfoResponse) -> Vec<String> {
    vec![
        format!(
            "CPU:     {} used ({} cores)",
            format_percent(info.cpu.percent),
            info.cpu.cores
        ),
        format!(
            "Memory:  {} / {} ({})",
            format_gib(info.memory.used),
            format_gib(info.memory.total),
            format_percent(info.memory.percent)
        ),
        format!(
            "Disk:    {} / {} ({})",
            format_gib(info.disk.used),
            format_gib(info.disk.total),
            format_percent(info.disk.percent)
        ),
        format!("Processes: {}", info.system.processes),
    ]
}
