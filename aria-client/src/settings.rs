//! Settings form state and the local override store
//!
//! The settings form mirrors the backend's configuration record. Saving
//! writes the composed record to a local JSON file only; the backend is
//! never written to. The local copy, when present, takes precedence over
//! the remote resource on load.

// Allow unused code that's part of the public API for future features
#![allow(dead_code)]

use std::path::PathBuf;

use aria_protocol::{OllamaConfig, RemoteConfig, SystemConfig};
use aria_utils::{AriaError, Result};

/// Form fields, in focus order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    BaseUrl,
    DefaultModel,
    SystemControl,
    AgentMode,
    AllowedCommands,
    ScreenshotQuality,
    MaxFileSize,
}

impl SettingsField {
    pub const ORDER: [SettingsField; 7] = [
        SettingsField::BaseUrl,
        SettingsField::DefaultModel,
        SettingsField::SystemControl,
        SettingsField::AgentMode,
        SettingsField::AllowedCommands,
        SettingsField::ScreenshotQuality,
        SettingsField::MaxFileSize,
    ];

    pub fn next(self) -> Self {
        let i = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(i + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        let i = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(i + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// Settings tab state, bound to the configuration record
#[derive(Debug)]
pub struct SettingsForm {
    pub focus: SettingsField,
    pub base_url: String,
    pub allow_system_control: bool,
    pub enable_agent_mode: bool,
    /// One command per line, edited as text
    pub allowed_commands_text: String,
    pub screenshot_quality: u8,
    /// Edited as text, in mebibytes
    pub max_file_size_mib: String,
    /// Fields the form does not expose, carried through save unchanged
    vision_model: Option<String>,
    code_model: Option<String>,
}

impl SettingsForm {
    pub fn new() -> Self {
        let mut form = Self {
            focus: SettingsField::BaseUrl,
            base_url: String::new(),
            allow_system_control: false,
            enable_agent_mode: true,
            allowed_commands_text: String::new(),
            screenshot_quality: 85,
            max_file_size_mib: String::new(),
            vision_model: None,
            code_model: None,
        };
        form.populate(&RemoteConfig::default());
        form
    }

    /// Fill every bound field from a configuration record
    pub fn populate(&mut self, config: &RemoteConfig) {
        self.base_url = config.ollama.base_url.clone();
        self.allow_system_control = config.system.allow_system_control;
        self.enable_agent_mode = config.system.enable_agent_mode;
        self.allowed_commands_text = config.system.allowed_commands.join("\n");
        self.screenshot_quality = config.system.screenshot_quality.min(100);
        self.max_file_size_mib =
            format!("{}", config.system.max_file_size / (1024 * 1024));
        self.vision_model = config.ollama.vision_model.clone();
        self.code_model = config.ollama.code_model.clone();
    }

    /// Read every bound field back into a configuration record.
    ///
    /// `default_model` comes from the model selector, which lives outside
    /// this form.
    pub fn compose(&self, default_model: Option<String>) -> Result<RemoteConfig> {
        let max_file_size_mib: u64 = self
            .max_file_size_mib
            .trim()
            .parse()
            .map_err(|_| AriaError::validation("Max file size must be a whole number of MB"))?;

        Ok(RemoteConfig {
            ollama: OllamaConfig {
                base_url: self.base_url.trim().to_owned(),
                default_model,
                vision_model: self.vision_model.clone(),
                code_model: self.code_model.clone(),
            },
            system: SystemConfig {
                allow_system_control: self.allow_system_control,
                enable_agent_mode: self.enable_agent_mode,
                allowed_commands: normalize_commands(&self.allowed_commands_text),
                screenshot_quality: self.screenshot_quality.min(100),
                max_file_size: max_file_size_mib * 1024 * 1024,
            },
        })
    }

    /// Adjust the screenshot quality slider, clamped to 0-100
    pub fn adjust_quality(&mut self, delta: i16) {
        let value = i16::from(self.screenshot_quality) + delta;
        self.screenshot_quality = value.clamp(0, 100) as u8;
    }
}

impl Default for SettingsForm {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize the allowed-commands textarea into a trimmed, blank-filtered
/// ordered list
pub fn normalize_commands(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Local persistence for the settings override record
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at the default XDG location
    pub fn default_location() -> Self {
        Self::new(aria_utils::settings_file())
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Load the override record, or None when no override is saved
    pub fn load(&self) -> Result<Option<RemoteConfig>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let text = std::fs::read_to_string(&self.path).map_err(|e| AriaError::FileRead {
            path: self.path.clone(),
            source: e,
        })?;
        let config = serde_json::from_str(&text).map_err(|e| AriaError::ConfigInvalid {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        Ok(Some(config))
    }

    /// Write the override record
    pub fn save(&self, config: &RemoteConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AriaError::FileWrite {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let text = serde_json::to_string_pretty(config)
            .map_err(|e| AriaError::internal(format!("Failed to serialize settings: {}", e)))?;
        std::fs::write(&self.path, text).map_err(|e| AriaError::FileWrite {
            path: self.path.clone(),
            source: e,
        })?;
        Ok(())
    }

    /// Delete the override record; missing file is not an error
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AriaError::FileWrite {
                path: self.path.clone(),
                source: e,
            }),
        }
    }
}
