//! aria-utils: Common utilities shared across aria crates
//!
//! This crate provides:
//! - Unified error types ([`AriaError`], [`Result`])
//! - Logging infrastructure ([`init_logging`], [`LogConfig`])
//! - XDG-compliant path utilities ([`paths`] module)

pub mod error;
pub mod logging;
pub mod paths;

// Re-export main types at crate root for convenience
pub use error::{AriaError, Result};
pub use logging::{init_logging, init_logging_with_config, LogConfig, LogOutput};

// Re-export commonly used path functions
pub use paths::{
    cache_dir, config_dir, config_file, ensure_all_dirs, log_dir, settings_file, state_dir,
};
