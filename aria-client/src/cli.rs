//! Command-line argument parsing for the aria client
//!
//! Uses clap for argument parsing with derive macros.

use clap::Parser;

/// aria - terminal client for a local AI assistant backend
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Backend server URL or a remote alias from config
    ///
    /// Accepts a full URL (http://host:port) or the name of an alias
    /// defined in the `[remotes]` section of config.toml.
    /// Example: aria --server http://192.168.1.5:7860
    #[arg(long, short = 's', env = "ARIA_SERVER")]
    pub server: Option<String>,

    /// Log filter override (otherwise ARIA_LOG, defaulting to "warn")
    ///
    /// Example: aria --log aria=debug
    #[arg(long)]
    pub log: Option<String>,
}

impl Args {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = Args::parse_from(["aria"]);
        assert!(args.server.is_none());
        assert!(args.log.is_none());
    }

    #[test]
    fn test_server_flag() {
        let args = Args::parse_from(["aria", "--server", "http://localhost:7860"]);
        assert_eq!(args.server.as_deref(), Some("http://localhost:7860"));

        let args = Args::parse_from(["aria", "-s", "gaming-pc"]);
        assert_eq!(args.server.as_deref(), Some("gaming-pc"));
    }

    #[test]
    fn test_log_flag() {
        let args = Args::parse_from(["aria", "--log", "debug"]);
        assert_eq!(args.log.as_deref(), Some("debug"));
    }
}
