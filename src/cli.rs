//! CLI definitions for autopilot.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use autopilot_core::config::{AgentConfig, Tier};
use autopilot_core::flavor::IdeFlavor;

/// Autopilot CLI.
#[derive(Parser)]
#[command(name = "autopilot")]
#[command(about = "Auto-continue driver for IDE-embedded AI chat assistants")]
#[command(version)]
pub(crate) struct Cli {
    /// State file path (defaults to ~/.autopilot/state.json)
    #[arg(long, global = true)]
    pub state_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run the coordinator in the foreground (default)
    Run {
        /// IDE flavor to drive
        #[arg(long, default_value = "a", value_parser = parse_flavor)]
        flavor: IdeFlavor,

        /// Enable multi-conversation background mode
        #[arg(long)]
        background: bool,

        /// Poll interval for the simple loop, in milliseconds
        #[arg(long, default_value_t = autopilot_core::config::DEFAULT_POLL_INTERVAL_MS)]
        poll_interval_ms: u64,

        /// Extra deny-list pattern (repeatable); added to the defaults
        #[arg(long = "deny")]
        deny: Vec<String>,

        /// License tier
        #[arg(long, default_value = "pro", value_parser = parse_tier)]
        tier: Tier,

        /// Program name suggested in relaunch prompts
        #[arg(long, default_value = "code", env = "AUTOPILOT_IDE_PROGRAM")]
        ide_program: String,
    },

    /// Probe the debugging port range and report endpoints and weekly totals
    Status,
}

fn parse_flavor(s: &str) -> Result<IdeFlavor, String> {
    match s.to_ascii_lowercase().as_str() {
        "a" => Ok(IdeFlavor::A),
        "b" => Ok(IdeFlavor::B),
        other => Err(format!("unknown flavor '{other}' (expected 'a' or 'b')")),
    }
}

fn parse_tier(s: &str) -> Result<Tier, String> {
    match s.to_ascii_lowercase().as_str() {
        "free" => Ok(Tier::Free),
        "pro" => Ok(Tier::Pro),
        other => Err(format!("unknown tier '{other}' (expected 'free' or 'pro')")),
    }
}

pub(crate) fn build_config(
    flavor: IdeFlavor,
    background: bool,
    poll_interval_ms: u64,
    extra_deny: &[String],
    tier: Tier,
) -> AgentConfig {
    let mut config = AgentConfig {
        ide_flavor: flavor,
        background_mode: background,
        poll_interval_ms,
        tier,
        ..Default::default()
    };
    config.deny_list.extend(extra_deny.iter().cloned());
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flavor_and_tier_parsing() {
        assert_eq!(parse_flavor("A").unwrap(), IdeFlavor::A);
        assert_eq!(parse_flavor("b").unwrap(), IdeFlavor::B);
        assert!(parse_flavor("c").is_err());
        assert_eq!(parse_tier("free").unwrap(), Tier::Free);
        assert!(parse_tier("trial").is_err());
    }

    #[test]
    fn test_build_config_appends_deny_patterns() {
        let config = build_config(
            IdeFlavor::B,
            true,
            500,
            &["shutdown".to_string()],
            Tier::Pro,
        );
        assert!(config.deny_list.contains(&"shutdown".to_string()));
        // Defaults are kept, not replaced.
        assert!(config.deny_list.iter().any(|p| p.contains("rm -rf")));
        assert_eq!(config.poll_interval_ms, 500);
    }
}
