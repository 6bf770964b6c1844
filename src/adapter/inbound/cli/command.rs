//! Command-line interface definitions.
//!
//! Defines the CLI structure for the resourcehub-dashboard binary using
//! `clap`: a live `watch` view, a one-shot `snapshot`, and diagnostic checks.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Configuration file used when `--config` is not given.
pub const DEFAULT_CONFIG: &str = "config.toml";

/// Realtime admin dashboard client for ResourceHub
#[derive(Parser, Debug)]
#[command(name = "resourcehub-dashboard")]
#[command(version, about)]
pub struct Cli {
    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Follow the dashboard live until interrupted
    Watch(ConfigPathArg),

    /// Fetch the current statistics once over HTTP
    Snapshot(ConfigPathArg),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

/// Subcommands for `resourcehub-dashboard check`.
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate the configuration file and show effective settings.
    Config(CheckConfigArgs),
}

/// Shared argument struct for commands that require only a configuration path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to the configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,
}

/// Arguments for `check config`.
#[derive(Parser, Debug)]
pub struct CheckConfigArgs {
    /// Path to the configuration file.
    #[arg(default_value = DEFAULT_CONFIG)]
    pub path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_has_version() {
        let cmd = Cli::command();
        assert!(cmd.get_version().is_some());
    }

    #[test]
    fn test_cli_name() {
        let cmd = Cli::command();
        assert_eq!(cmd.get_name(), "resourcehub-dashboard");
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_watch_defaults() {
        let cli = Cli::try_parse_from(["resourcehub-dashboard", "watch"]).unwrap();
        let Commands::Watch(args) = cli.command else {
            panic!("expected watch");
        };
        assert_eq!(args.config, PathBuf::from(DEFAULT_CONFIG));
        assert!(!cli.json);
        assert!(!cli.quiet);
        assert_eq!(cli.verbose, 0);
        assert!(matches!(cli.color, ColorChoice::Auto));
    }

    #[test]
    fn test_parse_snapshot_with_config() {
        let cli =
            Cli::try_parse_from(["resourcehub-dashboard", "snapshot", "-c", "hub.toml"]).unwrap();
        let Commands::Snapshot(args) = cli.command else {
            panic!("expected snapshot");
        };
        assert_eq!(args.config, PathBuf::from("hub.toml"));
    }

    #[test]
    fn test_parse_check_config_positional() {
        let cli = Cli::try_parse_from(["resourcehub-dashboard", "check", "config", "hub.toml"])
            .unwrap();
        let Commands::Check(CheckCommand::Config(args)) = cli.command else {
            panic!("expected check config");
        };
        assert_eq!(args.path, PathBuf::from("hub.toml"));
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "resourcehub-dashboard",
            "snapshot",
            "--json",
            "-vv",
            "--color",
            "never",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.color, ColorChoice::Never));
    }

    #[test]
    fn test_unknown_subcommand_fails() {
        assert!(Cli::try_parse_from(["resourcehub-dashboard", "run"]).is_err());
    }
}
