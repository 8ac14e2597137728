//! AniTrack CLI
//!
//! Command-line interface and terminal view for the AniTrack watchlist.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use anitrack_core::Config;

mod commands;
mod logging;
mod output;
mod prompt;
mod session;
mod tui;

use output::{Output, OutputFormat};
use session::Session;

#[derive(Parser)]
#[command(name = "anitrack")]
#[command(about = "AniTrack - Browse top anime and keep a watchlist")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to config file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Keep the watchlist in memory for this run only
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the TUI interface
    Tui,
    /// Show the top anime list
    Top {
        /// Show only the first N entries
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Sign in and load your watchlist
    Login {
        /// Profile to sign in as (defaults to config `user`, then $USER)
        #[arg(short, long)]
        user: Option<String>,
    },
    /// Sign out
    Logout,
    /// Show who is signed in
    Whoami,
    /// List your watchlist
    #[command(alias = "ls")]
    List,
    /// Add an anime from the top list
    Add {
        /// MyAnimeList id (see `anitrack top`)
        mal_id: i64,
    },
    /// Remove a watchlist entry
    #[command(alias = "rm")]
    Remove {
        /// Entry ID (full id or prefix)
        id: String,
    },
    /// Show status (identity, store, watchlist size)
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, catalog_url, catalog_ttl_secs,
        /// request_timeout_secs, user, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // Config commands work without a store or session
    if let Some(Commands::Config { command }) = &cli.command {
        return handle_config_command(command.clone(), config_path, &output);
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    // TUI is the default when no command given
    let command = match cli.command {
        Some(Commands::Tui) | None => return tui::run(config, cli.ephemeral).await,
        Some(command) => command,
    };

    logging::init_cli_logging();

    let user = match &command {
        Commands::Login { user } => user.clone(),
        _ => None,
    };
    let session = Session::open(config, user, cli.ephemeral)?;

    match command {
        Commands::Top { limit } => commands::catalog::top(&session, limit, &output).await,
        Commands::Login { .. } => commands::auth::login(&session, &output).await,
        Commands::Logout => commands::auth::logout(&session, &output).await,
        Commands::Whoami => commands::auth::whoami(&session, &output),
        Commands::List => commands::watchlist::list(&session, &output).await,
        Commands::Add { mal_id } => commands::watchlist::add(&session, mal_id, &output).await,
        Commands::Remove { id } => commands::watchlist::remove(&session, id, &output).await,
        Commands::Status => commands::status::show(&session, &output).await,
        Commands::Tui | Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add() {
        let cli = Cli::parse_from(["anitrack", "--json", "add", "20"]);
        assert!(cli.json);
        assert!(matches!(cli.command, Some(Commands::Add { mal_id: 20 })));
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["anitrack", "list", "--ephemeral", "--config", "/tmp/c.toml"]);
        assert!(cli.ephemeral);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
        assert!(matches!(cli.command, Some(Commands::List)));
    }

    #[test]
    fn test_default_is_tui() {
        let cli = Cli::parse_from(["anitrack"]);
        assert!(cli.command.is_none());
    }
}
