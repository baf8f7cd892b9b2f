//! CLI entry and dispatch.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use threadkey_core::SortOptions;
use threadkey_core::config::{self, Config};

use crate::logging;

mod commands;

#[derive(Parser)]
#[command(name = "threadkey")]
#[command(version)]
#[command(about = "Sortable hierarchy keys for threaded records")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config.toml (default: $THREADKEY_HOME/config.toml)
    #[arg(long, global = true, value_name = "PATH", env = "THREADKEY_CONFIG")]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Key layout overrides shared by thread commands.
#[derive(clap::Args, Debug, Clone, Default)]
struct LayoutArgs {
    /// Separator between depth segments (default: config, else "/")
    #[arg(long, value_name = "SEP", allow_hyphen_values = true)]
    delimiter: Option<String>,

    /// Marker appended to every key (default: config, else ".")
    #[arg(long = "end-of-record", value_name = "MARKER", allow_hyphen_values = true)]
    end_of_record: Option<String>,
}

impl LayoutArgs {
    fn resolve(&self, config: &Config) -> Result<SortOptions> {
        let mut merged = config.clone();
        if let Some(delimiter) = &self.delimiter {
            merged.delimiter.clone_from(delimiter);
        }
        if let Some(end_of_record) = &self.end_of_record {
            merged.end_of_record.clone_from(end_of_record);
        }
        merged.sort_options().context("invalid key layout")
    }
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Assign keys to a JSON array of records and print it sorted
    Sort {
        /// JSON file to read ("-" for stdin)
        #[arg(value_name = "FILE", default_value = "-")]
        input: String,

        #[command(flatten)]
        layout: LayoutArgs,

        /// Assign keys but keep the input order
        #[arg(long)]
        keys_only: bool,
    },
    /// Sort a JSON array of records and print it as an indented tree
    Format {
        /// JSON file to read ("-" for stdin)
        #[arg(value_name = "FILE", default_value = "-")]
        input: String,

        #[command(flatten)]
        layout: LayoutArgs,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Generate a fresh config from Rust defaults (for xtask)
    Generate,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(config::paths::config_path);

    match cli.command {
        Commands::Sort {
            input,
            layout,
            keys_only,
        } => {
            let config = load_config(&config_path, cli.verbose)?;
            let options = layout.resolve(&config)?;
            commands::thread::sort(&input, &options, keys_only)
        }
        Commands::Format { input, layout } => {
            let config = load_config(&config_path, cli.verbose)?;
            let options = layout.resolve(&config)?;
            commands::thread::format(&input, &options)
        }
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path(&config_path);
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(&config_path),
            ConfigCommands::Generate => commands::config::generate(),
        },
    }
}

/// Loads config, then installs logging using its `log_level`.
fn load_config(path: &Path, verbose: bool) -> Result<Config> {
    let config = Config::load_from(path).context("load config")?;
    logging::init(verbose, config.log_level.as_deref());
    tracing::debug!(path = %path.display(), "config loaded");
    Ok(config)
}
