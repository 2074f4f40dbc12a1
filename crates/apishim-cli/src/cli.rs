//! Command-line interface argument parsing and definitions

use clap::{Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use std::path::PathBuf;

/// Apishim - config-driven adapter serving V2 endpoints from legacy V1 APIs
#[derive(Parser, Debug)]
#[command(
    name = "apishim",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to settings file
    #[arg(short, long, global = true, env = "APISHIM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(short, long, value_enum, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the configured V2 endpoints
    Serve(ServeArgs),

    /// Validate mapping configuration files
    Validate(ValidateArgs),

    /// Inspect and manage stored mapping configurations
    Configs(ConfigsArgs),
}

#[derive(Parser, Debug, Default)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Base URL of the legacy V1 API
    #[arg(long, value_name = "URL")]
    pub v1_base_url: Option<String>,

    /// Directory holding mapping configurations
    #[arg(long, value_name = "DIR")]
    pub configs_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Mapping configuration files (YAML or JSON)
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Print the parsed document for valid files
    #[arg(long)]
    pub detailed: bool,
}

#[derive(Parser, Debug)]
pub struct ConfigsArgs {
    /// Directory holding mapping configurations
    #[arg(long, value_name = "DIR", global = true)]
    pub configs_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub action: ConfigsAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigsAction {
    /// List stored configurations
    List,

    /// Show one configuration
    Show {
        /// Configuration identifier (file stem)
        id: String,
    },

    /// Delete one configuration
    Delete {
        /// Configuration identifier (file stem)
        id: String,
    },
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    Json,
    Yaml,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}
