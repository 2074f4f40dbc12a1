//! Apishim CLI - serve, validate and manage V2-to-V1 mapping configurations

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands};
use colored::control;
use config::Settings;
use error::Result;
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::process;
use tracing::instrument;

#[tokio::main]
async fn main() {
    // .env is optional
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();
    control::set_override(cli.use_color());

    let result = run(cli).await;

    match result {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("{}", error::format_error(&e, control::SHOULD_COLORIZE.should_colorize()));
            process::exit(e.exit_code());
        }
    }
}

#[instrument(skip(cli), fields(command = ?cli.command))]
async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref())?;

    // held until exit so buffered file logs are flushed
    let _log_guard = match init_logging(&cli, &settings) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            None
        }
    };
    let _timer = Timer::new("cli_execution");

    let mut output = OutputWriter::new(cli.output, cli.use_color(), cli.quiet);
    tracing::debug!(verbosity = cli.verbosity_level(), "Executing command");

    match cli.command {
        Commands::Serve(args) => handlers::handle_serve(args, settings, &mut output).await,
        Commands::Validate(args) => handlers::handle_validate(args, &mut output).await,
        Commands::Configs(args) => handlers::handle_configs(args, &settings, &mut output).await,
    }
}

fn init_logging(
    cli: &Cli,
    settings: &Settings,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let mut logging_config = LoggingConfig::from_verbosity(cli.verbosity_level());

    // a server is silent at `warn`; default it to `info`
    if matches!(cli.command, Commands::Serve(_)) && cli.verbosity_level() == 0 {
        logging_config.level = "info".to_string();
    }

    logging_config.merge_with_settings(&settings.logging);
    logging_config.merge_with_env();

    if cli.quiet {
        logging_config.level = "error".to_string();
        logging_config.console = false;
    }

    logging::init_logging(logging_config)
}
