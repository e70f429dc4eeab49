//! config-fields CLI - encode, decode and check module config schemas.
//!
//! Commands:
//! - `config-fields encode [FILE]`: Descriptor list to `{configSchema, uiSchema}`
//! - `config-fields decode [FILE]`: Stored schema to `{descriptors, diagnostics}`
//! - `config-fields check [FILE]`: Report whether a stored schema is canonical
//!
//! Environment variables:
//! - CONFIG_FIELDS_SCHEMA_URI: `$schema` written by encode
//! - CONFIG_FIELDS_DUPLICATE_NAMES: `reject` or `last-write-wins`
//! - CONFIG_FIELDS_PRETTY: Pretty-print JSON output
//! - CONFIG_FIELDS_STRICT: Fail decode on any diagnostic
//!
//! Exit codes:
//! - 0: Success
//! - 1: Error, or the schema root could not be parsed
//! - 2: Decode diagnostics under `--strict`, or `check` found a non-canonical schema

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use config_fields::commands::{self, EXIT_ERROR};
use config_fields::{Cli, Commands, Overrides, Settings};

fn main() {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("config_fields_schema=debug,config_fields=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    let cwd = std::env::current_dir().context("failed to resolve working directory")?;
    let settings = Settings::load(
        cli.config.as_deref(),
        &cwd,
        &Overrides::from_command(&cli.command),
    )?;
    let input = commands::read_input(cli.command.file())?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Commands::Encode { ui_schema_out, .. } => {
            commands::run_encode(&input, ui_schema_out.as_deref(), &settings, &mut out)
        }
        Commands::Decode { ui_schema, .. } => {
            commands::run_decode(&input, ui_schema.as_deref(), &settings, &mut out)
        }
        Commands::Check { ui_schema, .. } => {
            commands::run_check(&input, ui_schema.as_deref(), &settings, &mut out)
        }
    }
}
