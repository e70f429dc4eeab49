//! CLI definition for the `config-fields` binary.
//!
//! Only depends on `clap` and `std`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Encode, decode and check module config schemas.
///
/// Input is read from FILE, or from stdin when FILE is absent or `-`.
/// JSON results go to stdout; logs go to stderr.
#[derive(Parser, Debug)]
#[command(name = "config-fields")]
#[command(version)]
#[command(about = "Encode, decode and check module config schemas")]
#[command(
    long_about = "Translates between config field descriptor lists and the JSON Schema \
    (plus UI-schema) stored for a module's configuration.\n\n\
    Settings are layered: built-in defaults, then config-fields.{toml,yaml,yml,json} in \
    the working directory (or --config), then CONFIG_FIELDS_* environment variables, \
    then command-line flags.\n\n\
    Environment variables:\n  \
    CONFIG_FIELDS_SCHEMA_URI       $schema written by encode\n  \
    CONFIG_FIELDS_DUPLICATE_NAMES  reject | last-write-wins\n  \
    CONFIG_FIELDS_PRETTY           Pretty-print JSON output\n  \
    CONFIG_FIELDS_STRICT           Fail decode on any diagnostic"
)]
pub struct Cli {
    /// Enable debug output to stderr
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Settings file to use instead of discovering one
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Encode a descriptor list into a config schema and UI-schema
    Encode {
        /// Descriptor list (JSON array)
        file: Option<PathBuf>,
        /// Write the UI-schema here and print only the config schema
        #[arg(long, value_name = "PATH")]
        ui_schema_out: Option<PathBuf>,
        /// Let a later descriptor replace an earlier one with the same name
        #[arg(long)]
        allow_duplicate_names: bool,
        /// Override the $schema URI
        #[arg(long, value_name = "URI")]
        schema_uri: Option<String>,
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Decode a stored config schema into descriptors and diagnostics
    Decode {
        /// Config schema (JSON object)
        file: Option<PathBuf>,
        /// Companion UI-schema consulted for fields without x-component
        #[arg(long, value_name = "PATH")]
        ui_schema: Option<PathBuf>,
        /// Exit with status 2 when any field could not be decoded
        #[arg(long)]
        strict: bool,
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Check that a stored config schema is already in canonical form
    Check {
        /// Config schema (JSON object)
        file: Option<PathBuf>,
        /// Companion UI-schema consulted for fields without x-component
        #[arg(long, value_name = "PATH")]
        ui_schema: Option<PathBuf>,
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

impl Commands {
    /// The input file argument, if any.
    pub fn file(&self) -> Option<&std::path::Path> {
        match self {
            Commands::Encode { file, .. }
            | Commands::Decode { file, .. }
            | Commands::Check { file, .. } => file.as_deref(),
        }
    }
}
