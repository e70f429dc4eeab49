//! Layered CLI settings using Figment.
//!
//! Sources in precedence order (later sources override earlier ones):
//! 1. Built-in defaults
//! 2. A settings file: `--config PATH`, or the first
//!    `config-fields.{toml,yaml,yml,json}` found in the working directory
//! 3. Environment variables with the `CONFIG_FIELDS_` prefix
//! 4. Command-line flags

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use config_fields_schema::{DuplicateNamePolicy, EncoderConfig, DRAFT_07_SCHEMA_URI};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::cli::Commands;

pub const ENV_PREFIX: &str = "CONFIG_FIELDS_";

const CONFIG_FILE_STEM: &str = "config-fields";
const CONFIG_FILE_EXTENSIONS: [&str; 4] = ["toml", "yaml", "yml", "json"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub schema_uri: String,
    pub duplicate_names: DuplicateNamePolicy,
    pub pretty: bool,
    pub strict: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_uri: DRAFT_07_SCHEMA_URI.to_string(),
            duplicate_names: DuplicateNamePolicy::Reject,
            pretty: false,
            strict: false,
        }
    }
}

/// Values given on the command line. Unset flags leave lower layers alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_names: Option<DuplicateNamePolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretty: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

impl Overrides {
    /// Collect the flags a subcommand was given. A switch that was not passed
    /// is left unset rather than forced to `false`.
    pub fn from_command(command: &Commands) -> Self {
        let flag = |set: bool| set.then_some(true);
        match command {
            Commands::Encode {
                allow_duplicate_names,
                schema_uri,
                pretty,
                ..
            } => Self {
                schema_uri: schema_uri.clone(),
                duplicate_names: allow_duplicate_names.then_some(DuplicateNamePolicy::LastWriteWins),
                pretty: flag(*pretty),
                strict: None,
            },
            Commands::Decode { strict, pretty, .. } => Self {
                pretty: flag(*pretty),
                strict: flag(*strict),
                ..Self::default()
            },
            Commands::Check { pretty, .. } => Self {
                pretty: flag(*pretty),
                ..Self::default()
            },
        }
    }
}

impl Settings {
    /// Load settings from every layer.
    ///
    /// `config_file` replaces discovery in `search_dir`; it must exist.
    pub fn load(config_file: Option<&Path>, search_dir: &Path, overrides: &Overrides) -> Result<Self> {
        let settings: Settings = Self::figment(config_file, search_dir, overrides)?
            .extract()
            .context("invalid config-fields settings")?;
        debug!(?settings, "loaded settings");
        Ok(settings)
    }

    /// Build the figment with all sources in precedence order.
    pub fn figment(
        config_file: Option<&Path>,
        search_dir: &Path,
        overrides: &Overrides,
    ) -> Result<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(Settings::default()));

        let file = match config_file {
            Some(path) if !path.is_file() => {
                bail!("config file not found: {}", path.display())
            }
            Some(path) => Some(path.to_path_buf()),
            None => discover_config_file(search_dir),
        };
        if let Some(path) = file {
            debug!(path = %path.display(), "loading settings file");
            figment = figment.merge(file_provider(&path)?);
        }

        Ok(figment
            .merge(Env::prefixed(ENV_PREFIX).map(|key| key.as_str().to_lowercase().into()))
            .merge(Serialized::defaults(overrides)))
    }

    pub fn encoder_config(&self) -> EncoderConfig {
        EncoderConfig::new()
            .with_schema_uri(self.schema_uri.clone())
            .with_duplicate_names(self.duplicate_names)
    }
}

/// First `config-fields.<ext>` in `dir`, by extension priority.
pub fn discover_config_file(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_EXTENSIONS.iter().find_map(|ext| {
        let candidate = dir.join(format!("{CONFIG_FILE_STEM}.{ext}"));
        trace!(path = %candidate.display(), "checking for settings file");
        candidate.is_file().then_some(candidate)
    })
}

fn file_provider(path: &Path) -> Result<Figment> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => Ok(Figment::from(Toml::file(path))),
        Some("yaml" | "yml") => Ok(Figment::from(Yaml::file(path))),
        Some("json") => Ok(Figment::from(Json::file(path))),
        _ => bail!("unsupported settings file format: {}", path.display()),
    }
}
