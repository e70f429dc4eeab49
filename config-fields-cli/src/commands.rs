//! Subcommand implementations.
//!
//! Each runner takes the input text and a writer for stdout and returns the
//! process exit code. I/O and parse failures are returned as errors.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use config_fields_schema::{
    parse_descriptors, DecodeOutcome, Decoder, DecoderConfig, Encoder, UiSchemaDocument,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::settings::Settings;

pub const EXIT_OK: i32 = 0;
pub const EXIT_ERROR: i32 = 1;
/// Decode under `--strict` found diagnostics, or `check` found drift
pub const EXIT_DIAGNOSTICS: i32 = 2;

/// Read FILE, or stdin when it is absent or `-`.
pub fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) if path != Path::new("-") => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("failed to read stdin")?;
            Ok(input)
        }
    }
}

pub fn run_encode(
    input: &str,
    ui_schema_out: Option<&Path>,
    settings: &Settings,
    out: &mut impl Write,
) -> Result<i32> {
    let descriptors = parse_descriptors(input).context("failed to parse field descriptors")?;
    let encoded = Encoder::new(settings.encoder_config())
        .encode(&descriptors)
        .context("failed to encode config schema")?;

    match ui_schema_out {
        Some(path) => {
            let text = to_text(&encoded.ui_schema, settings.pretty)?;
            fs::write(path, text + "\n")
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), hints = encoded.ui_schema.len(), "wrote UI-schema");
            write_json(out, &encoded.schema.to_json(), settings.pretty)?;
        }
        None => write_json(out, &encoded, settings.pretty)?,
    }
    Ok(EXIT_OK)
}

pub fn run_decode(
    input: &str,
    ui_schema: Option<&Path>,
    settings: &Settings,
    out: &mut impl Write,
) -> Result<i32> {
    let outcome = decoder(ui_schema)?
        .decode_str(input)
        .context("config schema is not valid JSON")?;
    write_json(out, &outcome, settings.pretty)?;
    Ok(decode_exit_code(&outcome, settings.strict))
}

/// Decode then re-encode, reporting whether the input already was the
/// canonical encoding of its fields.
pub fn run_check(
    input: &str,
    ui_schema: Option<&Path>,
    settings: &Settings,
    out: &mut impl Write,
) -> Result<i32> {
    let stored: Value = serde_json::from_str(input).context("config schema is not valid JSON")?;
    let outcome = decoder(ui_schema)?.decode(&stored);
    if outcome.is_fatal() {
        write_json(out, &json!({ "canonical": false, "diagnostics": outcome.diagnostics }), settings.pretty)?;
        return Ok(EXIT_ERROR);
    }

    let encoded = Encoder::new(settings.encoder_config())
        .encode(&outcome.descriptors)
        .context("failed to re-encode decoded fields")?;
    let canonical = encoded.schema.to_json();
    if canonical == stored {
        debug!(fields = outcome.descriptors.len(), "config schema is canonical");
        write_json(out, &json!({ "canonical": true }), settings.pretty)?;
        return Ok(EXIT_OK);
    }

    write_json(
        out,
        &json!({
            "canonical": false,
            "diagnostics": outcome.diagnostics,
            "configSchema": canonical,
            "uiSchema": encoded.ui_schema,
        }),
        settings.pretty,
    )?;
    Ok(EXIT_DIAGNOSTICS)
}

pub fn decode_exit_code(outcome: &DecodeOutcome, strict: bool) -> i32 {
    if outcome.is_fatal() {
        EXIT_ERROR
    } else if strict && !outcome.is_clean() {
        EXIT_DIAGNOSTICS
    } else {
        EXIT_OK
    }
}

fn decoder(ui_schema: Option<&Path>) -> Result<Decoder> {
    let mut config = DecoderConfig::new();
    if let Some(path) = ui_schema {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let value: Value = serde_json::from_str(&text)
            .with_context(|| format!("UI-schema {} is not valid JSON", path.display()))?;
        config = config.with_ui_schema(UiSchemaDocument::from_json(&value));
    }
    Ok(Decoder::new(config))
}

fn to_text(value: &impl Serialize, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(text)
}

fn write_json(out: &mut impl Write, value: &impl Serialize, pretty: bool) -> Result<()> {
    writeln!(out, "{}", to_text(value, pretty)?)?;
    Ok(())
}
