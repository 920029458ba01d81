//! Subcommands and their execution against a loaded engine

use anyhow::{Context, Result};
use cfgsync_core::codec::FieldKind;
use cfgsync_core::{ControlMode, Error, Field, SettingValue, SyncEngine, ThemeMode};
use clap::{Parser, Subcommand};
use std::io::Write;

/// Inspect and edit client settings through the sync engine
#[derive(Debug, Parser)]
#[command(name = "cfgsyncctl", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Print the mirrored settings
    Show {
        /// Emit JSON instead of key = value lines
        #[arg(long)]
        json: bool,
    },
    /// Persist a single setting
    Set { key: String, value: String },
    /// Persist several settings in one batch
    SetMany {
        /// Pairs in KEY=VALUE form
        #[arg(required = true, value_parser = parse_pair)]
        pairs: Vec<(String, String)>,
    },
    /// Switch the appearance mode
    Theme { mode: ThemeMode },
    /// Ask the backend for a fresh client identifier
    RegenerateUuid,
    /// Restore backend defaults and reload
    Reset {
        /// Keys to keep (defaults to the configured exclude list)
        #[arg(long = "exclude", value_name = "KEY", conflicts_with = "all")]
        exclude: Vec<String>,
        /// Reset every key, including the client identifier
        #[arg(long)]
        all: bool,
    },
}

/// Split a `KEY=VALUE` argument
pub fn parse_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}

/// Convert command-line text into the typed value for `key`
///
/// Flags accept only `true`/`false` and choices must name a valid
/// option. Unknown keys are passed through as text.
pub fn parse_value(key: &str, raw: &str) -> Result<SettingValue> {
    let Some(field) = Field::from_key(key) else {
        return Ok(SettingValue::from(raw));
    };

    match field.kind() {
        FieldKind::Flag => match raw {
            "true" => Ok(SettingValue::Bool(true)),
            "false" => Ok(SettingValue::Bool(false)),
            other => Err(Error::invalid_input(format!(
                "{} expects true or false, got '{}'",
                key, other
            ))
            .into()),
        },
        FieldKind::Choice => {
            if field == Field::ThemeMode {
                Ok(raw.parse::<ThemeMode>()?.into())
            } else {
                Ok(raw.parse::<ControlMode>()?.into())
            }
        }
        FieldKind::Derived => Err(Error::derived_field(key).into()),
        FieldKind::Text => Ok(SettingValue::from(raw)),
    }
}

impl Command {
    pub async fn execute<W: Write>(self, engine: &SyncEngine, out: &mut W) -> Result<()> {
        match self {
            Command::Show { json } => {
                let settings = engine.store().snapshot();
                if json {
                    serde_json::to_writer_pretty(&mut *out, &settings)?;
                    writeln!(out)?;
                } else {
                    for field in Field::PERSISTED
                        .into_iter()
                        .chain(std::iter::once(Field::CurrentWeek))
                    {
                        writeln!(out, "{} = {}", field, settings.get(field))?;
                    }
                }
            }
            Command::Set { key, value } => {
                let value = parse_value(&key, &value)?;
                engine
                    .save_one(&key, value)
                    .await
                    .with_context(|| format!("Failed to save {}", key))?;
                writeln!(out, "saved {}", key)?;
            }
            Command::SetMany { pairs } => {
                let values = pairs
                    .iter()
                    .map(|(key, raw)| Ok((key.clone(), parse_value(key, raw)?)))
                    .collect::<Result<Vec<_>>>()?;
                engine
                    .save_many(values)
                    .await
                    .context("Failed to save settings batch")?;
                writeln!(out, "saved {} setting(s)", pairs.len())?;
            }
            Command::Theme { mode } => {
                engine
                    .set_theme_mode(mode)
                    .await
                    .context("Theme applied locally but not persisted")?;
                writeln!(out, "theme_mode = {}", mode)?;
            }
            Command::RegenerateUuid => match engine.regenerate_identifier().await {
                Some(uuid) => writeln!(out, "client_uuid = {}", uuid)?,
                None => {
                    return Err(Error::rejected(
                        "regenerate_uuid",
                        "backend did not issue a new identifier",
                    )
                    .into());
                }
            },
            Command::Reset { exclude, all } => {
                let reset = if all {
                    engine.reset_to_defaults(&[]).await
                } else if exclude.is_empty() {
                    engine.reset_with_default_exclude().await
                } else {
                    engine.reset_to_defaults(&exclude).await
                };
                reset.context("Reset failed")?;
                writeln!(out, "settings reset")?;
            }
        }
        Ok(())
    }
}
