//! The config-parser contract (spec.md §6) and the one concrete parser this
//! repo ships, reading TOML instead of the original bespoke grammar.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::{ConfigEntry, ConfigError, ConfigSchema, ConfigSection, ConfigValue, ConfigValueKind};

/// The non-success outcomes a [`ConfigParser`] may report for one section,
/// matching spec.md §6 exactly (success is folded into `Ok` at the call site).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigParseOutcome {
    FileNotOpenable,
    MandatoryMissing { key: String },
    DuplicateNotAllowed { key: String },
    UnknownKey { key: String },
    SectionMissing,
}

impl std::fmt::Display for ConfigParseOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigParseOutcome::FileNotOpenable => write!(f, "config file could not be opened"),
            ConfigParseOutcome::MandatoryMissing { key } => write!(f, "mandatory key '{key}' missing"),
            ConfigParseOutcome::DuplicateNotAllowed { key } => write!(f, "key '{key}' appears more than once"),
            ConfigParseOutcome::UnknownKey { key } => write!(f, "unknown key '{key}'"),
            ConfigParseOutcome::SectionMissing => write!(f, "section missing"),
        }
    }
}

/// External collaborator: given a section name and a schema, return the
/// section's validated values or a [`ConfigParseOutcome`].
pub trait ConfigParser: Send + Sync {
    fn parse_section(&self, section: &str, schema: &ConfigSchema) -> Result<ConfigSection, ConfigParseOutcome>;
}

/// Reads a TOML document once at construction and serves `parse_section`
/// calls against the in-memory table, matching the shape of the teacher's
/// `storage::config` loader (`serde` + `toml`) rather than reimplementing a
/// bespoke grammar.
pub struct TomlConfigParser {
    document: toml::Value,
}

impl TomlConfigParser {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path: PathBuf = path.as_ref().to_path_buf();
        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Open { path: path.clone(), source })?;
        let document: toml::Value =
            toml::from_str(&raw).map_err(|e| ConfigError::Parse { path, message: e.to_string() })?;
        Ok(Self { document })
    }

    pub fn from_str(raw: &str) -> Result<Self, ConfigError> {
        let document: toml::Value = toml::from_str(raw)
            .map_err(|e| ConfigError::Parse { path: PathBuf::new(), message: e.to_string() })?;
        Ok(Self { document })
    }
}

impl ConfigParser for TomlConfigParser {
    fn parse_section(&self, section: &str, schema: &ConfigSchema) -> Result<ConfigSection, ConfigParseOutcome> {
        let Some(table) = self.document.get(section).and_then(toml::Value::as_table) else {
            return Err(ConfigParseOutcome::SectionMissing);
        };

        let known: HashMap<&str, &ConfigEntry> = schema.iter().map(|e| (e.key, e)).collect();
        for key in table.keys() {
            if !known.contains_key(key.as_str()) {
                return Err(ConfigParseOutcome::UnknownKey { key: key.clone() });
            }
        }

        let mut out = ConfigSection::new();
        for entry in schema {
            let raw = table.get(entry.key);
            let occurrences = match raw {
                None => Vec::new(),
                Some(toml::Value::Array(items)) if entry.allows_multiple() => items.clone(),
                Some(single) => vec![single.clone()],
            };

            if occurrences.is_empty() {
                if entry.is_mandatory() {
                    return Err(ConfigParseOutcome::MandatoryMissing { key: entry.key.to_string() });
                }
                if let Some(default) = &entry.default {
                    out.insert(entry.key, default.clone());
                }
                continue;
            }

            if occurrences.len() > 1 && !entry.allows_multiple() {
                return Err(ConfigParseOutcome::DuplicateNotAllowed { key: entry.key.to_string() });
            }

            for value in occurrences {
                out.insert(entry.key, toml_to_config_value(entry.kind, &value));
            }
        }

        Ok(out)
    }
}

fn toml_to_config_value(kind: ConfigValueKind, value: &toml::Value) -> ConfigValue {
    match kind {
        ConfigValueKind::Int => ConfigValue::Int(value.as_integer().unwrap_or_default()),
        ConfigValueKind::String | ConfigValueKind::Callback => {
            ConfigValue::String(value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string()))
        }
    }
}
