//! The configuration contract consumed from the (external) config parser
//! (spec.md §4.6, §6, C2).
//!
//! The core never parses config files itself — it hands a section name and
//! a schema to whatever implements [`parser::ConfigParser`] and gets back
//! either a populated [`ConfigSection`] or one of the parser-contract
//! outcomes spec.md §6 enumerates. [`parser::TomlConfigParser`] is the one
//! concrete implementation this repo ships, standing in for the original's
//! bespoke `.conf` grammar (an explicitly invited external-collaborator
//! substitution, spec.md §1).

pub mod error;
pub mod parser;

use std::collections::HashMap;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

pub use error::ConfigError;
pub use parser::{ConfigParseOutcome, ConfigParser, TomlConfigParser};

/// The type of value a config entry expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigValueKind {
    Int,
    String,
    /// A callback entry: the parser does not interpret the value, it hands
    /// each occurrence's raw string back to the core, which invokes the
    /// matching side effect (e.g. `plugin=` triggers [`PluginRegistry::load`](crate::plugin::PluginRegistry::load)).
    Callback,
}

bitflags! {
    /// Per-entry option bits (spec.md §6: mandatory, may-appear-multiple-times).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ConfigOptions: u8 {
        const MANDATORY = 0b01;
        const MULTIPLE  = 0b10;
    }
}

/// A single concrete value read back from a config section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConfigValue {
    Int(i64),
    String(String),
}

impl ConfigValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            ConfigValue::Int(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(i) => Some(*i),
            ConfigValue::String(_) => None,
        }
    }
}

/// One schema entry: a key, its kind, its options, and its default.
#[derive(Debug, Clone)]
pub struct ConfigEntry {
    pub key: &'static str,
    pub kind: ConfigValueKind,
    pub options: ConfigOptions,
    pub default: Option<ConfigValue>,
}

impl ConfigEntry {
    pub const fn new(key: &'static str, kind: ConfigValueKind, options: ConfigOptions) -> Self {
        Self { key, kind, options, default: None }
    }

    pub fn with_default(mut self, default: ConfigValue) -> Self {
        self.default = Some(default);
        self
    }

    pub fn is_mandatory(&self) -> bool {
        self.options.contains(ConfigOptions::MANDATORY)
    }

    pub fn allows_multiple(&self) -> bool {
        self.options.contains(ConfigOptions::MULTIPLE)
    }
}

pub type ConfigSchema = Vec<ConfigEntry>;

/// The core's own `[global]` schema (spec.md §6).
pub fn global_schema() -> ConfigSchema {
    vec![
        ConfigEntry::new("logfile", ConfigValueKind::String, ConfigOptions::empty())
            .with_default(ConfigValue::String(crate::kernel::constants::DEFAULT_LOGFILE.to_string())),
        ConfigEntry::new("loglevel", ConfigValueKind::Int, ConfigOptions::empty())
            .with_default(ConfigValue::Int(crate::logger::Level::Notice as i64)),
        ConfigEntry::new("plugin", ConfigValueKind::Callback, ConfigOptions::MULTIPLE),
        ConfigEntry::new("stack", ConfigValueKind::Callback, ConfigOptions::MULTIPLE),
    ]
}

/// A parsed section: for each entry that appeared, one or more values in
/// declaration order.
#[derive(Debug, Clone, Default)]
pub struct ConfigSection {
    values: HashMap<String, Vec<ConfigValue>>,
}

impl ConfigSection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: ConfigValue) {
        self.values.entry(key.to_string()).or_default().push(value);
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key).and_then(|v| v.first())
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ConfigValue::as_str)
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(ConfigValue::as_int)
    }

    /// All occurrences of a `MULTIPLE`/callback entry, in declaration order.
    pub fn get_all(&self, key: &str) -> &[ConfigValue] {
        self.values.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

/// A deep-copyable bag of per-instance config values, independent of the
/// schema it was validated against. This is what [`Pluginstance`](crate::plugin::Pluginstance)
/// carries as its private-config copy (spec.md §3): each instance owns one,
/// so mutating one instance's config can never leak into another's.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigData {
    values: HashMap<String, serde_json::Value>,
}

impl ConfigData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_section(section: &ConfigSection) -> Self {
        let mut data = Self::new();
        for (key, values) in &section.values {
            let json = match values.as_slice() {
                [single] => config_value_to_json(single),
                many => serde_json::Value::Array(many.iter().map(config_value_to_json).collect()),
            };
            data.values.insert(key.clone(), json);
        }
        data
    }

    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.values.get(key).and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: T) {
        if let Ok(json) = serde_json::to_value(value) {
            self.values.insert(key.to_string(), json);
        }
    }
}

fn config_value_to_json(value: &ConfigValue) -> serde_json::Value {
    match value {
        ConfigValue::Int(i) => serde_json::Value::from(*i),
        ConfigValue::String(s) => serde_json::Value::from(s.clone()),
    }
}

#[cfg(test)]
mod tests;
