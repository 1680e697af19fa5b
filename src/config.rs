use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_yml::Value;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Leading character that renders a directive as a bare value.
pub const PASS_THROUGH_MARKER: char = '^';

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("default value for '{field}' must be a string, number or bool")]
    DefaultNotScalar { field: String },
    #[error("output directive #{index} must be a string")]
    DirectiveNotString { index: usize },
    #[error("output directive #{index} has no field name")]
    DirectiveEmpty { index: usize },
    #[error("input pattern #{index} has an empty tag")]
    EmptyTag { index: usize },
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    default: HashMap<String, Value>,
    #[serde(default)]
    output: Vec<Value>,
    #[serde(default)]
    input: Vec<PatternSpec>,
    #[serde(default)]
    replace: HashMap<String, Vec<Replacement>>,
}

/// One extraction rule as written in the config document.
#[derive(Debug, Clone, Deserialize)]
pub struct PatternSpec {
    pub tag: String,
    pub regex: String,
    #[serde(default)]
    pub map: Vec<String>,
    #[serde(default)]
    pub unique: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Replacement {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Rendered as `name = value`.
    Labeled(String),
    /// Rendered as the bare value.
    PassThrough(String),
}

impl Directive {
    pub fn field(&self) -> &str {
        match self {
            Directive::Labeled(name) | Directive::PassThrough(name) => name,
        }
    }

    fn parse(index: usize, raw: &str) -> Result<Self, ConfigError> {
        let directive = match raw.strip_prefix(PASS_THROUGH_MARKER) {
            Some(name) => Directive::PassThrough(name.to_string()),
            None => Directive::Labeled(raw.to_string()),
        };
        if directive.field().is_empty() {
            return Err(ConfigError::DirectiveEmpty { index });
        }
        Ok(directive)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub defaults: HashMap<String, String>,
    pub output: Vec<Directive>,
    pub input: Vec<PatternSpec>,
    pub replace: HashMap<String, Vec<Replacement>>,
}

pub fn load_config(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("failed to parse config {}", path.display()))
}

pub fn parse_config(contents: &str) -> Result<Config> {
    // An empty document deserializes to unit, not a mapping.
    let raw: RawConfig = if contents.trim().is_empty() {
        RawConfig::default()
    } else {
        serde_yml::from_str(contents)?
    };
    Ok(resolve(raw)?)
}

fn resolve(raw: RawConfig) -> Result<Config, ConfigError> {
    let mut defaults = HashMap::with_capacity(raw.default.len());
    for (field, value) in raw.default {
        let text = scalar_to_string(&value)
            .ok_or_else(|| ConfigError::DefaultNotScalar { field: field.clone() })?;
        defaults.insert(field, text);
    }

    let output = raw
        .output
        .iter()
        .enumerate()
        .map(|(index, value)| match value {
            Value::String(s) => Directive::parse(index, s),
            _ => Err(ConfigError::DirectiveNotString { index }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(index) = raw.input.iter().position(|p| p.tag.is_empty()) {
        return Err(ConfigError::EmptyTag { index });
    }

    Ok(Config {
        defaults,
        output,
        input: raw.input,
        replace: raw.replace,
    })
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
