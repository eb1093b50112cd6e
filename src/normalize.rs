//! Turns `_.name` string arguments into callable references.
//!
//! A token only becomes a callable when the whole string is `<prefix>.<word>`
//! and the word names a table entry. Anything else stays a literal string.

use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::registry::UtilityTable;
use crate::value::Value;

pub const DEFAULT_REFERENCE_PREFIX: &str = "_";

static DEFAULT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&reference_pattern(DEFAULT_REFERENCE_PREFIX)).expect("valid reference pattern")
});

fn reference_pattern(prefix: &str) -> String {
    format!(r"^{}\.([A-Za-z0-9_]+)$", regex::escape(prefix))
}

#[derive(Clone, Debug)]
pub struct Normalizer {
    pattern: Regex,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.clone(),
        }
    }
}

impl Normalizer {
    pub fn with_prefix(prefix: &str) -> Result<Self> {
        if prefix.is_empty() {
            return Err(anyhow!("reference prefix must not be empty"));
        }
        let pattern = Regex::new(&reference_pattern(prefix))
            .map_err(|err| anyhow!("invalid reference prefix `{prefix}`: {err}"))?;
        Ok(Self { pattern })
    }

    /// Name captured from a function-reference token, if `text` is one.
    pub fn reference_name<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    pub fn normalize(&self, params: Vec<Value>, table: &UtilityTable) -> Vec<Value> {
        params
            .into_iter()
            .map(|param| self.normalize_one(param, table))
            .collect()
    }

    fn normalize_one(&self, param: Value, table: &UtilityTable) -> Value {
        let func = match &param {
            Value::String(text) => self
                .reference_name(text)
                .and_then(|name| table.reference(name)),
            _ => None,
        };
        func.map_or(param, Value::Callable)
    }
}

/// Normalizes with the default `_` prefix.
pub fn normalize(params: Vec<Value>, table: &UtilityTable) -> Vec<Value> {
    Normalizer::default().normalize(params, table)
}
