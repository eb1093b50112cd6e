use std::env;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, Result};

use crate::normalize::DEFAULT_REFERENCE_PREFIX;
use crate::trace::{validate_level, JsonLineSink, NullSink, Stream, TraceSink};

pub const ENV_PREFIX: &str = "LODASH_RESOLVER_PREFIX";
pub const ENV_TRACE: &str = "LODASH_RESOLVER_TRACE";
pub const ENV_LOG_LEVEL: &str = "LODASH_RESOLVER_LOG_LEVEL";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceMode {
    Off,
    Stdout,
    Stderr,
}

impl FromStr for TraceMode {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(TraceMode::Off),
            "stdout" => Ok(TraceMode::Stdout),
            "stderr" => Ok(TraceMode::Stderr),
            other => Err(anyhow!("unsupported trace mode: {other}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Marker before the dot in function-reference tokens (`_` in `_.toUpper`).
    pub reference_prefix: String,
    pub trace: TraceMode,
    pub level: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            reference_prefix: DEFAULT_REFERENCE_PREFIX.to_string(),
            trace: TraceMode::Stderr,
            level: "info".to_string(),
        }
    }
}

impl ResolverConfig {
    /// Defaults overlaid with `LODASH_RESOLVER_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(prefix) = lookup(ENV_PREFIX).filter(|value| !value.trim().is_empty()) {
            config.reference_prefix = prefix.trim().to_string();
        }
        if let Some(mode) = lookup(ENV_TRACE) {
            config.trace = mode.parse()?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            let level = level.trim().to_ascii_lowercase();
            validate_level(&level)?;
            config.level = level;
        }
        Ok(config)
    }

    pub fn trace_sink(&self) -> Result<Arc<dyn TraceSink>> {
        let sink: Arc<dyn TraceSink> = match self.trace {
            TraceMode::Off => Arc::new(NullSink),
            TraceMode::Stdout => Arc::new(JsonLineSink::new(Stream::Stdout, self.level.clone())?),
            TraceMode::Stderr => Arc::new(JsonLineSink::new(Stream::Stderr, self.level.clone())?),
        };
        Ok(sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_env() {
        let config = ResolverConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ResolverConfig::default());
        assert_eq!(config.reference_prefix, "_");
    }

    #[test]
    fn env_overrides_are_applied() {
        let config = ResolverConfig::from_lookup(lookup(&[
            (ENV_PREFIX, "lodash"),
            (ENV_TRACE, "stderr"),
            (ENV_LOG_LEVEL, "DEBUG"),
        ]))
        .unwrap();
        assert_eq!(config.reference_prefix, "lodash");
        assert_eq!(config.trace, TraceMode::Stderr);
        assert_eq!(config.level, "debug");
    }

    #[test]
    fn trace_modes_parse_case_insensitively() {
        assert_eq!(" OFF ".parse::<TraceMode>().unwrap(), TraceMode::Off);
        assert_eq!("Stdout".parse::<TraceMode>().unwrap(), TraceMode::Stdout);
        assert_eq!("stderr".parse::<TraceMode>().unwrap(), TraceMode::Stderr);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(ResolverConfig::from_lookup(lookup(&[(ENV_TRACE, "syslog")])).is_err());
        assert!(ResolverConfig::from_lookup(lookup(&[(ENV_TRACE, "on")])).is_err());
        assert!(ResolverConfig::from_lookup(lookup(&[(ENV_TRACE, "0")])).is_err());
        assert!(ResolverConfig::from_lookup(lookup(&[(ENV_LOG_LEVEL, "loud")])).is_err());
    }
}
