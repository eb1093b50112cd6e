use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};

use crate::config::ResolverConfig;
use crate::dispatch::dispatch;
use crate::normalize::Normalizer;
use crate::registry::UtilityTable;
use crate::trace::{JsonLineSink, TraceRecord, TraceSink};
use crate::value::Value;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolutionRequest {
    pub address: String,
    #[serde(default)]
    pub params: Vec<Value>,
}

impl ResolutionRequest {
    pub fn new(address: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            address: address.into(),
            params,
        }
    }

    /// Reads a request document. YAML is accepted, and JSON as a subset of it.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("unable to read request file: {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("invalid request document: {}", path.display()))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolutionResult {
    pub value: Value,
}

/// Normalizes then dispatches one request against a shared utility table.
///
/// Holds no per-call state; clones share the table and the sink.
#[derive(Clone)]
pub struct Resolver {
    table: Arc<UtilityTable>,
    normalizer: Normalizer,
    sink: Arc<dyn TraceSink>,
}

impl Resolver {
    /// Resolver with the default `_` prefix, tracing info lines to stderr.
    /// Pass a `NullSink` to `with_sink` to silence it.
    pub fn new(table: impl Into<Arc<UtilityTable>>) -> Self {
        Self {
            table: table.into(),
            normalizer: Normalizer::default(),
            sink: Arc::new(JsonLineSink::default()),
        }
    }

    pub fn with_config(table: impl Into<Arc<UtilityTable>>, config: &ResolverConfig) -> Result<Self> {
        Ok(Self {
            table: table.into(),
            normalizer: Normalizer::with_prefix(&config.reference_prefix)?,
            sink: config.trace_sink()?,
        })
    }

    pub fn with_sink(mut self, sink: Arc<dyn TraceSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn table(&self) -> &UtilityTable {
        &self.table
    }

    pub fn is_tracing(&self) -> bool {
        self.sink.is_enabled()
    }

    pub fn resolve(&self, request: ResolutionRequest) -> Result<ResolutionResult> {
        let ResolutionRequest { address, params } = request;
        let params = self.normalizer.normalize(params, &self.table);
        let traced_params = params.clone();
        let value = dispatch(&address, params, &self.table)?;
        self.sink
            .emit(&TraceRecord::new(address, traced_params, value.clone()));
        Ok(ResolutionResult { value })
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("table", &self.table)
            .field("normalizer", &self.normalizer)
            .field("tracing", &self.is_tracing())
            .finish()
    }
}
