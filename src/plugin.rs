use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use anyhow::Result;

use crate::registry::UtilityTable;
use crate::resolver::{ResolutionRequest, ResolutionResult, Resolver};

pub const LODASH_SOURCE: &str = "lodash";

/// A named provider of configuration variables, e.g. `${lodash:toUpper, foo}`.
pub trait VariableSource: Send + Sync {
    fn resolve(&self, request: ResolutionRequest) -> Result<ResolutionResult>;

    /// Whether resolutions through this source emit trace records.
    fn is_traced(&self) -> bool {
        false
    }
}

impl VariableSource for Resolver {
    fn resolve(&self, request: ResolutionRequest) -> Result<ResolutionResult> {
        Resolver::resolve(self, request)
    }

    fn is_traced(&self) -> bool {
        self.is_tracing()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSourceError {
    source: String,
}

impl UnknownSourceError {
    pub fn source_name(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for UnknownSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown variable source: {}", self.source)
    }
}

impl std::error::Error for UnknownSourceError {}

/// The set of variable sources a host can route requests to.
#[derive(Clone, Default)]
pub struct Plugin {
    sources: HashMap<String, Arc<dyn VariableSource>>,
}

impl Plugin {
    /// Plugin exposing `table` as the `lodash` source, traced to stderr.
    pub fn new(table: UtilityTable) -> Self {
        Self::with_resolver(Resolver::new(table))
    }

    pub fn with_resolver(resolver: Resolver) -> Self {
        let mut plugin = Self::default();
        plugin.register_source(LODASH_SOURCE, Arc::new(resolver));
        plugin
    }

    pub fn register_source(&mut self, name: impl Into<String>, source: Arc<dyn VariableSource>) {
        self.sources.insert(name.into(), source);
    }

    pub fn source_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.sources.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn source(&self, name: &str) -> Option<&Arc<dyn VariableSource>> {
        self.sources.get(name)
    }

    pub fn resolve(&self, source: &str, request: ResolutionRequest) -> Result<ResolutionResult> {
        let handler = self.sources.get(source).ok_or_else(|| UnknownSourceError {
            source: source.to_string(),
        })?;
        handler.resolve(request)
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("sources", &self.source_names())
            .finish()
    }
}
