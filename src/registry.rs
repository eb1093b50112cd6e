use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use anyhow::Result;

use crate::value::{FunctionRef, Value};

/// A variadic utility function. `Ok(None)` is the "undefined" result.
pub trait UtilityFn: Send + Sync {
    fn call(&self, args: &[Value]) -> Result<Option<Value>>;
}

impl<F> UtilityFn for F
where
    F: Fn(&[Value]) -> Result<Option<Value>> + Send + Sync + 'static,
{
    fn call(&self, args: &[Value]) -> Result<Option<Value>> {
        (self)(args)
    }
}

/// Raised when an address names neither a built-in nor a table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOperationError {
    address: String,
}

impl UnknownOperationError {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

impl fmt::Display for UnknownOperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown operation: {}", self.address)
    }
}

impl std::error::Error for UnknownOperationError {}

/// Named utility functions the dispatcher delegates to.
///
/// Tables are filled once and then shared read-only, usually behind an `Arc`
/// owned by a [`crate::Resolver`].
#[derive(Clone, Default)]
pub struct UtilityTable {
    funcs: HashMap<String, Arc<dyn UtilityFn>>,
}

impl UtilityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: impl Into<String>, func: F)
    where
        F: Fn(&[Value]) -> Result<Option<Value>> + Send + Sync + 'static,
    {
        let func_arc: Arc<dyn UtilityFn> = Arc::new(func);
        self.register_entry(name, func_arc);
    }

    /// Registers an existing function object, e.g. a hand-written `UtilityFn` impl.
    pub fn register_entry(&mut self, name: impl Into<String>, func: Arc<dyn UtilityFn>) {
        self.funcs.insert(name.into(), func);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.funcs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.funcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.funcs.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.funcs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the entry as an uninvoked callable value.
    pub fn reference(&self, name: &str) -> Option<FunctionRef> {
        self.funcs
            .get(name)
            .map(|func| FunctionRef::new(name, func.clone()))
    }

    /// Invokes an entry with positional arguments.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Option<Value>> {
        let func = self
            .funcs
            .get(name)
            .ok_or_else(|| UnknownOperationError::new(name))?;
        func.call(args)
    }
}

impl fmt::Debug for UtilityTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UtilityTable")
            .field("funcs", &self.names())
            .finish()
    }
}
