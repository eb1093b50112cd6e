//! Higher-order helpers. An iteratee is a callable (typically produced from a
//! `_.name` argument), a property path, a partial object to match, or absent
//! for identity. Callables receive `(value, index_or_key, collection)`.

use anyhow::{anyhow, Result};

use super::object::{parse_path, resolve_path, PathSegment};
use super::{arg, defined};
use crate::registry::UtilityTable;
use crate::value::{FunctionRef, Value, ValueMap};

pub fn register_collection(table: &mut UtilityTable) {
    table.register("map", collection_map);
    table.register("filter", collection_filter);
    table.register("find", collection_find);
    table.register("some", collection_some);
    table.register("every", collection_every);
    table.register("includes", collection_includes);
    table.register("size", collection_size);
}

enum Iteratee<'a> {
    Identity,
    Call(&'a FunctionRef),
    Property(Vec<PathSegment>),
    Matches(&'a ValueMap),
}

impl<'a> Iteratee<'a> {
    fn from_arg(value: &'a Value, name: &str) -> Result<Self> {
        match value {
            Value::Null => Ok(Iteratee::Identity),
            Value::Callable(func) => Ok(Iteratee::Call(func)),
            Value::String(_) | Value::Number(_) | Value::Array(_) => {
                Ok(Iteratee::Property(parse_path(value)?))
            }
            Value::Object(map) => Ok(Iteratee::Matches(map)),
            Value::Bool(_) => Err(anyhow!("{name}: iteratee must be a function, path or object")),
        }
    }

    fn apply(&self, item: &Value, key: Value, collection: &Value) -> Result<Value> {
        match self {
            Iteratee::Identity => Ok(item.clone()),
            Iteratee::Call(func) => Ok(func
                .call(&[item.clone(), key, collection.clone()])?
                .unwrap_or(Value::Null)),
            Iteratee::Property(segments) => Ok(resolve_path(item, segments).cloned().unwrap_or(Value::Null)),
            Iteratee::Matches(expected) => Ok(Value::Bool(is_match(item, expected))),
        }
    }

    fn test(&self, item: &Value, key: Value, collection: &Value) -> Result<bool> {
        Ok(self.apply(item, key, collection)?.is_truthy())
    }
}

/// Partial deep comparison: every key in `expected` must match in `item`.
fn is_match(item: &Value, expected: &ValueMap) -> bool {
    let Some(actual) = item.as_object() else {
        return expected.is_empty();
    };
    expected.iter().all(|(key, want)| match (actual.get(key), want) {
        (Some(got @ Value::Object(_)), Value::Object(inner)) => is_match(got, inner),
        (Some(got), want) => got == want,
        (None, _) => false,
    })
}

/// `(item, key)` pairs: array indices for arrays, keys for objects.
fn entries(collection: &Value) -> Vec<(&Value, Value)> {
    match collection {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| (item, Value::from(index)))
            .collect(),
        Value::Object(map) => map
            .iter()
            .map(|(key, item)| (item, Value::from(key.as_str())))
            .collect(),
        _ => Vec::new(),
    }
}

fn collection_map(args: &[Value]) -> Result<Option<Value>> {
    let collection = arg(args, 0);
    let iteratee = Iteratee::from_arg(arg(args, 1), "map")?;
    let mut out = Vec::new();
    for (item, key) in entries(collection) {
        out.push(iteratee.apply(item, key, collection)?);
    }
    defined(Value::Array(out))
}

fn collection_filter(args: &[Value]) -> Result<Option<Value>> {
    let collection = arg(args, 0);
    let predicate = Iteratee::from_arg(arg(args, 1), "filter")?;
    let mut out = Vec::new();
    for (item, key) in entries(collection) {
        if predicate.test(item, key, collection)? {
            out.push(item.clone());
        }
    }
    defined(Value::Array(out))
}

fn collection_find(args: &[Value]) -> Result<Option<Value>> {
    let collection = arg(args, 0);
    let predicate = Iteratee::from_arg(arg(args, 1), "find")?;
    for (item, key) in entries(collection) {
        if predicate.test(item, key, collection)? {
            return defined(item.clone());
        }
    }
    Ok(None)
}

fn collection_some(args: &[Value]) -> Result<Option<Value>> {
    let collection = arg(args, 0);
    let predicate = Iteratee::from_arg(arg(args, 1), "some")?;
    for (item, key) in entries(collection) {
        if predicate.test(item, key, collection)? {
            return defined(Value::Bool(true));
        }
    }
    defined(Value::Bool(false))
}

fn collection_every(args: &[Value]) -> Result<Option<Value>> {
    let collection = arg(args, 0);
    let predicate = Iteratee::from_arg(arg(args, 1), "every")?;
    for (item, key) in entries(collection) {
        if !predicate.test(item, key, collection)? {
            return defined(Value::Bool(false));
        }
    }
    defined(Value::Bool(true))
}

fn collection_includes(args: &[Value]) -> Result<Option<Value>> {
    let target = arg(args, 1);
    let found = match arg(args, 0) {
        Value::String(text) => text.contains(target.to_display_string().as_str()),
        collection => entries(collection).iter().any(|(item, _)| *item == target),
    };
    defined(Value::Bool(found))
}

fn collection_size(args: &[Value]) -> Result<Option<Value>> {
    let size = match arg(args, 0) {
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        Value::String(text) => text.chars().count(),
        _ => 0,
    };
    defined(Value::from(size))
}
