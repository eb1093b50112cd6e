use anyhow::{anyhow, Result};

use super::{arg, defined, required_arg};
use crate::registry::UtilityTable;
use crate::value::{Value, ValueMap};

pub fn register_object(table: &mut UtilityTable) {
    table.register("get", object_get);
    table.register("has", object_has);
    table.register("keys", object_keys);
    table.register("values", object_values);
    table.register("pick", object_pick);
    table.register("omit", object_omit);
    table.register("merge", object_merge);
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum PathSegment {
    Key(String),
    Index(usize),
}

/// Parses `a.b[0].c` style paths.
fn parse_segments(expression: &str) -> Result<Vec<PathSegment>> {
    let mut segments = Vec::new();
    let mut buffer = String::new();
    let mut rest = expression;
    while let Some(ch) = rest.chars().next() {
        match ch {
            '.' => {
                if !buffer.is_empty() {
                    segments.push(PathSegment::Key(std::mem::take(&mut buffer)));
                }
                rest = &rest[1..];
            }
            '[' => {
                if !buffer.is_empty() {
                    segments.push(PathSegment::Key(std::mem::take(&mut buffer)));
                }
                let close = rest
                    .find(']')
                    .ok_or_else(|| anyhow!("unmatched '[' in path `{expression}`"))?;
                let token = rest[1..close].trim().trim_matches(|c: char| c == '"' || c == '\'');
                if token.is_empty() {
                    return Err(anyhow!("empty index in path `{expression}`"));
                }
                segments.push(match token.parse::<usize>() {
                    Ok(index) => PathSegment::Index(index),
                    Err(_) => PathSegment::Key(token.to_string()),
                });
                rest = &rest[close + 1..];
            }
            _ => {
                buffer.push(ch);
                rest = &rest[ch.len_utf8()..];
            }
        }
    }
    if !buffer.is_empty() {
        segments.push(PathSegment::Key(buffer));
    }
    Ok(segments)
}

/// Accepts a path string or an array of keys/indices.
pub(crate) fn parse_path(path: &Value) -> Result<Vec<PathSegment>> {
    match path {
        Value::String(text) => parse_segments(text),
        Value::Number(num) => num
            .as_u64()
            .map(|index| vec![PathSegment::Index(index as usize)])
            .ok_or_else(|| anyhow!("numeric path segment must be an unsigned integer")),
        Value::Array(items) => items
            .iter()
            .map(|segment| match segment {
                Value::String(key) => Ok(PathSegment::Key(key.clone())),
                Value::Number(num) => num
                    .as_u64()
                    .map(|index| PathSegment::Index(index as usize))
                    .ok_or_else(|| anyhow!("numeric path segment must be an unsigned integer")),
                other => Err(anyhow!("path segments must be strings or integers, got {}", other.kind())),
            })
            .collect(),
        other => Err(anyhow!("path must be a string or an array, got {}", other.kind())),
    }
}

/// Walks the path; `None` when any segment is missing.
pub(crate) fn resolve_path<'a>(mut current: &'a Value, segments: &[PathSegment]) -> Option<&'a Value> {
    for segment in segments {
        current = match (segment, current) {
            (PathSegment::Key(key), Value::Object(map)) => map.get(key)?,
            (PathSegment::Index(index), Value::Object(map)) => map.get(&index.to_string())?,
            (PathSegment::Index(index), Value::Array(items)) => items.get(*index)?,
            (PathSegment::Key(key), Value::Array(items)) => items.get(key.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn object_get(args: &[Value]) -> Result<Option<Value>> {
    let segments = parse_path(required_arg(args, 1, "get")?)?;
    match resolve_path(arg(args, 0), &segments) {
        Some(found) => defined(found.clone()),
        None => Ok(args.get(2).cloned()),
    }
}

fn object_has(args: &[Value]) -> Result<Option<Value>> {
    let segments = parse_path(required_arg(args, 1, "has")?)?;
    let found = !segments.is_empty() && resolve_path(arg(args, 0), &segments).is_some();
    defined(Value::Bool(found))
}

fn object_keys(args: &[Value]) -> Result<Option<Value>> {
    let keys = match arg(args, 0) {
        Value::Object(map) => map.keys().map(|key| Value::from(key.as_str())).collect(),
        Value::Array(items) => (0..items.len()).map(|index| Value::from(index.to_string())).collect(),
        Value::String(text) => (0..text.chars().count())
            .map(|index| Value::from(index.to_string()))
            .collect(),
        _ => Vec::new(),
    };
    defined(Value::Array(keys))
}

fn object_values(args: &[Value]) -> Result<Option<Value>> {
    let values = match arg(args, 0) {
        Value::Object(map) => map.values().cloned().collect(),
        Value::Array(items) => items.clone(),
        Value::String(text) => text.chars().map(|ch| Value::from(ch.to_string())).collect(),
        _ => Vec::new(),
    };
    defined(Value::Array(values))
}

/// Key arguments after the object, with arrays of keys flattened.
fn key_args(args: &[Value]) -> Vec<String> {
    let mut keys = Vec::new();
    for value in args.iter().skip(1) {
        match value {
            Value::Array(items) => keys.extend(items.iter().map(Value::to_display_string)),
            other => keys.push(other.to_display_string()),
        }
    }
    keys
}

fn object_pick(args: &[Value]) -> Result<Option<Value>> {
    let source = arg(args, 0).as_object();
    let mut out = ValueMap::new();
    if let Some(map) = source {
        for key in key_args(args) {
            if let Some(value) = map.get(&key) {
                out.insert(key, value.clone());
            }
        }
    }
    defined(Value::Object(out))
}

fn object_omit(args: &[Value]) -> Result<Option<Value>> {
    let mut out = arg(args, 0).as_object().cloned().unwrap_or_default();
    for key in key_args(args) {
        out.remove(&key);
    }
    defined(Value::Object(out))
}

/// Recursive merge. Objects merge key by key and arrays merge index by index,
/// so `merge({a: [1, 2]}, {a: [3]})` is `{a: [3, 2]}`.
fn merge_into(target: &mut Value, source: &Value) {
    match (target, source) {
        (Value::Object(dst), Value::Object(src)) => {
            for (key, value) in src {
                match dst.get_mut(key) {
                    Some(existing) => merge_into(existing, value),
                    None => {
                        dst.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (Value::Array(dst), Value::Array(src)) => {
            for (index, value) in src.iter().enumerate() {
                match dst.get_mut(index) {
                    Some(existing) => merge_into(existing, value),
                    None => dst.push(value.clone()),
                }
            }
        }
        (slot, other) => *slot = other.clone(),
    }
}

fn object_merge(args: &[Value]) -> Result<Option<Value>> {
    let mut target = match arg(args, 0) {
        Value::Null => Value::Object(ValueMap::new()),
        other => other.clone(),
    };
    for source in args.iter().skip(1) {
        if source.is_null() {
            continue;
        }
        merge_into(&mut target, source);
    }
    defined(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(name: &str, raw: serde_json::Value) -> Option<Value> {
        let mut table = UtilityTable::new();
        register_object(&mut table);
        let Value::Array(args) = Value::from(raw) else {
            panic!("test arguments must be an array");
        };
        table.call(name, &args).unwrap()
    }

    #[test]
    fn path_parsing_handles_brackets() {
        let segments = parse_segments("a.b[0]['c'].d").unwrap();
        assert_eq!(
            segments,
            vec![
                PathSegment::Key("a".into()),
                PathSegment::Key("b".into()),
                PathSegment::Index(0),
                PathSegment::Key("c".into()),
                PathSegment::Key("d".into()),
            ]
        );
        assert!(parse_segments("a[0").is_err());
        assert!(parse_segments("a[]").is_err());
    }

    #[test]
    fn get_follows_paths_and_defaults() {
        let object = json!({ "a": [{ "b": { "c": 3 } }] });
        assert_eq!(call("get", json!([object, "a[0].b.c"])), Some(Value::from(3i64)));
        assert_eq!(call("get", json!([object, ["a", "0", "b", "c"]])), Some(Value::from(3i64)));
        assert_eq!(call("get", json!([object, "a.b.c", "default"])), Some(Value::from("default")));
        assert_eq!(call("get", json!([object, "a.b.c"])), None);
    }

    #[test]
    fn has_reports_presence() {
        let object = json!({ "a": { "b": null } });
        assert_eq!(call("has", json!([object, "a.b"])), Some(Value::Bool(true)));
        assert_eq!(call("has", json!([object, "a.c"])), Some(Value::Bool(false)));
    }

    #[test]
    fn keys_values_pick_omit() {
        let object = json!({ "b": 2, "a": 1, "c": 3 });
        assert_eq!(call("keys", json!([object])), Some(Value::from(json!(["a", "b", "c"]))));
        assert_eq!(call("values", json!([object])), Some(Value::from(json!([1, 2, 3]))));
        assert_eq!(call("pick", json!([object, ["a", "c"], "z"])), Some(Value::from(json!({ "a": 1, "c": 3 }))));
        assert_eq!(call("omit", json!([object, "a", "b"])), Some(Value::from(json!({ "c": 3 }))));
    }

    #[test]
    fn merge_is_deep_and_index_wise() {
        let out = call(
            "merge",
            json!([
                { "a": [1, 2], "nested": { "flag": true, "keep": 1 } },
                { "a": [3], "nested": { "flag": false } },
                null,
                { "extra": "x" }
            ]),
        );
        assert_eq!(
            out,
            Some(Value::from(json!({
                "a": [3, 2],
                "nested": { "flag": false, "keep": 1 },
                "extra": "x"
            })))
        );
    }
}
