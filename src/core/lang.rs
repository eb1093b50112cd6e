use anyhow::Result;

use super::{arg, defined};
use crate::registry::UtilityTable;
use crate::value::Value;

pub fn register_lang(table: &mut UtilityTable) {
    table.register("identity", identity);
    table.register("noop", noop);
    table.register("isNil", |args: &[Value]| is_kind(args, |v| v.is_null()));
    table.register("isNull", |args: &[Value]| is_kind(args, |v| v.is_null()));
    table.register("isString", |args: &[Value]| is_kind(args, |v| matches!(v, Value::String(_))));
    table.register("isNumber", |args: &[Value]| is_kind(args, |v| matches!(v, Value::Number(_))));
    table.register("isBoolean", |args: &[Value]| is_kind(args, |v| matches!(v, Value::Bool(_))));
    table.register("isArray", |args: &[Value]| is_kind(args, |v| matches!(v, Value::Array(_))));
    table.register("isObject", |args: &[Value]| {
        is_kind(args, |v| matches!(v, Value::Array(_) | Value::Object(_) | Value::Callable(_)))
    });
    table.register("isFunction", |args: &[Value]| is_kind(args, |v| matches!(v, Value::Callable(_))));
    table.register("isEmpty", is_empty);
    table.register("isEqual", is_equal);
    table.register("toString", to_string);
    table.register("toNumber", to_number);
    table.register("castArray", cast_array);
    table.register("defaultTo", default_to);
}

fn identity(args: &[Value]) -> Result<Option<Value>> {
    Ok(args.first().cloned())
}

/// Always undefined.
fn noop(_args: &[Value]) -> Result<Option<Value>> {
    Ok(None)
}

fn is_kind(args: &[Value], check: fn(&Value) -> bool) -> Result<Option<Value>> {
    defined(Value::Bool(check(arg(args, 0))))
}

fn is_empty(args: &[Value]) -> Result<Option<Value>> {
    let empty = match arg(args, 0) {
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::Callable(_) => true,
    };
    defined(Value::Bool(empty))
}

fn is_equal(args: &[Value]) -> Result<Option<Value>> {
    defined(Value::Bool(arg(args, 0) == arg(args, 1)))
}

fn to_string(args: &[Value]) -> Result<Option<Value>> {
    defined(Value::from(arg(args, 0).to_display_string()))
}

/// Numeric conversion; values with no numeric reading become null.
fn to_number(args: &[Value]) -> Result<Option<Value>> {
    let value = arg(args, 0);
    let converted = match value {
        Value::Number(_) => value.clone(),
        Value::Bool(flag) => Value::from(i64::from(*flag)),
        Value::Null => Value::from(0i64),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Value::from(0i64)
            } else {
                trimmed.parse::<f64>().map_or(Value::Null, Value::from_f64)
            }
        }
        Value::Array(_) | Value::Object(_) | Value::Callable(_) => Value::Null,
    };
    defined(converted)
}

fn cast_array(args: &[Value]) -> Result<Option<Value>> {
    let out = match args.first() {
        None => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(other) => vec![other.clone()],
    };
    defined(Value::Array(out))
}

fn default_to(args: &[Value]) -> Result<Option<Value>> {
    match arg(args, 0) {
        Value::Null => Ok(args.get(1).cloned()),
        other => defined(other.clone()),
    }
}
