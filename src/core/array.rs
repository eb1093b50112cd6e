use anyhow::Result;

use super::{arg, array_arg, defined};
use crate::registry::UtilityTable;
use crate::value::Value;

pub fn register_array(table: &mut UtilityTable) {
    table.register("concat", concat);
    table.register("join", join);
    table.register("head", head);
    table.register("first", head);
    table.register("last", last);
    table.register("flatten", flatten);
    table.register("uniq", uniq);
    table.register("compact", compact);
    table.register("reverse", reverse);
}

/// Appends every further argument; array arguments are spliced one level deep.
fn concat(args: &[Value]) -> Result<Option<Value>> {
    let mut out = match arg(args, 0) {
        Value::Array(items) => items.clone(),
        Value::Null if args.is_empty() => Vec::new(),
        other => vec![other.clone()],
    };
    for value in args.iter().skip(1) {
        match value {
            Value::Array(items) => out.extend(items.iter().cloned()),
            other => out.push(other.clone()),
        }
    }
    defined(Value::Array(out))
}

fn join(args: &[Value]) -> Result<Option<Value>> {
    let items = array_arg(args, 0, "join")?;
    let separator = match arg(args, 1) {
        Value::Null => ",".to_string(),
        other => other.to_display_string(),
    };
    let joined = items
        .iter()
        .map(Value::to_display_string)
        .collect::<Vec<_>>()
        .join(&separator);
    defined(Value::from(joined))
}

fn head(args: &[Value]) -> Result<Option<Value>> {
    Ok(array_arg(args, 0, "head")?.first().cloned())
}

fn last(args: &[Value]) -> Result<Option<Value>> {
    Ok(array_arg(args, 0, "last")?.last().cloned())
}

fn flatten(args: &[Value]) -> Result<Option<Value>> {
    let mut out = Vec::new();
    for item in array_arg(args, 0, "flatten")? {
        match item {
            Value::Array(inner) => out.extend(inner.iter().cloned()),
            other => out.push(other.clone()),
        }
    }
    defined(Value::Array(out))
}

fn uniq(args: &[Value]) -> Result<Option<Value>> {
    let mut out: Vec<Value> = Vec::new();
    for item in array_arg(args, 0, "uniq")? {
        if !out.contains(item) {
            out.push(item.clone());
        }
    }
    defined(Value::Array(out))
}

fn compact(args: &[Value]) -> Result<Option<Value>> {
    let out = array_arg(args, 0, "compact")?
        .iter()
        .filter(|item| item.is_truthy())
        .cloned()
        .collect();
    defined(Value::Array(out))
}

fn reverse(args: &[Value]) -> Result<Option<Value>> {
    let mut out = array_arg(args, 0, "reverse")?.to_vec();
    out.reverse();
    defined(Value::Array(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(name: &str, raw: serde_json::Value) -> Option<Value> {
        let mut table = UtilityTable::new();
        register_array(&mut table);
        let Value::Array(args) = Value::from(raw) else {
            panic!("test arguments must be an array");
        };
        table.call(name, &args).unwrap()
    }

    #[test]
    fn concat_splices_one_level() {
        let out = call("concat", json!([[1], 2, [3, [4]]])).unwrap();
        assert_eq!(out, Value::from(json!([1, 2, 3, [4]])));
        assert_eq!(call("concat", json!([])).unwrap(), Value::from(json!([])));
    }

    #[test]
    fn join_defaults_to_comma() {
        assert_eq!(call("join", json!([["a", "b", null, 1]])).unwrap(), Value::from("a,b,,1"));
        assert_eq!(call("join", json!([["a", "b"], "~"])).unwrap(), Value::from("a~b"));
    }

    #[test]
    fn head_and_last_are_undefined_when_empty() {
        assert_eq!(call("head", json!([[1, 2]])), Some(Value::from(1i64)));
        assert_eq!(call("first", json!([[]])), None);
        assert_eq!(call("last", json!([[1, 2]])), Some(Value::from(2i64)));
    }

    #[test]
    fn shape_helpers() {
        assert_eq!(call("flatten", json!([[1, [2, [3]]]])).unwrap(), Value::from(json!([1, 2, [3]])));
        assert_eq!(call("uniq", json!([[2, 1, 2, "2"]])).unwrap(), Value::from(json!([2, 1, "2"])));
        assert_eq!(call("compact", json!([[0, 1, false, 2, "", 3, null]])).unwrap(), Value::from(json!([1, 2, 3])));
        assert_eq!(call("reverse", json!([[1, 2, 3]])).unwrap(), Value::from(json!([3, 2, 1])));
    }

    #[test]
    fn non_array_input_is_rejected() {
        let mut table = UtilityTable::new();
        register_array(&mut table);
        assert!(table.call("join", &[Value::from("abc")]).is_err());
    }
}
