use anyhow::Result;

use crate::registry::{UnknownOperationError, UtilityTable};
use crate::value::Value;

pub const OP_PARAMS: &str = "params";
pub const OP_BOOLEAN: &str = "boolean";
pub const OP_IFELSE: &str = "ifelse";

const TRUTHY_STRINGS: [&str; 6] = ["true", "t", "yes", "y", "on", "1"];

/// Whether `address` is handled before the table is consulted.
pub fn is_builtin(address: &str) -> bool {
    matches!(address, OP_PARAMS | OP_BOOLEAN | OP_IFELSE)
}

/// Runs one operation over already-normalized params.
///
/// Built-ins take priority over table entries of the same name. An undefined
/// table result comes back as `Value::Null`, so "returned nothing" and
/// "returned null" cannot be told apart here.
pub fn dispatch(address: &str, params: Vec<Value>, table: &UtilityTable) -> Result<Value> {
    match address {
        OP_PARAMS => Ok(Value::Array(params)),
        OP_BOOLEAN => Ok(Value::Bool(
            params.first().map_or(false, coerce_boolean),
        )),
        OP_IFELSE => Ok(select_branch(params)),
        _ => {
            if !table.contains(address) {
                return Err(UnknownOperationError::new(address).into());
            }
            Ok(table.call(address, &params)?.unwrap_or(Value::Null))
        }
    }
}

/// Boolean parsing for configuration values: `"yes"`, `"on"`, `1` and friends
/// are true, everything unrecognised is false.
pub fn coerce_boolean(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::String(text) => {
            let lowered = text.trim().to_lowercase();
            TRUTHY_STRINGS.contains(&lowered.as_str())
        }
        Value::Number(num) => num.as_f64() == Some(1.0),
        Value::Null | Value::Array(_) | Value::Object(_) | Value::Callable(_) => false,
    }
}

fn select_branch(params: Vec<Value>) -> Value {
    let mut iter = params.into_iter();
    let cond = iter.next().map_or(false, |value| value.is_truthy());
    let when_true = iter.next();
    let when_false = iter.next();
    let chosen = if cond { when_true } else { when_false };
    chosen.unwrap_or(Value::Null)
}
