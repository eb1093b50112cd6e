use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Number;

use crate::registry::UtilityFn;

/// 2^63, the first integral f64 past `i64::MAX`.
const I64_UPPER_BOUND: f64 = 9.223372036854775808e18;

pub type ValueMap = BTreeMap<String, Value>;

/// A utility-table function carried as data. Equality is by name.
#[derive(Clone)]
pub struct FunctionRef {
    name: String,
    func: Arc<dyn UtilityFn>,
}

impl FunctionRef {
    pub(crate) fn new(name: impl Into<String>, func: Arc<dyn UtilityFn>) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invokes the referenced function. Undefined results are returned as-is.
    pub fn call(&self, args: &[Value]) -> Result<Option<Value>> {
        self.func.call(args)
    }
}

impl PartialEq for FunctionRef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl fmt::Debug for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Function: {}]", self.name)
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    Object(ValueMap),
    Callable(FunctionRef),
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Callable(_) => "function",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(num) => num.as_f64(),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ValueMap> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_callable(&self) -> Option<&FunctionRef> {
        match self {
            Value::Callable(func) => Some(func),
            _ => None,
        }
    }

    /// Builds a number, keeping integral values as integers so `3.0` prints as `3`.
    /// Non-finite input has no JSON representation and becomes null.
    pub fn from_f64(raw: f64) -> Value {
        if raw.fract() == 0.0 && raw >= (i64::MIN as f64) && raw < I64_UPPER_BOUND {
            return Value::Number(Number::from(raw as i64));
        }
        Number::from_f64(raw).map_or(Value::Null, Value::Number)
    }

    /// JavaScript truthiness.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(flag) => *flag,
            Value::Number(num) => {
                if let Some(f) = num.as_f64() {
                    f != 0.0 && !f.is_nan()
                } else if let Some(i) = num.as_i64() {
                    i != 0
                } else if let Some(u) = num.as_u64() {
                    u != 0
                } else {
                    false
                }
            }
            Value::String(text) => !text.is_empty(),
            Value::Array(_) | Value::Object(_) | Value::Callable(_) => true,
        }
    }

    /// String conversion with JavaScript `String(x)` semantics, except that
    /// null renders as the empty string the way lodash's `toString` does.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(flag) => flag.to_string(),
            Value::Number(num) => num.to_string(),
            Value::String(text) => text.clone(),
            Value::Array(items) => items
                .iter()
                .map(Value::to_display_string)
                .collect::<Vec<_>>()
                .join(","),
            Value::Object(_) => "[object Object]".to_string(),
            Value::Callable(func) => format!("[Function: {}]", func.name()),
        }
    }

    /// Lossy conversion for output: callables become `"[Function: name]"`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(flag) => serde_json::Value::Bool(*flag),
            Value::Number(num) => serde_json::Value::Number(num.clone()),
            Value::String(text) => serde_json::Value::String(text.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Object(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(key, val)| (key.clone(), val.to_json()))
                    .collect(),
            ),
            Value::Callable(func) => serde_json::Value::String(format!("[Function: {}]", func.name())),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(flag) => Value::Bool(flag),
            serde_json::Value::Number(num) => Value::Number(num),
            serde_json::Value::String(text) => Value::String(text),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, val)| (key, Value::from(val)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::Bool(flag)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::String(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::String(text)
    }
}

impl From<i64> for Value {
    fn from(num: i64) -> Self {
        Value::Number(Number::from(num))
    }
}

impl From<usize> for Value {
    fn from(num: usize) -> Self {
        Value::Number(Number::from(num))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truthiness_follows_javascript() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::from(json!(0)).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::from("0").is_truthy());
        assert!(Value::from(json!([])).is_truthy());
        assert!(Value::from(json!({})).is_truthy());
    }

    #[test]
    fn from_f64_keeps_integers_integral() {
        assert_eq!(Value::from_f64(3.0).to_json(), json!(3));
        assert_eq!(Value::from_f64(2.5).to_json(), json!(2.5));
        assert_eq!(Value::from_f64(f64::NAN), Value::Null);
    }

    #[test]
    fn from_f64_does_not_saturate_at_i64_max() {
        let two_pow_63 = 9.223372036854775808e18;
        assert_eq!(Value::from_f64(two_pow_63).as_f64(), Some(two_pow_63));
        assert_ne!(Value::from_f64(two_pow_63).to_json(), json!(i64::MAX));
        assert_eq!(Value::from_f64(-two_pow_63).to_json(), json!(i64::MIN));
    }

    #[test]
    fn display_string_joins_arrays() {
        let value = Value::from(json!([1, "a", null, [2, 3]]));
        assert_eq!(value.to_display_string(), "1,a,,2,3");
    }
}
