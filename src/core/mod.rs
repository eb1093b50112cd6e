pub mod array;
pub mod collection;
pub mod lang;
pub mod number;
pub mod object;
pub mod string;

use anyhow::{anyhow, Result};

use crate::registry::UtilityTable;
use crate::value::Value;

/// Register the bundled helper functions. Each domain can also be registered on
/// its own, so hosts can opt into a subset or layer their own entries on top.
pub fn register_core(table: &mut UtilityTable) {
    array::register_array(table);
    collection::register_collection(table);
    lang::register_lang(table);
    number::register_number(table);
    object::register_object(table);
    string::register_string(table);
}

/// A fresh table holding every bundled helper.
pub fn core_table() -> UtilityTable {
    let mut table = UtilityTable::new();
    register_core(&mut table);
    table
}

static NULL: Value = Value::Null;

/// Positional argument, with missing positions read as null.
pub(crate) fn arg(args: &[Value], index: usize) -> &Value {
    args.get(index).unwrap_or(&NULL)
}

pub(crate) fn required_arg<'a>(args: &'a [Value], index: usize, name: &str) -> Result<&'a Value> {
    args.get(index)
        .ok_or_else(|| anyhow!("{name}: missing argument at position {index}"))
}

/// String argument; present non-strings are converted the way `String(x)` would.
pub(crate) fn text_arg(args: &[Value], index: usize, name: &str) -> Result<String> {
    Ok(required_arg(args, index, name)?.to_display_string())
}

pub(crate) fn number_arg(args: &[Value], index: usize, name: &str) -> Result<f64> {
    required_arg(args, index, name)?
        .as_f64()
        .ok_or_else(|| anyhow!("{name}: argument at position {index} must be a number"))
}

/// Optional integer argument; null or missing yields `default`.
pub(crate) fn int_arg(args: &[Value], index: usize, name: &str, default: i64) -> Result<i64> {
    match arg(args, index) {
        Value::Null => Ok(default),
        Value::Number(num) => num
            .as_f64()
            .map(|raw| raw.trunc() as i64)
            .ok_or_else(|| anyhow!("{name}: argument at position {index} must be an integer")),
        other => Err(anyhow!(
            "{name}: argument at position {index} must be an integer, got {}",
            other.kind()
        )),
    }
}

/// Array argument; null or missing reads as an empty array.
pub(crate) fn array_arg<'a>(args: &'a [Value], index: usize, name: &str) -> Result<&'a [Value]> {
    match arg(args, index) {
        Value::Null => Ok(&[]),
        Value::Array(items) => Ok(items),
        other => Err(anyhow!(
            "{name}: argument at position {index} must be an array, got {}",
            other.kind()
        )),
    }
}

/// Longest string, in characters, a helper will build. Same limit as V8.
pub(crate) const MAX_STRING_LENGTH: usize = 536_870_888;

/// Rejects a computed result length that overflowed or exceeds `MAX_STRING_LENGTH`.
pub(crate) fn checked_length(name: &str, length: Option<usize>) -> Result<usize> {
    length
        .filter(|length| *length <= MAX_STRING_LENGTH)
        .ok_or_else(|| anyhow!("{name}: invalid string length, result exceeds {MAX_STRING_LENGTH} characters"))
}

pub(crate) fn defined(value: Value) -> Result<Option<Value>> {
    Ok(Some(value))
}
