use anyhow::Result;

use super::{arg, checked_length, defined, int_arg, text_arg};
use crate::registry::UtilityTable;
use crate::value::Value;

pub fn register_string(table: &mut UtilityTable) {
    table.register("toUpper", to_upper);
    table.register("toLower", to_lower);
    table.register("trim", trim);
    table.register("trimStart", trim_start);
    table.register("trimEnd", trim_end);
    table.register("split", split);
    table.register("replace", replace);
    table.register("startsWith", starts_with);
    table.register("endsWith", ends_with);
    table.register("padStart", pad_start);
    table.register("padEnd", pad_end);
    table.register("repeat", repeat);
    table.register("camelCase", camel_case);
    table.register("kebabCase", kebab_case);
    table.register("snakeCase", snake_case);
    table.register("upperFirst", upper_first);
    table.register("capitalize", capitalize);
}

fn to_upper(args: &[Value]) -> Result<Option<Value>> {
    defined(Value::from(text_arg(args, 0, "toUpper")?.to_uppercase()))
}

fn to_lower(args: &[Value]) -> Result<Option<Value>> {
    defined(Value::from(text_arg(args, 0, "toLower")?.to_lowercase()))
}

/// Trims whitespace, or the characters listed in the optional second argument.
fn trim_with(args: &[Value], name: &str, start: bool, end: bool) -> Result<Option<Value>> {
    let text = text_arg(args, 0, name)?;
    let trimmed = match arg(args, 1) {
        Value::Null => match (start, end) {
            (true, true) => text.trim(),
            (true, false) => text.trim_start(),
            _ => text.trim_end(),
        },
        chars => {
            let set: Vec<char> = chars.to_display_string().chars().collect();
            let mut out = text.as_str();
            if start {
                out = out.trim_start_matches(set.as_slice());
            }
            if end {
                out = out.trim_end_matches(set.as_slice());
            }
            out
        }
    };
    defined(Value::from(trimmed))
}

fn trim(args: &[Value]) -> Result<Option<Value>> {
    trim_with(args, "trim", true, true)
}

fn trim_start(args: &[Value]) -> Result<Option<Value>> {
    trim_with(args, "trimStart", true, false)
}

fn trim_end(args: &[Value]) -> Result<Option<Value>> {
    trim_with(args, "trimEnd", false, true)
}

fn split(args: &[Value]) -> Result<Option<Value>> {
    let text = text_arg(args, 0, "split")?;
    let mut segments: Vec<Value> = match arg(args, 1) {
        Value::Null => vec![Value::from(text.as_str())],
        separator => {
            let separator = separator.to_display_string();
            if separator.is_empty() {
                text.chars().map(|ch| Value::from(ch.to_string())).collect()
            } else {
                text.split(separator.as_str()).map(Value::from).collect()
            }
        }
    };
    if let Value::Number(_) = arg(args, 2) {
        let limit = int_arg(args, 2, "split", 0)?.max(0) as usize;
        segments.truncate(limit);
    }
    defined(Value::Array(segments))
}

/// Replaces the first literal occurrence of the pattern.
fn replace(args: &[Value]) -> Result<Option<Value>> {
    let text = text_arg(args, 0, "replace")?;
    let pattern = text_arg(args, 1, "replace")?;
    let replacement = arg(args, 2).to_display_string();
    defined(Value::from(text.replacen(pattern.as_str(), &replacement, 1)))
}

fn char_offset(text: &str, position: i64) -> usize {
    let clamped = position.clamp(0, text.chars().count() as i64) as usize;
    text.char_indices()
        .nth(clamped)
        .map_or(text.len(), |(offset, _)| offset)
}

fn starts_with(args: &[Value]) -> Result<Option<Value>> {
    let text = text_arg(args, 0, "startsWith")?;
    let target = arg(args, 1).to_display_string();
    let position = int_arg(args, 2, "startsWith", 0)?;
    let start = char_offset(&text, position);
    defined(Value::Bool(text[start..].starts_with(&target)))
}

fn ends_with(args: &[Value]) -> Result<Option<Value>> {
    let text = text_arg(args, 0, "endsWith")?;
    let target = arg(args, 1).to_display_string();
    let position = int_arg(args, 2, "endsWith", i64::MAX)?;
    let end = char_offset(&text, position);
    defined(Value::Bool(text[..end].ends_with(&target)))
}

fn padding(length: usize, chars: &str) -> String {
    chars.chars().cycle().take(length).collect()
}

fn pad_with(args: &[Value], name: &str, at_start: bool) -> Result<Option<Value>> {
    let text = text_arg(args, 0, name)?;
    let length = int_arg(args, 1, name, 0)?.max(0) as usize;
    let chars = match arg(args, 2) {
        Value::Null => " ".to_string(),
        other => other.to_display_string(),
    };
    let current = text.chars().count();
    if current >= length || chars.is_empty() {
        return defined(Value::from(text));
    }
    checked_length(name, Some(length))?;
    let pad = padding(length - current, &chars);
    let padded = if at_start {
        format!("{pad}{text}")
    } else {
        format!("{text}{pad}")
    };
    defined(Value::from(padded))
}

fn pad_start(args: &[Value]) -> Result<Option<Value>> {
    pad_with(args, "padStart", true)
}

fn pad_end(args: &[Value]) -> Result<Option<Value>> {
    pad_with(args, "padEnd", false)
}

fn repeat(args: &[Value]) -> Result<Option<Value>> {
    let text = text_arg(args, 0, "repeat")?;
    let count = int_arg(args, 1, "repeat", 1)?.max(0) as usize;
    if count == 0 || text.is_empty() {
        return defined(Value::from(""));
    }
    checked_length("repeat", text.chars().count().checked_mul(count))?;
    defined(Value::from(text.repeat(count)))
}

#[derive(Clone, Copy, PartialEq)]
enum CharClass {
    Lower,
    Upper,
    Digit,
}

fn classify(ch: char) -> CharClass {
    if ch.is_numeric() {
        CharClass::Digit
    } else if ch.is_uppercase() {
        CharClass::Upper
    } else {
        CharClass::Lower
    }
}

/// Splits text into words at separators, case humps (`fooBar`, `XMLHttp`) and
/// letter/digit boundaries.
pub(crate) fn words(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    for chunk in text.split(|ch: char| !ch.is_alphanumeric()) {
        let chars: Vec<char> = chunk.chars().collect();
        let mut current = String::new();
        for (i, &ch) in chars.iter().enumerate() {
            if let Some(&prev) = i.checked_sub(1).and_then(|p| chars.get(p)) {
                let (prev_class, class) = (classify(prev), classify(ch));
                let next_is_lower = chars
                    .get(i + 1)
                    .map_or(false, |&next| classify(next) == CharClass::Lower);
                let boundary = match (prev_class, class) {
                    (CharClass::Lower, CharClass::Upper) => true,
                    (CharClass::Upper, CharClass::Upper) => next_is_lower,
                    (CharClass::Digit, CharClass::Digit) => false,
                    (CharClass::Digit, _) | (_, CharClass::Digit) => true,
                    _ => false,
                };
                if boundary && !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
            current.push(ch);
        }
        if !current.is_empty() {
            out.push(current);
        }
    }
    out
}

fn upper_first_str(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn camel_case(args: &[Value]) -> Result<Option<Value>> {
    let text = text_arg(args, 0, "camelCase")?;
    let mut out = String::new();
    for (index, word) in words(&text).iter().enumerate() {
        let lowered = word.to_lowercase();
        if index == 0 {
            out.push_str(&lowered);
        } else {
            out.push_str(&upper_first_str(&lowered));
        }
    }
    defined(Value::from(out))
}

fn joined_lower(args: &[Value], name: &str, separator: &str) -> Result<Option<Value>> {
    let text = text_arg(args, 0, name)?;
    let joined = words(&text)
        .iter()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join(separator);
    defined(Value::from(joined))
}

fn kebab_case(args: &[Value]) -> Result<Option<Value>> {
    joined_lower(args, "kebabCase", "-")
}

fn snake_case(args: &[Value]) -> Result<Option<Value>> {
    joined_lower(args, "snakeCase", "_")
}

fn upper_first(args: &[Value]) -> Result<Option<Value>> {
    let text = text_arg(args, 0, "upperFirst")?;
    defined(Value::from(upper_first_str(&text)))
}

fn capitalize(args: &[Value]) -> Result<Option<Value>> {
    let text = text_arg(args, 0, "capitalize")?;
    defined(Value::from(upper_first_str(&text.to_lowercase())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(name: &str, raw: serde_json::Value) -> Value {
        let mut table = UtilityTable::new();
        register_string(&mut table);
        let args: Vec<Value> = match Value::from(raw) {
            Value::Array(items) => items,
            other => vec![other],
        };
        table.call(name, &args).unwrap().unwrap_or(Value::Null)
    }

    #[test]
    fn case_conversions() {
        assert_eq!(call("toUpper", json!(["bar"])), Value::from("BAR"));
        assert_eq!(call("toLower", json!(["BaR"])), Value::from("bar"));
        assert_eq!(call("camelCase", json!(["Foo Bar"])), Value::from("fooBar"));
        assert_eq!(call("camelCase", json!(["--foo-bar--"])), Value::from("fooBar"));
        assert_eq!(call("kebabCase", json!(["fooBar"])), Value::from("foo-bar"));
        assert_eq!(call("snakeCase", json!(["XMLHttpRequest"])), Value::from("xml_http_request"));
        assert_eq!(call("upperFirst", json!(["fred"])), Value::from("Fred"));
        assert_eq!(call("capitalize", json!(["FRED"])), Value::from("Fred"));
    }

    #[test]
    fn words_split_on_humps_and_digits() {
        assert_eq!(words("fooBar2baz"), vec!["foo", "Bar", "2", "baz"]);
        assert_eq!(words("XMLHttp"), vec!["XML", "Http"]);
        assert_eq!(words("  "), Vec::<String>::new());
    }

    #[test]
    fn trim_supports_custom_chars() {
        assert_eq!(call("trim", json!(["  abc  "])), Value::from("abc"));
        assert_eq!(call("trim", json!(["-_-abc-_-", "_-"])), Value::from("abc"));
        assert_eq!(call("trimStart", json!(["  abc  "])), Value::from("abc  "));
        assert_eq!(call("trimEnd", json!(["  abc  "])), Value::from("  abc"));
    }

    #[test]
    fn split_honours_separator_and_limit() {
        assert_eq!(call("split", json!(["a-b-c", "-"])), Value::from(json!(["a", "b", "c"])));
        assert_eq!(call("split", json!(["a-b-c", "-", 2])), Value::from(json!(["a", "b"])));
        assert_eq!(call("split", json!(["abc", ""])), Value::from(json!(["a", "b", "c"])));
        assert_eq!(call("split", json!(["abc"])), Value::from(json!(["abc"])));
    }

    #[test]
    fn padding_and_repeat() {
        assert_eq!(call("padStart", json!(["7", 3, "0"])), Value::from("007"));
        assert_eq!(call("padEnd", json!(["abc", 6, "_-"])), Value::from("abc_-_"));
        assert_eq!(call("padStart", json!(["abcd", 2])), Value::from("abcd"));
        assert_eq!(call("repeat", json!(["ab", 3])), Value::from("ababab"));
        assert_eq!(call("repeat", json!(["ab", 0])), Value::from(""));
    }

    #[test]
    fn oversized_results_are_errors() {
        let mut table = UtilityTable::new();
        register_string(&mut table);
        let err = table
            .call("repeat", &[Value::from("ab"), Value::from_f64(9.0e18)])
            .unwrap_err();
        assert!(err.to_string().contains("invalid string length"));
        let err = table
            .call("padStart", &[Value::from("x"), Value::from_f64(1.0e12), Value::from("0")])
            .unwrap_err();
        assert!(err.to_string().contains("padStart"));
        let err = table
            .call("padEnd", &[Value::from("x"), Value::from_f64(1.0e12)])
            .unwrap_err();
        assert!(err.to_string().contains("padEnd"));
        assert_eq!(call("repeat", json!(["", 9.0e18])), Value::from(""));
    }

    #[test]
    fn prefix_and_suffix_checks() {
        assert_eq!(call("startsWith", json!(["abc", "a"])), Value::Bool(true));
        assert_eq!(call("startsWith", json!(["abc", "b", 1])), Value::Bool(true));
        assert_eq!(call("endsWith", json!(["abc", "c"])), Value::Bool(true));
        assert_eq!(call("endsWith", json!(["abc", "b", 2])), Value::Bool(true));
        assert_eq!(call("replace", json!(["a-b-c", "-", "+"])), Value::from("a+b-c"));
    }

    #[test]
    fn missing_string_argument_is_an_error() {
        let mut table = UtilityTable::new();
        register_string(&mut table);
        let err = table.call("toUpper", &[]).unwrap_err();
        assert!(err.to_string().contains("toUpper"));
    }
}
