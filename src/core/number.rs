use anyhow::{anyhow, Result};

use super::{array_arg, defined, int_arg, number_arg};
use crate::registry::UtilityTable;
use crate::value::Value;

pub fn register_number(table: &mut UtilityTable) {
    table.register("add", add);
    table.register("subtract", subtract);
    table.register("multiply", multiply);
    table.register("divide", divide);
    table.register("sum", sum);
    table.register("max", max);
    table.register("min", min);
    table.register("round", round);
    table.register("floor", floor);
    table.register("ceil", ceil);
}

fn binary(args: &[Value], name: &str, op: fn(f64, f64) -> f64) -> Result<Option<Value>> {
    let left = number_arg(args, 0, name)?;
    let right = number_arg(args, 1, name)?;
    defined(Value::from_f64(op(left, right)))
}

fn add(args: &[Value]) -> Result<Option<Value>> {
    binary(args, "add", |a, b| a + b)
}

fn subtract(args: &[Value]) -> Result<Option<Value>> {
    binary(args, "subtract", |a, b| a - b)
}

fn multiply(args: &[Value]) -> Result<Option<Value>> {
    binary(args, "multiply", |a, b| a * b)
}

fn divide(args: &[Value]) -> Result<Option<Value>> {
    binary(args, "divide", |a, b| a / b)
}

fn numbers(args: &[Value], name: &str) -> Result<Vec<f64>> {
    array_arg(args, 0, name)?
        .iter()
        .map(|item| {
            item.as_f64()
                .ok_or_else(|| anyhow!("{name}: array items must be numbers, got {}", item.kind()))
        })
        .collect()
}

fn sum(args: &[Value]) -> Result<Option<Value>> {
    let total: f64 = numbers(args, "sum")?.into_iter().sum();
    defined(Value::from_f64(total))
}

/// Undefined for an empty array.
fn max(args: &[Value]) -> Result<Option<Value>> {
    Ok(numbers(args, "max")?
        .into_iter()
        .reduce(f64::max)
        .map(Value::from_f64))
}

fn min(args: &[Value]) -> Result<Option<Value>> {
    Ok(numbers(args, "min")?
        .into_iter()
        .reduce(f64::min)
        .map(Value::from_f64))
}

/// Rounds at `precision` decimal places (negative precision rounds to tens,
/// hundreds, ...). Halves round up, as in JavaScript's `Math.round`. The
/// decimal shift goes through the exponent of the shortest decimal form, so
/// `round(1.005, 2)` is `1.01` rather than `1.00499...`-based `1`.
fn round_with(args: &[Value], name: &str, op: fn(f64) -> f64) -> Result<Option<Value>> {
    let value = number_arg(args, 0, name)?;
    let precision = int_arg(args, 1, name, 0)?.clamp(-292, 292) as i32;
    if precision == 0 || !value.is_finite() {
        return defined(Value::from_f64(op(value)));
    }
    let shifted = op(shift_exponent(value, precision, name)?);
    if !shifted.is_finite() {
        return defined(Value::from_f64(value));
    }
    defined(Value::from_f64(shift_exponent(shifted, -precision, name)?))
}

fn shift_exponent(value: f64, exponent: i32, name: &str) -> Result<f64> {
    format!("{value}e{exponent}")
        .parse::<f64>()
        .map_err(|err| anyhow!("{name}: cannot shift {value} by 1e{exponent}: {err}"))
}

fn js_round(value: f64) -> f64 {
    (value + 0.5).floor()
}

fn round(args: &[Value]) -> Result<Option<Value>> {
    round_with(args, "round", js_round)
}

fn floor(args: &[Value]) -> Result<Option<Value>> {
    round_with(args, "floor", f64::floor)
}

fn ceil(args: &[Value]) -> Result<Option<Value>> {
    round_with(args, "ceil", f64::ceil)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(name: &str, raw: serde_json::Value) -> Option<serde_json::Value> {
        let mut table = UtilityTable::new();
        register_number(&mut table);
        let Value::Array(args) = Value::from(raw) else {
            panic!("test arguments must be an array");
        };
        table.call(name, &args).unwrap().map(|value| value.to_json())
    }

    #[test]
    fn arithmetic_keeps_integers() {
        assert_eq!(call("add", json!([6, 4])), Some(json!(10)));
        assert_eq!(call("subtract", json!([6, 4])), Some(json!(2)));
        assert_eq!(call("multiply", json!([6, 4])), Some(json!(24)));
        assert_eq!(call("divide", json!([6, 4])), Some(json!(1.5)));
        assert_eq!(call("add", json!([0.5, 0.25])), Some(json!(0.75)));
    }

    #[test]
    fn division_by_zero_is_null() {
        assert_eq!(call("divide", json!([1, 0])), Some(json!(null)));
    }

    #[test]
    fn aggregates() {
        assert_eq!(call("sum", json!([[1, 2, 3.5]])), Some(json!(6.5)));
        assert_eq!(call("max", json!([[4, 2, 8, 6]])), Some(json!(8)));
        assert_eq!(call("min", json!([[4, 2, 8, 6]])), Some(json!(2)));
        assert_eq!(call("max", json!([[]])), None);
    }

    #[test]
    fn rounding_with_precision() {
        assert_eq!(call("round", json!([4.006])), Some(json!(4)));
        assert_eq!(call("round", json!([4.006, 2])), Some(json!(4.01)));
        assert_eq!(call("round", json!([4060, -2])), Some(json!(4100)));
        assert_eq!(call("round", json!([-2.5])), Some(json!(-2)));
        assert_eq!(call("floor", json!([0.046, 2])), Some(json!(0.04)));
        assert_eq!(call("ceil", json!([6.004, 2])), Some(json!(6.01)));
    }

    #[test]
    fn rounding_shifts_through_decimal_form() {
        assert_eq!(call("round", json!([1.005, 2])), Some(json!(1.01)));
        assert_eq!(call("round", json!([1.255, 2])), Some(json!(1.26)));
        assert_eq!(call("floor", json!([4.35, 2])), Some(json!(4.35)));
        assert_eq!(call("ceil", json!([1.1, 1])), Some(json!(1.1)));
        assert_eq!(call("round", json!([1.5e300, 100])), Some(json!(1.5e300)));
    }

    #[test]
    fn non_numbers_are_rejected() {
        let mut table = UtilityTable::new();
        register_number(&mut table);
        assert!(table.call("add", &[Value::from("6"), Value::from("4")]).is_err());
        assert!(table.call("sum", &[Value::from(json!(["1"]))]).is_err());
    }
}
