use std::cmp::Ordering;
use crate::language::error::Result;
use crate::runtime_error;
use super::value::Value;

fn unsupported<T>(op: &str, left: &Value, right: &Value) -> Result<T> {
    runtime_error!(format!(
        "Unsupported operand types for '{}': {} and {}",
        op,
        left.type_name(),
        right.type_name()
    ))
}

fn to_int32(n: f64) -> i32 {
    if n.is_finite() {
        n.trunc() as i64 as i32
    } else {
        0
    }
}

fn numbers(op: &str, left: &Value, right: &Value) -> Result<(f64, f64)> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok((*a, *b)),
        _ => unsupported(op, left, right),
    }
}

/// `None` when either side is NaN, which makes every comparison false.
fn compare(op: &str, left: &Value, right: &Value) -> Result<Option<Ordering>> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(a.partial_cmp(b)),
        (Value::String(a), Value::String(b)) => Ok(Some(a.cmp(b))),
        _ => unsupported(op, left, right),
    }
}

fn contains(needle: &Value, haystack: &Value) -> Result<bool> {
    match haystack {
        Value::Object(object) => Ok(object.has(&needle.property_key()?)),
        Value::Array(items) => Ok(items.borrow().iter().any(|item| item == needle)),
        Value::String(text) => match needle {
            Value::String(part) => Ok(text.contains(part.as_ref())),
            other => runtime_error!(format!("Cannot search a string for a {}", other.type_name())),
        },
        other => runtime_error!(format!("'in' needs an object, array or string, got {}", other.type_name())),
    }
}

/// Applies a binary operator to two evaluated operands. The short-circuit
/// operators and `|>` never get here.
pub fn binary(op: &str, left: &Value, right: &Value) -> Result<Value> {
    match op {
        "+" => match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Value::String(a), Value::String(b)) => Ok(Value::string(format!("{}{}", a, b))),
            (Value::Array(a), Value::Array(b)) => {
                let mut items = a.borrow().clone();
                items.extend(b.borrow().iter().cloned());
                Ok(Value::array(items))
            }
            _ => unsupported(op, left, right),
        },
        "-" => numbers(op, left, right).map(|(a, b)| Value::Number(a - b)),
        "*" => numbers(op, left, right).map(|(a, b)| Value::Number(a * b)),
        "**" => numbers(op, left, right).map(|(a, b)| Value::Number(a.powf(b))),
        "/" | "%" | "//" => {
            let (a, b) = numbers(op, left, right)?;
            if b == 0.0 {
                return runtime_error!(format!("Division by zero in '{}'", op));
            }
            Ok(Value::Number(match op {
                "/" => a / b,
                "%" => a % b,
                _ => (a / b).floor(),
            }))
        }
        "<" => compare(op, left, right).map(|o| Value::Bool(o == Some(Ordering::Less))),
        "<=" => compare(op, left, right).map(|o| Value::Bool(matches!(o, Some(Ordering::Less | Ordering::Equal)))),
        ">" => compare(op, left, right).map(|o| Value::Bool(o == Some(Ordering::Greater))),
        ">=" => compare(op, left, right).map(|o| Value::Bool(matches!(o, Some(Ordering::Greater | Ordering::Equal)))),
        "==" | "is" => Ok(Value::Bool(left == right)),
        "!=" => Ok(Value::Bool(left != right)),
        "in" => contains(left, right).map(Value::Bool),
        "|" | "^" | "&" | "<<" | ">>" | ">>>" => {
            let (a, b) = numbers(op, left, right)?;
            let (a, b) = (to_int32(a), to_int32(b));
            let shift = (b as u32) & 31;
            let result = match op {
                "|" => (a | b) as f64,
                "^" => (a ^ b) as f64,
                "&" => (a & b) as f64,
                "<<" => a.wrapping_shl(shift) as f64,
                ">>" => a.wrapping_shr(shift) as f64,
                _ => ((a as u32) >> shift) as f64,
            };
            Ok(Value::Number(result))
        }
        _ => runtime_error!(format!("Unknown binary operator '{}'", op)),
    }
}

pub fn unary(op: &str, operand: &Value) -> Result<Value> {
    match (op, operand) {
        ("!" | "not", value) => Ok(Value::Bool(!value.is_truthy())),
        ("-", Value::Number(n)) => Ok(Value::Number(-n)),
        ("+", Value::Number(n)) => Ok(Value::Number(*n)),
        ("~", Value::Number(n)) => Ok(Value::Number(!to_int32(*n) as f64)),
        (_, value) => runtime_error!(format!("Unsupported operand type for unary '{}': {}", op, value.type_name())),
    }
}
