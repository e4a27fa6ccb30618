use crate::language::error::Result;
use crate::language::interpreter::value::Value;
use super::{expect_arity, Native};

/// Strings are tested as they are and numbers by their display form. Empty
/// text and every other value test false.
fn classify(name: &'static str, test: fn(char) -> bool) -> Value {
    Value::native(name, move |_this, args| {
        expect_arity(name, args, 1)?;
        let text = match &args[0] {
            Value::String(s) => s.to_string(),
            Value::Number(_) => args[0].to_string(),
            _ => return Ok(Value::Bool(false)),
        };
        Ok(Value::Bool(!text.is_empty() && text.chars().all(test)))
    })
}

fn str(_this: Option<&Value>, args: &[Value]) -> Result<Value> {
    expect_arity("str", args, 1)?;
    Ok(match &args[0] {
        Value::String(_) => args[0].clone(),
        other => Value::string(other.to_string()),
    })
}

pub fn natives() -> Vec<Native> {
    vec![
        ("g_isAlpha", classify("g_isAlpha", |c| c.is_ascii_alphabetic())),
        ("g_isDigit", classify("g_isDigit", |c| c.is_ascii_digit())),
        ("g_isSpace", classify("g_isSpace", char::is_whitespace)),
        ("str", Value::native("str", str)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test(name: &str, arg: Value) -> Value {
        let (_, native) = natives().into_iter().find(|(n, _)| *n == name).unwrap();
        match native {
            Value::Native(native) => (native.func)(None, &[arg]).unwrap(),
            _ => unreachable!(),
        }
    }

    #[test]
    fn character_classes() {
        assert_eq!(test("g_isAlpha", Value::string("AbC")), Value::Bool(true));
        assert_eq!(test("g_isAlpha", Value::string("ab1")), Value::Bool(false));
        assert_eq!(test("g_isAlpha", Value::string("")), Value::Bool(false));
        assert_eq!(test("g_isDigit", Value::string("0123")), Value::Bool(true));
        assert_eq!(test("g_isDigit", Value::Number(42.0)), Value::Bool(true));
        assert_eq!(test("g_isDigit", Value::Number(4.5)), Value::Bool(false));
        assert_eq!(test("g_isSpace", Value::string(" \t\n")), Value::Bool(true));
        assert_eq!(test("g_isSpace", Value::Nil), Value::Bool(false));
    }

    #[test]
    fn str_uses_display_form() {
        assert_eq!(test("str", Value::Number(2.0)), Value::string("2"));
        assert_eq!(test("str", Value::Nil), Value::string("nil"));
        assert_eq!(test("str", Value::string("s")), Value::string("s"));
    }
}
