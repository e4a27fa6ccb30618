use crate::language::error::Result;
use crate::language::interpreter::value::{Object, Value};
use crate::runtime_error;
use super::{expect_arity, Native};

/// `object(a, b)` is `{0: a, 1: b}`; `object()` is the empty object.
fn object(_this: Option<&Value>, args: &[Value]) -> Result<Value> {
    let object = Object::new();
    for (index, value) in args.iter().enumerate() {
        object.set(index.to_string(), value.clone());
    }
    Ok(Value::object(object))
}

fn array(_this: Option<&Value>, args: &[Value]) -> Result<Value> {
    Ok(Value::array(args.to_vec()))
}

fn len(_this: Option<&Value>, args: &[Value]) -> Result<Value> {
    expect_arity("len", args, 1)?;
    let length = match &args[0] {
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.borrow().len(),
        Value::Object(object) => object.len(),
        other => return runtime_error!(format!("len() of a {} is undefined", other.type_name())),
    };
    Ok(Value::Number(length as f64))
}

/// Own field names of an object, or the indices of an array.
fn keys(_this: Option<&Value>, args: &[Value]) -> Result<Value> {
    expect_arity("keys", args, 1)?;
    let keys = match &args[0] {
        Value::Object(object) => object.keys().into_iter().map(Value::string).collect(),
        Value::Array(items) => (0..items.borrow().len()).map(|i| Value::Number(i as f64)).collect(),
        other => return runtime_error!(format!("keys() of a {} is undefined", other.type_name())),
    };
    Ok(Value::array(keys))
}

fn type_of(_this: Option<&Value>, args: &[Value]) -> Result<Value> {
    expect_arity("type", args, 1)?;
    Ok(Value::string(args[0].type_name()))
}

pub fn natives() -> Vec<Native> {
    vec![
        ("object", Value::native("object", object)),
        ("array", Value::native("array", array)),
        ("len", Value::native("len", len)),
        ("keys", Value::native("keys", keys)),
        ("type", Value::native("type", type_of)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_keys_positional_arguments() {
        let value = object(None, &[Value::string("a"), Value::Nil]).unwrap();
        assert_eq!(value.to_string(), "{0: \"a\", 1: nil}");
        assert_eq!(object(None, &[]).unwrap().to_string(), "{}");
    }

    #[test]
    fn lengths() {
        assert_eq!(len(None, &[Value::string("héllo")]).unwrap(), Value::Number(5.0));
        assert_eq!(len(None, &[Value::array(vec![Value::Nil; 3])]).unwrap(), Value::Number(3.0));
        assert!(len(None, &[Value::Number(1.0)]).is_err());
        assert!(len(None, &[]).is_err());
    }

    #[test]
    fn keys_in_insertion_order() {
        let object = Object::new();
        object.set("b", Value::Nil);
        object.set("a", Value::Nil);
        let keys = keys(None, &[Value::object(object)]).unwrap();
        assert_eq!(keys.to_string(), "[\"b\", \"a\"]");
    }

    #[test]
    fn type_names() {
        assert_eq!(type_of(None, &[Value::Nil]).unwrap(), Value::string("nil"));
        assert_eq!(type_of(None, &[array(None, &[]).unwrap()]).unwrap(), Value::string("array"));
    }
}
