use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use derive_more::Debug;
use indexmap::IndexMap;
use crate::language::ast::FunctionDef;
use crate::language::error::Result;
use crate::runtime_error;
use super::frame::Scope;

/// Nested containers deeper than this print as `[...]` / `{...}`.
const DISPLAY_DEPTH: usize = 4;

pub type NativeFn = dyn Fn(Option<&Value>, &[Value]) -> Result<Value>;

#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
    Array(Rc<RefCell<Vec<Value>>>),
    Object(Rc<Object>),
    Function(Rc<Closure>),
    Native(Rc<NativeFunction>),
}

/// A user-defined function together with the scope it was created in.
#[derive(Debug)]
pub struct Closure {
    pub name: Option<String>,
    #[debug(skip)]
    pub def: Rc<FunctionDef>,
    #[debug(skip)]
    pub scope: Rc<Scope>,
}

#[derive(Debug)]
pub struct NativeFunction {
    pub name: String,
    #[debug(skip)]
    pub func: Box<NativeFn>,
}

/// Ordered fields plus an optional prototype consulted when a lookup misses.
/// The prototype link is fixed at construction.
#[derive(Default)]
pub struct Object {
    fields: RefCell<IndexMap<String, Value>>,
    proto: Option<Rc<Object>>,
}

impl Object {
    pub fn new() -> Self {
        Object::default()
    }

    pub fn with_proto(proto: Rc<Object>) -> Self {
        Object {
            fields: RefCell::new(IndexMap::new()),
            proto: Some(proto),
        }
    }

    pub fn from_fields(fields: IndexMap<String, Value>) -> Self {
        Object {
            fields: RefCell::new(fields),
            proto: None,
        }
    }

    /// Looks the key up on this object, then along the prototype chain.
    pub fn get(&self, key: &str) -> Option<Value> {
        if let Some(value) = self.fields.borrow().get(key) {
            return Some(value.clone());
        }
        self.proto.as_ref().and_then(|proto| proto.get(key))
    }

    pub fn has(&self, key: &str) -> bool {
        self.fields.borrow().contains_key(key) || self.proto.as_ref().is_some_and(|proto| proto.has(key))
    }

    /// Writes an own field; the prototype is never touched.
    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.fields.borrow_mut().insert(key.into(), value);
    }

    pub fn keys(&self) -> Vec<String> {
        self.fields.borrow().keys().cloned().collect()
    }

    pub fn entries(&self) -> Vec<(String, Value)> {
        self.fields
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.fields.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("keys", &self.keys())
            .field("has_proto", &self.proto.is_some())
            .finish()
    }
}

impl Value {
    pub fn string(s: impl AsRef<str>) -> Value {
        Value::String(Rc::from(s.as_ref()))
    }

    pub fn array(items: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn object(object: Object) -> Value {
        Value::Object(Rc::new(object))
    }

    pub fn native(name: impl Into<String>, func: impl Fn(Option<&Value>, &[Value]) -> Result<Value> + 'static) -> Value {
        Value::Native(Rc::new(NativeFunction {
            name: name.into(),
            func: Box::new(func),
        }))
    }

    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_) | Value::Native(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) | Value::Native(_) => "function",
        }
    }

    /// The string an object field is stored under.
    pub fn property_key(&self) -> Result<String> {
        match self {
            Value::String(s) => Ok(s.to_string()),
            Value::Number(_) | Value::Bool(_) => Ok(self.to_string()),
            other => runtime_error!(format!("A {} cannot be used as a property key", other.type_name())),
        }
    }

    /// A non-negative integral number usable as an array index.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Value::Number(n) if *n >= 0.0 && n.fract() == 0.0 => Some(*n as usize),
            _ => None,
        }
    }

    /// Like `Display`, but strings are quoted.
    pub fn repr(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = write_value(&mut out, self, 0, true);
        out
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn write_value(out: &mut impl fmt::Write, value: &Value, depth: usize, quoted: bool) -> fmt::Result {
    match value {
        Value::Nil => write!(out, "nil"),
        Value::Bool(b) => write!(out, "{}", b),
        Value::Number(n) => write!(out, "{}", format_number(*n)),
        Value::String(s) if quoted => write!(out, "\"{}\"", s.escape_default()),
        Value::String(s) => write!(out, "{}", s),
        Value::Array(items) => {
            if depth >= DISPLAY_DEPTH {
                return write!(out, "[...]");
            }
            write!(out, "[")?;
            for (i, item) in items.borrow().iter().enumerate() {
                if i > 0 {
                    write!(out, ", ")?;
                }
                write_value(out, item, depth + 1, true)?;
            }
            write!(out, "]")
        }
        Value::Object(object) => {
            if depth >= DISPLAY_DEPTH {
                return write!(out, "{{...}}");
            }
            write!(out, "{{")?;
            for (i, (key, field)) in object.entries().iter().enumerate() {
                if i > 0 {
                    write!(out, ", ")?;
                }
                write!(out, "{}: ", key)?;
                write_value(out, field, depth + 1, true)?;
            }
            write!(out, "}}")
        }
        Value::Function(closure) => match &closure.name {
            Some(name) => write!(out, "<function {}>", name),
            None => write!(out, "<function>"),
        },
        Value::Native(native) => write!(out, "<native {}>", native.name),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self, 0, false)
    }
}

/// Strict equality: primitives by value, everything else by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_nil_and_false_are_falsy() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Number(0.0).is_truthy());
        assert!(Value::string("").is_truthy());
        assert!(Value::array(vec![]).is_truthy());
    }

    #[test]
    fn integral_numbers_print_without_fraction() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(-0.5).to_string(), "-0.5");
        assert_eq!(Value::Number(3.14).to_string(), "3.14");
    }

    #[test]
    fn display_and_repr() {
        let object = Object::new();
        object.set("a", Value::Number(1.0));
        object.set("b", Value::array(vec![Value::string("x"), Value::Nil]));
        let value = Value::object(object);

        assert_eq!(value.to_string(), "{a: 1, b: [\"x\", nil]}");
        assert_eq!(Value::string("hi").to_string(), "hi");
        assert_eq!(Value::string("hi").repr(), "\"hi\"");
    }

    #[test]
    fn self_referencing_array_display_terminates() {
        let array = Value::array(vec![]);
        if let Value::Array(items) = &array {
            items.borrow_mut().push(array.clone());
        }
        assert!(array.to_string().contains("[...]"));
    }

    #[test]
    fn strict_equality() {
        let a = Value::array(vec![Value::Number(1.0)]);
        let b = Value::array(vec![Value::Number(1.0)]);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(Value::string("x"), Value::string("x"));
        assert_ne!(Value::Number(1.0), Value::string("1"));
    }

    #[test]
    fn prototype_lookup() {
        let proto = Rc::new(Object::new());
        proto.set("greet", Value::string("hello"));

        let child = Object::with_proto(Rc::clone(&proto));
        assert_eq!(child.get("greet"), Some(Value::string("hello")));
        assert!(child.has("greet"));
        assert!(child.keys().is_empty());

        child.set("greet", Value::string("hi"));
        assert_eq!(child.get("greet"), Some(Value::string("hi")));
        assert_eq!(proto.get("greet"), Some(Value::string("hello")));
    }

    #[test]
    fn property_keys() {
        assert_eq!(Value::Number(0.0).property_key().unwrap(), "0");
        assert_eq!(Value::string("k").property_key().unwrap(), "k");
        assert!(Value::Nil.property_key().is_err());
    }
}
