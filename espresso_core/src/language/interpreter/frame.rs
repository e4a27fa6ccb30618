use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use super::value::{Closure, Value};

pub type SymbolTable = HashMap<String, Value>;

/// A symbol table chained to the scope it was created in.
#[derive(Debug, Default)]
pub struct Scope {
    table: RefCell<SymbolTable>,
    parent: Option<Rc<Scope>>,
}

impl Scope {
    pub fn new() -> Rc<Self> {
        Rc::new(Scope::default())
    }

    pub fn with_parent(parent: Rc<Scope>) -> Rc<Self> {
        Rc::new(Scope {
            table: RefCell::new(HashMap::new()),
            parent: Some(parent),
        })
    }

    pub fn define(&self, name: &str, value: Value) {
        self.table.borrow_mut().insert(name.to_string(), value);
    }

    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.table.borrow().get(name) {
            Some(value.clone())
        } else if let Some(parent) = &self.parent {
            parent.lookup(name)
        } else {
            None
        }
    }

    pub fn local_names(&self) -> Vec<String> {
        self.table.borrow().keys().cloned().collect()
    }

    /// Empties a finished call's scope when the only references left to it
    /// come from functions stored in its own table. Such a named function
    /// and its scope keep each other alive otherwise. Returns whether the
    /// bindings were dropped.
    pub fn release_cycles(self: &Rc<Self>) -> bool {
        {
            let table = self.table.borrow();
            let mut own: Vec<(&Rc<Closure>, usize)> = Vec::new();

            for value in table.values() {
                if let Value::Function(closure) = value {
                    if !Rc::ptr_eq(&closure.scope, self) {
                        continue;
                    }
                    match own.iter_mut().find(|(seen, _)| Rc::ptr_eq(seen, closure)) {
                        Some((_, count)) => *count += 1,
                        None => own.push((closure, 1)),
                    }
                }
            }

            // Every capture is one strong count on the scope, plus the caller's handle.
            let unreachable = !own.is_empty()
                && Rc::strong_count(self) == own.len() + 1
                && own.iter().all(|(closure, count)| Rc::strong_count(closure) == *count);
            if !unreachable {
                return false;
            }
        }

        let bindings = std::mem::take(&mut *self.table.borrow_mut());
        drop(bindings);
        true
    }
}

/// One activation: the scope bindings go to, the receiver and the call
/// details kept for backtraces.
#[derive(Debug)]
pub struct CallFrame {
    pub name: String,
    pub scope: Rc<Scope>,
    pub this: Option<Value>,
    pub args: Vec<Value>,
}

impl CallFrame {
    pub fn new(name: impl Into<String>, scope: Rc<Scope>, this: Option<Value>, args: Vec<Value>) -> Self {
        CallFrame {
            name: name.into(),
            scope,
            this,
            args,
        }
    }

    pub fn describe(&self) -> String {
        let args: Vec<String> = self.args.iter().map(Value::repr).collect();
        format!("{}({})", self.name, args.join(", "))
    }
}
