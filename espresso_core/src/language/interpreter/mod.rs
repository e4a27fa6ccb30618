/// Unwraps a `Result<Flow>` to its value, returning any other flow as is.
macro_rules! settle {
    ($flow:expr) => {
        match $flow? {
            $crate::language::interpreter::Flow::Value(value) => value,
            other => return Ok(other),
        }
    };
}

/// `settle!` for helpers returning `Result<Unwound<T>>`.
macro_rules! settle_unwound {
    ($flow:expr) => {
        match $flow? {
            $crate::language::interpreter::Flow::Value(value) => value,
            other => return Ok(Err(other)),
        }
    };
}

/// Unwraps a `Result<Unwound<T>>`, returning the interrupting flow.
macro_rules! unwind {
    ($result:expr) => {
        match $result? {
            Ok(value) => value,
            Err(flow) => return Ok(flow),
        }
    };
}

mod frame;
mod evaluator;
mod executor;
mod operations;
pub mod builtin;
pub mod value;

use std::rc::Rc;
use log::debug;
use crate::language::ast::Expr;
use crate::language::error::{Error, Result};
use crate::runtime_error;

pub use executor::Arguments;
pub use frame::{CallFrame, Scope, SymbolTable};
pub use value::{Closure, NativeFunction, Object, Value};

/// Outcome of evaluating one expression. Anything but `Value` unwinds
/// through the enclosing constructs until something consumes it.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Value(Value),
    Return(Value),
    Fail(Value),
    Break(Option<String>),
    Continue(Option<String>),
}

/// A computation that either produced a `T` or was interrupted by a flow.
pub(crate) type Unwound<T> = std::result::Result<T, Flow>;

#[derive(Debug)]
pub struct Interpreter {
    frames: Vec<CallFrame>,
    globals: Rc<Scope>,
    last: Value,
    failure_trace: Vec<String>,
}

impl Interpreter {
    pub fn new() -> Self {
        let globals = Scope::new();
        builtin::install(&globals);

        Interpreter {
            frames: vec![CallFrame::new("<global>", Rc::clone(&globals), None, Vec::new())],
            globals,
            last: Value::Nil,
            failure_trace: Vec::new(),
        }
    }

    /// Evaluates a parsed script. Global bindings persist between calls.
    pub fn exec(&mut self, program: &Expr) -> Result<Value> {
        self.failure_trace.clear();

        let outcome = self.evaluate(program);
        if matches!(outcome, Err(_) | Ok(Flow::Fail(_))) && self.failure_trace.is_empty() {
            self.failure_trace = self.backtrace();
        }

        let value = match outcome {
            Ok(Flow::Value(value)) | Ok(Flow::Return(value)) => value,
            Ok(Flow::Fail(value)) => {
                debug!("Script failed with {}", value.repr());
                return Err(Error::failed(value));
            }
            Ok(Flow::Break(_)) => return runtime_error!("'break' outside of a loop"),
            Ok(Flow::Continue(_)) => return runtime_error!("'continue' outside of a loop"),
            Err(e) => {
                debug!("Script raised {}", e);
                return Err(e);
            }
        };

        self.last = value.clone();
        Ok(value)
    }

    /// Parses and evaluates `source` against this interpreter.
    pub fn run(&mut self, source: &str) -> Result<Value> {
        let program = crate::language::parser::parse(source)?;
        self.exec(&program)
    }

    pub(crate) fn scope(&self) -> Rc<Scope> {
        self.frames
            .last()
            .map_or_else(|| Rc::clone(&self.globals), |frame| Rc::clone(&frame.scope))
    }

    pub(crate) fn this(&self) -> Value {
        self.frames
            .last()
            .and_then(|frame| frame.this.clone())
            .unwrap_or(Value::Nil)
    }

    pub fn deref(&self, name: &str) -> Result<Value> {
        match self.scope().lookup(name).or_else(|| self.globals.lookup(name)) {
            Some(value) => Ok(value),
            None => runtime_error!(format!("{} is not defined", name)),
        }
    }

    /// Writes to the top frame, or to the global table while only the global
    /// frame is active. Enclosing and global bindings are never written from
    /// inside a call.
    pub fn assign(&self, name: &str, value: Value) {
        if self.frames.len() > 1 {
            self.scope().define(name, value);
        } else {
            self.globals.define(name, value);
        }
    }

    pub fn declare(&self, name: &str, value: Value) {
        self.scope().define(name, value);
    }

    pub fn global(&self, name: &str) -> Option<Value> {
        self.globals.lookup(name)
    }

    pub fn define_native(
        &mut self,
        name: &str,
        func: impl Fn(Option<&Value>, &[Value]) -> Result<Value> + 'static,
    ) {
        self.globals.define(name, Value::native(name, func));
    }

    /// Names bound in the global table, sorted.
    pub fn globals(&self) -> Vec<String> {
        let mut names = self.globals.local_names();
        names.sort();
        names
    }

    /// Active frames, innermost last.
    pub fn backtrace(&self) -> Vec<String> {
        self.frames.iter().map(CallFrame::describe).collect()
    }

    /// The frames that were active when the last `exec` failed.
    pub fn failure_backtrace(&self) -> &[String] {
        &self.failure_trace
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Drops every frame but the global one.
    pub fn reset(&mut self) {
        debug!("Resetting {} frames", self.frames.len().saturating_sub(1));
        self.frames.truncate(1);
        self.failure_trace.clear();
    }

    pub fn last_value(&self) -> &Value {
        &self.last
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new()
    }
}
