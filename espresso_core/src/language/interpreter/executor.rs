use std::rc::Rc;
use log::{debug, trace};
use crate::language::ast::{FunctionDef, Pattern};
use crate::language::error::Result;
use crate::runtime_error;
use super::{Flow, Interpreter, Unwound};
use super::frame::{CallFrame, Scope};
use super::value::{Closure, Object, Value};

/// Deeper call chains are a RuntimeError. The host stack grows on demand
/// (see `Interpreter::evaluate`), so this bounds memory, not stack size.
const MAX_CALL_DEPTH: usize = 1000;

/// Evaluated call arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    pub positional: Vec<Value>,
    pub named: Vec<(String, Value)>,
}

impl Arguments {
    pub fn from_positional(positional: Vec<Value>) -> Self {
        Arguments {
            positional,
            named: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    pub fn len(&self) -> usize {
        self.positional.len() + self.named.len()
    }

    /// The single positional index of a `[...]` subscript.
    pub fn into_index(mut self) -> Result<Value> {
        if self.positional.len() != 1 || !self.named.is_empty() {
            return runtime_error!(format!("A subscript takes exactly one index, got {}", self.len()));
        }
        match self.positional.pop() {
            Some(index) => Ok(index),
            None => runtime_error!("A subscript takes exactly one index"),
        }
    }
}

fn parameter_name(pattern: &Pattern) -> Option<&str> {
    match pattern {
        Pattern::Name(name) => Some(name),
        _ => None,
    }
}

impl Interpreter {
    pub(crate) fn call_value(
        &mut self,
        callee: &Value,
        this: Option<Value>,
        arguments: Arguments,
        name: &str,
    ) -> Result<Flow> {
        match callee {
            Value::Function(closure) => self.call_closure(Rc::clone(closure), this, arguments, name),
            Value::Native(native) => {
                if !arguments.named.is_empty() {
                    return runtime_error!(format!(
                        "Arity mismatch: native function {} does not take named arguments",
                        native.name
                    ));
                }
                trace!("Calling native {} with {} arguments", native.name, arguments.positional.len());
                Ok(Flow::Value((native.func)(this.as_ref(), &arguments.positional)?))
            }
            other => runtime_error!(format!("{} is not callable ({})", name, other.type_name())),
        }
    }

    fn call_closure(
        &mut self,
        closure: Rc<Closure>,
        this: Option<Value>,
        arguments: Arguments,
        name: &str,
    ) -> Result<Flow> {
        if self.frames.len() > MAX_CALL_DEPTH {
            return runtime_error!(format!("Maximum call depth of {} exceeded in {}", MAX_CALL_DEPTH, name));
        }

        let frame_name = closure.name.clone().unwrap_or_else(|| name.to_string());
        let scope = Scope::with_parent(Rc::clone(&closure.scope));

        debug!("Entering {} at depth {}", frame_name, self.frames.len());
        self.frames.push(CallFrame::new(frame_name, scope, this, arguments.positional.clone()));

        let outcome = match self.bind_parameters(&closure.def, arguments) {
            Ok(Ok(())) => self.evaluate(&closure.def.body),
            Ok(Err(flow)) => Ok(flow),
            Err(e) => Err(e),
        };

        if matches!(outcome, Err(_) | Ok(Flow::Fail(_))) && self.failure_trace.is_empty() {
            self.failure_trace = self.backtrace();
        }
        if let Some(frame) = self.frames.pop() {
            debug!("Leaving {}", frame.name);
            if frame.scope.release_cycles() {
                trace!("Released the scope of {}", frame.name);
            }
        }

        match outcome? {
            Flow::Value(value) | Flow::Return(value) => Ok(Flow::Value(value)),
            Flow::Fail(value) => Ok(Flow::Fail(value)),
            Flow::Break(_) => runtime_error!(format!("'break' escaped from function {}", name)),
            Flow::Continue(_) => runtime_error!(format!("'continue' escaped from function {}", name)),
        }
    }

    /// Binds arguments to parameters in the current (new) frame. Positional
    /// arguments go in order, named ones by parameter name, and defaults fill
    /// the rest.
    fn bind_parameters(&mut self, def: &FunctionDef, arguments: Arguments) -> Result<Unwound<()>> {
        let params = &def.params;
        let callee = def.name.as_deref().unwrap_or("<anonymous>");

        if arguments.positional.len() > params.len() {
            return runtime_error!(format!(
                "Arity mismatch: {} takes {} arguments, got {}",
                callee,
                params.len(),
                arguments.positional.len()
            ));
        }

        let mut supplied: Vec<Option<Value>> = arguments.positional.into_iter().map(Some).collect();
        supplied.resize(params.len(), None);

        for (key, value) in arguments.named {
            let index = match params.iter().position(|p| parameter_name(&p.pattern) == Some(key.as_str())) {
                Some(index) => index,
                None => {
                    return runtime_error!(format!("Arity mismatch: {} has no parameter named {}", callee, key));
                }
            };
            if supplied[index].is_some() {
                return runtime_error!(format!("Arity mismatch: {} got parameter {} twice", callee, key));
            }
            supplied[index] = Some(value);
        }

        for (param, value) in params.iter().zip(supplied) {
            let value = match (value, &param.default) {
                (Some(value), _) => value,
                (None, Some(default)) => settle_unwound!(self.evaluate(default)),
                (None, None) => {
                    return runtime_error!(format!(
                        "Arity mismatch: {} is missing an argument for {}",
                        callee, param.pattern
                    ));
                }
            };

            if let Err(flow) = self.bind_pattern(&param.pattern, value)? {
                return Ok(Err(flow));
            }
        }

        Ok(Ok(()))
    }

    /// `new P(args)`: a fresh object inheriting from `P`, initialised by the
    /// `new` method found along its prototype chain.
    pub(crate) fn construct(&mut self, prototype: Value, arguments: Arguments) -> Result<Flow> {
        let proto = match prototype {
            Value::Object(proto) => proto,
            other => {
                return runtime_error!(format!("'new' needs a prototype object, got {}", other.type_name()));
            }
        };

        let instance = Value::Object(Rc::new(Object::with_proto(Rc::clone(&proto))));

        match proto.get("new") {
            Some(constructor) => {
                settle!(self.call_value(&constructor, Some(instance.clone()), arguments, "new"));
            }
            None if !arguments.is_empty() => {
                return runtime_error!(format!(
                    "Arity mismatch: prototype has no 'new' method but {} arguments were given",
                    arguments.len()
                ));
            }
            None => {}
        }

        Ok(Flow::Value(instance))
    }
}
