use std::rc::Rc;
use indexmap::IndexMap;
use log::trace;
use crate::language::ast::{Binding, CallKind, Case, Entry, Expr, IfClause, Literal, Pattern, PatternKey};
use crate::language::error::Result;
use crate::runtime_error;
use super::{Flow, Interpreter, Unwound};
use super::executor::Arguments;
use super::frame::CallFrame;
use super::operations;
use super::value::{Closure, Object, Value};

/// Remaining stack below which `evaluate` switches to a fresh segment.
const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

/// What a loop does after one pass over its body.
enum Pass {
    Next,
    Stop,
    Unwind(Flow),
}

/// An unlabelled jump targets the innermost loop; a labelled one only the
/// loop carrying that label.
fn targets(jump: &Option<String>, label: &Option<String>) -> bool {
    jump.is_none() || jump == label
}

fn pass(flow: Flow, label: &Option<String>, last: &mut Value) -> Pass {
    match flow {
        Flow::Value(value) => {
            *last = value;
            Pass::Next
        }
        Flow::Break(jump) if targets(&jump, label) => Pass::Stop,
        Flow::Continue(jump) if targets(&jump, label) => Pass::Next,
        other => Pass::Unwind(other),
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Nil => Value::Nil,
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Number(n) => Value::Number(*n),
        Literal::String(s) => Value::string(s),
    }
}

/// Name shown in backtraces for a call through `callee`.
fn callee_name(callee: &Expr) -> String {
    match callee {
        Expr::Identifier(name) => name.clone(),
        Expr::Access { key, .. } => match key.as_ref() {
            Expr::Identifier(name) => name.clone(),
            _ => "<member>".to_string(),
        },
        _ => "<anonymous>".to_string(),
    }
}

pub(crate) fn get_member(target: &Value, key: &Value) -> Result<Value> {
    match target {
        Value::Object(object) => Ok(object.get(&key.property_key()?).unwrap_or(Value::Nil)),
        Value::Array(items) => Ok(key
            .as_index()
            .and_then(|index| items.borrow().get(index).cloned())
            .unwrap_or(Value::Nil)),
        Value::String(text) => Ok(key
            .as_index()
            .and_then(|index| text.chars().nth(index))
            .map(|ch| Value::string(ch.to_string()))
            .unwrap_or(Value::Nil)),
        other => runtime_error!(format!("Cannot read property {} of {}", key.repr(), other.type_name())),
    }
}

pub(crate) fn set_member(target: &Value, key: &Value, value: Value) -> Result<()> {
    match target {
        Value::Object(object) => {
            object.set(key.property_key()?, value);
            Ok(())
        }
        Value::Array(items) => {
            let index = match key.as_index() {
                Some(index) => index,
                None => return runtime_error!(format!("Array index must be a non-negative integer, got {}", key.repr())),
            };
            let mut items = items.borrow_mut();
            if index < items.len() {
                items[index] = value;
            } else if index == items.len() {
                items.push(value);
            } else {
                return runtime_error!(format!("Array index {} out of range (length {})", index, items.len()));
            }
            Ok(())
        }
        other => runtime_error!(format!("Cannot set property {} of {}", key.repr(), other.type_name())),
    }
}

/// What a for-in loop visits. Numbers count up lazily, everything else is
/// snapshotted when the loop starts.
enum Items {
    Values(std::vec::IntoIter<Value>),
    Range(std::ops::Range<u64>),
}

impl Iterator for Items {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        match self {
            Items::Values(values) => values.next(),
            Items::Range(range) => range.next().map(|i| Value::Number(i as f64)),
        }
    }
}

fn iteration_items(collection: &Value) -> Result<Items> {
    let values: Vec<Value> = match collection {
        Value::Array(items) => items.borrow().clone(),
        Value::Object(object) => object.keys().into_iter().map(Value::string).collect(),
        Value::String(text) => text.chars().map(|ch| Value::string(ch.to_string())).collect(),
        Value::Number(n) => return Ok(Items::Range(0..n.max(0.0) as u64)),
        other => return runtime_error!(format!("Cannot iterate over {}", other.type_name())),
    };
    Ok(Items::Values(values.into_iter()))
}

impl Interpreter {
    /// Every nested evaluation passes through here, so the host stack is
    /// extended before it runs low.
    pub(crate) fn evaluate(&mut self, expr: &Expr) -> Result<Flow> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.evaluate_inner(expr))
    }

    fn evaluate_inner(&mut self, expr: &Expr) -> Result<Flow> {
        trace!("Evaluating {}", expr);

        match expr {
            Expr::Identifier(name) => Ok(Flow::Value(self.deref(name)?)),
            Expr::Literal(literal) => Ok(Flow::Value(literal_value(literal))),
            Expr::This => Ok(Flow::Value(self.this())),

            Expr::Unary { op, operand } => self.evaluate_unary(op, operand),
            Expr::Binary { op, left, right } => self.evaluate_binary(op, left, right),
            Expr::Access { object, key } => {
                let target = settle!(self.evaluate(object));
                let key = settle!(self.evaluate_key(key));
                Ok(Flow::Value(get_member(&target, &key)?))
            }
            Expr::IdentAssign { name, value } => {
                let value = settle!(self.evaluate(value));
                self.assign(name, value.clone());
                Ok(Flow::Value(value))
            }
            Expr::AccessAssign { object, key, value } => {
                let target = settle!(self.evaluate(object));
                let key = settle!(self.evaluate_key(key));
                let value = settle!(self.evaluate(value));
                set_member(&target, &key, value.clone())?;
                Ok(Flow::Value(value))
            }
            Expr::CallAssign { kind, callee, args, value } => {
                if *kind != CallKind::Bracket {
                    return runtime_error!(format!("Assignment to a '{}' call is not implemented", kind.open()));
                }
                let target = settle!(self.evaluate(callee));
                let key = unwind!(self.evaluate_arguments(args)).into_index()?;
                let value = settle!(self.evaluate(value));
                set_member(&target, &key, value.clone())?;
                Ok(Flow::Value(value))
            }

            Expr::Call { kind, callee, args } => self.evaluate_call(*kind, callee, args),
            Expr::MethodCall { receiver, key, args } => {
                let receiver = settle!(self.evaluate(receiver));
                let key = settle!(self.evaluate_key(key));
                let method = get_member(&receiver, &key)?;
                let arguments = unwind!(self.evaluate_arguments(args));
                self.call_value(&method, Some(receiver), arguments, &key.to_string())
            }
            Expr::New { prototype, args } => {
                let prototype = settle!(self.evaluate(prototype));
                let arguments = unwind!(self.evaluate_arguments(args));
                self.construct(prototype, arguments)
            }

            Expr::Object(entries) => self.evaluate_object(entries),
            Expr::Array(elements) => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    items.push(settle!(self.evaluate(element)));
                }
                Ok(Flow::Value(Value::array(items)))
            }

            Expr::If { clauses, otherwise } => self.evaluate_if(clauses, otherwise),
            Expr::While { label, test, body, otherwise } => self.evaluate_while(label, test, body, otherwise),
            Expr::For { label, head, body, otherwise } => self.evaluate_for(label, head, body, otherwise),
            Expr::Do { body, while_loop } => match while_loop.as_deref() {
                Some(Expr::While { label, test, otherwise, .. }) => self.evaluate_do_while(label, test, body, otherwise),
                Some(other) => {
                    settle!(self.evaluate(body));
                    self.evaluate(other)
                }
                None => self.evaluate(body),
            },
            Expr::Switch { value, cases } => self.evaluate_switch(value, cases),
            Expr::With { subject, body, otherwise } => self.evaluate_with(subject, body, otherwise),
            Expr::Try { .. } => runtime_error!("'try' is not supported by the interpreter"),

            Expr::VariableDeclaration { bindings, .. } => self.evaluate_declaration(bindings),
            Expr::Function(def) => {
                let closure = Value::Function(Rc::new(Closure {
                    name: def.name.clone(),
                    def: Rc::clone(def),
                    scope: self.scope(),
                }));
                if let Some(name) = &def.name {
                    self.declare(name, closure.clone());
                }
                Ok(Flow::Value(closure))
            }
            Expr::Prototype { name, body } => {
                let prototype = settle!(self.evaluate(body));
                if !matches!(prototype, Value::Object(_)) {
                    return runtime_error!(format!(
                        "A prototype body must evaluate to an object, got {}",
                        prototype.type_name()
                    ));
                }
                if let Some(name) = name {
                    self.declare(name, prototype.clone());
                }
                Ok(Flow::Value(prototype))
            }

            Expr::Return(argument) => {
                let value = match argument {
                    Some(argument) => settle!(self.evaluate(argument)),
                    None => Value::Nil,
                };
                Ok(Flow::Return(value))
            }
            Expr::Fail(argument) => Ok(Flow::Fail(settle!(self.evaluate(argument)))),
            Expr::Break(label) => Ok(Flow::Break(label.clone())),
            Expr::Continue(label) => Ok(Flow::Continue(label.clone())),
            Expr::Yield { .. } => runtime_error!("'yield' is not supported: generators are not implemented"),

            Expr::Import(_) => runtime_error!("'import' is not supported: there is no module loader"),
            Expr::Export { value, .. } => self.evaluate(value),
            Expr::Group(elements) => {
                let mut last = Value::Nil;
                for element in elements {
                    last = settle!(self.evaluate(element));
                }
                Ok(Flow::Value(last))
            }
        }
    }

    /// A bare name after `.` is the property name, anything else is evaluated.
    fn evaluate_key(&mut self, key: &Expr) -> Result<Flow> {
        match key {
            Expr::Identifier(name) => Ok(Flow::Value(Value::string(name))),
            other => self.evaluate(other),
        }
    }

    fn evaluate_unary(&mut self, op: &str, operand: &Expr) -> Result<Flow> {
        if op == "::" {
            return match operand {
                Expr::Identifier(name) => match self.global(name) {
                    Some(value) => Ok(Flow::Value(value)),
                    None => runtime_error!(format!("{} is not defined globally", name)),
                },
                other => runtime_error!(format!("'::' needs a name, got {}", other)),
            };
        }

        let value = settle!(self.evaluate(operand));
        Ok(Flow::Value(operations::unary(op, &value)?))
    }

    fn evaluate_binary(&mut self, op: &str, left: &Expr, right: &Expr) -> Result<Flow> {
        match op {
            "and" | "&&" => {
                let left = settle!(self.evaluate(left));
                if !left.is_truthy() {
                    return Ok(Flow::Value(left));
                }
                self.evaluate(right)
            }
            "or" | "||" => {
                let left = settle!(self.evaluate(left));
                if left.is_truthy() {
                    return Ok(Flow::Value(left));
                }
                self.evaluate(right)
            }
            "|>" => {
                let input = settle!(self.evaluate(left));
                let function = settle!(self.evaluate(right));
                self.call_value(&function, None, Arguments::from_positional(vec![input]), &callee_name(right))
            }
            _ => {
                let left = settle!(self.evaluate(left));
                let right = settle!(self.evaluate(right));

                if let Some((handler, this)) = Self::operator_overload(op, &left, &right) {
                    trace!("Dispatching '{}' to an overload on {}", op, this.type_name());
                    return self.call_value(&handler, Some(this), Arguments::from_positional(vec![left, right]), op);
                }

                Ok(Flow::Value(operations::binary(op, &left, &right)?))
            }
        }
    }

    /// A callable field named like the operator on the left operand, else on
    /// the right one.
    fn operator_overload(op: &str, left: &Value, right: &Value) -> Option<(Value, Value)> {
        [left, right].into_iter().find_map(|operand| match operand {
            Value::Object(object) => object
                .get(op)
                .filter(Value::is_callable)
                .map(|handler| (handler, operand.clone())),
            _ => None,
        })
    }

    fn evaluate_call(&mut self, kind: CallKind, callee: &Expr, args: &[Entry]) -> Result<Flow> {
        match kind {
            CallKind::Paren => {
                let function = settle!(self.evaluate(callee));
                let arguments = unwind!(self.evaluate_arguments(args));
                self.call_value(&function, None, arguments, &callee_name(callee))
            }
            CallKind::Bracket => {
                let target = settle!(self.evaluate(callee));
                let arguments = unwind!(self.evaluate_arguments(args));

                if let Value::Object(object) = &target {
                    if let Some(handler) = object.get("[]").filter(Value::is_callable) {
                        return self.call_value(&handler, Some(target.clone()), arguments, "[]");
                    }
                }

                let key = arguments.into_index()?;
                Ok(Flow::Value(get_member(&target, &key)?))
            }
            CallKind::Brace => runtime_error!("Calling with '{' is not implemented"),
        }
    }

    pub(crate) fn evaluate_arguments(&mut self, entries: &[Entry]) -> Result<Unwound<Arguments>> {
        let mut arguments = Arguments::default();

        for entry in entries {
            if entry.positional {
                arguments.positional.push(settle_unwound!(self.evaluate(&entry.value)));
            } else {
                let key = settle_unwound!(self.evaluate(&entry.key)).property_key()?;
                let value = settle_unwound!(self.evaluate(&entry.value));
                arguments.named.push((key, value));
            }
        }

        Ok(Ok(arguments))
    }

    fn evaluate_object(&mut self, entries: &[Entry]) -> Result<Flow> {
        let mut fields = IndexMap::with_capacity(entries.len());

        for entry in entries {
            let key = settle!(self.evaluate(&entry.key)).property_key()?;
            let value = settle!(self.evaluate(&entry.value));
            fields.insert(key, value);
        }

        Ok(Flow::Value(Value::object(Object::from_fields(fields))))
    }

    fn evaluate_if(&mut self, clauses: &[IfClause], otherwise: &Option<Box<Expr>>) -> Result<Flow> {
        for clause in clauses {
            if settle!(self.evaluate(&clause.test)).is_truthy() {
                return self.evaluate(&clause.body);
            }
        }
        self.evaluate_else(otherwise, Value::Nil)
    }

    fn evaluate_else(&mut self, otherwise: &Option<Box<Expr>>, fallback: Value) -> Result<Flow> {
        match otherwise {
            Some(alternative) => self.evaluate(alternative),
            None => Ok(Flow::Value(fallback)),
        }
    }

    fn evaluate_while(
        &mut self,
        label: &Option<String>,
        test: &Expr,
        body: &Expr,
        otherwise: &Option<Box<Expr>>,
    ) -> Result<Flow> {
        let mut last = Value::Nil;

        while settle!(self.evaluate(test)).is_truthy() {
            match pass(self.evaluate(body)?, label, &mut last) {
                Pass::Next => {}
                Pass::Stop => return Ok(Flow::Value(last)),
                Pass::Unwind(flow) => return Ok(flow),
            }
        }

        self.evaluate_else(otherwise, last)
    }

    fn evaluate_do_while(
        &mut self,
        label: &Option<String>,
        test: &Expr,
        body: &Expr,
        otherwise: &Option<Box<Expr>>,
    ) -> Result<Flow> {
        let mut last = Value::Nil;

        loop {
            match pass(self.evaluate(body)?, label, &mut last) {
                Pass::Next => {}
                Pass::Stop => return Ok(Flow::Value(last)),
                Pass::Unwind(flow) => return Ok(flow),
            }
            if !settle!(self.evaluate(test)).is_truthy() {
                break;
            }
        }

        self.evaluate_else(otherwise, last)
    }

    fn evaluate_for(
        &mut self,
        label: &Option<String>,
        head: &Expr,
        body: &Expr,
        otherwise: &Option<Box<Expr>>,
    ) -> Result<Flow> {
        let mut last = Value::Nil;

        match head {
            Expr::Group(parts) if parts.len() == 3 => {
                settle!(self.evaluate(&parts[0]));
                while settle!(self.evaluate(&parts[1])).is_truthy() {
                    match pass(self.evaluate(body)?, label, &mut last) {
                        Pass::Next => {}
                        Pass::Stop => return Ok(Flow::Value(last)),
                        Pass::Unwind(flow) => return Ok(flow),
                    }
                    settle!(self.evaluate(&parts[2]));
                }
            }
            Expr::Binary { op, left, right } if op == "in" => {
                let collection = settle!(self.evaluate(right));
                for item in iteration_items(&collection)? {
                    unwind!(self.bind_loop_variable(left, item));
                    match pass(self.evaluate(body)?, label, &mut last) {
                        Pass::Next => {}
                        Pass::Stop => return Ok(Flow::Value(last)),
                        Pass::Unwind(flow) => return Ok(flow),
                    }
                }
            }
            other => return runtime_error!(format!("Unsupported for-loop head {}", other)),
        }

        self.evaluate_else(otherwise, last)
    }

    fn bind_loop_variable(&mut self, target: &Expr, item: Value) -> Result<Unwound<()>> {
        match target {
            Expr::Identifier(name) => {
                self.assign(name, item);
                Ok(Ok(()))
            }
            Expr::VariableDeclaration { bindings, .. } => match bindings.as_slice() {
                [Binding { pattern, init: None }] => self.bind_pattern(pattern, item),
                _ => runtime_error!("A for-in loop declares exactly one pattern without initializer"),
            },
            other => runtime_error!(format!("Cannot bind a loop variable to {}", other)),
        }
    }

    fn evaluate_switch(&mut self, value: &Expr, cases: &[Case]) -> Result<Flow> {
        let subject = settle!(self.evaluate(value));

        for case in cases {
            match &case.test {
                None => return self.evaluate(&case.body),
                Some(test) => {
                    if settle!(self.evaluate(test)) == subject {
                        return self.evaluate(&case.body);
                    }
                }
            }
        }

        Ok(Flow::Value(Value::Nil))
    }

    fn evaluate_with(&mut self, subject: &Expr, body: &Expr, otherwise: &Option<Box<Expr>>) -> Result<Flow> {
        let subject = settle!(self.evaluate(subject));
        if subject == Value::Nil {
            return self.evaluate_else(otherwise, Value::Nil);
        }

        let scope = self.scope();
        self.frames.push(CallFrame::new("with", scope, Some(subject), Vec::new()));
        let outcome = self.evaluate(body);
        self.frames.pop();

        outcome
    }

    fn evaluate_declaration(&mut self, bindings: &[Binding]) -> Result<Flow> {
        let mut last = Value::Nil;

        for binding in bindings {
            let value = match &binding.init {
                Some(init) => settle!(self.evaluate(init)),
                None => Value::Nil,
            };
            unwind!(self.bind_pattern(&binding.pattern, value.clone()));
            last = value;
        }

        Ok(Flow::Value(last))
    }

    /// Declares every name in `pattern` in the current frame. Missing fields
    /// read as nil and then take the field default.
    pub(crate) fn bind_pattern(&mut self, pattern: &Pattern, value: Value) -> Result<Unwound<()>> {
        match pattern {
            Pattern::Name(name) => self.declare(name, value),
            Pattern::Tuple(names) => {
                for (index, name) in names.iter().enumerate() {
                    let item = get_member(&value, &Value::Number(index as f64))?;
                    self.declare(name, item);
                }
            }
            Pattern::Array(fields) | Pattern::Object(fields) => {
                for field in fields {
                    let key = match &field.key {
                        PatternKey::Index(index) => Value::Number(*index as f64),
                        PatternKey::Name(name) => Value::string(name),
                    };

                    let mut item = get_member(&value, &key)?;
                    if item == Value::Nil {
                        if let Some(default) = &field.default {
                            item = settle_unwound!(self.evaluate(default));
                        }
                    }

                    if let Err(flow) = self.bind_pattern(&field.target, item)? {
                        return Ok(Err(flow));
                    }
                }
            }
        }

        Ok(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::error::ErrorKind;
    use crate::language::parser::parse;

    fn run(source: &str) -> Result<Value> {
        let program = parse(source).expect("source should parse");
        Interpreter::new().exec(&program)
    }

    fn value(source: &str) -> Value {
        run(source).unwrap_or_else(|e| panic!("{} failed: {}", source, e))
    }

    fn runtime_error(source: &str) -> ErrorKind {
        run(source).expect_err("source should fail").kind
    }

    #[test]
    fn arithmetic_and_grouping() {
        assert_eq!(value("1 + 2 * 3"), Value::Number(7.0));
        assert_eq!(value("(1 + 2) * 3"), Value::Number(9.0));
        assert_eq!(value("2 ** 3 ** 2"), Value::Number(512.0));
    }

    #[test]
    fn short_circuit_yields_deciding_operand() {
        assert_eq!(value("nil or 5"), Value::Number(5.0));
        assert_eq!(value("0 and 'x'"), Value::string("x"));
        assert_eq!(value("false && undefined_name"), Value::Bool(false));
        assert_eq!(value("true || undefined_name"), Value::Bool(true));
    }

    #[test]
    fn variables_and_assignment() {
        assert_eq!(value("var x = 1; x = x + 1; x"), Value::Number(2.0));
        assert_eq!(value("var a = 1, b = 2"), Value::Number(2.0));
        assert_eq!(runtime_error("y + 1"), ErrorKind::Runtime);
    }

    #[test]
    fn member_access_and_assignment() {
        assert_eq!(value("var o = {x: 1}; o.x = 5; o.x"), Value::Number(5.0));
        assert_eq!(value("var o = {x: 1}; o.missing"), Value::Nil);
        assert_eq!(value("var o = object(); o['k'] = 3; o.k"), Value::Number(3.0));
        assert_eq!(runtime_error("nil.x"), ErrorKind::Runtime);
    }

    #[test]
    fn array_subscripts() {
        assert_eq!(value("var a = [1, 2]; a[0] = 9; a[0]"), Value::Number(9.0));
        assert_eq!(value("var a = [1, 2]; a[2] = 3; len(a)"), Value::Number(3.0));
        assert_eq!(value("var a = [1, 2]; a[5]"), Value::Nil);
        assert_eq!(value("var a = [1, 2]; a[0 - 1]"), Value::Nil);
        assert_eq!(runtime_error("var a = [1]; a[3] = 1"), ErrorKind::Runtime);
        assert_eq!(value("'abc'[1]"), Value::string("b"));
    }

    #[test]
    fn brace_calls_are_not_implemented() {
        assert_eq!(runtime_error("var f = let (x) x; f{1}"), ErrorKind::Runtime);
    }

    #[test]
    fn conditionals() {
        assert_eq!(value("if (nil) 1 else if (0) 2 else 3"), Value::Number(2.0));
        assert_eq!(value("if (false) 1"), Value::Nil);
    }

    #[test]
    fn while_loop_yields_last_body_value() {
        assert_eq!(value("var i = 0; while (i < 3) i = i + 1"), Value::Number(3.0));
        assert_eq!(value("while (false) 1"), Value::Nil);
    }

    #[test]
    fn loop_else_runs_only_without_break() {
        assert_eq!(value("var i = 0; while (i < 3) (i = i + 1) else 'done'"), Value::string("done"));
        assert_eq!(
            value("var i = 0; while (true) (i = i + 1; if (i == 2) break) else 'done'; i"),
            Value::Number(2.0)
        );
    }

    #[test]
    fn continue_skips_the_rest_of_the_body() {
        let source = "var total = 0; for (x in [1, 2, 3, 4]) (if (x % 2 == 0) continue; total = total + x); total";
        assert_eq!(value(source), Value::Number(4.0));
    }

    #[test]
    fn labelled_break_leaves_the_outer_loop() {
        let source = "
            var hits = 0;
            for as outer (i in 3) (
                for (j in 3) (
                    if (j == 1) break outer;
                    hits = hits + 1
                )
            );
            hits";
        assert_eq!(value(source), Value::Number(1.0));
    }

    #[test]
    fn for_loop_forms() {
        assert_eq!(value("var s = 0; for (var i = 0; i < 4; i = i + 1) s = s + i; s"), Value::Number(6.0));
        assert_eq!(value("var s = ''; for (var c in 'abc') s = c + s; s"), Value::string("cba"));
        assert_eq!(value("var ks = ''; for (k in {a: 1, b: 2}) ks = ks + k; ks"), Value::string("ab"));
        assert_eq!(value("var n = 0; for (i in 5) n = n + i; n"), Value::Number(10.0));
        assert_eq!(runtime_error("for (x in nil) x"), ErrorKind::Runtime);
    }

    #[test]
    fn numeric_ranges_are_not_materialised() {
        let source = "var n = 0; for (i in 1e12) (n = i; if (i == 3) break); n";
        assert_eq!(value(source), Value::Number(3.0));
        assert_eq!(value("var n = 'untouched'; for (i in 0 - 5) n = i; n"), Value::string("untouched"));
    }

    #[test]
    fn later_duplicate_keys_win() {
        assert_eq!(value("var o = {a: 1, a: 2}; o.a"), Value::Number(2.0));
        assert_eq!(value("len({a: 1, b: 2, a: 3})"), Value::Number(2.0));
    }

    #[test]
    fn do_while_runs_at_least_once() {
        assert_eq!(value("var n = 0; do n = n + 1 while (false); n"), Value::Number(1.0));
        assert_eq!(value("var n = 0; do n = n + 1 while (n < 5); n"), Value::Number(5.0));
        assert_eq!(value("do 7"), Value::Number(7.0));
    }

    #[test]
    fn switch_compares_strictly() {
        let source = "case (2) when ('2') 'string' when (2) 'number' else 'other'";
        assert_eq!(value(source), Value::string("number"));
        assert_eq!(value("case (9) when (1) 'one' else 'other'"), Value::string("other"));
        assert_eq!(value("case (9) when (1) 'one'"), Value::Nil);
    }

    #[test]
    fn with_binds_this() {
        assert_eq!(value("var o = {x: 4}; with (o) this.x"), Value::Number(4.0));
        assert_eq!(value("with (nil) 1 else 2"), Value::Number(2.0));
        assert_eq!(value("with (nil) 1"), Value::Nil);
    }

    #[test]
    fn destructuring() {
        assert_eq!(value("var [a, b] = [1, 2]; a + b"), Value::Number(3.0));
        assert_eq!(value("var {x, y: z} = {x: 1, y: 2}; x * 10 + z"), Value::Number(12.0));
        assert_eq!(value("var [a, b = 7] = [1,]; b"), Value::Number(7.0));
        assert_eq!(value("var {p: [q]} = {p: [5,]}; q"), Value::Number(5.0));
        assert_eq!(value("def (m, n) = {1, 2}; n"), Value::Number(2.0));
    }

    #[test]
    fn unsupported_constructs_are_runtime_errors() {
        assert_eq!(runtime_error("try 1"), ErrorKind::Runtime);
        assert_eq!(runtime_error("import 'x'"), ErrorKind::Runtime);
        assert_eq!(runtime_error("let g() yield 1; g()"), ErrorKind::Runtime);
        assert_eq!(runtime_error("break"), ErrorKind::Runtime);
    }

    #[test]
    fn fail_reaches_the_host() {
        let err = run("fail 'boom'").expect_err("fail should surface");
        assert_eq!(err.kind, ErrorKind::Fail);
        assert_eq!(err.value, Some(Value::string("boom")));
    }

    #[test]
    fn global_lookup_skips_locals() {
        assert_eq!(value("var x = 1; let f(x) ::x; f(2)"), Value::Number(1.0));
    }

    #[test]
    fn pipe_calls_the_right_side() {
        assert_eq!(value("let double(x) x * 2; 4 |> double"), Value::Number(8.0));
    }

    #[test]
    fn membership_operator() {
        assert_eq!(value("'a' in {a: 1}"), Value::Bool(true));
        assert_eq!(value("3 in [1, 2]"), Value::Bool(false));
    }
}
