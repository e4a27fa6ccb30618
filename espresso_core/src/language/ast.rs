use std::fmt;
use std::rc::Rc;

/// Which bracket opened a call: `f(x)`, `f[x]` or `f{x}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Paren,
    Bracket,
    Brace,
}

impl CallKind {
    pub fn from_open(open: char) -> Option<CallKind> {
        match open {
            '(' => Some(CallKind::Paren),
            '[' => Some(CallKind::Bracket),
            '{' => Some(CallKind::Brace),
            _ => None,
        }
    }

    pub fn open(self) -> char {
        match self {
            CallKind::Paren => '(',
            CallKind::Bracket => '[',
            CallKind::Brace => '{',
        }
    }

    pub fn close(self) -> char {
        match self {
            CallKind::Paren => ')',
            CallKind::Bracket => ']',
            CallKind::Brace => '}',
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Nil,
    Bool(bool),
    Number(f64),
    String(String),
}

/// One entry of an object literal or call argument list. Positional entries
/// carry their auto-assigned integer key.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub positional: bool,
    pub key: Expr,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfClause {
    pub test: Expr,
    pub body: Expr,
}

/// A `when` arm of a `case`; `test` is `None` for the `else` arm.
#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    pub test: Option<Expr>,
    pub body: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PatternKey {
    Index(usize),
    Name(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatternField {
    pub key: PatternKey,
    pub target: Pattern,
    pub default: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Name(String),
    Tuple(Vec<String>),
    Array(Vec<PatternField>),
    Object(Vec<PatternField>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub pattern: Pattern,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub pattern: Pattern,
    pub default: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: Option<String>,
    pub params: Vec<Parameter>,
    /// Always an `Expr::Return` wrapping the written body.
    pub body: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Identifier(String),
    Literal(Literal),
    This,

    Unary {
        op: String,
        operand: Box<Expr>,
    },
    Binary {
        op: String,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Access {
        object: Box<Expr>,
        key: Box<Expr>,
    },
    IdentAssign {
        name: String,
        value: Box<Expr>,
    },
    AccessAssign {
        object: Box<Expr>,
        key: Box<Expr>,
        value: Box<Expr>,
    },
    CallAssign {
        kind: CallKind,
        callee: Box<Expr>,
        args: Vec<Entry>,
        value: Box<Expr>,
    },

    Call {
        kind: CallKind,
        callee: Box<Expr>,
        args: Vec<Entry>,
    },
    MethodCall {
        receiver: Box<Expr>,
        key: Box<Expr>,
        args: Vec<Entry>,
    },
    New {
        prototype: Box<Expr>,
        args: Vec<Entry>,
    },

    Object(Vec<Entry>),
    Array(Vec<Expr>),

    If {
        clauses: Vec<IfClause>,
        otherwise: Option<Box<Expr>>,
    },
    While {
        label: Option<String>,
        test: Box<Expr>,
        body: Box<Expr>,
        otherwise: Option<Box<Expr>>,
    },
    For {
        label: Option<String>,
        head: Box<Expr>,
        body: Box<Expr>,
        otherwise: Option<Box<Expr>>,
    },
    Do {
        body: Box<Expr>,
        while_loop: Option<Box<Expr>>,
    },
    Switch {
        value: Box<Expr>,
        cases: Vec<Case>,
    },
    With {
        subject: Box<Expr>,
        body: Box<Expr>,
        otherwise: Option<Box<Expr>>,
    },
    Try {
        body: Box<Expr>,
        otherwise: Option<Box<Expr>>,
    },

    VariableDeclaration {
        bindings: Vec<Binding>,
        kind: String,
    },
    Function(Rc<FunctionDef>),
    Prototype {
        name: Option<String>,
        body: Box<Expr>,
    },

    Return(Option<Box<Expr>>),
    Fail(Box<Expr>),
    Break(Option<String>),
    Continue(Option<String>),
    Yield {
        argument: Option<Box<Expr>>,
        delegate: bool,
    },

    Import(Box<Expr>),
    Export {
        name: Option<String>,
        value: Box<Expr>,
    },
    Group(Vec<Expr>),
}

impl Expr {
    pub fn nil() -> Expr {
        Expr::Literal(Literal::Nil)
    }

    pub fn number(value: f64) -> Expr {
        Expr::Literal(Literal::Number(value))
    }

    pub fn string(value: impl Into<String>) -> Expr {
        Expr::Literal(Literal::String(value.into()))
    }

    pub fn ident(name: impl Into<String>) -> Expr {
        Expr::Identifier(name.into())
    }

    pub fn binary(op: impl Into<String>, left: Expr, right: Expr) -> Expr {
        Expr::Binary {
            op: op.into(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// `()` is nil and `(x)` is just `x`; only longer sequences stay a group.
    pub fn group(mut elements: Vec<Expr>) -> Expr {
        match elements.len() {
            0 => Expr::nil(),
            1 => elements.remove(0),
            _ => Expr::Group(elements),
        }
    }

    /// Builds a function literal, wrapping the body in an implicit `return`.
    pub fn function(name: Option<String>, params: Vec<Parameter>, body: Expr) -> Expr {
        Expr::Function(Rc::new(FunctionDef {
            name,
            params,
            body: Expr::Return(Some(Box::new(body))),
        }))
    }
}

impl FunctionDef {
    /// The body as written, without the implicit `return`.
    pub fn written_body(&self) -> &Expr {
        match &self.body {
            Expr::Return(Some(inner)) => inner,
            other => other,
        }
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter, items: &[T], separator: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", separator)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

fn write_else(f: &mut fmt::Formatter, otherwise: &Option<Box<Expr>>) -> fmt::Result {
    match otherwise {
        Some(alt) => write!(f, " else {}", alt),
        None => Ok(()),
    }
}

fn write_label(f: &mut fmt::Formatter, label: &Option<String>) -> fmt::Result {
    match label {
        Some(name) => write!(f, "as {} ", name),
        None => Ok(()),
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Literal::Nil => write!(f, "nil"),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Number(n) => write!(f, "{}", n),
            Literal::String(s) => write!(f, "\"{}\"", s.escape_default()),
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.positional {
            write!(f, "{}", self.value)
        } else {
            write!(f, "{}: {}", self.key, self.value)
        }
    }
}

impl fmt::Display for PatternField {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.key, &self.target) {
            (PatternKey::Name(key), Pattern::Name(target)) if key == target => write!(f, "{}", target)?,
            (PatternKey::Index(_), target) => write!(f, "{}", target)?,
            (PatternKey::Name(key), target) => write!(f, "{}: {}", key, target)?,
        }
        if let Some(default) = &self.default {
            write!(f, " = {}", default)?;
        }
        Ok(())
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Pattern::Name(name) => write!(f, "{}", name),
            Pattern::Tuple(names) => {
                write!(f, "(")?;
                write_list(f, names, ", ")?;
                write!(f, ")")
            }
            Pattern::Array(fields) => {
                write!(f, "[")?;
                write_list(f, fields, ", ")?;
                write!(f, "]")
            }
            Pattern::Object(fields) => {
                write!(f, "{{")?;
                write_list(f, fields, ", ")?;
                write!(f, "}}")
            }
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.pattern)?;
        if let Some(init) = &self.init {
            write!(f, " = {}", init)?;
        }
        Ok(())
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.pattern)?;
        if let Some(default) = &self.default {
            write!(f, " = {}", default)?;
        }
        Ok(())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Identifier(name) => write!(f, "{}", name),
            Expr::Literal(literal) => write!(f, "{}", literal),
            Expr::This => write!(f, "this"),
            Expr::Unary { op, operand } => {
                if op.chars().all(char::is_alphabetic) {
                    write!(f, "{} {}", op, operand)
                } else {
                    write!(f, "{}{}", op, operand)
                }
            }
            Expr::Binary { op, left, right } => write!(f, "({} {} {})", left, op, right),
            Expr::Access { object, key } => write!(f, "{}.{}", object, key),
            Expr::IdentAssign { name, value } => write!(f, "{} = {}", name, value),
            Expr::AccessAssign { object, key, value } => write!(f, "{}.{} = {}", object, key, value),
            Expr::CallAssign { kind, callee, args, value } => {
                write!(f, "{}{}", callee, kind.open())?;
                write_list(f, args, ", ")?;
                write!(f, "{} = {}", kind.close(), value)
            }
            Expr::Call { kind, callee, args } => {
                write!(f, "{}{}", callee, kind.open())?;
                write_list(f, args, ", ")?;
                write!(f, "{}", kind.close())
            }
            Expr::MethodCall { receiver, key, args } => {
                write!(f, "{}.{}(", receiver, key)?;
                write_list(f, args, ", ")?;
                write!(f, ")")
            }
            Expr::New { prototype, args } => {
                write!(f, "new {}(", prototype)?;
                write_list(f, args, ", ")?;
                write!(f, ")")
            }
            Expr::Object(entries) => {
                write!(f, "{{")?;
                write_list(f, entries, ", ")?;
                write!(f, "}}")
            }
            Expr::Array(values) => {
                write!(f, "[")?;
                write_list(f, values, ", ")?;
                write!(f, ",]")
            }
            Expr::If { clauses, otherwise } => {
                for (i, clause) in clauses.iter().enumerate() {
                    if i > 0 {
                        write!(f, " else ")?;
                    }
                    write!(f, "if ({}) {}", clause.test, clause.body)?;
                }
                write_else(f, otherwise)
            }
            Expr::While { label, test, body, otherwise } => {
                write!(f, "while ")?;
                write_label(f, label)?;
                write!(f, "({}) {}", test, body)?;
                write_else(f, otherwise)
            }
            Expr::For { label, head, body, otherwise } => {
                write!(f, "for ")?;
                write_label(f, label)?;
                write!(f, "({}) {}", head, body)?;
                write_else(f, otherwise)
            }
            Expr::Do { body, while_loop } => {
                match while_loop.as_deref() {
                    Some(Expr::While { test, otherwise, .. }) => {
                        write!(f, "do {} while ({})", body, test)?;
                        write_else(f, otherwise)
                    }
                    _ => write!(f, "do {}", body),
                }
            }
            Expr::Switch { value, cases } => {
                write!(f, "case ({})", value)?;
                for case in cases {
                    match &case.test {
                        Some(test) => write!(f, " when ({}) {}", test, case.body)?,
                        None => write!(f, " else {}", case.body)?,
                    }
                }
                Ok(())
            }
            Expr::With { subject, body, otherwise } => {
                write!(f, "with ({}) {}", subject, body)?;
                write_else(f, otherwise)
            }
            Expr::Try { body, otherwise } => {
                write!(f, "try {}", body)?;
                write_else(f, otherwise)
            }
            Expr::VariableDeclaration { bindings, kind } => {
                write!(f, "{} ", kind)?;
                write_list(f, bindings, ", ")
            }
            Expr::Function(def) => {
                write!(f, "let ")?;
                if let Some(name) = &def.name {
                    write!(f, "{}", name)?;
                }
                write!(f, "(")?;
                write_list(f, &def.params, ", ")?;
                write!(f, ") {}", def.written_body())
            }
            Expr::Prototype { name, body } => {
                match name {
                    Some(name) => write!(f, "proto {} {}", name, body),
                    None => write!(f, "proto {}", body),
                }
            }
            Expr::Return(argument) => {
                match argument {
                    Some(arg) => write!(f, "return {}", arg),
                    None => write!(f, "return"),
                }
            }
            Expr::Fail(argument) => write!(f, "fail {}", argument),
            Expr::Break(label) => {
                match label {
                    Some(label) => write!(f, "break {}", label),
                    None => write!(f, "break"),
                }
            }
            Expr::Continue(label) => {
                match label {
                    Some(label) => write!(f, "continue {}", label),
                    None => write!(f, "continue"),
                }
            }
            Expr::Yield { argument, delegate } => {
                write!(f, "yield")?;
                if *delegate {
                    write!(f, "*")?;
                }
                match argument {
                    Some(arg) => write!(f, " {}", arg),
                    None => Ok(()),
                }
            }
            Expr::Import(spec) => write!(f, "import {}", spec),
            Expr::Export { value, .. } => write!(f, "export {}", value),
            Expr::Group(elements) => {
                write!(f, "(")?;
                write_list(f, elements, "; ")?;
                write!(f, ")")
            }
        }
    }
}
