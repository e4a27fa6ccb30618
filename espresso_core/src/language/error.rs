use std::fmt;
use derive_more::Display;
use crate::language::interpreter::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ErrorKind {
    #[display("ScanError")]
    Scan,
    #[display("SyntaxError")]
    Syntax,
    #[display("RuntimeError")]
    Runtime,
    #[display("Fail")]
    Fail,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
    pub offset: Option<usize>,
    /// The value handed to `fail`, for `ErrorKind::Fail`.
    pub value: Option<Value>,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Error {
            kind,
            message: message.into(),
            line: None,
            column: None,
            offset: None,
            value: None,
        }
    }

    pub fn at(mut self, line: usize, column: usize, offset: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self.offset = Some(offset);
        self
    }

    pub fn failed(value: Value) -> Self {
        Error {
            message: value.to_string(),
            value: Some(value),
            ..Error::new(ErrorKind::Fail, "")
        }
    }

    pub fn is_fail(&self) -> bool {
        self.kind == ErrorKind::Fail
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.line, &self.column, &self.offset) {
            (Some(line), Some(column), Some(offset)) => {
                write!(f, "{}: {} (ln: {}, col: {}):{}", self.kind, self.message, line, column, offset)
            }
            (Some(line), Some(column), None) => {
                write!(f, "{}: {} (ln: {}, col: {})", self.kind, self.message, line, column)
            }
            _ => {
                write!(f, "{}: {}", self.kind, self.message)
            }
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

#[macro_export]
macro_rules! scan_error {
    ($msg:expr, $line:expr, $col:expr, $offset:expr) => {
        Err($crate::language::error::Error::new(
            $crate::language::error::ErrorKind::Scan,
            $msg.to_string(),
        ).at($line, $col, $offset))
    };
}

#[macro_export]
macro_rules! syntax_error {
    ($msg:expr, $pos:expr) => {
        Err($crate::language::error::Error::new(
            $crate::language::error::ErrorKind::Syntax,
            $msg.to_string(),
        ).at($pos.line, $pos.column, $pos.offset))
    };
}

#[macro_export]
macro_rules! runtime_error {
    ($msg:expr) => {
        Err($crate::language::error::Error::new(
            $crate::language::error::ErrorKind::Runtime,
            $msg.to_string(),
        ))
    };
}
