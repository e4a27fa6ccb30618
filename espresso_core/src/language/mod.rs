pub mod token;
pub mod ast;
pub mod lexer;
pub mod operators;
pub mod parser;
pub mod error;
pub mod interpreter;

pub use error::{Error, ErrorKind, Result};
pub use ast::Expr;
pub use lexer::Lexer;
pub use parser::parse;
pub use interpreter::{Interpreter, Value};
