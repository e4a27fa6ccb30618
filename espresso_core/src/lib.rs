//! Lexer, parser and tree-walking interpreter for the espresso scripting
//! language.

use log::info;

pub mod language;

use language::ast::Expr;
use language::error::Result;
use language::interpreter::{Interpreter, Value};
use language::lexer::Lexer;
use language::token::Token;

/// Parses `source` into its root `Expr::Group`.
pub fn parse(source: &str) -> Result<Expr> {
    language::parser::parse(source)
}

/// Parses and evaluates `source` on a fresh interpreter.
pub fn exec(source: &str) -> Result<Value> {
    let program = parse(source)?;
    let value = Interpreter::new().exec(&program)?;
    info!("Script finished with {}", value.repr());
    Ok(value)
}

/// Scans `source` into tokens, without the trailing end-of-input token.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    Lexer::new(source).tokenize()
}
