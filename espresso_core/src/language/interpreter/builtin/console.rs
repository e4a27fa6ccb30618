use std::io::Write;
use log::trace;
use crate::language::error::{Error, ErrorKind, Result};
use super::Native;
use crate::language::interpreter::value::Value;

/// Space-joined display form of `args`.
pub(crate) fn render(args: &[Value]) -> String {
    args.iter().map(Value::to_string).collect::<Vec<_>>().join(" ")
}

fn print(_this: Option<&Value>, args: &[Value]) -> Result<Value> {
    let line = render(args);
    trace!("print: {}", line);

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", line)
        .and_then(|_| stdout.flush())
        .map_err(|e| Error::new(ErrorKind::Runtime, format!("Failed to write to stdout: {}", e)))?;

    Ok(Value::Nil)
}

pub fn natives() -> Vec<Native> {
    vec![
        ("print", Value::native("print", print)),
        ("g_print", Value::native("g_print", print)),
    ]
}
