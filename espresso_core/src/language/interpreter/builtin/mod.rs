mod collection;
mod console;
mod text;

use log::debug;
use crate::language::error::Result;
use crate::runtime_error;
use super::frame::Scope;
use super::value::Value;

/// A named native ready to be bound in the global table.
pub type Native = (&'static str, Value);

/// Binds every native in `scope`.
pub fn install(scope: &Scope) {
    let natives: Vec<Native> = console::natives()
        .into_iter()
        .chain(text::natives())
        .chain(collection::natives())
        .collect();

    debug!("Installing {} natives", natives.len());
    for (name, value) in natives {
        scope.define(name, value);
    }
}

pub(crate) fn expect_arity(name: &str, args: &[Value], expected: usize) -> Result<()> {
    if args.len() != expected {
        return runtime_error!(format!(
            "Arity mismatch: {} takes {} arguments, got {}",
            name,
            expected,
            args.len()
        ));
    }
    Ok(())
}
