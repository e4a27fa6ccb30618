use log::{error, info};
use espresso_core::language::interpreter::Interpreter;
use espresso_core::language::Error;
use super::read_source;

/// Error report for the console, with the failing frames when there are any.
pub fn describe_failure(err: &Error, backtrace: &[String]) -> String {
    let mut report = match &err.value {
        Some(value) if err.is_fail() => format!("Uncaught fail: {}", value.repr()),
        _ => err.to_string(),
    };
    if backtrace.len() > 1 {
        report.push_str("\nBacktrace (innermost last):");
        for frame in backtrace {
            report.push_str("\n  ");
            report.push_str(frame);
        }
    }
    report
}

pub fn run(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let source = read_source(path)?;
    let mut interpreter = Interpreter::new();

    match interpreter.run(&source) {
        Ok(value) => {
            info!("{} finished with {}", path, value.repr());
            Ok(())
        }
        Err(e) => {
            let report = describe_failure(&e, interpreter.failure_backtrace());
            error!("{}", report);
            Err(e.into())
        }
    }
}
