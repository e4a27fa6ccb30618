use std::io::{self, BufRead, Write};
use log::{debug, info};
use espresso_core::language::interpreter::Interpreter;
use crate::config::ShellConfig;
use super::read_source;
use super::run::describe_failure;

const COMMAND_PREFIX: &str = "#:";

const HELP: &str = "\
Commands:
  #:help            show this help
  #:globals         list global bindings
  #:bt              frames of the last failure
  #:reset           drop every frame but the global one
  #:include <file>  evaluate a file in this session
  #:quit            leave the shell";

/// What the shell does with one line of input.
#[derive(Debug, PartialEq)]
pub enum Reply {
    Silent,
    Output(String),
    Quit,
}

/// One interpreter fed line by line. Globals survive between lines.
pub struct Shell {
    interpreter: Interpreter,
    config: ShellConfig,
}

impl Shell {
    pub fn new(config: ShellConfig) -> Self {
        Shell {
            interpreter: Interpreter::new(),
            config,
        }
    }

    pub fn handle(&mut self, line: &str) -> Reply {
        let line = line.trim();
        if line.is_empty() {
            return Reply::Silent;
        }

        match line.strip_prefix(COMMAND_PREFIX) {
            Some(command) => self.command(command.trim()),
            None => self.evaluate(line),
        }
    }

    fn command(&mut self, command: &str) -> Reply {
        let (name, argument) = match command.split_once(char::is_whitespace) {
            Some((name, argument)) => (name, argument.trim()),
            None => (command, ""),
        };
        debug!("Shell command {} {}", name, argument);

        match name {
            "help" => Reply::Output(HELP.to_string()),
            "globals" => Reply::Output(self.interpreter.globals().join(" ")),
            "bt" => {
                let frames = self.interpreter.failure_backtrace();
                if frames.is_empty() {
                    Reply::Output("No failure recorded".to_string())
                } else {
                    Reply::Output(frames.join("\n"))
                }
            }
            "reset" => {
                self.interpreter.reset();
                Reply::Silent
            }
            "include" if argument.is_empty() => Reply::Output("Usage: #:include <file>".to_string()),
            "include" => match read_source(argument) {
                Ok(source) => self.evaluate(&source),
                Err(e) => Reply::Output(e.to_string()),
            },
            "quit" | "exit" => Reply::Quit,
            other => Reply::Output(format!("Unknown command #:{} (try #:help)", other)),
        }
    }

    fn evaluate(&mut self, source: &str) -> Reply {
        match self.interpreter.run(source) {
            Ok(value) if self.config.show_results => Reply::Output(value.repr()),
            Ok(_) => Reply::Silent,
            Err(e) => {
                let report = describe_failure(&e, self.interpreter.failure_backtrace());
                self.interpreter.reset();
                Reply::Output(report)
            }
        }
    }
}

pub fn shell(config: ShellConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting shell");
    let prompt = config.prompt.clone();
    let mut shell = Shell::new(config);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("{}", prompt);
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };

        match shell.handle(&line) {
            Reply::Silent => {}
            Reply::Output(text) => println!("{}", text),
            Reply::Quit => break,
        }
    }

    info!("Shell closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(shell: &mut Shell, line: &str) -> String {
        match shell.handle(line) {
            Reply::Output(text) => text,
            other => panic!("expected output for {:?}, got {:?}", line, other),
        }
    }

    #[test]
    fn globals_persist_between_lines() {
        let mut shell = Shell::new(ShellConfig::default());
        assert_eq!(output(&mut shell, "var x = 40"), "40");
        assert_eq!(output(&mut shell, "x + 2"), "42");
        assert!(output(&mut shell, "#:globals").split(' ').any(|name| name == "x"));
    }

    #[test]
    fn errors_do_not_end_the_session() {
        let mut shell = Shell::new(ShellConfig::default());
        assert!(output(&mut shell, "let f() fail 'no'; f()").starts_with("Uncaught fail: \"no\""));
        assert!(output(&mut shell, "#:bt").contains("f()"));
        assert_eq!(output(&mut shell, "1 + 1"), "2");
        assert_eq!(output(&mut shell, "#:bt"), "No failure recorded");
    }

    #[test]
    fn results_can_be_hidden() {
        let config = ShellConfig {
            show_results: false,
            ..ShellConfig::default()
        };
        let mut shell = Shell::new(config);
        assert_eq!(shell.handle("1"), Reply::Silent);
    }

    #[test]
    fn commands() {
        let mut shell = Shell::new(ShellConfig::default());
        assert_eq!(shell.handle(""), Reply::Silent);
        assert_eq!(shell.handle("#:reset"), Reply::Silent);
        assert_eq!(shell.handle("#:quit"), Reply::Quit);
        assert!(output(&mut shell, "#:help").contains("#:include"));
        assert!(output(&mut shell, "#:nope").starts_with("Unknown command"));
        assert!(output(&mut shell, "#:include").starts_with("Usage"));
        assert!(output(&mut shell, "#:include no/such/file.esp").starts_with("Failed to read"));
    }

    #[test]
    fn comment_lines_still_evaluate() {
        let mut shell = Shell::new(ShellConfig::default());
        assert_eq!(output(&mut shell, "# just a comment"), "nil");
    }
}
