use clap::{Parser, Subcommand};
use log::{LevelFilter, warn};
use commands::parse::parse;
use commands::run::run;
use commands::shell::shell;
use commands::tokens::tokens;
use config::{Config, load_config};

mod commands;
mod config;

#[derive(Parser, Debug)]
#[command(name = "espresso")]
#[command(about = "Runs espresso scripts and hosts an interactive shell.")]
struct Cli {
    /// Path to the configuration file (default: espresso.toml if present).
    #[arg(long)]
    config: Option<String>,

    /// Raise console logging to debug, twice for trace.
    #[arg(short, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    subcommand: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate a script file.
    Run {
        path: String,
    },
    /// Print the tokens of a script file.
    Tokens {
        path: String,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the syntax tree of a script file.
    Parse {
        path: String,
    },
    /// Start the interactive shell.
    Shell,
}

fn level(name: &str, fallback: LevelFilter) -> LevelFilter {
    espresso_logger::parse_level(name).unwrap_or(fallback)
}

fn init_logging(config: &Config, verbose: u8) -> Result<(), Box<dyn std::error::Error>> {
    let configured = level(&config.logging.console_level, LevelFilter::Warn);
    let console_level = match verbose {
        0 => configured,
        1 => configured.max(LevelFilter::Debug),
        _ => LevelFilter::Trace,
    };
    let file_level = level(&config.logging.file_level, LevelFilter::Debug);

    espresso_logger::init(config.logging.directory.as_deref(), console_level, file_level)?;

    if espresso_logger::parse_level(&config.logging.console_level).is_none() {
        warn!("Unknown console log level '{}', using warn", config.logging.console_level);
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_logging(&config, cli.verbose)?;

    match cli.subcommand {
        Some(Commands::Run { path }) => run(&path),
        Some(Commands::Tokens { path, json }) => tokens(&path, json),
        Some(Commands::Parse { path }) => parse(&path),
        Some(Commands::Shell) | None => shell(config.shell),
    }
}
