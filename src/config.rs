use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG: &str = "espresso.toml";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub console_level: String,
    pub file_level: String,
    /// Log files are only written when a directory is set.
    pub directory: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            console_level: "warn".to_string(),
            file_level: "debug".to_string(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShellConfig {
    pub prompt: String,
    pub show_results: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        ShellConfig {
            prompt: "> ".to_string(),
            show_results: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub shell: ShellConfig,
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Config, Box<dyn std::error::Error>> {
        Ok(toml::from_str(content)?)
    }
}

/// Reads `path`. A missing default config file is not an error, a missing
/// explicitly requested one is.
pub fn load_config(path: Option<&str>) -> Result<Config, Box<dyn std::error::Error>> {
    let (path, explicit) = match path {
        Some(path) => (path, true),
        None => (DEFAULT_CONFIG, false),
    };

    if !explicit && !Path::new(path).exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path).map_err(|e| format!("Failed to read config file {}: {}", path, e))?;
    Config::from_toml(&content).map_err(|e| format!("Failed to parse config file {}: {}", path, e).into())
}
