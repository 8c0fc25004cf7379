use std::{collections::BTreeMap, env, fs, io, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Output format of a log layer.
#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggingConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(LoggingConfigError::InvalidFormat(s.to_string())),
        }
    }
}

/// How often the log file rolls over.
#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    Never,
    Hourly,
    #[default]
    Daily,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoggingConfigError {
    #[error("Invalid log level '{0}'")]
    InvalidLevel(String),
    #[error("Invalid log format '{0}'")]
    InvalidFormat(String),
    #[error("Log file name must not be empty")]
    EmptyFilename,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConsoleConfig {
    pub enabled: bool,
    pub format: LogFormat,
    pub with_ansi: bool,
    pub with_target: bool,
    pub with_thread_ids: bool,
    pub with_line_numbers: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            format: LogFormat::Compact,
            with_ansi: true,
            with_target: true,
            with_thread_ids: false,
            with_line_numbers: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FileConfig {
    pub enabled: bool,
    pub directory: PathBuf,
    pub filename: String,
    pub format: LogFormat,
    pub rotation: Rotation,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            directory: PathBuf::from("logs"),
            filename: "yamlgraph.log".to_string(),
            format: LogFormat::Json,
            rotation: Rotation::Daily,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default level for every target.
    pub level: String,
    /// Per-target overrides, e.g. `yamlgraph::dumper` -> `trace`.
    #[serde(default)]
    pub targets: BTreeMap<String, String>,
    #[serde(default)]
    pub console: ConsoleConfig,
    #[serde(default)]
    pub file: FileConfig,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            targets: BTreeMap::new(),
            console: ConsoleConfig::default(),
            file: FileConfig::default(),
        }
    }
}

impl LoggingConfig {
    /// Overrides from `YAMLGRAPH_LOG_*` environment variables. Unparseable
    /// values are left for [`validate`](Self::validate) to report.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(level) = env::var("YAMLGRAPH_LOG_LEVEL") {
            self.level = level;
        }
        if let Ok(format) = env::var("YAMLGRAPH_LOG_FORMAT") {
            match format.parse() {
                Ok(format) => self.console.format = format,
                Err(e) => eprintln!("Ignoring YAMLGRAPH_LOG_FORMAT: {e}"),
            }
        }
        if let Ok(dir) = env::var("YAMLGRAPH_LOG_DIR") {
            self.file.directory = PathBuf::from(dir);
            self.file.enabled = true;
        }
    }

    pub fn validate(&self) -> Result<(), LoggingConfigError> {
        let levels = std::iter::once(&self.level).chain(self.targets.values());
        for level in levels {
            if !LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
                return Err(LoggingConfigError::InvalidLevel(level.clone()));
            }
        }
        if self.file.enabled && self.file.filename.trim().is_empty() {
            return Err(LoggingConfigError::EmptyFilename);
        }
        Ok(())
    }

    /// Filter directive such as `info,yamlgraph::dumper=trace`.
    pub fn build_filter_directive(&self) -> String {
        let mut directive = self.level.to_ascii_lowercase();
        for (target, level) in &self.targets {
            directive.push(',');
            directive.push_str(target);
            directive.push('=');
            directive.push_str(&level.to_ascii_lowercase());
        }
        directive
    }

    pub fn ensure_log_dir(&self) -> io::Result<()> {
        if self.file.enabled {
            fs::create_dir_all(&self.file.directory)?;
        }
        Ok(())
    }
}
