use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LfshConfig {
    pub store: StoreSection,
    pub shell: ShellConfig,
    pub logging: LoggingConfig,
}

/// Which store backend the shell drives, plus backend-specific options
/// handed to the store registry untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    pub backend: String,
    pub options: HashMap<String, serde_json::Value>,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            options: HashMap::new(),
        }
    }
}

impl StoreSection {
    /// The `root` option of a host-directory store, with `~` expanded.
    pub fn root(&self) -> Option<String> {
        self.options
            .get("root")
            .and_then(serde_json::Value::as_str)
            .map(|root| shellexpand::tilde(root).into_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Longest absolute path the resolver accepts, in characters.
    pub max_path_length: usize,
    /// How long `load` waits for the next byte once capture has started.
    pub load_idle_timeout_ms: u64,
    /// Printed once before the first prompt.
    pub banner: Option<String>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            max_path_length: 32,
            load_idle_timeout_ms: 500,
            banner: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub filter: String,
    /// Log destination. The REPL owns the terminal, so logs go to stderr
    /// only when this is unset.
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Warn,
            format: LogFormat::Full,
            filter: String::new(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// The `EnvFilter` directive: the explicit filter when set, else the level.
    pub fn directive(&self) -> String {
        if self.filter.is_empty() {
            self.level.as_str().to_string()
        } else {
            self.filter.clone()
        }
    }

    pub fn file_path(&self) -> Option<String> {
        self.file
            .as_deref()
            .map(|file| shellexpand::tilde(file).into_owned())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = crate::ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(crate::ConfigError::InvalidValue(format!(
                "unknown log level '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Full,
    Compact,
}
