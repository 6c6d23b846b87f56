use crate::{ConfigError, LfshConfig};
use regex::Regex;
use std::path::PathBuf;

pub struct ConfigLoader {
    explicit_file: Option<PathBuf>,
    search_paths: Vec<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        let mut search_paths = Vec::new();

        if let Some(home) = dirs::home_dir() {
            search_paths.push(home.join(".config/lfsh/lfsh.yaml"));
        }
        search_paths.push(PathBuf::from("./lfsh.yaml"));

        #[cfg(unix)]
        search_paths.insert(0, PathBuf::from("/etc/lfsh/lfsh.yaml"));

        Self {
            explicit_file: None,
            search_paths,
        }
    }

    pub fn with_file(mut self, path: &str) -> Self {
        self.explicit_file = Some(PathBuf::from(shellexpand::tilde(path).into_owned()));
        self
    }

    pub fn with_search_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.search_paths = paths;
        self
    }

    pub fn load(&self) -> Result<LfshConfig, ConfigError> {
        let mut config = LfshConfig::default();

        if let Ok(env_path) = std::env::var("LFSH_CONFIG") {
            config = self.parse_yaml(&read_file(&PathBuf::from(env_path))?)?;
        } else if let Some(ref explicit) = self.explicit_file {
            config = self.parse_yaml(&read_file(explicit)?)?;
        } else {
            for path in &self.search_paths {
                if path.exists() {
                    if let Ok(content) = std::fs::read_to_string(path) {
                        tracing::debug!(path = %path.display(), "merging config file");
                        config = self.merge_yaml(&config, &content)?;
                    }
                }
            }
        }

        self.apply_env_overrides(&mut config);
        validate(&config)?;
        Ok(config)
    }

    fn parse_yaml(&self, content: &str) -> Result<LfshConfig, ConfigError> {
        let expanded = self.expand_env_vars(content)?;
        if expanded.trim().is_empty() {
            return Ok(LfshConfig::default());
        }
        Ok(serde_yaml::from_str(&expanded)?)
    }

    fn merge_yaml(&self, base: &LfshConfig, content: &str) -> Result<LfshConfig, ConfigError> {
        let overlay = self.parse_yaml(content)?;
        Ok(self.merge_configs(base, &overlay))
    }

    fn merge_configs(&self, base: &LfshConfig, overlay: &LfshConfig) -> LfshConfig {
        let defaults = LfshConfig::default();
        let mut result = base.clone();

        if overlay.store != defaults.store {
            result.store = overlay.store.clone();
        }
        if overlay.shell.max_path_length != defaults.shell.max_path_length {
            result.shell.max_path_length = overlay.shell.max_path_length;
        }
        if overlay.shell.load_idle_timeout_ms != defaults.shell.load_idle_timeout_ms {
            result.shell.load_idle_timeout_ms = overlay.shell.load_idle_timeout_ms;
        }
        if overlay.shell.banner.is_some() {
            result.shell.banner = overlay.shell.banner.clone();
        }
        if overlay.logging != defaults.logging {
            result.logging = overlay.logging.clone();
        }

        result
    }

    fn expand_env_vars(&self, content: &str) -> Result<String, ConfigError> {
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
        Ok(re
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_default()
            })
            .to_string())
    }

    fn apply_env_overrides(&self, config: &mut LfshConfig) {
        if let Ok(backend) = std::env::var("LFSH_STORE") {
            if !backend.is_empty() {
                config.store.backend = backend;
            }
        }
        if let Ok(root) = std::env::var("LFSH_ROOT") {
            if !root.is_empty() {
                config.store.backend = "local".to_string();
                config
                    .store
                    .options
                    .insert("root".to_string(), serde_json::Value::String(root));
            }
        }
        if let Ok(level) = std::env::var("LFSH_LOG_LEVEL") {
            if let Ok(l) = level.parse() {
                config.logging.level = l;
            }
        }
        if let Ok(timeout) = std::env::var("LFSH_IDLE_TIMEOUT_MS") {
            if let Ok(ms) = timeout.parse() {
                config.shell.load_idle_timeout_ms = ms;
            }
        }
    }
}

fn read_file(path: &PathBuf) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.clone(),
        source: e,
    })
}

fn validate(config: &LfshConfig) -> Result<(), ConfigError> {
    if config.shell.max_path_length == 0 {
        return Err(ConfigError::InvalidValue(
            "shell.max_path_length must be at least 1".to_string(),
        ));
    }
    if config.shell.load_idle_timeout_ms == 0 {
        return Err(ConfigError::InvalidValue(
            "shell.load_idle_timeout_ms must be at least 1".to_string(),
        ));
    }
    if config.store.backend.is_empty() {
        return Err(ConfigError::InvalidValue(
            "store.backend must not be empty".to_string(),
        ));
    }
    Ok(())
}
