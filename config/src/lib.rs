//! lfsh configuration
//!
//! YAML configuration for the lfsh shell: which store backend to drive, the
//! shell's limits and timeouts, and logging.
//!
//! # Configuration Loading Priority
//!
//! 1. Compiled-in defaults
//! 2. `/etc/lfsh/lfsh.yaml` (system-wide)
//! 3. `~/.config/lfsh/lfsh.yaml` (user)
//! 4. `./lfsh.yaml` (project-local)
//! 5. `LFSH_CONFIG=/path/to/config.yaml` (explicit)
//! 6. Environment variables (highest priority)
//!
//! # Example Configuration
//!
//! ```yaml
//! store:
//!   backend: local
//!   options:
//!     root: "~/flash-image"
//!
//! shell:
//!   max_path_length: 32
//!   load_idle_timeout_ms: 500
//!
//! logging:
//!   level: debug
//!   file: "${HOME}/.cache/lfsh.log"
//! ```

#![allow(missing_docs)]

mod error;
mod loader;
mod types;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use types::*;

/// Load configuration from default locations.
///
/// Searches for config files in order and merges them.
/// Environment variables override file values.
pub fn load() -> Result<LfshConfig, ConfigError> {
    ConfigLoader::new().load()
}

/// Load configuration from a specific file.
pub fn load_from_file(path: &str) -> Result<LfshConfig, ConfigError> {
    ConfigLoader::new().with_file(path).load()
}
