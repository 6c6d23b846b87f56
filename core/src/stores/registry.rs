use std::collections::HashMap;
use std::sync::Arc;

use lfsh_sdk::{FileStore, StoreError, StoreResult};
use serde::{Deserialize, Serialize};

use super::local::LocalStore;
use super::memory::{MemoryStore, MemoryStoreOptions};

/// Backend options as a loose key/value map, usually deserialized from the
/// `store.options` section of the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    #[serde(flatten)]
    pub options: HashMap<String, serde_json::Value>,
}

impl StoreConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with<T: Serialize>(mut self, key: &str, value: T) -> Self {
        self.options.insert(
            key.to_string(),
            serde_json::to_value(value).unwrap_or(serde_json::Value::Null),
        );
        self
    }

    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.options
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn get_str(&self, key: &str) -> Option<String> {
        self.get(key)
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key)
    }

    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get(key)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key)
    }
}

pub type StoreFactory = fn(StoreConfig) -> StoreResult<Arc<dyn FileStore>>;

pub struct StoreRegistry {
    factories: HashMap<String, StoreFactory>,
}

impl Default for StoreRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: &str, factory: StoreFactory) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn create(&self, name: &str, config: StoreConfig) -> StoreResult<Arc<dyn FileStore>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| StoreError::not_found(format!("store backend '{name}' not registered")))?;
        factory(config)
    }

    #[must_use]
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

fn memory_options(config: &StoreConfig) -> MemoryStoreOptions {
    let defaults = MemoryStoreOptions::default();
    MemoryStoreOptions {
        capacity: config.get_u64("capacity").unwrap_or(defaults.capacity),
        block_size: config.get("block_size").unwrap_or(defaults.block_size),
        page_size: config.get("page_size").unwrap_or(defaults.page_size),
        max_open_files: config
            .get_usize("max_open_files")
            .unwrap_or(defaults.max_open_files),
        max_path_length: config
            .get_usize("max_path_length")
            .unwrap_or(defaults.max_path_length),
        prune_empty_parents: config
            .get_bool("prune_empty_parents")
            .unwrap_or(defaults.prune_empty_parents),
    }
}

#[must_use]
pub fn default_registry() -> StoreRegistry {
    let mut registry = StoreRegistry::new();

    registry.register("memory", |config| {
        let options = memory_options(&config);
        if options.block_size == 0 {
            return Err(StoreError::invalid_argument("block_size must be non-zero"));
        }
        Ok(Arc::new(MemoryStore::with_options(options)))
    });

    registry.register("local", |config| {
        let root = config
            .get_str("root")
            .ok_or_else(|| StoreError::invalid_argument("local store requires 'root' option"))?;
        Ok(Arc::new(LocalStore::new(root)?))
    });

    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_config_accessors() {
        let config = StoreConfig::new()
            .with("root", "/data")
            .with("capacity", 8192u64)
            .with("prune_empty_parents", false);

        assert_eq!(config.get_str("root"), Some("/data".to_string()));
        assert_eq!(config.get_u64("capacity"), Some(8192));
        assert_eq!(config.get_bool("prune_empty_parents"), Some(false));
        assert_eq!(config.get_str("missing"), None);
    }

    #[test]
    fn registry_lists_builtin_backends() {
        let registry = default_registry();
        assert_eq!(registry.list(), vec!["local", "memory"]);
        assert!(registry.has("memory"));
    }

    #[test]
    fn memory_options_from_config() {
        let config = StoreConfig::new()
            .with("capacity", 65536u64)
            .with("max_open_files", 3usize);
        let options = memory_options(&config);
        assert_eq!(options.capacity, 65536);
        assert_eq!(options.max_open_files, 3);
        assert_eq!(options.block_size, 4096);
    }

    #[tokio::test]
    async fn create_memory_store() {
        let registry = default_registry();
        let store = registry.create("memory", StoreConfig::new()).unwrap();
        assert!(store.exists("/").await);
    }

    #[test]
    fn create_local_store() {
        let temp = tempfile::TempDir::new().unwrap();
        let registry = default_registry();
        let config = StoreConfig::new().with("root", temp.path().display().to_string());
        assert!(registry.create("local", config).is_ok());
    }

    #[test]
    fn local_store_requires_root() {
        let registry = default_registry();
        let result = registry.create("local", StoreConfig::new());
        assert!(matches!(result, Err(StoreError::InvalidArgument(_))));
    }

    #[test]
    fn unknown_backend() {
        let registry = default_registry();
        let result = registry.create("spiffs", StoreConfig::new());
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }
}
