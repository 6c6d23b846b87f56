pub mod local;
pub mod memory;
pub mod registry;

pub use local::LocalStore;
pub use memory::{MemoryStore, MemoryStoreOptions};
pub use registry::{default_registry, StoreConfig, StoreFactory, StoreRegistry};
