//! Store implementations for lfsh: an in-memory flash-like store, a store
//! rooted at a host directory, and a registry that builds either by name.

pub mod stores;

pub use lfsh_sdk;
pub use stores::{
    default_registry, LocalStore, MemoryStore, MemoryStoreOptions, StoreConfig, StoreFactory,
    StoreRegistry,
};
