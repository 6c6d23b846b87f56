//! Interfaces between the lfsh command-line core and its collaborators.
//!
//! A [`FileStore`] is the hierarchical storage engine the shell manipulates,
//! and a [`CharStream`] is the byte-oriented terminal transport it talks
//! through. Both are async so a polling serial driver and an event-driven
//! host terminal can sit behind the same editor logic.

mod error;
mod store;
mod stream;
mod types;

pub use error::{StoreError, StoreResult};
pub use store::FileStore;
pub use stream::CharStream;
pub use types::{DirEntry, EntryKind, Handle, OpenMode, StoreInfo};
