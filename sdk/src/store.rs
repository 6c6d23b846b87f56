use async_trait::async_trait;
use bytes::Bytes;

use crate::error::StoreResult;
use crate::types::{DirEntry, EntryKind, Handle, OpenMode, StoreInfo};

/// A small hierarchical file store: the storage engine behind the shell.
///
/// Paths are absolute and `/`-separated. Directory handles may be opened in
/// [`OpenMode::Read`] so callers can inspect them with [`FileStore::handle_kind`];
/// every successful `open` must be paired with a `close`.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn exists(&self, path: &str) -> bool;

    async fn stat(&self, path: &str) -> StoreResult<DirEntry>;

    async fn open(&self, path: &str, mode: OpenMode) -> StoreResult<Handle>;

    async fn handle_kind(&self, handle: &Handle) -> StoreResult<EntryKind>;

    async fn read(&self, handle: &Handle, offset: u64, size: usize) -> StoreResult<Bytes>;

    async fn write(&self, handle: &Handle, offset: u64, data: Bytes) -> StoreResult<usize>;

    async fn close(&self, handle: Handle) -> StoreResult<()>;

    async fn mkdir(&self, path: &str) -> StoreResult<()>;

    async fn rmdir(&self, path: &str) -> StoreResult<()>;

    async fn remove(&self, path: &str) -> StoreResult<()>;

    async fn rename(&self, from: &str, to: &str) -> StoreResult<()>;

    /// Entries directly under `path`, sorted by name.
    async fn list_dir(&self, path: &str) -> StoreResult<Vec<DirEntry>>;

    /// Erases every entry. The store stays mounted.
    async fn format(&self) -> StoreResult<()>;

    async fn mount(&self) -> StoreResult<()>;

    async fn unmount(&self) -> StoreResult<()>;

    async fn info(&self) -> StoreResult<StoreInfo>;
}

#[async_trait]
impl<S: FileStore + ?Sized> FileStore for Box<S> {
    async fn exists(&self, path: &str) -> bool {
        (**self).exists(path).await
    }

    async fn stat(&self, path: &str) -> StoreResult<DirEntry> {
        (**self).stat(path).await
    }

    async fn open(&self, path: &str, mode: OpenMode) -> StoreResult<Handle> {
        (**self).open(path, mode).await
    }

    async fn handle_kind(&self, handle: &Handle) -> StoreResult<EntryKind> {
        (**self).handle_kind(handle).await
    }

    async fn read(&self, handle: &Handle, offset: u64, size: usize) -> StoreResult<Bytes> {
        (**self).read(handle, offset, size).await
    }

    async fn write(&self, handle: &Handle, offset: u64, data: Bytes) -> StoreResult<usize> {
        (**self).write(handle, offset, data).await
    }

    async fn close(&self, handle: Handle) -> StoreResult<()> {
        (**self).close(handle).await
    }

    async fn mkdir(&self, path: &str) -> StoreResult<()> {
        (**self).mkdir(path).await
    }

    async fn rmdir(&self, path: &str) -> StoreResult<()> {
        (**self).rmdir(path).await
    }

    async fn remove(&self, path: &str) -> StoreResult<()> {
        (**self).remove(path).await
    }

    async fn rename(&self, from: &str, to: &str) -> StoreResult<()> {
        (**self).rename(from, to).await
    }

    async fn list_dir(&self, path: &str) -> StoreResult<Vec<DirEntry>> {
        (**self).list_dir(path).await
    }

    async fn format(&self) -> StoreResult<()> {
        (**self).format().await
    }

    async fn mount(&self) -> StoreResult<()> {
        (**self).mount().await
    }

    async fn unmount(&self) -> StoreResult<()> {
        (**self).unmount().await
    }

    async fn info(&self) -> StoreResult<StoreInfo> {
        (**self).info().await
    }
}

#[async_trait]
impl<S: FileStore + ?Sized> FileStore for std::sync::Arc<S> {
    async fn exists(&self, path: &str) -> bool {
        (**self).exists(path).await
    }

    async fn stat(&self, path: &str) -> StoreResult<DirEntry> {
        (**self).stat(path).await
    }

    async fn open(&self, path: &str, mode: OpenMode) -> StoreResult<Handle> {
        (**self).open(path, mode).await
    }

    async fn handle_kind(&self, handle: &Handle) -> StoreResult<EntryKind> {
        (**self).handle_kind(handle).await
    }

    async fn read(&self, handle: &Handle, offset: u64, size: usize) -> StoreResult<Bytes> {
        (**self).read(handle, offset, size).await
    }

    async fn write(&self, handle: &Handle, offset: u64, data: Bytes) -> StoreResult<usize> {
        (**self).write(handle, offset, data).await
    }

    async fn close(&self, handle: Handle) -> StoreResult<()> {
        (**self).close(handle).await
    }

    async fn mkdir(&self, path: &str) -> StoreResult<()> {
        (**self).mkdir(path).await
    }

    async fn rmdir(&self, path: &str) -> StoreResult<()> {
        (**self).rmdir(path).await
    }

    async fn remove(&self, path: &str) -> StoreResult<()> {
        (**self).remove(path).await
    }

    async fn rename(&self, from: &str, to: &str) -> StoreResult<()> {
        (**self).rename(from, to).await
    }

    async fn list_dir(&self, path: &str) -> StoreResult<Vec<DirEntry>> {
        (**self).list_dir(path).await
    }

    async fn format(&self) -> StoreResult<()> {
        (**self).format().await
    }

    async fn mount(&self) -> StoreResult<()> {
        (**self).mount().await
    }

    async fn unmount(&self) -> StoreResult<()> {
        (**self).unmount().await
    }

    async fn info(&self) -> StoreResult<StoreInfo> {
        (**self).info().await
    }
}
