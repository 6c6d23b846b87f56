use async_trait::async_trait;
use bytes::Bytes;
use lfsh_sdk::{
    DirEntry, EntryKind, FileStore, Handle, OpenMode, StoreError, StoreInfo, StoreResult,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use tracing::debug;

/// Geometry and limits of a [`MemoryStore`]. The defaults describe a
/// 1.375 MiB flash partition as found on small microcontroller boards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryStoreOptions {
    pub capacity: u64,
    pub block_size: u32,
    pub page_size: u32,
    pub max_open_files: usize,
    pub max_path_length: usize,
    /// Remove directories that become empty after a `remove`, `rmdir` or
    /// `rename` takes their last child away.
    pub prune_empty_parents: bool,
}

impl Default for MemoryStoreOptions {
    fn default() -> Self {
        Self {
            capacity: 0x16_0000,
            block_size: 4096,
            page_size: 256,
            max_open_files: 10,
            max_path_length: 32,
            prune_empty_parents: true,
        }
    }
}

#[derive(Debug, Clone)]
enum MemEntry {
    File(Vec<u8>),
    Dir,
}

impl MemEntry {
    fn kind(&self) -> EntryKind {
        match self {
            Self::File(_) => EntryKind::File,
            Self::Dir => EntryKind::Directory,
        }
    }

    fn size(&self) -> u64 {
        match self {
            Self::File(content) => content.len() as u64,
            Self::Dir => 0,
        }
    }

    fn blocks(&self, block_size: u64) -> u64 {
        match self {
            Self::File(content) => (content.len() as u64).div_ceil(block_size),
            // A directory is a metadata pair.
            Self::Dir => 2,
        }
    }

    fn to_dir_entry(&self, path: &str) -> DirEntry {
        DirEntry {
            name: file_name(path).to_string(),
            kind: self.kind(),
            size: self.size(),
        }
    }
}

#[derive(Debug)]
struct OpenHandle {
    path: String,
    mode: OpenMode,
}

/// A flash-like file store kept in memory.
///
/// Mirrors the behaviour of small embedded file systems: a fixed capacity
/// accounted in blocks, a cap on simultaneously open files, a short path
/// limit, an explicit mount state, and parent directories created on demand
/// when a file is opened for writing.
pub struct MemoryStore {
    options: MemoryStoreOptions,
    entries: RwLock<BTreeMap<String, MemEntry>>,
    handles: RwLock<HashMap<u64, OpenHandle>>,
    next_handle: AtomicU64,
    mounted: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: PoisonError<T>) -> StoreError {
    StoreError::internal("memory store lock poisoned")
}

fn normalize_path(path: &str) -> String {
    let path = if path.is_empty() { "/" } else { path };
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };
    if path.len() > 1 && path.ends_with('/') {
        path.trim_end_matches('/').to_string()
    } else {
        path
    }
}

fn parent_path(path: &str) -> Option<String> {
    if path == "/" {
        return None;
    }
    match path.rfind('/') {
        Some(0) | None => Some("/".to_string()),
        Some(idx) => Some(path[..idx].to_string()),
    }
}

fn file_name(path: &str) -> &str {
    if path == "/" {
        return "/";
    }
    path.rsplit('/').next().unwrap_or(path)
}

fn child_prefix(path: &str) -> String {
    if path == "/" {
        "/".to_string()
    } else {
        format!("{path}/")
    }
}

fn has_children(entries: &BTreeMap<String, MemEntry>, path: &str) -> bool {
    let prefix = child_prefix(path);
    entries
        .range(prefix.clone()..)
        .next()
        .is_some_and(|(k, _)| k.starts_with(&prefix))
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(MemoryStoreOptions::default())
    }

    #[must_use]
    pub fn with_options(options: MemoryStoreOptions) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert("/".to_string(), MemEntry::Dir);
        Self {
            options,
            entries: RwLock::new(entries),
            handles: RwLock::new(HashMap::new()),
            next_handle: AtomicU64::new(1),
            mounted: AtomicBool::new(true),
        }
    }

    #[must_use]
    pub const fn options(&self) -> &MemoryStoreOptions {
        &self.options
    }

    /// Number of handles currently open.
    pub fn open_handles(&self) -> StoreResult<usize> {
        Ok(self.handles.read().map_err(poisoned)?.len())
    }

    fn ensure_mounted(&self) -> StoreResult<()> {
        if self.mounted.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::NotMounted)
        }
    }

    fn check_path(&self, path: &str) -> StoreResult<String> {
        let path = normalize_path(path);
        if path.chars().count() > self.options.max_path_length {
            return Err(StoreError::invalid_argument(format!(
                "path longer than {} characters: {path}",
                self.options.max_path_length
            )));
        }
        Ok(path)
    }

    fn used_blocks(&self, entries: &BTreeMap<String, MemEntry>) -> u64 {
        let block_size = u64::from(self.options.block_size);
        entries.values().map(|e| e.blocks(block_size)).sum()
    }

    fn total_blocks(&self) -> u64 {
        self.options.capacity / u64::from(self.options.block_size)
    }

    fn reserve_blocks(
        &self,
        entries: &BTreeMap<String, MemEntry>,
        released: u64,
        wanted: u64,
    ) -> StoreResult<()> {
        let used = self.used_blocks(entries).saturating_sub(released);
        let total = self.total_blocks();
        if used + wanted > total {
            let block_size = u64::from(self.options.block_size);
            return Err(StoreError::NoSpace {
                needed: wanted * block_size,
                available: total.saturating_sub(used) * block_size,
            });
        }
        Ok(())
    }

    /// Creates every missing directory on the way to `path`, excluding
    /// `path` itself.
    fn create_parents(
        &self,
        entries: &mut BTreeMap<String, MemEntry>,
        path: &str,
    ) -> StoreResult<()> {
        let mut missing = Vec::new();
        let mut current = parent_path(path);
        while let Some(dir) = current {
            match entries.get(&dir) {
                Some(MemEntry::Dir) => break,
                Some(MemEntry::File(_)) => return Err(StoreError::not_directory(dir)),
                None => {
                    current = parent_path(&dir);
                    missing.push(dir);
                }
            }
        }
        self.reserve_blocks(entries, 0, 2 * missing.len() as u64)?;
        for dir in missing {
            debug!(path = %dir, "creating parent directory");
            entries.insert(dir, MemEntry::Dir);
        }
        Ok(())
    }

    fn prune_parents(&self, entries: &mut BTreeMap<String, MemEntry>, path: &str) {
        if !self.options.prune_empty_parents {
            return;
        }
        let mut current = parent_path(path);
        while let Some(dir) = current {
            if dir == "/" || has_children(entries, &dir) {
                break;
            }
            debug!(path = %dir, "pruning empty directory");
            entries.remove(&dir);
            current = parent_path(&dir);
        }
    }
}

#[async_trait]
impl FileStore for MemoryStore {
    async fn exists(&self, path: &str) -> bool {
        if self.ensure_mounted().is_err() {
            return false;
        }
        let path = normalize_path(path);
        self.entries
            .read()
            .is_ok_and(|entries| entries.contains_key(&path))
    }

    async fn stat(&self, path: &str) -> StoreResult<DirEntry> {
        self.ensure_mounted()?;
        let path = normalize_path(path);
        let entries = self.entries.read().map_err(poisoned)?;
        entries
            .get(&path)
            .map(|e| e.to_dir_entry(&path))
            .ok_or_else(|| StoreError::not_found(&path))
    }

    async fn open(&self, path: &str, mode: OpenMode) -> StoreResult<Handle> {
        self.ensure_mounted()?;
        let path = self.check_path(path)?;

        if self.open_handles()? >= self.options.max_open_files {
            return Err(StoreError::TooManyOpenFiles {
                max: self.options.max_open_files,
            });
        }

        {
            let mut entries = self.entries.write().map_err(poisoned)?;
            match (mode, entries.get(&path)) {
                (OpenMode::Read, None) => return Err(StoreError::not_found(&path)),
                (OpenMode::Read, Some(_)) => {}
                (OpenMode::Write, Some(MemEntry::Dir)) => {
                    return Err(StoreError::is_directory(&path))
                }
                (OpenMode::Write, Some(MemEntry::File(_))) => {
                    entries.insert(path.clone(), MemEntry::File(Vec::new()));
                }
                (OpenMode::Write, None) => {
                    self.create_parents(&mut entries, &path)?;
                    entries.insert(path.clone(), MemEntry::File(Vec::new()));
                }
            }
        }

        let handle_id = self.next_handle.fetch_add(1, Ordering::SeqCst);
        self.handles
            .write()
            .map_err(poisoned)?
            .insert(handle_id, OpenHandle { path, mode });
        Ok(Handle::new(handle_id))
    }

    async fn handle_kind(&self, handle: &Handle) -> StoreResult<EntryKind> {
        let handles = self.handles.read().map_err(poisoned)?;
        let open_handle = handles
            .get(&handle.id())
            .ok_or_else(|| StoreError::invalid_handle(handle.id()))?;
        let entries = self.entries.read().map_err(poisoned)?;
        entries
            .get(&open_handle.path)
            .map(MemEntry::kind)
            .ok_or_else(|| StoreError::not_found(&open_handle.path))
    }

    async fn read(&self, handle: &Handle, offset: u64, size: usize) -> StoreResult<Bytes> {
        self.ensure_mounted()?;
        let handles = self.handles.read().map_err(poisoned)?;
        let open_handle = handles
            .get(&handle.id())
            .ok_or_else(|| StoreError::invalid_handle(handle.id()))?;

        if open_handle.mode != OpenMode::Read {
            return Err(StoreError::permission_denied("file not opened for reading"));
        }

        let entries = self.entries.read().map_err(poisoned)?;
        match entries.get(&open_handle.path) {
            Some(MemEntry::File(content)) => {
                let start = usize::try_from(offset)
                    .unwrap_or(usize::MAX)
                    .min(content.len());
                let end = start.saturating_add(size).min(content.len());
                Ok(Bytes::copy_from_slice(&content[start..end]))
            }
            Some(MemEntry::Dir) => Err(StoreError::is_directory(&open_handle.path)),
            None => Err(StoreError::not_found(&open_handle.path)),
        }
    }

    async fn write(&self, handle: &Handle, offset: u64, data: Bytes) -> StoreResult<usize> {
        self.ensure_mounted()?;
        let path = {
            let handles = self.handles.read().map_err(poisoned)?;
            let open_handle = handles
                .get(&handle.id())
                .ok_or_else(|| StoreError::invalid_handle(handle.id()))?;
            if open_handle.mode != OpenMode::Write {
                return Err(StoreError::permission_denied("file not opened for writing"));
            }
            open_handle.path.clone()
        };

        let offset = usize::try_from(offset)
            .map_err(|_| StoreError::invalid_argument("offset out of range"))?;
        let block_size = u64::from(self.options.block_size);
        let mut entries = self.entries.write().map_err(poisoned)?;
        let (old_blocks, new_len) = match entries.get(&path) {
            Some(MemEntry::File(content)) => {
                let new_len = content.len().max(offset + data.len());
                ((content.len() as u64).div_ceil(block_size), new_len)
            }
            Some(MemEntry::Dir) => return Err(StoreError::is_directory(&path)),
            None => return Err(StoreError::not_found(&path)),
        };
        self.reserve_blocks(&entries, old_blocks, (new_len as u64).div_ceil(block_size))?;

        if let Some(MemEntry::File(content)) = entries.get_mut(&path) {
            if content.len() < new_len {
                content.resize(new_len, 0);
            }
            content[offset..offset + data.len()].copy_from_slice(&data);
        }
        Ok(data.len())
    }

    async fn close(&self, handle: Handle) -> StoreResult<()> {
        self.handles
            .write()
            .map_err(poisoned)?
            .remove(&handle.id())
            .ok_or_else(|| StoreError::invalid_handle(handle.id()))?;
        Ok(())
    }

    async fn mkdir(&self, path: &str) -> StoreResult<()> {
        self.ensure_mounted()?;
        let path = self.check_path(path)?;
        let mut entries = self.entries.write().map_err(poisoned)?;

        if entries.contains_key(&path) {
            return Err(StoreError::already_exists(&path));
        }
        let parent = parent_path(&path)
            .ok_or_else(|| StoreError::invalid_argument("cannot create directory at root"))?;
        match entries.get(&parent) {
            Some(MemEntry::Dir) => {}
            Some(MemEntry::File(_)) => return Err(StoreError::not_directory(&parent)),
            None => return Err(StoreError::not_found(&parent)),
        }
        self.reserve_blocks(&entries, 0, 2)?;
        entries.insert(path, MemEntry::Dir);
        Ok(())
    }

    async fn rmdir(&self, path: &str) -> StoreResult<()> {
        self.ensure_mounted()?;
        let path = normalize_path(path);
        if path == "/" {
            return Err(StoreError::permission_denied("cannot remove root"));
        }

        let mut entries = self.entries.write().map_err(poisoned)?;
        match entries.get(&path) {
            Some(MemEntry::Dir) => {}
            Some(MemEntry::File(_)) => return Err(StoreError::not_directory(&path)),
            None => return Err(StoreError::not_found(&path)),
        }
        if has_children(&entries, &path) {
            return Err(StoreError::directory_not_empty(&path));
        }
        entries.remove(&path);
        self.prune_parents(&mut entries, &path);
        Ok(())
    }

    async fn remove(&self, path: &str) -> StoreResult<()> {
        self.ensure_mounted()?;
        let path = normalize_path(path);
        if path == "/" {
            return Err(StoreError::permission_denied("cannot remove root"));
        }

        let mut entries = self.entries.write().map_err(poisoned)?;
        let entry = entries
            .get(&path)
            .ok_or_else(|| StoreError::not_found(&path))?;
        if matches!(entry, MemEntry::Dir) && has_children(&entries, &path) {
            return Err(StoreError::directory_not_empty(&path));
        }
        entries.remove(&path);
        self.prune_parents(&mut entries, &path);
        Ok(())
    }

    async fn rename(&self, from: &str, to: &str) -> StoreResult<()> {
        self.ensure_mounted()?;
        let from = normalize_path(from);
        let to = self.check_path(to)?;
        if from == "/" || to == "/" {
            return Err(StoreError::permission_denied("cannot rename root"));
        }
        if to.starts_with(&child_prefix(&from)) {
            return Err(StoreError::invalid_argument(format!(
                "cannot move {from} into itself"
            )));
        }

        let prefix = child_prefix(&from);
        {
            let mut entries = self.entries.write().map_err(poisoned)?;
            if !entries.contains_key(&from) {
                return Err(StoreError::not_found(&from));
            }
            if entries.contains_key(&to) {
                return Err(StoreError::already_exists(&to));
            }
            self.create_parents(&mut entries, &to)?;

            let moved: Vec<String> = entries
                .keys()
                .filter(|k| **k == from || k.starts_with(&prefix))
                .cloned()
                .collect();
            for old in moved {
                if let Some(entry) = entries.remove(&old) {
                    entries.insert(format!("{to}{}", &old[from.len()..]), entry);
                }
            }
            self.prune_parents(&mut entries, &from);
        }

        let mut handles = self.handles.write().map_err(poisoned)?;
        for open_handle in handles.values_mut() {
            if open_handle.path == from || open_handle.path.starts_with(&prefix) {
                open_handle.path = format!("{to}{}", &open_handle.path[from.len()..]);
            }
        }
        Ok(())
    }

    async fn list_dir(&self, path: &str) -> StoreResult<Vec<DirEntry>> {
        self.ensure_mounted()?;
        let path = normalize_path(path);
        let entries = self.entries.read().map_err(poisoned)?;

        match entries.get(&path) {
            Some(MemEntry::Dir) => {}
            Some(MemEntry::File(_)) => return Err(StoreError::not_directory(&path)),
            None => return Err(StoreError::not_found(&path)),
        }

        let prefix = child_prefix(&path);
        let mut results: Vec<DirEntry> = entries
            .range(prefix.clone()..)
            .take_while(|(k, _)| k.starts_with(&prefix))
            .filter(|(k, _)| k.len() > prefix.len() && !k[prefix.len()..].contains('/'))
            .map(|(k, e)| e.to_dir_entry(k))
            .collect();
        results.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(results)
    }

    async fn format(&self) -> StoreResult<()> {
        self.handles.write().map_err(poisoned)?.clear();
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.clear();
        entries.insert("/".to_string(), MemEntry::Dir);
        debug!("memory store formatted");
        Ok(())
    }

    async fn mount(&self) -> StoreResult<()> {
        self.mounted.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn unmount(&self) -> StoreResult<()> {
        self.mounted.store(false, Ordering::SeqCst);
        self.handles.write().map_err(poisoned)?.clear();
        Ok(())
    }

    async fn info(&self) -> StoreResult<StoreInfo> {
        self.ensure_mounted()?;
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(StoreInfo {
            total_bytes: self.total_blocks() * u64::from(self.options.block_size),
            used_bytes: self.used_blocks(&entries) * u64::from(self.options.block_size),
            block_size: self.options.block_size,
            page_size: self.options.page_size,
            max_open_files: self.options.max_open_files,
            max_path_length: self.options.max_path_length,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn write_file(store: &MemoryStore, path: &str, data: &'static [u8]) {
        let handle = store.open(path, OpenMode::Write).await.unwrap();
        store.write(&handle, 0, Bytes::from_static(data)).await.unwrap();
        store.close(handle).await.unwrap();
    }

    async fn read_file(store: &MemoryStore, path: &str) -> Bytes {
        let handle = store.open(path, OpenMode::Read).await.unwrap();
        let data = store.read(&handle, 0, 1024).await.unwrap();
        store.close(handle).await.unwrap();
        data
    }

    #[tokio::test]
    async fn create_and_read_file() {
        let store = MemoryStore::new();
        write_file(&store, "/test.txt", b"hello world").await;

        assert_eq!(&read_file(&store, "/test.txt").await[..], b"hello world");
        assert_eq!(store.open_handles().unwrap(), 0);
    }

    #[tokio::test]
    async fn write_open_truncates_and_creates_parents() {
        let store = MemoryStore::new();
        write_file(&store, "/a/b/c.txt", b"long content").await;
        write_file(&store, "/a/b/c.txt", b"short").await;

        assert_eq!(&read_file(&store, "/a/b/c.txt").await[..], b"short");
        assert!(store.stat("/a").await.unwrap().is_dir());
        assert!(store.stat("/a/b").await.unwrap().is_dir());
    }

    #[tokio::test]
    async fn mkdir_requires_parent() {
        let store = MemoryStore::new();
        let result = store.mkdir("/missing/child").await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));

        store.mkdir("/docs").await.unwrap();
        assert!(matches!(
            store.mkdir("/docs").await,
            Err(StoreError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn list_dir_sorted_by_name() {
        let store = MemoryStore::new();
        store.mkdir("/docs").await.unwrap();
        write_file(&store, "/docs/b.txt", b"bb").await;
        write_file(&store, "/docs/a.txt", b"a").await;
        store.mkdir("/docs/sub").await.unwrap();
        write_file(&store, "/docs/sub/deep.txt", b"x").await;

        let entries = store.list_dir("/docs").await.unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "sub"]);
        assert_eq!(entries[1].size, 2);
        assert!(entries[2].is_dir());
    }

    #[tokio::test]
    async fn remove_prunes_empty_parents() {
        let store = MemoryStore::new();
        write_file(&store, "/a/b/only.txt", b"x").await;
        write_file(&store, "/a/keep.txt", b"y").await;

        store.remove("/a/b/only.txt").await.unwrap();
        assert!(!store.exists("/a/b").await);
        assert!(store.exists("/a").await);
    }

    #[tokio::test]
    async fn pruning_can_be_disabled() {
        let store = MemoryStore::with_options(MemoryStoreOptions {
            prune_empty_parents: false,
            ..MemoryStoreOptions::default()
        });
        write_file(&store, "/a/only.txt", b"x").await;
        store.remove("/a/only.txt").await.unwrap();
        assert!(store.exists("/a").await);
    }

    #[tokio::test]
    async fn rmdir_refuses_non_empty() {
        let store = MemoryStore::new();
        write_file(&store, "/dir/file.txt", b"x").await;

        assert!(matches!(
            store.rmdir("/dir").await,
            Err(StoreError::DirectoryNotEmpty(_))
        ));
        assert!(matches!(
            store.rmdir("/dir/file.txt").await,
            Err(StoreError::NotDirectory(_))
        ));
    }

    #[tokio::test]
    async fn rename_moves_subtree() {
        let store = MemoryStore::new();
        write_file(&store, "/src/one.txt", b"1").await;
        write_file(&store, "/src/inner/two.txt", b"2").await;

        store.rename("/src", "/dst/moved").await.unwrap();

        assert!(!store.exists("/src").await);
        assert_eq!(&read_file(&store, "/dst/moved/one.txt").await[..], b"1");
        assert_eq!(&read_file(&store, "/dst/moved/inner/two.txt").await[..], b"2");
    }

    #[tokio::test]
    async fn rename_refuses_existing_target() {
        let store = MemoryStore::new();
        write_file(&store, "/a.txt", b"a").await;
        write_file(&store, "/b.txt", b"b").await;

        assert!(matches!(
            store.rename("/a.txt", "/b.txt").await,
            Err(StoreError::AlreadyExists(_))
        ));
        assert_eq!(&read_file(&store, "/b.txt").await[..], b"b");
    }

    #[tokio::test]
    async fn open_file_limit_is_enforced() {
        let store = MemoryStore::with_options(MemoryStoreOptions {
            max_open_files: 2,
            ..MemoryStoreOptions::default()
        });
        write_file(&store, "/f.txt", b"x").await;

        let h1 = store.open("/f.txt", OpenMode::Read).await.unwrap();
        let h2 = store.open("/f.txt", OpenMode::Read).await.unwrap();
        assert!(matches!(
            store.open("/f.txt", OpenMode::Read).await,
            Err(StoreError::TooManyOpenFiles { max: 2 })
        ));
        store.close(h1).await.unwrap();
        store.close(h2).await.unwrap();
    }

    #[tokio::test]
    async fn long_paths_are_rejected() {
        let store = MemoryStore::new();
        let long = format!("/{}", "x".repeat(40));
        assert!(matches!(
            store.open(&long, OpenMode::Write).await,
            Err(StoreError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn capacity_is_enforced() {
        let store = MemoryStore::with_options(MemoryStoreOptions {
            capacity: 4 * 4096,
            ..MemoryStoreOptions::default()
        });
        let handle = store.open("/big.bin", OpenMode::Write).await.unwrap();
        let result = store
            .write(&handle, 0, Bytes::from(vec![0u8; 3 * 4096]))
            .await;
        assert!(matches!(result, Err(StoreError::NoSpace { .. })));
        store.close(handle).await.unwrap();
    }

    #[tokio::test]
    async fn unmounted_store_refuses_operations() {
        let store = MemoryStore::new();
        write_file(&store, "/f.txt", b"x").await;
        store.unmount().await.unwrap();

        assert!(!store.exists("/f.txt").await);
        assert!(matches!(store.info().await, Err(StoreError::NotMounted)));

        store.mount().await.unwrap();
        assert!(store.exists("/f.txt").await);
    }

    #[tokio::test]
    async fn format_erases_everything() {
        let store = MemoryStore::new();
        write_file(&store, "/docs/a.txt", b"abc").await;
        store.format().await.unwrap();

        assert!(store.list_dir("/").await.unwrap().is_empty());
        let info = store.info().await.unwrap();
        assert_eq!(info.used_bytes, 2 * 4096);
    }

    #[tokio::test]
    async fn directory_handles_report_kind() {
        let store = MemoryStore::new();
        store.mkdir("/docs").await.unwrap();

        let handle = store.open("/docs", OpenMode::Read).await.unwrap();
        assert_eq!(store.handle_kind(&handle).await.unwrap(), EntryKind::Directory);
        assert!(matches!(
            store.read(&handle, 0, 10).await,
            Err(StoreError::IsDirectory(_))
        ));
        store.close(handle).await.unwrap();
    }
}
