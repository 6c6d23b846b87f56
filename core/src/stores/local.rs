use async_trait::async_trait;
use bytes::Bytes;
use lfsh_sdk::{
    DirEntry, EntryKind, FileStore, Handle, OpenMode, StoreError, StoreInfo, StoreResult,
};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use tracing::debug;

const MAX_OPEN_FILES: usize = 64;
const MAX_PATH_LENGTH: usize = 255;

#[derive(Debug)]
struct LocalHandle {
    file: Option<File>,
    path: PathBuf,
    mode: OpenMode,
}

/// A store rooted at a host directory. Paths never escape the root.
pub struct LocalStore {
    root: PathBuf,
    handles: RwLock<HashMap<u64, LocalHandle>>,
    next_handle: AtomicU64,
    mounted: AtomicBool,
}

fn poisoned<T>(_: PoisonError<T>) -> StoreError {
    StoreError::internal("local store lock poisoned")
}

impl LocalStore {
    pub fn new(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.exists() {
            return Err(StoreError::not_found(root.display().to_string()));
        }
        if !root.is_dir() {
            return Err(StoreError::not_directory(root.display().to_string()));
        }

        // Canonical root keeps `starts_with` checks reliable across symlinked prefixes.
        let root = root
            .canonicalize()
            .map_err(|e| StoreError::internal(format!("Failed to canonicalize root: {e}")))?;

        Ok(Self {
            root,
            handles: RwLock::new(HashMap::new()),
            next_handle: AtomicU64::new(1),
            mounted: AtomicBool::new(true),
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn ensure_mounted(&self) -> StoreResult<()> {
        if self.mounted.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::NotMounted)
        }
    }

    fn resolve_path(&self, path: &str) -> StoreResult<PathBuf> {
        let relative = path.trim_start_matches('/');
        if relative.split('/').any(|segment| segment == "..") {
            return Err(StoreError::permission_denied("path escapes root"));
        }
        let full_path = if relative.is_empty() {
            self.root.clone()
        } else {
            self.root.join(relative)
        };

        let canonical = full_path
            .canonicalize()
            .unwrap_or_else(|_| full_path.clone());
        if !canonical.starts_with(&self.root) {
            return Err(StoreError::permission_denied("path escapes root"));
        }

        Ok(full_path)
    }

    fn register(&self, file: Option<File>, path: PathBuf, mode: OpenMode) -> StoreResult<Handle> {
        let mut handles = self.handles.write().map_err(poisoned)?;
        if handles.len() >= MAX_OPEN_FILES {
            return Err(StoreError::TooManyOpenFiles {
                max: MAX_OPEN_FILES,
            });
        }
        let handle_id = self.next_handle.fetch_add(1, Ordering::SeqCst);
        handles.insert(handle_id, LocalHandle { file, path, mode });
        Ok(Handle::new(handle_id))
    }

    fn metadata_to_entry(name: String, meta: &fs::Metadata) -> DirEntry {
        if meta.is_dir() {
            DirEntry::directory(name)
        } else {
            DirEntry::file(name, meta.len())
        }
    }
}

#[async_trait]
impl FileStore for LocalStore {
    async fn exists(&self, path: &str) -> bool {
        self.ensure_mounted().is_ok()
            && self
                .resolve_path(path)
                .is_ok_and(|full_path| full_path.exists())
    }

    async fn stat(&self, path: &str) -> StoreResult<DirEntry> {
        self.ensure_mounted()?;
        let full_path = self.resolve_path(path)?;
        let meta = fs::metadata(&full_path).map_err(|e| map_io_error(e, path))?;
        let name = full_path
            .file_name()
            .map_or_else(|| "/".to_string(), |n| n.to_string_lossy().to_string());
        Ok(Self::metadata_to_entry(name, &meta))
    }

    async fn open(&self, path: &str, mode: OpenMode) -> StoreResult<Handle> {
        self.ensure_mounted()?;
        let full_path = self.resolve_path(path)?;

        match mode {
            OpenMode::Read => {
                let meta = fs::metadata(&full_path).map_err(|e| map_io_error(e, path))?;
                let file = if meta.is_dir() {
                    None
                } else {
                    Some(File::open(&full_path).map_err(|e| map_io_error(e, path))?)
                };
                self.register(file, full_path, mode)
            }
            OpenMode::Write => {
                if full_path.is_dir() {
                    return Err(StoreError::is_directory(path));
                }
                if let Some(parent) = full_path.parent() {
                    fs::create_dir_all(parent).map_err(|e| map_io_error(e, path))?;
                }
                let file = File::create(&full_path).map_err(|e| map_io_error(e, path))?;
                self.register(Some(file), full_path, mode)
            }
        }
    }

    async fn handle_kind(&self, handle: &Handle) -> StoreResult<EntryKind> {
        let handles = self.handles.read().map_err(poisoned)?;
        let local_handle = handles
            .get(&handle.id())
            .ok_or_else(|| StoreError::invalid_handle(handle.id()))?;
        Ok(if local_handle.file.is_some() {
            EntryKind::File
        } else {
            EntryKind::Directory
        })
    }

    async fn read(&self, handle: &Handle, offset: u64, size: usize) -> StoreResult<Bytes> {
        let mut handles = self.handles.write().map_err(poisoned)?;
        let local_handle = handles
            .get_mut(&handle.id())
            .ok_or_else(|| StoreError::invalid_handle(handle.id()))?;

        if local_handle.mode != OpenMode::Read {
            return Err(StoreError::permission_denied("file not opened for reading"));
        }
        let file = local_handle
            .file
            .as_mut()
            .ok_or_else(|| StoreError::is_directory(local_handle.path.display().to_string()))?;

        file.seek(SeekFrom::Start(offset))?;
        let mut buf = vec![0u8; size];
        let n = file.read(&mut buf)?;
        buf.truncate(n);

        Ok(Bytes::from(buf))
    }

    async fn write(&self, handle: &Handle, offset: u64, data: Bytes) -> StoreResult<usize> {
        let mut handles = self.handles.write().map_err(poisoned)?;
        let local_handle = handles
            .get_mut(&handle.id())
            .ok_or_else(|| StoreError::invalid_handle(handle.id()))?;

        if local_handle.mode != OpenMode::Write {
            return Err(StoreError::permission_denied("file not opened for writing"));
        }
        let file = local_handle
            .file
            .as_mut()
            .ok_or_else(|| StoreError::is_directory(local_handle.path.display().to_string()))?;

        file.seek(SeekFrom::Start(offset))?;
        file.write_all(&data)?;

        Ok(data.len())
    }

    async fn close(&self, handle: Handle) -> StoreResult<()> {
        let local_handle = self
            .handles
            .write()
            .map_err(poisoned)?
            .remove(&handle.id())
            .ok_or_else(|| StoreError::invalid_handle(handle.id()))?;

        if let (Some(file), OpenMode::Write) = (local_handle.file, local_handle.mode) {
            file.sync_all()?;
        }
        Ok(())
    }

    async fn mkdir(&self, path: &str) -> StoreResult<()> {
        self.ensure_mounted()?;
        let full_path = self.resolve_path(path)?;
        fs::create_dir(&full_path).map_err(|e| map_io_error(e, path))
    }

    async fn rmdir(&self, path: &str) -> StoreResult<()> {
        self.ensure_mounted()?;
        let full_path = self.resolve_path(path)?;
        if full_path == self.root {
            return Err(StoreError::permission_denied("cannot remove root"));
        }
        if !full_path.is_dir() {
            return Err(if full_path.exists() {
                StoreError::not_directory(path)
            } else {
                StoreError::not_found(path)
            });
        }
        fs::remove_dir(&full_path).map_err(|e| map_io_error(e, path))
    }

    async fn remove(&self, path: &str) -> StoreResult<()> {
        self.ensure_mounted()?;
        let full_path = self.resolve_path(path)?;
        if full_path == self.root {
            return Err(StoreError::permission_denied("cannot remove root"));
        }

        let meta = fs::symlink_metadata(&full_path).map_err(|e| map_io_error(e, path))?;
        if meta.is_dir() {
            fs::remove_dir(&full_path).map_err(|e| map_io_error(e, path))
        } else {
            fs::remove_file(&full_path).map_err(|e| map_io_error(e, path))
        }
    }

    async fn rename(&self, from: &str, to: &str) -> StoreResult<()> {
        self.ensure_mounted()?;
        let from_path = self.resolve_path(from)?;
        let to_path = self.resolve_path(to)?;
        if !from_path.exists() {
            return Err(StoreError::not_found(from));
        }
        if to_path.exists() {
            return Err(StoreError::already_exists(to));
        }
        if let Some(parent) = to_path.parent() {
            fs::create_dir_all(parent).map_err(|e| map_io_error(e, to))?;
        }
        fs::rename(&from_path, &to_path).map_err(|e| map_io_error(e, from))
    }

    async fn list_dir(&self, path: &str) -> StoreResult<Vec<DirEntry>> {
        self.ensure_mounted()?;
        let full_path = self.resolve_path(path)?;

        let mut results = Vec::new();
        for entry in fs::read_dir(&full_path).map_err(|e| map_io_error(e, path))? {
            let entry = entry?;
            let meta = entry.metadata()?;
            let name = entry.file_name().to_string_lossy().to_string();
            results.push(Self::metadata_to_entry(name, &meta));
        }

        results.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(results)
    }

    async fn format(&self) -> StoreResult<()> {
        self.handles.write().map_err(poisoned)?.clear();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                fs::remove_dir_all(entry.path())?;
            } else {
                fs::remove_file(entry.path())?;
            }
        }
        debug!(root = %self.root.display(), "local store formatted");
        Ok(())
    }

    async fn mount(&self) -> StoreResult<()> {
        if !self.root.is_dir() {
            return Err(StoreError::not_found(self.root.display().to_string()));
        }
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

        #[cfg(unix)]
        {
            use std::mem::MaybeUninit;
            use std::os::unix::ffi::OsStrExt;

            let path_cstr = std::ffi::CString::new(self.root.as_os_str().as_bytes())
                .map_err(|e| StoreError::internal(e.to_string()))?;

            let mut stat: MaybeUninit<libc::statvfs> = MaybeUninit::uninit();
            let result = unsafe { libc::statvfs(path_cstr.as_ptr(), stat.as_mut_ptr()) };

            if result != 0 {
                return Err(StoreError::internal("statvfs failed"));
            }

            let stat = unsafe { stat.assume_init() };
            let total_bytes = (stat.f_blocks as u64) * (stat.f_frsize as u64);
            let free_bytes = (stat.f_bavail as u64) * (stat.f_frsize as u64);
            Ok(StoreInfo {
                total_bytes,
                used_bytes: total_bytes.saturating_sub(free_bytes),
                block_size: stat.f_bsize as u32,
                page_size: stat.f_frsize as u32,
                max_open_files: MAX_OPEN_FILES,
                max_path_length: MAX_PATH_LENGTH,
            })
        }

        #[cfg(not(unix))]
        {
            Ok(StoreInfo {
                total_bytes: 0,
                used_bytes: 0,
                block_size: 4096,
                page_size: 4096,
                max_open_files: MAX_OPEN_FILES,
                max_path_length: MAX_PATH_LENGTH,
            })
        }
    }
}

fn map_io_error(err: std::io::Error, path: &str) -> StoreError {
    match err.kind() {
        std::io::ErrorKind::NotFound => StoreError::not_found(path),
        std::io::ErrorKind::PermissionDenied => StoreError::permission_denied(path),
        std::io::ErrorKind::AlreadyExists => StoreError::already_exists(path),
        std::io::ErrorKind::NotADirectory => StoreError::not_directory(path),
        std::io::ErrorKind::IsADirectory => StoreError::is_directory(path),
        std::io::ErrorKind::DirectoryNotEmpty => StoreError::directory_not_empty(path),
        _ => StoreError::internal(format!("{path}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, LocalStore) {
        let temp = TempDir::new().unwrap();
        let store = LocalStore::new(temp.path()).unwrap();
        (temp, store)
    }

    #[tokio::test]
    async fn create_and_read_file() {
        let (_temp, store) = setup();

        let handle = store.open("/test.txt", OpenMode::Write).await.unwrap();
        store.write(&handle, 0, Bytes::from("hello world")).await.unwrap();
        store.close(handle).await.unwrap();

        let handle = store.open("/test.txt", OpenMode::Read).await.unwrap();
        assert_eq!(store.handle_kind(&handle).await.unwrap(), EntryKind::File);
        let data = store.read(&handle, 0, 1024).await.unwrap();
        assert_eq!(&data[..], b"hello world");
        store.close(handle).await.unwrap();
    }

    #[tokio::test]
    async fn write_open_creates_parents() {
        let (temp, store) = setup();

        let handle = store.open("/a/b/c.txt", OpenMode::Write).await.unwrap();
        store.close(handle).await.unwrap();

        assert!(temp.path().join("a/b/c.txt").is_file());
    }

    #[tokio::test]
    async fn directory_handles() {
        let (_temp, store) = setup();
        store.mkdir("/dir").await.unwrap();

        let handle = store.open("/dir", OpenMode::Read).await.unwrap();
        assert_eq!(
            store.handle_kind(&handle).await.unwrap(),
            EntryKind::Directory
        );
        store.close(handle).await.unwrap();
    }

    #[tokio::test]
    async fn list_dir_contents() {
        let (_temp, store) = setup();

        store.mkdir("/dir").await.unwrap();
        for name in ["/dir/b.txt", "/dir/a.txt"] {
            let handle = store.open(name, OpenMode::Write).await.unwrap();
            store.close(handle).await.unwrap();
        }
        store.mkdir("/dir/sub").await.unwrap();

        let entries = store.list_dir("/dir").await.unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "sub"]);
        assert!(entries[2].is_dir());
    }

    #[tokio::test]
    async fn remove_and_rmdir() {
        let (_temp, store) = setup();

        let handle = store.open("/dir/f.txt", OpenMode::Write).await.unwrap();
        store.close(handle).await.unwrap();

        assert!(matches!(
            store.rmdir("/dir").await,
            Err(StoreError::DirectoryNotEmpty(_))
        ));
        store.remove("/dir/f.txt").await.unwrap();
        store.rmdir("/dir").await.unwrap();
        assert!(!store.exists("/dir").await);
    }

    #[tokio::test]
    async fn rename_file() {
        let (_temp, store) = setup();

        let handle = store.open("/old.txt", OpenMode::Write).await.unwrap();
        store.write(&handle, 0, Bytes::from("content")).await.unwrap();
        store.close(handle).await.unwrap();

        store.rename("/old.txt", "/moved/new.txt").await.unwrap();

        assert!(store.stat("/old.txt").await.is_err());
        assert_eq!(store.stat("/moved/new.txt").await.unwrap().size, 7);
    }

    #[tokio::test]
    async fn format_clears_root() {
        let (temp, store) = setup();
        store.mkdir("/dir").await.unwrap();
        let handle = store.open("/f.txt", OpenMode::Write).await.unwrap();
        store.close(handle).await.unwrap();

        store.format().await.unwrap();

        assert!(temp.path().exists());
        assert!(store.list_dir("/").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn info_works() {
        let (_temp, store) = setup();

        let info = store.info().await.unwrap();
        assert!(info.total_bytes > 0);
        assert!(info.block_size > 0);
    }

    #[tokio::test]
    async fn path_escape_blocked() {
        let (_temp, store) = setup();

        let result = store.stat("/../../../etc/passwd").await;
        assert!(matches!(result, Err(StoreError::PermissionDenied(_))));
    }
}
