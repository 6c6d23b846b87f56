#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntryKind {
    File,
    Directory,
}

/// One directory entry as reported by [`crate::FileStore::list_dir`] and
/// [`crate::FileStore::stat`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DirEntry {
    /// Final path component, without any leading directory.
    pub name: String,
    pub kind: EntryKind,
    /// Size in bytes; always 0 for directories.
    pub size: u64,
}

impl DirEntry {
    #[must_use]
    pub fn file(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
            size,
        }
    }

    #[must_use]
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
            size: 0,
        }
    }

    #[must_use]
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StoreInfo {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub block_size: u32,
    pub page_size: u32,
    pub max_open_files: usize,
    pub max_path_length: usize,
}

impl StoreInfo {
    #[must_use]
    pub fn free_bytes(&self) -> u64 {
        self.total_bytes.saturating_sub(self.used_bytes)
    }

    #[must_use]
    pub fn usage_percent(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        (self.used_bytes as f64 / self.total_bytes as f64) * 100.0
    }
}

/// How a path is opened. `Write` creates the file when missing and
/// truncates it otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OpenMode {
    Read,
    Write,
}

impl OpenMode {
    #[must_use]
    pub fn is_write(self) -> bool {
        self == Self::Write
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Handle(pub u64);

impl Handle {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn id(&self) -> u64 {
        self.0
    }
}

impl From<u64> for Handle {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_entry_kind_checks() {
        let file = DirEntry::file("a.txt", 12);
        assert!(file.is_file());
        assert!(!file.is_dir());
        assert_eq!(file.size, 12);

        let dir = DirEntry::directory("docs");
        assert!(dir.is_dir());
        assert_eq!(dir.size, 0);
    }

    #[test]
    fn store_info_calculations() {
        let info = StoreInfo {
            total_bytes: 1000,
            used_bytes: 250,
            block_size: 4096,
            page_size: 256,
            max_open_files: 5,
            max_path_length: 32,
        };
        assert_eq!(info.free_bytes(), 750);
        assert!((info.usage_percent() - 25.0).abs() < 0.001);

        let empty = StoreInfo {
            total_bytes: 0,
            used_bytes: 0,
            ..info
        };
        assert!((empty.usage_percent() - 0.0).abs() < 0.001);
    }

    #[test]
    fn handle_conversions() {
        let handle = Handle::new(42);
        assert_eq!(handle.id(), 42);

        let from_u64: Handle = 7u64.into();
        assert_eq!(from_u64, Handle(7));
    }
}
