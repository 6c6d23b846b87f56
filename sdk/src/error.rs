use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("not a directory: {0}")]
    NotDirectory(String),

    #[error("is a directory: {0}")]
    IsDirectory(String),

    #[error("directory not empty: {0}")]
    DirectoryNotEmpty(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid handle: {0}")]
    InvalidHandle(u64),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("too many open files (max: {max})")]
    TooManyOpenFiles { max: usize },

    #[error("no space left: {needed} bytes needed, {available} available")]
    NoSpace { needed: u64, available: u64 },

    #[error("file system not mounted")]
    NotMounted,

    #[error("internal error: {0}")]
    Internal(String),
}

impl StoreError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    #[must_use]
    pub fn is_not_mounted(&self) -> bool {
        matches!(self, Self::NotMounted)
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::TooManyOpenFiles { .. } | Self::NoSpace { .. })
    }

    #[must_use]
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    #[must_use]
    pub fn already_exists(path: impl Into<String>) -> Self {
        Self::AlreadyExists(path.into())
    }

    #[must_use]
    pub fn not_directory(path: impl Into<String>) -> Self {
        Self::NotDirectory(path.into())
    }

    #[must_use]
    pub fn is_directory(path: impl Into<String>) -> Self {
        Self::IsDirectory(path.into())
    }

    #[must_use]
    pub fn directory_not_empty(path: impl Into<String>) -> Self {
        Self::DirectoryNotEmpty(path.into())
    }

    #[must_use]
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument(reason.into())
    }

    #[must_use]
    pub fn invalid_handle(id: u64) -> Self {
        Self::InvalidHandle(id)
    }

    #[must_use]
    pub fn permission_denied(reason: impl Into<String>) -> Self {
        Self::PermissionDenied(reason.into())
    }

    #[must_use]
    pub fn internal(reason: impl Into<String>) -> Self {
        Self::Internal(reason.into())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
