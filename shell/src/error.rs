//! Error types for lfsh

use lfsh_sdk::StoreError;
use thiserror::Error;

/// Result type alias for shell operations
pub type ShellResult<T> = Result<T, ShellError>;

/// Everything a command can fail with. The `Display` text is the diagnostic
/// line the interactive loop prints.
#[derive(Error, Debug)]
pub enum ShellError {
    #[error("{command}: missing {argument} argument")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("{path} too long! Max {max} characters.")]
    PathTooLong { path: String, max: usize },

    #[error("{0} path does not exist!")]
    PathNotFound(String),

    #[error("{0} is not a directory!")]
    NotADirectory(String),

    #[error("{0} is not a file!")]
    NotAFile(String),

    #[error("{0} directory to delete must be under the work directory!")]
    ContainsWorkDir(String),

    #[error("{0} file already exists!")]
    AlreadyExists(String),

    #[error("{path} directory create failed: {source}")]
    CreateDir { path: String, source: StoreError },

    #[error("{path} directory delete failed: {source}")]
    RemoveDir { path: String, source: StoreError },

    #[error("{path} file delete failed: {source}")]
    Delete { path: String, source: StoreError },

    #[error("{from} file rename failed: {source}")]
    Rename {
        from: String,
        to: String,
        source: StoreError,
    },

    #[error("{path} file open failed: {source}")]
    Open { path: String, source: StoreError },

    #[error("{path} file read open failed: {source}")]
    ReadOpen { path: String, source: StoreError },

    #[error("{path} file write open failed: {source}")]
    WriteOpen { path: String, source: StoreError },

    #[error("{path} directory list failed: {source}")]
    List { path: String, source: StoreError },

    #[error("{path} file read failed: {source}")]
    Read { path: String, source: StoreError },

    #[error("{path} file write failed: {source}")]
    Write { path: String, source: StoreError },

    #[error("File system info failed: {0}")]
    Info(#[source] StoreError),

    #[error("Format failed: {0}")]
    Format(#[source] StoreError),

    #[error("Mount file system failed: {0}")]
    Mount(#[source] StoreError),

    #[error("Unmount failed: {0}")]
    Unmount(#[source] StoreError),

    /// Some entries of a batch failed; each failure was already reported.
    #[error("{command}: {failed} of the matching entries failed")]
    Partial { command: &'static str, failed: usize },

    #[error("No help for '{0}'")]
    NoHelp(String),

    #[error("Wrong command line instruction!")]
    UnknownCommand(String),

    /// Terminal failure; ends the interactive loop.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ShellError {
    /// Whether the underlying store refused the operation, as opposed to the
    /// command being rejected before any store call.
    #[must_use]
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            Self::CreateDir { source, .. }
            | Self::RemoveDir { source, .. }
            | Self::Delete { source, .. }
            | Self::Rename { source, .. }
            | Self::Open { source, .. }
            | Self::ReadOpen { source, .. }
            | Self::WriteOpen { source, .. }
            | Self::List { source, .. }
            | Self::Read { source, .. }
            | Self::Write { source, .. } => Some(source),
            Self::Info(source) | Self::Format(source) | Self::Mount(source) | Self::Unmount(source) => {
                Some(source)
            }
            _ => None,
        }
    }

    /// Batch failures are reported entry by entry while the batch runs.
    #[must_use]
    pub const fn already_reported(&self) -> bool {
        matches!(self, Self::Partial { .. })
    }

    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
