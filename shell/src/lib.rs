//! lfsh - command-line file manager for small flash file stores
//!
//! This crate provides:
//! - A raw-byte line editor with backspace handling and arrow-key history recall
//! - A quoting tokenizer and a working-directory-relative path resolver
//! - `?`/`*` filename patterns for `dir`, `del` and `copy`
//! - A fixed command table driving any [`lfsh_sdk::FileStore`]
//! - Terminal transports for host consoles and for tests

pub mod commands;
pub mod editor;
pub mod error;
pub mod help;
pub mod history;
pub mod path;
pub mod pattern;
pub mod session;
pub mod shell;
pub mod stream;
pub mod terminal;
pub mod tokenizer;

pub use editor::{LineEditor, LineEvent};
pub use error::{ShellError, ShellResult};
pub use history::{Direction, History, HISTORY_CAPACITY};
pub use path::{resolve, Requirement, ResolvedPath};
pub use pattern::matches;
pub use session::Session;
pub use shell::{Shell, ShellBuilder};
pub use stream::{InputHandle, MemoryStream, OutputBuffer, StdioStream};
pub use terminal::Terminal;
pub use tokenizer::{tokenize, Args, MAX_ARGS};
