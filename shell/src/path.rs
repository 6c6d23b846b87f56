//! Path resolution against the working directory.
//!
//! Every path argument goes through [`resolve`]: a trailing `?`/`*` segment
//! is split off as a pattern, the rest is made absolute and normalized, the
//! length limit is enforced, and finally the store is consulted when the
//! caller needs a directory or a file.

use lfsh_sdk::{EntryKind, FileStore, OpenMode};
use tracing::warn;

use crate::error::{ShellError, ShellResult};
use crate::session::Session;

/// What the caller needs the path to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Anything, including a path that does not exist yet.
    Any,
    Directory,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Absolute, normalized path without the pattern segment.
    pub path: String,
    pub pattern: Option<String>,
}

pub async fn resolve<S: FileStore + ?Sized>(
    session: &mut Session,
    store: &S,
    raw: &str,
    requirement: Requirement,
) -> ShellResult<ResolvedPath> {
    let (dir_part, pattern) = split_pattern(raw);
    session.set_pattern(pattern.clone());

    let path = absolutize(session.work_dir(), strip_trailing_slash(dir_part));

    let max = session.max_path_length();
    if path.chars().count() > max {
        return Err(ShellError::PathTooLong { path, max });
    }

    if requirement != Requirement::Any {
        check_kind(store, &path, requirement).await?;
    }

    Ok(ResolvedPath { path, pattern })
}

/// Splits off the trailing segment when the first `?` or the first `*` sits
/// after the last `/`.
fn split_pattern(raw: &str) -> (&str, Option<String>) {
    let tail_start = raw.rfind('/').map_or(0, |slash| slash + 1);
    let after_tail = |index: Option<usize>| index.is_some_and(|i| i >= tail_start);

    if after_tail(raw.find('?')) || after_tail(raw.find('*')) {
        (&raw[..tail_start], Some(raw[tail_start..].to_string()))
    } else {
        (raw, None)
    }
}

fn strip_trailing_slash(path: &str) -> &str {
    match path {
        "/" | "./" | "../" => path,
        _ => path.strip_suffix('/').unwrap_or(path),
    }
}

fn absolutize(work_dir: &str, path: &str) -> String {
    if path.is_empty() {
        return work_dir.to_string();
    }

    let joined = if let Some(rest) = path.strip_prefix("./") {
        join(work_dir, rest)
    } else if let Some(rest) = path.strip_prefix("../") {
        join(&parent_dir(work_dir), rest)
    } else if path.starts_with('/') {
        path.to_string()
    } else {
        join(work_dir, path)
    };

    normalize(&joined)
}

async fn check_kind<S: FileStore + ?Sized>(
    store: &S,
    path: &str,
    requirement: Requirement,
) -> ShellResult<()> {
    if !store.exists(path).await {
        return Err(ShellError::PathNotFound(path.to_string()));
    }

    let handle = store
        .open(path, OpenMode::Read)
        .await
        .map_err(|source| ShellError::Open {
            path: path.to_string(),
            source,
        })?;
    let kind = store.handle_kind(&handle).await;
    if let Err(e) = store.close(handle).await {
        warn!(path, error = %e, "failed to close probe handle");
    }
    let kind = kind.map_err(|source| ShellError::Open {
        path: path.to_string(),
        source,
    })?;

    match (requirement, kind) {
        (Requirement::Directory, EntryKind::File) => {
            Err(ShellError::NotADirectory(path.to_string()))
        }
        (Requirement::File, EntryKind::Directory) => Err(ShellError::NotAFile(path.to_string())),
        _ => Ok(()),
    }
}

/// Collapses empty, `.` and `..` segments. `..` never climbs above `/`.
pub fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    format!("/{}", segments.join("/"))
}

/// Everything before the last `/`, or `/` for top-level entries.
pub fn parent_dir(path: &str) -> String {
    match path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(i) => path[..i].to_string(),
    }
}

pub fn join(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}

/// Whether `path` is `ancestor` or lies below it, comparing whole segments.
pub fn is_within(path: &str, ancestor: &str) -> bool {
    if ancestor == "/" || path == ancestor {
        return true;
    }
    path.strip_prefix(ancestor)
        .is_some_and(|rest| rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use lfsh_core::MemoryStore;

    use super::*;

    async fn store_with_docs() -> MemoryStore {
        let store = MemoryStore::new();
        store.mkdir("/docs").await.unwrap();
        let handle = store.open("/docs/a.txt", OpenMode::Write).await.unwrap();
        store.write(&handle, 0, Bytes::from_static(b"hi")).await.unwrap();
        store.close(handle).await.unwrap();
        store
    }

    async fn resolve_any(session: &mut Session, raw: &str) -> ShellResult<ResolvedPath> {
        resolve(session, &MemoryStore::new(), raw, Requirement::Any).await
    }

    #[tokio::test]
    async fn relative_paths_join_work_dir() {
        let mut session = Session::new();
        session.set_work_dir("/docs");

        assert_eq!(resolve_any(&mut session, "").await.unwrap().path, "/docs");
        assert_eq!(resolve_any(&mut session, "a.txt").await.unwrap().path, "/docs/a.txt");
        assert_eq!(resolve_any(&mut session, "./a.txt").await.unwrap().path, "/docs/a.txt");
        assert_eq!(resolve_any(&mut session, "./").await.unwrap().path, "/docs");
        assert_eq!(resolve_any(&mut session, "/x/").await.unwrap().path, "/x");
        assert_eq!(resolve_any(&mut session, "/").await.unwrap().path, "/");
    }

    #[tokio::test]
    async fn parent_references_climb() {
        let mut session = Session::new();
        session.set_work_dir("/a/b");

        assert_eq!(resolve_any(&mut session, "..").await.unwrap().path, "/a");
        assert_eq!(resolve_any(&mut session, "../").await.unwrap().path, "/a");
        assert_eq!(resolve_any(&mut session, "../c").await.unwrap().path, "/a/c");
        assert_eq!(resolve_any(&mut session, "../../../x").await.unwrap().path, "/x");
    }

    #[tokio::test]
    async fn trailing_pattern_is_split_off() {
        let mut session = Session::new();

        let resolved = resolve_any(&mut session, "docs/*.txt").await.unwrap();
        assert_eq!(resolved.path, "/docs");
        assert_eq!(resolved.pattern.as_deref(), Some("*.txt"));
        assert_eq!(session.pattern(), Some("*.txt"));

        let resolved = resolve_any(&mut session, "file.???").await.unwrap();
        assert_eq!(resolved.path, "/");
        assert_eq!(resolved.pattern.as_deref(), Some("file.???"));

        let resolved = resolve_any(&mut session, "docs").await.unwrap();
        assert_eq!(resolved.pattern, None);
        assert_eq!(session.pattern(), None);
    }

    #[tokio::test]
    async fn wildcard_in_directory_segment_is_literal() {
        let mut session = Session::new();
        let resolved = resolve_any(&mut session, "a*/b*").await.unwrap();
        assert_eq!(resolved.path, "/a*/b*");
        assert_eq!(resolved.pattern, None);
    }

    #[tokio::test]
    async fn long_paths_are_rejected() {
        let mut session = Session::new();
        let raw = format!("/{}", "x".repeat(32));
        let err = resolve_any(&mut session, &raw).await.unwrap_err();
        assert!(matches!(err, ShellError::PathTooLong { max: 32, .. }));

        let raw = format!("/{}", "x".repeat(31));
        assert!(resolve_any(&mut session, &raw).await.is_ok());
    }

    #[tokio::test]
    async fn kind_requirements_consult_the_store() {
        let store = store_with_docs().await;
        let mut session = Session::new();

        let dir = resolve(&mut session, &store, "docs", Requirement::Directory).await;
        assert_eq!(dir.unwrap().path, "/docs");

        let err = resolve(&mut session, &store, "docs", Requirement::File)
            .await
            .unwrap_err();
        assert!(matches!(err, ShellError::NotAFile(_)));

        let err = resolve(&mut session, &store, "docs/a.txt", Requirement::Directory)
            .await
            .unwrap_err();
        assert!(matches!(err, ShellError::NotADirectory(_)));

        let err = resolve(&mut session, &store, "nope", Requirement::Directory)
            .await
            .unwrap_err();
        assert!(matches!(err, ShellError::PathNotFound(p) if p == "/nope"));

        assert_eq!(store.open_handles().unwrap(), 0);
    }

    #[test]
    fn segment_helpers() {
        assert_eq!(normalize("//a/./b/../c/"), "/a/c");
        assert_eq!(normalize("/.."), "/");
        assert_eq!(parent_dir("/a/b"), "/a");
        assert_eq!(parent_dir("/a"), "/");
        assert_eq!(join("/", "a"), "/a");
        assert_eq!(join("/a", "b"), "/a/b");
    }

    #[test]
    fn is_within_compares_segments() {
        assert!(is_within("/docs/sub", "/docs"));
        assert!(is_within("/docs", "/docs"));
        assert!(is_within("/docs", "/"));
        assert!(!is_within("/docs2", "/docs"));
        assert!(!is_within("/", "/docs"));
    }
}
