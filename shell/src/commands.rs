//! The command table.
//!
//! Each command checks its arguments first, then resolves its paths, then
//! talks to the store. Failures come back as [`ShellError`] values; the
//! interactive loop prints them and carries on.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use lfsh_sdk::{Handle, OpenMode};
use tracing::{debug, info, warn};

use crate::error::{ShellError, ShellResult};
use crate::help;
use crate::path::{is_within, join, resolve, Requirement, ResolvedPath};
use crate::pattern::matches;
use crate::shell::Shell;
use crate::tokenizer::Args;

const EOT: u8 = 0x04;
const LINE_BREAK: u8 = b'^';
const READ_CHUNK_SIZE: usize = 256;
const HEX_ROW: usize = 20;
const INFO_RULE_WIDTH: usize = 53;
/// Width of the paste prompt, blanked out once capture is over.
const PASTE_PROMPT_ERASE: usize = 49;

impl Shell {
    pub(crate) async fn dispatch(&mut self, args: &Args) -> ShellResult<()> {
        let name = args.command();
        if name.is_empty() {
            return Ok(());
        }
        debug!(command = name, argc = args.len(), "dispatching");

        match name {
            "help" => self.cmd_help(args).await,
            "info" => self.cmd_info().await,
            "mkdir" => self.cmd_mkdir(args).await,
            "rmdir" => self.cmd_rmdir(args).await,
            "dir" => self.cmd_dir(args).await,
            "tree" => self.cmd_tree(args).await,
            "cd" => self.cmd_cd(args).await,
            "type" => self.cmd_type(args).await,
            "load" => self.cmd_load(args).await,
            "del" => self.cmd_del(args).await,
            "ren" => self.cmd_ren(args).await,
            "copy" => self.cmd_copy(args).await,
            "exit" => {
                self.session.request_exit();
                Ok(())
            }
            "format" => self.cmd_format().await,
            "begin" => self.cmd_begin().await,
            "end" => self.cmd_end().await,
            _ => Err(ShellError::UnknownCommand(name.to_string())),
        }
    }

    async fn cmd_help(&mut self, args: &Args) -> ShellResult<()> {
        let text = match args.slot(1) {
            None | Some("") => help::format_help_list(),
            Some(topic) => match help::get_help(topic) {
                Some(cmd) => help::format_help(cmd),
                None => return Err(ShellError::NoHelp(topic.to_string())),
            },
        };
        self.terminal.write_str(&text).await
    }

    async fn cmd_info(&mut self) -> ShellResult<()> {
        let info = self.store.info().await.map_err(ShellError::Info)?;

        let mut out = format!("{:-<width$}\n", "-- File Store Info ", width = INFO_RULE_WIDTH);
        for (label, value) in [
            ("Total Bytes", info.total_bytes.to_string()),
            ("Used Bytes", info.used_bytes.to_string()),
            ("Block Size", info.block_size.to_string()),
            ("Page Size", info.page_size.to_string()),
            ("Max Open Files", info.max_open_files.to_string()),
            ("Max Path Length", info.max_path_length.to_string()),
        ] {
            out.push_str(&format!("   {label:<16}: {value}\n"));
        }
        out.push_str(&format!("{}\n", "-".repeat(INFO_RULE_WIDTH)));
        out.push_str(&format!(
            "   lfsh command line interface version : {}\n",
            env!("CARGO_PKG_VERSION")
        ));
        self.terminal.write_str(&out).await
    }

    async fn cmd_mkdir(&mut self, args: &Args) -> ShellResult<()> {
        let raw = required(args, 1, "mkdir", "path")?;
        let path = self.resolve_arg(raw, Requirement::Any).await?.path;
        self.store
            .mkdir(&path)
            .await
            .map_err(|source| ShellError::CreateDir { path, source })
    }

    async fn cmd_rmdir(&mut self, args: &Args) -> ShellResult<()> {
        let raw = required(args, 1, "rmdir", "path")?;
        let path = self.resolve_arg(raw, Requirement::Directory).await?.path;

        if is_within(self.session.work_dir(), &path) {
            return Err(ShellError::ContainsWorkDir(path));
        }
        if let Err(source) = self.store.rmdir(&path).await {
            return Err(ShellError::RemoveDir { path, source });
        }

        self.relocate_work_dir(&path).await;
        Ok(())
    }

    async fn cmd_dir(&mut self, args: &Args) -> ShellResult<()> {
        let ResolvedPath { path, pattern } = self.resolve_arg(args.get(1), Requirement::Any).await?;
        let pattern = pattern.unwrap_or_default();
        let entries = self
            .store
            .list_dir(&path)
            .await
            .map_err(|source| ShellError::List { path, source })?;

        let (mut files, mut dirs, mut total) = (0usize, 0usize, 0u64);
        let mut out = String::new();
        for entry in entries.iter().filter(|e| matches(&e.name, &pattern)) {
            if entry.is_dir() {
                dirs += 1;
                out.push_str(&format!("{:<35}<dir>\n", entry.name));
            } else {
                files += 1;
                total += entry.size;
                out.push_str(&format!("{:<35}{:>10} bytes\n", entry.name, entry.size));
            }
        }

        let file_label = if files > 1 { " files    " } else { " file     " };
        let dir_label = if dirs > 1 { " directories" } else { " directory" };
        out.push('\n');
        out.push_str(&format!("{files:>25}{file_label}{total:>10} bytes\n"));
        out.push_str(&format!("{dirs:>25}{dir_label}\n"));
        self.terminal.write_str(&out).await
    }

    async fn cmd_tree(&mut self, args: &Args) -> ShellResult<()> {
        let path = self.resolve_arg(args.get(1), Requirement::Directory).await?.path;

        if path == "/" {
            self.terminal.write_line("  / root").await?;
        } else {
            self.terminal.write_line(&format!("  {path}")).await?;
        }
        self.print_tree(&path, 1).await?;

        if path == "/" {
            let info = self.store.info().await.map_err(ShellError::Info)?;
            self.terminal.newline().await?;
            self.terminal
                .write_line(&format!("   {:<15}: {}", "Total Bytes", info.total_bytes))
                .await?;
            self.terminal
                .write_line(&format!("   {:<15}: {}", "Used Bytes", info.used_bytes))
                .await?;
        }
        self.terminal.newline().await
    }

    /// Files first, then each directory followed by its own subtree.
    fn print_tree<'a>(
        &'a mut self,
        path: &'a str,
        level: usize,
    ) -> Pin<Box<dyn Future<Output = ShellResult<()>> + Send + 'a>> {
        Box::pin(async move {
            let entries = self
                .store
                .list_dir(path)
                .await
                .map_err(|source| ShellError::List {
                    path: path.to_string(),
                    source,
                })?;
            let branch = format!("{:>width$}", "|-- ", width = 3 + level * 4);

            for entry in entries.iter().filter(|e| e.is_file()) {
                self.terminal
                    .write_line(&format!("{branch}{}", entry.name))
                    .await?;
            }
            for entry in entries.iter().filter(|e| e.is_dir()) {
                self.terminal
                    .write_line(&format!("{branch}{}  <dir>", entry.name))
                    .await?;
                let child = join(path, &entry.name);
                self.print_tree(&child, level + 1).await?;
            }
            Ok(())
        })
    }

    async fn cmd_cd(&mut self, args: &Args) -> ShellResult<()> {
        let raw = required(args, 1, "cd", "path")?;
        let path = self.resolve_arg(raw, Requirement::Directory).await?.path;
        debug!(from = %self.session.work_dir(), to = %path, "changing work directory");
        self.session.set_work_dir(path);
        Ok(())
    }

    async fn cmd_type(&mut self, args: &Args) -> ShellResult<()> {
        let raw = required(args, 1, "type", "path")?;
        let path = self.resolve_arg(raw, Requirement::File).await?.path;
        let data = self.read_file(&path).await?;

        if args.get(2) == "hex" {
            let dump = hex_dump(&data);
            self.terminal.write_str(&dump).await?;
        } else {
            let text: Vec<u8> = data
                .iter()
                .filter(|b| **b != b'\n')
                .map(|b| if *b == b'\r' { b'\n' } else { *b })
                .collect();
            self.terminal.write_bytes(&text).await?;
        }
        self.terminal.newline().await
    }

    async fn cmd_load(&mut self, args: &Args) -> ShellResult<()> {
        let raw = required(args, 1, "load", "path")?;
        let path = self.resolve_arg(raw, Requirement::Any).await?.path;
        let binary = args.get(2) == "bin";

        let handle = self
            .store
            .open(&path, OpenMode::Write)
            .await
            .map_err(|source| ShellError::Open {
                path: path.clone(),
                source,
            })?;

        self.terminal.write_str("Insert from clipboard!").await?;
        self.terminal.flush().await?;

        let written = match self.capture(binary).await {
            Ok(data) => {
                let len = data.len();
                self.store
                    .write(&handle, 0, Bytes::from(data))
                    .await
                    .map(|_| len)
                    .map_err(|source| ShellError::Write {
                        path: path.clone(),
                        source,
                    })
            }
            Err(e) => Err(e),
        };
        self.close_quietly(handle, &path).await;
        let len = written?;

        info!(path = %path, bytes = len, binary, "file loaded");
        let erase = " ".repeat(PASTE_PROMPT_ERASE);
        self.terminal.write_str(&format!("\r{erase}\r")).await?;
        self.terminal.write_line(&format!("{path} file created")).await
    }

    /// Collects pasted bytes. Capture ends on Ctrl-D in text mode, when the
    /// terminal closes, or when input pauses for the idle timeout once the
    /// first byte arrived.
    async fn capture(&mut self, binary: bool) -> ShellResult<Vec<u8>> {
        let mut data = Vec::new();
        let mut started = false;

        loop {
            let next = if started {
                match tokio::time::timeout(self.load_idle_timeout, self.terminal.read_byte()).await
                {
                    Ok(byte) => byte?,
                    Err(_) => {
                        debug!(bytes = data.len(), "load input went idle");
                        break;
                    }
                }
            } else {
                self.terminal.read_byte().await?
            };
            started = true;

            match next {
                None => break,
                Some(EOT) if !binary => break,
                Some(LINE_BREAK) if !binary => data.extend_from_slice(b"\r\n"),
                Some(byte) => data.push(byte),
            }
        }
        Ok(data)
    }

    async fn cmd_del(&mut self, args: &Args) -> ShellResult<()> {
        let raw = required(args, 1, "del", "path")?;
        let ResolvedPath { path, pattern } = self.resolve_arg(raw, Requirement::Any).await?;

        let Some(pattern) = pattern else {
            if let Err(source) = self.store.remove(&path).await {
                return Err(ShellError::Delete { path, source });
            }
            self.relocate_work_dir(&path).await;
            return Ok(());
        };

        let entries = self
            .store
            .list_dir(&path)
            .await
            .map_err(|source| ShellError::List {
                path: path.clone(),
                source,
            })?;

        let mut failed = 0;
        for entry in entries
            .iter()
            .filter(|e| e.is_file() && matches(&e.name, &pattern))
        {
            let target = join(&path, &entry.name);
            if let Err(source) = self.store.remove(&target).await {
                warn!(path = %target, error = %source, "batch delete failed");
                let e = ShellError::Delete {
                    path: entry.name.clone(),
                    source,
                };
                self.terminal.write_line(&e.to_string()).await?;
                failed += 1;
            }
        }

        self.relocate_work_dir(&path).await;
        if failed > 0 {
            return Err(ShellError::Partial {
                command: "del",
                failed,
            });
        }
        Ok(())
    }

    async fn cmd_ren(&mut self, args: &Args) -> ShellResult<()> {
        let from = required(args, 1, "ren", "from")?;
        let to = required(args, 2, "ren", "to")?;
        let from = self.resolve_arg(from, Requirement::Any).await?.path;
        let to = self.resolve_arg(to, Requirement::Any).await?.path;

        self.store
            .rename(&from, &to)
            .await
            .map_err(|source| ShellError::Rename { from, to, source })
    }

    async fn cmd_copy(&mut self, args: &Args) -> ShellResult<()> {
        let from = required(args, 1, "copy", "from")?;
        let to = required(args, 2, "copy", "to")?;
        let ResolvedPath {
            path: from_path,
            pattern,
        } = self.resolve_arg(from, Requirement::Any).await?;

        let Some(pattern) = pattern else {
            let from_path = self.resolve_arg(&from_path, Requirement::File).await?.path;
            let to_path = self.resolve_arg(to, Requirement::Any).await?.path;
            return self.copy_file(&from_path, &to_path).await;
        };

        let to_dir = self.resolve_arg(to, Requirement::Directory).await?.path;
        let entries = self
            .store
            .list_dir(&from_path)
            .await
            .map_err(|source| ShellError::List {
                path: from_path.clone(),
                source,
            })?;

        let mut failed = 0;
        for entry in entries
            .iter()
            .filter(|e| e.is_file() && matches(&e.name, &pattern))
        {
            let source = join(&from_path, &entry.name);
            let target = join(&to_dir, &entry.name);
            match self.copy_file(&source, &target).await {
                Ok(()) => {}
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    self.terminal.write_line(&e.to_string()).await?;
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            return Err(ShellError::Partial {
                command: "copy",
                failed,
            });
        }
        Ok(())
    }

    /// Copies one file. Never overwrites: a destination that can be opened
    /// for reading aborts the copy.
    async fn copy_file(&mut self, from: &str, to: &str) -> ShellResult<()> {
        if let Ok(existing) = self.store.open(to, OpenMode::Read).await {
            self.close_quietly(existing, to).await;
            return Err(ShellError::AlreadyExists(to.to_string()));
        }

        let data = self.read_file(from).await?;
        let handle = self
            .store
            .open(to, OpenMode::Write)
            .await
            .map_err(|source| ShellError::WriteOpen {
                path: to.to_string(),
                source,
            })?;
        let written = self.store.write(&handle, 0, Bytes::from(data)).await;
        self.close_quietly(handle, to).await;
        written.map_err(|source| ShellError::Write {
            path: to.to_string(),
            source,
        })?;

        debug!(from, to, "copied");
        Ok(())
    }

    async fn cmd_format(&mut self) -> ShellResult<()> {
        self.terminal
            .write_str("Really want to format the file system? Y/N  ")
            .await?;
        self.terminal.flush().await?;

        let answer = self.terminal.read_byte().await?;
        if let Some(byte) = answer {
            self.terminal.write_bytes(&[byte]).await?;
        }
        self.terminal.newline().await?;

        if !matches!(answer, Some(b'y' | b'Y')) {
            return Ok(());
        }
        self.store.format().await.map_err(ShellError::Format)?;
        self.session.set_work_dir("/");
        info!("file store formatted");
        self.terminal.write_line("Format done!").await
    }

    async fn cmd_begin(&mut self) -> ShellResult<()> {
        self.store.mount().await.map_err(ShellError::Mount)?;
        self.terminal.write_line("Mount file system done!").await
    }

    async fn cmd_end(&mut self) -> ShellResult<()> {
        self.store.unmount().await.map_err(ShellError::Unmount)?;
        self.terminal.write_line("Unmount done!").await
    }

    async fn resolve_arg(&mut self, raw: &str, requirement: Requirement) -> ShellResult<ResolvedPath> {
        resolve(&mut self.session, self.store.as_ref(), raw, requirement).await
    }

    async fn read_file(&mut self, path: &str) -> ShellResult<Vec<u8>> {
        let handle = self
            .store
            .open(path, OpenMode::Read)
            .await
            .map_err(|source| ShellError::ReadOpen {
                path: path.to_string(),
                source,
            })?;

        let mut data = Vec::new();
        let result = loop {
            let offset = data.len() as u64;
            match self.store.read(&handle, offset, READ_CHUNK_SIZE).await {
                Ok(chunk) if chunk.is_empty() => break Ok(()),
                Ok(chunk) => data.extend_from_slice(&chunk),
                Err(source) => {
                    break Err(ShellError::Read {
                        path: path.to_string(),
                        source,
                    })
                }
            }
        };
        self.close_quietly(handle, path).await;
        result.map(|()| data)
    }

    async fn close_quietly(&mut self, handle: Handle, path: &str) {
        if let Err(e) = self.store.close(handle).await {
            warn!(path, error = %e, "failed to close handle");
        }
    }

    /// Keeps the work directory if it still exists, otherwise moves it to
    /// the nearest existing ancestor of `affected`.
    async fn relocate_work_dir(&mut self, affected: &str) {
        if self.store.exists(self.session.work_dir()).await {
            return;
        }

        let mut candidate = affected.to_string();
        while candidate != "/" && !self.store.exists(&candidate).await {
            match candidate.rfind('/') {
                Some(0) | None => candidate = "/".to_string(),
                Some(i) => candidate.truncate(i),
            }
        }
        debug!(from = %self.session.work_dir(), to = %candidate, "work directory relocated");
        self.session.set_work_dir(candidate);
    }
}

/// Argument `index`, or a `MissingArgument` naming it.
fn required<'a>(
    args: &'a Args,
    index: usize,
    command: &'static str,
    argument: &'static str,
) -> ShellResult<&'a str> {
    match args.slot(index) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ShellError::MissingArgument { command, argument }),
    }
}

/// Rows of `offset | 10 bytes | 10 bytes | text`, followed by an empty line.
fn hex_dump(data: &[u8]) -> String {
    let mut out = String::new();
    for (row, chunk) in data.chunks(HEX_ROW).enumerate() {
        out.push_str(&format!("{:>6} | ", row * HEX_ROW));
        for i in 0..HEX_ROW {
            match chunk.get(i) {
                Some(byte) => out.push_str(&format!("{byte:02X} ")),
                None => out.push_str("   "),
            }
            if i == 9 {
                out.push_str("| ");
            }
        }
        out.push_str("| ");
        for i in 0..HEX_ROW {
            match chunk.get(i) {
                Some(byte) if (0x20..=0x7e).contains(byte) => out.push(char::from(*byte)),
                _ => out.push(' '),
            }
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    #[test]
    fn hex_dump_pads_last_row() {
        let dump = hex_dump(b"Hello\r\n");
        let expected = format!(
            "     0 | 48 65 6C 6C 6F 0D 0A {}| {}| Hello{}\n",
            " ".repeat(9),
            " ".repeat(30),
            " ".repeat(15)
        );
        assert_eq!(dump, expected);
    }

    #[test]
    fn hex_dump_numbers_rows() {
        let data: Vec<u8> = (0u8..45).map(|i| b'a' + i % 26).collect();
        let dump = hex_dump(&data);
        let offsets: Vec<&str> = dump.lines().map(|l| &l[..6]).collect();
        assert_eq!(offsets, vec!["     0", "    20", "    40"]);
        assert!(dump.lines().all(|l| l.len() == 6 + 3 + 60 + 2 + 2 + 20));
    }

    #[test]
    fn hex_dump_of_25_bytes() {
        let data: Vec<u8> = (0u8..25).map(|i| b'A' + i).collect();
        let dump = hex_dump(&data);
        let rows: Vec<&str> = dump.lines().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            "     0 | 41 42 43 44 45 46 47 48 49 4A | 4B 4C 4D 4E 4F 50 51 52 53 54 | ABCDEFGHIJKLMNOPQRST"
        );
        assert_eq!(
            rows[1],
            format!(
                "    20 | 55 56 57 58 59 {}| {}| UVWXY{}",
                " ".repeat(15),
                " ".repeat(30),
                " ".repeat(15)
            )
        );
    }

    #[test]
    fn required_rejects_missing_and_empty() {
        let args = tokenize("mkdir \"\"");
        assert!(matches!(
            required(&args, 1, "mkdir", "path"),
            Err(ShellError::MissingArgument {
                command: "mkdir",
                argument: "path"
            })
        ));
        let args = tokenize("mkdir docs");
        assert_eq!(required(&args, 1, "mkdir", "path").unwrap(), "docs");
    }
}
