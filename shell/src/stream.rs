//! Terminal transports.
//!
//! [`StdioStream`] drives the host console in raw mode. [`MemoryStream`] is
//! an in-process transport whose input can be scripted up front or fed while
//! the shell runs, and whose output is captured for inspection.

use std::collections::VecDeque;
use std::io::{self, IsTerminal, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use lfsh_sdk::CharStream;
use tokio::io::{AsyncWriteExt, Stdout};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// How often an open but empty [`MemoryStream`] checks for new input.
const POLL_INTERVAL: Duration = Duration::from_millis(1);

fn poisoned<T>(_: PoisonError<T>) -> io::Error {
    io::Error::other("stream buffer lock poisoned")
}

#[derive(Debug, Default)]
struct Input {
    bytes: Mutex<VecDeque<u8>>,
    closed: AtomicBool,
}

/// In-process terminal.
///
/// Reads wait for input while the stream is open and report end of stream
/// once it is closed and drained.
#[derive(Debug)]
pub struct MemoryStream {
    input: Arc<Input>,
    output: OutputBuffer,
}

impl MemoryStream {
    /// A stream that stays open until [`InputHandle::close`] is called.
    pub fn new() -> Self {
        Self {
            input: Arc::new(Input::default()),
            output: OutputBuffer::default(),
        }
    }

    /// A closed stream that yields exactly `input`.
    pub fn scripted(input: impl AsRef<[u8]>) -> Self {
        let stream = Self::new();
        let handle = stream.input();
        handle.feed(input);
        handle.close();
        stream
    }

    pub fn input(&self) -> InputHandle {
        InputHandle(Arc::clone(&self.input))
    }

    pub fn output(&self) -> OutputBuffer {
        self.output.clone()
    }

    fn pop(&self) -> io::Result<Option<u8>> {
        Ok(self.input.bytes.lock().map_err(poisoned)?.pop_front())
    }
}

impl Default for MemoryStream {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CharStream for MemoryStream {
    async fn read_byte(&mut self) -> io::Result<Option<u8>> {
        loop {
            if let Some(byte) = self.pop()? {
                return Ok(Some(byte));
            }
            if self.input.closed.load(Ordering::SeqCst) {
                return Ok(None);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    fn try_read_byte(&mut self) -> io::Result<Option<u8>> {
        self.pop()
    }

    async fn write(&mut self, data: &[u8]) -> io::Result<()> {
        self.output.0.lock().map_err(poisoned)?.extend_from_slice(data);
        Ok(())
    }

    async fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Feeds a [`MemoryStream`] from outside the shell.
#[derive(Debug, Clone)]
pub struct InputHandle(Arc<Input>);

impl InputHandle {
    pub fn feed(&self, bytes: impl AsRef<[u8]>) {
        let mut queue = self.0.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        queue.extend(bytes.as_ref());
    }

    /// Ends the stream once the queued bytes are consumed.
    pub fn close(&self) {
        self.0.closed.store(true, Ordering::SeqCst);
    }
}

/// Everything written to a [`MemoryStream`].
#[derive(Debug, Clone, Default)]
pub struct OutputBuffer(Arc<Mutex<Vec<u8>>>);

impl OutputBuffer {
    pub fn bytes(&self) -> Vec<u8> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes()).into_owned()
    }

    /// Returns the output so far and clears it.
    pub fn take(&self) -> String {
        let bytes = std::mem::take(&mut *self.0.lock().unwrap_or_else(PoisonError::into_inner));
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

/// Puts the console in raw mode and restores it on drop.
#[derive(Debug)]
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        crossterm::terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = crossterm::terminal::disable_raw_mode() {
            warn!(error = %e, "failed to restore terminal mode");
        }
    }
}

/// Host console transport.
///
/// Stdin is read by a dedicated thread so that a pending read never holds up
/// runtime shutdown. In raw mode `\n` is written as `\r\n`.
#[derive(Debug)]
pub struct StdioStream {
    rx: mpsc::Receiver<u8>,
    stdout: Stdout,
    raw: Option<RawModeGuard>,
}

impl StdioStream {
    /// Opens the console, switching to raw mode when stdin is a terminal.
    pub fn new() -> io::Result<Self> {
        let raw = if io::stdin().is_terminal() {
            Some(RawModeGuard::enable()?)
        } else {
            None
        };
        debug!(raw = raw.is_some(), "opening console");

        let (tx, rx) = mpsc::channel(1024);
        std::thread::Builder::new()
            .name("lfsh-stdin".to_string())
            .spawn(move || {
                let mut stdin = io::stdin().lock();
                let mut buf = [0u8; 256];
                loop {
                    match stdin.read(&mut buf) {
                        Ok(0) => break,
                        Ok(n) => {
                            if buf[..n].iter().any(|b| tx.blocking_send(*b).is_err()) {
                                break;
                            }
                        }
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                        Err(e) => {
                            warn!(error = %e, "stdin read failed");
                            break;
                        }
                    }
                }
            })?;

        Ok(Self {
            rx,
            stdout: tokio::io::stdout(),
            raw,
        })
    }

    pub const fn is_raw(&self) -> bool {
        self.raw.is_some()
    }
}

#[async_trait]
impl CharStream for StdioStream {
    async fn read_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(self.rx.recv().await)
    }

    fn try_read_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(self.rx.try_recv().ok())
    }

    async fn write(&mut self, data: &[u8]) -> io::Result<()> {
        if self.is_raw() {
            let mut translated = Vec::with_capacity(data.len() + 8);
            for &byte in data {
                if byte == b'\n' {
                    translated.push(b'\r');
                }
                translated.push(byte);
            }
            self.stdout.write_all(&translated).await?;
        } else {
            self.stdout.write_all(data).await?;
        }
        self.stdout.flush().await
    }

    async fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_stream_closes_after_input() {
        let mut stream = MemoryStream::scripted("ab");
        assert_eq!(stream.read_byte().await.unwrap(), Some(b'a'));
        assert_eq!(stream.try_read_byte().unwrap(), Some(b'b'));
        assert_eq!(stream.read_byte().await.unwrap(), None);
    }

    #[tokio::test]
    async fn open_stream_waits_for_feed() {
        let mut stream = MemoryStream::new();
        let input = stream.input();
        assert_eq!(stream.try_read_byte().unwrap(), None);

        let reader = tokio::spawn(async move { stream.read_byte().await.unwrap() });
        tokio::time::sleep(Duration::from_millis(10)).await;
        input.feed("x");
        assert_eq!(reader.await.unwrap(), Some(b'x'));
    }

    #[tokio::test]
    async fn output_is_captured() {
        let mut stream = MemoryStream::new();
        let output = stream.output();
        stream.write(b"hello ").await.unwrap();
        stream.write(b"world").await.unwrap();
        assert_eq!(output.take(), "hello world");
        assert_eq!(output.contents(), "");
    }
}
