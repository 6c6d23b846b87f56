use lfsh_sdk::CharStream;
use tokio_util::sync::CancellationToken;

use crate::error::ShellResult;

/// A [`CharStream`] plus the shell's view of it: one byte of pushback and a
/// cancellation token that ends pending reads as end of stream.
pub struct Terminal {
    stream: Box<dyn CharStream>,
    pending: Option<u8>,
    cancel: CancellationToken,
}

impl Terminal {
    pub fn new(stream: impl CharStream + 'static) -> Self {
        Self::with_cancellation(stream, CancellationToken::new())
    }

    pub fn with_cancellation(stream: impl CharStream + 'static, cancel: CancellationToken) -> Self {
        Self::from_boxed(Box::new(stream), cancel)
    }

    pub fn from_boxed(stream: Box<dyn CharStream>, cancel: CancellationToken) -> Self {
        Self {
            stream,
            pending: None,
            cancel,
        }
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Next byte, or `None` once the stream closed or the token fired.
    pub async fn read_byte(&mut self) -> ShellResult<Option<u8>> {
        if let Some(byte) = self.pending.take() {
            return Ok(Some(byte));
        }
        if self.cancel.is_cancelled() {
            return Ok(None);
        }
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Ok(None),
            byte = self.stream.read_byte() => Ok(byte?),
        }
    }

    /// A byte only if one is available right now.
    pub fn try_read_byte(&mut self) -> ShellResult<Option<u8>> {
        if let Some(byte) = self.pending.take() {
            return Ok(Some(byte));
        }
        Ok(self.stream.try_read_byte()?)
    }

    /// Returns `byte` from the next read.
    pub fn push_back(&mut self, byte: u8) {
        self.pending = Some(byte);
    }

    pub async fn read_bytes(&mut self, n: usize) -> ShellResult<Vec<u8>> {
        let mut out = Vec::with_capacity(n);
        while out.len() < n {
            match self.read_byte().await? {
                Some(byte) => out.push(byte),
                None => break,
            }
        }
        Ok(out)
    }

    /// Discards input up to and including `terminator`.
    pub async fn skip_until(&mut self, terminator: u8) -> ShellResult<()> {
        while let Some(byte) = self.read_byte().await? {
            if byte == terminator {
                break;
            }
        }
        Ok(())
    }

    pub async fn write_bytes(&mut self, data: &[u8]) -> ShellResult<()> {
        Ok(self.stream.write(data).await?)
    }

    pub async fn write_str(&mut self, text: &str) -> ShellResult<()> {
        self.write_bytes(text.as_bytes()).await
    }

    pub async fn write_line(&mut self, text: &str) -> ShellResult<()> {
        self.write_str(text).await?;
        self.newline().await
    }

    pub async fn newline(&mut self) -> ShellResult<()> {
        self.write_bytes(b"\n").await
    }

    pub async fn flush(&mut self) -> ShellResult<()> {
        Ok(self.stream.flush().await?)
    }
}

impl std::fmt::Debug for Terminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Terminal")
            .field("pending", &self.pending)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::MemoryStream;

    #[tokio::test]
    async fn pushback_is_read_first() {
        let mut terminal = Terminal::new(MemoryStream::scripted("b"));
        terminal.push_back(b'a');
        assert_eq!(terminal.try_read_byte().unwrap(), Some(b'a'));
        terminal.push_back(b'a');
        assert_eq!(terminal.read_bytes(3).await.unwrap(), b"ab");
    }

    #[tokio::test]
    async fn cancellation_ends_pending_read() {
        let stream = MemoryStream::new();
        let mut terminal = Terminal::new(stream);
        let token = terminal.cancellation_token();

        let reader = tokio::spawn(async move { terminal.read_byte().await.unwrap() });
        token.cancel();
        assert_eq!(reader.await.unwrap(), None);
    }

    #[tokio::test]
    async fn skip_until_stops_after_terminator() {
        let mut terminal = Terminal::new(MemoryStream::scripted("12~x"));
        terminal.skip_until(b'~').await.unwrap();
        assert_eq!(terminal.read_byte().await.unwrap(), Some(b'x'));
    }

    #[test]
    fn writes_reach_the_stream() {
        let stream = MemoryStream::new();
        let output = stream.output();
        let mut terminal = Terminal::new(stream);
        tokio_test::block_on(async {
            terminal.write_line("hello").await.unwrap();
            terminal.flush().await.unwrap();
        });
        assert_eq!(output.contents(), "hello\n");
    }
}
