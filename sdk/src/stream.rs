use std::io;

use async_trait::async_trait;

/// Byte-oriented terminal transport.
///
/// `read_byte` waits for the next byte and yields `None` once the stream is
/// closed. `try_read_byte` never waits: it reports whether a byte is
/// available right now.
#[async_trait]
pub trait CharStream: Send {
    async fn read_byte(&mut self) -> io::Result<Option<u8>>;

    fn try_read_byte(&mut self) -> io::Result<Option<u8>>;

    async fn write(&mut self, data: &[u8]) -> io::Result<()>;

    async fn flush(&mut self) -> io::Result<()>;

    /// Reads up to `n` bytes, stopping early if the stream closes.
    async fn read_bytes(&mut self, n: usize) -> io::Result<Vec<u8>> {
        let mut out = Vec::with_capacity(n);
        while out.len() < n {
            match self.read_byte().await? {
                Some(b) => out.push(b),
                None => break,
            }
        }
        Ok(out)
    }

    /// Discards bytes up to and including `terminator`.
    async fn skip_until(&mut self, terminator: u8) -> io::Result<()> {
        while let Some(b) = self.read_byte().await? {
            if b == terminator {
                break;
            }
        }
        Ok(())
    }
}
