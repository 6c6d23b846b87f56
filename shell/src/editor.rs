//! Raw-byte line editor.
//!
//! Reads one byte at a time from the [`Terminal`], echoing printable input,
//! handling backspace, and recalling history on the up/down arrow keys.
//! Lines end on CR or LF; a CR LF or LF CR pair counts as one terminator.

use tracing::trace;

use crate::error::ShellResult;
use crate::history::{Direction, History};
use crate::terminal::Terminal;

const EOT: u8 = 0x04;
const BACKSPACE: u8 = 0x08;
const LF: u8 = b'\n';
const CR: u8 = b'\r';
const ESC: u8 = 0x1b;
const DELETE: u8 = 0x7f;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    Line(String),
    /// Ctrl-D, end of input, or cancellation.
    EndOfTransmission,
}

#[derive(Debug, Default)]
pub struct LineEditor {
    history: History,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn history(&self) -> &History {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    /// Prints `prompt` and edits one line. Completed lines are recorded in
    /// the history.
    pub async fn read_line(&mut self, term: &mut Terminal, prompt: &str) -> ShellResult<LineEvent> {
        term.write_str(prompt).await?;
        term.flush().await?;

        let mut buffer: Vec<u8> = Vec::new();
        loop {
            let Some(byte) = term.read_byte().await? else {
                term.newline().await?;
                return Ok(LineEvent::EndOfTransmission);
            };

            match byte {
                EOT => {
                    term.newline().await?;
                    return Ok(LineEvent::EndOfTransmission);
                }
                CR | LF => {
                    let partner = if byte == CR { LF } else { CR };
                    if let Some(next) = term.try_read_byte()? {
                        if next != partner {
                            term.push_back(next);
                        }
                    }
                    term.newline().await?;

                    let line = String::from_utf8_lossy(&buffer).into_owned();
                    self.history.push(&line);
                    return Ok(LineEvent::Line(line));
                }
                BACKSPACE | DELETE => {
                    if pop_char(&mut buffer) {
                        term.write_bytes(b"\x08 \x08").await?;
                    }
                }
                ESC => self.escape(term, prompt, &mut buffer).await?,
                0x20..=0x7e | 0x80..=0xff => {
                    buffer.push(byte);
                    term.write_bytes(&[byte]).await?;
                }
                _ => trace!(byte, "ignoring control byte"),
            }
        }
    }

    async fn escape(
        &mut self,
        term: &mut Terminal,
        prompt: &str,
        buffer: &mut Vec<u8>,
    ) -> ShellResult<()> {
        let sequence = term.read_bytes(2).await?;
        let direction = match sequence.get(1) {
            Some(b'A') => Direction::Up,
            Some(b'B') => Direction::Down,
            Some(b) if b.is_ascii_digit() => return term.skip_until(b'~').await,
            _ => return Ok(()),
        };

        let shown = String::from_utf8_lossy(buffer).chars().count();
        let recalled = self.history.recall(direction).to_string();
        let blank = " ".repeat(shown);
        term.write_str(&format!("\r{prompt}{blank}\r{prompt}{recalled}"))
            .await?;
        *buffer = recalled.into_bytes();
        Ok(())
    }
}

/// Removes the last UTF-8 character, continuation bytes included.
fn pop_char(buffer: &mut Vec<u8>) -> bool {
    let Some(mut end) = buffer.len().checked_sub(1) else {
        return false;
    };
    while end > 0 && buffer[end] & 0xc0 == 0x80 {
        end -= 1;
    }
    buffer.truncate(end);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::MemoryStream;

    async fn edit(input: &[u8]) -> (Vec<LineEvent>, String, LineEditor) {
        let stream = MemoryStream::scripted(input);
        let output = stream.output();
        let mut term = Terminal::new(stream);
        let mut editor = LineEditor::new();
        let mut events = Vec::new();
        loop {
            let event = editor.read_line(&mut term, "/ >").await.unwrap();
            let done = event == LineEvent::EndOfTransmission;
            events.push(event);
            if done {
                break;
            }
        }
        (events, output.contents(), editor)
    }

    fn line(text: &str) -> LineEvent {
        LineEvent::Line(text.to_string())
    }

    #[tokio::test]
    async fn echoes_and_returns_line() {
        let (events, output, _) = edit(b"dir\r\n").await;
        assert_eq!(events, vec![line("dir"), LineEvent::EndOfTransmission]);
        assert!(output.starts_with("/ >dir\n/ >"));
    }

    #[tokio::test]
    async fn terminator_pairs_count_once() {
        let (events, _, _) = edit(b"a\r\nb\n\rc\rd\n").await;
        assert_eq!(
            events,
            vec![line("a"), line("b"), line("c"), line("d"), LineEvent::EndOfTransmission]
        );
    }

    #[tokio::test]
    async fn byte_after_terminator_is_kept() {
        let (events, _, _) = edit(b"a\rb\r").await;
        assert_eq!(events, vec![line("a"), line("b"), LineEvent::EndOfTransmission]);
    }

    #[tokio::test]
    async fn backspace_erases() {
        let (events, output, _) = edit(b"dirx\x7f\r\x08\x08a\n").await;
        assert_eq!(events[0], line("dir"));
        assert!(output.contains("dirx\x08 \x08"));
        assert_eq!(events[1], line("a"));
    }

    #[tokio::test]
    async fn backspace_removes_whole_utf8_character() {
        let (events, _, _) = edit("aé\x7f\r".as_bytes()).await;
        assert_eq!(events[0], line("a"));
    }

    #[tokio::test]
    async fn eot_ends_input() {
        let (events, _, _) = edit(b"di\x04dir\r").await;
        assert_eq!(events, vec![LineEvent::EndOfTransmission]);
    }

    #[tokio::test]
    async fn control_bytes_are_ignored() {
        let (events, _, _) = edit(b"d\x01i\tr\r").await;
        assert_eq!(events[0], line("dir"));
    }

    #[tokio::test]
    async fn arrows_recall_history() {
        let (events, output, editor) = edit(b"one\rtwo\r\x1b[A\x1b[A\r\x1b[A\x1b[B\r").await;
        assert_eq!(
            events,
            vec![
                line("one"),
                line("two"),
                line("one"),
                line(""),
                LineEvent::EndOfTransmission
            ]
        );
        assert!(output.contains("\r/ >\r/ >two"));
        assert!(output.contains("\r/ >   \r/ >one"));
        assert_eq!(editor.history().newest(), Some("one"));
    }

    #[tokio::test]
    async fn other_escape_sequences_are_discarded() {
        let (events, _, _) = edit(b"a\x1b[3~b\x1b[Cc\r").await;
        assert_eq!(events[0], line("abc"));
    }

    #[tokio::test]
    async fn completed_lines_enter_history() {
        let (_, _, editor) = edit(b"dir\r\rcd docs\r").await;
        assert_eq!(editor.history().iter().collect::<Vec<_>>(), vec!["cd docs", "dir"]);
    }
}
