//! Bounded command-line history with an arrow-key cursor.

/// Number of remembered lines.
pub const HISTORY_CAPACITY: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward older entries.
    Up,
    /// Toward newer entries, ending at the empty line.
    Down,
}

/// Most-recent-first ring of up to `N` lines.
///
/// The cursor is 0 while no entry is being recalled; cursor `k` refers to
/// the k-th most recent entry.
#[derive(Debug, Clone)]
pub struct History<const N: usize = HISTORY_CAPACITY> {
    entries: [String; N],
    len: usize,
    cursor: usize,
}

impl<const N: usize> History<N> {
    pub fn new() -> Self {
        Self {
            entries: std::array::from_fn(|_| String::new()),
            len: 0,
            cursor: 0,
        }
    }

    /// Records a completed line. Blank lines and repeats of the newest entry
    /// are ignored and leave the cursor where it is.
    pub fn push(&mut self, line: &str) {
        let line: String = line.chars().filter(|c| *c != '\r' && *c != '\n').collect();
        if N == 0 || line.is_empty() || self.newest() == Some(line.as_str()) {
            return;
        }

        let end = (self.len + 1).min(N);
        self.entries[..end].rotate_right(1);
        self.entries[0] = line;
        self.len = end;
        self.cursor = 0;
    }

    /// Moves the cursor one step and returns the entry under it.
    pub fn recall(&mut self, direction: Direction) -> &str {
        match direction {
            Direction::Up if self.cursor < self.len => self.cursor += 1,
            Direction::Down if self.cursor > 0 => self.cursor -= 1,
            _ => {}
        }
        self.current()
    }

    /// Entry under the cursor, empty when nothing is recalled.
    pub fn current(&self) -> &str {
        match self.cursor {
            0 => "",
            k => &self.entries[k - 1],
        }
    }

    pub fn newest(&self) -> Option<&str> {
        self.iter().next()
    }

    /// Entries, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries[..self.len].iter().map(String::as_str)
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub const fn cursor(&self) -> usize {
        self.cursor
    }
}

impl<const N: usize> Default for History<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_keeps_newest_first() {
        let mut history: History = History::new();
        history.push("dir");
        history.push("cd docs\r\n");
        assert_eq!(history.iter().collect::<Vec<_>>(), vec!["cd docs", "dir"]);
        assert_eq!(history.newest(), Some("cd docs"));
    }

    #[test]
    fn push_ignores_blank_and_repeated_lines() {
        let mut history: History = History::new();
        history.push("");
        history.push("\r\n");
        assert!(history.is_empty());

        history.push("dir");
        history.push("dir");
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn push_drops_oldest_when_full() {
        let mut history: History<3> = History::new();
        for line in ["a", "b", "c", "d"] {
            history.push(line);
        }
        assert_eq!(history.iter().collect::<Vec<_>>(), vec!["d", "c", "b"]);
    }

    #[test]
    fn keeps_the_ten_most_recent() {
        let mut history: History = History::new();
        for i in 0..=HISTORY_CAPACITY {
            history.push(&format!("cmd{i}"));
        }
        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert_eq!(history.newest(), Some("cmd10"));
        assert!(history.iter().all(|line| line != "cmd0"));
    }

    #[test]
    fn recall_walks_and_pins_on_oldest() {
        let mut history: History = History::new();
        history.push("one");
        history.push("two");

        assert_eq!(history.recall(Direction::Up), "two");
        assert_eq!(history.recall(Direction::Up), "one");
        assert_eq!(history.recall(Direction::Up), "one");
        assert_eq!(history.cursor(), 2);

        assert_eq!(history.recall(Direction::Down), "two");
        assert_eq!(history.recall(Direction::Down), "");
        assert_eq!(history.recall(Direction::Down), "");
        assert_eq!(history.cursor(), 0);
    }

    #[test]
    fn recall_on_empty_history_is_empty() {
        let mut history: History = History::new();
        assert_eq!(history.recall(Direction::Up), "");
        assert_eq!(history.cursor(), 0);
    }

    #[test]
    fn push_resets_cursor() {
        let mut history: History = History::new();
        history.push("one");
        history.push("two");
        history.recall(Direction::Up);
        history.recall(Direction::Up);

        history.push("three");
        assert_eq!(history.cursor(), 0);
        assert_eq!(history.recall(Direction::Up), "three");
    }
}
