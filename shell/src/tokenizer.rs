//! Splits a command line into at most [`MAX_ARGS`] tokens.
//!
//! Tokens are separated by spaces. A token starting with `"` runs to the
//! next `"` and may contain spaces; an unterminated quote is an ordinary
//! character. Tokens past the tenth are dropped.

/// Command name plus up to nine arguments.
pub const MAX_ARGS: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    slots: [Option<String>; MAX_ARGS],
    len: usize,
}

impl Args {
    /// The command name, empty for a blank line.
    pub fn command(&self) -> &str {
        self.get(0)
    }

    /// Token `index`, or the empty string when absent.
    pub fn get(&self, index: usize) -> &str {
        self.slot(index).unwrap_or("")
    }

    pub fn slot(&self, index: usize) -> Option<&str> {
        self.slots.get(index).and_then(Option::as_deref)
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.slots[..self.len].iter().filter_map(Option::as_deref)
    }

    fn push(&mut self, token: &str) {
        self.slots[self.len] = Some(token.to_string());
        self.len += 1;
    }
}

pub fn tokenize(line: &str) -> Args {
    let mut args = Args::default();
    let mut rest = line;

    while args.len < MAX_ARGS {
        let slice = rest.trim();
        if slice.is_empty() {
            break;
        }

        let quoted = slice
            .strip_prefix('"')
            .and_then(|tail| tail.find('"'))
            .map(|close| (1, close + 1));
        let (begin, end) = match quoted {
            Some((begin, end)) => (begin, Some(end)),
            None => (0, slice.find(' ')),
        };

        match end {
            Some(end) => {
                args.push(&slice[begin..end]);
                rest = &slice[end + 1..];
            }
            None => {
                args.push(slice);
                break;
            }
        }
    }

    args
}
