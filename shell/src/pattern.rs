//! `?`/`*` filename patterns.
//!
//! `?` matches exactly one character. `*` skips ahead to the next occurrence
//! of the pattern character that follows it; there is no backtracking, so
//! `*a` against `banana` stops at the first `a` and fails.

/// Returns whether `name` matches `pattern`. An empty pattern matches
/// everything.
pub fn matches(name: &str, pattern: &str) -> bool {
    if pattern.is_empty() {
        return true;
    }

    let name: Vec<char> = name.chars().chain(std::iter::once('\0')).collect();
    let pattern: Vec<char> = pattern.chars().chain(std::iter::once('\0')).collect();
    let (mut p, mut n) = (0, 0);
    let mut skipping = false;

    while p < pattern.len() && n < name.len() {
        match pattern[p] {
            '?' => {
                p += 1;
                n += 1;
            }
            '*' => {
                skipping = true;
                p += 1;
            }
            c if skipping => {
                while n < name.len() && name[n] != c {
                    n += 1;
                }
                skipping = false;
            }
            c if c != name[n] => return false,
            _ => {
                p += 1;
                n += 1;
            }
        }
    }

    p == pattern.len() && n == name.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pattern_matches_everything() {
        assert!(matches("anything", ""));
        assert!(matches("", ""));
    }

    #[test]
    fn star_suffix() {
        assert!(matches("file.txt", "*.txt"));
        assert!(!matches("file.bin", "*.txt"));
        assert!(!matches("file.txt", "*.bin"));
        assert!(matches("file.txt", "*"));
        assert!(matches("", "*"));
    }

    #[test]
    fn question_marks_count_characters() {
        assert!(matches("file.txt", "file.???"));
        assert!(!matches("file.tx", "file.???"));
        assert!(!matches("ab", "ab?"));
    }

    #[test]
    fn literals_must_match_exactly() {
        assert!(matches("abc", "abc"));
        assert!(!matches("a", "ab"));
        assert!(!matches("ab", "a"));
    }

    #[test]
    fn star_does_not_backtrack() {
        assert!(!matches("banana", "*a"));
        assert!(matches("log1.txt", "log*.txt"));
    }
}
