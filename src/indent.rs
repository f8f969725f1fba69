//! Indentation engine and the `Mode` the matcher runs in.
//!
//! Only meaningful in `Mode::Python`: recognizes the `INDENT`/`DEDENT` pseudo-tokens
//! against a stack of the indentation strings currently open. Reset at the start of
//! every match.

/// Parsing mode. `Standard` never synthesizes `INDENT`/`DEDENT`; in `Python` mode
/// those two reserved `Terminal` literals are intercepted by the indentation engine
/// instead of being matched as literal text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Standard,
    Python,
}

/// The indent level is always `indent_stack.len()`; enforced by construction since
/// level is never stored independently, just derived.
#[derive(Default)]
pub struct IndentState {
    stack: Vec<String>,
}

const INDENT_CHARS: [char; 2] = [' ', '\t'];

impl IndentState {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    pub fn level(&self) -> usize {
        self.stack.len()
    }

    pub fn reset(&mut self) {
        self.stack.clear();
    }

    /// A pseudo-token is only attempted at the start of a line: position 0, or
    /// immediately after a `\n`.
    pub fn at_line_start(input: &[char], pos: usize) -> bool {
        pos == 0 || input.get(pos - 1) == Some(&'\n')
    }

    fn open_prefix_len(&self) -> usize {
        self.stack.iter().map(|s| s.chars().count()).sum()
    }

    /// Attempts `INDENT` at `pos`: consume every currently-open indent string, then a
    /// non-empty maximal run of spaces/tabs, and push that run as a new level.
    /// Returns the new position on success; leaves `self` untouched on failure.
    pub fn try_indent(&mut self, input: &[char], pos: usize) -> Option<usize> {
        if !Self::at_line_start(input, pos) {
            return None;
        }
        let mut cursor = pos;
        for level in &self.stack {
            let len = level.chars().count();
            let slice: String = input.get(cursor..cursor + len)?.iter().collect();
            if slice != *level {
                return None;
            }
            cursor += len;
        }
        let run_start = cursor;
        while input.get(cursor).is_some_and(|c| INDENT_CHARS.contains(c)) {
            cursor += 1;
        }
        if cursor == run_start {
            return None;
        }
        let run: String = input[run_start..cursor].iter().collect();
        log::trace!("INDENT at {pos}: pushing level {run:?} (new level {})", self.stack.len() + 1);
        self.stack.push(run);
        Some(cursor)
    }

    /// Attempts `DEDENT` at `pos`: consume every open indent string except the
    /// innermost, then require that the following character is *not* a space/tab
    /// (otherwise we're still at the same or a deeper level), then pop one level.
    pub fn try_dedent(&mut self, input: &[char], pos: usize) -> Option<usize> {
        if !Self::at_line_start(input, pos) || self.stack.is_empty() {
            return None;
        }
        let mut cursor = pos;
        for level in &self.stack[..self.stack.len() - 1] {
            let len = level.chars().count();
            let slice: String = input.get(cursor..cursor + len)?.iter().collect();
            if slice != *level {
                return None;
            }
            cursor += len;
        }
        if input.get(cursor).is_some_and(|c| INDENT_CHARS.contains(c)) {
            return None;
        }
        self.stack.pop();
        log::trace!("DEDENT at {pos}: new level {}", self.stack.len());
        Some(cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn indent_requires_nonempty_run_and_pushes_level() {
        let input = chars("\n  foo\n");
        let mut state = IndentState::new();
        let after = state.try_indent(&input, 1).expect("should indent");
        assert_eq!(after, 3);
        assert_eq!(state.level(), 1);
    }

    #[test]
    fn indent_fails_with_no_leading_whitespace() {
        let input = chars("\nfoo\n");
        let mut state = IndentState::new();
        assert!(state.try_indent(&input, 1).is_none());
        assert_eq!(state.level(), 0);
    }

    #[test]
    fn indent_fails_off_line_start() {
        let input = chars("a  b");
        let mut state = IndentState::new();
        assert!(state.try_indent(&input, 1).is_none());
    }

    #[test]
    fn dedent_requires_no_further_whitespace() {
        let input = chars("\n  foo\nbar");
        let mut state = IndentState::new();
        state.try_indent(&input, 1).unwrap();
        // position 7 is right after the second '\n', a line start; 'b' is not space/tab.
        let after = state.try_dedent(&input, 7).expect("should dedent");
        assert_eq!(after, 7);
        assert_eq!(state.level(), 0);
    }

    #[test]
    fn dedent_fails_at_deeper_or_equal_indent() {
        let input = chars("\n  \n  x");
        let mut state = IndentState::new();
        state.try_indent(&input, 1).unwrap();
        // position 4 is right after the second '\n', still followed by two spaces.
        assert!(state.try_dedent(&input, 4).is_none());
        assert_eq!(state.level(), 1);
    }

    #[test]
    fn reset_clears_stack() {
        let input = chars("\n  foo\n");
        let mut state = IndentState::new();
        state.try_indent(&input, 1).unwrap();
        state.reset();
        assert_eq!(state.level(), 0);
    }
}
