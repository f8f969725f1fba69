//! Failure log.
//!
//! Collects, for diagnostics only, the furthest input position at which an atomic
//! expression (`Terminal` or `MutexAlt`) failed to match, along with the set of
//! descriptions of what was expected there. Generalizes `backtracking_parser.rs`'s
//! `FailureCache` (which logged token terminals) to the richer `Expectation` shape
//! this engine's atomic expressions need.

use crate::expr::Expr;
use itertools::Itertools;
use std::collections::HashSet;

#[derive(Default)]
pub struct FailureLog {
    furthest_pos: usize,
    expected: HashSet<String>,
}

impl FailureLog {
    pub fn new() -> Self {
        Self { furthest_pos: 0, expected: HashSet::new() }
    }

    /// Records that `expr` failed to match at `pos`. As in `FailureCache::log`, only
    /// the furthest position seen so far is kept — anything logged at a shallower
    /// position is simply not as useful a diagnostic and is discarded; a new
    /// furthest position resets the expected set.
    pub fn log(&mut self, pos: usize, expr: &Expr) {
        if pos > self.furthest_pos {
            self.furthest_pos = pos;
            self.expected.clear();
        }
        if pos == self.furthest_pos {
            self.expected.insert(expr.describe());
        }
    }

    pub fn furthest_pos(&self) -> usize {
        self.furthest_pos
    }

    pub fn expected(&self) -> &HashSet<String> {
        &self.expected
    }

    pub fn reset(&mut self) {
        self.furthest_pos = 0;
        self.expected.clear();
    }

    /// Renders a diagnostic: position, a 40-character window starting 10 characters
    /// before the failure, a caret indicator, and the expected set.
    pub fn render(&self, input: &[char]) -> String {
        let pos = self.furthest_pos;
        let window_start = pos.saturating_sub(10);
        let window_end = (window_start + 40).min(input.len());
        let window: String = input[window_start..window_end].iter().collect();
        let caret_offset = pos.saturating_sub(window_start);
        let caret_line = format!("{}^", " ".repeat(caret_offset));
        let expected = self.expected.iter().sorted().join(", ");
        format!(
            "parse failure at position {pos}:\n{window}\n{caret_line}\nexpected: {expected}"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::term;

    #[test]
    fn keeps_only_furthest_position() {
        let mut log = FailureLog::new();
        log.log(2, &term("a"));
        log.log(5, &term("b"));
        log.log(1, &term("c"));
        assert_eq!(log.furthest_pos(), 5);
        assert_eq!(log.expected().len(), 1);
        assert!(log.expected().contains(&term("b").describe()));
    }

    #[test]
    fn accumulates_multiple_expectations_at_same_position() {
        let mut log = FailureLog::new();
        log.log(3, &term("a"));
        log.log(3, &term("b"));
        assert_eq!(log.expected().len(), 2);
    }

    #[test]
    fn render_includes_position_and_expected_set() {
        let mut log = FailureLog::new();
        log.log(4, &term("x"));
        let input: Vec<char> = "hello world".chars().collect();
        let rendered = log.render(&input);
        assert!(rendered.contains("position 4"));
        assert!(rendered.contains("\"x\""));
    }
}
