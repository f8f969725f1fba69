//! Parse-tree node family: the result values a successful match produces.
//!
//! A `ParseTree` is produced only by a successful match. Every node carries its own
//! span (`start_pos..=finishing_pos`, scalar-value indices into the input), an
//! optional label attached by the grammar author via `.label(..)`, and whatever
//! children its shape implies. `finishing_pos` uses `isize` rather than `usize`
//! because a zero-width match's finishing position is `start_pos - 1`.

use std::rc::Rc;

/// One node of a completed parse. Shared via `Rc` once built: the left-recursion
/// algorithm reuses earlier seeds as children of later, longer seeds, so trees must
/// be cheaply shareable rather than uniquely owned.
#[derive(Clone, Debug)]
pub enum ParseTree {
    Apply(ApplyTree),
    Terminal(TerminalTree),
    MutexAlt(MutexAltTree),
    Choice(ChoiceTree),
    Sequence(SequenceTree),
    Optional(OptionalTree),
    Repetition(RepetitionTree),
    NegLookAhead(NegLookAheadTree),
    PosLookAhead(PosLookAheadTree),
}

#[derive(Clone, Debug)]
pub struct ApplyTree {
    pub rule_name: String,
    pub child: Rc<ParseTree>,
    pub start_pos: usize,
    pub finishing_pos: isize,
    pub label: Option<String>,
}

#[derive(Clone, Debug)]
pub struct TerminalTree {
    pub text: String,
    pub start_pos: usize,
    pub finishing_pos: isize,
    pub label: Option<String>,
}

#[derive(Clone, Debug)]
pub struct MutexAltTree {
    pub matched: String,
    pub start_pos: usize,
    pub finishing_pos: isize,
    pub label: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ChoiceTree {
    pub chosen_index: usize,
    pub child: Rc<ParseTree>,
    pub start_pos: usize,
    pub finishing_pos: isize,
    pub label: Option<String>,
}

#[derive(Clone, Debug)]
pub struct SequenceTree {
    pub children: Vec<Rc<ParseTree>>,
    pub start_pos: usize,
    pub finishing_pos: isize,
    pub label: Option<String>,
}

#[derive(Clone, Debug)]
pub struct OptionalTree {
    pub child: Option<Rc<ParseTree>>,
    pub start_pos: usize,
    pub finishing_pos: isize,
    pub label: Option<String>,
}

#[derive(Clone, Debug)]
pub struct RepetitionTree {
    pub children: Vec<Rc<ParseTree>>,
    pub start_pos: usize,
    pub finishing_pos: isize,
    pub label: Option<String>,
}

#[derive(Clone, Debug)]
pub struct NegLookAheadTree {
    pub start_pos: usize,
    pub finishing_pos: isize,
    pub label: Option<String>,
}

#[derive(Clone, Debug)]
pub struct PosLookAheadTree {
    pub start_pos: usize,
    pub finishing_pos: isize,
    pub label: Option<String>,
}

impl ParseTree {
    pub fn start_pos(&self) -> usize {
        match self {
            ParseTree::Apply(t) => t.start_pos,
            ParseTree::Terminal(t) => t.start_pos,
            ParseTree::MutexAlt(t) => t.start_pos,
            ParseTree::Choice(t) => t.start_pos,
            ParseTree::Sequence(t) => t.start_pos,
            ParseTree::Optional(t) => t.start_pos,
            ParseTree::Repetition(t) => t.start_pos,
            ParseTree::NegLookAhead(t) => t.start_pos,
            ParseTree::PosLookAhead(t) => t.start_pos,
        }
    }

    pub fn finishing_pos(&self) -> isize {
        match self {
            ParseTree::Apply(t) => t.finishing_pos,
            ParseTree::Terminal(t) => t.finishing_pos,
            ParseTree::MutexAlt(t) => t.finishing_pos,
            ParseTree::Choice(t) => t.finishing_pos,
            ParseTree::Sequence(t) => t.finishing_pos,
            ParseTree::Optional(t) => t.finishing_pos,
            ParseTree::Repetition(t) => t.finishing_pos,
            ParseTree::NegLookAhead(t) => t.finishing_pos,
            ParseTree::PosLookAhead(t) => t.finishing_pos,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            ParseTree::Apply(t) => t.label.as_deref(),
            ParseTree::Terminal(t) => t.label.as_deref(),
            ParseTree::MutexAlt(t) => t.label.as_deref(),
            ParseTree::Choice(t) => t.label.as_deref(),
            ParseTree::Sequence(t) => t.label.as_deref(),
            ParseTree::Optional(t) => t.label.as_deref(),
            ParseTree::Repetition(t) => t.label.as_deref(),
            ParseTree::NegLookAhead(t) => t.label.as_deref(),
            ParseTree::PosLookAhead(t) => t.label.as_deref(),
        }
    }

    /// Position just past the last character this node consumed; for a zero-width
    /// match this equals `start_pos()`.
    pub fn next_pos(&self) -> usize {
        (self.finishing_pos() + 1) as usize
    }

    /// Children of this node, in declaration order, for callers that want to walk the
    /// tree without matching on every variant themselves.
    pub fn children(&self) -> Vec<Rc<ParseTree>> {
        match self {
            ParseTree::Apply(t) => vec![t.child.clone()],
            ParseTree::Terminal(_) | ParseTree::MutexAlt(_) => vec![],
            ParseTree::Choice(t) => vec![t.child.clone()],
            ParseTree::Sequence(t) => t.children.clone(),
            ParseTree::Optional(t) => t.child.iter().cloned().collect(),
            ParseTree::Repetition(t) => t.children.clone(),
            ParseTree::NegLookAhead(_) | ParseTree::PosLookAhead(_) => vec![],
        }
    }
}

impl std::fmt::Display for ParseTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn go(tree: &ParseTree, depth: usize, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            let indent = "  ".repeat(depth);
            let name = match tree {
                ParseTree::Apply(t) => format!("Apply({})", t.rule_name),
                ParseTree::Terminal(t) => format!("Terminal({:?})", t.text),
                ParseTree::MutexAlt(t) => format!("MutexAlt({:?})", t.matched),
                ParseTree::Choice(t) => format!("Choice[{}]", t.chosen_index),
                ParseTree::Sequence(_) => "Sequence".to_string(),
                ParseTree::Optional(_) => "Optional".to_string(),
                ParseTree::Repetition(_) => "Repetition".to_string(),
                ParseTree::NegLookAhead(_) => "NegLookAhead".to_string(),
                ParseTree::PosLookAhead(_) => "PosLookAhead".to_string(),
            };
            writeln!(
                f,
                "{indent}{name} [{}, {}]{}",
                tree.start_pos(),
                tree.finishing_pos(),
                tree.label().map(|l| format!(" @{l}")).unwrap_or_default()
            )?;
            for child in tree.children() {
                go(&child, depth + 1, f)?;
            }
            Ok(())
        }
        go(self, 0, f)
    }
}
