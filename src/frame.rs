//! Call stack.
//!
//! The left-recursion algorithm needs to scan back through in-progress `Apply`
//! frames looking for an earlier attempt at the same `(rule, position)`, or for any
//! frame currently marked left-recursive. The host language's own call stack can't
//! be inspected that way, so the engine maintains this as an explicit, searchable
//! data structure in parallel with (not instead of) natural recursion into
//! sub-expressions.

use crate::tree::ParseTree;
use std::cell::RefCell;
use std::rc::Rc;

/// One in-progress `Apply` application. Pushed on entry to `Apply`'s evaluation,
/// popped on exit. `seed_parse_tree` starts empty and may be written by a *deeper*
/// frame (the one driving seed growth) before this frame resumes — that's the whole
/// point of the abort-and-catch protocol that unwinds a grown seed back up to the
/// frame that should adopt it.
#[derive(Debug)]
pub struct ApplyCallFrame {
    pub id: u64,
    pub rule_name: String,
    pub position: usize,
    pub is_left_recursive_at_pos: bool,
    pub seed_parse_tree: Option<Rc<ParseTree>>,
}

pub type FrameRef = Rc<RefCell<ApplyCallFrame>>;

/// Thin wrapper around `Vec<FrameRef>` exposing only the two searches the algorithm
/// needs, scanning from the most recently pushed frame backward.
#[derive(Default)]
pub struct CallStack {
    frames: Vec<FrameRef>,
}

impl CallStack {
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    pub fn push(&mut self, frame: FrameRef) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<FrameRef> {
        self.frames.pop()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Most recent frame applying `rule_name` at `position`, if any. A hit here means
    /// the application currently being pushed is a left-recursive re-entry into the
    /// same rule at the same position as that earlier, still-suspended frame.
    pub fn most_recent_at(&self, rule_name: &str, position: usize) -> Option<FrameRef> {
        self.frames.iter().rev().find(|f| {
            let f = f.borrow();
            f.rule_name == rule_name && f.position == position
        }).cloned()
    }

    /// Most recent frame applying `rule_name` anywhere on the stack that is itself
    /// marked left-recursive, regardless of position.
    pub fn most_recent_left_recursive(&self, rule_name: &str) -> Option<FrameRef> {
        self.frames.iter().rev().find(|f| {
            let f = f.borrow();
            f.rule_name == rule_name && f.is_left_recursive_at_pos
        }).cloned()
    }
}
