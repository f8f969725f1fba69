//! Growing table.
//!
//! Maps `rule -> position -> seed`. An entry's mere *presence* at `(rule, pos)` means
//! "a seed is currently being grown for this rule at this position" — the stored
//! value, `None` vs `Some(tree)`, is whether that seed has succeeded at least once
//! yet. Absence of an entry means ordinary (non-seed-growing) evaluation applies.
//! Seeds are owned by this table while present; ownership moves to an
//! `ApplyCallFrame::seed_parse_tree` once the seed-growing loop publishes its final
//! result.

use crate::tree::ParseTree;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Default)]
pub struct GrowingTable {
    table: HashMap<String, HashMap<usize, Option<Rc<ParseTree>>>>,
}

impl GrowingTable {
    pub fn new() -> Self {
        Self { table: HashMap::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Number of positions currently being grown for `rule_name`: zero means this
    /// would be a fresh, top-level seed; more than zero means a deeper seed is being
    /// grown inside an already-growing outer one.
    pub fn active_position_count(&self, rule_name: &str) -> usize {
        self.table.get(rule_name).map_or(0, |m| m.len())
    }

    pub fn has_entry(&self, rule_name: &str, position: usize) -> bool {
        self.table.get(rule_name).is_some_and(|m| m.contains_key(&position))
    }

    pub fn seed_at(&self, rule_name: &str, position: usize) -> Option<Rc<ParseTree>> {
        self.table.get(rule_name).and_then(|m| m.get(&position)).cloned().flatten()
    }

    pub fn start_growing(&mut self, rule_name: &str, position: usize) {
        self.table.entry(rule_name.to_string()).or_default().insert(position, None);
    }

    pub fn update_seed(&mut self, rule_name: &str, position: usize, seed: Option<Rc<ParseTree>>) {
        self.table.entry(rule_name.to_string()).or_default().insert(position, seed);
    }

    /// Removes the `(rule, pos)` entry, returning whatever seed was stored there, and
    /// prunes the rule's inner map if it becomes empty so `active_position_count`
    /// reports `0` again rather than an empty-but-present map.
    pub fn finish_growing(&mut self, rule_name: &str, position: usize) -> Option<Rc<ParseTree>> {
        let seed = self.table.get_mut(rule_name).and_then(|m| m.remove(&position)).flatten();
        if self.table.get(rule_name).is_some_and(|m| m.is_empty()) {
            self.table.remove(rule_name);
        }
        seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{ParseTree, TerminalTree};

    fn dummy_tree(finishing_pos: isize) -> Rc<ParseTree> {
        Rc::new(ParseTree::Terminal(TerminalTree {
            text: "x".to_string(),
            start_pos: 0,
            finishing_pos,
            label: None,
        }))
    }

    #[test]
    fn presence_tracks_active_growth() {
        let mut table = GrowingTable::new();
        assert!(!table.has_entry("expr", 0));
        table.start_growing("expr", 0);
        assert!(table.has_entry("expr", 0));
        assert_eq!(table.active_position_count("expr"), 1);
        assert_eq!(table.seed_at("expr", 0), None);
    }

    #[test]
    fn finishing_removes_entry_and_prunes_empty_rule() {
        let mut table = GrowingTable::new();
        table.start_growing("expr", 0);
        table.update_seed("expr", 0, Some(dummy_tree(0)));
        let seed = table.finish_growing("expr", 0);
        assert!(seed.is_some());
        assert!(!table.has_entry("expr", 0));
        assert_eq!(table.active_position_count("expr"), 0);
        assert!(table.is_empty());
    }

    #[test]
    fn independent_positions_for_same_rule() {
        let mut table = GrowingTable::new();
        table.start_growing("expr", 0);
        table.start_growing("expr", 5);
        assert_eq!(table.active_position_count("expr"), 2);
        table.finish_growing("expr", 0);
        assert_eq!(table.active_position_count("expr"), 1);
        assert!(table.has_entry("expr", 5));
    }
}
