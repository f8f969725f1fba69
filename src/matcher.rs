//! The matcher: owns the input cursor, call stack, growing table, failure log, and
//! indent state, and implements `eval` for every `Expr` variant — including the
//! left-recursion algorithm, which is the reason this module exists as one file
//! rather than one per operator. Recurses through a grammar with
//! `stacker::maybe_grow` guarding the stack, the same way a plain recursive-descent
//! evaluator would, plus the call stack, growing table, and abort-flag machinery
//! direct left recursion requires.

use crate::error::EngineError;
use crate::expr::{self, Expr};
use crate::failure::FailureLog;
use crate::frame::{ApplyCallFrame, CallStack, FrameRef};
use crate::growing::GrowingTable;
use crate::indent::{IndentState, Mode};
use crate::memo::{MemoEntry, MemoTable};
use crate::rule;
use crate::tree::{
    ApplyTree, ChoiceTree, MutexAltTree, NegLookAheadTree, OptionalTree, ParseTree,
    PosLookAheadTree, RepetitionTree, SequenceTree, TerminalTree,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Rule name `match` uses when `start_rule` is omitted, following the usual
/// top-level grammar convention (`start <- ...`).
pub const DEFAULT_START_RULE: &str = "start";

/// Owns every piece of mutable state a single `match` call touches. Not `Send`/`Sync`
/// (it holds `Rc`/`RefCell`): concurrent matches require separate `Matcher`
/// instances.
pub struct Matcher {
    mode: Mode,
    rules: HashMap<String, Rc<Expr>>,
    input: Rc<[char]>,
    pos: usize,
    call_stack: CallStack,
    growing: GrowingTable,
    memo: MemoTable,
    memo_enabled: bool,
    failure_log: FailureLog,
    indent: IndentState,
    abort_target: Option<u64>,
    next_frame_id: u64,
    default_skip: Rc<Expr>,
}

impl Matcher {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            rules: HashMap::new(),
            input: Rc::from(Vec::new().into_boxed_slice()),
            pos: 0,
            call_stack: CallStack::new(),
            growing: GrowingTable::new(),
            memo: MemoTable::new(),
            memo_enabled: false,
            failure_log: FailureLog::new(),
            indent: IndentState::new(),
            abort_target: None,
            next_frame_id: 0,
            default_skip: build_default_skip(),
        }
    }

    /// Adds or replaces a rule; repeated names overwrite.
    pub fn add_rule(&mut self, name: impl Into<String>, body: Expr) {
        self.rules.insert(name.into(), Rc::new(body));
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether the memo column (disabled by default) is consulted for ordinary,
    /// non-left-recursive `Apply` applications.
    pub fn set_memoization(&mut self, enabled: bool) {
        self.memo_enabled = enabled;
    }

    fn alloc_frame_id(&mut self) -> u64 {
        let id = self.next_frame_id;
        self.next_frame_id += 1;
        id
    }

    fn reset_for_match(&mut self, input: &str) {
        self.input = input.chars().collect::<Vec<char>>().into();
        self.pos = 0;
        self.call_stack = CallStack::new();
        self.growing = GrowingTable::new();
        self.memo.clear();
        self.failure_log.reset();
        self.indent.reset();
        self.abort_target = None;
        self.next_frame_id = 0;
    }

    /// `matcher.match(input, start_rule?)`. `match` is a reserved word in Rust, so
    /// the raw identifier `r#match` carries the name across verbatim. Panics on a
    /// `GrammarError`/`InvariantViolation`, since those are fatal and not meant to be
    /// caught; a caller who wants to handle them explicitly should use `try_match`
    /// instead.
    pub fn r#match(&mut self, input: &str, start_rule: Option<&str>) -> Option<Rc<ParseTree>> {
        self.try_match(input, start_rule).expect("fatal grammar/engine error during match")
    }

    /// Same contract as `r#match`, but surfaces `GrammarError`/`InvariantViolation`
    /// as an `Err` instead of panicking.
    pub fn try_match(
        &mut self,
        input: &str,
        start_rule: Option<&str>,
    ) -> Result<Option<Rc<ParseTree>>, EngineError> {
        self.reset_for_match(input);
        let start_name = start_rule.unwrap_or(DEFAULT_START_RULE);
        let result = eval_apply(start_name, None, self)?;

        debug_assert!(self.call_stack.is_empty(), "call stack must be empty after match");
        debug_assert!(self.growing.is_empty(), "growing table must be empty after match");
        debug_assert!(self.abort_target.is_none(), "abort flag must be clear after match");

        let input_len = self.input.len();
        Ok(result.filter(|tree| tree.next_pos() == input_len))
    }

    /// Formats the furthest-position diagnostic from the failure log.
    pub fn print_match_failure(&self) -> String {
        self.failure_log.render(&self.input)
    }
}

fn build_default_skip() -> Rc<Expr> {
    let set: Vec<String> = (0u32..=0x20).filter_map(char::from_u32).map(|c| c.to_string()).collect();
    Rc::new(Expr::MutexAlt { set, label: None })
}

fn is_lookahead(expr: &Expr) -> bool {
    matches!(expr, Expr::NegLookAhead { .. } | Expr::PosLookAhead { .. })
}

/// Evaluates the implicit whitespace skip: zero or more applications of the
/// grammar's own `skip` rule if it defined one, else the default ASCII-control
/// class. Only called from syntactic contexts (checked by the caller). Stops on the
/// first non-advancing iteration so a `skip` rule that can match zero-width can
/// never loop forever, the same guard `eval_repetition` needs for the same reason.
fn do_implicit_skip(matcher: &mut Matcher) -> Result<(), EngineError> {
    let body = matcher.rules.get(rule::SKIP_RULE).cloned().unwrap_or_else(|| matcher.default_skip.clone());
    loop {
        let before = matcher.pos;
        let matched = eval_expr(&body, matcher, false)?.is_some();
        if !matched || matcher.pos == before {
            break;
        }
    }
    Ok(())
}

/// Entry point shared by every `Expr` variant: checks the global abort flag first —
/// every variant must see it before attempting anything — and otherwise grows the
/// stack before recursing, via `stacker::maybe_grow`.
pub(crate) fn eval_expr(
    expr: &Rc<Expr>,
    matcher: &mut Matcher,
    syntactic: bool,
) -> Result<Option<Rc<ParseTree>>, EngineError> {
    if matcher.abort_target.is_some() {
        return Ok(None);
    }
    stacker::maybe_grow(32 * 1024, 1024 * 1024, || match &**expr {
        Expr::Apply { rule_name, label } => eval_apply(rule_name, label.as_deref(), matcher),
        Expr::Terminal { literal, label } => Ok(eval_terminal(literal, label, matcher)),
        Expr::MutexAlt { set, label } => eval_mutex_alt(set, label, matcher),
        Expr::Choice { alternatives, label } => eval_choice(alternatives, label, matcher, syntactic),
        Expr::Sequence { elements, label } => eval_sequence(elements, label, matcher, syntactic),
        Expr::Optional { inner, label } => eval_optional(inner, label, matcher, syntactic),
        Expr::Repetition0 { inner, label } => eval_repetition(inner, label, matcher, syntactic, false),
        Expr::Repetition1 { inner, label } => eval_repetition(inner, label, matcher, syntactic, true),
        Expr::NegLookAhead { inner, label } => eval_lookahead(inner, label, matcher, syntactic, false),
        Expr::PosLookAhead { inner, label } => eval_lookahead(inner, label, matcher, syntactic, true),
    })
}

fn eval_terminal(literal: &str, label: &Option<String>, matcher: &mut Matcher) -> Option<Rc<ParseTree>> {
    let start = matcher.pos;

    if literal == expr::INDENT {
        if matcher.mode != Mode::Python {
            return None;
        }
        let new_pos = matcher.indent.try_indent(&matcher.input, start)?;
        matcher.pos = new_pos;
        return Some(Rc::new(ParseTree::Terminal(TerminalTree {
            text: expr::INDENT.to_string(),
            start_pos: start,
            finishing_pos: new_pos as isize - 1,
            label: label.clone(),
        })));
    }
    if literal == expr::DEDENT {
        if matcher.mode != Mode::Python {
            return None;
        }
        let new_pos = matcher.indent.try_dedent(&matcher.input, start)?;
        matcher.pos = new_pos;
        return Some(Rc::new(ParseTree::Terminal(TerminalTree {
            text: expr::DEDENT.to_string(),
            start_pos: start,
            finishing_pos: new_pos as isize - 1,
            label: label.clone(),
        })));
    }

    let wanted: Vec<char> = literal.chars().collect();
    let len = wanted.len();
    let matches = matcher.input.get(start..start + len).is_some_and(|slice| slice == wanted.as_slice());
    if matches {
        matcher.pos = start + len;
        Some(Rc::new(ParseTree::Terminal(TerminalTree {
            text: literal.to_string(),
            start_pos: start,
            finishing_pos: (start + len) as isize - 1,
            label: label.clone(),
        })))
    } else {
        matcher.failure_log.log(start, &Expr::Terminal { literal: literal.to_string(), label: None });
        None
    }
}

/// `set.is_empty()` is `dot`: any single Unicode scalar value. Otherwise every
/// member must share one length, a `GrammarError` if violated.
fn eval_mutex_alt(
    set: &[String],
    label: &Option<String>,
    matcher: &mut Matcher,
) -> Result<Option<Rc<ParseTree>>, EngineError> {
    let start = matcher.pos;
    let log_expr = Expr::MutexAlt { set: set.to_vec(), label: None };

    if set.is_empty() {
        return Ok(match matcher.input.get(start) {
            Some(c) => {
                matcher.pos = start + 1;
                Some(Rc::new(ParseTree::MutexAlt(MutexAltTree {
                    matched: c.to_string(),
                    start_pos: start,
                    finishing_pos: start as isize,
                    label: label.clone(),
                })))
            }
            None => {
                matcher.failure_log.log(start, &log_expr);
                None
            }
        });
    }

    let width = set[0].chars().count();
    if set.iter().any(|s| s.chars().count() != width) {
        return Err(EngineError::Grammar(format!(
            "MutexAlt members must share one length, got {set:?}"
        )));
    }

    let slice: Option<String> = matcher.input.get(start..start + width).map(|s| s.iter().collect());
    match slice {
        Some(s) if set.iter().any(|member| *member == s) => {
            matcher.pos = start + width;
            Ok(Some(Rc::new(ParseTree::MutexAlt(MutexAltTree {
                matched: s,
                start_pos: start,
                finishing_pos: (start + width) as isize - 1,
                label: label.clone(),
            }))))
        }
        _ => {
            matcher.failure_log.log(start, &log_expr);
            Ok(None)
        }
    }
}

fn eval_sequence(
    elements: &[Rc<Expr>],
    label: &Option<String>,
    matcher: &mut Matcher,
    syntactic: bool,
) -> Result<Option<Rc<ParseTree>>, EngineError> {
    let start = matcher.pos;
    let mut children = Vec::with_capacity(elements.len());
    for (i, element) in elements.iter().enumerate() {
        if i > 0 && syntactic {
            do_implicit_skip(matcher)?;
        }
        if matcher.abort_target.is_some() {
            matcher.pos = start;
            return Ok(None);
        }
        match eval_expr(element, matcher, syntactic)? {
            Some(tree) => {
                if !is_lookahead(element) {
                    children.push(tree);
                }
            }
            None => {
                matcher.pos = start;
                return Ok(None);
            }
        }
    }
    let finishing = finishing_pos_for(start, matcher.pos);
    Ok(Some(Rc::new(ParseTree::Sequence(SequenceTree {
        children,
        start_pos: start,
        finishing_pos: finishing,
        label: label.clone(),
    }))))
}

fn eval_choice(
    alternatives: &[Rc<Expr>],
    label: &Option<String>,
    matcher: &mut Matcher,
    syntactic: bool,
) -> Result<Option<Rc<ParseTree>>, EngineError> {
    let start = matcher.pos;
    for (index, alternative) in alternatives.iter().enumerate() {
        // Lookahead alternatives at the top level only make sense as guards inside a
        // sequence; a bare lookahead as one choice of many is skipped during
        // iteration.
        if is_lookahead(alternative) {
            continue;
        }
        matcher.pos = start;
        match eval_expr(alternative, matcher, syntactic)? {
            Some(tree) => {
                return Ok(Some(Rc::new(ParseTree::Choice(ChoiceTree {
                    chosen_index: index,
                    finishing_pos: tree.finishing_pos(),
                    child: tree,
                    start_pos: start,
                    label: label.clone(),
                }))));
            }
            None => {
                if matcher.abort_target.is_some() {
                    matcher.pos = start;
                    return Ok(None);
                }
            }
        }
    }
    matcher.pos = start;
    Ok(None)
}

fn eval_optional(
    inner: &Rc<Expr>,
    label: &Option<String>,
    matcher: &mut Matcher,
    syntactic: bool,
) -> Result<Option<Rc<ParseTree>>, EngineError> {
    let start = matcher.pos;
    let result = eval_expr(inner, matcher, syntactic)?;
    // `opt(e)` never fails, except when the abort flag is what made `inner` come
    // back empty — that failure must still propagate, or an intermediate frame
    // could swallow the very signal the left-recursion unwind depends on.
    if result.is_none() && matcher.abort_target.is_some() {
        matcher.pos = start;
        return Ok(None);
    }
    let child = if is_lookahead(inner) { None } else { result };
    if child.is_none() {
        matcher.pos = start;
    }
    let finishing = child.as_ref().map_or(start as isize - 1, |t| t.finishing_pos());
    Ok(Some(Rc::new(ParseTree::Optional(OptionalTree {
        child,
        start_pos: start,
        finishing_pos: finishing,
        label: label.clone(),
    }))))
}

fn eval_repetition(
    inner: &Rc<Expr>,
    label: &Option<String>,
    matcher: &mut Matcher,
    syntactic: bool,
    require_one: bool,
) -> Result<Option<Rc<ParseTree>>, EngineError> {
    let start = matcher.pos;
    let mut children = Vec::new();
    let mut last_end = start;

    loop {
        if !children.is_empty() && syntactic {
            do_implicit_skip(matcher)?;
            if matcher.abort_target.is_some() {
                matcher.pos = start;
                return Ok(None);
            }
        }
        let attempt_start = matcher.pos;
        match eval_expr(inner, matcher, syntactic)? {
            Some(tree) => {
                last_end = matcher.pos;
                if !is_lookahead(inner) {
                    children.push(tree);
                }
                if matcher.pos == attempt_start {
                    // Zero-width match: stop after counting it once rather than
                    // looping forever (implementation safeguard, see DESIGN.md).
                    break;
                }
            }
            None => {
                if matcher.abort_target.is_some() {
                    matcher.pos = start;
                    return Ok(None);
                }
                matcher.pos = last_end;
                break;
            }
        }
    }

    matcher.pos = last_end;
    if require_one && children.is_empty() {
        matcher.pos = start;
        return Ok(None);
    }
    let finishing = finishing_pos_for(start, last_end);
    Ok(Some(Rc::new(ParseTree::Repetition(RepetitionTree {
        children,
        start_pos: start,
        finishing_pos: finishing,
        label: label.clone(),
    }))))
}

fn eval_lookahead(
    inner: &Rc<Expr>,
    label: &Option<String>,
    matcher: &mut Matcher,
    syntactic: bool,
    positive: bool,
) -> Result<Option<Rc<ParseTree>>, EngineError> {
    let start = matcher.pos;
    let result = eval_expr(inner, matcher, syntactic)?;
    matcher.pos = start; // unconditional reset: lookaheads never consume input.
    if matcher.abort_target.is_some() {
        return Ok(None);
    }
    let matched = if positive { result.is_some() } else { result.is_none() };
    if !matched {
        return Ok(None);
    }
    let finishing = start as isize - 1;
    Ok(Some(if positive {
        Rc::new(ParseTree::PosLookAhead(PosLookAheadTree { start_pos: start, finishing_pos: finishing, label: label.clone() }))
    } else {
        Rc::new(ParseTree::NegLookAhead(NegLookAheadTree { start_pos: start, finishing_pos: finishing, label: label.clone() }))
    }))
}

fn finishing_pos_for(start: usize, end: usize) -> isize {
    if end == start {
        start as isize - 1
    } else {
        end as isize - 1
    }
}

/// Runs `body` and, on return, checks whether the abort flag was raised targeting
/// `cur`: if so this is the frame the seed-growing algorithm has been trying to
/// unwind back to, so it catches the grown seed instead of propagating failure. If
/// the flag targets some other, outer frame, the failure is propagated untouched.
/// This is the ordinary, non-left-recursive way of applying a rule body — used by
/// Case C applications and, identically, by each iteration of the seed-growing loop
/// in Case B, since the catch check is a no-op unless `cur` actually is the abort's
/// target.
fn traditional_application(
    body: &Rc<Expr>,
    cur: &FrameRef,
    matcher: &mut Matcher,
    syntactic: bool,
) -> Result<Option<Rc<ParseTree>>, EngineError> {
    let result = eval_expr(body, matcher, syntactic)?;
    match matcher.abort_target {
        Some(target) if target == cur.borrow().id => {
            matcher.abort_target = None;
            let seed = cur.borrow_mut().seed_parse_tree.take().ok_or_else(|| {
                EngineError::Invariant(format!(
                    "frame {} was the abort target but has no seed to catch",
                    cur.borrow().id
                ))
            })?;
            matcher.pos = seed.next_pos();
            log::trace!("frame {} caught abort, adopting seed ending at {}", cur.borrow().id, seed.finishing_pos());
            Ok(Some(seed))
        }
        Some(_) => Ok(None),
        None => Ok(result),
    }
}

/// The left-recursion algorithm. `rule_name`'s body is looked up fresh each call —
/// grammars can be extended by further `add_rule` calls between matches, and
/// `Apply` never caches a stale reference to a rule that was later redefined.
fn eval_apply(
    rule_name: &str,
    label: Option<&str>,
    matcher: &mut Matcher,
) -> Result<Option<Rc<ParseTree>>, EngineError> {
    let entry_pos = matcher.pos;
    let body = matcher
        .rules
        .get(rule_name)
        .cloned()
        .ok_or_else(|| EngineError::Grammar(format!("unknown rule `{rule_name}`")))?;
    let syntactic = rule::is_syntactic(rule_name);

    let prev_at_pos = matcher.call_stack.most_recent_at(rule_name, entry_pos);
    let this_is_lr_at_pos = prev_at_pos.is_some();
    let lr_anywhere = matcher.call_stack.most_recent_left_recursive(rule_name);

    let frame_id = matcher.alloc_frame_id();
    let cur: FrameRef = Rc::new(RefCell::new(ApplyCallFrame {
        id: frame_id,
        rule_name: rule_name.to_string(),
        position: entry_pos,
        is_left_recursive_at_pos: this_is_lr_at_pos,
        seed_parse_tree: None,
    }));
    matcher.call_stack.push(cur.clone());

    let growing_here = matcher.growing.has_entry(rule_name, entry_pos);

    let body_result: Option<Rc<ParseTree>> = if lr_anywhere.is_some() && growing_here {
        // Case A: a nested re-entry while a seed for this (rule, position) is being
        // grown. Return the seed accumulated so far without descending further.
        let seed = matcher.growing.seed_at(rule_name, entry_pos);
        match &seed {
            Some(tree) => matcher.pos = tree.next_pos(),
            None => matcher.pos = entry_pos,
        }
        seed
    } else if this_is_lr_at_pos {
        let k = matcher.growing.active_position_count(rule_name);
        if k == 0 {
            // Case B, top-level: this frame drives the seed-growing loop on behalf
            // of `prev_at_pos`, the outer non-recursive frame still suspended inside
            // its own traditional application of this same rule.
            log::debug!("starting top-level seed growth for `{rule_name}` at {entry_pos}");
            matcher.growing.start_growing(rule_name, entry_pos);
            matcher.memo.invalidate(rule_name, entry_pos);
            loop {
                matcher.pos = entry_pos;
                let candidate = traditional_application(&body, &cur, matcher, syntactic)?;
                let current_seed = matcher.growing.seed_at(rule_name, entry_pos);
                let grew = match (&candidate, &current_seed) {
                    (None, _) => false,
                    (Some(new_tree), Some(seed)) => new_tree.finishing_pos() > seed.finishing_pos(),
                    (Some(_), None) => true,
                };
                if !grew {
                    let final_seed = matcher.growing.finish_growing(rule_name, entry_pos);
                    if let Some(prev) = &prev_at_pos {
                        prev.borrow_mut().seed_parse_tree = final_seed.clone();
                        matcher.abort_target = Some(prev.borrow().id);
                        log::debug!(
                            "seed for `{rule_name}` at {entry_pos} saturated ({:?}), aborting to frame {}",
                            final_seed.as_ref().map(ParseTree::finishing_pos),
                            prev.borrow().id
                        );
                    }
                    break None;
                }
                matcher.growing.update_seed(rule_name, entry_pos, candidate);
            }
        } else {
            // Case B, nested: a deeper seed within an already-growing outer seed.
            // Pin the seed at `None` for exactly one attempt so recursion below this
            // point cannot itself grow.
            log::debug!("nested seed growth for `{rule_name}` at {entry_pos} (k={k})");
            matcher.growing.start_growing(rule_name, entry_pos);
            matcher.memo.invalidate(rule_name, entry_pos);
            matcher.pos = entry_pos;
            let attempt = traditional_application(&body, &cur, matcher, syntactic)?;
            matcher.growing.finish_growing(rule_name, entry_pos);
            if attempt.is_some() {
                let prev_is_lr = prev_at_pos.as_ref().is_some_and(|f| f.borrow().is_left_recursive_at_pos);
                if !prev_is_lr {
                    if let Some(prev) = &prev_at_pos {
                        prev.borrow_mut().seed_parse_tree = attempt.clone();
                        matcher.abort_target = Some(prev.borrow().id);
                    }
                }
            }
            None
        }
    } else if matcher.memo_enabled {
        // Case C, memoized.
        if let Some(entry) = matcher.memo.get(rule_name, entry_pos).cloned() {
            matcher.pos = entry.next_pos;
            entry.tree
        } else {
            let result = traditional_application(&body, &cur, matcher, syntactic)?;
            matcher.memo.insert(rule_name, entry_pos, MemoEntry { tree: result.clone(), next_pos: matcher.pos });
            result
        }
    } else {
        // Case C, ordinary.
        traditional_application(&body, &cur, matcher, syntactic)?
    };

    let popped = matcher.call_stack.pop();
    match popped {
        Some(frame) if frame.borrow().id == frame_id => {}
        _ => {
            return Err(EngineError::Invariant(format!(
                "call stack frame mismatch popping `{rule_name}` at {entry_pos}"
            )))
        }
    }

    match body_result {
        Some(tree) => Ok(Some(Rc::new(ParseTree::Apply(ApplyTree {
            rule_name: rule_name.to_string(),
            start_pos: entry_pos,
            finishing_pos: tree.finishing_pos(),
            child: tree,
            label: label.map(String::from),
        })))),
        None => {
            matcher.pos = entry_pos;
            Ok(None)
        }
    }
}
