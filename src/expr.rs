//! Parsing-expression family and the small DSL used to build grammars.
//!
//! The nine variants are a closed tagged union, not a trait hierarchy: every variant
//! has the same `eval` shape (see `matcher::eval_expr`), so there is nothing a virtual
//! dispatch would buy us. `Apply` refers to other rules by name rather than by
//! pointer — the expression graph is cyclic through `Apply -> rule -> body`, and a
//! name plus a late lookup into the rule registry breaks the ownership cycle that a
//! direct reference would create.

use std::rc::Rc;

/// Reserved rule names used as pseudo-tokens inside `Terminal` in Python mode.
pub const INDENT: &str = "INDENT";
pub const DEDENT: &str = "DEDENT";

#[derive(Clone, Debug)]
pub enum Expr {
    Apply {
        rule_name: String,
        label: Option<String>,
    },
    Terminal {
        literal: String,
        label: Option<String>,
    },
    MutexAlt {
        set: Vec<String>,
        label: Option<String>,
    },
    Choice {
        alternatives: Vec<Rc<Expr>>,
        label: Option<String>,
    },
    Sequence {
        elements: Vec<Rc<Expr>>,
        label: Option<String>,
    },
    Optional {
        inner: Rc<Expr>,
        label: Option<String>,
    },
    Repetition0 {
        inner: Rc<Expr>,
        label: Option<String>,
    },
    Repetition1 {
        inner: Rc<Expr>,
        label: Option<String>,
    },
    NegLookAhead {
        inner: Rc<Expr>,
        label: Option<String>,
    },
    PosLookAhead {
        inner: Rc<Expr>,
        label: Option<String>,
    },
}

impl Expr {
    pub fn label_of(&self) -> Option<&str> {
        match self {
            Expr::Apply { label, .. }
            | Expr::Terminal { label, .. }
            | Expr::MutexAlt { label, .. }
            | Expr::Choice { label, .. }
            | Expr::Sequence { label, .. }
            | Expr::Optional { label, .. }
            | Expr::Repetition0 { label, .. }
            | Expr::Repetition1 { label, .. }
            | Expr::NegLookAhead { label, .. }
            | Expr::PosLookAhead { label, .. } => label.as_deref(),
        }
    }

    /// Attaches a label, producing a new expression with the label field set. `Expr`
    /// values are immutable and usually shared via `Rc` once wired into a grammar, so
    /// this clones the tag rather than mutating in place; grammar construction is a
    /// one-time cost paid well before any matching happens.
    pub fn label(self, name: impl Into<String>) -> Expr {
        let name = Some(name.into());
        match self {
            Expr::Apply { rule_name, .. } => Expr::Apply { rule_name, label: name },
            Expr::Terminal { literal, .. } => Expr::Terminal { literal, label: name },
            Expr::MutexAlt { set, .. } => Expr::MutexAlt { set, label: name },
            Expr::Choice { alternatives, .. } => Expr::Choice { alternatives, label: name },
            Expr::Sequence { elements, .. } => Expr::Sequence { elements, label: name },
            Expr::Optional { inner, .. } => Expr::Optional { inner, label: name },
            Expr::Repetition0 { inner, .. } => Expr::Repetition0 { inner, label: name },
            Expr::Repetition1 { inner, .. } => Expr::Repetition1 { inner, label: name },
            Expr::NegLookAhead { inner, .. } => Expr::NegLookAhead { inner, label: name },
            Expr::PosLookAhead { inner, .. } => Expr::PosLookAhead { inner, label: name },
        }
    }

    /// Human-readable description used in failure diagnostics for the atomic
    /// (terminal-class) expressions. Only `Terminal` and `MutexAlt` ever appear in
    /// the failure log, since they are the only expressions that fail "at a single
    /// point" rather than by delegating to sub-expressions.
    pub fn describe(&self) -> String {
        match self {
            Expr::Terminal { literal, .. } => format!("{literal:?}"),
            Expr::MutexAlt { set, .. } if set.is_empty() => "any character".to_string(),
            Expr::MutexAlt { set, .. } => {
                use itertools::Itertools;
                format!("one of [{}]", set.iter().map(|s| format!("{s:?}")).join(", "))
            }
            other => format!("{other:?}"),
        }
    }
}

// --- DSL constructors -------------------------------------------------------------

pub fn apply(rule_name: impl Into<String>) -> Expr {
    Expr::Apply { rule_name: rule_name.into(), label: None }
}

pub fn term(literal: impl Into<String>) -> Expr {
    Expr::Terminal { literal: literal.into(), label: None }
}

/// All strings in `set` must have equal length; this is checked at match time (a
/// width mismatch is a `GrammarError`, not an ordinary parse failure) since grammars
/// are built before any input is known.
pub fn alt<I, S>(set: I) -> Expr
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Expr::MutexAlt { set: set.into_iter().map(Into::into).collect(), label: None }
}

pub fn choice(alternatives: Vec<Expr>) -> Expr {
    Expr::Choice { alternatives: alternatives.into_iter().map(Rc::new).collect(), label: None }
}

pub fn seq(elements: Vec<Expr>) -> Expr {
    Expr::Sequence { elements: elements.into_iter().map(Rc::new).collect(), label: None }
}

pub fn opt(inner: Expr) -> Expr {
    Expr::Optional { inner: Rc::new(inner), label: None }
}

pub fn star(inner: Expr) -> Expr {
    Expr::Repetition0 { inner: Rc::new(inner), label: None }
}

pub fn plus(inner: Expr) -> Expr {
    Expr::Repetition1 { inner: Rc::new(inner), label: None }
}

pub fn neg(inner: Expr) -> Expr {
    Expr::NegLookAhead { inner: Rc::new(inner), label: None }
}

pub fn pos(inner: Expr) -> Expr {
    Expr::PosLookAhead { inner: Rc::new(inner), label: None }
}

/// Matches exactly one Unicode scalar value. Represented as `MutexAlt` with an empty
/// set: every other `MutexAlt` requires its members to share one length, so an empty
/// set is otherwise a useless, always-failing expression, and `matcher::eval_expr`
/// special-cases it to mean "any single character" rather than adding a tenth `Expr`
/// variant for one wildcard.
pub fn dot() -> Expr {
    Expr::MutexAlt { set: Vec::new(), label: None }
}
