//! A PEG matching engine with direct left recursion and Python-style indentation.
//!
//! A grammar is a set of named rules (`matcher::Matcher::add_rule`) built from the
//! [`Expr`] DSL in [`expr`]; matching a rule against an input string produces a
//! [`ParseTree`] rooted at that rule. Left-recursive rules (`expr <- expr "-" num /
//! num`) are supported directly, without grammar rewriting, via the seed-growing
//! algorithm in [`matcher`]. Two [`Mode`]s are available: `Standard`, and `Python`,
//! which additionally recognizes `INDENT`/`DEDENT` pseudo-tokens against an explicit
//! indentation stack.
//!
//! ```
//! use growpeg::{expr::*, new_matcher, Mode};
//!
//! let mut matcher = new_matcher(Mode::Standard);
//! matcher.add_rule("start", choice(vec![
//!     seq(vec![apply("start"), term("-"), apply("num")]),
//!     apply("num"),
//! ]));
//! matcher.add_rule("num", plus(alt(["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"])));
//!
//! let tree = matcher.r#match("1-2-3", None).expect("should parse");
//! assert_eq!(tree.next_pos(), 5);
//! ```

pub mod error;
pub mod expr;
pub mod failure;
pub mod frame;
pub mod growing;
pub mod indent;
pub mod matcher;
pub mod memo;
pub mod rule;
pub mod tree;

pub use error::EngineError;
pub use expr::Expr;
pub use indent::Mode;
pub use matcher::Matcher;
pub use tree::ParseTree;

/// `matcher = new_matcher(mode)` — the entry point grammars are built against.
pub fn new_matcher(mode: Mode) -> Matcher {
    Matcher::new(mode)
}
