//! Fatal error paths: unresolved rule names and malformed `MutexAlt` sets surface as
//! `EngineError`, not as an ordinary `None` match result.

use growpeg::expr::*;
use growpeg::{new_matcher, EngineError, Mode};

#[test]
fn unknown_rule_is_a_grammar_error() {
    let mut matcher = new_matcher(Mode::Standard);
    matcher.add_rule("start", apply("missing"));
    let err = matcher.try_match("anything", None).expect_err("should be fatal");
    assert!(matches!(err, EngineError::Grammar(_)));
    assert!(err.to_string().contains("missing"));
}

#[test]
fn mismatched_mutex_alt_widths_are_a_grammar_error() {
    let mut matcher = new_matcher(Mode::Standard);
    matcher.add_rule("start", alt(["ab", "c"]));
    let err = matcher.try_match("ab", None).expect_err("should be fatal");
    assert!(matches!(err, EngineError::Grammar(_)));
}

#[test]
fn r#match_panics_on_fatal_error() {
    let mut matcher = new_matcher(Mode::Standard);
    matcher.add_rule("start", apply("missing"));
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        matcher.r#match("anything", None)
    }));
    assert!(result.is_err());
}

#[test]
fn well_formed_grammar_matches_without_error() {
    let mut matcher = new_matcher(Mode::Standard);
    matcher.add_rule("start", term("ok"));
    assert!(matcher.try_match("ok", None).expect("no fatal error").is_some());
}
