//! End-to-end scenarios exercising one grammar feature apiece: literal terminals,
//! ordered choice in both alternative orders, optional with and without its child,
//! left-recursive associativity, negative lookahead paired with `dot`, and Python
//! indentation blocks.

use growpeg::expr::{self, *};
use growpeg::{new_matcher, Mode, ParseTree};

fn digits() -> Expr {
    plus(alt(["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"]))
}

#[test]
fn literal_terminal() {
    let _ = env_logger::try_init();
    let mut matcher = new_matcher(Mode::Standard);
    matcher.add_rule("start", term("abc"));

    let tree = matcher.r#match("abc", None).expect("should parse");
    match &*tree {
        ParseTree::Apply(t) => {
            assert_eq!(t.rule_name, "start");
            assert_eq!((t.start_pos, t.finishing_pos), (0, 2));
            match &*t.child {
                ParseTree::Terminal(term) => assert_eq!(term.text, "abc"),
                other => panic!("expected Terminal, got {other:?}"),
            }
        }
        other => panic!("expected Apply, got {other:?}"),
    }

    assert!(matcher.r#match("ab", None).is_none());
}

#[test]
fn ordered_choice_prefers_first_alternative() {
    let mut matcher = new_matcher(Mode::Standard);
    matcher.add_rule(
        "start",
        choice(vec![seq(vec![term("abc"), term("def")]), term("abcdef")]),
    );
    let tree = matcher.r#match("abcdef", None).expect("should parse");
    let ParseTree::Apply(apply) = &*tree else { panic!("expected Apply") };
    let ParseTree::Choice(choice_tree) = &*apply.child else { panic!("expected Choice") };
    assert_eq!(choice_tree.chosen_index, 0);
    assert!(matches!(&*choice_tree.child, ParseTree::Sequence(_)));
}

#[test]
fn swapped_alternative_order_prefers_terminal() {
    let mut matcher = new_matcher(Mode::Standard);
    matcher.add_rule(
        "start",
        choice(vec![term("abcdef"), seq(vec![term("abc"), term("def")])]),
    );
    let tree = matcher.r#match("abcdef", None).expect("should parse");
    let ParseTree::Apply(apply) = &*tree else { panic!("expected Apply") };
    let ParseTree::Choice(choice_tree) = &*apply.child else { panic!("expected Choice") };
    assert_eq!(choice_tree.chosen_index, 0);
    assert!(matches!(&*choice_tree.child, ParseTree::Terminal(_)));
}

#[test]
fn optional_with_and_without_child() {
    let mut matcher = new_matcher(Mode::Standard);
    matcher.add_rule("start", seq(vec![opt(term("abc")), term("def")]));

    let with_match = matcher.r#match("abcdef", None).expect("should parse");
    let ParseTree::Apply(apply) = &*with_match else { panic!("expected Apply") };
    let ParseTree::Sequence(sequence) = &*apply.child else { panic!("expected Sequence") };
    let ParseTree::Optional(optional) = &*sequence.children[0] else { panic!("expected Optional") };
    assert!(optional.child.is_some());

    let without_match = matcher.r#match("def", None).expect("should parse");
    let ParseTree::Apply(apply) = &*without_match else { panic!("expected Apply") };
    let ParseTree::Sequence(sequence) = &*apply.child else { panic!("expected Sequence") };
    let ParseTree::Optional(optional) = &*sequence.children[0] else { panic!("expected Optional") };
    assert!(optional.child.is_none());
}

#[test]
fn left_recursion_is_left_associated() {
    let mut matcher = new_matcher(Mode::Standard);
    matcher.add_rule(
        "expr",
        choice(vec![
            seq(vec![apply("expr"), term("-"), apply("num")]),
            apply("num"),
        ]),
    );
    matcher.add_rule("num", digits());

    let tree = matcher.r#match("1-2-3", Some("expr")).expect("should parse");
    assert_eq!(tree.next_pos(), 5);

    // ((1 - 2) - 3): the outer expr's sequence's first child is itself an
    // expr wrapping "1-2", not a bare num.
    let ParseTree::Apply(outer) = &*tree else { panic!("expected Apply") };
    let ParseTree::Choice(outer_choice) = &*outer.child else { panic!("expected Choice") };
    let ParseTree::Sequence(outer_seq) = &*outer_choice.child else { panic!("expected Sequence") };
    let ParseTree::Apply(inner) = &*outer_seq.children[0] else { panic!("expected nested expr Apply") };
    assert_eq!(inner.rule_name, "expr");
    assert_eq!(inner.finishing_pos, 2); // "1-2"

    let single = matcher.r#match("1", Some("expr")).expect("should parse");
    let ParseTree::Apply(outer) = &*single else { panic!("expected Apply") };
    let ParseTree::Choice(single_choice) = &*outer.child else { panic!("expected Choice") };
    assert_eq!(single_choice.chosen_index, 1); // the bare `num` alternative
}

#[test]
fn negative_lookahead_and_dot() {
    let mut matcher = new_matcher(Mode::Standard);
    matcher.add_rule("start", seq(vec![neg(term("abc")), seq(vec![dot(), dot(), dot()])]));

    assert!(matcher.r#match("abc", None).is_none());

    let tree = matcher.r#match("xyz", None).expect("should parse");
    let ParseTree::Apply(apply) = &*tree else { panic!("expected Apply") };
    let ParseTree::Sequence(outer) = &*apply.child else { panic!("expected Sequence") };
    // the NegLookAhead contributes no child, so only the inner seq of three dots remains.
    assert_eq!(outer.children.len(), 1);
    let ParseTree::Sequence(dots) = &*outer.children[0] else { panic!("expected inner Sequence") };
    assert_eq!(dots.children.len(), 3);
    let chars: Vec<String> = dots
        .children
        .iter()
        .map(|c| match &**c {
            ParseTree::MutexAlt(m) => m.matched.clone(),
            other => panic!("expected MutexAlt, got {other:?}"),
        })
        .collect();
    assert_eq!(chars, vec!["x", "y", "z"]);
}

#[test]
fn python_indentation_block() {
    let mut matcher = new_matcher(Mode::Python);
    matcher.add_rule(
        "Block",
        plus(seq(vec![term(expr::INDENT), apply("line"), term(expr::DEDENT)])),
    );
    matcher.add_rule(
        "line",
        plus(alt([
            "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n", "o", "p", "q",
            "r", "s", "t", "u", "v", "w", "x", "y", "z",
        ])),
    );

    assert!(matcher.r#match("\n  foo\n", Some("Block")).is_some());
    assert!(matcher.r#match("\nfoo\n", Some("Block")).is_none());
}
