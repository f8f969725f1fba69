//! Rule registry.
//!
//! A rule is just a name paired with a body expression. The registry lives directly
//! on `Matcher` as a flat `HashMap<String, Rc<Expr>>`; this module only hosts the
//! naming convention that the rest of the engine depends on.

/// A rule is *syntactic* iff its name's first character is uppercase; such rules get
/// implicit whitespace skipping between sequence/repetition elements. Anything else,
/// including the reserved `skip` rule itself, is *lexical*.
pub fn is_syntactic(rule_name: &str) -> bool {
    rule_name.chars().next().is_some_and(|c| c.is_uppercase())
}

/// Name of the built-in whitespace-skipping rule. If a grammar does not define it,
/// the matcher falls back to a default class of ASCII controls plus space.
pub const SKIP_RULE: &str = "skip";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uppercase_leading_char_is_syntactic() {
        assert!(is_syntactic("Block"));
        assert!(is_syntactic("PlusMinusExpr"));
    }

    #[test]
    fn lowercase_leading_char_is_lexical() {
        assert!(!is_syntactic("expr"));
        assert!(!is_syntactic("num"));
        assert!(!is_syntactic(SKIP_RULE));
    }

    #[test]
    fn empty_name_is_lexical() {
        assert!(!is_syntactic(""));
    }
}
