//! Engine errors.
//!
//! Ordinary match failure is deliberately *not* represented here: "no parse tree"
//! and "not applicable here" are treated as ordinary control flow
//! (`Option<Rc<ParseTree>>`), never as an `Err`. Only two fatal kinds travel through
//! `Result`: an unresolved grammar (`GrammarError`) or a broken internal invariant
//! (`InvariantViolation`), which is a bug in the engine, not in the grammar or the
//! input, but is still reported as a typed error rather than a panic so a host can
//! decide what to do with it. Grounded on the per-crate `thiserror` error enums used
//! throughout `ProvableHQ-leo` (`leo-errors` and siblings), since a single bare
//! string can't distinguish a grammar problem from an engine bug.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The grammar itself is malformed: an `Apply` names a rule that was never added,
    /// or a `MutexAlt` mixes strings of unequal length. Surfaces immediately and is
    /// not caught anywhere in the engine.
    #[error("grammar error: {0}")]
    Grammar(String),

    /// An internal bookkeeping invariant was violated — e.g. popping a call-stack
    /// frame that wasn't the one just evaluated, or an abort flag whose target frame
    /// can no longer be found on the stack. Indicates a bug in the engine itself.
    #[error("internal invariant violated: {0}")]
    Invariant(String),
}
