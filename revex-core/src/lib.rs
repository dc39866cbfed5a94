//! Revex Core Library
//!
//! A byte-oriented regex compiler. Patterns are parsed right to left
//! straight into a Thompson instruction graph, realized as an NFA, turned
//! into a DFA by subset construction and minimized by folding identical
//! states. Matching is anchored at a start offset and reports the longest
//! accepted prefix.

pub mod class;
pub mod config;
pub mod dfa;
pub mod engine;
pub mod error;
pub mod grammar;
pub mod lexer;
pub mod minimize;
pub mod nfa;
pub mod parser;
pub mod program;
pub mod render;

pub use class::ByteSet;
pub use config::{Config, DEFAULT_STATE_LIMIT};
pub use dfa::{Dfa, DfaState, DfaStateId, TRAP};
pub use engine::{Engine, Match, Regex, RegexBuilder};
pub use error::{GrammarError, LexerErrorKind, ParseError, RegexError, Result};
pub use grammar::{Grammar, SymbolId};
pub use lexer::{Lexer, Token, TokenKind};
pub use minimize::minimize;
pub use nfa::{Nfa, NfaState, NfaStateId};
pub use parser::{Parser, parse};
pub use program::{Closure, Inst, InstId, Program};
pub use render::{to_dot, write_dot};

/// Compile a pattern with the default configuration
///
/// This is the main entry point; use [`RegexBuilder`] for other settings.
pub fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_to_end() {
        // pattern -> instructions -> NFA -> DFA -> minimized DFA -> match
        let regex = compile("(foo|bar)+[0-9]?").unwrap();
        assert_eq!(regex.match_at(b"foobarfoo7!", 0).map(|m| m.end), Some(10));
        assert_eq!(regex.simulate_at(b"foobarfoo7!", 0).map(|m| m.end), Some(10));
    }

    #[test]
    fn test_compile_error_propagates() {
        assert!(matches!(compile("a)"), Err(RegexError::Parse(_))));
        assert!(matches!(compile("a\\"), Err(RegexError::Lexer { .. })));
    }
}
