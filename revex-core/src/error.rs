//! Error types for the DFA compiler
//!
//! Errors are categorized by the stage that produced them: lexing,
//! parsing, or automaton construction. Matching never fails; "no match"
//! is an ordinary `None`.

use thiserror::Error;

/// The main error type for pattern compilation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegexError {
    /// Errors that occur during tokenization
    #[error("lexer error at position {position}: {kind}")]
    Lexer {
        /// Character offset in the pattern where the error occurred
        position: usize,
        /// The specific kind of lexer error
        kind: LexerErrorKind,
    },

    /// Errors that occur while building the instruction graph
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Subset construction produced more states than the configured limit
    #[error("DFA state limit of {limit} exceeded")]
    StateLimitExceeded {
        /// The limit that was hit
        limit: usize,
    },
}

/// Specific kinds of lexer errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexerErrorKind {
    /// A backslash with nothing after it
    #[error("dangling escape at end of pattern")]
    DanglingEscape,
}

/// Errors that occur during parsing
///
/// Positions are character offsets into the original (unreversed) pattern.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A `(` without `)` or the other way around
    #[error("unbalanced group at position {position}")]
    UnbalancedGroup { position: usize },

    /// A `]` without a matching `[`, or a stray `[`
    #[error("unclosed character class at position {position}")]
    UnclosedClass { position: usize },

    /// A quantifier with no atom before it
    #[error("nothing to repeat at position {position}")]
    NothingToRepeat { position: usize },

    /// An empty pattern, alternative or group
    #[error("empty expression at position {position}")]
    EmptyExpression { position: usize },

    /// Something other than a digit inside `{...}`
    #[error("invalid repetition count at position {position}: found '{found}'")]
    InvalidRepetition { position: usize, found: char },

    /// A `}` with no `{` before it
    #[error("unclosed repetition count at position {position}")]
    UnclosedRepetition { position: usize },

    /// `{0}` or `{}`
    #[error("repetition count must be positive at position {position}")]
    ZeroRepetition { position: usize },

    /// A class range whose start is after its end, like `z-a`
    #[error("invalid class range '{start}-{end}'")]
    InvalidRange { start: char, end: char },

    /// Classes operate on single bytes
    #[error("character class member '{0}' is not ASCII")]
    NonAsciiClassMember(char),
}

/// Errors raised while assembling a grammar
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    /// A terminal pattern failed to compile
    #[error("terminal {pattern:?}: {source}")]
    Terminal {
        pattern: String,
        #[source]
        source: RegexError,
    },

    /// A symbol ID that was not handed out by this grammar
    #[error("unknown symbol {0}")]
    UnknownSymbol(usize),

    /// Only sequences and choices can take more items
    #[error("symbol {0} is a terminal and cannot take items")]
    NotARule(usize),
}

/// Result type alias for compilation
pub type Result<T> = std::result::Result<T, RegexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexer_error_display() {
        let err = RegexError::Lexer {
            position: 3,
            kind: LexerErrorKind::DanglingEscape,
        };
        assert_eq!(
            err.to_string(),
            "lexer error at position 3: dangling escape at end of pattern"
        );
    }

    #[test]
    fn test_regex_error_from_parse_error() {
        let regex_err: RegexError = ParseError::UnbalancedGroup { position: 0 }.into();
        assert_eq!(
            regex_err.to_string(),
            "parse error: unbalanced group at position 0"
        );
    }

    #[test]
    fn test_invalid_repetition_display() {
        let err = ParseError::InvalidRepetition {
            position: 2,
            found: 'x',
        };
        assert_eq!(
            err.to_string(),
            "invalid repetition count at position 2: found 'x'"
        );
    }

    #[test]
    fn test_grammar_error_display() {
        let err = GrammarError::Terminal {
            pattern: "a(".to_string(),
            source: ParseError::UnbalancedGroup { position: 1 }.into(),
        };
        assert_eq!(
            err.to_string(),
            "terminal \"a(\": parse error: unbalanced group at position 1"
        );
        assert_eq!(
            GrammarError::NotARule(4).to_string(),
            "symbol 4 is a terminal and cannot take items"
        );
    }

    #[test]
    fn test_state_limit_display() {
        let err = RegexError::StateLimitExceeded { limit: 8 };
        assert_eq!(err.to_string(), "DFA state limit of 8 exceeded");
    }
}
