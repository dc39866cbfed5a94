//! Lexer for tokenizing regex patterns
//!
//! The parser reads patterns right to left, where an escape's backslash
//! shows up *after* the character it protects. Tokenizing forward first
//! settles every escape up front, so the reversed token stream only ever
//! contains resolved literals and unescaped metacharacters.

use crate::error::{LexerErrorKind, RegexError, Result};
use std::fmt;
use std::str::Chars;

/// The kind of a token in a regex pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Left parenthesis `(`
    LeftParen,
    /// Right parenthesis `)`
    RightParen,
    /// Left bracket `[` (start of character class)
    LeftBracket,
    /// Right bracket `]` (end of character class)
    RightBracket,
    /// Left brace `{` (start of repetition count)
    LeftBrace,
    /// Right brace `}` (end of repetition count)
    RightBrace,
    /// Pipe `|` (alternation)
    Pipe,
    /// Caret `^` (negation right after `[`, a literal elsewhere)
    Caret,
    /// Dash `-` (range inside a class, a literal elsewhere)
    Dash,
    /// Dot `.` (any byte)
    Dot,
    /// Star `*` (zero or more)
    Star,
    /// Plus `+` (one or more)
    Plus,
    /// Question `?` (optional)
    Question,
    /// A literal character, either plain or escaped
    Literal(char),
}

impl TokenKind {
    /// The character this token was written as, with escapes removed
    pub fn as_char(self) -> char {
        match self {
            TokenKind::LeftParen => '(',
            TokenKind::RightParen => ')',
            TokenKind::LeftBracket => '[',
            TokenKind::RightBracket => ']',
            TokenKind::LeftBrace => '{',
            TokenKind::RightBrace => '}',
            TokenKind::Pipe => '|',
            TokenKind::Caret => '^',
            TokenKind::Dash => '-',
            TokenKind::Dot => '.',
            TokenKind::Star => '*',
            TokenKind::Plus => '+',
            TokenKind::Question => '?',
            TokenKind::Literal(c) => c,
        }
    }

    /// Whether this is one of the postfix quantifier openers (as seen in
    /// reversed order)
    pub fn is_quantifier(self) -> bool {
        matches!(
            self,
            TokenKind::Star | TokenKind::Plus | TokenKind::Question | TokenKind::RightBrace
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Literal(c) => write!(f, "literal `{}`", c),
            other => write!(f, "`{}`", other.as_char()),
        }
    }
}

/// A token with its character offset in the pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: usize,
}

/// Lexer for tokenizing regex patterns
pub struct Lexer<'a> {
    chars: Chars<'a>,
    position: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given pattern
    pub fn new(input: &'a str) -> Self {
        Lexer {
            chars: input.chars(),
            position: 0,
        }
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.position += 1;
        Some(c)
    }

    /// Get the next token, or `None` at end of input
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        let position = self.position;
        let Some(c) = self.advance() else {
            return Ok(None);
        };

        let kind = match c {
            '\\' => match self.advance() {
                Some(escaped) => TokenKind::Literal(escaped),
                None => {
                    return Err(RegexError::Lexer {
                        position,
                        kind: LexerErrorKind::DanglingEscape,
                    });
                }
            },
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            '|' => TokenKind::Pipe,
            '^' => TokenKind::Caret,
            '-' => TokenKind::Dash,
            '.' => TokenKind::Dot,
            '*' => TokenKind::Star,
            '+' => TokenKind::Plus,
            '?' => TokenKind::Question,
            other => TokenKind::Literal(other),
        };

        Ok(Some(Token { kind, position }))
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }
}
