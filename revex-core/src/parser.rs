//! Parser for regex patterns
//!
//! The parser walks the token stream **right to left** and emits
//! instruction-graph fragments directly, without an intermediate AST.
//! Every parse function receives the fragment that must match *after*
//! the piece it is parsing (its tail) and returns the entry of a fragment
//! matching the piece followed by that tail. Read backwards, a postfix
//! quantifier arrives before its atom, so loops are wired up in the same
//! single pass.
//!
//! Grammar (in order of precedence, lowest to highest):
//!   alternation := concat ( '|' concat )*
//!   concat      := quantified+
//!   quantified  := atom ( '*' | '+' | '?' | '{' digits '}' )?
//!   atom        := literal | '.' | '[' '^'? class_item* ']' | '(' alternation ')'
//!   class_item  := char | char '-' char

use crate::class::ByteSet;
use crate::error::{ParseError, Result};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::program::{InstId, Program};
use log::debug;

type ParseResult<T> = std::result::Result<T, ParseError>;

/// Parse a pattern into an instruction graph
pub fn parse(pattern: &str) -> Result<Program> {
    let tokens = Lexer::new(pattern).tokenize()?;
    let program = Parser::new(tokens).parse()?;
    debug!(
        "parsed {:?} into {} instructions",
        pattern,
        program.len()
    );
    Ok(program)
}

/// Right-to-left parser over a tokenized pattern
pub struct Parser {
    /// Tokens in reverse pattern order
    tokens: Vec<Token>,
    pos: usize,
    program: Program,
}

impl Parser {
    /// Create a parser for tokens given in pattern order
    pub fn new(mut tokens: Vec<Token>) -> Self {
        tokens.reverse();
        Parser {
            tokens,
            pos: 0,
            program: Program::new(),
        }
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    /// Parse the whole pattern, ending in the program's accept instruction
    pub fn parse(mut self) -> ParseResult<Program> {
        let accept = self.program.accept();
        let start = self.parse_alternation(accept)?;

        // Only an unmatched `(` stops the top-level alternation early
        if let Some(token) = self.peek() {
            return Err(ParseError::UnbalancedGroup {
                position: token.position,
            });
        }

        self.program.set_start(start);
        Ok(self.program)
    }

    /// alternation := concat ( '|' concat )*
    ///
    /// Every alternative continues at the same `tail`.
    fn parse_alternation(&mut self, tail: InstId) -> ParseResult<InstId> {
        let mut alternation = self.parse_concat(tail)?;

        while self.peek_kind() == Some(TokenKind::Pipe) {
            self.pos += 1;
            let branch = self.parse_concat(tail)?;
            alternation = self.program.branch(branch, alternation);
        }

        Ok(alternation)
    }

    /// concat := quantified+
    fn parse_concat(&mut self, tail: InstId) -> ParseResult<InstId> {
        let mut concat = self.parse_quantified(tail)?;

        while let Some(kind) = self.peek_kind() {
            if matches!(kind, TokenKind::Pipe | TokenKind::LeftParen) {
                break;
            }
            concat = self.parse_quantified(concat)?;
        }

        Ok(concat)
    }

    /// quantified := atom quantifier?
    fn parse_quantified(&mut self, tail: InstId) -> ParseResult<InstId> {
        let Some(token) = self.peek() else {
            return self.parse_atom(tail);
        };

        match token.kind {
            TokenKind::Star => {
                self.pos += 1;
                let loop_head = self.program.branch(tail, tail);
                let body = self.parse_repeated(token, loop_head)?;
                self.program.set_primary(loop_head, body);
                Ok(loop_head)
            }
            TokenKind::Plus => {
                self.pos += 1;
                let loop_head = self.program.branch(tail, tail);
                let body = self.parse_repeated(token, loop_head)?;
                self.program.set_primary(loop_head, body);
                Ok(body)
            }
            TokenKind::Question => {
                self.pos += 1;
                let body = self.parse_repeated(token, tail)?;
                Ok(self.program.branch(body, tail))
            }
            TokenKind::RightBrace => {
                self.pos += 1;
                let count = self.parse_count(token)?;

                // Unroll: re-parse the same atom `count` times
                let head = self.pos;
                let mut entry = tail;
                for _ in 0..count {
                    self.pos = head;
                    entry = self.parse_repeated(token, entry)?;
                }
                Ok(entry)
            }
            _ => self.parse_atom(tail),
        }
    }

    /// Parse the atom a quantifier applies to
    fn parse_repeated(
        &mut self,
        quantifier: Token,
        tail: InstId,
    ) -> ParseResult<InstId> {
        match self.peek_kind() {
            None | Some(TokenKind::Pipe) | Some(TokenKind::LeftParen) => {
                Err(ParseError::NothingToRepeat {
                    position: quantifier.position,
                })
            }
            Some(kind) if kind.is_quantifier() => Err(ParseError::NothingToRepeat {
                position: quantifier.position,
            }),
            Some(_) => self.parse_atom(tail),
        }
    }

    /// Read the digits of `{n}` back to the opening brace
    fn parse_count(&mut self, close: Token) -> ParseResult<usize> {
        let mut digits = Vec::new();
        loop {
            let Some(token) = self.bump() else {
                return Err(ParseError::UnclosedRepetition {
                    position: close.position,
                });
            };
            match token.kind {
                TokenKind::LeftBrace => break,
                TokenKind::Literal(c) if c.is_ascii_digit() => digits.push((c, token.position)),
                other => {
                    return Err(ParseError::InvalidRepetition {
                        position: token.position,
                        found: other.as_char(),
                    });
                }
            }
        }

        // Digits were collected least significant first
        let mut count: usize = 0;
        for &(c, position) in digits.iter().rev() {
            let digit = c as usize - '0' as usize;
            count = count
                .checked_mul(10)
                .and_then(|n| n.checked_add(digit))
                .ok_or(ParseError::InvalidRepetition { position, found: c })?;
        }

        if count == 0 {
            return Err(ParseError::ZeroRepetition {
                position: close.position,
            });
        }
        Ok(count)
    }

    /// atom := literal | '.' | class | group
    fn parse_atom(&mut self, tail: InstId) -> ParseResult<InstId> {
        let Some(token) = self.peek() else {
            return Err(ParseError::EmptyExpression { position: 0 });
        };

        match token.kind {
            TokenKind::Pipe | TokenKind::LeftParen => Err(ParseError::EmptyExpression {
                position: token.position,
            }),
            TokenKind::Star | TokenKind::Plus | TokenKind::Question | TokenKind::RightBrace => {
                Err(ParseError::NothingToRepeat {
                    position: token.position,
                })
            }
            TokenKind::LeftBracket => Err(ParseError::UnclosedClass {
                position: token.position,
            }),
            TokenKind::Dot => {
                self.pos += 1;
                Ok(self.program.consume(ByteSet::full(), tail))
            }
            TokenKind::RightParen => {
                self.pos += 1;
                let inner = self.parse_alternation(tail)?;
                match self.bump() {
                    Some(open) if open.kind == TokenKind::LeftParen => Ok(inner),
                    _ => Err(ParseError::UnbalancedGroup {
                        position: token.position,
                    }),
                }
            }
            TokenKind::RightBracket => {
                self.pos += 1;
                self.parse_class(token, tail)
            }
            TokenKind::LeftBrace | TokenKind::Caret | TokenKind::Dash | TokenKind::Literal(_) => {
                self.pos += 1;
                Ok(self.literal(token.kind.as_char(), tail))
            }
        }
    }

    /// One consume per UTF-8 byte, built last byte first
    fn literal(&mut self, c: char, tail: InstId) -> InstId {
        let mut buf = [0; 4];
        c.encode_utf8(&mut buf)
            .bytes()
            .rev()
            .fold(tail, |next, byte| {
                self.program.consume(ByteSet::singleton(byte), next)
            })
    }

    /// Scan back to the `[` that opens this class
    fn parse_class(&mut self, close: Token, tail: InstId) -> ParseResult<InstId> {
        let mut members = Vec::new();
        loop {
            match self.bump() {
                None => {
                    return Err(ParseError::UnclosedClass {
                        position: close.position,
                    });
                }
                Some(token) if token.kind == TokenKind::LeftBracket => break,
                Some(token) => members.push(token.kind),
            }
        }
        members.reverse();

        let set = class_set(&members)?;
        Ok(self.program.consume(set, tail))
    }
}

/// Build the byte set for class members given in pattern order
fn class_set(members: &[TokenKind]) -> ParseResult<ByteSet> {
    let (negated, items) = match members.split_first() {
        Some((TokenKind::Caret, rest)) => (true, rest),
        _ => (false, members),
    };

    let mut set = ByteSet::empty();
    let mut i = 0;
    while i < items.len() {
        let start = class_byte(items[i])?;
        if i + 2 < items.len() && items[i + 1] == TokenKind::Dash {
            let end = class_byte(items[i + 2])?;
            if start > end {
                return Err(ParseError::InvalidRange {
                    start: items[i].as_char(),
                    end: items[i + 2].as_char(),
                });
            }
            set.insert_range(start, end);
            i += 3;
        } else {
            set.insert(start);
            i += 1;
        }
    }

    if negated {
        set.negate();
    }
    Ok(set)
}

fn class_byte(kind: TokenKind) -> ParseResult<u8> {
    let c = kind.as_char();
    if c.is_ascii() {
        Ok(c as u8)
    } else {
        Err(ParseError::NonAsciiClassMember(c))
    }
}
