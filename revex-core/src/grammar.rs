//! Grammar combinators over compiled patterns
//!
//! A [`Grammar`] is an arena of symbols. Terminals are compiled patterns
//! matched with the DFA engine; sequences match their items one after the
//! other; choices try every alternative at the same offset and keep the
//! longest. Rules can be created empty and filled in later with
//! [`Grammar::push`], which is how recursive grammars are tied together.
//!
//! Every symbol skips ASCII whitespace before and after itself. A symbol
//! that is re-entered at the same offset while it is still being evaluated
//! fails, so left recursion terminates (it simply never succeeds through
//! the recursive branch).

use crate::engine::Regex;
use crate::error::GrammarError;
use log::trace;
use std::collections::HashSet;

/// Index of a symbol inside its [`Grammar`]
pub type SymbolId = usize;

#[derive(Debug, Clone)]
enum Symbol {
    Terminal(Regex),
    Sequence(Vec<SymbolId>),
    Choice(Vec<SymbolId>),
}

/// An arena of grammar symbols
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    symbols: Vec<Symbol>,
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a terminal that matches `pattern`
    pub fn terminal(&mut self, pattern: &str) -> Result<SymbolId, GrammarError> {
        let regex = Regex::new(pattern).map_err(|source| GrammarError::Terminal {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(self.add(Symbol::Terminal(regex)))
    }

    /// Add a rule matching `items` in order
    pub fn sequence(&mut self, items: Vec<SymbolId>) -> Result<SymbolId, GrammarError> {
        self.check(&items)?;
        Ok(self.add(Symbol::Sequence(items)))
    }

    /// Add a rule matching the longest of `items`
    pub fn choice(&mut self, items: Vec<SymbolId>) -> Result<SymbolId, GrammarError> {
        self.check(&items)?;
        Ok(self.add(Symbol::Choice(items)))
    }

    /// Append `item` to an existing sequence or choice
    pub fn push(&mut self, rule: SymbolId, item: SymbolId) -> Result<(), GrammarError> {
        self.check(&[rule, item])?;
        match &mut self.symbols[rule] {
            Symbol::Sequence(items) | Symbol::Choice(items) => {
                items.push(item);
                Ok(())
            }
            Symbol::Terminal(_) => Err(GrammarError::NotARule(rule)),
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Match `rule` against `input` from `start`, returning the end offset
    ///
    /// Returns `None` if the rule fails or `rule` is not a symbol of this
    /// grammar. A symbol re-entered at the offset it is already being
    /// matched at fails, so left-recursive alternatives never succeed.
    pub fn parse(&self, rule: SymbolId, input: &[u8], start: usize) -> Option<usize> {
        if rule >= self.symbols.len() || start > input.len() {
            return None;
        }
        let mut active = HashSet::new();
        self.matches(rule, input, start, &mut active)
    }

    fn add(&mut self, symbol: Symbol) -> SymbolId {
        self.symbols.push(symbol);
        self.symbols.len() - 1
    }

    fn check(&self, ids: &[SymbolId]) -> Result<(), GrammarError> {
        match ids.iter().find(|&&id| id >= self.symbols.len()) {
            Some(&id) => Err(GrammarError::UnknownSymbol(id)),
            None => Ok(()),
        }
    }

    fn matches(
        &self,
        id: SymbolId,
        input: &[u8],
        pos: usize,
        active: &mut HashSet<(SymbolId, usize)>,
    ) -> Option<usize> {
        let begin = skip_whitespace(input, pos);
        if !active.insert((id, begin)) {
            trace!("symbol {} re-entered at {}", id, begin);
            return None;
        }

        let end = match &self.symbols[id] {
            Symbol::Terminal(regex) => regex.match_at(input, begin).map(|m| m.end),
            Symbol::Sequence(items) => items
                .iter()
                .try_fold(begin, |at, &item| self.matches(item, input, at, active)),
            Symbol::Choice(items) => items
                .iter()
                .filter_map(|&item| self.matches(item, input, begin, active))
                .max(),
        };

        active.remove(&(id, begin));
        end.map(|end| skip_whitespace(input, end))
    }
}

fn skip_whitespace(input: &[u8], mut pos: usize) -> usize {
    while input.get(pos).is_some_and(u8::is_ascii_whitespace) {
        pos += 1;
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    /// expr := term '+' expr | term
    /// term := number | '(' expr ')'
    fn arithmetic() -> (Grammar, SymbolId) {
        let mut g = Grammar::new();
        let expr = g.choice(vec![]).unwrap();
        let term = g.choice(vec![]).unwrap();
        let number = g.terminal("[0-9]+").unwrap();
        let plus = g.terminal("\\+").unwrap();
        let open = g.terminal("\\(").unwrap();
        let close = g.terminal("\\)").unwrap();

        let sum = g.sequence(vec![term, plus, expr]).unwrap();
        g.push(expr, sum).unwrap();
        g.push(expr, term).unwrap();

        let paren = g.sequence(vec![open, expr, close]).unwrap();
        g.push(term, number).unwrap();
        g.push(term, paren).unwrap();
        (g, expr)
    }

    #[test]
    fn test_terminal_skips_whitespace() {
        let mut g = Grammar::new();
        let word = g.terminal("[a-z]+").unwrap();
        assert_eq!(g.parse(word, b"  abc  d", 0), Some(7));
        assert_eq!(g.parse(word, b"  123", 0), None);
    }

    #[test]
    fn test_sequence_fails_if_any_item_fails() {
        let mut g = Grammar::new();
        let a = g.terminal("a").unwrap();
        let b = g.terminal("b").unwrap();
        let ab = g.sequence(vec![a, b]).unwrap();
        assert_eq!(g.parse(ab, b"a b", 0), Some(3));
        assert_eq!(g.parse(ab, b"a c", 0), None);
    }

    #[test]
    fn test_choice_takes_longest() {
        let mut g = Grammar::new();
        let short = g.terminal("ab").unwrap();
        let long = g.terminal("abcd").unwrap();
        let either = g.choice(vec![short, long]).unwrap();
        assert_eq!(g.parse(either, b"abcd", 0), Some(4));
        assert_eq!(g.parse(either, b"abc", 0), Some(2));
    }

    #[test]
    fn test_recursive_arithmetic() {
        let (g, expr) = arithmetic();
        assert_eq!(g.parse(expr, b"1 + (2+3) ", 0), Some(10));
        assert_eq!(g.parse(expr, b"((7))", 0), Some(5));
        // The dangling `+` is not part of any expression
        assert_eq!(g.parse(expr, b"1 +", 0), Some(2));
        assert_eq!(g.parse(expr, b"(1", 0), None);
    }

    #[test]
    fn test_left_recursion_terminates() {
        let mut g = Grammar::new();
        let a = g.terminal("a").unwrap();
        let rule = g.choice(vec![]).unwrap();
        g.push(rule, rule).unwrap();
        g.push(rule, a).unwrap();
        assert_eq!(g.parse(rule, b"a", 0), Some(1));
    }

    #[test]
    fn test_left_recursive_alternative_fails() {
        // list := list ',' a | a
        let mut g = Grammar::new();
        let a = g.terminal("a").unwrap();
        let comma = g.terminal(",").unwrap();
        let list = g.choice(vec![]).unwrap();
        let more = g.sequence(vec![list, comma, a]).unwrap();
        g.push(list, more).unwrap();
        assert_eq!(g.parse(list, b"a,a", 0), None);

        g.push(list, a).unwrap();
        assert_eq!(g.parse(list, b"a,a", 0), Some(1));
    }

    #[test]
    fn test_start_offset() {
        let mut g = Grammar::new();
        let digits = g.terminal("[0-9]+").unwrap();
        assert_eq!(g.parse(digits, b"ab 12", 2), Some(5));
        assert_eq!(g.parse(digits, b"12", 3), None);
    }

    #[test]
    fn test_assembly_errors() {
        let mut g = Grammar::new();
        let a = g.terminal("a").unwrap();
        assert_eq!(g.push(a, a), Err(GrammarError::NotARule(a)));
        assert_eq!(g.sequence(vec![a, 9]), Err(GrammarError::UnknownSymbol(9)));
        assert!(matches!(
            g.terminal("(a"),
            Err(GrammarError::Terminal { .. })
        ));
        assert_eq!(g.parse(42, b"a", 0), None);
    }
}
