//! Compiled patterns and the two matching engines
//!
//! Both engines are anchored at the start offset and report the longest
//! prefix the pattern accepts from there:
//!
//! - the DFA walk follows the precomputed transition table and stops as
//!   soon as it enters the trap state;
//! - the simulation runs the instruction graph directly with a frontier of
//!   active instructions and stops once no instruction can consume.
//!
//! They agree on every input.

use crate::config::Config;
use crate::dfa::Dfa;
use crate::error::Result;
use crate::minimize::minimize;
use crate::nfa::Nfa;
use crate::program::{Closure, Inst, Program};
use log::debug;
use std::fmt;
use std::ops::Range;

/// A match result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    /// The offset matching started at
    pub start: usize,
    /// The end of the longest accepted prefix (exclusive)
    pub end: usize,
}

impl Match {
    /// Get the matched bytes
    pub fn as_bytes<'h>(&self, haystack: &'h [u8]) -> &'h [u8] {
        &haystack[self.start..self.end]
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True when the pattern accepted the empty prefix
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Which engine answers a match query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Engine {
    /// Table walk over the (minimized) DFA
    #[default]
    Dfa,
    /// Direct simulation of the instruction graph
    Simulation,
}

/// A compiled pattern
#[derive(Debug, Clone)]
pub struct Regex {
    pattern: String,
    program: Program,
    dfa: Dfa,
    config: Config,
}

impl Regex {
    /// Compile a pattern with the default configuration
    pub fn new(pattern: &str) -> Result<Self> {
        RegexBuilder::new(pattern).build()
    }

    /// The source pattern
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// The instruction graph the simulation engine runs
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// The DFA the table-walk engine runs
    pub fn dfa(&self) -> &Dfa {
        &self.dfa
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Longest prefix of `haystack[start..]` the pattern accepts, via the DFA
    pub fn match_at(&self, haystack: &[u8], start: usize) -> Option<Match> {
        walk(&self.dfa, haystack, start).map(|end| Match { start, end })
    }

    /// Same as [`Regex::match_at`], but simulating the instruction graph
    pub fn simulate_at(&self, haystack: &[u8], start: usize) -> Option<Match> {
        Simulator::new(&self.program, haystack, start)
            .run()
            .map(|end| Match { start, end })
    }

    /// Match with the given engine
    pub fn find_at(&self, haystack: &[u8], start: usize, engine: Engine) -> Option<Match> {
        match engine {
            Engine::Dfa => self.match_at(haystack, start),
            Engine::Simulation => self.simulate_at(haystack, start),
        }
    }

    /// Check if the pattern accepts some prefix of the input
    pub fn is_match(&self, haystack: &[u8]) -> bool {
        self.match_at(haystack, 0).is_some()
    }

    /// Check if the pattern accepts the whole input
    pub fn is_full_match(&self, haystack: &[u8]) -> bool {
        self.match_at(haystack, 0)
            .is_some_and(|m| m.end == haystack.len())
    }
}

impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

/// Builder for a [`Regex`] with non-default settings
#[derive(Debug, Clone)]
pub struct RegexBuilder {
    pattern: String,
    config: Config,
}

impl RegexBuilder {
    pub fn new(pattern: &str) -> Self {
        RegexBuilder {
            pattern: pattern.to_string(),
            config: Config::default(),
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn minimize(mut self, yes: bool) -> Self {
        self.config = self.config.minimize(yes);
        self
    }

    pub fn state_limit(mut self, limit: Option<usize>) -> Self {
        self.config = self.config.state_limit(limit);
        self
    }

    /// Run the full pipeline: parse, realize, subset-construct, minimize
    pub fn build(self) -> Result<Regex> {
        let program = crate::parser::parse(&self.pattern)?;
        let nfa = Nfa::from_program(&program);
        let mut dfa = Dfa::from_nfa(&nfa, self.config.state_limit)?;
        if self.config.minimize {
            minimize(&mut dfa);
        }

        debug!(
            "compiled {:?}: {} instructions, {} NFA states, {} DFA states",
            self.pattern,
            program.len(),
            nfa.len(),
            dfa.len()
        );

        Ok(Regex {
            pattern: self.pattern,
            program,
            dfa,
            config: self.config,
        })
    }
}

/// Walk the DFA from `start`, returning the end of the longest accepted prefix
fn walk(dfa: &Dfa, haystack: &[u8], start: usize) -> Option<usize> {
    if start > haystack.len() {
        return None;
    }

    let mut state = dfa.start();
    let mut last = None;

    for (pos, &byte) in haystack.iter().enumerate().skip(start) {
        if dfa.is_accepting(state) {
            last = Some(pos);
        }
        state = dfa.next(state, byte);
        if state == dfa.trap() {
            return last;
        }
    }

    if dfa.is_accepting(state) {
        last = Some(haystack.len());
    }
    last
}

/// Frontier simulation over the instruction graph
struct Simulator<'a> {
    program: &'a Program,
    haystack: &'a [u8],
    start: usize,
}

impl<'a> Simulator<'a> {
    fn new(program: &'a Program, haystack: &'a [u8], start: usize) -> Self {
        Simulator {
            program,
            haystack,
            start,
        }
    }

    fn run(&self) -> Option<usize> {
        if self.start > self.haystack.len() {
            return None;
        }

        let mut current = Closure::new(self.program.len());
        let mut next = Closure::new(self.program.len());
        self.program.expand(self.program.start(), &mut current);

        let mut pos = self.start;
        let mut last = None;

        loop {
            if current.is_accepting() {
                last = Some(pos);
            }
            let Some(&byte) = self.haystack.get(pos) else {
                break;
            };
            if current.consumers().is_empty() {
                break;
            }

            next.clear();
            for &id in current.consumers() {
                if let Inst::Consume { set, next: target } = self.program.get(id)
                    && set.contains(byte)
                {
                    self.program.expand(*target, &mut next);
                }
            }

            std::mem::swap(&mut current, &mut next);
            pos += 1;
        }

        last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegexError;

    fn both(regex: &Regex, haystack: &str, start: usize) -> Option<usize> {
        let dfa = regex.match_at(haystack.as_bytes(), start).map(|m| m.end);
        let sim = regex.simulate_at(haystack.as_bytes(), start).map(|m| m.end);
        assert_eq!(dfa, sim, "engines disagree on {haystack:?} at {start}");
        dfa
    }

    #[test]
    fn test_star_then_literal() {
        let regex = Regex::new("a*b").unwrap();
        assert_eq!(both(&regex, "aaab", 0), Some(4));
        assert_eq!(both(&regex, "b", 0), Some(1));
        assert_eq!(both(&regex, "aaa", 0), None);
    }

    #[test]
    fn test_start_offset() {
        let regex = Regex::new("[0-9]+").unwrap();
        assert_eq!(both(&regex, "abc123", 0), None);
        assert_eq!(both(&regex, "abc123", 3), Some(6));
        assert_eq!(both(&regex, "abc123x", 4), Some(6));
    }

    #[test]
    fn test_longest_not_first() {
        let regex = Regex::new("(ab)|(a)").unwrap();
        assert_eq!(both(&regex, "ab", 0), Some(2));
        assert_eq!(both(&regex, "ac", 0), Some(1));
    }

    #[test]
    fn test_empty_prefix_accepted() {
        let regex = Regex::new("a*").unwrap();
        let m = regex.match_at(b"bbb", 0).unwrap();
        assert!(m.is_empty());
        assert_eq!(both(&regex, "", 0), Some(0));
        assert_eq!(both(&regex, "aa", 2), Some(2));
    }

    #[test]
    fn test_start_past_end() {
        let regex = Regex::new("a*").unwrap();
        assert_eq!(both(&regex, "aa", 3), None);
    }

    #[test]
    fn test_match_accessors() {
        let regex = Regex::new("b+").unwrap();
        let haystack = b"abbbc";
        let m = regex.match_at(haystack, 1).unwrap();
        assert_eq!(m.range(), 1..4);
        assert_eq!(m.len(), 3);
        assert_eq!(m.as_bytes(haystack), b"bbb");
    }

    #[test]
    fn test_find_at_dispatches() {
        let regex = Regex::new("x{3}").unwrap();
        for engine in [Engine::Dfa, Engine::Simulation] {
            assert_eq!(regex.find_at(b"xx", 0, engine), None);
            assert_eq!(regex.find_at(b"xxxx", 0, engine).map(|m| m.end), Some(3));
        }
    }

    #[test]
    fn test_is_match_and_full_match() {
        let regex = Regex::new("colou?r").unwrap();
        assert!(regex.is_match(b"colors"));
        assert!(!regex.is_full_match(b"colors"));
        assert!(regex.is_full_match(b"colour"));
    }

    #[test]
    fn test_unminimized_agrees() {
        let minimized = Regex::new("(ab|cb)*d").unwrap();
        let raw = RegexBuilder::new("(ab|cb)*d").minimize(false).build().unwrap();
        assert!(raw.dfa().len() >= minimized.dfa().len());
        for input in ["d", "abd", "cbabd", "abab", "x", "abcbcbd"] {
            assert_eq!(
                raw.match_at(input.as_bytes(), 0),
                minimized.match_at(input.as_bytes(), 0)
            );
        }
    }

    #[test]
    fn test_state_limit_surfaces() {
        let err = RegexBuilder::new("(a|b)*a(a|b)(a|b)(a|b)(a|b)")
            .state_limit(Some(4))
            .build()
            .unwrap_err();
        assert_eq!(err, RegexError::StateLimitExceeded { limit: 4 });
    }

    #[test]
    fn test_regex_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Regex>();
    }

    #[test]
    fn test_display_is_pattern() {
        assert_eq!(Regex::new("a|b").unwrap().to_string(), "a|b");
    }
}
