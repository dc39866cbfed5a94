//! Explicit NFA realization
//!
//! Each NFA state stands for the epsilon closure of one instruction. The
//! state for an instruction is registered in the memo *before* its closure
//! is expanded, which is what lets quantifier loops (an instruction whose
//! successors lead back to itself) terminate and share one state.

use crate::program::{Inst, InstId, Program};
use log::debug;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::fmt;

/// An NFA state ID
pub type NfaStateId = usize;

/// A state of the realized NFA
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NfaState {
    /// Whether the closure reaches accept
    pub accepting: bool,
    /// Successor states per input byte; bytes with no successor are absent
    pub edges: BTreeMap<u8, BTreeSet<NfaStateId>>,
}

impl NfaState {
    /// Successors on `byte`, if any
    pub fn next(&self, byte: u8) -> Option<&BTreeSet<NfaStateId>> {
        self.edges.get(&byte)
    }
}

/// A realized NFA
#[derive(Debug, Clone)]
pub struct Nfa {
    states: Vec<NfaState>,
    start: NfaStateId,
}

impl Nfa {
    /// Realize the NFA for a program's entry instruction
    pub fn from_program(program: &Program) -> Self {
        Realizer::new(program).realize(program.start())
    }

    pub fn start(&self) -> NfaStateId {
        self.start
    }

    pub fn state(&self, id: NfaStateId) -> &NfaState {
        &self.states[id]
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NfaStateId, &NfaState)> {
        self.states.iter().enumerate()
    }
}

/// Work-queue realizer memoized by instruction identity
struct Realizer<'a> {
    program: &'a Program,
    memo: HashMap<InstId, NfaStateId>,
    states: Vec<NfaState>,
    queue: VecDeque<(InstId, NfaStateId)>,
}

impl<'a> Realizer<'a> {
    fn new(program: &'a Program) -> Self {
        Realizer {
            program,
            memo: HashMap::new(),
            states: Vec::new(),
            queue: VecDeque::new(),
        }
    }

    /// The state for `inst`, allocating and queueing it on first sight
    fn intern(&mut self, inst: InstId) -> NfaStateId {
        if let Some(&id) = self.memo.get(&inst) {
            return id;
        }
        let id = self.states.len();
        self.states.push(NfaState::default());
        self.memo.insert(inst, id);
        self.queue.push_back((inst, id));
        id
    }

    fn realize(mut self, entry: InstId) -> Nfa {
        let start = self.intern(entry);

        while let Some((inst, id)) = self.queue.pop_front() {
            let closure = self.program.closure(inst);
            let mut state = NfaState {
                accepting: closure.is_accepting(),
                edges: BTreeMap::new(),
            };

            for &member in closure.consumers() {
                let Inst::Consume { set, next } = *self.program.get(member) else {
                    continue;
                };
                if set.is_empty() {
                    continue;
                }
                let target = self.intern(next);
                for byte in set.iter() {
                    state.edges.entry(byte).or_default().insert(target);
                }
            }

            self.states[id] = state;
        }

        debug!("realized {} NFA states", self.states.len());
        Nfa {
            states: self.states,
            start,
        }
    }
}

impl fmt::Display for Nfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, state) in self.iter() {
            let tag = if state.accepting { "$" } else { "@" };
            let marker = if id == self.start { ">" } else { " " };
            writeln!(f, "{marker}{tag}[{id}]:")?;

            // Group bytes by identical successor set
            let mut grouped: BTreeMap<&BTreeSet<NfaStateId>, Vec<u8>> = BTreeMap::new();
            for (&byte, targets) in &state.edges {
                grouped.entry(targets).or_default().push(byte);
            }
            for (targets, bytes) in grouped {
                write!(f, "\t")?;
                crate::class::fmt_ranges(f, &crate::class::collapse_ranges(bytes))?;
                let targets: Vec<String> = targets.iter().map(|t| t.to_string()).collect();
                writeln!(f, " -> [ {} ]", targets.join(" "))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn realize(pattern: &str) -> Nfa {
        Nfa::from_program(&parse(pattern).unwrap())
    }

    #[test]
    fn test_literal_chain() {
        let nfa = realize("ab");
        assert_eq!(nfa.len(), 3);
        let start = nfa.state(nfa.start());
        assert!(!start.accepting);
        assert_eq!(start.edges.len(), 1);
        let after_a = *start.next(b'a').unwrap().iter().next().unwrap();
        let after_b = *nfa.state(after_a).next(b'b').unwrap().iter().next().unwrap();
        assert!(nfa.state(after_b).accepting);
    }

    #[test]
    fn test_star_loop_shares_state() {
        let nfa = realize("a*");
        assert_eq!(nfa.len(), 1);
        let start = nfa.state(nfa.start());
        assert!(start.accepting);
        assert_eq!(start.next(b'a').unwrap().iter().copied().collect::<Vec<_>>(), vec![nfa.start()]);
    }

    #[test]
    fn test_alternation_unions_targets() {
        let nfa = realize("ab|ac");
        let start = nfa.state(nfa.start());
        assert_eq!(start.next(b'a').unwrap().len(), 2);
    }

    #[test]
    fn test_nested_star_terminates() {
        let nfa = realize("(a*)*b");
        let start = nfa.state(nfa.start());
        assert!(start.next(b'a').is_some());
        assert!(start.next(b'b').is_some());
    }

    #[test]
    fn test_empty_class_has_no_edges() {
        let nfa = realize("[]");
        let start = nfa.state(nfa.start());
        assert!(!start.accepting);
        assert!(start.edges.is_empty());
    }

    #[test]
    fn test_display_groups_bytes() {
        let listing = realize("[a-c]").to_string();
        assert!(listing.starts_with(">@[0]:\n\t[a-c] -> [ 1 ]\n"));
        assert!(listing.contains("$[1]:"));
    }
}
