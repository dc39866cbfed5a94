//! Subset construction
//!
//! DFA states are sets of NFA states. The cache is keyed by the whole set,
//! so two different paths reaching the same set land on the same DFA state
//! while it is being built. The empty set is registered up front as the
//! trap: it is state 0, never accepting, and loops to itself on every byte.
//!
//! The number of reachable subsets can grow exponentially with the number
//! of independent alternations in a pattern; `state_limit` bounds it.

use crate::error::{RegexError, Result};
use crate::nfa::{Nfa, NfaStateId};
use log::{debug, trace};
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fmt;

/// A DFA state ID
pub type DfaStateId = usize;

/// The trap state always has this ID
pub const TRAP: DfaStateId = 0;

/// Size of the input alphabet: one symbol per byte
pub const ALPHABET_LEN: usize = 256;

/// A state of the DFA
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DfaState {
    pub accepting: bool,
    /// One successor per byte, always populated
    pub edges: [DfaStateId; ALPHABET_LEN],
}

impl DfaState {
    fn trap() -> Self {
        DfaState {
            accepting: false,
            edges: [TRAP; ALPHABET_LEN],
        }
    }
}

/// A deterministic automaton over bytes
#[derive(Debug, Clone)]
pub struct Dfa {
    pub(crate) states: Vec<DfaState>,
    pub(crate) start: DfaStateId,
}

impl Dfa {
    /// Run subset construction over a realized NFA
    pub fn from_nfa(nfa: &Nfa, state_limit: Option<usize>) -> Result<Self> {
        SubsetBuilder::new(nfa, state_limit).build()
    }

    /// The root state
    pub fn start(&self) -> DfaStateId {
        self.start
    }

    /// The canonical dead state
    pub fn trap(&self) -> DfaStateId {
        TRAP
    }

    pub fn state(&self, id: DfaStateId) -> &DfaState {
        &self.states[id]
    }

    /// Follow the transition out of `id` on `byte`
    #[inline]
    pub fn next(&self, id: DfaStateId, byte: u8) -> DfaStateId {
        self.states[id].edges[usize::from(byte)]
    }

    pub fn is_accepting(&self, id: DfaStateId) -> bool {
        self.states[id].accepting
    }

    /// Structural check: non-accepting and every edge is a self-loop
    pub fn is_trap(&self, id: DfaStateId) -> bool {
        let state = &self.states[id];
        !state.accepting && state.edges.iter().all(|&e| e == id)
    }

    /// Number of states held in the arena
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DfaStateId, &DfaState)> {
        self.states.iter().enumerate()
    }

    /// States reachable from the root, in breadth-first discovery order
    pub fn reachable(&self) -> Vec<DfaStateId> {
        let mut seen = vec![false; self.states.len()];
        let mut order = vec![self.start];
        seen[self.start] = true;

        let mut i = 0;
        while i < order.len() {
            let id = order[i];
            i += 1;
            for &next in self.states[id].edges.iter() {
                if !seen[next] {
                    seen[next] = true;
                    order.push(next);
                }
            }
        }
        order
    }
}

struct SubsetBuilder<'a> {
    nfa: &'a Nfa,
    limit: Option<usize>,
    cache: HashMap<BTreeSet<NfaStateId>, DfaStateId>,
    states: Vec<DfaState>,
    queue: VecDeque<(BTreeSet<NfaStateId>, DfaStateId)>,
}

impl<'a> SubsetBuilder<'a> {
    fn new(nfa: &'a Nfa, limit: Option<usize>) -> Self {
        SubsetBuilder {
            nfa,
            limit,
            cache: HashMap::new(),
            states: Vec::new(),
            queue: VecDeque::new(),
        }
    }

    /// The DFA state for `subset`, allocating and queueing it on first sight
    fn intern(&mut self, subset: BTreeSet<NfaStateId>) -> Result<DfaStateId> {
        if let Some(&id) = self.cache.get(&subset) {
            return Ok(id);
        }
        if let Some(limit) = self.limit
            && self.states.len() >= limit
        {
            return Err(RegexError::StateLimitExceeded { limit });
        }

        let id = self.states.len();
        self.states.push(DfaState::trap());
        self.cache.insert(subset.clone(), id);
        self.queue.push_back((subset, id));
        Ok(id)
    }

    fn build(mut self) -> Result<Dfa> {
        self.states.push(DfaState::trap());
        self.cache.insert(BTreeSet::new(), TRAP);

        let start = self.intern(BTreeSet::from([self.nfa.start()]))?;

        while let Some((subset, id)) = self.queue.pop_front() {
            let mut accepting = false;
            let mut successors: Vec<BTreeSet<NfaStateId>> = vec![BTreeSet::new(); ALPHABET_LEN];

            for &member in &subset {
                let state = self.nfa.state(member);
                accepting |= state.accepting;
                for (&byte, targets) in &state.edges {
                    successors[usize::from(byte)].extend(targets.iter().copied());
                }
            }

            let mut edges = [TRAP; ALPHABET_LEN];
            for (byte, successor) in successors.into_iter().enumerate() {
                edges[byte] = self.intern(successor)?;
            }

            trace!("DFA state {} = {:?}", id, subset);
            self.states[id] = DfaState { accepting, edges };
        }

        debug!("subset construction produced {} DFA states", self.states.len());
        Ok(Dfa {
            states: self.states,
            start,
        })
    }
}

impl fmt::Display for Dfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for id in self.reachable() {
            let state = &self.states[id];
            let tag = if state.accepting { "$" } else { "@" };
            let marker = if id == self.start { ">" } else { " " };
            let trap = if id == TRAP { " trap" } else { "" };
            writeln!(f, "{marker}{tag}[{id}]{trap}:")?;
            if id == TRAP {
                continue;
            }
            for (target, ranges) in crate::render::edge_ranges(state) {
                if target == TRAP {
                    continue;
                }
                write!(f, "\t")?;
                crate::class::fmt_ranges(f, &ranges)?;
                writeln!(f, " -> {target}")?;
            }
        }
        Ok(())
    }
}
