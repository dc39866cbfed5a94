//! The Thompson instruction graph
//!
//! A compiled pattern is first lowered into a graph of three instruction
//! kinds: consume one byte from a set, branch two ways without consuming,
//! or accept. Quantifiers make the graph cyclic, so instructions live in
//! an arena and refer to each other by index.

use crate::class::ByteSet;
use std::fmt;

/// Index of an instruction inside its [`Program`]
pub type InstId = usize;

/// A single instruction of the graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inst {
    /// Consume one byte in `set`, then continue at `next`
    Consume { set: ByteSet, next: InstId },
    /// Continue at both `primary` and `alternate` without consuming
    Branch { primary: InstId, alternate: InstId },
    /// The pattern has matched
    Accept,
}

/// An instruction graph together with its entry point
#[derive(Debug, Clone)]
pub struct Program {
    insts: Vec<Inst>,
    start: InstId,
    accept: InstId,
}

impl Program {
    /// Create a program holding only its accept instruction
    pub(crate) fn new() -> Self {
        Program {
            insts: vec![Inst::Accept],
            start: 0,
            accept: 0,
        }
    }

    fn push(&mut self, inst: Inst) -> InstId {
        let id = self.insts.len();
        self.insts.push(inst);
        id
    }

    pub(crate) fn consume(&mut self, set: ByteSet, next: InstId) -> InstId {
        self.push(Inst::Consume { set, next })
    }

    pub(crate) fn branch(&mut self, primary: InstId, alternate: InstId) -> InstId {
        self.push(Inst::Branch { primary, alternate })
    }

    /// Point a loop branch at the fragment that was built with the branch
    /// itself as its continuation.
    pub(crate) fn set_primary(&mut self, branch: InstId, target: InstId) {
        if let Inst::Branch { primary, .. } = &mut self.insts[branch] {
            *primary = target;
        }
    }

    pub(crate) fn set_start(&mut self, start: InstId) {
        self.start = start;
    }

    /// The entry instruction
    pub fn start(&self) -> InstId {
        self.start
    }

    /// The single accept instruction every path ends in
    pub fn accept(&self) -> InstId {
        self.accept
    }

    pub fn get(&self, id: InstId) -> &Inst {
        &self.insts[id]
    }

    pub fn len(&self) -> usize {
        self.insts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (InstId, &Inst)> {
        self.insts.iter().enumerate()
    }

    /// Add the epsilon closure of `from` to `closure`.
    ///
    /// Branches are walked through but never become members; consumes stop
    /// the walk and are recorded; reaching accept marks the closure as
    /// accepting. Every visited instruction is remembered, so loops made of
    /// branches alone still terminate.
    pub fn expand(&self, from: InstId, closure: &mut Closure) {
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            if !closure.visit(id) {
                continue;
            }
            match self.insts[id] {
                Inst::Accept => closure.accepting = true,
                Inst::Consume { .. } => closure.consumers.push(id),
                Inst::Branch { primary, alternate } => {
                    stack.push(alternate);
                    stack.push(primary);
                }
            }
        }
    }

    /// The epsilon closure of a single instruction
    pub fn closure(&self, from: InstId) -> Closure {
        let mut closure = Closure::new(self.len());
        self.expand(from, &mut closure);
        closure
    }
}

/// A deduplicated set of instructions reachable without consuming input
#[derive(Debug, Clone)]
pub struct Closure {
    accepting: bool,
    consumers: Vec<InstId>,
    seen: Vec<bool>,
    touched: Vec<InstId>,
}

impl Closure {
    /// An empty closure for a program with `len` instructions
    pub fn new(len: usize) -> Self {
        Closure {
            accepting: false,
            consumers: Vec::new(),
            seen: vec![false; len],
            touched: Vec::new(),
        }
    }

    fn visit(&mut self, id: InstId) -> bool {
        if self.seen[id] {
            return false;
        }
        self.seen[id] = true;
        self.touched.push(id);
        true
    }

    /// Whether accept is reachable
    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    /// The consume instructions in the closure, in discovery order
    pub fn consumers(&self) -> &[InstId] {
        &self.consumers
    }

    /// True when nothing can ever be matched from here
    pub fn is_empty(&self) -> bool {
        !self.accepting && self.consumers.is_empty()
    }

    /// Reset to empty, in time proportional to what was visited
    pub fn clear(&mut self) {
        for id in self.touched.drain(..) {
            self.seen[id] = false;
        }
        self.consumers.clear();
        self.accepting = false;
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, inst) in self.iter() {
            let marker = if id == self.start { ">" } else { " " };
            match inst {
                Inst::Consume { set, next } => {
                    writeln!(f, "{marker}[{id}] consume {set} -> {next}")?
                }
                Inst::Branch { primary, alternate } => {
                    writeln!(f, "{marker}[{id}] branch -> {primary} | {alternate}")?
                }
                Inst::Accept => writeln!(f, "{marker}[{id}] accept")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `a*` built by hand: branch 1 loops through consume 2
    fn star_a() -> Program {
        let mut program = Program::new();
        let accept = program.accept();
        let branch = program.branch(accept, accept);
        let body = program.consume(ByteSet::singleton(b'a'), branch);
        program.set_primary(branch, body);
        program.set_start(branch);
        program
    }

    #[test]
    fn test_new_program_is_just_accept() {
        let program = Program::new();
        assert_eq!(program.len(), 1);
        assert_eq!(program.get(program.start()), &Inst::Accept);
    }

    #[test]
    fn test_closure_of_loop() {
        let program = star_a();
        let closure = program.closure(program.start());
        assert!(closure.is_accepting());
        assert_eq!(closure.consumers(), &[2]);
    }

    #[test]
    fn test_closure_terminates_on_branch_only_cycle() {
        let mut program = Program::new();
        let accept = program.accept();
        let outer = program.branch(accept, accept);
        let inner = program.branch(accept, outer);
        program.set_primary(outer, inner);
        let closure = program.closure(outer);
        assert!(closure.is_accepting());
        assert!(closure.consumers().is_empty());
    }

    #[test]
    fn test_clear_allows_reuse() {
        let program = star_a();
        let mut closure = Closure::new(program.len());
        program.expand(program.start(), &mut closure);
        closure.clear();
        assert!(closure.is_empty());
        program.expand(2, &mut closure);
        assert_eq!(closure.consumers(), &[2]);
        assert!(!closure.is_accepting());
    }

    #[test]
    fn test_display_listing() {
        let listing = star_a().to_string();
        assert_eq!(
            listing,
            " [0] accept\n>[1] branch -> 2 | 0\n [2] consume a -> 1\n"
        );
    }
}
