//! DFA minimization by structural folding
//!
//! Each pass gathers the states reachable from the root and folds every
//! state whose accepting flag and transition table are identical to an
//! earlier one into that earlier state. Tables are rewritten to point at
//! the representatives, the root follows its representative, and the arena
//! is then swept so only reachable states remain. Folding can make more
//! tables identical, so passes repeat until one folds nothing.
//!
//! This merges states with *identical* rows only. Equivalent states whose
//! rows differ (for example two states in distinct cycles that accept the
//! same language) stay apart, so the result is a fixed point of folding
//! rather than the canonical minimal DFA.

use crate::dfa::{Dfa, DfaState, DfaStateId, TRAP};
use log::{debug, trace};
use std::collections::HashMap;
use std::collections::hash_map::Entry;

/// Minimize `dfa` in place and return how many states were removed
pub fn minimize(dfa: &mut Dfa) -> usize {
    sweep(dfa);
    let before = dfa.len();

    let mut pass = 0;
    loop {
        pass += 1;
        let folded = fold(dfa);
        trace!("minimizer pass {} folded {} states", pass, folded);
        if folded == 0 {
            break;
        }
        sweep(dfa);
    }

    let removed = before - dfa.len();
    debug!(
        "minimized DFA from {} to {} states in {} passes",
        before,
        dfa.len(),
        pass
    );
    removed
}

/// One folding pass; returns the number of states folded away
fn fold(dfa: &mut Dfa) -> usize {
    let mut pool = dfa.reachable();
    // Lowest ID first, so the trap is always its own representative
    pool.sort_unstable();

    let mut remap: Vec<DfaStateId> = (0..dfa.len()).collect();
    let mut folded = 0;

    let mut representatives: HashMap<&DfaState, DfaStateId> = HashMap::with_capacity(pool.len());
    for &id in &pool {
        match representatives.entry(&dfa.states[id]) {
            Entry::Occupied(rep) => {
                remap[id] = *rep.get();
                folded += 1;
            }
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }
    }
    drop(representatives);

    if folded == 0 {
        return 0;
    }

    for &id in &pool {
        if remap[id] != id {
            continue;
        }
        for edge in dfa.states[id].edges.iter_mut() {
            *edge = remap[*edge];
        }
    }
    dfa.start = remap[dfa.start];

    folded
}

/// Rebuild the arena with only the trap and the states reachable from the
/// root, renumbered in discovery order.
fn sweep(dfa: &mut Dfa) {
    let mut new_id = vec![usize::MAX; dfa.len()];
    let mut kept = vec![TRAP];
    new_id[TRAP] = TRAP;

    for id in dfa.reachable() {
        if id != TRAP {
            new_id[id] = kept.len();
            kept.push(id);
        }
    }

    let states = kept
        .iter()
        .map(|&old| {
            let mut state = dfa.states[old].clone();
            for edge in state.edges.iter_mut() {
                *edge = new_id[*edge];
            }
            state
        })
        .collect();

    dfa.start = new_id[dfa.start];
    dfa.states = states;
}
