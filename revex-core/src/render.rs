//! GraphViz export for DFAs
//!
//! Edges are grouped by target and labelled with collapsed byte ranges.
//! Accepting states are green, live non-accepting states yellow, and the
//! trap red.

use crate::class::{collapse_ranges, fmt_ranges};
use crate::dfa::{Dfa, DfaState, DfaStateId};
use std::collections::BTreeMap;
use std::io::{self, Write};

/// Group a state's outgoing edges by target, as collapsed byte ranges
pub fn edge_ranges(state: &DfaState) -> Vec<(DfaStateId, Vec<(u8, u8)>)> {
    let mut by_target: BTreeMap<DfaStateId, Vec<u8>> = BTreeMap::new();
    for (byte, &target) in (0..=u8::MAX).zip(state.edges.iter()) {
        by_target.entry(target).or_default().push(byte);
    }
    by_target
        .into_iter()
        .map(|(target, bytes)| (target, collapse_ranges(bytes)))
        .collect()
}

fn colour(dfa: &Dfa, id: DfaStateId) -> &'static str {
    if dfa.is_accepting(id) {
        "green"
    } else if dfa.is_trap(id) {
        "red"
    } else {
        "yellow"
    }
}

fn label(ranges: &[(u8, u8)]) -> String {
    let mut text = String::new();
    // Writing into a String cannot fail
    let _ = fmt_ranges(&mut text, ranges);
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Write the reachable part of `dfa` as a GraphViz digraph
pub fn write_dot(dfa: &Dfa, w: &mut impl Write) -> io::Result<()> {
    writeln!(w, "digraph {{")?;
    writeln!(w, "\tstart [shape=point];")?;
    writeln!(w, "\tstart -> {};", dfa.start())?;

    for id in dfa.reachable() {
        writeln!(w, "\t{id} [style=filled;fillcolor={}];", colour(dfa, id))?;
        for (target, ranges) in edge_ranges(dfa.state(id)) {
            writeln!(w, "\t{id} -> {target} [label=\"{}\"];", label(&ranges))?;
        }
    }

    writeln!(w, "}}")?;
    Ok(())
}

/// Render `dfa` as a GraphViz digraph string
pub fn to_dot(dfa: &Dfa) -> String {
    let mut out = Vec::new();
    // Writing into a Vec cannot fail
    let _ = write_dot(dfa, &mut out);
    String::from_utf8_lossy(&out).into_owned()
}
