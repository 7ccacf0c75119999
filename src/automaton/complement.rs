//! Complement (C7): flips acceptance on a complete, deterministic
//! automaton.
//!
//! Complementing a partial automaton would be wrong — any segment routed
//! to an implicit "no transition" dead end is simply rejected today and
//! would need to be *accepted* after complementing, which a missing edge
//! can't express. So this always completes its input first (via
//! `determinize::complete`-equivalent logic folded into `determinize`
//! itself — by the time a caller reaches complement, the automaton has
//! already been through subset construction and is complete). Non-DFA
//! input is determinized on the way in.

use crate::error::LimitError;

use super::determinize::{determinize, DeterminizeOptions};
use super::SegmentAutomaton;

/// Returns a new automaton accepting exactly the paths `dfa` rejects.
/// Determinizes first if `dfa.is_deterministic` is false.
pub fn complement(automaton: &SegmentAutomaton, options: DeterminizeOptions) -> Result<SegmentAutomaton, LimitError> {
    let mut dfa = determinize(automaton, options)?;
    for state in dfa.states.iter_mut() {
        state.accepting = !state.accepting;
    }
    Ok(dfa)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{PathPattern, RootNode, SegmentNode};
    use crate::automaton::builder;

    fn compiled_dfa(root: RootNode) -> SegmentAutomaton {
        let pattern = PathPattern { source: String::new(), root, is_absolute: false, is_negation: false, errors: vec![] };
        let nfa = builder::build(&pattern);
        determinize(&nfa, DeterminizeOptions::default()).unwrap()
    }

    #[test]
    fn complement_flips_every_state_accepting_bit() {
        let dfa = compiled_dfa(RootNode::Sequence(vec![SegmentNode::Literal("foo".into())]));
        let comp = complement(&dfa, DeterminizeOptions::default()).unwrap();
        assert_eq!(dfa.states.len(), comp.states.len());
        for (original, flipped) in dfa.states.iter().zip(comp.states.iter()) {
            assert_eq!(original.accepting, !flipped.accepting);
        }
    }

    #[test]
    fn complement_of_complement_matches_original_acceptance() {
        let dfa = compiled_dfa(RootNode::Sequence(vec![SegmentNode::Literal("foo".into())]));
        let twice = complement(&complement(&dfa, DeterminizeOptions::default()).unwrap(), DeterminizeOptions::default()).unwrap();
        for (original, back) in dfa.states.iter().zip(twice.states.iter()) {
            assert_eq!(original.accepting, back.accepting);
        }
    }
}
