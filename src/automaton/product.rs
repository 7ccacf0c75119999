//! Product composer (C6): pairwise product construction for intersection,
//! and NFA splicing for union.
//!
//! Intersection assumes both operands are already complete, deterministic
//! automata (callers — see [`crate::compiled::CompiledPattern::intersect`]
//! — determinize before calling in). `Transition::Epsilon` pairs are never
//! combined, matching the design note that epsilon has already been
//! eliminated by determinization; the `Globstar` rows in the combination
//! table are implemented for fidelity to the spec's four-way truth table
//! but are dead code on the normal DFA×DFA path, since this engine's
//! completed DFAs only ever carry `Literal`/`Wildcard` edges (globstars are
//! folded into wildcard/catch-all edges during subset construction — see
//! `determinize`).

use std::collections::{HashMap, VecDeque};

use super::{SegmentAutomaton, State, StateId, Transition, WildcardMatcher};

enum CombinedEdge {
    Literal(String),
    Wildcard(WildcardMatcher, String),
}

/// Decides whether two outgoing edges can fire on the same input and, if
/// so, what combined edge and target-state pair results. Mirrors §4.5's
/// transition combination table directly.
fn combine(ta: &Transition, tb: &Transition) -> Option<(CombinedEdge, (StateId, StateId))> {
    use Transition::*;
    match (ta, tb) {
        (Literal { segment: s1, target: t1 }, Literal { segment: s2, target: t2 }) if s1 == s2 => {
            Some((CombinedEdge::Literal(s1.clone()), (*t1, *t2)))
        }
        (Literal { segment: s, target: t1 }, Wildcard { matcher, target: t2, .. }) if matcher.accepts(s) => {
            Some((CombinedEdge::Literal(s.clone()), (*t1, *t2)))
        }
        (Wildcard { matcher, target: t1, .. }, Literal { segment: s, target: t2 }) if matcher.accepts(s) => {
            Some((CombinedEdge::Literal(s.clone()), (*t1, *t2)))
        }
        (
            Wildcard { matcher: m1, source_tag: tag1, target: t1 },
            Wildcard { matcher: m2, source_tag: tag2, target: t2 },
        ) => {
            let matcher = WildcardMatcher::And(Box::new(m1.clone()), Box::new(m2.clone()));
            let tag = format!("({tag1})&({tag2})");
            Some((CombinedEdge::Wildcard(matcher, tag), (*t1, *t2)))
        }
        (Globstar { self_loop: s1, .. }, Globstar { self_loop: s2, .. }) => {
            Some((CombinedEdge::Wildcard(WildcardMatcher::AnySegment, "*".to_string()), (*s1, *s2)))
        }
        (Globstar { self_loop: s1, .. }, Literal { segment, target }) => {
            Some((CombinedEdge::Literal(segment.clone()), (*s1, *target)))
        }
        (Literal { segment, target }, Globstar { self_loop: s2, .. }) => {
            Some((CombinedEdge::Literal(segment.clone()), (*target, *s2)))
        }
        (Globstar { self_loop: s1, .. }, Wildcard { matcher, source_tag, target }) => {
            Some((CombinedEdge::Wildcard(matcher.clone(), source_tag.clone()), (*s1, *target)))
        }
        (Wildcard { matcher, source_tag, target }, Globstar { self_loop: s2, .. }) => {
            Some((CombinedEdge::Wildcard(matcher.clone(), source_tag.clone()), (*target, *s2)))
        }
        _ => None,
    }
}

/// Product construction over reachable state pairs only. The initial state
/// is `(a.initial, b.initial)`; a pair is accepting iff both components
/// are. Marked deterministic iff both inputs are.
pub fn intersect(a: &SegmentAutomaton, b: &SegmentAutomaton) -> SegmentAutomaton {
    let mut result = SegmentAutomaton { states: Vec::new(), initial_state: 0, is_deterministic: a.is_deterministic && b.is_deterministic };
    let mut id_for_pair: HashMap<(StateId, StateId), StateId> = HashMap::new();
    let mut worklist: VecDeque<(StateId, StateId)> = VecDeque::new();

    let start_pair = (a.initial_state, b.initial_state);
    let start_id = result.add_state();
    id_for_pair.insert(start_pair, start_id);
    worklist.push_back(start_pair);

    while let Some((sa, sb)) = worklist.pop_front() {
        let id = id_for_pair[&(sa, sb)];
        result.state_mut(id).accepting = a.is_accepting(sa) && b.is_accepting(sb);

        for ta in &a.state(sa).transitions {
            for tb in &b.state(sb).transitions {
                let Some((edge, target_pair)) = combine(ta, tb) else { continue };

                let target_id = match id_for_pair.get(&target_pair) {
                    Some(&id) => id,
                    None => {
                        let id = result.add_state();
                        id_for_pair.insert(target_pair, id);
                        worklist.push_back(target_pair);
                        id
                    }
                };

                let transition = match edge {
                    CombinedEdge::Literal(segment) => Transition::Literal { segment, target: target_id },
                    CombinedEdge::Wildcard(matcher, source_tag) => {
                        Transition::Wildcard { matcher, source_tag, target: target_id }
                    }
                };
                result.state_mut(id).transitions.push(transition);
            }
        }
    }

    result
}

/// NFA union: a fresh initial state epsilon-wired to the renumbered
/// initials of both operands. Always returns a non-deterministic result —
/// callers must determinize before using it for matching or further
/// algebra.
pub fn union(a: &SegmentAutomaton, b: &SegmentAutomaton) -> SegmentAutomaton {
    let mut result = SegmentAutomaton { states: Vec::new(), initial_state: 0, is_deterministic: false };
    let new_start = result.add_state();

    let offset_a = result.states.len();
    append_renumbered(&mut result, a);
    let offset_b = result.states.len();
    append_renumbered(&mut result, b);

    result.state_mut(new_start).transitions.push(Transition::Epsilon { target: offset_a + a.initial_state });
    result.state_mut(new_start).transitions.push(Transition::Epsilon { target: offset_b + b.initial_state });
    result.initial_state = new_start;
    result
}

fn append_renumbered(result: &mut SegmentAutomaton, src: &SegmentAutomaton) {
    let offset = result.states.len();
    for state in &src.states {
        let mut new_state = State::new();
        new_state.accepting = state.accepting;
        new_state.transitions = state.transitions.iter().map(|t| shift_transition(t, offset)).collect();
        result.states.push(new_state);
    }
}

fn shift_transition(t: &Transition, offset: usize) -> Transition {
    match t {
        Transition::Literal { segment, target } => Transition::Literal { segment: segment.clone(), target: target + offset },
        Transition::Wildcard { matcher, source_tag, target } => {
            Transition::Wildcard { matcher: matcher.clone(), source_tag: source_tag.clone(), target: target + offset }
        }
        Transition::Globstar { self_loop, exit } => Transition::Globstar { self_loop: self_loop + offset, exit: exit + offset },
        Transition::Epsilon { target } => Transition::Epsilon { target: target + offset },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{PathPattern, RootNode, SegmentNode};
    use crate::automaton::builder;
    use crate::automaton::determinize::{determinize, DeterminizeOptions};

    fn compiled_dfa(root: RootNode) -> SegmentAutomaton {
        let pattern = PathPattern { source: String::new(), root, is_absolute: false, is_negation: false, errors: vec![] };
        let nfa = builder::build(&pattern);
        determinize(&nfa, DeterminizeOptions::default()).unwrap()
    }

    #[test]
    fn intersect_of_disjoint_literals_is_empty() {
        let a = compiled_dfa(RootNode::Sequence(vec![SegmentNode::Literal("foo".into())]));
        let b = compiled_dfa(RootNode::Sequence(vec![SegmentNode::Literal("bar".into())]));
        let product = intersect(&a, &b);
        assert!(product.accepting_states().is_empty());
    }

    #[test]
    fn intersect_of_identical_literals_is_accepting_at_same_depth() {
        let a = compiled_dfa(RootNode::Sequence(vec![SegmentNode::Literal("foo".into())]));
        let b = compiled_dfa(RootNode::Sequence(vec![SegmentNode::Literal("foo".into())]));
        let product = intersect(&a, &b);
        assert!(!product.accepting_states().is_empty());
    }

    #[test]
    fn union_is_nondeterministic_with_two_epsilons_from_new_start() {
        let a = compiled_dfa(RootNode::Sequence(vec![SegmentNode::Literal("foo".into())]));
        let b = compiled_dfa(RootNode::Sequence(vec![SegmentNode::Literal("bar".into())]));
        let u = union(&a, &b);
        assert!(!u.is_deterministic);
        assert_eq!(u.state(u.initial_state).transitions.len(), 2);
        assert!(u.state(u.initial_state).transitions.iter().all(|t| matches!(t, Transition::Epsilon { .. })));
    }
}
