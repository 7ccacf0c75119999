//! Determinizer (C5): subset construction over the segment alphabet,
//! producing a complete, deterministic automaton bounded by a hard state
//! cap.
//!
//! The alphabet is infinite in principle (segments are strings) but only
//! finitely many symbols distinguish states for a given NFA: every literal
//! string that appears on a `Literal` edge, every distinct wildcard
//! (deduplicated by `source_tag`, so two syntactically different wildcards
//! built from the same source are one symbol), and a single catch-all "any"
//! symbol standing in for segments only a globstar self-loop would accept.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use crate::error::LimitError;

use super::{SegmentAutomaton, StateId, Transition, WildcardMatcher, epsilon_closure};

#[derive(Debug, Clone, Copy)]
pub struct DeterminizeOptions {
    pub max_states: usize,
}

impl Default for DeterminizeOptions {
    fn default() -> Self {
        Self { max_states: 10_000 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Symbol {
    Literal(String),
    Wildcard(String),
    Any,
}

/// Runs subset construction, producing a complete DFA. Fails with
/// [`LimitError::DfaStateLimit`] if the number of reachable DFA states
/// would exceed `options.max_states`.
pub fn determinize(
    nfa: &SegmentAutomaton,
    options: DeterminizeOptions,
) -> Result<SegmentAutomaton, LimitError> {
    if nfa.is_deterministic {
        return Ok(nfa.clone());
    }

    let (symbols, wildcard_matchers) = collect_alphabet(nfa);

    let initial_closure = epsilon_closure(nfa, [nfa.initial_state]);
    let mut dfa = SegmentAutomaton { states: Vec::new(), initial_state: 0, is_deterministic: true };
    let mut state_for_set: HashMap<BTreeSet<StateId>, StateId> = HashMap::new();
    let mut worklist: VecDeque<BTreeSet<StateId>> = VecDeque::new();

    let start_id = dfa.add_state();
    state_for_set.insert(initial_closure.clone(), start_id);
    worklist.push_back(initial_closure);

    while let Some(set) = worklist.pop_front() {
        let from_id = state_for_set[&set];
        dfa.state_mut(from_id).accepting = set.iter().any(|&s| nfa.is_accepting(s));

        for symbol in &symbols {
            let move_set = compute_move_set(nfa, &set, symbol);
            if move_set.is_empty() {
                continue;
            }
            let closure = epsilon_closure(nfa, move_set);

            let target_id = if let Some(&id) = state_for_set.get(&closure) {
                id
            } else {
                if dfa.states.len() >= options.max_states {
                    log::warn!(
                        "determinize: state cap {} reached while expanding subset construction",
                        options.max_states
                    );
                    return Err(LimitError::DfaStateLimit {
                        limit: options.max_states,
                        attempted: dfa.states.len() + 1,
                    });
                }
                let id = dfa.add_state();
                state_for_set.insert(closure.clone(), id);
                worklist.push_back(closure);
                id
            };

            let transition = match symbol {
                Symbol::Literal(s) => Transition::Literal { segment: s.clone(), target: target_id },
                Symbol::Wildcard(tag) => Transition::Wildcard {
                    matcher: wildcard_matchers[tag].clone(),
                    source_tag: tag.clone(),
                    target: target_id,
                },
                Symbol::Any => Transition::Wildcard {
                    matcher: WildcardMatcher::AnySegment,
                    source_tag: "*".to_string(),
                    target: target_id,
                },
            };
            dfa.state_mut(from_id).transitions.push(transition);
        }
    }

    complete(&mut dfa, &options)?;
    Ok(dfa)
}

fn collect_alphabet(nfa: &SegmentAutomaton) -> (Vec<Symbol>, BTreeMap<String, WildcardMatcher>) {
    let mut literals: BTreeSet<String> = BTreeSet::new();
    let mut wildcard_matchers: BTreeMap<String, WildcardMatcher> = BTreeMap::new();

    for state in &nfa.states {
        for transition in &state.transitions {
            match transition {
                Transition::Literal { segment, .. } => {
                    literals.insert(segment.clone());
                }
                Transition::Wildcard { matcher, source_tag, .. } => {
                    wildcard_matchers.entry(source_tag.clone()).or_insert_with(|| matcher.clone());
                }
                Transition::Globstar { .. } | Transition::Epsilon { .. } => {}
            }
        }
    }

    let mut symbols: Vec<Symbol> = literals.into_iter().map(Symbol::Literal).collect();
    symbols.extend(wildcard_matchers.keys().cloned().map(Symbol::Wildcard));
    symbols.push(Symbol::Any);
    (symbols, wildcard_matchers)
}

/// For a given DFA-state-in-progress (an NFA state set) and alphabet
/// symbol, unions the targets of every NFA transition that "matches" the
/// symbol:
/// - a `Literal` symbol matches a `Literal` edge with the same string, a
///   `Wildcard` edge whose matcher accepts that literal string, and any
///   `Globstar` self-loop (which fires on every segment);
/// - a named `Wildcard` symbol matches only the `Wildcard` edges sharing
///   its `source_tag` (an intentional approximation: two distinct wildcard
///   patterns are never cross-checked against each other's representative
///   strings) plus any `Globstar` self-loop;
/// - the `Any` symbol matches only `Globstar` self-loops, by definition —
///   it stands for segments not covered by any listed literal or wildcard.
fn compute_move_set(nfa: &SegmentAutomaton, set: &BTreeSet<StateId>, symbol: &Symbol) -> BTreeSet<StateId> {
    let mut move_set = BTreeSet::new();
    for &state_id in set {
        for transition in &nfa.state(state_id).transitions {
            match (transition, symbol) {
                (Transition::Literal { segment, target }, Symbol::Literal(l)) if segment == l => {
                    move_set.insert(*target);
                }
                (Transition::Wildcard { matcher, target, .. }, Symbol::Literal(l))
                    if matcher.accepts(l) =>
                {
                    move_set.insert(*target);
                }
                (Transition::Globstar { self_loop, .. }, Symbol::Literal(_) | Symbol::Any) => {
                    move_set.insert(*self_loop);
                }
                (Transition::Wildcard { source_tag, target, .. }, Symbol::Wildcard(tag))
                    if source_tag == tag =>
                {
                    move_set.insert(*target);
                }
                (Transition::Globstar { self_loop, .. }, Symbol::Wildcard(_)) => {
                    move_set.insert(*self_loop);
                }
                _ => {}
            }
        }
    }
    move_set
}

/// Adds a fresh sink state reached by a self-looping catch-all wildcard,
/// then appends a catch-all transition targeting the sink to every
/// non-sink state that doesn't already have one (because its "any" symbol
/// move-set was non-empty during subset construction). Completion is
/// mandatory — complement depends on totality.
fn complete(dfa: &mut SegmentAutomaton, options: &DeterminizeOptions) -> Result<(), LimitError> {
    if dfa.states.len() >= options.max_states {
        return Err(LimitError::DfaStateLimit { limit: options.max_states, attempted: dfa.states.len() + 1 });
    }
    let sink = dfa.add_state();
    dfa.state_mut(sink).transitions.push(Transition::Wildcard {
        matcher: WildcardMatcher::Universal,
        source_tag: "*".to_string(),
        target: sink,
    });

    for id in 0..dfa.states.len() {
        if id == sink {
            continue;
        }
        let has_catch_all = dfa
            .state(id)
            .transitions
            .iter()
            .any(|t| matches!(t, Transition::Wildcard { matcher, .. } if matcher.is_catch_all()));
        if !has_catch_all {
            dfa.state_mut(id).transitions.push(Transition::Wildcard {
                matcher: WildcardMatcher::Universal,
                source_tag: "*".to_string(),
                target: sink,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{PathPattern, RootNode, SegmentNode};
    use crate::automaton::builder;

    fn build(root: RootNode) -> SegmentAutomaton {
        let pattern = PathPattern { source: String::new(), root, is_absolute: false, is_negation: false, errors: vec![] };
        builder::build(&pattern)
    }

    #[test]
    fn determinize_literal_sequence_is_complete_and_deterministic() {
        let nfa = build(RootNode::Sequence(vec![SegmentNode::Literal("src".into())]));
        let dfa = determinize(&nfa, DeterminizeOptions::default()).unwrap();
        assert!(dfa.is_deterministic);
        // every non-sink state should have a transition for otherwise-unhandled input
        for state in &dfa.states {
            assert!(state.transitions.iter().any(|t| matches!(t, Transition::Wildcard{matcher,..} if matcher.is_catch_all()))
                || state.transitions.iter().any(|t| matches!(t, Transition::Literal{..})));
        }
    }

    #[test]
    fn state_cap_is_enforced() {
        let branches = (0..10)
            .map(|i| RootNode::Sequence(vec![SegmentNode::Literal(format!("branch{i}"))]))
            .collect();
        let nfa = build(RootNode::Alternation(branches));
        let err = determinize(&nfa, DeterminizeOptions { max_states: 2 }).unwrap_err();
        match err {
            LimitError::DfaStateLimit { limit, attempted } => {
                assert_eq!(limit, 2);
                assert!(attempted > 2);
            }
            other => panic!("expected DfaStateLimit, got {other:?}"),
        }
    }

    #[test]
    fn already_deterministic_input_is_returned_unchanged() {
        let nfa = build(RootNode::Sequence(vec![SegmentNode::Literal("x".into())]));
        let dfa = determinize(&nfa, DeterminizeOptions::default()).unwrap();
        let dfa2 = determinize(&dfa, DeterminizeOptions::default()).unwrap();
        assert_eq!(dfa2.states.len(), dfa.states.len());
    }
}
