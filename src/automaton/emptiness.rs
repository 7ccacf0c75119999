//! Emptiness, witness generation, and bounded path counting (C8).
//!
//! All three operations work directly on the automaton's transition graph;
//! none of them go through [`crate::matcher`] — they're the primitives
//! `matcher` and `containment` build on, not the other way around.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use super::{SegmentAutomaton, StateId, Transition, WildcardMatcher};

/// True iff no accepting state is reachable from the initial state,
/// following every transition kind as a plain graph edge (Literal,
/// Wildcard, both faces of Globstar, and Epsilon all count — emptiness
/// doesn't care what a concrete edge requires of the input, only whether
/// *some* input could take it).
pub fn is_empty(automaton: &SegmentAutomaton) -> bool {
    reachable_accepting_state(automaton).is_none()
}

fn reachable_accepting_state(automaton: &SegmentAutomaton) -> Option<StateId> {
    let mut visited = HashSet::new();
    let mut stack = vec![automaton.initial_state];
    visited.insert(automaton.initial_state);
    while let Some(id) = stack.pop() {
        if automaton.is_accepting(id) {
            return Some(id);
        }
        for next in successors(automaton, id) {
            if visited.insert(next) {
                stack.push(next);
            }
        }
    }
    None
}

fn successors(automaton: &SegmentAutomaton, id: StateId) -> Vec<StateId> {
    automaton
        .state(id)
        .transitions
        .iter()
        .flat_map(|t| match t {
            Transition::Literal { target, .. } => vec![*target],
            Transition::Wildcard { target, .. } => vec![*target],
            Transition::Globstar { self_loop, exit } => vec![*self_loop, *exit],
            Transition::Epsilon { target } => vec![*target],
        })
        .collect()
}

/// A concrete path of segments reconstructed from the automaton graph,
/// already self-checked by replaying it from the initial state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Witness {
    pub segments: Vec<String>,
}

/// Finds a shortest (fewest-segments) witness accepted by `automaton`, or
/// `None` if the automaton is empty. Uses 0-1 BFS: zero-cost edges
/// (`Epsilon`, a globstar's `exit`) don't add a segment, one-cost edges
/// (`Literal`, `Wildcard`, a globstar's `self_loop`) add one.
pub fn find_witness(automaton: &SegmentAutomaton) -> Option<Witness> {
    let start = automaton.initial_state;
    let mut dist: HashMap<StateId, usize> = HashMap::new();
    let mut parent: HashMap<StateId, (StateId, Option<String>)> = HashMap::new();
    let mut deque: VecDeque<StateId> = VecDeque::new();

    dist.insert(start, 0);
    deque.push_back(start);

    let mut accepted_state = None;
    if automaton.is_accepting(start) {
        accepted_state = Some(start);
    }

    while let Some(id) = deque.pop_front() {
        let d = dist[&id];
        for (next, cost, label) in weighted_successors(automaton, id) {
            let candidate = d + cost;
            if candidate < *dist.get(&next).unwrap_or(&usize::MAX) {
                dist.insert(next, candidate);
                parent.insert(next, (id, label));
                if cost == 0 {
                    deque.push_front(next);
                } else {
                    deque.push_back(next);
                }
                if automaton.is_accepting(next)
                    && accepted_state.map_or(true, |best| candidate < dist[&best])
                {
                    accepted_state = Some(next);
                }
            }
        }
    }

    let mut target = accepted_state?;
    let mut segments = Vec::new();
    while let Some((prev, label)) = parent.get(&target).cloned() {
        if let Some(label) = label {
            segments.push(label);
        }
        target = prev;
    }
    segments.reverse();

    let witness = Witness { segments };
    if replay_accepts(automaton, &witness) {
        Some(witness)
    } else {
        None
    }
}

fn weighted_successors(automaton: &SegmentAutomaton, id: StateId) -> Vec<(StateId, usize, Option<String>)> {
    let mut out = Vec::new();
    for t in &automaton.state(id).transitions {
        match t {
            Transition::Literal { segment, target } => out.push((*target, 1, Some(segment.clone()))),
            Transition::Wildcard { matcher, target, .. } => out.push((*target, 1, Some(sample_for(matcher)))),
            Transition::Globstar { self_loop, exit } => {
                out.push((*self_loop, 1, Some("x".to_string())));
                out.push((*exit, 0, None));
            }
            Transition::Epsilon { target } => out.push((*target, 0, None)),
        }
    }
    out
}

/// Tries a small fixed pool of representative strings and returns the
/// first one `matcher` accepts, falling back to `"a"` (which every
/// catch-all and most reasonable wildcards accept) if none in the pool
/// do.
fn sample_for(matcher: &WildcardMatcher) -> String {
    const CANDIDATES: &[&str] = &["a", "x", "test", "file.txt", "foo-bar", "README.md", "1", "a.b", "_", "main.rs"];
    for candidate in CANDIDATES {
        if matcher.accepts(candidate) {
            return candidate.to_string();
        }
    }
    "a".to_string()
}

/// Replays `witness.segments` through the automaton from the initial
/// state using direct transition application (the same three-way
/// priority a deterministic automaton resolves with: literal, then
/// non-catch-all wildcard, then catch-all), and reports whether the final
/// state accepts. Guards `find_witness`'s BFS reconstruction against a
/// reconstruction bug silently producing a bogus witness.
fn replay_accepts(automaton: &SegmentAutomaton, witness: &Witness) -> bool {
    let mut current = std::collections::BTreeSet::from([automaton.initial_state]);
    current = super::epsilon_closure(automaton, current);

    for segment in &witness.segments {
        let mut next = std::collections::BTreeSet::new();
        for &id in &current {
            for t in &automaton.state(id).transitions {
                match t {
                    Transition::Literal { segment: s, target } if s == segment => {
                        next.insert(*target);
                    }
                    Transition::Wildcard { matcher, target, .. } if matcher.accepts(segment) => {
                        next.insert(*target);
                    }
                    Transition::Globstar { self_loop, .. } => {
                        next.insert(*self_loop);
                    }
                    _ => {}
                }
            }
        }
        current = super::epsilon_closure(automaton, next);
        if current.is_empty() {
            return false;
        }
    }

    current.iter().any(|&id| automaton.is_accepting(id))
}

/// Counts accepting configurations at each depth up to `max_depth`,
/// memoized over `(state, remaining_depth)`. The result maps `depth -> count`
/// for every `depth` in `0..=max_depth`: `count` is the number of distinct
/// traversals from the initial state that consume exactly `depth` segments
/// and land in an accepting state. Zero-cost edges are walked with a
/// recursion guard so a pathological zero-cost cycle contributes 0 instead
/// of overflowing the stack — none of this engine's own constructions
/// produce one, but `count_paths` takes an arbitrary automaton.
pub fn count_paths(automaton: &SegmentAutomaton, max_depth: usize) -> BTreeMap<usize, u64> {
    let mut memo: HashMap<(StateId, usize), Vec<u64>> = HashMap::new();
    let by_depth = count_from(automaton, automaton.initial_state, max_depth, &mut memo, &mut HashSet::new());
    (0..=max_depth).map(|depth| (depth, by_depth[depth])).collect()
}

/// Returns a vector of length `remaining + 1` where entry `i` is the count
/// of accepting configurations reachable from `state` after exactly `i`
/// more consuming transitions (`i` in `0..=remaining`).
fn count_from(
    automaton: &SegmentAutomaton,
    state: StateId,
    remaining: usize,
    memo: &mut HashMap<(StateId, usize), Vec<u64>>,
    in_progress: &mut HashSet<StateId>,
) -> Vec<u64> {
    if let Some(counts) = memo.get(&(state, remaining)) {
        return counts.clone();
    }

    let mut counts = vec![0u64; remaining + 1];
    if automaton.is_accepting(state) {
        counts[0] += 1;
    }

    for t in &automaton.state(state).transitions {
        match t {
            Transition::Literal { target, .. } | Transition::Wildcard { target, .. } => {
                if remaining > 0 {
                    let sub = count_from(automaton, *target, remaining - 1, memo, in_progress);
                    for (i, count) in sub.into_iter().enumerate() {
                        counts[i + 1] += count;
                    }
                }
            }
            Transition::Globstar { self_loop, exit } => {
                if remaining > 0 {
                    let sub = count_from(automaton, *self_loop, remaining - 1, memo, in_progress);
                    for (i, count) in sub.into_iter().enumerate() {
                        counts[i + 1] += count;
                    }
                }
                if in_progress.insert(*exit) {
                    let sub = count_from(automaton, *exit, remaining, memo, in_progress);
                    for (i, count) in sub.into_iter().enumerate() {
                        counts[i] += count;
                    }
                    in_progress.remove(exit);
                }
            }
            Transition::Epsilon { target } => {
                if in_progress.insert(*target) {
                    let sub = count_from(automaton, *target, remaining, memo, in_progress);
                    for (i, count) in sub.into_iter().enumerate() {
                        counts[i] += count;
                    }
                    in_progress.remove(target);
                }
            }
        }
    }

    memo.insert((state, remaining), counts.clone());
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{PathPattern, RootNode, SegmentNode};
    use crate::automaton::builder;
    use crate::automaton::determinize::{determinize, DeterminizeOptions};

    fn dfa(root: RootNode) -> SegmentAutomaton {
        let pattern = PathPattern { source: String::new(), root, is_absolute: false, is_negation: false, errors: vec![] };
        let nfa = builder::build(&pattern);
        determinize(&nfa, DeterminizeOptions::default()).unwrap()
    }

    #[test]
    fn literal_pattern_is_not_empty_and_has_matching_witness() {
        let automaton = dfa(RootNode::Sequence(vec![SegmentNode::Literal("src".into())]));
        assert!(!is_empty(&automaton));
        let witness = find_witness(&automaton).unwrap();
        assert_eq!(witness.segments, vec!["src".to_string()]);
    }

    #[test]
    fn intersection_of_disjoint_literals_is_empty() {
        use crate::automaton::product::intersect;
        let a = dfa(RootNode::Sequence(vec![SegmentNode::Literal("foo".into())]));
        let b = dfa(RootNode::Sequence(vec![SegmentNode::Literal("bar".into())]));
        let product = intersect(&a, &b);
        assert!(is_empty(&product));
        assert!(find_witness(&product).is_none());
    }

    #[test]
    fn globstar_pattern_has_zero_segment_witness() {
        let automaton = dfa(RootNode::Sequence(vec![SegmentNode::Globstar]));
        let witness = find_witness(&automaton).unwrap();
        assert!(witness.segments.is_empty());
    }

    #[test]
    fn count_paths_counts_each_alternation_branch_at_its_own_depth() {
        let automaton = dfa(RootNode::Alternation(vec![
            RootNode::Sequence(vec![SegmentNode::Literal("a".into())]),
            RootNode::Sequence(vec![SegmentNode::Literal("b".into())]),
        ]));
        let by_depth = count_paths(&automaton, 1);
        assert_eq!(by_depth[&0], 0);
        assert_eq!(by_depth[&1], 2);
    }

    #[test]
    fn count_paths_breaks_down_globstar_depths_separately() {
        // "**" accepts 0, 1, 2, ... segments, one accepting configuration per depth.
        let automaton = dfa(RootNode::Sequence(vec![SegmentNode::Globstar]));
        let by_depth = count_paths(&automaton, 3);
        assert_eq!(by_depth[&0], 1);
        assert_eq!(by_depth[&1], 1);
        assert_eq!(by_depth[&2], 1);
        assert_eq!(by_depth[&3], 1);
    }
}
