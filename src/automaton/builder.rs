//! NFA builder (C3): a Thompson-style construction over the segment
//! alphabet. Mirrors the shape of the teacher's own `Nfa::add` (one state
//! per pattern component, folding over segments) but operates on a typed
//! AST instead of splitting a raw string on `/`, and adds the alternation
//! and backing-matcher machinery the CODEOWNERS grammar never needed.

use std::sync::Arc;

use crate::ast::{PathPattern, RootNode, SegmentNode};
use crate::segment_match;

use super::{SegmentAutomaton, StateId, Transition, WildcardMatcher};

/// Builds a non-deterministic [`SegmentAutomaton`] for `pattern`'s root
/// node. The returned automaton's `initial_state` is always `0`.
pub fn build(pattern: &PathPattern) -> SegmentAutomaton {
    let mut nfa = SegmentAutomaton::new();
    let start = nfa.initial_state;
    let accept = nfa.add_state();
    build_root(&mut nfa, &pattern.root, start, accept);
    nfa.state_mut(accept).accepting = true;
    nfa
}

fn build_root(nfa: &mut SegmentAutomaton, root: &RootNode, start: StateId, accept: StateId) {
    match root {
        RootNode::Sequence(segments) => build_sequence(nfa, segments, start, accept),
        RootNode::Alternation(branches) => {
            for branch in branches {
                let branch_start = nfa.add_state();
                let branch_accept = nfa.add_state();
                nfa.state_mut(start).transitions.push(Transition::Epsilon { target: branch_start });
                nfa.state_mut(branch_accept).transitions.push(Transition::Epsilon { target: accept });
                build_root(nfa, branch, branch_start, branch_accept);
            }
        }
    }
}

fn build_sequence(nfa: &mut SegmentAutomaton, segments: &[SegmentNode], start: StateId, accept: StateId) {
    if segments.is_empty() {
        nfa.state_mut(start).transitions.push(Transition::Epsilon { target: accept });
        return;
    }

    let mut current = start;
    for (idx, segment) in segments.iter().enumerate() {
        let is_last = idx == segments.len() - 1;
        let next = if is_last { accept } else { nfa.add_state() };
        if is_last && idx > 0 && segment.is_globstar() {
            // A trailing `**` *after other segments* requires at least one
            // more segment: `src/**` matches `/src/foo` but not bare
            // `/src`. A bare `**` (the sole segment, `idx == 0`) still
            // matches zero segments, and a `**` followed by more pattern
            // (`src/**/*.ts`) keeps the ordinary zero-or-more construction
            // in `build_segment`, so `/src/index.ts` matches with nothing
            // between `src` and the final literal.
            build_trailing_globstar(nfa, current, next);
        } else {
            build_segment(nfa, segment, current, next);
        }
        current = next;
    }
}

/// Forces one real segment before the globstar's usual self-loop/exit
/// shape applies, so a trailing `**` cannot match zero segments.
fn build_trailing_globstar(nfa: &mut SegmentAutomaton, from: StateId, to: StateId) {
    let forced = nfa.add_state();
    nfa.state_mut(from).transitions.push(Transition::Wildcard {
        matcher: WildcardMatcher::AnySegment,
        source_tag: "*".to_string(),
        target: forced,
    });
    nfa.state_mut(forced).transitions.push(Transition::Globstar { self_loop: forced, exit: to });
}

fn build_segment(nfa: &mut SegmentAutomaton, segment: &SegmentNode, from: StateId, to: StateId) {
    match segment {
        SegmentNode::Literal(lit) => {
            nfa.state_mut(from).transitions.push(Transition::Literal { segment: lit.clone(), target: to });
        }
        SegmentNode::Globstar => {
            nfa.state_mut(from).transitions.push(Transition::Globstar { self_loop: from, exit: to });
        }
        SegmentNode::Wildcard(_) | SegmentNode::Charclass(_) | SegmentNode::Composite(_) => {
            let regex = segment_match::to_regex(segment).expect("non-literal segment lowers to a regex");
            let matcher = WildcardMatcher::Regex(Arc::new(regex));
            let source_tag = segment.render();
            nfa.state_mut(from).transitions.push(Transition::Wildcard { matcher, source_tag, target: to });
        }
    }
}

/// Minimum number of path segments any matched path must have: the count
/// of non-globstar segments, taking the min across alternation branches.
/// A *trailing* globstar adds one more — see `build_trailing_globstar`,
/// which forces a segment in front of it so `src/**` can't match bare
/// `src`.
pub fn min_segments(root: &RootNode) -> usize {
    match root {
        RootNode::Sequence(segments) => {
            let base = segments.iter().filter(|s| !s.is_globstar()).count();
            if segments.len() > 1 && segments.last().is_some_and(SegmentNode::is_globstar) {
                base + 1
            } else {
                base
            }
        }
        RootNode::Alternation(branches) => {
            branches.iter().map(min_segments).min().unwrap_or(0)
        }
    }
}

/// Maximum number of path segments, or `None` if any reachable branch
/// contains a globstar (unbounded).
pub fn max_segments(root: &RootNode) -> Option<usize> {
    match root {
        RootNode::Sequence(segments) => {
            if segments.iter().any(SegmentNode::is_globstar) {
                None
            } else {
                Some(segments.len())
            }
        }
        RootNode::Alternation(branches) => {
            let mut max = Some(0usize);
            for branch in branches {
                let branch_max = max_segments(branch)?;
                max = max.map(|m| m.max(branch_max));
            }
            max
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::PathPattern;

    fn pattern(root: RootNode) -> PathPattern {
        PathPattern { source: String::new(), root, is_absolute: false, is_negation: false, errors: vec![] }
    }

    #[test]
    fn empty_sequence_has_epsilon_from_start_to_accept() {
        let p = pattern(RootNode::empty_sequence());
        let nfa = build(&p);
        assert_eq!(nfa.states.len(), 2);
        match &nfa.state(0).transitions[0] {
            Transition::Epsilon { target } => assert_eq!(*target, 1),
            other => panic!("expected epsilon, got {other:?}"),
        }
    }

    #[test]
    fn literal_sequence_chains_states() {
        let p = pattern(RootNode::Sequence(vec![
            SegmentNode::Literal("src".into()),
            SegmentNode::Literal("lib.rs".into()),
        ]));
        let nfa = build(&p);
        assert_eq!(nfa.states.len(), 3);
        assert!(matches!(&nfa.state(0).transitions[0], Transition::Literal { segment, target } if segment == "src" && *target == 1));
        assert!(matches!(&nfa.state(1).transitions[0], Transition::Literal { segment, target } if segment == "lib.rs" && *target == 2));
        assert!(nfa.state(2).accepting);
    }

    #[test]
    fn trailing_globstar_forces_one_segment_before_self_loop() {
        // src/** : state 0 --src--> 2 --(forced wildcard)--> 3 --globstar(self=3,exit=1=accept)
        let p = pattern(RootNode::Sequence(vec![SegmentNode::Literal("src".into()), SegmentNode::Globstar]));
        let nfa = build(&p);
        let literal_target = match &nfa.state(0).transitions[0] {
            Transition::Literal { segment, target } => {
                assert_eq!(segment, "src");
                *target
            }
            other => panic!("expected literal, got {other:?}"),
        };
        let forced_target = match &nfa.state(literal_target).transitions[0] {
            Transition::Wildcard { target, .. } => *target,
            other => panic!("expected a forced wildcard before the globstar, got {other:?}"),
        };
        match &nfa.state(forced_target).transitions[0] {
            Transition::Globstar { self_loop, exit } => {
                assert_eq!(*self_loop, forced_target);
                assert!(nfa.is_accepting(*exit));
            }
            other => panic!("expected globstar, got {other:?}"),
        }
    }

    #[test]
    fn non_trailing_globstar_keeps_zero_or_more_semantics() {
        let p = pattern(RootNode::Sequence(vec![
            SegmentNode::Globstar,
            SegmentNode::Literal("x.ts".into()),
        ]));
        let nfa = build(&p);
        match &nfa.state(0).transitions[0] {
            Transition::Globstar { self_loop, exit } => {
                assert_eq!(*self_loop, 0);
                assert!(matches!(&nfa.state(*exit).transitions[0], Transition::Literal { segment, .. } if segment == "x.ts"));
            }
            other => panic!("expected globstar, got {other:?}"),
        }
    }

    #[test]
    fn min_max_segments_for_unbounded_pattern() {
        let root = RootNode::Sequence(vec![SegmentNode::Literal("src".into()), SegmentNode::Globstar]);
        assert_eq!(min_segments(&root), 2);
        assert_eq!(max_segments(&root), None);
    }

    #[test]
    fn min_max_segments_for_bounded_alternation() {
        let root = RootNode::Alternation(vec![
            RootNode::Sequence(vec![SegmentNode::Literal("a".into())]),
            RootNode::Sequence(vec![SegmentNode::Literal("a".into()), SegmentNode::Literal("b".into())]),
        ]);
        assert_eq!(min_segments(&root), 1);
        assert_eq!(max_segments(&root), Some(2));
    }
}
