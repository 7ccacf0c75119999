//! Matcher (C4): simulates an automaton over a segment list.
//!
//! Two simulation strategies share the same epsilon-closure machinery from
//! [`crate::automaton`]: a full NFA state-set walk (used whenever
//! `automaton.is_deterministic` is false) and a single-state DFA fast path
//! that applies the literal-over-wildcard-over-catch-all priority the
//! determinizer's completion step depends on for complement to be correct
//! (see §4.3/§4.4 of the design notes this module implements).

use std::collections::BTreeSet;

use crate::automaton::{epsilon_closure, SegmentAutomaton, StateId, Transition};
use crate::compiled::CompiledPattern;

/// Splits a normalized absolute path (`/a/b/c`, or `/`) into its segments,
/// dropping empty components (a leading `/` produces one before the first
/// segment; a bare `/` produces none).
pub fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Top-level entry point: quick-reject, segment-count bounds, automaton
/// simulation, then the outer negation flip.
pub fn matches(path: &str, compiled: &CompiledPattern) -> bool {
    let inner = matches_inner(path, compiled);
    if compiled.pattern.is_negation {
        !inner
    } else {
        inner
    }
}

fn matches_inner(path: &str, compiled: &CompiledPattern) -> bool {
    if !compiled.quick_reject.accepts_prefilter(path) {
        return false;
    }

    let segments = split_segments(path);
    if segments.len() < compiled.min_segments {
        return false;
    }
    if let Some(max) = compiled.max_segments {
        if segments.len() > max {
            return false;
        }
    }

    if compiled.automaton.is_deterministic {
        matches_deterministic(&segments, &compiled.automaton)
    } else {
        matches_nondeterministic(&segments, &compiled.automaton)
    }
}

fn matches_nondeterministic(segments: &[&str], automaton: &SegmentAutomaton) -> bool {
    let mut current = epsilon_closure(automaton, [automaton.initial_state]);
    for segment in segments {
        let mut next = BTreeSet::new();
        for &state in &current {
            for transition in &automaton.state(state).transitions {
                match transition {
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
        current = epsilon_closure(automaton, next);
        if current.is_empty() {
            return false;
        }
    }
    current.iter().any(|&s| automaton.is_accepting(s))
}

/// Resolves exactly one applicable transition per segment by priority:
/// `Literal` beats a specific `Wildcard` beats the completion catch-all.
/// A deterministic automaton built by this crate's own determinizer never
/// needs `Globstar`/`Epsilon` here (those are NFA-construction-only), but
/// this still falls back to treating a stray `Globstar` as "always fires"
/// so a hand-built or partially-processed deterministic automaton doesn't
/// silently misbehave.
fn matches_deterministic(segments: &[&str], automaton: &SegmentAutomaton) -> bool {
    let mut state = automaton.initial_state;
    for segment in segments {
        match next_state(automaton, state, segment) {
            Some(next) => state = next,
            None => return false,
        }
    }
    automaton.is_accepting(state)
}

fn next_state(automaton: &SegmentAutomaton, state: StateId, segment: &str) -> Option<StateId> {
    let transitions = &automaton.state(state).transitions;

    for t in transitions {
        if let Transition::Literal { segment: s, target } = t {
            if s == segment {
                return Some(*target);
            }
        }
    }
    for t in transitions {
        if let Transition::Wildcard { matcher, target, .. } = t {
            if !matcher.is_catch_all() && matcher.accepts(segment) {
                return Some(*target);
            }
        }
    }
    for t in transitions {
        if let Transition::Globstar { self_loop, .. } = t {
            return Some(*self_loop);
        }
    }
    for t in transitions {
        if let Transition::Wildcard { matcher, target, .. } = t {
            if matcher.is_catch_all() {
                return Some(*target);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiled::CompileOptions;
    use crate::parser;

    fn compile(src: &str) -> CompiledPattern {
        let pattern = parser::parse(src);
        crate::compiled::compile(pattern, CompileOptions::default()).unwrap()
    }

    #[test]
    fn literal_pattern_matches_exact_path_only() {
        let p = compile("src/lib.rs");
        assert!(matches("/src/lib.rs", &p));
        assert!(!matches("/src/main.rs", &p));
    }

    #[test]
    fn globstar_and_extension_wildcard() {
        let p = compile("src/**/*.ts");
        assert!(matches("/src/index.ts", &p));
        assert!(matches("/src/a/b/index.ts", &p));
        assert!(!matches("/lib/index.ts", &p));
    }

    #[test]
    fn trailing_globstar_requires_at_least_one_segment() {
        let p = compile("src/**");
        assert!(!matches("/src", &p));
        assert!(matches("/src/foo", &p));
        assert!(matches("/src/foo/bar", &p));
    }

    #[test]
    fn negation_flips_the_result() {
        let p = compile("!src/**");
        assert!(matches("/src", &p));
        assert!(!matches("/src/foo", &p));
    }

    #[test]
    fn empty_pattern_matches_only_root() {
        let p = compile("");
        assert!(matches("/", &p));
        assert!(!matches("/anything", &p));
    }
}
