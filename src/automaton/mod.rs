//! The segment automaton: a directed graph over integer-indexed states
//! carrying one of four transition kinds. States form a cyclic graph
//! (self-loops on globstars, back-edges after subset construction) encoded
//! as a flat vector with edges storing target IDs rather than owning
//! references — no cycle-breaking machinery required.

pub mod builder;
pub mod complement;
pub mod determinize;
pub mod emptiness;
pub mod product;

use std::sync::Arc;

use regex::Regex;

pub type StateId = usize;

/// The matcher carried by a [`Transition::Wildcard`] edge. Closed data
/// rather than a boxed closure, per the design notes: intersection of two
/// wildcard predicates builds an `And` node instead of a dynamic closure.
#[derive(Debug, Clone)]
pub enum WildcardMatcher {
    /// A regex compiled from a lowered segment node (C2's `to_regex`).
    Regex(Arc<Regex>),
    /// The catch-all added during DFA completion (`^.*$`): matches any
    /// segment, including (harmlessly) the empty string.
    Universal,
    /// The subset-construction "any" alphabet symbol (`^.+$`): represents
    /// segments matched only by a globstar self-loop, not covered by any
    /// listed literal or named wildcard.
    AnySegment,
    /// The composite predicate produced by intersecting two wildcards.
    And(Box<WildcardMatcher>, Box<WildcardMatcher>),
}

impl WildcardMatcher {
    pub fn accepts(&self, segment: &str) -> bool {
        match self {
            WildcardMatcher::Regex(re) => re.is_match(segment),
            WildcardMatcher::Universal => true,
            WildcardMatcher::AnySegment => !segment.is_empty(),
            WildcardMatcher::And(a, b) => a.accepts(segment) && b.accepts(segment),
        }
    }

    /// True for the two catch-all shapes that a completed DFA uses to stay
    /// total. Used by the matcher's tie-break (specific wildcards beat the
    /// catch-all) and by completion (skip adding a second catch-all).
    pub fn is_catch_all(&self) -> bool {
        matches!(self, WildcardMatcher::Universal | WildcardMatcher::AnySegment)
    }
}

/// One outgoing edge from a state. The four variants are a closed sum;
/// matching and subset construction dispatch on the tag instead of going
/// through a trait-object hierarchy.
#[derive(Debug, Clone)]
pub enum Transition {
    Literal { segment: String, target: StateId },
    Wildcard { matcher: WildcardMatcher, source_tag: String, target: StateId },
    /// A two-faced transition: `self_loop` is reached by consuming one more
    /// segment (staying put, from the self-loop's perspective, on the
    /// originating state); `exit` is reachable without consuming anything,
    /// and behaves as an epsilon edge for closure purposes.
    Globstar { self_loop: StateId, exit: StateId },
    Epsilon { target: StateId },
}

#[derive(Debug, Clone, Default)]
pub struct State {
    pub transitions: Vec<Transition>,
    pub accepting: bool,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A segment-alphabet automaton (NFA or DFA). `accepting_states` is
/// deliberately not a stored field — the data-model invariant that it must
/// exactly track each state's `accepting` bit is trivially true when it's
/// derived instead of duplicated.
#[derive(Debug, Clone)]
pub struct SegmentAutomaton {
    pub states: Vec<State>,
    pub initial_state: StateId,
    pub is_deterministic: bool,
}

impl SegmentAutomaton {
    pub fn new() -> Self {
        Self { states: vec![State::new()], initial_state: 0, is_deterministic: false }
    }

    pub fn add_state(&mut self) -> StateId {
        let id = self.states.len();
        self.states.push(State::new());
        id
    }

    pub fn state(&self, id: StateId) -> &State {
        &self.states[id]
    }

    pub fn state_mut(&mut self, id: StateId) -> &mut State {
        &mut self.states[id]
    }

    pub fn accepting_states(&self) -> Vec<StateId> {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, s)| s.accepting)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn is_accepting(&self, id: StateId) -> bool {
        self.states[id].accepting
    }
}

impl Default for SegmentAutomaton {
    fn default() -> Self {
        Self::new()
    }
}

/// Epsilon closure of a seed set: includes every `Epsilon.target` and every
/// `Globstar.exit` reachable without consuming input (a globstar can always
/// match zero segments). Shared by the determinizer's subset construction
/// and the NFA-mode matcher simulation.
pub fn epsilon_closure(
    automaton: &SegmentAutomaton,
    seeds: impl IntoIterator<Item = StateId>,
) -> std::collections::BTreeSet<StateId> {
    let mut closure: std::collections::BTreeSet<StateId> = seeds.into_iter().collect();
    let mut stack: Vec<StateId> = closure.iter().copied().collect();
    while let Some(id) = stack.pop() {
        for transition in &automaton.state(id).transitions {
            let next = match transition {
                Transition::Epsilon { target } => Some(*target),
                Transition::Globstar { exit, .. } => Some(*exit),
                _ => None,
            };
            if let Some(next) = next {
                if closure.insert(next) {
                    stack.push(next);
                }
            }
        }
    }
    closure
}
