//! Compiled patterns (C1 lifecycle + algebra entry points): the public
//! value type that holds a pattern's AST, its derived automaton, and the
//! precomputed bookkeeping the matcher and analyzer both lean on.
//!
//! Compiled patterns are value-like and immutable — every algebra
//! operation below builds a fresh [`CompiledPattern`] rather than mutating
//! an existing one, per the data model's lifecycle note.

use crate::ast::{PathPattern, RootNode};
use crate::automaton::determinize::{determinize, DeterminizeOptions};
use crate::automaton::{complement as complement_automaton, product, SegmentAutomaton};
use crate::error::LimitError;
use crate::quick_reject::QuickRejectFilter;
use crate::{automaton::builder, parser};

#[derive(Debug, Clone, Copy)]
pub struct CompileOptions {
    pub determinize: DeterminizeOptions,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self { determinize: DeterminizeOptions::default() }
    }
}

/// A pattern plus everything derived from it that the matcher and
/// analyzer need: the quick-reject filter, the compiled (deterministic,
/// complete) automaton, and the segment-count bounds from §4.2.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub pattern: PathPattern,
    pub quick_reject: QuickRejectFilter,
    pub automaton: SegmentAutomaton,
    pub is_unbounded: bool,
    pub min_segments: usize,
    pub max_segments: Option<usize>,
}

/// Parses `source` and compiles it in one step. Parse errors attach to
/// `pattern.errors` rather than failing this call — see the error-handling
/// design's two failure classes. Only [`LimitError`] (a DFA state-cap
/// overrun) fails outright.
pub fn compile_source(source: &str, options: CompileOptions) -> Result<CompiledPattern, LimitError> {
    compile(parser::parse(source), options)
}

/// Compiles an already-parsed pattern: builds the NFA (C3), determinizes
/// it (C5), and derives the quick-reject filter and segment bounds from
/// the AST.
pub fn compile(pattern: PathPattern, options: CompileOptions) -> Result<CompiledPattern, LimitError> {
    let nfa = builder::build(&pattern);
    let automaton = determinize(&nfa, options.determinize)?;
    let quick_reject = QuickRejectFilter::from_pattern(&pattern);
    let min_segments = builder::min_segments(&pattern.root);
    let max_segments = builder::max_segments(&pattern.root);
    let is_unbounded = max_segments.is_none();

    Ok(CompiledPattern { pattern, quick_reject, automaton, is_unbounded, min_segments, max_segments })
}

impl CompiledPattern {
    /// `L(self) ∩ L(other)`. Both automata are already complete DFAs, so
    /// the product (§4.5) is complete and deterministic by construction —
    /// no extra determinize/complete pass is needed.
    pub fn intersect(&self, other: &CompiledPattern) -> CompiledPattern {
        let automaton = product::intersect(&self.automaton, &other.automaton);
        let quick_reject = QuickRejectFilter::intersect(&self.quick_reject, &other.quick_reject);
        let max_segments = match (self.max_segments, other.max_segments) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (None, None) => None,
        };
        CompiledPattern {
            pattern: synthetic_pattern("∩", &self.pattern, &other.pattern),
            quick_reject,
            is_unbounded: max_segments.is_none(),
            min_segments: self.min_segments.max(other.min_segments),
            max_segments,
            automaton,
        }
    }

    /// `L(self) ∪ L(other)`. NFA-splice union (§4.5) always returns a
    /// non-deterministic automaton, so this determinizes it before
    /// storing, keeping every `CompiledPattern`'s automaton DFA-fast-path
    /// eligible.
    pub fn union(&self, other: &CompiledPattern, options: CompileOptions) -> Result<CompiledPattern, LimitError> {
        let nfa = product::union(&self.automaton, &other.automaton);
        let automaton = determinize(&nfa, options.determinize)?;
        let quick_reject = QuickRejectFilter::union(&self.quick_reject, &other.quick_reject);
        let max_segments = match (self.max_segments, other.max_segments) {
            (Some(a), Some(b)) => Some(a.max(b)),
            _ => None,
        };
        Ok(CompiledPattern {
            pattern: synthetic_pattern("∪", &self.pattern, &other.pattern),
            quick_reject,
            is_unbounded: max_segments.is_none(),
            min_segments: self.min_segments.min(other.min_segments),
            max_segments,
            automaton,
        })
    }

    /// `L(self)ᶜ`. A complemented automaton has no sound quick-reject
    /// requirements of its own ("everything else" admits arbitrary
    /// prefixes/suffixes/lengths), so the filter resets to accept
    /// everything and the bounds widen to unbounded.
    pub fn complement(&self, options: CompileOptions) -> Result<CompiledPattern, LimitError> {
        let automaton = complement_automaton::complement(&self.automaton, options.determinize)?;
        Ok(CompiledPattern {
            pattern: synthetic_unary_pattern("¬", &self.pattern),
            quick_reject: QuickRejectFilter::default(),
            is_unbounded: true,
            min_segments: 0,
            max_segments: None,
            automaton,
        })
    }

    /// `L(self) \ L(other)`, implemented as `self ∩ ¬other`.
    pub fn difference(&self, other: &CompiledPattern, options: CompileOptions) -> Result<CompiledPattern, LimitError> {
        let complement_of_other = other.complement(options)?;
        Ok(self.intersect(&complement_of_other))
    }
}

/// Builds the diagnostic synthetic pattern the design notes describe for
/// a binary algebra operation: an alternation node over the two operand
/// roots, tagged with a source string that's never re-parsed.
fn synthetic_pattern(op: &str, a: &PathPattern, b: &PathPattern) -> PathPattern {
    PathPattern {
        source: format!("({}) {op} ({})", a.source, b.source),
        root: RootNode::Alternation(vec![a.root.clone(), b.root.clone()]),
        is_absolute: a.is_absolute && b.is_absolute,
        is_negation: false,
        errors: Vec::new(),
    }
}

fn synthetic_unary_pattern(op: &str, a: &PathPattern) -> PathPattern {
    PathPattern {
        source: format!("{op}({})", a.source),
        root: RootNode::Alternation(vec![a.root.clone()]),
        is_absolute: a.is_absolute,
        is_negation: false,
        errors: Vec::new(),
    }
}
