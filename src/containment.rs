//! Containment analyzer (C9): a structural-plus-sample-based check of
//! `L(A) ⊆ L(B)`, `L(A) ⊇ L(B)`, and overlap, with a structured
//! explanation attached.
//!
//! This is explicitly not a closed-form decision procedure — see the
//! design notes' rationale. A counterexample proves non-containment;
//! absence of one is only suggestive, strengthened where possible by the
//! structural checks in [`check_direction`].

use crate::ast::{CharClassSpec, CompositePart, RootNode, SegmentNode, WildcardPart};
use crate::compiled::CompiledPattern;
use crate::matcher;
use crate::segment_match;

const SAMPLE_COUNT: usize = 6;
const DEFAULT_GLOBSTAR_DEPTH: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relationship {
    Equal,
    Subset,
    Superset,
    Overlapping,
    Disjoint,
}

#[derive(Debug, Clone)]
pub struct SegmentConstraint {
    pub position: usize,
    pub a_description: String,
    pub b_description: String,
    pub a_subset_of_b: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WitnessCategory {
    Counterexample,
    ReverseCounterexample,
    Shared,
}

#[derive(Debug, Clone)]
pub struct CategorizedWitness {
    pub path: String,
    pub category: WitnessCategory,
}

#[derive(Debug, Clone, Default)]
pub struct Explanation {
    pub failure_reasons: Vec<String>,
    pub segment_comparison: Vec<SegmentConstraint>,
    pub witnesses: Vec<CategorizedWitness>,
}

#[derive(Debug, Clone)]
pub struct ContainmentResult {
    pub is_subset: bool,
    pub is_superset: bool,
    pub is_equal: bool,
    pub has_overlap: bool,
    pub relationship: Relationship,
    pub counterexample: Option<String>,
    pub reverse_counterexample: Option<String>,
    pub explanation: Explanation,
}

pub fn check_containment(a: &CompiledPattern, b: &CompiledPattern) -> ContainmentResult {
    let samples_a = valid_samples(a);
    let samples_b = valid_samples(b);

    let (is_subset, counterexample) = check_direction(&samples_a, a, b);
    let (is_superset, reverse_counterexample) = check_direction(&samples_b, b, a);

    let is_equal = is_subset && is_superset;
    let has_overlap = is_equal || compute_overlap(a, b, &samples_a, &samples_b);

    let relationship = if is_equal {
        Relationship::Equal
    } else if is_subset {
        Relationship::Subset
    } else if is_superset {
        Relationship::Superset
    } else if has_overlap {
        Relationship::Overlapping
    } else {
        Relationship::Disjoint
    };

    let explanation = build_explanation(a, b, is_subset, &counterexample, &reverse_counterexample, &samples_a, has_overlap);

    ContainmentResult { is_subset, is_superset, is_equal, has_overlap, relationship, counterexample, reverse_counterexample, explanation }
}

/// Checks whether every sample `own` produces is accepted by `other`
/// (`L(own) ⊆ L(other)`), strengthened structurally when sampling alone
/// can't settle it: an unbounded `own` against a bounded `other` is
/// provably not a subset regardless of what the samples showed.
fn check_direction(own_samples: &[String], own: &CompiledPattern, other: &CompiledPattern) -> (bool, Option<String>) {
    for sample in own_samples {
        if !matcher::matches(sample, other) {
            return (false, Some(sample.clone()));
        }
    }
    if own.is_unbounded && !other.is_unbounded {
        if let Some(max) = other.max_segments {
            let path = synthesize_depth_path(own, max + 1);
            if !matcher::matches(&path, other) {
                return (false, Some(path));
            }
        }
    }
    (true, None)
}

fn compute_overlap(a: &CompiledPattern, b: &CompiledPattern, samples_a: &[String], samples_b: &[String]) -> bool {
    if samples_a.iter().any(|s| matcher::matches(s, b)) {
        return true;
    }
    if samples_b.iter().any(|s| matcher::matches(s, a)) {
        return true;
    }
    for candidate in combined_candidates(a, b) {
        if matcher::matches(&candidate, a) && matcher::matches(&candidate, b) {
            return true;
        }
    }
    false
}

/// Mixes prefixes and suffixes drawn from both patterns' quick-reject
/// filters into synthetic combined candidates — a third overlap-probing
/// generator beyond "A's samples against B" and "B's samples against A".
fn combined_candidates(a: &CompiledPattern, b: &CompiledPattern) -> Vec<String> {
    let mut out = Vec::new();
    if let (Some(prefix), Some(suffix)) = (&a.quick_reject.required_prefix, &b.quick_reject.required_suffix) {
        out.push(format!("{prefix}{suffix}"));
    }
    if let (Some(prefix), Some(suffix)) = (&b.quick_reject.required_prefix, &a.quick_reject.required_suffix) {
        out.push(format!("{prefix}{suffix}"));
    }
    out
}

/// Generates up to [`SAMPLE_COUNT`] concrete paths from `pattern`'s AST,
/// keeping only the ones the pattern's own automaton actually accepts —
/// a defensive self-check against a rendering bug producing a bogus
/// "sample of A" that doesn't even satisfy A.
fn valid_samples(pattern: &CompiledPattern) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for k in 0..SAMPLE_COUNT {
        let segments = render_root_sample(&pattern.pattern.root, k, DEFAULT_GLOBSTAR_DEPTH);
        let path = format!("/{}", segments.join("/"));
        if seen.insert(path.clone()) && matcher::matches(&path, pattern) {
            out.push(path);
        }
    }
    log::debug!("containment: sampled {} candidate path(s) for {:?}", out.len(), pattern.pattern.source);
    out
}

/// Builds a single path of exactly `target_depth` segments accepted by
/// `pattern`, used to synthesize a counterexample at a depth an unbounded
/// pattern can reach but a bounded one cannot.
fn synthesize_depth_path(pattern: &CompiledPattern, target_depth: usize) -> String {
    let base = render_root_sample(&pattern.pattern.root, 0, DEFAULT_GLOBSTAR_DEPTH);
    let mut segments = base.clone();
    let mut depth = 1;
    while segments.len() < target_depth && depth < 64 {
        segments = render_root_sample(&pattern.pattern.root, 0, DEFAULT_GLOBSTAR_DEPTH + depth);
        depth += 1;
    }
    format!("/{}", segments.join("/"))
}

fn render_root_sample(root: &RootNode, k: usize, globstar_depth: usize) -> Vec<String> {
    match root {
        RootNode::Sequence(segments) => segments.iter().flat_map(|s| render_segment_sample(s, k, globstar_depth)).collect(),
        RootNode::Alternation(branches) => {
            if branches.is_empty() {
                Vec::new()
            } else {
                render_root_sample(&branches[k % branches.len()], k, globstar_depth)
            }
        }
    }
}

fn render_segment_sample(segment: &SegmentNode, k: usize, globstar_depth: usize) -> Vec<String> {
    match segment {
        SegmentNode::Literal(s) => vec![s.clone()],
        SegmentNode::Globstar => (1..=globstar_depth).map(|i| format!("dir{i}")).collect(),
        SegmentNode::Charclass(spec) => vec![sample_charclass(spec)],
        SegmentNode::Wildcard(parts) => vec![render_wildcard_sample(parts, k)],
        SegmentNode::Composite(parts) => vec![render_composite_sample(parts, k)],
    }
}

fn render_wildcard_sample(parts: &[WildcardPart], k: usize) -> String {
    let mut out = String::new();
    for part in parts {
        match part {
            WildcardPart::Literal(s) => out.push_str(s),
            WildcardPart::Star => out.push_str(&star_fill(k)),
            WildcardPart::Question => out.push('x'),
        }
    }
    out
}

fn render_composite_sample(parts: &[CompositePart], k: usize) -> String {
    let mut out = String::new();
    for part in parts {
        match part {
            CompositePart::Literal(s) => out.push_str(s),
            CompositePart::Star => out.push_str(&star_fill(k)),
            CompositePart::Question => out.push('x'),
            CompositePart::Charclass(spec) => out.push_str(&sample_charclass(spec)),
        }
    }
    out
}

fn star_fill(k: usize) -> String {
    match k % 4 {
        0 => "abc".to_string(),
        1 => "file1".to_string(),
        2 => "test-2".to_string(),
        _ => "match3".to_string(),
    }
}

fn sample_charclass(spec: &CharClassSpec) -> String {
    if let Some(range) = spec.ranges.first() {
        return range.start.to_string();
    }
    if let Some(c) = spec.chars.chars().next() {
        return c.to_string();
    }
    "a".to_string()
}

fn build_explanation(
    a: &CompiledPattern,
    b: &CompiledPattern,
    is_subset: bool,
    counterexample: &Option<String>,
    reverse_counterexample: &Option<String>,
    samples_a: &[String],
    has_overlap: bool,
) -> Explanation {
    let mut failure_reasons = Vec::new();
    if !is_subset {
        if a.is_unbounded && !b.is_unbounded {
            failure_reasons.push(format!(
                "A is unbounded (contains a non-trailing '**') but B caps out at {} segments",
                b.max_segments.unwrap_or(0)
            ));
        }
        if let (Some(ap), Some(bp)) = (&a.quick_reject.required_prefix, &b.quick_reject.required_prefix) {
            if ap != bp && !ap.starts_with(bp.as_str()) {
                failure_reasons.push(format!("A requires prefix {ap:?}, incompatible with B's required prefix {bp:?}"));
            }
        }
        if let (Some(asuf), Some(bsuf)) = (&a.quick_reject.required_suffix, &b.quick_reject.required_suffix) {
            if asuf != bsuf && !asuf.ends_with(bsuf.as_str()) {
                failure_reasons.push(format!("A requires suffix {asuf:?}, incompatible with B's required suffix {bsuf:?}"));
            }
        }
        if a.pattern.is_absolute != b.pattern.is_absolute {
            failure_reasons.push("A and B differ in anchoring (a leading '/' or '~')".to_string());
        }
        if failure_reasons.is_empty() && counterexample.is_some() {
            failure_reasons.push("segment_mismatch".to_string());
        }
    }

    let segment_comparison = compare_segments(a, b);

    let mut witnesses = Vec::new();
    if let Some(path) = counterexample {
        witnesses.push(CategorizedWitness { path: path.clone(), category: WitnessCategory::Counterexample });
    }
    if let Some(path) = reverse_counterexample {
        witnesses.push(CategorizedWitness { path: path.clone(), category: WitnessCategory::ReverseCounterexample });
    }
    if has_overlap {
        if let Some(shared) = samples_a.iter().find(|s| matcher::matches(s, b)) {
            witnesses.push(CategorizedWitness { path: shared.clone(), category: WitnessCategory::Shared });
        }
    }

    Explanation { failure_reasons, segment_comparison, witnesses }
}

/// Compares up to five leading segment positions of A and B's top-level
/// sequences (the first branch, if either root is an alternation) to
/// produce a human-readable diff.
fn compare_segments(a: &CompiledPattern, b: &CompiledPattern) -> Vec<SegmentConstraint> {
    let a_segs = sequence_segments(&a.pattern.root);
    let b_segs = sequence_segments(&b.pattern.root);
    let len = a_segs.len().max(b_segs.len()).min(5);

    (0..len)
        .map(|i| {
            let a_seg = a_segs.get(i);
            let b_seg = b_segs.get(i);
            let a_description = a_seg.map(SegmentNode::render).unwrap_or_else(|| "∅".to_string());
            let b_description = b_seg.map(SegmentNode::render).unwrap_or_else(|| "∅".to_string());
            let a_subset_of_b = match (a_seg, b_seg) {
                (Some(SegmentNode::Literal(lit)), Some(bn)) => segment_match::matches(lit, bn),
                (Some(_), Some(SegmentNode::Globstar)) => true,
                (Some(an), Some(bn)) => an == bn,
                _ => false,
            };
            SegmentConstraint { position: i, a_description, b_description, a_subset_of_b }
        })
        .collect()
}

fn sequence_segments(root: &RootNode) -> Vec<SegmentNode> {
    match root {
        RootNode::Sequence(segments) => segments.clone(),
        RootNode::Alternation(branches) => branches.first().map(sequence_segments).unwrap_or_default(),
    }
}
