//! Quick-reject pre-filter: a bundle of cheap string checks that can
//! short-circuit a match to `false` before automaton simulation runs.
//! Every check here is sound only in the reject direction — it must never
//! cause a path that the automaton would accept to be rejected early.
//!
//! Substring membership for `required_literal_segments` uses
//! [`memchr::memmem`], the same crate the teacher reaches for whenever it
//! needs a fast substring scan ahead of a more expensive check.

use crate::ast::{CompositePart, RootNode, SegmentNode, WildcardPart};
use crate::ast::PathPattern;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuickRejectFilter {
    pub required_prefix: Option<String>,
    pub required_suffix: Option<String>,
    pub min_length: usize,
    pub required_literal_segments: Vec<String>,
}

impl QuickRejectFilter {
    /// Derives a filter from a parsed pattern by walking its AST. Always
    /// sound: every field describes a necessary (not sufficient)
    /// condition for a match.
    pub fn from_pattern(pattern: &PathPattern) -> Self {
        from_root(&pattern.root)
    }

    /// Cheap rejection check. `true` means "might match, run the
    /// automaton"; `false` means "definitely does not match".
    pub fn accepts_prefilter(&self, path: &str) -> bool {
        if path.len() < self.min_length {
            return false;
        }
        if let Some(prefix) = &self.required_prefix {
            if !path.starts_with(prefix.as_str()) {
                return false;
            }
        }
        if let Some(suffix) = &self.required_suffix {
            if !path.ends_with(suffix.as_str()) {
                return false;
            }
        }
        for literal in &self.required_literal_segments {
            if memchr::memmem::find(path.as_bytes(), literal.as_bytes()).is_none() {
                return false;
            }
        }
        true
    }

    /// Combines two filters for an intersection: prefixes/suffixes by
    /// "longest compatible" (one must extend the other, else the
    /// requirement is dropped rather than risk an unsound reject),
    /// lengths by max, literal sets by union.
    pub fn intersect(a: &Self, b: &Self) -> Self {
        Self {
            required_prefix: longest_compatible(a.required_prefix.as_deref(), b.required_prefix.as_deref(), true),
            required_suffix: longest_compatible(a.required_suffix.as_deref(), b.required_suffix.as_deref(), false),
            min_length: a.min_length.max(b.min_length),
            required_literal_segments: {
                let mut merged = a.required_literal_segments.clone();
                for lit in &b.required_literal_segments {
                    if !merged.contains(lit) {
                        merged.push(lit.clone());
                    }
                }
                merged
            },
        }
    }

    /// Combines two filters for a union: prefixes/suffixes by longest
    /// common prefix/suffix, lengths by min, literal sets by intersection
    /// (a literal is only "required" if every branch requires it).
    pub fn union(a: &Self, b: &Self) -> Self {
        Self {
            required_prefix: common_prefix(a.required_prefix.as_deref(), b.required_prefix.as_deref()),
            required_suffix: common_suffix(a.required_suffix.as_deref(), b.required_suffix.as_deref()),
            min_length: a.min_length.min(b.min_length),
            required_literal_segments: a
                .required_literal_segments
                .iter()
                .filter(|lit| b.required_literal_segments.contains(lit))
                .cloned()
                .collect(),
        }
    }
}

fn longest_compatible(a: Option<&str>, b: Option<&str>, is_prefix: bool) -> Option<String> {
    match (a, b) {
        (Some(a), Some(b)) => {
            let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };
            let compatible = if is_prefix { longer.starts_with(shorter) } else { longer.ends_with(shorter) };
            if compatible {
                Some(longer.to_string())
            } else {
                None
            }
        }
        (Some(a), None) => Some(a.to_string()),
        (None, Some(b)) => Some(b.to_string()),
        (None, None) => None,
    }
}

fn common_prefix(a: Option<&str>, b: Option<&str>) -> Option<String> {
    let (a, b) = (a?, b?);
    let common: String = a.chars().zip(b.chars()).take_while(|(x, y)| x == y).map(|(x, _)| x).collect();
    if common.is_empty() {
        None
    } else {
        Some(common)
    }
}

fn common_suffix(a: Option<&str>, b: Option<&str>) -> Option<String> {
    let (a, b) = (a?, b?);
    let common: String = a.chars().rev().zip(b.chars().rev()).take_while(|(x, y)| x == y).map(|(x, _)| x).collect::<Vec<_>>().into_iter().rev().collect();
    if common.is_empty() {
        None
    } else {
        Some(common)
    }
}

fn from_root(root: &RootNode) -> QuickRejectFilter {
    match root {
        RootNode::Sequence(segments) => from_sequence(segments),
        RootNode::Alternation(branches) => {
            let mut iter = branches.iter().map(from_root);
            let Some(first) = iter.next() else { return QuickRejectFilter::default() };
            iter.fold(first, |acc, next| QuickRejectFilter::union(&acc, &next))
        }
    }
}

fn from_sequence(segments: &[SegmentNode]) -> QuickRejectFilter {
    let required_prefix = leading_literal_run(segments).map(|s| format!("/{s}"));
    let required_suffix = {
        let reversed: Vec<SegmentNode> = segments.iter().rev().cloned().collect();
        leading_literal_run(&reversed).map(|s| {
            let joined: String = s.split('/').rev().collect::<Vec<_>>().join("/");
            format!("/{joined}")
        })
    };

    let min_length: usize = segments
        .iter()
        .filter(|s| !s.is_globstar())
        .map(|s| 1 + segment_min_length(s))
        .sum();

    let required_literal_segments = segments
        .iter()
        .filter_map(|s| match s {
            SegmentNode::Literal(lit) => Some(lit.clone()),
            _ => None,
        })
        .collect();

    QuickRejectFilter { required_prefix, required_suffix, min_length, required_literal_segments }
}

/// The leading run of consecutive literal segments, joined with `/`, or
/// `None` if the first segment isn't a literal.
fn leading_literal_run(segments: &[SegmentNode]) -> Option<String> {
    let literals: Vec<&str> = segments
        .iter()
        .take_while(|s| matches!(s, SegmentNode::Literal(_)))
        .map(|s| match s {
            SegmentNode::Literal(lit) => lit.as_str(),
            _ => unreachable!(),
        })
        .collect();
    if literals.is_empty() {
        None
    } else {
        Some(literals.join("/"))
    }
}

fn segment_min_length(segment: &SegmentNode) -> usize {
    match segment {
        SegmentNode::Literal(s) => s.chars().count(),
        SegmentNode::Globstar => 0,
        SegmentNode::Charclass(_) => 1,
        SegmentNode::Wildcard(parts) => parts
            .iter()
            .map(|p| match p {
                WildcardPart::Literal(s) => s.chars().count(),
                WildcardPart::Star => 0,
                WildcardPart::Question => 1,
            })
            .sum(),
        SegmentNode::Composite(parts) => parts
            .iter()
            .map(|p| match p {
                CompositePart::Literal(s) => s.chars().count(),
                CompositePart::Star => 0,
                CompositePart::Question => 1,
                CompositePart::Charclass(_) => 1,
            })
            .sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(root: RootNode) -> PathPattern {
        PathPattern { source: String::new(), root, is_absolute: true, is_negation: false, errors: vec![] }
    }

    #[test]
    fn literal_sequence_yields_prefix_suffix_and_length() {
        let p = pattern(RootNode::Sequence(vec![SegmentNode::Literal("src".into()), SegmentNode::Literal("lib.rs".into())]));
        let filter = QuickRejectFilter::from_pattern(&p);
        assert_eq!(filter.required_prefix.as_deref(), Some("/src/lib.rs"));
        assert_eq!(filter.required_literal_segments, vec!["src".to_string(), "lib.rs".to_string()]);
        assert!(filter.min_length > 0);
    }

    #[test]
    fn prefilter_rejects_paths_missing_a_required_literal() {
        let p = pattern(RootNode::Sequence(vec![SegmentNode::Literal("src".into()), SegmentNode::Wildcard(vec![WildcardPart::Star])]));
        let filter = QuickRejectFilter::from_pattern(&p);
        assert!(!filter.accepts_prefilter("/lib/index.ts"));
        assert!(filter.accepts_prefilter("/src/index.ts"));
    }

    #[test]
    fn union_keeps_only_common_literals() {
        let a = pattern(RootNode::Sequence(vec![SegmentNode::Literal("src".into())]));
        let b = pattern(RootNode::Sequence(vec![SegmentNode::Literal("lib".into())]));
        let filter = QuickRejectFilter::union(&QuickRejectFilter::from_pattern(&a), &QuickRejectFilter::from_pattern(&b));
        assert!(filter.required_literal_segments.is_empty());
        assert!(filter.required_prefix.is_none());
    }

    #[test]
    fn intersect_takes_the_longer_compatible_prefix() {
        let a = QuickRejectFilter { required_prefix: Some("/src".into()), ..Default::default() };
        let b = QuickRejectFilter { required_prefix: Some("/src/lib".into()), ..Default::default() };
        let combined = QuickRejectFilter::intersect(&a, &b);
        assert_eq!(combined.required_prefix.as_deref(), Some("/src/lib"));
    }
}
