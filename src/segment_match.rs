//! Segment matcher (C2): tests one string segment against one segment
//! node, and lowers a segment node to an anchored regex for use as an
//! automaton transition's matcher.
//!
//! The part-matching algorithm is the same greedy-with-backtracking scheme
//! the teacher's `wildcard::matches` uses (`*` tries every possible
//! consumption length, `?` consumes exactly one character), generalized to
//! also admit character-class parts. A visited-state memo prevents the
//! exponential blowup the teacher's own `test_exponential_match` guards
//! against, since here the backtracking is expressed recursively rather
//! than with the teacher's iterative reset-index loop.

use std::collections::HashSet;

use regex::Regex;

use crate::ast::{CharClassSpec, CompositePart, SegmentNode, WildcardPart};

/// Tests whether `segment` satisfies `node`.
pub fn matches(segment: &str, node: &SegmentNode) -> bool {
    match node {
        SegmentNode::Literal(lit) => segment == lit,
        SegmentNode::Globstar => true,
        SegmentNode::Charclass(spec) => {
            let mut chars = segment.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => spec.accepts(c),
                _ => false,
            }
        }
        SegmentNode::Wildcard(parts) => {
            let atoms: Vec<Atom> = parts.iter().map(Atom::from_wildcard_part).collect();
            matches_atoms(&atoms, segment)
        }
        SegmentNode::Composite(parts) => {
            let atoms: Vec<Atom> = parts.iter().map(Atom::from_composite_part).collect();
            matches_atoms(&atoms, segment)
        }
    }
}

/// Lowers a segment node to an anchored regex accepting exactly its
/// language. Literal nodes return `None` — callers should prefer the fast
/// string-equality path instead.
pub fn to_regex(node: &SegmentNode) -> Option<Regex> {
    match node {
        SegmentNode::Literal(_) => None,
        SegmentNode::Globstar => Some(Regex::new(r"^.*$").expect("static regex")),
        SegmentNode::Charclass(spec) => {
            let mut pattern = String::from("^(?:");
            push_class_regex(&mut pattern, spec);
            pattern.push_str(")$");
            Some(Regex::new(&pattern).unwrap_or_else(|e| {
                panic!("internal error lowering charclass to regex {pattern:?}: {e}")
            }))
        }
        SegmentNode::Wildcard(parts) => {
            let atoms: Vec<Atom> = parts.iter().map(Atom::from_wildcard_part).collect();
            Some(atoms_to_regex(&atoms))
        }
        SegmentNode::Composite(parts) => {
            let atoms: Vec<Atom> = parts.iter().map(Atom::from_composite_part).collect();
            Some(atoms_to_regex(&atoms))
        }
    }
}

/// A normalized view shared by [`WildcardPart`] and [`CompositePart`] so the
/// backtracking matcher and the regex lowering only need to be written
/// once.
enum Atom<'a> {
    Literal(&'a str),
    Star,
    Question,
    Charclass(&'a CharClassSpec),
}

impl<'a> Atom<'a> {
    fn from_wildcard_part(part: &'a WildcardPart) -> Self {
        match part {
            WildcardPart::Literal(s) => Atom::Literal(s),
            WildcardPart::Star => Atom::Star,
            WildcardPart::Question => Atom::Question,
        }
    }

    fn from_composite_part(part: &'a CompositePart) -> Self {
        match part {
            CompositePart::Literal(s) => Atom::Literal(s),
            CompositePart::Star => Atom::Star,
            CompositePart::Question => Atom::Question,
            CompositePart::Charclass(spec) => Atom::Charclass(spec),
        }
    }
}

fn matches_atoms(atoms: &[Atom], s: &str) -> bool {
    let mut memo = HashSet::new();
    matches_atoms_from(atoms, s, &mut memo)
}

fn matches_atoms_from<'a>(atoms: &[Atom<'a>], s: &str, memo: &mut HashSet<(usize, usize)>) -> bool {
    let key = (atoms.len(), s.len());
    if atoms.is_empty() {
        return s.is_empty();
    }
    if memo.contains(&key) {
        return false;
    }

    let (head, rest) = (&atoms[0], &atoms[1..]);
    let result = match head {
        Atom::Literal(lit) => s.strip_prefix(*lit).is_some_and(|tail| matches_atoms_from(rest, tail, memo)),
        Atom::Question => {
            let mut chars = s.chars();
            chars.next().is_some() && matches_atoms_from(rest, chars.as_str(), memo)
        }
        Atom::Charclass(spec) => {
            let mut chars = s.chars();
            match chars.next() {
                Some(c) if spec.accepts(c) => matches_atoms_from(rest, chars.as_str(), memo),
                _ => false,
            }
        }
        Atom::Star => {
            // Try every possible consumption length, shortest first, at
            // character boundaries only (0 first, since it was already
            // implicitly covered by the zero-length branch below).
            if matches_atoms_from(rest, s, memo) {
                true
            } else {
                let boundaries = s
                    .char_indices()
                    .map(|(i, _)| i)
                    .skip(1)
                    .chain(std::iter::once(s.len()));
                boundaries.any(|idx| matches_atoms_from(rest, &s[idx..], memo))
            }
        }
    };

    if !result {
        memo.insert(key);
    }
    result
}

fn atoms_to_regex(atoms: &[Atom]) -> Regex {
    let mut pattern = String::from("^");
    for atom in atoms {
        match atom {
            Atom::Literal(lit) => push_escaped_literal(&mut pattern, lit),
            Atom::Star => pattern.push_str("[^/]*"),
            Atom::Question => pattern.push_str("[^/]"),
            Atom::Charclass(spec) => push_class_regex(&mut pattern, spec),
        }
    }
    pattern.push('$');
    Regex::new(&pattern).unwrap_or_else(|e| panic!("internal error lowering {pattern:?}: {e}"))
}

fn push_escaped_literal(out: &mut String, lit: &str) {
    for c in lit.chars() {
        if regex_syntax::is_meta_character(c) {
            out.push('\\');
        }
        out.push(c);
    }
}

/// Emits a `[...]`/`[^...]` regex character class for `spec`, escaping the
/// four characters that are meaningful inside a class (`^`, `-`, `]`, `\`).
///
/// A class with no members and no ranges (the `EMPTY_CHARCLASS` error case —
/// `[]`, `[!]`, `[^]`) has no valid `[...]` rendering (`regex` rejects an
/// empty bracket expression outright), and negation can't turn "no members"
/// into a non-empty set. It lowers instead to `[^\s\S]`, a class matching
/// the union of whitespace and non-whitespace negated — i.e. no character at
/// all — giving the well-defined empty-language matcher §7 calls for on an
/// erroneous node, independent of `spec.negated`.
fn push_class_regex(out: &mut String, spec: &CharClassSpec) {
    if spec.chars.is_empty() && spec.ranges.is_empty() {
        out.push_str(r"[^\s\S]");
        return;
    }
    out.push('[');
    if spec.negated {
        out.push('^');
    }
    for c in spec.chars.chars() {
        push_escaped_class_char(out, c);
    }
    for range in &spec.ranges {
        push_escaped_class_char(out, range.start);
        out.push('-');
        push_escaped_class_char(out, range.end);
    }
    out.push(']');
}

fn push_escaped_class_char(out: &mut String, c: char) {
    if matches!(c, '^' | '-' | ']' | '\\') {
        out.push('\\');
    }
    out.push(c);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::CharRange;

    fn wc(parts: Vec<WildcardPart>) -> SegmentNode {
        SegmentNode::Wildcard(parts)
    }

    #[test]
    fn literal_exact() {
        assert!(matches("foo", &SegmentNode::Literal("foo".into())));
        assert!(!matches("foobar", &SegmentNode::Literal("foo".into())));
    }

    #[test]
    fn globstar_matches_any_single_segment() {
        assert!(matches("anything", &SegmentNode::Globstar));
        assert!(matches("", &SegmentNode::Globstar));
    }

    #[test]
    fn wildcard_star_and_question() {
        let node = wc(vec![
            WildcardPart::Literal("file".into()),
            WildcardPart::Star,
            WildcardPart::Literal(".".into()),
            WildcardPart::Question,
            WildcardPart::Question,
        ]);
        assert!(matches("file123.ts", &node));
        assert!(matches("file.ts", &node));
        assert!(!matches("file.t", &node));
        assert!(!matches("other.ts", &node));
    }

    #[test]
    fn composite_with_charclass() {
        let node = SegmentNode::Composite(vec![
            CompositePart::Literal("v".into()),
            CompositePart::Charclass(CharClassSpec {
                negated: false,
                chars: String::new(),
                ranges: vec![CharRange::new('0', '9')],
            }),
            CompositePart::Star,
        ]);
        assert!(matches("v1beta", &node));
        assert!(matches("v2", &node));
        assert!(!matches("vX", &node));
    }

    #[test]
    fn standalone_charclass_is_exactly_one_char() {
        let node = SegmentNode::Charclass(CharClassSpec {
            negated: true,
            chars: "ab".into(),
            ranges: vec![],
        });
        assert!(matches("c", &node));
        assert!(!matches("a", &node));
        assert!(!matches("ab", &node));
    }

    #[test]
    fn pathological_star_run_terminates_and_fails_fast() {
        let mut parts = Vec::new();
        for _ in 0..12 {
            parts.push(WildcardPart::Literal("a".into()));
            parts.push(WildcardPart::Star);
        }
        parts.push(WildcardPart::Literal("b".into()));
        let node = wc(parts);
        let candidate = "a".repeat(60);
        assert!(!matches(&candidate, &node));
    }

    #[test]
    fn literal_lowers_to_no_regex() {
        assert!(to_regex(&SegmentNode::Literal("foo".into())).is_none());
    }

    #[test]
    fn wildcard_regex_matches_same_as_backtracker() {
        let node = wc(vec![WildcardPart::Literal("a".into()), WildcardPart::Star]);
        let re = to_regex(&node).unwrap();
        assert!(re.is_match("abc"));
        assert!(!re.is_match("xabc"));
    }

    #[test]
    fn class_regex_escapes_metacharacters() {
        let spec = CharClassSpec { negated: false, chars: "]-^\\".into(), ranges: vec![] };
        let node = SegmentNode::Charclass(spec.clone());
        let re = to_regex(&node).unwrap();
        for c in "]-^\\".chars() {
            assert!(re.is_match(&c.to_string()), "expected class to accept {c:?}");
        }
        assert!(matches("]", &SegmentNode::Charclass(spec)));
    }

    #[test]
    fn empty_charclass_lowers_to_a_never_matching_regex_without_panicking() {
        for negated in [false, true] {
            let spec = CharClassSpec { negated, chars: String::new(), ranges: vec![] };
            let re = to_regex(&SegmentNode::Charclass(spec.clone())).expect("still lowers to a regex");
            assert!(!re.is_match("a"));
            assert!(!re.is_match(""));
            assert!(!matches("a", &SegmentNode::Charclass(spec)));
        }
    }

    #[test]
    fn empty_charclass_inside_a_composite_never_matches_without_panicking() {
        let node = SegmentNode::Composite(vec![
            CompositePart::Literal("v".into()),
            CompositePart::Charclass(CharClassSpec { negated: false, chars: String::new(), ranges: vec![] }),
        ]);
        let re = to_regex(&node).expect("still lowers to a regex");
        assert!(!re.is_match("v1"));
        assert!(!matches("v1", &node));
    }
}
