//! Pattern tokenizer and recursive-descent parser: turns a raw pattern
//! string into a [`PathPattern`], attaching [`PatternError`]s to the
//! pattern rather than failing outright — parsing a pattern with errors
//! still returns a usable (best-effort) AST, per the error-handling
//! design's first failure class.

pub mod brace;

use crate::ast::{CharClassSpec, CharRange, CompositePart, PathPattern, RootNode, SegmentNode, WildcardPart};
use crate::error::{ParseErrorCode, PatternError};

use brace::{BraceError, BraceOptions};

/// Parses `source` into a [`PathPattern`]. Never fails: malformed
/// constructs degrade to a best-effort node and a [`PatternError`] in
/// `pattern.errors`.
pub fn parse(source: &str) -> PathPattern {
    let mut errors = Vec::new();

    let mut body = source;
    let is_negation = if let Some(rest) = body.strip_prefix('!') {
        body = rest;
        true
    } else {
        false
    };
    let is_absolute = if let Some(rest) = body.strip_prefix('/') {
        body = rest;
        true
    } else if let Some(rest) = body.strip_prefix('~') {
        body = rest.strip_prefix('/').unwrap_or(rest);
        true
    } else {
        false
    };

    let expansions = match brace::expand(body, BraceOptions::default()) {
        Ok(list) => list,
        Err(err) => {
            errors.push(brace_error_to_pattern_error(&err));
            vec![body.to_string()]
        }
    };

    let root = if expansions.len() == 1 {
        parse_sequence(&expansions[0], &mut errors)
    } else {
        RootNode::Alternation(expansions.iter().map(|branch| parse_sequence(branch, &mut errors)).collect())
    };

    PathPattern { source: source.to_string(), root, is_absolute, is_negation, errors }
}

fn brace_error_to_pattern_error(err: &BraceError) -> PatternError {
    match err {
        BraceError::Nested => PatternError::new(ParseErrorCode::NestedBraces, "brace groups cannot nest"),
        BraceError::Unclosed => PatternError::new(ParseErrorCode::UnclosedBrace, "unterminated '{' group"),
        BraceError::Limit(limit) => PatternError::new(ParseErrorCode::ExpansionLimit, limit.to_string()),
    }
}

fn parse_sequence(body: &str, errors: &mut Vec<PatternError>) -> RootNode {
    if body.is_empty() {
        return RootNode::empty_sequence();
    }
    let segments = split_unescaped_slash(body).into_iter().map(|seg| parse_segment(seg, errors)).collect();
    RootNode::Sequence(segments)
}

/// Splits on `/`, treating `\/` as a literal slash rather than a
/// separator. Safe to index by byte since `/` and `\` are single-byte
/// ASCII and never appear as a continuation byte of a multi-byte UTF-8
/// sequence.
fn split_unescaped_slash(body: &str) -> Vec<&str> {
    let bytes = body.as_bytes();
    let mut result = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 1 < bytes.len() {
            i += 2;
            continue;
        }
        if bytes[i] == b'/' {
            result.push(&body[start..i]);
            start = i + 1;
        }
        i += 1;
    }
    result.push(&body[start..]);
    result
}

enum RawPart {
    Literal(String),
    Star,
    Question,
    Charclass(CharClassSpec),
}

/// Parses one `/`-delimited segment string into a [`SegmentNode`].
fn parse_segment(seg: &str, errors: &mut Vec<PatternError>) -> SegmentNode {
    if seg == "**" {
        return SegmentNode::Globstar;
    }
    if seg.contains("**") {
        errors.push(PatternError::new(
            ParseErrorCode::InvalidGlobstar,
            "'**' must occupy an entire path segment",
        ));
        // Falls through: each `*` is still tokenized individually below,
        // giving a best-effort wildcard match instead of refusing to parse.
    }
    if seg.contains("(?") {
        errors.push(PatternError::new(ParseErrorCode::BannedFeature, "inline regex syntax is not part of the pattern grammar"));
    }

    let chars: Vec<char> = seg.chars().collect();
    let mut parts: Vec<RawPart> = Vec::new();
    let mut literal = String::new();
    let mut idx = 0;

    while idx < chars.len() {
        let c = chars[idx];
        match c {
            '\\' => {
                if idx + 1 < chars.len() {
                    literal.push(chars[idx + 1]);
                    idx += 2;
                } else {
                    errors.push(PatternError::new(ParseErrorCode::InvalidEscape, "trailing backslash has nothing to escape").at(idx, 1));
                    literal.push('\\');
                    idx += 1;
                }
            }
            '*' => {
                flush_literal(&mut literal, &mut parts);
                parts.push(RawPart::Star);
                idx += 1;
            }
            '?' => {
                flush_literal(&mut literal, &mut parts);
                parts.push(RawPart::Question);
                idx += 1;
            }
            '[' => {
                idx = parse_charclass(&chars, idx, &mut literal, &mut parts, errors);
            }
            _ => {
                literal.push(c);
                idx += 1;
            }
        }
    }
    flush_literal(&mut literal, &mut parts);

    let non_literal_atoms = parts.iter().filter(|p| !matches!(p, RawPart::Literal(_))).count();
    if non_literal_atoms > 24 {
        errors.push(PatternError::new(
            ParseErrorCode::UnsafeRegex,
            format!("segment has {non_literal_atoms} non-literal atoms, which risks pathological backtracking"),
        ));
    }

    parts_to_segment(parts)
}

fn flush_literal(literal: &mut String, parts: &mut Vec<RawPart>) {
    if !literal.is_empty() {
        parts.push(RawPart::Literal(std::mem::take(literal)));
    }
}

/// Parses a `[...]` character class starting at `chars[open_idx] == '['`.
/// Returns the index to resume scanning from. On `UNCLOSED_BRACKET`, the
/// `[` is pushed back as a literal character and scanning resumes one
/// character forward, so the rest of the segment still parses sensibly.
///
/// Deliberately does not implement the "a leading `]` is a literal member"
/// bracket-expression convention — `[]` is instead the canonical trigger
/// for `EMPTY_CHARCLASS`. See `DESIGN.md` for the rationale.
fn parse_charclass(
    chars: &[char],
    open_idx: usize,
    literal: &mut String,
    parts: &mut Vec<RawPart>,
    errors: &mut Vec<PatternError>,
) -> usize {
    let mut j = open_idx + 1;
    let mut negated = false;
    if j < chars.len() && (chars[j] == '!' || chars[j] == '^') {
        negated = true;
        j += 1;
    }
    let content_start = j;

    let mut k = j;
    let mut close = None;
    while k < chars.len() {
        if chars[k] == '\\' && k + 1 < chars.len() {
            k += 2;
            continue;
        }
        if chars[k] == ']' {
            close = Some(k);
            break;
        }
        k += 1;
    }

    match close {
        None => {
            errors.push(PatternError::new(ParseErrorCode::UnclosedBracket, "unterminated '[' character class").at(open_idx, chars.len() - open_idx));
            flush_literal(literal, parts);
            literal.push('[');
            open_idx + 1
        }
        Some(close_idx) => {
            let class_chars = &chars[content_start..close_idx];
            let (members, ranges) = parse_class_members(class_chars, errors);
            if members.is_empty() && ranges.is_empty() {
                errors.push(PatternError::new(ParseErrorCode::EmptyCharclass, "character class has no members").at(open_idx, close_idx - open_idx + 1));
            }
            flush_literal(literal, parts);
            parts.push(RawPart::Charclass(CharClassSpec { negated, chars: members, ranges }));
            close_idx + 1
        }
    }
}

fn parse_class_members(class_chars: &[char], errors: &mut Vec<PatternError>) -> (String, Vec<CharRange>) {
    let mut members = String::new();
    let mut ranges = Vec::new();
    let mut i = 0;
    while i < class_chars.len() {
        let c = class_chars[i];
        if c == '\\' && i + 1 < class_chars.len() {
            members.push(class_chars[i + 1]);
            i += 2;
            continue;
        }
        // A `-` is a range marker only when something follows it; a `-`
        // at the end of the class is a literal member.
        if i + 2 < class_chars.len() && class_chars[i + 1] == '-' {
            let (start, end) = (c, class_chars[i + 2]);
            if start <= end {
                ranges.push(CharRange::new(start, end));
            } else {
                errors.push(PatternError::new(ParseErrorCode::InvalidRange, format!("range '{start}-{end}' is reversed")));
            }
            i += 3;
            continue;
        }
        members.push(c);
        i += 1;
    }
    (members, ranges)
}

fn parts_to_segment(parts: Vec<RawPart>) -> SegmentNode {
    if parts.is_empty() {
        return SegmentNode::Literal(String::new());
    }
    if parts.len() == 1 {
        match parts.into_iter().next().unwrap() {
            RawPart::Literal(s) => return SegmentNode::Literal(s),
            RawPart::Charclass(spec) => return SegmentNode::Charclass(spec),
            RawPart::Star => return SegmentNode::Wildcard(vec![WildcardPart::Star]),
            RawPart::Question => return SegmentNode::Wildcard(vec![WildcardPart::Question]),
        }
    }

    if parts.iter().any(|p| matches!(p, RawPart::Charclass(_))) {
        SegmentNode::Composite(
            parts
                .into_iter()
                .map(|p| match p {
                    RawPart::Literal(s) => CompositePart::Literal(s),
                    RawPart::Star => CompositePart::Star,
                    RawPart::Question => CompositePart::Question,
                    RawPart::Charclass(spec) => CompositePart::Charclass(spec),
                })
                .collect(),
        )
    } else {
        SegmentNode::Wildcard(
            parts
                .into_iter()
                .map(|p| match p {
                    RawPart::Literal(s) => WildcardPart::Literal(s),
                    RawPart::Star => WildcardPart::Star,
                    RawPart::Question => WildcardPart::Question,
                    RawPart::Charclass(_) => unreachable!("charclass filtered out above"),
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_bang_and_slash_set_flags() {
        let p = parse("!/src/**");
        assert!(p.is_negation);
        assert!(p.is_absolute);
    }

    #[test]
    fn tilde_alone_is_absolute_and_empty() {
        let p = parse("~");
        assert!(p.is_absolute);
        assert_eq!(p.root, RootNode::empty_sequence());
    }

    #[test]
    fn globstar_must_be_whole_segment() {
        let p = parse("src/a**b/x.ts");
        assert!(p.errors.iter().any(|e| e.code == ParseErrorCode::InvalidGlobstar));
    }

    #[test]
    fn wildcard_segment_parses_to_wildcard_node() {
        let p = parse("src/*.ts");
        match &p.root {
            RootNode::Sequence(segments) => {
                assert_eq!(segments[0], SegmentNode::Literal("src".into()));
                assert!(matches!(&segments[1], SegmentNode::Wildcard(_)));
            }
            other => panic!("expected sequence, got {other:?}"),
        }
    }

    #[test]
    fn charclass_range_and_literal_mix_is_composite() {
        let p = parse("v[0-9]*");
        match &p.root {
            RootNode::Sequence(segments) => assert!(matches!(&segments[0], SegmentNode::Composite(_))),
            other => panic!("expected sequence, got {other:?}"),
        }
    }

    #[test]
    fn reversed_range_is_a_parse_error() {
        let p = parse("[9-0]");
        assert!(p.errors.iter().any(|e| e.code == ParseErrorCode::InvalidRange));
    }

    #[test]
    fn unclosed_bracket_is_reported_and_degrades_to_literal() {
        let p = parse("[abc");
        assert!(p.errors.iter().any(|e| e.code == ParseErrorCode::UnclosedBracket));
    }

    #[test]
    fn empty_charclass_is_reported() {
        let p = parse("[]");
        assert!(p.errors.iter().any(|e| e.code == ParseErrorCode::EmptyCharclass));
    }

    #[test]
    fn brace_alternation_produces_alternation_root() {
        let p = parse("{a,b}/x.ts");
        assert!(matches!(p.root, RootNode::Alternation(_)));
    }

    #[test]
    fn trailing_backslash_is_an_invalid_escape() {
        let p = parse("foo\\");
        assert!(p.errors.iter().any(|e| e.code == ParseErrorCode::InvalidEscape));
    }
}
