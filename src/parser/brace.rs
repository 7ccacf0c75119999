//! Brace expansion: `{a,b,c}` alternation and `{m..n}` numeric ranges, one
//! level deep (no nesting) per §6's syntax table. Expansion happens
//! before segment tokenization — the parser works on each expanded string
//! independently and wraps the results in a [`crate::ast::RootNode::Alternation`]
//! when there's more than one.

use crate::error::LimitError;

#[derive(Debug, Clone, Copy)]
pub struct BraceOptions {
    pub max_expansions: usize,
    pub max_range: usize,
}

impl Default for BraceOptions {
    fn default() -> Self {
        Self { max_expansions: 100, max_range: 50 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BraceError {
    Nested,
    Unclosed,
    Limit(LimitError),
}

enum Part {
    Literal(String),
    Group(Vec<String>),
}

/// Expands every top-level `{...}` group in `source`, returning the
/// cartesian product of literal runs and group alternatives.
pub fn expand(source: &str, options: BraceOptions) -> Result<Vec<String>, BraceError> {
    let parts = split_parts(source, &options)?;

    let mut results = vec![String::new()];
    for part in parts {
        match part {
            Part::Literal(lit) => {
                for r in results.iter_mut() {
                    r.push_str(&lit);
                }
            }
            Part::Group(alternatives) => {
                let mut next = Vec::with_capacity(results.len() * alternatives.len());
                for r in &results {
                    for alt in &alternatives {
                        if next.len() >= options.max_expansions {
                            log::warn!(
                                "brace expansion: limit {} reached expanding {}",
                                options.max_expansions,
                                source
                            );
                            return Err(BraceError::Limit(LimitError::ExpansionLimit {
                                limit: options.max_expansions,
                                actual: results.len() * alternatives.len(),
                            }));
                        }
                        next.push(format!("{r}{alt}"));
                    }
                }
                results = next;
            }
        }
    }
    Ok(results)
}

fn split_parts(source: &str, options: &BraceOptions) -> Result<Vec<Part>, BraceError> {
    let chars: Vec<char> = source.chars().collect();
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '\\' && i + 1 < chars.len() {
            literal.push(c);
            literal.push(chars[i + 1]);
            i += 2;
            continue;
        }
        if c != '{' {
            literal.push(c);
            i += 1;
            continue;
        }

        // Found a group opener; scan for its matching close, rejecting any
        // nested '{' along the way.
        let mut j = i + 1;
        let mut close = None;
        while j < chars.len() {
            if chars[j] == '\\' && j + 1 < chars.len() {
                j += 2;
                continue;
            }
            if chars[j] == '{' {
                return Err(BraceError::Nested);
            }
            if chars[j] == '}' {
                close = Some(j);
                break;
            }
            j += 1;
        }
        let Some(close) = close else { return Err(BraceError::Unclosed) };

        if !literal.is_empty() {
            parts.push(Part::Literal(std::mem::take(&mut literal)));
        }
        let content: String = chars[i + 1..close].iter().collect();
        parts.push(Part::Group(expand_group_content(&content, options)?));
        i = close + 1;
    }

    if !literal.is_empty() {
        parts.push(Part::Literal(literal));
    }
    Ok(parts)
}

fn expand_group_content(content: &str, options: &BraceOptions) -> Result<Vec<String>, BraceError> {
    if let Some((start, end)) = parse_numeric_range(content) {
        return expand_numeric_range(start, end, options);
    }
    Ok(content.split(',').map(str::to_string).collect())
}

fn parse_numeric_range(content: &str) -> Option<(i64, i64)> {
    let (start, end) = content.split_once("..")?;
    Some((start.parse().ok()?, end.parse().ok()?))
}

fn expand_numeric_range(start: i64, end: i64, options: &BraceOptions) -> Result<Vec<String>, BraceError> {
    let count = (start - end).unsigned_abs() as usize + 1;
    if count > options.max_range {
        log::warn!("brace expansion: numeric range {start}..{end} ({count} values) exceeds cap {}", options.max_range);
        return Err(BraceError::Limit(LimitError::ExpansionLimit { limit: options.max_range, actual: count }));
    }
    let values: Vec<i64> = if start <= end { (start..=end).collect() } else { (end..=start).rev().collect() };
    Ok(values.into_iter().map(|n| n.to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_cartesian_product_of_two_groups() {
        let result = expand("{a,b}/{x,y}", BraceOptions::default()).unwrap();
        assert_eq!(result, vec!["a/x", "a/y", "b/x", "b/y"]);
    }

    #[test]
    fn expands_ascending_and_descending_numeric_ranges() {
        assert_eq!(expand("{1..5}", BraceOptions::default()).unwrap(), vec!["1", "2", "3", "4", "5"]);
        assert_eq!(expand("{5..1}", BraceOptions::default()).unwrap(), vec!["5", "4", "3", "2", "1"]);
    }

    #[test]
    fn numeric_range_over_cap_is_rejected() {
        let err = expand("{1..100}", BraceOptions::default()).unwrap_err();
        assert!(matches!(err, BraceError::Limit(LimitError::ExpansionLimit { limit: 50, .. })));
    }

    #[test]
    fn nested_braces_are_rejected() {
        let err = expand("{a,{b,c}}", BraceOptions::default()).unwrap_err();
        assert_eq!(err, BraceError::Nested);
    }

    #[test]
    fn unclosed_brace_is_rejected() {
        let err = expand("{a,b", BraceOptions::default()).unwrap_err();
        assert_eq!(err, BraceError::Unclosed);
    }

    #[test]
    fn no_braces_returns_the_source_unchanged() {
        assert_eq!(expand("src/index.ts", BraceOptions::default()).unwrap(), vec!["src/index.ts"]);
    }
}
