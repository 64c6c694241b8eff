//! Path segmenter: splits `$.a.b.*{...}.c.[?(...)].d` into a start segment
//! and one level per wildcard, parsing each level's filter on the way.

use crate::{
    ast::{Logic, RawLevel, Segment, Segmented, Step, path::{QuoteScanner, split_outside_quotes}},
    error::QueryError,
    parser,
};

/// Segment a path string.
///
/// # Examples
///
/// ```
/// use pathquery::segment::split_path;
///
/// let plan = split_path("$.friends.[?(@.age > 20)].name").unwrap();
/// assert_eq!(plan.start.to_string(), ".friends");
/// assert_eq!(plan.levels.len(), 1);
/// assert_eq!(plan.levels[0].continuation.to_string(), ".name");
/// ```
pub fn split_path(path: &str) -> Result<Segmented, QueryError> {
    let rest = path
        .strip_prefix('$')
        .ok_or_else(|| QueryError::invalid(format!("'{}' does not start with '$'", path)))?;
    if rest.is_empty() {
        return Ok(Segmented::default());
    }
    let rest = rest
        .strip_prefix('.')
        .ok_or_else(|| QueryError::invalid(format!("expected '.' after '$' in '{}'", path)))?;

    let pieces = split_outside_quotes(rest, '.');
    let mut segmented = Segmented::default();
    let mut i = 0;

    while i < pieces.len() {
        let piece = pieces[i];

        if piece.starts_with('*') || piece.starts_with('[') {
            let jsonpath = piece.starts_with('[');
            let (open, close) = if jsonpath { ('[', ']') } else { ('{', '}') };

            // Dots inside the filter were split too; glue pieces back until
            // the brackets balance.
            let mut text = piece.to_string();
            while !is_balanced(&text, open, close) {
                i += 1;
                let next = pieces.get(i).ok_or_else(|| {
                    QueryError::invalid(format!("unterminated filter '{}' in '{}'", text, path))
                })?;
                text.push('.');
                text.push_str(next);
            }

            let filter = if jsonpath {
                parser::parse_filter(&text)?
            } else {
                parse_logic_literal(&text[1..])?
            };
            tracing::trace!(filter = %text, "segmented wildcard level");

            segmented.levels.push(RawLevel {
                filter,
                continuation: Segment::default(),
            });
        } else {
            if piece.is_empty() {
                return Err(QueryError::invalid(format!("empty step in '{}'", path)));
            }
            let step = Step::parse(piece);
            match segmented.levels.last_mut() {
                Some(level) => level.continuation.steps.push(step),
                None => segmented.start.steps.push(step),
            }
        }

        i += 1;
    }

    Ok(segmented)
}

/// Parse the `{ ... }` that may follow a legacy `*`; nothing means no filter.
fn parse_logic_literal(text: &str) -> Result<Option<Logic>, QueryError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    let json: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| QueryError::invalid(format!("logic literal '{}': {}", text, e)))?;
    Logic::from_json_logic(&json).map(Some)
}

/// Whether every `open` has its `close`, ignoring quoted text.
fn is_balanced(text: &str, open: char, close: char) -> bool {
    let mut scanner = QuoteScanner::default();
    let mut depth = 0i32;
    for ch in text.chars() {
        if !scanner.outside(ch) {
            continue;
        }
        if ch == open {
            depth += 1;
        } else if ch == close {
            depth -= 1;
        }
    }
    depth <= 0 && scanner.is_closed()
}

#[test]
fn test_is_balanced() {
    assert!(is_balanced("*", '{', '}'));
    assert!(!is_balanced("*{ \"var\": \"a", '{', '}'));
    assert!(is_balanced("*{ \"var\": \"a.}\" }", '{', '}'));
    assert!(!is_balanced("[?(@", '[', ']'));
    assert!(is_balanced("[?(@.tag == ']')]", '[', ']'));
    assert!(is_balanced(r#"[?(@.q == 'a"b')]"#, '[', ']'));
    assert!(is_balanced(r#"[?(@.q == "a\"]")]"#, '[', ']'));
}
