use std::{borrow::Cow, fmt};

use regex::Regex;
use std::sync::LazyLock;

use crate::ast::Logic;
use crate::value::Value;

static NEEDS_QUOTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[()+\[\]]|^[0-9]").expect("valid regex"));

/// One literal accessor step: a property name or a dotted array index.
///
/// # Examples
/// - `$.name` → `Step { key: "name", quoted: false }`
/// - `$."odd thing"` → `Step { key: "odd thing", quoted: true }`
/// - `$.items.0` → `Step { key: "0", quoted: true }` (auto-quoted)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub key: String,
    pub quoted: bool,
}

impl Step {
    /// Build a step from its raw path text, stripping explicit double quotes
    /// and auto-quoting keys that are not bare identifiers.
    pub fn parse(raw: &str) -> Self {
        if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
            return Step {
                key: raw[1..raw.len() - 1].to_string(),
                quoted: true,
            };
        }
        Step {
            key: raw.to_string(),
            quoted: NEEDS_QUOTES.is_match(raw),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quoted {
            write!(f, "[\"{}\"]", self.key)
        } else {
            write!(f, ".{}", self.key)
        }
    }
}

/// Ordered literal steps between wildcard boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Segment {
    pub steps: Vec<Step>,
}

impl Segment {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Parse a dotted path fragment like `a.b."c d"` (used for `@.path`
    /// references inside filters).
    pub fn from_dotted(path: &str) -> Self {
        if path.is_empty() {
            return Segment::default();
        }
        Segment {
            steps: split_outside_quotes(path, '.')
                .into_iter()
                .map(Step::parse)
                .collect(),
        }
    }

    /// Follow every step from `origin`; `None` as soon as a step is missing.
    pub fn resolve<'a>(&self, origin: &'a Value) -> Option<Cow<'a, Value>> {
        let mut current = Cow::Borrowed(origin);
        for step in &self.steps {
            current = match current {
                Cow::Borrowed(value) => value.lookup(&step.key)?,
                Cow::Owned(value) => Cow::Owned(value.lookup(&step.key)?.into_owned()),
            };
        }
        Some(current)
    }

    /// Mutable counterpart of [`Segment::resolve`]. Computed keys such as
    /// `length` have no slot and are missing here.
    pub fn resolve_mut<'a>(&self, origin: &'a mut Value) -> Option<&'a mut Value> {
        let mut current = origin;
        for step in &self.steps {
            current = current.get_mut(&step.key)?;
        }
        Some(current)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            write!(f, "{}", step)?;
        }
        Ok(())
    }
}

/// Tracks quoted literals while scanning a path one character at a time.
///
/// Double quotes delimit anywhere. Single quotes only open a literal inside
/// a filter, so a plain key such as `o'neil` stays a key. Backslash escapes
/// the next character inside either kind.
#[derive(Debug, Default)]
pub(crate) struct QuoteScanner {
    quote: Option<char>,
    escaped: bool,
    depth: i32,
}

impl QuoteScanner {
    /// Feed one character; true when it sits outside every literal.
    pub(crate) fn outside(&mut self, ch: char) -> bool {
        if let Some(quote) = self.quote {
            if self.escaped {
                self.escaped = false;
            } else if ch == '\\' {
                self.escaped = true;
            } else if ch == quote {
                self.quote = None;
            }
            return false;
        }
        match ch {
            '"' => self.quote = Some(ch),
            '\'' if self.depth > 0 => self.quote = Some(ch),
            '[' | '(' | '{' => self.depth += 1,
            ']' | ')' | '}' => self.depth -= 1,
            _ => {}
        }
        self.quote.is_none()
    }

    /// No literal is left open.
    pub(crate) fn is_closed(&self) -> bool {
        self.quote.is_none()
    }
}

/// Split on `separator` except inside quoted literals.
pub(crate) fn split_outside_quotes(text: &str, separator: char) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut scanner = QuoteScanner::default();
    let mut start = 0;
    for (i, ch) in text.char_indices() {
        if scanner.outside(ch) && ch == separator {
            pieces.push(&text[start..i]);
            start = i + ch.len_utf8();
        }
    }
    pieces.push(&text[start..]);
    pieces
}

/// One wildcard level before its filter is compiled.
#[derive(Debug, Clone, PartialEq)]
pub struct RawLevel {
    /// Parsed filter, `None` for a bare `*` or `[*]`
    pub filter: Option<Logic>,
    /// Steps applied to each accepted element
    pub continuation: Segment,
}

/// A segmented path: the start segment and one level per wildcard.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Segmented {
    pub start: Segment,
    pub levels: Vec<RawLevel>,
}

impl Segmented {
    pub fn is_iterating(&self) -> bool {
        !self.levels.is_empty()
    }
}

#[test]
fn test_auto_quoting() {
    assert!(!Step::parse("name").quoted);
    assert!(Step::parse("0").quoted);
    assert!(Step::parse("a(b)").quoted);
    assert!(Step::parse("x+y").quoted);
    assert!(Step::parse("[z]").quoted);
    let odd = Step::parse("\"odd thing\"");
    assert_eq!(odd.key, "odd thing");
    assert_eq!(odd.to_string(), "[\"odd thing\"]");
    assert_eq!(Step::parse("name").to_string(), ".name");
}
