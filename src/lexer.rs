use std::sync::LazyLock;

use regex::Regex;

use crate::{ast::Operator, error::QueryError, value::Value};

/// Internal single-character token the word operator `in` is rewritten to.
pub(crate) const IN_TOKEN: char = '~';

/// Every operator token, longest first so scanning is maximal munch.
pub(crate) const OPERATORS: [&str; 18] = [
    "!==", "===", "**", "||", "&&", "!=", "==", "<=", ">=", "<", ">", "+", "-", "*", "/", "%",
    "!", "~",
];

static WORD_IN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+in\s+").expect("valid regex"));

/// Filter text with its string literals lifted out.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    /// Text with each literal replaced by `#<index>`
    pub text: String,
    /// Literal values, indexed by placeholder number
    pub literals: Vec<Value>,
}

/// Splits string literals out of filter text so that structural characters
/// inside them are never seen by the expression parser.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn read_string(&mut self, quote: char) -> Result<String, QueryError> {
        let mut result = String::new();
        let mut escaped = false;
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            self.advance();
            if escaped {
                result.push(ch);
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == quote {
                return Ok(result);
            } else {
                result.push(ch);
            }
        }

        Err(QueryError::malformed(format!(
            "unterminated string literal starting with {}",
            quote
        )))
    }

    /// Consume the whole input, replacing each quoted literal with a
    /// placeholder.
    pub fn extract(mut self) -> Result<Extracted, QueryError> {
        let mut text = String::new();
        let mut literals = Vec::new();

        while let Some(ch) = self.current_char() {
            match ch {
                '"' | '\'' => {
                    let literal = self.read_string(ch)?;
                    text.push('#');
                    text.push_str(&literals.len().to_string());
                    literals.push(Value::String(literal));
                }
                _ => {
                    text.push(ch);
                    self.advance();
                }
            }
        }

        Ok(Extracted { text, literals })
    }
}

/// Convenience wrapper around [`Lexer::extract`].
pub fn extract_literals(input: &str) -> Result<Extracted, QueryError> {
    Lexer::new(input).extract()
}

/// Characters that may belong to an operand: identifiers, paths, numbers,
/// placeholders and already rewritten call forms.
pub(crate) fn is_operand_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '.' | '@' | '$' | '_' | '(' | ')' | ',' | '\'' | '"' | '#')
}

fn is_operator_char(ch: char) -> bool {
    matches!(ch, '!' | '=' | '<' | '>' | '&' | '|' | '+' | '-' | '*' | '/' | '%' | IN_TOKEN)
}

/// Prepare extracted text for operator rewriting: `in` becomes a token,
/// whitespace disappears, and signed numbers move into the literal table.
pub(crate) fn normalize(text: &str, literals: &mut Vec<Value>) -> Result<Vec<char>, QueryError> {
    let text = WORD_IN.replace_all(text, IN_TOKEN.to_string());
    let chars: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();

    let mut out = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        let is_sign = ch == '-'
            && chars.get(i + 1).is_some_and(|c| c.is_ascii_digit())
            && out.last().is_none_or(|&prev: &char| prev == '(' || prev == ',' || is_operator_char(prev));

        if !is_sign {
            out.push(ch);
            i += 1;
            continue;
        }

        let mut end = i + 1;
        while end < chars.len() && (chars[end].is_ascii_digit() || chars[end] == '.') {
            end += 1;
        }
        let number: String = chars[i..end].iter().collect();
        let value = if let Ok(n) = number.parse::<i64>() {
            Value::Integer(n)
        } else {
            number
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| QueryError::malformed(format!("invalid number '{}'", number)))?
        };
        out.push('#');
        out.extend(literals.len().to_string().chars());
        literals.push(value);
        i = end;
    }

    Ok(out)
}

/// Locate operator tokens left to right. At each index the longest operator
/// wins, so `=` inside `===` or `<` inside `<=` is never reported.
pub(crate) fn scan_operators(text: &[char]) -> Vec<(usize, &'static str)> {
    let mut found = Vec::new();
    let mut i = 0;
    while i < text.len() {
        let matched = OPERATORS.iter().find(|op| {
            let len = op.chars().count();
            i + len <= text.len() && op.chars().zip(&text[i..i + len]).all(|(a, &b)| a == b)
        });
        match matched {
            Some(op) => {
                found.push((i, *op));
                i += op.chars().count();
            }
            None => i += 1,
        }
    }
    found
}

/// Operator for an infix token.
pub(crate) fn infix_operator(token: &str) -> Option<Operator> {
    match token {
        "&&" => Some(Operator::And),
        "||" => Some(Operator::Or),
        "~" => Some(Operator::In),
        "!" => Some(Operator::Not),
        other => Operator::from_symbol(other).filter(|op| !op.is_variadic()),
    }
}

#[test]
fn test_extract_literals() {
    let extracted = extract_literals(r#"@.name === "a.b(c)" && @.tag == 'x\'y'"#).unwrap();
    assert_eq!(extracted.text, "@.name === #0 && @.tag == #1");
    assert_eq!(
        extracted.literals,
        vec![Value::String("a.b(c)".into()), Value::String("x'y".into())]
    );
}

#[test]
fn test_unterminated_literal() {
    assert!(matches!(
        extract_literals("@.name == \"abc"),
        Err(QueryError::MalformedExpression(_))
    ));
}

#[test]
fn test_scan_maximal_munch() {
    let text: Vec<char> = "a===b!=c<=d**e!f".chars().collect();
    let ops: Vec<&str> = scan_operators(&text).into_iter().map(|(_, op)| op).collect();
    assert_eq!(ops, vec!["===", "!=", "<=", "**", "!"]);
}

#[test]
fn test_normalize_signs_and_in() {
    let mut literals = Vec::new();
    let chars = normalize("@.x * -2 > 3 - 1 && @.t in $.tags", &mut literals).unwrap();
    let text: String = chars.into_iter().collect();
    assert_eq!(text, "@.x*#0>3-1&&@.t~$.tags");
    assert_eq!(literals, vec![Value::Integer(-2)]);
}
