// tests/parser_tests.rs

use pathquery::ast::{Logic, Operator, Step};
use pathquery::{QueryError, Value, parse_expression, parse_filter, split_path};

fn call(op: Operator, operands: Vec<Logic>) -> Logic {
    Logic::call(op, operands)
}

fn item(path: &str) -> Logic {
    Logic::VariableRef(path.to_string())
}

fn ctx(path: &str) -> Logic {
    Logic::ContextRef(path.to_string())
}

fn int(n: i64) -> Logic {
    Logic::Literal(Value::Integer(n))
}

fn text(s: &str) -> Logic {
    Logic::Literal(Value::from(s))
}

fn parse(input: &str) -> Logic {
    parse_expression(input).unwrap_or_else(|e| panic!("{} failed: {}", input, e))
}

// ============================================================================
// Leaves
// ============================================================================

#[test]
fn test_leaves() {
    assert_eq!(parse("20"), int(20));
    assert_eq!(parse("2.5"), Logic::Literal(Value::Float(2.5)));
    assert_eq!(parse("-3"), int(-3));
    assert_eq!(parse("true"), Logic::Literal(Value::Boolean(true)));
    assert_eq!(parse("false"), Logic::Literal(Value::Boolean(false)));
    assert_eq!(parse("null"), Logic::Literal(Value::Null));
    assert_eq!(parse("@"), item(""));
    assert_eq!(parse("@.age"), item("age"));
    assert_eq!(parse("@.owner.name"), item("owner.name"));
    assert_eq!(parse("$"), ctx(""));
    assert_eq!(parse("$.min"), ctx("min"));
    assert_eq!(parse("'Bob'"), text("Bob"));
}

#[test]
fn test_unknown_leaf_is_malformed() {
    assert!(matches!(
        parse_expression("bob"),
        Err(QueryError::MalformedExpression(_))
    ));
    assert!(matches!(
        parse_expression("@.age > age"),
        Err(QueryError::MalformedExpression(_))
    ));
}

// ============================================================================
// Precedence
// ============================================================================

#[test]
fn test_multiplication_binds_tighter_than_addition() {
    let expected = call(
        Operator::Add,
        vec![int(1), call(Operator::Multiply, vec![int(2), int(3)])],
    );
    assert_eq!(parse("1+2*3"), expected);
    assert_eq!(parse("1+(2*3)"), expected);
    assert_eq!(parse("1 + 2 * 3"), expected);
}

#[test]
fn test_parentheses_override_precedence() {
    assert_eq!(
        parse("(1+2)*3"),
        call(
            Operator::Multiply,
            vec![call(Operator::Add, vec![int(1), int(2)]), int(3)]
        )
    );
}

#[test]
fn test_not_binds_tighter_than_and() {
    assert_eq!(
        parse("!@.a&&@.b"),
        call(
            Operator::And,
            vec![call(Operator::Not, vec![item("a")]), item("b")]
        )
    );
    assert_eq!(
        parse("!(@.a && @.b)"),
        call(
            Operator::Not,
            vec![call(Operator::And, vec![item("a"), item("b")])]
        )
    );
}

#[test]
fn test_double_negation_nests() {
    assert_eq!(
        parse("!!@.a"),
        call(Operator::Not, vec![call(Operator::Not, vec![item("a")])])
    );
}

#[test]
fn test_and_binds_tighter_than_or() {
    assert_eq!(
        parse("@.a || @.b && @.c"),
        call(
            Operator::Or,
            vec![item("a"), call(Operator::And, vec![item("b"), item("c")])]
        )
    );
}

#[test]
fn test_comparison_binds_tighter_than_equality() {
    assert_eq!(
        parse("1 < 2 == true"),
        call(
            Operator::Equal,
            vec![
                call(Operator::Less, vec![int(1), int(2)]),
                Logic::Literal(Value::Boolean(true))
            ]
        )
    );
}

#[test]
fn test_power_binds_tighter_than_multiplication() {
    assert_eq!(
        parse("2**3*2"),
        call(
            Operator::Multiply,
            vec![call(Operator::Power, vec![int(2), int(3)]), int(2)]
        )
    );
}

#[test]
fn test_same_tier_folds_left() {
    assert_eq!(
        parse("10-4-3"),
        call(
            Operator::Subtract,
            vec![call(Operator::Subtract, vec![int(10), int(4)]), int(3)]
        )
    );
}

#[test]
fn test_modulo_between_multiplication_and_addition() {
    assert_eq!(
        parse("1+7%4*2"),
        call(
            Operator::Add,
            vec![
                int(1),
                call(Operator::Modulo, vec![int(7), call(Operator::Multiply, vec![int(4), int(2)])])
            ]
        )
    );
}

// ============================================================================
// Operator Tokens
// ============================================================================

#[test]
fn test_equality_operators_are_not_split() {
    assert_eq!(parse("@.a === 1"), call(Operator::StrictEqual, vec![item("a"), int(1)]));
    assert_eq!(parse("@.a !== 1"), call(Operator::StrictNotEqual, vec![item("a"), int(1)]));
    assert_eq!(parse("@.a == 1"), call(Operator::Equal, vec![item("a"), int(1)]));
    assert_eq!(parse("@.a != 1"), call(Operator::NotEqual, vec![item("a"), int(1)]));
    assert_eq!(parse("@.a <= 1"), call(Operator::LessEqual, vec![item("a"), int(1)]));
    assert_eq!(parse("@.a >= 1"), call(Operator::GreaterEqual, vec![item("a"), int(1)]));
}

#[test]
fn test_word_in() {
    assert_eq!(
        parse("@.tag in $.allowed"),
        call(Operator::In, vec![item("tag"), ctx("allowed")])
    );
}

#[test]
fn test_negative_operand() {
    assert_eq!(
        parse("@.x * -2 > -10"),
        call(
            Operator::Greater,
            vec![call(Operator::Multiply, vec![item("x"), int(-2)]), int(-10)]
        )
    );
}

#[test]
fn test_string_literal_robustness() {
    assert_eq!(
        parse(r#"@.name === "a.b(c)""#),
        call(Operator::StrictEqual, vec![item("name"), text("a.b(c)")])
    );
    assert_eq!(
        parse("@.op == '1+2' && @.x"),
        call(
            Operator::And,
            vec![call(Operator::Equal, vec![item("op"), text("1+2")]), item("x")]
        )
    );
}

#[test]
fn test_display_is_call_form() {
    assert_eq!(
        parse("@.age > 20 && @.name != 'Bob'").to_string(),
        r#"and(gt(@.age,20),ne(@.name,"Bob"))"#
    );
}

#[test]
fn test_unbalanced_parentheses() {
    assert!(matches!(
        parse_expression("(1+2"),
        Err(QueryError::MalformedExpression(_))
    ));
    assert!(matches!(
        parse_expression("1+2)"),
        Err(QueryError::MalformedExpression(_))
    ));
}

#[test]
fn test_missing_operand() {
    assert!(matches!(
        parse_expression("@.a >"),
        Err(QueryError::MalformedExpression(_))
    ));
    assert!(matches!(
        parse_expression("&& @.a"),
        Err(QueryError::MalformedExpression(_))
    ));
}

// ============================================================================
// JSONPath Filter Wrapper
// ============================================================================

#[test]
fn test_filter_wrapper() {
    assert_eq!(
        parse_filter("[?(@.age > 20)]").unwrap(),
        Some(call(Operator::Greater, vec![item("age"), int(20)]))
    );
    assert_eq!(parse_filter("[*]").unwrap(), None);
}

#[test]
fn test_filter_wrapper_rejects_other_brackets() {
    assert!(matches!(parse_filter("[0]"), Err(QueryError::InvalidQuery(_))));
    assert!(matches!(parse_filter("[(@.a)]"), Err(QueryError::InvalidQuery(_))));
}

#[test]
fn test_filter_wrapper_rejects_unsupported_characters() {
    assert!(matches!(
        parse_filter("[?(@.a ; 1)]"),
        Err(QueryError::InvalidQuery(_))
    ));
    assert!(matches!(
        parse_filter("[?(@.a[0] == 1)]"),
        Err(QueryError::InvalidQuery(_))
    ));
}

#[test]
fn test_filter_wrapper_allows_any_characters_in_literals() {
    assert!(parse_filter("[?(@.a == ';[]{}')]").is_ok());
}

// ============================================================================
// Path Segmenter
// ============================================================================

#[test]
fn test_split_plain_path() {
    let plan = split_path("$.a.b.c").unwrap();
    assert_eq!(plan.start.to_string(), ".a.b.c");
    assert!(!plan.is_iterating());

    let plan = split_path("$").unwrap();
    assert!(plan.start.is_empty());
    assert!(!plan.is_iterating());
}

#[test]
fn test_split_quoted_and_numeric_keys() {
    let plan = split_path(r#"$."odd thing".items.0"#).unwrap();
    assert_eq!(
        plan.start.steps,
        vec![
            Step { key: "odd thing".into(), quoted: true },
            Step { key: "items".into(), quoted: false },
            Step { key: "0".into(), quoted: true },
        ]
    );
    assert_eq!(plan.start.to_string(), r#"["odd thing"].items["0"]"#);
}

#[test]
fn test_split_quoted_key_with_dot() {
    let plan = split_path(r#"$."a.b".c"#).unwrap();
    assert_eq!(plan.start.steps[0].key, "a.b");
    assert_eq!(plan.start.steps[1].key, "c");
}

#[test]
fn test_split_levels() {
    let plan = split_path("$.groups.*.members.[?(@.age > 20)].name").unwrap();
    assert_eq!(plan.start.to_string(), ".groups");
    assert_eq!(plan.levels.len(), 2);
    assert_eq!(plan.levels[0].filter, None);
    assert_eq!(plan.levels[0].continuation.to_string(), ".members");
    assert_eq!(
        plan.levels[1].filter,
        Some(call(Operator::Greater, vec![item("age"), int(20)]))
    );
    assert_eq!(plan.levels[1].continuation.to_string(), ".name");
}

#[test]
fn test_split_rejoins_dots_inside_filters() {
    let plan = split_path("$.friends.[?(@.owner.age > 2.5)].name").unwrap();
    assert_eq!(
        plan.levels[0].filter,
        Some(call(
            Operator::Greater,
            vec![item("owner.age"), Logic::Literal(Value::Float(2.5))]
        ))
    );
    assert_eq!(plan.levels[0].continuation.to_string(), ".name");
}

#[test]
fn test_split_legacy_logic_literal() {
    let plan = split_path(r#"$.friends.*{ ">": [{ "var": "age" }, { "context": "" }] }.name"#).unwrap();
    assert_eq!(
        plan.levels[0].filter,
        Some(call(Operator::Greater, vec![item("age"), ctx("")]))
    );
    assert!(plan.levels[0].filter.as_ref().unwrap().uses_context());
    assert_eq!(plan.levels[0].continuation.to_string(), ".name");
}

#[test]
fn test_split_legacy_logic_literal_with_dots() {
    let plan = split_path(r#"$.xs.*{ "<": [{ "var": "a.b" }, 1.5] }"#).unwrap();
    assert_eq!(
        plan.levels[0].filter,
        Some(call(
            Operator::Less,
            vec![item("a.b"), Logic::Literal(Value::Float(1.5))]
        ))
    );
}

#[test]
fn test_split_rejects_missing_root() {
    for path in ["", "a.b", "friends.*", ".a", "$a"] {
        assert!(
            matches!(split_path(path), Err(QueryError::InvalidQuery(_))),
            "{} should not compile",
            path
        );
    }
}

#[test]
fn test_split_rejects_empty_steps() {
    for path in ["$.", "$.a..b", "$.a."] {
        assert!(
            matches!(split_path(path), Err(QueryError::InvalidQuery(_))),
            "{} should not compile",
            path
        );
    }
}

#[test]
fn test_split_rejects_unbalanced_filters() {
    assert!(matches!(
        split_path("$.friends.[?(@.age > 20)"),
        Err(QueryError::InvalidQuery(_))
    ));
    assert!(matches!(
        split_path(r#"$.friends.*{ ">": [{ "var": "age" }, 20]"#),
        Err(QueryError::InvalidQuery(_))
    ));
}

#[test]
fn test_split_rejects_bad_logic_literal() {
    assert!(matches!(
        split_path("$.friends.*{ not json }"),
        Err(QueryError::InvalidQuery(_))
    ));
    assert!(matches!(
        split_path(r#"$.friends.*{ "frobnicate": [1, 2] }"#),
        Err(QueryError::InvalidQuery(_))
    ));
}

#[test]
fn test_split_double_quote_inside_single_quoted_literal() {
    let plan = split_path(r#"$.xs.[?(@.q == 'a"b')].name"#).unwrap();
    assert_eq!(
        plan.levels[0].filter,
        Some(call(Operator::Equal, vec![item("q"), text(r#"a"b"#)]))
    );
    assert_eq!(plan.levels[0].continuation.to_string(), ".name");
}

#[test]
fn test_split_escaped_quote_inside_double_quoted_literal() {
    let plan = split_path(r#"$.xs.[?(@.q == "a\"b")].name"#).unwrap();
    assert_eq!(
        plan.levels[0].filter,
        Some(call(Operator::Equal, vec![item("q"), text(r#"a"b"#)]))
    );
    assert_eq!(plan.levels[0].continuation.to_string(), ".name");
}

#[test]
fn test_split_apostrophe_in_plain_key() {
    let plan = split_path("$.o'neil.x").unwrap();
    assert_eq!(plan.start.steps[0].key, "o'neil");
    assert_eq!(plan.start.steps[1].key, "x");
}
