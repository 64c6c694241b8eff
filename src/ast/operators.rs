/// Operators understood by filter expressions and logic literals.
///
/// Each operator has two spellings: the call-form name produced by the
/// expression rewriter (`gt(a,b)`) and the logic-literal symbol (`{">": ...}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    // Logical
    /// Negation (`!`)
    Not,
    /// Double negation (`!!`), logic literals only
    Truthy,
    /// Logical OR (`||`)
    Or,
    /// Logical AND (`&&`)
    And,

    // Equality
    /// Loose equality (`==`)
    Equal,
    /// Strict equality (`===`)
    StrictEqual,
    /// Loose inequality (`!=`)
    NotEqual,
    /// Strict inequality (`!==`)
    StrictNotEqual,

    // Comparison
    /// Less than (`<`)
    Less,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than (`>`)
    Greater,
    /// Greater than or equal (`>=`)
    GreaterEqual,
    /// Membership (`in`)
    In,

    // Arithmetic
    /// Addition or string concatenation (`+`)
    Add,
    /// Subtraction (`-`)
    Subtract,
    /// Modulo (`%`)
    Modulo,
    /// Multiplication (`*`)
    Multiply,
    /// Division (`/`)
    Divide,
    /// Exponentiation (`**`)
    Power,
}

const ALL: [Operator; 19] = [
    Operator::Not,
    Operator::Truthy,
    Operator::Or,
    Operator::And,
    Operator::Equal,
    Operator::StrictEqual,
    Operator::NotEqual,
    Operator::StrictNotEqual,
    Operator::Less,
    Operator::LessEqual,
    Operator::Greater,
    Operator::GreaterEqual,
    Operator::In,
    Operator::Add,
    Operator::Subtract,
    Operator::Modulo,
    Operator::Multiply,
    Operator::Divide,
    Operator::Power,
];

impl Operator {
    /// Name used in the rewritten call form, e.g. `gt` in `gt(@.age,20)`.
    pub fn call_name(self) -> &'static str {
        match self {
            Operator::Not => "not",
            Operator::Truthy => "truthy",
            Operator::Or => "or",
            Operator::And => "and",
            Operator::Equal => "eq",
            Operator::StrictEqual => "eeq",
            Operator::NotEqual => "ne",
            Operator::StrictNotEqual => "neeq",
            Operator::Less => "lt",
            Operator::LessEqual => "lte",
            Operator::Greater => "gt",
            Operator::GreaterEqual => "gte",
            Operator::In => "in",
            Operator::Add => "add",
            Operator::Subtract => "sub",
            Operator::Modulo => "mod",
            Operator::Multiply => "mul",
            Operator::Divide => "div",
            Operator::Power => "exp",
        }
    }

    /// Key used in structured logic literals, e.g. `>` in `{">": [...]}`.
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Not => "!",
            Operator::Truthy => "!!",
            Operator::Or => "or",
            Operator::And => "and",
            Operator::Equal => "==",
            Operator::StrictEqual => "===",
            Operator::NotEqual => "!=",
            Operator::StrictNotEqual => "!==",
            Operator::Less => "<",
            Operator::LessEqual => "<=",
            Operator::Greater => ">",
            Operator::GreaterEqual => ">=",
            Operator::In => "in",
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Modulo => "%",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Power => "**",
        }
    }

    pub fn from_call_name(name: &str) -> Option<Self> {
        ALL.into_iter().find(|op| op.call_name() == name)
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        ALL.into_iter().find(|op| op.symbol() == symbol)
    }

    pub fn is_unary(self) -> bool {
        matches!(self, Operator::Not | Operator::Truthy)
    }

    /// Whether the operator folds any number of operands (`and`, `or`).
    pub fn is_variadic(self) -> bool {
        matches!(self, Operator::And | Operator::Or)
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

#[test]
fn test_names_round_trip() {
    for op in ALL {
        assert_eq!(Operator::from_call_name(op.call_name()), Some(op));
        assert_eq!(Operator::from_symbol(op.symbol()), Some(op));
    }
    assert_eq!(Operator::from_call_name("gt"), Some(Operator::Greater));
    assert_eq!(Operator::from_symbol("&&"), None);
}
