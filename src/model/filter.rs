use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Symbol the grid uses for logical negation in a unary node.
pub const NOT_SYMBOL: &str = "!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connective {
    And,
    Or,
}

impl Connective {
    pub fn symbol(&self) -> &'static str {
        match self {
            Connective::And => "and",
            Connective::Or => "or",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "and" => Some(Connective::And),
            "or" => Some(Connective::Or),
            _ => None,
        }
    }
}

/// Filter expression as produced by a data grid, parsed once from its
/// loosely-typed array form.
///
/// The array form is a tagged union by length:
/// - `[expr]` wraps a sub-expression
/// - `["!", expr]` negates; any other pair `[a, b]` means `[a, "and", b]`
/// - `[a, "and" | "or", b]` joins two sub-expressions
/// - `[field, op, value]` compares a field against a value
///
/// Anything that is not an array is a terminal and passes through untouched,
/// which lets callers embed filters already written in the target grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    Terminal(Value),
    Not(Box<FilterExpr>),
    Connective {
        op: Connective,
        left: Box<FilterExpr>,
        right: Box<FilterExpr>,
    },
    Comparison {
        field: String,
        op: String,
        value: Box<FilterExpr>,
    },
    /// Shape the grid grammar does not define; carries the reason.
    Invalid(String),
}

impl FilterExpr {
    pub fn parse(value: Value) -> Self {
        let items = match value {
            Value::Array(items) => items,
            other => return FilterExpr::Terminal(other),
        };

        match items.len() {
            1 => {
                let inner = items.into_iter().next().unwrap_or(Value::Null);
                FilterExpr::parse(inner)
            }
            2 => {
                let mut iter = items.into_iter();
                let (first, second) = match (iter.next(), iter.next()) {
                    (Some(a), Some(b)) => (a, b),
                    _ => return FilterExpr::Invalid("malformed unary node".to_string()),
                };
                if first.as_str() == Some(NOT_SYMBOL) {
                    FilterExpr::not(FilterExpr::parse(second))
                } else {
                    // A bare pair is an implicit conjunction.
                    FilterExpr::and(FilterExpr::parse(first), FilterExpr::parse(second))
                }
            }
            3 => Self::parse_binary(items),
            n => FilterExpr::Invalid(format!("expected 1 to 3 elements, found {}", n)),
        }
    }

    fn parse_binary(items: Vec<Value>) -> Self {
        let mut iter = items.into_iter();
        let (left, op, right) = match (iter.next(), iter.next(), iter.next()) {
            (Some(l), Some(o), Some(r)) => (l, o, r),
            _ => return FilterExpr::Invalid("malformed binary node".to_string()),
        };

        let op = match op {
            Value::String(op) => op,
            other => return FilterExpr::Invalid(format!("operator must be a string, found {}", other)),
        };

        if let Some(connective) = Connective::from_symbol(&op) {
            return FilterExpr::Connective {
                op: connective,
                left: Box::new(FilterExpr::parse(left)),
                right: Box::new(FilterExpr::parse(right)),
            };
        }

        // Scalar field names become object keys as their text.
        let field = match left {
            Value::String(field) => field,
            Value::Number(n) => n.to_string(),
            Value::Bool(flag) => flag.to_string(),
            other => return FilterExpr::Invalid(format!(
                "comparison '{}' needs a field name, found {}",
                op, other
            )),
        };

        FilterExpr::Comparison {
            field,
            op,
            value: Box::new(FilterExpr::parse(right)),
        }
    }

    pub fn compare(field: impl Into<String>, op: impl Into<String>, value: impl Into<Value>) -> Self {
        FilterExpr::Comparison {
            field: field.into(),
            op: op.into(),
            value: Box::new(FilterExpr::Terminal(value.into())),
        }
    }

    pub fn and(left: FilterExpr, right: FilterExpr) -> Self {
        FilterExpr::Connective {
            op: Connective::And,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn or(left: FilterExpr, right: FilterExpr) -> Self {
        FilterExpr::Connective {
            op: Connective::Or,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn not(inner: FilterExpr) -> Self {
        FilterExpr::Not(Box::new(inner))
    }

    /// Render back into the grid's array form. `Invalid` nodes become `null`.
    pub fn to_value(&self) -> Value {
        match self {
            FilterExpr::Terminal(value) => value.clone(),
            FilterExpr::Not(inner) => Value::Array(vec![NOT_SYMBOL.into(), inner.to_value()]),
            FilterExpr::Connective { op, left, right } => {
                Value::Array(vec![left.to_value(), op.symbol().into(), right.to_value()])
            }
            FilterExpr::Comparison { field, op, value } => Value::Array(vec![
                field.as_str().into(),
                op.as_str().into(),
                value.to_value(),
            ]),
            FilterExpr::Invalid(_) => Value::Null,
        }
    }
}

impl From<Value> for FilterExpr {
    fn from(value: Value) -> Self {
        FilterExpr::parse(value)
    }
}

impl<'de> Deserialize<'de> for FilterExpr {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(FilterExpr::parse)
    }
}

impl Serialize for FilterExpr {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_value().serialize(serializer)
    }
}
