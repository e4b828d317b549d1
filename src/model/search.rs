use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Compiled node of the REST grammar's search tree.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchNode {
    /// Passed through as-is: primitives, pre-built grammar objects, and `null`
    /// for dropped sub-expressions.
    Raw(Value),
    /// `{field: {operator: value}}`
    Field {
        field: String,
        operator: String,
        value: Box<SearchNode>,
    },
    /// `{operator: [left, right]}` where operator is `$and` or `$or`.
    Logical {
        operator: String,
        left: Box<SearchNode>,
        right: Box<SearchNode>,
    },
}

impl SearchNode {
    pub fn null() -> Self {
        SearchNode::Raw(Value::Null)
    }

    /// Whether the grammar accepts this node as a search root.
    pub fn is_searchable(&self) -> bool {
        match self {
            SearchNode::Raw(value) => value.is_object() || value.is_array(),
            SearchNode::Field { .. } | SearchNode::Logical { .. } => true,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            SearchNode::Raw(value) => value.clone(),
            SearchNode::Field {
                field,
                operator,
                value,
            } => {
                let mut condition = Map::new();
                condition.insert(operator.clone(), value.to_value());
                let mut node = Map::new();
                node.insert(field.clone(), Value::Object(condition));
                Value::Object(node)
            }
            SearchNode::Logical {
                operator,
                left,
                right,
            } => {
                let mut node = Map::new();
                node.insert(
                    operator.clone(),
                    Value::Array(vec![left.to_value(), right.to_value()]),
                );
                Value::Object(node)
            }
        }
    }
}

impl Serialize for SearchNode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_value().serialize(serializer)
    }
}

impl fmt::Display for SearchNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Compiled sort entry. A missing order means ascending, so it is stored as
/// `Asc` directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortDescriptor {
    pub field: String,
    #[serde(default)]
    pub order: SortOrder,
}

impl SortDescriptor {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Desc,
        }
    }

    /// `field,ORDER` as the grammar's `sort` parameter expects.
    pub fn to_param(&self) -> String {
        format!("{},{}", self.field, self.order.as_str())
    }
}
