use log::warn;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::logic::OperatorTable;
use crate::model::{FilterExpr, SearchNode};

/// What to do with filter or sort nodes the grammar cannot express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompilePolicy {
    /// Replace the node with `null` (or drop it) and log a warning.
    #[default]
    Lenient,
    /// Fail the whole compilation.
    Strict,
}

impl CompilePolicy {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            CompilePolicy::Strict
        } else {
            CompilePolicy::Lenient
        }
    }

    /// Lenient mode swallows `err` (after logging it); strict mode returns it.
    pub(crate) fn absorb(&self, err: Error) -> Result<()> {
        match self {
            CompilePolicy::Strict => Err(err),
            CompilePolicy::Lenient => {
                warn!("Dropping query fragment: {}", err);
                Ok(())
            }
        }
    }
}

/// Compiles grid filter expressions into the REST grammar's search tree.
///
/// Negation is threaded down the tree as a polarity flag rather than emitted
/// as a node: `!` flips the flag, connectives swap (`$and` <-> `$or`), and
/// comparisons pick the negated token from the operator table. Terminals are
/// never negated.
#[derive(Debug, Clone)]
pub struct FilterCompiler {
    operators: Arc<OperatorTable>,
    policy: CompilePolicy,
}

impl FilterCompiler {
    pub fn new(operators: Arc<OperatorTable>, policy: CompilePolicy) -> Self {
        Self { operators, policy }
    }

    pub fn operators(&self) -> &OperatorTable {
        &self.operators
    }

    pub fn policy(&self) -> CompilePolicy {
        self.policy
    }

    pub fn compile(&self, expr: &FilterExpr) -> Result<SearchNode> {
        self.compile_with(expr, false)
    }

    pub fn compile_with(&self, expr: &FilterExpr, negated: bool) -> Result<SearchNode> {
        match expr {
            FilterExpr::Terminal(value) => Ok(SearchNode::Raw(value.clone())),

            FilterExpr::Not(inner) => self.compile_with(inner, !negated),

            FilterExpr::Connective { op, left, right } => {
                let operator = match self.operators.resolve(op.symbol(), negated) {
                    Ok(token) => token.to_string(),
                    Err(err) => return self.drop_node(err),
                };

                Ok(SearchNode::Logical {
                    operator,
                    left: Box::new(self.compile_with(left, negated)?),
                    right: Box::new(self.compile_with(right, negated)?),
                })
            }

            FilterExpr::Comparison { field, op, value } => {
                let operator = match self.operators.resolve(op, negated) {
                    Ok(token) => token.to_string(),
                    Err(err) => return self.drop_node(err),
                };

                if negated && !self.operators.is_exact_negation(op) {
                    warn!(
                        "Negated '{}' on field '{}' is approximated by '{}'; results may exclude more rows than expected",
                        op, field, operator
                    );
                }

                Ok(SearchNode::Field {
                    field: field.clone(),
                    operator,
                    value: Box::new(self.compile_with(value, negated)?),
                })
            }

            FilterExpr::Invalid(reason) => self.drop_node(Error::InvalidFilter(reason.clone())),
        }
    }

    fn drop_node(&self, err: Error) -> Result<SearchNode> {
        self.policy.absorb(err).map(|_| SearchNode::null())
    }
}

impl Default for FilterCompiler {
    fn default() -> Self {
        Self::new(Arc::new(OperatorTable::nestjsx()), CompilePolicy::Lenient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn compile(filter: Value, negated: bool) -> Value {
        FilterCompiler::default()
            .compile_with(&FilterExpr::parse(filter), negated)
            .unwrap()
            .to_value()
    }

    #[test]
    fn test_simple_comparison() {
        assert_eq!(compile(json!(["age", ">=", 18]), false), json!({"age": {"$gte": 18}}));
        assert_eq!(
            compile(json!(["name", "contains", "ann"]), false),
            json!({"name": {"$cont": "ann"}})
        );
    }

    #[test]
    fn test_numeric_field_becomes_key() {
        assert_eq!(compile(json!([1, "=", 2]), false), json!({"1": {"$eq": 2}}));
        assert_eq!(compile(json!([1, "=", 2]), true), json!({"1": {"$ne": 2}}));
    }

    #[test]
    fn test_negated_comparison_matches_complement() {
        let complements = [
            ("=", "<>"),
            ("<>", "="),
            (">", "<="),
            (">=", "<"),
            ("<", ">="),
            ("<=", ">"),
            ("contains", "notcontains"),
            ("notcontains", "contains"),
        ];

        for (op, complement) in complements {
            assert_eq!(
                compile(json!(["price", op, 10]), true),
                compile(json!(["price", complement, 10]), false),
                "negating '{}' should equal '{}'",
                op,
                complement
            );
        }
    }

    #[test]
    fn test_negated_prefix_is_approximated() {
        assert_eq!(
            compile(json!(["!", ["name", "startswith", "A"]]), false),
            json!({"name": {"$excl": "A"}})
        );
        assert_eq!(
            compile(json!(["!", ["name", "endswith", "z"]]), false),
            json!({"name": {"$excl": "z"}})
        );
    }

    #[test]
    fn test_double_negation_cancels() {
        let expr = json!([["age", ">", 18], "and", ["name", "startswith", "J"]]);
        assert_eq!(compile(json!(["!", ["!", expr.clone()]]), false), compile(expr, false));
    }

    #[test]
    fn test_de_morgan_over_and() {
        let a = json!(["age", ">", 18]);
        let b = json!(["name", "=", "bob"]);

        let expected = json!({"$or": [compile(a.clone(), true), compile(b.clone(), true)]});
        assert_eq!(compile(json!([a, "and", b]), true), expected);
        assert_eq!(expected, json!({"$or": [{"age": {"$lte": 18}}, {"name": {"$ne": "bob"}}]}));
    }

    #[test]
    fn test_de_morgan_over_or() {
        let a = json!(["age", "<", 18]);
        let b = json!(["name", "notcontains", "x"]);

        assert_eq!(
            compile(json!([a.clone(), "or", b.clone()]), true),
            json!({"$and": [compile(a, true), compile(b, true)]})
        );
    }

    #[test]
    fn test_negation_polarity_through_nesting() {
        // !( a and !(b or c) ) == !a or (b or c)
        let filter = json!([
            "!",
            [
                ["a", "=", 1],
                "and",
                ["!", [["b", "=", 2], "or", ["c", "=", 3]]]
            ]
        ]);

        assert_eq!(
            compile(filter, false),
            json!({"$or": [
                {"a": {"$ne": 1}},
                {"$or": [{"b": {"$eq": 2}}, {"c": {"$eq": 3}}]}
            ]})
        );
    }

    #[test]
    fn test_implicit_and_pair() {
        assert_eq!(
            compile(json!([["a", "=", 1], ["b", "=", 2]]), false),
            json!({"$and": [{"a": {"$eq": 1}}, {"b": {"$eq": 2}}]})
        );
    }

    #[test]
    fn test_wrapped_expression_unwraps() {
        assert_eq!(compile(json!([["age", ">", 18]]), false), json!({"age": {"$gt": 18}}));
    }

    #[test]
    fn test_terminals_pass_through() {
        let raw = json!({"id": {"$in": [1, 2, 3]}});
        assert_eq!(compile(raw.clone(), false), raw);
        // Negation does not reach into leaves.
        assert_eq!(compile(json!(["!", raw.clone()]), false), raw);
        assert_eq!(compile(json!("name"), true), json!("name"));
    }

    #[test]
    fn test_raw_leaf_mixed_with_symbolic_form() {
        assert_eq!(
            compile(json!([{"deleted": {"$isnull": true}}, "and", ["age", ">", 18]]), false),
            json!({"$and": [{"deleted": {"$isnull": true}}, {"age": {"$gt": 18}}]})
        );
    }

    #[test]
    fn test_nested_filter_as_comparison_value() {
        assert_eq!(
            compile(json!(["!", ["tags", "=", ["x", "=", 1]]]), false),
            json!({"tags": {"$ne": {"x": {"$ne": 1}}}})
        );
    }

    #[test]
    fn test_lenient_drops_invalid_nodes_to_null() {
        assert_eq!(compile(json!([1, 2, 3, 4]), false), Value::Null);
        assert_eq!(
            compile(json!([["a", "=", 1], "or", ["b", "between", [1, 5]]]), false),
            json!({"$or": [{"a": {"$eq": 1}}, null]})
        );
    }

    #[test]
    fn test_strict_reports_compile_errors() {
        let compiler = FilterCompiler::new(Arc::new(OperatorTable::nestjsx()), CompilePolicy::Strict);

        let unknown = FilterExpr::parse(json!(["b", "between", [1, 5]]));
        match compiler.compile(&unknown) {
            Err(Error::UnknownOperator(op)) => assert_eq!(op, "between"),
            other => panic!("Expected UnknownOperator, got {:?}", other),
        }

        let bad_field = FilterExpr::parse(json!([null, "=", 1]));
        assert!(matches!(compiler.compile(&bad_field), Err(Error::InvalidFilter(_))));

        let too_long = FilterExpr::parse(json!([1, 2, 3, 4]));
        assert!(matches!(compiler.compile(&too_long), Err(Error::InvalidFilter(_))));
    }

    #[test]
    fn test_custom_operator_table() {
        let table = OperatorTable::nestjsx().with_operator("=", "$eqL", "$neL");
        let compiler = FilterCompiler::new(Arc::new(table), CompilePolicy::Lenient);

        let node = compiler
            .compile_with(&FilterExpr::compare("email", "=", "A@B.COM"), true)
            .unwrap();
        assert_eq!(node.to_value(), json!({"email": {"$neL": "A@B.COM"}}));
    }
}
